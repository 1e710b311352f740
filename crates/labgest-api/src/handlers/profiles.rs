//! Profile management handlers
//!
//! The whole router is gated on the ADMIN profile in `routes.rs`;
//! profiles are the authorization currency, so only administrators touch
//! them.

use super::validate_request;
use crate::error::AppError;
use crate::models::{CreateProfileRequest, Profile};
use crate::repository::ProfileRepository;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

/// List profiles
#[utoipa::path(
    get,
    path = "/api/profiles",
    tag = "profiles",
    responses(
        (status = 200, description = "All profiles", body = [Profile]),
        (status = 403, description = "Requires ADMIN profile", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_profiles(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let profiles = ProfileRepository::new(state.db.clone()).find_all().await?;
    Ok(Json(profiles))
}

/// Fetch one profile
#[utoipa::path(
    get,
    path = "/api/profiles/{id}",
    tag = "profiles",
    params(("id" = i64, Path, description = "Profile id")),
    responses(
        (status = 200, description = "Profile", body = Profile),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let profile = ProfileRepository::new(state.db.clone())
        .find_by_id(id)
        .await?;
    Ok(Json(profile))
}

/// Create a profile
#[utoipa::path(
    post,
    path = "/api/profiles",
    tag = "profiles",
    request_body = CreateProfileRequest,
    responses(
        (status = 201, description = "Profile created", body = Profile),
        (status = 409, description = "Name already exists", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_profile(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_request(&request)?;

    let profile = ProfileRepository::new(state.db.clone())
        .create(&request)
        .await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// Rename a profile
#[utoipa::path(
    patch,
    path = "/api/profiles/{id}",
    tag = "profiles",
    params(("id" = i64, Path, description = "Profile id")),
    request_body = CreateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = Profile),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<CreateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_request(&request)?;

    let profile = ProfileRepository::new(state.db.clone())
        .update(id, &request)
        .await?;
    Ok(Json(profile))
}

/// Delete a profile and its user associations
#[utoipa::path(
    delete,
    path = "/api/profiles/{id}",
    tag = "profiles",
    params(("id" = i64, Path, description = "Profile id")),
    responses(
        (status = 204, description = "Profile deleted"),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    ProfileRepository::new(state.db.clone()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
