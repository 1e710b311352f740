//! Hospital handlers

use super::validate_request;
use crate::error::AppError;
use crate::models::{CreateHospitalRequest, Hospital};
use crate::repository::HospitalRepository;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/hospitals",
    tag = "hospitals",
    responses(
        (status = 200, description = "All hospitals", body = [Hospital]),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_hospitals(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let hospitals = HospitalRepository::new(state.db.clone()).find_all().await?;
    Ok(Json(hospitals))
}

#[utoipa::path(
    get,
    path = "/api/hospitals/{id}",
    tag = "hospitals",
    params(("id" = i64, Path, description = "Hospital id")),
    responses(
        (status = 200, description = "Hospital", body = Hospital),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_hospital(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let hospital = HospitalRepository::new(state.db.clone())
        .find_by_id(id)
        .await?;
    Ok(Json(hospital))
}

#[utoipa::path(
    post,
    path = "/api/hospitals",
    tag = "hospitals",
    request_body = CreateHospitalRequest,
    responses(
        (status = 201, description = "Hospital created", body = Hospital),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_hospital(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateHospitalRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_request(&request)?;

    let hospital = HospitalRepository::new(state.db.clone())
        .create(&request)
        .await?;
    Ok((StatusCode::CREATED, Json(hospital)))
}

#[utoipa::path(
    put,
    path = "/api/hospitals/{id}",
    tag = "hospitals",
    params(("id" = i64, Path, description = "Hospital id")),
    request_body = CreateHospitalRequest,
    responses(
        (status = 200, description = "Hospital updated", body = Hospital),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_hospital(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<CreateHospitalRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_request(&request)?;

    let hospital = HospitalRepository::new(state.db.clone())
        .update(id, &request)
        .await?;
    Ok(Json(hospital))
}

#[utoipa::path(
    delete,
    path = "/api/hospitals/{id}",
    tag = "hospitals",
    params(("id" = i64, Path, description = "Hospital id")),
    responses(
        (status = 204, description = "Hospital deleted"),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_hospital(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    HospitalRepository::new(state.db.clone()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
