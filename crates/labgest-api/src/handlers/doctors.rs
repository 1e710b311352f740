//! Doctor handlers

use super::validate_request;
use crate::error::AppError;
use crate::models::{CreateDoctorRequest, Doctor};
use crate::repository::DoctorRepository;
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
    path = "/api/doctors",
    tag = "doctors",
    responses(
        (status = 200, description = "All doctors", body = [Doctor]),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_doctors(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let doctors = DoctorRepository::new(state.db.clone()).find_all().await?;
    Ok(Json(doctors))
}

#[utoipa::path(
    get,
    path = "/api/doctors/{id}",
    tag = "doctors",
    params(("id" = i64, Path, description = "Doctor id")),
    responses(
        (status = 200, description = "Doctor", body = Doctor),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_doctor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let doctor = DoctorRepository::new(state.db.clone()).find_by_id(id).await?;
    Ok(Json(doctor))
}

#[utoipa::path(
    post,
    path = "/api/doctors",
    tag = "doctors",
    request_body = CreateDoctorRequest,
    responses(
        (status = 201, description = "Doctor created", body = Doctor),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_doctor(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateDoctorRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_request(&request)?;

    let doctor = DoctorRepository::new(state.db.clone())
        .create(&request)
        .await?;
    Ok((StatusCode::CREATED, Json(doctor)))
}

#[utoipa::path(
    put,
    path = "/api/doctors/{id}",
    tag = "doctors",
    params(("id" = i64, Path, description = "Doctor id")),
    request_body = CreateDoctorRequest,
    responses(
        (status = 200, description = "Doctor updated", body = Doctor),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_doctor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<CreateDoctorRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_request(&request)?;

    let doctor = DoctorRepository::new(state.db.clone())
        .update(id, &request)
        .await?;
    Ok(Json(doctor))
}

#[utoipa::path(
    delete,
    path = "/api/doctors/{id}",
    tag = "doctors",
    params(("id" = i64, Path, description = "Doctor id")),
    responses(
        (status = 204, description = "Doctor deleted"),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_doctor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    DoctorRepository::new(state.db.clone()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
