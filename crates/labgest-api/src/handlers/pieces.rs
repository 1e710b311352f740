//! Piece (lab work order) handlers

use super::validate_request;
use crate::error::AppError;
use crate::models::{CreatePieceRequest, Piece, PieceFilter};
use crate::repository::PieceRepository;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/pieces",
    tag = "pieces",
    responses(
        (status = 200, description = "All pieces", body = [Piece]),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_pieces(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let pieces = PieceRepository::new(state.db.clone()).find_all().await?;
    Ok(Json(pieces))
}

/// Filtered search over pieces
#[utoipa::path(
    get,
    path = "/api/pieces/search",
    tag = "pieces",
    responses(
        (status = 200, description = "Matching pieces", body = [Piece]),
    ),
    security(("bearer_auth" = []))
)]
pub async fn search_pieces(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<PieceFilter>,
) -> Result<impl IntoResponse, AppError> {
    let pieces = PieceRepository::new(state.db.clone())
        .search(&filter)
        .await?;
    Ok(Json(pieces))
}

#[utoipa::path(
    get,
    path = "/api/pieces/{id}",
    tag = "pieces",
    params(("id" = i64, Path, description = "Piece id")),
    responses(
        (status = 200, description = "Piece", body = Piece),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_piece(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let piece = PieceRepository::new(state.db.clone()).find_by_id(id).await?;
    Ok(Json(piece))
}

#[utoipa::path(
    post,
    path = "/api/pieces",
    tag = "pieces",
    request_body = CreatePieceRequest,
    responses(
        (status = 201, description = "Piece created", body = Piece),
        (status = 409, description = "PublicId must be unique", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_piece(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreatePieceRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_request(&request)?;

    let piece = PieceRepository::new(state.db.clone())
        .create(&request)
        .await?;
    Ok((StatusCode::CREATED, Json(piece)))
}

#[utoipa::path(
    put,
    path = "/api/pieces/{id}",
    tag = "pieces",
    params(("id" = i64, Path, description = "Piece id")),
    request_body = CreatePieceRequest,
    responses(
        (status = 200, description = "Piece updated", body = Piece),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_piece(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<CreatePieceRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_request(&request)?;

    let piece = PieceRepository::new(state.db.clone())
        .update(id, &request)
        .await?;
    Ok(Json(piece))
}

#[utoipa::path(
    delete,
    path = "/api/pieces/{id}",
    tag = "pieces",
    params(("id" = i64, Path, description = "Piece id")),
    responses(
        (status = 204, description = "Piece deleted"),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_piece(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    PieceRepository::new(state.db.clone()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
