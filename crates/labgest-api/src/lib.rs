//! Labgest API - REST/WebSocket server
//!
//! Clinic/lab management backend: CRUD over users, profiles, hospitals,
//! doctors, pieces, and notifications, fronted by JWT authentication with
//! Redis-backed revocable sessions and a per-user notification fan-out.

pub mod audit;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod notify;
pub mod repository;
pub mod routes;
pub mod session;
pub mod state;

use crate::middleware::security_headers_middleware;
use crate::state::AppState;
use axum::http::{header, HeaderValue, Method};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI document for the whole surface
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health_check,
        handlers::auth::login_handler,
        handlers::auth::validate_handler,
        handlers::auth::logout_handler,
        handlers::auth::sessions_handler,
        handlers::auth::password_reset_request_handler,
        handlers::auth::password_reset_handler,
        handlers::users::list_users,
        handlers::users::me_handler,
        handlers::users::get_user,
        handlers::users::create_user,
        handlers::users::update_user,
        handlers::users::delete_user,
        handlers::profiles::list_profiles,
        handlers::profiles::get_profile,
        handlers::profiles::create_profile,
        handlers::profiles::update_profile,
        handlers::profiles::delete_profile,
        handlers::hospitals::list_hospitals,
        handlers::hospitals::get_hospital,
        handlers::hospitals::create_hospital,
        handlers::hospitals::update_hospital,
        handlers::hospitals::delete_hospital,
        handlers::doctors::list_doctors,
        handlers::doctors::get_doctor,
        handlers::doctors::create_doctor,
        handlers::doctors::update_doctor,
        handlers::doctors::delete_doctor,
        handlers::pieces::list_pieces,
        handlers::pieces::search_pieces,
        handlers::pieces::get_piece,
        handlers::pieces::create_piece,
        handlers::pieces::update_piece,
        handlers::pieces::delete_piece,
        handlers::notifications::create_notification,
        handlers::notifications::list_notifications,
        handlers::notifications::mark_as_seen,
    ),
    components(schemas(
        error::ApiError,
        handlers::health::HealthResponse,
        handlers::auth::LoginResponse,
        handlers::auth::ValidateResponse,
        handlers::auth::MessageResponse,
        auth::service::LoginRequest,
        auth::service::PasswordResetRequest,
        auth::service::PasswordReset,
        session::Session,
        models::User,
        models::CreateUserRequest,
        models::UpdateUserRequest,
        models::Profile,
        models::CreateProfileRequest,
        models::Hospital,
        models::CreateHospitalRequest,
        models::Doctor,
        models::CreateDoctorRequest,
        models::Piece,
        models::CreatePieceRequest,
        models::Notification,
        models::CreateNotificationRequest,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Login, sessions, password reset"),
        (name = "users", description = "User management"),
        (name = "profiles", description = "Authorization profiles"),
        (name = "hospitals", description = "Hospitals"),
        (name = "doctors", description = "Doctors"),
        (name = "pieces", description = "Lab work orders"),
        (name = "notifications", description = "Notifications and fan-out"),
        (name = "health", description = "Probes"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Build the full application router over the given state.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/api", routes::api_routes(state.clone()))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        layer.allow_origin(parsed)
    }
}

/// Router over in-memory backends, for integration tests.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_router_for_testing() -> Router {
    create_router(Arc::new(AppState::for_testing()))
}
