//! API route definitions
//!
//! Public routes (login, password reset, the WebSocket upgrade) are
//! merged with the protected set, which sits behind the auth gateway.
//! Profile management is additionally gated on the ADMIN profile; the
//! gateway layer is applied last so it runs first.

use crate::auth::middleware::{auth_middleware, require_profile};
use crate::handlers::{auth, doctors, hospitals, notifications, pieces, profiles, users};
use crate::notify;
use crate::state::AppState;
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

/// Create API routes, mounted under `/api`
pub fn api_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    // Public routes (no authentication required). The live notification
    // socket authenticates in-band with its first frame.
    let public_routes = Router::new()
        .route("/auth/login", post(auth::login_handler))
        .route(
            "/auth/password-reset/request",
            post(auth::password_reset_request_handler),
        )
        .route("/auth/password-reset", post(auth::password_reset_handler))
        .route("/notifications/live", get(notify::notifications_live));

    // Profile management: authorization currency, administrators only.
    let profile_routes = Router::new()
        .route(
            "/profiles",
            get(profiles::list_profiles).post(profiles::create_profile),
        )
        .route(
            "/profiles/:id",
            get(profiles::get_profile)
                .patch(profiles::update_profile)
                .delete(profiles::delete_profile),
        )
        .route_layer(middleware::from_fn(require_profile("ADMIN")));

    // Everything else requires a live session.
    let protected_routes = Router::new()
        .route("/auth/validate", get(auth::validate_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/auth/sessions", get(auth::sessions_handler))
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/me", get(users::me_handler))
        .route(
            "/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/hospitals",
            get(hospitals::list_hospitals).post(hospitals::create_hospital),
        )
        .route(
            "/hospitals/:id",
            get(hospitals::get_hospital)
                .put(hospitals::update_hospital)
                .delete(hospitals::delete_hospital),
        )
        .route(
            "/doctors",
            get(doctors::list_doctors).post(doctors::create_doctor),
        )
        .route(
            "/doctors/:id",
            get(doctors::get_doctor)
                .put(doctors::update_doctor)
                .delete(doctors::delete_doctor),
        )
        .route(
            "/pieces",
            get(pieces::list_pieces).post(pieces::create_piece),
        )
        .route("/pieces/search", get(pieces::search_pieces))
        .route(
            "/pieces/:id",
            get(pieces::get_piece)
                .put(pieces::update_piece)
                .delete(pieces::delete_piece),
        )
        .route(
            "/notifications",
            get(notifications::list_notifications).post(notifications::create_notification),
        )
        .route("/notifications/:id/seen", put(notifications::mark_as_seen))
        .merge(profile_routes)
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new().merge(public_routes).merge(protected_routes)
}
