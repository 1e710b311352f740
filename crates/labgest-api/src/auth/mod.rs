//! Authentication and authorization module
//!
//! This module provides JWT-based authentication backed by revocable
//! Redis sessions:
//! - Token generation and validation
//! - Password hashing with Argon2
//! - The auth gateway (middleware + WebSocket-friendly variant)
//! - The authentication service used by the route handlers

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod service;

pub use jwt::{generate_access_token, validate_access_token, Claims, JwtError};
pub use middleware::{
    auth_middleware, authenticate, require_profile, validate_user, AuthContext, AuthError,
};
pub use password::{hash_password, validate_password_strength, verify_password, PasswordError};
pub use service::{AuthService, LoginRequest, PasswordReset, PasswordResetRequest};
