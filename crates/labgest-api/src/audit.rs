//! Security audit logging for authentication events
//!
//! All audit events are logged at INFO level with the "audit" target so
//! they can be filtered and routed to security monitoring separately from
//! application logs.

use serde::{Deserialize, Serialize};
use tracing::info;

/// Security audit events emitted by the auth layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// Successful user login
    LoginSuccess {
        user_id: i64,
        email: String,
        session_id: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// Failed login attempt
    LoginFailure {
        email: String,
        reason: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// User logout (one session revoked)
    Logout { user_id: i64 },

    /// Rejected bearer token (tampered, expired, or orphaned session)
    InvalidToken {
        reason: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// Authenticated user denied access to a profile-gated resource
    AccessDenied {
        user_id: i64,
        resource: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// Password reset requested for an email (whether or not it exists)
    PasswordResetRequested { email: String },

    /// Password reset completed
    PasswordResetCompleted { email: String },
}

/// Emit an audit event as structured JSON under the "audit" target.
pub fn audit_log(event: &AuditEvent) {
    let event_json = serde_json::to_string(event)
        .unwrap_or_else(|e| format!("{{\"error\":\"Failed to serialize audit event: {e}\"}}"));

    info!(target: "audit", event = %event_json, "audit event");
}

/// Best-effort client IP, preferring proxy headers.
pub fn extract_ip_address(headers: &axum::http::HeaderMap) -> Option<String> {
    if let Some(xff) = headers.get("x-forwarded-for") {
        if let Ok(xff_str) = xff.to_str() {
            if let Some(first_ip) = xff_str.split(',').next() {
                return Some(first_ip.trim().to_string());
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            return Some(ip_str.to_string());
        }
    }

    None
}

pub fn extract_user_agent(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|ua| ua.to_str().ok())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_event_serialization() {
        let event = AuditEvent::LoginSuccess {
            user_id: 7,
            email: "test@example.com".to_string(),
            session_id: "sess-1".to_string(),
            ip_address: Some("203.0.113.1".to_string()),
            user_agent: None,
        };

        let json = serde_json::to_string(&event).expect("serialize");
        assert!(json.contains("\"event_type\":\"login_success\""));
        assert!(json.contains("test@example.com"));
    }

    #[test]
    fn test_extract_ip_prefers_forwarded_for() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.1, 10.0.0.1".parse().expect("header"));
        headers.insert("x-real-ip", "10.0.0.2".parse().expect("header"));

        assert_eq!(extract_ip_address(&headers), Some("203.0.113.1".to_string()));
    }

    #[test]
    fn test_extract_ip_falls_back_to_real_ip() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert("x-real-ip", "203.0.113.9".parse().expect("header"));

        assert_eq!(extract_ip_address(&headers), Some("203.0.113.9".to_string()));
    }

    #[test]
    fn test_extract_ip_none_without_headers() {
        let headers = axum::http::HeaderMap::new();
        assert_eq!(extract_ip_address(&headers), None);
    }
}
