//! Authentication service layer
//!
//! Business logic for login, logout, session enumeration, and the
//! password-reset flow. The service owns no I/O of its own: accounts,
//! sessions, and reset tokens all live behind the collaborator seams, so
//! the same code runs against Postgres + Redis in production and the
//! in-memory backends in tests.

use super::jwt::generate_access_token;
use super::password::{hash_password, validate_password_strength, verify_password};
use crate::audit::{audit_log, AuditEvent};
use crate::error::AppError;
use crate::session::{ResetTokenStore, Session, SessionStore};
use base64::Engine;
use chrono::Utc;
use labgest_core::{AccountStore, AuthConfig};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// User login request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
}

/// Password reset request (step 1: mint a token for the email)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PasswordResetRequest {
    #[validate(email)]
    pub email: String,
}

/// Password reset (step 2: consume the token)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PasswordReset {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(min = 8))]
    pub new_password: String,
}

/// Authentication service
pub struct AuthService {
    config: AuthConfig,
    accounts: Arc<dyn AccountStore>,
    sessions: Arc<dyn SessionStore>,
    reset_tokens: Arc<dyn ResetTokenStore>,
}

impl AuthService {
    pub fn new(
        config: AuthConfig,
        accounts: Arc<dyn AccountStore>,
        sessions: Arc<dyn SessionStore>,
        reset_tokens: Arc<dyn ResetTokenStore>,
    ) -> Self {
        Self {
            config,
            accounts,
            sessions,
            reset_tokens,
        }
    }

    /// Login with email and password.
    ///
    /// Verifies the credential, snapshots the user's profiles into the
    /// token, and registers the new session. The token is only returned
    /// once the session is stored; a store failure aborts the login.
    ///
    /// # Errors
    ///
    /// * `AppError::InvalidCredentials` - unknown email or wrong password
    /// * `AppError::Signing` - token could not be signed
    /// * `AppError::Store` - session backend failure
    pub async fn login(&self, request: &LoginRequest) -> Result<String, AppError> {
        // An unknown email and a wrong password are indistinguishable to
        // the caller.
        let account = self
            .accounts
            .find_by_email(&request.email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_valid = verify_password(&request.password, &account.password_hash)?;
        if !password_valid {
            return Err(AppError::InvalidCredentials);
        }

        // Scope snapshot: profile changes take effect at the next login,
        // not retroactively on outstanding tokens.
        let profiles = self.accounts.profiles_for_user(account.id).await?;

        let session_id = Uuid::new_v4().to_string();
        let token = generate_access_token(&self.config, &account, &profiles, &session_id)?;

        let session = Session {
            user_id: account.id,
            email: account.email.clone(),
            username: account.name.clone(),
            token: token.clone(),
            session_id,
            created_at: Some(Utc::now()),
        };

        self.sessions.store(account.id, &session).await?;

        Ok(token)
    }

    /// Revoke the session matching this token. Unknown tokens are a
    /// no-op, which makes a second logout harmless.
    pub async fn logout(&self, user_id: i64, token: &str) -> Result<(), AppError> {
        self.sessions.remove_by_token(user_id, token).await?;
        audit_log(&AuditEvent::Logout { user_id });
        Ok(())
    }

    /// All live sessions for a user (multi-device).
    pub async fn sessions(&self, user_id: i64) -> Result<Vec<Session>, AppError> {
        Ok(self.sessions.list(user_id).await?)
    }

    /// Cross-check a session id against the store.
    pub async fn validate_session(&self, session_id: &str, user_id: i64) -> Result<(), AppError> {
        Ok(self.sessions.validate(session_id, user_id).await?)
    }

    /// Mint a password-reset token for the email, if an account exists.
    ///
    /// Always returns `Ok` so the endpoint cannot be used as an account
    /// oracle. Delivering the token to the user is the mailer
    /// collaborator's job, not this service's.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), AppError> {
        if self.accounts.find_by_email(email).await?.is_none() {
            audit_log(&AuditEvent::PasswordResetRequested {
                email: email.to_string(),
            });
            return Ok(());
        }

        let token = generate_reset_token();
        self.reset_tokens
            .put_reset_token(&token, email, self.config.reset_token_ttl())
            .await?;

        audit_log(&AuditEvent::PasswordResetRequested {
            email: email.to_string(),
        });

        Ok(())
    }

    /// Consume a reset token and replace the account's password.
    ///
    /// # Errors
    ///
    /// * `AppError::Unauthorized` - unknown or expired token
    /// * `AppError::BadRequest` - new password fails the strength check
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AppError> {
        let email = self
            .reset_tokens
            .get_reset_token(token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        validate_password_strength(new_password).map_err(AppError::BadRequest)?;

        let account = self
            .accounts
            .find_by_email(&email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let password_hash = hash_password(new_password)?;
        self.accounts
            .set_password(account.id, &password_hash)
            .await?;

        self.reset_tokens.remove_reset_token(token).await?;

        audit_log(&AuditEvent::PasswordResetCompleted { email });

        Ok(())
    }
}

/// 256-bit random token, URL-safe base64 without padding.
fn generate_reset_token() -> String {
    let mut rng = rand::thread_rng();
    let token_bytes: [u8; 32] = rng.gen();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(token_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::validate_access_token;
    use crate::auth::password::hash_password;
    use crate::repository::MemoryAccountStore;
    use crate::session::MemorySessionStore;
    use labgest_core::Account;
    use std::time::Duration;

    fn service_with_user(email: &str, password: &str) -> (AuthService, Arc<MemorySessionStore>) {
        let accounts = MemoryAccountStore::new();
        accounts.add_account(
            Account {
                id: 1,
                email: email.to_string(),
                name: "Ana".to_string(),
                password_hash: hash_password(password).expect("hash"),
            },
            vec!["LAB".to_string()],
        );

        let sessions = Arc::new(MemorySessionStore::new());
        let service = AuthService::new(
            AuthConfig::default(),
            Arc::new(accounts),
            sessions.clone(),
            sessions.clone(),
        );
        (service, sessions)
    }

    #[tokio::test]
    async fn test_login_stores_a_matching_session() {
        let (service, sessions) = service_with_user("ana@example.com", "hunter22secret");

        let token = service
            .login(&LoginRequest {
                email: "ana@example.com".to_string(),
                password: "hunter22secret".to_string(),
            })
            .await
            .expect("login");

        let claims = validate_access_token(&AuthConfig::default(), &token).expect("claims");
        assert_eq!(claims.user_id(), Some(1));
        assert_eq!(claims.profiles, vec!["LAB".to_string()]);

        // The embedded session id is live in the store immediately after.
        sessions
            .validate(&claims.session_id, 1)
            .await
            .expect("session live");

        let listed = service.sessions(1).await.expect("sessions");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].token, token);
        assert!(listed[0].created_at.is_some());
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let (service, _) = service_with_user("ana@example.com", "hunter22secret");

        let result = service
            .login(&LoginRequest {
                email: "ana@example.com".to_string(),
                password: "not-the-password".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unknown_email_is_same_error() {
        let (service, _) = service_with_user("ana@example.com", "hunter22secret");

        let result = service
            .login(&LoginRequest {
                email: "nobody@example.com".to_string(),
                password: "whatever-password".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_logout_revokes_only_the_matching_session() {
        let (service, sessions) = service_with_user("ana@example.com", "hunter22secret");
        let request = LoginRequest {
            email: "ana@example.com".to_string(),
            password: "hunter22secret".to_string(),
        };

        // Two concurrent logins: distinct sessions, independently valid.
        let token_a = service.login(&request).await.expect("login a");
        let token_b = service.login(&request).await.expect("login b");
        assert_ne!(token_a, token_b);
        assert_eq!(service.sessions(1).await.expect("list").len(), 2);

        service.logout(1, &token_a).await.expect("logout a");

        let remaining = service.sessions(1).await.expect("list");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].token, token_b);

        let claims_a =
            validate_access_token(&AuthConfig::default(), &token_a).expect("still decodes");
        assert!(
            sessions.validate(&claims_a.session_id, 1).await.is_err(),
            "revoked session must fail validation while the signature is still fresh"
        );
        let claims_b = validate_access_token(&AuthConfig::default(), &token_b).expect("claims");
        sessions
            .validate(&claims_b.session_id, 1)
            .await
            .expect("other session untouched");
    }

    #[tokio::test]
    async fn test_double_logout_is_harmless() {
        let (service, _) = service_with_user("ana@example.com", "hunter22secret");
        let token = service
            .login(&LoginRequest {
                email: "ana@example.com".to_string(),
                password: "hunter22secret".to_string(),
            })
            .await
            .expect("login");

        service.logout(1, &token).await.expect("first logout");
        service.logout(1, &token).await.expect("second logout no-op");

        assert!(service.sessions(1).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn test_password_reset_flow() {
        let (service, sessions) = service_with_user("ana@example.com", "hunter22secret");

        service
            .request_password_reset("ana@example.com")
            .await
            .expect("request");

        // The token reaches the user out of band; fish it out of the store.
        let token = "fixture-reset-token";
        sessions
            .put_reset_token(token, "ana@example.com", Duration::from_secs(60))
            .await
            .expect("seed token");

        service
            .reset_password(token, "brand-new-password")
            .await
            .expect("reset");

        // Token is single-use.
        let again = service.reset_password(token, "another-password1").await;
        assert!(matches!(again, Err(AppError::Unauthorized)));

        // The new password works; the old one is gone.
        service
            .login(&LoginRequest {
                email: "ana@example.com".to_string(),
                password: "brand-new-password".to_string(),
            })
            .await
            .expect("login with new password");
        let old = service
            .login(&LoginRequest {
                email: "ana@example.com".to_string(),
                password: "hunter22secret".to_string(),
            })
            .await;
        assert!(matches!(old, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_reset_with_unknown_token() {
        let (service, _) = service_with_user("ana@example.com", "hunter22secret");

        let result = service
            .reset_password("no-such-token", "whatever-password")
            .await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_reset_request_for_unknown_email_is_silent() {
        let (service, _) = service_with_user("ana@example.com", "hunter22secret");

        service
            .request_password_reset("nobody@example.com")
            .await
            .expect("no account oracle");
    }
}
