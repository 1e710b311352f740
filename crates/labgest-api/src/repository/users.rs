//! User repository
//!
//! CRUD over the `users` table plus the `user_profiles` association, and
//! the `AccountStore` implementation the auth layer consumes.

use super::RepositoryError;
use crate::models::{CreateUserRequest, UpdateUserRequest, User};
use labgest_core::{Account, AccountStore, LabgestError};
use sqlx::PgPool;

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at, updated_at";

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a user with an already-hashed password and attach profile
    /// associations.
    pub async fn create(
        &self,
        request: &CreateUserRequest,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let existing =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = $1")
                .bind(&request.email)
                .fetch_one(&self.pool)
                .await?;

        if existing > 0 {
            return Err(RepositoryError::Duplicate(
                "Email already registered".to_string(),
            ));
        }

        let mut user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, password_hash, created_at, updated_at) \
             VALUES ($1, $2, $3, NOW(), NOW()) RETURNING {USER_COLUMNS}"
        ))
        .bind(&request.name)
        .bind(&request.email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        for profile_id in &request.profiles {
            sqlx::query(
                "INSERT INTO user_profiles (user_id, profile_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(user.id)
            .bind(profile_id)
            .execute(&self.pool)
            .await?;
        }

        user.profiles = request.profiles.clone();
        Ok(user)
    }

    pub async fn find_all(&self) -> Result<Vec<User>, RepositoryError> {
        let mut users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        for user in &mut users {
            user.profiles = self.profile_ids(user.id).await?;
        }

        Ok(users)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<User, RepositoryError> {
        let mut user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound("user".to_string()))?;

        user.profiles = self.profile_ids(user.id).await?;
        Ok(user)
    }

    pub async fn update(
        &self,
        id: i64,
        request: &UpdateUserRequest,
    ) -> Result<User, RepositoryError> {
        // Always bumps updated_at; name and email only when provided.
        sqlx::query(
            "UPDATE users SET \
                 name = COALESCE($2, name), \
                 email = COALESCE($3, email), \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&request.name)
        .bind(&request.email)
        .execute(&self.pool)
        .await?;

        if let Some(profiles) = &request.profiles {
            sqlx::query("DELETE FROM user_profiles WHERE user_id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
            for profile_id in profiles {
                sqlx::query("INSERT INTO user_profiles (user_id, profile_id) VALUES ($1, $2)")
                    .bind(id)
                    .bind(profile_id)
                    .execute(&self.pool)
                    .await?;
            }
        }

        self.find_by_id(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM user_profiles WHERE user_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("user".to_string()));
        }

        Ok(())
    }

    async fn profile_ids(&self, user_id: i64) -> Result<Vec<i64>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT profile_id FROM user_profiles WHERE user_id = $1 ORDER BY profile_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}

#[async_trait::async_trait]
impl AccountStore for UserRepository {
    async fn find_by_email(&self, email: &str) -> labgest_core::Result<Option<Account>> {
        let account = sqlx::query_as::<_, (i64, String, String, String)>(
            "SELECT id, email, name, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| LabgestError::DatabaseError(e.to_string()))?
        .map(|(id, email, name, password_hash)| Account {
            id,
            email,
            name,
            password_hash,
        });

        Ok(account)
    }

    async fn profiles_for_user(&self, user_id: i64) -> labgest_core::Result<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT p.name FROM profiles p \
             JOIN user_profiles up ON up.profile_id = p.id \
             WHERE up.user_id = $1 ORDER BY p.name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| LabgestError::DatabaseError(e.to_string()))?;

        Ok(names)
    }

    async fn set_password(&self, user_id: i64, password_hash: &str) -> labgest_core::Result<()> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| LabgestError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}
