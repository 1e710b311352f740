//! Profile repository

use super::RepositoryError;
use crate::models::{CreateProfileRequest, Profile};
use sqlx::PgPool;

pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: &CreateProfileRequest) -> Result<Profile, RepositoryError> {
        let existing =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM profiles WHERE name = $1")
                .bind(&request.name)
                .fetch_one(&self.pool)
                .await?;

        if existing > 0 {
            return Err(RepositoryError::Duplicate(
                "Profile name already exists".to_string(),
            ));
        }

        let profile = sqlx::query_as::<_, Profile>(
            "INSERT INTO profiles (name, created_at, updated_at) VALUES ($1, NOW(), NOW()) \
             RETURNING id, name, created_at, updated_at",
        )
        .bind(&request.name)
        .fetch_one(&self.pool)
        .await?;

        Ok(profile)
    }

    pub async fn find_all(&self) -> Result<Vec<Profile>, RepositoryError> {
        let profiles = sqlx::query_as::<_, Profile>(
            "SELECT id, name, created_at, updated_at FROM profiles ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Profile, RepositoryError> {
        sqlx::query_as::<_, Profile>(
            "SELECT id, name, created_at, updated_at FROM profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound("profile".to_string()))
    }

    pub async fn update(
        &self,
        id: i64,
        request: &CreateProfileRequest,
    ) -> Result<Profile, RepositoryError> {
        sqlx::query_as::<_, Profile>(
            "UPDATE profiles SET name = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING id, name, created_at, updated_at",
        )
        .bind(id)
        .bind(&request.name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound("profile".to_string()))
    }

    pub async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM user_profiles WHERE profile_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("profile".to_string()));
        }

        Ok(())
    }
}
