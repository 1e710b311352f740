//! Hospital repository

use super::RepositoryError;
use crate::models::{CreateHospitalRequest, Hospital};
use sqlx::PgPool;

pub struct HospitalRepository {
    pool: PgPool,
}

impl HospitalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        request: &CreateHospitalRequest,
    ) -> Result<Hospital, RepositoryError> {
        let hospital = sqlx::query_as::<_, Hospital>(
            "INSERT INTO hospitals (name, created_at, updated_at) VALUES ($1, NOW(), NOW()) \
             RETURNING id, name, created_at, updated_at",
        )
        .bind(&request.name)
        .fetch_one(&self.pool)
        .await?;

        Ok(hospital)
    }

    pub async fn find_all(&self) -> Result<Vec<Hospital>, RepositoryError> {
        let hospitals = sqlx::query_as::<_, Hospital>(
            "SELECT id, name, created_at, updated_at FROM hospitals ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(hospitals)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Hospital, RepositoryError> {
        sqlx::query_as::<_, Hospital>(
            "SELECT id, name, created_at, updated_at FROM hospitals WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound("hospital".to_string()))
    }

    pub async fn update(
        &self,
        id: i64,
        request: &CreateHospitalRequest,
    ) -> Result<Hospital, RepositoryError> {
        sqlx::query_as::<_, Hospital>(
            "UPDATE hospitals SET name = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING id, name, created_at, updated_at",
        )
        .bind(id)
        .bind(&request.name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound("hospital".to_string()))
    }

    pub async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM hospitals WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("hospital".to_string()));
        }

        Ok(())
    }
}
