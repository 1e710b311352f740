//! Doctor repository

use super::RepositoryError;
use crate::models::{CreateDoctorRequest, Doctor};
use sqlx::PgPool;

const DOCTOR_COLUMNS: &str = "id, name, email, phone, created_at, updated_at";

pub struct DoctorRepository {
    pool: PgPool,
}

impl DoctorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: &CreateDoctorRequest) -> Result<Doctor, RepositoryError> {
        let doctor = sqlx::query_as::<_, Doctor>(&format!(
            "INSERT INTO doctors (name, email, phone, created_at, updated_at) \
             VALUES ($1, $2, $3, NOW(), NOW()) RETURNING {DOCTOR_COLUMNS}"
        ))
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.phone)
        .fetch_one(&self.pool)
        .await?;

        Ok(doctor)
    }

    pub async fn find_all(&self) -> Result<Vec<Doctor>, RepositoryError> {
        let doctors = sqlx::query_as::<_, Doctor>(&format!(
            "SELECT {DOCTOR_COLUMNS} FROM doctors ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(doctors)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Doctor, RepositoryError> {
        sqlx::query_as::<_, Doctor>(&format!(
            "SELECT {DOCTOR_COLUMNS} FROM doctors WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound("doctor".to_string()))
    }

    pub async fn update(
        &self,
        id: i64,
        request: &CreateDoctorRequest,
    ) -> Result<Doctor, RepositoryError> {
        sqlx::query_as::<_, Doctor>(&format!(
            "UPDATE doctors SET name = $2, email = $3, phone = $4, updated_at = NOW() \
             WHERE id = $1 RETURNING {DOCTOR_COLUMNS}"
        ))
        .bind(id)
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.phone)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound("doctor".to_string()))
    }

    pub async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM doctors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("doctor".to_string()));
        }

        Ok(())
    }
}
