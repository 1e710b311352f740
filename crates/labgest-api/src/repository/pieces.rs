//! Piece (lab work order) repository
//!
//! Pieces carry a client-facing `public_id` that must stay unique, and
//! the search endpoint filters on hospital, doctor, payment state,
//! patient name, and the received-at range.

use super::RepositoryError;
use crate::models::{CreatePieceRequest, Piece, PieceFilter};
use sqlx::{PgPool, QueryBuilder};

const PIECE_COLUMNS: &str = "id, public_id, hospital_id, doctor_id, patient_name, patient_age, \
     patient_gender, piece_type, price_total, price_paid, is_paid, has_invoice, has_insurance, \
     paid_with_card, received_at, delivered_at, description, created_at, updated_at";

pub struct PieceRepository {
    pool: PgPool,
}

impl PieceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: &CreatePieceRequest) -> Result<Piece, RepositoryError> {
        let existing =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM pieces WHERE public_id = $1")
                .bind(request.public_id)
                .fetch_one(&self.pool)
                .await?;

        if existing > 0 {
            return Err(RepositoryError::Duplicate(
                "PublicId must be unique".to_string(),
            ));
        }

        let piece = sqlx::query_as::<_, Piece>(&format!(
            "INSERT INTO pieces (public_id, hospital_id, doctor_id, patient_name, patient_age, \
                 patient_gender, piece_type, price_total, price_paid, is_paid, has_invoice, \
                 has_insurance, paid_with_card, received_at, delivered_at, description, \
                 created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
                 NOW(), NOW()) \
             RETURNING {PIECE_COLUMNS}"
        ))
        .bind(request.public_id)
        .bind(request.hospital_id)
        .bind(request.doctor_id)
        .bind(&request.patient_name)
        .bind(request.patient_age)
        .bind(&request.patient_gender)
        .bind(&request.piece_type)
        .bind(request.price_total)
        .bind(request.price_paid)
        .bind(request.is_paid)
        .bind(request.has_invoice)
        .bind(request.has_insurance)
        .bind(request.paid_with_card)
        .bind(request.received_at)
        .bind(request.delivered_at)
        .bind(&request.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(piece)
    }

    pub async fn find_all(&self) -> Result<Vec<Piece>, RepositoryError> {
        let pieces = sqlx::query_as::<_, Piece>(&format!(
            "SELECT {PIECE_COLUMNS} FROM pieces ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(pieces)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Piece, RepositoryError> {
        sqlx::query_as::<_, Piece>(&format!(
            "SELECT {PIECE_COLUMNS} FROM pieces WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound("piece".to_string()))
    }

    /// Filtered search; every filter is optional and they compose with AND.
    pub async fn search(&self, filter: &PieceFilter) -> Result<Vec<Piece>, RepositoryError> {
        let mut builder: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new(format!("SELECT {PIECE_COLUMNS} FROM pieces WHERE 1 = 1"));

        if let Some(hospital_id) = filter.hospital_id {
            builder.push(" AND hospital_id = ").push_bind(hospital_id);
        }
        if let Some(doctor_id) = filter.doctor_id {
            builder.push(" AND doctor_id = ").push_bind(doctor_id);
        }
        if let Some(is_paid) = filter.is_paid {
            builder.push(" AND is_paid = ").push_bind(is_paid);
        }
        if let Some(patient_name) = &filter.patient_name {
            builder
                .push(" AND patient_name ILIKE ")
                .push_bind(format!("%{patient_name}%"));
        }
        if let Some(received_from) = filter.received_from {
            builder.push(" AND received_at >= ").push_bind(received_from);
        }
        if let Some(received_to) = filter.received_to {
            builder.push(" AND received_at <= ").push_bind(received_to);
        }

        builder.push(" ORDER BY id");

        let pieces = builder
            .build_query_as::<Piece>()
            .fetch_all(&self.pool)
            .await?;

        Ok(pieces)
    }

    pub async fn update(
        &self,
        id: i64,
        request: &CreatePieceRequest,
    ) -> Result<Piece, RepositoryError> {
        sqlx::query_as::<_, Piece>(&format!(
            "UPDATE pieces SET public_id = $2, hospital_id = $3, doctor_id = $4, \
                 patient_name = $5, patient_age = $6, patient_gender = $7, piece_type = $8, \
                 price_total = $9, price_paid = $10, is_paid = $11, has_invoice = $12, \
                 has_insurance = $13, paid_with_card = $14, received_at = $15, \
                 delivered_at = $16, description = $17, updated_at = NOW() \
             WHERE id = $1 RETURNING {PIECE_COLUMNS}"
        ))
        .bind(id)
        .bind(request.public_id)
        .bind(request.hospital_id)
        .bind(request.doctor_id)
        .bind(&request.patient_name)
        .bind(request.patient_age)
        .bind(&request.patient_gender)
        .bind(&request.piece_type)
        .bind(request.price_total)
        .bind(request.price_paid)
        .bind(request.is_paid)
        .bind(request.has_invoice)
        .bind(request.has_insurance)
        .bind(request.paid_with_card)
        .bind(request.received_at)
        .bind(request.delivered_at)
        .bind(&request.description)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound("piece".to_string()))
    }

    pub async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM pieces WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("piece".to_string()));
        }

        Ok(())
    }
}
