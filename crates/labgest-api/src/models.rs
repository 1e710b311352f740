//! Domain entity models
//!
//! Rows for the clinic/lab domain: users, profiles, hospitals, doctors,
//! pieces (lab work orders), and notifications. Request DTOs live next to
//! the entities they create.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Never serialized into API responses
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Profile associations, loaded separately from `user_profiles`
    #[sqlx(skip)]
    #[serde(default)]
    pub profiles: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[serde(default)]
    pub profiles: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default)]
    pub profiles: Option<Vec<i64>>,
}

/// Authorization profile; names are the scope strings embedded in tokens
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Profile {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProfileRequest {
    #[validate(length(min = 1))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Hospital {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateHospitalRequest {
    #[validate(length(min = 1))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Doctor {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateDoctorRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Lab work order
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Piece {
    pub id: i64,
    /// Client-facing order number, unique
    pub public_id: i64,
    pub hospital_id: i64,
    pub doctor_id: i64,
    pub patient_name: String,
    pub patient_age: i32,
    pub patient_gender: String,
    /// Which prosthetic piece this order is for
    pub piece_type: String,
    pub price_total: f64,
    pub price_paid: f64,
    pub is_paid: bool,
    pub has_invoice: bool,
    pub has_insurance: bool,
    pub paid_with_card: bool,
    pub received_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePieceRequest {
    pub public_id: i64,
    pub hospital_id: i64,
    pub doctor_id: i64,
    #[validate(length(min = 1))]
    pub patient_name: String,
    pub patient_age: i32,
    pub patient_gender: String,
    #[validate(length(min = 1))]
    pub piece_type: String,
    pub price_total: f64,
    #[serde(default)]
    pub price_paid: f64,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub has_invoice: bool,
    #[serde(default)]
    pub has_insurance: bool,
    #[serde(default)]
    pub paid_with_card: bool,
    pub received_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

/// Query filters for piece search
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PieceFilter {
    pub hospital_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub is_paid: Option<bool>,
    /// Substring match on the patient name
    pub patient_name: Option<String>,
    /// Received on or after
    pub received_from: Option<DateTime<Utc>>,
    /// Received on or before
    pub received_to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub message: String,
    pub seen: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateNotificationRequest {
    pub user_id: i64,
    #[validate(length(min = 1))]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serialization_hides_password_hash() {
        let user = User {
            id: 1,
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password_hash: "secret-hash".to_string(),
            profiles: vec![2],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&user).expect("serialize");
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("ana@example.com"));
    }

    #[test]
    fn test_create_piece_defaults() {
        let raw = r#"{
            "public_id": 1001,
            "hospital_id": 1,
            "doctor_id": 2,
            "patient_name": "Luis",
            "patient_age": 44,
            "patient_gender": "M",
            "piece_type": "crown",
            "price_total": 1200.0
        }"#;

        let request: CreatePieceRequest = serde_json::from_str(raw).expect("parse");
        assert!(!request.is_paid);
        assert_eq!(request.price_paid, 0.0);
        assert!(request.received_at.is_none());
    }
}
