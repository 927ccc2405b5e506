//! Application-wide error types and their HTTP representation.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::DonationStatus;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Incomplete or malformed client input.
    #[error("{0}")]
    Validation(String),

    #[error("Donation not found")]
    NotFound,

    /// A claim against a donation that is no longer pending.
    #[error("Donation {id} is already {status}")]
    Conflict { id: i64, status: DonationStatus },

    /// A mutation failed to commit and was rolled back.
    #[error("{0}")]
    Persistence(&'static str),
}

pub type Result<T> = std::result::Result<T, ServiceError>;

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ServiceError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, json!({ "error": msg }))
            }
            ServiceError::NotFound => {
                (StatusCode::NOT_FOUND, json!({ "error": self.to_string() }))
            }
            // Conflicts report under `message`, which is how clients tell them
            // apart from validation failures.
            ServiceError::Conflict { .. } => {
                (StatusCode::BAD_REQUEST, json!({ "message": self.to_string() }))
            }
            ServiceError::Persistence(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": msg }),
            ),
            ServiceError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Database error" }),
                )
            }
            ServiceError::Migrate(_) | ServiceError::Config(_) => {
                tracing::error!("{self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
