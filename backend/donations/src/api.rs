//! Axum REST API — router, shared state, and handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    http::{header::CONTENT_TYPE, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::db::{self, ClaimOutcome};
use crate::distance::DistanceEstimator;
use crate::errors::{Result, ServiceError};
use crate::models::{CreateDonationRequest, Donation};

#[derive(Clone)]
pub struct ApiState {
    pub pool: SqlitePool,
    pub distance: Arc<dyn DistanceEstimator>,
}

/// Build the application router with CORS restricted to `cors_origin`.
pub fn router(state: Arc<ApiState>, cors_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .route("/api/donations", get(list_donations).post(create_donation))
        .route("/api/donations/:id/claim", patch(claim_donation))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct CreatedResponse {
    pub message: &'static str,
    pub data: Donation,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /api/donations`
pub async fn list_donations(State(state): State<Arc<ApiState>>) -> Result<Json<Vec<Donation>>> {
    Ok(Json(db::list_donations(&state.pool).await?))
}

/// `POST /api/donations`
///
/// Records a donor's submission as a new pending donation.
pub async fn create_donation(
    State(state): State<Arc<ApiState>>,
    payload: std::result::Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<impl IntoResponse> {
    // Only a JSON object is a submission; arrays and scalars are rejected here.
    let Json(body) = payload.map_err(|rejection| {
        debug!("Rejected donation payload: {rejection}");
        ServiceError::Validation("Missing required data".to_string())
    })?;
    let request = CreateDonationRequest::try_from(body)?;

    let new = request.into_new_donation(state.distance.as_ref())?;

    let donation = db::insert_donation(&state.pool, &new).await.map_err(|e| {
        error!("Database error: {e}");
        ServiceError::Persistence("Failed to save donation to database")
    })?;
    info!("Added donation ID {}", donation.id);

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Donation successfully recorded",
            data: donation,
        }),
    ))
}

/// `PATCH /api/donations/:id/claim`
///
/// Reserves a pending donation for a receiver. Only the confirmation message
/// is returned, not the updated donation.
pub async fn claim_donation(
    State(state): State<Arc<ApiState>>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>> {
    // Ids are integers; anything else cannot name a donation.
    let Path(id) = id.map_err(|_| ServiceError::NotFound)?;

    let outcome = db::claim_donation(&state.pool, id).await.map_err(|e| {
        error!("Database error during claim: {e}");
        ServiceError::Persistence("Failed to update donation status")
    })?;

    match outcome {
        ClaimOutcome::Claimed => {
            info!("Donation ID {id} status updated to claimed");
            Ok(Json(MessageResponse {
                message: format!("Donation {id} claimed successfully"),
            }))
        }
        ClaimOutcome::NotFound => Err(ServiceError::NotFound),
        ClaimOutcome::NotPending(status) => Err(ServiceError::Conflict { id, status }),
    }
}
