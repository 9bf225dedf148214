//! HTTP handlers for the monitor API
//!
//! Provides the REST surface over the decision engine:
//! - POST /api/v1/monitor - evaluate one message
//! - GET  /health         - load balancer health probe

use crate::engine::{DecisionEngine, RiskAssessment};
use crate::error::Error;
use crate::risk::RiskLevel;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared state for monitor handlers
#[derive(Clone)]
pub struct MonitorState {
    pub engine: Arc<DecisionEngine>,
}

/// Create the monitor router
pub fn monitor_router(state: MonitorState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .route("/api/v1/monitor", post(monitor))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// Request / Response types
// =============================================================================

/// Request body for the monitor endpoint
#[derive(Debug, Deserialize)]
pub struct MonitorRequest {
    pub message_text: String,
    pub sender_role: String,
}

/// Response payload with the full risk assessment
#[derive(Debug, Serialize)]
pub struct MonitorResponse {
    pub pii_detection: PiiDetectionBody,
    pub toxicity_detection: ToxicityDetectionBody,
    pub final_risk_level: RiskLevel,
    pub severity_score: u8,
    pub recommended_action: String,
    pub should_flag: bool,
    pub processing_time_ms: u64,
}

/// PII sub-object of the monitor response
#[derive(Debug, Serialize)]
pub struct PiiDetectionBody {
    pub has_pii: bool,
    pub pii_types: Vec<String>,
    pub risk_level: RiskLevel,
    pub explanation: String,
}

/// Toxicity sub-object of the monitor response
#[derive(Debug, Serialize)]
pub struct ToxicityDetectionBody {
    pub is_toxic: bool,
    pub toxicity_types: Vec<String>,
    pub risk_level: RiskLevel,
    pub explanation: String,
}

impl From<RiskAssessment> for MonitorResponse {
    fn from(assessment: RiskAssessment) -> Self {
        Self {
            pii_detection: PiiDetectionBody {
                has_pii: assessment.pii.flagged,
                pii_types: assessment.pii.categories,
                risk_level: assessment.pii.risk_level,
                explanation: assessment.pii.explanation,
            },
            toxicity_detection: ToxicityDetectionBody {
                is_toxic: assessment.toxicity.flagged,
                toxicity_types: assessment.toxicity.categories,
                risk_level: assessment.toxicity.risk_level,
                explanation: assessment.toxicity.explanation,
            },
            final_risk_level: assessment.final_risk_level,
            severity_score: assessment.severity_score,
            recommended_action: assessment.recommended_action,
            should_flag: assessment.should_flag,
            processing_time_ms: assessment.processing_time_ms,
        }
    }
}

/// API error envelope
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

/// API error detail
#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: "BAD_REQUEST".to_string(),
                message: message.into(),
            },
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: "INTERNAL_ERROR".to_string(),
                message: message.into(),
            },
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /api/v1/monitor - evaluate one workplace message
async fn monitor(
    State(state): State<MonitorState>,
    Json(request): Json<MonitorRequest>,
) -> impl IntoResponse {
    match state
        .engine
        .evaluate(&request.message_text, &request.sender_role)
        .await
    {
        Ok(assessment) => {
            let response: MonitorResponse = assessment.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(Error::InvalidInput(message)) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError::bad_request(message)),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::internal(e.to_string())),
        )
            .into_response(),
    }
}

/// GET /health - health probe
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
