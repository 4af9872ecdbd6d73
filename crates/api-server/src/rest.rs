//! REST API handlers for campaign runs and operational endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use campaign_core::error::CampaignError;
use campaign_core::types::{CampaignRunRequest, CampaignRunResponse};
use campaign_workflow::CampaignRunner;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use utoipa::ToSchema;

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub runner: Arc<CampaignRunner>,
    pub node_id: String,
    pub start_time: Instant,
}

/// POST /v1/campaigns/run — Run one campaign batch.
#[utoipa::path(
    post,
    path = "/v1/campaigns/run",
    tag = "Campaigns",
    request_body = CampaignRunRequest,
    responses(
        (status = 200, description = "Batch completed", body = CampaignRunResponse),
        (status = 400, description = "Request rejected before processing", body = ErrorResponse),
        (status = 500, description = "Batch aborted", body = ErrorResponse),
    )
)]
pub async fn handle_run_campaign(
    State(state): State<AppState>,
    Json(request): Json<CampaignRunRequest>,
) -> Result<Json<CampaignRunResponse>, (StatusCode, Json<ErrorResponse>)> {
    info!(
        mode = ?request.mode,
        customer_count = request.customer_count,
        "Campaign run requested"
    );

    match state.runner.run(&request).await {
        Ok(response) => Ok(Json(response)),
        Err(CampaignError::InvalidInput(msg)) => {
            warn!(error = %msg, "Campaign request validation failed");
            metrics::counter!("api.validation_errors").increment(1);
            Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "invalid_campaign_request".to_string(),
                    message: msg,
                }),
            ))
        }
        Err(e) => {
            error!(error = %e, "Campaign run failed");
            metrics::counter!("api.errors").increment(1);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "campaign_run_failed".to_string(),
                    message: e.to_string(),
                }),
            ))
        }
    }
}

/// GET /health — Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Operations",
    responses((status = 200, description = "Service is healthy", body = HealthResponse))
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        node_id: state.node_id.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        memory_entries: state.runner.memory().len(),
    })
}

/// GET /ready — Readiness probe.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "Operations",
    responses((status = 200, description = "Ready to accept traffic"))
)]
pub async fn readiness() -> StatusCode {
    StatusCode::OK
}

/// GET /live — Liveness probe.
#[utoipa::path(
    get,
    path = "/live",
    tag = "Operations",
    responses((status = 200, description = "Process is alive"))
)]
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub node_id: String,
    pub uptime_secs: u64,
    pub memory_entries: usize,
}
