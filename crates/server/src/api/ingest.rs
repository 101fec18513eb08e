//! Mail ingestion trigger.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use mailpipe_ingest::spawn_ingestion_job;

use crate::state::AppState;

use super::{api_error, ApiError, ErrorResponse};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngestRequest {
    pub access_token: String,
    pub owner_id: String,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngestAccepted {
    pub job_id: String,
    pub status: String,
}

/// Schedule a background mail ingestion
///
/// Returns as soon as the job is scheduled. The job's outcome is never reported
/// back on this channel; it is only visible in the server logs and the
/// ingestion job log.
#[utoipa::path(
    post,
    path = "/ingest",
    tag = "Ingestion",
    request_body = IngestRequest,
    responses(
        (status = 202, description = "Job scheduled", body = IngestAccepted),
        (status = 400, description = "Missing access token or owner id", body = ErrorResponse)
    )
)]
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IngestRequest>,
) -> Result<(StatusCode, Json<IngestAccepted>), ApiError> {
    if req.access_token.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "accessToken is required"));
    }
    if req.owner_id.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "ownerId is required"));
    }

    let owner_id = req.owner_id.clone();
    let job_id = spawn_ingestion_job(state.ingestion.clone(), req.access_token, req.owner_id);
    info!(job_id = %job_id, owner_id = %owner_id, "ingestion job scheduled");

    Ok((
        StatusCode::ACCEPTED,
        Json(IngestAccepted {
            job_id: job_id.to_string(),
            status: "scheduled".to_string(),
        }),
    ))
}
