//! Batch submission handler: HTTP POST → Cloud Batch job creation.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::http::AppState;
use crate::jobs::name::{self, DEFAULT_PREFIX};
use crate::jobs::SubmitRequest;
use crate::types::{Error, Result};

/// Success body for a batch submission.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub message: String,
    /// Fully-qualified resource name reported by the Batch API.
    pub job_name: String,
    /// Synthesized job identifier the job was created under.
    pub job_id: String,
    pub notifications_configured: bool,
}

/// `POST /jobs`
///
/// Validates the submission, synthesizes a job id, builds the batch spec with
/// configuration defaults, and creates the job. 201 on success; 405 for
/// non-POST comes from method routing.
pub async fn handle_submit(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<SubmitResponse>)> {
    if body.as_object().map_or(true, |o| o.is_empty()) {
        return Err(Error::validation("invalid JSON payload"));
    }
    tracing::info!("received request to submit batch job");

    // Configuration completeness is checked before the request fields so an
    // operator mistake is never misreported as a caller mistake.
    let target = state.config.batch_target()?;

    let request = SubmitRequest::from_value(&body)?;
    let prefix = request.job_name_prefix.clone();
    let job_id = name::synthesize(prefix.as_deref().unwrap_or(DEFAULT_PREFIX));

    let spec = request.into_spec(&state.config)?;
    let notifications_configured = spec.notification_topic.is_some();
    if let Some(topic) = &spec.notification_topic {
        tracing::info!("configuring job notifications to Pub/Sub topic: {}", topic);
    }

    let handle = state.invoker.create_batch_job(&target, &job_id, &spec).await?;
    tracing::info!(job_id = %job_id, job_name = %handle.name, "created Cloud Batch job");

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            message: "Cloud Batch job created successfully.".to_string(),
            job_name: handle.name,
            job_id,
            notifications_configured,
        }),
    ))
}
