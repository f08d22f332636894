//! Pub/Sub event handler: queue message → Cloud Run job execution.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use crate::events::{EventEnvelope, PubsubEnvelope};
use crate::http::AppState;
use crate::jobs::{EnvVar, JobSpec};
use crate::types::Result;

/// `POST /events/pubsub`
///
/// Decodes the message payload (JSON object → upper-cased env vars; anything
/// else → a single `PUBSUB_MESSAGE_RAW_DATA` var) and requests an execution of
/// the configured Cloud Run job with those overrides.
pub async fn handle_pubsub_event(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, String)> {
    let envelope = EventEnvelope::<PubsubEnvelope>::from_value(body)?;
    let event_id = envelope.id.clone().unwrap_or_default();
    let message = envelope.data.into_message()?;

    let decoded = message.decode_data()?;
    tracing::info!(
        event_id = %event_id,
        message_id = message.message_id.as_deref().unwrap_or(""),
        publish_time = message.publish_time.as_deref().unwrap_or(""),
        "Pub/Sub event received"
    );

    let parameters = decoded.into_job_parameters();
    tracing::info!(
        "passing {} environment variable(s) to the job: {:?}",
        parameters.len(),
        parameters.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>()
    );

    let target = state.config.run_target()?;
    let spec = JobSpec::run_overrides(EnvVar::from_pairs(parameters));

    let handle = state.invoker.run_job(&target, &spec).await?;
    tracing::info!(
        operation = %handle.name,
        "triggered Cloud Run job '{}' with data from Pub/Sub",
        target.job_name
    );

    Ok((
        StatusCode::OK,
        "Cloud Run Job triggered successfully from Pub/Sub.".to_string(),
    ))
}
