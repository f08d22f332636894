//! Batch status logger: job-state-change notification → structured log.
//!
//! This handler makes no outbound call. Every log line is tagged with the
//! delivery's event id (or a random tag when absent) so concurrent
//! invocations stay distinguishable in aggregated logs.

use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use crate::events::{DecodedData, EventEnvelope, PubsubEnvelope};
use crate::types::Result;

/// `POST /events/job-status`
pub async fn handle_job_status(Json(body): Json<Value>) -> Result<(StatusCode, String)> {
    let envelope = EventEnvelope::<PubsubEnvelope>::from_value(body)?;
    let tag = envelope
        .id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string()[..8].to_string());

    let span = tracing::info_span!("job_status", invocation = %tag);
    let _guard = span.enter();

    tracing::info!("batch job status logger triggered");

    // A notification with no message or payload is still worth acknowledging;
    // this path only observes, it never rejects deliveries it cannot use.
    let Some(message) = envelope.data.message else {
        tracing::warn!("no message found in the event payload; nothing to log");
        return Ok((StatusCode::OK, "ok".to_string()));
    };
    if message.data.is_none() {
        tracing::warn!("message has no data payload; nothing to log");
        return Ok((StatusCode::OK, "ok".to_string()));
    }

    match message.decode_data() {
        Ok(DecodedData::Object(map)) => {
            let pretty = serde_json::to_string_pretty(&Value::Object(map))
                .unwrap_or_else(|_| "<unprintable>".to_string());
            tracing::info!("parsed JSON notification:\n{}", pretty);
        }
        Ok(DecodedData::Scalar(raw)) | Ok(DecodedData::Unparsable(raw)) => {
            tracing::info!("notification text: {}", raw);
        }
        Err(err) => {
            tracing::warn!("could not decode notification payload: {}", err);
        }
    }

    if !message.attributes.is_empty() {
        tracing::info!("message attributes: {:?}", message.attributes);
    }

    tracing::info!("batch job status logger completed");
    Ok((StatusCode::OK, "ok".to_string()))
}
