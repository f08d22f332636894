//! Storage event handler: object-created event → Cloud Run job execution.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use crate::events::{EventEnvelope, StorageObjectEvent};
use crate::http::AppState;
use crate::jobs::{EnvVar, JobSpec};
use crate::types::Result;

/// `POST /events/storage`
///
/// Validates the event, resolves the Cloud Run target from configuration, and
/// requests an execution with `SOURCE_BUCKET`/`SOURCE_OBJECT` injected as
/// container environment overrides. Returns without waiting for the job.
pub async fn handle_storage_event(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, String)> {
    let envelope = EventEnvelope::<StorageObjectEvent>::from_value(body)?;
    let object = envelope.data.decode()?;

    tracing::info!(
        event_id = envelope.id.as_deref().unwrap_or(""),
        event_type = envelope.event_type.as_deref().unwrap_or(""),
        bucket = %object.bucket,
        object = %object.object,
        "storage event received"
    );
    tracing::debug!(
        metageneration = object.metageneration.as_deref().unwrap_or(""),
        created = object.time_created.as_deref().unwrap_or(""),
        updated = object.updated.as_deref().unwrap_or(""),
        "storage object metadata"
    );

    let target = state.config.run_target()?;

    let spec = JobSpec::run_overrides(vec![
        EnvVar::new("SOURCE_BUCKET", object.bucket.clone()),
        EnvVar::new("SOURCE_OBJECT", object.object.clone()),
    ]);

    let handle = state.invoker.run_job(&target, &spec).await?;
    tracing::info!(
        operation = %handle.name,
        "triggered Cloud Run job '{}' for '{}'",
        target.job_name,
        object.uri()
    );

    Ok((
        StatusCode::OK,
        "Cloud Run Job triggered successfully.".to_string(),
    ))
}
