//! HTTP transport adapters.
//!
//! One route per trigger boundary:
//! - `POST /events/storage`    storage-object event → Cloud Run job execution
//! - `POST /events/pubsub`     Pub/Sub message → Cloud Run job execution
//! - `POST /jobs`              HTTP submission → Cloud Batch job creation
//! - `POST /events/job-status` Batch notification → structured log, no call
//!
//! Routes accept only POST; axum answers other methods with 405. Bodies are
//! extracted as raw JSON and decoded manually so malformed input surfaces as
//! 400 with a contract-specified message instead of the extractor's 422.

use axum::routing::post;
use axum::Router;
use std::fmt;
use std::sync::Arc;

use crate::jobs::JobInvoker;
use crate::types::RuntimeConfig;

pub mod pubsub;
pub mod status;
pub mod storage;
pub mod submit;

/// Shared handler state: the immutable resolved configuration and the job
/// invoker boundary (swappable in tests).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RuntimeConfig>,
    pub invoker: Arc<dyn JobInvoker>,
}

impl AppState {
    pub fn new(config: RuntimeConfig, invoker: Arc<dyn JobInvoker>) -> Self {
        Self {
            config: Arc::new(config),
            invoker,
        }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/events/storage", post(storage::handle_storage_event))
        .route("/events/pubsub", post(pubsub::handle_pubsub_event))
        .route("/events/job-status", post(status::handle_job_status))
        .route("/jobs", post(submit::handle_submit))
        .with_state(state)
}
