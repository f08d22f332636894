//! Jobrelay HTTP server - main entry point.
//!
//! Serves all 4 trigger boundaries:
//! - POST /events/storage: storage object event → Cloud Run job execution
//! - POST /events/pubsub: Pub/Sub message → Cloud Run job execution
//! - POST /jobs: HTTP submission → Cloud Batch job creation
//! - POST /events/job-status: Batch notification → structured log

use clap::Parser;
use std::sync::Arc;

use jobrelay::http::{router, AppState};
use jobrelay::jobs::HttpJobInvoker;
use jobrelay::RuntimeConfig;

#[derive(Parser, Debug)]
#[command(name = "jobrelay", about = "Event-to-job invocation translator")]
struct Args {
    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to bind (hosting runtimes inject PORT).
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize observability
    jobrelay::observability::init_tracing();

    // Resolve configuration once; handlers re-validate the subset their path
    // needs on every call.
    let config = RuntimeConfig::from_env();
    let state = AppState::new(config, Arc::new(HttpJobInvoker::new()));
    let app = router(state);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🚀 jobrelay listening on {}", addr);
    tracing::info!("  ✓ POST /events/storage: storage event → Cloud Run job");
    tracing::info!("  ✓ POST /events/pubsub: Pub/Sub message → Cloud Run job");
    tracing::info!("  ✓ POST /jobs: HTTP submission → Cloud Batch job");
    tracing::info!("  ✓ POST /events/job-status: Batch notification logger");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
