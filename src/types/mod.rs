//! Core types for the translator.
//!
//! This module provides foundational types used throughout the system:
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Operational parameters resolved from the environment

mod config;
mod errors;

pub use config::{
    BatchTarget, RunJobTarget, RuntimeConfig, ENV_DEFAULT_IMAGE, ENV_NOTIFICATION_TOPIC,
    ENV_PROJECT_ID, ENV_REGION, ENV_RUN_JOB_NAME, ENV_SERVICE_ACCOUNT,
};
pub use errors::{Error, Result};
