//! # Jobrelay - Event-to-Job Invocation Translator
//!
//! Stateless handlers that react to storage events, Pub/Sub messages, and
//! HTTP submissions by starting managed compute jobs:
//! - Storage object events and Pub/Sub messages trigger executions of a
//!   pre-deployed Cloud Run job, with event data injected as container
//!   environment overrides
//! - HTTP submissions create Cloud Batch jobs (synthesized job id, container
//!   image/args/env, fixed resource shape, optional Pub/Sub notifications)
//! - Batch job-state-change notifications are decoded and logged
//!
//! ## Architecture
//!
//! ```text
//!   trigger boundary (axum)
//!        │
//!        ▼
//!   Event Decoder ──► Job Request Builder ──► Job Invoker (reqwest)
//!        │                    ▲                    │
//!        └── validation       └── RuntimeConfig    └── Cloud Run / Batch API
//! ```
//!
//! Invocations are fully independent: no shared mutable state is written,
//! only the immutable resolved configuration is read. Each failure is
//! reported once; redelivery is the trigger source's responsibility.

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

// Re-export public API
pub mod events;
pub mod http;
pub mod jobs;
pub mod types;

// Internal utilities
pub mod observability;

pub use types::{Error, Result, RuntimeConfig};
