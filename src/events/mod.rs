//! Event decoding — trigger-source envelopes to validated job inputs.
//!
//! Each trigger source delivers an outer envelope (CloudEvent-style `id`,
//! `type`, `data`) wrapping a source-specific payload. Decoding extracts and
//! validates the fields the job builders need; absence of a required sub-field
//! is a validation error, never a panic.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::types::{Error, Result};

pub mod pubsub;
pub mod storage;

pub use pubsub::{DecodedData, PubsubEnvelope, PubsubMessage, RAW_DATA_KEY};
pub use storage::{StorageObject, StorageObjectEvent};

/// Outer wrapper delivered by a trigger source, distinct from the application
/// payload it carries.
#[derive(Debug, Clone, Deserialize)]
pub struct EventEnvelope<T> {
    /// Delivery-unique event id (used as a log correlation tag).
    #[serde(default)]
    pub id: Option<String>,

    /// Event type, e.g. `google.cloud.storage.object.v1.finalized`.
    #[serde(default, rename = "type")]
    pub event_type: Option<String>,

    /// Source-specific payload.
    pub data: T,
}

impl<T: DeserializeOwned> EventEnvelope<T> {
    /// Decode an envelope from a raw JSON body.
    ///
    /// Structural mismatches (missing `data`, wrong payload shape) are the
    /// caller's fault and surface as validation errors.
    pub fn from_value(body: serde_json::Value) -> Result<Self> {
        serde_json::from_value(body)
            .map_err(|e| Error::validation(format!("invalid event envelope: {e}")))
    }
}
