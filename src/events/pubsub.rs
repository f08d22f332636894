//! Pub/Sub message envelope decoding.
//!
//! Payload decoding is two-staged: base64 → UTF-8 text must succeed (hard
//! validation error otherwise), then a JSON parse is attempted with a
//! raw-string fallback. The outcome is an explicit tagged result rather than
//! exception-driven control flow:
//!
//!   JSON object       → Object(map)       → upper-cased key/value parameters
//!   other valid JSON  → Scalar(raw text)  → single PUBSUB_MESSAGE_RAW_DATA
//!   not JSON          → Unparsable(text)  → single PUBSUB_MESSAGE_RAW_DATA
//!
//! The raw-text fallback is a deliberate degrade-gracefully policy, not an
//! error.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::types::{Error, Result};

/// Well-known parameter key used when the payload is not a JSON object.
pub const RAW_DATA_KEY: &str = "PUBSUB_MESSAGE_RAW_DATA";

/// Pub/Sub push envelope: `{ "message": { "data": ..., "attributes": ... } }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PubsubEnvelope {
    #[serde(default)]
    pub message: Option<PubsubMessage>,

    #[serde(default)]
    pub subscription: Option<String>,
}

/// Inner Pub/Sub message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PubsubMessage {
    /// Base64-encoded payload.
    #[serde(default)]
    pub data: Option<String>,

    #[serde(default)]
    pub attributes: HashMap<String, String>,

    #[serde(default, rename = "messageId")]
    pub message_id: Option<String>,

    #[serde(default, rename = "publishTime")]
    pub publish_time: Option<String>,
}

impl PubsubEnvelope {
    /// Extract the inner message, rejecting envelopes without one.
    pub fn into_message(self) -> Result<PubsubMessage> {
        self.message
            .ok_or_else(|| Error::validation("no message found in the event payload"))
    }
}

impl PubsubMessage {
    /// Decode the base64 payload into a tagged result.
    ///
    /// A missing `data` field, invalid base64, or non-UTF-8 bytes are hard
    /// validation errors; anything decodable as text succeeds.
    pub fn decode_data(&self) -> Result<DecodedData> {
        let data = self
            .data
            .as_deref()
            .ok_or_else(|| Error::validation("missing 'data' field in Pub/Sub message"))?;
        decode_data(data)
    }
}

/// Tagged outcome of payload interpretation.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedData {
    /// The payload parsed as a JSON object.
    Object(serde_json::Map<String, Value>),

    /// Valid JSON, but not a key-value mapping (bare array or scalar).
    /// The raw text is retained for the fallback parameter.
    Scalar(String),

    /// Not JSON at all; raw decoded text.
    Unparsable(String),
}

/// Decode a base64 payload: stage (a) base64 + UTF-8, stage (b) JSON attempt.
pub fn decode_data(data_b64: &str) -> Result<DecodedData> {
    let bytes = BASE64
        .decode(data_b64)
        .map_err(|e| Error::validation(format!("message data is not valid base64: {e}")))?;
    let text = String::from_utf8(bytes)
        .map_err(|e| Error::validation(format!("message data is not valid UTF-8: {e}")))?;

    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(map)) => Ok(DecodedData::Object(map)),
        Ok(_) => Ok(DecodedData::Scalar(text)),
        Err(_) => Ok(DecodedData::Unparsable(text)),
    }
}

impl DecodedData {
    /// Single dispatch point: decoded payload → ordered job parameters.
    ///
    /// Object payloads become (UPPER_CASED_KEY, stringified value) pairs;
    /// everything else collapses to a single raw-data parameter.
    pub fn into_job_parameters(self) -> Vec<(String, String)> {
        match self {
            DecodedData::Object(map) => map
                .into_iter()
                .map(|(key, value)| (key.to_uppercase(), stringify_value(&value)))
                .collect(),
            DecodedData::Scalar(raw) | DecodedData::Unparsable(raw) => {
                vec![(RAW_DATA_KEY.to_string(), raw)]
            }
        }
    }
}

/// Coerce a JSON value to its environment-variable string form.
///
/// Strings pass through unquoted; every other value stringifies to its JSON
/// text. Nested structures therefore arrive as JSON text — a known lossy edge
/// callers must avoid.
pub fn stringify_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn encode(text: &str) -> String {
        BASE64.encode(text)
    }

    #[test]
    fn json_object_payload_becomes_uppercased_parameters() {
        let decoded = decode_data(&encode(r#"{"foo":"bar","count":3}"#)).unwrap();
        let mut params = decoded.into_job_parameters();
        params.sort();
        assert_eq!(
            params,
            vec![
                ("COUNT".to_string(), "3".to_string()),
                ("FOO".to_string(), "bar".to_string()),
            ]
        );
    }

    #[test]
    fn plain_text_payload_falls_back_to_raw_key() {
        let decoded = decode_data(&encode("hello world")).unwrap();
        assert_eq!(decoded, DecodedData::Unparsable("hello world".to_string()));
        assert_eq!(
            decoded.into_job_parameters(),
            vec![(RAW_DATA_KEY.to_string(), "hello world".to_string())]
        );
    }

    #[test]
    fn bare_array_payload_falls_back_to_raw_key() {
        let decoded = decode_data(&encode(r#"[1,2,3]"#)).unwrap();
        assert_eq!(decoded, DecodedData::Scalar("[1,2,3]".to_string()));
        assert_eq!(
            decoded.into_job_parameters(),
            vec![(RAW_DATA_KEY.to_string(), "[1,2,3]".to_string())]
        );
    }

    #[test]
    fn invalid_base64_is_a_hard_error() {
        assert!(matches!(
            decode_data("!!not-base64!!"),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn non_utf8_bytes_are_a_hard_error() {
        let data = BASE64.encode([0xff, 0xfe, 0xfd]);
        assert!(matches!(decode_data(&data), Err(Error::Validation(_))));
    }

    #[test]
    fn envelope_without_message_is_rejected() {
        let envelope: PubsubEnvelope = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(matches!(
            envelope.into_message(),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn missing_data_field_is_rejected() {
        let message = PubsubMessage::default();
        assert!(matches!(message.decode_data(), Err(Error::Validation(_))));
    }

    #[test]
    fn stringify_keeps_strings_unquoted() {
        assert_eq!(stringify_value(&Value::String("bar".into())), "bar");
        assert_eq!(stringify_value(&serde_json::json!(42)), "42");
        assert_eq!(stringify_value(&serde_json::json!(true)), "true");
        assert_eq!(
            stringify_value(&serde_json::json!({"a": 1})),
            r#"{"a":1}"#
        );
    }
}
