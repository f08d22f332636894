//! Storage object event decoding.
//!
//! A storage-object-created event must carry a non-empty bucket and object
//! name; everything else (metageneration, timestamps) is passed through as
//! opaque metadata for logging.

use serde::Deserialize;

use crate::types::{Error, Result};

/// Raw storage event payload as delivered by the trigger source.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageObjectEvent {
    #[serde(default)]
    pub bucket: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub metageneration: Option<serde_json::Value>,

    #[serde(default, rename = "timeCreated")]
    pub time_created: Option<String>,

    #[serde(default)]
    pub updated: Option<String>,
}

/// Validated storage object reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageObject {
    pub bucket: String,
    pub object: String,
    pub metageneration: Option<String>,
    pub time_created: Option<String>,
    pub updated: Option<String>,
}

impl StorageObjectEvent {
    /// Validate required fields and produce the decoded object reference.
    pub fn decode(self) -> Result<StorageObject> {
        let bucket = self
            .bucket
            .filter(|b| !b.is_empty())
            .ok_or_else(|| Error::validation("missing bucket name in event payload"))?;
        let object = self
            .name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| Error::validation("missing object name in event payload"))?;

        // Metageneration arrives as a string or number depending on the
        // delivery path; both flatten to opaque text.
        let metageneration = self.metageneration.map(|v| match v {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        });

        Ok(StorageObject {
            bucket,
            object,
            metageneration,
            time_created: self.time_created,
            updated: self.updated,
        })
    }
}

impl StorageObject {
    /// `gs://bucket/object` form used in log lines.
    pub fn uri(&self) -> String {
        format!("gs://{}/{}", self.bucket, self.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(value: serde_json::Value) -> StorageObjectEvent {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn decodes_well_formed_event() {
        let object = event(json!({
            "bucket": "incoming",
            "name": "reports/2024/q1.csv",
            "metageneration": "1",
            "timeCreated": "2024-03-01T00:00:00Z",
            "updated": "2024-03-01T00:00:00Z",
        }))
        .decode()
        .unwrap();

        assert_eq!(object.bucket, "incoming");
        assert_eq!(object.object, "reports/2024/q1.csv");
        assert_eq!(object.metageneration.as_deref(), Some("1"));
        assert_eq!(object.uri(), "gs://incoming/reports/2024/q1.csv");
    }

    #[test]
    fn numeric_metageneration_flattens_to_text() {
        let object = event(json!({"bucket": "b", "name": "o", "metageneration": 3}))
            .decode()
            .unwrap();
        assert_eq!(object.metageneration.as_deref(), Some("3"));
    }

    #[test]
    fn missing_bucket_is_rejected() {
        let result = event(json!({"name": "o"})).decode();
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn empty_object_name_is_rejected() {
        let result = event(json!({"bucket": "b", "name": ""})).decode();
        assert!(matches!(result, Err(Error::Validation(_))));
    }
}
