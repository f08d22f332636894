//! The normalized job description and its builders.
//!
//! A `JobSpec` is created fresh per invocation, owned by the builder until it
//! is handed to the invoker, and dropped once the call returns. Builders apply
//! defaults and type coercion; they never mutate shared state.

use serde::Serialize;
use serde_json::Value;

use crate::events::pubsub::stringify_value;
use crate::types::{Error, Result, RuntimeConfig};

/// Fixed per-task CPU allocation (millicores).
pub const TASK_CPU_MILLI: i64 = 1000;

/// Fixed per-task memory allocation (MiB).
pub const TASK_MEMORY_MIB: i64 = 2048;

/// Substituted when `max_run_duration` is absent or unparsable.
pub const DEFAULT_MAX_RUN_DURATION_SECS: u64 = 3600;

/// Machine type used when the submission omits one.
pub const DEFAULT_MACHINE_TYPE: &str = "e2-standard-2";

/// A single container environment variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

impl EnvVar {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Build an ordered env-var list from key/value pairs.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Vec<Self> {
        pairs
            .into_iter()
            .map(|(name, value)| Self { name, value })
            .collect()
    }
}

/// Normalized target-job description.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSpec {
    /// Container image; `None` on the Cloud Run execution path, where the
    /// image comes from the pre-deployed job.
    pub image_uri: Option<String>,

    /// Container arguments, passed through verbatim (empty is valid).
    pub args: Vec<String>,

    /// Container environment variables in insertion order.
    pub env: Vec<EnvVar>,

    pub cpu_milli: i64,
    pub memory_mib: i64,
    pub machine_type: String,
    pub max_run_duration_secs: u64,

    /// Pub/Sub topic for job-state-change notifications, if configured.
    pub notification_topic: Option<String>,
}

impl JobSpec {
    /// Spec for executing a pre-deployed Cloud Run job: only env overrides
    /// (and optionally args) are sent, everything else keeps job defaults.
    pub fn run_overrides(env: Vec<EnvVar>) -> Self {
        Self {
            image_uri: None,
            args: Vec::new(),
            env,
            cpu_milli: TASK_CPU_MILLI,
            memory_mib: TASK_MEMORY_MIB,
            machine_type: DEFAULT_MACHINE_TYPE.to_string(),
            max_run_duration_secs: DEFAULT_MAX_RUN_DURATION_SECS,
            notification_topic: None,
        }
    }
}

/// Decoded fields of an HTTP batch submission body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmitRequest {
    pub job_name_prefix: Option<String>,
    pub docker_image_uri: Option<String>,
    pub java_app_args: Vec<String>,
    pub container_env_vars: Vec<EnvVar>,
    pub machine_type: Option<String>,
    pub max_run_duration: Option<String>,
}

impl SubmitRequest {
    /// Decode and type-check a submission body.
    ///
    /// Fields are decoded manually (rather than via derive) so that each type
    /// mismatch produces the exact message the trigger contract promises.
    pub fn from_value(body: &Value) -> Result<Self> {
        let object = body
            .as_object()
            .filter(|o| !o.is_empty())
            .ok_or_else(|| Error::validation("invalid JSON payload"))?;

        let string_field = |key: &str| -> Result<Option<String>> {
            match object.get(key) {
                None | Some(Value::Null) => Ok(None),
                Some(Value::String(s)) => Ok(Some(s.clone())),
                Some(_) => Err(Error::validation(format!("'{key}' must be a string"))),
            }
        };

        let java_app_args = match object.get("java_app_args") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    _ => Err(Error::validation("'java_app_args' must be a list of strings")),
                })
                .collect::<Result<Vec<_>>>()?,
            Some(_) => {
                return Err(Error::validation("'java_app_args' must be a list of strings"));
            }
        };

        // Values are coerced to string by direct stringification, not JSON
        // re-encoding; nested structures arrive as their JSON text.
        let container_env_vars = match object.get("container_env_vars") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Object(map)) => map
                .iter()
                .map(|(key, value)| EnvVar::new(key.clone(), stringify_value(value)))
                .collect(),
            Some(_) => {
                return Err(Error::validation("'container_env_vars' must be a dictionary"));
            }
        };

        Ok(Self {
            job_name_prefix: string_field("job_name_prefix")?,
            docker_image_uri: string_field("docker_image_uri")?,
            java_app_args,
            container_env_vars,
            machine_type: string_field("machine_type")?,
            max_run_duration: string_field("max_run_duration")?,
        })
    }

    /// Build the batch job spec, applying configuration defaults.
    pub fn into_spec(self, config: &RuntimeConfig) -> Result<JobSpec> {
        let image_uri = self
            .docker_image_uri
            .or_else(|| config.default_image_uri.clone())
            .ok_or_else(|| {
                Error::validation(
                    "docker image URI must be provided either in the request or as the configured default",
                )
            })?;

        let max_run_duration_secs = self
            .max_run_duration
            .as_deref()
            .map(parse_max_run_duration)
            .unwrap_or(DEFAULT_MAX_RUN_DURATION_SECS);

        Ok(JobSpec {
            image_uri: Some(image_uri),
            args: self.java_app_args,
            env: self.container_env_vars,
            cpu_milli: TASK_CPU_MILLI,
            memory_mib: TASK_MEMORY_MIB,
            machine_type: self
                .machine_type
                .unwrap_or_else(|| DEFAULT_MACHINE_TYPE.to_string()),
            max_run_duration_secs,
            notification_topic: config.notification_topic.clone(),
        })
    }
}

/// Parse a duration of the form `<integer>s` or a bare integer.
///
/// Any parse failure substitutes the default with a logged warning; this field
/// never fails a request.
pub fn parse_max_run_duration(raw: &str) -> u64 {
    let digits = raw.strip_suffix('s').unwrap_or(raw);
    match digits.parse::<u64>() {
        Ok(seconds) => seconds,
        Err(_) => {
            tracing::warn!(
                "invalid max_run_duration {:?}; using default {}s",
                raw,
                DEFAULT_MAX_RUN_DURATION_SECS
            );
            DEFAULT_MAX_RUN_DURATION_SECS
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn config_with_default_image() -> RuntimeConfig {
        RuntimeConfig {
            default_image_uri: Some("gcr.io/proj/worker:latest".to_string()),
            notification_topic: Some("projects/proj/topics/batch-events".to_string()),
            ..RuntimeConfig::default()
        }
    }

    #[test]
    fn duration_parses_suffixed_and_bare_integers() {
        assert_eq!(parse_max_run_duration("600s"), 600);
        assert_eq!(parse_max_run_duration("600"), 600);
    }

    #[test]
    fn duration_falls_back_on_garbage() {
        assert_eq!(parse_max_run_duration("abc"), 3600);
        assert_eq!(parse_max_run_duration(""), 3600);
        assert_eq!(parse_max_run_duration("-5"), 3600);
        assert_eq!(parse_max_run_duration("12m"), 3600);
    }

    #[test]
    fn decodes_full_submission() {
        let request = SubmitRequest::from_value(&json!({
            "job_name_prefix": "Nightly-Report-",
            "docker_image_uri": "gcr.io/proj/custom:1",
            "java_app_args": ["--mode", "full"],
            "container_env_vars": {"level": "debug", "threads": 4},
            "machine_type": "e2-standard-4",
            "max_run_duration": "1200s",
        }))
        .unwrap();

        assert_eq!(request.java_app_args, vec!["--mode", "full"]);
        assert_eq!(
            request.container_env_vars,
            vec![
                EnvVar::new("level", "debug"),
                EnvVar::new("threads", "4"),
            ]
        );

        let spec = request.into_spec(&config_with_default_image()).unwrap();
        assert_eq!(spec.image_uri.as_deref(), Some("gcr.io/proj/custom:1"));
        assert_eq!(spec.machine_type, "e2-standard-4");
        assert_eq!(spec.max_run_duration_secs, 1200);
        assert_eq!(spec.cpu_milli, TASK_CPU_MILLI);
        assert_eq!(spec.memory_mib, TASK_MEMORY_MIB);
        assert!(spec.notification_topic.is_some());
    }

    #[test]
    fn args_must_be_a_list_of_strings() {
        let err = SubmitRequest::from_value(&json!({"java_app_args": "--mode"})).unwrap_err();
        assert!(err.to_string().contains("java_app_args"));

        let err =
            SubmitRequest::from_value(&json!({"java_app_args": ["ok", 42]})).unwrap_err();
        assert!(err.to_string().contains("java_app_args"));
    }

    #[test]
    fn env_vars_must_be_a_mapping() {
        let err =
            SubmitRequest::from_value(&json!({"container_env_vars": ["A=1"]})).unwrap_err();
        assert!(err.to_string().contains("container_env_vars"));
    }

    #[test]
    fn empty_body_is_invalid() {
        assert!(SubmitRequest::from_value(&json!({})).is_err());
        assert!(SubmitRequest::from_value(&json!("text")).is_err());
    }

    #[test]
    fn image_defaults_from_config() {
        let request = SubmitRequest::from_value(&json!({"job_name_prefix": "x-"})).unwrap();
        let spec = request.into_spec(&config_with_default_image()).unwrap();
        assert_eq!(spec.image_uri.as_deref(), Some("gcr.io/proj/worker:latest"));
        assert!(spec.args.is_empty());
    }

    #[test]
    fn missing_image_everywhere_is_rejected() {
        let request = SubmitRequest::from_value(&json!({"job_name_prefix": "x-"})).unwrap();
        let err = request.into_spec(&RuntimeConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn run_overrides_carry_only_env() {
        let spec = JobSpec::run_overrides(vec![EnvVar::new("SOURCE_BUCKET", "b")]);
        assert!(spec.image_uri.is_none());
        assert!(spec.args.is_empty());
        assert_eq!(spec.env, vec![EnvVar::new("SOURCE_BUCKET", "b")]);
    }
}
