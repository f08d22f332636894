//! Configuration structures.
//!
//! Configuration is resolved from environment variables once at startup and
//! passed explicitly into every handler; nothing reads the environment
//! mid-request. Absence of a mandatory key is a terminal error for the call
//! that needs it, not for the process, so resolution into per-path targets
//! happens per invocation.

use crate::types::{Error, Result};

/// Recognized environment keys.
pub const ENV_PROJECT_ID: &str = "GCP_PROJECT_ID";
pub const ENV_REGION: &str = "GCP_REGION";
pub const ENV_RUN_JOB_NAME: &str = "CLOUD_RUN_JOB_NAME";
pub const ENV_DEFAULT_IMAGE: &str = "DEFAULT_DOCKER_IMAGE_URI";
pub const ENV_SERVICE_ACCOUNT: &str = "BATCH_JOB_SERVICE_ACCOUNT";
pub const ENV_NOTIFICATION_TOPIC: &str = "BATCH_JOB_NOTIFICATION_TOPIC";

/// Operational parameters resolved at startup.
///
/// Every field is optional at load time; [`run_target`](Self::run_target) and
/// [`batch_target`](Self::batch_target) enforce the subset each execution path
/// actually requires.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// Project hosting the target jobs.
    pub project_id: Option<String>,

    /// Region the jobs run in.
    pub region: Option<String>,

    /// Short name of the pre-deployed Cloud Run job (event-triggered paths).
    pub run_job_name: Option<String>,

    /// Fallback container image for batch submissions that omit one.
    pub default_image_uri: Option<String>,

    /// Service account batch jobs run as.
    pub service_account: Option<String>,

    /// Pub/Sub topic for job-state-change notifications (optional).
    pub notification_topic: Option<String>,
}

impl RuntimeConfig {
    /// Resolve configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration through an arbitrary key lookup (test seam).
    ///
    /// Empty values are treated as absent.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        Self {
            project_id: get(ENV_PROJECT_ID),
            region: get(ENV_REGION),
            run_job_name: get(ENV_RUN_JOB_NAME),
            default_image_uri: get(ENV_DEFAULT_IMAGE),
            service_account: get(ENV_SERVICE_ACCOUNT),
            notification_topic: get(ENV_NOTIFICATION_TOPIC),
        }
    }

    /// Resolve the Cloud Run execution target (storage and Pub/Sub paths).
    ///
    /// Requires project, region, and the Cloud Run job name; the returned
    /// error names every missing key.
    pub fn run_target(&self) -> Result<RunJobTarget> {
        let mut missing = Vec::new();
        if self.project_id.is_none() {
            missing.push(ENV_PROJECT_ID);
        }
        if self.region.is_none() {
            missing.push(ENV_REGION);
        }
        if self.run_job_name.is_none() {
            missing.push(ENV_RUN_JOB_NAME);
        }
        if !missing.is_empty() {
            return Err(Error::config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }
        Ok(RunJobTarget {
            project_id: self.project_id.clone().unwrap_or_default(),
            region: self.region.clone().unwrap_or_default(),
            job_name: self.run_job_name.clone().unwrap_or_default(),
        })
    }

    /// Resolve the Cloud Batch submission target (HTTP path).
    ///
    /// Requires project, region, the default image, and the batch service
    /// account — the default image is mandatory even when the request
    /// supplies its own image, so a partially configured deployment fails
    /// loudly instead of working only for some requests. The notification
    /// topic degrades to "none" with a warning.
    pub fn batch_target(&self) -> Result<BatchTarget> {
        let mut missing = Vec::new();
        if self.project_id.is_none() {
            missing.push(ENV_PROJECT_ID);
        }
        if self.region.is_none() {
            missing.push(ENV_REGION);
        }
        if self.default_image_uri.is_none() {
            missing.push(ENV_DEFAULT_IMAGE);
        }
        if self.service_account.is_none() {
            missing.push(ENV_SERVICE_ACCOUNT);
        }
        if !missing.is_empty() {
            return Err(Error::config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }
        if self.notification_topic.is_none() {
            tracing::warn!(
                "{} is not set; job notifications will not be configured",
                ENV_NOTIFICATION_TOPIC
            );
        }
        Ok(BatchTarget {
            project_id: self.project_id.clone().unwrap_or_default(),
            region: self.region.clone().unwrap_or_default(),
            service_account: self.service_account.clone().unwrap_or_default(),
            notification_topic: self.notification_topic.clone(),
        })
    }
}

/// Fully-resolved target for running a pre-deployed Cloud Run job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunJobTarget {
    pub project_id: String,
    pub region: String,
    pub job_name: String,
}

impl RunJobTarget {
    /// Fully-qualified job resource path.
    pub fn job_path(&self) -> String {
        format!(
            "projects/{}/locations/{}/jobs/{}",
            self.project_id, self.region, self.job_name
        )
    }
}

/// Fully-resolved target for creating a Cloud Batch job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchTarget {
    pub project_id: String,
    pub region: String,
    pub service_account: String,
    pub notification_topic: Option<String>,
}

impl BatchTarget {
    /// Parent resource path new jobs are created under.
    pub fn parent(&self) -> String {
        format!("projects/{}/locations/{}", self.project_id, self.region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn run_target_requires_project_region_and_job_name() {
        let config = RuntimeConfig::from_lookup(lookup_from(&[
            (ENV_PROJECT_ID, "proj"),
            (ENV_REGION, "us-central1"),
            (ENV_RUN_JOB_NAME, "my-job"),
        ]));
        let target = config.run_target().unwrap();
        assert_eq!(
            target.job_path(),
            "projects/proj/locations/us-central1/jobs/my-job"
        );
    }

    #[test]
    fn run_target_names_every_missing_key() {
        let config = RuntimeConfig::from_lookup(lookup_from(&[(ENV_PROJECT_ID, "proj")]));
        let err = config.run_target().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains(ENV_REGION));
        assert!(msg.contains(ENV_RUN_JOB_NAME));
        assert!(!msg.contains(ENV_PROJECT_ID));
    }

    #[test]
    fn empty_values_count_as_absent() {
        let config = RuntimeConfig::from_lookup(lookup_from(&[
            (ENV_PROJECT_ID, ""),
            (ENV_REGION, "us-central1"),
        ]));
        assert!(config.project_id.is_none());
        assert!(config.run_target().is_err());
    }

    #[test]
    fn batch_target_does_not_require_notification_topic() {
        let config = RuntimeConfig::from_lookup(lookup_from(&[
            (ENV_PROJECT_ID, "proj"),
            (ENV_REGION, "europe-west1"),
            (ENV_DEFAULT_IMAGE, "gcr.io/proj/worker:latest"),
            (ENV_SERVICE_ACCOUNT, "runner@proj.iam.gserviceaccount.com"),
        ]));
        let target = config.batch_target().unwrap();
        assert_eq!(target.parent(), "projects/proj/locations/europe-west1");
        assert!(target.notification_topic.is_none());
    }

    #[test]
    fn batch_target_requires_service_account() {
        let config = RuntimeConfig::from_lookup(lookup_from(&[
            (ENV_PROJECT_ID, "proj"),
            (ENV_REGION, "europe-west1"),
            (ENV_DEFAULT_IMAGE, "gcr.io/proj/worker:latest"),
        ]));
        let err = config.batch_target().unwrap_err();
        assert!(err.to_string().contains(ENV_SERVICE_ACCOUNT));
    }

    #[test]
    fn batch_target_requires_default_image() {
        // Mandatory even though a submission can carry its own image.
        let config = RuntimeConfig::from_lookup(lookup_from(&[
            (ENV_PROJECT_ID, "proj"),
            (ENV_REGION, "europe-west1"),
            (ENV_SERVICE_ACCOUNT, "runner@proj.iam.gserviceaccount.com"),
        ]));
        let err = config.batch_target().unwrap_err();
        assert!(err.to_string().contains(ENV_DEFAULT_IMAGE));
    }
}
