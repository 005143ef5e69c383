//! CRD definitions for the Kubetrain training operator
//!
//! Shared API types used by every framework kind, plus one CRD module per
//! framework. The admission path and the reconcile loop exchange these
//! types; the validation and defaulting engines operate on them in place.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use k8s_openapi::api::core::v1::PodTemplateSpec;

mod mxnet;
mod pytorch;
mod tensorflow;
mod xgboost;

pub use mxnet::{MXJob, MXJobSpec};
pub use pytorch::{ElasticPolicy, PyTorchJob, PyTorchJobSpec, RdzvBackend, RdzvConf};
pub use tensorflow::{TFJob, TFJobSpec};
pub use xgboost::{XGBoostJob, XGBoostJobSpec};

/// Replica specs keyed by replica type. The value is optional so a null
/// manifest entry survives deserialization and can be reported by the
/// validation engine instead of crashing the caller.
pub type ReplicaSpecs = BTreeMap<ReplicaType, Option<ReplicaSpec>>;

/// Named homogeneous role within a distributed job, e.g. "Worker" or
/// "Master". Matched case-insensitively on input; the defaulting engine
/// rewrites keys to the framework's canonical casing.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct ReplicaType(String);

impl ReplicaType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive match against a canonical label.
    pub fn matches(&self, label: &str) -> bool {
        self.0.eq_ignore_ascii_case(label)
    }
}

impl fmt::Display for ReplicaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ReplicaType {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for ReplicaType {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// One homogeneous replica group within a job.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplicaSpec {
    /// Desired pod count for this group. Defaults to 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    /// Restart behaviour for pods in this group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restart_policy: Option<RestartPolicy>,

    /// Pod template the reconcile loop stamps out for each replica.
    #[serde(default)]
    pub template: PodTemplateSpec,
}

/// Restart behaviour for a replica group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum RestartPolicy {
    Always,
    OnFailure,
    Never,
    /// Restart only on retryable exit codes (>= 128, the fatal-signal range).
    ExitCode,
}

/// Pod retention after the job completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum CleanPodPolicy {
    /// Delete every pod.
    All,
    /// Delete only pods still running.
    Running,
    /// Retain all pods.
    None,
}

/// Replica completions that count toward overall job success.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum SuccessPolicy {
    /// Framework default criterion.
    #[default]
    #[serde(rename = "")]
    Default,
    /// Every declared worker replica must succeed.
    AllWorkers,
}

/// Job-wide execution policy shared by all framework kinds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunPolicy {
    /// Pod retention after the job completes. Defaults to `None` (retain).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clean_pod_policy: Option<CleanPodPolicy>,

    /// Seconds a finished job is kept before garbage collection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl_seconds_after_finished: Option<i32>,

    /// Wall-clock limit while the job stays active, relative to its start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_deadline_seconds: Option<i64>,

    /// Restarts tolerated before the job is marked failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backoff_limit: Option<i32>,

    /// When true the reconcile loop must not create or manage pods for
    /// this job. Absent means not suspended.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspend: Option<bool>,
}

/// Observed state shared by every training job kind. Transitions are
/// computed by the reconcile loop; this core only declares the shape.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    /// Latest available observations of the job's state.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<JobCondition>,

    /// Pod counters per replica type.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub replica_statuses: BTreeMap<ReplicaType, ReplicaStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reconcile_time: Option<String>,
}

/// One observation of the job's lifecycle.
#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCondition {
    #[serde(rename = "type")]
    pub type_: JobConditionType,

    /// "True", "False" or "Unknown".
    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

/// Job lifecycle condition types.
#[derive(Clone, Copy, Debug, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
pub enum JobConditionType {
    Created,
    Running,
    Restarting,
    Succeeded,
    Failed,
    Suspended,
}

/// Pod counters for one replica type.
#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicaStatus {
    #[serde(default)]
    pub active: i32,
    #[serde(default)]
    pub succeeded: i32,
    #[serde(default)]
    pub failed: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replica_type_matches_ignores_case() {
        assert!(ReplicaType::new("WORKER").matches("Worker"));
        assert!(ReplicaType::new("worker").matches("Worker"));
        assert!(!ReplicaType::new("Server").matches("Worker"));
    }

    #[test]
    fn replica_spec_wire_form_is_camel_case() {
        let spec = ReplicaSpec {
            replicas: Some(2),
            restart_policy: Some(RestartPolicy::OnFailure),
            template: Default::default(),
        };
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["replicas"], 2);
        assert_eq!(json["restartPolicy"], "OnFailure");
    }

    #[test]
    fn success_policy_default_serializes_as_empty_string() {
        let json = serde_json::to_value(SuccessPolicy::Default).unwrap();
        assert_eq!(json, "");
        let json = serde_json::to_value(SuccessPolicy::AllWorkers).unwrap();
        assert_eq!(json, "AllWorkers");
    }

    #[test]
    fn run_policy_omits_unset_fields() {
        let json = serde_json::to_value(RunPolicy::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn null_replica_spec_entry_deserializes() {
        let specs: ReplicaSpecs = serde_json::from_value(serde_json::json!({
            "Worker": null,
        }))
        .unwrap();
        assert_eq!(specs.get(&ReplicaType::new("Worker")), Some(&None));
    }
}
