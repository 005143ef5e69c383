//! MXJob CRD - scheduler/server/worker style training

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{JobStatus, ReplicaSpecs, RunPolicy, SuccessPolicy};

/// MXJob CRD - distributed MXNet training job
#[derive(CustomResource, Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
#[kube(
    group = "kubetrain.io",
    version = "v1",
    kind = "MXJob",
    namespaced,
    status = "JobStatus",
    shortname = "mxj",
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct MXJobSpec {
    /// Job-wide execution policy.
    #[serde(default)]
    pub run_policy: RunPolicy,

    /// Which replica completions count toward job success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_policy: Option<SuccessPolicy>,

    /// Replica specs keyed by replica type ("Scheduler", "Server",
    /// "Worker").
    #[serde(default)]
    pub mx_replica_specs: ReplicaSpecs,
}
