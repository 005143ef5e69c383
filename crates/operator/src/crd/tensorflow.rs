//! TFJob CRD - parameter-server style training

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{JobStatus, ReplicaSpecs, RunPolicy, SuccessPolicy};

/// TFJob CRD - distributed TensorFlow training job
#[derive(CustomResource, Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
#[kube(
    group = "kubetrain.io",
    version = "v1",
    kind = "TFJob",
    namespaced,
    status = "JobStatus",
    shortname = "tfj",
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct TFJobSpec {
    /// Job-wide execution policy.
    #[serde(default)]
    pub run_policy: RunPolicy,

    /// Which replica completions count toward job success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_policy: Option<SuccessPolicy>,

    /// Replica specs keyed by replica type ("Chief", "PS", "Worker",
    /// "Evaluator").
    #[serde(default)]
    pub tf_replica_specs: ReplicaSpecs,
}
