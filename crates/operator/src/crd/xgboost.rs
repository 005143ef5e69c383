//! XGBoostJob CRD - master/worker boosting

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{JobStatus, ReplicaSpecs, RunPolicy};

/// XGBoostJob CRD - distributed XGBoost training job
#[derive(CustomResource, Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
#[kube(
    group = "kubetrain.io",
    version = "v1",
    kind = "XGBoostJob",
    namespaced,
    status = "JobStatus",
    shortname = "xgb",
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct XGBoostJobSpec {
    /// Job-wide execution policy.
    #[serde(default)]
    pub run_policy: RunPolicy,

    /// Replica specs keyed by replica type ("Master", "Worker"). A Master
    /// entry must accompany any Worker entries; workers have no
    /// coordinator to aggregate results without one.
    #[serde(default)]
    pub xgb_replica_specs: ReplicaSpecs,
}
