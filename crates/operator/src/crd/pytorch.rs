//! PyTorchJob CRD - master/worker training with optional elastic scaling

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{JobStatus, ReplicaSpecs, RunPolicy};

/// PyTorchJob CRD - distributed PyTorch training job
#[derive(CustomResource, Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
#[kube(
    group = "kubetrain.io",
    version = "v1",
    kind = "PyTorchJob",
    namespaced,
    status = "JobStatus",
    shortname = "pyj",
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct PyTorchJobSpec {
    /// Job-wide execution policy.
    #[serde(default)]
    pub run_policy: RunPolicy,

    /// Elastic scaling window and rendezvous configuration. Absent means
    /// the job runs with a fixed topology.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elastic_policy: Option<ElasticPolicy>,

    /// Worker processes launched per node. Mutually exclusive with the
    /// deprecated field of the same name on the elastic policy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nproc_per_node: Option<i32>,

    /// Replica specs keyed by replica type ("Master", "Worker").
    #[serde(default)]
    pub pytorch_replica_specs: ReplicaSpecs,
}

/// Elastic execution policy: node-count range plus the rendezvous
/// parameters workers use to discover each other and re-form membership
/// after a scale event.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ElasticPolicy {
    /// Lower bound of the elastic node range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_replicas: Option<i32>,

    /// Upper bound of the elastic node range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_replicas: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rdzv_backend: Option<RdzvBackend>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rdzv_port: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rdzv_host: Option<String>,

    /// Opaque identifier shared by every participant of one rendezvous.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rdzv_id: Option<String>,

    /// Additional backend configuration, passed through in declaration
    /// order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rdzv_conf: Option<Vec<RdzvConf>>,

    /// Run single-node without an external rendezvous endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standalone: Option<bool>,

    /// Worker process restarts tolerated before the job fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_restarts: Option<i32>,

    /// Deprecated alternate of `PyTorchJobSpec::nproc_per_node`. Setting
    /// both is a validation error.
    #[serde(rename = "nProcPerNode", skip_serializing_if = "Option::is_none")]
    pub nproc_per_node: Option<i32>,
}

/// Rendezvous backend used by elastic workers to agree on membership.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum RdzvBackend {
    #[serde(rename = "c10d")]
    C10d,
    #[serde(rename = "etcd")]
    Etcd,
    #[serde(rename = "etcd-v2")]
    EtcdV2,
}

impl fmt::Display for RdzvBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RdzvBackend::C10d => "c10d",
            RdzvBackend::Etcd => "etcd",
            RdzvBackend::EtcdV2 => "etcd-v2",
        };
        write!(f, "{name}")
    }
}

/// One rendezvous configuration pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RdzvConf {
    pub key: String,
    pub value: String,
}
