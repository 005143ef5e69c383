//! Per-framework profile table
//!
//! Every job kind resolves to one static row carrying the constants the
//! validation and defaulting engines need. Adding a framework is an edit
//! to this table, not a new set of per-kind conditionals.

use std::fmt;

use crate::crd::{CleanPodPolicy, RestartPolicy};

/// Canonical replica-type labels.
pub const REPLICA_TYPE_MASTER: &str = "Master";
pub const REPLICA_TYPE_WORKER: &str = "Worker";
pub const REPLICA_TYPE_CHIEF: &str = "Chief";
pub const REPLICA_TYPE_PS: &str = "PS";
pub const REPLICA_TYPE_EVALUATOR: &str = "Evaluator";
pub const REPLICA_TYPE_SCHEDULER: &str = "Scheduler";
pub const REPLICA_TYPE_SERVER: &str = "Server";

/// Closed set of supported training frameworks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JobKind {
    PyTorch,
    TensorFlow,
    MXNet,
    XGBoost,
}

impl JobKind {
    /// Resolve this kind's profile row.
    pub const fn profile(self) -> &'static FrameworkProfile {
        match self {
            JobKind::PyTorch => &PYTORCH,
            JobKind::TensorFlow => &TENSORFLOW,
            JobKind::MXNet => &MXNET,
            JobKind::XGBoost => &XGBOOST,
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobKind::PyTorch => "PyTorchJob",
            JobKind::TensorFlow => "TFJob",
            JobKind::MXNet => "MXJob",
            JobKind::XGBoost => "XGBoostJob",
        };
        write!(f, "{name}")
    }
}

/// Framework constants consumed by validation and defaulting.
pub struct FrameworkProfile {
    pub kind: JobKind,

    /// Container the reconcile loop wires ports and commands into. Every
    /// replica's pod template must name one container after it.
    pub default_container_name: &'static str,

    /// Name and number of the port appended to the default container when
    /// no port with this name is declared.
    pub default_port_name: &'static str,
    pub default_port: i32,

    pub default_restart_policy: RestartPolicy,
    pub default_clean_pod_policy: CleanPodPolicy,

    /// Replica type that must have exactly one replica when its count is
    /// set explicitly.
    pub singleton_role: Option<&'static str>,

    /// Canonical replica-type labels legal for this kind.
    pub replica_types: &'static [&'static str],

    /// Reject worker-only topologies that omit the singleton coordinator.
    pub coordinator_required: bool,

    /// Whether the kind carries a job-level success policy.
    pub has_success_policy: bool,
}

static PYTORCH: FrameworkProfile = FrameworkProfile {
    kind: JobKind::PyTorch,
    default_container_name: "pytorch",
    default_port_name: "pytorchjob-port",
    default_port: 23456,
    default_restart_policy: RestartPolicy::OnFailure,
    default_clean_pod_policy: CleanPodPolicy::None,
    singleton_role: Some(REPLICA_TYPE_MASTER),
    replica_types: &[REPLICA_TYPE_MASTER, REPLICA_TYPE_WORKER],
    coordinator_required: false,
    has_success_policy: false,
};

static TENSORFLOW: FrameworkProfile = FrameworkProfile {
    kind: JobKind::TensorFlow,
    default_container_name: "tensorflow",
    default_port_name: "tfjob-port",
    default_port: 2222,
    default_restart_policy: RestartPolicy::Never,
    default_clean_pod_policy: CleanPodPolicy::None,
    singleton_role: None,
    replica_types: &[
        REPLICA_TYPE_CHIEF,
        REPLICA_TYPE_PS,
        REPLICA_TYPE_WORKER,
        REPLICA_TYPE_EVALUATOR,
    ],
    coordinator_required: false,
    has_success_policy: true,
};

static MXNET: FrameworkProfile = FrameworkProfile {
    kind: JobKind::MXNet,
    default_container_name: "mxnet",
    default_port_name: "mxjob-port",
    default_port: 9091,
    default_restart_policy: RestartPolicy::Never,
    default_clean_pod_policy: CleanPodPolicy::None,
    singleton_role: Some(REPLICA_TYPE_SCHEDULER),
    replica_types: &[REPLICA_TYPE_SCHEDULER, REPLICA_TYPE_SERVER, REPLICA_TYPE_WORKER],
    coordinator_required: false,
    has_success_policy: true,
};

static XGBOOST: FrameworkProfile = FrameworkProfile {
    kind: JobKind::XGBoost,
    default_container_name: "xgboost",
    default_port_name: "xgboostjob-port",
    default_port: 9999,
    default_restart_policy: RestartPolicy::Never,
    default_clean_pod_policy: CleanPodPolicy::None,
    singleton_role: Some(REPLICA_TYPE_MASTER),
    replica_types: &[REPLICA_TYPE_MASTER, REPLICA_TYPE_WORKER],
    coordinator_required: true,
    has_success_policy: false,
};

impl FrameworkProfile {
    /// Canonical spelling for `label`, when it is legal for this kind.
    pub fn canonical_replica_type(&self, label: &str) -> Option<&'static str> {
        self.replica_types
            .iter()
            .find(|t| t.eq_ignore_ascii_case(label))
            .copied()
    }
}
