//! Validation Engine
//!
//! Per-framework structural validation of incoming job specs. Rules are
//! aggregated, never short-circuited: the caller gets every violation in
//! one pass so a user can fix a manifest in a single edit cycle. Malformed
//! input is reported as values, never raised.

use std::fmt;

use tracing::debug;

use crate::crd::{MXJob, PyTorchJob, ReplicaSpec, ReplicaSpecs, TFJob, XGBoostJob};
use crate::framework::{FrameworkProfile, JobKind, REPLICA_TYPE_WORKER};

/// One structural problem found in a job spec.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// Dotted path of the offending field, e.g.
    /// `spec.pytorchReplicaSpecs[Worker].replicas`.
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a PyTorchJob. Empty result means the spec is valid.
pub fn validate_pytorch_job(job: &PyTorchJob) -> Vec<Violation> {
    let profile = JobKind::PyTorch.profile();
    let mut violations = validate_common(
        profile,
        job.metadata.name.as_deref(),
        &job.spec.pytorch_replica_specs,
        "pytorchReplicaSpecs",
    );

    // Exactly one of the two per-node fields may be authoritative.
    if let Some(elastic) = &job.spec.elastic_policy {
        if elastic.nproc_per_node.is_some() && job.spec.nproc_per_node.is_some() {
            violations.push(Violation::new(
                "spec.elasticPolicy.nProcPerNode",
                "mutually exclusive with spec.nprocPerNode; set only one",
            ));
        }
    }

    finish(profile, violations)
}

/// Validate a TFJob. Empty result means the spec is valid.
pub fn validate_tf_job(job: &TFJob) -> Vec<Violation> {
    let profile = JobKind::TensorFlow.profile();
    let violations = validate_common(
        profile,
        job.metadata.name.as_deref(),
        &job.spec.tf_replica_specs,
        "tfReplicaSpecs",
    );
    finish(profile, violations)
}

/// Validate an MXJob. Empty result means the spec is valid.
pub fn validate_mx_job(job: &MXJob) -> Vec<Violation> {
    let profile = JobKind::MXNet.profile();
    let violations = validate_common(
        profile,
        job.metadata.name.as_deref(),
        &job.spec.mx_replica_specs,
        "mxReplicaSpecs",
    );
    finish(profile, violations)
}

/// Validate an XGBoostJob. Empty result means the spec is valid.
pub fn validate_xgboost_job(job: &XGBoostJob) -> Vec<Violation> {
    let profile = JobKind::XGBoost.profile();
    let specs = &job.spec.xgb_replica_specs;
    let mut violations = validate_common(
        profile,
        job.metadata.name.as_deref(),
        specs,
        "xgbReplicaSpecs",
    );

    // Workers have no coordinator to aggregate results without a master.
    if profile.coordinator_required {
        let has_workers = specs.keys().any(|t| t.matches(REPLICA_TYPE_WORKER));
        let has_master = profile
            .singleton_role
            .is_some_and(|role| specs.keys().any(|t| t.matches(role)));
        if has_workers && !has_master {
            violations.push(Violation::new(
                "spec.xgbReplicaSpecs",
                "a Master replica spec is required when Worker replicas are declared",
            ));
        }
    }

    finish(profile, violations)
}

/// Rules shared by every job kind. All rules run; nothing short-circuits.
fn validate_common(
    profile: &FrameworkProfile,
    name: Option<&str>,
    specs: &ReplicaSpecs,
    specs_field: &str,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    match name {
        None | Some("") => {
            violations.push(Violation::new("metadata.name", "name is required"));
        }
        Some(name) => {
            if let Some(reason) = dns1035_error(name) {
                violations.push(Violation::new("metadata.name", reason));
            }
        }
    }

    if specs.is_empty() {
        violations.push(Violation::new(
            format!("spec.{specs_field}"),
            "at least one replica spec is required",
        ));
    }

    for (replica_type, spec) in specs {
        let path = format!("spec.{specs_field}[{replica_type}]");

        if profile.canonical_replica_type(replica_type.as_str()).is_none() {
            violations.push(Violation::new(
                path.clone(),
                format!(
                    "unknown replica type for {}; expected one of {}",
                    profile.kind,
                    profile.replica_types.join(", ")
                ),
            ));
        }

        let Some(spec) = spec else {
            violations.push(Violation::new(path, "replica spec must not be null"));
            continue;
        };

        validate_pod_template(profile, &path, spec, &mut violations);

        if let Some(role) = profile.singleton_role {
            if replica_type.matches(role) {
                if let Some(replicas) = spec.replicas {
                    if replicas != 1 {
                        violations.push(Violation::new(
                            format!("{path}.replicas"),
                            format!("{role} must have exactly 1 replica, got {replicas}"),
                        ));
                    }
                }
            }
        }
    }

    violations
}

fn validate_pod_template(
    profile: &FrameworkProfile,
    path: &str,
    spec: &ReplicaSpec,
    violations: &mut Vec<Violation>,
) {
    let path = format!("{path}.template.spec.containers");
    let containers = spec
        .template
        .spec
        .as_ref()
        .map(|pod| pod.containers.as_slice())
        .unwrap_or_default();

    if containers.is_empty() {
        violations.push(Violation::new(path, "at least one container is required"));
        return;
    }

    let has_image = containers
        .iter()
        .any(|c| c.image.as_deref().is_some_and(|image| !image.is_empty()));
    if !has_image {
        violations.push(Violation::new(
            path.clone(),
            "at least one container must set a non-empty image",
        ));
    }

    // Port injection and command wiring locate the primary container by
    // this name.
    let has_default_container = containers
        .iter()
        .any(|c| c.name == profile.default_container_name);
    if !has_default_container {
        violations.push(Violation::new(
            path,
            format!(
                "a container named {:?} is required",
                profile.default_container_name
            ),
        ));
    }
}

fn finish(profile: &FrameworkProfile, violations: Vec<Violation>) -> Vec<Violation> {
    if !violations.is_empty() {
        debug!(
            kind = %profile.kind,
            count = violations.len(),
            "job spec failed structural validation"
        );
    }
    violations
}

/// Kubernetes resource names for these CRDs must be valid DNS-1035 labels:
/// lowercase alphanumerics and '-', starting with a letter, ending with an
/// alphanumeric, at most 63 characters.
fn dns1035_error(name: &str) -> Option<String> {
    const MAX_LEN: usize = 63;

    if name.len() > MAX_LEN {
        return Some(format!("must be at most {MAX_LEN} characters"));
    }
    if !name.chars().next().is_some_and(|c| c.is_ascii_lowercase()) {
        return Some("must start with a lowercase alphabetic character".to_string());
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Some("must consist of lowercase alphanumeric characters or '-'".to_string());
    }
    if name.ends_with('-') {
        return Some("must end with an alphanumeric character".to_string());
    }
    None
}
