//! Defaulting Engine
//!
//! Fills unset optional fields with framework defaults, in place and
//! idempotently. Explicit user values are never overwritten: the reconcile
//! loop re-applies defaults on every pass and must observe a fixed point.
//! Callers run validation first and pass exclusive access to the job being
//! defaulted.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::ContainerPort;
use tracing::warn;

use crate::crd::{
    MXJob, PyTorchJob, ReplicaSpecs, ReplicaType, RunPolicy, SuccessPolicy, TFJob, XGBoostJob,
};
use crate::framework::{FrameworkProfile, JobKind};

/// Apply PyTorchJob defaults in place.
pub fn default_pytorch_job(job: &mut PyTorchJob) {
    let profile = JobKind::PyTorch.profile();
    default_run_policy(&mut job.spec.run_policy, profile);
    default_replica_specs(&mut job.spec.pytorch_replica_specs, profile);
}

/// Apply TFJob defaults in place.
pub fn default_tf_job(job: &mut TFJob) {
    let profile = JobKind::TensorFlow.profile();
    default_run_policy(&mut job.spec.run_policy, profile);
    default_success_policy(&mut job.spec.success_policy, profile);
    default_replica_specs(&mut job.spec.tf_replica_specs, profile);
}

/// Apply MXJob defaults in place.
pub fn default_mx_job(job: &mut MXJob) {
    let profile = JobKind::MXNet.profile();
    default_run_policy(&mut job.spec.run_policy, profile);
    default_success_policy(&mut job.spec.success_policy, profile);
    default_replica_specs(&mut job.spec.mx_replica_specs, profile);
}

/// Apply XGBoostJob defaults in place.
pub fn default_xgboost_job(job: &mut XGBoostJob) {
    let profile = JobKind::XGBoost.profile();
    default_run_policy(&mut job.spec.run_policy, profile);
    default_replica_specs(&mut job.spec.xgb_replica_specs, profile);
}

fn default_run_policy(policy: &mut RunPolicy, profile: &FrameworkProfile) {
    if policy.clean_pod_policy.is_none() {
        policy.clean_pod_policy = Some(profile.default_clean_pod_policy);
    }
}

fn default_success_policy(policy: &mut Option<SuccessPolicy>, profile: &FrameworkProfile) {
    if profile.has_success_policy && policy.is_none() {
        *policy = Some(SuccessPolicy::Default);
    }
}

fn default_replica_specs(specs: &mut ReplicaSpecs, profile: &FrameworkProfile) {
    canonicalize_replica_types(specs, profile);

    for spec in specs.values_mut().flatten() {
        if spec.replicas.is_none() {
            spec.replicas = Some(1);
        }
        if spec.restart_policy.is_none() {
            spec.restart_policy = Some(profile.default_restart_policy);
        }
        default_container_port(spec, profile);
    }
}

/// Rebuild the map with the framework's canonical casing for every known
/// key. Exactly-canonical entries are kept as-is; a re-cased key that
/// collides with an already-canonical entry is dropped, canonical entry
/// wins. Keys unknown to the framework pass through untouched (validation
/// reports them).
fn canonicalize_replica_types(specs: &mut ReplicaSpecs, profile: &FrameworkProfile) {
    let mut canonical: ReplicaSpecs = BTreeMap::new();
    let mut recased: Vec<(ReplicaType, _)> = Vec::new();

    for (replica_type, spec) in std::mem::take(specs) {
        match profile.canonical_replica_type(replica_type.as_str()) {
            Some(label) if replica_type.as_str() != label => {
                recased.push((ReplicaType::new(label), spec));
            }
            _ => {
                canonical.insert(replica_type, spec);
            }
        }
    }

    for (replica_type, spec) in recased {
        if canonical.contains_key(&replica_type) {
            warn!(
                kind = %profile.kind,
                replica_type = %replica_type,
                "dropping re-cased replica type entry that collides with a canonical one"
            );
        } else {
            canonical.insert(replica_type, spec);
        }
    }

    *specs = canonical;
}

/// Append the framework's default port to the default container unless a
/// port with the default port name is already declared.
fn default_container_port(spec: &mut crate::crd::ReplicaSpec, profile: &FrameworkProfile) {
    let Some(pod_spec) = spec.template.spec.as_mut() else {
        return;
    };

    for container in &mut pod_spec.containers {
        if container.name != profile.default_container_name {
            continue;
        }
        let ports = container.ports.get_or_insert_with(Vec::new);
        let has_default_port = ports
            .iter()
            .any(|p| p.name.as_deref() == Some(profile.default_port_name));
        if !has_default_port {
            ports.push(ContainerPort {
                name: Some(profile.default_port_name.to_string()),
                container_port: profile.default_port,
                ..Default::default()
            });
        }
    }
}
