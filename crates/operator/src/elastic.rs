//! Elastic Coordination Generator
//!
//! Derives the ordered rendezvous environment for a PyTorchJob's elastic
//! policy. The reconcile loop injects these variables into the primary
//! container of worker replicas. Entry order is fixed so generated
//! manifests are reproducible across reconcile passes.

use k8s_openapi::api::core::v1::EnvVar;
use thiserror::Error;

use crate::crd::PyTorchJob;

/// Environment variable names consumed by the elastic training agent.
pub const ENV_MAX_RESTARTS: &str = "PET_MAX_RESTARTS";
pub const ENV_RDZV_BACKEND: &str = "PET_RDZV_BACKEND";
pub const ENV_RDZV_ENDPOINT: &str = "PET_RDZV_ENDPOINT";
pub const ENV_RDZV_ID: &str = "PET_RDZV_ID";
pub const ENV_RDZV_CONF: &str = "PET_RDZV_CONF";
pub const ENV_NNODES: &str = "PET_NNODES";

/// Failure while deriving the rendezvous environment.
///
/// Structural problems are caught by the validation engine before
/// generation runs; this error covers the conditions outside validation's
/// scope. A non-empty variant set is kept so new conditions slot in
/// without an API break.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ElasticEnvError {
    /// A conf pair with an empty key would serialize as a malformed
    /// `=value` entry.
    #[error("rendezvous conf entry {index} has an empty key")]
    EmptyRendezvousConfKey { index: usize },
}

/// Derive the elastic rendezvous environment for `job`.
///
/// Returns an empty list when the job carries no elastic policy: the
/// parameters are only meaningful when a user opts in. Entries are emitted
/// only for fields that are set. A node range needs both bounds; a
/// rendezvous endpoint needs both host and port. Half-set pairs are
/// omitted rather than guessed.
pub fn generate_elastic_env(job: &PyTorchJob) -> Result<Vec<EnvVar>, ElasticEnvError> {
    let Some(policy) = &job.spec.elastic_policy else {
        return Ok(Vec::new());
    };

    let mut env = Vec::new();

    if let Some(max_restarts) = policy.max_restarts {
        env.push(env_var(ENV_MAX_RESTARTS, max_restarts.to_string()));
    }
    if let Some(backend) = policy.rdzv_backend {
        env.push(env_var(ENV_RDZV_BACKEND, backend.to_string()));
    }
    if let (Some(host), Some(port)) = (&policy.rdzv_host, policy.rdzv_port) {
        env.push(env_var(ENV_RDZV_ENDPOINT, format!("{host}:{port}")));
    }
    if let Some(id) = &policy.rdzv_id {
        env.push(env_var(ENV_RDZV_ID, id.clone()));
    }
    if let Some(conf) = policy.rdzv_conf.as_deref().filter(|c| !c.is_empty()) {
        let mut pairs = Vec::with_capacity(conf.len());
        for (index, entry) in conf.iter().enumerate() {
            if entry.key.is_empty() {
                return Err(ElasticEnvError::EmptyRendezvousConfKey { index });
            }
            pairs.push(format!("{}={}", entry.key, entry.value));
        }
        env.push(env_var(ENV_RDZV_CONF, pairs.join(",")));
    }
    if let (Some(min), Some(max)) = (policy.min_replicas, policy.max_replicas) {
        env.push(env_var(ENV_NNODES, format!("{min}:{max}")));
    }

    Ok(env)
}

fn env_var(name: &str, value: String) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value: Some(value),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::{ElasticPolicy, PyTorchJobSpec, RdzvBackend, RdzvConf};

    fn pytorch_job(elastic_policy: Option<ElasticPolicy>) -> PyTorchJob {
        PyTorchJob::new(
            "test",
            PyTorchJobSpec {
                run_policy: Default::default(),
                elastic_policy,
                nproc_per_node: None,
                pytorch_replica_specs: Default::default(),
            },
        )
    }

    fn entries(env: &[EnvVar]) -> Vec<(&str, &str)> {
        env.iter()
            .map(|e| (e.name.as_str(), e.value.as_deref().unwrap()))
            .collect()
    }

    #[test]
    fn no_elastic_policy_yields_no_entries() {
        let env = generate_elastic_env(&pytorch_job(None)).unwrap();
        assert!(env.is_empty());
    }

    #[test]
    fn full_policy_yields_every_entry_in_order() {
        let policy = ElasticPolicy {
            min_replicas: Some(1),
            max_replicas: Some(3),
            rdzv_backend: Some(RdzvBackend::C10d),
            rdzv_port: Some(1234),
            rdzv_host: Some("localhost".to_string()),
            rdzv_id: Some("rdzv-id".to_string()),
            rdzv_conf: Some(vec![
                RdzvConf {
                    key: "a".to_string(),
                    value: "b".to_string(),
                },
                RdzvConf {
                    key: "c".to_string(),
                    value: "d".to_string(),
                },
            ]),
            standalone: None,
            max_restarts: Some(3),
            nproc_per_node: None,
        };
        let env = generate_elastic_env(&pytorch_job(Some(policy))).unwrap();
        assert_eq!(
            entries(&env),
            vec![
                ("PET_MAX_RESTARTS", "3"),
                ("PET_RDZV_BACKEND", "c10d"),
                ("PET_RDZV_ENDPOINT", "localhost:1234"),
                ("PET_RDZV_ID", "rdzv-id"),
                ("PET_RDZV_CONF", "a=b,c=d"),
                ("PET_NNODES", "1:3"),
            ]
        );
    }

    #[test]
    fn partial_policy_yields_only_set_entries() {
        let policy = ElasticPolicy {
            rdzv_backend: Some(RdzvBackend::Etcd),
            max_restarts: Some(10),
            ..Default::default()
        };
        let env = generate_elastic_env(&pytorch_job(Some(policy))).unwrap();
        assert_eq!(
            entries(&env),
            vec![("PET_MAX_RESTARTS", "10"), ("PET_RDZV_BACKEND", "etcd")]
        );
    }

    #[test]
    fn single_node_bound_yields_no_nnodes_entry() {
        let policy = ElasticPolicy {
            min_replicas: Some(1),
            ..Default::default()
        };
        let env = generate_elastic_env(&pytorch_job(Some(policy))).unwrap();
        assert!(env.is_empty());
    }

    #[test]
    fn host_without_port_yields_no_endpoint_entry() {
        let policy = ElasticPolicy {
            rdzv_host: Some("localhost".to_string()),
            ..Default::default()
        };
        let env = generate_elastic_env(&pytorch_job(Some(policy))).unwrap();
        assert!(env.is_empty());
    }

    #[test]
    fn empty_conf_key_is_an_error() {
        let policy = ElasticPolicy {
            rdzv_conf: Some(vec![
                RdzvConf {
                    key: "a".to_string(),
                    value: "b".to_string(),
                },
                RdzvConf {
                    key: String::new(),
                    value: "x".to_string(),
                },
            ]),
            ..Default::default()
        };
        let err = generate_elastic_env(&pytorch_job(Some(policy))).unwrap_err();
        assert_eq!(err, ElasticEnvError::EmptyRendezvousConfKey { index: 1 });
    }

    #[test]
    fn empty_conf_list_yields_no_conf_entry() {
        let policy = ElasticPolicy {
            rdzv_conf: Some(vec![]),
            ..Default::default()
        };
        let env = generate_elastic_env(&pytorch_job(Some(policy))).unwrap();
        assert!(env.is_empty());
    }
}
