//! End-to-end normalization flow over deserialized manifests
//!
//! Exercises the admission-path pipeline: deserialize a job manifest,
//! validate, apply defaults, derive the elastic environment. Manifests are
//! built as JSON values the way the API server would hand them over.

use serde_json::json;

use kubetrain_operator::crd::{
    CleanPodPolicy, MXJob, PyTorchJob, ReplicaType, RestartPolicy, SuccessPolicy, TFJob,
    XGBoostJob,
};
use kubetrain_operator::{generate_elastic_env, normalize, JobKind, TrainingJob};

fn pytorch_manifest() -> serde_json::Value {
    json!({
        "apiVersion": "kubetrain.io/v1",
        "kind": "PyTorchJob",
        "metadata": {"name": "mnist", "namespace": "default"},
        "spec": {
            "elasticPolicy": {
                "minReplicas": 1,
                "maxReplicas": 3,
                "rdzvBackend": "c10d",
                "rdzvHost": "mnist-master-0",
                "rdzvPort": 23456,
                "maxRestarts": 3
            },
            "pytorchReplicaSpecs": {
                "MASTER": {
                    "template": {
                        "spec": {
                            "containers": [{
                                "name": "pytorch",
                                "image": "docker.io/kubetrain/pytorch-mnist:v1"
                            }]
                        }
                    }
                },
                "Worker": {
                    "replicas": 3,
                    "template": {
                        "spec": {
                            "containers": [{
                                "name": "pytorch",
                                "image": "docker.io/kubetrain/pytorch-mnist:v1"
                            }]
                        }
                    }
                }
            }
        }
    })
}

#[test]
fn pytorch_manifest_normalizes_end_to_end() {
    let mut job: PyTorchJob = serde_json::from_value(pytorch_manifest()).unwrap();
    assert_eq!(job.kind(), JobKind::PyTorch);

    normalize(&mut job).unwrap();

    // Key re-cased, replica count and restart policy filled, port appended.
    let master = job
        .spec
        .pytorch_replica_specs
        .get(&ReplicaType::new("Master"))
        .unwrap()
        .as_ref()
        .unwrap();
    assert_eq!(master.replicas, Some(1));
    assert_eq!(master.restart_policy, Some(RestartPolicy::OnFailure));
    let ports = master.template.spec.as_ref().unwrap().containers[0]
        .ports
        .as_ref()
        .unwrap();
    assert_eq!(ports[0].name.as_deref(), Some("pytorchjob-port"));
    assert_eq!(ports[0].container_port, 23456);

    // Explicit worker count survives.
    let worker = job
        .spec
        .pytorch_replica_specs
        .get(&ReplicaType::new("Worker"))
        .unwrap()
        .as_ref()
        .unwrap();
    assert_eq!(worker.replicas, Some(3));

    assert_eq!(
        job.spec.run_policy.clean_pod_policy,
        Some(CleanPodPolicy::None)
    );

    // The normalized job feeds the elastic generator.
    let env = generate_elastic_env(&job).unwrap();
    let names: Vec<&str> = env.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "PET_MAX_RESTARTS",
            "PET_RDZV_BACKEND",
            "PET_RDZV_ENDPOINT",
            "PET_NNODES",
        ]
    );
    assert_eq!(env[2].value.as_deref(), Some("mnist-master-0:23456"));
    assert_eq!(env[3].value.as_deref(), Some("1:3"));
}

#[test]
fn invalid_manifest_reports_every_violation_and_is_not_defaulted() {
    let manifest = json!({
        "apiVersion": "kubetrain.io/v1",
        "kind": "PyTorchJob",
        "metadata": {"name": "0-bad"},
        "spec": {
            "pytorchReplicaSpecs": {
                "Worker": {
                    "template": {
                        "spec": {
                            "containers": [{"name": "", "image": ""}]
                        }
                    }
                }
            }
        }
    });
    let mut job: PyTorchJob = serde_json::from_value(manifest).unwrap();

    let violations = normalize(&mut job).unwrap_err();

    let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
    assert!(fields.contains(&"metadata.name"));
    assert!(fields
        .iter()
        .any(|f| f.starts_with("spec.pytorchReplicaSpecs[Worker]")));
    assert_eq!(violations.len(), 3);

    // Defaulting must not have run.
    let worker = job
        .spec
        .pytorch_replica_specs
        .get(&ReplicaType::new("Worker"))
        .unwrap()
        .as_ref()
        .unwrap();
    assert_eq!(worker.replicas, None);
}

#[test]
fn normalization_is_idempotent_across_kinds() {
    let mut pytorch: PyTorchJob = serde_json::from_value(pytorch_manifest()).unwrap();
    normalize(&mut pytorch).unwrap();
    let once = pytorch.clone();
    normalize(&mut pytorch).unwrap();
    assert_eq!(pytorch, once);

    let manifest = json!({
        "metadata": {"name": "dist-iris"},
        "spec": {
            "xgbReplicaSpecs": {
                "Master": {
                    "template": {
                        "spec": {
                            "containers": [{
                                "name": "xgboost",
                                "image": "docker.io/kubetrain/xgboost-iris:v1"
                            }]
                        }
                    }
                },
                "worker": {
                    "replicas": 2,
                    "template": {
                        "spec": {
                            "containers": [{
                                "name": "xgboost",
                                "image": "docker.io/kubetrain/xgboost-iris:v1"
                            }]
                        }
                    }
                }
            }
        }
    });
    let mut xgboost = XGBoostJob::new(
        "dist-iris",
        serde_json::from_value(manifest["spec"].clone()).unwrap(),
    );
    normalize(&mut xgboost).unwrap();
    let once = xgboost.clone();
    normalize(&mut xgboost).unwrap();
    assert_eq!(xgboost, once);
    assert!(xgboost
        .spec
        .xgb_replica_specs
        .contains_key(&ReplicaType::new("Worker")));
}

#[test]
fn tf_job_gains_success_policy_and_mx_scheduler_stays_singleton() {
    let tf_spec = json!({
        "tfReplicaSpecs": {
            "Worker": {
                "replicas": 2,
                "template": {
                    "spec": {
                        "containers": [{
                            "name": "tensorflow",
                            "image": "docker.io/kubetrain/tf-mnist:v1"
                        }]
                    }
                }
            }
        }
    });
    let mut tf = TFJob::new("tf-mnist", serde_json::from_value(tf_spec).unwrap());
    normalize(&mut tf).unwrap();
    assert_eq!(tf.spec.success_policy, Some(SuccessPolicy::Default));

    let mx_spec = json!({
        "mxReplicaSpecs": {
            "Scheduler": {
                "replicas": 2,
                "template": {
                    "spec": {
                        "containers": [{
                            "name": "mxnet",
                            "image": "docker.io/kubetrain/mxnet-mnist:v1"
                        }]
                    }
                }
            }
        }
    });
    let mut mx = MXJob::new("mx-mnist", serde_json::from_value(mx_spec).unwrap());
    let violations = normalize(&mut mx).unwrap_err();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].field, "spec.mxReplicaSpecs[Scheduler].replicas");
}
