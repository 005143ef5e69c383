//! Kubetrain Operator - spec normalization core for distributed training jobs
//!
//! Takes a declarative, possibly incomplete training job spec (PyTorchJob,
//! TFJob, MXJob, XGBoostJob), validates it against per-framework structural
//! invariants, fills framework defaults so every downstream consumer sees a
//! fully-populated spec, and derives the rendezvous environment elastic
//! workers need to bootstrap. The reconcile loop and the admission webhook
//! consume these as pure, synchronous building blocks.

pub mod crd;
pub mod defaulting;
pub mod elastic;
pub mod framework;
pub mod normalize;
pub mod policy;
pub mod validation;

pub use elastic::{generate_elastic_env, ElasticEnvError};
pub use framework::{FrameworkProfile, JobKind};
pub use normalize::{normalize, TrainingJob};
pub use policy::{is_job_suspended, is_retryable_exit_code};
pub use validation::Violation;
