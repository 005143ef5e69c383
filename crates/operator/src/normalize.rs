//! Normalization surface shared by every training job kind
//!
//! The admission path and the reconcile loop go through this seam instead
//! of picking per-kind functions by hand, which keeps the "validate before
//! defaulting" discipline in one place.

use crate::crd::{MXJob, PyTorchJob, TFJob, XGBoostJob};
use crate::defaulting;
use crate::framework::JobKind;
use crate::validation::{self, Violation};

/// A training job that can be validated and defaulted in place.
pub trait TrainingJob {
    /// Framework this job targets.
    fn kind(&self) -> JobKind;

    /// Structural validation; empty result means the spec is valid.
    fn validate(&self) -> Vec<Violation>;

    /// Fill unset optional fields with framework defaults. Idempotent;
    /// the caller holds exclusive access to `self`.
    fn apply_defaults(&mut self);
}

impl TrainingJob for PyTorchJob {
    fn kind(&self) -> JobKind {
        JobKind::PyTorch
    }

    fn validate(&self) -> Vec<Violation> {
        validation::validate_pytorch_job(self)
    }

    fn apply_defaults(&mut self) {
        defaulting::default_pytorch_job(self);
    }
}

impl TrainingJob for TFJob {
    fn kind(&self) -> JobKind {
        JobKind::TensorFlow
    }

    fn validate(&self) -> Vec<Violation> {
        validation::validate_tf_job(self)
    }

    fn apply_defaults(&mut self) {
        defaulting::default_tf_job(self);
    }
}

impl TrainingJob for MXJob {
    fn kind(&self) -> JobKind {
        JobKind::MXNet
    }

    fn validate(&self) -> Vec<Violation> {
        validation::validate_mx_job(self)
    }

    fn apply_defaults(&mut self) {
        defaulting::default_mx_job(self);
    }
}

impl TrainingJob for XGBoostJob {
    fn kind(&self) -> JobKind {
        JobKind::XGBoost
    }

    fn validate(&self) -> Vec<Violation> {
        validation::validate_xgboost_job(self)
    }

    fn apply_defaults(&mut self) {
        defaulting::default_xgboost_job(self);
    }
}

/// Validate `job` and, when valid, apply framework defaults in place.
///
/// An invalid spec is never defaulted; the full violation list comes back
/// so a user can fix every problem in one edit cycle.
pub fn normalize<J: TrainingJob>(job: &mut J) -> Result<(), Vec<Violation>> {
    let violations = job.validate();
    if violations.is_empty() {
        job.apply_defaults();
        Ok(())
    } else {
        Err(violations)
    }
}
