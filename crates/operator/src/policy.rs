//! Policy predicates consumed by the reconcile loop's restart and suspend
//! decisions. Pure functions, no side effects.

use crate::crd::RunPolicy;

/// Whether a failed replica is eligible for automatic restart.
///
/// Exit codes at or above 128 conventionally signal termination by a fatal
/// signal (OOM kill, segmentation fault) rather than deterministic
/// application failure.
pub fn is_retryable_exit_code(exit_code: i32) -> bool {
    exit_code >= 128
}

/// Whether a job is suspended. Single source of truth the reconcile loop
/// consults before creating or continuing to manage a job's pods.
pub fn is_job_suspended(run_policy: Option<&RunPolicy>) -> bool {
    run_policy.is_some_and(|policy| policy.suspend.unwrap_or(false))
}
