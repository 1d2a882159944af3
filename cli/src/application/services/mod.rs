//! Application services: use-case orchestration.
//!
//! Each service module implements a single use-case by composing domain logic
//! with port trait calls. Services import only from `crate::domain` and
//! `crate::application::ports`, never from `crate::infra`, `crate::commands`,
//! or `crate::output`.

pub mod exec;
pub mod hooks;
pub mod lifecycle;
pub mod provision;
pub mod readiness;
pub mod volumes;

use std::process::Output;

use anyhow::Result;

use crate::domain::RuntimeError;

/// Turn a non-zero exit into a typed `RuntimeError` naming the operation.
///
/// # Errors
///
/// Returns `RuntimeError` when `output` reports failure.
pub fn check(output: Output, operation: &str) -> Result<Output> {
    if output.status.success() {
        return Ok(output);
    }
    Err(RuntimeError {
        operation: operation.to_string(),
        code: output.status.code().unwrap_or(-1),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
    .into())
}
