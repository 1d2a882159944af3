//! Readiness probe: wait until every declared port accepts connections.
//!
//! One check per port runs concurrently. Each attempt starts a disposable
//! probe container linked to the service under its network alias. The first
//! port to exhaust its attempts cancels the others and its error is returned.

use std::time::Duration;

use futures_util::StreamExt as _;
use futures_util::stream::FuturesUnordered;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{ContainerRuntime, RunSpec};
use crate::domain::{ReadinessError, ReadinessSettings};

/// Added to the probe's own connect timeout to cover container startup.
const PROBE_STARTUP_ALLOWANCE: Duration = Duration::from_secs(10);

/// What to probe.
#[derive(Debug, Clone, Copy)]
pub struct ProbeTarget<'a> {
    pub container: &'a str,
    pub alias: &'a str,
    pub network: Option<&'a str>,
    pub ports: &'a [u16],
}

enum AttemptError {
    /// Give up on this port immediately.
    Fatal(ReadinessError),
    /// Counts against the attempt budget.
    Retry(ReadinessError),
}

/// Block until all ports are connectable or one definitively fails.
///
/// Cancelling `cancel` aborts every in-flight check.
///
/// # Errors
///
/// Returns the first port's `ReadinessError`, `NotRunning` if the container
/// has no live process, `NoPorts` for an empty port list, or `Cancelled`.
pub async fn wait_for_ports(
    driver: &impl ContainerRuntime,
    target: ProbeTarget<'_>,
    settings: &ReadinessSettings,
    cancel: &CancellationToken,
) -> Result<(), ReadinessError> {
    if target.ports.is_empty() {
        return Err(ReadinessError::NoPorts);
    }

    let group = cancel.child_token();
    let mut checks: FuturesUnordered<_> = target
        .ports
        .iter()
        .map(|&port| check_port(driver, target, port, settings, &group))
        .collect();

    let mut first_error: Option<ReadinessError> = None;
    while let Some(result) = checks.next().await {
        match result {
            Ok(()) => {}
            Err(ReadinessError::Cancelled) => {
                if first_error.is_none() && cancel.is_cancelled() {
                    first_error = Some(ReadinessError::Cancelled);
                }
            }
            Err(err) => {
                if first_error.is_none() {
                    tracing::debug!(error = %err, "readiness check failed, cancelling the rest");
                    group.cancel();
                    first_error = Some(err);
                }
            }
        }
    }

    first_error.map_or(Ok(()), Err)
}

async fn check_port(
    driver: &impl ContainerRuntime,
    target: ProbeTarget<'_>,
    port: u16,
    settings: &ReadinessSettings,
    cancel: &CancellationToken,
) -> Result<(), ReadinessError> {
    let attempts = settings.attempts.max(1);
    let deadline = settings.timeout() + PROBE_STARTUP_ALLOWANCE;
    let mut last = ReadinessError::NotListening { port };

    for attempt in 1..=attempts {
        if attempt > 1 {
            tokio::select! {
                () = cancel.cancelled() => return Err(ReadinessError::Cancelled),
                () = tokio::time::sleep(settings.wait()) => {}
            }
        }

        let outcome = tokio::select! {
            () = cancel.cancelled() => return Err(ReadinessError::Cancelled),
            r = tokio::time::timeout(deadline, attempt_once(driver, target, port, settings)) => r,
        };

        match outcome {
            Ok(Ok(())) => {
                tracing::debug!(port, attempt, "port is listening");
                return Ok(());
            }
            Ok(Err(AttemptError::Fatal(err))) => return Err(err),
            Ok(Err(AttemptError::Retry(err))) => last = err,
            Err(_) => {
                last = ReadinessError::Timeout {
                    port,
                    secs: settings.timeout_secs,
                };
            }
        }
        tracing::debug!(port, attempt, attempts, error = %last, "readiness attempt failed");
    }

    Err(last)
}

async fn attempt_once(
    driver: &impl ContainerRuntime,
    target: ProbeTarget<'_>,
    port: u16,
    settings: &ReadinessSettings,
) -> Result<(), AttemptError> {
    let state = driver
        .container_inspect(target.container)
        .await
        .map_err(|e| {
            tracing::debug!(error = %e, "inspect failed during readiness check");
            AttemptError::Retry(ReadinessError::NotListening { port })
        })?;
    let state = match state {
        Some(state) if state.is_live() => state,
        _ => {
            return Err(AttemptError::Fatal(ReadinessError::NotRunning(
                target.container.to_string(),
            )));
        }
    };

    let spec = RunSpec {
        image: settings.image.clone(),
        links: vec![(state.name, target.alias.to_string())],
        network: target.network.map(str::to_string),
        command: vec![
            "-c".to_string(),
            format!("{}:{port}", target.alias),
            "-t".to_string(),
            settings.timeout_secs.to_string(),
        ],
        ..RunSpec::default()
    };

    match driver.container_run(&spec).await {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(AttemptError::Retry(ReadinessError::NotListening { port })),
        Err(e) => {
            tracing::debug!(error = %e, port, "probe container failed to run");
            Err(AttemptError::Retry(ReadinessError::NotListening { port }))
        }
    }
}
