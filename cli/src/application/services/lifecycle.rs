//! Application service: pause, stop, destroy and inspection use-cases.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::process::ExitStatus;

use anyhow::{Context, Result};

use crate::application::ports::{ContainerRuntime, ServiceStore};
use crate::application::services::check;
use crate::domain::{NotFoundError, ServiceConfig, naming};

/// What a pause or stop did to the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The container was running and is now stopped.
    Stopped,
    /// The container existed but was not running.
    AlreadyStopped,
    /// There was no container.
    Absent,
}

/// Stop the container, keeping it for a later start.
///
/// # Errors
///
/// Returns an error if the runtime refuses to stop the container.
pub async fn pause_service(
    driver: &impl ContainerRuntime,
    service_type: &str,
    name: &str,
) -> Result<StopOutcome> {
    naming::validate_service_name(name)?;
    let container = naming::container_name(service_type, name);
    halt(driver, &container).await
}

/// Stop and remove the container. Data and configuration are kept.
///
/// # Errors
///
/// Returns an error if the runtime refuses to stop or remove the container.
pub async fn stop_service(
    driver: &impl ContainerRuntime,
    service_type: &str,
    name: &str,
) -> Result<StopOutcome> {
    naming::validate_service_name(name)?;
    let container = naming::container_name(service_type, name);
    let outcome = halt(driver, &container).await?;
    if outcome != StopOutcome::Absent {
        check(
            driver.container_remove(&container).await?,
            "container remove",
        )?;
    }
    Ok(outcome)
}

/// Remove the container and the service root.
///
/// The stored configuration is never parsed, so a damaged snapshot does not
/// block removal. Named volumes are left in place.
///
/// # Errors
///
/// Returns `NotFoundError::Service` if neither a container nor a service
/// root exists, or the error of the runtime or store.
pub async fn destroy_service(
    driver: &impl ContainerRuntime,
    store: &impl ServiceStore,
    service_type: &str,
    name: &str,
) -> Result<()> {
    naming::validate_service_name(name)?;
    let container = naming::container_name(service_type, name);
    let has_root = store.exists(service_type, name).await?;
    let container_gone = stop_service(driver, service_type, name).await? == StopOutcome::Absent;

    if container_gone && !has_root {
        return Err(NotFoundError::Service {
            service_type: service_type.to_string(),
            name: name.to_string(),
        }
        .into());
    }

    tracing::debug!(container = %container, "removing service root");
    store
        .remove(service_type, name)
        .await
        .context("removing service data")?;
    Ok(())
}

/// Whether a configuration is stored for the service.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub async fn service_exists(
    store: &impl ServiceStore,
    service_type: &str,
    name: &str,
) -> Result<bool> {
    naming::validate_service_name(name)?;
    Ok(store.load(service_type, name).await?.is_some())
}

/// A provisioned instance and whether its container is running.
#[derive(Debug, Clone)]
pub struct ServiceStatus {
    pub config: ServiceConfig,
    pub running: bool,
}

/// Every stored instance of a service type with its live state.
///
/// # Errors
///
/// Returns an error if the store or runtime cannot be queried.
pub async fn list_services(
    driver: &impl ContainerRuntime,
    store: &impl ServiceStore,
    service_type: &str,
) -> Result<Vec<ServiceStatus>> {
    let mut statuses = Vec::new();
    for config in store.list(service_type).await? {
        let running = driver
            .container_inspect(&config.container_name())
            .await?
            .is_some_and(|state| state.running);
        statuses.push(ServiceStatus { config, running });
    }
    Ok(statuses)
}

/// Stream the container's logs to the terminal.
///
/// # Errors
///
/// Returns `NotFoundError::Container` if the container does not exist.
pub async fn service_logs(
    driver: &impl ContainerRuntime,
    service_type: &str,
    name: &str,
    follow: bool,
    tail: Option<u32>,
) -> Result<ExitStatus> {
    naming::validate_service_name(name)?;
    let container = naming::container_name(service_type, name);
    if !driver.container_exists(&container).await? {
        return Err(NotFoundError::Container(container).into());
    }
    driver.container_logs(&container, follow, tail).await
}

async fn halt(driver: &impl ContainerRuntime, container: &str) -> Result<StopOutcome> {
    match driver.container_inspect(container).await? {
        None => Ok(StopOutcome::Absent),
        Some(state) if !state.running => Ok(StopOutcome::AlreadyStopped),
        Some(_) => {
            check(driver.container_stop(container).await?, "container stop")?;
            Ok(StopOutcome::Stopped)
        }
    }
}
