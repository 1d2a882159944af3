//! Application service: service create and start use-cases.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits. Stages run strictly in
//! order; a failing stage aborts the flow and leaves earlier side effects in
//! place.

use anyhow::{Context, Result};
use chrono::Utc;
use svcforge_common::ServiceTemplate;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{
    BuildSpec, ContainerSpec, LocalFs, ProgressReporter, RuntimeDriver, ServiceStore,
};
use crate::application::services::check;
use crate::application::services::hooks::{Hook, run_hook};
use crate::application::services::readiness::{ProbeTarget, wait_for_ports};
use crate::application::services::volumes::{self, ProvisionedVolume};
use crate::domain::{
    CreateRequest, NotFoundError, ReadinessSettings, ServiceConfig, ValidationError, naming,
};

/// Settings shared by the create and start flows.
pub struct ProvisionOptions<'a, R: ProgressReporter> {
    pub reporter: &'a R,
    pub readiness: &'a ReadinessSettings,
    /// Honoured by the readiness probe only.
    pub cancel: &'a CancellationToken,
}

/// Outcome of the `start_service` use-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The container was already running.
    AlreadyRunning,
    /// A stopped container was started again.
    Restarted,
    /// The container was missing and has been provisioned from the stored configuration.
    Recreated,
}

/// Create a new service instance and bring it up.
///
/// `env` supplies fallback values for overrides given without a value.
///
/// # Errors
///
/// Returns a `ValidationError` if the container already exists, a declared
/// network is missing, or an argument is unresolved; otherwise the error of
/// the first stage that fails.
pub async fn create_service<F>(
    driver: &impl RuntimeDriver,
    store: &impl ServiceStore,
    local_fs: &impl LocalFs,
    template: &ServiceTemplate,
    request: CreateRequest,
    env: F,
    opts: &ProvisionOptions<'_, impl ProgressReporter>,
) -> Result<ServiceConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let reporter = opts.reporter;
    naming::validate_service_name(&request.name)?;

    // Step 1: the container must not exist yet.
    let container = naming::container_name(&template.name, &request.name);
    if driver.container_exists(&container).await? {
        return Err(ValidationError::AlreadyExists {
            service_type: template.name.clone(),
            name: request.name,
        }
        .into());
    }

    // Step 2: every external network must already exist.
    for network in request.networks.attached() {
        if !driver.network_exists(network).await? {
            return Err(ValidationError::MissingNetwork(network.to_string()).into());
        }
    }

    // Step 3: resolve arguments into the canonical configuration.
    let config = ServiceConfig::resolve(request, template, env, Utc::now())?;

    // Step 4: build the service image.
    reporter.step("building service image...");
    build_image(driver, template, &config).await?;
    reporter.success("service image built");

    // Step 5: persist the configuration and env file.
    store
        .save(&config)
        .await
        .context("writing service configuration")?;

    bring_up(driver, local_fs, template, &config, opts).await?;
    Ok(config)
}

/// Start an existing service instance.
///
/// A running container is left alone, a stopped one is started, and a
/// missing one is provisioned again from the stored configuration. Hooks
/// always come from `template`, the registry's current copy.
///
/// # Errors
///
/// Returns `NotFoundError::Service` when no configuration is stored, or the
/// error of the first stage that fails.
pub async fn start_service(
    driver: &impl RuntimeDriver,
    store: &impl ServiceStore,
    local_fs: &impl LocalFs,
    template: &ServiceTemplate,
    name: &str,
    opts: &ProvisionOptions<'_, impl ProgressReporter>,
) -> Result<StartOutcome> {
    let reporter = opts.reporter;
    let config = load_config(store, &template.name, name).await?;
    let container = config.container_name();

    match driver.container_inspect(&container).await? {
        Some(state) if state.running => Ok(StartOutcome::AlreadyRunning),
        Some(_) => {
            reporter.step("starting container...");
            check(
                driver.container_start(&container).await?,
                "container start",
            )?;
            reporter.success("container started");
            Ok(StartOutcome::Restarted)
        }
        None => {
            let id_file = config.id_file();
            if local_fs.exists(&id_file) {
                local_fs.remove_file(&id_file)?;
            }

            if driver.image_exists(&config.image_name()).await? {
                tracing::debug!(image = %config.image_name(), "service image present, skipping build");
            } else {
                reporter.step("building service image...");
                build_image(driver, template, &config).await?;
                reporter.success("service image built");
            }

            local_fs.create_dir_all(&config.service_root)?;
            store
                .write_env(&config)
                .await
                .context("writing service env file")?;

            bring_up(driver, local_fs, template, &config, opts).await?;
            Ok(StartOutcome::Recreated)
        }
    }
}

/// Load a stored configuration or fail with `NotFoundError::Service`.
///
/// # Errors
///
/// Returns `NotFoundError::Service` if nothing is stored for the instance.
pub async fn load_config(
    store: &impl ServiceStore,
    service_type: &str,
    name: &str,
) -> Result<ServiceConfig> {
    naming::validate_service_name(name)?;
    store.load(service_type, name).await?.ok_or_else(|| {
        NotFoundError::Service {
            service_type: service_type.to_string(),
            name: name.to_string(),
        }
        .into()
    })
}

async fn build_image(
    driver: &impl RuntimeDriver,
    template: &ServiceTemplate,
    config: &ServiceConfig,
) -> Result<()> {
    let recipe = template.recipe_path();
    let build_args = config.build_args();
    let tag = config.image_name();
    let spec = BuildSpec {
        tag: &tag,
        recipe: &recipe,
        context: &template.path,
        build_args: &build_args,
        flags: &config.image_build_flags,
    };
    check(driver.image_build(&spec).await?, "image build")?;
    Ok(())
}

/// Steps 6 to 14: volumes, hooks, container, networks, start, readiness.
async fn bring_up(
    driver: &impl RuntimeDriver,
    local_fs: &impl LocalFs,
    template: &ServiceTemplate,
    config: &ServiceConfig,
    opts: &ProvisionOptions<'_, impl ProgressReporter>,
) -> Result<()> {
    let reporter = opts.reporter;
    let container = config.container_name();
    let alias = config.network_alias();

    // Step 6: volumes.
    if !config.template.volumes.is_empty() {
        reporter.step("provisioning volumes...");
    }
    let volumes = volumes::provision_all(driver, local_fs, config)
        .await
        .context("provisioning volumes")?;

    // Step 7: pre-create hook.
    hook(driver, local_fs, template, config, &volumes, Hook::PreCreate, reporter).await?;

    // Step 8: create the container.
    reporter.step("creating container...");
    let mounts: Vec<_> = volumes.iter().map(|v| v.mount.clone()).collect();
    let env_file = config.env_file();
    let id_file = config.id_file();
    let spec = ContainerSpec {
        name: &container,
        image: &config.image_name(),
        env_file: &env_file,
        hostname: &container,
        cid_file: &id_file,
        use_volumes: config.use_volumes,
        network: config.networks.initial.as_deref(),
        create_flags: &config.container_create_flags,
        mounts: &mounts,
    };
    check(driver.container_create(&spec).await?, "container create")?;

    // Step 9: post-create networks.
    for network in &config.networks.post_create {
        check(
            driver.network_connect(network, &container, &alias).await?,
            &format!("network connect {network}"),
        )?;
    }

    // Step 10: post-create hook.
    hook(driver, local_fs, template, config, &volumes, Hook::PostCreate, reporter).await?;

    // Step 11: start.
    reporter.step("starting container...");
    check(driver.container_start(&container).await?, "container start")?;

    // Step 12: readiness. The container is left running on failure.
    let ports = &config.template.ports.wait;
    if !ports.is_empty() {
        reporter.step("waiting for service to accept connections...");
        let target = ProbeTarget {
            container: &container,
            alias: &alias,
            network: config.networks.initial.as_deref(),
            ports,
        };
        wait_for_ports(driver, target, opts.readiness, opts.cancel)
            .await
            .with_context(|| format!("container {container} is running but not ready"))?;
    }
    reporter.success("container running");

    // Step 13: post-start networks.
    for network in &config.networks.post_start {
        check(
            driver.network_connect(network, &container, &alias).await?,
            &format!("network connect {network}"),
        )?;
    }

    // Step 14: post-start hook.
    hook(driver, local_fs, template, config, &volumes, Hook::PostStart, reporter).await?;
    Ok(())
}

async fn hook(
    driver: &impl RuntimeDriver,
    local_fs: &impl LocalFs,
    template: &ServiceTemplate,
    config: &ServiceConfig,
    volumes: &[ProvisionedVolume],
    which: Hook,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    if which.is_declared(template) {
        reporter.step(&format!("running {} hook...", which.name()));
    }
    if run_hook(driver, local_fs, template, config, volumes, which, reporter)
        .await
        .with_context(|| format!("{} hook failed", which.name()))?
    {
        reporter.success(&format!("{} hook finished", which.name()));
    }
    Ok(())
}
