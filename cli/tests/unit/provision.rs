//! Unit tests for the create and start use-cases.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::PathBuf;

use svcforge_cli::application::services::provision::{
    ProvisionOptions, StartOutcome, create_service, start_service,
};
use svcforge_cli::domain::{
    NotFoundError, ReadinessError, ReadinessSettings, ServiceConfig, ValidationError,
};
use svcforge_common::ServiceTemplate;
use tokio_util::sync::CancellationToken;

use crate::helpers::{
    FakeFs, FakeRuntime, MemStore, RecordingReporter, config, no_env, request, template,
};

const CONTAINER: &str = "svcforge.postgres.app";
const IMAGE: &str = "svcforge/service-postgres:app";

fn readiness() -> ReadinessSettings {
    ReadinessSettings {
        attempts: 3,
        timeout_secs: 5,
        wait_secs: 0,
        ..ReadinessSettings::default()
    }
}

async fn create(
    driver: &FakeRuntime,
    store: &MemStore,
    fs: &FakeFs,
    template: &ServiceTemplate,
    req: svcforge_cli::domain::CreateRequest,
) -> anyhow::Result<ServiceConfig> {
    let reporter = RecordingReporter::default();
    create_reporting(driver, store, fs, template, req, &reporter).await
}

async fn create_reporting(
    driver: &FakeRuntime,
    store: &MemStore,
    fs: &FakeFs,
    template: &ServiceTemplate,
    req: svcforge_cli::domain::CreateRequest,
    reporter: &RecordingReporter,
) -> anyhow::Result<ServiceConfig> {
    let settings = readiness();
    let cancel = CancellationToken::new();
    let opts = ProvisionOptions {
        reporter,
        readiness: &settings,
        cancel: &cancel,
    };
    create_service(driver, store, fs, template, req, no_env, &opts).await
}

async fn start(
    driver: &FakeRuntime,
    store: &MemStore,
    fs: &FakeFs,
    template: &ServiceTemplate,
) -> anyhow::Result<StartOutcome> {
    let reporter = RecordingReporter::default();
    let settings = readiness();
    let cancel = CancellationToken::new();
    let opts = ProvisionOptions {
        reporter: &reporter,
        readiness: &settings,
        cancel: &cancel,
    };
    start_service(driver, store, fs, template, "app", &opts).await
}

// ── create ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_runs_stages_in_order() {
    let driver = FakeRuntime::new();
    let store = MemStore::default();
    let fs = FakeFs::default();

    let cfg = create(&driver, &store, &fs, &template(), request("app"))
        .await
        .expect("create should succeed");

    assert_eq!(cfg.container_name(), CONTAINER);
    assert_eq!(
        driver.calls(),
        vec![
            format!("container_exists {CONTAINER}"),
            format!("image_build {IMAGE}"),
            format!("container_create {CONTAINER} {IMAGE}"),
            format!("container_start {CONTAINER}"),
            format!("container_inspect {CONTAINER}"),
            format!("probe_run -c {CONTAINER}:5432 -t 5"),
        ]
    );
    assert_eq!(store.calls(), vec!["save app".to_string()]);
    assert!(store.get("postgres", "app").is_some());
}

#[tokio::test]
async fn test_create_bind_mounts_volume_directory_under_service_root() {
    let driver = FakeRuntime::new();
    let fs = FakeFs::default();

    create(&driver, &MemStore::default(), &fs, &template(), request("app"))
        .await
        .unwrap();

    assert!(
        fs.calls()
            .contains(&"mkdir /data/postgres/app/VAR_LIB_POSTGRESQL_DATA".to_string()),
        "calls: {:?}",
        fs.calls()
    );
    assert!(driver.calls_starting("volume_").is_empty());
}

#[tokio::test]
async fn test_create_with_named_volumes_creates_each_once() {
    let driver = FakeRuntime::new();
    let mut req = request("app");
    req.use_volumes = true;

    create(&driver, &MemStore::default(), &FakeFs::default(), &template(), req)
        .await
        .unwrap();

    assert_eq!(driver.calls_starting("volume_create").len(), 1);
}

#[tokio::test]
async fn test_create_reuses_existing_named_volume() {
    let driver = FakeRuntime::new().with_volume("svcforge.postgres.app.var-lib-postgresql-data");
    let mut req = request("app");
    req.use_volumes = true;

    create(&driver, &MemStore::default(), &FakeFs::default(), &template(), req)
        .await
        .unwrap();

    assert!(driver.calls_starting("volume_create").is_empty());
}

#[tokio::test]
async fn test_create_existing_container_fails_before_any_mutation() {
    let driver = FakeRuntime::new().with_container(CONTAINER, true);
    let store = MemStore::default();

    let err = create(&driver, &store, &FakeFs::default(), &template(), request("app"))
        .await
        .unwrap_err();

    assert_eq!(
        err.downcast_ref::<ValidationError>(),
        Some(&ValidationError::AlreadyExists {
            service_type: "postgres".to_string(),
            name: "app".to_string(),
        })
    );
    assert_eq!(driver.calls(), vec![format!("container_exists {CONTAINER}")]);
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_create_missing_network_fails_before_build() {
    let driver = FakeRuntime::new().with_network("backend");
    let mut req = request("app");
    req.networks.post_create = vec!["backend".to_string()];
    req.networks.post_start = vec!["frontend".to_string()];

    let err = create(&driver, &MemStore::default(), &FakeFs::default(), &template(), req)
        .await
        .unwrap_err();

    assert_eq!(
        err.downcast_ref::<ValidationError>(),
        Some(&ValidationError::MissingNetwork("frontend".to_string()))
    );
    assert!(driver.calls_starting("image_build").is_empty());
}

#[tokio::test]
async fn test_create_connects_networks_around_start() {
    let driver = FakeRuntime::new()
        .with_network("backend")
        .with_network("frontend");
    let mut req = request("app");
    req.networks.post_create = vec!["backend".to_string()];
    req.networks.post_start = vec!["frontend".to_string()];

    create(&driver, &MemStore::default(), &FakeFs::default(), &template(), req)
        .await
        .unwrap();

    let calls = driver.calls();
    let pos = |prefix: &str| calls.iter().position(|c| c.starts_with(prefix)).unwrap();
    assert!(pos("network_connect backend") < pos("container_start"));
    assert!(pos("network_connect frontend") > pos("probe_run"));
    assert!(calls.contains(&format!("network_connect backend {CONTAINER} {CONTAINER}")));
}

#[tokio::test]
async fn test_create_unresolved_argument_fails_without_side_effects() {
    let mut t = template();
    t.arguments[1].value = String::new();
    let driver = FakeRuntime::new();
    let store = MemStore::default();

    let err = create(&driver, &store, &FakeFs::default(), &t, request("app"))
        .await
        .unwrap_err();

    assert_eq!(
        err.downcast_ref::<ValidationError>(),
        Some(&ValidationError::MissingArguments(vec![
            "POSTGRES_USER".to_string()
        ]))
    );
    assert!(driver.calls_starting("image_build").is_empty());
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_create_invalid_name_is_rejected() {
    let driver = FakeRuntime::new();
    let err = create(
        &driver,
        &MemStore::default(),
        &FakeFs::default(),
        &template(),
        request("../etc"),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ValidationError>(),
        Some(ValidationError::InvalidServiceName(_))
    ));
    assert!(driver.calls().is_empty());
}

#[tokio::test]
async fn test_create_build_failure_stops_before_save() {
    let driver = FakeRuntime::new().with_build_exit(1);
    let store = MemStore::default();

    let err = create(&driver, &store, &FakeFs::default(), &template(), request("app"))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("image build"), "got: {err}");
    assert!(store.calls().is_empty());
    assert!(driver.calls_starting("container_create").is_empty());
}

#[tokio::test]
async fn test_create_runs_declared_hooks_at_their_stages() {
    let mut t = template();
    t.hooks.pre_create = true;
    t.hooks.post_create = true;
    t.hooks.post_start = true;
    let driver = FakeRuntime::new();
    let fs = FakeFs::default();

    create(&driver, &MemStore::default(), &fs, &t, request("app"))
        .await
        .unwrap();

    let calls = driver.calls();
    let hooks: Vec<usize> = calls
        .iter()
        .enumerate()
        .filter(|(_, c)| c.starts_with("hook_run"))
        .map(|(i, _)| i)
        .collect();
    let create_at = calls
        .iter()
        .position(|c| c.starts_with("container_create"))
        .unwrap();
    let start_at = calls
        .iter()
        .position(|c| c.starts_with("container_start"))
        .unwrap();
    let probe_at = calls.iter().position(|c| c.starts_with("probe_run")).unwrap();

    assert_eq!(hooks.len(), 3);
    assert!(hooks[0] < create_at);
    assert!(create_at < hooks[1] && hooks[1] < start_at);
    assert!(hooks[2] > probe_at);
    assert!(fs.calls().contains(&"chmod /templates/postgres/bin/pre-create".to_string()));

    let run = driver
        .runs()
        .into_iter()
        .find(|r| r.image == "bash:5")
        .unwrap();
    assert_eq!(
        run.env_file,
        Some(PathBuf::from("/data/postgres/app/.env"))
    );
    assert!(
        run.env
            .contains(&("VOLUME_VAR_LIB_POSTGRESQL_DATA".to_string(), "/var/lib/postgresql/data".to_string()))
    );
}

#[tokio::test]
async fn test_create_failing_hook_aborts_pipeline() {
    let mut t = template();
    t.hooks.post_create = true;
    let driver = FakeRuntime::new().with_hook_exit(2);

    let err = create(&driver, &MemStore::default(), &FakeFs::default(), &t, request("app"))
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("post-create hook"), "got: {err:#}");
    assert!(driver.calls_starting("container_start").is_empty());
}

#[tokio::test]
async fn test_create_relays_hook_output() {
    let mut t = template();
    t.hooks.post_create = true;
    let driver = FakeRuntime::new();
    let reporter = RecordingReporter::default();

    create_reporting(
        &driver,
        &MemStore::default(),
        &FakeFs::default(),
        &t,
        request("app"),
        &reporter,
    )
    .await
    .unwrap();

    let messages = reporter.messages();
    assert!(messages.contains(&"out: hook says hi".to_string()), "{messages:?}");
    assert!(messages.contains(&"out: hook notice".to_string()), "{messages:?}");
}

#[tokio::test]
async fn test_failing_hook_relays_stdout_and_reports_stderr() {
    let mut t = template();
    t.hooks.pre_create = true;
    let driver = FakeRuntime::new().with_hook_exit(3);
    let reporter = RecordingReporter::default();

    let err = create_reporting(
        &driver,
        &MemStore::default(),
        &FakeFs::default(),
        &t,
        request("app"),
        &reporter,
    )
    .await
    .unwrap_err();

    assert!(reporter.messages().contains(&"out: partial work".to_string()));
    assert!(format!("{err:#}").contains("failed"), "got: {err:#}");
}

#[tokio::test]
async fn test_create_without_wait_ports_skips_readiness() {
    let mut t = template();
    t.ports.wait.clear();
    let driver = FakeRuntime::new();

    create(&driver, &MemStore::default(), &FakeFs::default(), &t, request("app"))
        .await
        .unwrap();

    assert!(driver.calls_starting("probe_run").is_empty());
}

#[tokio::test]
async fn test_create_readiness_failure_leaves_container_running() {
    let driver = FakeRuntime::new().with_probe_exits(&[1, 1, 1]);

    let err = create(&driver, &MemStore::default(), &FakeFs::default(), &template(), request("app"))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("running but not ready"), "got: {err}");
    assert_eq!(
        err.downcast_ref::<ReadinessError>(),
        Some(&ReadinessError::NotListening { port: 5432 })
    );
    assert!(driver.container(CONTAINER).unwrap().running);
}

// ── start ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_start_without_config_is_not_found() {
    let driver = FakeRuntime::new();
    let err = start(&driver, &MemStore::default(), &FakeFs::default(), &template())
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<NotFoundError>(),
        Some(NotFoundError::Service { .. })
    ));
}

#[tokio::test]
async fn test_start_running_container_is_a_no_op() {
    let t = template();
    let driver = FakeRuntime::new().with_container(CONTAINER, true);
    let store = MemStore::default().with(config(&t, "app"));

    let outcome = start(&driver, &store, &FakeFs::default(), &t).await.unwrap();

    assert_eq!(outcome, StartOutcome::AlreadyRunning);
    assert_eq!(driver.calls(), vec![format!("container_inspect {CONTAINER}")]);
}

#[tokio::test]
async fn test_start_stopped_container_restarts_without_rebuild() {
    let t = template();
    let driver = FakeRuntime::new().with_container(CONTAINER, false);
    let store = MemStore::default().with(config(&t, "app"));

    let outcome = start(&driver, &store, &FakeFs::default(), &t).await.unwrap();

    assert_eq!(outcome, StartOutcome::Restarted);
    assert!(driver.calls_starting("image_").is_empty());
    assert!(driver.container(CONTAINER).unwrap().running);
}

#[tokio::test]
async fn test_start_missing_container_recreates_from_stored_config() {
    let t = template();
    let cfg = config(&t, "app");
    let driver = FakeRuntime::new().with_image(IMAGE);
    let store = MemStore::default().with(cfg.clone());
    let fs = FakeFs::default().with_file(&cfg.id_file());

    let outcome = start(&driver, &store, &fs, &t).await.unwrap();

    assert_eq!(outcome, StartOutcome::Recreated);
    assert!(driver.calls_starting("image_build").is_empty());
    assert_eq!(driver.calls_starting("container_create").len(), 1);
    assert!(fs.calls().contains(&"rm /data/postgres/app/ID".to_string()));
    assert_eq!(store.calls(), vec!["write_env app".to_string()]);
}

#[tokio::test]
async fn test_start_missing_image_is_rebuilt() {
    let t = template();
    let driver = FakeRuntime::new();
    let store = MemStore::default().with(config(&t, "app"));

    let outcome = start(&driver, &store, &FakeFs::default(), &t).await.unwrap();

    assert_eq!(outcome, StartOutcome::Recreated);
    assert_eq!(driver.calls_starting("image_build"), vec![format!("image_build {IMAGE}")]);
}

#[tokio::test]
async fn test_start_recreate_uses_current_template_hooks() {
    let stored = template();
    let mut live = template();
    live.hooks.post_start = true;
    let driver = FakeRuntime::new().with_image(IMAGE);
    let store = MemStore::default().with(config(&stored, "app"));

    start(&driver, &store, &FakeFs::default(), &live).await.unwrap();

    assert_eq!(driver.calls_starting("hook_run").len(), 1);
}
