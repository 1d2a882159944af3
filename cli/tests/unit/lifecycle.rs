//! Unit tests for pause, stop, destroy, exists, list and logs.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use svcforge_cli::application::services::lifecycle::{
    StopOutcome, destroy_service, list_services, pause_service, service_exists, service_logs,
    stop_service,
};
use svcforge_cli::domain::NotFoundError;

use crate::helpers::{FakeRuntime, MemStore, config, template};

const CONTAINER: &str = "svcforge.postgres.app";

// ── pause ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_pause_running_container_stops_but_keeps_it() {
    let driver = FakeRuntime::new().with_container(CONTAINER, true);

    let outcome = pause_service(&driver, "postgres", "app").await.unwrap();

    assert_eq!(outcome, StopOutcome::Stopped);
    let state = driver.container(CONTAINER).expect("container kept");
    assert!(!state.running);
    assert!(driver.calls_starting("container_remove").is_empty());
}

#[tokio::test]
async fn test_pause_stopped_container_is_a_no_op() {
    let driver = FakeRuntime::new().with_container(CONTAINER, false);

    let outcome = pause_service(&driver, "postgres", "app").await.unwrap();

    assert_eq!(outcome, StopOutcome::AlreadyStopped);
    assert!(driver.calls_starting("container_stop").is_empty());
}

#[tokio::test]
async fn test_pause_absent_container_reports_absent() {
    let driver = FakeRuntime::new();
    let outcome = pause_service(&driver, "postgres", "app").await.unwrap();
    assert_eq!(outcome, StopOutcome::Absent);
}

// ── stop ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_stop_removes_the_container() {
    let driver = FakeRuntime::new().with_container(CONTAINER, true);

    let outcome = stop_service(&driver, "postgres", "app").await.unwrap();

    assert_eq!(outcome, StopOutcome::Stopped);
    assert!(driver.container(CONTAINER).is_none());
    assert_eq!(
        driver.calls(),
        vec![
            format!("container_inspect {CONTAINER}"),
            format!("container_stop {CONTAINER}"),
            format!("container_remove {CONTAINER}"),
        ]
    );
}

#[tokio::test]
async fn test_stop_stopped_container_still_removes_it() {
    let driver = FakeRuntime::new().with_container(CONTAINER, false);

    let outcome = stop_service(&driver, "postgres", "app").await.unwrap();

    assert_eq!(outcome, StopOutcome::AlreadyStopped);
    assert!(driver.container(CONTAINER).is_none());
}

#[tokio::test]
async fn test_stop_absent_container_touches_nothing() {
    let driver = FakeRuntime::new();

    let outcome = stop_service(&driver, "postgres", "app").await.unwrap();

    assert_eq!(outcome, StopOutcome::Absent);
    assert_eq!(driver.calls(), vec![format!("container_inspect {CONTAINER}")]);
}

// ── destroy ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_destroy_removes_container_and_service_root() {
    let t = template();
    let driver = FakeRuntime::new().with_container(CONTAINER, true);
    let store = MemStore::default().with(config(&t, "app"));

    destroy_service(&driver, &store, "postgres", "app")
        .await
        .unwrap();

    assert!(driver.container(CONTAINER).is_none());
    assert_eq!(store.calls(), vec!["remove app".to_string()]);
    assert!(store.get("postgres", "app").is_none());
}

#[tokio::test]
async fn test_destroy_tolerates_missing_container() {
    let t = template();
    let driver = FakeRuntime::new();
    let store = MemStore::default().with(config(&t, "app"));

    destroy_service(&driver, &store, "postgres", "app")
        .await
        .unwrap();

    assert_eq!(store.calls(), vec!["remove app".to_string()]);
}

#[tokio::test]
async fn test_destroy_cleans_up_orphan_container_without_config() {
    let driver = FakeRuntime::new().with_container(CONTAINER, false);
    let store = MemStore::default();

    destroy_service(&driver, &store, "postgres", "app")
        .await
        .unwrap();

    assert!(driver.container(CONTAINER).is_none());
}

#[tokio::test]
async fn test_destroy_nothing_is_not_found() {
    let err = destroy_service(&FakeRuntime::new(), &MemStore::default(), "postgres", "app")
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<NotFoundError>(),
        Some(NotFoundError::Service { .. })
    ));
}

#[tokio::test]
async fn test_destroy_removes_root_with_damaged_config() {
    let driver = FakeRuntime::new().with_container(CONTAINER, false);
    let store = MemStore::default().with_damaged("postgres", "app");

    destroy_service(&driver, &store, "postgres", "app")
        .await
        .unwrap();

    assert!(driver.container(CONTAINER).is_none());
    assert_eq!(store.calls(), vec!["remove app".to_string()]);
    assert!(!store.has_root("postgres", "app"));
}

#[tokio::test]
async fn test_destroy_damaged_config_without_container() {
    let store = MemStore::default().with_damaged("postgres", "app");

    destroy_service(&FakeRuntime::new(), &store, "postgres", "app")
        .await
        .unwrap();

    assert!(!store.has_root("postgres", "app"));
}

#[tokio::test]
async fn test_destroy_keeps_named_volumes() {
    let volume = "svcforge.postgres.app.var-lib-postgresql-data";
    let t = template();
    let driver = FakeRuntime::new()
        .with_container(CONTAINER, true)
        .with_volume(volume);
    let store = MemStore::default().with(config(&t, "app"));

    destroy_service(&driver, &store, "postgres", "app")
        .await
        .unwrap();

    assert!(driver.has_volume(volume));
}

// ── exists / list ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_exists_follows_stored_config() {
    let t = template();
    let store = MemStore::default().with(config(&t, "app"));

    assert!(service_exists(&store, "postgres", "app").await.unwrap());
    assert!(!service_exists(&store, "postgres", "other").await.unwrap());
    assert!(!service_exists(&store, "redis", "app").await.unwrap());
}

#[tokio::test]
async fn test_exists_rejects_invalid_name() {
    assert!(
        service_exists(&MemStore::default(), "postgres", "Bad Name")
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_list_reports_running_state_per_instance() {
    let t = template();
    let driver = FakeRuntime::new().with_container(CONTAINER, true);
    let store = MemStore::default()
        .with(config(&t, "app"))
        .with(config(&t, "other"));

    let statuses = list_services(&driver, &store, "postgres").await.unwrap();

    let view: Vec<(String, bool)> = statuses
        .iter()
        .map(|s| (s.config.service_name.clone(), s.running))
        .collect();
    assert_eq!(
        view,
        vec![("app".to_string(), true), ("other".to_string(), false)]
    );
}

// ── logs ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_logs_require_a_container() {
    let err = service_logs(&FakeRuntime::new(), "postgres", "app", false, None)
        .await
        .unwrap_err();

    assert_eq!(
        err.downcast_ref::<NotFoundError>(),
        Some(&NotFoundError::Container(CONTAINER.to_string()))
    );
}

#[tokio::test]
async fn test_logs_pass_follow_and_tail() {
    let driver = FakeRuntime::new().with_container(CONTAINER, true);

    let status = service_logs(&driver, "postgres", "app", true, Some(50))
        .await
        .unwrap();

    assert!(status.success());
    assert_eq!(
        driver.calls_starting("container_logs"),
        vec![format!("container_logs {CONTAINER} follow=true tail=Some(50)")]
    );
}
