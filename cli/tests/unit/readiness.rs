//! Unit tests for the readiness probe.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::time::Duration;

use svcforge_cli::application::services::readiness::{ProbeTarget, wait_for_ports};
use svcforge_cli::domain::{ReadinessError, ReadinessSettings};
use tokio_util::sync::CancellationToken;

use crate::helpers::FakeRuntime;

const CONTAINER: &str = "svcforge.redis.cache";

fn settings(attempts: u32) -> ReadinessSettings {
    ReadinessSettings {
        attempts,
        timeout_secs: 2,
        wait_secs: 0,
        image: "probe:latest".to_string(),
    }
}

fn target(ports: &[u16]) -> ProbeTarget<'_> {
    ProbeTarget {
        container: CONTAINER,
        alias: CONTAINER,
        network: None,
        ports,
    }
}

#[tokio::test]
async fn test_no_ports_is_an_error() {
    let driver = FakeRuntime::new().with_container(CONTAINER, true);
    let err = wait_for_ports(&driver, target(&[]), &settings(1), &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err, ReadinessError::NoPorts);
    assert!(driver.calls().is_empty());
}

#[tokio::test]
async fn test_listening_port_succeeds_first_try() {
    let driver = FakeRuntime::new().with_container(CONTAINER, true);

    wait_for_ports(&driver, target(&[6379]), &settings(3), &CancellationToken::new())
        .await
        .unwrap();

    let runs = driver.runs();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].image, "probe:latest");
    assert_eq!(
        runs[0].links,
        vec![(CONTAINER.to_string(), CONTAINER.to_string())]
    );
    assert_eq!(
        runs[0].command,
        vec!["-c", "svcforge.redis.cache:6379", "-t", "2"]
    );
}

#[tokio::test]
async fn test_retries_until_port_listens() {
    let driver = FakeRuntime::new()
        .with_container(CONTAINER, true)
        .with_probe_exits(&[1, 1, 0]);

    wait_for_ports(&driver, target(&[6379]), &settings(3), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(driver.runs().len(), 3);
}

#[tokio::test]
async fn test_exhausted_attempts_report_not_listening() {
    let driver = FakeRuntime::new()
        .with_container(CONTAINER, true)
        .with_probe_exits(&[1, 1]);

    let err = wait_for_ports(&driver, target(&[6379]), &settings(2), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err, ReadinessError::NotListening { port: 6379 });
    assert_eq!(err.port(), Some(6379));
}

#[tokio::test]
async fn test_dead_container_fails_without_probing() {
    let driver = FakeRuntime::new().with_container(CONTAINER, false);

    let err = wait_for_ports(&driver, target(&[6379]), &settings(5), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err, ReadinessError::NotRunning(CONTAINER.to_string()));
    assert!(driver.runs().is_empty());
}

#[tokio::test]
async fn test_missing_container_is_not_running() {
    let driver = FakeRuntime::new();

    let err = wait_for_ports(&driver, target(&[6379]), &settings(1), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ReadinessError::NotRunning(_)));
}

#[tokio::test]
async fn test_every_port_is_probed() {
    let driver = FakeRuntime::new().with_container(CONTAINER, true);

    wait_for_ports(
        &driver,
        target(&[5432, 8080]),
        &settings(1),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    let mut probed: Vec<String> = driver.runs().into_iter().map(|r| r.command[1].clone()).collect();
    probed.sort();
    assert_eq!(
        probed,
        vec![
            "svcforge.redis.cache:5432".to_string(),
            "svcforge.redis.cache:8080".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_cancelled_token_aborts_the_wait() {
    let driver = FakeRuntime::new()
        .with_container(CONTAINER, true)
        .with_probe_exits(&[1; 16]);
    let slow = ReadinessSettings {
        attempts: 16,
        timeout_secs: 2,
        wait_secs: 30,
        image: "probe:latest".to_string(),
    };
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let err = tokio::time::timeout(
        Duration::from_secs(5),
        wait_for_ports(&driver, target(&[6379]), &slow, &cancel),
    )
    .await
    .expect("cancellation should end the wait promptly")
    .unwrap_err();

    assert_eq!(err, ReadinessError::Cancelled);
}

#[tokio::test]
async fn test_failing_port_is_named_even_when_sibling_succeeds() {
    let driver = FakeRuntime::new()
        .with_container(CONTAINER, true)
        .with_port_exits(5432, &[1, 1, 1])
        .with_port_exits(6379, &[0]);

    let err = wait_for_ports(
        &driver,
        target(&[5432, 6379]),
        &settings(3),
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    assert_eq!(err, ReadinessError::NotListening { port: 5432 });
    assert_eq!(driver.probes_of(5432), 3);
    assert!(driver.probes_of(6379) <= 1);
}

#[tokio::test]
async fn test_exhausted_port_cancels_slow_sibling() {
    let driver = FakeRuntime::new()
        .with_container(CONTAINER, true)
        .with_port_exits(5432, &[1; 20])
        .with_port_exits(6379, &[1; 20])
        .with_port_delay(6379, Duration::from_secs(30));
    let many = ReadinessSettings {
        attempts: 20,
        timeout_secs: 60,
        wait_secs: 0,
        image: "probe:latest".to_string(),
    };

    let started = std::time::Instant::now();
    let err = tokio::time::timeout(
        Duration::from_secs(5),
        wait_for_ports(&driver, target(&[5432, 6379]), &many, &CancellationToken::new()),
    )
    .await
    .expect("the slow sibling should be cancelled")
    .unwrap_err();

    assert_eq!(err, ReadinessError::NotListening { port: 5432 });
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(driver.probes_of(5432), 20);
    assert!(driver.probes_of(6379) <= 1);
}
