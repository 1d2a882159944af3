//! Integration tests for the svcforge command line.
//!
//! Everything here runs without a container runtime: template inspection,
//! argument parsing, and the service commands that fail or answer before
//! the runtime is consulted.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::Command;
use chrono::Utc;
use predicates::prelude::*;
use svcforge_cli::application::ports::ServiceStore;
use svcforge_cli::domain::{CreateRequest, ServiceConfig};
use svcforge_cli::infra::registry::TemplateRegistry;
use svcforge_cli::infra::state::FsServiceStore;
use tempfile::TempDir;

/// Isolated environment: empty data root, no settings file, CI mode.
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: TempDir::new().expect("tempdir"),
        }
    }

    fn data_root(&self) -> std::path::PathBuf {
        self.dir.path().join("data")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("svcforge"));
        cmd.env("NO_COLOR", "1")
            .env("CI", "1")
            .env("SVCFORGE_CONFIG", self.dir.path().join("config.yaml"))
            .env("SVCFORGE_DATA_ROOT", self.data_root())
            .env_remove("SVCFORGE_REGISTRY_PATH")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Persist a resolved postgres configuration named `name`.
    async fn seed(&self, name: &str) {
        let registry = TemplateRegistry::vendored().unwrap();
        let template = registry.get("postgres").unwrap();
        let request = CreateRequest {
            name: name.to_string(),
            data_root: self.data_root(),
            ..CreateRequest::default()
        };
        let config = ServiceConfig::resolve(request, template, |_| None, Utc::now()).unwrap();
        FsServiceStore::new(self.data_root())
            .save(&config)
            .await
            .unwrap();
    }
}

fn write_template(root: &Path, dir: &str, recipe: &str) {
    let path = root.join(dir);
    std::fs::create_dir_all(&path).unwrap();
    std::fs::write(path.join("Dockerfile"), recipe).unwrap();
}

const MEMCACHED: &str = r#"
ARG IMAGE="memcached:1.6"
FROM ${IMAGE}
LABEL com.svcforge.template.name="memcached"
LABEL com.svcforge.template.description="Distributed memory cache"
LABEL com.svcforge.template.config.ports.wait="11211"
"#;

// ── Help and version ─────────────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help_and_exits_two() {
    Sandbox::new()
        .cmd()
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "Provision backing-service containers from templates",
        ));
}

#[test]
fn test_help_lists_command_groups() {
    Sandbox::new()
        .cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("service"))
        .stdout(predicate::str::contains("template"))
        .stdout(predicate::str::contains("version"));
}

#[test]
fn test_service_help_lists_lifecycle_commands() {
    let assert = Sandbox::new()
        .cmd()
        .args(["service", "--help"])
        .assert()
        .success();
    let out = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    for command in [
        "create", "start", "pause", "stop", "destroy", "enter", "connect", "export", "import",
        "logs", "list", "exists", "info",
    ] {
        assert!(out.contains(command), "missing {command} in:\n{out}");
    }
}

#[test]
fn test_version_command() {
    Sandbox::new()
        .cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(concat!(
            "svcforge ",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_version_json() {
    let assert = Sandbox::new()
        .cmd()
        .args(["version", "--json"])
        .assert()
        .success();
    let v: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(v["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_version_survives_broken_settings_file() {
    let sandbox = Sandbox::new();
    std::fs::write(sandbox.dir.path().join("config.yaml"), "readiness: [oops").unwrap();

    sandbox.cmd().arg("version").assert().success();
}

#[test]
fn test_broken_settings_file_is_reported() {
    let sandbox = Sandbox::new();
    std::fs::write(sandbox.dir.path().join("config.yaml"), "readiness: [oops").unwrap();

    sandbox
        .cmd()
        .args(["template", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot parse"));
}

// ── template ─────────────────────────────────────────────────────────────────

#[test]
fn test_template_list_shows_bundled_templates() {
    Sandbox::new()
        .cmd()
        .args(["template", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("postgres"))
        .stdout(predicate::str::contains("redis"));
}

#[test]
fn test_template_list_json_is_an_array() {
    let assert = Sandbox::new()
        .cmd()
        .args(["template", "list", "--json"])
        .assert()
        .success();
    let v: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    let names: Vec<&str> = v
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["postgres", "redis"]);
    assert_eq!(v[0]["vendored"], true);
}

#[test]
fn test_template_info_json_hides_generated_secret() {
    let assert = Sandbox::new()
        .cmd()
        .args(["template", "info", "postgres", "--json"])
        .assert()
        .success();
    let v: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(v["name"], "postgres");
    assert_eq!(v["ports"]["wait"], serde_json::json!([5432]));
    let secret = v["arguments"]
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["name"] == "POSTGRES_PASSWORD_SECRET")
        .expect("secret argument listed");
    assert_eq!(secret["generated"], true);
    assert!(secret["default"].is_null());
}

#[test]
fn test_template_info_unknown_fails() {
    Sandbox::new()
        .cmd()
        .args(["template", "info", "mysql"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("mysql service template not found"));
}

#[test]
fn test_template_info_unknown_json_error_object() {
    let assert = Sandbox::new()
        .cmd()
        .args(["template", "info", "mysql", "--json"])
        .assert()
        .code(1);
    let v: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(v["error"], true);
    assert_eq!(v["code"], "NOT_FOUND");
}

#[test]
fn test_registry_path_replaces_bundled_templates() {
    let sandbox = Sandbox::new();
    let registry = sandbox.dir.path().join("templates");
    write_template(&registry, "memcached", MEMCACHED);

    sandbox
        .cmd()
        .args(["template", "list", "--registry-path"])
        .arg(&registry)
        .assert()
        .success()
        .stdout(predicate::str::contains("memcached"))
        .stdout(predicate::str::contains("postgres").not());
}

#[test]
fn test_registry_with_broken_template_fails_to_load() {
    let sandbox = Sandbox::new();
    let registry = sandbox.dir.path().join("templates");
    write_template(&registry, "memcached", MEMCACHED);
    write_template(
        &registry,
        "broken",
        "LABEL com.svcforge.template.name=broken\nLABEL com.svcforge.template.colour=red\n",
    );

    sandbox
        .cmd()
        .args(["template", "list", "--registry-path"])
        .arg(&registry)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid label key"));
}

// ── service ──────────────────────────────────────────────────────────────────

#[test]
fn test_exists_missing_service_exits_one() {
    Sandbox::new()
        .cmd()
        .args(["service", "exists", "postgres", "app"])
        .assert()
        .code(1);
}

#[tokio::test]
async fn test_exists_seeded_service_exits_zero() {
    let sandbox = Sandbox::new();
    sandbox.seed("app").await;

    let assert = sandbox
        .cmd()
        .args(["service", "exists", "postgres", "app", "--json"])
        .assert()
        .success();
    let v: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(v["exists"], true);
}

#[tokio::test]
async fn test_seeded_service_keeps_secret_out_of_build_args() {
    let sandbox = Sandbox::new();
    sandbox.seed("app").await;

    let raw = std::fs::read_to_string(sandbox.data_root().join("postgres/app/config.json")).unwrap();
    let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(v["env"]["POSTGRES_PASSWORD"].as_str().is_some_and(|p| p.len() == 32));

    let env = std::fs::read_to_string(sandbox.data_root().join("postgres/app/.env")).unwrap();
    assert!(env.lines().any(|l| l.starts_with("POSTGRES_PASSWORD=")));
    assert!(!env.contains("_SECRET"));
}

#[test]
fn test_list_empty_data_root() {
    Sandbox::new()
        .cmd()
        .args(["service", "list", "postgres", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn test_list_unknown_template_fails() {
    Sandbox::new()
        .cmd()
        .args(["service", "list", "mysql"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("mysql service template not found"));
}

#[test]
fn test_info_missing_service_is_not_found() {
    let assert = Sandbox::new()
        .cmd()
        .args(["service", "info", "postgres", "app", "--json"])
        .assert()
        .code(1);
    let v: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(v["code"], "NOT_FOUND");
    assert!(
        v["message"]
            .as_str()
            .unwrap()
            .contains("postgres service app not found")
    );
}

#[test]
fn test_invalid_service_name_is_a_validation_error() {
    let assert = Sandbox::new()
        .cmd()
        .args(["service", "exists", "postgres", "Not_Valid", "--json"])
        .assert()
        .code(1);
    let v: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(v["code"], "VALIDATION");
}

#[test]
fn test_create_invalid_argument_is_rejected_before_runtime() {
    Sandbox::new()
        .cmd()
        .args(["service", "create", "postgres", "app", "--argument", "=oops"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid argument"));
}

#[test]
fn test_start_unknown_service_is_not_found() {
    Sandbox::new()
        .cmd()
        .args(["service", "start", "postgres", "ghost"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("postgres service ghost not found"));
}
