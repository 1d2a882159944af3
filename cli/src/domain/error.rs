//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Compile errors ────────────────────────────────────────────────────────────

/// A template recipe could not be turned into a `ServiceTemplate`.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("line {line}: cannot specify multiple values in a single {instruction} directive")]
    MultipleValues { line: usize, instruction: String },

    #[error("line {line}: missing label value for {key}")]
    MissingLabelValue { line: usize, key: String },

    #[error("invalid label key: {0}")]
    InvalidLabelKey(String),

    #[error("missing required label {0}")]
    MissingLabel(&'static str),

    #[error("invalid value for label {key}: '{value}' is not a boolean")]
    InvalidBool { key: &'static str, value: String },

    #[error("invalid value for label {key}: '{value}' is not a port number")]
    InvalidPort { key: &'static str, value: String },

    #[error("argument {0} is declared more than once")]
    DuplicateArgument(String),

    #[error("volume alias {alias} is declared more than once ({path})")]
    DuplicateVolume { alias: String, path: String },

    #[error("cannot render default for argument {name}: {source}")]
    Render {
        name: String,
        #[source]
        source: RenderError,
    },
}

// ── Render errors ─────────────────────────────────────────────────────────────

/// A text template failed to parse or evaluate.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct RenderError(pub String);

// ── Validation errors ─────────────────────────────────────────────────────────

/// Preconditions checked before any mutation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required argument {}", .0.join(", "))]
    MissingArguments(Vec<String>),

    #[error("network {0} does not exist")]
    MissingNetwork(String),

    #[error("invalid service name '{0}': must match ^[a-z0-9][a-z0-9_-]{{0,62}}$")]
    InvalidServiceName(String),

    #[error("invalid argument '{0}': expected NAME=VALUE or NAME")]
    InvalidArgument(String),

    #[error("{service_type} service {name} already exists")]
    AlreadyExists { service_type: String, name: String },
}

// ── Runtime errors ────────────────────────────────────────────────────────────

/// A runtime driver call failed or exited non-zero.
#[derive(Debug, Error)]
#[error("{operation} failed (exit code {code}): {stderr}")]
pub struct RuntimeError {
    pub operation: String,
    pub code: i32,
    pub stderr: String,
}

// ── Readiness errors ──────────────────────────────────────────────────────────

/// The readiness probe gave up on a port.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReadinessError {
    #[error("container {0} is not running")]
    NotRunning(String),

    #[error("container is not listening on port: {port}")]
    NotListening { port: u16 },

    #[error("timed out waiting for port {port} after {secs}s")]
    Timeout { port: u16, secs: u64 },

    #[error("no ports to wait for")]
    NoPorts,

    #[error("readiness check cancelled")]
    Cancelled,
}

impl ReadinessError {
    /// Port the failure refers to, when there is one.
    #[must_use]
    pub fn port(&self) -> Option<u16> {
        match self {
            Self::NotListening { port } | Self::Timeout { port, .. } => Some(*port),
            _ => None,
        }
    }
}

// ── Not found errors ──────────────────────────────────────────────────────────

/// Something an operation expected to exist is absent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotFoundError {
    #[error("{0} service template not found")]
    Template(String),

    #[error("{service_type} service {name} not found")]
    Service { service_type: String, name: String },

    #[error("container {0} does not exist")]
    Container(String),

    #[error("{service_type} template does not support the {command} command")]
    Command {
        service_type: String,
        command: String,
    },
}
