//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod arguments;
pub mod compiler;
pub mod config;
pub mod error;
pub mod naming;
pub mod recipe;
pub mod render;
pub mod service;

pub use config::{ReadinessSettings, Settings};
pub use error::{
    CompileError, NotFoundError, ReadinessError, RenderError, RuntimeError, ValidationError,
};
pub use service::{CreateRequest, Networks, ServiceConfig};
