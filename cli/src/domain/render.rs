//! Text-templating engine for argument defaults and command templates.
//!
//! Wraps `tera` with a small helper library on top of its built-ins:
//! `random_alphanumeric(length)`, `random_hex(length)`, `uuid()`, and the
//! `sha256` / `b64encode` filters.

use std::collections::{BTreeMap, HashMap};

use base64::Engine as _;
use rand::Rng as _;
use rand::distributions::Alphanumeric;
use sha2::{Digest, Sha256};
use tera::{Context, Tera, Value};

use crate::domain::error::RenderError;

const DEFAULT_RANDOM_LENGTH: usize = 32;

/// Renders one-off templates with the helper library registered.
pub struct TemplateEngine {
    tera: Tera,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine {
    #[must_use]
    pub fn new() -> Self {
        let mut tera = Tera::default();
        tera.register_function("random_alphanumeric", random_alphanumeric);
        tera.register_function("random_hex", random_hex);
        tera.register_function("uuid", uuid_v4);
        tera.register_filter("sha256", sha256_filter);
        tera.register_filter("b64encode", b64encode_filter);
        Self { tera }
    }

    /// Render `source` with no data bound.
    ///
    /// # Errors
    ///
    /// Returns `RenderError` if the template fails to parse or evaluate.
    pub fn render_static(&mut self, source: &str) -> Result<String, RenderError> {
        self.render(source, &BTreeMap::new())
    }

    /// Render `source` with each entry of `data` bound as a top-level variable.
    ///
    /// # Errors
    ///
    /// Returns `RenderError` if the template fails to parse or evaluate.
    pub fn render(
        &mut self,
        source: &str,
        data: &BTreeMap<String, String>,
    ) -> Result<String, RenderError> {
        let mut context = Context::new();
        for (key, value) in data {
            context.insert(key.as_str(), value);
        }
        self.tera
            .render_str(source, &context)
            .map_err(|e| RenderError(error_chain(&e)))
    }
}

fn error_chain(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

fn length_arg(args: &HashMap<String, Value>) -> tera::Result<usize> {
    match args.get("length") {
        None => Ok(DEFAULT_RANDOM_LENGTH),
        Some(v) => v
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| tera::Error::msg("`length` must be a positive integer")),
    }
}

fn random_alphanumeric(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let length = length_arg(args)?;
    let value: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect();
    Ok(Value::String(value))
}

fn random_hex(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let length = length_arg(args)?;
    let mut rng = rand::thread_rng();
    let value: String = (0..length)
        .map(|_| char::from_digit(rng.gen_range(0..16), 16).unwrap_or('0'))
        .collect();
    Ok(Value::String(value))
}

fn uuid_v4(_: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(uuid::Uuid::new_v4().to_string()))
}

fn filter_input<'a>(value: &'a Value, filter: &str) -> tera::Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| tera::Error::msg(format!("filter `{filter}` expects a string")))
}

fn sha256_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let digest = Sha256::digest(filter_input(value, "sha256")?.as_bytes());
    Ok(Value::String(
        digest.iter().map(|b| format!("{b:02x}")).collect(),
    ))
}

fn b64encode_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let input = filter_input(value, "b64encode")?;
    Ok(Value::String(
        base64::engine::general_purpose::STANDARD.encode(input),
    ))
}
