//! svcforge - template-driven backing service containers

use std::process::ExitCode;

use clap::Parser;
use svcforge_cli::cli::Cli;
use svcforge_cli::domain::Settings;
use svcforge_cli::infra::config::YamlSettingsStore;
use svcforge_cli::output::json::{error_code, format_error};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.trace);
    let json = cli.json;

    let settings = if cli.needs_settings() {
        YamlSettingsStore::new().load()
    } else {
        Ok(Settings::default())
    };
    let result = match settings {
        Ok(settings) => cli.run(settings).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            if json && let Ok(doc) = format_error(&format!("{e:#}"), error_code(&e)) {
                println!("{doc}");
            }
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(trace: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if trace { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
