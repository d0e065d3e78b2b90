//! CRM client
//!
//! Command-line client for the CRM REST API: leads with archival, sales teams with
//! target tracking, and profile settings. The bearer token and cached profile live in
//! a local SQLite file.

mod api;
mod auth;
mod cli;
mod config;
mod db;
mod errors;
mod leads;
mod models;
mod pages;
mod settings;
mod teams;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::Cli;
use config::Config;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::from_env();
    cli.apply_overrides(&mut config);

    init_logging(&config);
    for warning in &config.warnings {
        tracing::warn!("{}", warning);
    }
    tracing::debug!("API URL: {}", config.api_url);
    tracing::debug!("Session path: {:?}", config.session_path);

    if let Err(e) = cli::run(cli, config).await {
        eprintln!("Error: {}", e.message());
        if e.is_authorization() {
            eprintln!("Run `crm signin --email <email> --password <password>` to sign in again.");
        }
        std::process::exit(1);
    }
}

/// Logs go to stderr so command output stays clean.
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if config.log_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[cfg(test)]
mod tests;
