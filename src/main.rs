//! Household Bill Scraper
//!
//! Logs into each configured utility portal, reads the balance currently owed,
//! adds fixed monthly bills and splits the total evenly across the household.
//!
//! # Modes
//!
//! - **cli** (default): runs one aggregation pass and prints a summary report
//! - **server**: serves `POST /scrape-bills` and `GET /health` until SIGTERM/SIGINT
//!
//! # Features
//!
//! - One isolated browser session per provider, always released
//! - Fallback locator chains for login controls and balance elements
//! - A failing, hanging or panicking provider never aborts the run
//! - Optional concurrent scraping with stable result order

mod browser;
mod config;
mod error;
mod model;
mod orchestrator;
mod provider;
mod report;
mod server;

#[cfg(test)]
mod test_utils;

use crate::browser::WebDriverSessionFactory;
use crate::config::Mode;
use crate::orchestrator::Orchestrator;
use crate::provider::Registry;
use chrono::Local;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::signal::ctrl_c;
use tokio::signal::unix::{signal, SignalKind};
use tokio::time::Duration;

#[tokio::main]
async fn main() -> ExitCode {
    let app_config = match config::load_app_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load AppConfig: {}", e);
            return ExitCode::FAILURE;
        }
    };
    tracing_subscriber::fmt()
        .with_max_level(app_config.log_level())
        .init();

    match run(app_config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Loads the remaining configuration, wires the orchestrator and dispatches on mode.
///
/// Every configuration error surfaces here, before any browser session is opened.
async fn run(app_config: config::AppConfig) -> error::Result<()> {
    let browser_config = config::load_browser_config()?;
    let scraper_config = config::load_scraper_config()?;
    let run_config = config::load_run_config(app_config.config_file.as_deref())?;
    tracing::info!(
        providers = run_config.providers.len(),
        static_bills = run_config.static_bills.len(),
        household_size = %run_config.household_size,
        "Configuration loaded"
    );

    let sessions = Arc::new(WebDriverSessionFactory::new(
        browser_config,
        scraper_config.poll_interval(),
    ));
    let orchestrator = Orchestrator::new(Registry::standard(), sessions, scraper_config.timing())
        .with_provider_timeout(Duration::from_secs(scraper_config.provider_timeout_sec))
        .with_parallel(scraper_config.parallel);

    match app_config.mode {
        Mode::Cli => {
            let outcome = orchestrator.run_pass(&run_config).await;
            print!(
                "{}",
                report::render(&outcome, &run_config.static_bills, Local::now())
            );
        }
        Mode::Server => {
            let state = Arc::new(server::AppState {
                orchestrator,
                run_config,
            });
            tracing::info!("Running... Press Ctrl-C or send SIGTERM to terminate.");
            server::serve(state, &app_config.bind_address, shutdown_signal()).await?;
        }
    }
    Ok(())
}

/// Resolves on the first SIGTERM or SIGINT.
async fn shutdown_signal() {
    let mut sig_term = match signal(SignalKind::terminate()) {
        Ok(sig_term) => sig_term,
        Err(e) => {
            tracing::warn!("Failed to register SIGTERM handler: {}", e);
            if let Err(e) = ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
            }
            return;
        }
    };
    tokio::select! {
        // Handle SIGTERM for graceful shutdown in containers
        _ = sig_term.recv() => {
            tracing::info!("Received SIGTERM. Exiting...");
        }
        _ = ctrl_c() => {
            tracing::info!("Received SIGINT. Exiting...");
        }
    }
}
