// SPDX-FileCopyrightText: 2026 Roundup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `roundup serve` command implementation.
//!
//! Starts the survey bot: Telegram long polling, the Google Sheets store,
//! the survey engine, and the health endpoint. Supports graceful shutdown
//! via SIGINT/SIGTERM.

use std::sync::Arc;

use roundup_config::RoundupConfig;
use roundup_core::error::RoundupError;
use roundup_core::traits::Adapter;
use roundup_core::types::HealthStatus;
use roundup_engine::SurveyService;
use roundup_sheets::SheetsClient;
use roundup_telegram::TelegramTransport;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::health;

/// Runs the `roundup serve` command.
pub async fn run_serve(config: RoundupConfig) -> Result<(), RoundupError> {
    init_tracing(&config.agent.log_level);

    info!("starting roundup serve");

    // Initialize the Sheets store.
    let store = Arc::new(SheetsClient::from_key_file(
        &config.sheets.service_account_file,
    )?);
    report_health("sheets", store.as_ref()).await;

    // Initialize the Telegram transport and begin long polling.
    let mut telegram = TelegramTransport::new(config.telegram.clone())?;
    telegram.connect();
    let transport = Arc::new(telegram);
    report_health("telegram", transport.as_ref()).await;

    // Wire the survey engine over the adapters.
    let service = Arc::new(SurveyService::new(
        transport.clone(),
        store.clone(),
        &config,
    )?);

    // Install signal handler.
    let cancel = install_signal_handler();

    // Spawn the health endpoint.
    {
        let host = config.gateway.host.clone();
        let port = config.gateway.port;
        let health_cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = health::serve_health(&host, port, health_cancel).await {
                error!(error = %e, "health endpoint failed");
            }
        });
    }

    service.run(cancel).await?;

    info!("roundup serve shutdown complete");
    Ok(())
}

/// Runs an adapter's startup health check, logging the result. A degraded
/// or unhealthy adapter is reported but does not block startup: the
/// condition may be transient and every call path tolerates retries.
async fn report_health(label: &str, adapter: &dyn Adapter) {
    match adapter.health_check().await {
        Ok(HealthStatus::Healthy) => debug!(adapter = label, "health check ok"),
        Ok(HealthStatus::Degraded(reason)) => {
            warn!(adapter = label, reason = reason.as_str(), "adapter degraded")
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            warn!(adapter = label, reason = reason.as_str(), "adapter unhealthy")
        }
        Err(e) => warn!(adapter = label, error = %e, "health check failed"),
    }
}

/// Installs signal handlers for SIGTERM and SIGINT.
///
/// Returns a [`CancellationToken`] that is cancelled when either signal is
/// received.
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            let mut sigterm =
                signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

            tokio::select! {
                _ = ctrl_c => {
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
                _ = sigterm.recv() => {
                    info!("received SIGTERM, initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
    });

    token
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("roundup={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
