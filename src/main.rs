// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use cis_webhook::{
    cis::CisConnector,
    constants::TOKIO_WORKER_THREADS,
    settings::WebhookSettings,
    shutdown::{notify_shutdown, ShutdownSignal},
    solver::{CisSolver, Solver},
    webhook::{create_router, WebhookState},
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

fn main() -> Result<()> {
    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("cis-webhook")
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

fn init_logging() {
    // Respects RUST_LOG (default INFO) and RUST_LOG_FORMAT=json|text
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main() -> Result<()> {
    init_logging();

    // Missing GROUP_NAME or IC_API_KEY aborts before anything is served
    let settings = WebhookSettings::from_env().context("invalid startup settings")?;
    info!(group_name = %settings.group_name, "Starting CIS DNS01 webhook");

    // Registered before anything slow so an early SIGTERM is not lost
    let shutdown = ShutdownSignal::install();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let connector = CisConnector::new(
        &settings.cis_api_endpoint,
        &settings.iam_token_endpoint,
        settings.http_timeout,
    )
    .context("failed to create IBM Cloud Internet Services client")?;
    debug!(endpoint = %settings.cis_api_endpoint, "CIS client created");

    let mut solver = CisSolver::new(Arc::new(connector), settings.api_key.clone());

    debug!("Initializing Kubernetes client");
    let kube_config = kube::Config::infer()
        .await
        .context("failed to infer Kubernetes client config")?;
    solver
        .initialize(kube_config, shutdown_rx)
        .await
        .context("failed to initialize solver")?;
    info!(solver = solver.name(), "Solver initialized");

    let router = create_router(WebhookState {
        group_name: settings.group_name.clone(),
        solver: Arc::new(solver),
    });

    let listener = tokio::net::TcpListener::bind(settings.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.listen_addr))?;
    info!(addr = %settings.listen_addr, "Webhook listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(notify_shutdown(shutdown.recv(), shutdown_tx))
        .await?;

    info!("Webhook stopped");
    Ok(())
}
