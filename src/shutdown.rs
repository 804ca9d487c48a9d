// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Process signal handling for graceful shutdown.
//!
//! Kubernetes stops pods with SIGTERM; local runs are stopped with Ctrl+C.
//! Either one lets axum drain in-flight challenges and notifies the solver.

use std::future::Future;
use tokio::sync::watch;
use tracing::{debug, error, info};

#[cfg(unix)]
use tokio::signal::unix::{signal, Signal, SignalKind};

/// Signal handlers installed at startup.
///
/// Handlers are registered by [`ShutdownSignal::install`], so a SIGTERM that
/// arrives before [`ShutdownSignal::recv`] is polled is still observed.
pub struct ShutdownSignal {
    #[cfg(unix)]
    sigterm: Option<Signal>,
}

impl ShutdownSignal {
    /// Register the SIGTERM handler. Must be called inside a Tokio runtime.
    ///
    /// A failed registration is logged and leaves Ctrl+C as the only trigger.
    #[must_use]
    pub fn install() -> Self {
        #[cfg(unix)]
        {
            let sigterm = match signal(SignalKind::terminate()) {
                Ok(sigterm) => Some(sigterm),
                Err(e) => {
                    error!(error = %e, "Failed to install SIGTERM handler");
                    None
                }
            };
            Self { sigterm }
        }
        #[cfg(not(unix))]
        {
            Self {}
        }
    }

    /// Wait for SIGINT or SIGTERM and return the name of the one received.
    pub async fn recv(self) -> &'static str {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for SIGINT");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let sigterm = async move {
            match self.sigterm {
                Some(mut sigterm) => {
                    sigterm.recv().await;
                }
                None => std::future::pending::<()>().await,
            }
        };
        #[cfg(not(unix))]
        let sigterm = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => "SIGINT",
            () = sigterm => "SIGTERM",
        }
    }
}

/// Wait for `signal`, then tell the solver to stop via `shutdown_tx`.
///
/// Used as axum's graceful-shutdown future: once this returns the server stops
/// accepting connections and waits for in-flight requests.
pub async fn notify_shutdown<F>(signal: F, shutdown_tx: watch::Sender<bool>)
where
    F: Future<Output = &'static str>,
{
    let name = signal.await;
    info!(signal = name, "Shutdown signal received, draining in-flight challenges");

    if shutdown_tx.send(true).is_err() {
        debug!("Solver no longer watches the shutdown channel");
    }
}
