//! Signal handling for graceful shutdown and configuration reload.

use std::sync::Arc;

use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::Notify;

use crate::config::ConfigLoader;
use crate::state::AppState;

/// Resolves when SIGTERM or SIGINT arrives. Handed to axum as the
/// graceful-shutdown future.
pub async fn shutdown_signal() {
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");

    tokio::select! {
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
        _ = sigint.recv() => {
            tracing::info!("Received SIGINT, initiating graceful shutdown");
        }
    }
}

/// Spawn the SIGHUP handler that reloads configuration in place.
///
/// On each SIGHUP the file is re-read, re-validated, and every shared
/// section is swapped. A failed reload keeps the running configuration.
/// The listen address and the storage backend are fixed at startup; a
/// changed `[server]` section only takes effect on restart.
///
/// Returns a [`Notify`] used to stop the handler task on shutdown.
pub fn spawn_config_reload_handler(state: AppState, config_loader: Arc<ConfigLoader>) -> Arc<Notify> {
    let shutdown_notify = Arc::new(Notify::new());
    let handler_notify = shutdown_notify.clone();

    tokio::spawn(async move {
        let mut sighup = signal(SignalKind::hangup()).expect("failed to install SIGHUP handler");
        loop {
            tokio::select! {
                _ = sighup.recv() => {
                    tracing::info!("Received SIGHUP, reloading configuration");
                    match config_loader.reload() {
                        Ok(loaded) => {
                            *state.config.server.write().await = loaded.server;
                            *state.config.auth.write().await = loaded.auth;
                            *state.config.enrollment.write().await = loaded.enrollment;
                            *state.config.sweep.write().await = loaded.sweep;
                            *state.config.mail.write().await = loaded.mail;
                            tracing::info!("Configuration reloaded");
                        }
                        Err(e) => {
                            tracing::error!("Failed to reload configuration, keeping current: {}", e);
                        }
                    }
                }
                _ = handler_notify.notified() => {
                    tracing::debug!("Config reload handler shutting down");
                    break;
                }
            }
        }
    });

    shutdown_notify
}
