//! stichtag-server
//!
//! Event sign-up service for a club: capacity-bounded self-service
//! enrollment plus a score-based fairness draw when an event's deadline
//! arrives.
//!
//! Responsibilities of this binary:
//! - Parse CLI arguments and load the TOML configuration
//! - Pick the storage backend (Postgres, or in-memory for development)
//! - Create the bootstrap admin account on first boot
//! - Run the HTTP API and the background deadline sweeper
//! - Shut both down gracefully on SIGTERM/SIGINT

mod api;
mod config;
mod password;
mod server;
mod shutdown;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use compact_str::CompactString;
use sqlx::postgres::PgPoolOptions;
use stichtag_core::entities::Role;
use stichtag_core::entities::user_records::UserInsert;
use stichtag_core::notify::{HttpMailSender, NotificationSender};
use stichtag_core::services::{DeadlineSweeper, EnrollmentService};
use stichtag_core::store::{MemoryStore, PgStore, Store};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::{BootstrapAccount, ConfigLoader, get_database_url};
use server::{build_router, run_server};
use shutdown::spawn_config_reload_handler;
use state::AppState;

/// Stichtag - event sign-up server with a deadline fairness draw
#[derive(Parser, Debug)]
#[command(name = "stichtag-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./stichtag-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Run database migrations on startup
    #[arg(long, default_value = "false")]
    migrate: bool,

    /// Use the in-memory store instead of Postgres (development only)
    #[arg(long, default_value = "false")]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    tracing::info!("Starting stichtag-server v{}", env!("CARGO_PKG_VERSION"));

    // 1. Configuration
    let config_loader = Arc::new(ConfigLoader::new(&args.config, args.listen));
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    let listen_addr = loaded_config.server.listen;
    let bootstrap = loaded_config.bootstrap.clone();
    let shared_config = loaded_config.into_shared();

    // 2. Storage backend
    let mut pg_pool = None;
    let store: Arc<dyn Store> = if args.in_memory {
        tracing::warn!("Using the in-memory store; all data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        let database_url = get_database_url()?;
        tracing::info!("Connecting to database...");
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&database_url)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to database: {}", e);
                e
            })?;
        tracing::info!("Database connection established");

        let pg_store = PgStore::new(pool.clone());
        if args.migrate {
            tracing::info!("Running database migrations...");
            pg_store.migrate().await?;
            tracing::info!("Migrations completed");
        }
        pg_pool = Some(pool);
        Arc::new(pg_store)
    };

    // 3. Bootstrap admin account
    if let Some(bootstrap) = &bootstrap {
        ensure_bootstrap_admin(store.as_ref(), bootstrap).await?;
    }

    // 4. Services
    let notifier: Arc<dyn NotificationSender> =
        Arc::new(HttpMailSender::new(shared_config.mail.clone()));
    let enrollment = Arc::new(EnrollmentService::new(
        store.clone(),
        notifier.clone(),
        shared_config.enrollment.clone(),
    ));
    let sweeper = Arc::new(DeadlineSweeper::new(store.clone(), notifier));

    let state = AppState::new(store, shared_config.clone(), enrollment, sweeper.clone());

    // 5. Background tasks
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let sweeper_handle = tokio::spawn(sweeper.run(shared_config.sweep.clone(), shutdown_rx));
    let reload_notify = spawn_config_reload_handler(state.clone(), config_loader);

    // 6. HTTP server
    let router = build_router(state);
    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr).await;

    // 7. Teardown
    let _ = shutdown_tx.send(true);
    let _ = sweeper_handle.await;
    reload_notify.notify_one();

    if let Some(pool) = pg_pool {
        tracing::info!("Closing database connections...");
        pool.close().await;
    }
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Create the bootstrap admin account unless a user with that name
/// already exists. The password hash was produced by the config loader.
async fn ensure_bootstrap_admin(
    store: &dyn Store,
    bootstrap: &BootstrapAccount,
) -> anyhow::Result<()> {
    if store.get_user(&bootstrap.username).await?.is_some() {
        return Ok(());
    }

    store
        .insert_user(UserInsert {
            username: CompactString::from(bootstrap.username.as_str()),
            password_hash: bootstrap.password_hash.clone(),
            role: Role::Admin,
            email: None,
            active: true,
            score: 0,
        })
        .await?;

    tracing::info!(username = %bootstrap.username, "Bootstrap admin account created");
    Ok(())
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
