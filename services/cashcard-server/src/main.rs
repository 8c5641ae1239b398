//! Cash Card Server
//!
//! HTTP server for owner-scoped cash card records.
//!
//! # Features
//!
//! - HTTP Basic authentication against a config-seeded user registry
//! - PostgreSQL or in-memory record store
//! - OpenAPI documentation with Swagger UI
//! - Prometheus metrics export
//! - Graceful shutdown handling
//!
//! # Usage
//!
//! ```bash
//! # Start with the in-memory store and development users
//! cashcard-server
//!
//! # Start against PostgreSQL
//! cashcard-server --storage postgres --database-url postgres://localhost/cashcard
//!
//! # Start with environment overrides
//! CASHCARD__SERVER__PORT=9000 cashcard-server
//! ```

mod config;

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::{signal, sync::watch};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cashcard_api::{create_router, openapi, AppState};
use cashcard_auth::UserRegistry;
use cashcard_db::{CashCardStore, Database, MemoryCashCardStore};

use crate::config::{LoggingConfig, MetricsConfig, ServerConfig, StorageBackend, StorageConfig};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Cash Card Server - owner-scoped cash card records over HTTP
#[derive(Parser, Debug)]
#[command(name = "cashcard-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML, JSON, or YAML)
    #[arg(short, long, env = "CASHCARD_CONFIG")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long, env = "CASHCARD_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "CASHCARD_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "CASHCARD_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (json, pretty)
    #[arg(long, env = "CASHCARD_LOG_FORMAT")]
    log_format: Option<String>,

    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Record store backend
    #[arg(long, value_enum, env = "CASHCARD_STORAGE")]
    storage: Option<StorageBackend>,

    /// Print the OpenAPI document and exit
    #[arg(long)]
    openapi: bool,
}

impl Args {
    /// CLI arguments take precedence over files and environment
    fn apply(self, config: &mut ServerConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
        if let Some(url) = self.database_url {
            config.storage.postgres_url = url;
        }
        if let Some(storage) = self.storage {
            config.storage.backend = storage;
        }
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    if args.openapi {
        println!("{}", openapi::openapi_json()?);
        return Ok(());
    }

    // Load configuration
    let mut server_config = ServerConfig::load(args.config.as_deref())?;
    args.apply(&mut server_config);

    // Initialize logging
    init_logging(&server_config.logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Cash Card Server"
    );

    // Initialize record store
    let store = init_store(&server_config.storage).await?;

    // Initialize user registry
    let registry = UserRegistry::from_config(&server_config.auth)?;
    if registry.is_empty() {
        tracing::warn!("No users configured; every card request will be rejected");
    }
    tracing::info!(users = registry.len(), realm = %server_config.auth.realm, "User registry ready");

    // Create application state
    let state = AppState::new(store, registry.into_authenticator())
        .with_realm(server_config.auth.realm.clone())
        .with_list_scope(server_config.api.list_scope);

    // Create router
    let app = create_router(Arc::new(state), server_config.api_config());

    // Start metrics exporter if enabled
    if server_config.metrics.enabled {
        start_metrics_exporter(&server_config.metrics)?;
    }

    // Start server with graceful shutdown
    let listener =
        tokio::net::TcpListener::bind((server_config.server.host.as_str(), server_config.server.port))
            .await?;

    tracing::info!(addr = %listener.local_addr()?, "Server listening");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    tokio::select! {
        result = server.into_future() => result?,
        _ = drain_deadline(shutdown_rx, server_config.server.shutdown_timeout()) => {
            tracing::warn!("Shutdown timeout elapsed, dropping in-flight requests");
        }
    }

    tracing::info!("Server shutdown complete");

    Ok(())
}

// =============================================================================
// Initialization Functions
// =============================================================================

/// Initialize tracing/logging
fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => {
            subscriber
                .with(fmt::layer().json().with_target(true))
                .try_init()?;
        }
        _ => {
            subscriber
                .with(fmt::layer().pretty().with_target(true))
                .try_init()?;
        }
    }

    Ok(())
}

/// Initialize the configured record store
async fn init_store(config: &StorageConfig) -> anyhow::Result<Arc<dyn CashCardStore>> {
    match config.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory store; cards are lost on restart");
            Ok(Arc::new(MemoryCashCardStore::new()))
        }
        StorageBackend::Postgres => {
            let db = Database::connect(&config.database_config()).await?;

            if config.run_migrations {
                db.migrate().await?;
            }

            let repo = db.cash_card_repo();
            if !repo.health_check().await? {
                anyhow::bail!("Database health check failed");
            }

            tracing::info!("Database health check passed");

            Ok(Arc::new(repo))
        }
    }
}

/// Install the Prometheus exporter with its own HTTP listener
fn start_metrics_exporter(config: &MetricsConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(port = config.port, "Metrics exporter started");

    Ok(())
}

// =============================================================================
// Graceful Shutdown
// =============================================================================

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

/// Resolves `timeout` after shutdown has been requested
async fn drain_deadline(mut shutdown: watch::Receiver<bool>, timeout: Duration) {
    if shutdown.wait_for(|requested| *requested).await.is_err() {
        // Sender gone without a signal: the server has already stopped.
        std::future::pending::<()>().await;
    }

    tracing::info!(
        timeout_secs = timeout.as_secs(),
        "Waiting for in-flight requests to complete..."
    );

    tokio::time::sleep(timeout).await;
}

// =============================================================================
// Tests
// =============================================================================
