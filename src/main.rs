mod config;
mod model;
mod routes;
mod state;
mod store;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, ConfigError, StoreKind};
use crate::state::AppState;
use crate::store::{MemoryTodoStore, PgTodoStore, StoreError};

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("could not connect to the database: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("could not initialise the todos table: {0}")]
    Schema(#[source] StoreError),
    #[error("could not bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "startup aborted");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,todo_api=debug,tower_http=info"));

    tracing_subscriber::fmt().with_env_filter(filter).compact().init();
}

async fn run() -> Result<(), StartupError> {
    let config = Config::from_env()?;

    let state = match config.store {
        StoreKind::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or(ConfigError::Missing("DATABASE_URL"))?;

            let db = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(url)
                .await
                .map_err(StartupError::Connect)?;

            AppState::new(PgTodoStore::new(db))
        }
        StoreKind::Memory => {
            tracing::warn!("using the in-memory store, todos are lost on exit");
            AppState::new(MemoryTodoStore::new())
        }
    };

    state
        .store
        .ensure_schema()
        .await
        .map_err(StartupError::Schema)?;

    let app = routes::routes().with_state(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| StartupError::Bind {
            addr: addr.clone(),
            source,
        })?;

    tracing::info!("server is chilling at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(StartupError::Serve)?;

    tracing::info!("server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
