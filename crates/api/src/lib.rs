//! Dashboard data API over the predictive-maintenance store.
//!
//! Exposes config, state, error handling and routes so integration tests and
//! the binaries can build the same application.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use config::ServerConfig;
use state::AppState;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides `default_directives`; `LOG_FORMAT=json` switches to
/// JSON lines.
pub fn init_tracing(default_directives: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directives.into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Bind to the configured address and serve until the process stops.
pub async fn serve(pool: predmaint_db::DbPool, config: ServerConfig) -> std::io::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let config = Arc::new(config);
    let app = router::build_app_router(
        AppState {
            pool,
            config: Arc::clone(&config),
        },
        &config,
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Starting server");
    axum::serve(listener, app).await
}
