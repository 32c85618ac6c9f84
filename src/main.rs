//! Entry point for the Dashboard Engine binary.
//!
//! Running this binary starts an HTTP server that serves the role-scoped
//! dashboards.  Configuration is read from `DASHBOARD_*` environment
//! variables (optionally via a `.env` file); see [`config`] for the full
//! list.  Log verbosity follows `RUST_LOG`.

use dashboard_engine::config::DashboardConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() {
    let config = DashboardConfig::from_env();
    init_tracing(config.log_json);
    if let Err(err) = dashboard_engine::api::serve(config).await {
        tracing::error!(error = %err, "error running server");
        std::process::exit(1);
    }
}

// Public re-exports so the binary has access to library modules
pub use dashboard_engine::{api, config, engine, models};
