mod analysis;
mod checker;
mod client;
mod config;
mod cookies;
mod error;
mod handlers;
mod input;
mod render;
mod session;
mod state;
mod telemetry;
mod templates;

use std::time::Duration;
use tracing::info;

use crate::checker::Checker;
use crate::client::AnalyzeClient;
use crate::config::Config;
use crate::session::SessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    info!("[aichecking] Starting aichecking front-end");
    info!("[aichecking] Public host: {}", config.public_host);
    info!("[aichecking] Analysis service: {}", config.api_base_url);
    info!(
        "[aichecking] Bands: high >= {}, low <= {}, ring radius {}",
        config.render.bands.high_threshold,
        config.render.bands.low_threshold,
        config.render.ring.radius
    );

    let client = AnalyzeClient::new(&config.api_base_url)?;
    let telemetry = telemetry::sink_from_config(config.telemetry.clone());
    let checker = Checker::new(client, telemetry, config.render);
    let sessions = SessionStore::new();

    let state = AppState {
        config: config.clone(),
        checker,
        sessions: sessions.clone(),
    };

    // Periodic idle-session eviction
    let idle = config.session_idle;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(600));
        loop {
            interval.tick().await;
            sessions.cleanup(idle);
        }
    });

    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("[aichecking] Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
