//! Smart Irrigation Trial - Backend Server

use std::{net::SocketAddr, sync::Arc};

use irrigation_engine::DecisionEngine;
use smart_irrigation::{create_app, storage::Ledgers, AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smart_irrigation=debug,irrigation_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Smart Irrigation Trial Server");
    tracing::info!("Environment: {}", config.environment);

    // Refuse to start on an invalid trial configuration
    DecisionEngine::new(config.trial.clone())?;
    tracing::info!(transplant_date = %config.trial.transplant_date, "Trial configuration validated");

    let ledgers = Ledgers::csv(&config.storage.data_dir)?;
    tracing::info!("Ledgers opened in {}", config.storage.data_dir.display());

    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((host, config.server.port));

    let state = AppState {
        ledgers: Arc::new(ledgers),
        config: Arc::new(config),
    };

    let app = create_app(state);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
