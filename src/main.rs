use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use poligap::config::{Config, LogFormat};
use poligap::services::policy::MAX_FILE_SIZE_BYTES;
use poligap::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_tracing(Config::log_format_from_env());

    let config = Config::from_env()?;

    tracing::info!("Starting PoliGap document validation service");
    tracing::info!("Max file size: {} bytes", MAX_FILE_SIZE_BYTES);
    tracing::info!("Max concurrent requests: {}", config.max_concurrent_requests);

    let addr = format!("{}:{}", config.server_host, config.listen_port());
    let app = create_router(AppState::new(config));

    tracing::info!("Server listening on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "poligap=debug,tower_http=debug,axum::rejection=trace".into());

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_target(false))
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init(),
    }
}
