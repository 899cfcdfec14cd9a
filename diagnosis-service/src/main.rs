use anyhow::Context;
use diagnosis_service::{
    ServiceConfig, config::LogFormat, create_app, telemetry::init_tracing,
};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    init_tracing(LogFormat::from_env());
    let config = ServiceConfig::from_env();

    let app = create_app(&config).context("failed to start diagnosis service")?;

    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;
    let addr = listener.local_addr()?;

    info!("Diagnosis service starting on {}", addr);
    info!("API documentation available at http://{}/", addr);
    info!("Prediction endpoint: POST http://{}/predict", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
