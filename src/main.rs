use ai_llm_service::telemetry;
use tracing::{Level, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from an optional .env file.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }

    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level("info", Level::INFO))
        .with(telemetry::layer())
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "nicorai-backend starting");

    if let Err(e) = api::start().await {
        error!(error = %e, "api terminated");
        return Err(e.into());
    }
    Ok(())
}
