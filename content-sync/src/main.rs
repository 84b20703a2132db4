use std::path::Path;
use std::sync::Arc;

use ai_llm_service::{LlmServiceProfiles, telemetry};
use anyhow::Context;
use content_sync::{StrapiClient, SyncConfig};
use rag_store::{LlmEmbedder, RagConfig, RagStore};
use tracing::{Level, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional; a malformed one is still an error
    content_sync::config::load_env_file(Path::new(".env")).context("loading .env")?;

    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level("info", Level::INFO))
        .with(telemetry::layer())
        .init();

    let dry_run = std::env::args().skip(1).any(|a| a == "--dry-run");

    let cfg = SyncConfig::from_env().context("loading sync configuration")?;
    let client = StrapiClient::new(&cfg)?;

    let llm = Arc::new(LlmServiceProfiles::from_env().context("loading LLM profiles")?);
    let mut rag_cfg = RagConfig::from_env().context("loading Qdrant configuration")?;
    rag_cfg.upsert_batch = cfg.upsert_batch;
    let embedder = LlmEmbedder::new(llm, rag_cfg.vector_dim);
    let store = RagStore::new(rag_cfg)?;

    info!(strapi = %cfg.strapi_url, dry_run, "content sync starting");
    let report = content_sync::run(&cfg, &client, &embedder, &store, dry_run)
        .await
        .context("content sync failed")?;
    info!(
        fetched = report.fetched,
        entries = report.entries,
        upserted = report.upserted,
        "content sync finished"
    );
    Ok(())
}
