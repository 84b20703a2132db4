//! Sync pipeline: fetch → map → embed → ensure collection → upsert with retries.

use std::time::Duration;

use futures::future::BoxFuture;
use indicatif::{ProgressBar, ProgressStyle};
use rag_store::{EmbeddingsProvider, RagError, RagStore, VectorPoint, l2_normalize};
use tracing::{debug, info, warn};

use crate::config::SyncConfig;
use crate::entry::{EntryKind, KnowledgeEntry, to_entry};
use crate::errors::{Result, SyncError};
use crate::strapi::client::StrapiClient;

/// Write side of the vector store.
pub trait PointSink: Send + Sync {
    fn ensure_collection(&self, dim: usize) -> BoxFuture<'_, std::result::Result<bool, RagError>>;
    fn upsert(&self, points: Vec<VectorPoint>)
    -> BoxFuture<'_, std::result::Result<usize, RagError>>;
}

impl PointSink for RagStore {
    fn ensure_collection(&self, dim: usize) -> BoxFuture<'_, std::result::Result<bool, RagError>> {
        Box::pin(RagStore::ensure_collection(self, dim))
    }

    fn upsert(
        &self,
        points: Vec<VectorPoint>,
    ) -> BoxFuture<'_, std::result::Result<usize, RagError>> {
        Box::pin(RagStore::upsert(self, points))
    }
}

/// Outcome of one run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub fetched: usize,
    pub entries: usize,
    pub upserted: usize,
    pub dry_run: bool,
}

/// Reads every configured collection and maps records to entries.
pub async fn collect_entries(
    client: &StrapiClient,
    cfg: &SyncConfig,
) -> Result<(usize, Vec<KnowledgeEntry>)> {
    let mut sources = vec![
        (EntryKind::Faq, cfg.faq_path.as_str()),
        (EntryKind::CompanyInfo, cfg.company_info_path.as_str()),
    ];
    if let Some(p) = cfg.structured_path.as_deref() {
        sources.push((EntryKind::StructuredData, p));
    }

    let mut fetched = 0;
    let mut entries = Vec::new();
    for (kind, path) in sources {
        let records = client.fetch_all(path).await?;
        fetched += records.len();
        let before = entries.len();
        entries.extend(records.iter().filter_map(|r| to_entry(kind, r)));
        info!(
            kind = kind.as_str(),
            path,
            records = records.len(),
            entries = entries.len() - before,
            "collected CMS entries"
        );
    }
    Ok((fetched, entries))
}

/// Embeds each entry's text and L2-normalizes the vector.
pub async fn embed_entries(
    entries: Vec<KnowledgeEntry>,
    provider: &dyn EmbeddingsProvider,
) -> Result<Vec<VectorPoint>> {
    let pb = ProgressBar::new(entries.len() as u64);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
    ) {
        pb.set_style(style.progress_chars("##-"));
    }

    let mut points = Vec::with_capacity(entries.len());
    for entry in entries {
        let mut vector = provider.embed(&entry.text).await?;
        l2_normalize(&mut vector);
        points.push(VectorPoint {
            id: entry.id,
            vector,
            payload: entry.payload,
        });
        pb.inc(1);
    }
    pb.finish_with_message("embedding complete");
    Ok(points)
}

/// Upserts one batch; a failure is retried up to `retries` times with a fixed delay.
///
/// # Errors
/// [`SyncError::UpsertExhausted`] with the last failure once every attempt failed.
pub async fn upsert_with_retry(
    sink: &dyn PointSink,
    batch: Vec<VectorPoint>,
    retries: u32,
    delay: Duration,
) -> Result<usize> {
    let attempts = retries.saturating_add(1);
    let mut attempt = 1;
    loop {
        match sink.upsert(batch.clone()).await {
            Ok(n) => return Ok(n),
            Err(err) if attempt < attempts => {
                warn!(attempt, attempts, error = %err, "upsert failed; retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                return Err(SyncError::UpsertExhausted {
                    attempts,
                    source: err,
                });
            }
        }
    }
}

/// Full run. With `dry_run` nothing is embedded or written.
pub async fn run(
    cfg: &SyncConfig,
    client: &StrapiClient,
    provider: &dyn EmbeddingsProvider,
    sink: &dyn PointSink,
    dry_run: bool,
) -> Result<SyncReport> {
    let (fetched, entries) = collect_entries(client, cfg).await?;
    let mut report = SyncReport {
        fetched,
        entries: entries.len(),
        upserted: 0,
        dry_run,
    };

    if dry_run {
        for e in &entries {
            debug!(id = %e.id, chars = e.text.chars().count(), "dry run entry");
        }
        info!(fetched, entries = report.entries, "dry run: nothing embedded or written");
        return Ok(report);
    }
    if entries.is_empty() {
        warn!("no CMS entries to sync");
        return Ok(report);
    }

    let points = embed_entries(entries, provider).await?;
    let dim = points.first().map(|p| p.vector.len()).unwrap_or_default();
    let created = sink.ensure_collection(dim).await?;
    info!(dim, created, "collection ready");

    for batch in points.chunks(cfg.upsert_batch.max(1)) {
        report.upserted +=
            upsert_with_retry(sink, batch.to_vec(), cfg.upsert_retries, cfg.retry_delay).await?;
        debug!(upserted = report.upserted, "batch written");
    }

    info!(
        fetched,
        entries = report.entries,
        upserted = report.upserted,
        "sync complete"
    );
    Ok(report)
}
