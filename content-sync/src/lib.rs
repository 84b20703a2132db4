//! One-shot job that copies CMS knowledge (FAQs, company info, optional
//! structured data) into the Qdrant collection used for retrieval.
//!
//! Entry point: [`sync::run`]. Upserts are retried a fixed number of times;
//! running out of retries aborts the job.

pub mod config;
pub mod entry;
pub mod errors;
pub mod strapi;
pub mod sync;

pub use config::SyncConfig;
pub use entry::{EntryKind, KnowledgeEntry};
pub use errors::{Result, SyncError};
pub use strapi::client::StrapiClient;
pub use sync::{PointSink, SyncReport, run};
