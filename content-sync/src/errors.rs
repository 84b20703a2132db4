use thiserror::Error;

/// Errors produced by the sync job.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Llm(#[from] ai_llm_service::AiLlmError),

    #[error(transparent)]
    Rag(#[from] rag_store::RagError),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CMS returned HTTP {status} for {url}: {snippet}")]
    Status {
        url: String,
        status: u16,
        snippet: String,
    },

    #[error("unexpected CMS payload: {0}")]
    Decode(String),

    #[error("upsert failed after {attempts} attempts: {source}")]
    UpsertExhausted {
        attempts: u32,
        #[source]
        source: rag_store::RagError,
    },
}

pub type Result<T> = std::result::Result<T, SyncError>;
