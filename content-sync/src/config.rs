use std::path::Path;
use std::time::Duration;

use ai_llm_service::error_handler::{
    env_opt, env_opt_u32, env_opt_u64, must_env, validate_http_endpoint,
};

use crate::errors::Result;

pub const DEFAULT_FAQ_PATH: &str = "/api/faqs";
pub const DEFAULT_COMPANY_INFO_PATH: &str = "/api/company-infos";
pub const DEFAULT_UPSERT_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(2000);
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Where to read content from and how hard to retry writes.
#[derive(Clone, Debug)]
pub struct SyncConfig {
    /// CMS base URL, e.g. `http://localhost:1337`.
    pub strapi_url: String,
    /// Optional bearer token for the CMS API.
    pub strapi_token: Option<String>,
    pub faq_path: String,
    pub company_info_path: String,
    /// Structured-data collection; skipped when `None`.
    pub structured_path: Option<String>,
    pub page_size: u32,
    /// Retries per upsert batch after the first failed attempt.
    pub upsert_retries: u32,
    pub retry_delay: Duration,
    pub upsert_batch: usize,
}

impl SyncConfig {
    pub fn new(strapi_url: impl Into<String>) -> Self {
        Self {
            strapi_url: strapi_url.into(),
            strapi_token: None,
            faq_path: DEFAULT_FAQ_PATH.into(),
            company_info_path: DEFAULT_COMPANY_INFO_PATH.into(),
            structured_path: None,
            page_size: DEFAULT_PAGE_SIZE,
            upsert_retries: DEFAULT_UPSERT_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            upsert_batch: 64,
        }
    }

    /// Reads `STRAPI_*`, `SYNC_UPSERT_RETRIES`, `SYNC_RETRY_DELAY_MS` and `QDRANT_BATCH_SIZE`.
    ///
    /// # Errors
    /// `STRAPI_URL` missing or not http(s), or a numeric variable that does not parse.
    pub fn from_env() -> Result<Self> {
        let url = must_env("STRAPI_URL")?;
        validate_http_endpoint("STRAPI_URL", &url)?;

        let mut cfg = Self::new(url.trim_end_matches('/'));
        cfg.strapi_token = env_opt("STRAPI_TOKEN");
        if let Some(p) = env_opt("STRAPI_FAQ_PATH") {
            cfg.faq_path = p;
        }
        if let Some(p) = env_opt("STRAPI_COMPANY_INFO_PATH") {
            cfg.company_info_path = p;
        }
        cfg.structured_path = env_opt("STRAPI_STRUCTURED_PATH");
        if let Some(n) = env_opt_u32("SYNC_UPSERT_RETRIES")? {
            cfg.upsert_retries = n;
        }
        if let Some(ms) = env_opt_u64("SYNC_RETRY_DELAY_MS")? {
            cfg.retry_delay = Duration::from_millis(ms);
        }
        if let Some(n) = env_opt_u32("QDRANT_BATCH_SIZE")? {
            cfg.upsert_batch = (n as usize).max(1);
        }
        Ok(cfg)
    }
}

/// Loads `path` into the environment. A missing file is fine; an unreadable or malformed one is not.
pub fn load_env_file(path: &Path) -> std::result::Result<(), dotenvy::Error> {
    match dotenvy::from_path(path) {
        Err(e) if e.not_found() => Ok(()),
        other => other,
    }
}
