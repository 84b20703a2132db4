//! Runtime configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

use rag_store::{DEFAULT_MAX_RESULTS, DEFAULT_MIN_RELEVANCE_SCORE, RetrievalParams};

use crate::error::ResponderError;

/// Character budget for the assembled context.
pub const DEFAULT_CTX_MAX_CHARS: usize = 1000;
/// Default number of cached completions.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Config bag for the generator. All fields have defaults.
#[derive(Clone, Debug, PartialEq)]
pub struct ResponderConfig {
    /// Used when the request carries no `retrievalParams`.
    pub default_params: RetrievalParams,
    pub ctx_max_chars: usize,
    /// `0` disables caching.
    pub cache_capacity: usize,
    /// `None` keeps entries for the process lifetime.
    pub cache_ttl: Option<Duration>,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            default_params: RetrievalParams::default(),
            ctx_max_chars: DEFAULT_CTX_MAX_CHARS,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            cache_ttl: None,
        }
    }
}

impl ResponderConfig {
    /// Reads `RAG_TOP_K`, `RAG_MIN_SCORE`, `CTX_MAX_CHARS`,
    /// `RESPONSE_CACHE_CAPACITY` and `RESPONSE_CACHE_TTL_SECS`.
    ///
    /// # Errors
    /// [`ResponderError::Config`] when a variable is set but does not parse.
    pub fn from_env() -> Result<Self, ResponderError> {
        let default_params = RetrievalParams {
            max_results: parse("RAG_TOP_K")?.unwrap_or(DEFAULT_MAX_RESULTS),
            min_relevance_score: parse("RAG_MIN_SCORE")?.unwrap_or(DEFAULT_MIN_RELEVANCE_SCORE),
        }
        .clamped();

        let ctx_max_chars = parse("CTX_MAX_CHARS")?.unwrap_or(DEFAULT_CTX_MAX_CHARS);
        if ctx_max_chars == 0 {
            return Err(ResponderError::Config("CTX_MAX_CHARS must be > 0".into()));
        }

        Ok(Self {
            default_params,
            ctx_max_chars,
            cache_capacity: parse("RESPONSE_CACHE_CAPACITY")?.unwrap_or(DEFAULT_CACHE_CAPACITY),
            cache_ttl: parse::<u64>("RESPONSE_CACHE_TTL_SECS")?.map(Duration::from_secs),
        })
    }
}

fn parse<T: FromStr>(k: &str) -> Result<Option<T>, ResponderError> {
    match std::env::var(k) {
        Ok(v) if !v.trim().is_empty() => v
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ResponderError::Config(format!("{k} has an invalid value: {v:?}"))),
        _ => Ok(None),
    }
}
