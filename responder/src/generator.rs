//! Response generator: one query in, exactly one [`ResponseEnvelope`] out.
//!
//! Order of decisions:
//! 1. greeting → canned reply, no collaborator calls
//! 2. empty query → static prompt for input
//! 3. retrieval error → knowledge-base apology
//! 4. no hits → "don't know yet"
//! 5. response type: caller's choice, else the model's ("decide" mode), else text
//! 6. view → model view spec, else structured / canned / generic fallback
//! 7. text → exact metadata answer, else model answer, else apology
//! 8. validation pass
//!
//! Collaborator failures never escape as errors; they become in-band text.

use std::sync::Arc;
use std::time::Instant;

use ai_llm_service::Completion;
use rag_store::RetrievedItem;
use tracing::{debug, error, info, warn};

use crate::cache::{CacheKey, ResponseCache};
use crate::cfg::ResponderConfig;
use crate::context::build_context;
use crate::envelope::{EnvelopeMetadata, QueryRequest, ResponseEnvelope, ResponseType};
use crate::messages;
use crate::model_output::{Decision, ParsedView, parse_decision, parse_view};
use crate::ports::{CompletionClient, KnowledgeRetriever};
use crate::prompt::{Mode, build_prompt};
use crate::rules::{self, FilterRule};
use crate::validate::validate;
use crate::view::fallback_view;

/// Model accounting for one request.
#[derive(Default)]
struct Usage {
    model: Option<String>,
    tokens: u32,
}

impl Usage {
    /// Marks `c` as the output that shaped the response.
    fn used(&mut self, c: &Completion) {
        self.model = Some(c.model.clone());
    }

    fn metadata(&self) -> EnvelopeMetadata {
        EnvelopeMetadata {
            model_used: self
                .model
                .clone()
                .unwrap_or_else(|| EnvelopeMetadata::NO_MODEL.to_string()),
            tokens_used: self.tokens,
        }
    }
}

pub struct ResponseGenerator {
    retriever: Arc<dyn KnowledgeRetriever>,
    completion: Arc<dyn CompletionClient>,
    cache: ResponseCache,
    cfg: ResponderConfig,
}

impl ResponseGenerator {
    pub fn new(
        retriever: Arc<dyn KnowledgeRetriever>,
        completion: Arc<dyn CompletionClient>,
        cfg: ResponderConfig,
    ) -> Self {
        let cache = ResponseCache::new(cfg.cache_capacity, cfg.cache_ttl);
        Self::with_cache(retriever, completion, cfg, cache)
    }

    /// Same as [`ResponseGenerator::new`] with an explicit cache (e.g. a custom clock).
    pub fn with_cache(
        retriever: Arc<dyn KnowledgeRetriever>,
        completion: Arc<dyn CompletionClient>,
        cfg: ResponderConfig,
        cache: ResponseCache,
    ) -> Self {
        Self {
            retriever,
            completion,
            cache,
            cfg,
        }
    }

    pub fn config(&self) -> &ResponderConfig {
        &self.cfg
    }

    /// Produces the envelope for `req`. Never fails.
    pub async fn generate(&self, req: QueryRequest) -> ResponseEnvelope {
        let started = Instant::now();
        let env = validate(self.respond(&req).await);
        info!(
            response_type = ?env.response_type,
            model_used = %env.metadata.model_used,
            tokens_used = env.metadata.tokens_used,
            latency_ms = started.elapsed().as_millis() as u64,
            "response generated"
        );
        env
    }

    async fn respond(&self, req: &QueryRequest) -> ResponseEnvelope {
        let query = req.query.as_deref().unwrap_or_default().trim();

        if let Some(kind) = rules::greeting(query) {
            debug!(?kind, "greeting short-circuit");
            return ResponseEnvelope::text(rules::greeting_reply(kind), EnvelopeMetadata::none());
        }
        if query.is_empty() {
            return ResponseEnvelope::text(messages::EMPTY_QUERY, EnvelopeMetadata::none());
        }

        let params = req
            .retrieval_params
            .unwrap_or(self.cfg.default_params)
            .clamped();
        let filter = rules::filter_rule(query).map(FilterRule::filter);
        debug!(
            max_results = params.max_results,
            min_score = params.min_relevance_score,
            filtered = filter.is_some(),
            "retrieving"
        );

        let items = match self
            .retriever
            .retrieve(query, params, filter.as_ref())
            .await
        {
            Ok(items) => items,
            Err(err) => {
                error!(error = %err, "knowledge retrieval failed");
                return ResponseEnvelope::text(
                    messages::KNOWLEDGE_BASE_UNAVAILABLE,
                    EnvelopeMetadata::none(),
                );
            }
        };
        if items.is_empty() {
            info!("no relevant items found");
            return ResponseEnvelope::text(messages::NO_RESULTS, EnvelopeMetadata::none());
        }

        let context = build_context(&items, self.cfg.ctx_max_chars);
        let mut usage = Usage::default();

        match self
            .resolve_type(req.response_type.as_deref(), query, &context, &mut usage)
            .await
        {
            ResponseType::View => self.view_response(query, &context, &items, usage).await,
            ResponseType::Text => self.text_response(query, &context, &items, usage).await,
        }
    }

    async fn resolve_type(
        &self,
        requested: Option<&str>,
        query: &str,
        context: &str,
        usage: &mut Usage,
    ) -> ResponseType {
        if let Some(raw) = requested {
            return ResponseType::parse(raw).unwrap_or_else(|| {
                warn!(requested = %raw, "invalid responseType; defaulting to text");
                ResponseType::Text
            });
        }

        let Some(out) = self.complete(Mode::Decide, query, context, usage).await else {
            return ResponseType::Text;
        };
        match parse_decision(&out.text) {
            Decision::Type(rt) => {
                // a fallback view still reports the deciding model
                usage.used(&out);
                debug!(response_type = ?rt, "model decided response type");
                rt
            }
            Decision::Invalid(v) => {
                warn!(decided = %v, "model chose an invalid responseType; defaulting to text");
                ResponseType::Text
            }
            Decision::Unparseable { raw } => {
                warn!(raw_len = raw.len(), "unparseable decide output; defaulting to text");
                ResponseType::Text
            }
        }
    }

    async fn view_response(
        &self,
        query: &str,
        context: &str,
        items: &[RetrievedItem],
        mut usage: Usage,
    ) -> ResponseEnvelope {
        if let Some(out) = self.complete(Mode::View, query, context, &mut usage).await {
            match parse_view(&out.text) {
                ParsedView::Spec(spec) => {
                    usage.used(&out);
                    return ResponseEnvelope::view(spec, usage.metadata());
                }
                ParsedView::Unparseable { raw } => {
                    warn!(raw_len = raw.len(), "unparseable view output; using fallback");
                }
            }
        }
        ResponseEnvelope::view(fallback_view(query, items), usage.metadata())
    }

    async fn text_response(
        &self,
        query: &str,
        context: &str,
        items: &[RetrievedItem],
        mut usage: Usage,
    ) -> ResponseEnvelope {
        if let Some(answer) = rules::exact_answer(query, items) {
            debug!("answered from metadata");
            return ResponseEnvelope::text(answer, usage.metadata());
        }
        match self.complete(Mode::Text, query, context, &mut usage).await {
            Some(out) => {
                usage.used(&out);
                ResponseEnvelope::text(out.text, usage.metadata())
            }
            None => ResponseEnvelope::text(messages::GENERATION_FAILED, usage.metadata()),
        }
    }

    /// Cached completion for `(query, mode)`; failures are logged and yield `None`.
    async fn complete(
        &self,
        mode: Mode,
        query: &str,
        context: &str,
        usage: &mut Usage,
    ) -> Option<Completion> {
        let key = CacheKey::new(query, mode);
        if let Some(hit) = self.cache.get(&key).await {
            debug!(%mode, "completion cache hit");
            return Some(hit);
        }

        let prompt = build_prompt(mode, query, context);
        debug!(%mode, prompt_chars = prompt.chars().count(), "calling completion model");
        match self.completion.complete(&prompt).await {
            Ok(out) => {
                usage.tokens = usage.tokens.saturating_add(out.tokens_used);
                self.cache.insert(key, out.clone()).await;
                Some(out)
            }
            Err(err) => {
                error!(%mode, error = %err, "completion call failed");
                None
            }
        }
    }
}
