//! Retrieval-augmented response generator for the NicorAI chatbot.
//!
//! Public API: [`ResponseGenerator::generate`]. It short-circuits greetings and
//! empty queries, retrieves knowledge with a keyword-routed metadata filter,
//! decides between a text answer and a structured view, shapes the output
//! (model first, deterministic fallbacks second) and validates the envelope.
//!
//! Collaborators sit behind [`KnowledgeRetriever`] and [`CompletionClient`];
//! production implementations wrap `rag-store` and `ai-llm-service`.

pub mod cache;
pub mod cfg;
pub mod context;
pub mod envelope;
mod error;
mod generator;
pub mod messages;
pub mod model_output;
pub mod ports;
pub mod prompt;
pub mod rules;
pub mod validate;
pub mod view;

pub use cache::{Clock, ResponseCache, SystemClock};
pub use cfg::ResponderConfig;
pub use envelope::{
    Content, EnvelopeMetadata, QueryRequest, ResponseEnvelope, ResponseType, ViewData, ViewSpec,
    ViewType,
};
pub use error::{ResponderError, Result};
pub use generator::ResponseGenerator;
pub use ports::{CompletionClient, KnowledgeRetriever, RagKnowledge};
