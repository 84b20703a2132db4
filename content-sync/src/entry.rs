//! CMS records mapped to knowledge entries: readable id, embedding text, flat payload.

use rag_store::select_content;
use serde_json::{Map, Value};
use tracing::warn;

use crate::strapi::{client::StrapiRecord, rich_text};

/// Collection a record was read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Faq,
    CompanyInfo,
    StructuredData,
}

impl EntryKind {
    /// Value stored under the payload `type` key.
    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::Faq => "faq",
            EntryKind::CompanyInfo => "company_info",
            EntryKind::StructuredData => "structured_data",
        }
    }

    fn id_prefix(self) -> &'static str {
        match self {
            EntryKind::Faq => "faq",
            EntryKind::CompanyInfo => "company",
            EntryKind::StructuredData => "structured",
        }
    }
}

/// A record ready to embed and upsert.
#[derive(Clone, Debug, PartialEq)]
pub struct KnowledgeEntry {
    /// `faq-<id>`, `company-<id>` or `structured-<id>`.
    pub id: String,
    pub kind: EntryKind,
    /// Text that gets embedded.
    pub text: String,
    /// Scalar-only metadata, including `type`.
    pub payload: Map<String, Value>,
}

/// Strapi bookkeeping fields that carry no knowledge.
const SKIPPED_FIELDS: &[&str] = &[
    "id",
    "documentId",
    "createdAt",
    "updatedAt",
    "publishedAt",
    "locale",
    "localizations",
];

/// Body fields rendered to plain text for company info.
const TEXT_FIELDS: &[&str] = &["text", "content", "description", "body"];

/// Builds an entry from a flat CMS record. Records without an id or text are skipped.
pub fn to_entry(kind: EntryKind, record: &StrapiRecord) -> Option<KnowledgeEntry> {
    let Some(raw_id) = record.get("id").and_then(id_string) else {
        warn!(kind = kind.as_str(), "skipping CMS record without id");
        return None;
    };
    let id = format!("{}-{raw_id}", kind.id_prefix());

    let mut payload = Map::new();
    for (key, value) in record {
        if SKIPPED_FIELDS.contains(&key.as_str()) {
            continue;
        }
        if rich_text::is_blocks(value) {
            payload.insert(key.clone(), Value::String(rich_text::flatten(value)));
        } else {
            flatten_into(&mut payload, key, value);
        }
    }
    payload.insert("type".into(), Value::String(kind.as_str().into()));

    match kind {
        EntryKind::Faq => {}
        EntryKind::CompanyInfo => {
            if !payload.contains_key("text") {
                let body = TEXT_FIELDS
                    .iter()
                    .filter_map(|f| payload.get(*f).and_then(Value::as_str))
                    .find(|s| !s.trim().is_empty())
                    .map(str::to_string);
                if let Some(body) = body {
                    payload.insert("text".into(), Value::String(body));
                }
            }
        }
        EntryKind::StructuredData => {
            // the entries list is kept verbatim as JSON text for the view builders
            if let Some(items) = record.get("items").or_else(|| record.get("structured_data")) {
                let encoded = match items {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                payload.remove("items");
                // retrieval surfaces `text` for structured entries
                let has_text = payload
                    .get("text")
                    .and_then(Value::as_str)
                    .is_some_and(|s| !s.trim().is_empty());
                if !has_text {
                    payload.insert("text".into(), Value::String(encoded.clone()));
                }
                payload.insert("structured_data".into(), Value::String(encoded));
            }
        }
    }

    let text = embedding_text(kind, &payload);
    if text.trim().is_empty() {
        warn!(%id, "skipping CMS record without text");
        return None;
    }
    Some(KnowledgeEntry {
        id,
        kind,
        text,
        payload,
    })
}

/// FAQ: `"question answer"`. Others: their content field, prefixed by a title when present.
fn embedding_text(kind: EntryKind, payload: &Map<String, Value>) -> String {
    let field = |k: &str| payload.get(k).and_then(Value::as_str).unwrap_or_default();
    match kind {
        EntryKind::Faq => format!("{} {}", field("question"), field("answer"))
            .trim()
            .to_string(),
        EntryKind::CompanyInfo | EntryKind::StructuredData => {
            let body = select_content(payload);
            let title = ["title", "name", "question"]
                .iter()
                .map(|k| field(*k))
                .find(|s| !s.is_empty())
                .unwrap_or_default();
            format!("{title} {body}").trim().to_string()
        }
    }
}

fn id_string(v: &Value) -> Option<String> {
    match v {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Nested objects become `parent_child` keys; arrays are stored as JSON text; nulls are dropped.
pub fn flatten_into(out: &mut Map<String, Value>, key: &str, value: &Value) {
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (k, v) in map {
                flatten_into(out, &format!("{key}_{k}"), v);
            }
        }
        Value::Array(_) => {
            out.insert(key.to_string(), Value::String(value.to_string()));
        }
        scalar => {
            out.insert(key.to_string(), scalar.clone());
        }
    }
}
