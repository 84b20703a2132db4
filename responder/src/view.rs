//! Views built without the model: structured items, canned topics and the generic Q/A table.

use rag_store::RetrievedItem;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::context::{first_structured, question_of, truncate_words};
use crate::envelope::{Card, ViewSpec};
use crate::rules::{self, CannedTopic, StructuredLayout};

/// Per-cell budget for answers shown in fallback views.
pub const FALLBACK_CELL_CHARS: usize = 200;

/// Picks the first applicable fallback: structured items, canned topic, generic table.
pub fn fallback_view(query: &str, items: &[RetrievedItem]) -> ViewSpec {
    if let Some(entries) = first_structured(items) {
        let layout = rules::structured_layout(query);
        debug!(entries = entries.len(), ?layout, "structured fallback view");
        return structured_view(layout, &entries);
    }
    if let Some(topic) = rules::canned_topic(query) {
        debug!(?topic, "canned fallback view");
        return canned_view(topic, items);
    }
    debug!(items = items.len().min(3), "generic fallback view");
    generic_table(items)
}

fn entry_str(entry: &Map<String, Value>, key: &str) -> Option<String> {
    match entry.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Cards or a Name/Description table from structured entries.
pub fn structured_view(layout: StructuredLayout, entries: &[Map<String, Value>]) -> ViewSpec {
    match layout {
        StructuredLayout::Card => ViewSpec::cards(
            entries
                .iter()
                .enumerate()
                .map(|(i, e)| Card {
                    title: entry_str(e, "name").unwrap_or_else(|| format!("Case Study {}", i + 1)),
                    content: entry_str(e, "description").unwrap_or_default(),
                })
                .collect(),
        ),
        StructuredLayout::Table => ViewSpec::table(
            ["Name", "Description"],
            entries.iter().enumerate().map(|(i, e)| {
                vec![
                    json!(entry_str(e, "name").unwrap_or_else(|| format!("Item {}", i + 1))),
                    json!(entry_str(e, "description").unwrap_or_default()),
                ]
            }),
        ),
    }
}

/// Fixed views for well-known topics.
pub fn canned_view(topic: CannedTopic, items: &[RetrievedItem]) -> ViewSpec {
    match topic {
        CannedTopic::Services => ViewSpec::table(
            ["Name", "Description"],
            [
                ("Custom AI Agents", "Automate tasks and analyze data with tailored AI solutions."),
                ("AR/VR Experiences", "Create immersive simulations for training or entertainment."),
                ("Rapid MVP Development", "Build functional apps in 4–12 weeks."),
            ]
            .map(|(n, d)| vec![json!(n), json!(d)]),
        ),
        CannedTopic::CaseStudies => ViewSpec::cards(vec![Card {
            title: "Case Studies".into(),
            content: items
                .first()
                .map(|i| truncate_words(&i.content, FALLBACK_CELL_CHARS))
                .unwrap_or_default(),
        }]),
        CannedTopic::Technologies => ViewSpec::table(
            ["Technology", "Purpose"],
            [
                ("Python, TensorFlow, PyTorch", "AI/ML development"),
                ("JavaScript, React", "Web applications"),
                ("Unity, Unreal Engine", "AR/VR solutions"),
            ]
            .map(|(t, p)| vec![json!(t), json!(p)]),
        ),
    }
}

/// Question/Answer table over the top three items.
pub fn generic_table(items: &[RetrievedItem]) -> ViewSpec {
    ViewSpec::table(
        ["Question", "Answer"],
        items.iter().take(3).map(|item| {
            let q = question_of(item);
            vec![
                json!(if q.is_empty() { "Info" } else { q }),
                json!(truncate_words(&item.content, FALLBACK_CELL_CHARS)),
            ]
        }),
    )
}
