//! Context assembly from retrieved items, word-safe truncation and structured-item detection.

use rag_store::RetrievedItem;
use serde_json::{Map, Value};

/// Marker appended when text is shortened.
pub const ELLIPSIS: &str = "...";

/// Shortens `text` to at most `max_chars` characters without splitting a word.
///
/// When the text is longer, the kept prefix ends at the last whitespace before
/// the budget and is followed by [`ELLIPSIS`]. A prefix without whitespace is
/// cut hard at the budget.
pub fn truncate_words(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut = text
        .char_indices()
        .nth(max_chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let head = &text[..cut];

    // A boundary exactly at the budget keeps the whole head.
    let at_boundary = text[cut..].starts_with(char::is_whitespace);
    let kept = if at_boundary {
        head
    } else {
        match head.rfind(char::is_whitespace) {
            Some(ws) => &head[..ws],
            None => head,
        }
    };

    format!("{}{ELLIPSIS}", kept.trim_end())
}

fn meta_str<'a>(item: &'a RetrievedItem, key: &str) -> Option<&'a str> {
    item.metadata.get(key).and_then(Value::as_str)
}

/// Question of an item (`""` when absent).
pub fn question_of(item: &RetrievedItem) -> &str {
    meta_str(item, "question").unwrap_or_default()
}

/// Answer of an item: `answer`, then `text`, then the selected content.
pub fn answer_of(item: &RetrievedItem) -> &str {
    meta_str(item, "answer")
        .or_else(|| meta_str(item, "text"))
        .unwrap_or(&item.content)
}

/// Builds `Question: ..\nAnswer: ..\n\n` blocks and truncates them to `max_chars`.
///
/// Answers holding a JSON list are re-serialized compactly.
pub fn build_context(items: &[RetrievedItem], max_chars: usize) -> String {
    let mut out = String::new();
    for item in items {
        let answer = answer_of(item);
        let answer = match parse_list(answer) {
            Some(list) => Value::Array(list).to_string(),
            None => answer.to_string(),
        };
        out.push_str("Question: ");
        out.push_str(question_of(item));
        out.push_str("\nAnswer: ");
        out.push_str(&answer);
        out.push_str("\n\n");
    }
    truncate_words(&out, max_chars)
}

fn parse_list(raw: &str) -> Option<Vec<Value>> {
    let trimmed = raw.trim_start();
    if !trimmed.starts_with('[') {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Array(list)) => Some(list),
        _ => None,
    }
}

/// Object entries of an item's JSON-list payload, if it has one.
///
/// Looks at `structured_data` first, then `answer`, then `text`.
pub fn structured_entries(item: &RetrievedItem) -> Option<Vec<Map<String, Value>>> {
    let list = ["structured_data", "answer", "text"]
        .iter()
        .find_map(|k| match item.metadata.get(*k)? {
            Value::String(s) => parse_list(s),
            Value::Array(list) => Some(list.clone()),
            _ => None,
        })?;
    let entries: Vec<Map<String, Value>> = list
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(m) => Some(m),
            _ => None,
        })
        .collect();
    (!entries.is_empty()).then_some(entries)
}

/// Entries of the first structured item among `items`.
pub fn first_structured(items: &[RetrievedItem]) -> Option<Vec<Map<String, Value>>> {
    items.iter().find_map(structured_entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(meta: Value, content: &str) -> RetrievedItem {
        RetrievedItem {
            id: "faq-1".into(),
            content: content.into(),
            metadata: meta.as_object().cloned().unwrap_or_default(),
            relevance_score: 0.8,
        }
    }

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_words("hello world", 11), "hello world");
        assert_eq!(truncate_words("", 0), "");
    }

    #[test]
    fn cuts_at_last_whitespace_before_budget() {
        assert_eq!(truncate_words("hello wonderful world", 10), "hello...");
        assert_eq!(truncate_words("hello world again", 11), "hello world...");
    }

    #[test]
    fn single_long_word_is_hard_cut() {
        assert_eq!(truncate_words("supercalifragilistic", 5), "super...");
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(truncate_words("héllo wörld ñandú", 11), "héllo wörld...");
    }

    #[test]
    fn truncation_never_splits_a_word() {
        let text = "NicorAI builds custom AI agents, immersive AR/VR experiences and rapid MVPs for clients worldwide";
        for n in 0..text.len() + 2 {
            let out = truncate_words(text, n);
            if out == text {
                assert!(text.chars().count() <= n);
                continue;
            }
            let head = out.strip_suffix(ELLIPSIS).unwrap();
            assert!(head.chars().count() <= n);
            assert!(text.starts_with(head));
            let next = text[head.len()..].chars().next();
            let hard_cut = !text[..head.len()].contains(char::is_whitespace);
            assert!(
                hard_cut || next.is_some_and(char::is_whitespace),
                "split inside a word at n={n}: {out:?}"
            );
        }
    }

    #[test]
    fn context_blocks_fall_back_to_text_field() {
        let items = vec![
            item(json!({"question": "What is NicorAI?", "answer": "An AI studio."}), "An AI studio."),
            item(json!({"text": "Founded in 2023."}), "Founded in 2023."),
        ];
        assert_eq!(
            build_context(&items, 1000),
            "Question: What is NicorAI?\nAnswer: An AI studio.\n\nQuestion: \nAnswer: Founded in 2023.\n\n"
        );
    }

    #[test]
    fn context_is_truncated_with_ellipsis() {
        let long = "word ".repeat(400);
        let items = vec![item(json!({"question": "q", "answer": long}), "")];
        let ctx = build_context(&items, 1000);
        assert!(ctx.ends_with(ELLIPSIS));
        assert!(ctx.chars().count() <= 1000 + ELLIPSIS.len());
    }

    #[test]
    fn detects_structured_entries() {
        let services = item(
            json!({
                "question": "What services does NicorAI offer?",
                "answer": r#"[{"name":"Custom AI Agents","description":"Automation"},{"name":"AR/VR"}]"#
            }),
            "",
        );
        let entries = structured_entries(&services).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["name"], "Custom AI Agents");

        let from_meta = item(json!({"structured_data": "[{\"name\":\"Unity\"}]", "text": "x"}), "");
        assert!(structured_entries(&from_meta).is_some());

        let plain = item(json!({"answer": "[not json"}), "");
        assert!(structured_entries(&plain).is_none());
        assert!(first_structured(&[plain, services]).is_some());
    }
}
