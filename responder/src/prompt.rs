//! Prompt builders for the three completion modes.

use std::fmt;

/// Purpose of a completion call; part of the cache key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Classify the query as `text` or `view`.
    Decide,
    /// Produce a `{viewType, data}` object.
    View,
    /// Produce a prose answer.
    Text,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Decide => "decide_response_type",
            Mode::View => "view",
            Mode::Text => "text",
        })
    }
}

/// Builds the user prompt for `mode`.
///
/// # Example
/// ```
/// # use responder::prompt::{build_prompt, Mode};
/// let p = build_prompt(Mode::Decide, "List case studies", "Question: q\nAnswer: a\n\n");
/// assert!(p.contains("\"responseType\""));
/// ```
pub fn build_prompt(mode: Mode, query: &str, context: &str) -> String {
    match mode {
        Mode::Decide => decide_prompt(query, context),
        Mode::View => view_prompt(query, context),
        Mode::Text => text_prompt(query, context),
    }
}

fn decide_prompt(query: &str, context: &str) -> String {
    format!(
        r#"You are NicorAI, an innovative AI assistant. For the query '{query}' and the following context, determine the best response type: "text" or "view". Return a JSON object with a single key "responseType".

Context:
{context}

Instructions:
- Choose "view" for queries requesting lists, tables, charts, cards, or structured data (e.g., 'services', 'case studies', 'technologies', 'show', 'list', 'display', 'card', 'table', 'chart').
- Choose "text" for informational, conversational, or vague queries (e.g., 'what does NicorAI do?', 'how are you').
- Return JSON only, e.g., {{"responseType": "view"}} or {{"responseType": "text"}}.
"#
    )
}

fn view_prompt(query: &str, context: &str) -> String {
    format!(
        r#"You are NicorAI, an innovative AI assistant. For the query '{query}' and the following context, select the best view type (table, card, chart, or custom) and generate a JSON viewSpec. Return a JSON object with viewType and data. Ensure valid JSON.

Context:
{context}

Instructions:
- Use structured JSON from the context (e.g., a list of services or case studies) to populate the viewSpec.
- For table: {{"viewType": "table", "data": {{"columns": ["Name", "Description"], "rows": [["string", "string"], ...]}}}}
- For card: {{"viewType": "card", "data": {{"cards": [{{"title": "string", "content": "string"}}]}}}}
- For chart: {{"viewType": "chart", "data": {{"chartType": "bar", "labels": ["string", ...], "datasets": [{{"label": "string", "data": [number, ...]}}]}}}}
- For custom: {{"viewType": "custom", "data": {{"items": [{{"title": "string", "details": "string", "metadata": {{}}}}]}}}}
- Choose chart when the query asks for a chart or needs numbers (e.g., impact metrics); card for case studies; table for services and technologies; custom for anything else.
- Return JSON only, no markdown or additional text.

Example:
{{"viewType": "chart", "data": {{"chartType": "bar", "labels": ["Project A", "Project B"], "datasets": [{{"label": "Impact", "data": [30, 15]}}]}}}}
"#
    )
}

fn text_prompt(query: &str, context: &str) -> String {
    format!(
        r#"You are NicorAI, an innovative AI assistant for NicorAI, specializing in custom AI agents, AR/VR solutions, and rapid MVP development. Using the provided context, answer the query '{query}' concisely, accurately, and in a professional yet approachable tone. Reflect NicorAI’s client-centric and cutting-edge values. Return only the text response.

Context:
{context}
"#
    )
}
