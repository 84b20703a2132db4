//! Request and response wire types.
//!
//! The response is always a [`ResponseEnvelope`]; errors are reported in-band
//! as text content.

use rag_store::RetrievalParams;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Incoming query as posted by the frontend.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    #[serde(default)]
    pub query: Option<String>,
    /// `"text"`, `"view"`, or absent to let the model decide.
    #[serde(default)]
    pub response_type: Option<String>,
    #[serde(default)]
    pub retrieval_params: Option<RetrievalParams>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    pub fn with_response_type(mut self, rt: impl Into<String>) -> Self {
        self.response_type = Some(rt.into());
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    Text,
    View,
}

impl ResponseType {
    /// Parses `text` / `view` (case-insensitive, surrounding whitespace ignored).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "view" => Some(Self::View),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewType {
    Table,
    Card,
    Chart,
    Custom,
}

impl ViewType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "table" => Some(Self::Table),
            "card" => Some(Self::Card),
            "chart" => Some(Self::Chart),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub title: String,
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardData {
    pub cards: Vec<Card>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub chart_type: String,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomData {
    pub items: Vec<Value>,
}

/// Payload of a view; the shape follows the view type.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ViewData {
    Table(TableData),
    Card(CardData),
    Chart(ChartData),
    Custom(CustomData),
}

impl ViewData {
    /// View type implied by the payload shape.
    pub fn kind(&self) -> ViewType {
        match self {
            ViewData::Table(_) => ViewType::Table,
            ViewData::Card(_) => ViewType::Card,
            ViewData::Chart(_) => ViewType::Chart,
            ViewData::Custom(_) => ViewType::Custom,
        }
    }
}

/// Rendering instruction for the frontend.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSpec {
    pub view_type: ViewType,
    pub data: ViewData,
}

impl ViewSpec {
    pub fn new(data: ViewData) -> Self {
        Self {
            view_type: data.kind(),
            data,
        }
    }

    pub fn table<C, R>(columns: C, rows: R) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        R: IntoIterator<Item = Vec<Value>>,
    {
        Self::new(ViewData::Table(TableData {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: rows.into_iter().collect(),
        }))
    }

    pub fn cards(cards: Vec<Card>) -> Self {
        Self::new(ViewData::Card(CardData { cards }))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Content {
    Text {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    View {
        view_type: ViewType,
        view_spec: ViewSpec,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeMetadata {
    pub model_used: String,
    pub tokens_used: u32,
}

impl EnvelopeMetadata {
    /// Marker for envelopes produced without any model output.
    pub const NO_MODEL: &'static str = "none";

    pub fn none() -> Self {
        Self {
            model_used: Self::NO_MODEL.into(),
            tokens_used: 0,
        }
    }
}

/// The single response returned for every query.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub response_id: String,
    pub response_type: ResponseType,
    pub content: Content,
    pub metadata: EnvelopeMetadata,
}

impl ResponseEnvelope {
    pub fn text(text: impl Into<String>, metadata: EnvelopeMetadata) -> Self {
        Self {
            response_id: new_response_id(),
            response_type: ResponseType::Text,
            content: Content::Text { text: text.into() },
            metadata,
        }
    }

    pub fn view(spec: ViewSpec, metadata: EnvelopeMetadata) -> Self {
        Self {
            response_id: new_response_id(),
            response_type: ResponseType::View,
            content: Content::View {
                view_type: spec.view_type,
                view_spec: spec,
            },
            metadata,
        }
    }

    /// Text content, if this is a text envelope.
    pub fn text_content(&self) -> Option<&str> {
        match &self.content {
            Content::Text { text } => Some(text),
            Content::View { .. } => None,
        }
    }

    /// View spec, if this is a view envelope.
    pub fn view_spec(&self) -> Option<&ViewSpec> {
        match &self.content {
            Content::View { view_spec, .. } => Some(view_spec),
            Content::Text { .. } => None,
        }
    }
}

pub fn new_response_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn view_envelope_wire_shape() {
        let spec = ViewSpec::table(["Name", "Description"], vec![vec![json!("A"), json!("B")]]);
        let env = ResponseEnvelope::view(spec, EnvelopeMetadata::none());
        let mut v = serde_json::to_value(&env).unwrap();
        v["responseId"] = json!("fixed");
        assert_eq!(
            v,
            json!({
                "responseId": "fixed",
                "responseType": "view",
                "content": {
                    "viewType": "table",
                    "viewSpec": {
                        "viewType": "table",
                        "data": {"columns": ["Name", "Description"], "rows": [["A", "B"]]}
                    }
                },
                "metadata": {"modelUsed": "none", "tokensUsed": 0}
            })
        );
    }

    #[test]
    fn chart_uses_camel_case_chart_type() {
        let spec = ViewSpec::new(ViewData::Chart(ChartData {
            chart_type: "bar".into(),
            labels: vec!["A".into()],
            datasets: vec![Dataset {
                label: "Impact".into(),
                data: vec![30.0],
            }],
        }));
        let v = serde_json::to_value(&spec).unwrap();
        assert_eq!(v["viewType"], "chart");
        assert_eq!(v["data"]["chartType"], "bar");
    }

    #[test]
    fn request_accepts_partial_bodies() {
        let req: QueryRequest = serde_json::from_value(json!({
            "query": "List case studies",
            "retrievalParams": {"maxResults": 3}
        }))
        .unwrap();
        assert_eq!(req.response_type, None);
        assert_eq!(req.retrieval_params.unwrap().max_results, 3);

        let req: QueryRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.query.is_none());
    }

    #[test]
    fn response_type_parse_is_lenient_on_case_only() {
        assert_eq!(ResponseType::parse(" VIEW "), Some(ResponseType::View));
        assert_eq!(ResponseType::parse("chart"), None);
    }
}
