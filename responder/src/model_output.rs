//! Strict parsing of model output requested as JSON.
//!
//! The only normalization is removal of one surrounding markdown code fence.
//! Anything that does not match the expected schema becomes `Unparseable`.

use serde::Deserialize;
use serde_json::Value;

use crate::envelope::{
    CardData, ChartData, CustomData, ResponseType, TableData, ViewData, ViewSpec, ViewType,
};

/// Strips a single surrounding ```` ``` ```` / ```` ```json ```` fence.
pub fn strip_fences(raw: &str) -> &str {
    let s = raw.trim();
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };
    // Drop the optional language tag on the opening line.
    let body = match rest.find('\n') {
        Some(nl) if rest[..nl].chars().all(|c| c.is_ascii_alphanumeric()) => &rest[nl + 1..],
        _ => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Reply of the "decide" call.
#[derive(Clone, Debug, PartialEq)]
pub enum Decision {
    Type(ResponseType),
    /// Well-formed reply naming something other than `text` / `view`.
    Invalid(String),
    Unparseable { raw: String },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DecideReply {
    response_type: String,
}

pub fn parse_decision(raw: &str) -> Decision {
    match serde_json::from_str::<DecideReply>(strip_fences(raw)) {
        Ok(reply) => match ResponseType::parse(&reply.response_type) {
            Some(rt) => Decision::Type(rt),
            None => Decision::Invalid(reply.response_type),
        },
        Err(_) => Decision::Unparseable {
            raw: raw.to_string(),
        },
    }
}

/// Reply of the "view" call.
#[derive(Clone, Debug, PartialEq)]
pub enum ParsedView {
    Spec(ViewSpec),
    Unparseable { raw: String },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawView {
    view_type: String,
    data: Value,
}

/// Parses `{viewType, data}`; `data` must match the shape of the declared type.
pub fn parse_view(raw: &str) -> ParsedView {
    parse_view_spec(strip_fences(raw)).map_or_else(
        || ParsedView::Unparseable {
            raw: raw.to_string(),
        },
        ParsedView::Spec,
    )
}

fn parse_view_spec(json: &str) -> Option<ViewSpec> {
    let view: RawView = serde_json::from_str(json).ok()?;
    let data = match ViewType::parse(&view.view_type)? {
        ViewType::Table => ViewData::Table(serde_json::from_value::<TableData>(view.data).ok()?),
        ViewType::Card => ViewData::Card(serde_json::from_value::<CardData>(view.data).ok()?),
        ViewType::Chart => ViewData::Chart(serde_json::from_value::<ChartData>(view.data).ok()?),
        ViewType::Custom => ViewData::Custom(serde_json::from_value::<CustomData>(view.data).ok()?),
    };
    Some(ViewSpec::new(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_one_fence_with_or_without_language() {
        assert_eq!(strip_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_fences("```\n{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_fences("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn decision_variants() {
        assert_eq!(
            parse_decision(r#"{"responseType": "view"}"#),
            Decision::Type(ResponseType::View)
        );
        assert_eq!(
            parse_decision("```json\n{\"responseType\":\"Text\"}\n```"),
            Decision::Type(ResponseType::Text)
        );
        assert_eq!(
            parse_decision(r#"{"responseType": "chart"}"#),
            Decision::Invalid("chart".into())
        );
        assert!(matches!(
            parse_decision("I think a view works best: {\"responseType\": \"view\"}"),
            Decision::Unparseable { .. }
        ));
    }

    #[test]
    fn accepts_well_formed_views() {
        let raw = r#"```json
{"viewType": "chart", "data": {"chartType": "bar", "labels": ["Project A", "Project B"], "datasets": [{"label": "Impact", "data": [30, 15]}]}}
```"#;
        let ParsedView::Spec(spec) = parse_view(raw) else {
            panic!("expected a spec");
        };
        assert_eq!(spec.view_type, ViewType::Chart);
        let ViewData::Chart(chart) = spec.data else {
            panic!("expected chart data");
        };
        assert_eq!(chart.datasets[0].data, vec![30.0, 15.0]);
    }

    #[test]
    fn rejects_shape_mismatch_and_missing_keys() {
        let wrong_shape = r#"{"viewType": "card", "data": {"columns": ["a"], "rows": []}}"#;
        assert!(matches!(parse_view(wrong_shape), ParsedView::Unparseable { .. }));

        let no_data = r#"{"viewType": "table"}"#;
        assert!(matches!(parse_view(no_data), ParsedView::Unparseable { .. }));

        let unknown = r#"{"viewType": "map", "data": {}}"#;
        assert!(matches!(parse_view(unknown), ParsedView::Unparseable { .. }));

        let prose = "Here is a table of services.";
        assert_eq!(
            parse_view(prose),
            ParsedView::Unparseable { raw: prose.into() }
        );
    }
}
