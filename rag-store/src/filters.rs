//! Filter conversion to Qdrant `Filter`.
//!
//! Supports exact equality on scalar fields (`String`, integer `Number`, `Bool`).
//! All conditions are combined with `must`.

use crate::record::RagFilter;
use qdrant_client::qdrant::r#match::MatchValue;
use qdrant_client::qdrant::{Condition, FieldCondition, Filter, Match, condition::ConditionOneOf};
use tracing::{debug, warn};

/// Converts [`RagFilter`] to Qdrant [`Filter`], or `None` when no condition survives.
pub fn to_qdrant_filter(f: &RagFilter) -> Option<Filter> {
    debug!(equals = f.equals.len(), "filters::to_qdrant_filter");

    let mut must: Vec<Condition> = Vec::with_capacity(f.equals.len());

    for (field, val) in &f.equals {
        let match_value = match val {
            serde_json::Value::String(s) => MatchValue::Keyword(s.clone()),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => MatchValue::Integer(i),
                None => {
                    warn!(field = %field, "skipping non-integer numeric filter");
                    continue;
                }
            },
            serde_json::Value::Bool(b) => MatchValue::Boolean(*b),
            _ => {
                warn!(field = %field, "skipping unsupported filter value");
                continue;
            }
        };

        must.push(Condition {
            condition_one_of: Some(ConditionOneOf::Field(FieldCondition {
                key: field.clone(),
                r#match: Some(Match {
                    match_value: Some(match_value),
                }),
                ..Default::default()
            })),
        });
    }

    if must.is_empty() {
        return None;
    }
    Some(Filter {
        must,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(f: &Filter) -> Vec<(String, Option<MatchValue>)> {
        f.must
            .iter()
            .filter_map(|c| match &c.condition_one_of {
                Some(ConditionOneOf::Field(fc)) => Some((
                    fc.key.clone(),
                    fc.r#match.as_ref().and_then(|m| m.match_value.clone()),
                )),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn builds_must_conditions_for_scalars() {
        let f = RagFilter::new()
            .eq("type", "structured_data")
            .eq("category", "services")
            .eq("order", 3)
            .eq("published", true);
        let q = to_qdrant_filter(&f).unwrap();
        assert!(q.should.is_empty());
        let ks = keys(&q);
        assert_eq!(ks.len(), 4);
        assert_eq!(
            ks[0],
            ("type".into(), Some(MatchValue::Keyword("structured_data".into())))
        );
        assert_eq!(ks[2].1, Some(MatchValue::Integer(3)));
    }

    #[test]
    fn unsupported_values_are_skipped() {
        let f = RagFilter::new().eq("score", 0.5).eq("tags", json!(["a"]));
        assert!(to_qdrant_filter(&f).is_none());
    }
}
