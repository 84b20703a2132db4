//! Keyword rule tables: greetings, retrieval filters, fallback views and exact answers.
//!
//! Each table is an ordered list evaluated top to bottom; the first match wins.
//! Keywords match on word boundaries of the lower-cased query, so `show`
//! never triggers the `how` rule.

use std::sync::LazyLock;

use rag_store::{RagFilter, RetrievedItem};
use regex::Regex;
use serde_json::Value;

static GREETING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(hi|hello|hey|hoy|how are you|how['’]s it going|what['’]s up|good morning|good evening|wish|sup)\W*$",
    )
    .unwrap_or_else(|e| unreachable!("greeting pattern: {e}"))
});

/// Kind of small-talk opener.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Greeting {
    Hello,
    HowAreYou,
    GoodMorning,
    GoodEvening,
}

/// Classifies `query` (already trimmed) as a greeting, if it is one.
pub fn greeting(query: &str) -> Option<Greeting> {
    let lower = query.trim().to_lowercase();
    let caps = GREETING.captures(&lower)?;
    let word = caps.get(1)?.as_str();
    Some(match word {
        "good morning" => Greeting::GoodMorning,
        "good evening" => Greeting::GoodEvening,
        w if w.starts_with("how") || w.starts_with("what") || w == "sup" => Greeting::HowAreYou,
        _ => Greeting::Hello,
    })
}

/// Canned reply for a greeting.
pub fn greeting_reply(kind: Greeting) -> String {
    const PITCH: &str = "Curious about NicorAI’s custom AI agents, AR/VR solutions, or rapid MVP development? I’ve got you covered! 🌟";
    match kind {
        Greeting::Hello => format!("Hey! I’m NicorAI, your friendly assistant. {PITCH}"),
        Greeting::HowAreYou => {
            format!("I’m doing great, thanks for asking! I’m NicorAI, your friendly assistant. {PITCH}")
        }
        Greeting::GoodMorning => format!("Good morning! I’m NicorAI, your friendly assistant. {PITCH}"),
        Greeting::GoodEvening => format!("Good evening! I’m NicorAI, your friendly assistant. {PITCH}"),
    }
}

/// Word-boundary keyword matcher over a lower-cased query.
#[derive(Debug)]
pub struct Keywords(Regex);

impl Keywords {
    fn new(words: &[&str]) -> Self {
        let alternation = words
            .iter()
            .map(|w| regex::escape(w))
            .collect::<Vec<_>>()
            .join("|");
        let re = Regex::new(&format!(r"\b(?:{alternation})\b"))
            .unwrap_or_else(|e| unreachable!("escaped keywords: {e}"));
        Self(re)
    }

    pub fn matches(&self, query: &str) -> bool {
        self.0.is_match(&query.to_lowercase())
    }
}

static SERVICES: LazyLock<Keywords> = LazyLock::new(|| Keywords::new(&["services"]));
static CASE_STUDIES: LazyLock<Keywords> =
    LazyLock::new(|| Keywords::new(&["case studies", "projects"]));
static COMPANY: LazyLock<Keywords> =
    LazyLock::new(|| Keywords::new(&["share capital", "company"]));
static FAQ: LazyLock<Keywords> = LazyLock::new(|| Keywords::new(&["faq", "how"]));
static TECHNOLOGIES: LazyLock<Keywords> = LazyLock::new(|| Keywords::new(&["technologies"]));
static SHARE_CAPITAL: LazyLock<Keywords> = LazyLock::new(|| Keywords::new(&["share capital"]));

/// Retrieval filter chosen for a query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterRule {
    Services,
    CaseStudies,
    CompanyInfo,
    Faq,
    Technologies,
}

impl FilterRule {
    pub fn filter(self) -> RagFilter {
        let structured = |category: &str| {
            RagFilter::new()
                .eq("type", "structured_data")
                .eq("category", category)
        };
        match self {
            FilterRule::Services => structured("services"),
            FilterRule::CaseStudies => structured("case_studies"),
            FilterRule::CompanyInfo => RagFilter::new().eq("type", "company_info"),
            FilterRule::Faq => RagFilter::new().eq("type", "faq"),
            FilterRule::Technologies => structured("technologies"),
        }
    }
}

static FILTER_RULES: LazyLock<[(&'static LazyLock<Keywords>, FilterRule); 5]> =
    LazyLock::new(|| {
        [
            (&SERVICES, FilterRule::Services),
            (&CASE_STUDIES, FilterRule::CaseStudies),
            (&COMPANY, FilterRule::CompanyInfo),
            (&FAQ, FilterRule::Faq),
            (&TECHNOLOGIES, FilterRule::Technologies),
        ]
    });

/// First filter rule matching the query.
pub fn filter_rule(query: &str) -> Option<FilterRule> {
    FILTER_RULES
        .iter()
        .find(|(kw, _)| kw.matches(query))
        .map(|(_, rule)| *rule)
}

/// Layout used when structured items are rendered without the model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StructuredLayout {
    Card,
    Table,
}

pub fn structured_layout(query: &str) -> StructuredLayout {
    if CASE_STUDIES.matches(query) {
        StructuredLayout::Card
    } else {
        StructuredLayout::Table
    }
}

/// Topics with a canned fallback view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CannedTopic {
    Services,
    CaseStudies,
    Technologies,
}

static CANNED_RULES: LazyLock<[(&'static LazyLock<Keywords>, CannedTopic); 3]> =
    LazyLock::new(|| {
        [
            (&SERVICES, CannedTopic::Services),
            (&CASE_STUDIES, CannedTopic::CaseStudies),
            (&TECHNOLOGIES, CannedTopic::Technologies),
        ]
    });

pub fn canned_topic(query: &str) -> Option<CannedTopic> {
    CANNED_RULES
        .iter()
        .find(|(kw, _)| kw.matches(query))
        .map(|(_, topic)| *topic)
}

/// Answers that come straight from record metadata, bypassing the model.
pub fn exact_answer(query: &str, items: &[RetrievedItem]) -> Option<String> {
    if !SHARE_CAPITAL.matches(query) {
        return None;
    }
    items.iter().find_map(|item| {
        let value = match item.metadata.get("share_capital_authorized")? {
            Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        Some(format!("NicorAI’s authorized share capital is {value}."))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};

    fn item(meta: Value) -> RetrievedItem {
        RetrievedItem {
            id: "company-1".into(),
            content: String::new(),
            metadata: meta.as_object().cloned().unwrap_or_else(Map::new),
            relevance_score: 0.9,
        }
    }

    #[test]
    fn greetings_match_whole_query_only() {
        assert_eq!(greeting("hi"), Some(Greeting::Hello));
        assert_eq!(greeting("  Hello!! "), Some(Greeting::Hello));
        assert_eq!(greeting("How are you?"), Some(Greeting::HowAreYou));
        assert_eq!(greeting("how’s it going"), Some(Greeting::HowAreYou));
        assert_eq!(greeting("Good morning"), Some(Greeting::GoodMorning));
        assert_eq!(greeting("hi, what are your services?"), None);
        assert_eq!(greeting("history"), None);
        assert_eq!(greeting(""), None);
    }

    #[test]
    fn greeting_replies_mention_the_company() {
        for kind in [
            Greeting::Hello,
            Greeting::HowAreYou,
            Greeting::GoodMorning,
            Greeting::GoodEvening,
        ] {
            assert!(greeting_reply(kind).contains("NicorAI"));
        }
    }

    #[test]
    fn filter_rules_apply_in_priority_order() {
        assert_eq!(
            filter_rule("What are NicorAI's services?"),
            Some(FilterRule::Services)
        );
        assert_eq!(filter_rule("List case studies"), Some(FilterRule::CaseStudies));
        assert_eq!(
            filter_rule("company projects"),
            Some(FilterRule::CaseStudies)
        );
        assert_eq!(
            filter_rule("What is the share capital of NicorAI?"),
            Some(FilterRule::CompanyInfo)
        );
        assert_eq!(
            filter_rule("How does NicorAI build AI agents?"),
            Some(FilterRule::Faq)
        );
        assert_eq!(
            filter_rule("Show NicorAI technologies as table"),
            Some(FilterRule::Technologies)
        );
        assert_eq!(filter_rule("What does NicorAI do?"), None);
    }

    #[test]
    fn services_filter_is_structured_category() {
        let f = FilterRule::Services.filter();
        assert_eq!(
            f.equals,
            vec![
                ("type".to_string(), json!("structured_data")),
                ("category".to_string(), json!("services")),
            ]
        );
    }

    #[test]
    fn layouts_and_canned_topics() {
        assert_eq!(structured_layout("NicorAI projects"), StructuredLayout::Card);
        assert_eq!(structured_layout("our services"), StructuredLayout::Table);
        assert_eq!(canned_topic("technologies please"), Some(CannedTopic::Technologies));
        assert_eq!(canned_topic("tell me a joke"), None);
    }

    #[test]
    fn share_capital_comes_from_metadata() {
        let items = vec![
            item(json!({"type": "company_info"})),
            item(json!({"type": "company_info", "share_capital_authorized": "₹10,00,000"})),
        ];
        assert_eq!(
            exact_answer("What is the share capital of NicorAI?", &items).as_deref(),
            Some("NicorAI’s authorized share capital is ₹10,00,000.")
        );
        assert_eq!(exact_answer("What is NicorAI?", &items), None);
        assert_eq!(exact_answer("share capital?", &items[..1]), None);
    }
}
