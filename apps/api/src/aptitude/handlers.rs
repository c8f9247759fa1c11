use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::auth::AuthUser;
use crate::bridge::{run_json_script, ScriptCall, MCQ_TIMEOUT};
use crate::errors::AppError;
use crate::state::AppState;

const DEFAULT_TOPIC: &str = "quantitative";
const DEFAULT_COUNT: i64 = 5;
const MAX_COUNT: i64 = 10;

const TOPICS: [(&str, &str); 6] = [
    (
        "quantitative",
        "Quantitative Aptitude: Number Systems, Percentages, Profit Loss, Time Work, Speed Distance",
    ),
    (
        "logical",
        "Logical Reasoning: Series, Analogies, Pattern Recognition, Blood Relations, Coding Decoding",
    ),
    (
        "verbal",
        "Verbal Ability: Grammar, Vocabulary, Reading Comprehension, Synonyms Antonyms",
    ),
    (
        "technical",
        "Technical MCQ: Data Structures, Algorithms, OOP, DBMS, Operating Systems",
    ),
    (
        "coding",
        "Programming and Coding: Arrays, Strings, Sorting, Searching, Dynamic Programming",
    ),
    (
        "full",
        "Mixed Aptitude: Quantitative, Logical Reasoning, Verbal Ability, Data Interpretation",
    ),
];

/// Clients send the count as a number or a numeric string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CountParam {
    Number(f64),
    Text(String),
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    pub topic: Option<String>,
    pub count: Option<CountParam>,
}

/// Known topic keys expand to a descriptive prompt; anything else passes through.
pub fn resolve_topic(topic: Option<&str>) -> String {
    let topic = topic
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TOPIC);
    TOPICS
        .iter()
        .find(|(key, _)| *key == topic)
        .map_or(topic, |(_, prompt)| *prompt)
        .to_string()
}

/// Unparseable or zero counts use the default; the result is clamped to 1..=10.
pub fn clamp_count(count: Option<&CountParam>) -> i64 {
    let parsed = match count {
        Some(CountParam::Number(n)) => Some(n.trunc() as i64),
        Some(CountParam::Text(s)) => leading_int(s),
        None => None,
    };
    parsed
        .filter(|n| *n != 0)
        .unwrap_or(DEFAULT_COUNT)
        .clamp(1, MAX_COUNT)
}

/// Parses an optional sign and leading digits, ignoring anything after them.
fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// POST /api/aptitude/generate
pub async fn handle_generate(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<Value>, AppError> {
    let topic = resolve_topic(req.topic.as_deref());
    let count = clamp_count(req.count.as_ref());
    info!("Generating {count} MCQs for topic '{topic}'");

    let call = ScriptCall::python(
        "MCQ generation",
        &state.config.python_path,
        state.config.script("aptitude_rag.py"),
        MCQ_TIMEOUT,
    )
    .arg(topic)
    .arg(count.to_string());

    Ok(Json(run_json_script(&call).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn count_of(value: Value) -> i64 {
        let req: GenerateRequest = serde_json::from_value(json!({ "count": value })).unwrap();
        clamp_count(req.count.as_ref())
    }

    #[test]
    fn test_known_topics_expand() {
        assert!(resolve_topic(Some("logical")).starts_with("Logical Reasoning:"));
        assert!(resolve_topic(None).starts_with("Quantitative Aptitude:"));
    }

    #[test]
    fn test_unknown_topic_passes_through() {
        assert_eq!(resolve_topic(Some("Probability")), "Probability");
    }

    #[test]
    fn test_count_is_clamped() {
        assert_eq!(count_of(json!(50)), 10);
        assert_eq!(count_of(json!(-4)), 1);
        assert_eq!(count_of(json!("7")), 7);
        assert_eq!(count_of(json!("3 questions")), 3);
    }

    #[test]
    fn test_count_defaults() {
        assert_eq!(clamp_count(None), 5);
        assert_eq!(count_of(json!("many")), 5);
        assert_eq!(count_of(json!(0)), 5);
    }
}
