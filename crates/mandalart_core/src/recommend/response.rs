//! Provider response extraction and normalization.
//!
//! # Responsibility
//! - Locate the first top-level JSON object inside free-form provider text.
//! - Decode the `{sub_goals, action_items}` shape and check its cardinality.
//!
//! # Invariants
//! - Prose before or after the object is tolerated.
//! - A successful parse always yields exactly 8 sub-goals.

use crate::grid::{ActionItems, SUB_GOAL_COUNT};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Recommendation decoded from provider output, sub-goals in slot order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRecommendation {
    pub sub_goals: [String; SUB_GOAL_COUNT],
    pub action_items: ActionItems,
}

/// Decoding failures for provider output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseError {
    /// No JSON object anywhere in the text.
    NoJsonObject,
    /// A JSON object was found but does not have the expected shape.
    Malformed(String),
    /// `sub_goals` is missing.
    MissingSubGoals,
    /// `sub_goals` does not hold exactly 8 entries.
    InvalidSubGoalCount(usize),
}

impl Display for ResponseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoJsonObject => write!(f, "no JSON object found in provider response"),
            Self::Malformed(message) => write!(f, "malformed provider JSON: {message}"),
            Self::MissingSubGoals => write!(f, "provider JSON has no `sub_goals`"),
            Self::InvalidSubGoalCount(count) => write!(
                f,
                "provider returned {count} sub-goals; expected {SUB_GOAL_COUNT}"
            ),
        }
    }
}

impl Error for ResponseError {}

#[derive(Debug, Deserialize)]
struct WireRecommendation {
    #[serde(default)]
    sub_goals: Option<Vec<String>>,
    #[serde(default)]
    action_items: Option<WireActionItems>,
}

/// Providers normally key action items by sub-goal text; a positional list
/// is accepted as well because it survives duplicate sub-goal names.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireActionItems {
    Keyed(KeyedPairs),
    Ordered(Vec<Vec<String>>),
}

/// Object entries in document order, duplicates included.
#[derive(Debug)]
struct KeyedPairs(Vec<(String, Vec<String>)>);

impl<'de> Deserialize<'de> for KeyedPairs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PairsVisitor;

        impl<'de> Visitor<'de> for PairsVisitor {
            type Value = KeyedPairs;

            fn expecting(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "an object of string lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<KeyedPairs, A::Error> {
                let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, Vec<String>>()? {
                    pairs.push(entry);
                }
                Ok(KeyedPairs(pairs))
            }
        }

        deserializer.deserialize_map(PairsVisitor)
    }
}

/// Returns the first top-level JSON object embedded in `text`.
///
/// Every `{` is tried in order; the first one that opens a complete object
/// wins, whether or not it sits inside a code fence.
pub fn extract_json_object(text: &str) -> Option<&str> {
    text.match_indices('{')
        .find_map(|(start, _)| object_prefix(&text[start..]))
}

fn object_prefix(candidate: &str) -> Option<&str> {
    let mut stream = serde_json::Deserializer::from_str(candidate).into_iter::<Value>();
    match stream.next() {
        Some(Ok(Value::Object(_))) => Some(&candidate[..stream.byte_offset()]),
        _ => None,
    }
}

/// Decodes raw provider text into an ordered recommendation.
///
/// Generated strings are whitespace-collapsed and trimmed; keyed action-item
/// maps are matched against the normalized sub-goal texts. When several keys
/// normalize to the same text, the first one in the document wins.
pub fn parse_recommendation(text: &str) -> Result<ParsedRecommendation, ResponseError> {
    let object = extract_json_object(text).ok_or(ResponseError::NoJsonObject)?;
    let wire: WireRecommendation =
        serde_json::from_str(object).map_err(|err| ResponseError::Malformed(err.to_string()))?;

    let sub_goals = wire.sub_goals.ok_or(ResponseError::MissingSubGoals)?;
    let count = sub_goals.len();
    let sub_goals: [String; SUB_GOAL_COUNT] = sub_goals
        .iter()
        .map(|value| normalize_generated(value))
        .collect::<Vec<_>>()
        .try_into()
        .map_err(|_| ResponseError::InvalidSubGoalCount(count))?;

    let action_items = match wire.action_items {
        Some(WireActionItems::Keyed(KeyedPairs(pairs))) => {
            let mut keyed = HashMap::with_capacity(pairs.len());
            for (key, items) in pairs {
                keyed
                    .entry(normalize_generated(&key))
                    .or_insert_with(|| normalize_items(&items));
            }
            ActionItems::from_keyed(&sub_goals, &keyed)
        }
        Some(WireActionItems::Ordered(ordered)) => {
            let mut ordered = ordered.into_iter();
            ActionItems::from_slots(std::array::from_fn(|_| {
                ordered
                    .next()
                    .map(|items| normalize_items(&items))
                    .unwrap_or_default()
            }))
        }
        None => ActionItems::default(),
    };

    Ok(ParsedRecommendation {
        sub_goals,
        action_items,
    })
}

fn normalize_generated(value: &str) -> String {
    WHITESPACE_RE.replace_all(value.trim(), " ").into_owned()
}

fn normalize_items(items: &[String]) -> Vec<String> {
    items.iter().map(|item| normalize_generated(item)).collect()
}
