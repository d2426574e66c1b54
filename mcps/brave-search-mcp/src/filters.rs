//! Recognized search filters
//!
//! Filters arrive as a loosely typed JSON map from the agent. Each key must
//! be listed in [`FILTERS`] and supported by the request's kind, and each
//! value must parse for that key. Anything else is an `InvalidRequest` so a
//! caller typo never silently changes what is searched.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::AdapterError;
use crate::types::SearchKind;

/// A normalized filter value, rendered into the provider query string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Integer(u64),
    Flag(bool),
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Text(s) => f.write_str(s),
            FilterValue::Integer(n) => write!(f, "{}", n),
            FilterValue::Flag(b) => write!(f, "{}", b),
        }
    }
}

type Parser = fn(SearchKind, &Value) -> Result<FilterValue, String>;

/// A filter key the provider understands
pub struct FilterDef {
    pub name: &'static str,
    pub kinds: &'static [SearchKind],
    pub description: &'static str,
    parse: Parser,
}

const ALL: &[SearchKind] = &[SearchKind::Web, SearchKind::News, SearchKind::Image];
const TEXTUAL: &[SearchKind] = &[SearchKind::Web, SearchKind::News];

pub const FILTERS: &[FilterDef] = &[
    FilterDef {
        name: "freshness",
        kinds: TEXTUAL,
        description: "pd, pw, pm, py, or YYYY-MM-DDtoYYYY-MM-DD",
        parse: parse_freshness,
    },
    FilterDef {
        name: "country",
        kinds: ALL,
        description: "two-letter country code, e.g. US",
        parse: parse_country,
    },
    FilterDef {
        name: "search_lang",
        kinds: ALL,
        description: "language code of the results, e.g. en",
        parse: parse_language,
    },
    FilterDef {
        name: "ui_lang",
        kinds: TEXTUAL,
        description: "locale of the response, e.g. en-US",
        parse: parse_language,
    },
    FilterDef {
        name: "safesearch",
        kinds: ALL,
        description: "off, moderate, or strict (images: off or strict)",
        parse: parse_safesearch,
    },
    FilterDef {
        name: "offset",
        kinds: TEXTUAL,
        description: "page offset, 0 to 9",
        parse: parse_offset,
    },
    FilterDef {
        name: "spellcheck",
        kinds: ALL,
        description: "whether the provider may correct the query",
        parse: parse_flag,
    },
];

/// Look up a filter by name
pub fn find(name: &str) -> Option<&'static FilterDef> {
    FILTERS.iter().find(|f| f.name == name)
}

/// Validate raw caller filters for a request kind
pub fn validate(
    kind: SearchKind,
    raw: &BTreeMap<String, Value>,
) -> Result<BTreeMap<String, FilterValue>, AdapterError> {
    let mut out = BTreeMap::new();
    for (name, value) in raw {
        let spec = find(name).ok_or_else(|| {
            AdapterError::invalid(format!(
                "unrecognized filter '{}' (recognized: {})",
                name,
                FILTERS.iter().map(|f| f.name).collect::<Vec<_>>().join(", ")
            ))
        })?;
        if !spec.kinds.contains(&kind) {
            return Err(AdapterError::invalid(format!(
                "filter '{}' is not supported for {} search",
                name, kind
            )));
        }
        let parsed = (spec.parse)(kind, value)
            .map_err(|e| AdapterError::invalid(format!("filter '{}': {}", name, e)))?;
        out.insert(name.clone(), parsed);
    }
    Ok(out)
}

/// Strings pass through; numbers and booleans are accepted in string form
fn scalar_text(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(format!("expected a string, number, or boolean, got {}", other)),
    }
}

fn parse_freshness(_: SearchKind, value: &Value) -> Result<FilterValue, String> {
    let text = scalar_text(value)?;
    match text.as_str() {
        "pd" | "pw" | "pm" | "py" => return Ok(FilterValue::Text(text)),
        _ => {}
    }
    let (start, end) = text
        .split_once("to")
        .ok_or_else(|| format!("'{}' is not pd, pw, pm, py, or a date range", text))?;
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d")
        .map_err(|_| format!("'{}' is not a valid start date", start))?;
    let end = NaiveDate::parse_from_str(end, "%Y-%m-%d")
        .map_err(|_| format!("'{}' is not a valid end date", end))?;
    if start > end {
        return Err("date range starts after it ends".to_string());
    }
    Ok(FilterValue::Text(format!(
        "{}to{}",
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d")
    )))
}

fn parse_country(_: SearchKind, value: &Value) -> Result<FilterValue, String> {
    let text = scalar_text(value)?;
    if text.len() == 2 && text.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(FilterValue::Text(text.to_ascii_uppercase()))
    } else {
        Err(format!("'{}' is not a two-letter country code", text))
    }
}

fn parse_language(_: SearchKind, value: &Value) -> Result<FilterValue, String> {
    let text = scalar_text(value)?;
    let valid = (2..=7).contains(&text.len())
        && text.chars().all(|c| c.is_ascii_alphabetic() || c == '-')
        && !text.starts_with('-')
        && !text.ends_with('-');
    if valid {
        Ok(FilterValue::Text(text))
    } else {
        Err(format!("'{}' is not a language code", text))
    }
}

fn parse_safesearch(kind: SearchKind, value: &Value) -> Result<FilterValue, String> {
    let text = scalar_text(value)?.to_ascii_lowercase();
    let allowed: &[&str] = match kind {
        SearchKind::Image => &["off", "strict"],
        _ => &["off", "moderate", "strict"],
    };
    if allowed.contains(&text.as_str()) {
        Ok(FilterValue::Text(text))
    } else {
        Err(format!("'{}' must be one of {}", text, allowed.join(", ")))
    }
}

fn parse_offset(_: SearchKind, value: &Value) -> Result<FilterValue, String> {
    let text = scalar_text(value)?;
    match text.parse::<u64>() {
        Ok(n) if n <= 9 => Ok(FilterValue::Integer(n)),
        _ => Err(format!("'{}' must be an integer from 0 to 9", text)),
    }
}

fn parse_flag(_: SearchKind, value: &Value) -> Result<FilterValue, String> {
    match scalar_text(value)?.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(FilterValue::Flag(true)),
        "false" | "0" => Ok(FilterValue::Flag(false)),
        other => Err(format!("'{}' is not a boolean", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(kind: SearchKind, pairs: &[(&str, Value)]) -> Result<BTreeMap<String, FilterValue>, AdapterError> {
        let raw: BTreeMap<String, Value> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        validate(kind, &raw)
    }

    #[test]
    fn test_unrecognized_key_rejected() {
        let err = check(SearchKind::Web, &[("freshnes", json!("pd"))]).unwrap_err();
        assert!(matches!(err, AdapterError::InvalidRequest(_)));
        assert!(err.to_string().contains("freshnes"));
    }

    #[test]
    fn test_key_unsupported_for_kind() {
        let err = check(SearchKind::Image, &[("freshness", json!("pw"))]).unwrap_err();
        assert!(err.to_string().contains("not supported for image search"));
    }

    #[test]
    fn test_freshness_values() {
        let ok = check(SearchKind::News, &[("freshness", json!("pw"))]).unwrap();
        assert_eq!(ok["freshness"], FilterValue::Text("pw".to_string()));

        let range = check(SearchKind::Web, &[("freshness", json!("2024-01-01to2024-02-01"))]).unwrap();
        assert_eq!(range["freshness"].to_string(), "2024-01-01to2024-02-01");

        assert!(check(SearchKind::Web, &[("freshness", json!("yesterday"))]).is_err());
        assert!(check(SearchKind::Web, &[("freshness", json!("2024-03-01to2024-02-01"))]).is_err());
    }

    #[test]
    fn test_numbers_and_bools_accepted() {
        let ok = check(
            SearchKind::Web,
            &[("offset", json!(2)), ("spellcheck", json!(false))],
        )
        .unwrap();
        assert_eq!(ok["offset"], FilterValue::Integer(2));
        assert_eq!(ok["spellcheck"], FilterValue::Flag(false));
        assert!(check(SearchKind::Web, &[("offset", json!(10))]).is_err());
    }

    #[test]
    fn test_structured_values_rejected() {
        assert!(check(SearchKind::Web, &[("country", json!(["US"]))]).is_err());
        assert!(check(SearchKind::Web, &[("country", json!({"code": "US"}))]).is_err());
        assert!(check(SearchKind::Web, &[("country", Value::Null)]).is_err());
    }

    #[test]
    fn test_safesearch_per_kind() {
        assert!(check(SearchKind::Web, &[("safesearch", json!("Moderate"))]).is_ok());
        assert!(check(SearchKind::Image, &[("safesearch", json!("moderate"))]).is_err());
        assert!(check(SearchKind::Image, &[("safesearch", json!("strict"))]).is_ok());
    }

    #[test]
    fn test_locale_codes() {
        assert!(check(SearchKind::Web, &[("ui_lang", json!("en-US"))]).is_ok());
        assert!(check(SearchKind::Web, &[("search_lang", json!("pt-br"))]).is_ok());
        assert!(check(SearchKind::Web, &[("search_lang", json!("e"))]).is_err());
        assert!(check(SearchKind::Web, &[("country", json!("USA"))]).is_err());
    }
}
