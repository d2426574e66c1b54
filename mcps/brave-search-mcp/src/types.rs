//! Request and result types shared by every search kind
//!
//! A [`SearchRequest`] can only be obtained through [`SearchRequest::new`],
//! so a backend never sees an empty query, an unbounded count, or an
//! unrecognized filter.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AdapterError;
use crate::filters::{self, FilterValue};

/// Longest query Brave accepts
pub const MAX_QUERY_CHARS: usize = 400;

/// Which Brave vertical a request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Web,
    News,
    Image,
}

impl SearchKind {
    /// Largest `count` the provider honours for this vertical
    pub fn max_count(self) -> u32 {
        match self {
            SearchKind::Web => 20,
            SearchKind::News => 50,
            SearchKind::Image => 100,
        }
    }

    /// Path segment of the provider endpoint
    pub fn endpoint(self) -> &'static str {
        match self {
            SearchKind::Web => "web",
            SearchKind::News => "news",
            SearchKind::Image => "images",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SearchKind::Web => "web",
            SearchKind::News => "news",
            SearchKind::Image => "image",
        }
    }
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated, immutable search request
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    kind: SearchKind,
    query: String,
    count: u32,
    filters: BTreeMap<String, FilterValue>,
}

impl SearchRequest {
    /// Validate caller input and build a request
    ///
    /// `default_count` is used when `count` is `None`. Both are clamped to
    /// the kind's ceiling; an explicit zero is rejected.
    pub fn new(
        kind: SearchKind,
        query: &str,
        count: Option<u32>,
        default_count: u32,
        filters: Option<&BTreeMap<String, serde_json::Value>>,
    ) -> Result<Self, AdapterError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AdapterError::invalid("query must not be empty"));
        }
        let chars = query.chars().count();
        if chars > MAX_QUERY_CHARS {
            return Err(AdapterError::invalid(format!(
                "query is {} characters, the limit is {}",
                chars, MAX_QUERY_CHARS
            )));
        }

        let count = match count {
            Some(0) => return Err(AdapterError::invalid("count must be at least 1")),
            Some(n) => n,
            None => default_count.max(1),
        }
        .min(kind.max_count());

        let filters = match filters {
            Some(raw) => filters::validate(kind, raw)?,
            None => BTreeMap::new(),
        };

        Ok(Self {
            kind,
            query: query.to_string(),
            count,
            filters,
        })
    }

    pub fn kind(&self) -> SearchKind {
        self.kind
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Effective result count, already clamped
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn filters(&self) -> &BTreeMap<String, FilterValue> {
        &self.filters
    }

    /// Query-string pairs for the provider call, in a stable order
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("q".to_string(), self.query.clone()),
            ("count".to_string(), self.count.to_string()),
        ];
        pairs.extend(
            self.filters
                .iter()
                .map(|(k, v)| (k.clone(), v.to_string())),
        );
        pairs
    }
}

/// Kind of a normalized result item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Web,
    News,
    Image,
    Other,
}

/// A single normalized result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The title of the result
    pub title: String,
    /// Absolute URL of the result (the image itself for image results)
    pub url: String,
    /// Description or snippet, possibly empty
    pub snippet: String,
    pub kind: ResultKind,
    /// Site or publisher name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Provider's age string (e.g. "2 days ago")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Page hosting an image result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_url: Option<String>,
}

/// Ordered results of one search call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    /// The search query that was executed
    pub query: String,
    pub kind: SearchKind,
    /// The search results, in provider ranking order
    pub results: Vec<SearchResult>,
    /// The backend that was used
    pub backend: String,
}

/// A business or place from the provider's local index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalPlace {
    pub id: String,
    pub name: String,
    /// Street, locality, region and postal code joined with ", "
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub opening_hours: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Outcome of a local search
///
/// When the provider knows no places for the query, `places` is empty and
/// `web_fallback` holds an ordinary web search for the same query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalResults {
    pub query: String,
    pub places: Vec<LocalPlace>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_fallback: Option<SearchResults>,
}

/// An error reported inside a successful result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub kind: String,
    pub message: String,
}

impl From<&AdapterError> for ErrorReport {
    fn from(err: &AdapterError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// Outcome of an official-homepage lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomepageResult {
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub source: HomepageSource,
    /// The Brave search failed and the answer, if any, came from Wikidata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_error: Option<ErrorReport>,
    /// Why the Wikidata fallback could not answer, if it failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HomepageSource {
    Brave,
    Wikidata,
    None,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn web(query: &str, count: Option<u32>) -> Result<SearchRequest, AdapterError> {
        SearchRequest::new(SearchKind::Web, query, count, 10, None)
    }

    #[test]
    fn test_empty_query_rejected() {
        assert!(matches!(web("", None), Err(AdapterError::InvalidRequest(_))));
        assert!(matches!(web("   \t\n", None), Err(AdapterError::InvalidRequest(_))));
    }

    #[test]
    fn test_query_is_trimmed() {
        let request = web("  rust ownership  ", None).unwrap();
        assert_eq!(request.query(), "rust ownership");
    }

    #[test]
    fn test_overlong_query_rejected() {
        let query = "a".repeat(MAX_QUERY_CHARS + 1);
        assert!(matches!(web(&query, None), Err(AdapterError::InvalidRequest(_))));
        assert!(web(&"a".repeat(MAX_QUERY_CHARS), None).is_ok());
    }

    #[test]
    fn test_count_clamped_per_kind() {
        assert_eq!(web("q", Some(500)).unwrap().count(), 20);
        let news = SearchRequest::new(SearchKind::News, "q", Some(500), 10, None).unwrap();
        assert_eq!(news.count(), 50);
        let images = SearchRequest::new(SearchKind::Image, "q", Some(500), 10, None).unwrap();
        assert_eq!(images.count(), 100);
    }

    #[test]
    fn test_count_defaults_and_zero() {
        assert_eq!(web("q", None).unwrap().count(), 10);
        assert_eq!(web("q", Some(5)).unwrap().count(), 5);
        assert!(matches!(web("q", Some(0)), Err(AdapterError::InvalidRequest(_))));
        // A default above the ceiling is clamped too
        let request = SearchRequest::new(SearchKind::Web, "q", None, 99, None).unwrap();
        assert_eq!(request.count(), 20);
    }

    #[test]
    fn test_query_pairs_order() {
        let mut filters = BTreeMap::new();
        filters.insert("safesearch".to_string(), json!("strict"));
        filters.insert("country".to_string(), json!("ch"));
        let request =
            SearchRequest::new(SearchKind::Web, "nestle", Some(3), 10, Some(&filters)).unwrap();
        let pairs = request.query_pairs();
        assert_eq!(pairs[0], ("q".to_string(), "nestle".to_string()));
        assert_eq!(pairs[1], ("count".to_string(), "3".to_string()));
        assert_eq!(pairs[2], ("country".to_string(), "CH".to_string()));
        assert_eq!(pairs[3], ("safesearch".to_string(), "strict".to_string()));
    }

    #[test]
    fn test_results_serialize_without_empty_extras() {
        let item = SearchResult {
            title: "Rust".to_string(),
            url: "https://www.rust-lang.org/".to_string(),
            snippet: String::new(),
            kind: ResultKind::Web,
            source: None,
            published: None,
            thumbnail: None,
            page_url: None,
        };
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["kind"], "web");
        assert!(value.get("source").is_none());
        assert!(value.get("page_url").is_none());
    }
}
