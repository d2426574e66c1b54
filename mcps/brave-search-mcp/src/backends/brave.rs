//! Brave Search backend
//!
//! Implements the SearchBackend trait against the Brave Search API.
//! See: https://api-dashboard.search.brave.com/app/documentation
//!
//! Responses are parsed into strict serde types. A body that does not fit
//! them is a `MalformedUpstreamResponse`; an item without a usable URL is
//! dropped on its own.

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::Client;
use serde::Deserialize;

use super::{local, SearchBackend};
use crate::config::{BraveConfig, ConfigError};
use crate::error::AdapterError;
use crate::types::{LocalPlace, ResultKind, SearchKind, SearchRequest, SearchResult, SearchResults};

const TOKEN_HEADER: &str = "X-Subscription-Token";

/// Brave backend
pub struct BraveBackend {
    client: Client,
    base_url: String,
    token: HeaderValue,
}

impl BraveBackend {
    pub fn new(client: Client, config: &BraveConfig) -> Result<Self, ConfigError> {
        let mut token =
            HeaderValue::from_str(config.credential.expose()).map_err(|_| ConfigError::Invalid {
                key: "brave.api_key",
                message: "contains characters not allowed in an HTTP header".to_string(),
            })?;
        token.set_sensitive(true);

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            token,
        })
    }

    fn endpoint(&self, kind: SearchKind) -> String {
        format!("{}/res/v1/{}/search", self.base_url, kind.endpoint())
    }

    /// One authenticated GET; returns the body of a successful response
    async fn fetch(&self, url: String, params: &[(String, String)]) -> Result<String, AdapterError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .header(TOKEN_HEADER, self.token.clone())
            .query(params)
            .send()
            .await
            .map_err(AdapterError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let body = response.text().await.unwrap_or_default();
            let err = AdapterError::from_status(status, &headers, &body);
            tracing::warn!(status = %status, error_kind = err.kind(), "brave request failed");
            return Err(err);
        }

        response.text().await.map_err(AdapterError::from_transport)
    }
}

// Brave API response types

#[derive(Debug, Deserialize)]
struct WebResponse {
    #[serde(rename = "type")]
    response_type: String,
    /// Absent when the query has no web hits
    web: Option<WebSection>,
}

#[derive(Debug, Deserialize)]
struct WebSection {
    results: Vec<WebItem>,
}

#[derive(Debug, Deserialize)]
struct WebItem {
    title: String,
    url: Option<String>,
    description: Option<String>,
    #[serde(rename = "type")]
    item_type: Option<String>,
    age: Option<String>,
    profile: Option<Profile>,
    thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(rename = "type")]
    response_type: String,
    results: Vec<NewsItem>,
}

#[derive(Debug, Deserialize)]
struct NewsItem {
    title: String,
    url: Option<String>,
    description: Option<String>,
    age: Option<String>,
    meta_url: Option<MetaUrl>,
    thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(rename = "type")]
    response_type: String,
    results: Vec<ImageItem>,
}

#[derive(Debug, Deserialize)]
struct ImageItem {
    title: String,
    /// Page hosting the image
    url: Option<String>,
    source: Option<String>,
    properties: Option<ImageProperties>,
    thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct ImageProperties {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Profile {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MetaUrl {
    hostname: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    src: Option<String>,
}

/// Keep only absolute http(s) URLs
fn absolute_url(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    match url::Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {
            Some(raw.to_string())
        }
        _ => None,
    }
}

fn decode<'a, T: Deserialize<'a>>(body: &'a str, expected_type: &str) -> Result<T, AdapterError> {
    serde_json::from_str(body).map_err(|e| {
        AdapterError::MalformedUpstreamResponse(format!(
            "{} response does not match the expected schema: {}",
            expected_type, e
        ))
    })
}

fn check_type(actual: &str, expected: &str) -> Result<(), AdapterError> {
    if actual == expected {
        Ok(())
    } else {
        Err(AdapterError::MalformedUpstreamResponse(format!(
            "expected response type '{}', got '{}'",
            expected, actual
        )))
    }
}

/// Parse a provider body into normalized items, in provider order
///
/// Returns the items and how many were dropped for lacking a usable URL.
pub(crate) fn parse_results(
    kind: SearchKind,
    body: &str,
) -> Result<(Vec<SearchResult>, usize), AdapterError> {
    let mut dropped = 0;
    let mut keep = |url: Option<String>| {
        if url.is_none() {
            dropped += 1;
        }
        url
    };

    let results: Vec<SearchResult> = match kind {
        SearchKind::Web => {
            let response: WebResponse = decode(body, "web")?;
            check_type(&response.response_type, "search")?;
            response
                .web
                .map(|w| w.results)
                .unwrap_or_default()
                .into_iter()
                .filter_map(|item| {
                    let url = keep(absolute_url(item.url.as_deref()))?;
                    let kind = match item.item_type.as_deref() {
                        None | Some("search_result") => ResultKind::Web,
                        Some(_) => ResultKind::Other,
                    };
                    Some(SearchResult {
                        title: item.title,
                        url,
                        snippet: item.description.unwrap_or_default(),
                        kind,
                        source: item.profile.and_then(|p| p.name),
                        published: item.age,
                        thumbnail: item.thumbnail.and_then(|t| t.src),
                        page_url: None,
                    })
                })
                .collect()
        }
        SearchKind::News => {
            let response: NewsResponse = decode(body, "news")?;
            check_type(&response.response_type, "news")?;
            response
                .results
                .into_iter()
                .filter_map(|item| {
                    let url = keep(absolute_url(item.url.as_deref()))?;
                    Some(SearchResult {
                        title: item.title,
                        url,
                        snippet: item.description.unwrap_or_default(),
                        kind: ResultKind::News,
                        source: item.meta_url.and_then(|m| m.hostname),
                        published: item.age,
                        thumbnail: item.thumbnail.and_then(|t| t.src),
                        page_url: None,
                    })
                })
                .collect()
        }
        SearchKind::Image => {
            let response: ImageResponse = decode(body, "images")?;
            check_type(&response.response_type, "images")?;
            response
                .results
                .into_iter()
                .filter_map(|item| {
                    let page_url = absolute_url(item.url.as_deref());
                    let image_url = item
                        .properties
                        .and_then(|p| absolute_url(p.url.as_deref()))
                        .or_else(|| page_url.clone());
                    let url = keep(image_url)?;
                    Some(SearchResult {
                        title: item.title,
                        url,
                        snippet: String::new(),
                        kind: ResultKind::Image,
                        source: item.source,
                        published: None,
                        thumbnail: item.thumbnail.and_then(|t| t.src),
                        page_url,
                    })
                })
                .collect()
        }
    };

    Ok((results, dropped))
}

#[async_trait]
impl SearchBackend for BraveBackend {
    fn name(&self) -> &str {
        "brave"
    }

    fn is_available(&self) -> bool {
        !self.base_url.is_empty() && !self.token.is_empty()
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResults, AdapterError> {
        let kind = request.kind();
        tracing::debug!(
            kind = %kind,
            count = request.count(),
            filters = request.filters().len(),
            "calling brave"
        );

        let body = self.fetch(self.endpoint(kind), &request.query_pairs()).await?;
        let (mut results, dropped) = parse_results(kind, &body).inspect_err(|e| {
            tracing::warn!(error = %e, "brave response rejected");
        })?;
        if dropped > 0 {
            tracing::debug!(dropped, "dropped results without a usable URL");
        }
        results.truncate(request.count() as usize);

        tracing::debug!(kind = %kind, result_count = results.len(), "brave search completed");

        Ok(SearchResults {
            query: request.query().to_string(),
            kind,
            results,
            backend: self.name().to_string(),
        })
    }

    async fn search_local(&self, request: &SearchRequest) -> Result<Vec<LocalPlace>, AdapterError> {
        let mut params = request.query_pairs();
        params.push(("result_filter".to_string(), "locations".to_string()));
        let body = self.fetch(self.endpoint(SearchKind::Web), &params).await?;

        let mut ids = local::parse_location_ids(&body)
            .inspect_err(|e| tracing::warn!(error = %e, "brave locations response rejected"))?;
        ids.truncate(request.count() as usize);
        if ids.is_empty() {
            tracing::debug!("brave returned no locations");
            return Ok(Vec::new());
        }

        let id_params: Vec<(String, String)> =
            ids.into_iter().map(|id| ("ids".to_string(), id)).collect();
        let (pois, descriptions) = tokio::try_join!(
            self.fetch(format!("{}/res/v1/local/pois", self.base_url), &id_params),
            self.fetch(format!("{}/res/v1/local/descriptions", self.base_url), &id_params),
        )?;

        let places = local::parse_places(&pois, &descriptions)
            .inspect_err(|e| tracing::warn!(error = %e, "brave local response rejected"))?;
        tracing::debug!(place_count = places.len(), "brave local search completed");
        Ok(places)
    }
}
