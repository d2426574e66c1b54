//! Official homepage lookup
//!
//! Searches for `"<company>" official website` and picks the first result
//! whose host names the company, then the first result on any host that is
//! not excluded. When Brave has nothing usable, or the Brave call itself
//! fails for a reason other than bad input, Wikidata's P856 claim is tried
//! and the Brave error is reported alongside the answer.

use std::sync::Arc;

use crate::backends::SearchBackend;
use crate::error::AdapterError;
use crate::types::{
    ErrorReport, HomepageResult, HomepageSource, SearchKind, SearchRequest, SearchResult,
};
use crate::wikidata::WikidataClient;

#[derive(Clone)]
pub struct HomepageFinder {
    backend: Arc<dyn SearchBackend>,
    wikidata: Option<WikidataClient>,
    excluded_domains: Vec<String>,
    default_count: u32,
}

impl HomepageFinder {
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        wikidata: Option<WikidataClient>,
        excluded_domains: Vec<String>,
        default_count: u32,
    ) -> Self {
        let excluded_domains = excluded_domains
            .into_iter()
            .map(|d| d.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        Self {
            backend,
            wikidata,
            excluded_domains,
            default_count,
        }
    }

    pub async fn find(&self, company: &str, count: Option<u32>) -> Result<HomepageResult, AdapterError> {
        let company = company.trim().replace('"', "");
        let company = company.trim();
        if company.is_empty() {
            return Err(AdapterError::invalid("company must not be empty"));
        }

        let query = format!("\"{}\" official website", company);
        let request = SearchRequest::new(SearchKind::Web, &query, count, self.default_count, None)?;

        let primary_error = match self.backend.search(&request).await {
            Ok(results) => {
                if let Some(url) = pick_homepage(&results.results, company, &self.excluded_domains) {
                    return Ok(HomepageResult {
                        company: company.to_string(),
                        url: Some(url),
                        source: HomepageSource::Brave,
                        primary_error: None,
                        fallback_error: None,
                    });
                }
                None
            }
            // Bad input would fail the same way anywhere
            Err(e @ AdapterError::InvalidRequest(_)) => return Err(e),
            Err(e) if self.wikidata.is_none() => return Err(e),
            Err(e) => {
                tracing::warn!(company, error = %e, "brave lookup failed, trying wikidata");
                Some(ErrorReport::from(&e))
            }
        };

        let Some(wikidata) = &self.wikidata else {
            return Ok(not_found(company, None, None));
        };

        tracing::info!(company, "no usable brave result, trying wikidata");
        match wikidata.official_website(company).await {
            Ok(Some(url)) => Ok(HomepageResult {
                company: company.to_string(),
                url: Some(url),
                source: HomepageSource::Wikidata,
                primary_error,
                fallback_error: None,
            }),
            Ok(None) => Ok(not_found(company, primary_error, None)),
            Err(e) => {
                tracing::warn!(company, error = %e, "wikidata lookup failed");
                Ok(not_found(company, primary_error, Some(e.to_string())))
            }
        }
    }
}

fn not_found(
    company: &str,
    primary_error: Option<ErrorReport>,
    fallback_error: Option<String>,
) -> HomepageResult {
    HomepageResult {
        company: company.to_string(),
        url: None,
        source: HomepageSource::None,
        primary_error,
        fallback_error,
    }
}

/// Lowercased company name with everything but letters and digits removed
fn company_key(company: &str) -> String {
    company
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn host_of(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()?
        .host_str()
        .map(|h| h.to_ascii_lowercase())
}

/// `en.wikipedia.org` is excluded by `wikipedia.org`; `notwikipedia.org` is not
fn is_excluded(host: &str, excluded: &[String]) -> bool {
    excluded
        .iter()
        .any(|d| host == d || host.ends_with(&format!(".{}", d)))
}

/// Choose the most likely official site from ranked results
pub fn pick_homepage(results: &[SearchResult], company: &str, excluded: &[String]) -> Option<String> {
    let key = company_key(company);
    let candidates: Vec<(&SearchResult, String)> = results
        .iter()
        .filter_map(|r| host_of(&r.url).map(|h| (r, h)))
        .filter(|(_, host)| !is_excluded(host, excluded))
        .collect();

    if !key.is_empty() {
        if let Some((r, _)) = candidates
            .iter()
            .find(|(_, host)| company_key(host).contains(&key))
        {
            return Some(r.url.clone());
        }
    }

    candidates.first().map(|(r, _)| r.url.clone())
}
