//! Wikidata lookup of a company's official website (property P856)
//!
//! Two calls: `wbsearchentities` to find the entity, then `wbgetclaims`
//! for its P856 claim.

use std::collections::HashMap;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::AdapterError;

const OFFICIAL_WEBSITE: &str = "P856";

/// Client for the Wikidata action API
#[derive(Clone)]
pub struct WikidataClient {
    client: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct SearchEntitiesResponse {
    search: Vec<Entity>,
}

#[derive(Debug, Deserialize)]
struct Entity {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ClaimsResponse {
    claims: Claims,
}

/// PHP-encoded JSON renders an empty claim map as `[]`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Claims {
    Map(HashMap<String, Vec<Claim>>),
    Empty(Vec<serde_json::Value>),
}

#[derive(Debug, Deserialize)]
struct Claim {
    mainsnak: Snak,
}

#[derive(Debug, Deserialize)]
struct Snak {
    /// Absent for "no value" / "unknown value" snaks
    datavalue: Option<DataValue>,
}

#[derive(Debug, Deserialize)]
struct DataValue {
    value: serde_json::Value,
}

impl WikidataClient {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    async fn get<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T, AdapterError> {
        let response = self
            .client
            .get(&self.url)
            .query(params)
            .send()
            .await
            .map_err(AdapterError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let body = response.text().await.unwrap_or_default();
            return Err(AdapterError::from_status(status, &headers, &body));
        }

        let body = response.text().await.map_err(AdapterError::from_transport)?;
        serde_json::from_str(&body).map_err(|e| {
            AdapterError::MalformedUpstreamResponse(format!("wikidata response: {}", e))
        })
    }

    /// Official website of the best-matching entity, if it has one
    pub async fn official_website(&self, company: &str) -> Result<Option<String>, AdapterError> {
        let found: SearchEntitiesResponse = self
            .get(&[
                ("action", "wbsearchentities"),
                ("format", "json"),
                ("language", "en"),
                ("search", company),
            ])
            .await?;

        let Some(entity) = found.search.into_iter().next() else {
            tracing::debug!(company, "no wikidata entity");
            return Ok(None);
        };

        let claims: ClaimsResponse = self
            .get(&[
                ("action", "wbgetclaims"),
                ("format", "json"),
                ("entity", entity.id.as_str()),
                ("property", OFFICIAL_WEBSITE),
            ])
            .await?;

        Ok(first_website(claims.claims))
    }
}

fn first_website(claims: Claims) -> Option<String> {
    let Claims::Map(mut map) = claims else {
        return None;
    };
    map.remove(OFFICIAL_WEBSITE)?
        .into_iter()
        .filter_map(|c| c.mainsnak.datavalue)
        .find_map(|d| d.value.as_str().map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_website() {
        let body = r#"{"claims": {"P856": [
            {"mainsnak": {"snaktype": "novalue"}},
            {"mainsnak": {"datavalue": {"value": "https://www.nestle.com", "type": "string"}}}
        ]}}"#;
        let parsed: ClaimsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            first_website(parsed.claims).as_deref(),
            Some("https://www.nestle.com")
        );
    }

    #[test]
    fn test_empty_claims_array() {
        let parsed: ClaimsResponse = serde_json::from_str(r#"{"claims": []}"#).unwrap();
        assert_eq!(first_website(parsed.claims), None);
    }

    #[test]
    fn test_missing_search_is_error() {
        let parsed: Result<SearchEntitiesResponse, _> = serde_json::from_str(r#"{"error": {}}"#);
        assert!(parsed.is_err());
    }
}
