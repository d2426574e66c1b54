//! Brave local search responses
//!
//! A local search is a web search with `result_filter=locations`, whose
//! location ids are then resolved through `/local/pois` and
//! `/local/descriptions`.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::AdapterError;
use crate::types::LocalPlace;

#[derive(Debug, Deserialize)]
struct LocationsResponse {
    #[serde(rename = "type")]
    response_type: String,
    /// Absent when the query matches no places
    locations: Option<LocationsSection>,
}

#[derive(Debug, Deserialize)]
struct LocationsSection {
    results: Vec<LocationRef>,
}

#[derive(Debug, Deserialize)]
struct LocationRef {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PoisResponse {
    results: Vec<Poi>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Poi {
    id: String,
    name: String,
    address: Option<PostalAddress>,
    phone: Option<String>,
    rating: Option<Rating>,
    price_range: Option<String>,
    #[serde(default)]
    opening_hours: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostalAddress {
    street_address: Option<String>,
    address_locality: Option<String>,
    address_region: Option<String>,
    postal_code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Rating {
    rating_value: Option<f64>,
    rating_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct DescriptionsResponse {
    descriptions: HashMap<String, String>,
}

fn malformed(what: &str, e: serde_json::Error) -> AdapterError {
    AdapterError::MalformedUpstreamResponse(format!(
        "{} response does not match the expected schema: {}",
        what, e
    ))
}

/// Location ids from a `result_filter=locations` search, in ranking order
pub(crate) fn parse_location_ids(body: &str) -> Result<Vec<String>, AdapterError> {
    let response: LocationsResponse =
        serde_json::from_str(body).map_err(|e| malformed("locations", e))?;
    if response.response_type != "search" {
        return Err(AdapterError::MalformedUpstreamResponse(format!(
            "expected response type 'search', got '{}'",
            response.response_type
        )));
    }
    Ok(response
        .locations
        .map(|l| l.results)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|r| r.id)
        .filter(|id| !id.is_empty())
        .collect())
}

fn join_address(address: PostalAddress) -> Option<String> {
    let parts: Vec<String> = [
        address.street_address,
        address.address_locality,
        address.address_region,
        address.postal_code,
    ]
    .into_iter()
    .flatten()
    .map(|p| p.trim().to_string())
    .filter(|p| !p.is_empty())
    .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

/// Merge POI details with their descriptions, in POI order
pub(crate) fn parse_places(
    pois_body: &str,
    descriptions_body: &str,
) -> Result<Vec<LocalPlace>, AdapterError> {
    let pois: PoisResponse = serde_json::from_str(pois_body).map_err(|e| malformed("pois", e))?;
    let mut descriptions: DescriptionsResponse = serde_json::from_str(descriptions_body)
        .map_err(|e| malformed("descriptions", e))?;

    Ok(pois
        .results
        .into_iter()
        .map(|poi| {
            let (rating, rating_count) = poi
                .rating
                .map(|r| (r.rating_value, r.rating_count))
                .unwrap_or_default();
            LocalPlace {
                description: descriptions.descriptions.remove(&poi.id),
                id: poi.id,
                name: poi.name,
                address: poi.address.and_then(join_address),
                phone: poi.phone.filter(|p| !p.trim().is_empty()),
                rating,
                rating_count,
                price_range: poi.price_range,
                opening_hours: poi.opening_hours,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_ids_in_order() {
        let body = r#"{
            "type": "search",
            "locations": {"results": [{"id": "loc-1"}, {"title": "no id"}, {"id": ""}, {"id": "loc-2"}]}
        }"#;
        assert_eq!(parse_location_ids(body).unwrap(), vec!["loc-1", "loc-2"]);
    }

    #[test]
    fn test_no_locations_section() {
        assert!(parse_location_ids(r#"{"type": "search"}"#).unwrap().is_empty());
        assert!(matches!(
            parse_location_ids(r#"{"locations": {"results": []}}"#),
            Err(AdapterError::MalformedUpstreamResponse(_))
        ));
    }

    #[test]
    fn test_places_merge_descriptions() {
        let pois = r#"{"results": [
            {"id": "a", "name": "Café Zähringer",
             "address": {"streetAddress": "Zähringerplatz 11", "addressLocality": "Zürich", "postalCode": "8001"},
             "phone": "+41 44 252 05 00",
             "rating": {"ratingValue": 4.5, "ratingCount": 812},
             "priceRange": "$$", "openingHours": ["Mo-Fr 08:00-23:00"]},
            {"id": "b", "name": "Bare"}
        ]}"#;
        let descriptions = r#"{"descriptions": {"a": "Cosy café in the old town."}}"#;

        let places = parse_places(pois, descriptions).unwrap();

        assert_eq!(places.len(), 2);
        assert_eq!(places[0].address.as_deref(), Some("Zähringerplatz 11, Zürich, 8001"));
        assert_eq!(places[0].rating, Some(4.5));
        assert_eq!(places[0].rating_count, Some(812));
        assert_eq!(places[0].description.as_deref(), Some("Cosy café in the old town."));
        assert_eq!(places[1].address, None);
        assert_eq!(places[1].description, None);
        assert!(places[1].opening_hours.is_empty());
    }

    #[test]
    fn test_poi_without_name_is_malformed() {
        let pois = r#"{"results": [{"id": "a"}]}"#;
        assert!(matches!(
            parse_places(pois, r#"{"descriptions": {}}"#),
            Err(AdapterError::MalformedUpstreamResponse(_))
        ));
        assert!(parse_places(r#"{"results": []}"#, "{}").is_err());
    }
}
