//! Place-lookup adapters. `NominatimPlaceLookup` talks to any
//! Nominatim-compatible geocoding search endpoint; `DisabledPlaceLookup`
//! is an offline stand-in that always returns nothing, so unmatched
//! venues simply come back as new.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::app::ports::PlaceLookup;
use crate::config::PlaceLookupConfig;
use crate::constants::PLACE_RESULT_LIMIT;
use crate::domain::PlaceCandidate;
use crate::error::Result;

/// One search hit in the Nominatim JSON format. Coordinates arrive as
/// strings; missing or malformed values fall back to 0,0 rather than
/// failing the whole lookup.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    place_id: serde_json::Value,
    display_name: String,
    #[serde(default)]
    name: Option<String>,
    lat: String,
    lon: String,
}

impl From<NominatimPlace> for PlaceCandidate {
    fn from(place: NominatimPlace) -> Self {
        let name = place
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| {
                place
                    .display_name
                    .split(',')
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string()
            });
        let place_id = match place.place_id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        Self {
            name,
            formatted_address: place.display_name,
            latitude: place.lat.parse().unwrap_or(0.0),
            longitude: place.lon.parse().unwrap_or(0.0),
            place_id,
        }
    }
}

pub struct NominatimPlaceLookup {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimPlaceLookup {
    pub fn new(config: &PlaceLookupConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PlaceLookup for NominatimPlaceLookup {
    async fn search(&self, term: &str) -> Result<Vec<PlaceCandidate>> {
        let url = format!("{}/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", term),
                ("format", "json"),
                ("limit", &PLACE_RESULT_LIMIT.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let places: Vec<NominatimPlace> = response.json().await?;
        debug!("Place lookup for {:?} returned {} hits", term, places.len());
        Ok(places.into_iter().map(PlaceCandidate::from).collect())
    }
}

/// No-op lookup for offline runs and tests.
pub struct DisabledPlaceLookup;

#[async_trait]
impl PlaceLookup for DisabledPlaceLookup {
    async fn search(&self, _term: &str) -> Result<Vec<PlaceCandidate>> {
        Ok(Vec::new())
    }
}
