use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;

use super::{NearbyPlace, PlacesProvider};

const NEARBY_SEARCH_URL: &str = "https://maps.googleapis.com/maps/api/place/nearbysearch/json";
const SEARCH_RADIUS_METERS: u32 = 5000;

pub struct GooglePlaces {
    api_key: String,
    client: reqwest::Client,
}

impl GooglePlaces {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct NearbyResponse {
    status: String,
    #[serde(default)]
    results: Vec<PlaceResult>,
}

#[derive(Deserialize)]
struct PlaceResult {
    name: String,
    #[serde(default)]
    vicinity: Option<String>,
    geometry: Geometry,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    opening_hours: Option<OpeningHours>,
}

#[derive(Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct OpeningHours {
    #[serde(default)]
    open_now: Option<bool>,
}

#[async_trait]
impl PlacesProvider for GooglePlaces {
    async fn search(&self, lat: f64, lng: f64, keyword: &str) -> anyhow::Result<Vec<NearbyPlace>> {
        let response: NearbyResponse = self
            .client
            .get(NEARBY_SEARCH_URL)
            .query(&[
                ("location", format!("{lat},{lng}")),
                ("radius", SEARCH_RADIUS_METERS.to_string()),
                ("keyword", keyword.to_string()),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await
            .context("failed to call Places API")?
            .error_for_status()
            .context("Places API returned error")?
            .json()
            .await
            .context("failed to parse Places API response")?;

        // ZERO_RESULTS is a normal empty answer, anything else non-OK is upstream trouble
        if response.status != "OK" && response.status != "ZERO_RESULTS" {
            anyhow::bail!("Places API status: {}", response.status);
        }

        Ok(response
            .results
            .into_iter()
            .map(|place| NearbyPlace {
                name: place.name,
                address: place.vicinity.unwrap_or_default(),
                lat: place.geometry.location.lat,
                lng: place.geometry.location.lng,
                rating: place.rating,
                open_now: place.opening_hours.and_then(|h| h.open_now),
            })
            .collect())
    }
}
