use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::services::places::{haversine_km, NearbyPlace};
use crate::state::AppState;

const MAX_RESULTS: usize = 10;

// GET /api/providers/search?lat=&lng=&service=
#[derive(Deserialize)]
pub struct ProviderSearchQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub service: Option<String>,
}

#[derive(Serialize)]
pub struct ProviderSearchResult {
    #[serde(flatten)]
    pub place: NearbyPlace,
    pub distance_km: f64,
}

pub async fn search_providers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProviderSearchQuery>,
) -> Result<Json<Vec<ProviderSearchResult>>, AppError> {
    let lat: f64 = query
        .lat
        .as_deref()
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| AppError::Validation("lat is required".into()))?;
    let lng: f64 = query
        .lng
        .as_deref()
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| AppError::Validation("lng is required".into()))?;
    let keyword = query.service.as_deref().unwrap_or("home services");

    let places = state
        .places
        .search(lat, lng, keyword)
        .await
        .map_err(|e| AppError::Places(e.to_string()))?;

    let mut results: Vec<ProviderSearchResult> = places
        .into_iter()
        .map(|place| {
            let distance = haversine_km(lat, lng, place.lat, place.lng);
            ProviderSearchResult {
                place,
                distance_km: (distance * 100.0).round() / 100.0,
            }
        })
        .collect();

    results.sort_by(|a, b| {
        a.distance_km
            .partial_cmp(&b.distance_km)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results.truncate(MAX_RESULTS);

    Ok(Json(results))
}
