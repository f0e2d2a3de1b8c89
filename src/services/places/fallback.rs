use async_trait::async_trait;

use super::{NearbyPlace, PlacesProvider};

// name, street, lat/lng offsets from the query point, rating
const SAMPLE_BUSINESSES: &[(&str, &str, f64, f64, f64)] = &[
    ("Local Experts", "12 Market Street", 0.004, -0.003, 4.6),
    ("QuickFix Services", "48 Station Road", -0.006, 0.005, 4.3),
    ("HomeCare Solutions", "7 Rosewood Lane", 0.009, 0.007, 4.1),
    ("Metro Maintenance Co", "230 Ring Road", -0.011, -0.009, 3.9),
    ("Neighbourhood Help", "3 Temple Cross", 0.014, 0.012, 4.8),
];

/// Offline stand-in used when no Places API key is configured. Returns the
/// same sample businesses at fixed offsets around the query point.
pub struct FallbackPlaces;

#[async_trait]
impl PlacesProvider for FallbackPlaces {
    async fn search(&self, lat: f64, lng: f64, keyword: &str) -> anyhow::Result<Vec<NearbyPlace>> {
        Ok(SAMPLE_BUSINESSES
            .iter()
            .map(|(name, street, d_lat, d_lng, rating)| NearbyPlace {
                name: format!("{name} {keyword}"),
                address: (*street).to_string(),
                lat: lat + d_lat,
                lng: lng + d_lng,
                rating: Some(*rating),
                open_now: Some(true),
            })
            .collect())
    }
}
