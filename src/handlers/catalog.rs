use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{BookingModifiers, Category, ServiceDefinition};
use crate::services::catalog::SearchHit;
use crate::services::pricing;
use crate::state::AppState;

// GET /api/services
pub async fn list_services(State(state): State<Arc<AppState>>) -> Json<Vec<ServiceDefinition>> {
    Json(state.catalog.services().to_vec())
}

// GET /api/services/search?q=
#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

pub async fn search_services(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<SearchHit>>, AppError> {
    let q = query.q.as_deref().unwrap_or("").trim().to_string();
    if q.chars().count() < 2 {
        return Err(AppError::Validation(
            "search query must be at least 2 characters".into(),
        ));
    }

    Ok(Json(state.catalog.search(&q)))
}

// GET /api/services/:id
pub async fn get_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ServiceDefinition>, AppError> {
    state
        .catalog
        .service(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("service not found: {id}")))
}

// GET /api/categories/:id
pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Category>, AppError> {
    state
        .catalog
        .category(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("category not found: {id}")))
}

// POST /api/calculate-price
#[derive(Deserialize)]
pub struct PriceRequest {
    pub service_id: String,
    #[serde(default)]
    pub urgent: bool,
    #[serde(default)]
    pub weekend: bool,
    pub duration_minutes: Option<i32>,
}

#[derive(Serialize)]
pub struct PriceResponse {
    pub service_id: String,
    pub amount: f64,
}

pub async fn calculate_price(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PriceRequest>,
) -> Result<Json<PriceResponse>, AppError> {
    let modifiers = BookingModifiers {
        urgent: body.urgent,
        weekend: body.weekend,
    };
    let raw = pricing::calculate(
        &state.catalog,
        &body.service_id,
        &modifiers,
        body.duration_minutes,
    )?;

    Ok(Json(PriceResponse {
        service_id: body.service_id,
        amount: pricing::round_amount(raw),
    }))
}
