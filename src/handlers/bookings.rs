use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::identity::require_principal;
use crate::models::{Booking, BookingModifiers, BookingStatus, GeoPoint, ServiceSnapshot};
use crate::services::booking::{self, NewBooking, Visibility};
use crate::state::AppState;

/// Booking as sent over the wire. `address` and `notes` are omitted for
/// providers browsing bookings they have not accepted.
#[derive(Serialize)]
pub struct BookingView {
    pub id: String,
    pub customer_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    pub service: ServiceSnapshot,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub amount: f64,
    pub modifiers: BookingModifiers,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_location: Option<GeoPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub en_route_at: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrived_at: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_progress_at: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<NaiveDateTime>,
}

impl BookingView {
    pub fn new(booking: Booking, visibility: Visibility) -> Self {
        let redacted = visibility == Visibility::Redacted;
        Self {
            id: booking.id,
            customer_id: booking.customer_id,
            provider_id: booking.provider_id,
            service: booking.service,
            scheduled_date: booking.scheduled_date,
            scheduled_time: booking.scheduled_time,
            address: if redacted { None } else { Some(booking.address) },
            notes: if redacted { None } else { booking.notes },
            status: booking.status,
            amount: booking.amount,
            modifiers: booking.modifiers,
            provider_location: booking.provider_location,
            cancel_reason: booking.cancel_reason,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
            accepted_at: booking.accepted_at,
            en_route_at: booking.en_route_at,
            arrived_at: booking.arrived_at,
            in_progress_at: booking.in_progress_at,
            completed_at: booking.completed_at,
            cancelled_at: booking.cancelled_at,
        }
    }
}

// POST /api/bookings
#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub service_id: String,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub address: String,
    pub notes: Option<String>,
    #[serde(default)]
    pub urgent: bool,
    #[serde(default)]
    pub weekend: bool,
    pub duration_minutes: Option<i32>,
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingView>), AppError> {
    let principal = require_principal(&headers)?;

    let booking = booking::create_booking(
        &state,
        &principal,
        NewBooking {
            service_id: body.service_id,
            scheduled_date: body.scheduled_date,
            scheduled_time: body.scheduled_time,
            address: body.address,
            notes: body.notes,
            modifiers: BookingModifiers {
                urgent: body.urgent,
                weekend: body.weekend,
            },
            duration_minutes: body.duration_minutes,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(BookingView::new(booking, Visibility::Full)),
    ))
}

// POST /api/bookings/:id/accept
pub async fn accept_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<BookingView>, AppError> {
    let principal = require_principal(&headers)?;
    let booking = booking::accept_booking(&state, &principal, &id).await?;
    Ok(Json(BookingView::new(booking, Visibility::Full)))
}

// PUT /api/bookings/:id/status
#[derive(Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
    pub location: Option<GeoPoint>,
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<StatusUpdateRequest>,
) -> Result<Json<BookingView>, AppError> {
    let principal = require_principal(&headers)?;
    let booking =
        booking::update_status(&state, &principal, &id, &body.status, body.location).await?;
    Ok(Json(BookingView::new(booking, Visibility::Full)))
}

// POST /api/bookings/:id/cancel
#[derive(Deserialize)]
pub struct CancelRequest {
    pub reason: Option<String>,
}

pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<CancelRequest>,
) -> Result<Json<BookingView>, AppError> {
    let principal = require_principal(&headers)?;
    let booking = booking::cancel_booking(&state, &principal, &id, body.reason).await?;
    Ok(Json(BookingView::new(booking, Visibility::Full)))
}

// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<BookingView>, AppError> {
    let principal = require_principal(&headers)?;
    let (booking, visibility) = booking::get_booking(&state, &principal, &id)?;
    Ok(Json(BookingView::new(booking, visibility)))
}

// GET /api/bookings
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<BookingView>>, AppError> {
    let principal = require_principal(&headers)?;
    let bookings = booking::list_bookings(&state, &principal)?;
    Ok(Json(
        bookings
            .into_iter()
            .map(|b| BookingView::new(b, Visibility::Full))
            .collect(),
    ))
}

// GET /api/bookings/open?category=
#[derive(Deserialize)]
pub struct OpenBookingsQuery {
    pub category: Option<String>,
}

pub async fn list_open_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<OpenBookingsQuery>,
) -> Result<Json<Vec<BookingView>>, AppError> {
    let principal = require_principal(&headers)?;
    let bookings = booking::list_open_bookings(&state, &principal, query.category.as_deref())?;
    Ok(Json(
        bookings
            .into_iter()
            .map(|b| BookingView::new(b, Visibility::Redacted))
            .collect(),
    ))
}
