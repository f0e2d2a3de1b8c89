use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::PriceUnit;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BookingStatus {
    Pending,
    Accepted,
    EnRoute,
    Arrived,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Accepted => "accepted",
            BookingStatus::EnRoute => "en-route",
            BookingStatus::Arrived => "arrived",
            BookingStatus::InProgress => "in-progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn try_parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "accepted" => Some(BookingStatus::Accepted),
            "en-route" => Some(BookingStatus::EnRoute),
            "arrived" => Some(BookingStatus::Arrived),
            "in-progress" => Some(BookingStatus::InProgress),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    /// No transition ever leaves a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Statuses a status-update request may move a booking into.
    /// `pending` only ever exists at creation.
    pub fn is_valid_target(&self) -> bool {
        !matches!(self, BookingStatus::Pending)
    }

    /// Column recording when the booking entered this status.
    pub fn timestamp_column(&self) -> Option<&'static str> {
        match self {
            BookingStatus::Pending => None,
            BookingStatus::Accepted => Some("accepted_at"),
            BookingStatus::EnRoute => Some("en_route_at"),
            BookingStatus::Arrived => Some("arrived_at"),
            BookingStatus::InProgress => Some("in_progress_at"),
            BookingStatus::Completed => Some("completed_at"),
            BookingStatus::Cancelled => Some("cancelled_at"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Situational price modifiers, recorded at creation for audit and never
/// re-evaluated afterwards.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BookingModifiers {
    pub urgent: bool,
    pub weekend: bool,
}

/// Catalog fields copied onto the booking when it is created, so later
/// catalog edits never rewrite historical bookings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSnapshot {
    pub service_id: String,
    pub service_name: String,
    pub category_id: String,
    pub category_name: String,
    pub price_unit: PriceUnit,
    pub duration_minutes: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub customer_id: String,
    pub provider_id: Option<String>,
    pub service: ServiceSnapshot,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub address: String,
    pub notes: Option<String>,
    pub status: BookingStatus,
    /// Frozen at creation by the pricing calculator, already rounded.
    pub amount: f64,
    pub modifiers: BookingModifiers,
    pub provider_location: Option<GeoPoint>,
    pub cancel_reason: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub accepted_at: Option<NaiveDateTime>,
    pub en_route_at: Option<NaiveDateTime>,
    pub arrived_at: Option<NaiveDateTime>,
    pub in_progress_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub cancelled_at: Option<NaiveDateTime>,
}

impl Booking {
    pub fn is_party(&self, user_id: &str) -> bool {
        self.customer_id == user_id || self.provider_id.as_deref() == Some(user_id)
    }
}

/// Created once when a booking completes; its consumption (the review UI)
/// lives outside this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub id: String,
    pub booking_id: String,
    pub customer_id: String,
    pub provider_id: Option<String>,
    pub service_id: String,
    pub reviewed: bool,
    pub created_at: NaiveDateTime,
}
