pub mod hub;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::{BookingStatus, GeoPoint};

/// Payloads pushed to interested parties when a booking changes. Serialized
/// as `{"event": "...", ...}` on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum NotificationEvent {
    BookingCreated {
        booking_id: String,
        service_id: String,
        service_name: String,
        category_id: String,
        category_name: String,
        scheduled_date: NaiveDate,
        scheduled_time: NaiveTime,
        urgent: bool,
    },
    StatusChanged {
        booking_id: String,
        status: BookingStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        provider_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        location: Option<GeoPoint>,
    },
    BookingCancelled {
        booking_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

/// Who an event is addressed to: the shared provider pool, or one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    Providers,
    User(String),
}

#[derive(Debug, Clone)]
pub struct Envelope {
    pub audience: Audience,
    pub event: NotificationEvent,
}

/// Transport seam for booking notifications. Delivery is fire-and-forget;
/// the lifecycle commits state changes whether or not a send succeeds.
#[async_trait]
pub trait NotificationPort: Send + Sync {
    async fn notify_providers(&self, event: NotificationEvent) -> anyhow::Result<()>;
    async fn notify_user(&self, user_id: &str, event: NotificationEvent) -> anyhow::Result<()>;
}
