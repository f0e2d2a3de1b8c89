use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::identity::{Principal, Role};
use crate::models::{
    Booking, BookingModifiers, BookingStatus, GeoPoint, ReviewRequest, ServiceSnapshot,
};
use crate::services::notify::NotificationEvent;
use crate::services::pricing;
use crate::state::AppState;

pub struct NewBooking {
    pub service_id: String,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub address: String,
    pub notes: Option<String>,
    pub modifiers: BookingModifiers,
    pub duration_minutes: Option<i32>,
}

/// How much of a booking the caller is allowed to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Full,
    /// Address and notes hidden; granted to non-assigned providers browsing
    /// pending bookings.
    Redacted,
}

pub async fn create_booking(
    state: &Arc<AppState>,
    principal: &Principal,
    input: NewBooking,
) -> Result<Booking, AppError> {
    if principal.role != Role::Customer {
        return Err(AppError::Forbidden(
            "only customers can create bookings".into(),
        ));
    }
    if input.address.trim().is_empty() {
        return Err(AppError::Validation("address must not be empty".into()));
    }

    let raw = pricing::calculate(
        &state.catalog,
        &input.service_id,
        &input.modifiers,
        input.duration_minutes,
    )?;
    let amount = pricing::round_amount(raw);

    let service = state.catalog.service(&input.service_id).ok_or_else(|| {
        AppError::Catalog(format!("service missing from catalog: {}", input.service_id))
    })?;

    let now = Utc::now().naive_utc();
    let booking = Booking {
        id: Uuid::new_v4().to_string(),
        customer_id: principal.user_id.clone(),
        provider_id: None,
        service: ServiceSnapshot {
            service_id: service.id.clone(),
            service_name: service.name.clone(),
            category_id: service.category_id.clone(),
            category_name: service.category_name.clone(),
            price_unit: service.price_unit,
            duration_minutes: input.duration_minutes.unwrap_or(service.duration_minutes),
        },
        scheduled_date: input.scheduled_date,
        scheduled_time: input.scheduled_time,
        address: input.address,
        notes: input.notes,
        status: BookingStatus::Pending,
        amount,
        modifiers: input.modifiers,
        provider_location: None,
        cancel_reason: None,
        created_at: now,
        updated_at: now,
        accepted_at: None,
        en_route_at: None,
        arrived_at: None,
        in_progress_at: None,
        completed_at: None,
        cancelled_at: None,
    };

    {
        let db = state.db.lock().unwrap();
        queries::create_booking(&db, &booking)?;
    }

    tracing::info!(
        booking_id = %booking.id,
        service = %booking.service.service_id,
        amount = booking.amount,
        "booking created"
    );

    // Announce to the provider pool. The street address stays private until
    // a provider accepts.
    let event = NotificationEvent::BookingCreated {
        booking_id: booking.id.clone(),
        service_id: booking.service.service_id.clone(),
        service_name: booking.service.service_name.clone(),
        category_id: booking.service.category_id.clone(),
        category_name: booking.service.category_name.clone(),
        scheduled_date: booking.scheduled_date,
        scheduled_time: booking.scheduled_time,
        urgent: booking.modifiers.urgent,
    };
    if let Err(e) = state.notifier.notify_providers(event).await {
        tracing::error!(error = %e, booking_id = %booking.id, "failed to notify providers");
    }

    Ok(booking)
}

/// First provider wins: the assignment is a single conditional UPDATE, so
/// concurrent accepts resolve to one winner and one Conflict.
pub async fn accept_booking(
    state: &Arc<AppState>,
    principal: &Principal,
    booking_id: &str,
) -> Result<Booking, AppError> {
    if principal.role != Role::Provider {
        return Err(AppError::Forbidden(
            "only providers can accept bookings".into(),
        ));
    }

    let assigned = {
        let db = state.db.lock().unwrap();
        queries::assign_provider_if_unset(&db, booking_id, &principal.user_id)?
    };

    if !assigned {
        let existing = {
            let db = state.db.lock().unwrap();
            queries::get_booking_by_id(&db, booking_id)?
        };
        return match existing {
            None => Err(AppError::NotFound(format!(
                "booking not found: {booking_id}"
            ))),
            Some(_) => Err(AppError::Conflict(
                "booking already accepted by another provider".into(),
            )),
        };
    }

    let booking = fetch_booking(state, booking_id)?;

    tracing::info!(
        booking_id = %booking.id,
        provider_id = %principal.user_id,
        "booking accepted"
    );

    let event = NotificationEvent::StatusChanged {
        booking_id: booking.id.clone(),
        status: BookingStatus::Accepted,
        provider_id: Some(principal.user_id.clone()),
        location: None,
    };
    if let Err(e) = state.notifier.notify_user(&booking.customer_id, event).await {
        tracing::error!(error = %e, booking_id = %booking.id, "failed to notify customer");
    }

    Ok(booking)
}

pub async fn update_status(
    state: &Arc<AppState>,
    principal: &Principal,
    booking_id: &str,
    target_str: &str,
    location: Option<GeoPoint>,
) -> Result<Booking, AppError> {
    let target = BookingStatus::try_parse(target_str)
        .ok_or_else(|| AppError::Validation(format!("unknown status: {target_str}")))?;
    if !target.is_valid_target() {
        return Err(AppError::Validation(format!(
            "cannot transition a booking back to {target_str}"
        )));
    }

    let booking = fetch_booking(state, booking_id)?;
    if !booking.is_party(&principal.user_id) {
        return Err(AppError::Forbidden(
            "only the booking's customer or provider can update it".into(),
        ));
    }
    if target == BookingStatus::Cancelled && principal.user_id != booking.customer_id {
        return Err(AppError::Forbidden("only the customer can cancel".into()));
    }

    // Location is persisted only while heading out; it is still relayed in
    // the notification below whenever the caller supplied one.
    let stored_location = if target == BookingStatus::EnRoute {
        location.as_ref()
    } else {
        None
    };

    let changed = {
        let db = state.db.lock().unwrap();
        let changed = queries::record_status_transition(&db, booking_id, &target, stored_location)?;
        if changed && target == BookingStatus::Completed {
            let request = ReviewRequest {
                id: Uuid::new_v4().to_string(),
                booking_id: booking.id.clone(),
                customer_id: booking.customer_id.clone(),
                provider_id: booking.provider_id.clone(),
                service_id: booking.service.service_id.clone(),
                reviewed: false,
                created_at: Utc::now().naive_utc(),
            };
            queries::create_review_request(&db, &request)?;
        }
        changed
    };

    if !changed {
        return Err(AppError::Validation(
            "booking is already completed or cancelled".into(),
        ));
    }

    let updated = fetch_booking(state, booking_id)?;

    tracing::info!(
        booking_id = %updated.id,
        status = target.as_str(),
        actor = %principal.user_id,
        "booking status updated"
    );

    let event = NotificationEvent::StatusChanged {
        booking_id: updated.id.clone(),
        status: target,
        provider_id: updated.provider_id.clone(),
        location,
    };
    if let Err(e) = state
        .notifier
        .notify_user(&updated.customer_id, event.clone())
        .await
    {
        tracing::error!(error = %e, booking_id = %updated.id, "failed to notify customer");
    }
    if let Some(provider_id) = &updated.provider_id {
        if provider_id != &principal.user_id {
            if let Err(e) = state.notifier.notify_user(provider_id, event).await {
                tracing::error!(error = %e, booking_id = %updated.id, "failed to notify provider");
            }
        }
    }

    Ok(updated)
}

pub async fn cancel_booking(
    state: &Arc<AppState>,
    principal: &Principal,
    booking_id: &str,
    reason: Option<String>,
) -> Result<Booking, AppError> {
    let booking = fetch_booking(state, booking_id)?;
    if principal.user_id != booking.customer_id {
        return Err(AppError::Forbidden(
            "only the booking's customer can cancel it".into(),
        ));
    }

    let changed = {
        let db = state.db.lock().unwrap();
        queries::cancel_booking(&db, booking_id, reason.as_deref())?
    };
    if !changed {
        return Err(AppError::Validation(
            "booking is already completed or cancelled".into(),
        ));
    }

    let updated = fetch_booking(state, booking_id)?;

    tracing::info!(booking_id = %updated.id, "booking cancelled");

    if let Some(provider_id) = &updated.provider_id {
        let event = NotificationEvent::BookingCancelled {
            booking_id: updated.id.clone(),
            reason: updated.cancel_reason.clone(),
        };
        if let Err(e) = state.notifier.notify_user(provider_id, event).await {
            tracing::error!(error = %e, booking_id = %updated.id, "failed to notify provider");
        }
    }

    Ok(updated)
}

/// Fetch with access control. Parties see everything; other providers may
/// inspect a booking while it is still open, minus the private fields.
pub fn get_booking(
    state: &Arc<AppState>,
    principal: &Principal,
    booking_id: &str,
) -> Result<(Booking, Visibility), AppError> {
    let booking = fetch_booking(state, booking_id)?;

    if booking.is_party(&principal.user_id) {
        return Ok((booking, Visibility::Full));
    }
    if principal.role == Role::Provider && booking.status == BookingStatus::Pending {
        return Ok((booking, Visibility::Redacted));
    }

    Err(AppError::Forbidden(
        "not a party to this booking".into(),
    ))
}

/// The caller's own bookings, newest first.
pub fn list_bookings(
    state: &Arc<AppState>,
    principal: &Principal,
) -> Result<Vec<Booking>, AppError> {
    let db = state.db.lock().unwrap();
    let bookings = match principal.role {
        Role::Customer => queries::get_bookings_for_customer(&db, &principal.user_id)?,
        Role::Provider => queries::get_bookings_for_provider(&db, &principal.user_id)?,
    };
    Ok(bookings)
}

/// Unassigned pending bookings for providers to pick from.
pub fn list_open_bookings(
    state: &Arc<AppState>,
    principal: &Principal,
    category_id: Option<&str>,
) -> Result<Vec<Booking>, AppError> {
    if principal.role != Role::Provider {
        return Err(AppError::Forbidden(
            "only providers can browse open bookings".into(),
        ));
    }

    let db = state.db.lock().unwrap();
    Ok(queries::get_open_bookings(&db, category_id)?)
}

fn fetch_booking(state: &Arc<AppState>, booking_id: &str) -> Result<Booking, AppError> {
    let booking = {
        let db = state.db.lock().unwrap();
        queries::get_booking_by_id(&db, booking_id)?
    };
    booking.ok_or_else(|| AppError::NotFound(format!("booking not found: {booking_id}")))
}
