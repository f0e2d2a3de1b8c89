use crate::errors::AppError;
use crate::models::{BookingModifiers, PriceUnit};
use crate::services::catalog::ServiceCatalog;

pub const URGENT_MULTIPLIER: f64 = 1.5;
pub const WEEKEND_MULTIPLIER: f64 = 1.2;

/// Price a service with situational modifiers. Multipliers compound in a
/// fixed order (urgent, then weekend) and hourly services scale by the
/// effective duration afterwards. Returns the unrounded amount; callers
/// round once when the value is persisted or quoted.
pub fn calculate(
    catalog: &ServiceCatalog,
    service_id: &str,
    modifiers: &BookingModifiers,
    duration_minutes: Option<i32>,
) -> Result<f64, AppError> {
    let service = catalog
        .service(service_id)
        .ok_or_else(|| AppError::NotFound(format!("service not found: {service_id}")))?;

    if let Some(minutes) = duration_minutes {
        if minutes <= 0 {
            return Err(AppError::Validation(
                "duration_minutes must be positive".into(),
            ));
        }
    }

    let mut price = service.base_price;
    if modifiers.urgent {
        price *= URGENT_MULTIPLIER;
    }
    if modifiers.weekend {
        price *= WEEKEND_MULTIPLIER;
    }

    if service.price_unit == PriceUnit::PerHour {
        let minutes = duration_minutes.unwrap_or(service.duration_minutes);
        price *= f64::from(minutes) / 60.0;
    }

    Ok(price)
}

/// Rounding applied when an amount is frozen onto a booking or shown in a
/// quote: nearest whole currency unit.
pub fn round_amount(price: f64) -> f64 {
    price.round()
}
