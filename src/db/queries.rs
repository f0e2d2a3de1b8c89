use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{
    Booking, BookingModifiers, BookingStatus, GeoPoint, PriceUnit, ReviewRequest, ServiceSnapshot,
};

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const BOOKING_COLUMNS: &str = "id, customer_id, provider_id, service_id, service_name, \
     category_id, category_name, price_unit, duration_minutes, scheduled_date, scheduled_time, \
     address, notes, status, amount, urgent, weekend, provider_lat, provider_lng, cancel_reason, \
     created_at, updated_at, accepted_at, en_route_at, arrived_at, in_progress_at, completed_at, \
     cancelled_at";

// ── Bookings ──

pub fn create_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    let scheduled_date = booking.scheduled_date.format("%Y-%m-%d").to_string();
    let scheduled_time = booking.scheduled_time.format("%H:%M:%S").to_string();
    let created_at = booking.created_at.format(TS_FORMAT).to_string();
    let updated_at = booking.updated_at.format(TS_FORMAT).to_string();

    conn.execute(
        "INSERT INTO bookings (id, customer_id, provider_id, service_id, service_name,
             category_id, category_name, price_unit, duration_minutes, scheduled_date,
             scheduled_time, address, notes, status, amount, urgent, weekend, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
        params![
            booking.id,
            booking.customer_id,
            booking.provider_id,
            booking.service.service_id,
            booking.service.service_name,
            booking.service.category_id,
            booking.service.category_name,
            booking.service.price_unit.as_str(),
            booking.service.duration_minutes,
            scheduled_date,
            scheduled_time,
            booking.address,
            booking.notes,
            booking.status.as_str(),
            booking.amount,
            booking.modifiers.urgent as i32,
            booking.modifiers.weekend as i32,
            created_at,
            updated_at,
        ],
    )?;
    Ok(())
}

pub fn get_booking_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1");
    let result = conn.query_row(&sql, params![id], |row| Ok(parse_booking_row(row)));

    match result {
        Ok(booking) => Ok(Some(booking?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Atomic accept guard: assigns the provider only while the booking is still
/// pending and unassigned. Returns false when another provider won the race
/// or the booking is past pending.
pub fn assign_provider_if_unset(
    conn: &Connection,
    id: &str,
    provider_id: &str,
) -> anyhow::Result<bool> {
    let now = Utc::now().naive_utc().format(TS_FORMAT).to_string();
    let count = conn.execute(
        "UPDATE bookings SET provider_id = ?1, status = 'accepted', accepted_at = ?2, updated_at = ?2
         WHERE id = ?3 AND provider_id IS NULL AND status = 'pending'",
        params![provider_id, now, id],
    )?;
    Ok(count > 0)
}

/// Moves a booking to `status`, stamping the matching per-status timestamp
/// column and optionally the provider's reported location. The update is
/// refused on terminal rows. Returns false when no row changed.
pub fn record_status_transition(
    conn: &Connection,
    id: &str,
    status: &BookingStatus,
    location: Option<&GeoPoint>,
) -> anyhow::Result<bool> {
    let now = Utc::now().naive_utc().format(TS_FORMAT).to_string();

    let mut sql = String::from("UPDATE bookings SET status = ?, updated_at = ?");
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = vec![
        Box::new(status.as_str().to_string()),
        Box::new(now.clone()),
    ];

    if let Some(column) = status.timestamp_column() {
        sql.push_str(&format!(", {column} = ?"));
        values.push(Box::new(now));
    }

    if let Some(point) = location {
        sql.push_str(", provider_lat = ?, provider_lng = ?");
        values.push(Box::new(point.lat));
        values.push(Box::new(point.lng));
    }

    sql.push_str(" WHERE id = ? AND status NOT IN ('completed', 'cancelled')");
    values.push(Box::new(id.to_string()));

    let refs: Vec<&dyn rusqlite::types::ToSql> = values.iter().map(|v| v.as_ref()).collect();
    let count = conn.execute(&sql, refs.as_slice())?;
    Ok(count > 0)
}

pub fn cancel_booking(conn: &Connection, id: &str, reason: Option<&str>) -> anyhow::Result<bool> {
    let now = Utc::now().naive_utc().format(TS_FORMAT).to_string();
    let count = conn.execute(
        "UPDATE bookings SET status = 'cancelled', cancel_reason = ?1, cancelled_at = ?2, updated_at = ?2
         WHERE id = ?3 AND status NOT IN ('completed', 'cancelled')",
        params![reason, now, id],
    )?;
    Ok(count > 0)
}

pub fn get_bookings_for_customer(
    conn: &Connection,
    customer_id: &str,
) -> anyhow::Result<Vec<Booking>> {
    let sql = format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE customer_id = ?1 ORDER BY created_at DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![customer_id], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn get_bookings_for_provider(
    conn: &Connection,
    provider_id: &str,
) -> anyhow::Result<Vec<Booking>> {
    let sql = format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE provider_id = ?1 ORDER BY created_at DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![provider_id], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

/// Unassigned pending bookings, the pool providers pick work from.
pub fn get_open_bookings(
    conn: &Connection,
    category_id: Option<&str>,
) -> anyhow::Result<Vec<Booking>> {
    let (sql, params_vec): (String, Vec<Box<dyn rusqlite::types::ToSql>>) = match category_id {
        Some(category) => (
            format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings
                 WHERE status = 'pending' AND provider_id IS NULL AND category_id = ?1
                 ORDER BY created_at DESC"
            ),
            vec![Box::new(category.to_string()) as Box<dyn rusqlite::types::ToSql>],
        ),
        None => (
            format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings
                 WHERE status = 'pending' AND provider_id IS NULL
                 ORDER BY created_at DESC"
            ),
            vec![],
        ),
    };

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let id: String = row.get(0)?;
    let customer_id: String = row.get(1)?;
    let provider_id: Option<String> = row.get(2)?;
    let service_id: String = row.get(3)?;
    let service_name: String = row.get(4)?;
    let category_id: String = row.get(5)?;
    let category_name: String = row.get(6)?;
    let price_unit_str: String = row.get(7)?;
    let duration_minutes: i32 = row.get(8)?;
    let scheduled_date_str: String = row.get(9)?;
    let scheduled_time_str: String = row.get(10)?;
    let address: String = row.get(11)?;
    let notes: Option<String> = row.get(12)?;
    let status_str: String = row.get(13)?;
    let amount: f64 = row.get(14)?;
    let urgent: i32 = row.get(15)?;
    let weekend: i32 = row.get(16)?;
    let provider_lat: Option<f64> = row.get(17)?;
    let provider_lng: Option<f64> = row.get(18)?;
    let cancel_reason: Option<String> = row.get(19)?;
    let created_at_str: String = row.get(20)?;
    let updated_at_str: String = row.get(21)?;
    let accepted_at_str: Option<String> = row.get(22)?;
    let en_route_at_str: Option<String> = row.get(23)?;
    let arrived_at_str: Option<String> = row.get(24)?;
    let in_progress_at_str: Option<String> = row.get(25)?;
    let completed_at_str: Option<String> = row.get(26)?;
    let cancelled_at_str: Option<String> = row.get(27)?;

    let status = BookingStatus::try_parse(&status_str)
        .ok_or_else(|| anyhow::anyhow!("unknown booking status in row: {status_str}"))?;
    let price_unit = PriceUnit::try_parse(&price_unit_str)
        .ok_or_else(|| anyhow::anyhow!("unknown price unit in row: {price_unit_str}"))?;

    let scheduled_date = NaiveDate::parse_from_str(&scheduled_date_str, "%Y-%m-%d")
        .unwrap_or_else(|_| Utc::now().date_naive());
    let scheduled_time = NaiveTime::parse_from_str(&scheduled_time_str, "%H:%M:%S")
        .unwrap_or_else(|_| NaiveTime::MIN);

    let provider_location = match (provider_lat, provider_lng) {
        (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
        _ => None,
    };

    Ok(Booking {
        id,
        customer_id,
        provider_id,
        service: ServiceSnapshot {
            service_id,
            service_name,
            category_id,
            category_name,
            price_unit,
            duration_minutes,
        },
        scheduled_date,
        scheduled_time,
        address,
        notes,
        status,
        amount,
        modifiers: BookingModifiers {
            urgent: urgent != 0,
            weekend: weekend != 0,
        },
        provider_location,
        cancel_reason,
        created_at: parse_ts(&created_at_str),
        updated_at: parse_ts(&updated_at_str),
        accepted_at: parse_opt_ts(accepted_at_str),
        en_route_at: parse_opt_ts(en_route_at_str),
        arrived_at: parse_opt_ts(arrived_at_str),
        in_progress_at: parse_opt_ts(in_progress_at_str),
        completed_at: parse_opt_ts(completed_at_str),
        cancelled_at: parse_opt_ts(cancelled_at_str),
    })
}

fn parse_ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, TS_FORMAT).unwrap_or_else(|_| Utc::now().naive_utc())
}

fn parse_opt_ts(s: Option<String>) -> Option<NaiveDateTime> {
    s.and_then(|s| NaiveDateTime::parse_from_str(&s, TS_FORMAT).ok())
}

// ── Review Requests ──

/// Inserted when a booking completes. The UNIQUE booking_id constraint keeps
/// this a one-shot even if a completion is recorded twice.
pub fn create_review_request(conn: &Connection, request: &ReviewRequest) -> anyhow::Result<()> {
    let created_at = request.created_at.format(TS_FORMAT).to_string();
    conn.execute(
        "INSERT INTO review_requests (id, booking_id, customer_id, provider_id, service_id, reviewed, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(booking_id) DO NOTHING",
        params![
            request.id,
            request.booking_id,
            request.customer_id,
            request.provider_id,
            request.service_id,
            request.reviewed as i32,
            created_at,
        ],
    )?;
    Ok(())
}

pub fn get_review_request_for_booking(
    conn: &Connection,
    booking_id: &str,
) -> anyhow::Result<Option<ReviewRequest>> {
    let result = conn.query_row(
        "SELECT id, booking_id, customer_id, provider_id, service_id, reviewed, created_at
         FROM review_requests WHERE booking_id = ?1",
        params![booking_id],
        |row| {
            Ok(ReviewRequest {
                id: row.get(0)?,
                booking_id: row.get(1)?,
                customer_id: row.get(2)?,
                provider_id: row.get(3)?,
                service_id: row.get(4)?,
                reviewed: row.get::<_, i32>(5)? != 0,
                created_at: NaiveDateTime::parse_from_str(&row.get::<_, String>(6)?, TS_FORMAT)
                    .unwrap_or_else(|_| Utc::now().naive_utc()),
            })
        },
    );

    match result {
        Ok(request) => Ok(Some(request)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
