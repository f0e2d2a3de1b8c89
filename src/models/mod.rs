pub mod booking;
pub mod service;

pub use booking::{
    Booking, BookingModifiers, BookingStatus, GeoPoint, ReviewRequest, ServiceSnapshot,
};
pub use service::{Category, PriceUnit, ServiceDefinition};
