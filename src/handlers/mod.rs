pub mod bookings;
pub mod catalog;
pub mod events;
pub mod health;
pub mod providers;
