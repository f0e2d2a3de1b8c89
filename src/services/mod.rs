pub mod booking;
pub mod catalog;
pub mod notify;
pub mod places;
pub mod pricing;
