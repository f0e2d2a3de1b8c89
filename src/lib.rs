pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod services;
pub mod state;
