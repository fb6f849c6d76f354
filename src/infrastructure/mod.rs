pub mod booking_gateway;
pub mod config;
pub mod error;
pub mod event_log;
