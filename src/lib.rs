//! Location services facade over the Google Maps HTTP API.

pub mod config;
pub mod location;
pub mod server;
