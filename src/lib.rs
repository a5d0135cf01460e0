//! Anonymous text snippet sharing: a SQLite-backed paste store with expiry,
//! owner correlation and a paginated public feed, served over axum.

pub mod clock;
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
