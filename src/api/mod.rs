//! API module - HTTP routes, handlers, and models

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
