//! Axum handlers for the file API, the browser page, and health probes.

pub mod file_handlers;
pub mod health_handlers;
pub mod page_handlers;
