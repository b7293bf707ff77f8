//! The file browser: client state, its HTTP binding, and the rendered page.

pub mod browser;
pub mod format;
pub mod http_api;
pub mod page;
