//! Data models shared by the HTTP API and the browser client.
//!
//! The gateway keeps no metadata of its own; these types only carry what the
//! object store reports and serialize naturally as JSON via `serde`.

pub mod file;
