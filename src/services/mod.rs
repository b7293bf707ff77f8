//! Storage gateway: the backend seam and the service built on top of it.

#[cfg(test)]
pub mod memory_backend;
pub mod object_backend;
pub mod storage_service;
