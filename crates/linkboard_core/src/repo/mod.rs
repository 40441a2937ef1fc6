//! Repository layer for the browser-local key-value store.
//!
//! # Responsibility
//! - Define the key-value contract the local backend persists through.
//! - Isolate SQLite details from adapter and board orchestration.

pub mod kv_repo;
pub mod schema;
