//! Board domain model.
//!
//! # Responsibility
//! - Define the link and notice records mirrored from the active backend.
//! - Keep the wire shape compatible with every backend's stored documents.
//!
//! # Invariants
//! - An `EntityId` is unique within one snapshot of one backend.
//! - Ids are never translated between backends.

pub mod id;
pub mod link;
pub mod notice;
mod wire;
