//! Board use-case services.
//!
//! # Responsibility
//! - Orchestrate store, edit sessions and rendering into user-level intents.
//! - Keep page collaborators decoupled from backend details.

pub mod board;
