//! Core data models for the paste service.
//!
//! Entities map to the `pastes` table via `sqlx::FromRow`. Identifiers are
//! stored as raw bytes and rendered as URL-safe text at the edges.

pub mod identifier;
pub mod paste;
