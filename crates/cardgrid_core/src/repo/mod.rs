//! Persistence contracts and their SQLite implementation.
//!
//! # Invariants
//! - Writes validate layouts before any SQL runs.
//! - Reads reject invalid persisted documents instead of masking them.

pub mod layout_store;
