//! Domain model for the project core-information card grid.
//!
//! # Responsibility
//! - Define canvas, card, field, sub-grid and value shapes shared by the
//!   layout models, the controller and persistence.
//!
//! # Invariants
//! - Structure (cards, fields, placements) and values are persisted separately.
//! - Every persisted card passes `Card::validate()`.

pub mod canvas;
pub mod card;
pub mod defaults;
pub mod field;
pub mod sub_grid;
pub mod values;
