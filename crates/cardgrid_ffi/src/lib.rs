//! Flutter bridge for the card-grid layout engine.

pub mod api;
