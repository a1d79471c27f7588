//! Use-case orchestration over the layout models and the store.

pub mod layout_controller;
