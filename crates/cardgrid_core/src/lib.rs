//! Card-grid layout engine.
//! Cards sit on a permissive canvas grid; each card arranges its fields in a
//! strict nested sub-grid. This crate owns those invariants.

pub mod config;
pub mod db;
pub mod grid;
pub mod layout;
pub mod logging;
pub mod model;
pub mod registry;
pub mod repo;
pub mod service;

pub use config::{ConfigError, LayoutConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use grid::hit_test::{resolve_cell, uniform_cell_boxes, CellBox, Point, Rect};
pub use grid::GridPos;
pub use layout::canvas_model::{CardCanvasModel, CellPitch};
pub use layout::overflow::{
    detect_overflow, CanvasGeometry, ContentMeasurement, OverflowWarning, OVERFLOW_TOLERANCE_PX,
};
pub use layout::sub_grid::FieldSubGridModel;
pub use layout::{LayoutResult, Rejection};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::canvas::Canvas;
pub use model::card::{Card, CardId, CardLayout, ModelValidationError};
pub use model::defaults::default_card_layout;
pub use model::field::{Field, FieldConstraint, FieldId, FieldKind, FieldUpdate};
pub use model::sub_grid::{CellKey, Placement, SubGrid};
pub use model::values::{Address, FieldValue, FieldValues, FileRef};
pub use registry::field_types::{FieldTypeRegistry, FieldTypeSpec, FieldWidgetProps, ValueShape};
pub use repo::layout_store::{LayoutStore, SqliteLayoutStore, StoreError, StoreResult};
pub use service::layout_controller::{
    Confirmation, ControllerError, ControllerResult, EditMode, LayoutController, SaveKind,
    SavePayload, SaveRequest, TransitionOutcome,
};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
