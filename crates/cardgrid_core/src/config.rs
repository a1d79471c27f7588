//! Layout engine configuration.
//!
//! # Responsibility
//! - Hold dimension bounds and defaults used by canvas and sub-grid models.
//! - Validate configuration before a controller is built from it.
//!
//! # Invariants
//! - Every bound range is non-empty and starts at 1 or above.
//! - Defaults lie inside their bounds.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Hard lower bound for every grid dimension.
pub const MIN_GRID_DIMENSION: u32 = 1;
/// Default upper bound for canvas columns and rows.
pub const DEFAULT_MAX_CANVAS_DIMENSION: u32 = 100;
/// Default upper bound for sub-grid columns and rows.
pub const DEFAULT_MAX_SUB_GRID_DIMENSION: u32 = 24;

/// Tunables for one layout controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutConfig {
    /// Upper bound for canvas columns/rows.
    pub max_canvas_dimension: u32,
    /// Upper bound for sub-grid columns/rows.
    pub max_sub_grid_dimension: u32,
    /// Canvas size used when no saved layout exists.
    pub default_canvas_columns: u32,
    pub default_canvas_rows: u32,
    /// Span assigned to freshly added cards.
    pub default_card_column_span: u32,
    pub default_card_row_span: u32,
    /// When `true`, live resize clamps row span against canvas rows the same
    /// way column span is clamped against canvas columns.
    pub bound_row_span: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_canvas_dimension: DEFAULT_MAX_CANVAS_DIMENSION,
            max_sub_grid_dimension: DEFAULT_MAX_SUB_GRID_DIMENSION,
            default_canvas_columns: 12,
            default_canvas_rows: 8,
            default_card_column_span: 4,
            default_card_row_span: 3,
            bound_row_span: false,
        }
    }
}

impl LayoutConfig {
    /// Validates bounds and defaults.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_canvas_dimension < MIN_GRID_DIMENSION {
            return Err(ConfigError::InvalidBound {
                name: "max_canvas_dimension",
                value: self.max_canvas_dimension,
            });
        }
        if self.max_sub_grid_dimension < MIN_GRID_DIMENSION {
            return Err(ConfigError::InvalidBound {
                name: "max_sub_grid_dimension",
                value: self.max_sub_grid_dimension,
            });
        }

        let canvas_range = MIN_GRID_DIMENSION..=self.max_canvas_dimension;
        for (name, value) in [
            ("default_canvas_columns", self.default_canvas_columns),
            ("default_canvas_rows", self.default_canvas_rows),
            ("default_card_column_span", self.default_card_column_span),
            ("default_card_row_span", self.default_card_row_span),
        ] {
            if !canvas_range.contains(&value) {
                return Err(ConfigError::DefaultOutOfRange {
                    name,
                    value,
                    max: self.max_canvas_dimension,
                });
            }
        }
        Ok(())
    }

    /// Returns whether `(columns, rows)` is an allowed canvas size.
    pub fn canvas_dimensions_allowed(&self, columns: u32, rows: u32) -> bool {
        let range = MIN_GRID_DIMENSION..=self.max_canvas_dimension;
        range.contains(&columns) && range.contains(&rows)
    }

    /// Returns whether `(columns, rows)` is an allowed sub-grid size.
    pub fn sub_grid_dimensions_allowed(&self, columns: u32, rows: u32) -> bool {
        let range = MIN_GRID_DIMENSION..=self.max_sub_grid_dimension;
        range.contains(&columns) && range.contains(&rows)
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidBound {
        name: &'static str,
        value: u32,
    },
    DefaultOutOfRange {
        name: &'static str,
        value: u32,
        max: u32,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBound { name, value } => {
                write!(f, "config `{name}` must be >= {MIN_GRID_DIMENSION}, got {value}")
            }
            Self::DefaultOutOfRange { name, value, max } => write!(
                f,
                "config `{name}` must be within {MIN_GRID_DIMENSION}..={max}, got {value}"
            ),
        }
    }
}

impl Error for ConfigError {}
