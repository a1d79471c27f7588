//! Page-level canvas grid.

use serde::{Deserialize, Serialize};

/// Outer grid on which cards are positioned.
///
/// Upper bounds are enforced by the canvas model against `LayoutConfig`.
/// `CardLayout::validate` only rejects zero dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canvas {
    pub columns: u32,
    pub rows: u32,
}

impl Canvas {
    pub fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Largest column span a card anchored at `grid_column` may take without
    /// crossing the right edge. Never below 1.
    pub fn max_column_span(&self, grid_column: u32) -> u32 {
        self.columns.saturating_add(1).saturating_sub(grid_column).max(1)
    }

    /// Row counterpart of [`Canvas::max_column_span`].
    pub fn max_row_span(&self, grid_row: u32) -> u32 {
        self.rows.saturating_add(1).saturating_sub(grid_row).max(1)
    }
}
