//! Pure grid arithmetic.
//!
//! # Invariants
//! - Callers validate inputs; these helpers never fail.
//! - `pixel_delta_to_grid_delta` rounds half up, so splitting one drag into
//!   several re-anchored steps lands on the same cell count.

use super::GridPos;

/// Converts a 0-based row-major cell index to a 1-based position.
///
/// `total_columns` of zero is treated as one column.
pub fn cell_index_to_row_col(index: u32, total_columns: u32) -> GridPos {
    let columns = total_columns.max(1);
    GridPos {
        row: index / columns + 1,
        column: index % columns + 1,
    }
}

/// Inverse of [`cell_index_to_row_col`].
pub fn row_col_to_cell_index(pos: GridPos, total_columns: u32) -> u32 {
    let columns = total_columns.max(1);
    (pos.row.saturating_sub(1)) * columns + pos.column.saturating_sub(1)
}

/// Converts a pixel delta into whole grid cells.
///
/// Returns `0` for non-positive or non-finite pitch and non-finite deltas.
pub fn pixel_delta_to_grid_delta(delta_px: f64, cell_pitch_px: f64) -> i32 {
    if !delta_px.is_finite() || !cell_pitch_px.is_finite() || cell_pitch_px <= 0.0 {
        return 0;
    }
    let cells = (delta_px / cell_pitch_px + 0.5).floor();
    cells.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

/// Clamps `value` into `[min, max]`.
///
/// When `max < min`, `min` wins.
pub fn clamp<T: Ord>(value: T, min: T, max: T) -> T {
    if value > max {
        if max < min {
            return min;
        }
        return max;
    }
    if value < min {
        return min;
    }
    value
}

/// Returns whether `pos` lies inside a `columns` x `rows` grid.
pub fn in_bounds(pos: GridPos, columns: u32, rows: u32) -> bool {
    pos.row >= 1 && pos.column >= 1 && pos.row <= rows && pos.column <= columns
}

/// Last column covered by a span starting at `column`.
///
/// Saturates at `u32::MAX`, so an oversized span always lands past any edge.
pub fn span_end(column: u32, span: u32) -> u32 {
    column.saturating_add(span.max(1) - 1)
}
