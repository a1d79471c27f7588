//! Strict field placement inside one card's sub-grid.
//!
//! # Invariants
//! - Within a row, occupied ranges `[column, column + span - 1]` never
//!   intersect.
//! - `column + span - 1 <= columns` and `row <= rows` for every placement.
//! - Every failed operation returns before touching the grid.

use super::{LayoutResult, Rejection};
use crate::grid::math::{clamp, in_bounds, span_end};
use crate::grid::GridPos;
use crate::model::field::FieldId;
use crate::model::sub_grid::{CellKey, Placement, SubGrid};
use log::{debug, info};

/// Mutable view over one sub-grid.
pub struct FieldSubGridModel<'grid> {
    grid: &'grid mut SubGrid,
    max_dimension: u32,
}

impl<'grid> FieldSubGridModel<'grid> {
    /// `max_dimension` bounds both columns and rows in `set_dimensions`.
    pub fn new(grid: &'grid mut SubGrid, max_dimension: u32) -> Self {
        Self {
            grid,
            max_dimension,
        }
    }

    pub fn grid(&self) -> &SubGrid {
        self.grid
    }

    /// Resizes the sub-grid and unplaces fields that no longer fit.
    ///
    /// Returns the number of placements removed.
    pub fn set_dimensions(&mut self, columns: u32, rows: u32) -> LayoutResult<usize> {
        let range = 1..=self.max_dimension;
        if !range.contains(&columns) || !range.contains(&rows) {
            return Err(Rejection::InvalidDimensions { columns, rows });
        }
        self.grid.columns = columns;
        self.grid.rows = rows;
        Ok(cleanup_orphans(self.grid, columns, rows))
    }

    /// Places `field_id` with span 1 at `(row, column)`.
    ///
    /// Any other cell previously holding the field is cleared on success.
    pub fn place(&mut self, field_id: FieldId, row: u32, column: u32) -> LayoutResult<CellKey> {
        let pos = GridPos::new(row, column);
        if !in_bounds(pos, self.grid.columns, self.grid.rows) {
            return Err(Rejection::CellOutOfBounds(pos));
        }
        let key = CellKey::from(pos);
        if is_overlapping(self.grid, row, column, 1, None) {
            return Err(Rejection::Overlap(key));
        }

        self.grid
            .layout
            .retain(|_, placement| placement.field_id != field_id);
        self.grid.layout.insert(key, Placement::new(field_id));
        debug!("event=subgrid_place module=layout status=ok cell={key}");
        Ok(key)
    }

    /// Clears the placement at `key`; the field returns to the unplaced pool.
    pub fn remove(&mut self, key: CellKey) -> LayoutResult<Placement> {
        self.grid
            .layout
            .remove(&key)
            .ok_or(Rejection::PlacementNotFound(key))
    }

    /// Grows or shrinks the span at `key` by `delta` columns.
    ///
    /// Returns the resulting span.
    pub fn change_span(&mut self, key: CellKey, delta: i32) -> LayoutResult<u32> {
        let current = self
            .grid
            .placement(key)
            .map(|placement| placement.column_span)
            .ok_or(Rejection::PlacementNotFound(key))?;

        let candidate = clamp(
            i64::from(current) + i64::from(delta),
            1,
            i64::from(self.grid.columns),
        ) as u32;

        if candidate > current
            && is_overlapping(self.grid, key.row, key.column, candidate, Some(key))
        {
            return Err(Rejection::Overlap(key));
        }
        if span_end(key.column, candidate) > self.grid.columns {
            return Err(Rejection::SpanOutOfBounds {
                key,
                span: candidate,
                columns: self.grid.columns,
            });
        }

        if let Some(placement) = self.grid.layout.get_mut(&key) {
            placement.column_span = candidate;
        }
        Ok(candidate)
    }

    pub fn is_overlapping(
        &self,
        row: u32,
        start_column: u32,
        span: u32,
        exclude: Option<CellKey>,
    ) -> bool {
        is_overlapping(self.grid, row, start_column, span, exclude)
    }

    /// See [`cleanup_orphans`].
    pub fn cleanup_orphans(&mut self, columns: u32, rows: u32) -> usize {
        cleanup_orphans(self.grid, columns, rows)
    }
}

/// Returns whether `[start_column, start_column + span - 1]` at `row`
/// collides with any placement other than `exclude`.
pub fn is_overlapping(
    grid: &SubGrid,
    row: u32,
    start_column: u32,
    span: u32,
    exclude: Option<CellKey>,
) -> bool {
    let end_column = span_end(start_column, span);
    (start_column..=end_column).any(|column| {
        let direct = CellKey::new(row, column);
        if Some(direct) != exclude && grid.layout.contains_key(&direct) {
            return true;
        }
        grid.placements().any(|(key, placement)| {
            Some(key) != exclude
                && key.row == row
                && key.column <= column
                && column <= span_end(key.column, placement.column_span)
        })
    })
}

/// Removes placements that do not fit a `columns` x `rows` grid.
///
/// Orphaned fields are unplaced, never deleted. Returns how many placements
/// were removed; running it again with the same size removes nothing.
pub fn cleanup_orphans(grid: &mut SubGrid, columns: u32, rows: u32) -> usize {
    let before = grid.layout.len();
    grid.layout.retain(|key, placement| {
        key.row <= rows
            && key.column <= columns
            && span_end(key.column, placement.column_span) <= columns
    });
    let removed = before - grid.layout.len();
    if removed > 0 {
        info!(
            "event=subgrid_orphans module=layout status=ok removed={} columns={} rows={}",
            removed, columns, rows
        );
    }
    removed
}
