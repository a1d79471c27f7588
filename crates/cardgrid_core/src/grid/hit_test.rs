//! Pointer-to-cell resolution over rendered cell rectangles.
//!
//! The UI layer supplies the rectangles it actually rendered, so scroll offsets
//! and uneven gaps are already baked in. Resolution never assumes a regular
//! grid.

use super::GridPos;
use serde::{Deserialize, Serialize};

/// Screen-space point in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned rectangle in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Edges are inclusive.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// One rendered canvas cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellBox {
    pub pos: GridPos,
    pub rect: Rect,
}

impl CellBox {
    pub fn new(pos: GridPos, rect: Rect) -> Self {
        Self { pos, rect }
    }
}

/// Resolves `pointer` to the best matching cell.
///
/// Cells that physically contain the pointer win over cells that do not;
/// within each group the smallest distance to the cell centre wins. Earlier
/// boxes win exact ties.
///
/// Returns `None` for an empty box set or a non-finite pointer.
pub fn resolve_cell(pointer: Point, boxes: &[CellBox]) -> Option<GridPos> {
    if !pointer.is_finite() {
        return None;
    }

    let mut best: Option<(bool, f64, GridPos)> = None;
    for cell in boxes {
        let center = cell.rect.center();
        let dx = pointer.x - center.x;
        let dy = pointer.y - center.y;
        let distance_sq = dx * dx + dy * dy;
        if !distance_sq.is_finite() {
            continue;
        }
        let inside = cell.rect.contains(pointer);

        let better = match best {
            None => true,
            Some((best_inside, best_distance, _)) => {
                (inside && !best_inside) || (inside == best_inside && distance_sq < best_distance)
            }
        };
        if better {
            best = Some((inside, distance_sq, cell.pos));
        }
    }

    best.map(|(_, _, pos)| pos)
}

/// Builds evenly spaced cell boxes for a `columns` x `rows` grid.
///
/// Hosts that render a regular grid can use this instead of measuring every
/// cell.
pub fn uniform_cell_boxes(
    origin: Point,
    columns: u32,
    rows: u32,
    cell_width: f64,
    cell_height: f64,
    gap: f64,
) -> Vec<CellBox> {
    let mut boxes = Vec::with_capacity((columns as usize) * (rows as usize));
    for row in 1..=rows {
        for column in 1..=columns {
            let x = origin.x + f64::from(column - 1) * (cell_width + gap);
            let y = origin.y + f64::from(row - 1) * (cell_height + gap);
            boxes.push(CellBox::new(
                GridPos::new(row, column),
                Rect::new(x, y, cell_width, cell_height),
            ));
        }
    }
    boxes
}

#[cfg(test)]
mod tests {
    use super::{resolve_cell, uniform_cell_boxes, CellBox, Point, Rect};
    use crate::grid::GridPos;

    #[test]
    fn resolves_cell_containing_pointer() {
        let boxes = uniform_cell_boxes(Point::new(0.0, 0.0), 3, 2, 100.0, 50.0, 10.0);
        assert_eq!(
            resolve_cell(Point::new(150.0, 20.0), &boxes),
            Some(GridPos::new(1, 2))
        );
        assert_eq!(
            resolve_cell(Point::new(250.0, 90.0), &boxes),
            Some(GridPos::new(2, 3))
        );
    }

    #[test]
    fn pointer_in_gap_snaps_to_nearest_centre() {
        let boxes = uniform_cell_boxes(Point::new(0.0, 0.0), 2, 1, 100.0, 100.0, 20.0);
        // Gap spans x in (100, 120); 103 is closer to the first centre (50).
        assert_eq!(
            resolve_cell(Point::new(103.0, 50.0), &boxes),
            Some(GridPos::new(1, 1))
        );
        assert_eq!(
            resolve_cell(Point::new(118.0, 50.0), &boxes),
            Some(GridPos::new(1, 2))
        );
    }

    #[test]
    fn containing_cell_beats_closer_centre() {
        // A large cell containing the pointer versus a tiny neighbour whose
        // centre sits closer.
        let boxes = [
            CellBox::new(GridPos::new(1, 1), Rect::new(0.0, 0.0, 200.0, 200.0)),
            CellBox::new(GridPos::new(1, 2), Rect::new(205.0, 0.0, 10.0, 10.0)),
        ];
        assert_eq!(
            resolve_cell(Point::new(195.0, 5.0), &boxes),
            Some(GridPos::new(1, 1))
        );
    }

    #[test]
    fn scrolled_boxes_are_respected() {
        let boxes = uniform_cell_boxes(Point::new(-300.0, 40.0), 4, 1, 100.0, 100.0, 0.0);
        assert_eq!(
            resolve_cell(Point::new(50.0, 60.0), &boxes),
            Some(GridPos::new(1, 4))
        );
    }

    #[test]
    fn empty_boxes_or_invalid_pointer_yield_none() {
        assert_eq!(resolve_cell(Point::new(1.0, 1.0), &[]), None);
        let boxes = uniform_cell_boxes(Point::new(0.0, 0.0), 1, 1, 10.0, 10.0, 0.0);
        assert_eq!(resolve_cell(Point::new(f64::NAN, 1.0), &boxes), None);
    }
}
