//! Grid coordinate primitives shared by canvas and sub-grid placement.
//!
//! # Responsibility
//! - Convert between cell indices, `(row, column)` positions and pixel deltas.
//! - Resolve pointer positions to cells from caller-supplied cell boxes.
//!
//! # Invariants
//! - All grid positions are 1-based.
//! - Nothing in this module holds state or performs I/O.

pub mod hit_test;
pub mod math;

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One-based grid position, addressed as `(row, column)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub row: u32,
    pub column: u32,
}

impl GridPos {
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

impl Display for GridPos {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}
