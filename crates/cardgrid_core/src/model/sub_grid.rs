//! Card-local sub-grid data: cell keys and field placements.
//!
//! Mutation rules (overlap, span bounds, orphan cleanup) live in
//! `layout::sub_grid`; this module only defines the persisted shape.
//!
//! # Invariants
//! - `CellKey` always renders as `"{row}-{column}"`, both 1-based.
//! - A placement's span is at least 1.

use crate::grid::math::span_end;
use crate::grid::GridPos;
use crate::model::field::FieldId;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static CELL_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([1-9][0-9]*)-([1-9][0-9]*)$").expect("valid cell key regex"));

/// Composite `"row-column"` key of one sub-grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellKey {
    pub row: u32,
    pub column: u32,
}

impl CellKey {
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    pub fn pos(self) -> GridPos {
        GridPos::new(self.row, self.column)
    }
}

impl From<GridPos> for CellKey {
    fn from(value: GridPos) -> Self {
        Self::new(value.row, value.column)
    }
}

impl Display for CellKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.row, self.column)
    }
}

/// Error returned when a string is not a valid cell key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidCellKey(pub String);

impl Display for InvalidCellKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid cell key `{}`; expected `row-column`", self.0)
    }
}

impl std::error::Error for InvalidCellKey {}

impl FromStr for CellKey {
    type Err = InvalidCellKey;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let captures = CELL_KEY_RE
            .captures(value)
            .ok_or_else(|| InvalidCellKey(value.to_string()))?;
        let row = captures[1]
            .parse::<u32>()
            .map_err(|_| InvalidCellKey(value.to_string()))?;
        let column = captures[2]
            .parse::<u32>()
            .map_err(|_| InvalidCellKey(value.to_string()))?;
        Ok(Self { row, column })
    }
}

impl Serialize for CellKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CellKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

/// A field assigned to a sub-grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub field_id: FieldId,
    pub column_span: u32,
}

impl Placement {
    pub fn new(field_id: FieldId) -> Self {
        Self {
            field_id,
            column_span: 1,
        }
    }
}

/// Nested grid arranging one card's fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubGrid {
    pub columns: u32,
    pub rows: u32,
    #[serde(default)]
    pub layout: BTreeMap<CellKey, Placement>,
}

impl SubGrid {
    pub fn new(columns: u32, rows: u32) -> Self {
        Self {
            columns,
            rows,
            layout: BTreeMap::new(),
        }
    }

    pub fn placement(&self, key: CellKey) -> Option<&Placement> {
        self.layout.get(&key)
    }

    /// First cell holding `field_id`, if placed.
    pub fn cell_of(&self, field_id: FieldId) -> Option<CellKey> {
        self.layout
            .iter()
            .find(|(_, placement)| placement.field_id == field_id)
            .map(|(key, _)| *key)
    }

    pub fn is_placed(&self, field_id: FieldId) -> bool {
        self.cell_of(field_id).is_some()
    }

    /// Inclusive `(first, last)` columns covered by the placement at `key`.
    pub fn occupied_columns(&self, key: CellKey) -> Option<(u32, u32)> {
        self.layout
            .get(&key)
            .map(|placement| (key.column, span_end(key.column, placement.column_span)))
    }

    /// Placements in row-major order.
    pub fn placements(&self) -> impl Iterator<Item = (CellKey, &Placement)> {
        self.layout.iter().map(|(key, placement)| (*key, placement))
    }
}

#[cfg(test)]
mod tests {
    use super::{CellKey, Placement, SubGrid};
    use uuid::Uuid;

    #[test]
    fn cell_key_formats_and_parses() {
        let key = CellKey::new(2, 13);
        assert_eq!(key.to_string(), "2-13");
        assert_eq!("2-13".parse::<CellKey>().unwrap(), key);
    }

    #[test]
    fn cell_key_rejects_malformed_values() {
        for raw in ["", "0-1", "1-0", "1_2", "a-b", "1-2-3", " 1-2", "01-2"] {
            assert!(raw.parse::<CellKey>().is_err(), "`{raw}` should be rejected");
        }
    }

    #[test]
    fn cell_keys_order_row_major() {
        let mut keys = vec![CellKey::new(2, 1), CellKey::new(1, 3), CellKey::new(1, 1)];
        keys.sort();
        assert_eq!(
            keys,
            vec![CellKey::new(1, 1), CellKey::new(1, 3), CellKey::new(2, 1)]
        );
    }

    #[test]
    fn layout_serializes_with_string_keys() {
        let field_id = Uuid::new_v4();
        let mut grid = SubGrid::new(2, 2);
        grid.layout.insert(CellKey::new(2, 1), Placement::new(field_id));

        let json = serde_json::to_value(&grid).unwrap();
        assert_eq!(json["layout"]["2-1"]["column_span"], 1);

        let decoded: SubGrid = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, grid);
        assert_eq!(decoded.cell_of(field_id), Some(CellKey::new(2, 1)));
    }

    #[test]
    fn occupied_columns_cover_span() {
        let mut grid = SubGrid::new(4, 1);
        let mut placement = Placement::new(Uuid::new_v4());
        placement.column_span = 3;
        grid.layout.insert(CellKey::new(1, 2), placement);
        assert_eq!(grid.occupied_columns(CellKey::new(1, 2)), Some((2, 4)));
        assert_eq!(grid.occupied_columns(CellKey::new(1, 1)), None);
    }
}
