//! Information card domain model.
//!
//! # Responsibility
//! - Define cards, their canvas anchor/span and owned fields.
//! - Validate structural invariants before persistence and after reads.
//!
//! # Invariants
//! - `id` is non-nil and stable for the card lifetime.
//! - Anchor and spans are 1-based and >= 1, and their far edge fits in `u32`.
//! - Field ids are unique within the card.
//! - Sub-grid placements reference owned fields, stay inside the sub-grid,
//!   never overlap within a row, and place each field at most once.

use crate::config::LayoutConfig;
use crate::grid::math::span_end;
use crate::model::canvas::Canvas;
use crate::model::field::{Field, FieldId};
use crate::model::sub_grid::{CellKey, SubGrid};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable card identifier.
pub type CardId = Uuid;

/// Resizable, repositionable panel holding a set of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub title: String,
    #[serde(default)]
    pub icon_ref: Option<String>,
    pub grid_column: u32,
    pub grid_row: u32,
    pub column_span: u32,
    pub row_span: u32,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub sub_grid: Option<SubGrid>,
}

impl Card {
    /// Creates a card anchored at `(1, 1)` with a generated id and no fields.
    pub fn new(title: impl Into<String>, column_span: u32, row_span: u32) -> Self {
        Self::with_id(Uuid::new_v4(), title, column_span, row_span)
    }

    pub fn with_id(id: CardId, title: impl Into<String>, column_span: u32, row_span: u32) -> Self {
        Self {
            id,
            title: title.into(),
            icon_ref: None,
            grid_column: 1,
            grid_row: 1,
            column_span: column_span.max(1),
            row_span: row_span.max(1),
            fields: Vec::new(),
            sub_grid: None,
        }
    }

    pub fn field(&self, field_id: FieldId) -> Option<&Field> {
        self.fields.iter().find(|field| field.id == field_id)
    }

    pub fn field_mut(&mut self, field_id: FieldId) -> Option<&mut Field> {
        self.fields.iter_mut().find(|field| field.id == field_id)
    }

    pub fn has_field(&self, field_id: FieldId) -> bool {
        self.field(field_id).is_some()
    }

    /// Last canvas column covered by this card.
    pub fn last_column(&self) -> u32 {
        span_end(self.grid_column, self.column_span)
    }

    /// Last canvas row covered by this card.
    pub fn last_row(&self) -> u32 {
        span_end(self.grid_row, self.row_span)
    }

    /// Returns whether any part of the card lies outside `canvas`.
    pub fn exceeds(&self, canvas: &Canvas) -> bool {
        self.last_column() > canvas.columns || self.last_row() > canvas.rows
    }

    /// Fields without a sub-grid placement, in declaration order.
    ///
    /// Without a sub-grid every field counts as unplaced.
    pub fn unplaced_fields(&self) -> Vec<&Field> {
        match &self.sub_grid {
            None => self.fields.iter().collect(),
            Some(grid) => self
                .fields
                .iter()
                .filter(|field| !grid.is_placed(field.id))
                .collect(),
        }
    }

    /// Validates structural invariants.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.id.is_nil() {
            return Err(ModelValidationError::NilCardId);
        }
        if self.grid_column == 0 || self.grid_row == 0 {
            return Err(ModelValidationError::InvalidAnchor {
                card_id: self.id,
                grid_column: self.grid_column,
                grid_row: self.grid_row,
            });
        }
        let column_end = self.grid_column.checked_add(self.column_span.saturating_sub(1));
        let row_end = self.grid_row.checked_add(self.row_span.saturating_sub(1));
        if self.column_span == 0 || self.row_span == 0 || column_end.is_none() || row_end.is_none()
        {
            return Err(ModelValidationError::InvalidSpan {
                card_id: self.id,
                column_span: self.column_span,
                row_span: self.row_span,
            });
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.id.is_nil() {
                return Err(ModelValidationError::NilFieldId { card_id: self.id });
            }
            if !seen.insert(field.id) {
                return Err(ModelValidationError::DuplicateFieldId {
                    card_id: self.id,
                    field_id: field.id,
                });
            }
        }

        if let Some(grid) = &self.sub_grid {
            validate_sub_grid(self.id, grid, &seen)?;
        }
        Ok(())
    }
}

fn validate_sub_grid(
    card_id: CardId,
    grid: &SubGrid,
    field_ids: &HashSet<FieldId>,
) -> Result<(), ModelValidationError> {
    if grid.columns == 0 || grid.rows == 0 {
        return Err(ModelValidationError::InvalidSubGridDimensions {
            card_id,
            columns: grid.columns,
            rows: grid.rows,
        });
    }

    let mut placed = HashSet::new();
    // Row -> last occupied column so far; placements iterate row-major.
    let mut row_frontier: BTreeMap<u32, (u32, CellKey)> = BTreeMap::new();
    for (key, placement) in grid.placements() {
        if placement.column_span == 0
            || key.row > grid.rows
            || span_end(key.column, placement.column_span) > grid.columns
        {
            return Err(ModelValidationError::PlacementOutOfBounds { card_id, key });
        }
        if !field_ids.contains(&placement.field_id) {
            return Err(ModelValidationError::UnknownPlacedField {
                card_id,
                field_id: placement.field_id,
            });
        }
        if !placed.insert(placement.field_id) {
            return Err(ModelValidationError::FieldPlacedTwice {
                card_id,
                field_id: placement.field_id,
            });
        }
        if let Some((frontier, previous)) = row_frontier.get(&key.row) {
            if key.column <= *frontier {
                return Err(ModelValidationError::PlacementOverlap {
                    card_id,
                    first: *previous,
                    second: key,
                });
            }
        }
        row_frontier.insert(key.row, (span_end(key.column, placement.column_span), key));
    }
    Ok(())
}

/// Canvas dimensions plus the card set; the unit of layout persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardLayout {
    pub canvas: Canvas,
    pub cards: Vec<Card>,
}

impl CardLayout {
    /// Validates canvas dimensions, every card, and card id uniqueness.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.canvas.columns == 0 || self.canvas.rows == 0 {
            return Err(ModelValidationError::InvalidCanvasDimensions {
                columns: self.canvas.columns,
                rows: self.canvas.rows,
            });
        }
        let mut seen = HashSet::new();
        for card in &self.cards {
            card.validate()?;
            if !seen.insert(card.id) {
                return Err(ModelValidationError::DuplicateCardId(card.id));
            }
        }
        Ok(())
    }

    /// Checks a structurally valid layout against configured bounds.
    ///
    /// Canvas and sub-grid sizes must be allowed by `config`. Card anchors and
    /// column spans stay within `max_canvas_dimension`, which every editing
    /// path preserves. Row spans are left alone since resizes may grow them
    /// past the canvas.
    pub fn validate_bounds(&self, config: &LayoutConfig) -> Result<(), ModelValidationError> {
        let max = config.max_canvas_dimension;
        if !config.canvas_dimensions_allowed(self.canvas.columns, self.canvas.rows) {
            return Err(ModelValidationError::CanvasOutOfRange {
                columns: self.canvas.columns,
                rows: self.canvas.rows,
                max,
            });
        }
        for card in &self.cards {
            if card.grid_column > max || card.grid_row > max || card.column_span > max {
                return Err(ModelValidationError::CardOutOfRange {
                    card_id: card.id,
                    max,
                });
            }
            if let Some(grid) = &card.sub_grid {
                if !config.sub_grid_dimensions_allowed(grid.columns, grid.rows) {
                    return Err(ModelValidationError::SubGridOutOfRange {
                        card_id: card.id,
                        columns: grid.columns,
                        rows: grid.rows,
                        max: config.max_sub_grid_dimension,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Structural validation errors for cards and layouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    NilCardId,
    DuplicateCardId(CardId),
    InvalidCanvasDimensions {
        columns: u32,
        rows: u32,
    },
    CanvasOutOfRange {
        columns: u32,
        rows: u32,
        max: u32,
    },
    InvalidAnchor {
        card_id: CardId,
        grid_column: u32,
        grid_row: u32,
    },
    CardOutOfRange {
        card_id: CardId,
        max: u32,
    },
    InvalidSpan {
        card_id: CardId,
        column_span: u32,
        row_span: u32,
    },
    NilFieldId {
        card_id: CardId,
    },
    DuplicateFieldId {
        card_id: CardId,
        field_id: FieldId,
    },
    InvalidSubGridDimensions {
        card_id: CardId,
        columns: u32,
        rows: u32,
    },
    SubGridOutOfRange {
        card_id: CardId,
        columns: u32,
        rows: u32,
        max: u32,
    },
    PlacementOutOfBounds {
        card_id: CardId,
        key: CellKey,
    },
    PlacementOverlap {
        card_id: CardId,
        first: CellKey,
        second: CellKey,
    },
    UnknownPlacedField {
        card_id: CardId,
        field_id: FieldId,
    },
    FieldPlacedTwice {
        card_id: CardId,
        field_id: FieldId,
    },
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilCardId => write!(f, "card id must not be nil"),
            Self::DuplicateCardId(id) => write!(f, "duplicate card id: {id}"),
            Self::InvalidCanvasDimensions { columns, rows } => {
                write!(f, "canvas dimensions must be >= 1, got {columns}x{rows}")
            }
            Self::CanvasOutOfRange { columns, rows, max } => {
                write!(f, "canvas dimensions must be <= {max}, got {columns}x{rows}")
            }
            Self::CardOutOfRange { card_id, max } => write!(
                f,
                "card {card_id} anchor or column span exceeds the canvas limit of {max}"
            ),
            Self::InvalidAnchor {
                card_id,
                grid_column,
                grid_row,
            } => write!(
                f,
                "card {card_id} anchor must be 1-based, got column {grid_column} row {grid_row}"
            ),
            Self::InvalidSpan {
                card_id,
                column_span,
                row_span,
            } => write!(
                f,
                "card {card_id} span must be >= 1 and fit the grid, got {column_span}x{row_span}"
            ),
            Self::NilFieldId { card_id } => write!(f, "card {card_id} has a nil field id"),
            Self::DuplicateFieldId { card_id, field_id } => {
                write!(f, "card {card_id} has duplicate field id {field_id}")
            }
            Self::InvalidSubGridDimensions {
                card_id,
                columns,
                rows,
            } => write!(
                f,
                "card {card_id} sub-grid dimensions must be >= 1, got {columns}x{rows}"
            ),
            Self::SubGridOutOfRange {
                card_id,
                columns,
                rows,
                max,
            } => write!(
                f,
                "card {card_id} sub-grid dimensions must be <= {max}, got {columns}x{rows}"
            ),
            Self::PlacementOutOfBounds { card_id, key } => {
                write!(f, "card {card_id} placement at {key} exceeds its sub-grid")
            }
            Self::PlacementOverlap {
                card_id,
                first,
                second,
            } => write!(
                f,
                "card {card_id} placements at {first} and {second} overlap"
            ),
            Self::UnknownPlacedField { card_id, field_id } => write!(
                f,
                "card {card_id} places field {field_id} it does not own"
            ),
            Self::FieldPlacedTwice { card_id, field_id } => {
                write!(f, "card {card_id} places field {field_id} more than once")
            }
        }
    }
}

impl Error for ModelValidationError {}
