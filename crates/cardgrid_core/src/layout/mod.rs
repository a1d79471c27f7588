//! Card canvas and field sub-grid placement models.
//!
//! # Responsibility
//! - Apply drag, resize and structural edits to cards on the canvas.
//! - Place fields inside a card's sub-grid with strict collision rules.
//! - Flag cards whose rendered content overflows its cell box.
//!
//! # Invariants
//! - Canvas placement is permissive: cards may overlap each other.
//! - Sub-grid placement is strict: overlapping or out-of-bounds placements are
//!   rejected before any mutation.
//! - Rejected operations leave the model untouched.

pub mod canvas_model;
pub mod overflow;
pub mod sub_grid;

use crate::grid::GridPos;
use crate::model::card::CardId;
use crate::model::field::{FieldId, FieldKind};
use crate::model::sub_grid::CellKey;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Reason an operation was refused without mutating state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Structural edits require layout-edit mode.
    NotInLayoutEdit,
    /// Value edits require info-edit mode.
    NotInInfoEdit,
    /// A save is pending; mutations wait for it to finish.
    SaveInFlight,
    /// The user declined the confirmation prompt.
    Declined,
    /// Reload needs every edit mode closed.
    EditInProgress,
    /// `finish_save` got a request that is not the one in flight.
    UnknownSaveRequest,
    CardNotFound(CardId),
    FieldNotFound {
        card_id: CardId,
        field_id: FieldId,
    },
    /// The card has no sub-grid configured.
    NoSubGrid(CardId),
    PlacementNotFound(CellKey),
    CellOutOfBounds(GridPos),
    /// Target cell is occupied or covered by another placement's span.
    Overlap(CellKey),
    /// Span would cross the sub-grid's right edge.
    SpanOutOfBounds {
        key: CellKey,
        span: u32,
        columns: u32,
    },
    InvalidDimensions {
        columns: u32,
        rows: u32,
    },
    InvalidTitle,
    NoActiveDrag,
    NoActiveResize,
    /// Another pointer interaction (drag or resize) is already running.
    InteractionInProgress,
    /// The pointer resolved to no canvas cell; the drag was aborted.
    NoTargetCell,
    ReadonlyField(FieldId),
    ValueShapeMismatch {
        field_id: FieldId,
        kind: FieldKind,
    },
}

impl Display for Rejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotInLayoutEdit => write!(f, "layout is locked; enter layout edit first"),
            Self::NotInInfoEdit => write!(f, "information is locked; enter info edit first"),
            Self::SaveInFlight => write!(f, "a save is already in progress"),
            Self::Declined => write!(f, "operation cancelled by user"),
            Self::EditInProgress => write!(f, "finish or cancel the current edit first"),
            Self::UnknownSaveRequest => write!(f, "save request is not the one in progress"),
            Self::CardNotFound(id) => write!(f, "card not found: {id}"),
            Self::FieldNotFound { card_id, field_id } => {
                write!(f, "field {field_id} not found in card {card_id}")
            }
            Self::NoSubGrid(id) => write!(f, "card {id} has no field grid"),
            Self::PlacementNotFound(key) => write!(f, "no field placed at {key}"),
            Self::CellOutOfBounds(pos) => write!(f, "cell {pos} is outside the grid"),
            Self::Overlap(key) => write!(f, "cell {key} overlaps an existing field"),
            Self::SpanOutOfBounds { key, span, columns } => write!(
                f,
                "span {span} at {key} exceeds the grid width of {columns} columns"
            ),
            Self::InvalidDimensions { columns, rows } => {
                write!(f, "grid dimensions {columns}x{rows} are out of range")
            }
            Self::InvalidTitle => write!(f, "title must not be blank"),
            Self::NoActiveDrag => write!(f, "no card is being dragged"),
            Self::NoActiveResize => write!(f, "no card is being resized"),
            Self::InteractionInProgress => write!(f, "another drag or resize is in progress"),
            Self::NoTargetCell => write!(f, "pointer is not over a canvas cell"),
            Self::ReadonlyField(id) => write!(f, "field {id} is read-only"),
            Self::ValueShapeMismatch { field_id, kind } => write!(
                f,
                "value does not fit field {field_id} of type {}",
                kind.as_str()
            ),
        }
    }
}

impl Error for Rejection {}

pub type LayoutResult<T> = Result<T, Rejection>;
