//! Edit-mode state machine and the public surface of the layout engine.
//!
//! # Responsibility
//! - Gate structural edits behind layout-edit mode and value edits behind
//!   info-edit mode.
//! - Route pointer and structural actions to the canvas and sub-grid models.
//! - Persist layouts on "lock layout" and values on "save info", one save at
//!   a time.
//!
//! # Invariants
//! - Exactly one `EditMode` is active; layout and info editing never coexist.
//! - While a save is in flight every mutation and a second save are rejected.
//! - A failed save leaves the mode and in-memory state untouched.
//! - `saved_values` always mirrors the last loaded or saved value document.

use crate::config::{ConfigError, LayoutConfig};
use crate::grid::hit_test::{CellBox, Point};
use crate::grid::GridPos;
use crate::layout::canvas_model::{CardCanvasModel, CellPitch};
use crate::layout::overflow::{self, CanvasGeometry, ContentMeasurement, OverflowWarning};
use crate::layout::{LayoutResult, Rejection};
use crate::model::card::{Card, CardId, CardLayout};
use crate::model::defaults::default_card_layout;
use crate::model::field::{Field, FieldId, FieldKind, FieldUpdate};
use crate::model::sub_grid::{CellKey, SubGrid};
use crate::model::values::{FieldValue, FieldValues};
use crate::registry::field_types::{FieldTypeRegistry, FieldWidgetProps};
use crate::repo::layout_store::{normalize_project_key, LayoutStore, StoreError, StoreResult};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ControllerResult<T> = Result<T, ControllerError>;

#[derive(Debug)]
pub enum ControllerError {
    Rejected(Rejection),
    Persistence(StoreError),
    Config(ConfigError),
}

impl Display for ControllerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(err) => write!(f, "{err}"),
            Self::Persistence(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ControllerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Rejected(err) => Some(err),
            Self::Persistence(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

impl From<Rejection> for ControllerError {
    fn from(value: Rejection) -> Self {
        Self::Rejected(value)
    }
}

impl From<StoreError> for ControllerError {
    fn from(value: StoreError) -> Self {
        Self::Persistence(value)
    }
}

impl From<ConfigError> for ControllerError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

/// Which kind of editing, if any, is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Locked,
    LayoutEditing,
    InfoEditing,
}

impl EditMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Locked => "locked",
            Self::LayoutEditing => "layout_editing",
            Self::InfoEditing => "info_editing",
        }
    }
}

/// Result of asking to enter an edit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Entered,
    AlreadyActive,
    /// The other edit mode is open and must be closed first.
    Blocked { active: EditMode },
}

/// Answer to a yes/no confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Layout,
    Values,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SavePayload {
    Layout(CardLayout),
    Values(FieldValues),
}

/// Pending save handed to whoever performs the write.
///
/// Pass it back to [`LayoutController::finish_save`] with the write outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub id: u64,
    pub kind: SaveKind,
    pub project_key: String,
    pub payload: SavePayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InFlight {
    id: u64,
    kind: SaveKind,
}

/// Owned layout session for one project.
pub struct LayoutController<S: LayoutStore> {
    store: S,
    project_key: String,
    config: LayoutConfig,
    registry: FieldTypeRegistry,
    canvas: CardCanvasModel,
    values: FieldValues,
    saved_values: FieldValues,
    mode: EditMode,
    in_flight: Option<InFlight>,
    next_save_id: u64,
}

impl<S: LayoutStore> LayoutController<S> {
    /// Loads the project's layout and values.
    ///
    /// A project without a saved layout gets the default card set; missing
    /// values start empty. Stored values whose card or field no longer exists
    /// are dropped.
    pub fn open(project_key: &str, store: S, config: LayoutConfig) -> ControllerResult<Self> {
        config.validate()?;
        let project_key = normalize_project_key(project_key)?;
        let (layout, values) = load_state(&store, &project_key, &config)?;
        info!(
            "event=layout_open module=service status=ok cards={} values={}",
            layout.cards.len(),
            values.len()
        );
        Ok(Self {
            store,
            project_key,
            canvas: CardCanvasModel::new(layout, config.clone()),
            config,
            registry: FieldTypeRegistry::builtin(),
            saved_values: values.clone(),
            values,
            mode: EditMode::Locked,
            in_flight: None,
            next_save_id: 1,
        })
    }

    /// Re-reads layout and values from the store. Only allowed while locked.
    pub fn reload(&mut self) -> ControllerResult<()> {
        if self.in_flight.is_some() {
            return Err(Rejection::SaveInFlight.into());
        }
        if self.mode != EditMode::Locked {
            return Err(Rejection::EditInProgress.into());
        }
        let (layout, values) = load_state(&self.store, &self.project_key, &self.config)?;
        self.canvas.replace_layout(layout);
        self.saved_values = values.clone();
        self.values = values;
        Ok(())
    }

    pub fn project_key(&self) -> &str {
        &self.project_key
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn registry(&self) -> &FieldTypeRegistry {
        &self.registry
    }

    /// Kind of the save currently in flight, if any.
    pub fn saving(&self) -> Option<SaveKind> {
        self.in_flight.map(|in_flight| in_flight.kind)
    }

    pub fn canvas_model(&self) -> &CardCanvasModel {
        &self.canvas
    }

    pub fn cards(&self) -> &[Card] {
        self.canvas.cards()
    }

    pub fn layout(&self) -> CardLayout {
        self.canvas.to_layout()
    }

    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    // ---- mode transitions -------------------------------------------------

    pub fn enter_layout_edit(&mut self) -> TransitionOutcome {
        self.enter(EditMode::LayoutEditing)
    }

    pub fn enter_info_edit(&mut self) -> TransitionOutcome {
        self.enter(EditMode::InfoEditing)
    }

    fn enter(&mut self, target: EditMode) -> TransitionOutcome {
        let outcome = match self.mode {
            EditMode::Locked => {
                self.mode = target;
                TransitionOutcome::Entered
            }
            active if active == target => TransitionOutcome::AlreadyActive,
            active => TransitionOutcome::Blocked { active },
        };
        if let TransitionOutcome::Blocked { active } = outcome {
            warn!(
                "event=mode_enter module=service status=rejected target={} active={}",
                target.as_str(),
                active.as_str()
            );
        }
        outcome
    }

    /// Saves the layout and returns to locked mode once confirmed.
    ///
    /// On store failure the controller stays in layout-edit mode.
    pub fn lock_layout(&mut self, confirmation: Confirmation) -> ControllerResult<()> {
        let request = self.begin_save(SaveKind::Layout, confirmation)?;
        let outcome = persist(&mut self.store, &request);
        self.finish_save(request, outcome)
    }

    /// Saves field values and returns to locked mode.
    ///
    /// On store failure the edited values are kept and info-edit stays open.
    pub fn save_info(&mut self) -> ControllerResult<()> {
        let request = self.begin_save(SaveKind::Values, Confirmation::Confirmed)?;
        let outcome = persist(&mut self.store, &request);
        self.finish_save(request, outcome)
    }

    /// Discards unsaved value edits and returns to locked mode.
    pub fn cancel_info_edit(&mut self) -> LayoutResult<()> {
        if self.in_flight.is_some() {
            return Err(Rejection::SaveInFlight);
        }
        if self.mode != EditMode::InfoEditing {
            return Err(Rejection::NotInInfoEdit);
        }
        self.values = self.saved_values.clone();
        self.mode = EditMode::Locked;
        info!("event=info_cancel module=service status=ok");
        Ok(())
    }

    /// First half of a save for hosts that perform the write themselves.
    pub fn begin_save(
        &mut self,
        kind: SaveKind,
        confirmation: Confirmation,
    ) -> LayoutResult<SaveRequest> {
        if self.in_flight.is_some() {
            return Err(Rejection::SaveInFlight);
        }
        let payload = match kind {
            SaveKind::Layout => {
                if self.mode != EditMode::LayoutEditing {
                    return Err(Rejection::NotInLayoutEdit);
                }
                if confirmation == Confirmation::Declined {
                    return Err(Rejection::Declined);
                }
                self.canvas.clear_interactions();
                SavePayload::Layout(self.canvas.to_layout())
            }
            SaveKind::Values => {
                if self.mode != EditMode::InfoEditing {
                    return Err(Rejection::NotInInfoEdit);
                }
                if confirmation == Confirmation::Declined {
                    return Err(Rejection::Declined);
                }
                SavePayload::Values(self.values.clone())
            }
        };
        let id = self.next_save_id;
        self.next_save_id += 1;
        self.in_flight = Some(InFlight { id, kind });
        Ok(SaveRequest {
            id,
            kind,
            project_key: self.project_key.clone(),
            payload,
        })
    }

    /// Second half of a save: applies the write outcome.
    pub fn finish_save(
        &mut self,
        request: SaveRequest,
        outcome: StoreResult<()>,
    ) -> ControllerResult<()> {
        match self.in_flight {
            Some(in_flight) if in_flight.id == request.id => {}
            _ => return Err(Rejection::UnknownSaveRequest.into()),
        }
        self.in_flight = None;

        let event = match request.kind {
            SaveKind::Layout => "layout_lock",
            SaveKind::Values => "info_save",
        };
        if let Err(err) = outcome {
            error!("event={event} module=service status=error error={err}");
            return Err(err.into());
        }

        match request.payload {
            SavePayload::Layout(layout) => {
                info!(
                    "event={event} module=service status=ok cards={}",
                    layout.cards.len()
                );
            }
            SavePayload::Values(values) => {
                info!(
                    "event={event} module=service status=ok values={}",
                    values.len()
                );
                self.saved_values = values;
            }
        }
        self.mode = EditMode::Locked;
        Ok(())
    }

    // ---- canvas -----------------------------------------------------------

    pub fn begin_drag(&mut self, card_id: CardId) -> LayoutResult<()> {
        self.guard_layout()?;
        self.canvas.begin_drag(card_id)
    }

    pub fn update_drag_target(
        &mut self,
        pointer: Point,
        cells: &[CellBox],
    ) -> LayoutResult<Option<GridPos>> {
        self.guard_layout()?;
        self.canvas.update_drag_target(pointer, cells)
    }

    pub fn commit_drag(&mut self, target: GridPos) -> LayoutResult<CardId> {
        self.guard_layout()?;
        self.canvas.commit_drag(target)
    }

    pub fn drop_dragged(&mut self) -> LayoutResult<CardId> {
        self.guard_layout()?;
        self.canvas.drop_dragged()
    }

    pub fn cancel_drag(&mut self) {
        self.canvas.cancel_drag();
    }

    pub fn begin_resize(
        &mut self,
        card_id: CardId,
        pointer: Point,
        pitch: CellPitch,
    ) -> LayoutResult<()> {
        self.guard_layout()?;
        self.canvas.begin_resize(card_id, pointer, pitch)
    }

    pub fn update_resize(&mut self, pointer: Point) -> LayoutResult<(u32, u32)> {
        self.guard_layout()?;
        self.canvas.update_resize(pointer)
    }

    pub fn end_resize(&mut self) -> LayoutResult<CardId> {
        self.guard_layout()?;
        self.canvas.end_resize()
    }

    pub fn add_card(&mut self, title: &str) -> LayoutResult<CardId> {
        self.guard_layout()?;
        self.canvas.add_card(title)
    }

    /// Deletes a card after confirmation, along with its field values.
    pub fn remove_card(
        &mut self,
        card_id: CardId,
        confirmation: Confirmation,
    ) -> LayoutResult<Card> {
        self.guard_layout()?;
        if confirmation == Confirmation::Declined {
            return Err(Rejection::Declined);
        }
        let card = self.canvas.remove_card(card_id)?;
        let dropped = self.values.remove_card(card_id);
        self.saved_values.remove_card(card_id);
        info!("event=card_values_drop module=service status=ok values={dropped}");
        Ok(card)
    }

    pub fn rename_card(&mut self, card_id: CardId, title: &str) -> LayoutResult<()> {
        self.guard_layout()?;
        self.canvas.rename_card(card_id, title)
    }

    pub fn set_card_icon(&mut self, card_id: CardId, icon_ref: Option<&str>) -> LayoutResult<()> {
        self.guard_layout()?;
        self.canvas.set_card_icon(card_id, icon_ref)
    }

    pub fn resize_canvas(&mut self, columns: u32, rows: u32) -> LayoutResult<()> {
        self.guard_layout()?;
        self.canvas.resize_canvas(columns, rows)
    }

    // ---- field structure --------------------------------------------------

    pub fn add_field(
        &mut self,
        card_id: CardId,
        kind: FieldKind,
        label: &str,
    ) -> LayoutResult<FieldId> {
        self.guard_layout()?;
        self.canvas.add_field(card_id, kind, label)
    }

    /// Deletes a field definition, its placement and its values.
    pub fn remove_field(&mut self, card_id: CardId, field_id: FieldId) -> LayoutResult<Field> {
        self.guard_layout()?;
        let field = self.canvas.remove_field(card_id, field_id)?;
        self.values.remove_field(card_id, field_id);
        self.saved_values.remove_field(card_id, field_id);
        Ok(field)
    }

    pub fn update_field(
        &mut self,
        card_id: CardId,
        field_id: FieldId,
        update: FieldUpdate,
    ) -> LayoutResult<()> {
        self.guard_layout()?;
        self.canvas.update_field(card_id, field_id, update)
    }

    // ---- sub-grid ---------------------------------------------------------

    pub fn configure_sub_grid(
        &mut self,
        card_id: CardId,
        columns: u32,
        rows: u32,
    ) -> LayoutResult<usize> {
        self.guard_layout()?;
        self.canvas.configure_sub_grid(card_id, columns, rows)
    }

    pub fn clear_sub_grid(&mut self, card_id: CardId) -> LayoutResult<Option<SubGrid>> {
        self.guard_layout()?;
        self.canvas.clear_sub_grid(card_id)
    }

    pub fn place_field(
        &mut self,
        card_id: CardId,
        field_id: FieldId,
        row: u32,
        column: u32,
    ) -> LayoutResult<CellKey> {
        self.guard_layout()?;
        self.canvas.place_field(card_id, field_id, row, column)
    }

    pub fn unplace_field(&mut self, card_id: CardId, key: CellKey) -> LayoutResult<FieldId> {
        self.guard_layout()?;
        self.canvas.unplace_field(card_id, key)
    }

    pub fn change_field_span(
        &mut self,
        card_id: CardId,
        key: CellKey,
        delta: i32,
    ) -> LayoutResult<u32> {
        self.guard_layout()?;
        self.canvas.change_field_span(card_id, key, delta)
    }

    /// Fields of a card that have no sub-grid placement.
    pub fn unplaced_fields(&self, card_id: CardId) -> LayoutResult<Vec<&Field>> {
        self.canvas
            .card(card_id)
            .map(Card::unplaced_fields)
            .ok_or(Rejection::CardNotFound(card_id))
    }

    // ---- values -----------------------------------------------------------

    pub fn field_value(&self, card_id: CardId, field_id: FieldId) -> Option<&FieldValue> {
        self.values.get(card_id, field_id)
    }

    /// Stores an edited value. `FieldValue::Empty` clears it.
    pub fn set_field_value(
        &mut self,
        card_id: CardId,
        field_id: FieldId,
        value: FieldValue,
    ) -> LayoutResult<()> {
        if self.in_flight.is_some() {
            return Err(Rejection::SaveInFlight);
        }
        if self.mode != EditMode::InfoEditing {
            return Err(Rejection::NotInInfoEdit);
        }
        let field = self.field(card_id, field_id)?;
        if field.readonly {
            return Err(Rejection::ReadonlyField(field_id));
        }
        if !self.registry.accepts(field, &value) {
            return Err(Rejection::ValueShapeMismatch {
                field_id,
                kind: field.kind,
            });
        }
        self.values.set(card_id, field_id, value);
        Ok(())
    }

    /// Props for the widget rendering one field.
    ///
    /// Widgets are disabled unless info-edit is open and no save is pending.
    pub fn widget_props(
        &self,
        card_id: CardId,
        field_id: FieldId,
    ) -> LayoutResult<FieldWidgetProps> {
        let field = self.field(card_id, field_id)?;
        let disabled = self.mode != EditMode::InfoEditing || self.in_flight.is_some();
        Ok(FieldWidgetProps::new(
            field,
            self.values.get(card_id, field_id),
            disabled,
        ))
    }

    pub fn detect_overflow(
        &self,
        geometry: CanvasGeometry,
        measurements: &[ContentMeasurement],
    ) -> Vec<OverflowWarning> {
        overflow::detect_overflow(self.canvas.cards(), geometry, measurements)
    }

    fn field(&self, card_id: CardId, field_id: FieldId) -> LayoutResult<&Field> {
        self.canvas
            .card(card_id)
            .ok_or(Rejection::CardNotFound(card_id))?
            .field(field_id)
            .ok_or(Rejection::FieldNotFound { card_id, field_id })
    }

    fn guard_layout(&self) -> LayoutResult<()> {
        if self.in_flight.is_some() {
            return Err(Rejection::SaveInFlight);
        }
        if self.mode != EditMode::LayoutEditing {
            return Err(Rejection::NotInLayoutEdit);
        }
        Ok(())
    }
}

fn persist<S: LayoutStore>(store: &mut S, request: &SaveRequest) -> StoreResult<()> {
    match &request.payload {
        SavePayload::Layout(layout) => store.save_card_layout(&request.project_key, layout),
        SavePayload::Values(values) => store.save_field_values(&request.project_key, values),
    }
}

fn load_state<S: LayoutStore>(
    store: &S,
    project_key: &str,
    config: &LayoutConfig,
) -> StoreResult<(CardLayout, FieldValues)> {
    let layout = match store.load_card_layout(project_key)? {
        Some(layout) => {
            layout.validate_bounds(config)?;
            layout
        }
        None => default_card_layout(config),
    };
    let mut values = store.load_field_values(project_key)?.unwrap_or_default();
    let dropped = values.retain(|card_id, field_id| {
        layout
            .cards
            .iter()
            .any(|card| card.id == card_id && card.has_field(field_id))
    });
    if dropped > 0 {
        info!("event=values_prune module=service status=ok dropped={dropped}");
    }
    Ok((layout, values))
}
