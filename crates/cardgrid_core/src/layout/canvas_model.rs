//! Card placement on the page-level canvas.
//!
//! # Responsibility
//! - Own the canvas dimensions and the card set.
//! - Drive drag (move) and live resize interactions from pointer events.
//! - Apply card and field structural edits, delegating field placement to
//!   the strict sub-grid model.
//!
//! # Invariants
//! - Cards may overlap; commits never check other cards.
//! - Column span never crosses the canvas right edge after a resize step.
//! - Row span is only clamped when `LayoutConfig::bound_row_span` is set.
//! - Canvas resizes never move, clamp or delete cards.

use super::sub_grid::FieldSubGridModel;
use super::{LayoutResult, Rejection};
use crate::config::LayoutConfig;
use crate::grid::hit_test::{resolve_cell, CellBox, Point};
use crate::grid::math::{in_bounds, pixel_delta_to_grid_delta};
use crate::grid::GridPos;
use crate::model::canvas::Canvas;
use crate::model::card::{Card, CardId, CardLayout};
use crate::model::defaults::default_field;
use crate::model::field::{Field, FieldId, FieldKind, FieldUpdate};
use crate::model::sub_grid::{CellKey, SubGrid};
use log::{debug, info};

/// Pixel distance between the starts of adjacent cells, per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellPitch {
    pub column_px: f64,
    pub row_px: f64,
}

impl CellPitch {
    pub fn new(column_px: f64, row_px: f64) -> Self {
        Self { column_px, row_px }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragState {
    card_id: CardId,
    target: Option<GridPos>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ResizeState {
    card_id: CardId,
    /// Pointer reference; advances by whole consumed cells only.
    anchor: Point,
    pitch: CellPitch,
    /// Unclamped spans accumulated over the gesture.
    raw_column_span: i64,
    raw_row_span: i64,
}

/// Canvas + cards with in-progress pointer interactions.
#[derive(Debug, Clone)]
pub struct CardCanvasModel {
    canvas: Canvas,
    cards: Vec<Card>,
    config: LayoutConfig,
    drag: Option<DragState>,
    resize: Option<ResizeState>,
}

impl CardCanvasModel {
    pub fn new(layout: CardLayout, config: LayoutConfig) -> Self {
        Self {
            canvas: layout.canvas,
            cards: layout.cards,
            config,
            drag: None,
            resize: None,
        }
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, card_id: CardId) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == card_id)
    }

    /// Snapshot of canvas and cards for persistence.
    pub fn to_layout(&self) -> CardLayout {
        CardLayout {
            canvas: self.canvas,
            cards: self.cards.clone(),
        }
    }

    /// Replaces canvas and cards, dropping any running interaction.
    pub fn replace_layout(&mut self, layout: CardLayout) {
        self.canvas = layout.canvas;
        self.cards = layout.cards;
        self.clear_interactions();
    }

    pub fn dragging(&self) -> Option<CardId> {
        self.drag.map(|drag| drag.card_id)
    }

    pub fn resizing(&self) -> Option<CardId> {
        self.resize.map(|resize| resize.card_id)
    }

    /// Drops drag and resize state without mutating cards.
    pub fn clear_interactions(&mut self) {
        self.drag = None;
        self.resize = None;
    }

    // ---- drag -------------------------------------------------------------

    pub fn begin_drag(&mut self, card_id: CardId) -> LayoutResult<()> {
        self.ensure_card(card_id)?;
        if self.resize.is_some() {
            return Err(Rejection::InteractionInProgress);
        }
        self.drag = Some(DragState {
            card_id,
            target: None,
        });
        Ok(())
    }

    /// Resolves the pointer against rendered cells and remembers the match.
    pub fn update_drag_target(
        &mut self,
        pointer: Point,
        cells: &[CellBox],
    ) -> LayoutResult<Option<GridPos>> {
        let drag = self.drag.as_mut().ok_or(Rejection::NoActiveDrag)?;
        let target = resolve_cell(pointer, cells);
        drag.target = target;
        Ok(target)
    }

    /// Moves the dragged card's anchor to `target`.
    ///
    /// Other cards are not consulted; overlapping is allowed.
    pub fn commit_drag(&mut self, target: GridPos) -> LayoutResult<CardId> {
        let drag = self.drag.ok_or(Rejection::NoActiveDrag)?;
        if !in_bounds(target, self.canvas.columns, self.canvas.rows) {
            return Err(Rejection::CellOutOfBounds(target));
        }
        let card = self.card_mut(drag.card_id)?;
        card.grid_column = target.column;
        card.grid_row = target.row;
        self.drag = None;
        debug!(
            "event=card_move module=layout status=ok row={} column={}",
            target.row, target.column
        );
        Ok(drag.card_id)
    }

    /// Commits to the last resolved target; aborts the drag when there is none.
    pub fn drop_dragged(&mut self) -> LayoutResult<CardId> {
        let drag = self.drag.ok_or(Rejection::NoActiveDrag)?;
        match drag.target {
            Some(target) => self.commit_drag(target),
            None => {
                self.drag = None;
                Err(Rejection::NoTargetCell)
            }
        }
    }

    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }

    // ---- resize -----------------------------------------------------------

    pub fn begin_resize(
        &mut self,
        card_id: CardId,
        pointer: Point,
        pitch: CellPitch,
    ) -> LayoutResult<()> {
        if self.drag.is_some() {
            return Err(Rejection::InteractionInProgress);
        }
        let card = self.card(card_id).ok_or(Rejection::CardNotFound(card_id))?;
        self.resize = Some(ResizeState {
            card_id,
            anchor: pointer,
            pitch,
            raw_column_span: i64::from(card.column_span),
            raw_row_span: i64::from(card.row_span),
        });
        Ok(())
    }

    /// Applies one pointer move and returns the live `(column_span, row_span)`.
    pub fn update_resize(&mut self, pointer: Point) -> LayoutResult<(u32, u32)> {
        let mut state = self.resize.ok_or(Rejection::NoActiveResize)?;

        let column_delta =
            pixel_delta_to_grid_delta(pointer.x - state.anchor.x, state.pitch.column_px);
        let row_delta = pixel_delta_to_grid_delta(pointer.y - state.anchor.y, state.pitch.row_px);
        state.raw_column_span += i64::from(column_delta);
        state.raw_row_span += i64::from(row_delta);
        state.anchor.x += f64::from(column_delta) * state.pitch.column_px;
        state.anchor.y += f64::from(row_delta) * state.pitch.row_px;

        let canvas = self.canvas;
        let bound_rows = self.config.bound_row_span;
        let card = self.card_mut(state.card_id)?;

        let mut column_span = span_from_raw(state.raw_column_span);
        column_span = column_span.min(canvas.max_column_span(card.grid_column));
        // Unbounded rows still stop where the far edge would leave `u32`.
        let mut row_span = span_from_raw(state.raw_row_span)
            .min(u32::MAX - card.grid_row.saturating_sub(1));
        if bound_rows {
            row_span = row_span.min(canvas.max_row_span(card.grid_row));
        }

        card.column_span = column_span;
        card.row_span = row_span;
        self.resize = Some(state);
        Ok((column_span, row_span))
    }

    pub fn end_resize(&mut self) -> LayoutResult<CardId> {
        let state = self.resize.take().ok_or(Rejection::NoActiveResize)?;
        if let Some(card) = self.card(state.card_id) {
            debug!(
                "event=card_resize module=layout status=ok column_span={} row_span={}",
                card.column_span, card.row_span
            );
        }
        Ok(state.card_id)
    }

    // ---- card structure ---------------------------------------------------

    /// Adds a card at `(1, 1)` with the default span and one default field.
    pub fn add_card(&mut self, title: &str) -> LayoutResult<CardId> {
        let title = normalize_title(title)?;
        let mut card = Card::new(
            title,
            self.config.default_card_column_span,
            self.config.default_card_row_span,
        );
        card.fields.push(default_field());
        let card_id = card.id;
        self.cards.push(card);
        info!("event=card_add module=layout status=ok card_id={card_id}");
        Ok(card_id)
    }

    pub fn remove_card(&mut self, card_id: CardId) -> LayoutResult<Card> {
        let index = self
            .cards
            .iter()
            .position(|card| card.id == card_id)
            .ok_or(Rejection::CardNotFound(card_id))?;
        if self.dragging() == Some(card_id) {
            self.drag = None;
        }
        if self.resizing() == Some(card_id) {
            self.resize = None;
        }
        let removed = self.cards.remove(index);
        info!("event=card_remove module=layout status=ok card_id={card_id}");
        Ok(removed)
    }

    pub fn rename_card(&mut self, card_id: CardId, title: &str) -> LayoutResult<()> {
        let title = normalize_title(title)?;
        self.card_mut(card_id)?.title = title;
        Ok(())
    }

    /// Sets or clears the card icon. Blank references clear it.
    pub fn set_card_icon(&mut self, card_id: CardId, icon_ref: Option<&str>) -> LayoutResult<()> {
        let icon_ref = icon_ref
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        self.card_mut(card_id)?.icon_ref = icon_ref;
        Ok(())
    }

    /// Changes canvas dimensions without touching card positions.
    pub fn resize_canvas(&mut self, columns: u32, rows: u32) -> LayoutResult<()> {
        if !self.config.canvas_dimensions_allowed(columns, rows) {
            return Err(Rejection::InvalidDimensions { columns, rows });
        }
        self.canvas = Canvas::new(columns, rows);
        let outside = self
            .cards
            .iter()
            .filter(|card| card.exceeds(&self.canvas))
            .count();
        info!(
            "event=canvas_resize module=layout status=ok columns={} rows={} cards_outside={}",
            columns, rows, outside
        );
        Ok(())
    }

    // ---- field structure --------------------------------------------------

    pub fn add_field(
        &mut self,
        card_id: CardId,
        kind: FieldKind,
        label: &str,
    ) -> LayoutResult<FieldId> {
        let label = normalize_title(label)?;
        let field = Field::new(kind, label);
        let field_id = field.id;
        self.card_mut(card_id)?.fields.push(field);
        Ok(field_id)
    }

    /// Deletes a field and any placement of it.
    pub fn remove_field(&mut self, card_id: CardId, field_id: FieldId) -> LayoutResult<Field> {
        let card = self.card_mut(card_id)?;
        let index = card
            .fields
            .iter()
            .position(|field| field.id == field_id)
            .ok_or(Rejection::FieldNotFound { card_id, field_id })?;
        if let Some(grid) = card.sub_grid.as_mut() {
            grid.layout
                .retain(|_, placement| placement.field_id != field_id);
        }
        Ok(card.fields.remove(index))
    }

    pub fn update_field(
        &mut self,
        card_id: CardId,
        field_id: FieldId,
        mut update: FieldUpdate,
    ) -> LayoutResult<()> {
        if let Some(label) = update.label.take() {
            update.label = Some(normalize_title(&label)?);
        }
        let field = self
            .card_mut(card_id)?
            .field_mut(field_id)
            .ok_or(Rejection::FieldNotFound { card_id, field_id })?;
        update.apply(field);
        Ok(())
    }

    // ---- sub-grid ---------------------------------------------------------

    /// Creates or resizes the card's sub-grid; returns placements orphaned.
    pub fn configure_sub_grid(
        &mut self,
        card_id: CardId,
        columns: u32,
        rows: u32,
    ) -> LayoutResult<usize> {
        let max = self.config.max_sub_grid_dimension;
        let card = self.card_mut(card_id)?;
        match card.sub_grid.as_mut() {
            Some(grid) => FieldSubGridModel::new(grid, max).set_dimensions(columns, rows),
            None => {
                let mut grid = SubGrid::new(1, 1);
                let removed = FieldSubGridModel::new(&mut grid, max).set_dimensions(columns, rows)?;
                card.sub_grid = Some(grid);
                Ok(removed)
            }
        }
    }

    /// Drops the sub-grid; every field returns to the unplaced pool.
    pub fn clear_sub_grid(&mut self, card_id: CardId) -> LayoutResult<Option<SubGrid>> {
        Ok(self.card_mut(card_id)?.sub_grid.take())
    }

    pub fn place_field(
        &mut self,
        card_id: CardId,
        field_id: FieldId,
        row: u32,
        column: u32,
    ) -> LayoutResult<CellKey> {
        let max = self.config.max_sub_grid_dimension;
        let card = self.card_mut(card_id)?;
        if !card.has_field(field_id) {
            return Err(Rejection::FieldNotFound { card_id, field_id });
        }
        let grid = card
            .sub_grid
            .as_mut()
            .ok_or(Rejection::NoSubGrid(card_id))?;
        FieldSubGridModel::new(grid, max).place(field_id, row, column)
    }

    pub fn unplace_field(&mut self, card_id: CardId, key: CellKey) -> LayoutResult<FieldId> {
        let max = self.config.max_sub_grid_dimension;
        let grid = self.sub_grid_mut(card_id)?;
        FieldSubGridModel::new(grid, max)
            .remove(key)
            .map(|placement| placement.field_id)
    }

    pub fn change_field_span(
        &mut self,
        card_id: CardId,
        key: CellKey,
        delta: i32,
    ) -> LayoutResult<u32> {
        let max = self.config.max_sub_grid_dimension;
        let grid = self.sub_grid_mut(card_id)?;
        FieldSubGridModel::new(grid, max).change_span(key, delta)
    }

    fn sub_grid_mut(&mut self, card_id: CardId) -> LayoutResult<&mut SubGrid> {
        self.card_mut(card_id)?
            .sub_grid
            .as_mut()
            .ok_or(Rejection::NoSubGrid(card_id))
    }

    fn card_mut(&mut self, card_id: CardId) -> LayoutResult<&mut Card> {
        self.cards
            .iter_mut()
            .find(|card| card.id == card_id)
            .ok_or(Rejection::CardNotFound(card_id))
    }

    fn ensure_card(&self, card_id: CardId) -> LayoutResult<()> {
        self.card(card_id)
            .map(|_| ())
            .ok_or(Rejection::CardNotFound(card_id))
    }
}

fn span_from_raw(raw: i64) -> u32 {
    raw.clamp(1, i64::from(u32::MAX)) as u32
}

fn normalize_title(value: &str) -> LayoutResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Rejection::InvalidTitle);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{CardCanvasModel, CellPitch};
    use crate::config::LayoutConfig;
    use crate::grid::hit_test::{uniform_cell_boxes, Point};
    use crate::grid::GridPos;
    use crate::layout::Rejection;
    use crate::model::canvas::Canvas;
    use crate::model::card::{Card, CardLayout};
    use crate::model::defaults::DEFAULT_FIELD_LABEL;
    use crate::model::field::FieldKind;

    fn model_with_card(columns: u32, rows: u32, card: Card) -> CardCanvasModel {
        CardCanvasModel::new(
            CardLayout {
                canvas: Canvas::new(columns, rows),
                cards: vec![card],
            },
            LayoutConfig::default(),
        )
    }

    #[test]
    fn add_card_uses_origin_default_span_and_default_field() {
        let mut model = model_with_card(12, 8, Card::new("Existing", 2, 2));
        let card_id = model.add_card("  Risks ").unwrap();
        let card = model.card(card_id).unwrap();

        assert_eq!(card.title, "Risks");
        assert_eq!((card.grid_column, card.grid_row), (1, 1));
        assert_eq!((card.column_span, card.row_span), (4, 3));
        assert_eq!(card.fields.len(), 1);
        assert_eq!(card.fields[0].label, DEFAULT_FIELD_LABEL);
        assert_eq!(model.add_card("   "), Err(Rejection::InvalidTitle));
    }

    #[test]
    fn drag_commit_allows_overlap() {
        let first = Card::new("A", 2, 2);
        let mut model = model_with_card(6, 6, first.clone());
        let second = model.add_card("B").unwrap();

        model.begin_drag(second).unwrap();
        let boxes = uniform_cell_boxes(Point::new(0.0, 0.0), 6, 6, 50.0, 50.0, 0.0);
        let target = model
            .update_drag_target(Point::new(10.0, 10.0), &boxes)
            .unwrap();
        assert_eq!(target, Some(GridPos::new(1, 1)));
        model.drop_dragged().unwrap();

        let moved = model.card(second).unwrap();
        assert_eq!((moved.grid_column, moved.grid_row), (1, 1));
        assert_eq!(model.card(first.id).unwrap().grid_column, 1);
        assert_eq!(model.dragging(), None);
    }

    #[test]
    fn drop_without_target_aborts_drag() {
        let card = Card::new("A", 1, 1);
        let card_id = card.id;
        let mut model = model_with_card(4, 4, card);
        model.begin_drag(card_id).unwrap();
        model.update_drag_target(Point::new(1.0, 1.0), &[]).unwrap();

        assert_eq!(model.drop_dragged(), Err(Rejection::NoTargetCell));
        assert_eq!(model.dragging(), None);
        assert_eq!(model.card(card_id).unwrap().grid_column, 1);
    }

    #[test]
    fn cancel_drag_leaves_card_in_place() {
        let mut card = Card::new("A", 1, 1);
        card.grid_column = 3;
        let card_id = card.id;
        let mut model = model_with_card(4, 4, card);
        model.begin_drag(card_id).unwrap();
        model.cancel_drag();
        assert_eq!(model.commit_drag(GridPos::new(1, 1)), Err(Rejection::NoActiveDrag));
        assert_eq!(model.card(card_id).unwrap().grid_column, 3);
    }

    #[test]
    fn commit_drag_rejects_cells_outside_canvas() {
        let card = Card::new("A", 1, 1);
        let card_id = card.id;
        let mut model = model_with_card(4, 4, card);
        model.begin_drag(card_id).unwrap();
        assert_eq!(
            model.commit_drag(GridPos::new(5, 1)),
            Err(Rejection::CellOutOfBounds(GridPos::new(5, 1)))
        );
    }

    #[test]
    fn resize_clamps_column_span_at_right_edge() {
        let mut card = Card::new("Wide", 4, 2);
        card.grid_column = 8;
        let card_id = card.id;
        let mut model = model_with_card(10, 8, card);
        let pitch = CellPitch::new(100.0, 60.0);

        model
            .begin_resize(card_id, Point::new(0.0, 0.0), pitch)
            .unwrap();
        assert_eq!(model.update_resize(Point::new(0.0, 0.0)), Ok((3, 2)));
        assert_eq!(model.update_resize(Point::new(300.0, 0.0)), Ok((3, 2)));
        model.end_resize().unwrap();
        assert_eq!(model.card(card_id).unwrap().column_span, 3);
    }

    #[test]
    fn resize_leaves_row_span_unbounded_by_default() {
        let card = Card::new("Tall", 1, 1);
        let card_id = card.id;
        let mut model = model_with_card(4, 2, card);
        model
            .begin_resize(card_id, Point::new(0.0, 0.0), CellPitch::new(50.0, 50.0))
            .unwrap();
        assert_eq!(model.update_resize(Point::new(0.0, 250.0)), Ok((1, 6)));
    }

    #[test]
    fn resize_bounds_row_span_when_configured() {
        let card = Card::new("Tall", 1, 1);
        let card_id = card.id;
        let config = LayoutConfig {
            bound_row_span: true,
            ..LayoutConfig::default()
        };
        let mut model = CardCanvasModel::new(
            CardLayout {
                canvas: Canvas::new(4, 2),
                cards: vec![card],
            },
            config,
        );
        model
            .begin_resize(card_id, Point::new(0.0, 0.0), CellPitch::new(50.0, 50.0))
            .unwrap();
        assert_eq!(model.update_resize(Point::new(0.0, 250.0)), Ok((1, 2)));
    }

    #[test]
    fn resize_never_drops_below_one_cell() {
        let card = Card::new("Small", 2, 2);
        let card_id = card.id;
        let mut model = model_with_card(8, 8, card);
        model
            .begin_resize(card_id, Point::new(500.0, 500.0), CellPitch::new(40.0, 40.0))
            .unwrap();
        assert_eq!(model.update_resize(Point::new(0.0, 0.0)), Ok((1, 1)));
    }

    #[test]
    fn resize_canvas_keeps_cards_where_they_are() {
        let mut card = Card::new("Far", 3, 3);
        card.grid_column = 9;
        card.grid_row = 6;
        let card_id = card.id;
        let mut model = model_with_card(12, 8, card);

        model.resize_canvas(4, 4).unwrap();
        let card = model.card(card_id).unwrap();
        assert_eq!((card.grid_column, card.grid_row), (9, 6));
        assert_eq!((card.column_span, card.row_span), (3, 3));
        assert!(card.exceeds(&model.canvas()));
        assert_eq!(
            model.resize_canvas(0, 4),
            Err(Rejection::InvalidDimensions { columns: 0, rows: 4 })
        );
    }

    #[test]
    fn drag_and_resize_are_exclusive() {
        let card = Card::new("A", 1, 1);
        let card_id = card.id;
        let mut model = model_with_card(4, 4, card);
        model.begin_drag(card_id).unwrap();
        assert_eq!(
            model.begin_resize(card_id, Point::new(0.0, 0.0), CellPitch::new(10.0, 10.0)),
            Err(Rejection::InteractionInProgress)
        );
    }

    #[test]
    fn removing_field_also_unplaces_it() {
        let mut model = model_with_card(12, 8, Card::new("A", 4, 3));
        let card_id = model.cards()[0].id;
        let field_id = model
            .add_field(card_id, FieldKind::Number, "Budget")
            .unwrap();
        model.configure_sub_grid(card_id, 2, 2).unwrap();
        model.place_field(card_id, field_id, 1, 1).unwrap();

        model.remove_field(card_id, field_id).unwrap();
        let card = model.card(card_id).unwrap();
        assert!(card.sub_grid.as_ref().unwrap().layout.is_empty());
        assert!(!card.has_field(field_id));
    }

    #[test]
    fn place_field_requires_owned_field_and_sub_grid() {
        let mut model = model_with_card(12, 8, Card::new("A", 4, 3));
        let card_id = model.cards()[0].id;
        let field_id = model
            .add_field(card_id, FieldKind::ShortText, "Name")
            .unwrap();

        assert_eq!(
            model.place_field(card_id, field_id, 1, 1),
            Err(Rejection::NoSubGrid(card_id))
        );
        model.configure_sub_grid(card_id, 2, 1).unwrap();
        let stranger = uuid::Uuid::new_v4();
        assert_eq!(
            model.place_field(card_id, stranger, 1, 1),
            Err(Rejection::FieldNotFound {
                card_id,
                field_id: stranger,
            })
        );
    }
}
