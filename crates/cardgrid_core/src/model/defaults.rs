//! Built-in card set used when a project has no saved layout.
//!
//! Ids are fixed so values saved before the first layout commit still line up
//! with the cards produced on the next load.

use crate::config::LayoutConfig;
use crate::model::canvas::Canvas;
use crate::model::card::{Card, CardLayout};
use crate::model::field::{Field, FieldConstraint, FieldKind};
use crate::model::sub_grid::{CellKey, Placement, SubGrid};
use uuid::Uuid;

pub const BASIC_INFO_CARD_ID: Uuid = Uuid::from_u128(0x6c1f_0b6e_0001_4000_8000_0000_0000_0001);
pub const SCHEDULE_CARD_ID: Uuid = Uuid::from_u128(0x6c1f_0b6e_0001_4000_8000_0000_0000_0002);
pub const BUDGET_CARD_ID: Uuid = Uuid::from_u128(0x6c1f_0b6e_0001_4000_8000_0000_0000_0003);
pub const TEAM_CARD_ID: Uuid = Uuid::from_u128(0x6c1f_0b6e_0001_4000_8000_0000_0000_0004);
pub const DOCUMENTS_CARD_ID: Uuid = Uuid::from_u128(0x6c1f_0b6e_0001_4000_8000_0000_0000_0005);

/// Label of the field every freshly added card starts with.
pub const DEFAULT_FIELD_LABEL: &str = "Notes";

const fn field_id(card: u128, index: u128) -> Uuid {
    Uuid::from_u128(0x6c1f_0b6e_0002_4000_8000_0000_0000_0000 | (card << 8) | index)
}

/// Builds the default layout for a fresh project.
pub fn default_card_layout(config: &LayoutConfig) -> CardLayout {
    CardLayout {
        canvas: Canvas::new(config.default_canvas_columns, config.default_canvas_rows),
        cards: vec![
            basic_info_card(),
            schedule_card(),
            budget_card(),
            team_card(),
            documents_card(),
        ],
    }
}

/// Field given to a card created through "add card".
pub fn default_field() -> Field {
    Field::new(FieldKind::LongText, DEFAULT_FIELD_LABEL)
}

fn basic_info_card() -> Card {
    let mut card = Card::with_id(BASIC_INFO_CARD_ID, "Basic Information", 6, 3);
    card.icon_ref = Some("info".to_string());
    card.fields = vec![
        Field::with_id(field_id(1, 1), FieldKind::ShortText, "Project name")
            .required()
            .with_constraint(FieldConstraint::MaxLength(120)),
        Field::with_id(field_id(1, 2), FieldKind::ShortText, "Project code").readonly(),
        Field::with_id(field_id(1, 3), FieldKind::Dropdown, "Status")
            .with_options(["Planning", "Active", "On hold", "Closed"]),
        Field::with_id(field_id(1, 4), FieldKind::LongText, "Description"),
    ];
    card.sub_grid = Some(grid(
        2,
        3,
        &[
            (CellKey::new(1, 1), field_id(1, 1), 1),
            (CellKey::new(1, 2), field_id(1, 2), 1),
            (CellKey::new(2, 1), field_id(1, 3), 1),
            (CellKey::new(3, 1), field_id(1, 4), 2),
        ],
    ));
    card
}

fn schedule_card() -> Card {
    let mut card = Card::with_id(SCHEDULE_CARD_ID, "Schedule", 6, 3);
    card.grid_column = 7;
    card.icon_ref = Some("calendar".to_string());
    card.fields = vec![
        Field::with_id(field_id(2, 1), FieldKind::Date, "Start date").required(),
        Field::with_id(field_id(2, 2), FieldKind::Date, "End date"),
        Field::with_id(field_id(2, 3), FieldKind::DateTime, "Next milestone"),
        Field::with_id(field_id(2, 4), FieldKind::Time, "Weekly sync"),
    ];
    card.sub_grid = Some(grid(
        2,
        2,
        &[
            (CellKey::new(1, 1), field_id(2, 1), 1),
            (CellKey::new(1, 2), field_id(2, 2), 1),
            (CellKey::new(2, 1), field_id(2, 3), 1),
            (CellKey::new(2, 2), field_id(2, 4), 1),
        ],
    ));
    card
}

fn budget_card() -> Card {
    let mut card = Card::with_id(BUDGET_CARD_ID, "Budget", 4, 3);
    card.grid_row = 4;
    card.icon_ref = Some("wallet".to_string());
    card.fields = vec![
        Field::with_id(field_id(3, 1), FieldKind::Number, "Total budget")
            .with_constraint(FieldConstraint::MinValue(0.0)),
        Field::with_id(field_id(3, 2), FieldKind::Dropdown, "Currency")
            .with_options(["USD", "EUR", "CNY", "JPY"]),
        Field::with_id(field_id(3, 3), FieldKind::ShortText, "Cost center"),
    ];
    card.sub_grid = Some(grid(
        2,
        2,
        &[
            (CellKey::new(1, 1), field_id(3, 1), 1),
            (CellKey::new(1, 2), field_id(3, 2), 1),
            (CellKey::new(2, 1), field_id(3, 3), 2),
        ],
    ));
    card
}

fn team_card() -> Card {
    let mut card = Card::with_id(TEAM_CARD_ID, "Team", 4, 3);
    card.grid_column = 5;
    card.grid_row = 4;
    card.icon_ref = Some("people".to_string());
    card.fields = vec![
        Field::with_id(field_id(4, 1), FieldKind::ShortText, "Project manager").required(),
        Field::with_id(field_id(4, 2), FieldKind::Table, "Members")
            .with_options(["Name", "Role"]),
        Field::with_id(field_id(4, 3), FieldKind::Address, "Site address"),
    ];
    card
}

fn documents_card() -> Card {
    let mut card = Card::with_id(DOCUMENTS_CARD_ID, "Documents", 4, 3);
    card.grid_column = 9;
    card.grid_row = 4;
    card.icon_ref = Some("folder".to_string());
    card.fields = vec![
        Field::with_id(field_id(5, 1), FieldKind::File, "Attachments")
            .with_constraint(FieldConstraint::MaxFiles(20)),
        Field::with_id(field_id(5, 2), FieldKind::Url, "Repository"),
        Field::with_id(field_id(5, 3), FieldKind::MultiSelect, "Tags")
            .with_options(["Contract", "Design", "Report", "Invoice"]),
    ];
    card.sub_grid = Some(grid(
        1,
        3,
        &[
            (CellKey::new(1, 1), field_id(5, 1), 1),
            (CellKey::new(2, 1), field_id(5, 2), 1),
        ],
    ));
    card
}

fn grid(columns: u32, rows: u32, placements: &[(CellKey, Uuid, u32)]) -> SubGrid {
    let mut grid = SubGrid::new(columns, rows);
    for (key, field_id, span) in placements {
        let mut placement = Placement::new(*field_id);
        placement.column_span = *span;
        grid.layout.insert(*key, placement);
    }
    grid
}
