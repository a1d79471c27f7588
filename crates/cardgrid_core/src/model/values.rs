//! Field value documents.
//!
//! Values live apart from card structure because they are saved far more
//! often ("save info") than layout ("lock layout").

use super::card::CardId;
use super::field::FieldId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Postal address value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub line1: String,
    #[serde(default)]
    pub line2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
}

/// Reference to an uploaded file. Storage itself is external.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub name: String,
    pub uri: String,
}

/// Typed field value.
///
/// Dates and times are ISO-8601 strings (`YYYY-MM-DD`, `HH:MM[:SS]`,
/// `YYYY-MM-DDTHH:MM[:SS]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Empty,
    Text(String),
    Number(f64),
    Choice(String),
    Choices(Vec<String>),
    Date(String),
    Time(String),
    DateTime(String),
    Address(Address),
    Url(String),
    Files(Vec<FileRef>),
    Table(Vec<Vec<String>>),
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(value)
            | Self::Choice(value)
            | Self::Date(value)
            | Self::Time(value)
            | Self::DateTime(value)
            | Self::Url(value) => value.trim().is_empty(),
            Self::Number(_) => false,
            Self::Choices(values) => values.is_empty(),
            Self::Address(address) => *address == Address::default(),
            Self::Files(files) => files.is_empty(),
            Self::Table(rows) => rows.is_empty(),
        }
    }
}

/// All field values of one project, keyed by `(card_id, field_id)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldValues(BTreeMap<CardId, BTreeMap<FieldId, FieldValue>>);

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, card_id: CardId, field_id: FieldId) -> Option<&FieldValue> {
        self.0.get(&card_id)?.get(&field_id)
    }

    /// Stores a value; `FieldValue::Empty` clears the entry instead.
    pub fn set(&mut self, card_id: CardId, field_id: FieldId, value: FieldValue) {
        if value == FieldValue::Empty {
            self.remove_field(card_id, field_id);
            return;
        }
        self.0.entry(card_id).or_default().insert(field_id, value);
    }

    pub fn remove_field(&mut self, card_id: CardId, field_id: FieldId) -> Option<FieldValue> {
        let card_values = self.0.get_mut(&card_id)?;
        let removed = card_values.remove(&field_id);
        if card_values.is_empty() {
            self.0.remove(&card_id);
        }
        removed
    }

    /// Drops every value of one card. Returns the number of values removed.
    pub fn remove_card(&mut self, card_id: CardId) -> usize {
        self.0.remove(&card_id).map_or(0, |values| values.len())
    }

    /// Values for one card, if any.
    pub fn card(&self, card_id: CardId) -> Option<&BTreeMap<FieldId, FieldValue>> {
        self.0.get(&card_id)
    }

    /// Total number of stored values.
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keeps only values whose `(card_id, field_id)` satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(CardId, FieldId) -> bool) -> usize {
        let before = self.len();
        self.0.retain(|card_id, values| {
            values.retain(|field_id, _| keep(*card_id, *field_id));
            !values.is_empty()
        });
        before - self.len()
    }
}
