//! Card field structure.
//!
//! # Responsibility
//! - Describe the typed form fields owned by a card.
//! - Keep field structure separate from field values (see `model::values`).
//!
//! # Invariants
//! - `id` is stable and unique within its owning card.
//! - `kind` is drawn from a closed set; unknown tags fail to deserialize.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable field identifier, unique within one card.
pub type FieldId = Uuid;

/// Closed set of supported field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    ShortText,
    LongText,
    Number,
    Dropdown,
    MultiSelect,
    Date,
    Time,
    DateTime,
    Address,
    Url,
    File,
    Table,
}

impl FieldKind {
    /// All kinds in declaration order.
    pub const ALL: [FieldKind; 12] = [
        FieldKind::ShortText,
        FieldKind::LongText,
        FieldKind::Number,
        FieldKind::Dropdown,
        FieldKind::MultiSelect,
        FieldKind::Date,
        FieldKind::Time,
        FieldKind::DateTime,
        FieldKind::Address,
        FieldKind::Url,
        FieldKind::File,
        FieldKind::Table,
    ];

    /// Stable tag used in persisted documents and FFI payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ShortText => "short-text",
            Self::LongText => "long-text",
            Self::Number => "number",
            Self::Dropdown => "dropdown",
            Self::MultiSelect => "multi-select",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "date-time",
            Self::Address => "address",
            Self::Url => "url",
            Self::File => "file",
            Self::Table => "table",
        }
    }

    /// Parses a stable tag. Matching is exact.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

/// Declarative value constraint attached to a field.
///
/// Enforcement belongs to the form-validation collaborator; the core only
/// carries constraints through persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", content = "value", rename_all = "snake_case")]
pub enum FieldConstraint {
    MaxLength(u32),
    MinValue(f64),
    MaxValue(f64),
    MaxFiles(u32),
}

/// One field inside a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub id: FieldId,
    /// Serialized as `type` to match the document schema.
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub readonly: bool,
    /// Choices for dropdown/multi-select, column headers for tables.
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub constraints: Vec<FieldConstraint>,
}

impl Field {
    /// Creates an optional, writable field with a generated id.
    pub fn new(kind: FieldKind, label: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), kind, label)
    }

    pub fn with_id(id: FieldId, kind: FieldKind, label: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            label: label.into(),
            required: false,
            readonly: false,
            options: Vec::new(),
            constraints: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_constraint(mut self, constraint: FieldConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }
}

/// Partial structural update for one field.
///
/// `None` leaves the attribute unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldUpdate {
    pub label: Option<String>,
    pub required: Option<bool>,
    pub readonly: Option<bool>,
    pub options: Option<Vec<String>>,
    pub constraints: Option<Vec<FieldConstraint>>,
}

impl FieldUpdate {
    pub(crate) fn apply(self, field: &mut Field) {
        if let Some(label) = self.label {
            field.label = label;
        }
        if let Some(required) = self.required {
            field.required = required;
        }
        if let Some(readonly) = self.readonly {
            field.readonly = readonly;
        }
        if let Some(options) = self.options {
            field.options = options;
        }
        if let Some(constraints) = self.constraints {
            field.constraints = constraints;
        }
    }
}
