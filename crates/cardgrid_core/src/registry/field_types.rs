//! Field type registry: data shape and widget contract per field kind.
//!
//! # Responsibility
//! - Map every `FieldKind` to the value shape it stores and the props its
//!   widget receives.
//! - Check candidate values against the registered shape.
//!
//! # Invariants
//! - The builtin registry covers every `FieldKind`.
//! - The core only reads the registry; widgets are owned by the UI host.

use crate::model::field::{Field, FieldId, FieldKind};
use crate::model::values::FieldValue;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));
static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}:\d{2}(:\d{2})?$").expect("valid time regex"));
static DATE_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}(:\d{2})?(Z|[+-]\d{2}:\d{2})?$")
        .expect("valid date-time regex")
});

/// Storage shape of a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    Text,
    Number,
    Choice,
    Choices,
    Date,
    Time,
    DateTime,
    Address,
    Url,
    Files,
    Table,
}

/// Registered contract for one field kind.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldTypeSpec {
    pub kind: FieldKind,
    pub shape: ValueShape,
    pub display_name: &'static str,
    /// Whether `Field::options` carries meaning for this kind.
    pub uses_options: bool,
    /// Multi-line widgets get a taller default placement in hosts.
    pub multiline: bool,
}

/// Read-only lookup from field kind to its contract.
#[derive(Debug, Clone)]
pub struct FieldTypeRegistry {
    specs: BTreeMap<FieldKind, FieldTypeSpec>,
}

impl Default for FieldTypeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FieldTypeRegistry {
    /// Registry covering every builtin field kind.
    pub fn builtin() -> Self {
        let specs = FieldKind::ALL
            .into_iter()
            .map(|kind| (kind, builtin_spec(kind)))
            .collect();
        Self { specs }
    }

    pub fn spec(&self, kind: FieldKind) -> Option<&FieldTypeSpec> {
        self.specs.get(&kind)
    }

    /// Returns whether `value` fits the registered shape of `field`.
    ///
    /// `FieldValue::Empty` is always accepted. Choice values must be listed
    /// in `field.options` when the field declares options. `field.constraints`
    /// are not checked here; the host's form validation enforces them.
    pub fn accepts(&self, field: &Field, value: &FieldValue) -> bool {
        let Some(spec) = self.spec(field.kind) else {
            return false;
        };
        match (spec.shape, value) {
            (_, FieldValue::Empty) => true,
            (ValueShape::Text, FieldValue::Text(_)) => true,
            (ValueShape::Number, FieldValue::Number(number)) => number.is_finite(),
            (ValueShape::Choice, FieldValue::Choice(choice)) => {
                field.options.is_empty() || field.options.contains(choice)
            }
            (ValueShape::Choices, FieldValue::Choices(choices)) => {
                field.options.is_empty()
                    || choices.iter().all(|choice| field.options.contains(choice))
            }
            (ValueShape::Date, FieldValue::Date(raw)) => DATE_RE.is_match(raw),
            (ValueShape::Time, FieldValue::Time(raw)) => TIME_RE.is_match(raw),
            (ValueShape::DateTime, FieldValue::DateTime(raw)) => DATE_TIME_RE.is_match(raw),
            (ValueShape::Address, FieldValue::Address(_)) => true,
            (ValueShape::Url, FieldValue::Url(_)) => true,
            (ValueShape::Files, FieldValue::Files(_)) => true,
            (ValueShape::Table, FieldValue::Table(rows)) => {
                field.options.is_empty()
                    || rows.iter().all(|row| row.len() == field.options.len())
            }
            _ => false,
        }
    }
}

fn builtin_spec(kind: FieldKind) -> FieldTypeSpec {
    let (shape, display_name, uses_options, multiline) = match kind {
        FieldKind::ShortText => (ValueShape::Text, "Short text", false, false),
        FieldKind::LongText => (ValueShape::Text, "Long text", false, true),
        FieldKind::Number => (ValueShape::Number, "Number", false, false),
        FieldKind::Dropdown => (ValueShape::Choice, "Dropdown", true, false),
        FieldKind::MultiSelect => (ValueShape::Choices, "Multi-select", true, false),
        FieldKind::Date => (ValueShape::Date, "Date", false, false),
        FieldKind::Time => (ValueShape::Time, "Time", false, false),
        FieldKind::DateTime => (ValueShape::DateTime, "Date & time", false, false),
        FieldKind::Address => (ValueShape::Address, "Address", false, true),
        FieldKind::Url => (ValueShape::Url, "URL", false, false),
        FieldKind::File => (ValueShape::Files, "File", false, true),
        FieldKind::Table => (ValueShape::Table, "Table", true, true),
    };
    FieldTypeSpec {
        kind,
        shape,
        display_name,
        uses_options,
        multiline,
    }
}

/// Props handed to a leaf field widget.
///
/// The widget reports edits back through the controller's
/// `set_field_value`, which is the `onChange` half of the contract.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldWidgetProps {
    pub field_id: FieldId,
    pub kind: FieldKind,
    pub label: String,
    pub value: FieldValue,
    pub disabled: bool,
    pub required: bool,
    pub options: Vec<String>,
}

impl FieldWidgetProps {
    pub fn new(field: &Field, value: Option<&FieldValue>, disabled: bool) -> Self {
        Self {
            field_id: field.id,
            kind: field.kind,
            label: field.label.clone(),
            value: value.cloned().unwrap_or(FieldValue::Empty),
            disabled: disabled || field.readonly,
            required: field.required,
            options: field.options.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldTypeRegistry, FieldWidgetProps, ValueShape};
    use crate::model::field::{Field, FieldConstraint, FieldKind};
    use crate::model::values::{Address, FieldValue};

    #[test]
    fn builtin_registry_covers_every_kind() {
        let registry = FieldTypeRegistry::builtin();
        for kind in FieldKind::ALL {
            let spec = registry.spec(kind).expect("kind should be registered");
            assert_eq!(spec.kind, kind);
        }
        assert_eq!(
            registry.spec(FieldKind::MultiSelect).map(|spec| spec.shape),
            Some(ValueShape::Choices)
        );
    }

    #[test]
    fn accepts_matching_shapes_only() {
        let registry = FieldTypeRegistry::builtin();
        let text = Field::new(FieldKind::ShortText, "Name");
        assert!(registry.accepts(&text, &FieldValue::Text("x".to_string())));
        assert!(registry.accepts(&text, &FieldValue::Empty));
        assert!(!registry.accepts(&text, &FieldValue::Number(1.0)));

        let number = Field::new(FieldKind::Number, "Budget");
        assert!(registry.accepts(&number, &FieldValue::Number(12.5)));
        assert!(!registry.accepts(&number, &FieldValue::Number(f64::NAN)));

        let address = Field::new(FieldKind::Address, "Site");
        assert!(registry.accepts(&address, &FieldValue::Address(Address::default())));
    }

    #[test]
    fn choices_must_come_from_options() {
        let registry = FieldTypeRegistry::builtin();
        let status = Field::new(FieldKind::Dropdown, "Status").with_options(["Active", "Closed"]);
        assert!(registry.accepts(&status, &FieldValue::Choice("Active".to_string())));
        assert!(!registry.accepts(&status, &FieldValue::Choice("Paused".to_string())));

        let tags = Field::new(FieldKind::MultiSelect, "Tags").with_options(["a", "b"]);
        assert!(registry.accepts(
            &tags,
            &FieldValue::Choices(vec!["a".to_string(), "b".to_string()])
        ));
        assert!(!registry.accepts(&tags, &FieldValue::Choices(vec!["c".to_string()])));
    }

    #[test]
    fn temporal_values_use_iso_formats() {
        let registry = FieldTypeRegistry::builtin();
        let date = Field::new(FieldKind::Date, "Start");
        assert!(registry.accepts(&date, &FieldValue::Date("2026-10-15".to_string())));
        assert!(!registry.accepts(&date, &FieldValue::Date("15/10/2026".to_string())));

        let time = Field::new(FieldKind::Time, "Sync");
        assert!(registry.accepts(&time, &FieldValue::Time("09:30".to_string())));

        let date_time = Field::new(FieldKind::DateTime, "Milestone");
        assert!(registry.accepts(
            &date_time,
            &FieldValue::DateTime("2026-10-15T09:30:00Z".to_string())
        ));
        assert!(!registry.accepts(&date_time, &FieldValue::Date("2026-10-15".to_string())));
    }

    #[test]
    fn table_rows_match_column_headers() {
        let registry = FieldTypeRegistry::builtin();
        let members = Field::new(FieldKind::Table, "Members").with_options(["Name", "Role"]);
        let ok = FieldValue::Table(vec![vec!["Ada".to_string(), "Lead".to_string()]]);
        let ragged = FieldValue::Table(vec![vec!["Ada".to_string()]]);
        assert!(registry.accepts(&members, &ok));
        assert!(!registry.accepts(&members, &ragged));
    }

    #[test]
    fn shape_check_leaves_constraints_to_form_validation() {
        let registry = FieldTypeRegistry::builtin();
        let code = Field::new(FieldKind::ShortText, "Code")
            .with_constraint(FieldConstraint::MaxLength(3));
        assert!(registry.accepts(&code, &FieldValue::Text("ABCDEF".to_string())));

        let budget = Field::new(FieldKind::Number, "Budget")
            .with_constraint(FieldConstraint::MinValue(0.0));
        assert!(registry.accepts(&budget, &FieldValue::Number(-5.0)));
    }

    #[test]
    fn widget_props_disable_readonly_fields() {
        let field = Field::new(FieldKind::ShortText, "Code").readonly();
        let props = FieldWidgetProps::new(&field, None, false);
        assert!(props.disabled);
        assert_eq!(props.value, FieldValue::Empty);
    }
}
