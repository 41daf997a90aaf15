//! Typed entity schemas
//!
//! Every catalog entity is described by an [`EntitySchema`]: the REST collection
//! it lives under, the identity field the server assigns, the field used for
//! searching, and the editable fields with their types. The list component is
//! written once against this description and reused for every entity.

pub mod validator;

pub use validator::ValidationError;

use crate::core::record::{FieldValue, Record, RecordId};

/// Scalar type of an editable field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Free text
    Text,
    /// Whole number (foreign keys, counts)
    Integer,
    /// Decimal number (prices)
    Decimal,
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::Text => write!(f, "text"),
            FieldType::Integer => write!(f, "integer"),
            FieldType::Decimal => write!(f, "decimal"),
        }
    }
}

/// An editable field of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Wire name as used by the REST API (e.g. `CategoryName`)
    pub name: &'static str,
    /// Human readable label
    pub label: &'static str,
    pub field_type: FieldType,
    /// Must be present and non-blank before a create is dispatched
    pub required: bool,
    /// Maximum column width in table output
    pub width: usize,
}

impl FieldDef {
    pub const fn text(name: &'static str, label: &'static str, width: usize) -> Self {
        Self {
            name,
            label,
            field_type: FieldType::Text,
            required: false,
            width,
        }
    }

    pub const fn integer(name: &'static str, label: &'static str, width: usize) -> Self {
        Self {
            name,
            label,
            field_type: FieldType::Integer,
            required: false,
            width,
        }
    }

    pub const fn decimal(name: &'static str, label: &'static str, width: usize) -> Self {
        Self {
            name,
            label,
            field_type: FieldType::Decimal,
            required: false,
            width,
        }
    }

    /// Mark the field as required
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Description of one catalog entity
#[derive(Debug)]
pub struct EntitySchema {
    /// Singular name used in messages ("category")
    pub name: &'static str,
    /// Plural name used in messages ("categories")
    pub plural: &'static str,
    /// Heading shown above list views
    pub title: &'static str,
    /// Collection path segment on the REST API
    pub collection: &'static str,
    /// Identity field assigned by the server
    pub id_field: &'static str,
    /// Field matched by the search filter
    pub display_field: &'static str,
    /// Editable fields, in display order
    pub fields: &'static [FieldDef],
}

impl EntitySchema {
    /// Look up a field by its exact wire name
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up a field ignoring ASCII case, so `productname=Chai` works on the
    /// command line
    pub fn resolve_field(&self, name: &str) -> Option<&FieldDef> {
        self.field(name)
            .or_else(|| self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name)))
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.required)
    }

    /// Field names joined for error messages
    pub fn field_names(&self) -> String {
        self.fields
            .iter()
            .map(|f| f.name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Extract the identity of a record, if it carries a usable one
    pub fn id_of(&self, record: &Record) -> Option<RecordId> {
        record.get(self.id_field).and_then(RecordId::from_value)
    }

    /// Text of the display field, empty when absent
    pub fn display_value(&self, record: &Record) -> String {
        record
            .get(self.display_field)
            .map(FieldValue::to_text)
            .unwrap_or_default()
    }
}
