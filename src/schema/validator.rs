//! Field input parsing and pre-dispatch validation
//!
//! Everything here runs before a request leaves the client: a create with a
//! blank required field never reaches the server.

use thiserror::Error;

use crate::core::record::FieldValue;
use crate::core::session::Draft;
use crate::schema::{EntitySchema, FieldDef, FieldType};

/// Errors raised while turning user input into a draft
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("unknown field '{field}' for {entity} (valid: {valid})")]
    UnknownField {
        entity: &'static str,
        field: String,
        valid: String,
    },

    #[error("'{0}' is assigned by the server and cannot be edited")]
    IdentityField(String),

    #[error("{field} must be a whole number, got '{input}'")]
    NotAnInteger { field: &'static str, input: String },

    #[error("{field} must be a number, got '{input}'")]
    NotANumber { field: &'static str, input: String },

    #[error("{label} is required")]
    Required {
        field: &'static str,
        label: &'static str,
    },

    #[error("expected FIELD=VALUE, got '{0}'")]
    MalformedAssignment(String),
}

/// Resolve a user-supplied field name against the schema
pub fn resolve<'s>(schema: &'s EntitySchema, field: &str) -> Result<&'s FieldDef, ValidationError> {
    if field.eq_ignore_ascii_case(schema.id_field) {
        return Err(ValidationError::IdentityField(schema.id_field.to_string()));
    }
    schema
        .resolve_field(field)
        .ok_or_else(|| ValidationError::UnknownField {
            entity: schema.name,
            field: field.to_string(),
            valid: schema.field_names(),
        })
}

/// Parse raw text input for a field. Empty input means "no value".
pub fn parse_input(def: &FieldDef, input: &str) -> Result<FieldValue, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(FieldValue::Null);
    }

    match def.field_type {
        FieldType::Text => Ok(FieldValue::Text(input.to_string())),
        FieldType::Integer => trimmed
            .parse::<i64>()
            .map(FieldValue::Integer)
            .map_err(|_| ValidationError::NotAnInteger {
                field: def.name,
                input: input.to_string(),
            }),
        FieldType::Decimal => match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(FieldValue::Decimal(n)),
            _ => Err(ValidationError::NotANumber {
                field: def.name,
                input: input.to_string(),
            }),
        },
    }
}

/// Split a `FIELD=VALUE` command-line assignment
pub fn parse_assignment(s: &str) -> Result<(String, String), ValidationError> {
    match s.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok((field.trim().to_string(), value.to_string()))
        }
        _ => Err(ValidationError::MalformedAssignment(s.to_string())),
    }
}

/// A create must carry every required field with a non-blank value
pub fn check_create(schema: &EntitySchema, draft: &Draft) -> Result<(), ValidationError> {
    for def in schema.required_fields() {
        let present = draft.get(def.name).is_some_and(|v| !v.is_blank());
        if !present {
            return Err(ValidationError::Required {
                field: def.name,
                label: def.label,
            });
        }
    }
    Ok(())
}

/// An update may omit required fields but must not blank them out
pub fn check_update(schema: &EntitySchema, draft: &Draft) -> Result<(), ValidationError> {
    for def in schema.required_fields() {
        if draft.get(def.name).is_some_and(FieldValue::is_blank) {
            return Err(ValidationError::Required {
                field: def.name,
                label: def.label,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{category, product};

    #[test]
    fn test_parse_input_by_type() {
        let price = product::SCHEMA.field("Price").unwrap();
        assert_eq!(parse_input(price, "18.5").unwrap(), FieldValue::Decimal(18.5));
        assert_eq!(parse_input(price, "").unwrap(), FieldValue::Null);
        assert!(matches!(
            parse_input(price, "cheap"),
            Err(ValidationError::NotANumber { .. })
        ));
        assert!(matches!(
            parse_input(price, "inf"),
            Err(ValidationError::NotANumber { .. })
        ));

        let supplier = product::SCHEMA.field("SupplierID").unwrap();
        assert_eq!(parse_input(supplier, " 3 ").unwrap(), FieldValue::Integer(3));
        assert!(matches!(
            parse_input(supplier, "3.5"),
            Err(ValidationError::NotAnInteger { .. })
        ));

        let name = product::SCHEMA.field("ProductName").unwrap();
        assert_eq!(
            parse_input(name, "Chai tea").unwrap(),
            FieldValue::Text("Chai tea".to_string())
        );
    }

    #[test]
    fn test_resolve_rejects_identity_and_unknown() {
        assert!(matches!(
            resolve(&category::SCHEMA, "categoryid"),
            Err(ValidationError::IdentityField(_))
        ));
        let err = resolve(&category::SCHEMA, "Color").unwrap_err();
        assert!(err.to_string().contains("CategoryName, Description"));
        assert_eq!(resolve(&category::SCHEMA, "description").unwrap().name, "Description");
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("Price=18=19").unwrap(),
            ("Price".to_string(), "18=19".to_string())
        );
        assert_eq!(
            parse_assignment("Unit=").unwrap(),
            ("Unit".to_string(), String::new())
        );
        assert!(parse_assignment("Price").is_err());
        assert!(parse_assignment("=5").is_err());
    }

    #[test]
    fn test_check_create_requires_display_name() {
        let mut draft = Draft::default();
        let err = check_create(&category::SCHEMA, &draft).unwrap_err();
        assert_eq!(err.to_string(), "Category Name is required");

        draft.insert("CategoryName", FieldValue::from("   "));
        assert!(check_create(&category::SCHEMA, &draft).is_err());

        draft.insert("CategoryName", FieldValue::from("Beverages"));
        assert!(check_create(&category::SCHEMA, &draft).is_ok());
    }

    #[test]
    fn test_check_update_allows_partial_drafts() {
        let mut draft = Draft::default();
        draft.insert("Description", FieldValue::from("Soft drinks"));
        assert!(check_update(&category::SCHEMA, &draft).is_ok());

        draft.insert("CategoryName", FieldValue::Null);
        assert!(matches!(
            check_update(&category::SCHEMA, &draft),
            Err(ValidationError::Required { field: "CategoryName", .. })
        ));
    }
}
