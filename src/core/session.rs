//! Edit session state machine
//!
//! A list has at most one open edit at a time, either for an existing record
//! or for a record that does not exist yet. The session owns the draft of
//! field overrides; the draft lives exactly as long as the session does.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::core::record::{FieldValue, RecordId};
use crate::schema::validator::{self, ValidationError};
use crate::schema::EntitySchema;

/// Partial field overrides pending persistence
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Draft {
    values: BTreeMap<String, FieldValue>,
}

impl Draft {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn insert(&mut self, field: &str, value: FieldValue) {
        self.values.insert(field.to_string(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<'a> IntoIterator for &'a Draft {
    type Item = (&'a String, &'a FieldValue);
    type IntoIter = std::collections::btree_map::Iter<'a, String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

/// What an edit session is editing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    /// A record that will be created on save
    New,
    Existing(RecordId),
}

impl fmt::Display for EditTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditTarget::New => write!(f, "new"),
            EditTarget::Existing(id) => write!(f, "{}", id),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SessionError {
    #[error("already editing {current}; save or cancel it first")]
    AlreadyEditing { current: EditTarget },

    #[error("nothing is being edited")]
    NotEditing,

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Inputs to the session reducer
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    Begin(EditTarget),
    SetField { field: String, input: String },
    Cancel,
    /// Persistence succeeded; the draft is no longer needed
    Saved,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum EditSession {
    #[default]
    Idle,
    Editing { target: EditTarget, draft: Draft },
}

impl EditSession {
    /// Apply one action. A rejected action leaves the session untouched.
    pub fn apply(
        &mut self,
        schema: &EntitySchema,
        action: SessionAction,
    ) -> Result<(), SessionError> {
        match action {
            SessionAction::Begin(target) => match self {
                EditSession::Idle => {
                    *self = EditSession::Editing {
                        target,
                        draft: Draft::default(),
                    };
                    Ok(())
                }
                EditSession::Editing { target: current, .. } => Err(SessionError::AlreadyEditing {
                    current: current.clone(),
                }),
            },
            SessionAction::SetField { field, input } => match self {
                EditSession::Idle => Err(SessionError::NotEditing),
                EditSession::Editing { draft, .. } => {
                    let def = validator::resolve(schema, &field)?;
                    let value = validator::parse_input(def, &input)?;
                    draft.insert(def.name, value);
                    Ok(())
                }
            },
            SessionAction::Cancel => {
                *self = EditSession::Idle;
                Ok(())
            }
            SessionAction::Saved => match self {
                EditSession::Idle => Err(SessionError::NotEditing),
                EditSession::Editing { .. } => {
                    *self = EditSession::Idle;
                    Ok(())
                }
            },
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, EditSession::Idle)
    }

    pub fn target(&self) -> Option<&EditTarget> {
        match self {
            EditSession::Idle => None,
            EditSession::Editing { target, .. } => Some(target),
        }
    }

    pub fn draft(&self) -> Option<&Draft> {
        match self {
            EditSession::Idle => None,
            EditSession::Editing { draft, .. } => Some(draft),
        }
    }

    /// True when `id` is the record under edit
    pub fn is_editing(&self, id: &RecordId) -> bool {
        matches!(self.target(), Some(EditTarget::Existing(current)) if current == id)
    }
}
