//! Shape validation for notes entering or leaving the history and storage.
//!
//! Typed [`Note`] values can only break one invariant (section id
//! uniqueness), so [`validate_note`] is small. Raw JSON read back from
//! storage can be malformed in many more ways, which [`validate_state`]
//! checks field by field before anything is deserialized.

use std::collections::HashSet;

use chrono::DateTime;
use serde_json::Value;
use thiserror::Error;

use crate::domain::{Note, SectionId};

/// A snapshot or stored record that does not have the shape of a note.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("state is not an object")]
    NotAnObject,

    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}' must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("section {index} is invalid: {reason}")]
    InvalidSection { index: usize, reason: String },

    #[error("duplicate section id {0}")]
    DuplicateSectionId(SectionId),

    #[error("malformed note: {0}")]
    Malformed(String),
}

/// Checks the invariants of a typed note.
///
/// # Errors
///
/// Returns `ValidationError::DuplicateSectionId` if two sections share an id.
pub fn validate_note(note: &Note) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(note.sections().len());
    for section in note.sections() {
        if !seen.insert(section.id()) {
            return Err(ValidationError::DuplicateSectionId(section.id()));
        }
    }
    Ok(())
}

/// Checks that a raw JSON value has the shape of a serialized note.
///
/// The object must carry an integer `id`, a string `title`, RFC 3339
/// `createdAt`/`updatedAt` strings, and a `sections` array whose elements
/// each have an integer `id`, string `title` and `content`, and a boolean
/// `isOpen`. Section ids must be unique.
pub fn validate_state(state: &Value) -> Result<(), ValidationError> {
    let obj = state.as_object().ok_or(ValidationError::NotAnObject)?;

    let id = obj.get("id").ok_or(ValidationError::MissingField("id"))?;
    if !id.is_i64() {
        return Err(ValidationError::WrongType {
            field: "id",
            expected: "an integer",
        });
    }

    let title = obj
        .get("title")
        .ok_or(ValidationError::MissingField("title"))?;
    if !title.is_string() {
        return Err(ValidationError::WrongType {
            field: "title",
            expected: "a string",
        });
    }

    for field in ["createdAt", "updatedAt"] {
        let raw = obj.get(field).ok_or(ValidationError::MissingField(field))?;
        let parsed = raw.as_str().map(DateTime::parse_from_rfc3339);
        if !matches!(parsed, Some(Ok(_))) {
            return Err(ValidationError::WrongType {
                field,
                expected: "an RFC 3339 timestamp",
            });
        }
    }

    let sections = obj
        .get("sections")
        .ok_or(ValidationError::MissingField("sections"))?
        .as_array()
        .ok_or(ValidationError::WrongType {
            field: "sections",
            expected: "an array",
        })?;

    let mut seen = HashSet::with_capacity(sections.len());
    for (index, section) in sections.iter().enumerate() {
        let section_id = validate_section(section)
            .map_err(|reason| ValidationError::InvalidSection { index, reason })?;
        if !seen.insert(section_id) {
            return Err(ValidationError::DuplicateSectionId(section_id));
        }
    }

    Ok(())
}

/// Validates a raw value and converts it into a [`Note`].
pub fn note_from_state(state: &Value) -> Result<Note, ValidationError> {
    validate_state(state)?;
    serde_json::from_value(state.clone()).map_err(|e| ValidationError::Malformed(e.to_string()))
}

fn validate_section(section: &Value) -> Result<SectionId, String> {
    let obj = section
        .as_object()
        .ok_or_else(|| "not an object".to_string())?;

    let id = obj
        .get("id")
        .and_then(Value::as_i64)
        .ok_or_else(|| "'id' must be an integer".to_string())?;
    if !obj.get("title").is_some_and(Value::is_string) {
        return Err("'title' must be a string".into());
    }
    if !obj.get("content").is_some_and(Value::is_string) {
        return Err("'content' must be a string".into());
    }
    if !obj.get("isOpen").is_some_and(Value::is_boolean) {
        return Err("'isOpen' must be a boolean".into());
    }
    Ok(id)
}
