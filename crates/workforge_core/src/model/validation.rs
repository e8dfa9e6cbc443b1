//! Field-level validation shared by all domain records.

use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Validation failure for user input or persisted record state.
///
/// Returned before any mutation happens, so callers can surface it inline.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Record id is the nil UUID.
    NilId { entity: &'static str },
    /// Required text field is empty after trim.
    EmptyField {
        entity: &'static str,
        field: &'static str,
    },
    /// Pay rate is negative, NaN or infinite.
    InvalidPayRate(f64),
    /// Note color index is outside the fixed palette.
    ColorIndexOutOfRange { index: i64, palette_size: u8 },
    /// Value is not part of a closed vocabulary.
    UnknownValue {
        field: &'static str,
        value: String,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId { entity } => write!(f, "{entity} id must not be nil"),
            Self::EmptyField { entity, field } => {
                write!(f, "{entity} {field} must not be empty")
            }
            Self::InvalidPayRate(value) => {
                write!(f, "pay rate must be a finite non-negative number, got {value}")
            }
            Self::ColorIndexOutOfRange {
                index,
                palette_size,
            } => write!(
                f,
                "color index {index} is outside palette range 0..{palette_size}"
            ),
            Self::UnknownValue { field, value } => write!(f, "unknown {field} `{value}`"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_id(entity: &'static str, id: Uuid) -> Result<(), ValidationError> {
    if id.is_nil() {
        return Err(ValidationError::NilId { entity });
    }
    Ok(())
}

pub(crate) fn require_text(
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { entity, field });
    }
    Ok(())
}

/// Trims a required single-line field, rejecting blank input.
pub(crate) fn normalize_required(
    entity: &'static str,
    field: &'static str,
    value: String,
) -> Result<String, ValidationError> {
    require_text(entity, field, &value)?;
    Ok(value.trim().to_string())
}

/// Maps blank optional input to `None`.
pub(crate) fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{normalize_optional, normalize_required, ValidationError};

    #[test]
    fn normalize_required_trims_and_rejects_blank() {
        assert_eq!(
            normalize_required("job", "title", "  Barista  ".to_string()).unwrap(),
            "Barista"
        );
        let err = normalize_required("job", "title", "   ".to_string()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::EmptyField {
                entity: "job",
                field: "title"
            }
        );
    }

    #[test]
    fn normalize_optional_drops_blank_values() {
        assert_eq!(normalize_optional(Some(" \t".to_string())), None);
        assert_eq!(
            normalize_optional(Some(" a@b.c ".to_string())).as_deref(),
            Some("a@b.c")
        );
        assert_eq!(normalize_optional(None), None);
    }
}
