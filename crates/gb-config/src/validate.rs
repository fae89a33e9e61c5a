//! Semantic validation for configuration files.

use gb_common::schema::is_compatible;
use gb_common::SCHEMA_VERSION;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("incompatible schema version {found} (expected {expected})")]
    SchemaVersion { found: String, expected: String },

    #[error("{field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("duplicate {kind}: {key}")]
    Duplicate { kind: &'static str, key: String },

    #[error("edge {edge} references undeclared vertex {vertex}")]
    UnknownVertex { edge: String, vertex: String },
}

/// Result alias for validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

impl From<ValidationError> for gb_common::Error {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::IoError(msg) | ValidationError::ParseError(msg) => {
                gb_common::Error::Config(msg)
            }
            schema @ ValidationError::SchemaVersion { .. } => {
                gb_common::Error::SchemaValidation(schema.to_string())
            }
            other => gb_common::Error::InvalidParams(other.to_string()),
        }
    }
}

pub(crate) fn check_schema_version(version: &str) -> ValidationResult<()> {
    if is_compatible(version) {
        Ok(())
    } else {
        Err(ValidationError::SchemaVersion {
            found: version.to_string(),
            expected: SCHEMA_VERSION.to_string(),
        })
    }
}

/// Require a finite probability in `[0, 1]`.
pub(crate) fn check_probability(field: impl Into<String>, value: f64) -> ValidationResult<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.into(),
            message: format!("probability must be in [0, 1], got {}", value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probability_bounds() {
        assert!(check_probability("p", 0.0).is_ok());
        assert!(check_probability("p", 1.0).is_ok());
        assert!(check_probability("p", -0.1).is_err());
        assert!(check_probability("p", 1.5).is_err());
        assert!(check_probability("p", f64::NAN).is_err());
    }

    #[test]
    fn schema_version_major_must_match() {
        assert!(check_schema_version("1.2.0").is_ok());
        let err = check_schema_version("2.0.0").unwrap_err();
        assert!(matches!(err, ValidationError::SchemaVersion { .. }));
    }

    #[test]
    fn converts_into_common_error() {
        let err: gb_common::Error = ValidationError::ParseError("bad".into()).into();
        assert_eq!(err.code(), 10);
        let err: gb_common::Error = ValidationError::InvalidValue {
            field: "leakage".into(),
            message: "nope".into(),
        }
        .into();
        assert_eq!(err.code(), 11);
    }
}
