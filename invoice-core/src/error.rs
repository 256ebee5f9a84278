use std::fmt;

use thiserror::Error;

/// Unified error type for every fallible operation in the crate.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// A field the layout cannot run without is absent or blank.
    #[error("missing required field: {field}")]
    MissingRequiredField { field: &'static str },

    /// One or more request rules failed. All violations are reported.
    #[error("invalid invoice request: {0}")]
    Validation(ValidationErrors),

    #[error("invalid page request: page={page}, limit={limit} (page >= 1, 1 <= limit <= 50)")]
    InvalidPage { page: u32, limit: u32 },

    #[error("invoice not found: {0}")]
    NotFound(String),

    #[error("image error: {0}")]
    Image(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, InvoiceError>;

/// A single rule violation, tied to the request field that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Collected rule violations for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// `Ok(())` when nothing was recorded, otherwise `InvoiceError::Validation`.
    pub fn into_result(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(InvoiceError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_errors_are_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn display_joins_field_messages() {
        let mut errors = ValidationErrors::new();
        errors.add("items[0].imei_1", "Phone requires IMEI 1");
        errors.add("customer_name", "is required");
        let err = errors.into_result().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid invoice request: items[0].imei_1: Phone requires IMEI 1; customer_name: is required"
        );
    }

    #[test]
    fn missing_field_names_the_field() {
        let err = InvoiceError::MissingRequiredField {
            field: "customer.name",
        };
        assert_eq!(err.to_string(), "missing required field: customer.name");
    }
}
