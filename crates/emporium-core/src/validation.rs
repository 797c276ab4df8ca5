//! Validation utilities.

use crate::{EmporiumError, FieldError};
use rust_decimal::Decimal;
use validator::{Validate, ValidationErrors};

/// Extension trait for validation.
pub trait ValidateExt: Validate {
    /// Validates the struct and returns an `EmporiumError` on failure.
    fn validate_request(&self) -> Result<(), EmporiumError> {
        self.validate().map_err(validation_errors_to_emporium_error)
    }
}

impl<T: Validate> ValidateExt for T {}

/// Converts `validator::ValidationErrors` to `EmporiumError`.
#[must_use]
pub fn validation_errors_to_emporium_error(errors: ValidationErrors) -> EmporiumError {
    let mut field_errors: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: (*field).to_string(),
                message: error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string),
                code: error.code.to_string(),
            })
        })
        .collect();
    field_errors.sort_by(|a, b| a.field.cmp(&b.field));

    let message = field_errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");

    EmporiumError::Validation(message)
}

/// Common validation functions.
pub mod rules {
    use super::Decimal;
    use validator::ValidationError;

    /// Validates that a string is not blank (not empty after trimming).
    pub fn not_blank(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new("not_blank"));
        }
        Ok(())
    }

    /// Validates that a price is strictly positive.
    pub fn positive_price(value: &Decimal) -> Result<(), ValidationError> {
        if value.is_sign_negative() || value.is_zero() {
            return Err(ValidationError::new("price_not_positive"));
        }
        Ok(())
    }

    /// Validates that a username meets requirements.
    pub fn valid_username(username: &str) -> Result<(), ValidationError> {
        if username.len() < 3 {
            return Err(ValidationError::new("username_too_short"));
        }
        if username.len() > 32 {
            return Err(ValidationError::new("username_too_long"));
        }
        if !username
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ValidationError::new("username_invalid_characters"));
        }
        if !username.chars().next().is_some_and(char::is_alphabetic) {
            return Err(ValidationError::new("username_must_start_with_letter"));
        }
        Ok(())
    }
}
