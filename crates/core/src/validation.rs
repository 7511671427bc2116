//! Field validation helpers shared by the DB and API layers.

use crate::error::CoreError;

/// Maximum length for a claim category (main or sub).
pub const MAX_CATEGORY_LENGTH: usize = 100;

/// Require a non-blank string field, returning it trimmed.
pub fn require_text(field: &str, value: &str) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Validate a claim category: non-blank and at most [`MAX_CATEGORY_LENGTH`] characters.
pub fn validate_category(field: &str, value: &str) -> Result<String, CoreError> {
    let value = require_text(field, value)?;
    if value.chars().count() > MAX_CATEGORY_LENGTH {
        return Err(CoreError::Validation(format!(
            "{field} exceeds maximum length of {MAX_CATEGORY_LENGTH} characters"
        )));
    }
    Ok(value)
}

/// Validate a monetary amount: finite and not negative.
pub fn validate_amount(field: &str, value: f64) -> Result<(), CoreError> {
    if !value.is_finite() || value < 0.0 {
        return Err(CoreError::Validation(format!(
            "{field} must be a non-negative number"
        )));
    }
    Ok(())
}
