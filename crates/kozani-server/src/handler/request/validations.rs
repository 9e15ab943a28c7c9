//! Request validation utilities.

use validator::ValidationError;

pub fn validation_error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

/// Rejects strings that are empty after trimming.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(validation_error("blank", "is required and cannot be empty"));
    }

    Ok(())
}

/// Trims surrounding whitespace, mapping blank strings to `None`.
pub fn normalized_option(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_strings_are_rejected() {
        assert!(not_blank("   ").is_err());
        assert!(not_blank("").is_err());
        assert!(not_blank(" 0712 ").is_ok());
    }

    #[test]
    fn normalized_option_trims() {
        assert_eq!(normalized_option(Some("  Amina ")), Some("Amina".to_owned()));
        assert_eq!(normalized_option(Some("   ")), None);
        assert_eq!(normalized_option(None), None);
    }
}
