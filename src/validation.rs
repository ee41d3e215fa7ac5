// Validation utilities module
// Provides custom validation functions for domain-specific rules

use validator::ValidationError;

/// Validates a contact phone number
/// Accepts digits, spaces, and a leading "+"; must carry 7 to 15 digits
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let trimmed = phone.trim();
    let rest = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if !rest.chars().all(|c| c.is_ascii_digit() || c == ' ' || c == '-') {
        return Err(ValidationError::new("invalid_phone"));
    }
    let digit_count = rest.chars().filter(|c| c.is_ascii_digit()).count();
    if (7..=15).contains(&digit_count) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_phone"))
    }
}
