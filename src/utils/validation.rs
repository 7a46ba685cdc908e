use std::borrow::Cow;

use validator::ValidationError;

/// Rejects values that are empty once surrounding whitespace is trimmed.
/// Text is stored trimmed, so a whitespace-only value would be saved empty.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some(Cow::Borrowed("must not be blank"));
        return Err(error);
    }
    Ok(())
}
