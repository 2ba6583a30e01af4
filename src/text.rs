//! Length rules for user-submitted text.

use crate::{NaranjoError, Result};

/// Trim `value` and check its length in characters.
///
/// Returns the trimmed text.
///
/// # Examples
///
/// ```
/// use naranjo::text::trimmed_within;
///
/// assert_eq!(trimmed_within("title", "  Hola  ", 3, 40).unwrap(), "Hola");
/// assert!(trimmed_within("title", "  ", 3, 40).is_err());
/// ```
pub fn trimmed_within<'a>(field: &str, value: &'a str, min: usize, max: usize) -> Result<&'a str> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();

    if len == 0 && min > 0 {
        return Err(NaranjoError::Validation(format!("{field} is required")));
    }
    if len < min || len > max {
        let msg = if min == 0 {
            format!("{field} must be at most {max} characters")
        } else {
            format!("{field} must be {min}-{max} characters")
        };
        return Err(NaranjoError::Validation(msg));
    }
    Ok(trimmed)
}
