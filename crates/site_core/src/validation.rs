use once_cell::sync::Lazy;
use regex::Regex;
use shared::{domain::ContactFields, error::ValidationError};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(&email.to_lowercase())
}

/// Checks trimmed presence of every field, then the email shape.
pub fn validate(fields: &ContactFields) -> Result<(), ValidationError> {
    if let Some(field) = fields.first_empty() {
        return Err(ValidationError::MissingField { field });
    }
    if !is_valid_email(fields.email.trim()) {
        return Err(ValidationError::BadEmail);
    }
    Ok(())
}
