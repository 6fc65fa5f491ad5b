use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::FieldName;

/// Local contact form validation failures. The display text is the feedback shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationError {
    #[error("Please fill in all fields")]
    MissingField { field: FieldName },
    #[error("Please enter a valid email address")]
    BadEmail,
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingField { .. } => "missing-field",
            ValidationError::BadEmail => "bad-email",
        }
    }
}
