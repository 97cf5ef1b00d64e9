use std::error::Error;
use std::fmt::{Display, Formatter};

/// Caller input rejected before any storage access.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// User identity is empty or whitespace only.
    EmptyUserId,
    /// Task or recommendation title is blank after trim.
    EmptyTitle,
    /// Resource URL is blank after trim.
    EmptyResourceUrl { title: String },
    /// Profile display name is blank after trim.
    EmptyName,
    GpaOutOfRange(f64),
    SatOutOfRange(i64),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUserId => write!(f, "user id must not be empty"),
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::EmptyResourceUrl { title } => {
                write!(f, "resource `{title}` must have a url")
            }
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::GpaOutOfRange(value) => write!(f, "gpa {value} is outside 0.0..=5.0"),
            Self::SatOutOfRange(value) => write!(f, "sat {value} is outside 400..=1600"),
        }
    }
}

impl Error for ValidationError {}

/// Rejects blank user identities. Accepted ids are returned exactly as
/// supplied.
pub fn require_user_id(user_id: &str) -> Result<&str, ValidationError> {
    if user_id.trim().is_empty() {
        return Err(ValidationError::EmptyUserId);
    }
    Ok(user_id)
}

pub(crate) fn require_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(())
}
