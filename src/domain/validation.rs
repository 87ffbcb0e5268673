use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty { field: &'static str },
    InvalidPhoneNumber { input: String },
    InvalidUrl { field: &'static str, input: String },
    TooManyMediaUrls { max: usize, actual: usize },
    InvalidTokenWindow { not_before: u64, expires_at: u64 },
    DuplicateGrant { name: String },
    ReservedGrantName { name: String },
    MissingApiKey,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::InvalidPhoneNumber { input } => write!(f, "invalid phone number: {input}"),
            Self::InvalidUrl { field, input } => write!(f, "invalid {field} url: {input}"),
            Self::TooManyMediaUrls { max, actual } => {
                write!(f, "too many media urls: {actual} (max {max})")
            }
            Self::InvalidTokenWindow {
                not_before,
                expires_at,
            } => write!(
                f,
                "token expires at {expires_at} which is not after not-before {not_before}"
            ),
            Self::DuplicateGrant { name } => write!(f, "grant {name} is already present"),
            Self::ReservedGrantName { name } => write!(f, "grant name {name} is reserved"),
            Self::MissingApiKey => write!(f, "an API key sid and secret are required"),
        }
    }
}

impl std::error::Error for ValidationError {}
