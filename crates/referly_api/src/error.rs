//! API error types

use thiserror::Error;

/// Errors reported by a [`ReferralApi`](crate::ReferralApi)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// A referral with this email already exists
    #[error("Email already exists: {email}")]
    Conflict { email: String },

    /// The service could not answer the request
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl ApiError {
    /// HTTP-style status marker for the error
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Conflict { .. } => 409,
            ApiError::Unavailable(_) => 503,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ApiError::Conflict { .. })
    }
}

/// Result type for API operations
pub type Result<T> = std::result::Result<T, ApiError>;
