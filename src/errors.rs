use crate::core::entitlement::BlockReason;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Action blocked: {reason}")]
    PolicyBlocked { reason: BlockReason },

    #[error("Confirmation required: {prompt}")]
    ConfirmationRequired { prompt: String },

    #[error("Sign-in required")]
    Unauthenticated,

    #[error("Payment gateway failure: {reason}")]
    Gateway { reason: String },

    #[error("Permission denied: {message}")]
    Forbidden { message: String },

    #[error("Principal not found: {identifier}")]
    PrincipalNotFound { identifier: String },

    #[error("Meal not found: {id}")]
    MealNotFound { id: i64 },

    #[error("Inconsistent state: {message}")]
    InconsistentState { message: String },
}

impl Error {
    /// Whether the caller can recover by prompting the user or retrying.
    ///
    /// Only an inconsistent badge/payment record is treated as fatal.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InconsistentState { .. })
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
