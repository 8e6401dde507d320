use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum AppError {
    #[error("no jokes available to sample")]
    EmptyPool,

    #[error("joke {0} not found")]
    NotFound(i64),

    #[error("invalid submission: {0}")]
    Validation(String),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::StorageUnavailable(err.to_string())
    }

    /// Text suitable for replying to the user who triggered the failure.
    pub fn user_message(&self) -> &str {
        match self {
            Self::EmptyPool => "No jokes yet. Be the first to submit one!",
            Self::NotFound(_) => "That joke no longer exists.",
            Self::Validation(msg) => msg,
            Self::StorageUnavailable(_) => "The joke vault is unreachable right now. Try again later.",
            Self::Config(_) => "The bot is misconfigured. Ask an admin to check the logs.",
        }
    }

    /// Whether a caller may reasonably retry the same request later.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }
}
