use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[cfg(not(target_arch = "wasm32"))]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error: {0}")]
    Anyhow(#[from] anyhow::Error),

    #[error(
        "Timed out after {waited:?} waiting for calendar toggles ({toggle_count} toggles on page, url: {url}, title: {title})"
    )]
    Timeout {
        waited: Duration,
        toggle_count: usize,
        url: String,
        title: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl AppError {
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    pub fn operation_failed<S: Into<String>>(msg: S) -> Self {
        Self::OperationFailed(msg.into())
    }

    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict<S: Into<String>>(msg: S) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether the message can be shown to the user verbatim.
    pub fn is_pii_safe(&self) -> bool {
        match self {
            #[cfg(not(target_arch = "wasm32"))]
            Self::Database(_) => false,
            Self::Io(_) | Self::Anyhow(_) | Self::Timeout { .. } => false,
            Self::Serialization(_)
            | Self::InvalidInput(_)
            | Self::Config(_)
            | Self::OperationFailed(_)
            | Self::NotFound(_)
            | Self::Conflict(_) => true,
        }
    }

    pub fn to_safe_string(&self) -> String {
        if self.is_pii_safe() {
            return self.to_string();
        }
        match self {
            #[cfg(not(target_arch = "wasm32"))]
            Self::Database(_) => "Database operation failed".to_string(),
            Self::Io(_) => "File operation failed".to_string(),
            Self::Timeout { waited, .. } => {
                format!("Calendar list did not appear within {}s", waited.as_secs())
            }
            _ => "Operation failed".to_string(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_hides_page_details() {
        let err = AppError::Timeout {
            waited: Duration::from_secs(30),
            toggle_count: 0,
            url: "https://calendar.google.com/calendar/r".to_string(),
            title: "Google Calendar".to_string(),
        };
        assert!(err.is_timeout());
        assert!(!err.is_pii_safe());
        assert_eq!(err.to_safe_string(), "Calendar list did not appear within 30s");
        assert!(err.to_string().contains("0 toggles on page"));
    }

    #[test]
    fn test_not_found_is_safe() {
        let err = AppError::not_found("group abc");
        assert!(err.is_pii_safe());
        assert_eq!(err.to_safe_string(), "Not found: group abc");
    }
}
