use std::io;

/// Custom error type for slack_ci_notify operations
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Invalid status: {0:?} (expected success, failure or cancelled)")]
    InvalidStatus(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing event context: {0} is not set")]
    MissingContext(String),

    #[error("GitHub API request failed with status {status}: {message}")]
    GitHubApi { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to send notification to Slack\nResponse: {0}")]
    Delivery(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Helper type for Results that use NotifyError
pub type Result<T> = std::result::Result<T, NotifyError>;
