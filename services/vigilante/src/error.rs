//! Error types for the vigilante service

/// Errors that can occur in the vigilante service
#[derive(Debug, thiserror::Error)]
pub enum VigilanteError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Alert delivery failed: {0}")]
    Alert(String),

    #[error("Dashboard error: {0}")]
    Dashboard(String),
}

/// Result type alias for vigilante operations
pub type Result<T> = std::result::Result<T, VigilanteError>;
