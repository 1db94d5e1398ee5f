//! Error types for the onboarding console.

/// Top-level error type for the console core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("View error: {0}")]
    View(#[from] ViewError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Record-store errors, one variant per failure class.
///
/// `Protocol` carries the backend's own message verbatim; everything the
/// operator should read comes through that variant. `Validation` fires
/// before any request is issued.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server error: HTTP {status}")]
    Server { status: u16 },

    #[error("{message}")]
    Protocol { message: String },

    #[error("Invalid response body: {0}")]
    Decode(String),

    #[error("Validation failed: {0}")]
    Validation(String),
}

impl StoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}

/// View-layer errors.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("Access denied: operator role is not elevated")]
    AccessDenied,

    #[error("Stage {stage} is not accessible for record {record_id}")]
    StageGated { stage: u8, record_id: String },

    #[error("No record is currently open")]
    NoCurrentRecord,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias for the console core.
pub type Result<T> = std::result::Result<T, Error>;
