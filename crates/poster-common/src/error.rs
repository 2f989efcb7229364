//! Error types for the route poster crates.

use thiserror::Error;

/// Result type alias using PosterError.
pub type PosterResult<T> = Result<T, PosterError>;

/// Primary error type for poster rendering.
///
/// Degenerate input data (empty routes, single points, zero-extent boxes) is
/// never reported through this type; those cases have well-defined fallbacks.
#[derive(Debug, Error)]
pub enum PosterError {
    // === Caller contract violations ===
    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Invalid route: {0}")]
    InvalidRoute(String),

    #[error("Invalid style: {0}")]
    InvalidStyle(String),

    // === Rendering errors ===
    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    // === External collaborators ===
    #[error("Basemap unavailable: {0}")]
    Basemap(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Render cancelled")]
    Cancelled,
}

impl PosterError {
    /// Shorthand for an [`PosterError::InvalidParameter`].
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        PosterError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Whether the failure came from an external dependency and should degrade
    /// the render instead of aborting it.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PosterError::Basemap(_) | PosterError::Cache(_) | PosterError::Io(_)
        )
    }
}

impl From<std::io::Error> for PosterError {
    fn from(err: std::io::Error) -> Self {
        PosterError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PosterError {
    fn from(err: serde_json::Error) -> Self {
        PosterError::Config(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for PosterError {
    fn from(err: serde_yaml::Error) -> Self {
        PosterError::Config(format!("YAML error: {}", err))
    }
}
