use thiserror::Error;

/// Raised when the plugin options handed over by the host cannot be read.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("plugin config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("plugin config must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}
