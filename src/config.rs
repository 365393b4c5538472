use serde::Deserialize;

use crate::error::ConfigError;

/// Options passed to the plugin from the host's `jsc.experimental.plugins` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Written into `__source.fileName` instead of the name reported by the host.
    #[serde(default)]
    pub file_name: Option<String>,
}

impl Config {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: serde_json::Value = serde_json::from_str(raw)?;
        let kind = match &value {
            serde_json::Value::Object(_) => return Ok(serde_json::from_value(value)?),
            // hosts send `null` when the plugin is listed without options
            serde_json::Value::Null => return Ok(Self::default()),
            serde_json::Value::Bool(_) => "a boolean",
            serde_json::Value::Number(_) => "a number",
            serde_json::Value::String(_) => "a string",
            serde_json::Value::Array(_) => "an array",
        };
        Err(ConfigError::NotAnObject(kind))
    }
}
