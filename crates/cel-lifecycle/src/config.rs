//! Engine Configuration

use serde::Deserialize;

use crate::Result;

/// Engine configuration options
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Elements carrying this attribute (and everything below them) are
    /// never initialized
    pub ignore_attribute: String,

    /// Attribute set on an element once `created` and `render` have run.
    /// `None` disables it.
    pub defined_attribute: Option<String>,

    /// Start the document observer when the engine is attached
    pub observe_on_attach: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ignore_attribute: "data-cel-ignore".to_string(),
            defined_attribute: Some("defined".to_string()),
            observe_on_attach: true,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON configuration; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
