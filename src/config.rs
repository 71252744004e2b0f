//! Handler configuration
//!
//! Defaults serve every path (`/**`) from `static/`, read the override from
//! `lang`, fall back to `en`, and leave resolution caching off.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{ResolveError, Result};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    /// URL pattern the handler answers, e.g. `/**` or `/assets/**`.
    #[serde(default = "default_pattern")]
    pub pattern: String,
    /// Base locations searched in order.
    #[serde(default = "default_locations")]
    pub locations: Vec<String>,
    #[serde(default = "default_fallback_language")]
    pub fallback_language: String,
    #[serde(default = "default_language_parameter")]
    pub language_parameter: String,
    /// Memoize successful resolutions.
    #[serde(default)]
    pub cache: bool,
}

fn default_pattern() -> String {
    "/**".to_string()
}

fn default_locations() -> Vec<String> {
    vec!["static/".to_string()]
}

fn default_fallback_language() -> String {
    "en".to_string()
}

fn default_language_parameter() -> String {
    "lang".to_string()
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            pattern: default_pattern(),
            locations: default_locations(),
            fallback_language: default_fallback_language(),
            language_parameter: default_language_parameter(),
            cache: false,
        }
    }
}

impl HandlerConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ResolveError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: HandlerConfig =
            serde_json::from_str(content).map_err(|e| ResolveError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.pattern.starts_with('/') {
            return Err(ResolveError::Config(format!(
                "pattern {:?} must start with '/'",
                self.pattern
            )));
        }

        if self.locations.is_empty() {
            return Err(ResolveError::Config("no locations configured".to_string()));
        }

        if self.fallback_language.is_empty() {
            return Err(ResolveError::Config("fallback language is empty".to_string()));
        }

        if self.language_parameter.is_empty() {
            return Err(ResolveError::Config("language parameter is empty".to_string()));
        }

        Ok(())
    }
}
