//! Recommendation tuning configuration.
//!
//! # Responsibility
//! - Hold the knobs passed to the text-generation provider.
//! - Validate them before any provider call.
//!
//! Grid geometry and the 50-character display limit are fixed constants in
//! `grid`, not configuration.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Provider and request-validation settings for recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendConfig {
    /// Provider model name.
    /// Default: `gpt-4o-mini`.
    pub model: String,

    /// Sampling temperature, `[0, 2]`.
    /// Default: 0.7.
    pub temperature: f32,

    /// Upper bound on generated tokens.
    /// Default: 2000.
    pub max_tokens: u32,

    /// Minimum trimmed objective length, in characters.
    /// Default: 5.
    pub min_objective_chars: usize,

    /// Language the generated goals should be written in.
    /// Default: `Korean`.
    pub language: String,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            min_objective_chars: 5,
            language: "Korean".to_string(),
        }
    }
}

impl RecommendConfig {
    /// Validates configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model must not be blank".to_string()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Invalid(format!(
                "temperature must be in [0, 2], got {}",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::Invalid("max_tokens must be > 0".to_string()));
        }
        if self.language.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "language must not be blank".to_string(),
            ));
        }
        Ok(())
    }

    /// Loads from a JSON string; missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|err| ConfigError::Parse(format!("JSON parse error: {err}")))?;
        config.validate()?;
        Ok(config)
    }
}

/// Configuration load/validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Parse(String),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "config parse error: {message}"),
            Self::Invalid(message) => write!(f, "config error: {message}"),
        }
    }
}

impl Error for ConfigError {}
