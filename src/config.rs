//! Engine configuration
//!
//! Loaded from YAML; every field has a default so an empty file (or no file)
//! yields a working engine.
//!
//! ```yaml
//! review_threshold: 20
//! target_redundancy: 3
//! author_policy: on_span
//! ```

use crate::corpus::{ValidationError, MAX_CONFIDENCE};
use crate::labeling::AuthorPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Tunables of the task engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sentences below this confidence are offered to admins for paragraph review
    pub review_threshold: u8,
    /// Number of annotations a sentence should collect
    pub target_redundancy: u32,
    /// Which author indices survive consensus
    pub author_policy: AuthorPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            review_threshold: 20,
            target_redundancy: 3,
            author_policy: AuthorPolicy::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yaml reads an empty document as unit, not as an empty map
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.review_threshold > MAX_CONFIDENCE {
            return Err(ValidationError::Config(format!(
                "review_threshold {} exceeds {}",
                self.review_threshold, MAX_CONFIDENCE
            )));
        }
        if self.target_redundancy == 0 {
            return Err(ValidationError::Config(
                "target_redundancy must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
