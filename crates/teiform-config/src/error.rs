use std::{io, path::PathBuf};

use teiform_core::TransformError;
use thiserror::Error;

/// Error type for teiform-config operations
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Template error: {0}")]
  Template(String),

  #[error("Unsupported vocabulary version {found} (expected {expected})")]
  VocabularyVersion { found: u32, expected: u32 },

  #[error("Failed to load abbreviation dictionary from {}: {source}", path.display())]
  Dictionary {
    path:   PathBuf,
    #[source]
    source: TransformError,
  },

  #[error("I/O error: {0}")]
  Io(#[from] io::Error),

  #[error("JSON error: {0}")]
  Serde(#[from] serde_json::Error),

  #[error("TOML error: {0}")]
  Toml(#[from] toml::de::Error),
}
