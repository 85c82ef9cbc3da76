//! Loading the OCR style vocabulary used by `tidy`.
//!
//! The vocabulary is a TOML table keyed by the style names the conversion
//! tool writes into `rend` attributes. Every table carries a `version`;
//! tables of any other version are rejected.
use std::{fs, path::Path};

use teiform_core::good_xml::{OcrVocabulary, VOCABULARY_VERSION};

use crate::error::ConfigError;

/// Read a vocabulary table from a TOML file.
///
/// Sections missing from the file keep their built-in entries.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if its version
/// differs from [`VOCABULARY_VERSION`].
pub fn load_vocabulary(path: &Path) -> Result<OcrVocabulary, ConfigError> {
  let content = fs::read_to_string(path).map_err(|e| {
    ConfigError::Config(format!(
      "Failed to read OCR vocabulary: {}: {}",
      path.display(),
      e
    ))
  })?;

  parse_vocabulary(&content).map_err(|e| {
    ConfigError::Config(format!(
      "Invalid OCR vocabulary {}: {}",
      path.display(),
      e
    ))
  })
}

/// Parse a vocabulary table from TOML text.
///
/// # Errors
///
/// Returns an error if the text is not a vocabulary table of the current
/// version.
pub fn parse_vocabulary(content: &str) -> Result<OcrVocabulary, ConfigError> {
  let mut vocabulary: OcrVocabulary = toml::from_str(content)?;

  // A file without a version key deserializes to the default version, so
  // check for the key itself.
  let table: toml::Table = toml::from_str(content)?;
  if !table.contains_key("version") {
    vocabulary.version = 0;
  }

  if vocabulary.version != VOCABULARY_VERSION {
    return Err(ConfigError::VocabularyVersion {
      found:    vocabulary.version,
      expected: VOCABULARY_VERSION,
    });
  }

  Ok(vocabulary)
}

/// Write the built-in vocabulary to `path` as a starting point for edits.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_default_vocabulary(path: &Path) -> Result<(), ConfigError> {
  let content = toml::to_string_pretty(&OcrVocabulary::default())
    .map_err(|e| ConfigError::Config(format!("Failed to serialize: {e}")))?;

  fs::write(path, content).map_err(|e| {
    ConfigError::Config(format!(
      "Failed to write OCR vocabulary to {}: {}",
      path.display(),
      e
    ))
  })?;

  log::info!("Created OCR vocabulary file: {}", path.display());
  Ok(())
}
