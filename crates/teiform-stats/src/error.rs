use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors raised while building or exporting statistics.
#[derive(Debug, Error)]
pub enum StatsError {
  /// The file stem does not end in `<language>_<publication id>`.
  #[error("File name does not match <language>_<id>: {path}")]
  Filename { path: PathBuf },

  /// The file is not below the collection root.
  #[error("{path} is outside the collection root {root}")]
  OutsideRoot { path: PathBuf, root: PathBuf },

  /// No metadata record exists for the publication.
  #[error("No metadata for publication {publication_id}")]
  MissingMetadata { publication_id: u32 },

  #[error("Failed to measure {path}: {source}")]
  Measure {
    path:   PathBuf,
    #[source]
    source: teiform_core::TransformError,
  },

  #[error("CSV error: {0}")]
  Csv(#[from] csv::Error),

  #[error("I/O error: {0}")]
  Io(#[from] io::Error),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type StatsResult<T> = Result<T, StatsError>;
