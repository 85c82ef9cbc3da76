//! Error types for the transformation pipeline.
use std::io;

/// Errors raised while turning a source document into one of its renditions.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
  #[error("XML parse error at byte {position}: {source}")]
  Xml {
    position: u64,
    #[source]
    source:   quick_xml::Error,
  },

  #[error("Unbalanced markup: {0}")]
  Unbalanced(String),

  #[error("Document has no <{0}> element")]
  MissingElement(&'static str),

  #[error("I/O error: {0}")]
  Io(#[from] io::Error),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

/// Result type for transformation operations.
pub type TransformResultOf<T> = Result<T, TransformError>;
