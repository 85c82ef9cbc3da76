//! Content length and printed page estimates.
use kuchikikiki::{NodeRef, iter::NodeIterator};
use serde::{Deserialize, Serialize};

use crate::{
  error::TransformResultOf,
  tree::{self, Tag},
};

/// Characters, spaces included, assumed to fit on one printed page.
pub const CHARS_PER_PAGE: usize = 2500;

/// Length of a document's transcribed text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentMeasure {
  /// Visible characters. Zero means the text is not transcribed yet.
  pub content_length: usize,

  /// Estimated printed pages, rounded to one decimal.
  pub pages: f64,
}

impl ContentMeasure {
  #[must_use]
  pub fn from_length(content_length: usize) -> Self {
    Self {
      content_length,
      pages: estimated_pages(content_length),
    }
  }

  #[must_use]
  pub const fn is_untranscribed(&self) -> bool {
    self.content_length == 0
  }
}

/// Visible character count of a subtree.
///
/// Every text node is trimmed, empty ones are skipped and the rest are
/// joined with single spaces.
#[must_use]
pub fn content_length(node: &NodeRef) -> usize {
  let mut length = 0;
  let mut first = true;
  for text in node.inclusive_descendants().text_nodes() {
    let text = text.borrow();
    let trimmed = text.trim();
    if trimmed.is_empty() {
      continue;
    }
    if !first {
      length += 1;
    }
    first = false;
    length += trimmed.chars().count();
  }
  length
}

/// Estimated printed pages for a content length, rounded to one decimal.
#[must_use]
#[allow(
  clippy::cast_precision_loss,
  reason = "Edition texts are far below 2^52 characters"
)]
pub fn estimated_pages(content_length: usize) -> f64 {
  let pages = content_length as f64 / CHARS_PER_PAGE as f64;
  // Formatting rounds the exact binary value, so a quotient stored just
  // below a half rounds down.
  format!("{pages:.1}").parse().unwrap_or(pages)
}

/// Measure the first division of a source document's body.
///
/// # Errors
///
/// Returns an error if the document cannot be parsed.
pub fn measure_document(source: &str) -> TransformResultOf<ContentMeasure> {
  let document = tree::parse_document(source)?;
  let division = tree::first_element_named(&document, "body")
    .and_then(|body| tree::first_element_named(&body, Tag::Division.name()));
  let length = division.as_ref().map_or(0, content_length);
  Ok(ContentMeasure::from_length(length))
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Tests can unwrap")]
  #![allow(clippy::float_cmp, reason = "Rounded values compare exactly")]
  use super::*;

  #[test]
  fn test_page_estimate() {
    assert_eq!(estimated_pages(4714), 1.9);
    assert_eq!(estimated_pages(2500), 1.0);
    assert_eq!(estimated_pages(375), 0.1);
    assert_eq!(estimated_pages(0), 0.0);
  }

  #[test]
  fn test_content_length_joins_text_nodes() {
    let document = tree::parse_document(
      "<div type=\"letter\">\n  <p>Bäste  bror,</p>\n  <p><hi>Helsingfors</hi> den 1</p>\n</div>",
    )
    .unwrap();
    // "Bäste  bror," + " " + "Helsingfors" + " " + "den 1"
    assert_eq!(content_length(&document), 12 + 1 + 11 + 1 + 5);
  }

  #[test]
  fn test_empty_division_measures_zero() {
    let measure = measure_document(
      "<TEI><text><body><div type=\"letter\">\n<p> </p>\n</div></body></text></TEI>",
    )
    .unwrap();
    assert!(measure.is_untranscribed());
    assert_eq!(measure.pages, 0.0);
  }

  #[test]
  fn test_document_without_division() {
    let measure = measure_document("<TEI><text><body/></text></TEI>").unwrap();
    assert_eq!(measure, ContentMeasure::default());
  }
}
