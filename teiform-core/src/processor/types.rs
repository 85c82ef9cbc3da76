//! Type definitions for the TEI processor.
//!
//! # Examples
//!
//! ```
//! use teiform_core::{Language, OutputMode, TeiProcessor, TransformOptions};
//!
//! let options = TransformOptions {
//!   mode: OutputMode::Manuscript,
//!   language: Language::Finnish,
//!   ..Default::default()
//! };
//!
//! let processor = TeiProcessor::new(options);
//! ```
use indexmap::IndexMap;

use crate::types::{Language, OutputMode};

/// Numeric offset added to footnote identifiers of the offset language.
pub const DEFAULT_PAIRED_LANGUAGE_OFFSET: u32 = 500;

/// Heading used for a footnote list when the language has none configured.
pub const FALLBACK_NOTE_HEADING: &str = "Notes";

/// Publisher named in the header of downloadable TEI.
pub const DEFAULT_PUBLISHER: &str = "Leo Mechelin – Pro lege";

/// Options for configuring the TEI processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOptions {
  /// Which rendition to produce.
  pub mode: OutputMode,

  /// Language of the text being transformed.
  pub language: Language,

  /// Added to footnote numbers of [`Self::offset_language`] texts in the
  /// reading-text rendition, so that two language versions can be shown
  /// side by side without their tooltips clashing.
  pub paired_language_offset: u32,

  /// The language whose footnote identifiers are offset.
  pub offset_language: Language,

  /// Footnote list headings keyed by language code.
  pub note_headings: IndexMap<String, String>,

  /// Publisher written into the downloadable TEI header.
  pub publisher: String,
}

impl TransformOptions {
  /// Heading for the footnote list of the configured language.
  #[must_use]
  pub fn note_heading(&self) -> &str {
    self
      .note_headings
      .get(self.language.code())
      .map_or(FALLBACK_NOTE_HEADING, String::as_str)
  }

  /// Whether footnote identifiers of this run are offset.
  #[must_use]
  pub fn offsets_footnotes(&self) -> bool {
    self.mode == OutputMode::Est
      && self.language == self.offset_language
      && self.paired_language_offset > 0
  }
}

/// Built-in footnote list headings.
#[must_use]
pub fn default_note_headings() -> IndexMap<String, String> {
  IndexMap::from([
    ("sv".to_string(), "Noter".to_string()),
    ("fi".to_string(), "Viitteet".to_string()),
  ])
}

impl Default for TransformOptions {
  fn default() -> Self {
    Self {
      mode:                   OutputMode::Est,
      language:               Language::Swedish,
      paired_language_offset: DEFAULT_PAIRED_LANGUAGE_OFFSET,
      offset_language:        Language::Finnish,
      note_headings:          default_note_headings(),
      publisher:              DEFAULT_PUBLISHER.to_string(),
    }
  }
}

/// Main TEI processor.
///
/// Holds only immutable configuration, so one processor can be shared
/// across threads while each call owns its document tree.
#[derive(Debug, Clone)]
pub struct TeiProcessor {
  pub(crate) options: TransformOptions,
}

/// Builder for constructing `TransformOptions` with method chaining.
#[derive(Debug, Clone)]
pub struct TransformOptionsBuilder {
  options: TransformOptions,
}

impl TransformOptionsBuilder {
  /// Create a new builder with default options.
  #[must_use]
  pub fn new() -> Self {
    Self {
      options: TransformOptions::default(),
    }
  }

  #[must_use]
  pub const fn mode(mut self, mode: OutputMode) -> Self {
    self.options.mode = mode;
    self
  }

  #[must_use]
  pub fn language<L: Into<Language>>(mut self, language: L) -> Self {
    self.options.language = language.into();
    self
  }

  /// Set the footnote offset for paired-language rendering.
  #[must_use]
  pub const fn paired_language_offset(mut self, offset: u32) -> Self {
    self.options.paired_language_offset = offset;
    self
  }

  #[must_use]
  pub fn offset_language<L: Into<Language>>(mut self, language: L) -> Self {
    self.options.offset_language = language.into();
    self
  }

  /// Add or replace footnote list headings. Built-in headings for other
  /// languages are kept.
  #[must_use]
  pub fn note_headings<I, K, V>(mut self, headings: I) -> Self
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
  {
    for (language, heading) in headings {
      self
        .options
        .note_headings
        .insert(language.into(), heading.into());
    }
    self
  }

  #[must_use]
  pub fn publisher<S: Into<String>>(mut self, publisher: S) -> Self {
    self.options.publisher = publisher.into();
    self
  }

  /// Build the final `TransformOptions`.
  #[must_use]
  pub fn build(self) -> TransformOptions {
    self.options
  }
}

impl Default for TransformOptionsBuilder {
  fn default() -> Self {
    Self::new()
  }
}
