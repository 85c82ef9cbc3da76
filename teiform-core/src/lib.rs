//! # teiform-core - Renditions of TEI transcriptions for digital editions
//!
//! Turns the TEI source of an edited document into the forms a digital
//! edition publishes it in: reading-text HTML, diplomatic and normalized
//! manuscript HTML, downloadable TEI with a generated header and plain
//! text.
//!
//! ## Quick Start
//!
//! ```rust
//! use teiform_core::{OutputMode, TeiProcessor, TransformOptions};
//!
//! let processor = TeiProcessor::new(TransformOptions::default());
//! let result = processor
//!   .render(r#"<TEI><teiHeader><title>Brev</title></teiHeader><text><body><div type="letter"><p>Bäste bror!</p></div></body></text></TEI>"#)
//!   .unwrap();
//!
//! assert_eq!(result.title.as_deref(), Some("Brev"));
//! assert!(result.content.contains("Bäste bror!"));
//! ```
//!
//! ## Pipeline
//!
//! 1. [`normalize`] repairs character-level problems in the raw source.
//! 2. [`tree`] parses it into a mutable node tree.
//! 3. The [`processor`] rewrites the tree following the rule table of the
//!    selected [`OutputMode`], relocating footnotes through [`footnotes`].
//! 4. The tree is serialized and [`tidy`] settles whitespace and
//!    punctuation.
//!
//! Alongside the renditions, [`estimate`] measures transcribed text,
//! [`good_xml`] converts OCR exports into the project's source format and
//! [`abbreviations`] maintains the dictionary used to expand abbreviations.
//!
//! ## Configuration
//!
//! ```rust
//! use teiform_core::{Language, OutputMode, TeiProcessor, TransformOptionsBuilder};
//!
//! let options = TransformOptionsBuilder::new()
//!   .mode(OutputMode::Est)
//!   .language(Language::Finnish)
//!   .paired_language_offset(500)
//!   .build();
//!
//! let processor = TeiProcessor::new(options);
//! ```
pub mod abbreviations;
pub mod error;
pub mod estimate;
pub mod footnotes;
pub mod good_xml;
pub mod header;
pub mod normalize;
pub mod processor;
pub mod tidy;
pub mod tree;
mod types;
pub mod utils;

pub use crate::{
  abbreviations::AbbreviationDictionary,
  error::{TransformError, TransformResultOf},
  estimate::{CHARS_PER_PAGE, ContentMeasure, measure_document},
  good_xml::{DocumentType, GoodXmlOptions, OcrVocabulary, clean_document},
  processor::{TeiProcessor, TransformOptions, TransformOptionsBuilder},
  types::{
    Diagnostic,
    DivisionType,
    DocumentMetadata,
    Language,
    OutputMode,
    TextKind,
    TransformResult,
    Translation,
  },
};
