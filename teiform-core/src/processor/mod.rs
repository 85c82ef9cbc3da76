//! TEI processing module.
//!
//! # Architecture
//!
//! - [`core`]: The processor, its rendering pipeline and the rewrite engine
//! - [`rules`]: Rule tables keyed by element and output mode
//! - [`context`]: Structural context captured before rewriting
//! - [`process`]: File-level processing with error recovery
//! - [`types`]: Options and the processor type
//!
//! The transforms the rule tables delegate to live in private `structure`
//! and `inline` modules.
pub mod context;
pub mod core;
mod inline;
pub mod process;
pub mod rules;
mod structure;
pub mod types;

pub use context::{RewriteContext, Target, collect_targets};
pub use process::{collect_tei_files, process_tei_file, process_with_recovery};
pub use rules::{Rule, Transform, pass_order, rule_for};
pub use types::{
  DEFAULT_PAIRED_LANGUAGE_OFFSET,
  DEFAULT_PUBLISHER,
  FALLBACK_NOTE_HEADING,
  TeiProcessor,
  TransformOptions,
  TransformOptionsBuilder,
  default_note_headings,
};
