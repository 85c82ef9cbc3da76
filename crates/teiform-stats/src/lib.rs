//! Edition statistics: one record per TEI file with its transcribed length,
//! estimated printed pages and bibliographic metadata, plus the summary
//! tables editors use to track what remains to be transcribed and
//! translated.
//!
//! Records are built per file with [`build_record`], collected into a
//! [`StatsReport`] and written as a set of CSV files.
pub mod classify;
pub mod error;
pub mod metadata;
pub mod pivot;
pub mod record;
pub mod report;

pub use crate::{
  classify::{FileLocation, classify_file},
  error::{StatsError, StatsResult},
  metadata::{MetadataStore, PublicationMetadata},
  pivot::Table,
  record::{ImageCount, PublicationRecord, build_record, publication_url},
  report::StatsReport,
};
