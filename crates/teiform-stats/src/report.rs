//! The statistics report set for one collection.
use std::{
  fs::{self, File},
  io::{self, BufWriter},
  path::{Path, PathBuf},
};

use crate::{
  error::StatsResult,
  pivot::{self, Table},
  record::PublicationRecord,
};

/// Column names of the per-file sheet.
pub const RECORD_COLUMNS: [&str; 14] = [
  "id",
  "grupp",
  "språk",
  "datum",
  "titel",
  "teckenmängd",
  "tryckta_sidor",
  "genre",
  "undermapp",
  "korrespondent",
  "översättare",
  "bildantal",
  "länk",
  "fil",
];

/// Sorted records of one collection and the tables derived from them.
#[derive(Debug, Clone, Default)]
pub struct StatsReport {
  records: Vec<PublicationRecord>,
}

impl StatsReport {
  /// Collect records in canonical order.
  #[must_use]
  pub fn new(mut records: Vec<PublicationRecord>) -> Self {
    records.sort_by(PublicationRecord::sort_cmp);
    Self { records }
  }

  #[must_use]
  pub fn records(&self) -> &[PublicationRecord] {
    &self.records
  }

  /// Records whose file has no transcribed text yet.
  pub fn untranscribed(&self) -> impl Iterator<Item = &PublicationRecord> {
    self
      .records
      .iter()
      .filter(|record| record.measure.is_untranscribed())
  }

  #[must_use]
  pub fn pages_per_genre(&self) -> Table {
    pivot::pages_per_genre(&self.records)
  }

  #[must_use]
  pub fn pages_per_language(&self) -> Table {
    pivot::pages_per_language(&self.records)
  }

  #[must_use]
  pub fn pages_per_correspondent(&self) -> Option<Table> {
    pivot::pages_per_correspondent(&self.records)
  }

  /// Write one CSV row per record.
  ///
  /// # Errors
  ///
  /// Returns an error if writing fails.
  pub fn write_records_csv<W: io::Write>(&self, writer: W) -> StatsResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(RECORD_COLUMNS)?;

    for record in &self.records {
      writer.write_record([
        record.publication_id.to_string(),
        record.group_id.to_string(),
        record.language.clone(),
        record.date.clone().unwrap_or_default(),
        record.title.clone(),
        record.measure.content_length.to_string(),
        format!("{:.1}", record.measure.pages),
        record.location.main_folder.clone(),
        record.location.subfolder.clone().unwrap_or_default(),
        record.location.correspondent.clone().unwrap_or_default(),
        record.translators.clone(),
        record.images.map(|count| count.to_string()).unwrap_or_default(),
        record.url.clone(),
        record.location.file_path.clone(),
      ])?;
    }

    writer.flush()?;
    Ok(())
  }

  /// Write the report set for a collection into `dir`:
  /// `utg_<id>.csv` with one row per file, and one CSV per summary table.
  ///
  /// # Returns
  ///
  /// The paths written, records first.
  ///
  /// # Errors
  ///
  /// Returns an error if the directory cannot be created or a file cannot be
  /// written.
  pub fn write_all(
    &self,
    dir: &Path,
    collection_id: u32,
  ) -> StatsResult<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let stem = format!("utg_{collection_id}");
    let records_path = dir.join(format!("{stem}.csv"));
    self.write_records_csv(BufWriter::new(File::create(&records_path)?))?;

    let mut written = vec![records_path];
    let mut tables = vec![
      ("sidor_per_genre", self.pages_per_genre()),
      ("sidor_per_sprak", self.pages_per_language()),
    ];
    if let Some(table) = self.pages_per_correspondent() {
      tables.push(("sidor_per_korrespondent", table));
    }

    for (name, table) in tables {
      let path = dir.join(format!("{stem}_{name}.csv"));
      table.write_csv(BufWriter::new(File::create(&path)?))?;
      log::debug!("Wrote {}", path.display());
      written.push(path);
    }

    Ok(written)
  }
}
