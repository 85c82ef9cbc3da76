//! The `stats` command: measure every file of a collection and export the
//! report set.
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, Result};
use indicatif::{ParallelProgressIterator, ProgressBar};
use log::{info, warn};
use rayon::prelude::*;
use teiform_core::{measure_document, processor::collect_tei_files};
use teiform_stats::{
  MetadataStore,
  PublicationRecord,
  StatsError,
  StatsReport,
  build_record,
  classify_file,
  publication_url,
};

/// Settings for one statistics run.
#[derive(Debug, Clone)]
pub struct StatsRun<'a> {
  pub root:          &'a Path,
  pub collection_id: u32,
  pub url_template:  &'a str,
}

/// Report directory for the current month, `Rapport_<MM>_<YYYY>`.
#[must_use]
pub fn monthly_report_dir(output_dir: &Path) -> PathBuf {
  let month = jiff::Zoned::now().strftime("%m_%Y").to_string();
  output_dir.join(format!("Rapport_{month}"))
}

fn record_for(
  run: &StatsRun<'_>,
  store: &MetadataStore,
  path: &Path,
) -> Result<PublicationRecord, StatsError> {
  let (location, publication_id, language) = classify_file(path, run.root)?;
  let metadata = store.get(publication_id)?;
  let source = std::fs::read_to_string(path)?;
  let measure =
    measure_document(&source).map_err(|source| StatsError::Measure {
      path: path.to_path_buf(),
      source,
    })?;
  let url =
    publication_url(run.url_template, run.collection_id, publication_id);

  Ok(build_record(
    location,
    publication_id,
    &language,
    metadata,
    measure,
    url,
  ))
}

/// Build the report for every `.xml` file below the collection root.
/// Files that cannot be classified or measured are logged and left out.
#[must_use]
pub fn collect_report(
  run: &StatsRun<'_>,
  store: &MetadataStore,
  progress: &ProgressBar,
) -> StatsReport {
  let files = collect_tei_files(run.root);
  progress.set_length(u64::try_from(files.len()).unwrap_or(u64::MAX));

  let records: Vec<_> = files
    .par_iter()
    .progress_with(progress.clone())
    .filter_map(|path| {
      record_for(run, store, path)
        .inspect_err(|e| warn!("Skipping {}: {e}", path.display()))
        .ok()
    })
    .collect();
  progress.finish_and_clear();

  if records.len() < files.len() {
    warn!("{} of {} files were skipped", files.len() - records.len(), files.len());
  }

  StatsReport::new(records)
}

/// Run the statistics command end to end.
///
/// # Errors
///
/// Returns an error if the metadata cannot be loaded or a report cannot be
/// written.
pub fn run_stats(
  run: &StatsRun<'_>,
  metadata_file: &Path,
  output_dir: &Path,
  progress: &ProgressBar,
) -> Result<Vec<PathBuf>> {
  let store = MetadataStore::load(metadata_file).wrap_err_with(|| {
    format!("Failed to load metadata from {}", metadata_file.display())
  })?;
  info!("Loaded {} metadata records", store.len());

  let report = collect_report(run, &store, progress);
  let untranscribed = report.untranscribed().count();
  info!(
    "Measured {} files, {} without transcribed text",
    report.records().len(),
    untranscribed
  );

  report
    .write_all(output_dir, run.collection_id)
    .wrap_err_with(|| format!("Failed to write reports to {}", output_dir.display()))
}
