//! File-level processing with error recovery.
use std::{
  fs,
  panic::{AssertUnwindSafe, catch_unwind},
  path::{Path, PathBuf},
};

use log::{error, trace};
use walkdir::WalkDir;

use super::types::TeiProcessor;
use crate::types::{DocumentMetadata, TransformResult};

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
  payload
    .downcast_ref::<String>()
    .cloned()
    .or_else(|| payload.downcast_ref::<&str>().map(ToString::to_string))
    .unwrap_or_else(|| "unknown panic".to_string())
}

/// Render a document, turning both errors and panics into messages.
///
/// Panics are logged and reported as an `Err` for this one input.
///
/// # Arguments
///
/// * `processor` - The configured TEI processor
/// * `content` - Raw source XML
/// * `metadata` - Bibliographic data for the download header, if any
///
/// # Errors
///
/// Returns a message if the source cannot be parsed or rendering panicked.
pub fn process_with_recovery(
  processor: &TeiProcessor,
  content: &str,
  metadata: Option<&DocumentMetadata>,
) -> Result<TransformResult, String> {
  match catch_unwind(AssertUnwindSafe(|| {
    processor.render_with_metadata(content, metadata)
  })) {
    Ok(Ok(result)) => Ok(result),
    Ok(Err(e)) => Err(e.to_string()),
    Err(panic_err) => {
      let message = panic_message(panic_err.as_ref());
      error!("Panic during TEI processing: {message}");
      Err(format!("Critical error processing document: {message}"))
    },
  }
}

/// Read and render one TEI file.
///
/// # Errors
///
/// Returns an error message if the file cannot be read or rendered.
pub fn process_tei_file(
  processor: &TeiProcessor,
  file_path: &Path,
  metadata: Option<&DocumentMetadata>,
) -> Result<TransformResult, String> {
  let content = fs::read_to_string(file_path).map_err(|e| {
    format!("Failed to read file {}: {}", file_path.display(), e)
  })?;
  process_with_recovery(processor, &content, metadata)
}

/// Collect all `.xml` files under a directory, sorted by path.
#[must_use]
pub fn collect_tei_files(input_dir: &Path) -> Vec<PathBuf> {
  let mut files: Vec<PathBuf> = WalkDir::new(input_dir)
    .follow_links(true)
    .into_iter()
    .filter_map(Result::ok)
    .filter(|entry| {
      entry.file_type().is_file()
        && entry.path().extension().is_some_and(|ext| ext == "xml")
    })
    .map(walkdir::DirEntry::into_path)
    .collect();
  files.sort();

  trace!("Found {} TEI files to process", files.len());
  files
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Tests can unwrap")]
  use super::*;
  use crate::{
    processor::TransformOptionsBuilder,
    types::{OutputMode, TextKind},
  };

  fn processor(mode: OutputMode) -> TeiProcessor {
    TeiProcessor::new(
      TransformOptionsBuilder::new().mode(mode).language("sv").build(),
    )
  }

  const LETTER: &str = r#"<TEI><teiHeader><title>Brev</title></teiHeader><text><body><div type="letter"><p>Bäste bror!</p></div></body></text></TEI>"#;

  #[test]
  fn test_malformed_document_is_an_error() {
    let processor = processor(OutputMode::Est);
    let result = process_with_recovery(&processor, "<TEI><body><p>", None);
    assert!(result.is_err());
  }

  #[test]
  fn test_collect_tei_files() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("Brev").join("Agathe");
    fs::create_dir_all(&nested).unwrap();
    fs::write(nested.join("1880_05_02_sv_12.xml"), LETTER).unwrap();
    fs::write(dir.path().join("notes.txt"), "x").unwrap();
    fs::write(dir.path().join("a_fi_3.xml"), LETTER).unwrap();

    let files = collect_tei_files(dir.path());
    assert_eq!(files.len(), 2);
    assert!(files[0].ends_with("Brev/Agathe/1880_05_02_sv_12.xml"));
    assert!(files[1].ends_with("a_fi_3.xml"));
  }

  #[test]
  fn test_process_tei_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("letter_sv_1.xml");
    fs::write(&path, LETTER).unwrap();

    let processor = processor(OutputMode::DownloadTxt(TextKind::Established));
    let result = process_tei_file(&processor, &path, None).unwrap();
    assert_eq!(result.content, "Bäste bror!");

    let missing = process_tei_file(&processor, &dir.path().join("nope.xml"), None);
    assert!(missing.is_err());
  }
}
