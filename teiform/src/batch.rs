//! Parallel batch processing of TEI files.
use std::{
  collections::HashMap,
  fs,
  path::{Path, PathBuf},
};

use color_eyre::eyre::{Context, Result, bail};
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use rayon::prelude::*;
use teiform_core::{
  DocumentMetadata,
  GoodXmlOptions,
  OutputMode,
  TeiProcessor,
  clean_document,
  processor::{collect_tei_files, process_tei_file},
};

/// A file to process and the root it was found under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
  pub root: PathBuf,
  pub path: PathBuf,
}

impl Input {
  /// Path of the file relative to its root.
  #[must_use]
  pub fn relative(&self) -> &Path {
    self.path.strip_prefix(&self.root).unwrap_or_else(|_| {
      Path::new(self.path.file_name().unwrap_or(self.path.as_os_str()))
    })
  }
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
  pub written:     Vec<PathBuf>,
  pub failed:      Vec<(PathBuf, String)>,
  pub diagnostics: usize,
}

impl BatchSummary {
  fn collect(
    results: Vec<(PathBuf, Result<(PathBuf, usize), String>)>,
  ) -> Self {
    let mut summary = Self::default();
    for (path, result) in results {
      match result {
        Ok((written, diagnostics)) => {
          summary.written.push(written);
          summary.diagnostics += diagnostics;
        },
        Err(message) => {
          error!("{}: {message}", path.display());
          summary.failed.push((path, message));
        },
      }
    }
    summary
  }

  /// Log the outcome and, when `strict`, fail if any file failed.
  ///
  /// # Errors
  ///
  /// Returns an error in strict mode when at least one file failed.
  pub fn finish(&self, strict: bool) -> Result<()> {
    let total = self.written.len() + self.failed.len();
    info!("Wrote {} of {} files", self.written.len(), total);
    if self.diagnostics > 0 {
      warn!("{} problems were reported, see above", self.diagnostics);
    }
    if !self.failed.is_empty() {
      warn!("{} files failed", self.failed.len());
      if strict {
        bail!("{} of {} files failed", self.failed.len(), total);
      }
    }
    Ok(())
  }
}

/// Expand files and directories into the `.xml` files to process.
///
/// # Errors
///
/// Returns an error if an input does not exist.
pub fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<Input>> {
  let mut files = Vec::new();
  for input in inputs {
    if input.is_dir() {
      files.extend(collect_tei_files(input).into_iter().map(|path| {
        Input {
          root: input.clone(),
          path,
        }
      }));
    } else if input.is_file() {
      files.push(Input {
        root: input.parent().map(Path::to_path_buf).unwrap_or_default(),
        path: input.clone(),
      });
    } else {
      bail!("Input does not exist: {}", input.display());
    }
  }
  Ok(files)
}

/// Output path for a rendered file: `<stem>_<mode>.<ext>`, mirroring the
/// input's folder below its root.
#[must_use]
pub fn output_path(output_dir: &Path, input: &Input, mode: OutputMode) -> PathBuf {
  let relative = input.relative();
  let stem = relative
    .file_stem()
    .map(|stem| stem.to_string_lossy().into_owned())
    .unwrap_or_default();
  let name = format!("{stem}_{}.{}", mode.as_str(), mode.extension());
  match relative.parent() {
    Some(parent) => output_dir.join(parent).join(name),
    None => output_dir.join(name),
  }
}

/// Read header metadata for downloadable TEI, keyed by file stem.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_document_metadata(
  path: &Path,
) -> Result<HashMap<String, DocumentMetadata>> {
  let content = fs::read_to_string(path)
    .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
  serde_json::from_str(content.trim_start_matches('\u{feff}'))
    .wrap_err_with(|| format!("Failed to parse {}", path.display()))
}

/// Progress bar for `len` files, hidden when `visible` is false.
#[must_use]
pub fn progress_bar(len: usize, visible: bool) -> ProgressBar {
  if !visible {
    return ProgressBar::hidden();
  }
  let bar = ProgressBar::new(u64::try_from(len).unwrap_or(u64::MAX));
  bar.set_style(
    ProgressStyle::with_template("{bar:40} {pos}/{len} {elapsed}")
      .unwrap_or_else(|_| ProgressStyle::default_bar()),
  );
  bar
}

fn write_output(path: &Path, content: &str) -> Result<(), String> {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).map_err(|e| {
      format!("Failed to create directory {}: {e}", parent.display())
    })?;
  }
  fs::write(path, content)
    .map_err(|e| format!("Failed to write {}: {e}", path.display()))
}

/// Render every input with one shared processor.
pub fn render_files(
  processor: &TeiProcessor,
  inputs: &[Input],
  output_dir: &Path,
  metadata: &HashMap<String, DocumentMetadata>,
  progress: &ProgressBar,
) -> BatchSummary {
  let mode = processor.options().mode;
  let results = inputs
    .par_iter()
    .progress_with(progress.clone())
    .map(|input| {
      let stem = input
        .path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
      let document_metadata = metadata.get(&stem);
      if mode == OutputMode::DownloadXml && document_metadata.is_none() {
        debug!("No header metadata for {stem}");
      }

      let result = process_tei_file(processor, &input.path, document_metadata)
        .and_then(|rendered| {
          for diagnostic in &rendered.diagnostics {
            warn!("{}: {diagnostic}", input.path.display());
          }
          let target = output_path(output_dir, input, mode);
          write_output(&target, &rendered.content)?;
          Ok((target, rendered.diagnostics.len()))
        });
      (input.path.clone(), result)
    })
    .collect();
  progress.finish_and_clear();

  BatchSummary::collect(results)
}

/// Clean every input, writing each under the same relative path in
/// `output_dir`.
pub fn tidy_files(
  options: &GoodXmlOptions,
  inputs: &[Input],
  output_dir: &Path,
  progress: &ProgressBar,
) -> BatchSummary {
  let results = inputs
    .par_iter()
    .progress_with(progress.clone())
    .map(|input| {
      let result = fs::read_to_string(&input.path)
        .map_err(|e| format!("Failed to read file: {e}"))
        .and_then(|source| {
          clean_document(&source, options).map_err(|e| e.to_string())
        })
        .and_then(|cleaned| {
          let target = output_dir.join(input.relative());
          write_output(&target, &cleaned)?;
          Ok((target, 0))
        });
      (input.path.clone(), result)
    })
    .collect();
  progress.finish_and_clear();

  BatchSummary::collect(results)
}
