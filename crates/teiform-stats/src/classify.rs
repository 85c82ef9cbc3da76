//! Classification of source files by name and location.
use std::{
  path::{Component, Path},
  sync::LazyLock,
};

use regex::Regex;
use serde::Serialize;
use teiform_core::utils::compile_regex;

use crate::error::{StatsError, StatsResult};

static FILE_STEM: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"(\w{2})_(\d+)$", "FILE_STEM"));

/// Main folders whose first subfolder is part of the classification.
pub const SUBFOLDER_GENRES: &[&str] =
  &["Brev", "Artiklar", "Lantdagen", "Verk", "Forelasningar"];

/// Main folder holding letters, sorted by correspondent.
pub const LETTERS: &str = "Brev";

/// Where a file sits in a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileLocation {
  /// First folder below the collection root, used as the genre.
  pub main_folder:   String,
  pub subfolder:     Option<String>,
  /// Correspondent folder of a letter.
  pub correspondent: Option<String>,
  /// Path from the collection's parent folder, with forward slashes.
  pub file_path:     String,
}

/// Classify a file below `root`.
///
/// The stem must end in `<language>_<publication id>`, e.g.
/// `brev_till_bror_sv_1012`. Returns the location, the publication id and
/// the two-letter language of the file.
///
/// # Errors
///
/// Returns an error if the file name does not carry a language and id, or
/// if the file is not below `root`.
pub fn classify_file(
  path: &Path,
  root: &Path,
) -> StatsResult<(FileLocation, u32, String)> {
  let stem = path
    .file_stem()
    .and_then(|stem| stem.to_str())
    .unwrap_or_default();
  let captures =
    FILE_STEM.captures(stem).ok_or_else(|| StatsError::Filename {
      path: path.to_path_buf(),
    })?;
  let language = captures[1].to_string();
  let publication_id =
    captures[2].parse().map_err(|_| StatsError::Filename {
      path: path.to_path_buf(),
    })?;

  let relative =
    path
      .strip_prefix(root)
      .map_err(|_| StatsError::OutsideRoot {
        path: path.to_path_buf(),
        root: root.to_path_buf(),
      })?;

  // Directories only; the file name itself never classifies.
  let folders: Vec<String> = relative
    .parent()
    .map(|parent| {
      parent
        .components()
        .filter_map(|component| {
          match component {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
          }
        })
        .collect()
    })
    .unwrap_or_default();

  let main_folder = folders.first().cloned().unwrap_or_default();
  let subfolder = if SUBFOLDER_GENRES.contains(&main_folder.as_str()) {
    folders.get(1).cloned()
  } else {
    None
  };
  let correspondent = if main_folder == LETTERS {
    folders.get(2).cloned()
  } else {
    None
  };

  let collection = root
    .file_name()
    .map(|name| name.to_string_lossy().into_owned());
  let mut parts: Vec<String> = collection.into_iter().collect();
  parts.extend(
    relative
      .components()
      .map(|component| component.as_os_str().to_string_lossy().into_owned()),
  );

  let location = FileLocation {
    main_folder,
    subfolder,
    correspondent,
    file_path: parts.join("/"),
  };

  Ok((location, publication_id, language))
}
