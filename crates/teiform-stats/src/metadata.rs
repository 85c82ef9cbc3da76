//! Bibliographic metadata for publications.
//!
//! The edition database is exported to a JSON array with one object per
//! publication:
//!
//! ```json
//! [
//!   {
//!     "id": 1012,
//!     "group_id": 3,
//!     "date": "1870-05-02",
//!     "original_language": "de, sv",
//!     "titles": { "sv": "Brev till Anna", "fi": "Kirje Annalle" },
//!     "translators": { "fi": [{ "last_name": "Virtanen", "first_name": "Aino" }] },
//!     "facsimiles": [{ "type": 1, "pages": 4 }]
//!   }
//! ]
//! ```
use std::{collections::HashMap, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{StatsError, StatsResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
  pub last_name:  String,
  pub first_name: String,
}

/// One facsimile unit attached to a publication.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facsimile {
  /// Type 0 is a link to images hosted elsewhere.
  #[serde(rename = "type")]
  pub facsimile_type: u32,
  /// Number of images, when known.
  #[serde(default)]
  pub pages:          Option<u32>,
}

impl Facsimile {
  #[must_use]
  pub const fn is_external_link(&self) -> bool {
    self.facsimile_type == 0
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicationMetadata {
  pub id:                u32,
  pub group_id:          Option<u32>,
  pub date:              Option<String>,
  /// Comma separated, first language first, e.g. `"de, sv"`.
  pub original_language: String,
  /// Titles keyed by language code.
  pub titles:            HashMap<String, String>,
  /// Translators keyed by the language translated into.
  pub translators:       HashMap<String, Vec<Contributor>>,
  pub facsimiles:        Vec<Facsimile>,
}

impl PublicationMetadata {
  /// Original languages in declaration order.
  pub fn original_languages(&self) -> impl Iterator<Item = &str> {
    self
      .original_language
      .split(',')
      .map(str::trim)
      .filter(|language| !language.is_empty())
  }

  /// Whether `language` is one of the original languages.
  #[must_use]
  pub fn is_original(&self, language: &str) -> bool {
    self.original_languages().any(|original| original == language)
  }

  /// Whether `language` is the first declared original language. Images
  /// are only counted for that file.
  #[must_use]
  pub fn is_first_original(&self, language: &str) -> bool {
    self.original_languages().next() == Some(language)
  }

  /// Title in `language`, falling back to the title in the first original
  /// language.
  #[must_use]
  pub fn title(&self, language: &str) -> Option<&str> {
    self
      .titles
      .get(language)
      .or_else(|| {
        self
          .original_languages()
          .next()
          .and_then(|original| self.titles.get(original))
      })
      .map(String::as_str)
  }
}

/// Metadata records indexed by publication id.
#[derive(Debug, Clone, Default)]
pub struct MetadataStore {
  records: HashMap<u32, PublicationMetadata>,
}

impl MetadataStore {
  /// Read a JSON export.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or is not an array of
  /// publication records.
  pub fn load(path: &Path) -> StatsResult<Self> {
    let content = fs::read_to_string(path)?;
    Self::from_json(content.trim_start_matches('\u{feff}'))
  }

  /// Parse a JSON export.
  ///
  /// # Errors
  ///
  /// Returns an error if the text is not an array of publication records.
  pub fn from_json(json: &str) -> StatsResult<Self> {
    let records: Vec<PublicationMetadata> = serde_json::from_str(json)?;
    Ok(records.into_iter().collect())
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.records.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  /// Metadata for a publication.
  ///
  /// # Errors
  ///
  /// Returns [`StatsError::MissingMetadata`] for unknown ids.
  pub fn get(&self, publication_id: u32) -> StatsResult<&PublicationMetadata> {
    self
      .records
      .get(&publication_id)
      .ok_or(StatsError::MissingMetadata { publication_id })
  }
}

impl FromIterator<PublicationMetadata> for MetadataStore {
  fn from_iter<I: IntoIterator<Item = PublicationMetadata>>(iter: I) -> Self {
    let mut records = HashMap::new();
    for record in iter {
      if records.insert(record.id, record).is_some() {
        log::warn!("Duplicate metadata record, keeping the last one");
      }
    }
    Self { records }
  }
}
