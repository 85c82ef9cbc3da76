//! Per-file statistics records.
use std::{cmp::Ordering, fmt, ops::Add};

use serde::Serialize;
use teiform_core::ContentMeasure;

use crate::{
  classify::FileLocation,
  metadata::{Contributor, PublicationMetadata},
};

/// Group id used for publications that belong to no group.
pub const UNGROUPED: u32 = 100;

/// Marker appended to the language of original-language rows.
pub const ORIGINAL_MARKER: &str = " (orig.)";

/// Images attached to a publication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImageCount {
  pub images:        u32,
  /// Some images are only reachable through an external link.
  pub external_link: bool,
}

impl ImageCount {
  /// Count the facsimiles of a publication.
  #[must_use]
  pub fn from_metadata(metadata: &PublicationMetadata) -> Self {
    metadata
      .facsimiles
      .iter()
      .fold(Self::default(), |mut count, facsimile| {
        if facsimile.is_external_link() {
          count.external_link = true;
        } else if let Some(pages) = facsimile.pages {
          count.images += pages;
        }
        count
      })
  }
}

impl Add for ImageCount {
  type Output = Self;

  fn add(self, other: Self) -> Self {
    Self {
      images:        self.images + other.images,
      external_link: self.external_link || other.external_link,
    }
  }
}

impl fmt::Display for ImageCount {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.images == 0 && self.external_link {
      f.write_str("extern länk")
    } else {
      write!(f, "{}", self.images)
    }
  }
}

/// One row of the statistics report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicationRecord {
  pub publication_id: u32,
  pub group_id:       u32,
  /// Two-letter language, with [`ORIGINAL_MARKER`] on original-language
  /// rows.
  pub language:       String,
  pub date:           Option<String>,
  pub title:          String,
  pub measure:        ContentMeasure,
  pub location:       FileLocation,
  /// `"Last, First; Last, First"`. Empty for originals and untranslated
  /// texts.
  pub translators:    String,
  /// Only set on the first original language row.
  pub images:         Option<ImageCount>,
  pub url:            String,
}

impl PublicationRecord {
  #[must_use]
  pub fn is_original(&self) -> bool {
    self.language.ends_with(ORIGINAL_MARKER)
  }

  /// Canonical ordering: main folder, subfolder, correspondent, date,
  /// group, publication id and language.
  #[must_use]
  pub fn sort_cmp(&self, other: &Self) -> Ordering {
    let key = |record: &Self| {
      (
        record.location.main_folder.clone(),
        record.location.subfolder.clone(),
        record.location.correspondent.clone(),
        record.date.clone(),
        record.group_id,
        record.publication_id,
        record.language.clone(),
      )
    };
    key(self).cmp(&key(other))
  }
}

/// Render translators as `"Last, First; Last, First"`.
#[must_use]
pub fn format_translators(translators: &[Contributor]) -> String {
  translators
    .iter()
    .map(|translator| {
      format!("{}, {}", translator.last_name, translator.first_name)
    })
    .collect::<Vec<_>>()
    .join("; ")
}

/// Fill the `{collection}` and `{publication}` placeholders of a link
/// template.
#[must_use]
pub fn publication_url(
  template: &str,
  collection_id: u32,
  publication_id: u32,
) -> String {
  template
    .replace("{collection}", &collection_id.to_string())
    .replace("{publication}", &publication_id.to_string())
}

/// Build the record for one file.
///
/// # Arguments
///
/// * `location` - Where the file sits in the collection
/// * `publication_id` - Id taken from the file name
/// * `language` - Language taken from the file name
/// * `metadata` - The publication's metadata record
/// * `measure` - Transcribed length of the file
/// * `url` - Link to the publication
#[must_use]
pub fn build_record(
  location: FileLocation,
  publication_id: u32,
  language: &str,
  metadata: &PublicationMetadata,
  measure: ContentMeasure,
  url: String,
) -> PublicationRecord {
  let original = metadata.is_original(language);

  let translators = if original {
    String::new()
  } else {
    metadata
      .translators
      .get(language)
      .map(|translators| format_translators(translators))
      .unwrap_or_default()
  };

  let images = if metadata.is_first_original(language) {
    Some(ImageCount::from_metadata(metadata))
  } else {
    None
  };

  let title = metadata.title(language).unwrap_or_else(|| {
    log::warn!("Publication {publication_id} has no title for {language}");
    ""
  });

  let language = if original {
    format!("{language}{ORIGINAL_MARKER}")
  } else {
    language.to_string()
  };

  PublicationRecord {
    publication_id,
    group_id: metadata.group_id.unwrap_or(UNGROUPED),
    language,
    date: metadata.date.clone(),
    title: title.to_string(),
    measure,
    location,
    translators,
    images,
    url,
  }
}
