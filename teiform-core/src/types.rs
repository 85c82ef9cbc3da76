//! Types for the teiform-core public API.
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Which rendition of a source document to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OutputMode {
  /// Reading text HTML for the website.
  Est,
  /// Diplomatic manuscript HTML, keeping line breaks and deletions.
  Manuscript,
  /// Manuscript HTML with editorial noise removed and abbreviations
  /// explained.
  NormalizedManuscript,
  /// Downloadable TEI with a generated header.
  DownloadXml,
  /// Downloadable plain text of the given text kind.
  DownloadTxt(TextKind),
}

/// Source text kind for plain-text downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextKind {
  /// Reading text.
  Established,
  /// Manuscript transcription.
  Manuscript,
}

impl OutputMode {
  /// Every mode, in the order they are listed in help output.
  pub const ALL: [Self; 6] = [
    Self::Est,
    Self::Manuscript,
    Self::NormalizedManuscript,
    Self::DownloadXml,
    Self::DownloadTxt(TextKind::Established),
    Self::DownloadTxt(TextKind::Manuscript),
  ];

  /// Short name used in configuration files and on the command line.
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Est => "est",
      Self::Manuscript => "ms",
      Self::NormalizedManuscript => "ms-normalized",
      Self::DownloadXml => "download-xml",
      Self::DownloadTxt(TextKind::Established) => "download-txt",
      Self::DownloadTxt(TextKind::Manuscript) => "download-txt-ms",
    }
  }

  /// Whether the mode produces an HTML fragment.
  #[must_use]
  pub const fn is_html(self) -> bool {
    matches!(
      self,
      Self::Est | Self::Manuscript | Self::NormalizedManuscript
    )
  }

  /// File extension for files written in this mode.
  #[must_use]
  pub const fn extension(self) -> &'static str {
    match self {
      Self::Est | Self::Manuscript | Self::NormalizedManuscript => "html",
      Self::DownloadXml => "xml",
      Self::DownloadTxt(_) => "txt",
    }
  }
}

impl fmt::Display for OutputMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OutputMode {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "est" | "reading" => Ok(Self::Est),
      "ms" | "manuscript" => Ok(Self::Manuscript),
      "ms-normalized" | "ms_normalized" | "normalized" => {
        Ok(Self::NormalizedManuscript)
      },
      "download-xml" | "download_xml" | "xml" => Ok(Self::DownloadXml),
      "download-txt" | "download_txt" | "txt" => {
        Ok(Self::DownloadTxt(TextKind::Established))
      },
      "download-txt-ms" | "download_txt_ms" | "txt-ms" => {
        Ok(Self::DownloadTxt(TextKind::Manuscript))
      },
      other => {
        let known: Vec<&str> = Self::ALL.iter().map(|m| m.as_str()).collect();
        Err(format!(
          "unknown output mode '{other}', expected one of: {}",
          known.join(", ")
        ))
      },
    }
  }
}

impl TryFrom<String> for OutputMode {
  type Error = String;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

impl From<OutputMode> for String {
  fn from(mode: OutputMode) -> Self {
    mode.as_str().to_string()
  }
}

/// Language of a text version, as a two-letter code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Language {
  #[default]
  Swedish,
  Finnish,
  Other(String),
}

impl Language {
  #[must_use]
  pub fn code(&self) -> &str {
    match self {
      Self::Swedish => "sv",
      Self::Finnish => "fi",
      Self::Other(code) => code,
    }
  }
}

impl From<&str> for Language {
  fn from(code: &str) -> Self {
    match code.trim().to_lowercase().as_str() {
      "sv" => Self::Swedish,
      "fi" => Self::Finnish,
      other => Self::Other(other.to_string()),
    }
  }
}

impl From<String> for Language {
  fn from(code: String) -> Self {
    Self::from(code.as_str())
  }
}

impl From<Language> for String {
  fn from(language: Language) -> Self {
    language.code().to_string()
  }
}

impl fmt::Display for Language {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.code())
  }
}

/// Semantic type declared on a division through its `type` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DivisionType {
  Letter,
  Article,
  Misc,
  /// Parliamentary proceedings, including their written and spoken parts.
  Hansard,
  Chapter,
  Section,
  TitlePage,
  Introduction,
  /// Template division without any transcribed text yet.
  Empty,
  Other(String),
}

impl DivisionType {
  /// Classify a `type` attribute value. Returns `None` when the value is
  /// blank, meaning the division cannot be classified.
  #[must_use]
  pub fn from_attr(value: &str) -> Option<Self> {
    let value = value.trim();
    let division_type = match value {
      "" => return None,
      "letter" => Self::Letter,
      "article" => Self::Article,
      "misc" => Self::Misc,
      "hansard" | "LM_written" | "LM_discussion" | "written" | "discussion" => {
        Self::Hansard
      },
      "chapter" => Self::Chapter,
      "section" => Self::Section,
      "title_page" => Self::TitlePage,
      "introduction" => Self::Introduction,
      "empty" => Self::Empty,
      other => Self::Other(other.to_string()),
    };
    Some(division_type)
  }

  /// Whether the type names a whole document rather than a part of one.
  #[must_use]
  pub const fn is_document_kind(&self) -> bool {
    !matches!(self, Self::Chapter | Self::Section)
  }

  /// Title pages and introductions are rendered as standalone pages.
  #[must_use]
  pub const fn is_front_matter(&self) -> bool {
    matches!(self, Self::TitlePage | Self::Introduction)
  }

  /// Whether the first paragraph of such a document is set without indent.
  #[must_use]
  pub const fn starts_unindented(&self) -> bool {
    matches!(self, Self::Misc | Self::Article | Self::Hansard)
  }
}

/// Problems found in a document that did not stop the transformation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diagnostic {
  /// A note that is neither a footnote nor an editorial comment. It is
  /// left untouched in the output.
  UnrecognizedNote { markup: String },
}

impl fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::UnrecognizedNote { markup } => {
        write!(f, "unrecognized note: {markup}")
      },
    }
  }
}

/// Result of transforming one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformResult {
  /// Rendered output. Empty when the document has no text to show.
  pub content: String,

  /// Title from the TEI header, if present.
  pub title: Option<String>,

  /// Non-fatal problems encountered on the way.
  pub diagnostics: Vec<Diagnostic>,
}

/// A translation of the document, as recorded in the bibliographic data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Translation {
  pub translated_into: String,
  pub translators:     Vec<String>,
}

/// Bibliographic data inserted into the header of downloadable TEI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentMetadata {
  pub publication_title:    String,
  pub publication_subtitle: Option<String>,
  pub published_by:         Option<String>,
  pub document_type:        String,
  pub original_language:    String,
  pub orig_lang_abbr:       Vec<String>,
  pub publication_date:     String,
  pub author:               Vec<String>,
  pub sender:               Vec<String>,
  pub recipient:            Vec<String>,
  pub translations:         Vec<Translation>,
}
