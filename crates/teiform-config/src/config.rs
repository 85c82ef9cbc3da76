use std::{
  fmt::Display,
  fs,
  path::{Path, PathBuf},
  str::FromStr,
  sync::OnceLock,
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use teiform_core::{
  AbbreviationDictionary,
  DocumentType,
  GoodXmlOptions,
  Language,
  OutputMode,
  TransformOptions,
  processor::types::{
    DEFAULT_PAIRED_LANGUAGE_OFFSET,
    DEFAULT_PUBLISHER,
    default_note_headings,
  },
};

use crate::{error::ConfigError, vocabulary};

/// Default link pattern for publications on the edition website.
pub const DEFAULT_URL_TEMPLATE: &str = "https://digital_publishing_project/publication/{collection}/text/{publication}/nochapter/not/infinite/nosong/searchtitle/established_sv&established_fi&facsimiles&manuscripts";

/// Configuration for the teiform transformer.
///
/// [`Config`] holds every option shared by the `render`, `tidy`,
/// `abbreviations` and `stats` commands. Fields are typically loaded from a
/// TOML or JSON config file and refined with `--config KEY=VALUE` flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Directory containing the TEI sources.
  pub input_dir: Option<PathBuf>,

  /// Directory rendered files are written to.
  pub output_dir: PathBuf,

  /// Rendition produced by `render`.
  pub mode: OutputMode,

  /// Language of the texts being rendered.
  pub language: Language,

  /// Added to footnote numbers of [`Self::offset_language`] reading texts.
  pub paired_language_offset: u32,

  /// Language whose reading-text footnotes are offset.
  pub offset_language: Language,

  /// Number of threads to use for parallel processing.
  pub jobs: Option<usize>,

  /// Collection the sources belong to, used for statistics links.
  pub collection_id: Option<u32>,

  /// Link pattern with `{collection}` and `{publication}` placeholders.
  pub url_template: String,

  /// JSON file holding publication metadata records.
  pub metadata_file: Option<PathBuf>,

  /// Footnote list headings keyed by language code. Entries here replace
  /// or extend the built-in Swedish and Finnish headings.
  pub note_headings: IndexMap<String, String>,

  /// Publisher written into downloadable TEI headers.
  pub publisher: String,

  /// Versioned TOML table mapping OCR style names to cleanup actions.
  pub ocr_vocabulary: Option<PathBuf>,

  /// Abbreviation dictionary JSON used by `tidy`.
  pub abbreviations: Option<PathBuf>,

  /// Body template applied by `tidy`.
  pub document_type: DocumentType,

  /// Whether `tidy` joins paragraphs split at line ends.
  pub correct_paragraphs: bool,

  /// Whether `tidy` encodes untagged abbreviations.
  pub expand_abbreviations: bool,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      input_dir:              None,
      output_dir:             PathBuf::from("build"),
      mode:                   OutputMode::Est,
      language:               Language::Swedish,
      paired_language_offset: DEFAULT_PAIRED_LANGUAGE_OFFSET,
      offset_language:        Language::Finnish,
      jobs:                   None,
      collection_id:          None,
      url_template:           DEFAULT_URL_TEMPLATE.to_string(),
      metadata_file:          None,
      note_headings:          IndexMap::new(),
      publisher:              DEFAULT_PUBLISHER.to_string(),
      ocr_vocabulary:         None,
      abbreviations:          None,
      document_type:          DocumentType::default(),
      correct_paragraphs:     false,
      expand_abbreviations:   true,
    }
  }
}

impl Config {
  /// Load configuration from a file (TOML or JSON).
  ///
  /// # Arguments
  ///
  /// * `path` - Path to the configuration file.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format is
  /// unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    Self::parse_file(path.as_ref()).map(|(config, _)| config)
  }

  /// Parse a config file into both the typed config and the table of keys
  /// it sets.
  fn parse_file(path: &Path) -> Result<(Self, Value), ConfigError> {
    let extension = path
      .extension()
      .and_then(|ext| ext.to_str())
      .map(str::to_lowercase);
    let format = match extension.as_deref() {
      Some("json") => "JSON",
      Some("toml") => "TOML",
      Some(_) => {
        return Err(ConfigError::Config(format!(
          "Unsupported config file format: {}",
          path.display()
        )));
      },
      None => {
        return Err(ConfigError::Config(format!(
          "Config file has no extension: {}",
          path.display()
        )));
      },
    };

    let content = fs::read_to_string(path).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to read config file: {}: {}",
        path.display(),
        e
      ))
    })?;

    let parse_error = |e: &dyn Display| {
      ConfigError::Config(format!(
        "Failed to parse {format} config from {}: {e}",
        path.display()
      ))
    };

    let table: Value = if format == "JSON" {
      serde_json::from_str(&content).map_err(|e| parse_error(&e))?
    } else {
      toml::from_str(&content).map_err(|e| parse_error(&e))?
    };
    let config =
      serde_json::from_value(table.clone()).map_err(|e| parse_error(&e))?;
    Ok((config, table))
  }

  /// Load configuration from files and `KEY=VALUE` overrides.
  ///
  /// Explicit config files are layered in the order given: a later file
  /// overrides only the keys it sets. Without any, a config file discovered
  /// in a standard location is used, and failing that the defaults.
  /// Overrides are applied last.
  ///
  /// # Errors
  ///
  /// Returns an error if a config file cannot be loaded or an override is
  /// invalid.
  pub fn load(
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut config = if let Some((first, rest)) = config_files.split_first() {
      let (mut merged_config, mut merged_table) = Self::parse_file(first)?;

      for config_path in rest {
        let (_, table) = Self::parse_file(config_path)?;
        merge_tables(&mut merged_table, table);
      }

      if config_files.len() > 1 {
        log::info!("Loaded and merged {} config files", config_files.len());
        merged_config = serde_json::from_value(merged_table).map_err(|e| {
          ConfigError::Config(format!("Invalid merged configuration: {e}"))
        })?;
      }

      merged_config
    } else if let Some(discovered_config) = Self::find_config_file() {
      log::info!(
        "Using discovered config file: {}",
        discovered_config.display()
      );
      Self::from_file(&discovered_config).map_err(|e| {
        ConfigError::Config(format!(
          "Failed to load discovered config from {}: {}",
          discovered_config.display(),
          e
        ))
      })?
    } else {
      Self::default()
    };

    if !config_overrides.is_empty() {
      config.apply_overrides(config_overrides)?;
    }

    Ok(config)
  }

  /// Apply configuration overrides from KEY=VALUE strings.
  ///
  /// # Errors
  ///
  /// Returns an error if:
  ///
  /// - An override string is not in KEY=VALUE format
  /// - A key is not recognized
  /// - A value cannot be parsed as the expected type
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str.split_once('=').ok_or_else(|| {
        ConfigError::Config(format!(
          "Invalid config override format: '{override_str}'. Expected \
           KEY=VALUE"
        ))
      })?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  /// Apply a single override. Headings are set with
  /// `note_headings.<language>=<text>`.
  ///
  /// # Errors
  ///
  /// Returns an error if the key is unknown or the value does not parse.
  pub fn apply_override(
    &mut self,
    key: &str,
    value: &str,
  ) -> Result<(), ConfigError> {
    if let Some(language) = key.strip_prefix("note_headings.") {
      self
        .note_headings
        .insert(language.to_string(), value.to_string());
      return Ok(());
    }

    match key {
      "input_dir" => self.input_dir = optional_path(value),
      "output_dir" => self.output_dir = PathBuf::from(value),
      "mode" => self.mode = parse_value(key, value)?,
      "language" => self.language = Language::from(value),
      "paired_language_offset" => {
        self.paired_language_offset = parse_value(key, value)?;
      },
      "offset_language" => self.offset_language = Language::from(value),
      "jobs" => self.jobs = parse_optional(key, value)?,
      "collection_id" => self.collection_id = parse_optional(key, value)?,
      "url_template" => self.url_template = value.to_string(),
      "metadata_file" => self.metadata_file = optional_path(value),
      "publisher" => self.publisher = value.to_string(),
      "ocr_vocabulary" => self.ocr_vocabulary = optional_path(value),
      "abbreviations" => self.abbreviations = optional_path(value),
      "document_type" => self.document_type = parse_value(key, value)?,
      "correct_paragraphs" => {
        self.correct_paragraphs = parse_bool(key, value)?;
      },
      "expand_abbreviations" => {
        self.expand_abbreviations = parse_bool(key, value)?;
      },
      _ => {
        return Err(ConfigError::Config(format!(
          "Unknown configuration key: '{key}'. See documentation for \
           supported keys.",
        )));
      },
    }

    Ok(())
  }

  /// Search for config files in common locations
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    static RESULT: OnceLock<Option<PathBuf>> = OnceLock::new();
    RESULT
      .get_or_init(|| {
        let config_filenames = [
          "teiform.toml",
          "teiform.json",
          ".teiform.toml",
          ".teiform.json",
          ".config/teiform.toml",
          ".config/teiform.json",
        ];

        let current_dir = std::env::current_dir().ok()?;
        for filename in &config_filenames {
          let config_path = current_dir.join(filename);
          if config_path.exists() {
            return Some(config_path);
          }
        }

        if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
          let xdg_config_dir = PathBuf::from(xdg_config_home);
          for filename in &["teiform.toml", "teiform.json"] {
            let config_path = xdg_config_dir.join(filename);
            if config_path.exists() {
              return Some(config_path);
            }
          }
        }

        if let Ok(home) = std::env::var("HOME") {
          let home_config_dir =
            PathBuf::from(home).join(".config").join("teiform");
          for filename in &["config.toml", "config.json"] {
            let config_path = home_config_dir.join(filename);
            if config_path.exists() {
              return Some(config_path);
            }
          }
        }

        None
      })
      .clone()
  }

  /// Validate all paths specified in the configuration
  ///
  /// # Errors
  ///
  /// Returns an error if any configured path does not exist or is invalid.
  pub fn validate_paths(&self) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if let Some(ref input_dir) = self.input_dir {
      if !input_dir.exists() {
        errors.push(format!(
          "Input directory does not exist: {}",
          input_dir.display()
        ));
      } else if !input_dir.is_dir() {
        errors.push(format!(
          "Input path is not a directory: {}",
          input_dir.display()
        ));
      }
    }

    let files = [
      ("Metadata file", &self.metadata_file),
      ("OCR vocabulary file", &self.ocr_vocabulary),
      ("Abbreviation dictionary", &self.abbreviations),
    ];
    for (label, path) in files {
      if let Some(path) = path {
        if !path.exists() {
          errors.push(format!("{label} does not exist: {}", path.display()));
        } else if !path.is_file() {
          errors.push(format!("{label} is not a file: {}", path.display()));
        }
      }
    }

    if !errors.is_empty() {
      let error_message = errors.join("\n");
      return Err(ConfigError::Config(format!(
        "Configuration path validation errors:\n{error_message}"
      )));
    }

    Ok(())
  }

  /// Options for the rendering commands.
  ///
  /// Configured note headings are laid over the built-in table.
  #[must_use]
  pub fn transform_options(&self) -> TransformOptions {
    let mut note_headings = default_note_headings();
    note_headings.extend(
      self
        .note_headings
        .iter()
        .map(|(language, heading)| (language.clone(), heading.clone())),
    );

    TransformOptions {
      mode: self.mode,
      language: self.language.clone(),
      paired_language_offset: self.paired_language_offset,
      offset_language: self.offset_language.clone(),
      note_headings,
      publisher: self.publisher.clone(),
    }
  }

  /// Options for the `tidy` command, loading the configured vocabulary and
  /// abbreviation dictionary.
  ///
  /// # Errors
  ///
  /// Returns an error if either file cannot be read or parsed.
  pub fn good_xml_options(&self) -> Result<GoodXmlOptions, ConfigError> {
    let vocabulary = match self.ocr_vocabulary {
      Some(ref path) => vocabulary::load_vocabulary(path)?,
      None => teiform_core::OcrVocabulary::default(),
    };

    let abbreviations = match self.abbreviations {
      Some(ref path) => {
        AbbreviationDictionary::load(path).map_err(|source| {
          ConfigError::Dictionary {
            path: path.clone(),
            source,
          }
        })?
      },
      None => AbbreviationDictionary::default(),
    };

    Ok(GoodXmlOptions {
      document_type: self.document_type,
      correct_paragraphs: self.correct_paragraphs,
      expand_untagged: self.expand_abbreviations && !abbreviations.is_empty(),
      vocabulary,
      abbreviations,
    })
  }

  /// Generate a default configuration file with commented explanations
  ///
  /// # Errors
  ///
  /// Returns an error if the template cannot be retrieved or the file cannot be
  /// written.
  pub fn generate_default_config(
    format: &str,
    path: &Path,
  ) -> Result<(), ConfigError> {
    let config_content = crate::templates::get_template(format)
      .map_err(|e| ConfigError::Template(e.to_string()))?;

    fs::write(path, config_content).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to write default config to {}: {}",
        path.display(),
        e
      ))
    })?;

    log::info!("Created default configuration file: {}", path.display());
    Ok(())
  }
}

/// Layer `other` over `base`. Tables merge key by key, so a later file can
/// add one `note_headings` entry without dropping the others; any other
/// value replaces what `base` had. An explicit JSON `null` clears an
/// optional field.
fn merge_tables(base: &mut Value, other: Value) {
  match (base, other) {
    (Value::Object(base), Value::Object(other)) => {
      for (key, value) in other {
        match base.get_mut(&key) {
          Some(existing) => merge_tables(existing, value),
          None => {
            base.insert(key, value);
          },
        }
      }
    },
    (base, other) => *base = other,
  }
}

fn optional_path(value: &str) -> Option<PathBuf> {
  if value.is_empty() {
    None
  } else {
    Some(PathBuf::from(value))
  }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
  T: FromStr,
  T::Err: Display,
{
  value.parse().map_err(|e: T::Err| {
    ConfigError::Config(format!("Invalid value for '{key}': '{value}' - {e}"))
  })
}

fn parse_optional<T>(key: &str, value: &str) -> Result<Option<T>, ConfigError>
where
  T: FromStr,
  T::Err: Display,
{
  if value.is_empty() {
    Ok(None)
  } else {
    parse_value(key, value).map(Some)
  }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
  match value.to_lowercase().as_str() {
    "true" | "yes" | "1" => Ok(true),
    "false" | "no" | "0" => Ok(false),
    _ => {
      Err(ConfigError::Config(format!(
        "Invalid boolean value for '{key}': '{value}'. Expected true/false, \
         yes/no, or 1/0"
      )))
    },
  }
}

#[cfg(test)]
mod tests {
  #![allow(
    clippy::unwrap_used,
    clippy::field_reassign_with_default,
    reason = "Fine in tests"
  )]

  use super::*;

  #[test]
  fn test_merge_tables_keeps_unset_keys() {
    let mut base = serde_json::json!({
      "input_dir": "base-input",
      "output_dir": "site",
      "mode": "ms",
    });
    merge_tables(
      &mut base,
      serde_json::json!({ "metadata_file": "meta.json", "language": "fi" }),
    );

    let config: Config = serde_json::from_value(base).unwrap();
    assert_eq!(config.input_dir, Some(PathBuf::from("base-input")));
    assert_eq!(config.output_dir, PathBuf::from("site"));
    assert_eq!(config.mode, OutputMode::Manuscript);
    assert_eq!(config.language, Language::Finnish);
    assert_eq!(config.metadata_file, Some(PathBuf::from("meta.json")));
  }

  #[test]
  fn test_merge_tables_note_headings() {
    let mut base =
      serde_json::json!({ "note_headings": { "sv": "Kommentarer" } });
    merge_tables(
      &mut base,
      serde_json::json!({ "note_headings": { "en": "Footnotes" } }),
    );

    let config: Config = serde_json::from_value(base).unwrap();
    assert_eq!(config.note_headings.len(), 2);
    assert_eq!(config.note_headings["sv"], "Kommentarer");
    assert_eq!(config.note_headings["en"], "Footnotes");
  }

  #[test]
  fn test_merge_tables_null_clears() {
    let mut base = serde_json::json!({ "abbreviations": "abbr.json" });
    merge_tables(&mut base, serde_json::json!({ "abbreviations": null }));

    let config: Config = serde_json::from_value(base).unwrap();
    assert_eq!(config.abbreviations, None);
  }

  #[test]
  fn test_apply_overrides_typed_values() {
    let mut config = Config::default();

    config
      .apply_overrides(&[
        "mode=ms_normalized".to_string(),
        "language=fi".to_string(),
        "jobs=8".to_string(),
        "collection_id=7".to_string(),
        "document_type=letter".to_string(),
        "correct_paragraphs=yes".to_string(),
      ])
      .unwrap();

    assert_eq!(config.mode, OutputMode::NormalizedManuscript);
    assert_eq!(config.language, Language::Finnish);
    assert_eq!(config.jobs, Some(8));
    assert_eq!(config.collection_id, Some(7));
    assert_eq!(config.document_type, DocumentType::Letter);
    assert!(config.correct_paragraphs);
  }

  #[test]
  fn test_apply_overrides_empty_path_clears() {
    let mut config = Config::default();
    config.abbreviations = Some(PathBuf::from("abbr.json"));

    config.apply_override("abbreviations", "").unwrap();

    assert_eq!(config.abbreviations, None);
  }

  #[test]
  fn test_apply_override_note_heading() {
    let mut config = Config::default();
    config.apply_override("note_headings.de", "Anmerkungen").unwrap();

    let options = config.transform_options();
    assert_eq!(options.note_headings["de"], "Anmerkungen");
    assert_eq!(options.note_headings["sv"], "Noter");
  }

  #[test]
  fn test_apply_overrides_invalid_format() {
    let mut config = Config::default();

    let result = config.apply_overrides(&["no_equals_sign".to_string()]);

    assert!(
      result
        .unwrap_err()
        .to_string()
        .contains("Expected KEY=VALUE")
    );
  }

  #[test]
  fn test_apply_overrides_unknown_key() {
    let mut config = Config::default();

    let result = config.apply_overrides(&["chars_per_page=3000".to_string()]);

    assert!(
      result
        .unwrap_err()
        .to_string()
        .contains("Unknown configuration key")
    );
  }

  #[test]
  fn test_apply_overrides_invalid_boolean() {
    let mut config = Config::default();

    let result =
      config.apply_overrides(&["expand_abbreviations=maybe".to_string()]);

    assert!(result.unwrap_err().to_string().contains("Invalid boolean"));
  }

  #[test]
  fn test_apply_overrides_invalid_mode() {
    let mut config = Config::default();

    let result = config.apply_overrides(&["mode=epub".to_string()]);

    let message = result.unwrap_err().to_string();
    assert!(message.contains("Invalid value for 'mode'"));
    assert!(message.contains("unknown output mode"));
  }

  #[test]
  fn test_transform_options_defaults() {
    let options = Config::default().transform_options();

    assert_eq!(options.mode, OutputMode::Est);
    assert_eq!(options.paired_language_offset, 500);
    assert_eq!(options.offset_language, Language::Finnish);
    assert_eq!(options.note_heading(), "Noter");
  }

  #[test]
  fn test_good_xml_options_without_dictionary() {
    let options = Config::default().good_xml_options().unwrap();

    assert_eq!(options.document_type, DocumentType::Article);
    assert!(!options.expand_untagged);
    assert!(options.abbreviations.is_empty());
  }

  #[test]
  fn test_good_xml_options_missing_dictionary() {
    let mut config = Config::default();
    config.abbreviations = Some(PathBuf::from("does/not/exist.json"));

    let err = config.good_xml_options().unwrap_err();

    assert!(matches!(err, ConfigError::Dictionary { .. }));
    assert!(err.to_string().contains("does/not/exist.json"));
  }
}
