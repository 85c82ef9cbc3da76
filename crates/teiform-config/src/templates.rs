use std::fmt;

/// Error type for template operations.
#[derive(Debug)]
pub enum TemplateError {
  /// Indicates that the requested configuration format is not supported.
  /// Contains the name of the unsupported format.
  UnsupportedFormat(String),
}

impl fmt::Display for TemplateError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::UnsupportedFormat(format) => {
        write!(f, "Unsupported config format: {format}")
      },
    }
  }
}

impl std::error::Error for TemplateError {}

/// Default configuration template in TOML, commented so that each key can be
/// understood without reading the documentation.
pub const DEFAULT_TOML_TEMPLATE: &str = r#"# teiform configuration file

# Directory containing the TEI sources
input_dir = "xml"

# Directory rendered files are written to
output_dir = "build"

# Rendition produced by `teiform render`:
# est, ms, ms_normalized, download_xml, download_txt or download_txt_ms
mode = "est"

# Language of the texts (sv, fi, or any other two-letter code)
language = "sv"

# Footnotes of the offset language are numbered from this offset in the
# reading text, so that both language versions can be shown side by side
paired_language_offset = 500
offset_language = "fi"

# Number of threads to use for parallel processing (defaults to number of CPU cores)
# jobs = 4

# Publisher written into downloadable TEI headers
publisher = "Leo Mechelin – Pro lege"

# Statistics
# collection_id = 1
# metadata_file = "metadata.json"
url_template = "https://digital_publishing_project/publication/{collection}/text/{publication}/nochapter/not/infinite/nosong/searchtitle/established_sv&established_fi&facsimiles&manuscripts"

# Cleanup of OCR exports (`teiform tidy`)
# letter, misc or article
document_type = "article"
correct_paragraphs = false
expand_abbreviations = true
# abbreviations = "abbreviations.json"
# ocr_vocabulary = "ocr_vocabulary.toml"

# Footnote list headings, laid over the built-in sv and fi headings
[note_headings]
# en = "Notes"
"#;

/// Default configuration template in JSON format.
pub const DEFAULT_JSON_TEMPLATE: &str = r#"{
  "input_dir": "xml",
  "output_dir": "build",
  "mode": "est",
  "language": "sv",
  "paired_language_offset": 500,
  "offset_language": "fi",
  "publisher": "Leo Mechelin – Pro lege",
  "url_template": "https://digital_publishing_project/publication/{collection}/text/{publication}/nochapter/not/infinite/nosong/searchtitle/established_sv&established_fi&facsimiles&manuscripts",
  "document_type": "article",
  "correct_paragraphs": false,
  "expand_abbreviations": true,
  "note_headings": {}
}
"#;

/// Get the correct configuration template based on the requested format.
///
/// # Errors
///
/// Returns an error if the requested format is not supported.
pub fn get_template(format: &str) -> Result<&'static str, TemplateError> {
  match format.to_lowercase().as_str() {
    "toml" => Ok(DEFAULT_TOML_TEMPLATE),
    "json" => Ok(DEFAULT_JSON_TEMPLATE),
    _ => Err(TemplateError::UnsupportedFormat(format.to_string())),
  }
}
