use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use teiform_core::{DocumentType, OutputMode};

/// Command line interface for teiform
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about = "teiform: TEI edition files to website HTML, downloads, tidy XML \
           and statistics"
)]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`])
  #[command(subcommand)]
  pub command: Commands,

  #[command(flatten)]
  pub verbosity: Verbosity<InfoLevel>,

  /// Path to configuration file(s) (TOML or JSON, can be specified multiple
  /// times) Multiple files are merged in order, with later files overriding
  /// earlier ones
  #[arg(
    short = 'c',
    long = "config-file",
    global = true,
    action = clap::ArgAction::Append
  )]
  pub config_files: Vec<PathBuf>,

  /// Override configuration values (KEY=VALUE format, can be used multiple
  /// times)
  #[arg(long = "config", global = true, action = clap::ArgAction::Append)]
  pub config_overrides: Vec<String>,
}

/// All supported subcommands for the teiform CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Initialize a new teiform configuration file
  Init {
    /// Path to create the configuration file at
    #[arg(short, long, default_value = "teiform.toml")]
    output: PathBuf,

    /// Format of the configuration file.
    #[arg(short = 'F', long, default_value = "toml", value_parser = ["toml", "json"])]
    format: String,

    /// Also write the built-in OCR style vocabulary to this path.
    #[arg(long)]
    vocabulary: Option<PathBuf>,

    /// Force overwrite if file already exists
    #[arg(short, long)]
    force: bool,
  },

  /// Render TEI files as website HTML or downloadable XML/TXT.
  Render {
    /// TEI files or directories to render. Defaults to the configured
    /// input directory.
    inputs: Vec<PathBuf>,

    /// Rendition to produce (est, ms, ms-normalized, download-xml,
    /// download-txt, download-txt-ms).
    #[arg(short, long)]
    mode: Option<OutputMode>,

    /// Language of the texts (sv, fi, ...).
    #[arg(short, long)]
    language: Option<String>,

    /// Output directory for rendered files.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// JSON object of header metadata keyed by file stem, used by
    /// download-xml.
    #[arg(long = "document-metadata")]
    document_metadata: Option<PathBuf>,

    /// Number of threads to use for parallel processing.
    #[arg(short = 'p', long = "jobs")]
    jobs: Option<usize>,

    /// Exit with an error if any file fails.
    #[arg(long)]
    strict: bool,
  },

  /// Clean OCR exports into project-format TEI.
  Tidy {
    /// Exported TEI files or directories.
    inputs: Vec<PathBuf>,

    /// Output directory for cleaned files.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Body template to apply (letter, misc, article).
    #[arg(short = 't', long = "type")]
    document_type: Option<DocumentType>,

    /// Abbreviation dictionary JSON.
    #[arg(short, long)]
    abbreviations: Option<PathBuf>,

    /// OCR style vocabulary TOML.
    #[arg(long)]
    vocabulary: Option<PathBuf>,

    /// Join paragraphs that the OCR split at line ends.
    #[arg(long = "correct-paragraphs", action = clap::ArgAction::SetTrue)]
    correct_paragraphs: bool,

    /// Number of threads to use for parallel processing.
    #[arg(short = 'p', long = "jobs")]
    jobs: Option<usize>,

    /// Exit with an error if any file fails.
    #[arg(long)]
    strict: bool,
  },

  /// Build an abbreviation dictionary from encoded TEI files.
  Abbreviations {
    /// TEI files or directories to read.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Where to write the dictionary.
    #[arg(short, long, default_value = "abbreviations.json")]
    output: PathBuf,
  },

  /// Measure a collection and write the statistics report set.
  Stats {
    /// Collection root. Defaults to the configured input directory.
    input_dir: Option<PathBuf>,

    /// Collection id used in links and report names.
    #[arg(short = 'C', long)]
    collection: Option<u32>,

    /// Publication metadata JSON.
    #[arg(short, long)]
    metadata: Option<PathBuf>,

    /// Directory for the CSV reports.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Number of threads to use for parallel processing.
    #[arg(short = 'p', long = "jobs")]
    jobs: Option<usize>,
  },
}

impl Cli {
  /// Parse command line arguments into a [`Cli`] struct.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}
