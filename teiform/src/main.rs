use std::{
  collections::HashMap,
  fs,
  path::{Path, PathBuf},
};

use color_eyre::eyre::{Context, Result, bail};
use log::{LevelFilter, info};
use teiform::{
  batch::{self, collect_inputs, progress_bar},
  cli::{Cli, Commands},
  stats::{StatsRun, monthly_report_dir, run_stats},
};
use teiform_config::{Config, vocabulary::write_default_vocabulary};
use teiform_core::{AbbreviationDictionary, Language, TeiProcessor, abbreviations};

fn main() -> Result<()> {
  color_eyre::install()?;

  let cli = Cli::parse_args();

  // Initialize logging first so we can log during command handling
  let level = cli.verbosity.log_level_filter();
  env_logger::Builder::new()
    .filter_level(level)
    .write_style(env_logger::WriteStyle::Always)
    .init();
  let show_progress = level >= LevelFilter::Info;

  if let Commands::Init {
    output,
    format,
    vocabulary,
    force,
  } = &cli.command
  {
    return init(output, format, vocabulary.as_deref(), *force);
  }

  let mut config = Config::load(&cli.config_files, &cli.config_overrides)?;

  match cli.command {
    Commands::Init { .. } => Ok(()),

    Commands::Render {
      inputs,
      mode,
      language,
      output_dir,
      document_metadata,
      jobs,
      strict,
    } => {
      if let Some(mode) = mode {
        config.mode = mode;
      }
      if let Some(language) = language {
        config.language = Language::from(language);
      }
      if let Some(output_dir) = output_dir {
        config.output_dir = output_dir;
      }
      config.jobs = jobs.or(config.jobs);
      setup_thread_pool(&config)?;

      let inputs = collect_inputs(&resolve_inputs(inputs, &config)?)?;
      let metadata = match document_metadata {
        Some(path) => batch::load_document_metadata(&path)?,
        None => HashMap::new(),
      };

      info!(
        "Rendering {} files as {} ({})",
        inputs.len(),
        config.mode,
        config.language
      );
      let processor = TeiProcessor::new(config.transform_options());
      let progress = progress_bar(inputs.len(), show_progress);
      batch::render_files(
        &processor,
        &inputs,
        &config.output_dir,
        &metadata,
        &progress,
      )
      .finish(strict)
    },

    Commands::Tidy {
      inputs,
      output_dir,
      document_type,
      abbreviations,
      vocabulary,
      correct_paragraphs,
      jobs,
      strict,
    } => {
      if let Some(document_type) = document_type {
        config.document_type = document_type;
      }
      if abbreviations.is_some() {
        config.abbreviations = abbreviations;
      }
      if vocabulary.is_some() {
        config.ocr_vocabulary = vocabulary;
      }
      if let Some(output_dir) = output_dir {
        config.output_dir = output_dir;
      }
      config.correct_paragraphs |= correct_paragraphs;
      config.jobs = jobs.or(config.jobs);
      config.validate_paths()?;
      setup_thread_pool(&config)?;

      let options = config.good_xml_options()?;
      let inputs = collect_inputs(&resolve_inputs(inputs, &config)?)?;
      info!(
        "Cleaning {} files as {} documents",
        inputs.len(),
        options.document_type
      );
      let progress = progress_bar(inputs.len(), show_progress);
      batch::tidy_files(&options, &inputs, &config.output_dir, &progress)
        .finish(strict)
    },

    Commands::Abbreviations { inputs, output } => {
      let files: Vec<PathBuf> = collect_inputs(&inputs)?
        .into_iter()
        .map(|input| input.path)
        .collect();
      let dictionary: AbbreviationDictionary =
        abbreviations::build_dictionary(&files)
          .wrap_err("Failed to build abbreviation dictionary")?;
      fs::write(&output, dictionary.to_json()?)
        .wrap_err_with(|| format!("Failed to write {}", output.display()))?;
      info!(
        "Wrote {} abbreviations from {} files to {}",
        dictionary.len(),
        files.len(),
        output.display()
      );
      Ok(())
    },

    Commands::Stats {
      input_dir,
      collection,
      metadata,
      output_dir,
      jobs,
    } => {
      if input_dir.is_some() {
        config.input_dir = input_dir;
      }
      if collection.is_some() {
        config.collection_id = collection;
      }
      if metadata.is_some() {
        config.metadata_file = metadata;
      }
      config.jobs = jobs.or(config.jobs);
      config.validate_paths()?;
      setup_thread_pool(&config)?;

      let Some(root) = config.input_dir.as_deref() else {
        bail!("No collection directory given. Pass one or set input_dir.");
      };
      let Some(collection_id) = config.collection_id else {
        bail!("No collection id given. Pass --collection or set collection_id.");
      };
      let Some(metadata_file) = config.metadata_file.as_deref() else {
        bail!("No metadata file given. Pass --metadata or set metadata_file.");
      };
      let output_dir =
        output_dir.unwrap_or_else(|| monthly_report_dir(&config.output_dir));

      let run = StatsRun {
        root,
        collection_id,
        url_template: &config.url_template,
      };
      let progress = progress_bar(0, show_progress);
      let written = run_stats(&run, metadata_file, &output_dir, &progress)?;
      for path in written {
        info!("Wrote {}", path.display());
      }
      Ok(())
    },
  }
}

fn init(
  output: &Path,
  format: &str,
  vocabulary: Option<&Path>,
  force: bool,
) -> Result<()> {
  for path in std::iter::once(output).chain(vocabulary) {
    // Check if file already exists and that we're not forcing overwrite
    if path.exists() && !force {
      bail!(
        "File already exists: {}. Use --force to overwrite.",
        path.display()
      );
    }

    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
      && !parent.exists()
    {
      fs::create_dir_all(parent).wrap_err_with(|| {
        format!("Failed to create directory: {}", parent.display())
      })?;
      info!("Created directory: {}", parent.display());
    }
  }

  Config::generate_default_config(format, output).wrap_err_with(|| {
    format!("Failed to generate configuration file: {}", output.display())
  })?;

  if let Some(vocabulary) = vocabulary {
    write_default_vocabulary(vocabulary)?;
  }

  info!(
    "Configuration file created successfully. Edit it to customize your \
     edition's settings."
  );
  Ok(())
}

/// Inputs from the command line, or the configured input directory.
fn resolve_inputs(inputs: Vec<PathBuf>, config: &Config) -> Result<Vec<PathBuf>> {
  if !inputs.is_empty() {
    return Ok(inputs);
  }
  match config.input_dir {
    Some(ref input_dir) => Ok(vec![input_dir.clone()]),
    None => bail!("No inputs given. Pass files or directories, or set input_dir."),
  }
}

fn setup_thread_pool(config: &Config) -> Result<()> {
  let thread_count = config.jobs.unwrap_or_else(num_cpus::get);
  rayon::ThreadPoolBuilder::new()
    .num_threads(thread_count)
    .build_global()?;
  Ok(())
}
