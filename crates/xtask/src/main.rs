use std::{
  fs,
  path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate_to, shells};
use clap_mangen::Man;

const BIN_NAME: &str = "teiform";

#[derive(Parser)]
#[command(author, version, about)]
struct Xtask {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build distribution artifacts for the teiform CLI
  Dist {
    /// Output directory for generated files.
    #[arg(short, long, default_value = "dist", value_parser = clap::value_parser!(std::path::PathBuf))]
    output_dir: PathBuf,

    /// Only generate shell completions.
    #[arg(long, conflicts_with = "manpage_only")]
    completions_only: bool,

    /// Only generate manpages.
    #[arg(long, conflicts_with = "completions_only")]
    manpage_only: bool,
  },
}

fn main() -> Result<()> {
  let xtask = Xtask::parse();

  match xtask.command {
    Commands::Dist {
      output_dir,
      completions_only,
      manpage_only,
    } => {
      if !manpage_only {
        generate_completions(&output_dir)?;
      }
      if !completions_only {
        generate_manpages(&output_dir)?;
      }
    },
  }

  Ok(())
}

/// Generate shell completions for various shells.
fn generate_completions(output_dir: &Path) -> Result<()> {
  let completions_dir = output_dir.join("completions");
  fs::create_dir_all(&completions_dir)?;
  let mut cmd = teiform::cli::Cli::command();
  generate_to(shells::Bash, &mut cmd, BIN_NAME, &completions_dir)?;
  generate_to(shells::Zsh, &mut cmd, BIN_NAME, &completions_dir)?;
  generate_to(shells::Fish, &mut cmd, BIN_NAME, &completions_dir)?;
  generate_to(shells::Elvish, &mut cmd, BIN_NAME, &completions_dir)?;
  generate_to(shells::PowerShell, &mut cmd, BIN_NAME, &completions_dir)?;
  println!(
    "Shell completions generated in {}",
    completions_dir.display()
  );
  Ok(())
}

fn render_manpage(man: &Man, file_path: &Path) -> Result<()> {
  let mut file = fs::File::create(file_path).with_context(|| {
    format!("Failed to create manpage file at {}", file_path.display())
  })?;
  man
    .render(&mut file)
    .with_context(|| format!("Failed to render {}", file_path.display()))
}

/// Generate `teiform.1` and one page per subcommand, e.g.
/// `teiform-render.1`.
fn generate_manpages(output_dir: &Path) -> Result<()> {
  let man_dir = output_dir.join("man");
  fs::create_dir_all(&man_dir)?;

  let cmd = teiform::cli::Cli::command();
  for sub in cmd.get_subcommands() {
    let name = format!("{BIN_NAME}-{}", sub.get_name());
    let man = Man::new(sub.clone()).title(name.clone());
    render_manpage(&man, &man_dir.join(format!("{name}.1")))?;
  }
  render_manpage(&Man::new(cmd), &man_dir.join(format!("{BIN_NAME}.1")))?;

  println!("Manpages generated in {}", man_dir.display());
  Ok(())
}
