use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sitemark_config::Config;

/// Command line interface for sitemark
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about = "sitemark: sitemap-driven static site builder"
)]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`])
  #[command(subcommand)]
  pub command: Commands,

  /// Enable verbose debug logging
  #[arg(short, long, global = true)]
  pub verbose: bool,

  /// Path to configuration file(s) (TOML or JSON, can be specified multiple
  /// times). Multiple files are merged in order, with later files overriding
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

/// All supported subcommands for the sitemark CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Build the site: render every page of the sitemap into the output
  /// directory.
  Build {
    /// Directory containing the markdown sources.
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Output directory for the rendered site.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Sitemap outline file.
    #[arg(short, long)]
    sitemap: Option<PathBuf>,

    /// Directory containing tera layouts.
    #[arg(short, long)]
    template_dir: Option<PathBuf>,

    /// Number of threads to use for parallel rendering.
    #[arg(short = 'p', long = "jobs")]
    jobs: Option<usize>,

    /// Reject sitemaps that declare a file or URL twice.
    #[arg(long)]
    strict: bool,
  },

  /// Initialize a new sitemark configuration file
  Init {
    /// Path to create the configuration file at
    #[arg(short, long, default_value = "sitemark.toml")]
    output: PathBuf,

    /// Format of the configuration file.
    #[arg(
      short = 'F',
      long,
      default_value = "toml",
      value_parser = ["toml", "json"]
    )]
    format: String,

    /// Force overwrite if file already exists
    #[arg(short, long)]
    force: bool,
  },

  /// Print the page registry built from the sitemap as JSON.
  Registry {
    /// Sitemap outline file.
    #[arg(short, long)]
    sitemap: Option<PathBuf>,

    /// Reject sitemaps that declare a file or URL twice.
    #[arg(long)]
    strict: bool,
  },

  /// Check links and anchors of an already built site.
  Check {
    /// Output directory of a previous build.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
  },
}

impl Cli {
  /// Parse command line arguments into a [`Cli`] struct.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}

impl Commands {
  /// Apply flags of this subcommand on top of `config`; flags take
  /// precedence over config files and overrides.
  pub fn merge_into(&self, config: &mut Config) {
    match self {
      Self::Build {
        input_dir,
        output_dir,
        sitemap,
        template_dir,
        jobs,
        strict,
      } => {
        if let Some(input_dir) = input_dir {
          config.content_dir.clone_from(input_dir);
        }
        if let Some(output_dir) = output_dir {
          config.output_dir.clone_from(output_dir);
        }
        if let Some(sitemap) = sitemap {
          config.sitemap.clone_from(sitemap);
        }
        if let Some(template_dir) = template_dir {
          config.template_dir = Some(template_dir.clone());
        }
        config.jobs = jobs.or(config.jobs);
        config.strict_sitemap |= *strict;
      },
      Self::Registry { sitemap, strict } => {
        if let Some(sitemap) = sitemap {
          config.sitemap.clone_from(sitemap);
        }
        config.strict_sitemap |= *strict;
      },
      Self::Check { output_dir } => {
        if let Some(output_dir) = output_dir {
          config.output_dir.clone_from(output_dir);
        }
      },
      Self::Init { .. } => {},
    }
  }
}
