//! Command handlers of the sitemark binary, exposed for integration tests.
pub mod cli;

use std::{fs, path::Path};

use cli::{Cli, Commands};
use color_eyre::eyre::{Context, Result, bail};
use log::info;
use sitemark_config::Config;
use sitemark_html::check_site;
use sitemark_utils::{build_site, load_site_registry};

/// Run the command given on the command line.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or the command
/// fails.
pub fn run(cli: &Cli) -> Result<()> {
  if let Commands::Init {
    output,
    format,
    force,
  } = &cli.command
  {
    return init(output, format, *force);
  }

  let mut config = Config::load(&cli.config_files, &cli.config_overrides)
    .wrap_err("Failed to load configuration")?;
  cli.command.merge_into(&mut config);

  match &cli.command {
    Commands::Build { .. } => build(&config),
    Commands::Registry { .. } => {
      let registry = load_site_registry(&config)?;
      #[allow(clippy::print_stdout, reason = "Registry JSON is the output")]
      {
        println!("{}", registry.to_json()?);
      }
      Ok(())
    },
    Commands::Check { .. } => check(&config.output_dir),
    Commands::Init { .. } => Ok(()),
  }
}

fn init(output: &Path, format: &str, force: bool) -> Result<()> {
  // Check if file already exists and that we're not forcing overwrite
  if output.exists() && !force {
    bail!(
      "Configuration file already exists: {}. Use --force to overwrite.",
      output.display()
    );
  }

  if let Some(parent) = output.parent() {
    if !parent.as_os_str().is_empty() && !parent.exists() {
      fs::create_dir_all(parent).wrap_err_with(|| {
        format!("Failed to create directory: {}", parent.display())
      })?;
      info!("Created directory: {}", parent.display());
    }
  }

  Config::generate_default_config(format, output).wrap_err_with(|| {
    format!("Failed to generate configuration file: {}", output.display())
  })?;

  info!(
    "Configuration file created successfully. Edit it to point sitemark at \
     your content and sitemap."
  );
  Ok(())
}

fn build(config: &Config) -> Result<()> {
  info!("Starting site build...");
  let report = build_site(config)?;

  if !report.broken_anchors.is_empty() {
    info!(
      "{} links point to anchors that do not exist",
      report.broken_anchors.len()
    );
  }
  if let Some(integrity) = &report.integrity {
    if !integrity.is_clean() {
      bail!(
        "{} broken links found in {}",
        integrity.issues.len(),
        config.output_dir.display()
      );
    }
  }
  Ok(())
}

fn check(output_dir: &Path) -> Result<()> {
  let report = check_site(output_dir)?;
  if !report.is_clean() {
    bail!(
      "{} broken links found in {}",
      report.issues.len(),
      output_dir.display()
    );
  }
  info!("No broken links in {}", output_dir.display());
  Ok(())
}
