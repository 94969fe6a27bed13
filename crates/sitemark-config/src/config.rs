use std::{
  fs,
  path::{Path, PathBuf},
  str::FromStr,
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;

/// File names probed, in order, when no config file is given.
pub const CONFIG_FILENAMES: [&str; 5] = [
  "sitemark.toml",
  "sitemark.json",
  ".sitemark.toml",
  ".sitemark.json",
  ".config/sitemark.toml",
];

/// Configuration for a sitemark build.
///
/// Fields are usually loaded from a TOML or JSON file, adjusted with
/// `--config KEY=VALUE` overrides, and finally with CLI flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(
  clippy::struct_excessive_bools,
  reason = "Config struct with related boolean flags"
)]
pub struct Config {
  /// Directory holding the markdown sources.
  pub content_dir: PathBuf,

  /// Sitemap outline file.
  pub sitemap: PathBuf,

  /// Output directory for rendered pages.
  pub output_dir: PathBuf,

  /// Directory of tera layouts.
  pub template_dir: Option<PathBuf>,

  /// Flat JSON map of image paths to published file names.
  pub asset_map: Option<PathBuf>,

  /// Number of render threads. Defaults to the number of CPU cores.
  pub jobs: Option<usize>,

  /// Class of the self-link inside every heading.
  pub anchor_class: String,

  /// Render `@[youtube](id)` and `@[vimeo](id)` as embedded players.
  pub video_embeds: bool,

  /// Reject sitemaps that declare a file or URL twice.
  pub strict_sitemap: bool,

  /// Run the link integrity check over the rendered site.
  pub check_links: bool,

  /// Write `pages.json` next to the rendered pages.
  pub write_registry: bool,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      content_dir:    PathBuf::from("content"),
      sitemap:        PathBuf::from("sitemap.yml"),
      output_dir:     PathBuf::from("build"),
      template_dir:   None,
      asset_map:      None,
      jobs:           None,
      anchor_class:   "anchor".to_string(),
      video_embeds:   true,
      strict_sitemap: false,
      check_links:    true,
      write_registry: true,
    }
  }
}

impl Config {
  /// Load configuration from a TOML or JSON file.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format is
  /// unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    Self::from_table(read_table(path)?, path)
  }

  /// Load configuration from the given files, or a discovered one, then
  /// apply `KEY=VALUE` overrides.
  ///
  /// Several files are merged key by key in order: a later file overrides
  /// only the keys it sets. With no files and nothing discovered, the
  /// defaults are used.
  ///
  /// # Errors
  ///
  /// Returns an error if a file cannot be loaded or an override is invalid.
  pub fn load(
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut config = if config_files.is_empty() {
      match Self::find_config_file() {
        Some(discovered) => {
          log::info!("Using discovered config file: {}", discovered.display());
          Self::from_file(&discovered)?
        },
        None => Self::default(),
      }
    } else {
      let mut merged = Map::new();
      for path in config_files {
        let table = read_table(path)?;
        Self::from_table(table.clone(), path)?;
        merged.extend(table);
      }
      if config_files.len() > 1 {
        log::info!("Loaded and merged {} config files", config_files.len());
      }
      serde_json::from_value(Value::Object(merged)).map_err(|e| {
        ConfigError::Config(format!("Failed to merge config files: {e}"))
      })?
    };

    config.apply_overrides(config_overrides)?;
    Ok(config)
  }

  fn from_table(
    table: Map<String, Value>,
    path: &Path,
  ) -> Result<Self, ConfigError> {
    serde_json::from_value(Value::Object(table)).map_err(|source| {
      ConfigError::Serde {
        path: path.to_path_buf(),
        source,
      }
    })
  }

  /// Apply configuration overrides from KEY=VALUE strings.
  ///
  /// # Errors
  ///
  /// Returns an error if an override is not in KEY=VALUE format, names an
  /// unknown key, or has a value of the wrong type.
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

  /// Set one field from its string form.
  ///
  /// Optional fields are cleared by an empty value.
  ///
  /// # Errors
  ///
  /// Returns an error for unknown keys and unparsable values.
  pub fn apply_override(
    &mut self,
    key: &str,
    value: &str,
  ) -> Result<(), ConfigError> {
    match key {
      "content_dir" => self.content_dir = PathBuf::from(value),
      "sitemap" => self.sitemap = PathBuf::from(value),
      "output_dir" => self.output_dir = PathBuf::from(value),
      "template_dir" => self.template_dir = optional_path(value),
      "asset_map" => self.asset_map = optional_path(value),
      "jobs" => {
        self.jobs = if value.is_empty() {
          None
        } else {
          Some(parse_value(key, value, "Expected a positive integer")?)
        };
      },
      "anchor_class" => self.anchor_class = value.to_string(),
      "video_embeds" => self.video_embeds = parse_bool(key, value)?,
      "strict_sitemap" => self.strict_sitemap = parse_bool(key, value)?,
      "check_links" => self.check_links = parse_bool(key, value)?,
      "write_registry" => self.write_registry = parse_bool(key, value)?,
      _ => {
        return Err(ConfigError::Config(format!(
          "Unknown configuration key: '{key}'. See documentation for \
           supported keys."
        )));
      },
    }
    Ok(())
  }

  /// Path of a layout inside the template directory, if one is configured.
  ///
  /// This method does not check if the returned path exists.
  #[must_use]
  pub fn get_template_file(&self, name: &str) -> Option<PathBuf> {
    self.template_dir.as_ref().map(|dir| dir.join(name))
  }

  /// Search for config files in the current directory.
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    let current_dir = std::env::current_dir().ok()?;
    Self::find_config_file_in(&current_dir)
  }

  /// Search for config files in `dir`.
  #[must_use]
  pub fn find_config_file_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
      .iter()
      .map(|name| dir.join(name))
      .find(|path| path.is_file())
  }

  /// Validate all paths specified in the configuration.
  ///
  /// Every problem is collected, so one run reports all of them.
  ///
  /// # Errors
  ///
  /// Returns an error if any configured path does not exist or has the wrong
  /// type.
  pub fn validate_paths(&self) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if !self.content_dir.is_dir() {
      errors.push(format!(
        "Content directory does not exist: {}",
        self.content_dir.display()
      ));
    }

    if !self.sitemap.is_file() {
      errors.push(format!(
        "Sitemap file does not exist: {}",
        self.sitemap.display()
      ));
    }

    if let Some(ref template_dir) = self.template_dir {
      if !template_dir.exists() {
        errors.push(format!(
          "Template directory does not exist: {}",
          template_dir.display()
        ));
      } else if !template_dir.is_dir() {
        errors.push(format!(
          "Template directory path is not a directory: {}",
          template_dir.display()
        ));
      }
    }

    if let Some(ref asset_map) = self.asset_map {
      if !asset_map.is_file() {
        errors.push(format!(
          "Asset map file does not exist: {}",
          asset_map.display()
        ));
      }
    }

    if self.jobs == Some(0) {
      errors.push("Number of jobs must be at least 1".to_string());
    }

    if !errors.is_empty() {
      let error_message = errors.join("\n");
      return Err(ConfigError::Config(format!(
        "Configuration path validation errors:\n{error_message}"
      )));
    }

    Ok(())
  }

  /// Write a default configuration file.
  ///
  /// # Errors
  ///
  /// Returns an error if the format is unsupported or the file cannot be
  /// written.
  pub fn generate_default_config(
    format: &str,
    path: &Path,
  ) -> Result<(), ConfigError> {
    let config_content = crate::templates::get_template(format)?;

    fs::write(path, config_content).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to write default config to {}: {e}",
        path.display()
      ))
    })?;

    log::info!("Created default configuration file: {}", path.display());
    Ok(())
  }
}

/// Read a config file into its raw keys, without filling in defaults.
fn read_table(path: &Path) -> Result<Map<String, Value>, ConfigError> {
  let content = fs::read_to_string(path).map_err(|source| {
    ConfigError::Io {
      path: path.to_path_buf(),
      source,
    }
  })?;

  let extension = path
    .extension()
    .and_then(|ext| ext.to_str())
    .map(str::to_lowercase);

  match extension.as_deref() {
    Some("json") => {
      serde_json::from_str(&content).map_err(|source| {
        ConfigError::Serde {
          path: path.to_path_buf(),
          source,
        }
      })
    },
    Some("toml") => {
      toml::from_str(&content).map_err(|source| {
        ConfigError::Toml {
          path: path.to_path_buf(),
          source,
        }
      })
    },
    Some(_) => {
      Err(ConfigError::Config(format!(
        "Unsupported config file format: {}",
        path.display()
      )))
    },
    None => {
      Err(ConfigError::Config(format!(
        "Config file has no extension: {}",
        path.display()
      )))
    },
  }
}

fn optional_path(value: &str) -> Option<PathBuf> {
  (!value.is_empty()).then(|| PathBuf::from(value))
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

fn parse_value<T: FromStr>(
  key: &str,
  value: &str,
  expected: &str,
) -> Result<T, ConfigError> {
  value.parse().map_err(|_| {
    ConfigError::Config(format!(
      "Invalid value for '{key}': '{value}'. {expected}"
    ))
  })
}
