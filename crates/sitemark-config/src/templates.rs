//! Default configuration files written by `sitemark init`.
use crate::{config::Config, error::ConfigError};

/// Default configuration in TOML, with every key explained.
pub const DEFAULT_TOML_TEMPLATE: &str = r#"# sitemark configuration

# Directory holding the markdown sources referenced by the sitemap
content_dir = "content"

# Sitemap outline, entries look like `Title [url, file.md]`
sitemap = "sitemap.yml"

# Where rendered pages are written
output_dir = "build"

# Directory of tera layouts; sitemap entries may pick one with
# {layout: 'name.html'}
# template_dir = "templates"

# Flat JSON object mapping image paths to published file names
# asset_map = "assets.json"

# Number of render threads (defaults to the number of CPU cores)
# jobs = 4

# Class of the self-link wrapped around every heading
anchor_class = "anchor"

# Turn @[youtube](id) and @[vimeo](id) into embedded players
video_embeds = true

# Fail when the sitemap declares a file or URL twice
strict_sitemap = false

# Check every link and anchor of the rendered site after the build
check_links = true

# Write the page registry to <output_dir>/pages.json
write_registry = true
"#;

/// Default configuration in the requested format.
///
/// TOML output is the commented template above; JSON has no comments, so it
/// is the serialized default config.
///
/// # Errors
///
/// Returns [`ConfigError::UnsupportedFormat`] for anything but `toml` or
/// `json`.
pub fn get_template(format: &str) -> Result<String, ConfigError> {
  match format.to_lowercase().as_str() {
    "toml" => Ok(DEFAULT_TOML_TEMPLATE.to_string()),
    "json" => serde_json::to_string_pretty(&Config::default()).map_err(|e| {
      ConfigError::Config(format!("Failed to serialize default config: {e}"))
    }),
    _ => Err(ConfigError::UnsupportedFormat(format.to_string())),
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use super::*;

  #[test]
  fn toml_template_matches_defaults() {
    let parsed: Config = toml::from_str(DEFAULT_TOML_TEMPLATE).unwrap();
    assert_eq!(parsed, Config::default());
  }

  #[test]
  fn json_template_round_trips() {
    let json = get_template("JSON").unwrap();
    let parsed: Config = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, Config::default());
  }

  #[test]
  fn unknown_format() {
    assert!(matches!(
      get_template("yaml").unwrap_err(),
      ConfigError::UnsupportedFormat(_)
    ));
  }
}
