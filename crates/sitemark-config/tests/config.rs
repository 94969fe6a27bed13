#![allow(clippy::unwrap_used, reason = "Fine in tests")]

use std::{fs, path::PathBuf};

use sitemark_config::{Config, ConfigError};
use tempfile::TempDir;

#[test]
fn loads_toml_and_json() {
  let dir = TempDir::new().unwrap();
  let toml_path = dir.path().join("site.toml");
  fs::write(
    &toml_path,
    "content_dir = \"docs\"\nvideo_embeds = false\njobs = 3\n",
  )
  .unwrap();
  let json_path = dir.path().join("site.json");
  fs::write(&json_path, r#"{"output_dir": "public", "check_links": false}"#)
    .unwrap();

  let from_toml = Config::from_file(&toml_path).unwrap();
  assert_eq!(from_toml.content_dir, PathBuf::from("docs"));
  assert!(!from_toml.video_embeds);
  assert_eq!(from_toml.jobs, Some(3));
  assert_eq!(from_toml.sitemap, PathBuf::from("sitemap.yml"));

  let from_json = Config::from_file(&json_path).unwrap();
  assert_eq!(from_json.output_dir, PathBuf::from("public"));
  assert!(!from_json.check_links);
}

#[test]
fn rejects_unknown_extension() {
  let dir = TempDir::new().unwrap();
  let path = dir.path().join("site.yaml");
  fs::write(&path, "content_dir: docs").unwrap();

  let err = Config::from_file(&path).unwrap_err();
  assert!(err.to_string().contains("Unsupported config file format"));
}

#[test]
fn load_merges_files_then_overrides() {
  let dir = TempDir::new().unwrap();
  let base = dir.path().join("base.toml");
  let local = dir.path().join("local.toml");
  fs::write(&base, "template_dir = \"layouts\"\nanchor_class = \"a\"\n")
    .unwrap();
  fs::write(&local, "anchor_class = \"b\"\n").unwrap();

  let config = Config::load(&[base, local], &[
    "strict_sitemap=true".to_string(),
  ])
  .unwrap();

  assert_eq!(config.template_dir, Some(PathBuf::from("layouts")));
  assert_eq!(config.anchor_class, "b");
  assert!(config.strict_sitemap);
}

#[test]
fn later_files_override_only_the_keys_they_set() {
  let dir = TempDir::new().unwrap();
  let base = dir.path().join("base.json");
  let local = dir.path().join("local.toml");
  fs::write(
    &base,
    r#"{"content_dir": "docs", "jobs": 2, "write_registry": false}"#,
  )
  .unwrap();
  fs::write(&local, "check_links = false\n").unwrap();

  let config = Config::load(&[base, local], &[]).unwrap();

  assert_eq!(config.content_dir, PathBuf::from("docs"));
  assert_eq!(config.jobs, Some(2));
  assert!(!config.write_registry);
  assert!(!config.check_links);
  assert_eq!(config.output_dir, PathBuf::from("build"));
}

#[test]
fn load_errors_name_the_file() {
  let dir = TempDir::new().unwrap();
  let missing = dir.path().join("missing.toml");
  let err = Config::from_file(&missing).unwrap_err();
  assert!(matches!(err, ConfigError::Io { .. }));
  assert!(err.to_string().contains("missing.toml"));

  let broken_toml = dir.path().join("broken.toml");
  fs::write(&broken_toml, "content_dir = \n").unwrap();
  let err = Config::from_file(&broken_toml).unwrap_err();
  assert!(matches!(err, ConfigError::Toml { .. }));

  let bad_type = dir.path().join("bad.json");
  fs::write(&bad_type, r#"{"jobs": "many"}"#).unwrap();
  let good = dir.path().join("good.json");
  fs::write(&good, "{}").unwrap();
  let err = Config::load(&[good, bad_type], &[]).unwrap_err();
  assert!(matches!(err, ConfigError::Serde { .. }));
  assert!(err.to_string().contains("bad.json"));
}

#[test]
fn discovers_config_file_by_priority() {
  let dir = TempDir::new().unwrap();
  assert_eq!(Config::find_config_file_in(dir.path()), None);

  fs::create_dir(dir.path().join(".config")).unwrap();
  fs::write(dir.path().join(".config/sitemark.toml"), "").unwrap();
  assert_eq!(
    Config::find_config_file_in(dir.path()),
    Some(dir.path().join(".config/sitemark.toml"))
  );

  fs::write(dir.path().join("sitemark.json"), "{}").unwrap();
  fs::write(dir.path().join("sitemark.toml"), "").unwrap();
  assert_eq!(
    Config::find_config_file_in(dir.path()),
    Some(dir.path().join("sitemark.toml"))
  );
}

#[test]
fn validate_paths_reports_every_problem() {
  let dir = TempDir::new().unwrap();
  let config = Config {
    content_dir: dir.path().join("missing-content"),
    sitemap: dir.path().join("missing.yml"),
    asset_map: Some(dir.path().join("assets.json")),
    jobs: Some(0),
    ..Default::default()
  };

  let message = config.validate_paths().unwrap_err().to_string();
  assert!(message.contains("Content directory does not exist"));
  assert!(message.contains("Sitemap file does not exist"));
  assert!(message.contains("Asset map file does not exist"));
  assert!(message.contains("at least 1"));
}

#[test]
fn validate_paths_accepts_existing_layout() {
  let dir = TempDir::new().unwrap();
  fs::create_dir(dir.path().join("content")).unwrap();
  fs::write(dir.path().join("sitemap.yml"), "Home [/, index.md]\n").unwrap();

  let config = Config {
    content_dir: dir.path().join("content"),
    sitemap: dir.path().join("sitemap.yml"),
    ..Default::default()
  };
  config.validate_paths().unwrap();
}

#[test]
fn generated_defaults_load_back() {
  let dir = TempDir::new().unwrap();
  for format in ["toml", "json"] {
    let path = dir.path().join(format!("sitemark.{format}"));
    Config::generate_default_config(format, &path).unwrap();
    assert_eq!(Config::from_file(&path).unwrap(), Config::default());
  }

  let err =
    Config::generate_default_config("ini", &dir.path().join("sitemark.ini"))
      .unwrap_err();
  assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
}
