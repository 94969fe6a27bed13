#![allow(clippy::unwrap_used, reason = "Fine in tests")]

use std::{fs, path::Path};

use sitemark_config::Config;
use sitemark_sitemap::PageRegistry;
use sitemark_utils::{REGISTRY_FILE, build_site, load_site_registry};
use tempfile::TempDir;

const SITEMAP: &str = "sitemap:
  - Home [/, index.md]
    - About [/about, about.md]
  - Free [free, free/index.md]
    - Models [models, free/models.md]
";

fn write(root: &Path, relative: &str, content: &str) {
  let path = root.join(relative);
  fs::create_dir_all(path.parent().unwrap()).unwrap();
  fs::write(path, content).unwrap();
}

fn site(dir: &Path) -> Config {
  let content = dir.join("content");
  write(dir, "sitemap.yml", SITEMAP);
  write(
    &content,
    "index.md",
    "# Home\n\nRead [about us](about.md#team) and the \
     [models](free/models.md).\n",
  );
  write(&content, "about.md", "# About\n\n## Team\n\nPeople.\n");
  write(
    &content,
    "free/index.md",
    "# Free\n\n![logo](logo.png)\n\nSee [pricing](models.md#мультимедиа).\n",
  );
  write(
    &content,
    "free/models.md",
    "# Мультимедиа\n\n## Выбор приложения\n\n### Навигации\n\nBack to \
     [free](index.md).\n",
  );

  Config {
    content_dir: content,
    sitemap: dir.join("sitemap.yml"),
    output_dir: dir.join("build"),
    jobs: Some(2),
    ..Default::default()
  }
}

#[test]
fn builds_whole_site() {
  let dir = TempDir::new().unwrap();
  let config = site(dir.path());

  let report = build_site(&config).unwrap();
  assert_eq!(report.pages, 4);
  assert!(report.broken_anchors.is_empty(), "{:?}", report.broken_anchors);
  assert!(report.orphans.is_empty());
  let integrity = report.integrity.unwrap();
  assert!(integrity.is_clean(), "{:?}", integrity.issues);

  let out = dir.path().join("build");
  let home = fs::read_to_string(out.join("index.html")).unwrap();
  assert!(home.contains("href=\"/about#about-team\""));
  assert!(home.contains("href=\"/free/models\""));

  let models =
    fs::read_to_string(out.join("free/models/index.html")).unwrap();
  assert!(models.contains("id=мультимедиа-выбор-приложения-навигации"));
  assert!(models.contains("href=\"/free\""));

  let free = fs::read_to_string(out.join("free/index.html")).unwrap();
  assert!(free.contains("src=\"/free/logo.png\""));
  assert!(free.contains("href=\"/free/models#"));

  let json = fs::read_to_string(out.join(REGISTRY_FILE)).unwrap();
  let registry: PageRegistry = serde_json::from_str(&json).unwrap();
  assert_eq!(registry.sitemap, vec!["/", "/about", "/free", "/free/models"]);
  assert_eq!(registry.md2url["free/models.md"], "/free/models");
}

#[test]
fn failing_pages_are_collected() {
  let dir = TempDir::new().unwrap();
  let config = site(dir.path());
  write(&config.content_dir, "about.md", "See [nowhere](missing.md).\n");
  fs::remove_file(config.content_dir.join("free/models.md")).unwrap();

  let err = build_site(&config).unwrap_err();
  assert_eq!(err.to_string(), "2 of 4 pages failed to render");
  assert!(!config.output_dir.join("index.html").exists());
}

#[test]
fn orphans_and_disabled_checks() {
  let dir = TempDir::new().unwrap();
  let mut config = site(dir.path());
  write(&config.content_dir, "drafts/idea.md", "# Idea\n");
  config.check_links = false;
  config.write_registry = false;

  let report = build_site(&config).unwrap();
  assert_eq!(report.orphans, vec!["drafts/idea.md"]);
  assert!(report.integrity.is_none());
  assert!(!config.output_dir.join(REGISTRY_FILE).exists());
}

#[test]
fn strict_sitemap_rejects_duplicates() {
  let dir = TempDir::new().unwrap();
  let mut config = site(dir.path());
  write(
    dir.path(),
    "sitemap.yml",
    "Home [/, index.md]\n  - Again [/, about.md]\n",
  );

  load_site_registry(&config).unwrap();
  config.strict_sitemap = true;
  let err = load_site_registry(&config).unwrap_err();
  assert!(format!("{err:#}").contains("Duplicate URL '/'"));
}
