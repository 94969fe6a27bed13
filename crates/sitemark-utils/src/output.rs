use std::{
  collections::HashSet,
  fs,
  path::{Path, PathBuf},
};

use color_eyre::eyre::{Context, Result};
use log::{debug, warn};
use sitemark_sitemap::{PageRegistry, normalize_file};
use walkdir::WalkDir;

use crate::markdown::RenderedPage;

/// Name of the registry dump written next to the pages.
pub const REGISTRY_FILE: &str = "pages.json";

/// Output file of the page at `url`: `<output_dir>/<url>/index.html`.
///
/// Empty, `.` and `..` segments are dropped so no URL can escape
/// `output_dir`.
#[must_use]
pub fn page_output_path(output_dir: &Path, url: &str) -> PathBuf {
  let mut path = output_dir.to_path_buf();
  for segment in url
    .split('/')
    .filter(|s| !s.is_empty() && *s != "." && *s != "..")
  {
    path.push(segment);
  }
  path.push("index.html");
  path
}

/// Write one rendered page, creating its directories.
///
/// # Errors
///
/// Returns an error if the directory or the file cannot be created.
pub fn write_page(output_dir: &Path, page: &RenderedPage) -> Result<PathBuf> {
  let path = page_output_path(output_dir, &page.url);
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).wrap_err_with(|| {
      format!("Failed to create directory: {}", parent.display())
    })?;
  }
  fs::write(&path, &page.html)
    .wrap_err_with(|| format!("Failed to write page: {}", path.display()))?;
  debug!("Wrote {} ({})", path.display(), page.file);
  Ok(path)
}

/// Write the registry as `pages.json` into `output_dir`.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_registry(
  output_dir: &Path,
  registry: &PageRegistry,
) -> Result<PathBuf> {
  let path = output_dir.join(REGISTRY_FILE);
  let json = registry.to_json()?;
  fs::write(&path, json)
    .wrap_err_with(|| format!("Failed to write registry: {}", path.display()))?;
  Ok(path)
}

/// Collects all markdown files from the content directory.
#[must_use]
pub fn collect_markdown_files(content_dir: &Path) -> Vec<PathBuf> {
  let mut files = Vec::new();

  for entry in WalkDir::new(content_dir)
    .follow_links(true)
    .sort_by_file_name()
    .into_iter()
    .filter_map(Result::ok)
  {
    let path = entry.path();
    if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
      files.push(path.to_owned());
    }
  }

  files
}

/// Markdown files of `content_dir` that no sitemap entry points to.
#[must_use]
pub fn find_orphans(
  content_dir: &Path,
  registry: &PageRegistry,
) -> Vec<String> {
  let known: HashSet<&str> =
    registry.md2url.keys().map(String::as_str).collect();

  let orphans: Vec<String> = collect_markdown_files(content_dir)
    .iter()
    .filter_map(|path| path.strip_prefix(content_dir).ok())
    .map(|relative| normalize_file(&relative.to_string_lossy()))
    .filter(|file| !known.contains(file.as_str()))
    .collect();

  for orphan in &orphans {
    warn!("{orphan} is not listed in the sitemap and will not be published");
  }
  orphans
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn output_paths() {
    let out = Path::new("build");
    assert_eq!(page_output_path(out, "/"), out.join("index.html"));
    assert_eq!(
      page_output_path(out, "/free/models"),
      out.join("free").join("models").join("index.html")
    );
    assert_eq!(
      page_output_path(out, "/a//../b/"),
      out.join("a").join("b").join("index.html")
    );
  }
}
