//! Sitemap outline parsing and the page registry.
//!
//! The sitemap is the single source of truth for which markdown file is
//! published under which URL. It is read once per build:
//!
//! 1. [`outline::parse_indented`] reads the raw outline lines,
//! 2. [`tree::build_tree`] nests them by indentation,
//! 3. [`registry::PageRegistry::flatten`] derives URLs, titles, sections and
//!    breadcrumbs for every page.
use std::{fs, path::Path};

pub mod error;
pub mod outline;
pub mod registry;
pub mod tree;

pub use crate::{
  error::SitemapError,
  outline::{SitemapLine, parse_line},
  registry::{Page, PageRegistry, normalize_file},
  tree::{SitemapEntry, SitemapNode, build_full_url},
};

/// Parse sitemap text into a tree.
///
/// # Errors
///
/// Returns [`SitemapError::Empty`] if no line of `text` is a valid entry.
pub fn parse_sitemap(text: &str) -> Result<Vec<SitemapNode>, SitemapError> {
  let tree = tree::build_tree(outline::parse_indented(text));
  if tree.is_empty() {
    return Err(SitemapError::Empty);
  }
  Ok(tree)
}

/// Read and parse the sitemap file at `path`.
///
/// # Errors
///
/// Returns an error if the file is missing, unreadable, or holds no valid
/// entries.
pub fn load_sitemap(path: &Path) -> Result<Vec<SitemapNode>, SitemapError> {
  if !path.exists() {
    return Err(SitemapError::Missing(path.to_path_buf()));
  }
  let text = fs::read_to_string(path).map_err(|source| {
    SitemapError::Read {
      path: path.to_path_buf(),
      source,
    }
  })?;
  parse_sitemap(&text)
}

/// Load the sitemap at `path` and flatten it into a registry.
///
/// # Errors
///
/// Returns an error if the sitemap cannot be loaded, or if `strict` is set
/// and the sitemap declares a file or URL twice.
pub fn load_registry(
  path: &Path,
  strict: bool,
) -> Result<PageRegistry, SitemapError> {
  let tree = load_sitemap(path)?;
  if strict {
    PageRegistry::flatten_strict(&tree)
  } else {
    Ok(PageRegistry::flatten(&tree))
  }
}
