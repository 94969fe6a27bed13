use std::{io, path::PathBuf};

use thiserror::Error;

/// Error type for sitemap parsing and registry construction.
#[derive(Debug, Error)]
pub enum SitemapError {
  #[error("Sitemap file not found: {}", .0.display())]
  Missing(PathBuf),

  #[error("Failed to read sitemap {}: {source}", path.display())]
  Read {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Sitemap contains no valid entries")]
  Empty,

  #[error("Duplicate URL '{url}' in sitemap (files '{first}' and '{second}')")]
  DuplicateUrl {
    url:    String,
    first:  String,
    second: String,
  },

  #[error(
    "Duplicate file '{file}' in sitemap (URLs '{first}' and '{second}')"
  )]
  DuplicateFile {
    file:   String,
    first:  String,
    second: String,
  },

  #[error("Serde error: {0}")]
  Serde(#[from] serde_json::Error),
}
