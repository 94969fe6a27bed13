use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort the rendering of a single document.
///
/// Every variant names the source file so that a build collecting many
/// failures can report each one without extra context.
#[derive(Debug, Error)]
pub enum RenderError {
  #[error("Empty markdown input in {file}")]
  EmptyDocument { file: String },

  #[error(
    "Malformed link in {file} on line {line}: unclosed bracket in '{snippet}'"
  )]
  UnclosedBracket {
    file:    String,
    line:    usize,
    snippet: String,
  },

  #[error(
    "Malformed link in {file} on line {line}: unclosed URL in '{snippet}'"
  )]
  UnclosedUrl {
    file:    String,
    line:    usize,
    snippet: String,
  },

  #[error("Unknown relative link type: '{resolved}' in {file}")]
  UnknownLinkType { resolved: String, file: String },

  #[error("Unresolved link '{target}' (looked up as '{resolved}') in {file}")]
  UnresolvedLink {
    target:   String,
    resolved: String,
    file:     String,
  },

  #[error("Failed to format HTML for {file}: {source}")]
  Format {
    file:   String,
    #[source]
    source: std::fmt::Error,
  },

  #[error("Failed to read asset map {}: {message}", path.display())]
  AssetMap { path: PathBuf, message: String },
}

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;
