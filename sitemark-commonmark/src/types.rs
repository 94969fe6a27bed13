//! Types for the sitemark-commonmark public API.
use serde::{Deserialize, Serialize};

/// A heading of a Markdown document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Header {
  /// Heading text with inline markup and `{#id}` removed.
  pub text:    String,
  /// Heading level (1-6).
  pub level:   u8,
  /// Hierarchical or explicit anchor.
  pub id:      String,
  /// Other anchors that should resolve to `id`, GitHub-style forms first.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub aliases: Vec<String>,
}

impl Header {
  /// Whether `anchor` refers to this heading, either by id or by alias.
  #[must_use]
  pub fn answers_to(&self, anchor: &str) -> bool {
    self.id == anchor || self.aliases.iter().any(|alias| alias == anchor)
  }
}

/// A link whose anchor matched no heading of the target document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BrokenAnchor {
  /// Link target as written in the source.
  pub target: String,
  /// Decoded anchor that failed to resolve.
  pub anchor: String,
}

/// Result of rendering one document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarkdownResult {
  /// Rendered HTML body.
  pub html: String,

  /// Headings in document order, for the table of contents.
  pub headers: Vec<Header>,

  /// Text of the first H1, if any.
  pub title: Option<String>,

  /// Anchors that could not be matched while resolving links.
  pub broken_anchors: Vec<BrokenAnchor>,
}
