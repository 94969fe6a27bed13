//! Type definitions for the Markdown processor.
//!
//! # Examples
//!
//! ```
//! use sitemark_commonmark::{MarkdownOptionsBuilder, MarkdownProcessor};
//!
//! let options = MarkdownOptionsBuilder::new()
//!   .anchor_class("permalink")
//!   .video_embeds(false)
//!   .build();
//!
//! let processor = MarkdownProcessor::new(options);
//! assert_eq!(processor.options().anchor_class, "permalink");
//! ```
use comrak::nodes::AstNode;

/// Default class of the `<a>` wrapped around heading text.
pub const DEFAULT_ANCHOR_CLASS: &str = "anchor";

/// Options for configuring the Markdown processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownOptions {
  /// Enable tables, strikethrough, task lists and bare URL autolinks.
  pub gfm: bool,

  /// Turn `@[youtube](id)` and `@[vimeo](id)` into embedded players.
  pub video_embeds: bool,

  /// Reject unclosed `[` and `(...)` link syntax before parsing.
  pub check_link_syntax: bool,

  /// Class of the self-link inside every heading.
  pub anchor_class: String,
}

impl Default for MarkdownOptions {
  fn default() -> Self {
    Self {
      gfm:               cfg!(feature = "gfm"),
      video_embeds:      true,
      check_link_syntax: true,
      anchor_class:      DEFAULT_ANCHOR_CLASS.to_string(),
    }
  }
}

/// Main Markdown processor.
///
/// Holds only options, so one instance can be shared by every worker of a
/// parallel build.
#[derive(Debug, Clone, Default)]
pub struct MarkdownProcessor {
  pub(crate) options: MarkdownOptions,
}

/// Trait for AST transformations applied between parsing and rendering.
pub trait AstTransformer {
  fn transform<'a>(&self, node: &'a AstNode<'a>);
}

/// Builder for constructing `MarkdownOptions` with method chaining.
#[derive(Debug, Clone)]
pub struct MarkdownOptionsBuilder {
  options: MarkdownOptions,
}

impl MarkdownOptionsBuilder {
  /// Create a new builder with default options.
  #[must_use]
  pub fn new() -> Self {
    Self {
      options: MarkdownOptions::default(),
    }
  }

  #[must_use]
  pub const fn gfm(mut self, enabled: bool) -> Self {
    self.options.gfm = enabled;
    self
  }

  #[must_use]
  pub const fn video_embeds(mut self, enabled: bool) -> Self {
    self.options.video_embeds = enabled;
    self
  }

  #[must_use]
  pub const fn check_link_syntax(mut self, enabled: bool) -> Self {
    self.options.check_link_syntax = enabled;
    self
  }

  /// Set the class of heading self-links.
  #[must_use]
  pub fn anchor_class<S: Into<String>>(mut self, class: S) -> Self {
    self.options.anchor_class = class.into();
    self
  }

  /// Build the final `MarkdownOptions`.
  #[must_use]
  pub fn build(self) -> MarkdownOptions {
    self.options
  }
}

impl Default for MarkdownOptionsBuilder {
  fn default() -> Self {
    Self::new()
  }
}
