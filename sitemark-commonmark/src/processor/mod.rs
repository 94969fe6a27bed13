//! Markdown processing.
//!
//! - [`core`]: the rendering pipeline and heading extraction
//! - [`extensions`]: video embeds and heading markup rewriting
//! - [`types`]: options, the processor struct and the transformer trait
pub mod core;
pub mod extensions;
pub mod types;

pub use core::extract_inline_text;

pub use extensions::{VideoEmbedTransformer, VideoProvider};
pub use types::{
  AstTransformer,
  DEFAULT_ANCHOR_CLASS,
  MarkdownOptions,
  MarkdownOptionsBuilder,
  MarkdownProcessor,
};
