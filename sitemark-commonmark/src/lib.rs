//! # sitemark-commonmark
//!
//! Markdown rendering for sitemark: hierarchical heading anchors with GitHub
//! compatible aliases, and link resolution against the sitemap's page
//! registry.
//!
//! ## Quick Start
//!
//! ```
//! use sitemark_commonmark::{LinkResolver, MarkdownProcessor};
//! use sitemark_sitemap::{PageRegistry, parse_sitemap};
//!
//! let tree = parse_sitemap(
//!   "Home [/, index.md]\n  - Models [models, models.md]",
//! )
//! .unwrap();
//! let registry = PageRegistry::flatten(&tree);
//! let resolver = LinkResolver::new(&registry);
//!
//! let processor = MarkdownProcessor::default();
//! let result = processor
//!   .render("# Intro\n\nSee [models](models.md).", "index.md", &resolver)
//!   .unwrap();
//!
//! assert!(result.html.contains("<h1 id=intro>"));
//! assert!(result.html.contains("href=\"/models\""));
//! ```
pub mod error;
pub mod headings;
pub mod links;
pub mod processor;
pub mod slug;
pub mod types;
pub mod utils;

pub use crate::{
  error::{RenderError, RenderResult},
  headings::HeadingStack,
  links::{
    AssetMap,
    HeadingCatalog,
    LinkResolver,
    ResolvedLink,
    check_link_syntax,
    find_anchor,
    load_asset_map,
  },
  processor::{
    MarkdownOptions,
    MarkdownOptionsBuilder,
    MarkdownProcessor,
    extract_inline_text,
  },
  slug::{github_slug, heading_aliases, slugify},
  types::{BrokenAnchor, Header, MarkdownResult},
};
