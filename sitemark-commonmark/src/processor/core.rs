//! Core implementation of the Markdown processor.
//!
//! Rendering a document runs in a fixed order: input checks, parsing,
//! heading anchors (including `{#id}` markers), video embeds, link resolution
//! and finally HTML output with anchors injected into the heading markup.
use std::collections::{HashMap, HashSet};

use comrak::{
  Arena,
  nodes::{AstNode, NodeHeading, NodeValue},
  options::Options,
  parse_document,
};
use log::{trace, warn};

use super::{
  extensions::{
    VideoEmbedTransformer,
    inject_heading_anchors,
    strip_sourcepos,
  },
  types::{AstTransformer, MarkdownOptions, MarkdownProcessor},
};
use crate::{
  error::{RenderError, RenderResult},
  headings::{HeadingStack, split_explicit_id},
  links::{LinkResolver, check_link_syntax},
  slug::heading_aliases,
  types::{BrokenAnchor, Header, MarkdownResult},
};

/// A heading together with the source position comrak reports for it.
struct PositionedHeader {
  position: (usize, usize),
  header:   Header,
}

impl MarkdownProcessor {
  /// Create a new `MarkdownProcessor` with the given options.
  #[must_use]
  pub const fn new(options: MarkdownOptions) -> Self {
    Self { options }
  }

  /// Access processor options.
  #[must_use]
  pub const fn options(&self) -> &MarkdownOptions {
    &self.options
  }

  /// Render one document to HTML.
  ///
  /// `file` is the document's path relative to the content root; relative
  /// links are resolved against it.
  ///
  /// # Errors
  ///
  /// Fails on empty input, malformed link syntax, and any link the resolver
  /// rejects. Unknown anchors do not fail the render; they are reported in
  /// [`MarkdownResult::broken_anchors`].
  pub fn render(
    &self,
    markdown: &str,
    file: &str,
    resolver: &LinkResolver<'_>,
  ) -> RenderResult<MarkdownResult> {
    if markdown.trim().is_empty() {
      return Err(RenderError::EmptyDocument {
        file: file.to_string(),
      });
    }
    if self.options.check_link_syntax {
      check_link_syntax(markdown, file)?;
    }

    let arena = Arena::new();
    let options = self.comrak_options();
    let root = parse_document(&arena, markdown, &options);

    let positioned = collect_headers(root);
    warn_duplicate_ids(&positioned, file);

    if self.options.video_embeds {
      VideoEmbedTransformer.transform(root);
    }

    let headers: Vec<Header> =
      positioned.iter().map(|p| p.header.clone()).collect();
    let broken_anchors = rewrite_links(root, file, resolver, &headers)?;

    let mut html = String::new();
    comrak::format_html(root, &options, &mut html).map_err(|source| {
      RenderError::Format {
        file: file.to_string(),
        source,
      }
    })?;

    let anchors: HashMap<(usize, usize), String> = positioned
      .into_iter()
      .map(|p| (p.position, p.header.id))
      .collect();
    let html = strip_sourcepos(&inject_heading_anchors(
      &html,
      &anchors,
      &self.options.anchor_class,
    ));

    trace!("Rendered {file} with {} headings", headers.len());

    Ok(MarkdownResult {
      title: first_title(&headers),
      html,
      headers,
      broken_anchors,
    })
  }

  /// Extract headings and title without rendering.
  ///
  /// Produces the same ids as [`MarkdownProcessor::render`], which lets a
  /// build compute every document's headings before any page is rendered.
  #[must_use]
  pub fn extract_headers(
    &self,
    markdown: &str,
  ) -> (Vec<Header>, Option<String>) {
    let arena = Arena::new();
    let options = self.comrak_options();
    let root = parse_document(&arena, markdown, &options);

    let headers: Vec<Header> = collect_headers(root)
      .into_iter()
      .map(|p| p.header)
      .collect();
    let title = first_title(&headers);
    (headers, title)
  }

  /// Build comrak options from `MarkdownOptions`.
  fn comrak_options(&self) -> Options<'_> {
    let mut options = Options::default();
    if self.options.gfm {
      options.extension.table = true;
      options.extension.strikethrough = true;
      options.extension.tasklist = true;
      options.extension.autolink = true;
    }
    options.render.r#unsafe = true;
    options.render.sourcepos = true;
    options.extension.header_ids = None;
    options
  }
}

fn first_title(headers: &[Header]) -> Option<String> {
  headers
    .iter()
    .find(|h| h.level == 1)
    .map(|h| h.text.clone())
}

/// Walk headings in document order, assigning hierarchical anchors.
///
/// A trailing `{#id}` is removed from the heading text and used as the id,
/// whatever container the heading sits in.
fn collect_headers<'a>(root: &'a AstNode<'a>) -> Vec<PositionedHeader> {
  let mut stack = HeadingStack::new();
  let mut headers = Vec::new();

  for node in root.descendants() {
    let data = node.data.borrow();
    let NodeValue::Heading(NodeHeading { level, .. }) = data.value else {
      continue;
    };
    let start = data.sourcepos.start;
    drop(data);

    let explicit = take_explicit_id(node);
    let text = extract_inline_text(node).trim().to_string();
    let computed = stack.observe(level, &text);

    let (id, mut aliases) = match explicit {
      Some(explicit) => (explicit, vec![computed]),
      None => (computed, Vec::new()),
    };
    for alias in heading_aliases(&text, &id) {
      if !aliases.contains(&alias) {
        aliases.push(alias);
      }
    }
    aliases.retain(|alias| !alias.is_empty() && *alias != id);

    headers.push(PositionedHeader {
      position: (start.line, start.column),
      header:   Header {
        text,
        level,
        id,
        aliases,
      },
    });
  }

  headers
}

/// Strip a trailing `{#id}` marker from `heading` and return the id.
///
/// The marker may span several adjacent text nodes.
fn take_explicit_id<'a>(heading: &'a AstNode<'a>) -> Option<String> {
  let mut run = Vec::new();
  let mut current = heading.last_child();
  while let Some(node) = current {
    if !matches!(node.data.borrow().value, NodeValue::Text(_)) {
      break;
    }
    run.push(node);
    current = node.previous_sibling();
  }
  run.reverse();

  let joined: String = run
    .iter()
    .filter_map(|node| {
      match &node.data.borrow().value {
        NodeValue::Text(text) => Some(text.to_string()),
        _ => None,
      }
    })
    .collect();
  let (kept, id) = split_explicit_id(&joined)?;
  let (kept, id) = (kept.to_string(), id.to_string());

  let (first, rest) = run.split_first()?;
  if let NodeValue::Text(text) = &mut first.data.borrow_mut().value {
    *text = kept.into();
  }
  for node in rest {
    node.detach();
  }
  Some(id)
}

fn warn_duplicate_ids(headers: &[PositionedHeader], file: &str) {
  let mut seen = HashSet::new();
  for positioned in headers {
    let id = positioned.header.id.as_str();
    if !seen.insert(id) {
      warn!(
        "Duplicate heading anchor '{id}' in {file} (line {})",
        positioned.position.0
      );
    }
  }
}

/// Resolve every link and image target in place.
fn rewrite_links<'a>(
  root: &'a AstNode<'a>,
  file: &str,
  resolver: &LinkResolver<'_>,
  headers: &[Header],
) -> RenderResult<Vec<BrokenAnchor>> {
  let mut broken = Vec::new();

  for node in root.descendants() {
    let mut data = node.data.borrow_mut();
    match &mut data.value {
      NodeValue::Link(link) => {
        let written = link.url.clone();
        let resolved = resolver.resolve_href(&written, file, headers)?;
        if let Some(anchor) = resolved.missing_anchor {
          warn!("Broken anchor in {file}: '{written}' ({anchor})");
          broken.push(BrokenAnchor {
            target: written,
            anchor,
          });
        }
        link.url = resolved.href;
      },
      NodeValue::Image(image) => {
        image.url = resolver.resolve_image(&image.url, file);
      },
      _ => {},
    }
  }

  Ok(broken)
}

/// Extract all inline text from a heading or link node.
pub fn extract_inline_text<'a>(node: &'a AstNode<'a>) -> String {
  let mut text = String::new();
  for child in node.children() {
    match &child.data.borrow().value {
      NodeValue::Text(t) => text.push_str(t),
      NodeValue::Code(t) => text.push_str(&t.literal),
      NodeValue::SoftBreak | NodeValue::LineBreak => text.push(' '),
      NodeValue::Link(..)
      | NodeValue::Emph
      | NodeValue::Strong
      | NodeValue::Strikethrough => text.push_str(&extract_inline_text(child)),
      _ => {},
    }
  }
  text
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use sitemark_sitemap::PageRegistry;

  use super::*;

  fn render(markdown: &str) -> MarkdownResult {
    let registry = PageRegistry::default();
    let resolver = LinkResolver::new(&registry);
    MarkdownProcessor::default()
      .render(markdown, "index.md", &resolver)
      .unwrap()
  }

  #[test]
  fn heading_markup() {
    let result = render("# Test Heading\n\nBody.");
    assert!(result.html.contains(
      "<h1 id=test-heading><a href=#test-heading class=anchor>Test \
       Heading</a></h1>"
    ));
    assert!(!result.html.contains("data-sourcepos"));
    assert_eq!(result.title.as_deref(), Some("Test Heading"));
  }

  #[test]
  fn inline_markup_is_cleaned_from_heading_text() {
    let result = render("# The *quick* `fox` [jumps](https://example.com)");
    assert_eq!(result.headers[0].text, "The quick fox jumps");
    assert_eq!(result.headers[0].id, "the-quick-fox-jumps");
  }

  #[test]
  fn heading_links_do_not_nest_in_self_link() {
    let result = render("# See [x](https://a.example)\n\n[top](#)\n");
    assert!(result.html.contains(
      "<h1 id=see-x><a href=#see-x class=anchor>See x</a></h1>"
    ));
    assert!(result.broken_anchors.is_empty());
  }

  #[test]
  fn explicit_id_keeps_computed_anchor_as_alias() {
    let result = render("# Top\n\n## Section {#custom}\n");
    let section = &result.headers[1];
    assert_eq!(section.id, "custom");
    assert!(section.aliases.contains(&"top-section".to_string()));
  }

  #[test]
  fn explicit_id_in_containers_and_setext() {
    let quoted = render("> # Quoted {#q}\n");
    assert_eq!(quoted.headers[0].id, "q");
    assert_eq!(quoted.headers[0].text, "Quoted");
    assert!(quoted.html.contains("<h1 id=q>"));
    assert!(!quoted.html.contains("{#"));

    let listed = render("- # Item {#x}\n");
    assert_eq!(listed.headers[0].id, "x");
    assert!(listed.html.contains("<h1 id=x>"));
    assert!(!listed.html.contains("{#"));

    let setext = render("Section {#custom}\n=======\n\nBody.\n");
    assert_eq!(setext.headers[0].id, "custom");
    assert_eq!(setext.headers[0].text, "Section");
    assert!(setext.headers[0].aliases.contains(&"section".to_string()));
    assert!(!setext.html.contains("{#"));
  }

  #[test]
  fn explicit_id_marker_in_code_span_is_kept() {
    let result = render("# Use `{#id}` markers\n");
    assert_eq!(result.headers[0].text, "Use {#id} markers");
    assert!(result.html.contains("<code>{#id}</code>"));
  }

  #[test]
  fn empty_input_is_an_error() {
    let registry = PageRegistry::default();
    let resolver = LinkResolver::new(&registry);
    let err = MarkdownProcessor::default()
      .render(" \n\t\n", "blank.md", &resolver)
      .unwrap_err();
    assert!(matches!(err, RenderError::EmptyDocument { .. }));
    assert!(err.to_string().contains("blank.md"));
  }

  #[test]
  fn extract_matches_render() {
    let md = "# A\n## B\n## C {#c}\n### D\n";
    let processor = MarkdownProcessor::default();
    let (headers, title) = processor.extract_headers(md);
    assert_eq!(title.as_deref(), Some("A"));
    assert_eq!(headers, render(md).headers);
  }
}
