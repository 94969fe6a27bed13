//! Nesting of outline entries into a navigation tree.
use log::warn;

use crate::outline::{INDENT_WIDTH, OutlineEntry, SitemapLine};

/// Page data carried by a sitemap node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
  pub title:  String,
  /// URL as written in the outline, absolute or relative to the parent.
  pub url:    String,
  pub file:   String,
  pub layout: Option<String>,
}

impl From<SitemapLine> for SitemapEntry {
  fn from(line: SitemapLine) -> Self {
    let layout = line.layout().map(ToString::to_string);
    Self {
      title: line.title,
      url: line.url,
      file: line.file,
      layout,
    }
  }
}

/// A node of the parsed sitemap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapNode {
  Leaf(SitemapEntry),
  Parent {
    entry:    SitemapEntry,
    children: Vec<SitemapNode>,
  },
}

impl SitemapNode {
  #[must_use]
  pub const fn entry(&self) -> &SitemapEntry {
    match self {
      Self::Leaf(entry) | Self::Parent { entry, .. } => entry,
    }
  }

  #[must_use]
  pub fn children(&self) -> &[Self] {
    match self {
      Self::Leaf(_) => &[],
      Self::Parent { children, .. } => children,
    }
  }

  fn from_parts(entry: SitemapEntry, children: Vec<Self>) -> Self {
    if children.is_empty() {
      Self::Leaf(entry)
    } else {
      Self::Parent { entry, children }
    }
  }
}

/// Node under construction: indentation, entry and finished children.
struct Frame {
  indent:   usize,
  entry:    SitemapEntry,
  children: Vec<SitemapNode>,
}

/// Build the sitemap tree from flat outline entries.
///
/// Each entry becomes a child of the closest preceding entry with a smaller
/// indentation; consecutive entries with the same indentation are siblings.
/// Children are expected exactly one level ([`INDENT_WIDTH`] spaces) deeper
/// than their parent. Deeper entries are still attached, with a warning.
#[must_use]
pub fn build_tree(outline: Vec<OutlineEntry>) -> Vec<SitemapNode> {
  let mut roots = Vec::new();
  let mut stack: Vec<Frame> = Vec::new();

  for item in outline {
    while stack.last().is_some_and(|top| top.indent >= item.indent) {
      close_frame(&mut stack, &mut roots);
    }

    if let Some(parent) = stack.last() {
      if item.indent != parent.indent + INDENT_WIDTH {
        warn!(
          "Sitemap line {} ('{}') is indented {} spaces under '{}', expected \
           {}",
          item.line_number,
          item.line.title,
          item.indent - parent.indent,
          parent.entry.title,
          INDENT_WIDTH
        );
      }
    }

    stack.push(Frame {
      indent:   item.indent,
      entry:    item.line.into(),
      children: Vec::new(),
    });
  }

  while !stack.is_empty() {
    close_frame(&mut stack, &mut roots);
  }

  roots
}

/// Pop the top frame and attach it to its parent, or to the roots.
fn close_frame(stack: &mut Vec<Frame>, roots: &mut Vec<SitemapNode>) {
  let Some(frame) = stack.pop() else {
    return;
  };
  let node = SitemapNode::from_parts(frame.entry, frame.children);
  match stack.last_mut() {
    Some(parent) => parent.children.push(node),
    None => roots.push(node),
  }
}

/// Expand a possibly relative outline URL against its parent's absolute URL.
///
/// An absolute `child` is returned as-is. Otherwise one trailing slash is
/// stripped from `parent` (an empty parent counts as `/`) and the two are
/// joined with `/`. Double slashes inside `parent` are kept verbatim.
#[must_use]
pub fn build_full_url(parent: &str, child: &str) -> String {
  if child.starts_with('/') {
    return child.to_string();
  }

  let parent = if parent.is_empty() { "/" } else { parent };
  let parent = parent.strip_suffix('/').unwrap_or(parent);
  format!("{parent}/{child}")
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::outline::parse_indented;

  #[test]
  fn full_url_rules() {
    assert_eq!(build_full_url("/free", "/abs"), "/abs");
    assert_eq!(build_full_url("/free", "models"), "/free/models");
    assert_eq!(build_full_url("/free/", "models"), "/free/models");
    assert_eq!(build_full_url("", "about"), "/about");
    assert_eq!(build_full_url("/", "about"), "/about");
    assert_eq!(build_full_url("/a//b", "c"), "/a//b/c");
    assert_eq!(build_full_url("/a//", "c"), "/a//c");
  }

  #[test]
  fn nests_by_indentation() {
    let text = "\
sitemap:
  - Home [/, index.md]
    - Free [free, free/index.md]
      - Models [models, free/models.md]
    - About [about, about.md]
  - Legal [/legal, legal.md]
";
    let tree = build_tree(parse_indented(text));
    assert_eq!(tree.len(), 2);

    let home = &tree[0];
    assert_eq!(home.entry().title, "Home");
    assert_eq!(home.children().len(), 2);
    assert_eq!(home.children()[0].entry().title, "Free");
    assert_eq!(home.children()[0].children()[0].entry().title, "Models");
    assert!(matches!(home.children()[1], SitemapNode::Leaf(_)));
    assert!(matches!(tree[1], SitemapNode::Leaf(_)));
  }

  #[test]
  fn over_indented_child_is_still_attached() {
    let text = "Home [/, index.md]\n      - Deep [deep, deep.md]\n";
    let tree = build_tree(parse_indented(text));
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].children()[0].entry().title, "Deep");
  }
}
