//! Line-level parsing of the sitemap outline.
//!
//! The outline is a YAML-like list where every entry has the shape
//!
//! ```text
//! sitemap:
//!   - Home [/, index.md]
//!     - Models [models, free/models.md, {layout: 'layouts/wide.html'}]
//! ```
//!
//! Parsing happens in two steps: [`parse_line`] turns a single entry into a
//! [`SitemapLine`], and [`parse_indented`] walks the whole text, recording the
//! indentation of each entry so [`crate::tree::build_tree`] can nest them.
use std::collections::BTreeMap;

use log::{debug, warn};

/// Indentation width of one outline level.
pub const INDENT_WIDTH: usize = 2;

/// Root key that may precede the outline entries.
const ROOT_KEY: &str = "sitemap:";

/// A single `Title [url, file, {meta}]` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapLine {
  /// Navigation title, with `\[` and `\]` unescaped.
  pub title: String,
  /// Raw URL, possibly relative to the parent entry.
  pub url:   String,
  /// Markdown source path relative to the content root.
  pub file:  String,
  /// Extra `{key: 'value'}` pairs. Only `layout` is interpreted.
  pub meta:  BTreeMap<String, String>,
}

impl SitemapLine {
  /// Layout override declared in the entry metadata.
  #[must_use]
  pub fn layout(&self) -> Option<&str> {
    self.meta.get("layout").map(String::as_str)
  }
}

/// An outline entry together with its position in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
  /// Number of leading spaces before the entry (or its `- ` marker).
  pub indent:      usize,
  /// 1-based line number in the outline source.
  pub line_number: usize,
  pub line:        SitemapLine,
}

/// Parse one outline line.
///
/// Accepts an optional leading `- ` list marker. Returns `None` for any line
/// that does not match `Title [url, file]` or `Title [url, file, {meta}]`:
/// a missing closing bracket, a missing comma, an empty title or file, or a
/// metadata block that is not a `{key: value}` map.
#[must_use]
pub fn parse_line(line: &str) -> Option<SitemapLine> {
  let trimmed = line.trim();
  let trimmed = trimmed.strip_prefix("- ").unwrap_or(trimmed).trim();

  let body = trimmed.strip_suffix(']')?;
  let open = rfind_unescaped(body, b'[')?;

  let title = unescape_brackets(body[..open].trim());
  if title.is_empty() {
    return None;
  }

  let (url, rest) = body[open + 1..].split_once(',')?;
  let (file, meta) = match rest.split_once(',') {
    Some((file, meta)) => (file, Some(meta)),
    None => (rest, None),
  };

  let file = unquote(file.trim());
  if file.is_empty() {
    return None;
  }

  let meta = match meta {
    Some(raw) => parse_meta(raw)?,
    None => BTreeMap::new(),
  };

  Some(SitemapLine {
    title,
    url: unquote(url.trim()).to_string(),
    file: file.to_string(),
    meta,
  })
}

/// Parse the whole outline text into a flat list of entries.
///
/// Blank lines, `#` comments and the `sitemap:` root key are ignored.
/// Malformed entries are skipped with a warning so that one bad line never
/// prevents the rest of the sitemap from being built.
#[must_use]
pub fn parse_indented(text: &str) -> Vec<OutlineEntry> {
  let mut entries = Vec::new();

  for (idx, raw) in text.lines().enumerate() {
    let line_number = idx + 1;
    let line = raw.trim_end();
    let content = line.trim_start();

    if content.is_empty() || content.starts_with('#') {
      continue;
    }

    let indent = line.len() - content.len();
    if line[..indent].contains('\t') {
      warn!(
        "Sitemap line {line_number} is indented with tabs, use {INDENT_WIDTH} \
         spaces per level"
      );
    }

    if content.ends_with(':') && !content.contains('[') {
      if content != ROOT_KEY {
        warn!(
          "Ignoring unknown sitemap key on line {line_number}: '{content}'"
        );
      }
      continue;
    }

    match parse_line(content) {
      Some(entry) => {
        entries.push(OutlineEntry {
          indent,
          line_number,
          line: entry,
        });
      },
      None => {
        warn!("Skipping malformed sitemap line {line_number}: '{content}'");
      },
    }
  }

  debug!("Parsed {} sitemap entries", entries.len());
  entries
}

/// Byte offset of the last `needle` not preceded by a backslash.
fn rfind_unescaped(haystack: &str, needle: u8) -> Option<usize> {
  let bytes = haystack.as_bytes();
  let mut found = None;
  let mut escaped = false;

  for (idx, &byte) in bytes.iter().enumerate() {
    if escaped {
      escaped = false;
      continue;
    }
    if byte == b'\\' {
      escaped = true;
    } else if byte == needle {
      found = Some(idx);
    }
  }

  found
}

fn unescape_brackets(text: &str) -> String {
  text.replace("\\[", "[").replace("\\]", "]")
}

fn unquote(value: &str) -> &str {
  for quote in ['\'', '"'] {
    if let Some(inner) = value
      .strip_prefix(quote)
      .and_then(|v| v.strip_suffix(quote))
    {
      return inner;
    }
  }
  value
}

/// Parse `{layout: 'path', key: value}`.
fn parse_meta(raw: &str) -> Option<BTreeMap<String, String>> {
  let inner = raw.trim().strip_prefix('{')?.strip_suffix('}')?;
  let mut meta = BTreeMap::new();

  for pair in inner.split(',') {
    if pair.trim().is_empty() {
      continue;
    }
    let (key, value) = pair.split_once(':')?;
    meta.insert(
      unquote(key.trim()).to_string(),
      unquote(value.trim()).to_string(),
    );
  }

  Some(meta)
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use super::*;

  #[test]
  fn parses_basic_entry() {
    let line = parse_line("Home [/, index.md]").unwrap();
    assert_eq!(line.title, "Home");
    assert_eq!(line.url, "/");
    assert_eq!(line.file, "index.md");
    assert!(line.layout().is_none());
  }

  #[test]
  fn parses_list_marker_and_layout() {
    let line =
      parse_line("  - Models [models, free/models.md, {layout: 'wide.html'}]")
        .unwrap();
    assert_eq!(line.title, "Models");
    assert_eq!(line.url, "models");
    assert_eq!(line.file, "free/models.md");
    assert_eq!(line.layout(), Some("wide.html"));
  }

  #[test]
  fn title_may_contain_brackets() {
    let line = parse_line("Models [beta] (new) [models, models.md]").unwrap();
    assert_eq!(line.title, "Models [beta] (new)");
    assert_eq!(line.url, "models");

    let line = parse_line(r"Escaped \[x\] [a, a.md]").unwrap();
    assert_eq!(line.title, "Escaped [x]");
  }

  #[test]
  fn malformed_lines_return_none() {
    assert!(parse_line("Invalid format").is_none());
    assert!(parse_line("Home [/, index.md").is_none());
    assert!(parse_line("Home [/ index.md]").is_none());
    assert!(parse_line("[/, index.md]").is_none());
    assert!(parse_line("Home [/, ]").is_none());
    assert!(parse_line("Home [/, index.md, layout]").is_none());
  }

  #[test]
  fn parse_indented_skips_bad_lines() {
    let text = "sitemap:\n  - Home [/, index.md]\n    - Broken line\n    - \
                About [about, about.md]\n\n  # comment\n";
    let entries = parse_indented(text);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].indent, 2);
    assert_eq!(entries[1].indent, 4);
    assert_eq!(entries[1].line_number, 4);
    assert_eq!(entries[1].line.title, "About");
  }
}
