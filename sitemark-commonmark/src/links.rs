//! Resolution of markdown link targets against the page registry.
//!
//! Content documents link to each other by source path (`../free/models.md`
//! or `models.md#anchor`). The resolver maps those paths to the URLs the
//! sitemap assigns, and anchors to the canonical heading ids of the target
//! document.
use std::{collections::HashMap, fs, path::Path};

use indexmap::IndexMap;
use log::{debug, trace};
use relative_path::{RelativePath, RelativePathBuf};
use sitemark_sitemap::PageRegistry;

use crate::{
  error::{RenderError, RenderResult},
  types::Header,
  utils::{
    codeblock::{FenceTracker, mask_code_spans},
    is_passthrough,
    percent_decode,
  },
};

/// Image path (relative to the content root) to published file name.
pub type AssetMap = IndexMap<String, String>;

/// Load a flat JSON object mapping image paths to published names.
///
/// # Errors
///
/// Returns [`RenderError::AssetMap`] if the file cannot be read or is not a
/// flat string-to-string object.
pub fn load_asset_map(path: &Path) -> RenderResult<AssetMap> {
  let asset_map_error = |message: String| {
    RenderError::AssetMap {
      path: path.to_path_buf(),
      message,
    }
  };
  let content =
    fs::read_to_string(path).map_err(|e| asset_map_error(e.to_string()))?;
  let map: AssetMap =
    serde_json::from_str(&content).map_err(|e| asset_map_error(e.to_string()))?;
  debug!("Loaded {} asset mappings from {}", map.len(), path.display());
  Ok(map)
}

/// Headings of every document, keyed by source file.
///
/// Filled in a pass over all documents before rendering starts, then only
/// read, so anchors of a page can be checked before that page is rendered.
#[derive(Debug, Clone, Default)]
pub struct HeadingCatalog {
  documents: HashMap<String, Vec<Header>>,
}

impl HeadingCatalog {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, file: impl Into<String>, headers: Vec<Header>) {
    self.documents.insert(file.into(), headers);
  }

  #[must_use]
  pub fn headers(&self, file: &str) -> Option<&[Header]> {
    self.documents.get(file).map(Vec::as_slice)
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.documents.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.documents.is_empty()
  }
}

impl FromIterator<(String, Vec<Header>)> for HeadingCatalog {
  fn from_iter<I: IntoIterator<Item = (String, Vec<Header>)>>(iter: I) -> Self {
    Self {
      documents: iter.into_iter().collect(),
    }
  }
}

/// Canonical id of the heading `anchor` refers to.
///
/// `anchor` is percent-decoded first. An exact id match wins; otherwise the
/// lowercased anchor is compared against ids and every alias.
#[must_use]
pub fn find_anchor<'h>(headers: &'h [Header], anchor: &str) -> Option<&'h str> {
  let decoded = percent_decode(anchor);
  if let Some(header) = headers.iter().find(|h| h.id == decoded) {
    return Some(header.id.as_str());
  }

  let lowered = decoded.to_lowercase();
  headers
    .iter()
    .find(|h| h.id.to_lowercase() == lowered || h.answers_to(&lowered))
    .map(|h| h.id.as_str())
}

/// Outcome of resolving one link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLink {
  /// Value for the rendered `href`.
  pub href:           String,
  /// Anchor that matched no heading of the target document. The link is
  /// still emitted, with the anchor as written.
  pub missing_anchor: Option<String>,
}

impl ResolvedLink {
  fn plain(href: impl Into<String>) -> Self {
    Self {
      href:           href.into(),
      missing_anchor: None,
    }
  }
}

/// Link resolver backed by a frozen page registry.
///
/// Cheap to copy and safe to share between threads; it only holds shared
/// references.
#[derive(Debug, Clone, Copy)]
pub struct LinkResolver<'a> {
  registry: &'a PageRegistry,
  catalog:  Option<&'a HeadingCatalog>,
  assets:   Option<&'a AssetMap>,
}

impl<'a> LinkResolver<'a> {
  #[must_use]
  pub const fn new(registry: &'a PageRegistry) -> Self {
    Self {
      registry,
      catalog: None,
      assets: None,
    }
  }

  /// Check anchors of cross-document links against `catalog`.
  #[must_use]
  pub const fn with_catalog(mut self, catalog: &'a HeadingCatalog) -> Self {
    self.catalog = Some(catalog);
    self
  }

  /// Map image paths through `assets`.
  #[must_use]
  pub const fn with_assets(mut self, assets: &'a AssetMap) -> Self {
    self.assets = Some(assets);
    self
  }

  #[must_use]
  pub const fn registry(&self) -> &'a PageRegistry {
    self.registry
  }

  /// Resolve a raw `href` found in `current_file`.
  ///
  /// `#fragment` links are matched against `current_headers`. Site-absolute
  /// and scheme links are returned unchanged.
  ///
  /// # Errors
  ///
  /// See [`LinkResolver::resolve_link`].
  pub fn resolve_href(
    &self,
    href: &str,
    current_file: &str,
    current_headers: &[Header],
  ) -> RenderResult<ResolvedLink> {
    if let Some(fragment) = href.strip_prefix('#') {
      if fragment.is_empty() {
        return Ok(ResolvedLink::plain(href));
      }
      return Ok(resolve_fragment("", fragment, current_headers, href));
    }
    if href.is_empty() || is_passthrough(href) {
      return Ok(ResolvedLink::plain(href));
    }

    match href.split_once('#') {
      Some((target, anchor)) => {
        self.resolve_link(target, current_file, Some(anchor))
      },
      None => self.resolve_link(href, current_file, None),
    }
  }

  /// Resolve `target` (a path relative to `current_file`) to a site URL,
  /// with `anchor` rewritten to the target's canonical heading id.
  ///
  /// `.md` targets are looked up in the registry by their normalized path,
  /// then by basename among pages of the current file's section.
  ///
  /// # Errors
  ///
  /// Returns [`RenderError::UnresolvedLink`] for a `.md` target that matches
  /// no page, and [`RenderError::UnknownLinkType`] for any other relative
  /// target.
  pub fn resolve_link(
    &self,
    target: &str,
    current_file: &str,
    anchor: Option<&str>,
  ) -> RenderResult<ResolvedLink> {
    if is_passthrough(target) {
      let href = anchor.map_or_else(
        || target.to_string(),
        |anchor| format!("{target}#{anchor}"),
      );
      return Ok(ResolvedLink::plain(href));
    }

    let resolved = resolve_relative(current_file, &percent_decode(target));

    if resolved.extension() != Some("md") {
      return Err(RenderError::UnknownLinkType {
        resolved: resolved.to_string(),
        file:     current_file.to_string(),
      });
    }

    let page = self
      .registry
      .page_for_file(resolved.as_str())
      .or_else(|| {
        let basename = resolved.file_name()?;
        let section = self.registry.section_of_file(current_file);
        let found = self.registry.find_in_section(basename, section);
        if let Some(page) = found {
          debug!(
            "Resolved '{target}' in {current_file} by basename to {}",
            page.file
          );
        }
        found
      })
      .ok_or_else(|| {
        RenderError::UnresolvedLink {
          target:   target.to_string(),
          resolved: resolved.to_string(),
          file:     current_file.to_string(),
        }
      })?;

    trace!("Resolved '{target}' in {current_file} to {}", page.url);

    let Some(anchor) = anchor.filter(|a| !a.is_empty()) else {
      return Ok(ResolvedLink::plain(page.url.clone()));
    };

    let headers = self.catalog.and_then(|c| c.headers(&page.file));
    match headers {
      Some(headers) => {
        Ok(resolve_fragment(&page.url, anchor, headers, target))
      },
      None => Ok(ResolvedLink::plain(format!("{}#{anchor}", page.url))),
    }
  }

  /// Rewrite an image source found in `current_file` to a site-absolute
  /// path, mapped through the asset map when it has an entry.
  #[must_use]
  pub fn resolve_image(&self, src: &str, current_file: &str) -> String {
    if src.is_empty() || is_passthrough(src) {
      return src.to_string();
    }

    let resolved = resolve_relative(current_file, &percent_decode(src));
    let published = self
      .assets
      .and_then(|assets| assets.get(resolved.as_str()))
      .map_or(resolved.as_str(), String::as_str);
    format!("/{}", published.trim_start_matches('/'))
  }
}

/// Resolve `target` against the directory of `current_file`.
fn resolve_relative(current_file: &str, target: &str) -> RelativePathBuf {
  let current = RelativePath::new(current_file.trim_start_matches('/'));
  current
    .parent()
    .unwrap_or_else(|| RelativePath::new(""))
    .join_normalized(target)
}

fn resolve_fragment(
  url: &str,
  anchor: &str,
  headers: &[Header],
  written: &str,
) -> ResolvedLink {
  match find_anchor(headers, anchor) {
    Some(id) => ResolvedLink::plain(format!("{url}#{id}")),
    None => {
      ResolvedLink {
        href:           format!("{url}#{anchor}"),
        missing_anchor: Some(format!(
          "{} (in '{written}')",
          percent_decode(anchor)
        )),
      }
    },
  }
}

/// Reject inline links with an unclosed `[` or an unclosed `(...)`
/// destination.
///
/// Paragraphs are checked independently; fenced code blocks and inline code
/// spans are ignored. An unclosed `[` only counts in the `[text(target`
/// shape, when a `(` follows it before any `)` or `[`, so prose like
/// `[0, 1) is half-open (see below)` passes.
///
/// # Errors
///
/// Returns [`RenderError::UnclosedBracket`] or [`RenderError::UnclosedUrl`]
/// naming `file` and the line of the offending `[`.
pub fn check_link_syntax(markdown: &str, file: &str) -> RenderResult<()> {
  let mut fences = FenceTracker::new();
  let mut paragraph: Vec<(usize, String)> = Vec::new();

  for (idx, line) in markdown.lines().enumerate() {
    if fences.observe(line) {
      check_paragraph(&paragraph, file)?;
      paragraph.clear();
      continue;
    }
    if line.trim().is_empty() {
      check_paragraph(&paragraph, file)?;
      paragraph.clear();
      continue;
    }
    paragraph.push((idx + 1, mask_code_spans(line)));
  }

  check_paragraph(&paragraph, file)
}

fn check_paragraph(lines: &[(usize, String)], file: &str) -> RenderResult<()> {
  let mut chars = Vec::new();
  for (line_number, line) in lines {
    chars.extend(line.chars().map(|c| (*line_number, c)));
    chars.push((*line_number, '\n'));
  }

  let snippet = |line_number: usize| {
    lines
      .iter()
      .find(|(n, _)| *n == line_number)
      .map(|(_, text)| text.trim().chars().take(80).collect::<String>())
      .unwrap_or_default()
  };

  let mut open: Vec<usize> = Vec::new();
  let mut idx = 0;

  while idx < chars.len() {
    match chars[idx].1 {
      '\\' => idx += 1,
      '[' => open.push(idx),
      ']' => {
        if let Some(start) = open.pop() {
          if chars.get(idx + 1).map(|(_, c)| *c) == Some('(') {
            match find_closing_paren(&chars, idx + 2) {
              Some(close) => idx = close,
              None => {
                let line = chars[start].0;
                return Err(RenderError::UnclosedUrl {
                  file:    file.to_string(),
                  line,
                  snippet: snippet(line),
                });
              },
            }
          }
        }
      },
      _ => {},
    }
    idx += 1;
  }

  for &start in &open {
    if opens_destination(&chars, start + 1) {
      let line = chars[start].0;
      return Err(RenderError::UnclosedBracket {
        file: file.to_string(),
        line,
        snippet: snippet(line),
      });
    }
  }

  Ok(())
}

/// Whether a `(` follows `from` before any `)` or `[`.
fn opens_destination(chars: &[(usize, char)], from: usize) -> bool {
  let mut idx = from;
  while idx < chars.len() {
    match chars[idx].1 {
      '\\' => idx += 1,
      '(' => return true,
      ')' | '[' => return false,
      _ => {},
    }
    idx += 1;
  }
  false
}

/// Index of the `)` closing a link destination that starts at `from`.
fn find_closing_paren(chars: &[(usize, char)], from: usize) -> Option<usize> {
  let mut depth = 0usize;
  let mut idx = from;
  while idx < chars.len() {
    match chars[idx].1 {
      '\\' => idx += 1,
      '(' => depth += 1,
      ')' if depth == 0 => return Some(idx),
      ')' => depth -= 1,
      _ => {},
    }
    idx += 1;
  }
  None
}
