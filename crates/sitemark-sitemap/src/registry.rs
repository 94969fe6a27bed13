//! Flattening of the sitemap tree into the page registry.
use indexmap::IndexMap;
use log::{debug, warn};
use relative_path::RelativePath;
use serde::{Deserialize, Serialize};

use crate::{
  error::SitemapError,
  tree::{SitemapNode, build_full_url},
};

/// Separator between the segments of a page title.
pub const TITLE_SEPARATOR: &str = " | ";

/// A flattened sitemap entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page {
  /// Absolute, canonical URL, e.g. `/free/models`.
  pub url:         String,
  /// Markdown source, relative to the content root.
  pub file:        String,
  /// Title as written in the sitemap.
  pub name:        String,
  /// Breadcrumb-joined page title, e.g. `Models | Free | Home`.
  pub title:       String,
  /// First segment of `url`, `None` for the root.
  pub section:     Option<String>,
  /// Ancestor URLs from the root down to the immediate parent.
  pub breadcrumbs: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub layout:      Option<String>,
  /// Rendered body, filled in by the build once the page is rendered.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub html:        Option<String>,
}

/// Queryable view over every page of the site.
///
/// Built once per build before any document is rendered, then only read.
/// `md2url` and `url2md` are inverses of each other as long as the sitemap
/// has no duplicate files or URLs; with duplicates the last entry wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageRegistry {
  /// Page URLs in depth-first sitemap order.
  pub sitemap: Vec<String>,
  pub pages:   IndexMap<String, Page>,
  pub md2url:  IndexMap<String, String>,
  pub url2md:  IndexMap<String, String>,
}

/// Ancestor of the node being visited.
struct Ancestor {
  url:  String,
  name: String,
}

impl PageRegistry {
  /// Flatten a sitemap tree. Duplicate files or URLs silently overwrite
  /// earlier entries in the lookup maps.
  #[must_use]
  pub fn flatten(tree: &[SitemapNode]) -> Self {
    let mut registry = Self::default();
    for page in walk(tree) {
      registry.insert(page);
    }
    debug!("Registered {} pages", registry.pages.len());
    registry
  }

  /// Flatten a sitemap tree, rejecting duplicate files and URLs.
  ///
  /// # Errors
  ///
  /// Returns [`SitemapError::DuplicateUrl`] or [`SitemapError::DuplicateFile`]
  /// on the first duplicate found in sitemap order.
  pub fn flatten_strict(tree: &[SitemapNode]) -> Result<Self, SitemapError> {
    let mut registry = Self::default();
    for page in walk(tree) {
      if let Some(existing) = registry.url2md.get(&page.url) {
        return Err(SitemapError::DuplicateUrl {
          url:    page.url,
          first:  existing.clone(),
          second: page.file,
        });
      }
      if let Some(existing) = registry.md2url.get(&page.file) {
        return Err(SitemapError::DuplicateFile {
          file:   page.file,
          first:  existing.clone(),
          second: page.url,
        });
      }
      registry.insert(page);
    }
    Ok(registry)
  }

  fn insert(&mut self, page: Page) {
    if self.pages.contains_key(&page.url) {
      warn!("Duplicate sitemap URL '{}', last entry wins", page.url);
    }
    if self.md2url.contains_key(&page.file) {
      warn!("Duplicate sitemap file '{}', last entry wins", page.file);
    }
    self.sitemap.push(page.url.clone());
    self.md2url.insert(page.file.clone(), page.url.clone());
    self.url2md.insert(page.url.clone(), page.file.clone());
    self.pages.insert(page.url.clone(), page);
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.pages.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.pages.is_empty()
  }

  #[must_use]
  pub fn url_for_file(&self, file: &str) -> Option<&str> {
    self.md2url.get(file).map(String::as_str)
  }

  #[must_use]
  pub fn file_for_url(&self, url: &str) -> Option<&str> {
    self.url2md.get(url).map(String::as_str)
  }

  #[must_use]
  pub fn page(&self, url: &str) -> Option<&Page> {
    self.pages.get(url)
  }

  #[must_use]
  pub fn page_for_file(&self, file: &str) -> Option<&Page> {
    self.url_for_file(file).and_then(|url| self.page(url))
  }

  /// Section of the page rendered from `file`.
  #[must_use]
  pub fn section_of_file(&self, file: &str) -> Option<&str> {
    self.page_for_file(file).and_then(|page| page.section.as_deref())
  }

  /// First page, in sitemap order, whose file has the given basename and
  /// whose section equals `section`.
  #[must_use]
  pub fn find_in_section(
    &self,
    basename: &str,
    section: Option<&str>,
  ) -> Option<&Page> {
    self.pages.values().find(|page| {
      page.section.as_deref() == section
        && RelativePath::new(&page.file).file_name() == Some(basename)
    })
  }

  /// The first page of the sitemap.
  #[must_use]
  pub fn root(&self) -> Option<&Page> {
    self.sitemap.first().and_then(|url| self.page(url))
  }

  /// Pages without ancestors, in sitemap order.
  pub fn top_level(&self) -> impl Iterator<Item = &Page> {
    self.pages.values().filter(|page| page.breadcrumbs.is_empty())
  }

  /// Direct children of `url`, in sitemap order.
  pub fn children_of<'a>(
    &'a self,
    url: &'a str,
  ) -> impl Iterator<Item = &'a Page> + 'a {
    self
      .pages
      .values()
      .filter(move |page| {
        page.breadcrumbs.last().map(String::as_str) == Some(url)
      })
  }

  /// Serialize as `{ sitemap, pages, md2url, url2md }`.
  ///
  /// # Errors
  ///
  /// Returns an error if serialization fails.
  pub fn to_json(&self) -> Result<String, SitemapError> {
    Ok(serde_json::to_string_pretty(self)?)
  }
}

/// Normalize a content path: forward slashes, no `.`/`..` segments, no
/// leading slash.
#[must_use]
pub fn normalize_file(file: &str) -> String {
  RelativePath::new(file.trim_start_matches('/'))
    .normalize()
    .as_str()
    .to_string()
}

/// First non-empty URL segment.
fn section_of(url: &str) -> Option<String> {
  url
    .split('/')
    .find(|segment| !segment.is_empty())
    .map(ToString::to_string)
}

/// Depth-first walk producing one page per node.
///
/// The walk is iterative so arbitrarily deep sitemaps cannot overflow the
/// stack. `ancestors` is truncated to the depth of each visited node, the
/// same way a heading stack forgets a previous sibling's subtree.
fn walk(tree: &[SitemapNode]) -> Vec<Page> {
  let root_name = tree.first().map(|node| node.entry().title.as_str());
  let mut pages = Vec::new();
  let mut ancestors: Vec<Ancestor> = Vec::new();

  // (node, depth, whether the node sits in the root's subtree)
  let mut stack: Vec<(&SitemapNode, usize, bool)> = tree
    .iter()
    .enumerate()
    .rev()
    .map(|(idx, node)| (node, 0, idx == 0))
    .collect();

  while let Some((node, depth, under_root)) = stack.pop() {
    ancestors.truncate(depth);
    let entry = node.entry();
    let is_root = depth == 0 && under_root;

    let parent_url = ancestors.last().map_or("", |a| a.url.as_str());
    let url = build_full_url(parent_url, &entry.url);

    let mut segments = vec![entry.title.as_str()];
    if !is_root {
      segments.extend(ancestors.iter().rev().map(|a| a.name.as_str()));
      if !under_root {
        segments.extend(root_name);
      }
    }

    pages.push(Page {
      url:         url.clone(),
      file:        normalize_file(&entry.file),
      name:        entry.title.clone(),
      title:       segments.join(TITLE_SEPARATOR),
      section:     section_of(&url),
      breadcrumbs: ancestors.iter().map(|a| a.url.clone()).collect(),
      layout:      entry.layout.clone(),
      html:        None,
    });

    ancestors.push(Ancestor {
      url,
      name: entry.title.clone(),
    });
    for child in node.children().iter().rev() {
      stack.push((child, depth + 1, under_root));
    }
  }

  pages
}
