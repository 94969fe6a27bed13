//! Link integrity pass over a rendered site.
//!
//! Every HTML file of the output directory is parsed; the `href` of each
//! `<a>` is resolved to a page of the site and its fragment is looked up among
//! that page's `id` attributes. External links are not followed.
use std::{
  collections::{BTreeMap, HashSet},
  fmt,
  fs,
  path::Path,
};

use kuchikikiki::parse_html;
use log::{info, warn};
use relative_path::RelativePath;
use sitemark_commonmark::utils::{has_scheme, percent_decode};
use tendril::TendrilSink;
use walkdir::WalkDir;

use crate::error::IntegrityError;

/// What is wrong with a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
  /// The link points to a page or file that was not generated.
  MissingPage,
  /// The page exists but has no element with the link's fragment as id.
  MissingAnchor,
}

/// A link of the rendered site that leads nowhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityIssue {
  /// Site URL of the page containing the link.
  pub page: String,
  /// The link as written in the page.
  pub href: String,
  pub kind: IssueKind,
}

impl fmt::Display for IntegrityIssue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.kind {
      IssueKind::MissingPage => {
        write!(f, "{}: link to missing page '{}'", self.page, self.href)
      },
      IssueKind::MissingAnchor => {
        write!(f, "{}: broken anchor '{}'", self.page, self.href)
      },
    }
  }
}

/// Outcome of [`check_site`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrityReport {
  pub pages_checked: usize,
  pub links_checked: usize,
  pub issues:        Vec<IntegrityIssue>,
}

impl IntegrityReport {
  #[must_use]
  pub fn is_clean(&self) -> bool {
    self.issues.is_empty()
  }
}

/// Ids and links collected from one HTML file.
#[derive(Debug, Default)]
struct ScannedPage {
  /// Directory relative links are resolved against, without slashes around.
  base:  String,
  ids:   HashSet<String>,
  links: Vec<String>,
}

/// Check every link of the site in `output_dir`.
///
/// # Errors
///
/// Returns an error if the directory is missing or a file cannot be read.
/// Broken links are not errors; they are listed in the report.
pub fn check_site(
  output_dir: &Path,
) -> Result<IntegrityReport, IntegrityError> {
  if !output_dir.is_dir() {
    return Err(IntegrityError::MissingOutput(output_dir.to_path_buf()));
  }

  let pages = scan_site(output_dir)?;
  let mut report = IntegrityReport {
    pages_checked: pages.len(),
    ..Default::default()
  };

  for (url, page) in &pages {
    for href in &page.links {
      report.links_checked += 1;
      if let Some(kind) = check_link(output_dir, &pages, url, page, href) {
        let issue = IntegrityIssue {
          page: url.clone(),
          href: href.clone(),
          kind,
        };
        warn!("{issue}");
        report.issues.push(issue);
      }
    }
  }

  info!(
    "Checked {} links on {} pages, {} broken",
    report.links_checked,
    report.pages_checked,
    report.issues.len()
  );
  Ok(report)
}

fn scan_site(
  output_dir: &Path,
) -> Result<BTreeMap<String, ScannedPage>, IntegrityError> {
  let mut pages = BTreeMap::new();

  for entry in WalkDir::new(output_dir).sort_by_file_name() {
    let entry = entry.map_err(|source| IntegrityError::Walk {
      path: output_dir.to_path_buf(),
      source,
    })?;
    let path = entry.path();
    if !path.is_file()
      || path.extension().and_then(|ext| ext.to_str()) != Some("html")
    {
      continue;
    }
    let Ok(relative) = path.strip_prefix(output_dir) else {
      continue;
    };

    let segments: Vec<String> = relative
      .components()
      .map(|c| c.as_os_str().to_string_lossy().into_owned())
      .collect();
    let (url, base) = page_location(&segments);

    let html = fs::read_to_string(path).map_err(|source| {
      IntegrityError::Read {
        path: path.to_path_buf(),
        source,
      }
    })?;
    let mut scanned = scan_html(&html);
    scanned.base = base;
    pages.insert(url, scanned);
  }

  Ok(pages)
}

/// Site URL and link base of a file given by its path segments.
fn page_location(segments: &[String]) -> (String, String) {
  let Some((file, dirs)) = segments.split_last() else {
    return ("/".to_string(), String::new());
  };
  let dir = dirs.join("/");
  if file == "index.html" {
    (format!("/{dir}"), dir)
  } else {
    (format!("/{}", segments.join("/")), dir)
  }
}

fn scan_html(html: &str) -> ScannedPage {
  let document = parse_html().one(html);
  let mut page = ScannedPage::default();

  for node in document.inclusive_descendants() {
    let Some(element) = node.as_element() else {
      continue;
    };
    let attributes = element.attributes.borrow();
    if let Some(id) = attributes.get("id") {
      page.ids.insert(id.to_string());
    }
    if element.name.local.as_ref() == "a" {
      if let Some(name) = attributes.get("name") {
        page.ids.insert(name.to_string());
      }
      if let Some(href) = attributes.get("href") {
        page.links.push(href.to_string());
      }
    }
  }

  page
}

fn check_link(
  output_dir: &Path,
  pages: &BTreeMap<String, ScannedPage>,
  current_url: &str,
  current: &ScannedPage,
  href: &str,
) -> Option<IssueKind> {
  if href.is_empty() || href.starts_with("//") || has_scheme(href) {
    return None;
  }

  let (target, fragment) = match href.split_once('#') {
    Some((target, fragment)) => (target, Some(percent_decode(fragment))),
    None => (href, None),
  };
  let target = target.split('?').next().unwrap_or_default();

  let url = if target.is_empty() {
    current_url.to_string()
  } else {
    let resolved = if let Some(absolute) = target.strip_prefix('/') {
      RelativePath::new(absolute).normalize()
    } else {
      RelativePath::new(&current.base).join_normalized(target)
    };
    canonical_url(&percent_decode(resolved.as_str()))
  };

  match pages.get(&url) {
    Some(page) => {
      match fragment {
        Some(fragment) if !fragment.is_empty() => {
          (!page.ids.contains(&*fragment))
            .then_some(IssueKind::MissingAnchor)
        },
        _ => None,
      }
    },
    None => {
      let file = output_dir.join(url.trim_start_matches('/'));
      (!file.is_file()).then_some(IssueKind::MissingPage)
    },
  }
}

/// `/a/b/`, `/a/b/index.html` and `a/b` all name the page `/a/b`.
fn canonical_url(path: &str) -> String {
  let path = path.trim_matches('/');
  let path = if path == "index.html" {
    ""
  } else {
    path.strip_suffix("/index.html").unwrap_or(path)
  };
  format!("/{path}")
}
