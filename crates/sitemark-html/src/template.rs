use std::{collections::HashSet, fmt::Write, fs, path::Path};

use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Serialize;
use sitemark_commonmark::{Header, MarkdownResult};
use sitemark_sitemap::{Page, PageRegistry};
use tera::Tera;

use crate::error::TemplateError;

/// Layout used for pages that do not name one in the sitemap.
pub const DEFAULT_LAYOUT: &str = "default.html";

/// Embedded fallback for [`DEFAULT_LAYOUT`].
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/default.html");

/// A link in the navigation, breadcrumbs or child list of a page.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NavLink {
  pub url:    String,
  pub name:   String,
  pub active: bool,
}

impl NavLink {
  fn to(page: &Page, active: bool) -> Self {
    Self {
      url: page.url.clone(),
      name: page.name.clone(),
      active,
    }
  }
}

/// Assembles rendered documents into full pages.
///
/// Every layout the sitemap mentions is loaded once up front; rendering only
/// reads from the compiled templates and can run on many threads.
/// Autoescaping is off, layouts escape text with the `escape` filter.
#[derive(Debug)]
pub struct PageRenderer {
  tera:    Tera,
  layouts: HashSet<String>,
}

impl PageRenderer {
  /// Load the default layout and every layout named in `registry`.
  ///
  /// `default.html` inside `template_dir` replaces the embedded default. A
  /// named layout that cannot be found is skipped with a warning; pages that
  /// use it fail when rendered.
  ///
  /// # Errors
  ///
  /// Returns an error if a template file exists but cannot be read or parsed.
  pub fn new(
    template_dir: Option<&Path>,
    registry: &PageRegistry,
  ) -> Result<Self, TemplateError> {
    let mut tera = Tera::default();
    tera.autoescape_on(Vec::new());
    let mut renderer = Self {
      tera,
      layouts: HashSet::new(),
    };

    let default = match template_dir.map(|dir| dir.join(DEFAULT_LAYOUT)) {
      Some(path) if path.is_file() => {
        log::debug!("Using default layout from {}", path.display());
        read_template(&path)?
      },
      _ => DEFAULT_TEMPLATE.to_string(),
    };
    renderer.add(DEFAULT_LAYOUT, &default)?;

    let requested: HashSet<&str> = registry
      .pages
      .values()
      .filter_map(|page| page.layout.as_deref())
      .filter(|layout| *layout != DEFAULT_LAYOUT)
      .collect();

    for layout in requested {
      let Some(dir) = template_dir else {
        log::warn!(
          "Layout '{layout}' is used in the sitemap but no template \
           directory is configured"
        );
        continue;
      };
      let path = dir.join(layout);
      if !path.is_file() {
        log::warn!("Layout '{layout}' not found at {}", path.display());
        continue;
      }
      let content = read_template(&path)?;
      renderer.add(layout, &content)?;
    }

    Ok(renderer)
  }

  /// Compile `content` under `name`.
  ///
  /// # Errors
  ///
  /// Returns an error if the template does not parse.
  pub fn add(
    &mut self,
    name: &str,
    content: &str,
  ) -> Result<(), TemplateError> {
    self
      .tera
      .add_raw_template(name, content)
      .map_err(|source| TemplateError::Parse {
        name: name.to_string(),
        source,
      })?;
    self.layouts.insert(name.to_string());
    Ok(())
  }

  /// Whether `name` can be used as a layout.
  #[must_use]
  pub fn has_layout(&self, name: &str) -> bool {
    self.layouts.contains(name)
  }

  /// Render `page` with its rendered markdown into a full HTML document.
  ///
  /// # Errors
  ///
  /// Returns an error if the page's layout was not loaded or fails to render.
  pub fn render_page(
    &self,
    registry: &PageRegistry,
    page: &Page,
    document: &MarkdownResult,
  ) -> Result<String, TemplateError> {
    let layout = page.layout.as_deref().unwrap_or(DEFAULT_LAYOUT);
    if !self.has_layout(layout) {
      return Err(TemplateError::UnknownLayout {
        layout: layout.to_string(),
        file:   page.file.clone(),
      });
    }

    let context = page_context(registry, page, document);
    self
      .tera
      .render(layout, &context)
      .map_err(|source| TemplateError::Render {
        layout: layout.to_string(),
        file: page.file.clone(),
        source,
      })
  }
}

fn read_template(path: &Path) -> Result<String, TemplateError> {
  fs::read_to_string(path).map_err(|source| TemplateError::Read {
    path: path.to_path_buf(),
    source,
  })
}

/// Variables available to layouts.
fn page_context(
  registry: &PageRegistry,
  page: &Page,
  document: &MarkdownResult,
) -> tera::Context {
  let breadcrumbs: Vec<NavLink> = page
    .breadcrumbs
    .iter()
    .filter_map(|url| registry.page(url))
    .map(|crumb| NavLink::to(crumb, false))
    .collect();

  let children: Vec<NavLink> = registry
    .children_of(&page.url)
    .map(|child| NavLink::to(child, false))
    .collect();

  let nav: Vec<NavLink> = registry
    .top_level()
    .map(|item| {
      let active = item.url == page.url
        || page.breadcrumbs.first().is_some_and(|url| *url == item.url);
      NavLink::to(item, active)
    })
    .collect();

  let mut context = tera::Context::new();
  context.insert("title", &page.title);
  context.insert("name", &page.name);
  context.insert("url", &page.url);
  context.insert("section", &page.section);
  context.insert("breadcrumbs", &breadcrumbs);
  context.insert("children", &children);
  context.insert("nav", &nav);
  context.insert("toc", &generate_toc(&document.headers));
  context.insert("content", &document.html);
  context
}

/// Nested list of links to the headings of levels 1 to 3.
#[must_use]
pub fn generate_toc(headers: &[Header]) -> String {
  let mut toc = String::new();
  let mut open: Vec<u8> = Vec::new();

  for header in headers.iter().filter(|h| h.level <= 3) {
    if open.last().is_none_or(|&level| header.level > level) {
      toc.push_str("<ul>");
      open.push(header.level);
    } else {
      while open.len() > 1 && open.last().is_some_and(|&l| header.level < l) {
        toc.push_str("</li></ul>");
        open.pop();
      }
      toc.push_str("</li>");
    }

    // Writing to String is infallible
    let _ = write!(
      toc,
      "<li><a href=\"#{}\">{}</a>",
      encode_double_quoted_attribute(&header.id),
      encode_text(&header.text)
    );
  }

  for _ in open {
    toc.push_str("</li></ul>");
  }
  toc
}
