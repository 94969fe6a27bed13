use std::{fs, path::Path};

use color_eyre::eyre::{Context, Report, Result};
use log::{debug, info};
use rayon::prelude::*;
use sitemark_commonmark::{
  BrokenAnchor,
  HeadingCatalog,
  LinkResolver,
  MarkdownOptionsBuilder,
  MarkdownProcessor,
};
use sitemark_config::Config;
use sitemark_html::PageRenderer;
use sitemark_sitemap::{Page, PageRegistry};

/// A page that rendered successfully and is ready to be written.
#[derive(Debug, Clone)]
pub struct RenderedPage {
  pub url:            String,
  pub file:           String,
  pub html:           String,
  pub broken_anchors: Vec<BrokenAnchor>,
}

/// A page whose source could not be read, rendered or assembled.
#[derive(Debug)]
pub struct PageFailure {
  pub url:   String,
  pub file:  String,
  pub error: Report,
}

/// Creates a markdown processor from the sitemark configuration.
#[must_use]
pub fn create_processor(config: &Config) -> MarkdownProcessor {
  let options = MarkdownOptionsBuilder::new()
    .gfm(true)
    .video_embeds(config.video_embeds)
    .check_link_syntax(true)
    .anchor_class(config.anchor_class.as_str())
    .build();
  MarkdownProcessor::new(options)
}

fn read_source(content_dir: &Path, page: &Page) -> Result<String> {
  let path = content_dir.join(&page.file);
  fs::read_to_string(&path).wrap_err_with(|| {
    format!(
      "Failed to read content file {} for {}",
      path.display(),
      page.url
    )
  })
}

/// Headings of every page, computed in parallel before any page is rendered.
///
/// Pages whose source cannot be read are left out; the render phase reports
/// them.
#[must_use]
pub fn build_heading_catalog(
  content_dir: &Path,
  registry: &PageRegistry,
  processor: &MarkdownProcessor,
) -> HeadingCatalog {
  let pages: Vec<&Page> = registry.pages.values().collect();
  let catalog: HeadingCatalog = pages
    .par_iter()
    .filter_map(|page| {
      let source = read_source(content_dir, page).ok()?;
      let (headers, _) = processor.extract_headers(&source);
      Some((page.file.clone(), headers))
    })
    .collect::<Vec<_>>()
    .into_iter()
    .collect();

  debug!("Collected headings of {} documents", catalog.len());
  catalog
}

/// Render every page of the registry.
///
/// One failing page does not stop the others: successes and failures are
/// both returned, in sitemap order.
pub fn render_pages(
  content_dir: &Path,
  registry: &PageRegistry,
  resolver: &LinkResolver<'_>,
  processor: &MarkdownProcessor,
  renderer: &PageRenderer,
) -> (Vec<RenderedPage>, Vec<PageFailure>) {
  let pages: Vec<&Page> = registry.pages.values().collect();
  let results: Vec<Result<RenderedPage, PageFailure>> = pages
    .par_iter()
    .map(|page| {
      render_page(content_dir, registry, resolver, processor, renderer, page)
        .map_err(|error| {
          PageFailure {
            url: page.url.clone(),
            file: page.file.clone(),
            error,
          }
        })
    })
    .collect();

  let (rendered, failures): (Vec<_>, Vec<_>) =
    results.into_iter().partition(Result::is_ok);
  let rendered: Vec<RenderedPage> =
    rendered.into_iter().filter_map(Result::ok).collect();
  let failures: Vec<PageFailure> =
    failures.into_iter().filter_map(Result::err).collect();

  info!(
    "Rendered {} of {} pages",
    rendered.len(),
    rendered.len() + failures.len()
  );
  (rendered, failures)
}

fn render_page(
  content_dir: &Path,
  registry: &PageRegistry,
  resolver: &LinkResolver<'_>,
  processor: &MarkdownProcessor,
  renderer: &PageRenderer,
  page: &Page,
) -> Result<RenderedPage> {
  let source = read_source(content_dir, page)?;
  let document = processor.render(&source, &page.file, resolver)?;
  let html = renderer.render_page(registry, page, &document)?;

  Ok(RenderedPage {
    url: page.url.clone(),
    file: page.file.clone(),
    html,
    broken_anchors: document.broken_anchors,
  })
}
