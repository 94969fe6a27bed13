//! The build pipeline.
//!
//! Phases run in a fixed order: the page registry is built sequentially,
//! then the headings of every document are collected in parallel, then every
//! page is rendered in parallel. Render failures are collected and reported
//! together once all pages have been tried.
use std::fs;

use color_eyre::eyre::{Context, Result, bail};
use log::{error, info, warn};
use sitemark_commonmark::{AssetMap, BrokenAnchor, LinkResolver, load_asset_map};
use sitemark_config::Config;
use sitemark_html::{IntegrityReport, PageRenderer, check_site};
use sitemark_sitemap::{PageRegistry, load_registry};

use crate::{
  markdown::{build_heading_catalog, create_processor, render_pages},
  output::{find_orphans, write_page, write_registry},
};

/// Summary of a finished build.
#[derive(Debug, Default)]
pub struct BuildReport {
  /// Number of pages written.
  pub pages:          usize,
  /// Anchors that matched no heading, with the file they were found in.
  pub broken_anchors: Vec<(String, BrokenAnchor)>,
  /// Markdown files not listed in the sitemap.
  pub orphans:        Vec<String>,
  /// Result of the integrity pass, when enabled.
  pub integrity:      Option<IntegrityReport>,
}

/// Load the page registry described by `config`.
///
/// # Errors
///
/// Returns an error if the sitemap is missing, empty, or has duplicates in
/// strict mode.
pub fn load_site_registry(config: &Config) -> Result<PageRegistry> {
  let registry = load_registry(&config.sitemap, config.strict_sitemap)
    .wrap_err_with(|| {
      format!("Failed to load sitemap {}", config.sitemap.display())
    })?;
  info!(
    "Loaded {} pages from {}",
    registry.len(),
    config.sitemap.display()
  );
  Ok(registry)
}

/// Build the whole site described by `config`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the sitemap cannot be
/// loaded, any page fails to render, or the output cannot be written.
pub fn build_site(config: &Config) -> Result<BuildReport> {
  config.validate_paths()?;

  let registry = load_site_registry(config)?;

  let assets: Option<AssetMap> = config
    .asset_map
    .as_deref()
    .map(load_asset_map)
    .transpose()?;

  let renderer = PageRenderer::new(config.template_dir.as_deref(), &registry)?;
  let processor = create_processor(config);

  let thread_count = config.jobs.unwrap_or_else(num_cpus::get);
  let pool = rayon::ThreadPoolBuilder::new()
    .num_threads(thread_count)
    .build()
    .wrap_err("Failed to create render thread pool")?;
  info!("Rendering with {thread_count} threads");

  let (rendered, failures) = pool.install(|| {
    let catalog =
      build_heading_catalog(&config.content_dir, &registry, &processor);

    let mut resolver = LinkResolver::new(&registry).with_catalog(&catalog);
    if let Some(assets) = &assets {
      resolver = resolver.with_assets(assets);
    }

    render_pages(
      &config.content_dir,
      &registry,
      &resolver,
      &processor,
      &renderer,
    )
  });

  if !failures.is_empty() {
    for failure in &failures {
      error!("{} ({}): {:#}", failure.file, failure.url, failure.error);
    }
    bail!(
      "{} of {} pages failed to render",
      failures.len(),
      registry.len()
    );
  }

  fs::create_dir_all(&config.output_dir).wrap_err_with(|| {
    format!(
      "Failed to create output directory: {}",
      config.output_dir.display()
    )
  })?;

  let mut report = BuildReport {
    pages: rendered.len(),
    orphans: find_orphans(&config.content_dir, &registry),
    ..Default::default()
  };

  for page in rendered {
    write_page(&config.output_dir, &page)?;
    report.broken_anchors.extend(
      page
        .broken_anchors
        .into_iter()
        .map(|anchor| (page.file.clone(), anchor)),
    );
  }

  if config.write_registry {
    let path = write_registry(&config.output_dir, &registry)?;
    info!("Wrote page registry to {}", path.display());
  }

  if config.check_links {
    let integrity = check_site(&config.output_dir)?;
    if !integrity.is_clean() {
      warn!(
        "Integrity check found {} broken links",
        integrity.issues.len()
      );
    }
    report.integrity = Some(integrity);
  }

  info!(
    "Built {} pages into {}",
    report.pages,
    config.output_dir.display()
  );
  Ok(report)
}
