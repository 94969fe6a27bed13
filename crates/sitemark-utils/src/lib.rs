pub mod build;
pub mod markdown;
pub mod output;

// Re-export commonly used utilities
pub use build::{BuildReport, build_site, load_site_registry};
pub use markdown::{
  PageFailure,
  RenderedPage,
  build_heading_catalog,
  create_processor,
  render_pages,
};
pub use output::{
  REGISTRY_FILE,
  collect_markdown_files,
  find_orphans,
  page_output_path,
};
