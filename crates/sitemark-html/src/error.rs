use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors raised while loading layouts or assembling a page.
#[derive(Debug, Error)]
pub enum TemplateError {
  #[error("Failed to read template {}: {source}", path.display())]
  Read {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Failed to parse template '{name}': {source}")]
  Parse {
    name:   String,
    #[source]
    source: tera::Error,
  },

  #[error("Layout '{layout}' requested by {file} was not loaded")]
  UnknownLayout { layout: String, file: String },

  #[error("Failed to render layout '{layout}' for {file}: {source}")]
  Render {
    layout: String,
    file:   String,
    #[source]
    source: tera::Error,
  },
}

/// Errors raised by the link integrity pass.
#[derive(Debug, Error)]
pub enum IntegrityError {
  #[error("Output directory not found: {}", .0.display())]
  MissingOutput(PathBuf),

  #[error("Failed to read {}: {source}", path.display())]
  Read {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Failed to walk {}: {source}", path.display())]
  Walk {
    path:   PathBuf,
    #[source]
    source: walkdir::Error,
  },
}
