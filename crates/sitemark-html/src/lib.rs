//! HTML output for sitemark: rendered documents are wrapped in tera layouts,
//! and the finished site can be checked for dead links and anchors.
pub mod error;
pub mod integrity;
pub mod template;

pub use crate::{
  error::{IntegrityError, TemplateError},
  integrity::{IntegrityIssue, IntegrityReport, IssueKind, check_site},
  template::{DEFAULT_LAYOUT, NavLink, PageRenderer, generate_toc},
};
