//! SiteCanvas Export
//!
//! Turns a page document into static HTML. Elements keep their canvas
//! geometry as absolutely positioned boxes; the page scales down at the
//! project's breakpoints.

pub mod css;
pub mod html;
pub mod options;

pub use html::{escape_html, export_project, minify};
pub use options::{ExportFormat, ExportOptions};
