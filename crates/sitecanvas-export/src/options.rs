//! Export options.

use serde::{Deserialize, Serialize};

/// Shape of the generated markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// A complete standalone document.
    #[default]
    Html5,
    /// Only the page container, for embedding into an existing page.
    Fragment,
}

/// What the exported page includes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// Collapse whitespace between tags.
    pub minify: bool,
    pub include_css: bool,
    /// Inline script that scales the page to the window width.
    pub include_js: bool,
    /// Viewport meta tag and breakpoint media queries.
    pub responsive: bool,
    /// Description, keywords, author and Open Graph meta tags.
    pub seo: bool,
    /// Analytics snippet, if the project has an analytics id.
    pub analytics: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Html5,
            minify: false,
            include_css: true,
            include_js: false,
            responsive: true,
            seo: true,
            analytics: false,
        }
    }
}
