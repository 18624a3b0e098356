//! Project-wide settings used by export.

use serde::{Deserialize, Serialize};

/// Search-engine metadata for the exported page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeoSettings {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub author: String,
    /// Open Graph preview image URL.
    pub og_image: Option<String>,
}

impl Default for SeoSettings {
    fn default() -> Self {
        Self {
            title: "My Website".to_string(),
            description: String::new(),
            keywords: Vec::new(),
            author: String::new(),
            og_image: None,
        }
    }
}

/// Colours and typography.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeSettings {
    pub primary_color: String,
    pub secondary_color: String,
    pub background_color: String,
    pub text_color: String,
    pub font_family: String,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            primary_color: "#3b82f6".to_string(),
            secondary_color: "#64748b".to_string(),
            background_color: "#ffffff".to_string(),
            text_color: "#1f2937".to_string(),
            font_family: "Inter, system-ui, sans-serif".to_string(),
        }
    }
}

/// Breakpoints used for responsive scaling on export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponsiveSettings {
    pub tablet_breakpoint: f64,
    pub mobile_breakpoint: f64,
}

impl Default for ResponsiveSettings {
    fn default() -> Self {
        Self {
            tablet_breakpoint: 1024.0,
            mobile_breakpoint: 768.0,
        }
    }
}

/// Settings stored next to the canvas in the project blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    pub seo: SeoSettings,
    pub theme: ThemeSettings,
    pub responsive: ResponsiveSettings,
    /// `lang` attribute of the exported document.
    pub language: String,
    pub favicon: Option<String>,
    /// Google Analytics measurement id.
    pub analytics_id: Option<String>,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            seo: SeoSettings::default(),
            theme: ThemeSettings::default(),
            responsive: ResponsiveSettings::default(),
            language: "en".to_string(),
            favicon: None,
            analytics_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: ProjectSettings = serde_json::from_str(r#"{"seo":{"title":"Shop"}}"#).unwrap();
        assert_eq!(settings.seo.title, "Shop");
        assert_eq!(settings.language, "en");
        assert_eq!(settings.theme, ThemeSettings::default());
    }
}
