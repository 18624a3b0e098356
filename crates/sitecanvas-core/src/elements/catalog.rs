//! The fixed catalogue of element types.

use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default minimum edge length for resizable elements.
pub const DEFAULT_MIN_EDGE: f64 = 50.0;

/// Tag for every kind of element that can be placed on the page canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementType {
    Heading,
    Paragraph,
    Button,
    Image,
    Shape,
    Card,
    Hero,
    Navbar,
    Icon,
    Divider,
    Container,
    Form,
    Video,
    Testimonial,
}

impl ElementType {
    /// Every element type, in palette order.
    pub const ALL: [ElementType; 14] = [
        ElementType::Heading,
        ElementType::Paragraph,
        ElementType::Button,
        ElementType::Image,
        ElementType::Shape,
        ElementType::Card,
        ElementType::Hero,
        ElementType::Navbar,
        ElementType::Icon,
        ElementType::Divider,
        ElementType::Container,
        ElementType::Form,
        ElementType::Video,
        ElementType::Testimonial,
    ];

    /// Tag used in serialized documents.
    pub fn as_str(self) -> &'static str {
        match self {
            ElementType::Heading => "heading",
            ElementType::Paragraph => "paragraph",
            ElementType::Button => "button",
            ElementType::Image => "image",
            ElementType::Shape => "shape",
            ElementType::Card => "card",
            ElementType::Hero => "hero",
            ElementType::Navbar => "navbar",
            ElementType::Icon => "icon",
            ElementType::Divider => "divider",
            ElementType::Container => "container",
            ElementType::Form => "form",
            ElementType::Video => "video",
            ElementType::Testimonial => "testimonial",
        }
    }

    /// Human-readable name, used for new elements' metadata.
    pub fn display_name(self) -> &'static str {
        match self {
            ElementType::Heading => "Heading",
            ElementType::Paragraph => "Paragraph",
            ElementType::Button => "Button",
            ElementType::Image => "Image",
            ElementType::Shape => "Shape",
            ElementType::Card => "Card",
            ElementType::Hero => "Hero Section",
            ElementType::Navbar => "Navigation Bar",
            ElementType::Icon => "Icon",
            ElementType::Divider => "Divider",
            ElementType::Container => "Container",
            ElementType::Form => "Form",
            ElementType::Video => "Video",
            ElementType::Testimonial => "Testimonial",
        }
    }

    /// Size given to a freshly created element when the tool has no preset.
    pub fn default_size(self) -> Size {
        match self {
            ElementType::Heading => Size::new(300.0, 60.0),
            ElementType::Paragraph => Size::new(400.0, 100.0),
            ElementType::Button => Size::new(120.0, 40.0),
            ElementType::Image => Size::new(300.0, 200.0),
            ElementType::Shape => Size::new(100.0, 100.0),
            ElementType::Card => Size::new(300.0, 250.0),
            ElementType::Hero => Size::new(800.0, 400.0),
            ElementType::Navbar => Size::new(800.0, 60.0),
            ElementType::Icon => Size::new(48.0, 48.0),
            ElementType::Divider => Size::new(400.0, 2.0),
            ElementType::Container => Size::new(400.0, 300.0),
            ElementType::Form => Size::new(400.0, 320.0),
            ElementType::Video => Size::new(480.0, 270.0),
            ElementType::Testimonial => Size::new(400.0, 200.0),
        }
    }

    /// Smallest size a resize may produce when no constraint says otherwise.
    /// Never larger than the default size.
    pub fn min_size(self) -> Size {
        let floor = match self {
            ElementType::Icon => Size::new(16.0, 16.0),
            ElementType::Divider => Size::new(DEFAULT_MIN_EDGE, 1.0),
            _ => Size::new(DEFAULT_MIN_EDGE, DEFAULT_MIN_EDGE),
        };
        let default = self.default_size();
        Size::new(floor.width.min(default.width), floor.height.min(default.height))
    }

    /// Field that holds the element's text when content is a bare string
    /// in legacy documents.
    pub(crate) fn primary_text_field(self) -> &'static str {
        match self {
            ElementType::Heading | ElementType::Paragraph => "text",
            ElementType::Button => "label",
            ElementType::Image | ElementType::Video => "src",
            ElementType::Shape => "label",
            ElementType::Card | ElementType::Hero | ElementType::Form => "title",
            ElementType::Navbar => "brand",
            ElementType::Icon => "name",
            ElementType::Divider => "label",
            ElementType::Container => "label",
            ElementType::Testimonial => "quote",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown element tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown element type: {0}")]
pub struct UnknownElementType(pub String);

impl FromStr for ElementType {
    type Err = UnknownElementType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownElementType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_default_size() {
        assert_eq!(ElementType::Button.default_size(), Size::new(120.0, 40.0));
    }

    #[test]
    fn test_min_size_fits_default_size() {
        assert_eq!(ElementType::Button.min_size(), Size::new(50.0, 40.0));
        assert_eq!(ElementType::Divider.min_size(), Size::new(50.0, 1.0));
        for t in ElementType::ALL {
            let (min, default) = (t.min_size(), t.default_size());
            assert!(min.width <= default.width && min.height <= default.height, "{t}");
        }
    }

    #[test]
    fn test_parse_roundtrip_for_all_types() {
        for t in ElementType::ALL {
            assert_eq!(t.as_str().parse::<ElementType>(), Ok(t));
        }
    }

    #[test]
    fn test_parse_unknown() {
        assert!("carousel".parse::<ElementType>().is_err());
    }

    #[test]
    fn test_serde_tag_matches_as_str() {
        let json = serde_json::to_string(&ElementType::Testimonial).unwrap();
        assert_eq!(json, "\"testimonial\"");
    }
}
