//! Per-type element content.
//!
//! Content is a tagged union keyed by the element type, so every editor and
//! renderer gets exhaustive matching instead of probing optional fields.

use super::ElementType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingContent {
    pub text: String,
    /// 1..=6, as in `<h1>`..`<h6>`.
    pub level: u8,
}

impl Default for HeadingContent {
    fn default() -> Self {
        Self {
            text: "Your Heading".to_string(),
            level: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParagraphContent {
    pub text: String,
}

impl Default for ParagraphContent {
    fn default() -> Self {
        Self {
            text: "Write something here.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonContent {
    pub label: String,
    pub href: Option<String>,
}

impl Default for ButtonContent {
    fn default() -> Self {
        Self {
            label: "Click me".to_string(),
            href: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageContent {
    pub src: String,
    pub alt: String,
}

/// Outline of a decorative shape element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Circle,
    Triangle,
    Diamond,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeContent {
    pub shape: ShapeKind,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardContent {
    pub title: String,
    pub description: String,
    pub features: Vec<String>,
    pub image: Option<String>,
    pub button_label: Option<String>,
}

impl Default for CardContent {
    fn default() -> Self {
        Self {
            title: "Card Title".to_string(),
            description: "A short description of this card.".to_string(),
            features: Vec::new(),
            image: None,
            button_label: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroContent {
    pub title: String,
    pub subtitle: String,
    pub cta_label: Option<String>,
    pub cta_href: Option<String>,
    pub background_image: Option<String>,
}

impl Default for HeroContent {
    fn default() -> Self {
        Self {
            title: "Build something great".to_string(),
            subtitle: "A compelling subtitle goes here.".to_string(),
            cta_label: Some("Get started".to_string()),
            cta_href: None,
            background_image: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavItem {
    pub label: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavbarContent {
    pub brand: String,
    pub items: Vec<NavItem>,
}

impl Default for NavbarContent {
    fn default() -> Self {
        let item = |label: &str, href: &str| NavItem {
            label: label.to_string(),
            href: href.to_string(),
        };
        Self {
            brand: "Brand".to_string(),
            items: vec![item("Home", "#"), item("About", "#about"), item("Contact", "#contact")],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconContent {
    pub name: String,
}

impl Default for IconContent {
    fn default() -> Self {
        Self {
            name: "star".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DividerContent {
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormField {
    pub label: String,
    pub field_type: String,
    pub required: bool,
}

impl Default for FormField {
    fn default() -> Self {
        Self {
            label: String::new(),
            field_type: "text".to_string(),
            required: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormContent {
    pub title: String,
    pub fields: Vec<FormField>,
    pub submit_label: String,
}

impl Default for FormContent {
    fn default() -> Self {
        let field = |label: &str, field_type: &str| FormField {
            label: label.to_string(),
            field_type: field_type.to_string(),
            required: true,
        };
        Self {
            title: "Contact us".to_string(),
            fields: vec![field("Name", "text"), field("Email", "email"), field("Message", "textarea")],
            submit_label: "Send".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoContent {
    pub src: String,
    pub poster: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestimonialContent {
    pub quote: String,
    pub author: String,
    pub role: String,
}

impl Default for TestimonialContent {
    fn default() -> Self {
        Self {
            quote: "This product changed how our team works.".to_string(),
            author: "Jane Doe".to_string(),
            role: "CEO".to_string(),
        }
    }
}

/// A plain grouping box. Children are positioned independently on the canvas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerContent {
    pub label: String,
}

/// Content of an element. The variant doubles as the element's type tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ElementContent {
    Heading(HeadingContent),
    Paragraph(ParagraphContent),
    Button(ButtonContent),
    Image(ImageContent),
    Shape(ShapeContent),
    Card(CardContent),
    Hero(HeroContent),
    Navbar(NavbarContent),
    Icon(IconContent),
    Divider(DividerContent),
    Container(ContainerContent),
    Form(FormContent),
    Video(VideoContent),
    Testimonial(TestimonialContent),
}

impl ElementContent {
    /// Default content for a freshly created element.
    pub fn default_for(element_type: ElementType) -> Self {
        match element_type {
            ElementType::Heading => Self::Heading(HeadingContent::default()),
            ElementType::Paragraph => Self::Paragraph(ParagraphContent::default()),
            ElementType::Button => Self::Button(ButtonContent::default()),
            ElementType::Image => Self::Image(ImageContent::default()),
            ElementType::Shape => Self::Shape(ShapeContent::default()),
            ElementType::Card => Self::Card(CardContent::default()),
            ElementType::Hero => Self::Hero(HeroContent::default()),
            ElementType::Navbar => Self::Navbar(NavbarContent::default()),
            ElementType::Icon => Self::Icon(IconContent::default()),
            ElementType::Divider => Self::Divider(DividerContent::default()),
            ElementType::Container => Self::Container(ContainerContent::default()),
            ElementType::Form => Self::Form(FormContent::default()),
            ElementType::Video => Self::Video(VideoContent::default()),
            ElementType::Testimonial => Self::Testimonial(TestimonialContent::default()),
        }
    }

    /// The element type this content belongs to.
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Heading(_) => ElementType::Heading,
            Self::Paragraph(_) => ElementType::Paragraph,
            Self::Button(_) => ElementType::Button,
            Self::Image(_) => ElementType::Image,
            Self::Shape(_) => ElementType::Shape,
            Self::Card(_) => ElementType::Card,
            Self::Hero(_) => ElementType::Hero,
            Self::Navbar(_) => ElementType::Navbar,
            Self::Icon(_) => ElementType::Icon,
            Self::Divider(_) => ElementType::Divider,
            Self::Container(_) => ElementType::Container,
            Self::Form(_) => ElementType::Form,
            Self::Video(_) => ElementType::Video,
            Self::Testimonial(_) => ElementType::Testimonial,
        }
    }

    /// The main human-visible text of the element, if it has one.
    pub fn primary_text(&self) -> Option<&str> {
        match self {
            Self::Heading(c) => Some(&c.text),
            Self::Paragraph(c) => Some(&c.text),
            Self::Button(c) => Some(&c.label),
            Self::Shape(c) if !c.label.is_empty() => Some(&c.label),
            Self::Card(c) => Some(&c.title),
            Self::Hero(c) => Some(&c.title),
            Self::Navbar(c) => Some(&c.brand),
            Self::Divider(c) if !c.label.is_empty() => Some(&c.label),
            Self::Container(c) if !c.label.is_empty() => Some(&c.label),
            Self::Form(c) => Some(&c.title),
            Self::Testimonial(c) => Some(&c.quote),
            Self::Image(_)
            | Self::Shape(_)
            | Self::Icon(_)
            | Self::Divider(_)
            | Self::Container(_)
            | Self::Video(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_content_matches_type() {
        for t in ElementType::ALL {
            assert_eq!(ElementContent::default_for(t).element_type(), t);
        }
    }

    #[test]
    fn test_tagged_serialization() {
        let content = ElementContent::Button(ButtonContent {
            label: "Buy".to_string(),
            href: Some("/buy".to_string()),
        });
        let value = serde_json::to_value(&content).unwrap();
        assert_eq!(value["type"], "button");
        assert_eq!(value["label"], "Buy");
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let content: ElementContent = serde_json::from_str(r#"{"type":"heading","text":"Hi"}"#).unwrap();
        match content {
            ElementContent::Heading(h) => {
                assert_eq!(h.text, "Hi");
                assert_eq!(h.level, 2);
            }
            other => panic!("unexpected content {other:?}"),
        }
    }

    #[test]
    fn test_primary_text() {
        let content = ElementContent::default_for(ElementType::Button);
        assert_eq!(content.primary_text(), Some("Click me"));
        assert_eq!(ElementContent::default_for(ElementType::Icon).primary_text(), None);
    }
}
