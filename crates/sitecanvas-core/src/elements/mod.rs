//! Element definitions for the page canvas.

mod catalog;
mod content;

pub use catalog::{DEFAULT_MIN_EDGE, ElementType, UnknownElementType};
pub use content::{
    ButtonContent, CardContent, ContainerContent, DividerContent, ElementContent, FormContent, FormField,
    HeadingContent, HeroContent, IconContent, ImageContent, NavItem, NavbarContent,
    ParagraphContent, ShapeContent, ShapeKind, TestimonialContent, VideoContent,
};

use crate::interaction::Draggable;
use chrono::{DateTime, Utc};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = String;

/// Flat visual properties (`color`, `font-size`, `animation-name`, ...).
pub type Styles = BTreeMap<String, String>;

/// Type-specific behavioral data that is not content.
pub type Props = serde_json::Map<String, serde_json::Value>;

/// Generate a fresh element id.
pub fn new_element_id() -> ElementId {
    Uuid::new_v4().to_string()
}

/// Optional geometry limits and locks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Constraints {
    pub min_width: Option<f64>,
    pub max_width: Option<f64>,
    pub min_height: Option<f64>,
    pub max_height: Option<f64>,
    /// Keep width/height ratio while resizing.
    pub lock_aspect_ratio: bool,
    /// Ignore drag gestures.
    pub lock_position: bool,
    /// Ignore resize gestures.
    pub lock_size: bool,
}

/// Descriptive data about an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    /// Grouping key for the section view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
}

impl Metadata {
    fn new(name: &str, now: DateTime<Utc>) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            created: now,
            modified: now,
            section_id: None,
        }
    }
}

/// A single placeable unit on the page canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub(crate) id: ElementId,
    /// Left edge in canvas pixels.
    pub x: f64,
    /// Top edge in canvas pixels.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Paint order (higher paints later).
    pub z_index: u32,
    #[serde(default)]
    pub styles: Styles,
    pub content: ElementContent,
    #[serde(default)]
    pub props: Props,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,
    pub metadata: Metadata,
}

impl Element {
    /// Create an element of the given type with its default size and content.
    pub fn new(element_type: ElementType, position: Point, now: DateTime<Utc>) -> Self {
        Self::with_size(element_type, position, element_type.default_size(), now)
    }

    /// Create an element with an explicit size.
    pub fn with_size(element_type: ElementType, position: Point, size: Size, now: DateTime<Utc>) -> Self {
        Self {
            id: new_element_id(),
            x: position.x,
            y: position.y,
            width: size.width,
            height: size.height,
            z_index: 0,
            styles: Styles::new(),
            content: ElementContent::default_for(element_type),
            props: Props::new(),
            constraints: None,
            metadata: Metadata::new(element_type.display_name(), now),
        }
    }

    /// Reconstruct an element with a specific ID (for templates and storage).
    pub fn reconstruct(id: impl Into<ElementId>, content: ElementContent, bounds: Rect, now: DateTime<Utc>) -> Self {
        let element_type = content.element_type();
        Self {
            id: id.into(),
            x: bounds.x0,
            y: bounds.y0,
            width: bounds.width(),
            height: bounds.height(),
            z_index: 0,
            styles: Styles::new(),
            content,
            props: Props::new(),
            constraints: None,
            metadata: Metadata::new(element_type.display_name(), now),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn element_type(&self) -> ElementType {
        self.content.element_type()
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Bounding box in canvas space.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Check if a canvas point is inside the element (with tolerance).
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.bounds().inflate(tolerance, tolerance).contains(point)
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    pub fn is_position_locked(&self) -> bool {
        self.constraints.as_ref().is_some_and(|c| c.lock_position)
    }

    pub fn is_size_locked(&self) -> bool {
        self.constraints.as_ref().is_some_and(|c| c.lock_size)
    }

    pub fn keeps_aspect_ratio(&self) -> bool {
        self.constraints.as_ref().is_some_and(|c| c.lock_aspect_ratio)
    }

    /// Lower size bound: constraints first, then the type's minimum.
    pub fn min_size(&self) -> Size {
        let fallback = self.element_type().min_size();
        match &self.constraints {
            Some(c) => Size::new(
                c.min_width.unwrap_or(fallback.width),
                c.min_height.unwrap_or(fallback.height),
            ),
            None => fallback,
        }
    }

    /// Upper size bound (unbounded unless constrained).
    pub fn max_size(&self) -> Size {
        match &self.constraints {
            Some(c) => Size::new(
                c.max_width.unwrap_or(f64::INFINITY),
                c.max_height.unwrap_or(f64::INFINITY),
            ),
            None => Size::new(f64::INFINITY, f64::INFINITY),
        }
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.metadata.modified = now;
    }

    /// A copy of this element with a new id and fresh timestamps.
    pub fn duplicate(&self, offset: Vec2, now: DateTime<Utc>) -> Self {
        let mut copy = self.clone();
        copy.id = new_element_id();
        copy.translate(offset);
        copy.metadata.created = now;
        copy.metadata.modified = now;
        copy
    }
}

impl Draggable for Element {
    fn id(&self) -> &str {
        &self.id
    }

    fn position(&self) -> Point {
        Element::position(self)
    }

    fn set_position(&mut self, position: Point) {
        self.x = position.x;
        self.y = position.y;
    }

    fn size(&self) -> Size {
        Element::size(self)
    }

    fn set_size(&mut self, size: Size) {
        self.width = size.width;
        self.height = size.height;
    }

    fn min_size(&self) -> Size {
        Element::min_size(self)
    }

    fn max_size(&self) -> Size {
        Element::max_size(self)
    }

    fn keeps_aspect_ratio(&self) -> bool {
        Element::keeps_aspect_ratio(self)
    }

    fn is_position_locked(&self) -> bool {
        Element::is_position_locked(self)
    }

    fn is_size_locked(&self) -> bool {
        Element::is_size_locked(self)
    }

    fn bounds(&self) -> Rect {
        Element::bounds(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button() -> Element {
        Element::new(ElementType::Button, Point::new(50.0, 50.0), Utc::now())
    }

    #[test]
    fn test_new_element_uses_type_defaults() {
        let element = button();
        assert_eq!(element.size(), Size::new(120.0, 40.0));
        assert_eq!(element.element_type(), ElementType::Button);
        assert_eq!(element.metadata.name, "Button");
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(button().id(), button().id());
    }

    #[test]
    fn test_hit_test() {
        let element = button();
        assert!(element.hit_test(Point::new(60.0, 60.0), 0.0));
        assert!(!element.hit_test(Point::new(10.0, 10.0), 0.0));
        assert!(element.hit_test(Point::new(48.0, 50.0), 3.0));
    }

    #[test]
    fn test_size_limits_from_constraints() {
        let mut element = button();
        assert_eq!(element.min_size(), Size::new(50.0, 40.0));
        assert!(element.max_size().width.is_infinite());

        element.constraints = Some(Constraints {
            min_width: Some(80.0),
            max_width: Some(300.0),
            ..Default::default()
        });
        assert_eq!(element.min_size(), Size::new(80.0, 40.0));
        assert_eq!(element.max_size().width, 300.0);
    }

    #[test]
    fn test_duplicate_gets_new_identity() {
        let element = button();
        let later = element.metadata.created + chrono::Duration::seconds(5);
        let copy = element.duplicate(Vec2::new(20.0, 20.0), later);

        assert_ne!(copy.id(), element.id());
        assert_eq!(copy.position(), Point::new(70.0, 70.0));
        assert_eq!(copy.metadata.created, later);
        assert_eq!(copy.content, element.content);
    }

    #[test]
    fn test_json_shape() {
        let element = button();
        let value = serde_json::to_value(&element).unwrap();
        assert_eq!(value["content"]["type"], "button");
        assert!(value.get("constraints").is_none());
        let back: Element = serde_json::from_value(value).unwrap();
        assert_eq!(back, element);
    }
}
