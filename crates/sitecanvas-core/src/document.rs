//! Page document and state management.

use crate::camera::clamp_zoom;
use crate::camera::{MAX_ZOOM, MIN_ZOOM};
use crate::elements::{Element, ElementId};
use crate::snap::GRID_SIZE;
use chrono::{DateTime, Utc};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Default page canvas width (desktop).
pub const DEFAULT_CANVAS_WIDTH: f64 = 1200.0;
/// Default page canvas height.
pub const DEFAULT_CANVAS_HEIGHT: f64 = 800.0;

/// Device preview the canvas is laid out for. Display-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Viewport {
    #[default]
    Desktop,
    Tablet,
    Mobile,
}

impl Viewport {
    /// Canvas width used when previewing this viewport.
    pub fn canvas_width(self) -> f64 {
        match self {
            Viewport::Desktop => DEFAULT_CANVAS_WIDTH,
            Viewport::Tablet => 768.0,
            Viewport::Mobile => 375.0,
        }
    }
}

/// Editor toggles persisted with the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasSettings {
    pub auto_save: bool,
    pub snap_to_grid: bool,
    pub grid_size: f64,
    pub show_grid: bool,
    pub show_rulers: bool,
    pub show_guides: bool,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            auto_save: true,
            snap_to_grid: false,
            grid_size: GRID_SIZE,
            show_grid: true,
            show_rulers: false,
            show_guides: true,
        }
    }
}

impl CanvasSettings {
    /// Grid size to snap to, if snapping is on.
    pub fn snap_grid(&self) -> Option<f64> {
        (self.snap_to_grid && self.grid_size > 0.0).then_some(self.grid_size)
    }
}

/// The whole page-builder document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasState {
    /// Elements in creation order (paint order is `z_index`).
    pub elements: Vec<Element>,
    pub selected_element_id: Option<ElementId>,
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub zoom: f64,
    pub viewport: Viewport,
    pub settings: CanvasSettings,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            selected_element_id: None,
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            zoom: 1.0,
            viewport: Viewport::Desktop,
            settings: CanvasSettings::default(),
        }
    }
}

/// The undoable part of the document.
///
/// View state (zoom, viewport, toggles) is not part of undo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub elements: Vec<Element>,
    pub selected_element_id: Option<ElementId>,
}

/// A named set of elements that replaces the page content when applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub elements: Vec<Element>,
}

impl CanvasState {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a snapshot of the undoable state.
    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            elements: self.elements.clone(),
            selected_element_id: self.selected_element_id.clone(),
        }
    }

    /// Restore a snapshot, leaving view state untouched.
    pub fn restore(&mut self, snapshot: &DocumentSnapshot) {
        self.elements = snapshot.elements.clone();
        self.selected_element_id = snapshot.selected_element_id.clone();
    }

    /// Append an element, giving it `z_index = previous count + 1`.
    pub fn add_element(&mut self, mut element: Element) -> ElementId {
        element.z_index = self.elements.len() as u32 + 1;
        let id = element.id.clone();
        self.elements.push(element);
        id
    }

    /// Append an element on top of everything else (`z_index = max + 1`).
    pub fn push_on_top(&mut self, mut element: Element) -> ElementId {
        element.z_index = self.next_z_index();
        let id = element.id.clone();
        self.elements.push(element);
        id
    }

    /// Remove an element. Clears the selection if it pointed at it.
    pub fn remove_element(&mut self, id: &str) -> Option<Element> {
        let index = self.elements.iter().position(|e| e.id == id)?;
        if self.selected_element_id.as_deref() == Some(id) {
            self.selected_element_id = None;
        }
        Some(self.elements.remove(index))
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn element_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.element(id).is_some()
    }

    pub fn selected_element(&self) -> Option<&Element> {
        self.selected_element_id.as_deref().and_then(|id| self.element(id))
    }

    /// Select an element (or clear the selection). Unknown ids are ignored.
    pub fn select(&mut self, id: Option<&str>) {
        match id {
            Some(id) if self.contains(id) => self.selected_element_id = Some(id.to_string()),
            Some(_) => {}
            None => self.selected_element_id = None,
        }
    }

    /// One above the current topmost element.
    pub fn next_z_index(&self) -> u32 {
        self.elements.iter().map(|e| e.z_index).max().unwrap_or(0) + 1
    }

    /// Elements in paint order (back to front). Ties keep creation order.
    pub fn elements_by_z(&self) -> Vec<&Element> {
        let mut ordered: Vec<&Element> = self.elements.iter().collect();
        ordered.sort_by_key(|e| e.z_index);
        ordered
    }

    /// Bring an element to the front (topmost).
    pub fn bring_to_front(&mut self, id: &str) -> bool {
        let next = self.next_z_index();
        match self.element_mut(id) {
            Some(element) => {
                element.z_index = next;
                true
            }
            None => false,
        }
    }

    /// Send an element to the back, renumbering paint order from 1.
    pub fn send_to_back(&mut self, id: &str) -> bool {
        if !self.contains(id) {
            return false;
        }
        let mut order: Vec<ElementId> = self
            .elements_by_z()
            .into_iter()
            .filter(|e| e.id != id)
            .map(|e| e.id.clone())
            .collect();
        order.insert(0, id.to_string());

        for (rank, element_id) in order.iter().enumerate() {
            if let Some(element) = self.element_mut(element_id) {
                element.z_index = rank as u32 + 1;
            }
        }
        true
    }

    /// Get the bounding box of all elements.
    pub fn bounds(&self) -> Option<Rect> {
        self.elements
            .iter()
            .map(Element::bounds)
            .reduce(|acc, b| acc.union(b))
    }

    /// Find elements at a point, front to back.
    pub fn elements_at_point(&self, point: Point, tolerance: f64) -> Vec<ElementId> {
        self.elements_by_z()
            .into_iter()
            .rev()
            .filter(|e| e.hit_test(point, tolerance))
            .map(|e| e.id.clone())
            .collect()
    }

    /// Find elements whose bounds intersect a rectangle.
    pub fn elements_in_rect(&self, rect: Rect) -> Vec<ElementId> {
        self.elements
            .iter()
            .filter(|e| rect.intersect(e.bounds()).area() > 0.0)
            .map(|e| e.id.clone())
            .collect()
    }

    /// Replace all elements with fresh copies of a template's elements.
    pub fn apply_template(&mut self, template: &Template, now: DateTime<Utc>) {
        self.elements.clear();
        self.selected_element_id = None;
        let mut ordered: Vec<&Element> = template.elements.iter().collect();
        ordered.sort_by_key(|e| e.z_index);
        for element in ordered {
            let copy = element.duplicate(kurbo::Vec2::ZERO, now);
            self.add_element(copy);
        }
    }

    /// Set the zoom, clamped to the canvas range.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = clamp_zoom(zoom, MIN_ZOOM, MAX_ZOOM);
    }

    /// Switch the preview viewport, resizing the canvas width to match.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.canvas_width = viewport.canvas_width();
    }

    /// Check if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Get the number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Serialize the document to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a document from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
