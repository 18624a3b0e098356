//! Selection model and resize handles.

use crate::input::Modifiers;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Handle size in screen pixels.
pub const HANDLE_SIZE: f64 = 8.0;
/// Handle hit tolerance in screen pixels.
pub const HANDLE_HIT_TOLERANCE: f64 = 6.0;

/// One of the eight resize handles around a selected item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::NW,
        ResizeHandle::N,
        ResizeHandle::NE,
        ResizeHandle::E,
        ResizeHandle::SE,
        ResizeHandle::S,
        ResizeHandle::SW,
        ResizeHandle::W,
    ];

    /// Moves the top edge.
    pub fn north(self) -> bool {
        matches!(self, Self::N | Self::NE | Self::NW)
    }

    /// Moves the bottom edge.
    pub fn south(self) -> bool {
        matches!(self, Self::S | Self::SE | Self::SW)
    }

    /// Moves the right edge.
    pub fn east(self) -> bool {
        matches!(self, Self::E | Self::NE | Self::SE)
    }

    /// Moves the left edge.
    pub fn west(self) -> bool {
        matches!(self, Self::W | Self::NW | Self::SW)
    }

    /// Changes the width.
    pub fn is_horizontal(self) -> bool {
        self.east() || self.west()
    }

    /// Changes the height.
    pub fn is_vertical(self) -> bool {
        self.north() || self.south()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::N => "n",
            Self::S => "s",
            Self::E => "e",
            Self::W => "w",
            Self::NE => "ne",
            Self::NW => "nw",
            Self::SE => "se",
            Self::SW => "sw",
        }
    }

    /// Where this handle sits on a bounding box.
    pub fn position_on(self, bounds: Rect) -> Point {
        let center = bounds.center();
        let x = if self.west() {
            bounds.x0
        } else if self.east() {
            bounds.x1
        } else {
            center.x
        };
        let y = if self.north() {
            bounds.y0
        } else if self.south() {
            bounds.y1
        } else {
            center.y
        };
        Point::new(x, y)
    }
}

impl fmt::Display for ResizeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown handle name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown resize handle: {0}")]
pub struct UnknownHandle(pub String);

impl FromStr for ResizeHandle {
    type Err = UnknownHandle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResizeHandle::ALL
            .into_iter()
            .find(|h| h.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownHandle(s.to_string()))
    }
}

/// A selection handle with its position and type.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    /// Position in canvas coordinates.
    pub position: Point,
    pub kind: ResizeHandle,
}

impl Handle {
    pub fn new(position: Point, kind: ResizeHandle) -> Self {
        Self { position, kind }
    }

    /// Check if a canvas point hits this handle (square hit box).
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        (point.x - self.position.x).abs() <= tolerance && (point.y - self.position.y).abs() <= tolerance
    }
}

/// The eight resize handles of a bounding box.
pub fn get_handles(bounds: Rect) -> Vec<Handle> {
    ResizeHandle::ALL
        .into_iter()
        .map(|kind| Handle::new(kind.position_on(bounds), kind))
        .collect()
}

/// Find which handle (if any) is hit at a canvas point.
///
/// `zoom` scales the screen-space tolerance into canvas space. The nearest
/// handle wins; corners win ties.
pub fn hit_test_handles(bounds: Rect, point: Point, zoom: f64) -> Option<ResizeHandle> {
    let tolerance = HANDLE_HIT_TOLERANCE / zoom.max(f64::EPSILON);
    let rank = |h: &Handle| if h.kind.is_horizontal() && h.kind.is_vertical() { 0 } else { 1 };
    get_handles(bounds)
        .into_iter()
        .filter(|h| h.hit_test(point, tolerance))
        .min_by(|a, b| {
            let da = a.position.distance(point);
            let db = b.position.distance(point);
            da.total_cmp(&db).then(rank(a).cmp(&rank(b)))
        })
        .map(|h| h.kind)
}

/// What a click on an item should do after updating the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickEffect {
    /// Membership toggled; no drag starts.
    Toggled,
    /// Start dragging the given items (the clicked one included).
    Drag(Vec<String>),
}

/// Ordered selection set with a primary item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    members: Vec<String>,
    primary: Option<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently selected item.
    pub fn primary(&self) -> Option<&str> {
        self.primary.as_deref()
    }

    pub fn ids(&self) -> &[String] {
        &self.members
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.iter().any(|m| m == id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Collapse the selection to a single item.
    pub fn select(&mut self, id: &str) {
        self.members.clear();
        self.members.push(id.to_string());
        self.primary = Some(id.to_string());
    }

    /// Replace the selection with several items; the first becomes primary.
    pub fn select_many<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.clear();
        for id in ids {
            let id = id.into();
            if !self.contains(&id) {
                self.members.push(id);
            }
        }
        self.primary = self.members.first().cloned();
    }

    /// Add or remove an item without touching the rest.
    pub fn toggle(&mut self, id: &str) {
        if let Some(pos) = self.members.iter().position(|m| m == id) {
            self.members.remove(pos);
            if self.primary.as_deref() == Some(id) {
                self.primary = self.members.last().cloned();
            }
        } else {
            self.members.push(id.to_string());
            self.primary = Some(id.to_string());
        }
    }

    /// Drop an item (e.g. after deletion).
    pub fn remove(&mut self, id: &str) {
        self.members.retain(|m| m != id);
        if self.primary.as_deref() == Some(id) {
            self.primary = self.members.last().cloned();
        }
    }

    /// Keep only items the predicate accepts.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.members.retain(|m| keep(m));
        if self.primary.as_deref().is_some_and(|p| !self.members.iter().any(|m| m == p)) {
            self.primary = self.members.last().cloned();
        }
    }

    pub fn clear(&mut self) {
        self.members.clear();
        self.primary = None;
    }

    /// Apply the click rules for an item.
    ///
    /// Ctrl/Cmd toggles membership and starts nothing. A plain click on a
    /// member of a multi-selection keeps the group and drags all of it. Any
    /// other plain click collapses the selection to the clicked item.
    pub fn click(&mut self, id: &str, modifiers: Modifiers) -> ClickEffect {
        if modifiers.command() {
            self.toggle(id);
            return ClickEffect::Toggled;
        }
        if self.len() > 1 && self.contains(id) {
            self.primary = Some(id.to_string());
            return ClickEffect::Drag(self.members.clone());
        }
        self.select(id);
        ClickEffect::Drag(vec![id.to_string()])
    }
}
