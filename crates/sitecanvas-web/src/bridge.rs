//! Conversions between JavaScript-friendly values and engine types.
//!
//! Everything here is plain Rust so it can be tested natively; the wasm
//! bindings only forward to these helpers.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sitecanvas_core::document::{CanvasSettings, Viewport};
use sitecanvas_core::elements::{Constraints, Element, ElementContent, Props, Styles};
use sitecanvas_core::flowchart::{Breadcrumb, FlowchartConnection, FlowchartNode, FlowchartSettings};
use sitecanvas_core::storage::KeyValueStore;
use kurbo::{Point, Size, Vec2};
use sitecanvas_core::{Action, EditorError, ElementUpdate, FlowchartEditor, GestureKind, Modifiers, PageEditor, ToolKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Unknown {kind}: {value:?}")]
    UnknownValue { kind: &'static str, value: String },
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Editor(#[from] EditorError),
}

pub type BridgeResult<T> = Result<T, BridgeError>;

pub fn modifiers(shift: bool, ctrl: bool, alt: bool, meta: bool) -> Modifiers {
    Modifiers { shift, ctrl, alt, meta }
}

/// Parse a serde-named enum value such as `"tablet"` or `"input-output"`.
pub fn parse_name<T: DeserializeOwned>(kind: &'static str, value: &str) -> BridgeResult<T> {
    serde_json::from_value(serde_json::Value::String(value.to_string())).map_err(|_| BridgeError::UnknownValue {
        kind,
        value: value.to_string(),
    })
}

/// Parse a JSON argument. An empty string means "use the default".
pub fn parse_json_or_default<T: DeserializeOwned + Default>(json: &str) -> BridgeResult<T> {
    if json.trim().is_empty() {
        return Ok(T::default());
    }
    Ok(serde_json::from_str(json)?)
}

/// Serialize for JavaScript. Failures are logged and become `null`.
pub fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        log::error!("Failed to serialize for JS: {}", e);
        "null".to_string()
    })
}

pub fn gesture_name(kind: GestureKind) -> &'static str {
    match kind {
        GestureKind::Idle => "idle",
        GestureKind::Dragging => "dragging",
        GestureKind::Resizing => "resizing",
        GestureKind::Panning => "panning",
        GestureKind::Connecting => "connecting",
    }
}

/// Stable name of a shortcut action for the host page.
pub fn action_name(action: &Action) -> String {
    match action {
        Action::Save => "save".into(),
        Action::Export => "export".into(),
        Action::Undo => "undo".into(),
        Action::Redo => "redo".into(),
        Action::ZoomIn => "zoom-in".into(),
        Action::ZoomOut => "zoom-out".into(),
        Action::ZoomReset => "zoom-reset".into(),
        Action::ToggleGrid => "toggle-grid".into(),
        Action::ToggleRulers => "toggle-rulers".into(),
        Action::SelectTool(tool) => format!("tool:{}", tool.name().to_lowercase()),
        Action::SelectAll => "select-all".into(),
        Action::Copy => "copy".into(),
        Action::Cut => "cut".into(),
        Action::Paste => "paste".into(),
        Action::Duplicate => "duplicate".into(),
        Action::Delete => "delete".into(),
        Action::Deselect => "deselect".into(),
        Action::SetViewport(viewport) => format!("viewport:{}", to_json(viewport).trim_matches('"')),
        Action::Nudge { .. } => "nudge".into(),
    }
}

/// Partial element update as sent by the property panel.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ElementPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub content: Option<ElementContent>,
    pub styles: Option<Styles>,
    pub props: Option<Props>,
    pub constraints: Option<Constraints>,
    /// Remove the constraints. Ignored when `constraints` is set.
    pub clear_constraints: bool,
    pub name: Option<String>,
}

impl ElementPatch {
    /// Resolve against the element's current geometry so a patch may set a
    /// single coordinate.
    pub fn into_update(self, current: &Element) -> ElementUpdate {
        let position = (self.x.is_some() || self.y.is_some())
            .then(|| Point::new(self.x.unwrap_or(current.x), self.y.unwrap_or(current.y)));
        let size = (self.width.is_some() || self.height.is_some()).then(|| {
            Size::new(
                self.width.unwrap_or(current.width),
                self.height.unwrap_or(current.height),
            )
        });
        let constraints = match (self.constraints, self.clear_constraints) {
            (Some(c), _) => Some(Some(c)),
            (None, true) => Some(None),
            (None, false) => None,
        };
        ElementUpdate {
            position,
            size,
            content: self.content,
            styles: self.styles,
            props: self.props,
            constraints,
            name: self.name,
        }
    }
}

/// What the page UI needs to draw after each call.
#[derive(Debug, Serialize)]
pub struct EditorView<'a> {
    /// Elements in paint order.
    pub elements: Vec<&'a Element>,
    pub selected_ids: &'a [String],
    pub primary_id: Option<&'a str>,
    pub zoom: f64,
    pub scroll: Vec2,
    pub viewport: Viewport,
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub settings: &'a CanvasSettings,
    pub tool: ToolKind,
    pub gesture: &'static str,
    pub can_undo: bool,
    pub can_redo: bool,
    pub dirty: bool,
}

impl<'a> EditorView<'a> {
    pub fn of<S: KeyValueStore>(editor: &'a PageEditor<S>) -> Self {
        let state = editor.state();
        Self {
            elements: state.elements_by_z(),
            selected_ids: editor.selection().ids(),
            primary_id: editor.selection().primary(),
            zoom: state.zoom,
            scroll: editor.camera().scroll,
            viewport: state.viewport,
            canvas_width: state.canvas_width,
            canvas_height: state.canvas_height,
            settings: &state.settings,
            tool: editor.tool(),
            gesture: gesture_name(editor.gesture()),
            can_undo: editor.can_undo(),
            can_redo: editor.can_redo(),
            dirty: editor.is_dirty(),
        }
    }
}

/// What the flowchart UI needs to draw after each call.
#[derive(Debug, Serialize)]
pub struct FlowchartView<'a> {
    pub nodes: &'a [FlowchartNode],
    pub connections: &'a [FlowchartConnection],
    pub selected_ids: &'a [String],
    pub selected_connection_id: Option<&'a str>,
    pub zoom: f64,
    pub scroll: Vec2,
    pub settings: &'a FlowchartSettings,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub gesture: &'static str,
    pub dirty: bool,
}

impl<'a> FlowchartView<'a> {
    pub fn of<S: KeyValueStore>(editor: &'a FlowchartEditor<S>) -> Self {
        let state = editor.state();
        Self {
            nodes: &state.nodes,
            connections: &state.connections,
            selected_ids: editor.selection().ids(),
            selected_connection_id: state.selected_connection_id.as_deref(),
            zoom: state.zoom,
            scroll: state.scroll,
            settings: &state.settings,
            breadcrumbs: editor.breadcrumbs(),
            gesture: gesture_name(editor.gesture()),
            dirty: editor.is_dirty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitecanvas_core::shortcuts::Direction;
    use sitecanvas_core::storage::MemoryStore;
    use sitecanvas_core::{ElementType, NodeType};
    use std::sync::Arc;

    #[test]
    fn test_parse_names() {
        let viewport: Viewport = parse_name("viewport", "tablet").unwrap();
        assert_eq!(viewport, Viewport::Tablet);
        let node: NodeType = parse_name("node type", "input-output").unwrap();
        assert_eq!(node, NodeType::InputOutput);
        let tool: ToolKind = parse_name("tool", "hand").unwrap();
        assert_eq!(tool, ToolKind::Hand);

        let err = parse_name::<Viewport>("viewport", "watch").unwrap_err();
        assert_eq!(err.to_string(), "Unknown viewport: \"watch\"");
    }

    #[test]
    fn test_action_names() {
        assert_eq!(action_name(&Action::Export), "export");
        assert_eq!(action_name(&Action::SelectTool(ToolKind::Rectangle)), "tool:rectangle");
        assert_eq!(action_name(&Action::SetViewport(Viewport::Mobile)), "viewport:mobile");
        assert_eq!(
            action_name(&Action::Nudge {
                direction: Direction::Left,
                large: true
            }),
            "nudge"
        );
    }

    #[test]
    fn test_patch_keeps_unset_coordinates() {
        let element = image_at(Point::new(10.0, 20.0));
        let patch: ElementPatch = serde_json::from_str(r#"{"x": 50, "height": 90}"#).unwrap();
        let update = patch.into_update(&element);

        assert_eq!(update.position, Some(Point::new(50.0, 20.0)));
        assert_eq!(update.size, Some(Size::new(element.width, 90.0)));
        assert_eq!(update.constraints, None);
        assert!(update.content.is_none());
    }

    #[test]
    fn test_patch_can_clear_constraints() {
        let element = image_at(Point::ZERO);
        let patch: ElementPatch = serde_json::from_str(r#"{"clear_constraints": true}"#).unwrap();
        assert_eq!(patch.into_update(&element).constraints, Some(None));
    }

    #[test]
    fn test_editor_view_json() {
        let mut editor = PageEditor::new(Arc::new(MemoryStore::new()));
        let id = editor.add_element(ElementType::Heading, Point::ZERO);

        let json: serde_json::Value = serde_json::from_str(&to_json(&EditorView::of(&editor))).unwrap();
        assert_eq!(json["elements"][0]["id"], id.as_str());
        assert_eq!(json["primary_id"], id.as_str());
        assert_eq!(json["viewport"], "desktop");
        assert_eq!(json["gesture"], "idle");
        assert_eq!(json["can_undo"], true);
    }

    #[test]
    fn test_flowchart_view_json() {
        let mut editor = FlowchartEditor::new(Arc::new(MemoryStore::new()));
        editor.add_node(NodeType::Start, Point::ZERO);

        let json: serde_json::Value = serde_json::from_str(&to_json(&FlowchartView::of(&editor))).unwrap();
        assert_eq!(json["nodes"][0]["type"], "start");
        assert_eq!(json["breadcrumbs"][0]["label"], "Main Flow");
    }

    fn image_at(at: Point) -> Element {
        let mut editor = PageEditor::new(Arc::new(MemoryStore::new()));
        let id = editor.add_element(ElementType::Image, at);
        editor.state().element(&id).cloned().unwrap()
    }
}
