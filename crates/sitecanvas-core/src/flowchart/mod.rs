//! Flowchart model: nodes, connections and nested sub-flowcharts.

mod editor;
mod navigation;

pub use editor::{FLOWCHART_MIN_SIZE, FlowchartConfig, FlowchartEditor};
pub use navigation::{Breadcrumb, ROOT_BREADCRUMB, SavedView};

use crate::camera::{MAX_ZOOM, MIN_ZOOM, clamp_zoom};
use crate::elements::new_element_id;
use crate::interaction::Draggable;
use crate::snap::GRID_SIZE;
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Kind of flowchart node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeType {
    Start,
    End,
    #[default]
    Process,
    Decision,
    InputOutput,
    Subprocess,
    Note,
}

impl NodeType {
    pub const ALL: [NodeType; 7] = [
        NodeType::Start,
        NodeType::End,
        NodeType::Process,
        NodeType::Decision,
        NodeType::InputOutput,
        NodeType::Subprocess,
        NodeType::Note,
    ];

    pub fn default_label(self) -> &'static str {
        match self {
            NodeType::Start => "Start",
            NodeType::End => "End",
            NodeType::Process => "Process",
            NodeType::Decision => "Decision?",
            NodeType::InputOutput => "Input/Output",
            NodeType::Subprocess => "Subprocess",
            NodeType::Note => "Note",
        }
    }

    pub fn default_size(self) -> Size {
        match self {
            NodeType::Start | NodeType::End => Size::new(120.0, 60.0),
            NodeType::Decision => Size::new(140.0, 100.0),
            NodeType::Subprocess => Size::new(160.0, 80.0),
            NodeType::Note => Size::new(150.0, 100.0),
            NodeType::Process | NodeType::InputOutput => Size::new(150.0, 80.0),
        }
    }

    pub fn default_styles(self) -> NodeStyles {
        let (background, text, radius) = match self {
            NodeType::Start => ("#10b981", "#ffffff", 30.0),
            NodeType::End => ("#ef4444", "#ffffff", 30.0),
            NodeType::Process => ("#3b82f6", "#ffffff", 8.0),
            NodeType::Decision => ("#f59e0b", "#ffffff", 0.0),
            NodeType::InputOutput => ("#8b5cf6", "#ffffff", 0.0),
            NodeType::Subprocess => ("#6366f1", "#ffffff", 8.0),
            NodeType::Note => ("#fef3c7", "#92400e", 4.0),
        };
        NodeStyles {
            background_color: background.to_string(),
            text_color: text.to_string(),
            border_radius: radius,
            ..NodeStyles::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeStyles {
    pub background_color: String,
    pub text_color: String,
    pub border_radius: f64,
    pub font_size: f64,
    pub font_weight: String,
}

impl Default for NodeStyles {
    fn default() -> Self {
        Self {
            background_color: "#3b82f6".to_string(),
            text_color: "#ffffff".to_string(),
            border_radius: 8.0,
            font_size: 14.0,
            font_weight: "500".to_string(),
        }
    }
}

/// A nested flowchart owned by a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubFlowchart {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<FlowchartNode>,
    #[serde(default)]
    pub connections: Vec<FlowchartConnection>,
}

impl SubFlowchart {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_element_id(),
            name: name.into(),
            nodes: Vec::new(),
            connections: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowchartNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub styles: NodeStyles,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_flowchart: Option<SubFlowchart>,
}

impl FlowchartNode {
    pub fn new(node_type: NodeType, position: Point) -> Self {
        let size = node_type.default_size();
        Self {
            id: new_element_id(),
            node_type,
            label: node_type.default_label().to_string(),
            x: position.x,
            y: position.y,
            width: size.width,
            height: size.height,
            styles: node_type.default_styles(),
            sub_flowchart: None,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    pub fn hit_test(&self, point: Point) -> bool {
        self.bounds().contains(point)
    }

    /// Whether double-clicking opens a nested flowchart.
    pub fn can_nest(&self) -> bool {
        self.node_type == NodeType::Subprocess
    }
}

impl Draggable for FlowchartNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    fn set_position(&mut self, position: Point) {
        self.x = position.x;
        self.y = position.y;
    }

    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    fn set_size(&mut self, size: Size) {
        self.width = size.width;
        self.height = size.height;
    }

    fn min_size(&self) -> Size {
        FLOWCHART_MIN_SIZE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionType {
    #[default]
    Straight,
    Curved,
    Step,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionStyles {
    pub stroke_color: String,
    pub stroke_width: f64,
    pub stroke_dasharray: Option<String>,
    pub arrow_size: f64,
}

impl Default for ConnectionStyles {
    fn default() -> Self {
        Self {
            stroke_color: "#64748b".to_string(),
            stroke_width: 2.0,
            stroke_dasharray: None,
            arrow_size: 8.0,
        }
    }
}

/// A directed edge between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowchartConnection {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(default, rename = "type")]
    pub connection_type: ConnectionType,
    #[serde(default)]
    pub styles: ConnectionStyles,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl FlowchartConnection {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            id: new_element_id(),
            from: from.into(),
            to: to.into(),
            connection_type: ConnectionType::default(),
            styles: ConnectionStyles::default(),
            label: None,
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.from == node_id || self.to == node_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowchartSettings {
    pub auto_save: bool,
    pub snap_to_grid: bool,
    pub grid_size: f64,
    pub show_grid: bool,
}

impl Default for FlowchartSettings {
    fn default() -> Self {
        Self {
            auto_save: true,
            snap_to_grid: true,
            grid_size: GRID_SIZE,
            show_grid: true,
        }
    }
}

impl FlowchartSettings {
    pub fn snap_grid(&self) -> Option<f64> {
        (self.snap_to_grid && self.grid_size > 0.0).then_some(self.grid_size)
    }
}

/// The whole flowchart document, including the navigation stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowchartState {
    /// Nodes of the level currently shown.
    pub nodes: Vec<FlowchartNode>,
    pub connections: Vec<FlowchartConnection>,
    pub selected_node_id: Option<String>,
    pub selected_connection_id: Option<String>,
    pub zoom: f64,
    pub scroll: Vec2,
    pub settings: FlowchartSettings,
    /// Ids of the subprocess nodes entered, outermost first.
    pub current_path: Vec<String>,
    /// Saved state of each enclosing level, outermost first.
    pub parents: Vec<SavedView>,
}

impl Default for FlowchartState {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            connections: Vec::new(),
            selected_node_id: None,
            selected_connection_id: None,
            zoom: 1.0,
            scroll: Vec2::ZERO,
            settings: FlowchartSettings::default(),
            current_path: Vec::new(),
            parents: Vec::new(),
        }
    }
}

impl FlowchartState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: &str) -> Option<&FlowchartNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut FlowchartNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn connection(&self, id: &str) -> Option<&FlowchartConnection> {
        self.connections.iter().find(|c| c.id == id)
    }

    pub fn add_node(&mut self, node: FlowchartNode) -> String {
        let id = node.id.clone();
        self.nodes.push(node);
        id
    }

    /// Remove a node and every connection touching it.
    ///
    /// Clears `selected_node_id` only if it pointed at this node, and the
    /// selected connection only if that connection was removed.
    pub fn delete_node(&mut self, id: &str) -> Option<FlowchartNode> {
        let index = self.nodes.iter().position(|n| n.id == id)?;
        let node = self.nodes.remove(index);

        self.connections.retain(|c| !c.touches(id));
        if self.selected_node_id.as_deref() == Some(id) {
            self.selected_node_id = None;
        }
        if let Some(selected) = self.selected_connection_id.as_deref() {
            if self.connection(selected).is_none() {
                self.selected_connection_id = None;
            }
        }
        Some(node)
    }

    /// Whether `from -> to` may be added: both nodes exist, they differ and
    /// the pair is not already connected in that direction.
    pub fn can_connect(&self, from: &str, to: &str) -> bool {
        from != to
            && self.node(from).is_some()
            && self.node(to).is_some()
            && !self.connections.iter().any(|c| c.from == from && c.to == to)
    }

    /// Connect two nodes. Returns the new connection id, or `None` if rejected.
    pub fn connect(&mut self, from: &str, to: &str) -> Option<String> {
        if !self.can_connect(from, to) {
            log::debug!("Rejected connection {} -> {}", from, to);
            return None;
        }
        let connection = FlowchartConnection::new(from, to);
        let id = connection.id.clone();
        self.connections.push(connection);
        Some(id)
    }

    pub fn delete_connection(&mut self, id: &str) -> Option<FlowchartConnection> {
        let index = self.connections.iter().position(|c| c.id == id)?;
        if self.selected_connection_id.as_deref() == Some(id) {
            self.selected_connection_id = None;
        }
        Some(self.connections.remove(index))
    }

    /// Topmost node under a canvas point (later nodes paint on top).
    pub fn node_at(&self, point: Point) -> Option<&FlowchartNode> {
        self.nodes.iter().rev().find(|n| n.hit_test(point))
    }

    /// Bounding box of all nodes on the current level.
    pub fn bounds(&self) -> Option<Rect> {
        self.nodes.iter().map(FlowchartNode::bounds).reduce(|acc, b| acc.union(b))
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = clamp_zoom(zoom, MIN_ZOOM, MAX_ZOOM);
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart_with(count: usize) -> (FlowchartState, Vec<String>) {
        let mut chart = FlowchartState::new();
        let ids = (0..count)
            .map(|i| chart.add_node(FlowchartNode::new(NodeType::Process, Point::new(200.0 * i as f64, 0.0))))
            .collect();
        (chart, ids)
    }

    #[test]
    fn test_node_defaults() {
        let node = FlowchartNode::new(NodeType::Decision, Point::new(10.0, 20.0));
        assert_eq!(node.label, "Decision?");
        assert_eq!(node.size(), Size::new(140.0, 100.0));
        assert_eq!(node.styles.background_color, "#f59e0b");
    }

    #[test]
    fn test_delete_node_cascades_connections() {
        let (mut chart, ids) = chart_with(3);
        chart.connect(&ids[0], &ids[1]).unwrap();
        chart.connect(&ids[1], &ids[2]).unwrap();
        let keep = chart.connect(&ids[0], &ids[2]).unwrap();

        chart.delete_node(&ids[1]);

        assert_eq!(chart.connections.len(), 1);
        assert_eq!(chart.connections[0].id, keep);
        assert!(chart.connections.iter().all(|c| chart.node(&c.from).is_some() && chart.node(&c.to).is_some()));
    }

    #[test]
    fn test_delete_node_clears_selection_only_if_equal() {
        let (mut chart, ids) = chart_with(2);
        chart.selected_node_id = Some(ids[0].clone());

        chart.delete_node(&ids[1]);
        assert_eq!(chart.selected_node_id.as_deref(), Some(ids[0].as_str()));

        chart.delete_node(&ids[0]);
        assert_eq!(chart.selected_node_id, None);
    }

    #[test]
    fn test_delete_node_clears_removed_connection_selection() {
        let (mut chart, ids) = chart_with(2);
        let conn = chart.connect(&ids[0], &ids[1]).unwrap();
        chart.selected_connection_id = Some(conn);

        chart.delete_node(&ids[0]);
        assert_eq!(chart.selected_connection_id, None);
    }

    #[test]
    fn test_connect_rejects_self_and_duplicates() {
        let (mut chart, ids) = chart_with(2);
        assert!(chart.connect(&ids[0], &ids[0]).is_none());
        assert!(chart.connect(&ids[0], "missing").is_none());
        assert!(chart.connect(&ids[0], &ids[1]).is_some());
        assert!(chart.connect(&ids[0], &ids[1]).is_none());
        // reverse direction is a different edge
        assert!(chart.connect(&ids[1], &ids[0]).is_some());
        assert_eq!(chart.connections.len(), 2);
    }

    #[test]
    fn test_node_at_prefers_topmost() {
        let mut chart = FlowchartState::new();
        let below = chart.add_node(FlowchartNode::new(NodeType::Process, Point::new(0.0, 0.0)));
        let above = chart.add_node(FlowchartNode::new(NodeType::Process, Point::new(50.0, 20.0)));

        assert_eq!(chart.node_at(Point::new(60.0, 30.0)).map(|n| n.id.as_str()), Some(above.as_str()));
        assert_eq!(chart.node_at(Point::new(10.0, 10.0)).map(|n| n.id.as_str()), Some(below.as_str()));
        assert!(chart.node_at(Point::new(500.0, 500.0)).is_none());
    }

    #[test]
    fn test_json_uses_type_tag() {
        let node = FlowchartNode::new(NodeType::InputOutput, Point::ZERO);
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["type"], "input-output");
        assert!(value.get("sub_flowchart").is_none());
    }
}
