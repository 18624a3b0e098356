//! Entering and leaving nested sub-flowcharts.
//!
//! Entering a subprocess node saves the whole current level on a stack and
//! shows the node's sub-flowchart. Leaving writes the edited nodes and
//! connections back into that node and restores the saved level.

use super::{FlowchartConnection, FlowchartNode, FlowchartState, SubFlowchart};
use kurbo::Vec2;
use serde::{Deserialize, Serialize};

/// Label of the top-level flowchart in breadcrumbs.
pub const ROOT_BREADCRUMB: &str = "Main Flow";

/// One enclosing level, saved while a sub-flowchart is open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedView {
    pub nodes: Vec<FlowchartNode>,
    pub connections: Vec<FlowchartConnection>,
    pub selected_node_id: Option<String>,
    pub selected_connection_id: Option<String>,
    pub zoom: f64,
    pub scroll: Vec2,
}

/// A navigation breadcrumb. `node_id` is `None` for the top level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub node_id: Option<String>,
    pub label: String,
}

impl FlowchartState {
    fn take_view(&mut self) -> SavedView {
        SavedView {
            nodes: std::mem::take(&mut self.nodes),
            connections: std::mem::take(&mut self.connections),
            selected_node_id: self.selected_node_id.take(),
            selected_connection_id: self.selected_connection_id.take(),
            zoom: self.zoom,
            scroll: self.scroll,
        }
    }

    fn restore_view(&mut self, view: SavedView) {
        self.nodes = view.nodes;
        self.connections = view.connections;
        self.selected_node_id = view.selected_node_id;
        self.selected_connection_id = view.selected_connection_id;
        self.zoom = view.zoom;
        self.scroll = view.scroll;
    }

    /// How many levels deep the current view is.
    pub fn depth(&self) -> usize {
        self.current_path.len()
    }

    pub fn is_nested(&self) -> bool {
        !self.current_path.is_empty()
    }

    /// Open the sub-flowchart of a subprocess node, creating an empty one
    /// on first entry. Returns false if the node is missing or cannot nest.
    pub fn enter_sub_flowchart(&mut self, node_id: &str) -> bool {
        let Some(node) = self.node_mut(node_id) else {
            return false;
        };
        if !node.can_nest() {
            return false;
        }

        let label = node.label.clone();
        let sub = node.sub_flowchart.get_or_insert_with(|| SubFlowchart::new(label));
        let nodes = sub.nodes.clone();
        let connections = sub.connections.clone();

        let parent = self.take_view();
        self.parents.push(parent);
        self.current_path.push(node_id.to_string());

        self.nodes = nodes;
        self.connections = connections;
        self.zoom = 1.0;
        self.scroll = Vec2::ZERO;
        log::debug!("Entered sub-flowchart of {} (depth {})", node_id, self.depth());
        true
    }

    /// Return to the enclosing level, storing the current level into the
    /// subprocess node it belongs to. Returns false at the top level.
    pub fn exit_sub_flowchart(&mut self) -> bool {
        let (Some(parent), Some(node_id)) = (self.parents.pop(), self.current_path.pop()) else {
            return false;
        };

        let nodes = std::mem::take(&mut self.nodes);
        let connections = std::mem::take(&mut self.connections);
        self.restore_view(parent);

        match self.node_mut(&node_id) {
            Some(node) => {
                let label = node.label.clone();
                let sub = node.sub_flowchart.get_or_insert_with(|| SubFlowchart::new(label));
                sub.nodes = nodes;
                sub.connections = connections;
            }
            None => log::warn!("Subprocess node {} vanished; dropping its contents", node_id),
        }
        log::debug!("Exited to depth {}", self.depth());
        true
    }

    /// Leave every open sub-flowchart, writing each level back.
    pub fn exit_to_root(&mut self) {
        while self.exit_sub_flowchart() {}
    }

    /// Root followed by each entered node's label.
    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        let mut crumbs = vec![Breadcrumb {
            node_id: None,
            label: ROOT_BREADCRUMB.to_string(),
        }];
        for (level, node_id) in self.parents.iter().zip(&self.current_path) {
            let label = level
                .nodes
                .iter()
                .find(|n| &n.id == node_id)
                .map(|n| n.label.clone())
                .unwrap_or_else(|| node_id.clone());
            crumbs.push(Breadcrumb {
                node_id: Some(node_id.clone()),
                label,
            });
        }
        crumbs
    }

    /// A copy of the document with every open level folded back in, as it
    /// would look at the top level.
    pub fn to_root(&self) -> FlowchartState {
        let mut root = self.clone();
        root.exit_to_root();
        root
    }
}

#[cfg(test)]
mod tests {
    use super::super::NodeType;
    use super::*;
    use kurbo::Point;

    #[test]
    fn test_enter_creates_empty_sub_flowchart() {
        let mut chart = FlowchartState::new();
        let sub = chart.add_node(FlowchartNode::new(NodeType::Subprocess, Point::ZERO));
        chart.add_node(FlowchartNode::new(NodeType::Start, Point::new(0.0, 200.0)));
        chart.selected_node_id = Some(sub.clone());

        assert!(chart.enter_sub_flowchart(&sub));
        assert!(chart.nodes.is_empty());
        assert_eq!(chart.selected_node_id, None);
        assert_eq!(chart.current_path, vec![sub.clone()]);
        assert!(chart.parents[0].nodes[0].sub_flowchart.is_some());
    }

    #[test]
    fn test_enter_exit_round_trips_into_parent_node() {
        let mut chart = FlowchartState::new();
        let sub = chart.add_node(FlowchartNode::new(NodeType::Subprocess, Point::ZERO));
        chart.zoom = 2.0;

        chart.enter_sub_flowchart(&sub);
        let a = chart.add_node(FlowchartNode::new(NodeType::Start, Point::ZERO));
        let b = chart.add_node(FlowchartNode::new(NodeType::End, Point::new(0.0, 200.0)));
        chart.connect(&a, &b).unwrap();

        assert!(chart.exit_sub_flowchart());
        assert_eq!(chart.zoom, 2.0);
        assert_eq!(chart.nodes.len(), 1);
        let inner = chart.node(&sub).and_then(|n| n.sub_flowchart.as_ref()).unwrap();
        assert_eq!(inner.nodes.len(), 2);
        assert_eq!(inner.connections.len(), 1);

        // second entry shows the saved contents
        chart.enter_sub_flowchart(&sub);
        assert_eq!(chart.nodes.len(), 2);
    }

    #[test]
    fn test_only_subprocess_nodes_nest() {
        let mut chart = FlowchartState::new();
        let process = chart.add_node(FlowchartNode::new(NodeType::Process, Point::ZERO));
        assert!(!chart.enter_sub_flowchart(&process));
        assert!(!chart.enter_sub_flowchart("missing"));
        assert!(!chart.exit_sub_flowchart());
    }

    #[test]
    fn test_breadcrumbs_and_nested_exit() {
        let mut chart = FlowchartState::new();
        let outer = chart.add_node(FlowchartNode::new(NodeType::Subprocess, Point::ZERO));
        chart.node_mut(&outer).unwrap().label = "Checkout".to_string();
        chart.enter_sub_flowchart(&outer);

        let inner = chart.add_node(FlowchartNode::new(NodeType::Subprocess, Point::ZERO));
        chart.node_mut(&inner).unwrap().label = "Payment".to_string();
        chart.enter_sub_flowchart(&inner);
        chart.add_node(FlowchartNode::new(NodeType::Process, Point::ZERO));

        let labels: Vec<String> = chart.breadcrumbs().into_iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!["Main Flow", "Checkout", "Payment"]);

        let root = chart.to_root();
        assert!(!root.is_nested());
        let checkout = root.node(&outer).and_then(|n| n.sub_flowchart.as_ref()).unwrap();
        let payment = checkout.nodes[0].sub_flowchart.as_ref().unwrap();
        assert_eq!(payment.nodes.len(), 1);

        // the live state is untouched
        assert_eq!(chart.depth(), 2);
    }
}
