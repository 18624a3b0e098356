//! Flowchart editing session.
//!
//! Flowchart mutations are committed live; there is no undo history here.

use super::{Breadcrumb, FlowchartNode, FlowchartState, NodeType};
use crate::camera::Camera;
use crate::input::Modifiers;
use crate::interaction::{GestureKind, GestureOutcome, InteractionMachine, MoveEffect};
use crate::persist::{self, FLOWCHART_KEY, FlowchartBlob, PersistResult};
use crate::selection::{ClickEffect, ResizeHandle, Selection, hit_test_handles};
use crate::snap::snap_point;
use crate::storage::{AutoSaveManager, Duration, Instant, KeyValueStore, StorageResult};
use chrono::Utc;
use kurbo::{Point, Size};
use std::sync::Arc;

/// Smallest size a node can be resized to.
pub const FLOWCHART_MIN_SIZE: Size = Size::new(60.0, 40.0);

/// Flowchart editor configuration.
#[derive(Debug, Clone)]
pub struct FlowchartConfig {
    pub storage_key: String,
    pub autosave_debounce: Duration,
}

impl Default for FlowchartConfig {
    fn default() -> Self {
        Self {
            storage_key: FLOWCHART_KEY.to_string(),
            autosave_debounce: Duration::from_millis(crate::storage::DEFAULT_AUTOSAVE_DEBOUNCE_MS),
        }
    }
}

pub struct FlowchartEditor<S: KeyValueStore> {
    state: FlowchartState,
    selection: Selection,
    interaction: InteractionMachine,
    autosave: AutoSaveManager<S>,
}

impl<S: KeyValueStore> FlowchartEditor<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self::with_config(storage, FlowchartConfig::default())
    }

    pub fn with_config(storage: Arc<S>, config: FlowchartConfig) -> Self {
        let mut autosave = AutoSaveManager::new(storage, config.storage_key);
        autosave.set_debounce(config.autosave_debounce);
        Self {
            state: FlowchartState::new(),
            selection: Selection::new(),
            interaction: InteractionMachine::new(),
            autosave,
        }
    }

    pub fn state(&self) -> &FlowchartState {
        &self.state
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn gesture(&self) -> GestureKind {
        self.interaction.kind()
    }

    pub fn wants_global_pointer(&self) -> bool {
        self.interaction.wants_global_pointer()
    }

    pub fn camera(&self) -> Camera {
        Camera {
            scroll: self.state.scroll,
            zoom: self.state.zoom,
            ..Camera::default()
        }
    }

    fn set_camera(&mut self, camera: Camera) {
        self.state.zoom = camera.zoom;
        self.state.scroll = camera.scroll;
        self.changed();
    }

    fn changed(&mut self) {
        self.autosave.mark_dirty();
    }

    fn sync_selection(&mut self) {
        self.state.selected_node_id = self.selection.primary().map(str::to_string);
    }

    // --- Nodes and connections ---

    /// Add a node at a canvas point and select it.
    pub fn add_node(&mut self, node_type: NodeType, at: Point) -> String {
        let at = snap_point(at, self.state.settings.snap_grid()).point;
        let id = self.state.add_node(FlowchartNode::new(node_type, at));
        self.selection.select(&id);
        self.state.selected_connection_id = None;
        self.sync_selection();
        self.changed();
        log::debug!("Added {:?} node {}", node_type, id);
        id
    }

    pub fn update_label(&mut self, id: &str, label: &str) -> bool {
        let Some(node) = self.state.node_mut(id) else {
            return false;
        };
        node.label = label.to_string();
        self.changed();
        true
    }

    /// Delete a node and its connections.
    pub fn delete_node(&mut self, id: &str) -> bool {
        if self.state.delete_node(id).is_none() {
            return false;
        }
        self.selection.remove(id);
        self.sync_selection();
        self.changed();
        true
    }

    /// Delete the selected nodes, or the selected connection if no node is
    /// selected. Returns how many items were removed.
    pub fn delete_selected(&mut self) -> usize {
        let ids = self.selection.ids().to_vec();
        if ids.is_empty() {
            let Some(conn) = self.state.selected_connection_id.clone() else {
                return 0;
            };
            return usize::from(self.delete_connection(&conn));
        }
        let removed = ids.iter().filter(|id| self.state.delete_node(id).is_some()).count();
        self.selection.clear();
        self.sync_selection();
        if removed > 0 {
            self.changed();
        }
        removed
    }

    pub fn connect(&mut self, from: &str, to: &str) -> Option<String> {
        let id = self.state.connect(from, to)?;
        self.changed();
        Some(id)
    }

    pub fn delete_connection(&mut self, id: &str) -> bool {
        if self.state.delete_connection(id).is_none() {
            return false;
        }
        self.changed();
        true
    }

    /// Select a connection, clearing node selection.
    pub fn select_connection(&mut self, id: &str) -> bool {
        if self.state.connection(id).is_none() {
            return false;
        }
        self.selection.clear();
        self.sync_selection();
        self.state.selected_connection_id = Some(id.to_string());
        true
    }

    pub fn select_all(&mut self) {
        self.selection.select_many(self.state.nodes.iter().map(|n| n.id.clone()));
        self.sync_selection();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.state.selected_connection_id = None;
        self.sync_selection();
    }

    // --- Pointer input (viewport coordinates) ---

    /// Pointer-down on a node body.
    ///
    /// Ctrl/Cmd toggles membership. A plain press on a member of a
    /// multi-selection drags the group; otherwise the node alone is selected
    /// and dragged.
    pub fn click_node(&mut self, id: &str, modifiers: Modifiers, pointer: Point) -> Option<ClickEffect> {
        self.state.node(id)?;
        let effect = self.selection.click(id, modifiers);
        self.state.selected_connection_id = None;
        self.sync_selection();

        if let ClickEffect::Drag(group) = &effect {
            let snap = self.state.settings.snap_grid();
            self.interaction.begin_drag(&self.state.nodes, id, group, pointer, snap);
        }
        Some(effect)
    }

    /// Pointer-down on a node's resize handle.
    pub fn click_handle(&mut self, id: &str, handle: ResizeHandle, pointer: Point) -> bool {
        self.interaction.begin_resize(&self.state.nodes, id, handle, pointer)
    }

    /// Pointer-down on a node's connection port.
    pub fn start_connect(&mut self, from: &str, pointer: Point) -> bool {
        self.interaction.begin_connect(&self.state.nodes, from, pointer)
    }

    /// Pointer-down on empty canvas: clear the selection and start panning.
    pub fn click_canvas(&mut self, pointer: Point) {
        self.clear_selection();
        self.interaction.begin_pan(self.state.scroll, pointer);
    }

    /// Route a pointer-down: a resize handle of the selected node, then a
    /// node, then the canvas.
    pub fn pointer_down(&mut self, pointer: Point, modifiers: Modifiers) -> GestureKind {
        let point = self.camera().screen_to_canvas(pointer);
        let handle = self
            .state
            .selected_node_id
            .as_deref()
            .and_then(|id| self.state.node(id))
            .and_then(|node| hit_test_handles(node.bounds(), point, self.state.zoom).map(|h| (node.id.clone(), h)));
        if let Some((id, handle)) = handle {
            if self.click_handle(&id, handle, pointer) {
                return self.gesture();
            }
        }
        match self.state.node_at(point).map(|n| n.id.clone()) {
            Some(id) => {
                self.click_node(&id, modifiers, pointer);
            }
            None => self.click_canvas(pointer),
        }
        self.gesture()
    }

    pub fn pointer_move(&mut self, pointer: Point) -> MoveEffect {
        let effect = self.interaction.pointer_move(&mut self.state.nodes, pointer, self.state.zoom);
        if let MoveEffect::Scroll(scroll) = effect {
            self.state.scroll = scroll;
        }
        effect
    }

    /// Finish the gesture. The node under `pointer` is the connection target.
    pub fn pointer_up(&mut self, pointer: Point) -> GestureOutcome {
        let target = self
            .state
            .node_at(self.camera().screen_to_canvas(pointer))
            .map(|n| n.id.clone());
        let outcome = self.interaction.pointer_up(&self.state.nodes, target.as_deref());

        match &outcome {
            GestureOutcome::Connect { from, to } => {
                self.connect(from, to);
            }
            GestureOutcome::Panned { scroll } => {
                self.state.scroll = *scroll;
                self.changed();
            }
            outcome if outcome.changed_geometry() => self.changed(),
            _ => {}
        }
        outcome
    }

    /// Abort the active gesture (Escape).
    pub fn cancel_gesture(&mut self) -> GestureOutcome {
        self.interaction.cancel(&mut self.state.nodes)
    }

    // --- View ---

    pub fn zoom_in(&mut self) {
        let mut camera = self.camera();
        camera.zoom_in();
        self.set_camera(camera);
    }

    pub fn zoom_out(&mut self) {
        let mut camera = self.camera();
        camera.zoom_out();
        self.set_camera(camera);
    }

    pub fn reset_zoom(&mut self) {
        self.state.zoom = 1.0;
        self.changed();
    }

    /// Zoom and scroll so every node fits in `viewport`.
    pub fn fit_to_view(&mut self, viewport: Size) {
        let Some(bounds) = self.state.bounds() else {
            self.reset_zoom();
            return;
        };
        let mut camera = self.camera();
        camera.fit_to_bounds(bounds, viewport);
        self.set_camera(camera);
    }

    pub fn toggle_grid(&mut self) {
        self.state.settings.show_grid = !self.state.settings.show_grid;
        self.changed();
    }

    pub fn toggle_snap(&mut self) {
        self.state.settings.snap_to_grid = !self.state.settings.snap_to_grid;
        self.changed();
    }

    // --- Navigation ---

    pub fn enter_sub_flowchart(&mut self, node_id: &str) -> bool {
        if !self.interaction.is_idle() {
            self.cancel_gesture();
        }
        if !self.state.enter_sub_flowchart(node_id) {
            return false;
        }
        self.selection.clear();
        self.changed();
        true
    }

    pub fn exit_sub_flowchart(&mut self) -> bool {
        if !self.interaction.is_idle() {
            self.cancel_gesture();
        }
        if !self.state.exit_sub_flowchart() {
            return false;
        }
        self.selection.clear();
        if let Some(id) = self.state.selected_node_id.clone() {
            self.selection.select(&id);
        }
        self.changed();
        true
    }

    /// Leave sub-flowcharts until `depth` levels remain open.
    pub fn navigate_to(&mut self, depth: usize) {
        while self.state.depth() > depth && self.exit_sub_flowchart() {}
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        self.state.breadcrumbs()
    }

    // --- Persistence ---

    fn blob(&self) -> FlowchartBlob {
        FlowchartBlob::new(self.state.to_root(), Utc::now())
    }

    /// Save immediately.
    pub fn save(&mut self) -> StorageResult<()> {
        let blob = self.blob();
        self.autosave.save(&blob)
    }

    /// Load the saved flowchart. A missing or unreadable blob is logged and
    /// the current state is kept. Returns whether a flowchart was loaded.
    pub fn load(&mut self) -> bool {
        match self.read_saved() {
            Ok(Some(blob)) => {
                self.state = blob.flowchart;
                self.selection.clear();
                self.sync_selection();
                self.interaction = InteractionMachine::new();
                self.autosave.set_enabled(self.state.settings.auto_save);
                log::info!("Loaded flowchart with {} nodes", self.state.nodes.len());
                true
            }
            Ok(None) => false,
            Err(e) => {
                log::error!("Failed to load flowchart, keeping current state: {}", e);
                false
            }
        }
    }

    fn read_saved(&self) -> PersistResult<Option<FlowchartBlob>> {
        match self.autosave.load_raw()? {
            Some(raw) => persist::decode_flowchart(&raw, Utc::now()).map(Some),
            None => Ok(None),
        }
    }

    pub fn set_auto_save(&mut self, enabled: bool) {
        self.state.settings.auto_save = enabled;
        self.autosave.set_enabled(enabled);
    }

    pub fn is_dirty(&self) -> bool {
        self.autosave.is_dirty()
    }

    /// Auto-save if changes have settled. Call periodically.
    pub fn tick(&mut self) -> StorageResult<bool> {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> StorageResult<bool> {
        if !self.autosave.should_save_at(now) {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }
}
