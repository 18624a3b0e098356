//! WebAssembly entry point and JS-facing editor handles.

use crate::bridge::{
    BridgeError, BridgeResult, EditorView, ElementPatch, FlowchartView, action_name, gesture_name, modifiers,
    parse_json_or_default, parse_name, to_json,
};
use kurbo::{Point, Size, Vec2};
use sitecanvas_core::storage::{LocalStorage, create_default_store};
use sitecanvas_core::{ElementType, FlowchartEditor, NodeType, PageEditor, ProjectSettings, Template, ToolKind};
use sitecanvas_export::{ExportOptions, export_project};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // A second init (page reload in the same worker) is harmless.
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Starting SiteCanvas (WASM)");
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

fn js_result<T>(result: BridgeResult<T>) -> Result<T, JsValue> {
    result.map_err(js_error)
}

/// Page editor bound to `localStorage`.
#[wasm_bindgen]
pub struct WebEditor {
    inner: PageEditor<LocalStorage>,
}

#[wasm_bindgen]
impl WebEditor {
    /// Open the editor and restore the saved project, if any.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WebEditor, JsValue> {
        let store = create_default_store().map_err(js_error)?;
        let mut inner = PageEditor::new(store);
        if inner.load() {
            log::info!("Restored {} elements", inner.state().len());
        }
        Ok(WebEditor { inner })
    }

    /// Snapshot of everything the UI renders, as JSON.
    pub fn view(&self) -> String {
        to_json(&EditorView::of(&self.inner))
    }

    /// The full document, as JSON.
    pub fn state_json(&self) -> String {
        to_json(self.inner.state())
    }

    pub fn add_element(&mut self, element_type: &str, x: f64, y: f64) -> Result<String, JsValue> {
        let element_type: ElementType = element_type.parse().map_err(js_error)?;
        Ok(self.inner.add_element(element_type, Point::new(x, y)))
    }

    pub fn add_element_with_size(
        &mut self,
        element_type: &str,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<String, JsValue> {
        let element_type: ElementType = element_type.parse().map_err(js_error)?;
        Ok(self
            .inner
            .add_element_with_size(element_type, Point::new(x, y), Size::new(width, height)))
    }

    /// Apply a partial update (`{"x": 10, "styles": {...}}`) to an element.
    pub fn update_element(&mut self, id: &str, patch_json: &str) -> Result<bool, JsValue> {
        let patch: ElementPatch = js_result(serde_json::from_str(patch_json).map_err(BridgeError::from))?;
        let Some(current) = self.inner.state().element(id) else {
            return Ok(false);
        };
        let update = patch.into_update(current);
        Ok(self.inner.update_element(id, update))
    }

    pub fn delete_element(&mut self, id: &str) -> bool {
        self.inner.delete_element(id)
    }

    pub fn delete_selected(&mut self) -> usize {
        self.inner.delete_selected()
    }

    pub fn duplicate_element(&mut self, id: &str) -> Option<String> {
        self.inner.duplicate_element(id)
    }

    /// Ids of the copies, as a JSON array.
    pub fn duplicate_selected(&mut self) -> String {
        to_json(&self.inner.duplicate_selected())
    }

    pub fn bring_to_front(&mut self, id: &str) -> bool {
        self.inner.bring_to_front(id)
    }

    pub fn send_to_back(&mut self, id: &str) -> bool {
        self.inner.send_to_back(id)
    }

    pub fn apply_template(&mut self, template_json: &str) -> Result<(), JsValue> {
        let template: Template = js_result(serde_json::from_str(template_json).map_err(BridgeError::from))?;
        self.inner.apply_template(&template);
        Ok(())
    }

    pub fn set_settings(&mut self, settings_json: &str) -> Result<(), JsValue> {
        let settings: ProjectSettings = js_result(parse_json_or_default(settings_json))?;
        self.inner.set_settings(settings);
        Ok(())
    }

    pub fn copy(&mut self) -> Result<usize, JsValue> {
        js_result(self.inner.copy().map_err(BridgeError::from))
    }

    pub fn cut(&mut self) -> Result<usize, JsValue> {
        js_result(self.inner.cut().map_err(BridgeError::from))
    }

    /// Ids of the pasted elements, as a JSON array.
    pub fn paste(&mut self) -> Result<String, JsValue> {
        let ids = js_result(self.inner.paste().map_err(BridgeError::from))?;
        Ok(to_json(&ids))
    }

    pub fn select(&mut self, id: &str) -> bool {
        self.inner.select(id)
    }

    pub fn toggle_selection(&mut self, id: &str) -> bool {
        self.inner.toggle_selection(id)
    }

    pub fn select_all(&mut self) {
        self.inner.select_all();
    }

    pub fn clear_selection(&mut self) {
        self.inner.clear_selection();
    }

    pub fn undo(&mut self) -> bool {
        self.inner.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.inner.redo()
    }

    pub fn set_tool(&mut self, tool: &str) -> Result<(), JsValue> {
        let tool: ToolKind = js_result(parse_name("tool", tool))?;
        self.inner.set_tool(tool);
        Ok(())
    }

    pub fn set_viewport(&mut self, viewport: &str) -> Result<(), JsValue> {
        let viewport = js_result(parse_name("viewport", viewport))?;
        self.inner.set_viewport(viewport);
        Ok(())
    }

    pub fn zoom_in(&mut self) {
        self.inner.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.inner.zoom_out();
    }

    pub fn reset_zoom(&mut self) {
        self.inner.reset_zoom();
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.inner.set_zoom(zoom);
    }

    pub fn set_scroll(&mut self, x: f64, y: f64) {
        self.inner.set_scroll(Vec2::new(x, y));
    }

    pub fn toggle_grid(&mut self) {
        self.inner.toggle_grid();
    }

    pub fn toggle_rulers(&mut self) {
        self.inner.toggle_rulers();
    }

    pub fn toggle_guides(&mut self) {
        self.inner.toggle_guides();
    }

    pub fn toggle_snap(&mut self) {
        self.inner.toggle_snap();
    }

    pub fn set_auto_save(&mut self, enabled: bool) {
        self.inner.set_auto_save(enabled);
    }

    /// Route a pointer press and return the gesture it started.
    pub fn pointer_down(&mut self, x: f64, y: f64, shift: bool, ctrl: bool, alt: bool, meta: bool) -> String {
        let kind = self
            .inner
            .pointer_down(Point::new(x, y), modifiers(shift, ctrl, alt, meta));
        gesture_name(kind).to_string()
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.inner.pointer_move(Point::new(x, y));
    }

    pub fn pointer_up(&mut self) {
        self.inner.pointer_up();
    }

    pub fn cancel_gesture(&mut self) {
        self.inner.cancel_gesture();
    }

    /// Whether pointer listeners should be attached to the whole window.
    pub fn wants_global_pointer(&self) -> bool {
        self.inner.wants_global_pointer()
    }

    /// Handle a key press. Returns the name of an action the host must
    /// perform itself (such as `"export"`), or `undefined`.
    pub fn handle_key(&mut self, key: &str, shift: bool, ctrl: bool, alt: bool, meta: bool) -> Result<Option<String>, JsValue> {
        let action = js_result(
            self.inner
                .handle_key(key, modifiers(shift, ctrl, alt, meta))
                .map_err(BridgeError::from),
        )?;
        Ok(action.as_ref().map(action_name))
    }

    /// Render the page as HTML. `options_json` may be empty for defaults.
    pub fn export_html(&self, options_json: &str) -> Result<String, JsValue> {
        let options: ExportOptions = js_result(parse_json_or_default(options_json))?;
        Ok(export_project(self.inner.state(), self.inner.settings(), &options))
    }

    pub fn save(&mut self) -> Result<(), JsValue> {
        js_result(self.inner.save().map_err(BridgeError::from))
    }

    pub fn load(&mut self) -> bool {
        self.inner.load()
    }

    /// Drive autosave. Call from a timer; returns whether a save happened.
    pub fn tick(&mut self) -> Result<bool, JsValue> {
        js_result(self.inner.tick().map_err(BridgeError::from))
    }

    pub fn is_dirty(&self) -> bool {
        self.inner.is_dirty()
    }
}

/// Flowchart editor bound to `localStorage`.
#[wasm_bindgen]
pub struct WebFlowchart {
    inner: FlowchartEditor<LocalStorage>,
}

#[wasm_bindgen]
impl WebFlowchart {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WebFlowchart, JsValue> {
        let store = create_default_store().map_err(js_error)?;
        let mut inner = FlowchartEditor::new(store);
        if inner.load() {
            log::info!("Restored flowchart with {} nodes", inner.state().nodes.len());
        }
        Ok(WebFlowchart { inner })
    }

    pub fn view(&self) -> String {
        to_json(&FlowchartView::of(&self.inner))
    }

    pub fn add_node(&mut self, node_type: &str, x: f64, y: f64) -> Result<String, JsValue> {
        let node_type: NodeType = js_result(parse_name("node type", node_type))?;
        Ok(self.inner.add_node(node_type, Point::new(x, y)))
    }

    pub fn update_label(&mut self, id: &str, label: &str) -> bool {
        self.inner.update_label(id, label)
    }

    pub fn delete_node(&mut self, id: &str) -> bool {
        self.inner.delete_node(id)
    }

    pub fn delete_selected(&mut self) -> usize {
        self.inner.delete_selected()
    }

    pub fn connect(&mut self, from: &str, to: &str) -> Option<String> {
        self.inner.connect(from, to)
    }

    pub fn delete_connection(&mut self, id: &str) -> bool {
        self.inner.delete_connection(id)
    }

    pub fn select_connection(&mut self, id: &str) -> bool {
        self.inner.select_connection(id)
    }

    pub fn select_all(&mut self) {
        self.inner.select_all();
    }

    pub fn clear_selection(&mut self) {
        self.inner.clear_selection();
    }

    /// Begin dragging a connection out of a node's port.
    pub fn start_connect(&mut self, from: &str, x: f64, y: f64) -> bool {
        self.inner.start_connect(from, Point::new(x, y))
    }

    pub fn pointer_down(&mut self, x: f64, y: f64, shift: bool, ctrl: bool, alt: bool, meta: bool) -> String {
        let kind = self
            .inner
            .pointer_down(Point::new(x, y), modifiers(shift, ctrl, alt, meta));
        gesture_name(kind).to_string()
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.inner.pointer_move(Point::new(x, y));
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) {
        self.inner.pointer_up(Point::new(x, y));
    }

    pub fn cancel_gesture(&mut self) {
        self.inner.cancel_gesture();
    }

    pub fn wants_global_pointer(&self) -> bool {
        self.inner.wants_global_pointer()
    }

    pub fn zoom_in(&mut self) {
        self.inner.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.inner.zoom_out();
    }

    pub fn reset_zoom(&mut self) {
        self.inner.reset_zoom();
    }

    pub fn fit_to_view(&mut self, width: f64, height: f64) {
        self.inner.fit_to_view(Size::new(width, height));
    }

    pub fn toggle_grid(&mut self) {
        self.inner.toggle_grid();
    }

    pub fn toggle_snap(&mut self) {
        self.inner.toggle_snap();
    }

    pub fn enter_sub_flowchart(&mut self, node_id: &str) -> bool {
        self.inner.enter_sub_flowchart(node_id)
    }

    pub fn exit_sub_flowchart(&mut self) -> bool {
        self.inner.exit_sub_flowchart()
    }

    pub fn navigate_to(&mut self, depth: usize) {
        self.inner.navigate_to(depth);
    }

    pub fn save(&mut self) -> Result<(), JsValue> {
        self.inner.save().map_err(js_error)
    }

    pub fn load(&mut self) -> bool {
        self.inner.load()
    }

    pub fn set_auto_save(&mut self, enabled: bool) {
        self.inner.set_auto_save(enabled);
    }

    pub fn tick(&mut self) -> Result<bool, JsValue> {
        self.inner.tick().map_err(js_error)
    }

    pub fn is_dirty(&self) -> bool {
        self.inner.is_dirty()
    }
}
