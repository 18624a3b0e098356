//! Page-builder editing session.
//!
//! `PageEditor` owns the document and everything around it: selection,
//! gesture state, undo history, clipboard and auto-save. Every operation that
//! changes elements pushes exactly one history entry; view changes (zoom,
//! viewport, toggles) and selection changes do not.

use crate::camera::Camera;
use crate::clipboard::{Clipboard, ClipboardError, CLIPBOARD_TTL_MS};
use crate::document::{CanvasState, DocumentSnapshot, Template, Viewport};
use crate::elements::{Constraints, Element, ElementContent, ElementId, ElementType, Props, Styles};
use crate::history::{DEFAULT_MAX_HISTORY, History};
use crate::input::Modifiers;
use crate::interaction::{GestureKind, GestureOutcome, InteractionMachine, MoveEffect};
use crate::persist::{self, PROJECT_KEY, PersistError, ProjectBlob};
use crate::selection::{ClickEffect, ResizeHandle, Selection, hit_test_handles};
use crate::settings::ProjectSettings;
use crate::shortcuts::{Action, ShortcutRegistry};
use crate::snap::snap_point;
use crate::storage::{AutoSaveManager, DEFAULT_AUTOSAVE_DEBOUNCE_MS, Duration, Instant, KeyValueStore, StorageError};
use crate::tools::ToolKind;
use chrono::Utc;
use kurbo::{Point, Size, Vec2};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type EditorResult<T> = Result<T, EditorError>;

/// Page editor configuration.
#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Maximum number of undo states.
    pub history_limit: usize,
    pub clipboard_ttl: chrono::Duration,
    /// Offset of a duplicated element from its source.
    pub duplicate_offset: f64,
    /// Arrow-key step.
    pub nudge_small: f64,
    /// Shift+arrow step.
    pub nudge_large: f64,
    pub autosave_debounce: Duration,
    pub storage_key: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_MAX_HISTORY,
            clipboard_ttl: chrono::Duration::milliseconds(CLIPBOARD_TTL_MS),
            duplicate_offset: 20.0,
            nudge_small: 1.0,
            nudge_large: 10.0,
            autosave_debounce: Duration::from_millis(DEFAULT_AUTOSAVE_DEBOUNCE_MS),
            storage_key: PROJECT_KEY.to_string(),
        }
    }
}

/// Partial update of an element. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ElementUpdate {
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub content: Option<ElementContent>,
    pub styles: Option<Styles>,
    pub props: Option<Props>,
    /// `Some(None)` removes the constraints.
    pub constraints: Option<Option<Constraints>>,
    pub name: Option<String>,
}

impl ElementUpdate {
    pub fn is_empty(&self) -> bool {
        self.position.is_none()
            && self.size.is_none()
            && self.content.is_none()
            && self.styles.is_none()
            && self.props.is_none()
            && self.constraints.is_none()
            && self.name.is_none()
    }

    fn apply(self, element: &mut Element) {
        if let Some(position) = self.position {
            element.x = position.x;
            element.y = position.y;
        }
        if let Some(size) = self.size {
            element.width = size.width;
            element.height = size.height;
        }
        if let Some(content) = self.content {
            element.content = content;
        }
        if let Some(styles) = self.styles {
            element.styles = styles;
        }
        if let Some(props) = self.props {
            element.props = props;
        }
        if let Some(constraints) = self.constraints {
            element.constraints = constraints;
        }
        if let Some(name) = self.name {
            element.metadata.name = name;
        }
    }
}

pub struct PageEditor<S: KeyValueStore> {
    state: CanvasState,
    settings: ProjectSettings,
    history: History<DocumentSnapshot>,
    selection: Selection,
    interaction: InteractionMachine,
    /// Scroll offset of the canvas container. Zoom lives in `state`.
    scroll: Vec2,
    tool: ToolKind,
    clipboard: Clipboard,
    autosave: AutoSaveManager<S>,
    config: EditorConfig,
}

impl<S: KeyValueStore> PageEditor<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self::with_config(storage, EditorConfig::default())
    }

    pub fn with_config(storage: Arc<S>, config: EditorConfig) -> Self {
        let state = CanvasState::new();
        let mut autosave = AutoSaveManager::new(storage, config.storage_key.clone());
        autosave.set_debounce(config.autosave_debounce);
        autosave.set_enabled(state.settings.auto_save);

        Self {
            history: History::with_limit(state.snapshot(), config.history_limit),
            state,
            settings: ProjectSettings::default(),
            selection: Selection::new(),
            interaction: InteractionMachine::new(),
            scroll: Vec2::ZERO,
            tool: ToolKind::default(),
            clipboard: Clipboard::with_ttl(config.clipboard_ttl),
            autosave,
            config,
        }
    }

    // --- Accessors ---

    pub fn state(&self) -> &CanvasState {
        &self.state
    }

    pub fn settings(&self) -> &ProjectSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: ProjectSettings) {
        self.settings = settings;
        self.autosave.mark_dirty();
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tool = tool;
    }

    pub fn gesture(&self) -> GestureKind {
        self.interaction.kind()
    }

    pub fn wants_global_pointer(&self) -> bool {
        self.interaction.wants_global_pointer()
    }

    pub fn camera(&self) -> Camera {
        Camera {
            scroll: self.scroll,
            zoom: self.state.zoom,
            ..Camera::default()
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn is_dirty(&self) -> bool {
        self.autosave.is_dirty()
    }

    pub fn storage(&self) -> &Arc<S> {
        self.autosave.storage()
    }

    // --- Bookkeeping ---

    fn sync_selection(&mut self) {
        self.state.selected_element_id = self.selection.primary().map(str::to_string);
    }

    /// Record the current document as a new history entry.
    fn commit(&mut self, what: &str) {
        self.sync_selection();
        self.history.push(self.state.snapshot());
        self.autosave.mark_dirty();
        log::debug!("{} (history {}/{})", what, self.history.index() + 1, self.history.len());
    }

    fn view_changed(&mut self) {
        self.autosave.mark_dirty();
    }

    fn selected_elements(&self) -> Vec<Element> {
        self.selection
            .ids()
            .iter()
            .filter_map(|id| self.state.element(id).cloned())
            .collect()
    }

    // --- Element operations ---

    /// Add an element with its type's default size at a canvas point.
    pub fn add_element(&mut self, element_type: ElementType, at: Point) -> ElementId {
        self.add_element_with_size(element_type, at, element_type.default_size())
    }

    /// Add an element with an explicit size. The new element is selected.
    pub fn add_element_with_size(&mut self, element_type: ElementType, at: Point, size: Size) -> ElementId {
        let at = snap_point(at, self.state.settings.snap_grid()).point;
        let element = Element::with_size(element_type, at, size, Utc::now());
        let id = self.state.add_element(element);
        self.selection.select(&id);
        self.commit("Add element");
        id
    }

    /// Apply a partial update. Returns false for unknown ids or empty updates.
    pub fn update_element(&mut self, id: &str, update: ElementUpdate) -> bool {
        if update.is_empty() {
            return false;
        }
        let Some(element) = self.state.element_mut(id) else {
            return false;
        };
        update.apply(element);
        element.touch(Utc::now());
        self.commit("Update element");
        true
    }

    pub fn delete_element(&mut self, id: &str) -> bool {
        if self.state.remove_element(id).is_none() {
            return false;
        }
        self.selection.remove(id);
        self.commit("Delete element");
        true
    }

    /// Delete every selected element as one undoable step.
    pub fn delete_selected(&mut self) -> usize {
        let ids = self.selection.ids().to_vec();
        let removed = ids.iter().filter(|id| self.state.remove_element(id).is_some()).count();
        self.selection.clear();
        if removed > 0 {
            self.commit("Delete selection");
        }
        removed
    }

    /// Copy an element next to itself, on top of everything, and select it.
    pub fn duplicate_element(&mut self, id: &str) -> Option<ElementId> {
        let offset = Vec2::new(self.config.duplicate_offset, self.config.duplicate_offset);
        let copy = self.state.element(id)?.duplicate(offset, Utc::now());
        let new_id = self.state.push_on_top(copy);
        self.selection.select(&new_id);
        self.commit("Duplicate element");
        Some(new_id)
    }

    /// Duplicate every selected element as one undoable step.
    pub fn duplicate_selected(&mut self) -> Vec<ElementId> {
        let offset = Vec2::new(self.config.duplicate_offset, self.config.duplicate_offset);
        let now = Utc::now();
        let copies: Vec<Element> = self
            .selected_elements()
            .iter()
            .map(|element| element.duplicate(offset, now))
            .collect();
        if copies.is_empty() {
            return Vec::new();
        }
        let ids: Vec<ElementId> = copies.into_iter().map(|copy| self.state.push_on_top(copy)).collect();
        self.selection.select_many(ids.iter().cloned());
        self.commit("Duplicate selection");
        ids
    }

    pub fn bring_to_front(&mut self, id: &str) -> bool {
        if !self.state.bring_to_front(id) {
            return false;
        }
        self.commit("Bring to front");
        true
    }

    pub fn send_to_back(&mut self, id: &str) -> bool {
        if !self.state.send_to_back(id) {
            return false;
        }
        self.commit("Send to back");
        true
    }

    /// Replace the page with a template's elements.
    pub fn apply_template(&mut self, template: &Template) {
        self.cancel_gesture();
        self.state.apply_template(template, Utc::now());
        self.selection.clear();
        self.commit("Apply template");
        log::info!("Applied template {:?}", template.name);
    }

    /// Move the selected elements by `delta`, clamped at the canvas origin.
    pub fn nudge_selected(&mut self, delta: Vec2) -> bool {
        let mut moved = false;
        for id in self.selection.ids().to_vec() {
            let Some(element) = self.state.element_mut(&id) else {
                continue;
            };
            if element.is_position_locked() {
                continue;
            }
            let x = (element.x + delta.x).max(0.0);
            let y = (element.y + delta.y).max(0.0);
            if x != element.x || y != element.y {
                element.x = x;
                element.y = y;
                moved = true;
            }
        }
        if moved {
            self.commit("Nudge");
        }
        moved
    }

    // --- Clipboard ---

    /// Copy the selection. Returns how many elements were copied.
    pub fn copy(&mut self) -> EditorResult<usize> {
        let elements = self.selected_elements();
        self.clipboard.copy(self.autosave.storage().as_ref(), &elements, Utc::now())?;
        Ok(elements.len())
    }

    pub fn cut(&mut self) -> EditorResult<usize> {
        let copied = self.copy()?;
        self.delete_selected();
        Ok(copied)
    }

    /// Paste copied elements on top of the page. The first one is selected.
    pub fn paste(&mut self) -> EditorResult<Vec<ElementId>> {
        let pasted = self.clipboard.paste(self.autosave.storage().as_ref(), Utc::now())?;
        let ids: Vec<ElementId> = pasted.into_iter().map(|element| self.state.push_on_top(element)).collect();
        if let Some(first) = ids.first() {
            self.selection.select(first);
        }
        self.commit("Paste");
        Ok(ids)
    }

    // --- Selection ---

    /// Select a single element. Unknown ids are ignored.
    pub fn select(&mut self, id: &str) -> bool {
        if !self.state.contains(id) {
            return false;
        }
        self.selection.select(id);
        self.sync_selection();
        true
    }

    pub fn toggle_selection(&mut self, id: &str) -> bool {
        if !self.state.contains(id) {
            return false;
        }
        self.selection.toggle(id);
        self.sync_selection();
        true
    }

    pub fn select_all(&mut self) {
        self.selection.select_many(self.state.elements.iter().map(|e| e.id().to_string()));
        self.sync_selection();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.sync_selection();
    }

    // --- History ---

    fn restore(&mut self, snapshot: DocumentSnapshot) {
        self.state.restore(&snapshot);
        self.selection.clear();
        if let Some(id) = &snapshot.selected_element_id {
            self.selection.select(id);
        }
        self.autosave.mark_dirty();
    }

    pub fn undo(&mut self) -> bool {
        self.cancel_gesture();
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    pub fn redo(&mut self) -> bool {
        self.cancel_gesture();
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    // --- View ---

    pub fn zoom_in(&mut self) {
        let mut camera = self.camera();
        camera.zoom_in();
        self.state.set_zoom(camera.zoom);
        self.view_changed();
    }

    pub fn zoom_out(&mut self) {
        let mut camera = self.camera();
        camera.zoom_out();
        self.state.set_zoom(camera.zoom);
        self.view_changed();
    }

    pub fn reset_zoom(&mut self) {
        self.state.set_zoom(1.0);
        self.view_changed();
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.state.set_zoom(zoom);
        self.view_changed();
    }

    pub fn set_scroll(&mut self, scroll: Vec2) {
        let mut camera = self.camera();
        camera.set_scroll(scroll);
        self.scroll = camera.scroll;
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.state.set_viewport(viewport);
        self.view_changed();
    }

    pub fn toggle_grid(&mut self) {
        self.state.settings.show_grid = !self.state.settings.show_grid;
        self.view_changed();
    }

    pub fn toggle_rulers(&mut self) {
        self.state.settings.show_rulers = !self.state.settings.show_rulers;
        self.view_changed();
    }

    pub fn toggle_guides(&mut self) {
        self.state.settings.show_guides = !self.state.settings.show_guides;
        self.view_changed();
    }

    pub fn toggle_snap(&mut self) {
        self.state.settings.snap_to_grid = !self.state.settings.snap_to_grid;
        self.view_changed();
    }

    pub fn set_auto_save(&mut self, enabled: bool) {
        self.state.settings.auto_save = enabled;
        self.autosave.set_enabled(enabled);
    }

    // --- Pointer input (viewport coordinates) ---

    /// Topmost element under a pointer position.
    pub fn element_at(&self, pointer: Point) -> Option<ElementId> {
        let point = self.camera().screen_to_canvas(pointer);
        self.state.elements_at_point(point, 0.0).into_iter().next()
    }

    /// Resize handle of the primary selected element under the pointer.
    pub fn handle_at(&self, pointer: Point) -> Option<(ElementId, ResizeHandle)> {
        let element = self.state.selected_element()?;
        let point = self.camera().screen_to_canvas(pointer);
        hit_test_handles(element.bounds(), point, self.state.zoom).map(|handle| (element.id().to_string(), handle))
    }

    /// Pointer-down on an element body.
    ///
    /// Shift or Ctrl/Cmd toggles membership without dragging. A plain press
    /// on a member of a multi-selection drags the whole group; any other
    /// plain press selects the element alone and drags it.
    pub fn pointer_down_on_element(&mut self, id: &str, modifiers: Modifiers, pointer: Point) -> Option<ClickEffect> {
        if !self.state.contains(id) {
            return None;
        }
        let effect = if modifiers.toggles_selection() {
            self.selection.toggle(id);
            ClickEffect::Toggled
        } else {
            self.selection.click(id, Modifiers::NONE)
        };
        self.sync_selection();

        if let ClickEffect::Drag(group) = &effect {
            let snap = self.state.settings.snap_grid();
            self.interaction.begin_drag(&self.state.elements, id, group, pointer, snap);
        }
        Some(effect)
    }

    /// Pointer-down on a resize handle.
    pub fn pointer_down_on_handle(&mut self, id: &str, handle: ResizeHandle, pointer: Point) -> bool {
        self.interaction.begin_resize(&self.state.elements, id, handle, pointer)
    }

    /// Pointer-down on empty canvas. Creation tools place an element, the
    /// hand tool starts panning, and the select tool clears the selection.
    pub fn pointer_down_on_canvas(&mut self, pointer: Point, modifiers: Modifiers) -> Option<ElementId> {
        if let Some(element_type) = self.tool.creates() {
            let at = self.camera().screen_to_canvas(pointer);
            let id = self.add_element(element_type, at);
            self.tool = ToolKind::Select;
            return Some(id);
        }
        if self.tool.pans() {
            self.interaction.begin_pan(self.scroll, pointer);
        } else if !modifiers.toggles_selection() {
            self.clear_selection();
        }
        None
    }

    /// Route a pointer-down by what is under it: a resize handle of the
    /// primary selection, then an element, then the canvas. Creation and
    /// hand tools always go to the canvas.
    pub fn pointer_down(&mut self, pointer: Point, modifiers: Modifiers) -> GestureKind {
        if self.tool != ToolKind::Select {
            self.pointer_down_on_canvas(pointer, modifiers);
            return self.gesture();
        }
        if let Some((id, handle)) = self.handle_at(pointer) {
            if self.pointer_down_on_handle(&id, handle, pointer) {
                return self.gesture();
            }
        }
        match self.element_at(pointer) {
            Some(id) => {
                self.pointer_down_on_element(&id, modifiers, pointer);
            }
            None => {
                self.pointer_down_on_canvas(pointer, modifiers);
            }
        }
        self.gesture()
    }

    pub fn pointer_move(&mut self, pointer: Point) -> MoveEffect {
        let effect = self.interaction.pointer_move(&mut self.state.elements, pointer, self.state.zoom);
        if let MoveEffect::Scroll(scroll) = effect {
            self.scroll = scroll;
        }
        effect
    }

    /// Finish the gesture. A move or resize that changed geometry becomes
    /// one history entry.
    pub fn pointer_up(&mut self) -> GestureOutcome {
        let outcome = self.interaction.pointer_up(&self.state.elements, None);
        match &outcome {
            GestureOutcome::Moved { ids, changed: true } => {
                let now = Utc::now();
                for id in ids {
                    if let Some(element) = self.state.element_mut(id) {
                        element.touch(now);
                    }
                }
                self.commit("Move");
            }
            GestureOutcome::Resized { id, changed: true } => {
                if let Some(element) = self.state.element_mut(id) {
                    element.touch(Utc::now());
                }
                self.commit("Resize");
            }
            GestureOutcome::Panned { scroll } => self.scroll = *scroll,
            _ => {}
        }
        outcome
    }

    /// Abort the active gesture, restoring geometry.
    pub fn cancel_gesture(&mut self) -> GestureOutcome {
        self.interaction.cancel(&mut self.state.elements)
    }

    // --- Keyboard ---

    /// Dispatch a key event through the shortcut table.
    ///
    /// Returns the action that ran, or `None` if the key is unbound.
    /// `Export` is returned for the host to perform.
    pub fn handle_key(&mut self, key: &str, modifiers: Modifiers) -> EditorResult<Option<Action>> {
        let Some(action) = ShortcutRegistry::lookup(key, modifiers) else {
            return Ok(None);
        };
        log::debug!("Shortcut {:?}", action);

        match action {
            Action::Save => self.save()?,
            Action::Export => {}
            Action::Undo => {
                self.undo();
            }
            Action::Redo => {
                self.redo();
            }
            Action::ZoomIn => self.zoom_in(),
            Action::ZoomOut => self.zoom_out(),
            Action::ZoomReset => self.reset_zoom(),
            Action::ToggleGrid => self.toggle_grid(),
            Action::ToggleRulers => self.toggle_rulers(),
            Action::SelectTool(tool) => self.set_tool(tool),
            Action::SelectAll => self.select_all(),
            Action::Copy => {
                self.copy()?;
            }
            Action::Cut => {
                self.cut()?;
            }
            Action::Paste => {
                self.paste()?;
            }
            Action::Duplicate => {
                self.duplicate_selected();
            }
            Action::Delete => {
                self.delete_selected();
            }
            Action::Deselect => {
                if self.interaction.is_idle() {
                    self.clear_selection();
                } else {
                    self.cancel_gesture();
                }
            }
            Action::SetViewport(viewport) => self.set_viewport(viewport),
            Action::Nudge { direction, large } => {
                let step = if large { self.config.nudge_large } else { self.config.nudge_small };
                self.nudge_selected(direction.unit() * step);
            }
        }
        Ok(Some(action))
    }

    // --- Persistence ---

    pub fn project_blob(&self) -> ProjectBlob {
        ProjectBlob::new(self.state.clone(), self.settings.clone(), Utc::now())
    }

    /// Save immediately.
    pub fn save(&mut self) -> EditorResult<()> {
        let blob = self.project_blob();
        self.autosave.save(&blob)?;
        log::info!("Project saved ({} elements)", self.state.len());
        Ok(())
    }

    /// Load the saved project. A missing or unreadable blob is logged and the
    /// current document is kept. Returns whether a project was loaded.
    pub fn load(&mut self) -> bool {
        match self.read_saved() {
            Ok(Some(blob)) => {
                self.interaction = InteractionMachine::new();
                self.state = blob.canvas_state;
                self.settings = blob.settings;
                self.selection.clear();
                if let Some(id) = self.state.selected_element_id.clone() {
                    self.selection.select(&id);
                }
                self.history.reset(self.state.snapshot());
                self.autosave.set_enabled(self.state.settings.auto_save);
                log::info!("Loaded project with {} elements", self.state.len());
                true
            }
            Ok(None) => false,
            Err(e) => {
                log::error!("Failed to load project, keeping current document: {}", e);
                false
            }
        }
    }

    fn read_saved(&self) -> EditorResult<Option<ProjectBlob>> {
        match self.autosave.load_raw()? {
            Some(raw) => Ok(Some(persist::decode_project(&raw, Utc::now())?)),
            None => Ok(None),
        }
    }

    /// Auto-save if changes have settled. Call periodically.
    pub fn tick(&mut self) -> EditorResult<bool> {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> EditorResult<bool> {
        if !self.autosave.should_save_at(now) {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }
}
