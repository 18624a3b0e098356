//! SiteCanvas Core Library
//!
//! Platform-agnostic document model, interaction and persistence logic for
//! the SiteCanvas page builder and its flowchart editor.

pub mod camera;
pub mod clipboard;
pub mod document;
pub mod editor;
pub mod elements;
pub mod flowchart;
pub mod history;
pub mod input;
pub mod interaction;
pub mod persist;
pub mod selection;
pub mod settings;
pub mod shortcuts;
pub mod snap;
pub mod storage;
pub mod tools;

pub use camera::Camera;
pub use clipboard::{Clipboard, ClipboardError};
pub use document::{CanvasSettings, CanvasState, DocumentSnapshot, Template, Viewport};
pub use editor::{EditorConfig, EditorError, EditorResult, ElementUpdate, PageEditor};
pub use elements::{Element, ElementContent, ElementId, ElementType};
pub use flowchart::{FlowchartEditor, FlowchartNode, FlowchartState, NodeType};
pub use history::History;
pub use input::Modifiers;
pub use interaction::{Draggable, GestureKind, GestureOutcome, InteractionMachine, MoveEffect};
pub use persist::{PersistError, ProjectBlob, SCHEMA_VERSION};
pub use selection::{ClickEffect, ResizeHandle, Selection};
pub use settings::ProjectSettings;
pub use shortcuts::{Action, ShortcutRegistry};
pub use snap::{GRID_SIZE, SnapResult, snap_point, snap_to_grid};
pub use storage::{KeyValueStore, MemoryStore, StorageError};
pub use tools::ToolKind;
