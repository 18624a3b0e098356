//! Keyboard shortcut registry.
//!
//! Keys are `KeyboardEvent.key` names ("s", "Delete", "ArrowUp", ...). Ctrl
//! and Cmd are interchangeable; letters match case-insensitively.

use crate::document::Viewport;
use crate::input::Modifiers;
use crate::tools::ToolKind;
use kurbo::Vec2;

/// Arrow direction for nudging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit vector in canvas space (y grows downward).
    pub fn unit(self) -> Vec2 {
        match self {
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::Down => Vec2::new(0.0, 1.0),
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::Right => Vec2::new(1.0, 0.0),
        }
    }
}

/// Something a shortcut triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Save,
    Export,
    Undo,
    Redo,
    ZoomIn,
    ZoomOut,
    ZoomReset,
    ToggleGrid,
    ToggleRulers,
    SelectTool(ToolKind),
    SelectAll,
    Copy,
    Cut,
    Paste,
    Duplicate,
    Delete,
    Deselect,
    SetViewport(Viewport),
    /// Move the selection by the small (1px) or large (10px) step.
    Nudge { direction: Direction, large: bool },
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub action: Action,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(key: &'static str, ctrl: bool, shift: bool, action: Action, description: &'static str) -> Self {
        Self {
            key,
            ctrl,
            shift,
            action,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Shift+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl".to_string());
        }
        if self.shift {
            parts.push("Shift".to_string());
        }
        parts.push(if self.key.len() == 1 {
            self.key.to_ascii_uppercase()
        } else {
            self.key.to_string()
        });
        parts.join("+")
    }

    /// Whether a key event triggers this shortcut.
    pub fn matches(&self, key: &str, modifiers: Modifiers) -> bool {
        self.key.eq_ignore_ascii_case(key) && self.ctrl == modifiers.command() && self.shift == modifiers.shift
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        use Action::*;
        use Direction::*;

        vec![
            Shortcut::new("s", true, false, Save, "Save project"),
            Shortcut::new("e", true, false, Export, "Export to HTML"),
            Shortcut::new("z", true, false, Undo, "Undo"),
            Shortcut::new("z", true, true, Redo, "Redo"),
            Shortcut::new("y", true, false, Redo, "Redo"),
            Shortcut::new("=", true, false, ZoomIn, "Zoom in"),
            Shortcut::new("+", true, false, ZoomIn, "Zoom in"),
            Shortcut::new("+", true, true, ZoomIn, "Zoom in"),
            Shortcut::new("-", true, false, ZoomOut, "Zoom out"),
            Shortcut::new("0", true, false, ZoomReset, "Reset zoom"),
            Shortcut::new("g", true, false, ToggleGrid, "Toggle grid"),
            Shortcut::new("r", true, false, ToggleRulers, "Toggle rulers"),
            Shortcut::new("v", false, false, SelectTool(ToolKind::Select), "Select tool"),
            Shortcut::new("h", false, false, SelectTool(ToolKind::Hand), "Hand tool"),
            Shortcut::new("t", false, false, SelectTool(ToolKind::Text), "Text tool"),
            Shortcut::new("r", false, false, SelectTool(ToolKind::Rectangle), "Rectangle tool"),
            Shortcut::new("a", true, false, SelectAll, "Select all elements"),
            Shortcut::new("c", true, false, Copy, "Copy elements"),
            Shortcut::new("x", true, false, Cut, "Cut elements"),
            Shortcut::new("v", true, false, Paste, "Paste elements"),
            Shortcut::new("d", true, false, Duplicate, "Duplicate selection"),
            Shortcut::new("Delete", false, false, Delete, "Delete selection"),
            Shortcut::new("Backspace", false, false, Delete, "Delete selection"),
            Shortcut::new("Escape", false, false, Deselect, "Clear selection / cancel"),
            Shortcut::new("1", true, false, SetViewport(Viewport::Desktop), "Desktop viewport"),
            Shortcut::new("2", true, false, SetViewport(Viewport::Tablet), "Tablet viewport"),
            Shortcut::new("3", true, false, SetViewport(Viewport::Mobile), "Mobile viewport"),
            Shortcut::new("ArrowUp", false, false, Nudge { direction: Up, large: false }, "Nudge up"),
            Shortcut::new("ArrowDown", false, false, Nudge { direction: Down, large: false }, "Nudge down"),
            Shortcut::new("ArrowLeft", false, false, Nudge { direction: Left, large: false }, "Nudge left"),
            Shortcut::new("ArrowRight", false, false, Nudge { direction: Right, large: false }, "Nudge right"),
            Shortcut::new("ArrowUp", false, true, Nudge { direction: Up, large: true }, "Nudge up 10px"),
            Shortcut::new("ArrowDown", false, true, Nudge { direction: Down, large: true }, "Nudge down 10px"),
            Shortcut::new("ArrowLeft", false, true, Nudge { direction: Left, large: true }, "Nudge left 10px"),
            Shortcut::new("ArrowRight", false, true, Nudge { direction: Right, large: true }, "Nudge right 10px"),
        ]
    }

    /// Find the action bound to a key event.
    pub fn lookup(key: &str, modifiers: Modifiers) -> Option<Action> {
        Self::all()
            .into_iter()
            .find(|shortcut| shortcut.matches(key, modifiers))
            .map(|shortcut| shortcut.action)
    }

    /// Log all shortcuts at info level.
    pub fn log_all() {
        for shortcut in Self::all() {
            log::info!("  {:20} {}", shortcut.format(), shortcut.description);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ctrl_and_meta_are_equivalent() {
        let meta = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert_eq!(ShortcutRegistry::lookup("z", Modifiers::CTRL), Some(Action::Undo));
        assert_eq!(ShortcutRegistry::lookup("z", meta), Some(Action::Undo));
    }

    #[test]
    fn test_letters_are_case_insensitive() {
        assert_eq!(ShortcutRegistry::lookup("Z", Modifiers::CTRL_SHIFT), Some(Action::Redo));
        assert_eq!(ShortcutRegistry::lookup("S", Modifiers::CTRL), Some(Action::Save));
        assert_eq!(ShortcutRegistry::lookup("V", Modifiers::NONE), Some(Action::SelectTool(ToolKind::Select)));
    }

    #[test]
    fn test_same_key_different_modifiers() {
        assert_eq!(ShortcutRegistry::lookup("r", Modifiers::CTRL), Some(Action::ToggleRulers));
        assert_eq!(ShortcutRegistry::lookup("r", Modifiers::NONE), Some(Action::SelectTool(ToolKind::Rectangle)));
        assert_eq!(ShortcutRegistry::lookup("v", Modifiers::CTRL), Some(Action::Paste));
    }

    #[test]
    fn test_redo_bindings() {
        assert_eq!(ShortcutRegistry::lookup("y", Modifiers::CTRL), Some(Action::Redo));
        assert_eq!(ShortcutRegistry::lookup("z", Modifiers::CTRL_SHIFT), Some(Action::Redo));
    }

    #[test]
    fn test_nudge_step_follows_shift() {
        assert_eq!(
            ShortcutRegistry::lookup("ArrowLeft", Modifiers::SHIFT),
            Some(Action::Nudge { direction: Direction::Left, large: true })
        );
        assert_eq!(
            ShortcutRegistry::lookup("ArrowLeft", Modifiers::NONE),
            Some(Action::Nudge { direction: Direction::Left, large: false })
        );
    }

    #[test]
    fn test_viewport_and_zoom() {
        assert_eq!(ShortcutRegistry::lookup("2", Modifiers::CTRL), Some(Action::SetViewport(Viewport::Tablet)));
        assert_eq!(ShortcutRegistry::lookup("=", Modifiers::CTRL), Some(Action::ZoomIn));
        assert_eq!(ShortcutRegistry::lookup("0", Modifiers::CTRL), Some(Action::ZoomReset));
    }

    #[test]
    fn test_unbound_key() {
        assert_eq!(ShortcutRegistry::lookup("q", Modifiers::CTRL), None);
        assert_eq!(ShortcutRegistry::lookup("Delete", Modifiers::CTRL), None);
    }

    #[test]
    fn test_format() {
        let redo = Shortcut::new("z", true, true, Action::Redo, "Redo");
        assert_eq!(redo.format(), "Ctrl+Shift+Z");
        let delete = Shortcut::new("Delete", false, false, Action::Delete, "Delete");
        assert_eq!(delete.format(), "Delete");
    }
}
