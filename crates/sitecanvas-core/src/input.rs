//! Input modifier state shared by pointer and keyboard handling.

use serde::{Deserialize, Serialize};

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };

    pub const CTRL_SHIFT: Modifiers = Modifiers {
        ctrl: true,
        shift: true,
        ..Modifiers::NONE
    };

    /// Ctrl on Linux/Windows, Cmd on macOS. Either one counts.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }

    /// Whether the click should toggle selection membership.
    pub fn toggles_selection(&self) -> bool {
        self.command() || self.shift
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_counts_as_command() {
        let mods = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert!(mods.command());
        assert!(mods.toggles_selection());
    }

    #[test]
    fn test_plain_click_does_not_toggle() {
        assert!(!Modifiers::NONE.toggles_selection());
        assert!(!Modifiers::NONE.command());
    }
}
