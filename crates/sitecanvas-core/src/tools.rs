//! Canvas tools.

use crate::elements::ElementType;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// Click to select, drag to move.
    #[default]
    Select,
    /// Drag to pan the canvas.
    Hand,
    /// Click to place a text block.
    Text,
    /// Click to place a rectangle shape.
    Rectangle,
}

impl ToolKind {
    pub const ALL: [ToolKind; 4] = [ToolKind::Select, ToolKind::Hand, ToolKind::Text, ToolKind::Rectangle];

    /// Element placed when clicking on empty canvas with this tool.
    pub fn creates(self) -> Option<ElementType> {
        match self {
            ToolKind::Select | ToolKind::Hand => None,
            ToolKind::Text => Some(ElementType::Paragraph),
            ToolKind::Rectangle => Some(ElementType::Shape),
        }
    }

    /// Whether dragging on empty canvas pans instead of doing nothing.
    pub fn pans(self) -> bool {
        self == ToolKind::Hand
    }

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Select => "Select",
            ToolKind::Hand => "Hand",
            ToolKind::Text => "Text",
            ToolKind::Rectangle => "Rectangle",
        }
    }
}
