//! Editing tool selection.
//!
//! The tool is a mode selector for *new* pointer input, not a property of
//! existing overlays: switching away from brush or eraser leaves the
//! drawing layer untouched, and the text tool only gates the creation of
//! the next overlay.

use serde::{Deserialize, Serialize};

/// The active editing mode for the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tool {
    #[default]
    None,
    Brush,
    Eraser,
    Text,
    Crop,
}

/// One step of a pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// Tracks the current tool and the one before it.
///
/// The previous tool exists for the text flow: selecting `Text` opens an
/// input prompt in the embedding UI, and once the overlay is placed the
/// tool reverts to whatever was active before.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToolState {
    current: Tool,
    previous: Tool,
}

impl ToolState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Tool {
        self.current
    }

    /// Switch to `tool`, remembering the one it replaces.
    pub fn select(&mut self, tool: Tool) {
        if tool != self.current {
            self.previous = self.current;
            self.current = tool;
        }
    }

    /// Revert to the tool that was active before the last switch.
    pub fn revert(&mut self) {
        self.current = self.previous;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_none() {
        assert_eq!(ToolState::new().current(), Tool::None);
    }

    #[test]
    fn test_select_switches() {
        let mut state = ToolState::new();
        state.select(Tool::Brush);
        assert_eq!(state.current(), Tool::Brush);
    }

    #[test]
    fn test_revert_after_text_restores_prior_tool() {
        let mut state = ToolState::new();
        state.select(Tool::Brush);
        state.select(Tool::Text);
        state.revert();
        assert_eq!(state.current(), Tool::Brush);
    }

    #[test]
    fn test_reselecting_same_tool_keeps_previous() {
        let mut state = ToolState::new();
        state.select(Tool::Eraser);
        state.select(Tool::Text);
        state.select(Tool::Text);
        state.revert();
        assert_eq!(state.current(), Tool::Eraser);
    }
}
