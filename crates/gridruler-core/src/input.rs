//! Pointer and keyboard events delivered by the host.

use crate::config::KeyBindings;
use crate::items::Item;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// A tool drag event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragEvent {
    /// Pointer position in canvas coordinates.
    pub pointer_position: Point,
    /// Item under the pointer when the drag started, if any.
    #[serde(default)]
    pub target: Option<Item>,
}

impl DragEvent {
    pub fn at(pointer_position: Point) -> Self {
        Self {
            pointer_position,
            target: None,
        }
    }

    pub fn on(pointer_position: Point, target: Item) -> Self {
        Self {
            pointer_position,
            target: Some(target),
        }
    }
}

/// Keyboard event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed(String),
    Released(String),
}

impl KeyEvent {
    pub fn pressed(code: impl Into<String>) -> Self {
        KeyEvent::Pressed(code.into())
    }
}

/// Ruler actions reachable from the keyboard during a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulerKey {
    AddSegment,
    RemoveSegment,
    Commit,
}

impl RulerKey {
    /// Map a key press to a ruler action. Releases never map.
    pub fn from_event(event: &KeyEvent, keys: &KeyBindings) -> Option<Self> {
        let KeyEvent::Pressed(code) = event else {
            return None;
        };
        if *code == keys.add_segment {
            Some(RulerKey::AddSegment)
        } else if *code == keys.remove_segment {
            Some(RulerKey::RemoveSegment)
        } else if *code == keys.commit {
            Some(RulerKey::Commit)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        let keys = KeyBindings::default();
        assert_eq!(
            RulerKey::from_event(&KeyEvent::pressed("KeyZ"), &keys),
            Some(RulerKey::AddSegment)
        );
        assert_eq!(
            RulerKey::from_event(&KeyEvent::pressed("KeyX"), &keys),
            Some(RulerKey::RemoveSegment)
        );
        assert_eq!(
            RulerKey::from_event(&KeyEvent::pressed("Enter"), &keys),
            Some(RulerKey::Commit)
        );
        assert_eq!(RulerKey::from_event(&KeyEvent::pressed("KeyQ"), &keys), None);
        assert_eq!(
            RulerKey::from_event(&KeyEvent::Released("KeyZ".into()), &keys),
            None
        );
    }
}
