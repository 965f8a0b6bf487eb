//! The local player, as reported by the host.

use crate::items::SerializableColor;
use peniko::color::{ColorSpaceTag, parse_color};
use serde::{Deserialize, Serialize};

/// Player role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Gm,
    #[default]
    Player,
}

/// The player that owns the rulers drawn by this extension instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    /// CSS color string, e.g. `"#ff4d4d"` or `"rgb(10, 20, 30)"`.
    pub color: String,
    #[serde(default)]
    pub role: Role,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            id: String::new(),
            color: "#ffffff".to_string(),
            role: Role::Player,
        }
    }
}

impl Player {
    pub fn new(id: impl Into<String>, color: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            color: color.into(),
            role,
        }
    }

    pub fn is_gm(&self) -> bool {
        self.role == Role::Gm
    }

    /// The player color as RGB, if the host gave an sRGB color.
    ///
    /// Colors in other spaces (`hsl(...)`, `lab(...)`) yield `None`.
    pub fn rgb(&self) -> Option<SerializableColor> {
        let parsed = parse_color(&self.color).ok()?;
        if parsed.cs != ColorSpaceTag::Srgb {
            return None;
        }
        let color: peniko::Color = parsed.to_alpha_color();
        Some(color.into())
    }

    /// Stroke color for ruler primitives; falls back to white.
    pub fn stroke_color(&self) -> SerializableColor {
        self.rgb().unwrap_or_else(SerializableColor::white)
    }
}
