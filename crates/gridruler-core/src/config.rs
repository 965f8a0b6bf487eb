//! Ruler settings.

use crate::error::MeasureResult;
use serde::Deserialize;

/// Brightest channel value (0-255) that still gets a halo behind the line.
pub const DEFAULT_HALO_THRESHOLD: u8 = 100;

/// Key codes bound to ruler actions while a drag is in progress.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub add_segment: String,
    pub remove_segment: String,
    pub commit: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            add_segment: "KeyZ".to_string(),
            remove_segment: "KeyX".to_string(),
            commit: "Enter".to_string(),
        }
    }
}

/// User-tunable settings. Every field is optional in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RulerSettings {
    pub keys: KeyBindings,
    /// Prepended to the distance label of private rulers.
    pub private_label_prefix: String,
    pub halo_threshold: u8,
}

impl Default for RulerSettings {
    fn default() -> Self {
        Self {
            keys: KeyBindings::default(),
            private_label_prefix: "Private\n".to_string(),
            halo_threshold: DEFAULT_HALO_THRESHOLD,
        }
    }
}

impl RulerSettings {
    /// Parse settings from JSON, filling in defaults for missing fields.
    pub fn from_json(json: &str) -> MeasureResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MeasureError;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = RulerSettings::from_json(r#"{ "keys": { "commit": "Space" } }"#).unwrap();
        assert_eq!(settings.keys.commit, "Space");
        assert_eq!(settings.keys.add_segment, "KeyZ");
        assert_eq!(settings.halo_threshold, DEFAULT_HALO_THRESHOLD);
    }

    #[test]
    fn test_empty_json() {
        assert_eq!(RulerSettings::from_json("{}").unwrap(), RulerSettings::default());
    }

    #[test]
    fn test_invalid_json() {
        let result = RulerSettings::from_json("{ nope");
        assert!(matches!(result, Err(MeasureError::Settings(_))));
    }
}
