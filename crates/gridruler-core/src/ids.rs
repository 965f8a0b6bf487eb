//! Plugin and item identifiers.

/// Prefix shared by every ruler item id.
pub const SHORT_ID_PREFIX: &str = "segmented-ruler";

/// Namespace for tool, mode and action ids.
pub const PLUGIN_NAMESPACE: &str = "com.measure-extension";

fn plugin_id(path: &str) -> String {
    format!("{}/{}", PLUGIN_NAMESPACE, path)
}

pub fn tool_id() -> String {
    plugin_id("tool")
}

pub fn drag_mode_id() -> String {
    plugin_id("dragMode")
}

pub fn private_drag_mode_id() -> String {
    plugin_id("privateDragMode")
}

pub fn clear_rulers_action_id() -> String {
    plugin_id("deleteAction")
}

/// Id of one ruler item owned by `player_id`.
pub fn item_id(name: &str, player_id: &str, local: bool) -> String {
    let id = format!("{}-{}-{}", SHORT_ID_PREFIX, name, player_id);
    if local { id + "-local" } else { id }
}

/// Whether an item id belongs to a ruler.
pub fn is_ruler_item_id(id: &str) -> bool {
    id.starts_with(SHORT_ID_PREFIX)
}

/// Ids of the primitives that make up one player's ruler.
///
/// The same ids are reused across drags so a new ruler replaces the old one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulerIds {
    pub halo: String,
    pub line: String,
    pub label: String,
    pub end_marker: String,
}

impl RulerIds {
    pub fn new(player_id: &str, local: bool) -> Self {
        Self {
            halo: item_id("background", player_id, local),
            line: item_id("line", player_id, local),
            label: item_id("label", player_id, local),
            end_marker: item_id("end-point", player_id, local),
        }
    }

    /// All ids, halo first.
    pub fn all(&self) -> [&str; 4] {
        [&self.halo, &self.line, &self.label, &self.end_marker]
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.all().iter().map(|id| id.to_string()).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.all().contains(&id)
    }
}
