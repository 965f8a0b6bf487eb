//! Ruler preview primitives.
//!
//! A ruler is a dashed line through the path, an optional light halo under
//! it, a distance label near the live end and an optional end marker.
//! The label and marker are attached to the line, and the line to its halo.

use crate::config::RulerSettings;
use crate::grid::GridConfig;
use crate::ids::RulerIds;
use crate::items::{Curve, Item, Label, SerializableColor, Shape};
use crate::player::Player;
use kurbo::Point;

const HALO_Z: i32 = 10000;
const END_MARKER_Z: i32 = 10001;
const LINE_Z: i32 = 10002;
const LABEL_Z: i32 = 10004;

/// Whether a line of `color` needs a light halo to stay legible.
///
/// Dark colors get one; bright colors and colors that could not be read as
/// RGB do not.
pub fn needs_halo(color: Option<SerializableColor>, threshold: u8) -> bool {
    match color {
        Some(color) => color.max_channel() <= threshold,
        None => false,
    }
}

/// Where the distance label sits relative to the live end.
pub fn label_position(end: Point, cell_size: f64) -> Point {
    Point::new(end.x, end.y - cell_size * 0.5)
}

/// The primitives of one ruler.
#[derive(Debug, Clone, PartialEq)]
pub struct RulerPreview {
    pub line: Curve,
    pub halo: Option<Curve>,
    pub label: Label,
    pub end_marker: Option<Shape>,
}

impl RulerPreview {
    /// Flatten into scene items.
    pub fn into_items(self) -> Vec<Item> {
        let mut items = vec![Item::Curve(self.line), Item::Label(self.label)];
        if let Some(marker) = self.end_marker {
            items.push(Item::Shape(marker));
        }
        if let Some(halo) = self.halo {
            items.push(Item::Curve(halo));
        }
        items
    }
}

/// Builds ruler previews for one owner.
#[derive(Debug, Clone)]
pub struct RulerBuilder<'a> {
    ids: &'a RulerIds,
    cell_size: f64,
    color: Option<SerializableColor>,
    stroke: SerializableColor,
    halo_threshold: u8,
}

impl<'a> RulerBuilder<'a> {
    pub fn new(ids: &'a RulerIds, grid: &GridConfig, owner: &Player, settings: &RulerSettings) -> Self {
        Self {
            ids,
            cell_size: grid.cell_size,
            color: owner.rgb(),
            stroke: owner.stroke_color(),
            halo_threshold: settings.halo_threshold,
        }
    }

    /// Build the preview for `points` (waypoints followed by the live end).
    pub fn build(&self, points: Vec<Point>, text: &str, visible: bool, end_marker: bool) -> RulerPreview {
        let cell = self.cell_size;
        let stroke = self.stroke;
        let end = points.last().copied().unwrap_or(Point::ZERO);

        let halo = needs_halo(self.color, self.halo_threshold).then(|| {
            let mut halo = Curve::new(self.ids.halo.clone(), points.clone());
            halo.base.visible = visible;
            halo.base.z_index = HALO_Z;
            halo.base.disable_hit = true;
            halo.stroke_color = SerializableColor::white();
            halo.stroke_opacity = 0.2;
            halo.stroke_width = cell / 8.0;
            halo
        });

        let mut line = Curve::new(self.ids.line.clone(), points);
        line.base.attached_to = halo.as_ref().map(|halo| halo.base.id.clone());
        line.base.visible = visible;
        line.base.z_index = LINE_Z;
        line.stroke_color = stroke;
        line.stroke_width = cell / 15.0;
        line.stroke_dash = vec![cell / 3.0, cell / 5.0];

        let mut label = Label::new(self.ids.label.clone(), label_position(end, cell), text);
        label.base.attached_to = Some(self.ids.line.clone());
        label.base.visible = visible;
        label.base.z_index = LABEL_Z;
        label.base.disable_hit = true;
        label.background_opacity = 0.7;

        let end_marker = end_marker.then(|| {
            let mut marker = Shape::circle(self.ids.end_marker.clone(), end, cell / 4.0);
            marker.base.attached_to = Some(self.ids.line.clone());
            marker.base.z_index = END_MARKER_Z;
            marker.base.disable_hit = true;
            marker.fill_color = stroke;
            marker.stroke_color = SerializableColor::white();
            marker.stroke_opacity = 0.03;
            marker.stroke_width = cell / 120.0;
            marker
        });

        RulerPreview {
            line,
            halo,
            label,
            end_marker,
        }
    }
}

/// In-place update of a live ruler.
#[derive(Debug, Clone)]
pub struct RulerUpdate<'a> {
    pub ids: &'a RulerIds,
    /// Waypoints followed by the live end.
    pub points: Vec<Point>,
    pub end: Point,
    pub cell_size: f64,
    /// New label text; `None` keeps the current text.
    pub text: Option<&'a str>,
    /// Token that rides along with the live end.
    pub dragged: Option<&'a str>,
}

impl RulerUpdate<'_> {
    /// Rewrite the items of a live edit.
    pub fn apply(&self, items: &mut [Item]) {
        for item in items.iter_mut() {
            if self.dragged == Some(item.id()) {
                item.set_position(self.end);
                continue;
            }
            match item {
                Item::Curve(curve) => {
                    if curve.base.id == self.ids.line || curve.base.id == self.ids.halo {
                        curve.points = self.points.clone();
                    }
                }
                Item::Shape(marker) => {
                    if marker.base.id == self.ids.end_marker {
                        marker.base.position = self.end;
                    }
                }
                Item::Label(label) => {
                    if label.base.id == self.ids.label {
                        label.base.position = label_position(self.end, self.cell_size);
                        if let Some(text) = self.text {
                            label.text = text.to_string();
                        }
                    }
                }
                Item::Image(_) => {}
            }
        }
    }
}

/// The ruler's own items out of a live edit, halo first. Anything else (the
/// dragged token) is left out.
pub fn ruler_members(items: &[Item], ids: &RulerIds) -> Vec<Item> {
    ids.all()
        .iter()
        .filter_map(|id| items.iter().find(|item| item.id() == *id).cloned())
        .collect()
}
