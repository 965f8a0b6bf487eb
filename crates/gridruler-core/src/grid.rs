//! Grid configuration shared by every ruler mode.
//!
//! The host owns the grid; this is a cached copy that is replaced in place
//! whenever the host reports a change.

use crate::error::{MeasureError, MeasureResult};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Shared, in-place mutable handle used for host-refreshed configuration.
pub type Shared<T> = Rc<RefCell<T>>;

/// Wrap a value in a [`Shared`] handle.
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

/// Default cell size in canvas units.
pub const DEFAULT_CELL_SIZE: f64 = 150.0;

/// Grid topology reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GridType {
    #[default]
    Square,
    HexVertical,
    HexHorizontal,
    Isometric,
    Dimetric,
}

impl GridType {
    /// Square grids are measured locally; everything else asks the host.
    pub fn is_square(self) -> bool {
        self == GridType::Square
    }
}

/// Cost function turning grid offsets into a distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Metric {
    /// Diagonal steps cost the same as orthogonal ones.
    #[default]
    Chebyshev,
    /// Only orthogonal steps.
    Manhattan,
    /// Every second diagonal step costs double.
    Alternating,
    /// Straight-line distance.
    Euclidean,
    /// Distance is whatever the host's grid primitive reports.
    HostDefined,
}

/// Real-world scale of one grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridScale {
    pub multiplier: f64,
    pub unit: String,
}

impl Default for GridScale {
    fn default() -> Self {
        Self {
            multiplier: 5.0,
            unit: "ft".to_string(),
        }
    }
}

impl GridScale {
    pub fn new(multiplier: f64, unit: impl Into<String>) -> Self {
        Self {
            multiplier,
            unit: unit.into(),
        }
    }

    /// Parse a raw scale string such as `"5ft"`, `"1.5 m"` or `"km"`.
    ///
    /// A missing number means a multiplier of one.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let split = raw
            .char_indices()
            .find(|(_, c)| !(c.is_ascii_digit() || *c == '.'))
            .map(|(i, _)| i)
            .unwrap_or(raw.len());
        let (number, unit) = raw.split_at(split);
        let multiplier = number.parse::<f64>().ok().filter(|m| *m > 0.0).unwrap_or(1.0);
        Self::new(multiplier, unit.trim())
    }
}

/// Cached grid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Size of one cell in canvas units (the host's "dpi").
    pub cell_size: f64,
    pub grid_type: GridType,
    pub metric: Metric,
    pub scale: GridScale,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            grid_type: GridType::Square,
            metric: Metric::Chebyshev,
            scale: GridScale::default(),
        }
    }
}

impl GridConfig {
    pub fn new(cell_size: f64, grid_type: GridType, metric: Metric, scale: GridScale) -> Self {
        Self {
            cell_size,
            grid_type,
            metric,
            scale,
        }
    }

    /// Square grid with the given metric and a one-unit-per-cell scale.
    pub fn square(cell_size: f64, metric: Metric) -> Self {
        Self::new(cell_size, GridType::Square, metric, GridScale::new(1.0, ""))
    }

    /// Check the invariants the measurement code relies on.
    pub fn validate(&self) -> MeasureResult<()> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(MeasureError::InvalidGrid(format!(
                "cell size must be positive, got {}",
                self.cell_size
            )));
        }
        if !(self.scale.multiplier.is_finite() && self.scale.multiplier > 0.0) {
            return Err(MeasureError::InvalidGrid(format!(
                "scale multiplier must be positive, got {}",
                self.scale.multiplier
            )));
        }
        if self.grid_type.is_square() && self.metric == Metric::HostDefined {
            return Err(MeasureError::InvalidGrid(
                "square grids need one of the square metrics".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether distances and snapping can be computed without the host.
    pub fn is_local(&self) -> bool {
        self.grid_type.is_square() && self.metric != Metric::HostDefined
    }

    /// Replace this configuration with a host update, keeping the old one
    /// if the update is invalid.
    pub fn update(&mut self, next: GridConfig) -> MeasureResult<()> {
        next.validate()?;
        *self = next;
        Ok(())
    }
}
