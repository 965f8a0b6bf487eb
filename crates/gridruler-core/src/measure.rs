//! Distance measurement along a ruler path.

use crate::grid::{GridConfig, Metric};
use crate::scene::{SceneResult, SceneService};
use kurbo::Point;

/// Whole-cell offsets between two points, as absolute values.
pub fn cell_offsets(a: Point, b: Point, cell_size: f64) -> (f64, f64) {
    (
        ((b.x - a.x) / cell_size).round().abs(),
        ((b.y - a.y) / cell_size).round().abs(),
    )
}

/// Cost in cells of one segment under a square-grid metric.
///
/// `dx` and `dy` are absolute cell offsets. `HostDefined` has no local cost
/// and falls back to Chebyshev.
pub fn segment_cost(metric: Metric, dx: f64, dy: f64) -> f64 {
    match metric {
        Metric::Chebyshev | Metric::HostDefined => dx.max(dy),
        Metric::Manhattan => dx + dy,
        Metric::Alternating => {
            let long = dx.max(dy);
            let short = dx.min(dy);
            long + (short / 2.0).floor()
        }
        Metric::Euclidean => dx.hypot(dy),
    }
}

/// Scaled path length on a square grid, before rounding.
pub fn square_distance(grid: &GridConfig, points: &[Point]) -> f64 {
    let multiplier = grid.scale.multiplier;
    let segments = points.windows(2).map(|w| cell_offsets(w[0], w[1], grid.cell_size));
    match grid.metric {
        // Scale each axis first, so the hypotenuse is taken in real units.
        Metric::Euclidean => segments
            .map(|(dx, dy)| (dx * multiplier).hypot(dy * multiplier))
            .fold(0.0, |total, cost| total + cost),
        metric => {
            segments
                .map(|(dx, dy)| segment_cost(metric, dx, dy))
                .fold(0.0, |total, cost| total + cost)
                * multiplier
        }
    }
}

/// Format a scaled distance with no decimal places.
pub fn format_distance(distance: f64, unit: &str) -> String {
    // `+ 0.0` turns a negative zero into zero.
    format!("{:.0}{}", distance + 0.0, unit)
}

/// Display text for the length of `points`, e.g. `"25ft"`.
///
/// Fewer than two points measure zero.
pub async fn display_distance<S: SceneService + ?Sized>(
    grid: &GridConfig,
    scene: &S,
    points: &[Point],
) -> SceneResult<String> {
    let unit = grid.scale.unit.as_str();
    if grid.is_local() {
        return Ok(format_distance(square_distance(grid, points).round(), unit));
    }

    let mut total = 0.0;
    for w in points.windows(2) {
        total += scene.distance_between(w[1], w[0]).await?;
    }
    let scaled = total * grid.scale.multiplier;
    let rounded = if grid.metric == Metric::Euclidean {
        scaled.trunc()
    } else {
        scaled.round()
    };
    Ok(format_distance(rounded, unit))
}
