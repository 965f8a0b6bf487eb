//! Snap functionality for aligning ruler points to the grid.
//!
//! Square grids are handled here; other topologies ask the host.

use crate::grid::{GridConfig, Metric};
use crate::scene::{HostSnap, SceneResult, SceneService};
use kurbo::Point;

/// Snap a point to the nearest grid intersection.
pub fn nearest_vertex(point: Point, cell_size: f64) -> Point {
    Point::new(
        (point.x / cell_size).round() * cell_size,
        (point.y / cell_size).round() * cell_size,
    )
}

/// Snap a point to the nearest cell center.
pub fn nearest_center(point: Point, cell_size: f64) -> Point {
    // Centers are offset from vertices by half a cell
    let half = cell_size * 0.5;
    Point::new(
        ((point.x + half) / cell_size).round() * cell_size - half,
        ((point.y + half) / cell_size).round() * cell_size - half,
    )
}

/// Snap to whichever of the nearest intersection and nearest cell center is
/// closer. Ties go to the intersection.
pub fn snap_square(point: Point, cell_size: f64) -> Point {
    let vertex = nearest_vertex(point, cell_size);
    let center = nearest_center(point, cell_size);
    if point.distance(vertex) <= point.distance(center) {
        vertex
    } else {
        center
    }
}

/// End of a segment from `start` toward `pointer`, with each axis rounded to
/// a whole number of cells.
pub fn segment_end_square(start: Point, pointer: Point, cell_size: f64) -> Point {
    Point::new(
        start.x + ((pointer.x - start.x) / cell_size).round() * cell_size,
        start.y + ((pointer.y - start.y) / cell_size).round() * cell_size,
    )
}

/// Host snap mode used on non-square grids.
pub fn host_snap_mode(metric: Metric) -> HostSnap {
    if metric == Metric::Euclidean {
        HostSnap::Corner
    } else {
        HostSnap::Center
    }
}

/// Snap a raw point to the grid.
pub async fn snap_to_grid<S: SceneService + ?Sized>(
    grid: &GridConfig,
    scene: &S,
    point: Point,
) -> SceneResult<Point> {
    if grid.grid_type.is_square() {
        Ok(snap_square(point, grid.cell_size))
    } else {
        scene.snap_position(point, host_snap_mode(grid.metric)).await
    }
}

/// Grid-aligned end of the segment that starts at `start` and heads for
/// `pointer`.
pub async fn snap_segment_end<S: SceneService + ?Sized>(
    grid: &GridConfig,
    scene: &S,
    start: Point,
    pointer: Point,
) -> SceneResult<Point> {
    if grid.grid_type.is_square() {
        Ok(segment_end_square(start, pointer, grid.cell_size))
    } else {
        scene.snap_position(pointer, host_snap_mode(grid.metric)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridScale, GridType};
    use crate::player::Player;
    use crate::scene::MemoryScene;
    use crate::testing::block_on;

    #[test]
    fn test_nearest_vertex() {
        assert_eq!(nearest_vertex(Point::new(140.0, 260.0), 100.0), Point::new(100.0, 300.0));
    }

    #[test]
    fn test_nearest_center() {
        assert_eq!(nearest_center(Point::new(140.0, 260.0), 100.0), Point::new(150.0, 250.0));
    }

    #[test]
    fn test_snap_square_prefers_closer_target() {
        // Near a corner.
        assert_eq!(snap_square(Point::new(105.0, 95.0), 100.0), Point::new(100.0, 100.0));
        // Near a center.
        assert_eq!(snap_square(Point::new(140.0, 160.0), 100.0), Point::new(150.0, 150.0));
    }

    #[test]
    fn test_snap_square_tie_goes_to_vertex() {
        // Exactly halfway between (0, 0) and (50, 50).
        assert_eq!(snap_square(Point::new(25.0, 25.0), 100.0), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_segment_end_rounds_each_axis() {
        let start = Point::new(50.0, 50.0);
        let end = segment_end_square(start, Point::new(260.0, 90.0), 100.0);
        assert_eq!(end, Point::new(250.0, 50.0));

        let end = segment_end_square(start, Point::new(-120.0, 240.0), 100.0);
        assert_eq!(end, Point::new(-150.0, 250.0));
    }

    #[test]
    fn test_segment_end_is_idempotent() {
        let start = Point::new(0.0, 0.0);
        let pointer = Point::new(337.0, -212.0);
        let once = segment_end_square(start, pointer, 100.0);
        let twice = segment_end_square(start, pointer, 100.0);
        assert_eq!(once, twice);
        // Feeding a snapped end back in is a fixed point.
        assert_eq!(segment_end_square(start, once, 100.0), once);
    }

    #[test]
    fn test_host_snap_mode() {
        assert_eq!(host_snap_mode(Metric::Euclidean), HostSnap::Corner);
        assert_eq!(host_snap_mode(Metric::HostDefined), HostSnap::Center);
    }

    #[test]
    fn test_square_grid_never_calls_host() {
        let grid = GridConfig::square(100.0, Metric::Chebyshev);
        let scene = MemoryScene::new(grid.clone(), Player::default());
        block_on(snap_to_grid(&grid, &scene, Point::new(12.0, 7.0))).unwrap();
        block_on(snap_segment_end(&grid, &scene, Point::ZERO, Point::new(12.0, 7.0))).unwrap();
        assert_eq!(scene.stats().snap_calls, 0);
    }

    #[test]
    fn test_other_grids_delegate_to_host() {
        let grid = GridConfig::new(100.0, GridType::HexVertical, Metric::HostDefined, GridScale::default());
        let scene = MemoryScene::new(grid.clone(), Player::default());
        let snapped = block_on(snap_to_grid(&grid, &scene, Point::new(12.0, 7.0))).unwrap();
        assert_eq!(snapped, Point::new(50.0, 50.0));
        block_on(snap_segment_end(&grid, &scene, Point::ZERO, Point::new(12.0, 7.0))).unwrap();
        assert_eq!(scene.stats().snap_calls, 2);
    }
}
