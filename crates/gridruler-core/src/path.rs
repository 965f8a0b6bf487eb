//! Waypoint sequence of a ruler being measured.

use kurbo::Point;

/// Ordered, grid-snapped corners of the measured path.
///
/// A path always holds at least one waypoint. The live end (the segment that
/// follows the pointer) is not stored; callers project it from [`Path::last`].
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    waypoints: Vec<Point>,
    /// Bumped on every structural change.
    revision: u64,
}

impl Path {
    /// Start a new path at `first`.
    pub fn start(first: Point) -> Self {
        Self {
            waypoints: vec![first],
            revision: 0,
        }
    }

    /// Append an already snapped segment end.
    pub fn push(&mut self, waypoint: Point) {
        self.waypoints.push(waypoint);
        self.revision += 1;
    }

    /// Remove the most recent waypoint. The first one is never removed.
    pub fn pop(&mut self) -> Option<Point> {
        if self.waypoints.len() <= 1 {
            return None;
        }
        self.revision += 1;
        self.waypoints.pop()
    }

    /// The waypoint new segments start from.
    pub fn last(&self) -> Point {
        debug_assert!(!self.waypoints.is_empty(), "path without waypoints");
        self.waypoints.last().copied().unwrap_or(Point::ZERO)
    }

    pub fn first(&self) -> Point {
        debug_assert!(!self.waypoints.is_empty(), "path without waypoints");
        self.waypoints.first().copied().unwrap_or(Point::ZERO)
    }

    pub fn waypoints(&self) -> &[Point] {
        &self.waypoints
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Never true; a path keeps its first waypoint.
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Waypoints followed by the live end.
    pub fn with_end(&self, end: Point) -> Vec<Point> {
        let mut points = Vec::with_capacity(self.waypoints.len() + 1);
        points.extend_from_slice(&self.waypoints);
        points.push(end);
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snap::segment_end_square;

    #[test]
    fn test_start_has_one_waypoint() {
        let path = Path::start(Point::new(50.0, 50.0));
        assert_eq!(path.len(), 1);
        assert_eq!(path.first(), path.last());
    }

    #[test]
    fn test_pop_keeps_first_waypoint() {
        let mut path = Path::start(Point::ZERO);
        assert_eq!(path.pop(), None);
        assert_eq!(path.len(), 1);
        assert_eq!(path.revision(), 0);
    }

    #[test]
    fn test_push_then_pop_restores_path() {
        let mut path = Path::start(Point::ZERO);
        for pointer in [Point::new(310.0, 20.0), Point::new(280.0, -190.0)] {
            let end = segment_end_square(path.last(), pointer, 100.0);
            path.push(end);
        }
        let before = path.waypoints().to_vec();

        let end = segment_end_square(path.last(), Point::new(-45.0, 420.0), 100.0);
        path.push(end);
        assert_eq!(path.len(), before.len() + 1);
        assert_eq!(path.pop(), Some(end));
        assert_eq!(path.waypoints(), before.as_slice());
    }

    #[test]
    fn test_with_end() {
        let mut path = Path::start(Point::ZERO);
        path.push(Point::new(100.0, 0.0));
        assert_eq!(
            path.with_end(Point::new(100.0, 100.0)),
            vec![Point::ZERO, Point::new(100.0, 0.0), Point::new(100.0, 100.0)]
        );
    }
}
