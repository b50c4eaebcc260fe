//! Planar geometry helpers shared by placement, path generation and combat.

use serde::{Deserialize, Serialize};

/// Location on the match map measured in world pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Point {
    /// Creates a point from explicit coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two points.
    #[must_use]
    pub fn distance(self, other: Point) -> f32 {
        self.distance_sq(other).sqrt()
    }

    /// Squared Euclidean distance between two points.
    #[must_use]
    pub fn distance_sq(self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// Moves `step` units from `self` toward `target` without overshooting it.
    #[must_use]
    pub fn step_toward(self, target: Point, step: f32) -> Point {
        let distance = self.distance(target);
        if distance <= step || distance <= f32::EPSILON {
            return target;
        }
        let scale = step / distance;
        Point::new(
            self.x + (target.x - self.x) * scale,
            self.y + (target.y - self.y) * scale,
        )
    }

    /// Reports whether both coordinates are finite numbers.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Extent of the playable map.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapDimensions {
    /// Width in world pixels.
    pub width: f32,
    /// Height in world pixels.
    pub height: f32,
}

impl MapDimensions {
    /// Creates a new dimension descriptor.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Grows the map by the provided increments.
    #[must_use]
    pub fn grown_by(self, width: f32, height: f32) -> Self {
        Self::new(self.width + width, self.height + height)
    }

    /// Reports whether the point lies inside the map shrunk by `margin` on every side.
    #[must_use]
    pub fn contains_with_margin(&self, point: Point, margin: f32) -> bool {
        point.x >= margin
            && point.x <= self.width - margin
            && point.y >= margin
            && point.y <= self.height - margin
    }

    /// Clamps the point onto the map rectangle.
    #[must_use]
    pub fn clamp(&self, point: Point) -> Point {
        Point::new(
            point.x.clamp(0.0, self.width),
            point.y.clamp(0.0, self.height),
        )
    }
}

/// Returns the point of segment `a`-`b` closest to `point`.
#[must_use]
pub fn closest_point_on_segment(point: Point, a: Point, b: Point) -> Point {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx * dx + dy * dy;
    if length_sq <= f32::EPSILON {
        return a;
    }
    let t = ((point.x - a.x) * dx + (point.y - a.y) * dy) / length_sq;
    let t = t.clamp(0.0, 1.0);
    Point::new(a.x + t * dx, a.y + t * dy)
}

/// Distance from `point` to the segment `a`-`b`.
#[must_use]
pub fn distance_to_segment(point: Point, a: Point, b: Point) -> f32 {
    point.distance(closest_point_on_segment(point, a, b))
}

/// Smallest distance from `point` to any segment of the polyline.
///
/// Returns `f32::INFINITY` for polylines with fewer than two points.
#[must_use]
pub fn distance_to_polyline(point: Point, polyline: &[Point]) -> f32 {
    polyline
        .windows(2)
        .map(|segment| distance_to_segment(point, segment[0], segment[1]))
        .fold(f32::INFINITY, f32::min)
}

/// Closest approach between two segments.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentProximity {
    /// Shortest distance between the segments.
    pub distance: f32,
    /// Point on the first segment realising the distance.
    pub on_first: Point,
    /// Point on the second segment realising the distance.
    pub on_second: Point,
}

/// Computes the closest approach between segments `a1`-`a2` and `b1`-`b2`.
#[must_use]
pub fn segment_proximity(a1: Point, a2: Point, b1: Point, b2: Point) -> SegmentProximity {
    if let Some(crossing) = segment_intersection(a1, a2, b1, b2) {
        return SegmentProximity {
            distance: 0.0,
            on_first: crossing,
            on_second: crossing,
        };
    }

    let candidates = [
        (a1, closest_point_on_segment(a1, b1, b2)),
        (a2, closest_point_on_segment(a2, b1, b2)),
        (closest_point_on_segment(b1, a1, a2), b1),
        (closest_point_on_segment(b2, a1, a2), b2),
    ];

    let mut best = SegmentProximity {
        distance: f32::INFINITY,
        on_first: a1,
        on_second: b1,
    };
    for (on_first, on_second) in candidates {
        let distance = on_first.distance(on_second);
        if distance < best.distance {
            best = SegmentProximity {
                distance,
                on_first,
                on_second,
            };
        }
    }
    best
}

/// Returns the crossing point of two segments when they properly intersect or touch.
#[must_use]
pub fn segment_intersection(a1: Point, a2: Point, b1: Point, b2: Point) -> Option<Point> {
    let r = (a2.x - a1.x, a2.y - a1.y);
    let s = (b2.x - b1.x, b2.y - b1.y);
    let denominator = r.0 * s.1 - r.1 * s.0;
    if denominator.abs() <= f32::EPSILON {
        return None;
    }
    let offset = (b1.x - a1.x, b1.y - a1.y);
    let t = (offset.0 * s.1 - offset.1 * s.0) / denominator;
    let u = (offset.0 * r.1 - offset.1 * r.0) / denominator;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(Point::new(a1.x + t * r.0, a1.y + t * r.1))
    } else {
        None
    }
}

/// Snaps a coordinate to the centre of its grid cell.
#[must_use]
pub fn snap_to_cell_centre(value: f32, cell_size: f32) -> f32 {
    if cell_size <= 0.0 {
        return value;
    }
    (value / cell_size).floor() * cell_size + cell_size / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_distance_to_segment_uses_perpendicular_foot() {
        let distance = distance_to_segment(
            Point::new(50.0, 40.0),
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
        );
        assert!((distance - 40.0).abs() < 1e-4);
    }

    #[test]
    fn point_distance_to_segment_clamps_to_endpoints() {
        let distance = distance_to_segment(
            Point::new(-30.0, 40.0),
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
        );
        assert!((distance - 50.0).abs() < 1e-4);
    }

    #[test]
    fn crossing_segments_have_zero_proximity() {
        let proximity = segment_proximity(
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 0.0),
        );
        assert_eq!(proximity.distance, 0.0);
        assert!((proximity.on_first.x - 5.0).abs() < 1e-4);
    }

    #[test]
    fn parallel_segments_report_gap() {
        let proximity = segment_proximity(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(20.0, 30.0),
            Point::new(80.0, 30.0),
        );
        assert!((proximity.distance - 30.0).abs() < 1e-4);
        assert!((proximity.on_second.y - 30.0).abs() < 1e-4);
    }

    #[test]
    fn snapping_moves_to_cell_centre() {
        assert_eq!(snap_to_cell_centre(93.0, 40.0), 100.0);
        assert_eq!(snap_to_cell_centre(40.0, 40.0), 60.0);
    }

    #[test]
    fn step_toward_never_overshoots() {
        let start = Point::new(0.0, 0.0);
        let target = Point::new(3.0, 4.0);
        assert_eq!(start.step_toward(target, 10.0), target);
        let halfway = start.step_toward(target, 2.5);
        assert!((halfway.x - 1.5).abs() < 1e-4);
        assert!((halfway.y - 2.0).abs() < 1e-4);
    }
}
