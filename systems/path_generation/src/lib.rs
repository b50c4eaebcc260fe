#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Procedural path generation and map growth.
//!
//! New paths are orthogonal zig-zag walks from a random start toward the shared
//! base. A candidate that passes close to an existing path is cut at the
//! junction and merged into it as a branch; a candidate that keeps its
//! distance is accepted as a standalone path. Candidates that do neither are
//! discarded, and a canned L-shaped route is used once the attempt budget is
//! exhausted. Proximity inside the base neighbourhood is ignored since every
//! path converges there.

use card_defence_core::{
    geometry::{distance_to_polyline, segment_proximity},
    BranchRecord, MapConfig, MapDimensions, Path, PathConfig, PathId, Point, TowerId,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Points closer than this are treated as the same waypoint.
const WAYPOINT_EPSILON: f32 = 0.5;

/// How a generated path was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathOrigin {
    /// A random candidate that keeps clear of every existing path.
    Standalone,
    /// A random candidate merged into an existing path.
    Branch,
    /// A canned route used after the attempt budget ran out.
    Fallback,
}

/// Result of a generation request.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedPath {
    /// Newly created path.
    pub path: Path,
    /// How the path was obtained.
    pub origin: PathOrigin,
    /// Number of random candidates evaluated.
    pub attempts: u32,
}

/// Location where a candidate joins an existing path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BranchSite {
    /// Index of the candidate segment that approaches the parent.
    pub candidate_segment: usize,
    /// Path being joined.
    pub parent: PathId,
    /// Index of the parent segment being joined.
    pub parent_segment: usize,
    /// Closest point on the candidate segment.
    pub departure: Point,
    /// Closest point on the parent segment.
    pub junction: Point,
}

/// Seeded generator of new enemy paths.
#[derive(Debug)]
pub struct PathGenerator {
    config: PathConfig,
    rng: ChaCha8Rng,
}

impl PathGenerator {
    /// Creates a generator using the provided tuning and seed.
    #[must_use]
    pub fn new(config: PathConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Thresholds used by the generator.
    #[must_use]
    pub const fn config(&self) -> &PathConfig {
        &self.config
    }

    /// Generates a new path ending at `base` that either branches into or
    /// stays clear of the `existing` paths.
    pub fn generate(
        &mut self,
        id: PathId,
        wave: u32,
        map: MapDimensions,
        base: Point,
        existing: &[Path],
    ) -> GeneratedPath {
        let exclusion = self.config.intersection_threshold;
        for attempt in 1..=self.config.max_attempts {
            let start = self.random_start(map, base);
            let candidate = self.zigzag(start, base, map);
            if candidate.len() < 2 {
                continue;
            }

            if let Some(site) =
                find_branch(&candidate, existing, self.config.branch_threshold, base, exclusion)
            {
                if let Some(parent) = existing.iter().find(|path| path.id() == site.parent) {
                    let path = build_branch(id, wave, &candidate, &site, parent);
                    tracing::debug!(
                        path = id.get(),
                        parent = site.parent.get(),
                        attempt,
                        "candidate merged as branch"
                    );
                    return GeneratedPath {
                        path,
                        origin: PathOrigin::Branch,
                        attempts: attempt,
                    };
                }
            }

            let clearance = clearance_to(&candidate, existing, base, exclusion);
            if clearance > self.config.intersection_threshold {
                tracing::debug!(
                    path = id.get(),
                    attempt,
                    clearance,
                    "standalone candidate accepted"
                );
                return GeneratedPath {
                    path: Path::new(id, candidate, wave),
                    origin: PathOrigin::Standalone,
                    attempts: attempt,
                };
            }
        }

        let points = fallback_route(map, base, existing, exclusion);
        tracing::warn!(
            path = id.get(),
            attempts = self.config.max_attempts,
            "no candidate fit, using canned route"
        );
        GeneratedPath {
            path: Path::new(id, points, wave),
            origin: PathOrigin::Fallback,
            attempts: self.config.max_attempts,
        }
    }

    fn random_start(&mut self, map: MapDimensions, base: Point) -> Point {
        if self.rng.gen_bool(0.7) {
            let (width, height) = (map.width, map.height);
            match self.rng.gen_range(0..4) {
                0 => Point::new(self.rng.gen_range(0.0..=width), 0.0),
                1 => Point::new(self.rng.gen_range(0.0..=width), height),
                2 => Point::new(0.0, self.rng.gen_range(0.0..=height)),
                _ => Point::new(width, self.rng.gen_range(0.0..=height)),
            }
        } else {
            let anchors = strategic_points(map);
            let anchor = anchors[self.rng.gen_range(0..anchors.len())];
            let jitter = self.config.leg_length / 2.0;
            let point = Point::new(
                anchor.x + self.rng.gen_range(-jitter..=jitter),
                anchor.y + self.rng.gen_range(-jitter..=jitter),
            );
            if point.distance(base) <= self.config.leg_length {
                anchor
            } else {
                map.clamp(point)
            }
        }
    }

    fn zigzag(&mut self, start: Point, base: Point, map: MapDimensions) -> Vec<Point> {
        let min_turns = self.config.min_turns.min(self.config.max_turns);
        let turns = self.rng.gen_range(min_turns..=self.config.max_turns);
        let mut horizontal = self.rng.gen_bool(0.5);
        let mut points = vec![start];
        let mut current = start;

        for _ in 0..turns {
            let length = self.config.leg_length * self.rng.gen_range(0.75..=1.25);
            let remaining = if horizontal {
                base.x - current.x
            } else {
                base.y - current.y
            };
            let offset = if remaining.abs() < WAYPOINT_EPSILON {
                if self.rng.gen_bool(0.5) {
                    length
                } else {
                    -length
                }
            } else {
                remaining.signum() * length.min(remaining.abs())
            };
            let next = if horizontal {
                Point::new(current.x + offset, current.y)
            } else {
                Point::new(current.x, current.y + offset)
            };
            current = map.clamp(next);
            push_waypoint(&mut points, current);
            horizontal = !horizontal;
        }

        push_waypoint(&mut points, Point::new(current.x, base.y));
        push_waypoint(&mut points, base);
        points
    }
}

fn push_waypoint(points: &mut Vec<Point>, point: Point) {
    let duplicate = points
        .last()
        .map_or(false, |last| last.distance(point) < WAYPOINT_EPSILON);
    if !duplicate {
        points.push(point);
    }
}

fn strategic_points(map: MapDimensions) -> [Point; 4] {
    [
        Point::new(map.width * 0.25, map.height * 0.2),
        Point::new(map.width * 0.25, map.height * 0.8),
        Point::new(map.width * 0.5, map.height * 0.1),
        Point::new(map.width * 0.5, map.height * 0.9),
    ]
}

/// Finds the first candidate segment that comes within `threshold` of an
/// existing path, ignoring proximity within `exclusion` of the base.
#[must_use]
pub fn find_branch(
    candidate: &[Point],
    existing: &[Path],
    threshold: f32,
    base: Point,
    exclusion: f32,
) -> Option<BranchSite> {
    for (candidate_segment, pair) in candidate.windows(2).enumerate() {
        let mut best: Option<(f32, BranchSite)> = None;
        for path in existing {
            for (parent_segment, edge) in path.points().windows(2).enumerate() {
                let proximity = segment_proximity(pair[0], pair[1], edge[0], edge[1]);
                if proximity.distance >= threshold
                    || proximity.on_second.distance(base) <= exclusion
                {
                    continue;
                }
                let closer = best
                    .as_ref()
                    .map_or(true, |(distance, _)| proximity.distance < *distance);
                if closer {
                    best = Some((
                        proximity.distance,
                        BranchSite {
                            candidate_segment,
                            parent: path.id(),
                            parent_segment,
                            departure: proximity.on_first,
                            junction: proximity.on_second,
                        },
                    ));
                }
            }
        }
        if let Some((_, site)) = best {
            return Some(site);
        }
    }
    None
}

/// Cuts `candidate` at `site` and continues its movement route along `parent`.
#[must_use]
pub fn build_branch(
    id: PathId,
    wave: u32,
    candidate: &[Point],
    site: &BranchSite,
    parent: &Path,
) -> Path {
    let mut drawn: Vec<Point> = candidate
        .iter()
        .take(site.candidate_segment + 1)
        .copied()
        .collect();
    push_waypoint(&mut drawn, site.departure);
    push_waypoint(&mut drawn, site.junction);

    let mut route = drawn.clone();
    for point in parent.movement_points().iter().skip(site.parent_segment + 1) {
        push_waypoint(&mut route, *point);
    }

    Path::branched(id, drawn, wave, site.parent, site.junction, route)
}

/// Smallest distance between `candidate` and any existing path outside the
/// base neighbourhood.
#[must_use]
pub fn clearance_to(candidate: &[Point], existing: &[Path], base: Point, exclusion: f32) -> f32 {
    let mut clearance = f32::INFINITY;
    for pair in candidate.windows(2) {
        for path in existing {
            for edge in path.points().windows(2) {
                let proximity = segment_proximity(pair[0], pair[1], edge[0], edge[1]);
                if proximity.on_first.distance(base) <= exclusion {
                    continue;
                }
                clearance = clearance.min(proximity.distance);
            }
        }
    }
    clearance
}

/// Canned L-shaped routes into the base, one per approach.
#[must_use]
pub fn canned_routes(map: MapDimensions, base: Point) -> [Vec<Point>; 4] {
    let route = |points: [Point; 3]| {
        let mut route = Vec::with_capacity(points.len());
        for point in points {
            push_waypoint(&mut route, point);
        }
        route
    };
    [
        route([Point::new(0.0, 0.0), Point::new(base.x, 0.0), base]),
        route([
            Point::new(0.0, map.height),
            Point::new(base.x, map.height),
            base,
        ]),
        route([Point::new(map.width, 0.0), Point::new(map.width, base.y), base]),
        route([
            Point::new(map.width, map.height),
            Point::new(base.x, map.height),
            base,
        ]),
    ]
}

fn fallback_route(
    map: MapDimensions,
    base: Point,
    existing: &[Path],
    exclusion: f32,
) -> Vec<Point> {
    let mut best: Option<(f32, Vec<Point>)> = None;
    for route in canned_routes(map, base) {
        let clearance = clearance_to(&route, existing, base, exclusion);
        let better = best
            .as_ref()
            .map_or(true, |(current, _)| clearance > *current);
        if better {
            best = Some((clearance, route));
        }
    }
    best.map(|(_, route)| route)
        .unwrap_or_else(|| vec![Point::new(0.0, 0.0), base])
}

/// Registers a generated path, recording the branch on its parent.
pub fn register(paths: &mut Vec<Path>, path: Path) {
    if let (Some(parent), Some(branch_point)) = (path.branched_from(), path.branch_point()) {
        if let Some(parent) = paths.iter_mut().find(|candidate| candidate.id() == parent) {
            parent.record_branch(BranchRecord {
                path: path.id(),
                branch_point,
            });
        }
    }
    paths.push(path);
}

/// Grows the map by one configured increment.
#[must_use]
pub fn grow_map(map: MapDimensions, config: &MapConfig) -> MapDimensions {
    map.grown_by(config.expansion_width, config.expansion_height)
}

/// Towers lying within `clearance` of the drawn geometry of `path`.
#[must_use]
pub fn towers_in_clearance<I>(path: &[Point], towers: I, clearance: f32) -> Vec<TowerId>
where
    I: IntoIterator<Item = (TowerId, Point)>,
{
    towers
        .into_iter()
        .filter(|(_, position)| distance_to_polyline(*position, path) <= clearance)
        .map(|(id, _)| id)
        .collect()
}
