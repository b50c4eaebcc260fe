//! Enemy routes through the map.

use serde::{Deserialize, Serialize};

use crate::{
    geometry::{distance_to_polyline, Point},
    PathId,
};

/// Route travelled by enemies toward the base.
///
/// `points` is the geometry drawn for players. Branched paths stop their drawn
/// geometry at the junction with their parent and carry a separate
/// `enemy_path` that continues along the parent to the base.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Path {
    id: PathId,
    points: Vec<Point>,
    created_wave: u32,
    branched_from: Option<PathId>,
    branch_point: Option<Point>,
    branches: Vec<BranchRecord>,
    enemy_path: Option<Vec<Point>>,
}

/// Child path that joins this path at `branch_point`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BranchRecord {
    /// Identifier of the joining path.
    pub path: PathId,
    /// Junction location on this path.
    pub branch_point: Point,
}

impl Path {
    /// Creates a standalone path whose drawn geometry is also its movement route.
    #[must_use]
    pub fn new(id: PathId, points: Vec<Point>, created_wave: u32) -> Self {
        Self {
            id,
            points,
            created_wave,
            branched_from: None,
            branch_point: None,
            branches: Vec::new(),
            enemy_path: None,
        }
    }

    /// Creates a path that merges into `parent` at `branch_point`.
    #[must_use]
    pub fn branched(
        id: PathId,
        points: Vec<Point>,
        created_wave: u32,
        parent: PathId,
        branch_point: Point,
        enemy_path: Vec<Point>,
    ) -> Self {
        Self {
            id,
            points,
            created_wave,
            branched_from: Some(parent),
            branch_point: Some(branch_point),
            branches: Vec::new(),
            enemy_path: Some(enemy_path),
        }
    }

    /// Identifier of the path.
    #[must_use]
    pub const fn id(&self) -> PathId {
        self.id
    }

    /// Drawn geometry of the path.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Geometry followed by enemies assigned to this path.
    #[must_use]
    pub fn movement_points(&self) -> &[Point] {
        self.enemy_path.as_deref().unwrap_or(&self.points)
    }

    /// Wave during which the path was created.
    #[must_use]
    pub const fn created_wave(&self) -> u32 {
        self.created_wave
    }

    /// Parent path this path merges into, if any.
    #[must_use]
    pub const fn branched_from(&self) -> Option<PathId> {
        self.branched_from
    }

    /// Junction with the parent path, if any.
    #[must_use]
    pub const fn branch_point(&self) -> Option<Point> {
        self.branch_point
    }

    /// Child paths joining this path.
    #[must_use]
    pub fn branches(&self) -> &[BranchRecord] {
        &self.branches
    }

    /// Records a child path joining this path.
    pub fn record_branch(&mut self, record: BranchRecord) {
        self.branches.push(record);
    }

    /// Final waypoint of the movement route.
    #[must_use]
    pub fn endpoint(&self) -> Option<Point> {
        self.movement_points().last().copied()
    }

    /// Distance from `point` to the drawn geometry.
    #[must_use]
    pub fn distance_to(&self, point: Point) -> f32 {
        distance_to_polyline(point, &self.points)
    }
}
