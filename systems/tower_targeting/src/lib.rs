#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that orders the enemies a tower may shoot at.

use std::cmp::Ordering;

use card_defence_core::{EnemyId, Point, TargetingMode};
use rand::{seq::SliceRandom, Rng};

/// Enemy as seen by a tower deciding where to shoot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Target {
    /// Identifier of the enemy.
    pub enemy: EnemyId,
    /// Current location.
    pub position: Point,
    /// Current health.
    pub health: f32,
    /// Index of the last waypoint reached.
    pub path_index: usize,
    /// Whether the enemy entered the map.
    pub spawned: bool,
    /// Whether the enemy hides from towers without detection.
    pub invisible: bool,
}

/// Shooter parameters used to filter and rank targets.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shooter {
    /// Location of the tower.
    pub origin: Point,
    /// Targeting radius; enemies exactly on the edge are in range.
    pub range: f32,
    /// Whether invisible enemies can be targeted.
    pub detects_invisible: bool,
    /// Ordering policy.
    pub mode: TargetingMode,
    /// Upper bound on the number of selected targets.
    pub max_targets: usize,
}

/// Tower targeting system that reuses its scratch buffer between calls.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    candidates: Vec<Candidate>,
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    enemy: EnemyId,
    distance: f32,
    health: f32,
    path_index: usize,
}

impl TowerTargeting {
    /// Creates a new targeting system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects up to `shooter.max_targets` enemies, best first.
    ///
    /// Only spawned, living and visible enemies within range are eligible.
    /// The output buffer is cleared before it is populated.
    pub fn select<R>(
        &mut self,
        shooter: &Shooter,
        targets: impl IntoIterator<Item = Target>,
        rng: &mut R,
        out: &mut Vec<EnemyId>,
    ) where
        R: Rng + ?Sized,
    {
        out.clear();
        if shooter.max_targets == 0 {
            return;
        }

        self.candidates.clear();
        for target in targets {
            if !target.spawned || target.health <= 0.0 {
                continue;
            }
            if target.invisible && !shooter.detects_invisible {
                continue;
            }
            let distance = shooter.origin.distance(target.position);
            if distance > shooter.range {
                continue;
            }
            self.candidates.push(Candidate {
                enemy: target.enemy,
                distance,
                health: target.health,
                path_index: target.path_index,
            });
        }
        if self.candidates.is_empty() {
            return;
        }

        self.candidates.sort_by_key(|candidate| candidate.enemy);
        match shooter.mode {
            TargetingMode::Random => self.candidates.shuffle(rng),
            mode => self
                .candidates
                .sort_by(|left, right| precedence(mode, left, right)),
        }

        out.extend(
            self.candidates
                .iter()
                .take(shooter.max_targets)
                .map(|candidate| candidate.enemy),
        );
    }
}

fn precedence(mode: TargetingMode, left: &Candidate, right: &Candidate) -> Ordering {
    let primary = match mode {
        TargetingMode::Closest => left.distance.total_cmp(&right.distance),
        TargetingMode::Farthest => right.distance.total_cmp(&left.distance),
        TargetingMode::Weakest => left.health.total_cmp(&right.health),
        TargetingMode::Strongest => right.health.total_cmp(&left.health),
        TargetingMode::First => right.path_index.cmp(&left.path_index),
        TargetingMode::Last => left.path_index.cmp(&right.path_index),
        TargetingMode::Random => Ordering::Equal,
    };
    primary.then_with(|| left.enemy.cmp(&right.enemy))
}
