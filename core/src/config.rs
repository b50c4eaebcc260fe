//! Tunable match configuration.
//!
//! Every field carries a default so partial TOML documents deserialize into a
//! complete configuration. Durations are expressed in milliseconds on the wire
//! and exposed as [`Duration`] through accessors.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{MapDimensions, Point};

/// Reasons a configuration is unusable.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// Rooms must admit at least one player.
    #[error("max_players must be at least 1")]
    NoPlayers,
    /// The simulation cannot run at zero hertz.
    #[error("tick_rate_hz must be at least 1")]
    ZeroTickRate,
    /// Players must be offered at least one card per deal.
    #[error("offer_size must be at least 1")]
    EmptyOffer,
    /// The starting path needs a spawn point and a base.
    #[error("initial_path needs at least two points, found {0}")]
    ShortInitialPath(usize),
    /// The placement window is empty.
    #[error("placement window [{min}, {max}] is empty")]
    EmptyPlacementWindow {
        /// Configured minimum distance.
        min: f32,
        /// Configured maximum distance.
        max: f32,
    },
    /// The grid cell size must be positive.
    #[error("cell_size must be positive, found {0}")]
    InvalidCellSize(f32),
    /// The zig-zag turn range is inverted.
    #[error("min_turns {min} exceeds max_turns {max}")]
    InvertedTurnRange {
        /// Configured minimum.
        min: u32,
        /// Configured maximum.
        max: u32,
    },
}

/// Complete configuration for a single match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Maximum number of players admitted to a room.
    pub max_players: usize,
    /// Base health at the start of the match.
    pub base_health: i32,
    /// Length of the preparation phase in milliseconds.
    pub preparation_ms: u64,
    /// Simulation steps per second.
    pub tick_rate_hz: u32,
    /// Number of cards offered to each player per deal.
    pub offer_size: usize,
    /// Completing this wave ends the match in victory.
    pub victory_wave: Option<u32>,
    /// Seed for card draws, path generation and random targeting.
    pub rng_seed: u64,
    /// Map extent and growth.
    pub map: MapConfig,
    /// Tower placement rules.
    pub placement: PlacementConfig,
    /// Procedural path tuning.
    pub paths: PathConfig,
    /// Wave spawning cadence.
    pub waves: WaveConfig,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_players: 4,
            base_health: 100,
            preparation_ms: 30_000,
            tick_rate_hz: 60,
            offer_size: 3,
            victory_wave: None,
            rng_seed: 0x5eed_cafe_f00d_d00d,
            map: MapConfig::default(),
            placement: PlacementConfig::default(),
            paths: PathConfig::default(),
            waves: WaveConfig::default(),
        }
    }
}

impl MatchConfig {
    /// Duration of the preparation phase.
    #[must_use]
    pub fn preparation_time(&self) -> Duration {
        Duration::from_millis(self.preparation_ms)
    }

    /// Duration of a single simulation step.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        let rate = u64::from(self.tick_rate_hz.max(1));
        Duration::from_nanos(1_000_000_000 / rate)
    }

    /// Checks the configuration for values the simulation cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_players == 0 {
            return Err(ConfigError::NoPlayers);
        }
        if self.tick_rate_hz == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        if self.offer_size == 0 {
            return Err(ConfigError::EmptyOffer);
        }
        if self.map.initial_path.len() < 2 {
            return Err(ConfigError::ShortInitialPath(self.map.initial_path.len()));
        }
        let placement = &self.placement;
        if placement.cell_size <= 0.0 {
            return Err(ConfigError::InvalidCellSize(placement.cell_size));
        }
        if placement.min_path_distance > placement.max_path_distance {
            return Err(ConfigError::EmptyPlacementWindow {
                min: placement.min_path_distance,
                max: placement.max_path_distance,
            });
        }
        if self.paths.min_turns > self.paths.max_turns {
            return Err(ConfigError::InvertedTurnRange {
                min: self.paths.min_turns,
                max: self.paths.max_turns,
            });
        }
        Ok(())
    }

    /// Location of the shared base, the last point of the starting path.
    #[must_use]
    pub fn base_position(&self) -> Point {
        self.map
            .initial_path
            .last()
            .copied()
            .unwrap_or_else(|| Point::new(self.map.width, self.map.height / 2.0))
    }
}

/// Map extent, base location and growth policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Initial map width.
    pub width: f32,
    /// Initial map height.
    pub height: f32,
    /// Width added by every expansion.
    pub expansion_width: f32,
    /// Height added by every expansion.
    pub expansion_height: f32,
    /// The map grows on waves `w > 1` where `w % interval == 1`.
    pub expansion_interval: u32,
    /// Waypoints of the starting path; the last point is the base.
    pub initial_path: Vec<Point>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            expansion_width: 160.0,
            expansion_height: 120.0,
            expansion_interval: 5,
            initial_path: vec![
                Point::new(0.0, 300.0),
                Point::new(200.0, 300.0),
                Point::new(200.0, 200.0),
                Point::new(400.0, 200.0),
                Point::new(400.0, 400.0),
                Point::new(600.0, 400.0),
                Point::new(600.0, 300.0),
                Point::new(800.0, 300.0),
            ],
        }
    }
}

impl MapConfig {
    /// Initial map extent.
    #[must_use]
    pub fn dimensions(&self) -> MapDimensions {
        MapDimensions::new(self.width, self.height)
    }

    /// Reports whether starting `wave` grows the map.
    #[must_use]
    pub fn expands_on(&self, wave: u32) -> bool {
        let interval = self.expansion_interval.max(1);
        wave > 1 && wave % interval == 1 % interval
    }
}

/// Constraints checked before a tower is placed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Edge length of a placement grid cell.
    pub cell_size: f32,
    /// Minimum distance from any path segment.
    pub min_path_distance: f32,
    /// Maximum distance from the nearest path segment.
    pub max_path_distance: f32,
    /// Keep-out margin along the map border.
    pub bounds_margin: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            cell_size: 40.0,
            min_path_distance: 30.0,
            max_path_distance: 120.0,
            bounds_margin: 40.0,
        }
    }
}

impl PlacementConfig {
    /// Placement window of the original free-form mode (30 to 80 pixels).
    #[must_use]
    pub fn legacy() -> Self {
        Self {
            max_path_distance: 80.0,
            ..Self::default()
        }
    }
}

/// Thresholds and budgets of the procedural path generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Candidates closer than this to an existing segment become branches.
    pub branch_threshold: f32,
    /// Non-branching candidates must stay farther than this from every path.
    pub intersection_threshold: f32,
    /// Number of random candidates tried before falling back to a canned path.
    pub max_attempts: u32,
    /// Nominal length of a zig-zag leg.
    pub leg_length: f32,
    /// Minimum number of zig-zag turns.
    pub min_turns: u32,
    /// Maximum number of zig-zag turns.
    pub max_turns: u32,
    /// Towers closer than this to a new path are destroyed.
    pub tower_clearance: f32,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            branch_threshold: 40.0,
            intersection_threshold: 60.0,
            max_attempts: 20,
            leg_length: 120.0,
            min_turns: 2,
            max_turns: 4,
            tower_clearance: 30.0,
        }
    }
}

/// Spawn cadence of composed waves.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Delay between successive enemy spawns in milliseconds.
    pub spawn_interval_ms: u64,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            spawn_interval_ms: 1_200,
        }
    }
}

impl WaveConfig {
    /// Delay between successive enemy spawns.
    #[must_use]
    pub fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }
}
