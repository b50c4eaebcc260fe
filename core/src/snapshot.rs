//! Read-only views of match state handed to transports.

use serde::{Deserialize, Serialize};

use crate::{
    catalog::{EffectType, EnemyKind, TargetingMode, TowerStats, TowerType},
    geometry::{MapDimensions, Point},
    path::Path,
    Card, EnemyId, Phase, PlayerId, ProjectileId, RoomId, TowerId,
};

/// Complete state of a match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    /// Room hosting the match.
    pub room: RoomId,
    /// Current phase.
    pub phase: Phase,
    /// Current wave number; zero before the first wave.
    pub wave: u32,
    /// Remaining base health.
    pub base_health: i32,
    /// Current map extent.
    pub map: MapDimensions,
    /// Connected players.
    pub players: Vec<PlayerSnapshot>,
    /// Placed towers.
    pub towers: Vec<TowerSnapshot>,
    /// Enemies of the running wave, spawned or scheduled.
    pub enemies: Vec<EnemySnapshot>,
    /// Active paths.
    pub paths: Vec<Path>,
}

/// Public state of a player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Player identifier.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Owned, unplayed cards.
    pub inventory: Vec<Card>,
    /// Cards currently offered.
    pub current_cards: Vec<Card>,
    /// Whether the player signalled readiness.
    pub is_ready: bool,
}

/// Public state of a tower.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerSnapshot {
    /// Tower identifier.
    pub id: TowerId,
    /// Tower archetype.
    pub kind: TowerType,
    /// Placement location.
    pub position: Point,
    /// Owning player.
    pub owner: PlayerId,
    /// Statistics after modifiers and quality.
    pub stats: TowerStats,
    /// Quality tier in `0..=3`.
    pub quality_level: u8,
    /// Simultaneous targets per attack.
    pub max_targets: u32,
    /// Whether invisible enemies can be targeted.
    pub detects_invisible: bool,
    /// Active targeting policy.
    pub targeting: TargetingMode,
    /// Effect cards applied so far, in order.
    pub effects: Vec<EffectType>,
}

/// Names of status effects carried by enemies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Damage over time.
    Burn,
    /// Halved speed.
    Slow,
    /// Armor reduction marker.
    ArmorShred,
    /// Impact stun marker.
    Stun,
    /// Pulling neighbours.
    Vortex,
    /// Heals blocked.
    AntiHeal,
    /// Healer aura.
    HealPulse,
}

impl EffectKind {
    /// Number of effect kinds.
    pub const COUNT: usize = 7;

    /// Every effect kind in table order.
    pub const ALL: [EffectKind; Self::COUNT] = [
        EffectKind::Burn,
        EffectKind::Slow,
        EffectKind::ArmorShred,
        EffectKind::Stun,
        EffectKind::Vortex,
        EffectKind::AntiHeal,
        EffectKind::HealPulse,
    ];

    /// Slot index of the kind inside fixed-size effect tables.
    #[must_use]
    pub const fn slot(self) -> usize {
        match self {
            Self::Burn => 0,
            Self::Slow => 1,
            Self::ArmorShred => 2,
            Self::Stun => 3,
            Self::Vortex => 4,
            Self::AntiHeal => 5,
            Self::HealPulse => 6,
        }
    }
}

/// Public state of an enemy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemySnapshot {
    /// Enemy identifier.
    pub id: EnemyId,
    /// Enemy archetype.
    pub kind: EnemyKind,
    /// Current location.
    pub position: Point,
    /// Current health.
    pub health: f32,
    /// Health ceiling.
    pub max_health: f32,
    /// Current armor.
    pub armor: f32,
    /// Whether the enemy entered the map.
    pub spawned: bool,
    /// Index of the last waypoint reached.
    pub path_index: usize,
    /// Active status effects.
    pub effects: Vec<EffectKind>,
}

/// Public state of a projectile in flight.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    /// Projectile identifier.
    pub id: ProjectileId,
    /// Firing tower.
    pub tower: TowerId,
    /// Targeted enemy.
    pub target: EnemyId,
    /// Current location.
    pub position: Point,
}

/// Cumulative combat record of a tower.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatStatistics {
    /// Enemies finished off by the tower.
    pub kills: u32,
    /// Total damage dealt.
    pub damage_dealt: f32,
    /// Projectiles fired.
    pub attacks: u32,
    /// Match time at which the tower was built, in milliseconds.
    pub created_at_ms: u64,
}

/// Derived inspection report sent to the requesting player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerInfo {
    /// Tower state.
    pub tower: TowerSnapshot,
    /// Quality scalar applied to damage and attack speed.
    pub quality: f32,
    /// Damage per second against a single unarmored target.
    pub dps: f32,
    /// Damage per second across all simultaneous targets.
    pub total_dps: f32,
    /// Combat record.
    pub statistics: CombatStatistics,
    /// Time since construction in milliseconds.
    pub uptime_ms: u64,
    /// Projectiles currently in flight.
    pub projectiles_in_flight: usize,
}

/// Grouped preview of a wave sent when its preparation starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Enemy archetype.
    pub kind: EnemyKind,
    /// Number of enemies of this archetype.
    pub count: u32,
    /// Scaled health.
    pub health: f32,
    /// Scaled armor.
    pub armor: f32,
    /// Scaled magic resist.
    pub magic_resist: f32,
}
