#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Card Defence engine.
//!
//! This crate defines the message surface that connects hosts, the
//! authoritative world, and pure systems. Hosts submit [`Command`] values
//! describing player intents, the world executes them through its `apply`
//! entry point, and then returns [`Outbound`] notifications addressed either
//! to the whole room or to a single player. Systems operate on the plain data
//! types declared here and never touch the match directly.

pub mod catalog;
pub mod config;
pub mod geometry;
pub mod path;
pub mod snapshot;

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use catalog::{
    CardKind, EffectType, EnemyKind, EnemyTemplate, EnemyTrait, HitEffect,
    ParseTargetingModeError, TargetingMode, TowerModifier, TowerStat, TowerStats, TowerType,
    MAX_QUALITY_LEVEL, QUALITY_STEP,
};
pub use config::{ConfigError, MapConfig, MatchConfig, PathConfig, PlacementConfig, WaveConfig};
pub use geometry::{MapDimensions, Point};
pub use path::{BranchRecord, Path};
pub use snapshot::{
    CombatStatistics, EffectKind, EnemySnapshot, MatchSnapshot, PlayerSnapshot,
    ProjectileSnapshot, RosterEntry, TowerInfo, TowerSnapshot,
};

/// Lifecycle phase of a match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Waiting for every player to become ready.
    #[default]
    Lobby,
    /// Countdown before the enemies of the next wave are released.
    Preparation,
    /// Enemies are spawning and the tick loop is running.
    WaveActive,
    /// Terminal phase after the base fell or the final wave was cleared.
    GameOver,
}

impl Phase {
    /// Reports whether the match reached its terminal phase.
    #[must_use]
    pub const fn is_over(self) -> bool {
        matches!(self, Self::GameOver)
    }
}

/// Commands that express all player intents accepted by a match.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Moves one of the offered cards into the player's inventory.
    SelectCard {
        /// Acting player.
        player: PlayerId,
        /// Index into the player's current offer.
        index: usize,
    },
    /// Spends a tower card to build a tower near the requested location.
    PlaceTower {
        /// Acting player.
        player: PlayerId,
        /// Tower card from the player's inventory.
        card: CardId,
        /// Requested location before grid snapping.
        position: Point,
    },
    /// Spends an effect card on an existing tower.
    ApplyEffect {
        /// Acting player.
        player: PlayerId,
        /// Effect card from the player's inventory.
        card: CardId,
        /// Tower receiving the effect.
        tower: TowerId,
    },
    /// Signals that the player is ready for the next wave.
    SetReady {
        /// Acting player.
        player: PlayerId,
    },
    /// Requests a detailed report about a tower.
    InspectTower {
        /// Player receiving the report.
        player: PlayerId,
        /// Tower being inspected.
        tower: TowerId,
    },
    /// Switches the targeting policy of a tower.
    ChangeTargetingMode {
        /// Acting player.
        player: PlayerId,
        /// Tower being reconfigured.
        tower: TowerId,
        /// Name of the requested mode, matched case-insensitively.
        mode: String,
    },
    /// Jumps straight to the preparation of the provided wave.
    DebugSkipToWave {
        /// Wave to prepare.
        wave: u32,
    },
    /// Advances the match clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Notifications produced by a match.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Confirms that a player entered a room.
    RoomJoined {
        /// Room that admitted the player.
        room: RoomId,
        /// Identifier of the admitted player.
        player: PlayerId,
    },
    /// Complete state of the match.
    StateSnapshot {
        /// Captured state.
        snapshot: Box<MatchSnapshot>,
    },
    /// Per-tick state of mobile entities.
    StateDelta {
        /// Match time in milliseconds.
        time_ms: u64,
        /// Remaining base health.
        base_health: i32,
        /// Enemies of the running wave.
        enemies: Vec<EnemySnapshot>,
        /// Projectiles in flight.
        projectiles: Vec<ProjectileSnapshot>,
    },
    /// A preparation phase started.
    WaveStarted {
        /// Wave being prepared.
        wave: u32,
        /// Length of the preparation phase in milliseconds.
        preparation_ms: u64,
        /// Grouped preview of the enemies that will spawn.
        roster: Vec<RosterEntry>,
    },
    /// The enemies of a wave were released.
    WaveLaunched {
        /// Launched wave.
        wave: u32,
        /// Number of scheduled enemies.
        enemies: usize,
    },
    /// Every enemy of a wave was killed or reached the base.
    WaveEnded {
        /// Completed wave.
        wave: u32,
    },
    /// The match reached its terminal phase.
    GameOver {
        /// Wave during which the match ended.
        wave: u32,
        /// Whether the players won.
        victory: bool,
    },
    /// Enemies reached the base.
    BaseDamaged {
        /// Damage taken this tick.
        damage: i32,
        /// Remaining base health.
        health: i32,
    },
    /// An enemy's health dropped to zero.
    EnemyKilled {
        /// Identifier of the killed enemy.
        enemy: EnemyId,
        /// Archetype of the killed enemy.
        kind: EnemyKind,
        /// Tower credited with the kill.
        tower: Option<TowerId>,
        /// Reward carried by the enemy.
        reward: u32,
    },
    /// The map grew and a new path was generated.
    MapExpanded {
        /// Wave that triggered the growth.
        wave: u32,
        /// New map extent.
        map: MapDimensions,
        /// Newly generated path.
        path: Path,
        /// Towers destroyed by the new path.
        destroyed_towers: Vec<TowerId>,
    },
    /// Inspection report for a single tower.
    TowerInfo {
        /// Derived report.
        info: Box<TowerInfo>,
    },
    /// A tower placement was refused.
    PlacementRejected {
        /// Reason for the refusal.
        error: PlacementError,
    },
    /// A player action was refused.
    ActionRejected {
        /// Reason for the refusal.
        error: ActionError,
    },
    /// A player left the room.
    PlayerLeft {
        /// Identifier of the departed player.
        player: PlayerId,
    },
}

/// Recipients of an outbound notification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "to", content = "player", rename_all = "snake_case")]
pub enum Audience {
    /// Every player in the room.
    Room,
    /// A single player.
    Player(PlayerId),
}

/// Notification paired with its recipients.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Outbound {
    /// Recipients of the event.
    pub audience: Audience,
    /// Notification payload.
    pub event: Event,
}

impl Outbound {
    /// Addresses the event to the whole room.
    #[must_use]
    pub const fn room(event: Event) -> Self {
        Self {
            audience: Audience::Room,
            event,
        }
    }

    /// Addresses the event to a single player.
    #[must_use]
    pub const fn player(player: PlayerId, event: Event) -> Self {
        Self {
            audience: Audience::Player(player),
            event,
        }
    }

    /// Reports whether the provided player receives this notification.
    #[must_use]
    pub fn reaches(&self, player: PlayerId) -> bool {
        match self.audience {
            Audience::Room => true,
            Audience::Player(target) => target == player,
        }
    }
}

/// Card dealt to a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    /// Unique identifier of the card.
    pub id: CardId,
    /// Content of the card.
    pub kind: CardKind,
}

impl Card {
    /// Creates a card.
    #[must_use]
    pub const fn new(id: CardId, kind: CardKind) -> Self {
        Self { id, kind }
    }
}

/// Wave-scaled statistics of a composed enemy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    /// Starting and maximum health.
    pub health: f32,
    /// Flat damage reduction.
    pub armor: f32,
    /// Percentage reduction of acid damage.
    pub magic_resist: f32,
    /// Movement speed in pixels per second.
    pub speed: f32,
    /// Reward granted on kill.
    pub reward: u32,
}

/// Enemy scheduled by the wave composer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyPlan {
    /// Position of the enemy within its wave.
    pub ordinal: u32,
    /// Archetype of the enemy.
    pub kind: EnemyKind,
    /// Wave-scaled statistics.
    pub stats: EnemyStats,
    /// Path the enemy follows.
    pub path: PathId,
    /// Delay after the wave launch before the enemy enters the map.
    pub spawn_delay: Duration,
}

/// Reasons a tower placement request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum PlacementError {
    /// The snapped location lies on top of a path.
    #[error("too close to a path ({distance:.1} px)")]
    TooCloseToPath {
        /// Distance to the nearest path segment.
        distance: f32,
    },
    /// The snapped location is too far away from every path.
    #[error("too far from any path ({distance:.1} px)")]
    TooFarFromPath {
        /// Distance to the nearest path segment.
        distance: f32,
    },
    /// The snapped location falls outside the playable area.
    #[error("outside of the map bounds")]
    OutOfBounds,
    /// Another tower already occupies the neighbouring cell.
    #[error("too close to tower {tower}")]
    TowerTooClose {
        /// Tower blocking the placement.
        tower: TowerId,
    },
}

/// Reasons a player action may be refused.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ActionError {
    /// The acting player is not part of the match.
    #[error("player {player} is not in this room")]
    UnknownPlayer {
        /// Identifier supplied with the action.
        player: PlayerId,
    },
    /// The selected offer index does not exist.
    #[error("no offered card at index {index}")]
    InvalidCardIndex {
        /// Index supplied with the action.
        index: usize,
    },
    /// The referenced card is not in the player's inventory.
    #[error("card {card} is not in the inventory")]
    CardNotOwned {
        /// Identifier supplied with the action.
        card: CardId,
    },
    /// A tower action referenced an effect card.
    #[error("card {card} is not a tower card")]
    NotATowerCard {
        /// Identifier supplied with the action.
        card: CardId,
    },
    /// An effect action referenced a tower card.
    #[error("card {card} is not an effect card")]
    NotAnEffectCard {
        /// Identifier supplied with the action.
        card: CardId,
    },
    /// The referenced tower does not exist.
    #[error("tower {tower} does not exist")]
    UnknownTower {
        /// Identifier supplied with the action.
        tower: TowerId,
    },
    /// The requested targeting mode is not recognised.
    #[error("unknown targeting mode `{mode}`")]
    UnknownTargetingMode {
        /// Name supplied with the action.
        mode: String,
    },
    /// Wave numbers start at one.
    #[error("wave {wave} cannot be prepared")]
    InvalidWave {
        /// Wave supplied with the action.
        wave: u32,
    },
    /// The match already ended.
    #[error("the match is over")]
    MatchOver,
}

impl From<ParseTargetingModeError> for ActionError {
    fn from(error: ParseTargetingModeError) -> Self {
        Self::UnknownTargetingMode { mode: error.0 }
    }
}

/// Reasons a player may be refused entry to a room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum JoinError {
    /// The room reached its player capacity.
    #[error("room is full ({capacity} players)")]
    RoomFull {
        /// Configured capacity of the room.
        capacity: usize,
    },
    /// Players may only join while the room waits in the lobby.
    #[error("game already in progress")]
    GameInProgress,
    /// The player identifier is already taken in this room.
    #[error("player {player} already joined")]
    DuplicatePlayer {
        /// Identifier supplied with the request.
        player: PlayerId,
    },
}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident($inner:ty)) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name($inner);

        impl $name {
            /// Creates a new identifier with the provided numeric value.
            #[must_use]
            pub const fn new(value: $inner) -> Self {
                Self(value)
            }

            /// Retrieves the numeric representation of the identifier.
            #[must_use]
            pub const fn get(&self) -> $inner {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Unique identifier assigned to a connected player.
    PlayerId(u64)
);
numeric_id!(
    /// Unique identifier assigned to a tower.
    TowerId(u32)
);
numeric_id!(
    /// Unique identifier assigned to an enemy.
    EnemyId(u32)
);
numeric_id!(
    /// Unique identifier assigned to a dealt card.
    CardId(u64)
);
numeric_id!(
    /// Unique identifier assigned to a path.
    PathId(u32)
);
numeric_id!(
    /// Unique identifier assigned to a projectile.
    ProjectileId(u64)
);

/// Name of a room hosting a match.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Creates a room identifier from its name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Name of the room.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Converts a duration to whole milliseconds for the wire.
#[must_use]
pub fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::{
        millis, ActionError, Card, CardId, CardKind, Event, JoinError, MatchConfig, Outbound,
        ParseTargetingModeError, PlacementError, PlayerId, Point, TowerId, TowerType,
    };
    use serde::{de::DeserializeOwned, Serialize};
    use std::time::Duration;

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn identifiers_round_trip_through_bincode() {
        assert_round_trip(&TowerId::new(42));
        assert_round_trip(&PlayerId::new(7));
        assert_round_trip(&Point::new(12.5, -3.0));
    }

    #[test]
    fn match_config_round_trips_through_bincode() {
        let mut config = MatchConfig::default();
        config.victory_wave = Some(12);
        assert_round_trip(&config);
    }

    #[test]
    fn card_serializes_with_kind_and_type() {
        let card = Card::new(CardId::new(3), CardKind::Tower(TowerType::Fire));
        let value = serde_json::to_string(&card).expect("serialize");
        assert!(value.contains("\"kind\":\"tower\""));
        assert!(value.contains("\"type\":\"FIRE\""));
    }

    #[test]
    fn player_audience_only_reaches_target() {
        let outbound = Outbound::player(
            PlayerId::new(1),
            Event::PlacementRejected {
                error: PlacementError::OutOfBounds,
            },
        );
        assert!(outbound.reaches(PlayerId::new(1)));
        assert!(!outbound.reaches(PlayerId::new(2)));
        assert!(Outbound::room(Event::WaveEnded { wave: 1 }).reaches(PlayerId::new(2)));
    }

    #[test]
    fn targeting_parse_errors_become_action_errors() {
        let error: ActionError = ParseTargetingModeError("NEAREST".to_owned()).into();
        assert_eq!(
            error,
            ActionError::UnknownTargetingMode {
                mode: "NEAREST".to_owned()
            }
        );
        assert_eq!(error.to_string(), "unknown targeting mode `NEAREST`");
    }

    #[test]
    fn join_errors_describe_capacity() {
        assert_eq!(
            JoinError::RoomFull { capacity: 4 }.to_string(),
            "room is full (4 players)"
        );
    }

    #[test]
    fn millis_truncates_sub_millisecond_precision() {
        assert_eq!(millis(Duration::from_micros(16_666)), 16);
    }
}
