#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave composition.
//!
//! Waves are described by a fixed enemy-count table that shifts composition as
//! the wave number grows, and by linear stat multipliers applied to the enemy
//! templates. The composer distributes the resulting enemies round-robin across
//! the active paths and staggers their spawn delays.

use std::time::Duration;

use card_defence_core::{EnemyKind, EnemyPlan, EnemyStats, PathId, RosterEntry, WaveConfig};

/// Linear stat scaling applied to every enemy of a wave.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveMultipliers {
    /// Factor applied to template health.
    pub health: f64,
    /// Factor applied to template armor.
    pub armor: f64,
    /// Factor applied to template magic resist.
    pub magic_resist: f64,
}

impl WaveMultipliers {
    /// Multipliers of the provided wave; wave one is unscaled.
    #[must_use]
    pub fn for_wave(wave: u32) -> Self {
        let step = f64::from(wave.saturating_sub(1));
        Self {
            health: 1.0 + step * 0.15,
            armor: 1.0 + step * 0.10,
            magic_resist: 1.0 + step * 0.05,
        }
    }
}

/// Number of enemies of each archetype in a wave, in spawn order.
#[must_use]
pub fn composition(wave: u32) -> Vec<(EnemyKind, u32)> {
    let w = wave.max(1);
    let groups = if w <= 3 {
        vec![(EnemyKind::Goblin, 5 + 2 * w)]
    } else if w <= 6 {
        vec![
            (EnemyKind::Goblin, 3 + w),
            (EnemyKind::Orc, w / 2),
            (EnemyKind::Scout, w / 3),
        ]
    } else if w <= 10 {
        vec![
            (EnemyKind::Goblin, 2 + w / 2),
            (EnemyKind::Orc, w / 2),
            (EnemyKind::Scout, w / 2),
            (EnemyKind::Mage, w / 4),
            (EnemyKind::Assassin, w / 5),
            (EnemyKind::Shaman, w / 5),
        ]
    } else {
        vec![
            (EnemyKind::Goblin, w / 2),
            (EnemyKind::Orc, w / 2),
            (EnemyKind::Scout, w / 3),
            (EnemyKind::Mage, w / 3),
            (EnemyKind::Assassin, w / 4),
            (EnemyKind::Shaman, w / 5),
            (EnemyKind::ArmoredScout, w / 6),
        ]
    };
    groups.into_iter().filter(|(_, count)| *count > 0).collect()
}

/// Template statistics of `kind` scaled for `wave`.
#[must_use]
pub fn scaled_stats(kind: EnemyKind, wave: u32) -> EnemyStats {
    let template = kind.template();
    let multipliers = WaveMultipliers::for_wave(wave);
    EnemyStats {
        health: scale(template.health, multipliers.health),
        armor: scale(template.armor, multipliers.armor),
        magic_resist: scale(template.magic_resist, multipliers.magic_resist),
        speed: template.speed,
        reward: template.reward,
    }
}

fn scale(base: f32, factor: f64) -> f32 {
    (f64::from(base) * factor).round() as f32
}

/// Composes scheduled enemy rosters for waves.
#[derive(Clone, Debug)]
pub struct WaveComposer {
    spawn_interval: Duration,
}

impl WaveComposer {
    /// Creates a composer spacing successive spawns by `spawn_interval`.
    #[must_use]
    pub const fn new(spawn_interval: Duration) -> Self {
        Self { spawn_interval }
    }

    /// Creates a composer from the wave section of the match configuration.
    #[must_use]
    pub fn from_config(config: &WaveConfig) -> Self {
        Self::new(config.spawn_interval())
    }

    /// Delay between successive spawns.
    #[must_use]
    pub const fn spawn_interval(&self) -> Duration {
        self.spawn_interval
    }

    /// Produces the enemies of `wave`, assigned round-robin to `paths`.
    ///
    /// Enemy `i` spawns `i × spawn_interval` after the launch. No enemies are
    /// produced when no path is available.
    #[must_use]
    pub fn compose(&self, wave: u32, paths: &[PathId]) -> Vec<EnemyPlan> {
        if paths.is_empty() {
            tracing::warn!(wave, "no active paths, wave composed empty");
            return Vec::new();
        }

        let mut plans = Vec::new();
        let mut ordinal: u32 = 0;
        for (kind, count) in composition(wave) {
            let stats = scaled_stats(kind, wave);
            for _ in 0..count {
                let path = paths[ordinal as usize % paths.len()];
                plans.push(EnemyPlan {
                    ordinal,
                    kind,
                    stats,
                    path,
                    spawn_delay: self.spawn_interval * ordinal,
                });
                ordinal += 1;
            }
        }

        tracing::debug!(
            wave,
            enemies = plans.len(),
            paths = paths.len(),
            "composed wave"
        );
        plans
    }

    /// Grouped preview of `wave` sent to players ahead of the launch.
    #[must_use]
    pub fn roster(&self, wave: u32) -> Vec<RosterEntry> {
        composition(wave)
            .into_iter()
            .map(|(kind, count)| {
                let stats = scaled_stats(kind, wave);
                RosterEntry {
                    kind,
                    count,
                    health: stats.health,
                    armor: stats.armor,
                    magic_resist: stats.magic_resist,
                }
            })
            .collect()
    }
}

impl Default for WaveComposer {
    fn default() -> Self {
        Self::from_config(&WaveConfig::default())
    }
}
