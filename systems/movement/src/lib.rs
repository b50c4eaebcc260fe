#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic enemy simulation: spawning, status effects, movement along
//! per-enemy routes, vortex pulls, healer pulses and base arrival.

pub mod effects;
mod enemy;

use std::{collections::BTreeMap, time::Duration};

use card_defence_core::{EnemyId, EnemyKind, EnemyTrait, Point, TowerId};

pub use effects::{EffectPayload, StatusEffect, StatusEffects};
pub use enemy::{step, DamageOutcome, Enemy, Step, ARMOR_SHRED_RATIO, WAYPOINT_REACH};

/// Largest share of an enemy's own walking step a vortex may pull it per tick.
pub const MAX_PULL_SHARE: f32 = 0.9;

/// Enemies of a match keyed by identifier.
pub type EnemyTable = BTreeMap<EnemyId, Enemy>;

/// Tuning of the cross-enemy interactions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    vortex_radius: f32,
    vortex_dead_zone: f32,
    vortex_pull_speed: f32,
    heal_interval: Duration,
    heal_amount: f32,
    heal_radius: f32,
}

impl Config {
    /// Creates a configuration from explicit values.
    #[must_use]
    pub const fn new(
        vortex_radius: f32,
        vortex_dead_zone: f32,
        vortex_pull_speed: f32,
        heal_interval: Duration,
        heal_amount: f32,
        heal_radius: f32,
    ) -> Self {
        Self {
            vortex_radius,
            vortex_dead_zone,
            vortex_pull_speed,
            heal_interval,
            heal_amount,
            heal_radius,
        }
    }

    /// Enemies closer than this to a vortex centre are pulled.
    #[must_use]
    pub const fn vortex_radius(&self) -> f32 {
        self.vortex_radius
    }

    /// Health restored by each healer pulse.
    #[must_use]
    pub const fn heal_amount(&self) -> f32 {
        self.heal_amount
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(80.0, 5.0, 30.0, Duration::from_millis(2_000), 15.0, 100.0)
    }
}

/// Notable changes produced while advancing enemies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MovementEvent {
    /// An enemy entered the map.
    Spawned {
        /// Identifier of the spawned enemy.
        enemy: EnemyId,
    },
    /// A malformed enemy was removed from the table.
    Dropped {
        /// Identifier of the dropped enemy.
        enemy: EnemyId,
    },
}

/// Enemy removed from the table by [`reap`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Departure {
    /// The enemy's health reached zero.
    Killed {
        /// Identifier of the enemy.
        enemy: EnemyId,
        /// Archetype of the enemy.
        kind: EnemyKind,
        /// Reward carried by the enemy.
        reward: u32,
        /// Tower credited with the kill.
        tower: Option<TowerId>,
    },
    /// The enemy reached the end of its route.
    Arrived {
        /// Identifier of the enemy.
        enemy: EnemyId,
    },
}

/// Pure system advancing every enemy by one tick.
#[derive(Debug, Default)]
pub struct Movement {
    config: Config,
    vortices: Vec<(EnemyId, Point)>,
    healers: Vec<(EnemyId, Point)>,
}

impl Movement {
    /// Creates the system with the provided tuning.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            vortices: Vec::new(),
            healers: Vec::new(),
        }
    }

    /// Advances every enemy to match time `now`, `dt` after the previous tick.
    pub fn advance(
        &mut self,
        enemies: &mut EnemyTable,
        now: Duration,
        dt: Duration,
        out: &mut Vec<MovementEvent>,
    ) {
        for enemy in enemies.values_mut() {
            if !enemy.is_spawned() && enemy.spawn_time() <= now {
                enemy.spawn();
                out.push(MovementEvent::Spawned { enemy: enemy.id() });
            }
        }

        for enemy in enemies.values_mut() {
            if !enemy.is_spawned() || !enemy.is_alive() {
                continue;
            }
            let _ = enemy.update_effects(now);
            if !enemy.is_alive() || enemy.is_at_base() {
                continue;
            }
            let next = step(
                enemy.position(),
                enemy.path_index(),
                enemy.speed(),
                enemy.route(),
                dt,
            );
            enemy.apply_step(next);
        }

        self.pull_toward_vortices(enemies, dt);
        self.pulse_healers(enemies, now);
        drop_malformed(enemies, out);
    }

    fn pull_toward_vortices(&mut self, enemies: &mut EnemyTable, dt: Duration) {
        self.vortices.clear();
        self.vortices.extend(
            enemies
                .values()
                .filter(|enemy| enemy.is_active())
                .filter_map(|enemy| enemy.vortex_centre().map(|centre| (enemy.id(), centre))),
        );
        if self.vortices.is_empty() {
            return;
        }

        let seconds = dt.as_secs_f32();
        let pull = self.config.vortex_pull_speed * seconds;
        let (radius, dead_zone) = (self.config.vortex_radius, self.config.vortex_dead_zone);
        for enemy in enemies.values_mut() {
            if !enemy.is_active() {
                continue;
            }
            let (id, position) = (enemy.id(), enemy.position());
            let nearest = self
                .vortices
                .iter()
                .filter(|(source, _)| *source != id)
                .map(|(_, centre)| (position.distance(*centre), *centre))
                .filter(|(distance, _)| *distance < radius && *distance > dead_zone)
                .min_by(|(a, _), (b, _)| a.total_cmp(b));
            let Some((_, centre)) = nearest else {
                continue;
            };
            // Only the nearest vortex pulls, and never harder than the enemy walks.
            let limit = enemy.speed() * seconds * MAX_PULL_SHARE;
            enemy.set_position(position.step_toward(centre, pull.min(limit)));
        }
    }

    fn pulse_healers(&mut self, enemies: &mut EnemyTable, now: Duration) {
        self.healers.clear();
        self.healers.extend(
            enemies
                .values()
                .filter(|enemy| enemy.is_active() && enemy.has_trait(EnemyTrait::Healer))
                .filter(|enemy| now >= enemy.last_heal_pulse() + self.config.heal_interval)
                .map(|enemy| (enemy.id(), enemy.position())),
        );

        for (healer, origin) in &self.healers {
            let mut restored = 0.0;
            for enemy in enemies.values_mut() {
                if enemy.id() == *healer || !enemy.is_active() {
                    continue;
                }
                if enemy.position().distance(*origin) <= self.config.heal_radius {
                    restored += enemy.heal(self.config.heal_amount);
                }
            }
            if let Some(enemy) = enemies.get_mut(healer) {
                enemy.mark_heal_pulse(now, effects::HEAL_PULSE_DURATION);
            }
            tracing::trace!(healer = healer.get(), restored, "healer pulsed");
        }
    }
}

fn drop_malformed(enemies: &mut EnemyTable, out: &mut Vec<MovementEvent>) {
    enemies.retain(|id, enemy| {
        if enemy.is_well_formed() {
            return true;
        }
        tracing::warn!(enemy = id.get(), "dropping malformed enemy");
        out.push(MovementEvent::Dropped { enemy: *id });
        false
    });
}

/// Removes dead and arrived enemies, reporting each departure once.
///
/// Death takes precedence over arrival.
pub fn reap(enemies: &mut EnemyTable, out: &mut Vec<Departure>) {
    enemies.retain(|id, enemy| {
        if !enemy.is_spawned() {
            return true;
        }
        if !enemy.is_alive() {
            out.push(Departure::Killed {
                enemy: *id,
                kind: enemy.kind(),
                reward: enemy.reward(),
                tower: enemy.killed_by(),
            });
            return false;
        }
        if enemy.is_at_base() {
            out.push(Departure::Arrived { enemy: *id });
            return false;
        }
        true
    });
}

/// Reports whether every enemy of the wave spawned and none is still active.
#[must_use]
pub fn wave_cleared(enemies: &EnemyTable) -> bool {
    enemies
        .values()
        .all(|enemy| enemy.is_spawned() && !enemy.is_active())
}
