#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tower combat: attack cadence, homing projectiles, damage mitigation and
//! on-hit effects.

mod projectile;
mod tower;

use std::{collections::BTreeMap, time::Duration};

use card_defence_core::{EnemyId, ProjectileId, TowerId};
use card_defence_system_movement::EnemyTable;
use card_defence_system_tower_targeting::TowerTargeting;
use rand::Rng;

pub use projectile::Projectile;
pub use tower::Tower;

/// Projectile travel speed in pixels per second.
pub const PROJECTILE_SPEED: f32 = 200.0;
/// Projectiles closer than this to their target hit it.
pub const HIT_RADIUS: f32 = 15.0;
/// Projectiles older than this are discarded.
pub const PROJECTILE_TTL: Duration = Duration::from_secs(5);
/// Share of projectile damage dealt by each burn tick.
pub const BURN_RATIO: f32 = 0.3;
/// Share of projectile damage dealt again by an earth impact.
pub const TREMOR_RATIO: f32 = 0.5;
/// Time after a vortex hit during which the tower ignores that enemy.
pub const VORTEX_COOLDOWN: Duration = Duration::from_secs(5);

/// Towers of a match keyed by identifier.
pub type TowerTable = BTreeMap<TowerId, Tower>;

/// Notable combat outcomes of a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CombatEvent {
    /// A tower launched a projectile.
    Fired {
        /// Tower that fired.
        tower: TowerId,
        /// Enemy being targeted.
        enemy: EnemyId,
        /// Identifier of the new projectile.
        projectile: ProjectileId,
    },
    /// A projectile reached its target.
    Hit {
        /// Tower that fired the projectile.
        tower: TowerId,
        /// Enemy that was struck.
        enemy: EnemyId,
        /// Health removed, including impact bonuses.
        damage: f32,
        /// Whether the hit took the enemy from alive to dead.
        killed: bool,
    },
}

/// Damage left after armor and, for acid, magic resist.
///
/// Unarmored enemies take the raw payload, so a payload without damage stays
/// harmless against them. Armor and magic resist never reduce a hit below one
/// point.
#[must_use]
pub fn mitigated_damage(base: f32, armor: f32, magic_resist: f32, acid: bool) -> f32 {
    let mut damage = base.max(0.0);
    if armor > 0.0 {
        damage = (damage - armor).max(1.0);
    }
    if acid && magic_resist > 0.0 {
        damage = (damage * (1.0 - magic_resist / 100.0)).max(1.0);
    }
    damage
}

/// System that advances projectiles and fires ready towers.
#[derive(Debug, Default)]
pub struct TowerCombat {
    targeting: TowerTargeting,
    selected: Vec<EnemyId>,
    next_projectile: u64,
}

impl TowerCombat {
    /// Creates a new combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one combat tick for every tower in identifier order.
    ///
    /// Each tower first advances its projectiles, then attacks up to
    /// `max_targets` enemies if its cooldown elapsed and any are eligible.
    pub fn handle<R>(
        &mut self,
        towers: &mut TowerTable,
        enemies: &mut EnemyTable,
        now: Duration,
        dt: Duration,
        rng: &mut R,
        out: &mut Vec<CombatEvent>,
    ) where
        R: Rng + ?Sized,
    {
        for tower in towers.values_mut() {
            tower.forget_vortex_cooldowns(now);
            tower.advance_projectiles(enemies, now, dt, out);
            if !tower.is_ready(now) {
                continue;
            }

            let shooter = tower.shooter();
            self.targeting
                .select(&shooter, tower.targets(enemies), rng, &mut self.selected);
            for enemy in &self.selected {
                let projectile = ProjectileId::new(self.next_projectile);
                self.next_projectile += 1;
                tower.launch(projectile, *enemy, now);
                out.push(CombatEvent::Fired {
                    tower: tower.id(),
                    enemy: *enemy,
                    projectile,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn armor_is_subtracted_with_a_floor_of_one() {
        assert_eq!(mitigated_damage(15.0, 5.0, 0.0, false), 10.0);
        assert_eq!(mitigated_damage(15.0, 40.0, 0.0, false), 1.0);
        assert_eq!(mitigated_damage(15.0, -3.0, 0.0, false), 15.0);
    }

    #[test]
    fn acid_is_reduced_by_magic_resist() {
        assert_eq!(mitigated_damage(20.0, 0.0, 50.0, true), 10.0);
        assert_eq!(mitigated_damage(20.0, 0.0, 50.0, false), 20.0);
        assert_eq!(mitigated_damage(2.0, 0.0, 90.0, true), 1.0);
    }

    #[test]
    fn zero_damage_payload_only_hurts_armored_enemies() {
        assert_eq!(mitigated_damage(0.0, 0.0, 0.0, false), 0.0);
        assert_eq!(mitigated_damage(0.0, 5.0, 0.0, false), 1.0);
        assert_eq!(mitigated_damage(0.0, 5.0, 50.0, true), 1.0);
    }

    #[test]
    fn unarmored_enemies_take_raw_damage() {
        assert_eq!(mitigated_damage(0.5, 0.0, 0.0, false), 0.5);
        assert_eq!(mitigated_damage(0.5, 2.0, 0.0, false), 1.0);
    }
}
