//! Mobile units walking their assigned route toward the base.

use std::time::Duration;

use card_defence_core::{
    EffectKind, EnemyId, EnemyKind, EnemyPlan, EnemySnapshot, EnemyTrait, PathId, Point, TowerId,
};

use crate::effects::{
    EffectPayload, StatusEffect, StatusEffects, ANTI_HEAL_DURATION, ARMOR_SHRED_DURATION,
    BURN_DURATION, BURN_INTERVAL, SLOW_DURATION, SLOW_FACTOR, STUN_DURATION, VORTEX_DURATION,
};

/// Distance at which a waypoint counts as reached.
pub const WAYPOINT_REACH: f32 = 5.0;

/// Fraction of current armor removed by an armor shred.
pub const ARMOR_SHRED_RATIO: f32 = 0.25;

/// Result of a damage application.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamageOutcome {
    /// Health removed.
    pub dealt: f32,
    /// Whether this application took the enemy from alive to dead.
    pub killed: bool,
}

/// Enemy owned by a match.
#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    id: EnemyId,
    kind: EnemyKind,
    path: PathId,
    route: Vec<Point>,
    health: f32,
    max_health: f32,
    armor: f32,
    magic_resist: f32,
    speed: f32,
    reward: u32,
    position: Point,
    path_index: usize,
    spawned: bool,
    spawn_time: Duration,
    last_heal_pulse: Duration,
    killed_by: Option<TowerId>,
    effects: StatusEffects,
}

impl Enemy {
    /// Materialises a composed enemy that enters `route` at `spawn_time`.
    #[must_use]
    pub fn from_plan(id: EnemyId, plan: &EnemyPlan, route: Vec<Point>, launch: Duration) -> Self {
        let position = route.first().copied().unwrap_or_default();
        let spawn_time = launch + plan.spawn_delay;
        Self {
            id,
            kind: plan.kind,
            path: plan.path,
            route,
            health: plan.stats.health,
            max_health: plan.stats.health,
            armor: plan.stats.armor,
            magic_resist: plan.stats.magic_resist,
            speed: plan.stats.speed,
            reward: plan.stats.reward,
            position,
            path_index: 0,
            spawned: false,
            spawn_time,
            last_heal_pulse: spawn_time,
            killed_by: None,
            effects: StatusEffects::default(),
        }
    }

    /// Identifier of the enemy.
    #[must_use]
    pub const fn id(&self) -> EnemyId {
        self.id
    }

    /// Archetype of the enemy.
    #[must_use]
    pub const fn kind(&self) -> EnemyKind {
        self.kind
    }

    /// Path the enemy was assigned to.
    #[must_use]
    pub const fn path(&self) -> PathId {
        self.path
    }

    /// Route captured when the enemy was created.
    #[must_use]
    pub fn route(&self) -> &[Point] {
        &self.route
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }

    /// Health ceiling.
    #[must_use]
    pub const fn max_health(&self) -> f32 {
        self.max_health
    }

    /// Current armor.
    #[must_use]
    pub const fn armor(&self) -> f32 {
        self.armor
    }

    /// Percentage reduction of acid damage.
    #[must_use]
    pub const fn magic_resist(&self) -> f32 {
        self.magic_resist
    }

    /// Current speed in pixels per second.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Reward granted on kill.
    #[must_use]
    pub const fn reward(&self) -> u32 {
        self.reward
    }

    /// Current location.
    #[must_use]
    pub const fn position(&self) -> Point {
        self.position
    }

    /// Index of the last waypoint reached.
    #[must_use]
    pub const fn path_index(&self) -> usize {
        self.path_index
    }

    /// Whether the enemy entered the map.
    #[must_use]
    pub const fn is_spawned(&self) -> bool {
        self.spawned
    }

    /// Match time at which the enemy enters the map.
    #[must_use]
    pub const fn spawn_time(&self) -> Duration {
        self.spawn_time
    }

    /// Tower credited with the kill, if the enemy died to a tower.
    #[must_use]
    pub const fn killed_by(&self) -> Option<TowerId> {
        self.killed_by
    }

    /// Active status effects.
    #[must_use]
    pub const fn effects(&self) -> &StatusEffects {
        &self.effects
    }

    /// Reports whether the archetype carries `tag`.
    #[must_use]
    pub fn has_trait(&self, tag: EnemyTrait) -> bool {
        self.kind.template().has_trait(tag)
    }

    /// Reports whether health is above zero.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Reports whether the enemy reached the end of its own route.
    #[must_use]
    pub fn is_at_base(&self) -> bool {
        self.path_index + 1 >= self.route.len()
    }

    /// Reports whether the enemy is on the map, alive and short of the base.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.spawned && self.is_alive() && !self.is_at_base()
    }

    /// Reports whether every tracked number is finite.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.position.is_finite() && self.health.is_finite() && self.speed.is_finite()
    }

    /// Puts the enemy on the first waypoint of its route.
    pub fn spawn(&mut self) {
        self.spawned = true;
        self.position = self.route.first().copied().unwrap_or(self.position);
        self.path_index = 0;
    }

    /// Moves the enemy to an explicit location.
    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    /// Applies a movement step produced by [`step`].
    pub fn apply_step(&mut self, step: Step) {
        self.position = step.position;
        self.path_index = step.path_index;
    }

    /// Removes up to `amount` health, crediting `source` if this kills the enemy.
    pub fn apply_damage(&mut self, amount: f32, source: Option<TowerId>) -> DamageOutcome {
        if amount <= 0.0 || !self.is_alive() {
            return DamageOutcome {
                dealt: 0.0,
                killed: false,
            };
        }
        self.health -= amount;
        let killed = !self.is_alive();
        if killed {
            self.killed_by = source;
        }
        DamageOutcome {
            dealt: amount,
            killed,
        }
    }

    /// Restores up to `amount` health unless heals are suppressed.
    ///
    /// Returns the health actually restored.
    pub fn heal(&mut self, amount: f32) -> f32 {
        if !self.is_alive() || self.effects.contains(EffectKind::AntiHeal) {
            return 0.0;
        }
        let restored = amount.min(self.max_health - self.health).max(0.0);
        self.health += restored;
        restored
    }

    /// Starts or refreshes a burn dealing `tick_damage` every tick.
    pub fn apply_burn(&mut self, now: Duration, tick_damage: f32, source: Option<TowerId>) {
        let _ = self.effects.insert(StatusEffect::new(
            now,
            BURN_DURATION,
            EffectPayload::Burn {
                tick_damage,
                ticks: 0,
                source,
            },
        ));
    }

    /// Halves the speed; refreshes the timer when already slowed.
    pub fn apply_slow(&mut self, now: Duration) {
        let original_speed = match self.effects.get(EffectKind::Slow) {
            Some(StatusEffect {
                payload: EffectPayload::Slow { original_speed },
                ..
            }) => *original_speed,
            _ => {
                let original = self.speed;
                self.speed *= SLOW_FACTOR;
                original
            }
        };
        let _ = self.effects.insert(StatusEffect::new(
            now,
            SLOW_DURATION,
            EffectPayload::Slow { original_speed },
        ));
    }

    /// Removes a quarter of the current armor, at least one point.
    ///
    /// Returns the armor removed.
    pub fn shred_armor(&mut self, now: Duration) -> f32 {
        let reduction = (self.armor * ARMOR_SHRED_RATIO).max(1.0);
        let next = (self.armor - reduction).max(0.0);
        let removed = self.armor - next;
        self.armor = next;
        let _ = self.effects.insert(StatusEffect::new(
            now,
            ARMOR_SHRED_DURATION,
            EffectPayload::ArmorShred,
        ));
        removed
    }

    /// Shows the impact stun marker.
    pub fn apply_stun(&mut self, now: Duration) {
        let _ = self.effects.insert(StatusEffect::new(
            now,
            STUN_DURATION,
            EffectPayload::Stun,
        ));
    }

    /// Anchors a vortex at the current position.
    pub fn apply_vortex(&mut self, now: Duration, source: Option<TowerId>) {
        let _ = self.effects.insert(StatusEffect::new(
            now,
            VORTEX_DURATION,
            EffectPayload::Vortex {
                centre: self.position,
                source,
            },
        ));
    }

    /// Blocks incoming heals.
    pub fn apply_anti_heal(&mut self, now: Duration) {
        let _ = self.effects.insert(StatusEffect::new(
            now,
            ANTI_HEAL_DURATION,
            EffectPayload::AntiHeal,
        ));
    }

    /// Centre of the active vortex, if any.
    #[must_use]
    pub fn vortex_centre(&self) -> Option<Point> {
        match self.effects.get(EffectKind::Vortex) {
            Some(StatusEffect {
                payload: EffectPayload::Vortex { centre, .. },
                ..
            }) => Some(*centre),
            _ => None,
        }
    }

    pub(crate) const fn last_heal_pulse(&self) -> Duration {
        self.last_heal_pulse
    }

    pub(crate) fn mark_heal_pulse(&mut self, now: Duration, marker: Duration) {
        self.last_heal_pulse = now;
        let _ = self
            .effects
            .insert(StatusEffect::new(now, marker, EffectPayload::HealPulse));
    }

    /// Deals due burn ticks, restores speed after a slow and drops expired
    /// markers.
    ///
    /// Returns the burn damage dealt and whether it killed the enemy.
    pub fn update_effects(&mut self, now: Duration) -> DamageOutcome {
        let mut outcome = DamageOutcome {
            dealt: 0.0,
            killed: false,
        };

        if let Some(effect) = self.effects.get(EffectKind::Burn).copied() {
            if let EffectPayload::Burn {
                tick_damage,
                ticks,
                source,
            } = effect.payload
            {
                let mut dealt_ticks = ticks;
                loop {
                    let due = effect.applied_at + BURN_INTERVAL * (dealt_ticks + 1);
                    if due > now || due > effect.expires_at() {
                        break;
                    }
                    dealt_ticks += 1;
                    let tick = self.apply_damage(tick_damage, source);
                    outcome.dealt += tick.dealt;
                    outcome.killed |= tick.killed;
                }
                if effect.is_expired(now) {
                    let _ = self.effects.remove(EffectKind::Burn);
                } else if let Some(StatusEffect {
                    payload: EffectPayload::Burn { ticks, .. },
                    ..
                }) = self.effects.get_mut(EffectKind::Burn)
                {
                    *ticks = dealt_ticks;
                }
            }
        }

        if let Some(effect) = self.effects.get(EffectKind::Slow).copied() {
            if effect.is_expired(now) {
                if let EffectPayload::Slow { original_speed } = effect.payload {
                    self.speed = original_speed;
                }
                let _ = self.effects.remove(EffectKind::Slow);
            }
        }

        self.effects.prune_markers(now);
        outcome
    }

    /// Public view of the enemy.
    #[must_use]
    pub fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            health: self.health,
            max_health: self.max_health,
            armor: self.armor,
            spawned: self.spawned,
            path_index: self.path_index,
            effects: self.effects.kinds().collect(),
        }
    }
}

/// Outcome of a stateless movement step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    /// Location after the step.
    pub position: Point,
    /// Index of the last waypoint reached after the step.
    pub path_index: usize,
}

/// Advances an enemy along `route` for `dt`.
///
/// An enemy within [`WAYPOINT_REACH`] of its next waypoint claims it without
/// moving; otherwise it moves `speed × dt` toward the waypoint without
/// overshooting. Enemies at the end of the route stay put.
#[must_use]
pub fn step(position: Point, path_index: usize, speed: f32, route: &[Point], dt: Duration) -> Step {
    let unchanged = Step {
        position,
        path_index,
    };
    let Some(target) = route.get(path_index + 1).copied() else {
        return unchanged;
    };
    if position.distance(target) < WAYPOINT_REACH {
        return Step {
            position,
            path_index: path_index + 1,
        };
    }
    let travel = speed.max(0.0) * dt.as_secs_f32();
    Step {
        position: position.step_toward(target, travel),
        path_index,
    }
}
