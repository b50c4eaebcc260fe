//! Combat units placed by players.

use std::{collections::BTreeMap, time::Duration};

use card_defence_core::{
    millis, CombatStatistics, EffectType, EnemyId, EnemyTrait, HitEffect, PlayerId, Point,
    ProjectileId, TargetingMode, TowerId, TowerInfo, TowerModifier, TowerSnapshot, TowerStat,
    TowerStats, TowerType, MAX_QUALITY_LEVEL,
};
use card_defence_system_movement::{DamageOutcome, Enemy, EnemyTable};
use card_defence_system_tower_targeting::{Shooter, Target};

use crate::{
    mitigated_damage, projectile::Projectile, CombatEvent, BURN_RATIO, HIT_RADIUS,
    PROJECTILE_SPEED, PROJECTILE_TTL, TREMOR_RATIO, VORTEX_COOLDOWN,
};

/// Tower owned by a match.
///
/// Current damage and attack speed always equal the modified base value
/// multiplied by the quality scalar. Range is not affected by quality.
#[derive(Clone, Debug, PartialEq)]
pub struct Tower {
    id: TowerId,
    kind: TowerType,
    position: Point,
    owner: PlayerId,
    base: TowerStats,
    stats: TowerStats,
    quality: f32,
    quality_level: u8,
    max_targets: u32,
    detects_invisible: bool,
    targeting: TargetingMode,
    effects: Vec<EffectType>,
    projectiles: Vec<Projectile>,
    last_attack: Option<Duration>,
    vortex_cooldowns: BTreeMap<EnemyId, Duration>,
    statistics: CombatStatistics,
    created_at: Duration,
}

impl Tower {
    /// Creates an unmodified tower of `kind` built at match time `created_at`.
    #[must_use]
    pub fn new(
        id: TowerId,
        kind: TowerType,
        position: Point,
        owner: PlayerId,
        created_at: Duration,
    ) -> Self {
        let base = kind.base_stats();
        Self {
            id,
            kind,
            position,
            owner,
            base,
            stats: base,
            quality: 1.0,
            quality_level: 0,
            max_targets: 1,
            detects_invisible: false,
            targeting: TargetingMode::default(),
            effects: Vec::new(),
            projectiles: Vec::new(),
            last_attack: None,
            vortex_cooldowns: BTreeMap::new(),
            statistics: CombatStatistics {
                created_at_ms: millis(created_at),
                ..CombatStatistics::default()
            },
            created_at,
        }
    }

    /// Identifier of the tower.
    #[must_use]
    pub const fn id(&self) -> TowerId {
        self.id
    }

    /// Archetype of the tower.
    #[must_use]
    pub const fn kind(&self) -> TowerType {
        self.kind
    }

    /// Location of the tower.
    #[must_use]
    pub const fn position(&self) -> Point {
        self.position
    }

    /// Player who placed the tower.
    #[must_use]
    pub const fn owner(&self) -> PlayerId {
        self.owner
    }

    /// Current combat statistics.
    #[must_use]
    pub const fn stats(&self) -> TowerStats {
        self.stats
    }

    /// Quality scalar applied to damage and attack speed.
    #[must_use]
    pub const fn quality(&self) -> f32 {
        self.quality
    }

    /// Number of quality upgrades applied so far.
    #[must_use]
    pub const fn quality_level(&self) -> u8 {
        self.quality_level
    }

    /// Number of enemies attacked per volley.
    #[must_use]
    pub const fn max_targets(&self) -> u32 {
        self.max_targets
    }

    /// Whether invisible enemies can be targeted.
    #[must_use]
    pub const fn detects_invisible(&self) -> bool {
        self.detects_invisible
    }

    /// Active targeting policy.
    #[must_use]
    pub const fn targeting(&self) -> TargetingMode {
        self.targeting
    }

    /// Effect cards spent on the tower, in application order.
    #[must_use]
    pub fn effects(&self) -> &[EffectType] {
        &self.effects
    }

    /// Projectiles currently in flight.
    #[must_use]
    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    /// Kills, damage and attack counters.
    #[must_use]
    pub const fn statistics(&self) -> CombatStatistics {
        self.statistics
    }

    /// Replaces the targeting policy.
    pub fn set_targeting(&mut self, mode: TargetingMode) {
        self.targeting = mode;
    }

    /// Spends an effect card on the tower.
    ///
    /// Returns `false` when the card had no effect, which only happens for a
    /// quality upgrade on a tower already at the highest tier.
    pub fn apply_effect(&mut self, effect: EffectType) -> bool {
        self.effects.push(effect);
        let changed = match effect.modifier() {
            TowerModifier::Multiply { stat, factor } => {
                match stat {
                    TowerStat::Damage => self.base.damage *= factor,
                    TowerStat::AttackSpeed => self.base.attack_speed *= factor,
                    TowerStat::Range => self.base.range *= factor,
                }
                true
            }
            TowerModifier::AddTargets(extra) => {
                self.max_targets += extra;
                true
            }
            TowerModifier::DetectInvisible(detects) => {
                self.detects_invisible = detects;
                true
            }
            TowerModifier::Quality(step) => {
                if self.quality_level < MAX_QUALITY_LEVEL {
                    self.quality *= step;
                    self.quality_level += 1;
                    true
                } else {
                    false
                }
            }
        };
        self.stats = TowerStats::new(
            self.base.damage * self.quality,
            self.base.attack_speed * self.quality,
            self.base.range,
        );
        tracing::debug!(
            tower = self.id.get(),
            ?effect,
            changed,
            damage = self.stats.damage,
            attack_speed = self.stats.attack_speed,
            range = self.stats.range,
            "effect applied to tower"
        );
        changed
    }

    /// Drops every projectile in flight, used when a wave ends.
    pub fn clear_projectiles(&mut self) {
        self.projectiles.clear();
    }

    /// Credits the tower with a kill.
    pub fn record_kill(&mut self) {
        self.statistics.kills += 1;
    }

    /// Damage per second against a single target.
    #[must_use]
    pub fn dps(&self) -> f32 {
        self.stats.damage * self.stats.attack_speed
    }

    /// Damage per second across every simultaneous target.
    #[must_use]
    pub fn total_dps(&self) -> f32 {
        self.dps() * self.max_targets as f32
    }

    /// Reports whether the attack cooldown has elapsed at `now`.
    #[must_use]
    pub fn is_ready(&self, now: Duration) -> bool {
        if self.stats.attack_speed <= 0.0 {
            return false;
        }
        self.last_attack.map_or(true, |last| {
            let elapsed_ms = now.saturating_sub(last).as_secs_f64() * 1_000.0;
            elapsed_ms >= 1_000.0 / f64::from(self.stats.attack_speed)
        })
    }

    /// Public view of the tower.
    #[must_use]
    pub fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            owner: self.owner,
            stats: self.stats,
            quality_level: self.quality_level,
            max_targets: self.max_targets,
            detects_invisible: self.detects_invisible,
            targeting: self.targeting,
            effects: self.effects.clone(),
        }
    }

    /// Detailed read-only report for an inspecting player.
    #[must_use]
    pub fn info(&self, now: Duration) -> TowerInfo {
        TowerInfo {
            tower: self.snapshot(),
            quality: self.quality,
            dps: self.dps(),
            total_dps: self.total_dps(),
            statistics: self.statistics,
            uptime_ms: millis(now.saturating_sub(self.created_at)),
            projectiles_in_flight: self.projectiles.len(),
        }
    }

    pub(crate) fn shooter(&self) -> Shooter {
        Shooter {
            origin: self.position,
            range: self.stats.range,
            detects_invisible: self.detects_invisible,
            mode: self.targeting,
            max_targets: usize::try_from(self.max_targets).unwrap_or(usize::MAX),
        }
    }

    /// Enemies that are not under this tower's vortex cooldown.
    pub(crate) fn targets<'a>(
        &'a self,
        enemies: &'a EnemyTable,
    ) -> impl Iterator<Item = Target> + 'a {
        enemies
            .values()
            .filter(|enemy| !enemy.is_at_base())
            .filter(|enemy| !self.vortex_cooldowns.contains_key(&enemy.id()))
            .map(|enemy| Target {
                enemy: enemy.id(),
                position: enemy.position(),
                health: enemy.health(),
                path_index: enemy.path_index(),
                spawned: enemy.is_spawned(),
                invisible: enemy.has_trait(EnemyTrait::Invisible),
            })
    }

    pub(crate) fn forget_vortex_cooldowns(&mut self, now: Duration) {
        self.vortex_cooldowns.retain(|_, until| *until > now);
    }

    pub(crate) fn launch(&mut self, id: ProjectileId, target: EnemyId, now: Duration) {
        self.last_attack = Some(now);
        self.statistics.attacks += 1;
        self.projectiles.push(Projectile::new(
            id,
            self.id,
            target,
            self.position,
            self.stats.damage,
            self.kind.hit_effect(),
            now,
        ));
    }

    /// Moves every projectile toward its target, resolving hits and dropping
    /// projectiles whose target is gone or that outlived their lifetime.
    pub(crate) fn advance_projectiles(
        &mut self,
        enemies: &mut EnemyTable,
        now: Duration,
        dt: Duration,
        out: &mut Vec<CombatEvent>,
    ) {
        let travel = PROJECTILE_SPEED * dt.as_secs_f32();
        let mut projectiles = std::mem::take(&mut self.projectiles);
        projectiles.retain_mut(|projectile| {
            let Some(enemy) = enemies.get_mut(&projectile.target()) else {
                return false;
            };
            if !enemy.is_alive() || !enemy.is_spawned() {
                return false;
            }
            if projectile.position().distance(enemy.position()) < HIT_RADIUS {
                let outcome = self.resolve_hit(projectile, enemy, now);
                out.push(CombatEvent::Hit {
                    tower: self.id,
                    enemy: enemy.id(),
                    damage: outcome.dealt,
                    killed: outcome.killed,
                });
                return false;
            }
            projectile.set_position(projectile.position().step_toward(enemy.position(), travel));
            now.saturating_sub(projectile.created_at()) <= PROJECTILE_TTL
        });
        self.projectiles = projectiles;
    }

    fn resolve_hit(
        &mut self,
        projectile: &Projectile,
        enemy: &mut Enemy,
        now: Duration,
    ) -> DamageOutcome {
        let source = Some(self.id);
        let damage = mitigated_damage(
            projectile.damage(),
            enemy.armor(),
            enemy.magic_resist(),
            self.kind.deals_acid_damage(),
        );
        let mut outcome = enemy.apply_damage(damage, source);

        if enemy.is_alive() {
            match projectile.effect() {
                HitEffect::Burn => enemy.apply_burn(now, projectile.damage() * BURN_RATIO, source),
                HitEffect::Slow => enemy.apply_slow(now),
                HitEffect::ArmorShred => {
                    let _ = enemy.shred_armor(now);
                }
                HitEffect::Tremor => {
                    let bonus = enemy.apply_damage(projectile.damage() * TREMOR_RATIO, source);
                    outcome.dealt += bonus.dealt;
                    outcome.killed |= bonus.killed;
                    enemy.apply_stun(now);
                }
                HitEffect::Vortex => {
                    enemy.apply_vortex(now, source);
                    let _ = self
                        .vortex_cooldowns
                        .insert(enemy.id(), now + VORTEX_COOLDOWN);
                }
                HitEffect::AntiHeal => enemy.apply_anti_heal(now),
                HitEffect::None => {}
            }
        }

        self.statistics.damage_dealt += outcome.dealt;
        tracing::trace!(
            tower = self.id.get(),
            enemy = enemy.id().get(),
            dealt = outcome.dealt,
            killed = outcome.killed,
            "projectile hit"
        );
        outcome
    }
}
