use std::time::Duration;

use card_defence_core::{EnemyId, HitEffect, Point, ProjectileSnapshot, ProjectileId, TowerId};

/// Projectile homing on a single enemy.
#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    id: ProjectileId,
    tower: TowerId,
    target: EnemyId,
    position: Point,
    damage: f32,
    effect: HitEffect,
    created_at: Duration,
}

impl Projectile {
    pub(crate) const fn new(
        id: ProjectileId,
        tower: TowerId,
        target: EnemyId,
        position: Point,
        damage: f32,
        effect: HitEffect,
        created_at: Duration,
    ) -> Self {
        Self {
            id,
            tower,
            target,
            position,
            damage,
            effect,
            created_at,
        }
    }

    /// Identifier of the projectile.
    #[must_use]
    pub const fn id(&self) -> ProjectileId {
        self.id
    }

    /// Enemy the projectile is homing on.
    #[must_use]
    pub const fn target(&self) -> EnemyId {
        self.target
    }

    /// Current location.
    #[must_use]
    pub const fn position(&self) -> Point {
        self.position
    }

    /// Unmitigated damage carried by the projectile.
    #[must_use]
    pub const fn damage(&self) -> f32 {
        self.damage
    }

    /// Secondary effect applied on hit.
    #[must_use]
    pub const fn effect(&self) -> HitEffect {
        self.effect
    }

    /// Match time at which the projectile was launched.
    #[must_use]
    pub const fn created_at(&self) -> Duration {
        self.created_at
    }

    pub(crate) fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    /// Public view of the projectile.
    #[must_use]
    pub fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            tower: self.tower,
            target: self.target,
            position: self.position,
        }
    }
}
