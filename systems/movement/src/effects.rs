//! Fixed-slot status effect table carried by every enemy.

use std::time::Duration;

use card_defence_core::{EffectKind, Point, TowerId};

/// Interval between two burn ticks.
pub const BURN_INTERVAL: Duration = Duration::from_millis(500);
/// Lifetime of a burn.
pub const BURN_DURATION: Duration = Duration::from_millis(3_000);
/// Speed factor applied while slowed.
pub const SLOW_FACTOR: f32 = 0.5;
/// Lifetime of a slow.
pub const SLOW_DURATION: Duration = Duration::from_millis(2_000);
/// Lifetime of the armor shred marker.
pub const ARMOR_SHRED_DURATION: Duration = Duration::from_millis(1_500);
/// Lifetime of the impact stun marker.
pub const STUN_DURATION: Duration = Duration::from_millis(800);
/// Lifetime of a vortex.
pub const VORTEX_DURATION: Duration = Duration::from_millis(2_000);
/// Lifetime of heal suppression.
pub const ANTI_HEAL_DURATION: Duration = Duration::from_millis(5_000);
/// Lifetime of the marker shown on a healer after it pulses.
pub const HEAL_PULSE_DURATION: Duration = Duration::from_millis(500);

/// Kind-specific state of an active effect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EffectPayload {
    /// Damage over time credited to `source`.
    Burn {
        /// Damage dealt by each tick.
        tick_damage: f32,
        /// Ticks already dealt.
        ticks: u32,
        /// Tower credited with burn kills.
        source: Option<TowerId>,
    },
    /// Speed reduction remembering the speed to restore.
    Slow {
        /// Speed before the slow was applied.
        original_speed: f32,
    },
    /// Cosmetic armor shred marker.
    ArmorShred,
    /// Cosmetic stun marker.
    Stun,
    /// Pull centred on the position where the enemy was struck.
    Vortex {
        /// Centre of the pull.
        centre: Point,
        /// Tower that triggered the vortex.
        source: Option<TowerId>,
    },
    /// Blocks incoming heals.
    AntiHeal,
    /// Cosmetic marker on a healer that just pulsed.
    HealPulse,
}

impl EffectPayload {
    /// Table slot kind of the payload.
    #[must_use]
    pub const fn kind(&self) -> EffectKind {
        match self {
            Self::Burn { .. } => EffectKind::Burn,
            Self::Slow { .. } => EffectKind::Slow,
            Self::ArmorShred => EffectKind::ArmorShred,
            Self::Stun => EffectKind::Stun,
            Self::Vortex { .. } => EffectKind::Vortex,
            Self::AntiHeal => EffectKind::AntiHeal,
            Self::HealPulse => EffectKind::HealPulse,
        }
    }
}

/// Effect with its own expiry clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatusEffect {
    /// Match time at which the effect was applied.
    pub applied_at: Duration,
    /// Lifetime of the effect.
    pub duration: Duration,
    /// Kind-specific state.
    pub payload: EffectPayload,
}

impl StatusEffect {
    /// Creates an effect applied at `applied_at`.
    #[must_use]
    pub const fn new(applied_at: Duration, duration: Duration, payload: EffectPayload) -> Self {
        Self {
            applied_at,
            duration,
            payload,
        }
    }

    /// Match time at which the effect ends.
    #[must_use]
    pub fn expires_at(&self) -> Duration {
        self.applied_at + self.duration
    }

    /// Reports whether the effect has run its course at `now`.
    #[must_use]
    pub fn is_expired(&self, now: Duration) -> bool {
        now >= self.expires_at()
    }
}

/// One optional slot per [`EffectKind`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatusEffects {
    slots: [Option<StatusEffect>; EffectKind::COUNT],
}

impl StatusEffects {
    /// Active effect of the provided kind.
    #[must_use]
    pub fn get(&self, kind: EffectKind) -> Option<&StatusEffect> {
        self.slots[kind.slot()].as_ref()
    }

    /// Mutable access to the active effect of the provided kind.
    pub fn get_mut(&mut self, kind: EffectKind) -> Option<&mut StatusEffect> {
        self.slots[kind.slot()].as_mut()
    }

    /// Reports whether an effect of the provided kind is active.
    #[must_use]
    pub fn contains(&self, kind: EffectKind) -> bool {
        self.slots[kind.slot()].is_some()
    }

    /// Stores `effect`, replacing any effect of the same kind.
    pub fn insert(&mut self, effect: StatusEffect) -> Option<StatusEffect> {
        self.slots[effect.payload.kind().slot()].replace(effect)
    }

    /// Removes the effect of the provided kind.
    pub fn remove(&mut self, kind: EffectKind) -> Option<StatusEffect> {
        self.slots[kind.slot()].take()
    }

    /// Kinds of every active effect in slot order.
    pub fn kinds(&self) -> impl Iterator<Item = EffectKind> + '_ {
        self.slots
            .iter()
            .flatten()
            .map(|effect| effect.payload.kind())
    }

    /// Reports whether no effect is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Drops every expired effect except burn and slow, whose expiry has side
    /// effects handled by the enemy.
    pub fn prune_markers(&mut self, now: Duration) {
        for slot in &mut self.slots {
            let expired = slot.as_ref().map_or(false, |effect| {
                !matches!(
                    effect.payload,
                    EffectPayload::Burn { .. } | EffectPayload::Slow { .. }
                ) && effect.is_expired(now)
            });
            if expired {
                *slot = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_same_kind() {
        let mut effects = StatusEffects::default();
        assert!(effects
            .insert(StatusEffect::new(
                Duration::ZERO,
                STUN_DURATION,
                EffectPayload::Stun
            ))
            .is_none());
        let previous = effects.insert(StatusEffect::new(
            Duration::from_millis(100),
            STUN_DURATION,
            EffectPayload::Stun,
        ));
        assert_eq!(previous.map(|effect| effect.applied_at), Some(Duration::ZERO));
        assert_eq!(effects.kinds().collect::<Vec<_>>(), vec![EffectKind::Stun]);
    }

    #[test]
    fn prune_keeps_effects_with_expiry_side_effects() {
        let mut effects = StatusEffects::default();
        let _ = effects.insert(StatusEffect::new(
            Duration::ZERO,
            SLOW_DURATION,
            EffectPayload::Slow {
                original_speed: 50.0,
            },
        ));
        let _ = effects.insert(StatusEffect::new(
            Duration::ZERO,
            ARMOR_SHRED_DURATION,
            EffectPayload::ArmorShred,
        ));
        effects.prune_markers(Duration::from_secs(10));
        assert!(effects.contains(EffectKind::Slow));
        assert!(!effects.contains(EffectKind::ArmorShred));
    }
}
