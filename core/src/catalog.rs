//! Static content tables: towers, effect cards and enemy templates.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tower archetypes that can be placed from tower cards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TowerType {
    /// Sets targets on fire.
    Fire,
    /// Slows targets.
    Ice,
    /// Corrodes armor and ignores part of the magic resist.
    Acid,
    /// Deals bonus damage to the struck enemy.
    Earth,
    /// Pulls enemies around the struck enemy.
    Wind,
    /// Slow, heavy hitter with no secondary effect.
    Darkness,
    /// Suppresses healing on the struck enemy.
    AntiHeal,
}

impl TowerType {
    /// Every tower type in catalog order.
    pub const ALL: [TowerType; 7] = [
        TowerType::Fire,
        TowerType::Ice,
        TowerType::Acid,
        TowerType::Earth,
        TowerType::Wind,
        TowerType::Darkness,
        TowerType::AntiHeal,
    ];

    /// Unmodified combat statistics of the tower type.
    #[must_use]
    pub const fn base_stats(self) -> TowerStats {
        match self {
            Self::Fire | Self::Ice | Self::Acid => TowerStats::new(15.0, 1.0, 100.0),
            Self::Earth => TowerStats::new(10.0, 1.0, 100.0),
            Self::Wind => TowerStats::new(0.0, 1.0, 100.0),
            Self::Darkness => TowerStats::new(60.0, 0.5, 100.0),
            Self::AntiHeal => TowerStats::new(12.0, 1.0, 100.0),
        }
    }

    /// Effect applied to an enemy when one of this tower's projectiles lands.
    #[must_use]
    pub const fn hit_effect(self) -> HitEffect {
        match self {
            Self::Fire => HitEffect::Burn,
            Self::Ice => HitEffect::Slow,
            Self::Acid => HitEffect::ArmorShred,
            Self::Earth => HitEffect::Tremor,
            Self::Wind => HitEffect::Vortex,
            Self::Darkness => HitEffect::None,
            Self::AntiHeal => HitEffect::AntiHeal,
        }
    }

    /// Reports whether projectiles of this tower are reduced by magic resist.
    #[must_use]
    pub const fn deals_acid_damage(self) -> bool {
        matches!(self, Self::Acid)
    }
}

/// Secondary effect carried by a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitEffect {
    /// Damage over time.
    Burn,
    /// Temporary speed reduction.
    Slow,
    /// Permanent armor reduction.
    ArmorShred,
    /// Bonus impact damage with a short stun marker.
    Tremor,
    /// Pulls neighbouring enemies toward the target.
    Vortex,
    /// Blocks incoming heals.
    AntiHeal,
    /// No secondary effect.
    None,
}

/// Damage, cadence and reach of a tower.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerStats {
    /// Damage carried by each projectile.
    pub damage: f32,
    /// Attacks per second.
    pub attack_speed: f32,
    /// Targeting radius in world pixels.
    pub range: f32,
}

impl TowerStats {
    /// Creates a stat block.
    #[must_use]
    pub const fn new(damage: f32, attack_speed: f32, range: f32) -> Self {
        Self {
            damage,
            attack_speed,
            range,
        }
    }
}

/// Tower statistic addressed by a multiplicative effect card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerStat {
    /// Projectile damage.
    Damage,
    /// Attacks per second.
    AttackSpeed,
    /// Targeting radius.
    Range,
}

/// Effect cards that upgrade an existing tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EffectType {
    /// +10% attack speed.
    AttackSpeed,
    /// One additional simultaneous target.
    MultiTarget,
    /// +15% damage.
    DamageBoost,
    /// Allows the tower to see invisible enemies.
    InvisibilityDetection,
    /// +20% range.
    RangeBoost,
    /// Raises the tower quality tier.
    QualityUpgrade,
}

impl EffectType {
    /// Every effect card type in catalog order.
    pub const ALL: [EffectType; 6] = [
        EffectType::AttackSpeed,
        EffectType::MultiTarget,
        EffectType::DamageBoost,
        EffectType::InvisibilityDetection,
        EffectType::RangeBoost,
        EffectType::QualityUpgrade,
    ];

    /// Modifier applied to a tower when this card is spent on it.
    #[must_use]
    pub const fn modifier(self) -> TowerModifier {
        match self {
            Self::AttackSpeed => TowerModifier::Multiply {
                stat: TowerStat::AttackSpeed,
                factor: 1.1,
            },
            Self::MultiTarget => TowerModifier::AddTargets(1),
            Self::DamageBoost => TowerModifier::Multiply {
                stat: TowerStat::Damage,
                factor: 1.15,
            },
            Self::InvisibilityDetection => TowerModifier::DetectInvisible(true),
            Self::RangeBoost => TowerModifier::Multiply {
                stat: TowerStat::Range,
                factor: 1.2,
            },
            Self::QualityUpgrade => TowerModifier::Quality(QUALITY_STEP),
        }
    }
}

/// Multiplier applied to the quality scalar by each quality upgrade.
pub const QUALITY_STEP: f32 = 1.33;

/// Highest quality tier a tower can reach.
pub const MAX_QUALITY_LEVEL: u8 = 3;

/// Stat change carried by an effect card.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum TowerModifier {
    /// Multiplies a base statistic.
    Multiply {
        /// Statistic being scaled.
        stat: TowerStat,
        /// Multiplicative factor.
        factor: f32,
    },
    /// Adds simultaneous targets.
    AddTargets(u32),
    /// Sets invisible detection.
    DetectInvisible(bool),
    /// Multiplies the quality scalar and raises the tier.
    Quality(f32),
}

/// Content of a dealt card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "type", rename_all = "snake_case")]
pub enum CardKind {
    /// Places a tower of the given type.
    Tower(TowerType),
    /// Upgrades an existing tower.
    Effect(EffectType),
}

impl CardKind {
    /// Full card catalog used by the uniform card draw.
    #[must_use]
    pub fn catalog() -> Vec<CardKind> {
        TowerType::ALL
            .iter()
            .copied()
            .map(CardKind::Tower)
            .chain(EffectType::ALL.iter().copied().map(CardKind::Effect))
            .collect()
    }
}

/// Tower targeting policy.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetingMode {
    /// Nearest enemy first.
    #[default]
    Closest,
    /// Farthest enemy first.
    Farthest,
    /// Lowest current health first.
    Weakest,
    /// Highest current health first.
    Strongest,
    /// Most advanced along its path first.
    First,
    /// Least advanced along its path first.
    Last,
    /// Uniformly shuffled.
    Random,
}

impl TargetingMode {
    /// Every targeting mode.
    pub const ALL: [TargetingMode; 7] = [
        TargetingMode::Closest,
        TargetingMode::Farthest,
        TargetingMode::Weakest,
        TargetingMode::Strongest,
        TargetingMode::First,
        TargetingMode::Last,
        TargetingMode::Random,
    ];

    /// Canonical wire name of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Closest => "CLOSEST",
            Self::Farthest => "FARTHEST",
            Self::Weakest => "WEAKEST",
            Self::Strongest => "STRONGEST",
            Self::First => "FIRST",
            Self::Last => "LAST",
            Self::Random => "RANDOM",
        }
    }
}

impl fmt::Display for TargetingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a targeting mode name is not part of the known set.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown targeting mode `{0}`")]
pub struct ParseTargetingModeError(pub String);

impl FromStr for TargetingMode {
    type Err = ParseTargetingModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        TargetingMode::ALL
            .iter()
            .copied()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseTargetingModeError(trimmed.to_owned()))
    }
}

/// Behavioural tags attached to enemy templates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyTrait {
    /// No special behaviour.
    Normal,
    /// Carries armor.
    Armored,
    /// Moves quickly.
    Fast,
    /// Resists acid damage.
    Magical,
    /// Hidden from towers without detection.
    Invisible,
    /// Periodically heals neighbours.
    Healer,
}

/// Enemy archetypes composed into waves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Basic infantry.
    Goblin,
    /// Armored brute.
    Orc,
    /// Fast runner.
    Scout,
    /// Magic-resistant caster.
    Mage,
    /// Invisible skirmisher.
    Assassin,
    /// Healer supporting nearby enemies.
    Shaman,
    /// Fast and armored hybrid.
    ArmoredScout,
}

impl EnemyKind {
    /// Unscaled template of the enemy archetype.
    #[must_use]
    pub const fn template(self) -> EnemyTemplate {
        match self {
            Self::Goblin => EnemyTemplate::new(100.0, 50.0, 0.0, 0.0, 10, &[EnemyTrait::Normal]),
            Self::Orc => EnemyTemplate::new(150.0, 40.0, 5.0, 0.0, 15, &[EnemyTrait::Armored]),
            Self::Scout => EnemyTemplate::new(80.0, 80.0, 0.0, 0.0, 12, &[EnemyTrait::Fast]),
            Self::Mage => EnemyTemplate::new(120.0, 45.0, 0.0, 50.0, 20, &[EnemyTrait::Magical]),
            Self::Assassin => {
                EnemyTemplate::new(90.0, 60.0, 0.0, 0.0, 18, &[EnemyTrait::Invisible])
            }
            Self::Shaman => EnemyTemplate::new(100.0, 45.0, 0.0, 20.0, 22, &[EnemyTrait::Healer]),
            Self::ArmoredScout => EnemyTemplate::new(
                110.0,
                65.0,
                3.0,
                0.0,
                25,
                &[EnemyTrait::Fast, EnemyTrait::Armored],
            ),
        }
    }
}

/// Base statistics of an enemy archetype before wave scaling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyTemplate {
    /// Starting health.
    pub health: f32,
    /// Movement speed in pixels per second.
    pub speed: f32,
    /// Flat damage reduction.
    pub armor: f32,
    /// Percentage reduction of acid damage.
    pub magic_resist: f32,
    /// Reward granted when killed.
    pub reward: u32,
    /// Behavioural tags.
    pub traits: &'static [EnemyTrait],
}

impl EnemyTemplate {
    const fn new(
        health: f32,
        speed: f32,
        armor: f32,
        magic_resist: f32,
        reward: u32,
        traits: &'static [EnemyTrait],
    ) -> Self {
        Self {
            health,
            speed,
            armor,
            magic_resist,
            reward,
            traits,
        }
    }

    /// Reports whether the template carries the provided trait.
    #[must_use]
    pub fn has_trait(&self, tag: EnemyTrait) -> bool {
        self.traits.contains(&tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targeting_mode_parses_case_insensitively() {
        assert_eq!("closest".parse(), Ok(TargetingMode::Closest));
        assert_eq!(" RANDOM ".parse(), Ok(TargetingMode::Random));
        assert_eq!(
            "sideways".parse::<TargetingMode>(),
            Err(ParseTargetingModeError("sideways".to_owned()))
        );
    }

    #[test]
    fn catalog_lists_every_card_once() {
        let catalog = CardKind::catalog();
        assert_eq!(catalog.len(), TowerType::ALL.len() + EffectType::ALL.len());
        assert!(catalog.contains(&CardKind::Tower(TowerType::AntiHeal)));
        assert!(catalog.contains(&CardKind::Effect(EffectType::QualityUpgrade)));
    }

    #[test]
    fn only_acid_respects_magic_resist() {
        let acid: Vec<_> = TowerType::ALL
            .iter()
            .filter(|kind| kind.deals_acid_damage())
            .collect();
        assert_eq!(acid, vec![&TowerType::Acid]);
    }

    #[test]
    fn armored_scout_is_fast_and_armored() {
        let template = EnemyKind::ArmoredScout.template();
        assert!(template.has_trait(EnemyTrait::Fast));
        assert!(template.has_trait(EnemyTrait::Armored));
        assert!(!template.has_trait(EnemyTrait::Invisible));
    }
}
