//! Static match configuration: towers, waves, the map and reaction rules.
//!
//! Upgrades are described by structured deltas rather than strings: each
//! [`StatDelta`] names a [`FieldPath`] inside a [`TowerStats`] block and a
//! [`DeltaOp`] to apply to it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::geometry::Vector2;
use crate::state::EnemyStatus;
use crate::types::*;

/// Effect attached to a tower's hits.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum OnHitEffect {
    Burn { dps: f64, duration_sec: f64 },
    Soak { duration_sec: f64 },
    Chill { slow: f64, duration_sec: f64 },
    Poison { dps: f64, duration_sec: f64 },
}

impl OnHitEffect {
    pub fn element(&self) -> Element {
        self.status_kind().element()
    }

    pub fn status_kind(&self) -> StatusKind {
        match self {
            OnHitEffect::Burn { .. } => StatusKind::Burning,
            OnHitEffect::Soak { .. } => StatusKind::Soaked,
            OnHitEffect::Chill { .. } => StatusKind::Cold,
            OnHitEffect::Poison { .. } => StatusKind::Toxin,
        }
    }

    /// Builds the single-stack status this effect applies.
    pub fn to_status(&self) -> EnemyStatus {
        let mut status = match self {
            OnHitEffect::Burn { duration_sec, .. }
            | OnHitEffect::Soak { duration_sec }
            | OnHitEffect::Chill { duration_sec, .. }
            | OnHitEffect::Poison { duration_sec, .. } => {
                EnemyStatus::new(self.status_kind(), *duration_sec)
            }
        };
        match self {
            OnHitEffect::Burn { dps, .. } | OnHitEffect::Poison { dps, .. } => status.dps = *dps,
            OnHitEffect::Chill { slow, .. } => status.slow = *slow,
            OnHitEffect::Soak { .. } => {}
        }
        status
    }

    fn dps_mut(&mut self) -> Option<&mut f64> {
        match self {
            OnHitEffect::Burn { dps, .. } | OnHitEffect::Poison { dps, .. } => Some(dps),
            _ => None,
        }
    }

    fn slow_mut(&mut self) -> Option<&mut f64> {
        match self {
            OnHitEffect::Chill { slow, .. } => Some(slow),
            _ => None,
        }
    }

    fn duration_mut(&mut self) -> &mut f64 {
        match self {
            OnHitEffect::Burn { duration_sec, .. }
            | OnHitEffect::Soak { duration_sec }
            | OnHitEffect::Chill { duration_sec, .. }
            | OnHitEffect::Poison { duration_sec, .. } => duration_sec,
        }
    }
}

/// Damage amplification projected by support towers onto their neighbours.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Aura {
    pub radius: f64,
    /// Added to the damage multiplier of every other tower in radius.
    pub damage_bonus: f64,
}

/// Addressable numeric fields of a tower's combat stats.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum FieldPath {
    BaseDamage,
    Range,
    AttackPeriodSec,
    SplashRadius,
    OnHitDps(usize),
    OnHitDurationSec(usize),
    OnHitSlow(usize),
    AuraRadius,
    AuraBonus,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub enum DeltaOp {
    Add(f64),
    /// Scales the field by `1 + factor`; `-0.15` removes 15%.
    MultiplyFactor(f64),
}

impl DeltaOp {
    pub fn apply(&self, value: f64) -> f64 {
        match self {
            DeltaOp::Add(amount) => value + amount,
            DeltaOp::MultiplyFactor(factor) => value * (1.0 + factor),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct StatDelta {
    pub field: FieldPath,
    pub op: DeltaOp,
}

impl StatDelta {
    pub const fn new(field: FieldPath, op: DeltaOp) -> Self {
        Self { field, op }
    }

    /// Applies the delta in place. Returns false when the field does not
    /// exist on these stats (for example a dps delta on a soak effect).
    pub fn apply_to(&self, stats: &mut TowerStats) -> bool {
        let slot: Option<&mut f64> = match self.field {
            FieldPath::BaseDamage => Some(&mut stats.damage),
            FieldPath::Range => Some(&mut stats.range),
            FieldPath::AttackPeriodSec => Some(&mut stats.attack_period_sec),
            FieldPath::SplashRadius => Some(&mut stats.splash_radius),
            FieldPath::OnHitDps(i) => stats.on_hit.get_mut(i).and_then(|e| e.dps_mut()),
            FieldPath::OnHitDurationSec(i) => stats.on_hit.get_mut(i).map(|e| e.duration_mut()),
            FieldPath::OnHitSlow(i) => stats.on_hit.get_mut(i).and_then(|e| e.slow_mut()),
            FieldPath::AuraRadius => stats.aura.as_mut().map(|a| &mut a.radius),
            FieldPath::AuraBonus => stats.aura.as_mut().map(|a| &mut a.damage_bonus),
        };
        match slot {
            Some(value) => {
                *value = self.op.apply(*value);
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TowerUpgrade {
    pub tier: u8,
    pub cost: u32,
    pub deltas: Vec<StatDelta>,
}

/// Combat stats of a tower at some tier.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TowerStats {
    pub damage: f64,
    pub range: f64,
    pub attack_period_sec: f64,
    pub splash_radius: f64,
    pub on_hit: Vec<OnHitEffect>,
    pub aura: Option<Aura>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TowerConfig {
    pub id: String,
    pub name: String,
    pub cost: u32,
    /// Class a player must have picked to build this tower.
    pub required_class: Option<Element>,
    pub element: Option<Element>,
    pub target_type: TargetType,
    pub base_damage: f64,
    pub range: f64,
    /// Seconds between attacks; zero or less never attacks.
    pub attack_period_sec: f64,
    pub splash_radius: f64,
    pub on_hit: Vec<OnHitEffect>,
    pub aura: Option<Aura>,
    pub upgrades: Vec<TowerUpgrade>,
}

impl TowerConfig {
    /// Tier 1 stats. The returned block owns its own copy of the effects.
    pub fn base_stats(&self) -> TowerStats {
        TowerStats {
            damage: self.base_damage,
            range: self.range,
            attack_period_sec: self.attack_period_sec,
            splash_radius: self.splash_radius,
            on_hit: self.on_hit.clone(),
            aura: self.aura.clone(),
        }
    }

    pub fn upgrade_for_tier(&self, tier: u8) -> Option<&TowerUpgrade> {
        self.upgrades.iter().find(|u| u.tier == tier)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WaveGroup {
    pub enemy_type: EnemyType,
    pub count: u32,
    pub hp: f64,
    pub speed: f64,
    pub armor: f64,
    pub tags: Vec<EnemyTag>,
    pub spawn_interval_sec: f64,
    pub resistances: BTreeMap<Element, f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WaveConfig {
    pub wave: u32,
    pub groups: Vec<WaveGroup>,
    pub bounty_gold: u32,
    pub telegraph: String,
}

impl WaveConfig {
    pub fn enemy_count(&self) -> u32 {
        self.groups.iter().map(|g| g.count).sum()
    }
}

/// Rectangle of tiles `[x, x + width) x [y, y + height)` open for building
/// once the match has at least `min_players` players.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BuildZone {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub min_players: usize,
}

impl BuildZone {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MapConfig {
    pub width: i32,
    pub height: i32,
    pub waypoints: Vec<Vector2>,
    pub build_zones: Vec<BuildZone>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum ReactionEffect {
    DamageMultiplier { factor: f64 },
    ApplyStatus { status: StatusKind, duration_sec: f64 },
    AoeBurst { damage: f64, radius: f64 },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ReactionConfig {
    pub kind: ReactionKind,
    pub trigger: Element,
    pub required_status: StatusKind,
    pub effect: ReactionEffect,
    pub consumes_status: bool,
    /// Lower fires first.
    pub priority: u32,
}

/// Everything that defines a match apart from who is playing.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Catalog {
    pub towers: Vec<TowerConfig>,
    pub waves: Vec<WaveConfig>,
    pub map: MapConfig,
    pub reactions: Vec<ReactionConfig>,
}

impl Catalog {
    pub fn tower(&self, config_id: &str) -> Option<&TowerConfig> {
        self.towers.iter().find(|t| t.id == config_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn stats() -> TowerStats {
        TowerStats {
            damage: 10.0,
            range: 3.0,
            attack_period_sec: 1.0,
            splash_radius: 0.0,
            on_hit: vec![
                OnHitEffect::Burn {
                    dps: 4.0,
                    duration_sec: 3.0,
                },
                OnHitEffect::Soak { duration_sec: 2.0 },
            ],
            aura: None,
        }
    }

    #[test]
    fn test_add_and_multiply() {
        let mut s = stats();
        assert!(StatDelta::new(FieldPath::BaseDamage, DeltaOp::Add(5.0)).apply_to(&mut s));
        assert!(
            StatDelta::new(FieldPath::AttackPeriodSec, DeltaOp::MultiplyFactor(-0.15))
                .apply_to(&mut s)
        );
        assert_approx_eq!(s.damage, 15.0);
        assert_approx_eq!(s.attack_period_sec, 0.85);
    }

    #[test]
    fn test_nested_on_hit_fields() {
        let mut s = stats();
        assert!(StatDelta::new(FieldPath::OnHitDps(0), DeltaOp::Add(2.0)).apply_to(&mut s));
        assert!(
            StatDelta::new(FieldPath::OnHitDurationSec(1), DeltaOp::Add(1.0)).apply_to(&mut s)
        );
        assert_eq!(
            s.on_hit[0],
            OnHitEffect::Burn {
                dps: 6.0,
                duration_sec: 3.0
            }
        );
        assert_eq!(s.on_hit[1], OnHitEffect::Soak { duration_sec: 3.0 });
    }

    #[test]
    fn test_missing_fields_are_reported() {
        let mut s = stats();
        let before = s.clone();
        assert!(!StatDelta::new(FieldPath::OnHitDps(1), DeltaOp::Add(1.0)).apply_to(&mut s));
        assert!(!StatDelta::new(FieldPath::OnHitDps(7), DeltaOp::Add(1.0)).apply_to(&mut s));
        assert!(!StatDelta::new(FieldPath::AuraBonus, DeltaOp::Add(1.0)).apply_to(&mut s));
        assert_eq!(s, before);
    }

    #[test]
    fn test_build_zone_bounds() {
        let zone = BuildZone {
            x: 2,
            y: 3,
            width: 4,
            height: 2,
            min_players: 1,
        };
        assert!(zone.contains(2, 3));
        assert!(zone.contains(5, 4));
        assert!(!zone.contains(6, 4));
        assert!(!zone.contains(2, 5));
        assert!(!zone.contains(1, 3));
    }

    #[test]
    fn test_on_hit_status_conversion() {
        let chill = OnHitEffect::Chill {
            slow: 0.4,
            duration_sec: 2.0,
        };
        let status = chill.to_status();
        assert_eq!(status.kind, StatusKind::Cold);
        assert_eq!(status.element, Element::Ice);
        assert_eq!(status.stacks, 1);
        assert_approx_eq!(status.slow, 0.4);
        assert_approx_eq!(status.remaining_sec, 2.0);
    }
}
