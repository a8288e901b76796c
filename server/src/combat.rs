//! Targeting and attack resolution.
//!
//! `CombatSystem` only reads tower and enemy state. An attack is described
//! by an [`AttackResult`]; applying it (damage, statuses, reactions, the
//! tower's attack stamp) is the caller's job.

use crate::enemy::EnemySystem;
use crate::tower::TowerSystem;
use log::{error, warn};
use shared::{
    Catalog, Element, EnemyId, EnemyState, OnHitEffect, TargetType, TargetingMode, TowerConfig,
    TowerId, TowerState, TowerStats, Vector2, TICK_RATE,
};
use std::cmp::Ordering;
use std::sync::Arc;

/// Everything the caller needs to resolve one shot.
#[derive(Debug, Clone, PartialEq)]
pub struct AttackResult {
    pub tower_id: TowerId,
    pub target_id: EnemyId,
    /// Primary damage including aura bonuses, before armor and resistance.
    pub damage: f64,
    pub element: Option<Element>,
    pub splash_targets: Vec<EnemyId>,
    pub on_hit: Vec<OnHitEffect>,
    pub tower_position: Vector2,
    pub target_position: Vector2,
}

pub struct CombatSystem {
    catalog: Arc<Catalog>,
}

impl CombatSystem {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    fn config(&self, tower: &TowerState) -> Option<&TowerConfig> {
        let config = self.catalog.tower(&tower.config_id);
        if config.is_none() {
            error!(
                "Tower {} references unknown config '{}'",
                tower.id, tower.config_id
            );
        }
        config
    }

    /// Stats of the tower at its current tier.
    pub fn stats_for(&self, tower: &TowerState) -> Option<TowerStats> {
        self.config(tower)
            .map(|config| tiered_stats(config, tower.tier))
    }

    pub fn get_damage(&self, tower: &TowerState) -> f64 {
        self.stats_for(tower).map(|s| s.damage).unwrap_or(0.0)
    }

    pub fn get_on_hit_effects(&self, tower: &TowerState) -> Vec<OnHitEffect> {
        self.stats_for(tower).map(|s| s.on_hit).unwrap_or_default()
    }

    /// Alive enemies other than `primary` within splash radius of the
    /// primary's position.
    pub fn get_splash_targets(
        &self,
        tower: &TowerState,
        primary: EnemyId,
        enemies: &EnemySystem,
    ) -> Vec<EnemyId> {
        let radius = self.stats_for(tower).map(|s| s.splash_radius).unwrap_or(0.0);
        splash_targets(radius, primary, enemies)
    }

    pub fn find_target(
        &self,
        tower: &TowerState,
        enemies: &EnemySystem,
        mode: TargetingMode,
    ) -> Option<EnemyId> {
        let config = self.config(tower)?;
        let range = tiered_stats(config, tower.tier).range;
        select_target(tower.position(), range, config.target_type, mode, enemies.alive())
    }

    pub fn can_fire(&self, tower: &TowerState, tick: u64) -> bool {
        self.stats_for(tower)
            .map(|s| can_fire(tower.last_attack_tick, s.attack_period_sec, tick))
            .unwrap_or(false)
    }

    /// `1 + bonus` summed over every other tower whose aura reaches this one.
    pub fn damage_multiplier(&self, tower: &TowerState, towers: &TowerSystem) -> f64 {
        let position = tower.position();
        let bonus: f64 = towers
            .iter()
            .filter(|other| other.id != tower.id)
            .filter_map(|other| {
                let config = self.catalog.tower(&other.config_id)?;
                config.aura.as_ref()?;
                let aura = tiered_stats(config, other.tier).aura?;
                (other.position().distance(&position) <= aura.radius).then_some(aura.damage_bonus)
            })
            .sum();
        1.0 + bonus
    }

    /// Resolves one attack attempt. Returns `None` when the tower is on
    /// cooldown, cannot attack at all, or has nothing in range.
    pub fn process_attack(
        &self,
        tower: &TowerState,
        towers: &TowerSystem,
        enemies: &EnemySystem,
        tick: u64,
    ) -> Option<AttackResult> {
        let config = self.config(tower)?;
        let stats = tiered_stats(config, tower.tier);
        if !can_fire(tower.last_attack_tick, stats.attack_period_sec, tick) {
            return None;
        }

        let target_id = select_target(
            tower.position(),
            stats.range,
            config.target_type,
            tower.targeting(),
            enemies.alive(),
        )?;
        let target = enemies.get(target_id)?;

        Some(AttackResult {
            tower_id: tower.id,
            target_id,
            damage: stats.damage * self.damage_multiplier(tower, towers),
            element: config.element,
            splash_targets: splash_targets(stats.splash_radius, target_id, enemies),
            on_hit: stats.on_hit,
            tower_position: tower.position(),
            target_position: target.position,
        })
    }
}

/// Base stats with the upgrade deltas of tiers 2..=`tier` applied in order.
pub fn tiered_stats(config: &TowerConfig, tier: u8) -> TowerStats {
    let mut stats = config.base_stats();
    for t in 2..=tier {
        let Some(upgrade) = config.upgrade_for_tier(t) else {
            continue;
        };
        for delta in &upgrade.deltas {
            if !delta.apply_to(&mut stats) {
                warn!(
                    "{} tier {} delta {:?} has no matching field",
                    config.id, t, delta.field
                );
            }
        }
    }
    stats
}

/// Whole ticks between shots; periods of zero or less never fire.
pub fn can_fire(last_attack_tick: u64, attack_period_sec: f64, tick: u64) -> bool {
    if attack_period_sec <= 0.0 {
        return false;
    }
    let cooldown_ticks = (attack_period_sec * TICK_RATE as f64).floor() as u64;
    tick.saturating_sub(last_attack_tick) >= cooldown_ticks
}

/// Picks a target among `candidates` in range (inclusive) that the tower can
/// hit. Candidates are expected in id order; full ties go to the first seen.
pub fn select_target<'a>(
    origin: Vector2,
    range: f64,
    target_type: TargetType,
    mode: TargetingMode,
    candidates: impl Iterator<Item = &'a EnemyState>,
) -> Option<EnemyId> {
    let mut best: Option<(&EnemyState, f64)> = None;

    for enemy in candidates {
        if !enemy.alive || !target_type.can_hit(enemy.is_flying()) {
            continue;
        }
        let distance = enemy.position.distance(&origin);
        if distance > range {
            continue;
        }
        let replace = match best {
            None => true,
            Some((current, current_distance)) => {
                rank(mode, enemy, distance, current, current_distance) == Ordering::Greater
            }
        };
        if replace {
            best = Some((enemy, distance));
        }
    }

    best.map(|(enemy, _)| enemy.id)
}

fn rank(
    mode: TargetingMode,
    a: &EnemyState,
    a_dist: f64,
    b: &EnemyState,
    b_dist: f64,
) -> Ordering {
    let nearer = b_dist.total_cmp(&a_dist);
    match mode {
        TargetingMode::First => a.path_progress().total_cmp(&b.path_progress()).then(nearer),
        TargetingMode::Last => b.path_progress().total_cmp(&a.path_progress()).then(nearer),
        TargetingMode::Strongest => a.hp.total_cmp(&b.hp),
        TargetingMode::Weakest => b.hp.total_cmp(&a.hp),
        TargetingMode::Closest => nearer,
    }
}

fn splash_targets(radius: f64, primary: EnemyId, enemies: &EnemySystem) -> Vec<EnemyId> {
    if radius <= 0.0 {
        return Vec::new();
    }
    let Some(center) = enemies.get(primary).map(|e| e.position) else {
        return Vec::new();
    };
    enemies
        .alive_within(center, radius)
        .into_iter()
        .filter(|id| *id != primary)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use shared::{EnemyTag, EnemyType};
    use std::collections::BTreeMap;

    fn combat() -> (CombatSystem, Arc<Catalog>) {
        let catalog = Arc::new(Catalog::standard());
        (CombatSystem::new(catalog.clone()), catalog)
    }

    fn tower(config_id: &str, x: i32, y: i32, tier: u8) -> TowerState {
        TowerState {
            id: 1,
            config_id: config_id.to_string(),
            owner_id: 1,
            tier,
            x,
            y,
            last_attack_tick: 0,
            targeting_mode: None,
            current_target: None,
            investment: 0,
        }
    }

    /// Enemies on a straight path along y = 11, each ending up at its
    /// requested x after one second of travel.
    fn enemies_at(spots: &[(f64, f64)]) -> EnemySystem {
        let mut enemies = EnemySystem::new(vec![Vector2::new(0.0, 11.0), Vector2::new(30.0, 11.0)]);
        for (x, hp) in spots {
            enemies.spawn_enemy(
                EnemyType::Grunt,
                *hp,
                *x,
                0.0,
                vec![EnemyTag::Ground],
                BTreeMap::new(),
            );
        }
        enemies.update(1.0);
        enemies
    }

    #[test]
    fn test_stats_accumulate_by_tier() {
        let catalog = Catalog::standard();
        let arrow = catalog.tower("arrow_tower").unwrap();

        let t1 = tiered_stats(arrow, 1);
        assert_approx_eq!(t1.damage, 10.0);

        let t2 = tiered_stats(arrow, 2);
        assert_approx_eq!(t2.damage, 15.0);
        assert_approx_eq!(t2.range, 4.0);

        let t3 = tiered_stats(arrow, 3);
        assert_approx_eq!(t3.damage, 23.0);
        assert_approx_eq!(t3.attack_period_sec, 0.68);
        assert_approx_eq!(arrow.attack_period_sec, 0.8);
    }

    #[test]
    fn test_on_hit_deltas_do_not_touch_catalog() {
        let (combat, catalog) = combat();
        let fire = tower("fire_tower", 4, 11, 3);

        let effects = combat.get_on_hit_effects(&fire);
        assert_eq!(
            effects,
            vec![OnHitEffect::Burn {
                dps: 7.0,
                duration_sec: 5.0
            }]
        );
        assert_eq!(
            catalog.tower("fire_tower").unwrap().on_hit[0],
            OnHitEffect::Burn {
                dps: 4.0,
                duration_sec: 3.0
            }
        );
        assert_approx_eq!(combat.get_damage(&fire), 18.0);
    }

    #[test]
    fn test_can_fire_formula() {
        // 0.8 s at 20 Hz is 16 ticks.
        assert!(!can_fire(100, 0.8, 115));
        assert!(can_fire(100, 0.8, 116));
        assert!(can_fire(0, 2.0, 40));
        assert!(!can_fire(0, 0.0, 1_000));
        assert!(!can_fire(0, -1.0, 1_000));

        let (combat, _) = combat();
        assert!(!combat.can_fire(&tower("war_drum", 4, 11, 1), 1_000));
        assert!(!combat.can_fire(&tower("missing", 4, 11, 1), 1_000));
    }

    #[test]
    fn test_range_is_inclusive() {
        let (combat, _) = combat();
        let arrow = tower("arrow_tower", 4, 11, 1);

        let enemies = enemies_at(&[(7.5, 30.0)]);
        assert_eq!(combat.find_target(&arrow, &enemies, TargetingMode::First), Some(1));

        let enemies = enemies_at(&[(7.6, 30.0)]);
        assert_eq!(combat.find_target(&arrow, &enemies, TargetingMode::First), None);
    }

    #[test]
    fn test_targeting_modes() {
        let (combat, _) = combat();
        let arrow = tower("arrow_tower", 4, 11, 1);
        // ids 1..=3 at x = 2, 5, 6
        let enemies = enemies_at(&[(2.0, 50.0), (5.0, 10.0), (6.0, 30.0)]);

        assert_eq!(combat.find_target(&arrow, &enemies, TargetingMode::First), Some(3));
        assert_eq!(combat.find_target(&arrow, &enemies, TargetingMode::Last), Some(1));
        assert_eq!(combat.find_target(&arrow, &enemies, TargetingMode::Strongest), Some(1));
        assert_eq!(combat.find_target(&arrow, &enemies, TargetingMode::Weakest), Some(2));
        assert_eq!(combat.find_target(&arrow, &enemies, TargetingMode::Closest), Some(2));
    }

    #[test]
    fn test_ties_go_to_lower_id() {
        let (combat, _) = combat();
        let arrow = tower("arrow_tower", 4, 11, 1);
        let enemies = enemies_at(&[(5.0, 20.0), (5.0, 20.0)]);

        for mode in [
            TargetingMode::First,
            TargetingMode::Last,
            TargetingMode::Strongest,
            TargetingMode::Weakest,
            TargetingMode::Closest,
        ] {
            assert_eq!(combat.find_target(&arrow, &enemies, mode), Some(1));
        }
    }

    #[test]
    fn test_ground_towers_ignore_flyers() {
        let (combat, _) = combat();
        let cannon = tower("cannon_tower", 4, 11, 1);
        let mut enemies = EnemySystem::new(vec![Vector2::new(5.0, 11.0), Vector2::new(30.0, 11.0)]);
        enemies.spawn_enemy(
            EnemyType::Flyer,
            30.0,
            1.0,
            0.0,
            vec![EnemyTag::Flying],
            BTreeMap::new(),
        );

        assert_eq!(combat.find_target(&cannon, &enemies, TargetingMode::First), None);
        assert_eq!(
            combat.find_target(&tower("arrow_tower", 4, 11, 1), &enemies, TargetingMode::First),
            Some(1)
        );
    }

    #[test]
    fn test_splash_targets_center_on_primary() {
        let (combat, _) = combat();
        let cannon = tower("cannon_tower", 4, 11, 1);
        let enemies = enemies_at(&[(6.0, 30.0), (7.0, 30.0), (8.0, 30.0), (4.0, 30.0)]);

        let mut splash = combat.get_splash_targets(&cannon, 2, &enemies);
        splash.sort();
        assert_eq!(splash, vec![1, 3]);
        assert!(combat
            .get_splash_targets(&tower("arrow_tower", 4, 11, 1), 2, &enemies)
            .is_empty());
    }

    #[test]
    fn test_process_attack_is_read_only() {
        let (combat, catalog) = combat();
        let towers = TowerSystem::new(catalog);
        let arrow = tower("arrow_tower", 4, 11, 1);
        let enemies = enemies_at(&[(5.0, 30.0)]);

        let attack = combat.process_attack(&arrow, &towers, &enemies, 20).unwrap();
        assert_eq!(attack.tower_id, 1);
        assert_eq!(attack.target_id, 1);
        assert_approx_eq!(attack.damage, 10.0);
        assert!(attack.splash_targets.is_empty());
        assert_approx_eq!(attack.target_position.x, 5.0);
        assert_approx_eq!(attack.target_position.y, 11.0);
        assert_approx_eq!(enemies.get(1).unwrap().hp, 30.0);

        assert!(combat.process_attack(&arrow, &towers, &enemies, 10).is_none());
    }

    #[test]
    fn test_war_drum_amplifies_neighbours() {
        let (combat, catalog) = combat();
        let mut towers = TowerSystem::new(catalog);
        let arrow_id = towers.place_tower("arrow_tower", 4, 11, 1).unwrap();
        towers.place_tower("war_drum", 5, 12, 1).unwrap();
        let far_id = towers.place_tower("arrow_tower", 21, 6, 1).unwrap();

        let arrow = towers.get(arrow_id).unwrap();
        assert_approx_eq!(combat.damage_multiplier(arrow, &towers), 1.15);
        let far = towers.get(far_id).unwrap();
        assert_approx_eq!(combat.damage_multiplier(far, &towers), 1.0);

        let enemies = enemies_at(&[(5.0, 30.0)]);
        let attack = combat.process_attack(arrow, &towers, &enemies, 20).unwrap();
        assert_approx_eq!(attack.damage, 11.5);
    }
}
