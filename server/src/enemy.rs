//! Enemy registry: spawning, path following, statuses and damage bookkeeping.
//!
//! Dead enemies (killed or leaked) stay in the registry with `alive == false`
//! until `clear_dead` runs, so anything that happened to them during the tick
//! they died in can still be looked up.

use log::debug;
use shared::{
    EnemyId, EnemyState, EnemyStatus, EnemyTag, EnemyType, Element, StatusKind, Vector2,
    MAX_STATUS_STACKS,
};
use std::collections::BTreeMap;

/// Result of a successful hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageDealt {
    /// Damage after armor, never below 1.
    pub amount: f64,
    pub killed: bool,
}

pub struct EnemySystem {
    waypoints: Vec<Vector2>,
    enemies: BTreeMap<EnemyId, EnemyState>,
    next_enemy_id: EnemyId,
    leaked: Vec<EnemyId>,
    status_kills: Vec<EnemyId>,
}

impl EnemySystem {
    pub fn new(waypoints: Vec<Vector2>) -> Self {
        Self {
            waypoints,
            enemies: BTreeMap::new(),
            next_enemy_id: 1,
            leaked: Vec::new(),
            status_kills: Vec::new(),
        }
    }

    /// Creates an enemy at the first waypoint with full health.
    pub fn spawn_enemy(
        &mut self,
        enemy_type: EnemyType,
        hp: f64,
        speed: f64,
        armor: f64,
        tags: Vec<EnemyTag>,
        resistances: BTreeMap<Element, f64>,
    ) -> EnemyId {
        let id = self.next_enemy_id;
        self.next_enemy_id += 1;

        let enemy = EnemyState {
            id,
            enemy_type,
            hp,
            max_hp: hp,
            speed,
            armor,
            position: self.waypoints.first().copied().unwrap_or_default(),
            waypoint_index: 0,
            progress: 0.0,
            statuses: Vec::new(),
            alive: true,
            tags,
            resistances,
        };
        debug!("Spawned {} {} with {} hp", enemy_type, id, hp);
        self.enemies.insert(id, enemy);
        id
    }

    /// Moves every alive enemy, applies status damage and ticks statuses down.
    ///
    /// The leaked and status-kill lists are rebuilt from scratch on each call.
    pub fn update(&mut self, dt: f64) {
        self.leaked.clear();
        self.status_kills.clear();

        for enemy in self.enemies.values_mut() {
            if !enemy.alive {
                continue;
            }

            let speed = effective_speed(enemy);

            let status_damage: f64 = enemy
                .statuses
                .iter()
                .map(|s| s.dps * s.stacks as f64 * dt * (1.0 - enemy.resistance(s.element)))
                .sum();
            if status_damage > 0.0 {
                enemy.hp = (enemy.hp - status_damage).max(0.0);
                if enemy.hp <= 0.0 {
                    enemy.alive = false;
                    self.status_kills.push(enemy.id);
                }
            }

            for status in &mut enemy.statuses {
                status.remaining_sec -= dt;
            }
            enemy.statuses.retain(|s| s.remaining_sec > 0.0);

            if !enemy.alive {
                continue;
            }

            if advance_along_path(enemy, &self.waypoints, speed * dt) {
                enemy.alive = false;
                self.leaked.push(enemy.id);
            }
        }
    }

    /// Enemies that passed the last waypoint during the latest `update`.
    pub fn leaked(&self) -> &[EnemyId] {
        &self.leaked
    }

    /// Enemies killed by burning or toxin during the latest `update`.
    pub fn status_kills(&self) -> &[EnemyId] {
        &self.status_kills
    }

    /// Deals `raw_damage` minus armor, with a floor of 1. Returns `None` for
    /// unknown or already dead enemies.
    pub fn damage_enemy(&mut self, id: EnemyId, raw_damage: f64) -> Option<DamageDealt> {
        let enemy = self.enemies.get_mut(&id).filter(|e| e.alive)?;
        let amount = (raw_damage - enemy.armor).max(1.0);
        enemy.hp = (enemy.hp - amount).max(0.0);
        let killed = enemy.hp <= 0.0;
        if killed {
            enemy.alive = false;
        }
        Some(DamageDealt { amount, killed })
    }

    /// Adds a status, merging with an existing one of the same kind: stacks
    /// add up to the cap and the longer duration wins.
    pub fn apply_status(&mut self, id: EnemyId, status: EnemyStatus) -> bool {
        let Some(enemy) = self.enemies.get_mut(&id).filter(|e| e.alive) else {
            return false;
        };

        match enemy.statuses.iter_mut().find(|s| s.kind == status.kind) {
            Some(existing) => {
                existing.stacks = (existing.stacks + status.stacks).min(MAX_STATUS_STACKS);
                existing.remaining_sec = existing.remaining_sec.max(status.remaining_sec);
                existing.dps = existing.dps.max(status.dps);
                existing.slow = existing.slow.max(status.slow);
            }
            None => {
                let mut status = status;
                status.stacks = status.stacks.min(MAX_STATUS_STACKS);
                enemy.statuses.push(status);
            }
        }
        true
    }

    pub fn remove_status(&mut self, id: EnemyId, kind: StatusKind) -> bool {
        match self.enemies.get_mut(&id) {
            Some(enemy) => {
                let before = enemy.statuses.len();
                enemy.statuses.retain(|s| s.kind != kind);
                enemy.statuses.len() != before
            }
            None => false,
        }
    }

    /// Drops every dead enemy from the registry. Returns how many were removed.
    pub fn clear_dead(&mut self) -> usize {
        let before = self.enemies.len();
        self.enemies.retain(|_, e| e.alive);
        before - self.enemies.len()
    }

    pub fn get(&self, id: EnemyId) -> Option<&EnemyState> {
        self.enemies.get(&id)
    }

    /// All enemies, dead ones included, in id order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemyState> {
        self.enemies.values()
    }

    pub fn alive(&self) -> impl Iterator<Item = &EnemyState> {
        self.enemies.values().filter(|e| e.alive)
    }

    pub fn alive_count(&self) -> usize {
        self.alive().count()
    }

    /// Alive enemies within `radius` of `center`, in id order.
    pub fn alive_within(&self, center: Vector2, radius: f64) -> Vec<EnemyId> {
        self.alive()
            .filter(|e| e.position.distance(&center) <= radius)
            .map(|e| e.id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }
}

/// Base speed reduced by the strongest chill; frozen enemies do not move.
fn effective_speed(enemy: &EnemyState) -> f64 {
    if enemy.has_status(StatusKind::Frozen) {
        return 0.0;
    }
    let slow = enemy
        .statuses
        .iter()
        .filter(|s| s.kind == StatusKind::Cold)
        .map(|s| s.slow)
        .fold(0.0, f64::max)
        .clamp(0.0, 1.0);
    enemy.speed * (1.0 - slow)
}

/// Walks `enemy` forward by `distance`, crossing as many waypoints as the
/// distance covers. Returns true when it went past the final waypoint.
fn advance_along_path(enemy: &mut EnemyState, waypoints: &[Vector2], distance: f64) -> bool {
    let last = waypoints.len().saturating_sub(1);
    if enemy.waypoint_index >= last {
        return true;
    }

    let mut remaining = distance;
    loop {
        let from = waypoints[enemy.waypoint_index];
        let to = waypoints[enemy.waypoint_index + 1];
        let segment = from.distance(&to);
        let to_next = segment * (1.0 - enemy.progress);

        if remaining > to_next || segment <= f64::EPSILON {
            remaining = (remaining - to_next).max(0.0);
            enemy.waypoint_index += 1;
            enemy.progress = 0.0;
            enemy.position = to;
            if enemy.waypoint_index >= last {
                return true;
            }
        } else {
            enemy.progress += remaining / segment;
            enemy.position = from.lerp(&to, enemy.progress);
            return false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn straight_path() -> Vec<Vector2> {
        vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(10.0, 0.0),
            Vector2::new(10.0, 10.0),
        ]
    }

    fn spawn_grunt(system: &mut EnemySystem, hp: f64, speed: f64, armor: f64) -> EnemyId {
        system.spawn_enemy(
            EnemyType::Grunt,
            hp,
            speed,
            armor,
            vec![EnemyTag::Ground],
            BTreeMap::new(),
        )
    }

    #[test]
    fn test_spawn_starts_at_first_waypoint() {
        let mut system = EnemySystem::new(straight_path());
        let id = spawn_grunt(&mut system, 30.0, 1.0, 0.0);
        let enemy = system.get(id).unwrap();

        assert_eq!(enemy.hp, 30.0);
        assert_eq!(enemy.max_hp, 30.0);
        assert_eq!(enemy.waypoint_index, 0);
        assert_eq!(enemy.progress, 0.0);
        assert_eq!(enemy.position, Vector2::new(0.0, 0.0));
        assert!(enemy.statuses.is_empty());
        assert!(enemy.alive);
    }

    #[test]
    fn test_ids_are_per_registry() {
        let mut a = EnemySystem::new(straight_path());
        let mut b = EnemySystem::new(straight_path());
        assert_eq!(spawn_grunt(&mut a, 1.0, 1.0, 0.0), 1);
        assert_eq!(spawn_grunt(&mut a, 1.0, 1.0, 0.0), 2);
        assert_eq!(spawn_grunt(&mut b, 1.0, 1.0, 0.0), 1);
    }

    #[test]
    fn test_movement_within_segment() {
        let mut system = EnemySystem::new(straight_path());
        let id = spawn_grunt(&mut system, 30.0, 2.0, 0.0);

        system.update(1.0);
        let enemy = system.get(id).unwrap();
        assert_eq!(enemy.waypoint_index, 0);
        assert_approx_eq!(enemy.progress, 0.2);
        assert_approx_eq!(enemy.position.x, 2.0);
    }

    #[test]
    fn test_movement_crosses_multiple_segments() {
        let path = vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(2.0, 0.0),
            Vector2::new(3.0, 0.0),
            Vector2::new(10.0, 0.0),
        ];
        let mut system = EnemySystem::new(path);
        let id = spawn_grunt(&mut system, 30.0, 4.0, 0.0);

        system.update(1.0);
        let enemy = system.get(id).unwrap();
        assert_eq!(enemy.waypoint_index, 3);
        assert_approx_eq!(enemy.progress, 1.0 / 7.0);
        assert_approx_eq!(enemy.position.x, 4.0);
        assert!(enemy.alive);
    }

    #[test]
    fn test_leak_past_final_waypoint() {
        let mut system = EnemySystem::new(straight_path());
        let id = spawn_grunt(&mut system, 30.0, 25.0, 0.0);

        system.update(1.0);
        assert_eq!(system.leaked(), &[id]);
        assert!(!system.get(id).unwrap().alive);

        // Not accumulated across ticks.
        system.update(1.0);
        assert!(system.leaked().is_empty());
    }

    #[test]
    fn test_damage_respects_armor_floor() {
        let mut system = EnemySystem::new(straight_path());
        let id = spawn_grunt(&mut system, 30.0, 1.0, 5.0);

        let hit = system.damage_enemy(id, 12.0).unwrap();
        assert_approx_eq!(hit.amount, 7.0);
        assert!(!hit.killed);

        let chip = system.damage_enemy(id, 2.0).unwrap();
        assert_approx_eq!(chip.amount, 1.0);
        assert_approx_eq!(system.get(id).unwrap().hp, 22.0);
    }

    #[test]
    fn test_damage_kills_and_clamps() {
        let mut system = EnemySystem::new(straight_path());
        let id = spawn_grunt(&mut system, 5.0, 1.0, 0.0);

        let hit = system.damage_enemy(id, 50.0).unwrap();
        assert!(hit.killed);
        let enemy = system.get(id).unwrap();
        assert_eq!(enemy.hp, 0.0);
        assert!(!enemy.alive);

        assert!(system.damage_enemy(id, 1.0).is_none());
        assert!(system.damage_enemy(999, 1.0).is_none());
    }

    #[test]
    fn test_clear_dead_removes_only_dead() {
        let mut system = EnemySystem::new(straight_path());
        let dead = spawn_grunt(&mut system, 1.0, 1.0, 0.0);
        let alive = spawn_grunt(&mut system, 10.0, 1.0, 0.0);
        system.damage_enemy(dead, 5.0);

        assert!(system.get(dead).is_some());
        assert_eq!(system.alive_count(), 1);
        assert_eq!(system.clear_dead(), 1);
        assert!(system.get(dead).is_none());
        assert!(system.get(alive).is_some());
    }

    #[test]
    fn test_status_merge_caps_stacks_and_keeps_longest() {
        let mut system = EnemySystem::new(straight_path());
        let id = spawn_grunt(&mut system, 100.0, 1.0, 0.0);

        assert!(system.apply_status(id, EnemyStatus::new(StatusKind::Soaked, 4.0)));
        assert!(system.apply_status(id, EnemyStatus::new(StatusKind::Soaked, 2.0)));
        let soaked = &system.get(id).unwrap().statuses[0];
        assert_eq!(soaked.stacks, 2);
        assert_approx_eq!(soaked.remaining_sec, 4.0);

        for _ in 0..20 {
            system.apply_status(id, EnemyStatus::new(StatusKind::Soaked, 6.0));
        }
        let enemy = system.get(id).unwrap();
        assert_eq!(enemy.statuses.len(), 1);
        assert_eq!(enemy.statuses[0].stacks, MAX_STATUS_STACKS);
        assert_approx_eq!(enemy.statuses[0].remaining_sec, 6.0);

        system.apply_status(id, EnemyStatus::new(StatusKind::Cold, 1.0));
        assert_eq!(system.get(id).unwrap().statuses.len(), 2);
    }

    #[test]
    fn test_statuses_expire() {
        let mut system = EnemySystem::new(straight_path());
        let id = spawn_grunt(&mut system, 100.0, 0.0, 0.0);
        system.apply_status(id, EnemyStatus::new(StatusKind::Soaked, 0.5));

        system.update(0.3);
        assert!(system.get(id).unwrap().has_status(StatusKind::Soaked));
        system.update(0.3);
        assert!(!system.get(id).unwrap().has_status(StatusKind::Soaked));
    }

    #[test]
    fn test_burning_damage_ignores_armor_and_can_kill() {
        let mut system = EnemySystem::new(straight_path());
        let id = spawn_grunt(&mut system, 10.0, 0.0, 50.0);
        let mut burn = EnemyStatus::new(StatusKind::Burning, 5.0);
        burn.dps = 4.0;
        system.apply_status(id, burn);

        system.update(1.0);
        assert_approx_eq!(system.get(id).unwrap().hp, 6.0);
        assert!(system.status_kills().is_empty());

        system.update(1.0);
        system.update(1.0);
        assert_eq!(system.status_kills(), &[id]);
        assert!(!system.get(id).unwrap().alive);
    }

    #[test]
    fn test_frozen_and_cold_change_speed() {
        let mut system = EnemySystem::new(straight_path());
        let frozen = spawn_grunt(&mut system, 10.0, 2.0, 0.0);
        let chilled = spawn_grunt(&mut system, 10.0, 2.0, 0.0);
        system.apply_status(frozen, EnemyStatus::new(StatusKind::Frozen, 5.0));
        let mut cold = EnemyStatus::new(StatusKind::Cold, 5.0);
        cold.slow = 0.5;
        system.apply_status(chilled, cold);

        system.update(1.0);
        assert_approx_eq!(system.get(frozen).unwrap().position.x, 0.0);
        assert_approx_eq!(system.get(chilled).unwrap().position.x, 1.0);
    }

    #[test]
    fn test_remove_status() {
        let mut system = EnemySystem::new(straight_path());
        let id = spawn_grunt(&mut system, 10.0, 1.0, 0.0);
        system.apply_status(id, EnemyStatus::new(StatusKind::Soaked, 5.0));

        assert!(system.remove_status(id, StatusKind::Soaked));
        assert!(!system.remove_status(id, StatusKind::Soaked));
        assert!(!system.remove_status(42, StatusKind::Soaked));
    }
}
