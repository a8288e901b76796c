//! Elemental reactions between an incoming element and a status already on
//! the target.

use crate::enemy::EnemySystem;
use log::debug;
use shared::{
    Element, EnemyId, EnemyStatus, ReactionConfig, ReactionEffect, ReactionKind, StatusKind,
};

/// What the caller has to do after a reaction fired.
#[derive(Debug, Clone, PartialEq)]
pub enum ReactionResult {
    /// Extra damage on the reacting enemy.
    BonusDamage(f64),
    /// A new status replacing the one the hit would have applied.
    ApplyStatus(EnemyStatus),
    /// Fixed damage to every alive enemy within `radius` of the target.
    Burst { damage: f64, radius: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReactionOutcome {
    pub kind: ReactionKind,
    pub enemy_id: EnemyId,
    pub result: ReactionResult,
    /// Status removed from the enemy, if the rule consumes it.
    pub consumed: Option<StatusKind>,
}

impl ReactionOutcome {
    /// Damage figure reported to clients.
    pub fn damage(&self) -> f64 {
        match &self.result {
            ReactionResult::BonusDamage(damage) => *damage,
            ReactionResult::Burst { damage, .. } => *damage,
            ReactionResult::ApplyStatus(_) => 0.0,
        }
    }
}

pub struct ReactionSystem {
    rules: Vec<ReactionConfig>,
}

impl ReactionSystem {
    pub fn new(mut rules: Vec<ReactionConfig>) -> Self {
        rules.sort_by_key(|rule| rule.priority);
        Self { rules }
    }

    pub fn rules(&self) -> &[ReactionConfig] {
        &self.rules
    }

    /// Fires the highest-priority rule matching `trigger` and a status the
    /// enemy currently carries. At most one rule fires per call.
    pub fn check_reaction(
        &self,
        enemies: &mut EnemySystem,
        enemy_id: EnemyId,
        trigger: Element,
        base_damage: f64,
    ) -> Option<ReactionOutcome> {
        let enemy = enemies.get(enemy_id).filter(|e| e.alive)?;
        let rule = self
            .rules
            .iter()
            .find(|rule| rule.trigger == trigger && enemy.has_status(rule.required_status))?;

        let result = match &rule.effect {
            ReactionEffect::DamageMultiplier { factor } => {
                ReactionResult::BonusDamage((base_damage * factor).round())
            }
            ReactionEffect::ApplyStatus {
                status,
                duration_sec,
            } => ReactionResult::ApplyStatus(EnemyStatus::new(*status, *duration_sec)),
            ReactionEffect::AoeBurst { damage, radius } => ReactionResult::Burst {
                damage: *damage,
                radius: *radius,
            },
        };

        let consumed = if rule.consumes_status {
            enemies.remove_status(enemy_id, rule.required_status);
            Some(rule.required_status)
        } else {
            None
        };

        debug!("{} on enemy {}", rule.kind, enemy_id);
        Some(ReactionOutcome {
            kind: rule.kind,
            enemy_id,
            result,
            consumed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::data::standard_reactions;
    use shared::{EnemyType, Vector2};
    use std::collections::BTreeMap;

    fn setup(statuses: &[StatusKind]) -> (ReactionSystem, EnemySystem, EnemyId) {
        let mut enemies = EnemySystem::new(vec![Vector2::new(0.0, 0.0), Vector2::new(10.0, 0.0)]);
        let id = enemies.spawn_enemy(EnemyType::Grunt, 100.0, 1.0, 0.0, vec![], BTreeMap::new());
        for kind in statuses {
            enemies.apply_status(id, EnemyStatus::new(*kind, 5.0));
        }
        (ReactionSystem::new(standard_reactions()), enemies, id)
    }

    #[test]
    fn test_vaporize_adds_bonus_and_consumes_soaked() {
        let (reactions, mut enemies, id) = setup(&[StatusKind::Soaked]);

        let outcome = reactions
            .check_reaction(&mut enemies, id, Element::Fire, 8.0)
            .unwrap();
        assert_eq!(outcome.kind, ReactionKind::Vaporize);
        assert_eq!(outcome.result, ReactionResult::BonusDamage(12.0));
        assert_eq!(outcome.consumed, Some(StatusKind::Soaked));
        assert!(!enemies.get(id).unwrap().has_status(StatusKind::Soaked));
    }

    #[test]
    fn test_melt_wins_over_vaporize() {
        let (reactions, mut enemies, id) = setup(&[StatusKind::Soaked, StatusKind::Frozen]);

        let outcome = reactions
            .check_reaction(&mut enemies, id, Element::Fire, 10.0)
            .unwrap();
        assert_eq!(outcome.kind, ReactionKind::Melt);
        assert_eq!(outcome.result, ReactionResult::BonusDamage(20.0));

        let enemy = enemies.get(id).unwrap();
        assert!(!enemy.has_status(StatusKind::Frozen));
        assert!(enemy.has_status(StatusKind::Soaked));
    }

    #[test]
    fn test_freeze_requests_frozen_status() {
        let (reactions, mut enemies, id) = setup(&[StatusKind::Soaked]);

        let outcome = reactions
            .check_reaction(&mut enemies, id, Element::Ice, 5.0)
            .unwrap();
        assert_eq!(outcome.kind, ReactionKind::Freeze);
        match &outcome.result {
            ReactionResult::ApplyStatus(status) => {
                assert_eq!(status.kind, StatusKind::Frozen);
                assert_eq!(status.remaining_sec, 1.5);
            }
            other => panic!("Expected a status, got {:?}", other),
        }
        assert_eq!(outcome.damage(), 0.0);
    }

    #[test]
    fn test_conflagration_is_a_burst() {
        let (reactions, mut enemies, id) = setup(&[StatusKind::Toxin]);

        let outcome = reactions
            .check_reaction(&mut enemies, id, Element::Fire, 8.0)
            .unwrap();
        assert_eq!(
            outcome.result,
            ReactionResult::Burst {
                damage: 25.0,
                radius: 1.5
            }
        );
    }

    #[test]
    fn test_corrode_keeps_cold() {
        let (reactions, mut enemies, id) = setup(&[StatusKind::Cold]);

        let outcome = reactions
            .check_reaction(&mut enemies, id, Element::Nature, 10.0)
            .unwrap();
        assert_eq!(outcome.kind, ReactionKind::Corrode);
        assert_eq!(outcome.consumed, None);
        assert!(enemies.get(id).unwrap().has_status(StatusKind::Cold));
    }

    #[test]
    fn test_no_reaction_without_matching_status() {
        let (reactions, mut enemies, id) = setup(&[StatusKind::Burning]);

        assert!(reactions
            .check_reaction(&mut enemies, id, Element::Fire, 10.0)
            .is_none());
        assert!(reactions
            .check_reaction(&mut enemies, 77, Element::Water, 10.0)
            .is_none());
        assert!(enemies.get(id).unwrap().has_status(StatusKind::Burning));
    }

    #[test]
    fn test_rules_are_sorted_by_priority() {
        let mut rules = standard_reactions();
        rules.reverse();
        let reactions = ReactionSystem::new(rules);
        let order: Vec<u32> = reactions.rules().iter().map(|r| r.priority).collect();
        assert_eq!(order, vec![1, 2, 3, 4, 5, 6]);
    }
}
