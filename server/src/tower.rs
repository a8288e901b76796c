//! Tower registry and tile occupancy.
//!
//! `TowerSystem` validates and records placements, upgrades and sales. Gold
//! is not its concern: the caller checks affordability before committing.

use crate::error::CommandError;
use log::{debug, error};
use shared::{
    Catalog, EnemyId, PlayerId, TargetingMode, TowerConfig, TowerId, TowerState, MAX_TOWER_TIER,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Price and tier of the next upgrade of a tower.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeQuote {
    pub tier: u8,
    pub cost: u32,
}

pub struct TowerSystem {
    catalog: Arc<Catalog>,
    towers: BTreeMap<TowerId, TowerState>,
    occupied: HashMap<(i32, i32), TowerId>,
    next_tower_id: TowerId,
    player_count: usize,
}

impl TowerSystem {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            towers: BTreeMap::new(),
            occupied: HashMap::new(),
            next_tower_id: 1,
            player_count: 1,
        }
    }

    /// Build zones with a `min_players` above this stay locked.
    pub fn set_player_count(&mut self, player_count: usize) {
        self.player_count = player_count.max(1);
    }

    pub fn is_buildable(&self, x: i32, y: i32) -> bool {
        self.catalog
            .map
            .build_zones
            .iter()
            .filter(|zone| zone.min_players <= self.player_count)
            .any(|zone| zone.contains(x, y))
    }

    /// Checks everything about a placement except cost and class.
    pub fn check_placement(
        &self,
        config_id: &str,
        x: i32,
        y: i32,
    ) -> Result<&TowerConfig, CommandError> {
        let config = self
            .catalog
            .tower(config_id)
            .ok_or_else(|| CommandError::UnknownTowerConfig(config_id.to_string()))?;
        if !self.is_buildable(x, y) {
            return Err(CommandError::OutsideBuildZone { x, y });
        }
        if self.occupied.contains_key(&(x, y)) {
            return Err(CommandError::TileOccupied { x, y });
        }
        Ok(config)
    }

    pub fn place_tower(
        &mut self,
        config_id: &str,
        x: i32,
        y: i32,
        owner_id: PlayerId,
    ) -> Result<TowerId, CommandError> {
        let cost = self.check_placement(config_id, x, y)?.cost;

        let id = self.next_tower_id;
        self.next_tower_id += 1;

        self.towers.insert(
            id,
            TowerState {
                id,
                config_id: config_id.to_string(),
                owner_id,
                tier: 1,
                x,
                y,
                last_attack_tick: 0,
                targeting_mode: None,
                current_target: None,
                investment: cost,
            },
        );
        self.occupied.insert((x, y), id);
        debug!("Placed {} {} at ({}, {}) for player {}", config_id, id, x, y, owner_id);
        Ok(id)
    }

    /// Tier and cost of the next upgrade, without applying it.
    pub fn next_upgrade(&self, id: TowerId) -> Result<UpgradeQuote, CommandError> {
        let tower = self.towers.get(&id).ok_or(CommandError::TowerNotFound(id))?;
        if tower.tier >= MAX_TOWER_TIER {
            return Err(CommandError::MaxTierReached(id));
        }
        let tier = tower.tier + 1;
        let upgrade = self
            .catalog
            .tower(&tower.config_id)
            .and_then(|config| config.upgrade_for_tier(tier))
            .ok_or(CommandError::MaxTierReached(id))?;
        Ok(UpgradeQuote {
            tier,
            cost: upgrade.cost,
        })
    }

    /// Raises the tower one tier. Returns the tier and cost that were applied.
    pub fn upgrade_tower(&mut self, id: TowerId) -> Result<UpgradeQuote, CommandError> {
        let quote = self.next_upgrade(id)?;
        let tower = self.towers.get_mut(&id).ok_or(CommandError::TowerNotFound(id))?;
        tower.tier = quote.tier;
        tower.investment += quote.cost;
        debug!("Upgraded tower {} to tier {}", id, quote.tier);
        Ok(quote)
    }

    /// Removes the tower, frees its tile and returns its base cost. What was
    /// spent on upgrades plays no part in the refund.
    pub fn sell_tower(&mut self, id: TowerId) -> Result<u32, CommandError> {
        let tower = self.towers.remove(&id).ok_or(CommandError::TowerNotFound(id))?;
        self.occupied.remove(&(tower.x, tower.y));

        let base_cost = match self.catalog.tower(&tower.config_id) {
            Some(config) => config.cost,
            None => {
                error!(
                    "Sold tower {} has unknown config '{}', refunding nothing",
                    id, tower.config_id
                );
                0
            }
        };
        debug!("Sold tower {} at ({}, {})", id, tower.x, tower.y);
        Ok(base_cost)
    }

    pub fn set_targeting(&mut self, id: TowerId, mode: TargetingMode) -> Result<(), CommandError> {
        let tower = self.towers.get_mut(&id).ok_or(CommandError::TowerNotFound(id))?;
        tower.targeting_mode = Some(mode);
        Ok(())
    }

    pub fn record_attack(&mut self, id: TowerId, tick: u64, target: EnemyId) {
        if let Some(tower) = self.towers.get_mut(&id) {
            tower.last_attack_tick = tick;
            tower.current_target = Some(target);
        }
    }

    pub fn owner(&self, id: TowerId) -> Option<PlayerId> {
        self.towers.get(&id).map(|t| t.owner_id)
    }

    pub fn get(&self, id: TowerId) -> Option<&TowerState> {
        self.towers.get(&id)
    }

    pub fn tower_at(&self, x: i32, y: i32) -> Option<&TowerState> {
        self.occupied.get(&(x, y)).and_then(|id| self.towers.get(id))
    }

    /// Towers in id order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.towers.values()
    }

    pub fn ids(&self) -> Vec<TowerId> {
        self.towers.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.towers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.towers.is_empty()
    }
}
