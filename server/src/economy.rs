//! Shared gold ledger for the party.

use log::debug;
use shared::{
    sell_refund, EconomyState, STARTING_GOLD_PER_PLAYER, WAVE_BONUS_BASE, WAVE_BONUS_PER_WAVE,
};

#[derive(Debug, Clone, Default)]
pub struct EconomySystem {
    gold: u32,
}

impl EconomySystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gold(&self) -> u32 {
        self.gold
    }

    pub fn state(&self) -> EconomyState {
        EconomyState {
            gold: self.gold,
            lumber: 0,
        }
    }

    /// Credits `200 x player_count` and returns the amount granted.
    pub fn grant_starting_gold(&mut self, player_count: usize) -> u32 {
        let amount = STARTING_GOLD_PER_PLAYER * player_count as u32;
        self.add_gold(amount);
        amount
    }

    pub fn add_gold(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
    }

    pub fn can_afford(&self, cost: u32) -> bool {
        self.gold >= cost
    }

    /// Deducts `cost` if the full amount is available. Leaves the ledger
    /// untouched and returns false otherwise.
    pub fn spend_gold(&mut self, cost: u32) -> bool {
        if !self.can_afford(cost) {
            debug!("Rejected spend of {} with {} gold", cost, self.gold);
            return false;
        }
        self.gold -= cost;
        true
    }

    /// Credits `(40 + 10 x wave) x player_count` and returns the amount.
    pub fn add_wave_bonus(&mut self, wave: u32, player_count: usize) -> u32 {
        let amount = (WAVE_BONUS_BASE + WAVE_BONUS_PER_WAVE * wave) * player_count as u32;
        self.add_gold(amount);
        amount
    }

    /// Credits the sale value of a tower with the given base cost.
    pub fn refund_tower(&mut self, base_cost: u32) -> u32 {
        let amount = sell_refund(base_cost);
        self.add_gold(amount);
        amount
    }
}
