//! Protocol constants shared by the server and any client.
//!
//! These values are part of the wire contract: a client that renders
//! countdowns, health bars or gold totals relies on them matching exactly.

use crate::types::EnemyType;

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 20;

/// Nominal seconds per tick.
pub const TICK_DT: f64 = 1.0 / TICK_RATE as f64;

/// Largest delta a single tick may advance, in seconds.
pub const MAX_TICK_DT: f64 = 0.1;

/// Length of the build phase between waves.
pub const PREP_PHASE_DURATION_SEC: f64 = 30.0;

/// Starting and maximum base health.
pub const BASE_MAX_HP: i32 = 100;

/// Players allowed in one match.
pub const MAX_PLAYERS: usize = 4;

/// Gold granted per player when the match starts.
pub const STARTING_GOLD_PER_PLAYER: u32 = 200;

/// Flat part of the per-player wave clear bonus.
pub const WAVE_BONUS_BASE: u32 = 40;

/// Per-wave growth of the per-player wave clear bonus.
pub const WAVE_BONUS_PER_WAVE: u32 = 10;

/// Share of a tower's base cost returned when it is sold.
///
/// Upgrade spending is never refunded.
pub const TOWER_SELL_REFUND_PERCENT: f64 = 0.5;

/// Highest tier a tower can be upgraded to.
pub const MAX_TOWER_TIER: u8 = 3;

/// Extra enemy health per additional player, as a fraction of base health.
pub const HP_SCALE_PER_EXTRA_PLAYER: f64 = 0.3;

/// Maximum stacks a single status can accumulate.
pub const MAX_STATUS_STACKS: u32 = 10;

/// Fraction of a primary hit dealt to enemies caught in the splash.
pub const SPLASH_DAMAGE_FACTOR: f64 = 0.5;

/// Version a client must announce in `Packet::Connect`.
pub const PROTOCOL_VERSION: u32 = 1;

/// Longest accepted player name, in characters.
pub const MAX_NAME_LENGTH: usize = 32;

/// Longest accepted chat message, in characters.
pub const MAX_CHAT_LENGTH: usize = 500;

/// Base damage an enemy deals when it leaks through the end of the path.
pub fn leak_damage(enemy_type: EnemyType) -> i32 {
    match enemy_type {
        EnemyType::Grunt | EnemyType::Runner => 1,
        EnemyType::Flyer | EnemyType::Invisible | EnemyType::Caster => 2,
        EnemyType::Tank => 3,
        EnemyType::Boss => 10,
    }
}

/// Gold returned for selling a tower with the given base cost.
pub fn sell_refund(base_cost: u32) -> u32 {
    (base_cost as f64 * TOWER_SELL_REFUND_PERCENT).round() as u32
}

/// Health multiplier applied to every spawned enemy for the party size.
pub fn hp_scale(player_count: usize) -> f64 {
    1.0 + HP_SCALE_PER_EXTRA_PLAYER * player_count.saturating_sub(1) as f64
}
