//! Runtime state records and the aggregate `GameState` snapshot.
//!
//! The server keeps `PlayerState`, `TowerState` and `EnemyState` inside the
//! subsystem that owns them; `GameState` is assembled from those on demand
//! and is what gets broadcast to clients.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::geometry::Vector2;
use crate::types::*;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlayerState {
    pub id: PlayerId,
    pub name: String,
    pub element_class: Option<Element>,
    pub connected: bool,
    pub ready: bool,
}

impl PlayerState {
    pub fn new(id: PlayerId, name: String) -> Self {
        Self {
            id,
            name,
            element_class: None,
            connected: true,
            ready: false,
        }
    }
}

/// A placed tower.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TowerState {
    pub id: TowerId,
    pub config_id: String,
    pub owner_id: PlayerId,
    /// 1..=3, never decreases.
    pub tier: u8,
    pub x: i32,
    pub y: i32,
    pub last_attack_tick: u64,
    pub targeting_mode: Option<TargetingMode>,
    pub current_target: Option<EnemyId>,
    /// Base cost plus every upgrade paid for. Not used for refunds.
    pub investment: u32,
}

impl TowerState {
    pub fn position(&self) -> Vector2 {
        Vector2::new(self.x as f64, self.y as f64)
    }

    pub fn targeting(&self) -> TargetingMode {
        self.targeting_mode.unwrap_or_default()
    }
}

/// A timed debuff. Re-applying the same kind merges into the existing entry.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EnemyStatus {
    pub element: Element,
    pub kind: StatusKind,
    pub stacks: u32,
    pub remaining_sec: f64,
    /// Damage per second per stack (burning, toxin).
    pub dps: f64,
    /// Fraction of speed removed while active (cold).
    pub slow: f64,
}

impl EnemyStatus {
    pub fn new(kind: StatusKind, duration_sec: f64) -> Self {
        Self {
            element: kind.element(),
            kind,
            stacks: 1,
            remaining_sec: duration_sec,
            dps: 0.0,
            slow: 0.0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EnemyState {
    pub id: EnemyId,
    pub enemy_type: EnemyType,
    pub hp: f64,
    pub max_hp: f64,
    pub speed: f64,
    pub armor: f64,
    pub position: Vector2,
    pub waypoint_index: usize,
    /// Normalised progress along the current segment, 0..=1.
    pub progress: f64,
    pub statuses: Vec<EnemyStatus>,
    pub alive: bool,
    pub tags: Vec<EnemyTag>,
    pub resistances: BTreeMap<Element, f64>,
}

impl EnemyState {
    /// Distance travelled along the path, in segments.
    pub fn path_progress(&self) -> f64 {
        self.waypoint_index as f64 + self.progress
    }

    pub fn is_flying(&self) -> bool {
        self.tags.contains(&EnemyTag::Flying)
    }

    pub fn has_status(&self, kind: StatusKind) -> bool {
        self.statuses.iter().any(|s| s.kind == kind)
    }

    /// Fraction of incoming damage of `element` that is ignored, 0..=1.
    pub fn resistance(&self, element: Element) -> f64 {
        self.resistances
            .get(&element)
            .copied()
            .unwrap_or(0.0)
            .clamp(0.0, 1.0)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct EconomyState {
    pub gold: u32,
    /// Reserved; always zero.
    pub lumber: u32,
}

/// Full match snapshot broadcast to clients.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GameState {
    pub phase: Phase,
    pub wave: u32,
    pub max_waves: u32,
    pub base_hp: i32,
    pub max_base_hp: i32,
    pub economy: EconomyState,
    pub players: Vec<PlayerState>,
    pub towers: Vec<TowerState>,
    pub enemies: Vec<EnemyState>,
    pub prep_time_remaining: f64,
    pub tick: u64,
}
