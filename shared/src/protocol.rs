//! Wire protocol between clients and the match server.
//!
//! Every datagram carries exactly one bincode-encoded [`Packet`]. Commands are
//! acknowledged individually with the sequence number the client chose, so a
//! client can correlate a rejection reason with the action that caused it.

use serde::{Deserialize, Serialize};

use crate::state::GameState;
use crate::types::*;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum Packet {
    // Client -> server
    Connect {
        client_version: u32,
    },
    Command {
        sequence: u32,
        command: ClientCommand,
    },
    Heartbeat {
        timestamp: u64,
    },
    Disconnect,

    // Server -> client
    Connected {
        client_id: u32,
    },
    CommandAck {
        sequence: u32,
        result: CommandResult,
    },
    Snapshot {
        timestamp: u64,
        state: GameState,
    },
    Events {
        tick: u64,
        events: Vec<ServerEvent>,
    },
    Disconnected {
        reason: String,
    },
}

/// Actions a player can request.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ClientCommand {
    JoinGame { player_name: String },
    SelectClass { element_class: Element },
    ReadyUp,
    PlaceTower { config_id: String, x: i32, y: i32 },
    UpgradeTower { instance_id: TowerId },
    SellTower { instance_id: TowerId },
    SetTargeting { instance_id: TowerId, mode: TargetingMode },
    StartWave,
    Chat { message: String },
}

/// Outcome of one command. Rejections carry a human-readable reason and
/// guarantee that nothing changed.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct CommandResult {
    pub ok: bool,
    pub reason: Option<String>,
    pub player_id: Option<PlayerId>,
    pub tower_id: Option<TowerId>,
    pub new_tier: Option<u8>,
    pub gold_refund: Option<u32>,
}

impl CommandResult {
    pub fn ok() -> Self {
        Self {
            ok: true,
            ..Self::default()
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            reason: Some(reason.into()),
            ..Self::default()
        }
    }
}

/// Discrete things that happened during a command or tick.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ServerEvent {
    PlayerJoined {
        player_id: PlayerId,
        name: String,
    },
    PlayerLeft {
        player_id: PlayerId,
    },
    PhaseChanged {
        from: Phase,
        to: Phase,
    },
    GameStarted {
        players: u32,
        starting_gold: u32,
    },
    WaveStarted {
        wave: u32,
        telegraph: String,
        enemy_count: u32,
    },
    EnemySpawned {
        enemy_id: EnemyId,
        enemy_type: EnemyType,
        hp: f64,
    },
    TowerPlaced {
        tower_id: TowerId,
        config_id: String,
        owner_id: PlayerId,
        x: i32,
        y: i32,
    },
    TowerUpgraded {
        tower_id: TowerId,
        tier: u8,
        cost: u32,
    },
    TowerSold {
        tower_id: TowerId,
        gold_refund: u32,
    },
    TowerFired {
        tower_id: TowerId,
        target_id: EnemyId,
        damage: f64,
        element: Option<Element>,
        tower_x: f64,
        tower_y: f64,
        target_x: f64,
        target_y: f64,
    },
    ReactionTriggered {
        enemy_id: EnemyId,
        reaction: ReactionKind,
        damage: f64,
    },
    EnemyKilled {
        enemy_id: EnemyId,
        enemy_type: EnemyType,
        bounty: u32,
    },
    EnemyLeaked {
        enemy_id: EnemyId,
        damage: i32,
        base_hp: i32,
    },
    WaveCompleted {
        wave: u32,
        gold_reward: u32,
    },
    GameOver {
        victory: bool,
        wave: u32,
    },
    ChatMessage {
        player_id: PlayerId,
        message: String,
    },
}
