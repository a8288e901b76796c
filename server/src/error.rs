//! Rejection reasons for player commands.
//!
//! A `CommandError` is an expected outcome, not a fault: its `Display` text is
//! sent back to the client as the `reason` of a failed `CommandResult`, and
//! returning one guarantees that no state was touched.

use shared::{Element, Phase, PlayerId, TowerId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("cannot {action} during the {phase} phase")]
    WrongPhase { action: &'static str, phase: Phase },

    #[error("insufficient gold: need {cost}, have {available}")]
    InsufficientGold { cost: u32, available: u32 },

    #[error("unknown tower config '{0}'")]
    UnknownTowerConfig(String),

    #[error("tile ({x}, {y}) is outside any build zone")]
    OutsideBuildZone { x: i32, y: i32 },

    #[error("tile ({x}, {y}) is already occupied")]
    TileOccupied { x: i32, y: i32 },

    #[error("{config_id} requires the {class} class")]
    ClassRequired { config_id: String, class: Element },

    #[error("tower {0} not found")]
    TowerNotFound(TowerId),

    #[error("tower {0} belongs to another player")]
    NotTowerOwner(TowerId),

    #[error("tower {0} is already at max tier")]
    MaxTierReached(TowerId),

    #[error("player {0} has not joined")]
    PlayerNotFound(PlayerId),

    #[error("player {0} has already joined")]
    AlreadyJoined(PlayerId),

    #[error("room is full ({0} players)")]
    RoomFull(usize),

    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("no waves remaining")]
    NoWavesRemaining,
}
