//! Identifiers and small enums used throughout the protocol.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Player identifier, assigned by the server's connection roster.
pub type PlayerId = u32;
/// Tower instance identifier, unique within one match.
pub type TowerId = u32;
/// Enemy instance identifier, unique within one match.
pub type EnemyId = u32;

/// Coarse stage of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Lobby,
    ClassSelect,
    Prep,
    Combat,
    Victory,
    Defeat,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Lobby => "lobby",
            Phase::ClassSelect => "class_select",
            Phase::Prep => "prep",
            Phase::Combat => "combat",
            Phase::Victory => "victory",
            Phase::Defeat => "defeat",
        }
    }

    /// True once the match has ended either way.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Victory | Phase::Defeat)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Elements double as the classes players pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Fire,
    Water,
    Ice,
    Nature,
}

impl Element {
    pub fn as_str(&self) -> &'static str {
        match self {
            Element::Fire => "fire",
            Element::Water => "water",
            Element::Ice => "ice",
            Element::Nature => "nature",
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of timed debuff an enemy can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Soaked,
    Burning,
    Cold,
    Frozen,
    Toxin,
}

impl StatusKind {
    /// Element the status belongs to, used for resistances.
    pub fn element(&self) -> Element {
        match self {
            StatusKind::Soaked => Element::Water,
            StatusKind::Burning => Element::Fire,
            StatusKind::Cold | StatusKind::Frozen => Element::Ice,
            StatusKind::Toxin => Element::Nature,
        }
    }
}

/// Policy a tower uses to choose among enemies in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TargetingMode {
    #[default]
    First,
    Last,
    Strongest,
    Weakest,
    Closest,
}

/// Which enemies a tower can hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Ground,
    Air,
    Both,
}

impl TargetType {
    pub fn can_hit(&self, flying: bool) -> bool {
        match self {
            TargetType::Ground => !flying,
            TargetType::Air => flying,
            TargetType::Both => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyType {
    Grunt,
    Runner,
    Tank,
    Flyer,
    Invisible,
    Caster,
    Boss,
}

impl EnemyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyType::Grunt => "grunt",
            EnemyType::Runner => "runner",
            EnemyType::Tank => "tank",
            EnemyType::Flyer => "flyer",
            EnemyType::Invisible => "invisible",
            EnemyType::Caster => "caster",
            EnemyType::Boss => "boss",
        }
    }
}

impl fmt::Display for EnemyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive tags carried by enemies; only `Flying` affects targeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyTag {
    Ground,
    Flying,
    Armored,
    Fast,
    Stealth,
    Boss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionKind {
    Melt,
    Conflagration,
    Vaporize,
    Freeze,
    Quench,
    Corrode,
}

impl ReactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionKind::Melt => "melt",
            ReactionKind::Conflagration => "conflagration",
            ReactionKind::Vaporize => "vaporize",
            ReactionKind::Freeze => "freeze",
            ReactionKind::Quench => "quench",
            ReactionKind::Corrode => "corrode",
        }
    }
}

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
