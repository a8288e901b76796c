//! # Shared protocol vocabulary
//!
//! Types both ends of the wire agree on: protocol constants, identifiers,
//! runtime state records and the `GameState` snapshot, the bincode `Packet`
//! envelope with its commands and events, and the static `Catalog` that
//! defines towers, waves, the map and elemental reactions.

pub mod catalog;
pub mod constants;
pub mod data;
pub mod geometry;
pub mod protocol;
pub mod state;
pub mod types;

pub use catalog::*;
pub use constants::*;
pub use geometry::Vector2;
pub use protocol::*;
pub use state::*;
pub use types::*;
