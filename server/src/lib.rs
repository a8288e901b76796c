//! # Match Server Library
//!
//! This library provides the authoritative server for a cooperative elemental
//! tower-defense match. Up to four players share one base, one gold pool and
//! one map. Clients send commands; the server validates them, runs the
//! simulation at a fixed tick rate and broadcasts what happened.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Simulation
//! Every gameplay decision is made here: enemy movement, tower targeting,
//! damage, elemental reactions, gold, wave progression and the win or loss
//! outcome. Clients only render snapshots and events.
//!
//! ### Command Validation
//! Each client command is checked against the current phase, the shared
//! gold pool, build zones and tower ownership. A rejected command leaves the
//! match untouched and is acknowledged with a readable reason.
//!
//! ### State Broadcasting
//! Discrete events are broadcast as they happen. Full `GameState` snapshots
//! go out on a fixed cadence so late or lossy clients can resynchronize.
//!
//! ## Architecture Design
//!
//! ### Single Owner
//! `GameSimulation` is a plain synchronous value owned by the network loop.
//! Packet handling and ticks are interleaved by one `tokio::select!`, so
//! commands and ticks never overlap and no locks guard gameplay state.
//!
//! ### Subsystems
//! The simulation delegates to small systems that each own one concern and
//! know nothing about the network:
//!
//! - `economy`: the shared gold pool
//! - `enemy`: enemy movement, health, statuses and leaks
//! - `tower`: placement, upgrades, selling and ownership
//! - `combat`: target selection, fire rate, splash and aura bonuses
//! - `reaction`: elemental reactions between statuses and hits
//! - `wave`: wave progression and spawn schedules
//! - `room`: the player roster, classes and readiness
//!
//! ### Networking
//! - `network`: UDP server with receiver, sender and timeout tasks
//! - `client_manager`: address to client id mapping and liveness
//! - `game_loop`: the fixed-rate tick driver
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::{Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig {
//!         addr: "127.0.0.1:8080".to_string(),
//!         ..ServerConfig::default()
//!     };
//!     let mut server = Server::new(config).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod combat;
pub mod economy;
pub mod enemy;
pub mod error;
pub mod game;
pub mod game_loop;
pub mod network;
pub mod reaction;
pub mod room;
pub mod tower;
pub mod utils;
pub mod wave;
