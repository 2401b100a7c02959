//! # Trivia Server Library
//!
//! This library provides the authoritative server for the multiplayer trivia
//! game. A host opens a room, contestants join with its six-character code, and
//! the server runs timed question rounds, checks guesses and keeps score.
//!
//! ## Core Responsibilities
//!
//! ### Session State Machine
//! Each room is a [`session::Session`] that moves between lobby, active round,
//! resolved round and ended. A round resolves exactly once, either by the first
//! correct guess or by its countdown reaching zero.
//!
//! ### Connection Management
//! Peers connect over UDP and receive a connection id that identifies them in
//! every session they take part in. Silent peers are timed out and removed from
//! their sessions like an explicit disconnect.
//!
//! ### Event Delivery
//! Session operations never touch sockets. They append packets to an
//! [`delivery::Outbox`] addressed either to the whole room or to one
//! participant, and the network layer drains it after every step.
//!
//! ## Architecture Design
//!
//! ### Single Event Loop
//! All session state is owned by one loop that handles inbound packets,
//! timeouts and countdown polling strictly in sequence. Network receive, send
//! and timeout tasks talk to it only through channels, so no session is ever
//! mutated concurrently.
//!
//! ### Polled Countdown
//! A running round owns a [`countdown::Countdown`]. The loop polls it at a fine
//! resolution and each due tick runs to completion before the next event.
//! Cancelling a round drops the countdown, so no tick can arrive after it.
//!
//! ## Module Organization
//!
//! - `client_manager`: connection ids, addresses and liveness
//! - `config`: server settings and game rules
//! - `countdown`: fixed-cadence round ticks
//! - `delivery`: room vs. participant addressing
//! - `error`: rejection reasons reported to clients
//! - `network`: UDP tasks and the main loop
//! - `participant`: one roster entry
//! - `registry`: room-code lookup and event routing
//! - `session`: the round state machine
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let mut server = Server::new("127.0.0.1:3000", ServerConfig::default()).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod config;
pub mod countdown;
pub mod delivery;
pub mod error;
pub mod network;
pub mod participant;
pub mod registry;
pub mod session;
