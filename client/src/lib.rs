//! # Trivia Client Library
//!
//! A terminal client for the multiplayer trivia server. It reads commands and
//! guesses from standard input, sends them over UDP and prints every server
//! event as it arrives.
//!
//! ## Architecture Overview
//!
//! The server is authoritative for all game state. The client only keeps a
//! view of what the server last reported, which is enough to address commands
//! to the right room and to stop sending guesses when they can no longer count.
//!
//! ## Module Organization
//!
//! ### Input Module (`input`)
//! Turns typed lines into commands:
//! - `/create`, `/join`, `/start`, `/end`, `/help` and `/quit`
//! - Any other text as a guess
//! - Local rejection of empty names, codes, questions and answers
//!
//! ### Game Module (`game`)
//! The client-side session view:
//! - Current screen, room code and host flag
//! - Roster, question, round number and remaining time
//! - Whether a guess may be sent right now
//!
//! ### Network Module (`network`)
//! Manages all client-server communication:
//! - Connect handshake and heartbeats
//! - Packet serialization and deserialization
//! - Multiplexing the socket with standard input
//!
//! ### Rendering Module (`rendering`)
//! Prints server events as text: roster, round banner, countdown, results,
//! scoreboard and final leaderboard.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::network::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = Client::new("127.0.0.1:3000").await?;
//!     client.run().await?;
//!     Ok(())
//! }
//! ```

pub mod game;
pub mod input;
pub mod network;
pub mod rendering;
