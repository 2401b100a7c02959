//! Server and game-rule configuration

use shared::{MAX_ATTEMPTS, MIN_CONTESTANTS, POINTS_PER_CORRECT_GUESS, ROUND_SECONDS};
use std::time::Duration;

/// Rules applied by every session the server hosts
#[derive(Debug, Clone, PartialEq)]
pub struct GameRules {
    /// Guesses a contestant may submit per round
    pub max_attempts: u32,
    /// Countdown length of a round in ticks
    pub round_seconds: u32,
    pub points_per_correct_guess: u32,
    /// Non-host participants required before a round may start
    pub min_contestants: usize,
    /// Wall-clock spacing between countdown ticks
    pub tick_interval: Duration,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            round_seconds: ROUND_SECONDS,
            points_per_correct_guess: POINTS_PER_CORRECT_GUESS,
            min_contestants: MIN_CONTESTANTS,
            tick_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Maximum number of concurrent connections
    pub max_clients: usize,
    /// How often the main loop checks for due countdown ticks
    pub timer_resolution: Duration,
    /// Connections silent for longer than this are dropped
    pub client_timeout: Duration,
    pub rules: GameRules,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_clients: 64,
            timer_resolution: Duration::from_millis(50),
            client_timeout: Duration::from_secs(5),
            rules: GameRules::default(),
        }
    }
}
