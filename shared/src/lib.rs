use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: u32 = 1;
pub const MAX_PACKET_SIZE: usize = 8192;
pub const HEARTBEAT_INTERVAL_MS: u64 = 1000;

pub const MAX_ATTEMPTS: u32 = 3;
pub const ROUND_SECONDS: u32 = 30;
pub const POINTS_PER_CORRECT_GUESS: u32 = 10;
pub const MIN_CONTESTANTS: usize = 2;
pub const ROOM_CODE_LENGTH: usize = 6;
/// Longest display name accepted, in characters
pub const MAX_NAME_LENGTH: usize = 24;
/// Most participants one session holds, host included
pub const MAX_ROOM_SIZE: usize = 64;

/// Room code addressing a session.
pub type SessionId = String;

/// Connection handle assigned by the server on connect.
pub type ParticipantId = u32;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum Packet {
    // Client -> server
    Connect {
        client_version: u32,
    },
    Heartbeat,
    Disconnect,
    CreateGame {
        name: String,
    },
    JoinGame {
        session_id: SessionId,
        name: String,
    },
    SetAndStartRound {
        session_id: SessionId,
        question: String,
        answer: String,
    },
    Guess {
        session_id: SessionId,
        guess: String,
    },
    EndGame {
        session_id: SessionId,
    },

    // Server -> client
    Connected {
        client_id: ParticipantId,
    },
    Disconnected {
        reason: String,
    },
    GameCreated {
        session_id: SessionId,
    },
    JoinedGame {
        session_id: SessionId,
    },
    InputError {
        message: String,
    },
    JoinError {
        message: String,
    },
    StartError {
        message: String,
    },
    NoAnswer,
    PlayersUpdated {
        players: Vec<PlayerSummary>,
    },
    RoundStarted {
        question: String,
        round_number: u32,
    },
    TimerUpdate {
        seconds: u32,
    },
    RoundEnded {
        winner: Option<String>,
        answer: String,
    },
    WrongGuess {
        attempts_remaining: u32,
    },
    ClearInput,
    DashboardUpdate {
        players: Vec<PlayerSummary>,
    },
    GameEnded {
        players: Vec<PlayerSummary>,
    },
}

impl Packet {
    /// Short event name, used for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Packet::Connect { .. } => "connect",
            Packet::Heartbeat => "heartbeat",
            Packet::Disconnect => "disconnect",
            Packet::CreateGame { .. } => "createGame",
            Packet::JoinGame { .. } => "joinGame",
            Packet::SetAndStartRound { .. } => "setAndStartRound",
            Packet::Guess { .. } => "guess",
            Packet::EndGame { .. } => "endGame",
            Packet::Connected { .. } => "connected",
            Packet::Disconnected { .. } => "disconnected",
            Packet::GameCreated { .. } => "gameCreated",
            Packet::JoinedGame { .. } => "joinedGame",
            Packet::InputError { .. } => "inputError",
            Packet::JoinError { .. } => "joinError",
            Packet::StartError { .. } => "startError",
            Packet::NoAnswer => "noAnswer",
            Packet::PlayersUpdated { .. } => "playersUpdated",
            Packet::RoundStarted { .. } => "roundStarted",
            Packet::TimerUpdate { .. } => "timerUpdate",
            Packet::RoundEnded { .. } => "roundEnded",
            Packet::WrongGuess { .. } => "wrongGuess",
            Packet::ClearInput => "clearInput",
            Packet::DashboardUpdate { .. } => "dashboardUpdate",
            Packet::GameEnded { .. } => "gameEnded",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Host,
    Contestant,
}

/// One roster entry as seen by every participant. Carries no connection id.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PlayerSummary {
    pub name: String,
    pub score: u32,
    pub attempts_remaining: u32,
    pub role: Role,
}

impl PlayerSummary {
    pub fn is_host(&self) -> bool {
        self.role == Role::Host
    }
}

/// A user-supplied string is usable when it has at least one non-whitespace character.
pub fn validate_input(input: &str) -> bool {
    !input.trim().is_empty()
}

/// A display name must be non-blank and at most `MAX_NAME_LENGTH` characters, padding included.
///
/// Together with `MAX_ROOM_SIZE` this bounds every roster packet below `MAX_PACKET_SIZE`.
pub fn validate_name(name: &str) -> bool {
    validate_input(name) && name.chars().count() <= MAX_NAME_LENGTH
}

pub fn validate_min_players(count: usize, min: usize) -> bool {
    count >= min
}

/// Contestants ordered by score, highest first. Ties keep roster order.
pub fn leaderboard(players: &[PlayerSummary]) -> Vec<&PlayerSummary> {
    let mut contestants: Vec<&PlayerSummary> = players.iter().filter(|p| !p.is_host()).collect();
    contestants.sort_by(|a, b| b.score.cmp(&a.score));
    contestants
}
