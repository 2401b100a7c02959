use thiserror::Error;

/// Rejections reported back to the participant that caused them.
///
/// The `Display` text is the message carried by the error packet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Invalid name")]
    InvalidName,
    #[error("Name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("Game is full")]
    GameFull,
    #[error("Invalid input")]
    InvalidInput,
    #[error("Invalid Game ID")]
    UnknownSession,
    #[error("Game already started")]
    AlreadyStarted,
    #[error("Already in this game")]
    AlreadyJoined,
    #[error("Invalid question or answer")]
    InvalidQuestion,
    #[error("Only the host can {action}")]
    NotHost { action: &'static str },
    #[error("At least {required} players are required to start the game.")]
    NotEnoughPlayers { required: usize },
}
