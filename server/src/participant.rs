use shared::{ParticipantId, PlayerSummary, Role};

/// One connected identity inside a session
#[derive(Debug, Clone)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub role: Role,
    pub score: u32,
    /// Guesses left in the current round; unused for the host
    pub attempts_remaining: u32,
}

impl Participant {
    pub fn new(id: ParticipantId, name: &str, role: Role, max_attempts: u32) -> Self {
        Self {
            id,
            name: name.to_string(),
            role,
            score: 0,
            attempts_remaining: max_attempts,
        }
    }

    pub fn is_host(&self) -> bool {
        self.role == Role::Host
    }

    /// Identifier-free projection sent to clients
    pub fn summary(&self) -> PlayerSummary {
        PlayerSummary {
            name: self.name.clone(),
            score: self.score,
            attempts_remaining: self.attempts_remaining,
            role: self.role,
        }
    }
}
