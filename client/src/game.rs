//! Client-side view of the current session
//!
//! The server is authoritative for everything; this state only remembers what
//! the last packets said so commands can be addressed and guesses gated.

use crate::input::Command;
use log::debug;
use shared::{Packet, ParticipantId, PlayerSummary, SessionId};

/// Which part of the game the user is looking at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Lobby,
    Round,
    GameOver,
}

/// What the network loop should do with a command
#[derive(Debug, Clone, PartialEq)]
pub enum ClientAction {
    Send(Packet),
    ShowHelp,
    Notice(String),
    Quit,
    Ignore,
}

#[derive(Debug, Clone)]
pub struct ClientGameState {
    pub client_id: Option<ParticipantId>,
    pub session_id: Option<SessionId>,
    /// Name this client last created or joined with
    pub name: Option<String>,
    pub is_host: bool,
    pub screen: Screen,
    pub players: Vec<PlayerSummary>,
    pub question: Option<String>,
    pub round_number: u32,
    pub seconds_left: Option<u32>,
    pub attempts_remaining: Option<u32>,
    can_guess: bool,
}

impl Default for ClientGameState {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientGameState {
    pub fn new() -> Self {
        Self {
            client_id: None,
            session_id: None,
            name: None,
            is_host: false,
            screen: Screen::Home,
            players: Vec::new(),
            question: None,
            round_number: 0,
            seconds_left: None,
            attempts_remaining: None,
            can_guess: false,
        }
    }

    pub fn can_guess(&self) -> bool {
        self.can_guess
    }

    /// Updates the view from a server packet
    pub fn apply(&mut self, packet: &Packet) {
        match packet {
            Packet::Connected { client_id } => {
                self.client_id = Some(*client_id);
            }
            Packet::Disconnected { .. } => {
                *self = Self::new();
            }
            Packet::GameCreated { session_id } => {
                self.enter_lobby(session_id.clone());
                self.is_host = true;
            }
            Packet::JoinedGame { session_id } => {
                self.enter_lobby(session_id.clone());
            }
            Packet::PlayersUpdated { players } => {
                self.players = players.clone();
                self.refresh_host_flag();
            }
            Packet::RoundStarted {
                question,
                round_number,
            } => {
                self.screen = Screen::Round;
                self.question = Some(question.clone());
                self.round_number = *round_number;
                self.seconds_left = None;
                self.attempts_remaining = None;
                self.can_guess = !self.is_host;
            }
            Packet::TimerUpdate { seconds } => {
                self.seconds_left = Some(*seconds);
            }
            Packet::RoundEnded { .. } => {
                self.can_guess = false;
            }
            Packet::WrongGuess { attempts_remaining } => {
                self.attempts_remaining = Some(*attempts_remaining);
                if *attempts_remaining == 0 {
                    self.can_guess = false;
                }
            }
            Packet::DashboardUpdate { players } => {
                self.players = players.clone();
            }
            Packet::GameEnded { players } => {
                self.screen = Screen::GameOver;
                self.players = players.clone();
                self.can_guess = false;
            }
            other => {
                debug!("No state change for {}", other.name());
            }
        }
    }

    fn enter_lobby(&mut self, session_id: SessionId) {
        self.session_id = Some(session_id);
        self.is_host = false;
        self.screen = Screen::Lobby;
        self.question = None;
        self.round_number = 0;
        self.can_guess = false;
    }

    /// Picks up a host promotion when our name identifies exactly one roster entry
    fn refresh_host_flag(&mut self) {
        let Some(name) = self.name.as_deref() else {
            return;
        };

        let mut matching = self.players.iter().filter(|p| p.name == name);
        if let (Some(me), None) = (matching.next(), matching.next()) {
            self.is_host = me.is_host();
        }
    }

    /// Translates a command into what should happen next
    pub fn action_for(&mut self, command: Command) -> ClientAction {
        match command {
            Command::Help => ClientAction::ShowHelp,
            Command::Quit => ClientAction::Quit,
            Command::Create { name } => {
                self.name = Some(name.clone());
                ClientAction::Send(Packet::CreateGame { name })
            }
            Command::Join { session_id, name } => {
                self.name = Some(name.clone());
                ClientAction::Send(Packet::JoinGame { session_id, name })
            }
            Command::Start { question, answer } => match self.session_id.clone() {
                Some(session_id) if self.screen != Screen::GameOver => {
                    ClientAction::Send(Packet::SetAndStartRound {
                        session_id,
                        question,
                        answer,
                    })
                }
                _ => ClientAction::Notice("Create or join a game first".to_string()),
            },
            Command::End => match self.session_id.clone() {
                Some(session_id) if self.screen != Screen::GameOver => {
                    ClientAction::Send(Packet::EndGame { session_id })
                }
                _ => ClientAction::Notice("Create or join a game first".to_string()),
            },
            Command::Guess(guess) => match self.session_id.clone() {
                Some(session_id) if self.can_guess => {
                    ClientAction::Send(Packet::Guess { session_id, guess })
                }
                _ => ClientAction::Ignore,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Role;

    fn summary(name: &str, score: u32, role: Role) -> PlayerSummary {
        PlayerSummary {
            name: name.to_string(),
            score,
            attempts_remaining: 3,
            role,
        }
    }

    fn joined_as(name: &str) -> ClientGameState {
        let mut state = ClientGameState::new();
        state.action_for(Command::Join {
            session_id: "ABC123".to_string(),
            name: name.to_string(),
        });
        state.apply(&Packet::JoinedGame {
            session_id: "ABC123".to_string(),
        });
        state
    }

    fn start_round(state: &mut ClientGameState) {
        state.apply(&Packet::RoundStarted {
            question: "Capital of France?".to_string(),
            round_number: 1,
        });
    }

    #[test]
    fn test_initial_state() {
        let state = ClientGameState::new();
        assert_eq!(state.screen, Screen::Home);
        assert!(state.session_id.is_none());
        assert!(!state.can_guess());
    }

    #[test]
    fn test_game_created_makes_host() {
        let mut state = ClientGameState::new();
        state.apply(&Packet::GameCreated {
            session_id: "ABC123".to_string(),
        });

        assert!(state.is_host);
        assert_eq!(state.screen, Screen::Lobby);
        assert_eq!(state.session_id.as_deref(), Some("ABC123"));
    }

    #[test]
    fn test_round_allows_contestant_guesses_only() {
        let mut contestant = joined_as("Bob");
        start_round(&mut contestant);
        assert!(contestant.can_guess());
        assert_eq!(contestant.screen, Screen::Round);

        let mut host = ClientGameState::new();
        host.apply(&Packet::GameCreated {
            session_id: "ABC123".to_string(),
        });
        start_round(&mut host);
        assert!(!host.can_guess());
    }

    #[test]
    fn test_guessing_closes() {
        let mut state = joined_as("Bob");
        start_round(&mut state);

        state.apply(&Packet::WrongGuess {
            attempts_remaining: 0,
        });
        assert!(!state.can_guess());

        start_round(&mut state);
        state.apply(&Packet::RoundEnded {
            winner: None,
            answer: "Paris".to_string(),
        });
        assert!(!state.can_guess());
    }

    #[test]
    fn test_host_promotion_detected_by_name() {
        let mut state = joined_as("Bob");

        state.apply(&Packet::PlayersUpdated {
            players: vec![summary("Bob", 0, Role::Host), summary("Cara", 0, Role::Contestant)],
        });

        assert!(state.is_host);
    }

    #[test]
    fn test_ambiguous_name_leaves_host_flag() {
        let mut state = joined_as("Bob");

        state.apply(&Packet::PlayersUpdated {
            players: vec![summary("Bob", 0, Role::Host), summary("Bob", 0, Role::Contestant)],
        });

        assert!(!state.is_host);
    }

    #[test]
    fn test_game_ended() {
        let mut state = joined_as("Bob");
        start_round(&mut state);

        state.apply(&Packet::GameEnded {
            players: vec![summary("Bob", 10, Role::Contestant)],
        });

        assert_eq!(state.screen, Screen::GameOver);
        assert_eq!(state.players.len(), 1);
        assert_eq!(
            state.action_for(Command::End),
            ClientAction::Notice("Create or join a game first".to_string())
        );
    }

    #[test]
    fn test_commands_need_a_session() {
        let mut state = ClientGameState::new();

        assert!(matches!(
            state.action_for(Command::Start {
                question: "Q?".to_string(),
                answer: "A".to_string()
            }),
            ClientAction::Notice(_)
        ));
        assert_eq!(
            state.action_for(Command::Guess("Paris".to_string())),
            ClientAction::Ignore
        );
    }

    #[test]
    fn test_guess_is_addressed_to_session() {
        let mut state = joined_as("Bob");
        start_round(&mut state);

        assert_eq!(
            state.action_for(Command::Guess("paris".to_string())),
            ClientAction::Send(Packet::Guess {
                session_id: "ABC123".to_string(),
                guess: "paris".to_string()
            })
        );
    }

    #[test]
    fn test_disconnect_resets() {
        let mut state = joined_as("Bob");
        state.apply(&Packet::Disconnected {
            reason: "Server full".to_string(),
        });

        assert_eq!(state.screen, Screen::Home);
        assert!(state.session_id.is_none());
    }
}
