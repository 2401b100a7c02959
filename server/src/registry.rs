//! Room-code → session bookkeeping and inbound event routing
//!
//! The registry is owned by the server's main loop, which gives it exclusive
//! access for every insert, lookup and removal. Rejections are answered to the
//! requester only, with a single error packet.

use crate::config::GameRules;
use crate::delivery::Outbox;
use crate::error::GameError;
use crate::session::Session;
use log::{info, warn};
use rand::Rng;
use shared::{
    validate_input, validate_name, Packet, ParticipantId, SessionId, MAX_NAME_LENGTH,
    ROOM_CODE_LENGTH,
};
use std::collections::HashMap;
use std::time::Instant;

const ROOM_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generates a room code of uppercase letters and digits
pub fn generate_room_code() -> SessionId {
    let mut rng = rand::thread_rng();
    (0..ROOM_CODE_LENGTH)
        .map(|_| ROOM_CODE_CHARSET[rng.gen_range(0..ROOM_CODE_CHARSET.len())] as char)
        .collect()
}

/// Canonical form of a room code typed by a user
pub fn normalize_session_id(raw: &str) -> Option<SessionId> {
    if !validate_input(raw) {
        return None;
    }
    Some(raw.trim().to_ascii_uppercase())
}

pub struct SessionRegistry {
    sessions: HashMap<SessionId, Session>,
    rules: GameRules,
}

impl SessionRegistry {
    pub fn new(rules: GameRules) -> Self {
        Self {
            sessions: HashMap::new(),
            rules,
        }
    }

    /// Routes a game packet from a connected participant.
    ///
    /// Connection-level packets are handled by the network layer and ignored here.
    pub fn handle_packet(
        &mut self,
        from: ParticipantId,
        packet: Packet,
        now: Instant,
        outbox: &mut Outbox,
    ) {
        match packet {
            Packet::CreateGame { name } => self.create_game(from, &name, outbox),
            Packet::JoinGame { session_id, name } => {
                self.join_game(from, &session_id, &name, outbox)
            }
            Packet::SetAndStartRound {
                session_id,
                question,
                answer,
            } => self.set_and_start_round(from, &session_id, &question, &answer, now, outbox),
            Packet::Guess { session_id, guess } => self.guess(from, &session_id, &guess, outbox),
            Packet::EndGame { session_id } => self.end_game(from, &session_id, outbox),
            other => {
                warn!(
                    "Client {} sent unexpected {} packet to the registry",
                    from,
                    other.name()
                );
            }
        }
    }

    pub fn create_game(&mut self, from: ParticipantId, name: &str, outbox: &mut Outbox) {
        if !validate_input(name) {
            reply_error(outbox, from, Reply::Input, GameError::InvalidName);
            return;
        }
        if !validate_name(name) {
            let error = GameError::NameTooLong {
                max: MAX_NAME_LENGTH,
            };
            reply_error(outbox, from, Reply::Input, error);
            return;
        }

        let session_id = self.unused_room_code();
        let Some(session) = Session::create(session_id.clone(), from, name, self.rules.clone())
        else {
            return;
        };

        self.sessions.insert(session_id.clone(), session);
        outbox.to_participant(from, Packet::GameCreated { session_id });
    }

    fn unused_room_code(&self) -> SessionId {
        loop {
            let code = generate_room_code();
            if !self.sessions.contains_key(&code) {
                return code;
            }
        }
    }

    pub fn join_game(
        &mut self,
        from: ParticipantId,
        session_id: &str,
        name: &str,
        outbox: &mut Outbox,
    ) {
        let Some(session_id) = normalize_session_id(session_id).filter(|_| validate_input(name))
        else {
            reply_error(outbox, from, Reply::Join, GameError::InvalidInput);
            return;
        };

        let Some(session) = self.sessions.get_mut(&session_id) else {
            reply_error(outbox, from, Reply::Join, GameError::UnknownSession);
            return;
        };

        match session.join(from, name, outbox) {
            Ok(()) => outbox.to_participant(from, Packet::JoinedGame { session_id }),
            Err(error) => reply_error(outbox, from, Reply::Join, error),
        }
    }

    pub fn set_and_start_round(
        &mut self,
        from: ParticipantId,
        session_id: &str,
        question: &str,
        answer: &str,
        now: Instant,
        outbox: &mut Outbox,
    ) {
        let Some(session) = self.lookup_mut(session_id) else {
            reply_error(outbox, from, Reply::Input, GameError::UnknownSession);
            return;
        };

        if !session.is_host(from) {
            let error = GameError::NotHost {
                action: "start a round",
            };
            reply_error(outbox, from, Reply::Input, error);
            return;
        }

        if let Err(error) = session.set_question(question, answer) {
            reply_error(outbox, from, Reply::Input, error);
            return;
        }

        session.start_round(now, outbox);
    }

    pub fn guess(&mut self, from: ParticipantId, session_id: &str, guess: &str, outbox: &mut Outbox) {
        let Some(session) = self.lookup_mut(session_id) else {
            reply_error(outbox, from, Reply::Input, GameError::UnknownSession);
            return;
        };

        session.handle_guess(from, guess, outbox);
    }

    /// Ends the session for everyone and discards it
    pub fn end_game(&mut self, from: ParticipantId, session_id: &str, outbox: &mut Outbox) {
        let Some(session_id) = normalize_session_id(session_id) else {
            reply_error(outbox, from, Reply::Input, GameError::UnknownSession);
            return;
        };

        let Some(session) = self.sessions.get_mut(&session_id) else {
            reply_error(outbox, from, Reply::Input, GameError::UnknownSession);
            return;
        };

        if !session.is_host(from) {
            let error = GameError::NotHost {
                action: "end the game",
            };
            reply_error(outbox, from, Reply::Input, error);
            return;
        }

        session.end_game(outbox);
        self.sessions.remove(&session_id);
        info!("Session {} discarded", session_id);
    }

    /// Removes a departed connection from every session, discarding sessions left empty
    pub fn disconnect(&mut self, from: ParticipantId, outbox: &mut Outbox) {
        let mut emptied = Vec::new();

        for (session_id, session) in self.sessions.iter_mut() {
            if session.leave(from, outbox) && session.is_empty() {
                emptied.push(session_id.clone());
            }
        }

        for session_id in emptied {
            self.sessions.remove(&session_id);
            info!("Session {} discarded after its last participant left", session_id);
        }
    }

    /// Advances every running countdown up to `now`
    pub fn poll_timers(&mut self, now: Instant, outbox: &mut Outbox) {
        for session in self.sessions.values_mut() {
            session.poll_timer(now, outbox);
        }
    }

    fn lookup_mut(&mut self, raw_session_id: &str) -> Option<&mut Session> {
        let session_id = normalize_session_id(raw_session_id)?;
        self.sessions.get_mut(&session_id)
    }

    pub fn get(&self, session_id: &str) -> Option<&Session> {
        let session_id = normalize_session_id(session_id)?;
        self.sessions.get(&session_id)
    }

    /// Number of sessions with a live countdown
    pub fn active_rounds(&self) -> usize {
        self.sessions
            .values()
            .filter(|s| s.is_round_active())
            .count()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Which error packet a rejected request is answered with
#[derive(Debug, Clone, Copy)]
enum Reply {
    Input,
    Join,
}

impl Reply {
    fn packet(self, message: String) -> Packet {
        match self {
            Reply::Input => Packet::InputError { message },
            Reply::Join => Packet::JoinError { message },
        }
    }
}

fn reply_error(outbox: &mut Outbox, to: ParticipantId, reply: Reply, error: GameError) {
    warn!("Rejected request from client {}: {}", to, error);
    outbox.to_participant(to, reply.packet(error.to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{MAX_PACKET_SIZE, MAX_ROOM_SIZE};
    use std::time::Duration;

    const ANN: ParticipantId = 1;
    const BOB: ParticipantId = 2;
    const CARA: ParticipantId = 3;

    fn registry() -> SessionRegistry {
        SessionRegistry::new(GameRules::default())
    }

    fn created_code(outbox: &Outbox, host: ParticipantId) -> SessionId {
        outbox
            .received_by(host)
            .into_iter()
            .find_map(|p| match p {
                Packet::GameCreated { session_id } => Some(session_id.clone()),
                _ => None,
            })
            .expect("no GameCreated packet")
    }

    /// Ann hosting, Bob and Cara joined
    fn lobby(registry: &mut SessionRegistry) -> SessionId {
        let mut outbox = Outbox::new();
        registry.create_game(ANN, "Ann", &mut outbox);
        let code = created_code(&outbox, ANN);
        registry.join_game(BOB, &code, "Bob", &mut outbox);
        registry.join_game(CARA, &code, "Cara", &mut outbox);
        code
    }

    fn single_reply(outbox: &Outbox, to: ParticipantId) -> Packet {
        assert_eq!(outbox.len(), 1, "expected one message, got {:?}", outbox.messages());
        assert_eq!(outbox.received_by(to).len(), 1);
        outbox.messages()[0].packet.clone()
    }

    #[test]
    fn test_generate_room_code_format() {
        for _ in 0..100 {
            let code = generate_room_code();
            assert_eq!(code.len(), ROOM_CODE_LENGTH);
            assert!(code
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_normalize_session_id() {
        assert_eq!(normalize_session_id(" abc123 "), Some("ABC123".to_string()));
        assert_eq!(normalize_session_id("   "), None);
        assert_eq!(normalize_session_id(""), None);
    }

    #[test]
    fn test_create_game() {
        let mut registry = registry();
        let mut outbox = Outbox::new();

        registry.create_game(ANN, "Ann", &mut outbox);

        let code = created_code(&outbox, ANN);
        assert_eq!(registry.len(), 1);
        let session = registry.get(&code).unwrap();
        assert_eq!(session.host_id(), Some(ANN));
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn test_create_game_with_blank_name() {
        let mut registry = registry();
        let mut outbox = Outbox::new();

        registry.create_game(ANN, " ", &mut outbox);

        assert!(registry.is_empty());
        assert_eq!(
            single_reply(&outbox, ANN),
            Packet::InputError {
                message: "Invalid name".to_string()
            }
        );
    }

    #[test]
    fn test_join_game_replies_after_roster_broadcast() {
        let mut registry = registry();
        let mut outbox = Outbox::new();
        registry.create_game(ANN, "Ann", &mut outbox);
        let code = created_code(&outbox, ANN);
        let mut outbox = Outbox::new();

        registry.join_game(BOB, &code.to_lowercase(), "Bob", &mut outbox);

        let to_bob = outbox.received_by(BOB);
        assert!(matches!(to_bob[0], Packet::PlayersUpdated { .. }));
        assert_eq!(
            to_bob[1],
            &Packet::JoinedGame {
                session_id: code.clone()
            }
        );
        assert_eq!(outbox.received_by(ANN).len(), 1);
        assert_eq!(registry.get(&code).unwrap().len(), 2);
    }

    #[test]
    fn test_join_game_errors() {
        let mut registry = registry();
        let code = lobby(&mut registry);

        let cases = [
            ("", "Dan", "Invalid input"),
            (code.as_str(), "  ", "Invalid input"),
            ("ZZZZZZ", "Dan", "Invalid Game ID"),
        ];
        for (session_id, name, message) in cases {
            let mut outbox = Outbox::new();
            registry.join_game(4, session_id, name, &mut outbox);
            assert_eq!(
                single_reply(&outbox, 4),
                Packet::JoinError {
                    message: message.to_string()
                }
            );
        }

        let mut outbox = Outbox::new();
        registry.join_game(BOB, &code, "Bob", &mut outbox);
        assert_eq!(
            single_reply(&outbox, BOB),
            Packet::JoinError {
                message: "Already in this game".to_string()
            }
        );
    }

    #[test]
    fn test_join_after_start_is_rejected() {
        let mut registry = registry();
        let code = lobby(&mut registry);
        let mut outbox = Outbox::new();
        registry.set_and_start_round(ANN, &code, "Q?", "A", Instant::now(), &mut outbox);
        let mut outbox = Outbox::new();

        registry.join_game(4, &code, "Dan", &mut outbox);

        assert_eq!(
            single_reply(&outbox, 4),
            Packet::JoinError {
                message: "Game already started".to_string()
            }
        );
    }

    #[test]
    fn test_set_and_start_round() {
        let mut registry = registry();
        let code = lobby(&mut registry);
        let mut outbox = Outbox::new();

        registry.set_and_start_round(
            ANN,
            &code,
            "Capital of France?",
            "Paris",
            Instant::now(),
            &mut outbox,
        );

        assert_eq!(registry.active_rounds(), 1);
        for member in [ANN, BOB, CARA] {
            assert_eq!(
                outbox.received_by(member)[0],
                &Packet::RoundStarted {
                    question: "Capital of France?".to_string(),
                    round_number: 1
                }
            );
        }
    }

    #[test]
    fn test_set_and_start_round_rejections() {
        let mut registry = registry();
        let code = lobby(&mut registry);

        let mut outbox = Outbox::new();
        registry.set_and_start_round(ANN, &code, "Q?", " ", Instant::now(), &mut outbox);
        assert_eq!(
            single_reply(&outbox, ANN),
            Packet::InputError {
                message: "Invalid question or answer".to_string()
            }
        );

        let mut outbox = Outbox::new();
        registry.set_and_start_round(BOB, &code, "Q?", "A", Instant::now(), &mut outbox);
        assert_eq!(
            single_reply(&outbox, BOB),
            Packet::InputError {
                message: "Only the host can start a round".to_string()
            }
        );

        let mut outbox = Outbox::new();
        registry.set_and_start_round(ANN, "NOPE00", "Q?", "A", Instant::now(), &mut outbox);
        assert_eq!(
            single_reply(&outbox, ANN),
            Packet::InputError {
                message: "Invalid Game ID".to_string()
            }
        );

        assert_eq!(registry.active_rounds(), 0);
    }

    #[test]
    fn test_start_error_goes_to_host_only() {
        let mut registry = registry();
        let mut outbox = Outbox::new();
        registry.create_game(ANN, "Ann", &mut outbox);
        let code = created_code(&outbox, ANN);
        registry.join_game(BOB, &code, "Bob", &mut outbox);
        let mut outbox = Outbox::new();

        registry.set_and_start_round(ANN, &code, "Q?", "A", Instant::now(), &mut outbox);

        assert!(matches!(single_reply(&outbox, ANN), Packet::StartError { .. }));
        assert!(!registry.get(&code).unwrap().is_started());
    }

    #[test]
    fn test_guess_routes_to_session() {
        let mut registry = registry();
        let code = lobby(&mut registry);
        let mut outbox = Outbox::new();
        registry.set_and_start_round(ANN, &code, "Capital of France?", "Paris", Instant::now(), &mut outbox);
        let mut outbox = Outbox::new();

        registry.guess(BOB, &code, "paris", &mut outbox);

        assert!(outbox.received_by(CARA).contains(&&Packet::RoundEnded {
            winner: Some("Bob".to_string()),
            answer: "Paris".to_string()
        }));
        assert_eq!(registry.active_rounds(), 0);

        let mut outbox = Outbox::new();
        registry.guess(BOB, "NOPE00", "paris", &mut outbox);
        assert!(matches!(single_reply(&outbox, BOB), Packet::InputError { .. }));
    }

    #[test]
    fn test_end_game_discards_session() {
        let mut registry = registry();
        let code = lobby(&mut registry);

        let mut outbox = Outbox::new();
        registry.end_game(BOB, &code, &mut outbox);
        assert!(matches!(single_reply(&outbox, BOB), Packet::InputError { .. }));
        assert_eq!(registry.len(), 1);

        let mut outbox = Outbox::new();
        registry.end_game(ANN, &code, &mut outbox);
        assert!(registry.is_empty());
        for member in [ANN, BOB, CARA] {
            assert!(matches!(
                outbox.received_by(member)[0],
                Packet::GameEnded { .. }
            ));
        }

        let mut outbox = Outbox::new();
        registry.end_game(ANN, &code, &mut outbox);
        assert_eq!(
            single_reply(&outbox, ANN),
            Packet::InputError {
                message: "Invalid Game ID".to_string()
            }
        );
    }

    #[test]
    fn test_disconnect_reaches_every_session() {
        let mut registry = registry();
        let first = lobby(&mut registry);
        let mut outbox = Outbox::new();
        registry.create_game(4, "Dan", &mut outbox);
        let second = created_code(&outbox, 4);
        registry.join_game(BOB, &second, "Bob", &mut outbox);
        let mut outbox = Outbox::new();

        registry.disconnect(BOB, &mut outbox);

        assert!(!registry.get(&first).unwrap().contains(BOB));
        assert!(!registry.get(&second).unwrap().contains(BOB));
        assert_eq!(outbox.received_by(ANN).len(), 1);
        assert_eq!(outbox.received_by(4).len(), 1);
        assert!(outbox.received_by(BOB).is_empty());
    }

    #[test]
    fn test_disconnect_discards_empty_sessions() {
        let mut registry = registry();
        let mut outbox = Outbox::new();
        registry.create_game(ANN, "Ann", &mut outbox);
        let code = created_code(&outbox, ANN);
        let mut outbox = Outbox::new();

        registry.disconnect(ANN, &mut outbox);

        assert!(registry.get(&code).is_none());
        assert!(registry.is_empty());
        assert!(outbox.is_empty());
    }

    #[test]
    fn test_host_disconnect_mid_round_promotes() {
        let mut registry = registry();
        let code = lobby(&mut registry);
        let start = Instant::now();
        let mut outbox = Outbox::new();
        registry.set_and_start_round(ANN, &code, "Q?", "A", start, &mut outbox);

        registry.disconnect(ANN, &mut outbox);

        let session = registry.get(&code).unwrap();
        assert_eq!(session.host_id(), Some(BOB));
        assert!(session.is_round_active());
    }

    #[test]
    fn test_poll_timers_runs_all_sessions() {
        let mut registry = registry();
        let first = lobby(&mut registry);
        let mut outbox = Outbox::new();
        registry.create_game(4, "Dan", &mut outbox);
        let second = created_code(&outbox, 4);
        registry.join_game(5, &second, "Eve", &mut outbox);
        registry.join_game(6, &second, "Finn", &mut outbox);

        let start = Instant::now();
        registry.set_and_start_round(ANN, &first, "Q1?", "A1", start, &mut outbox);
        registry.set_and_start_round(4, &second, "Q2?", "A2", start, &mut outbox);
        let mut outbox = Outbox::new();

        registry.poll_timers(start + Duration::from_secs(30), &mut outbox);

        assert_eq!(registry.active_rounds(), 0);
        let endings = outbox
            .messages()
            .iter()
            .filter(|m| matches!(m.packet, Packet::RoundEnded { winner: None, .. }))
            .count();
        assert_eq!(endings, 2);
    }

    #[test]
    fn test_handle_packet_dispatch() {
        let mut registry = registry();
        let mut outbox = Outbox::new();

        registry.handle_packet(
            ANN,
            Packet::CreateGame {
                name: "Ann".to_string(),
            },
            Instant::now(),
            &mut outbox,
        );
        assert_eq!(registry.len(), 1);

        let mut outbox = Outbox::new();
        registry.handle_packet(ANN, Packet::Heartbeat, Instant::now(), &mut outbox);
        assert!(outbox.is_empty());
    }

    #[test]
    fn test_long_names_are_rejected() {
        let mut registry = registry();
        let mut outbox = Outbox::new();
        let too_long = "x".repeat(1000);
        let expected = "Name must be at most 24 characters".to_string();

        registry.create_game(ANN, &too_long, &mut outbox);
        assert!(registry.is_empty());
        assert_eq!(
            single_reply(&outbox, ANN),
            Packet::InputError {
                message: expected.clone()
            }
        );

        let code = lobby(&mut registry);
        let mut outbox = Outbox::new();
        registry.join_game(4, &code, &too_long, &mut outbox);
        assert_eq!(
            single_reply(&outbox, 4),
            Packet::JoinError { message: expected }
        );
        assert_eq!(registry.get(&code).unwrap().len(), 3);
    }

    #[test]
    fn test_full_room_snapshots_fit_one_datagram() {
        let mut registry = registry();
        let mut outbox = Outbox::new();
        let longest = "\u{1F600}".repeat(MAX_NAME_LENGTH);

        registry.create_game(ANN, &longest, &mut outbox);
        let code = created_code(&outbox, ANN);
        for id in 2..=MAX_ROOM_SIZE as ParticipantId {
            registry.join_game(id, &code, &longest, &mut outbox);
        }
        assert_eq!(registry.get(&code).unwrap().len(), MAX_ROOM_SIZE);

        let mut rejected = Outbox::new();
        registry.join_game(1000, &code, "Late", &mut rejected);
        assert_eq!(
            single_reply(&rejected, 1000),
            Packet::JoinError {
                message: "Game is full".to_string()
            }
        );

        registry.set_and_start_round(ANN, &code, "Q?", "A", Instant::now(), &mut outbox);
        registry.guess(BOB, &code, "wrong", &mut outbox);
        registry.guess(CARA, &code, "a", &mut outbox);
        registry.end_game(ANN, &code, &mut outbox);

        assert!(outbox
            .messages()
            .iter()
            .any(|m| matches!(m.packet, Packet::GameEnded { .. })));
        for message in outbox.messages() {
            let size = bincode::serialize(&message.packet).unwrap().len();
            assert!(
                size <= MAX_PACKET_SIZE,
                "{} is {} bytes",
                message.packet.name(),
                size
            );
        }
    }
}
