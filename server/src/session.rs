//! Trivia session state machine
//!
//! A session owns its roster, the current question/answer pair and the round
//! state. Every operation runs to completion on the server's main loop and
//! reports its effects by appending packets to an [`Outbox`]; nothing here
//! performs I/O.
//!
//! ## Phases
//!
//! ```text
//! Lobby ──start──▶ RoundActive ──correct guess / timeout──▶ RoundResolved
//!                      ▲                                         │
//!                      └──────────────────start──────────────────┘
//! any phase ──end──▶ Ended
//! ```
//!
//! The round countdown lives inside `Phase::RoundActive`, so a round can only be
//! active while its countdown is live, and leaving the phase (by resolution,
//! restart or end) cancels the countdown.

use crate::config::GameRules;
use crate::countdown::Countdown;
use crate::delivery::Outbox;
use crate::error::GameError;
use crate::participant::Participant;
use log::{debug, info};
use shared::{
    validate_input, validate_min_players, validate_name, Packet, ParticipantId, PlayerSummary,
    Role, SessionId, MAX_NAME_LENGTH, MAX_ROOM_SIZE,
};
use std::time::Instant;

#[derive(Debug, Clone)]
pub enum Phase {
    /// Waiting for the first round; late joins allowed
    Lobby,
    /// Accepting guesses until the countdown runs out
    RoundActive { countdown: Countdown },
    /// Last round finished; waiting for the host to start the next one
    RoundResolved,
    Ended,
}

#[derive(Debug, Clone)]
struct QuestionPair {
    question: String,
    answer: String,
}

#[derive(Debug)]
pub struct Session {
    id: SessionId,
    /// Join order, host first
    roster: Vec<Participant>,
    host_id: Option<ParticipantId>,
    current: Option<QuestionPair>,
    phase: Phase,
    round_number: u32,
    time_remaining: u32,
    rules: GameRules,
}

impl Session {
    /// Creates a session in the lobby with `host_name` as its only member.
    ///
    /// Returns `None` without side effects if the name is blank.
    pub fn create(
        id: SessionId,
        host_id: ParticipantId,
        host_name: &str,
        rules: GameRules,
    ) -> Option<Self> {
        if !validate_name(host_name) {
            debug!("Refusing to create session {} with an invalid host name", id);
            return None;
        }

        let host = Participant::new(host_id, host_name, Role::Host, rules.max_attempts);
        info!("Session {} created by {} ({})", id, host.name, host_id);

        Some(Self {
            id,
            roster: vec![host],
            host_id: Some(host_id),
            current: None,
            phase: Phase::Lobby,
            round_number: 0,
            time_remaining: rules.round_seconds,
            rules,
        })
    }

    /// Adds a contestant at the end of the roster and broadcasts the new roster
    pub fn join(
        &mut self,
        id: ParticipantId,
        name: &str,
        outbox: &mut Outbox,
    ) -> Result<(), GameError> {
        if !validate_input(name) {
            return Err(GameError::InvalidInput);
        }
        if !validate_name(name) {
            return Err(GameError::NameTooLong {
                max: MAX_NAME_LENGTH,
            });
        }
        if self.is_ended() {
            return Err(GameError::UnknownSession);
        }
        if self.is_started() {
            return Err(GameError::AlreadyStarted);
        }
        if self.contains(id) {
            return Err(GameError::AlreadyJoined);
        }
        if self.roster.len() >= MAX_ROOM_SIZE {
            return Err(GameError::GameFull);
        }

        let role = if self.roster.is_empty() {
            self.host_id = Some(id);
            Role::Host
        } else {
            Role::Contestant
        };
        self.roster
            .push(Participant::new(id, name, role, self.rules.max_attempts));
        info!("{} ({}) joined session {}", name, id, self.id);

        self.broadcast(
            outbox,
            Packet::PlayersUpdated {
                players: self.snapshot(),
            },
        );
        Ok(())
    }

    /// Removes a participant, promoting the earliest remaining joiner if the host left.
    ///
    /// Returns false if `id` was not on the roster.
    pub fn leave(&mut self, id: ParticipantId, outbox: &mut Outbox) -> bool {
        let Some(index) = self.roster.iter().position(|p| p.id == id) else {
            return false;
        };

        let departed = self.roster.remove(index);
        info!("{} ({}) left session {}", departed.name, id, self.id);

        if self.host_id == Some(id) {
            self.host_id = None;
            if let Some(successor) = self.roster.first_mut() {
                successor.role = Role::Host;
                self.host_id = Some(successor.id);
                info!(
                    "{} ({}) is now host of session {}",
                    successor.name, successor.id, self.id
                );
            }
        }

        if !self.roster.is_empty() {
            self.broadcast(
                outbox,
                Packet::PlayersUpdated {
                    players: self.snapshot(),
                },
            );
        }
        true
    }

    /// Stores the next question and resets every contestant's attempts
    pub fn set_question(&mut self, question: &str, answer: &str) -> Result<(), GameError> {
        if !validate_input(question) || !validate_input(answer) {
            return Err(GameError::InvalidQuestion);
        }

        self.current = Some(QuestionPair {
            question: question.to_string(),
            answer: answer.to_string(),
        });

        let max_attempts = self.rules.max_attempts;
        for participant in self.roster.iter_mut().filter(|p| !p.is_host()) {
            participant.attempts_remaining = max_attempts;
        }

        self.time_remaining = self.rules.round_seconds;
        Ok(())
    }

    /// Starts a round with the current question, superseding any running countdown.
    ///
    /// Without enough contestants the host gets a `StartError`. Without a
    /// question nothing happens. Returns true if a round was started.
    pub fn start_round(&mut self, now: Instant, outbox: &mut Outbox) -> bool {
        if self.is_ended() {
            return false;
        }

        if !validate_min_players(self.contestant_count(), self.rules.min_contestants) {
            if let Some(host_id) = self.host_id {
                let error = GameError::NotEnoughPlayers {
                    required: self.rules.min_contestants,
                };
                outbox.to_participant(
                    host_id,
                    Packet::StartError {
                        message: error.to_string(),
                    },
                );
            }
            return false;
        }

        let Some(question) = self.current.as_ref().map(|pair| pair.question.clone()) else {
            debug!("Session {} has no question set; not starting", self.id);
            return false;
        };

        // Replacing the phase drops any previous countdown before the new one exists
        self.phase = Phase::RoundActive {
            countdown: Countdown::start(now, self.rules.tick_interval),
        };
        self.round_number += 1;
        self.time_remaining = self.rules.round_seconds;

        info!(
            "Session {} started round {} with {} contestants",
            self.id,
            self.round_number,
            self.contestant_count()
        );

        self.broadcast(
            outbox,
            Packet::RoundStarted {
                question,
                round_number: self.round_number,
            },
        );
        self.broadcast(
            outbox,
            Packet::DashboardUpdate {
                players: self.snapshot(),
            },
        );
        true
    }

    /// Runs every countdown tick due at `now`, one at a time
    pub fn poll_timer(&mut self, now: Instant, outbox: &mut Outbox) {
        loop {
            let due = match &mut self.phase {
                Phase::RoundActive { countdown } => countdown.fire(now).then(|| countdown.fired()),
                _ => None,
            };
            let Some(tick) = due else {
                return;
            };
            self.tick(tick, outbox);
        }
    }

    fn tick(&mut self, tick: u32, outbox: &mut Outbox) {
        self.time_remaining = self.time_remaining.saturating_sub(1);
        debug!(
            "Session {} tick {}: {}s left",
            self.id, tick, self.time_remaining
        );

        self.broadcast(
            outbox,
            Packet::TimerUpdate {
                seconds: self.time_remaining,
            },
        );

        if self.time_remaining == 0 {
            info!("Session {} round {} timed out", self.id, self.round_number);
            self.resolve_round(None, outbox);
        }
    }

    /// Consumes one attempt and checks the guess against the answer
    pub fn handle_guess(&mut self, id: ParticipantId, text: &str, outbox: &mut Outbox) {
        if !validate_input(text) {
            outbox.to_participant(id, Packet::NoAnswer);
            return;
        }

        if !self.is_round_active() {
            return;
        }

        let Some(index) = self.roster.iter().position(|p| p.id == id) else {
            return;
        };

        let participant = &mut self.roster[index];
        if participant.is_host() || participant.attempts_remaining == 0 {
            return;
        }

        participant.attempts_remaining -= 1;
        let attempts_remaining = participant.attempts_remaining;
        outbox.to_participant(id, Packet::ClearInput);

        let correct = self
            .current
            .as_ref()
            .is_some_and(|pair| text.to_lowercase() == pair.answer.to_lowercase());

        if correct {
            let participant = &mut self.roster[index];
            participant.score += self.rules.points_per_correct_guess;
            let winner = participant.name.clone();
            info!(
                "{} ({}) answered round {} of session {}",
                winner, id, self.round_number, self.id
            );
            self.resolve_round(Some(winner), outbox);
        } else {
            debug!(
                "Wrong guess from {} in session {}, {} attempts left",
                id, self.id, attempts_remaining
            );
            outbox.to_participant(id, Packet::WrongGuess { attempts_remaining });
            self.broadcast(
                outbox,
                Packet::DashboardUpdate {
                    players: self.snapshot(),
                },
            );
        }
    }

    fn resolve_round(&mut self, winner: Option<String>, outbox: &mut Outbox) {
        self.phase = Phase::RoundResolved;

        let answer = self
            .current
            .as_ref()
            .map(|pair| pair.answer.clone())
            .unwrap_or_default();

        self.broadcast(outbox, Packet::RoundEnded { winner, answer });
        self.broadcast(
            outbox,
            Packet::DashboardUpdate {
                players: self.snapshot(),
            },
        );
    }

    /// Cancels any countdown and sends the final roster to everyone
    pub fn end_game(&mut self, outbox: &mut Outbox) {
        self.phase = Phase::Ended;
        info!(
            "Session {} ended after {} rounds",
            self.id, self.round_number
        );

        self.broadcast(
            outbox,
            Packet::GameEnded {
                players: self.snapshot(),
            },
        );
    }

    /// Identifier-free view of the roster in join order
    pub fn snapshot(&self) -> Vec<PlayerSummary> {
        self.roster.iter().map(Participant::summary).collect()
    }

    fn broadcast(&self, outbox: &mut Outbox, packet: Packet) {
        outbox.to_room(&self.id, self.members(), packet);
    }

    pub fn members(&self) -> Vec<ParticipantId> {
        self.roster.iter().map(|p| p.id).collect()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn roster(&self) -> &[Participant] {
        &self.roster
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.roster.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.participant(id).is_some()
    }

    pub fn host_id(&self) -> Option<ParticipantId> {
        self.host_id
    }

    pub fn is_host(&self, id: ParticipantId) -> bool {
        self.host_id == Some(id)
    }

    pub fn contestant_count(&self) -> usize {
        self.roster.iter().filter(|p| !p.is_host()).count()
    }

    pub fn current_question(&self) -> Option<&str> {
        self.current.as_ref().map(|pair| pair.question.as_str())
    }

    pub fn current_answer(&self) -> Option<&str> {
        self.current.as_ref().map(|pair| pair.answer.as_str())
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// True once a round has begun, until the game ends
    pub fn is_started(&self) -> bool {
        matches!(self.phase, Phase::RoundActive { .. } | Phase::RoundResolved)
    }

    pub fn is_round_active(&self) -> bool {
        matches!(self.phase, Phase::RoundActive { .. })
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.phase, Phase::Ended)
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    pub fn len(&self) -> usize {
        self.roster.len()
    }
}
