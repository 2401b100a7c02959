use crate::game::ClientGameState;
use shared::{leaderboard, Packet, PlayerSummary};
use std::io::{self, Write};

/// Seconds at or below which the timer is shown as a warning
pub const TIMER_WARNING_SECONDS: u32 = 10;

/// Timer lines are printed every ten seconds and for the final five
pub fn should_announce(seconds: u32) -> bool {
    seconds % 10 == 0 || seconds <= 5
}

/// Writes human-readable game output to any writer
pub struct Renderer<W: Write> {
    out: W,
}

impl Renderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    pub fn notice(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "{}", message)?;
        self.out.flush()
    }

    pub fn help(&mut self) -> io::Result<()> {
        self.notice(crate::input::HELP_TEXT)
    }

    /// Renders a packet that has already been applied to `state`
    pub fn render(&mut self, packet: &Packet, state: &ClientGameState) -> io::Result<()> {
        match packet {
            Packet::Connected { client_id } => {
                writeln!(
                    self.out,
                    "Connected as client {}. Type /help for commands.",
                    client_id
                )?;
            }
            Packet::Disconnected { reason } => {
                writeln!(self.out, "Disconnected: {}", reason)?;
            }
            Packet::GameCreated { session_id } => {
                writeln!(
                    self.out,
                    "Game created. Share the code {} with your players.",
                    session_id
                )?;
                writeln!(self.out, "Start with /start <question> | <answer>")?;
            }
            Packet::JoinedGame { session_id } => {
                writeln!(
                    self.out,
                    "Joined game {}. Waiting for the host to start.",
                    session_id
                )?;
            }
            Packet::InputError { message }
            | Packet::JoinError { message }
            | Packet::StartError { message } => {
                writeln!(self.out, "Error: {}", message)?;
            }
            Packet::NoAnswer => {
                writeln!(self.out, "Please type an answer first.")?;
            }
            Packet::PlayersUpdated { players } => {
                writeln!(self.out, "Players:")?;
                for player in players {
                    if player.is_host() {
                        writeln!(self.out, "  {} (Host)", player.name)?;
                    } else {
                        writeln!(self.out, "  {}", player.name)?;
                    }
                }
            }
            Packet::RoundStarted {
                question,
                round_number,
            } => {
                writeln!(self.out, "=== Round {} ===", round_number)?;
                writeln!(self.out, "{}", question)?;
                if state.is_host {
                    writeln!(self.out, "Waiting for guesses...")?;
                } else {
                    writeln!(self.out, "Type your answer and press Enter.")?;
                }
            }
            Packet::TimerUpdate { seconds } => {
                if should_announce(*seconds) {
                    let marker = if *seconds <= TIMER_WARNING_SECONDS {
                        "! "
                    } else {
                        ""
                    };
                    writeln!(self.out, "{}{}s", marker, seconds)?;
                }
            }
            Packet::RoundEnded { winner, answer } => {
                match winner {
                    Some(winner) => writeln!(self.out, "{} WON!", winner)?,
                    None => writeln!(self.out, "Time's up!")?,
                }
                writeln!(self.out, "Answer: {}", answer)?;
                if state.is_host {
                    writeln!(
                        self.out,
                        "Next round: /start <question> | <answer>, or /end to finish"
                    )?;
                }
            }
            Packet::WrongGuess { attempts_remaining } => {
                writeln!(self.out, "Wrong! {} attempts left.", attempts_remaining)?;
            }
            Packet::DashboardUpdate { players } => {
                writeln!(self.out, "Scores:")?;
                self.scoreboard(players)?;
            }
            Packet::GameEnded { players } => {
                writeln!(self.out, "Game over! Final leaderboard:")?;
                self.final_leaderboard(players)?;
            }
            _ => {}
        }

        self.out.flush()
    }

    fn scoreboard(&mut self, players: &[PlayerSummary]) -> io::Result<()> {
        for (index, player) in leaderboard(players).into_iter().enumerate() {
            let leader = if index == 0 && player.score > 0 {
                " *"
            } else {
                ""
            };
            writeln!(
                self.out,
                "  #{} {} {} pts{}",
                index + 1,
                player.name,
                player.score,
                leader
            )?;
        }
        Ok(())
    }

    fn final_leaderboard(&mut self, players: &[PlayerSummary]) -> io::Result<()> {
        let ranked = leaderboard(players);
        if ranked.is_empty() {
            writeln!(self.out, "  (no contestants)")?;
        }
        for (index, player) in ranked.into_iter().enumerate() {
            writeln!(
                self.out,
                "  #{:<3} {:<20} {} pts",
                index + 1,
                player.name,
                player.score
            )?;
        }
        Ok(())
    }
}
