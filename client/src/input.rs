//! Client input parsing: typed lines become commands

use shared::{validate_input, validate_name, MAX_NAME_LENGTH};
use thiserror::Error;

/// A parsed line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create { name: String },
    Join { session_id: String, name: String },
    /// Starts the first round, or the next one once a round has resolved
    Start { question: String, answer: String },
    End,
    Help,
    Quit,
    /// Any line that is not a command
    Guess(String),
}

/// Locally rejected input, reported without contacting the server
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Enter your name")]
    MissingName,
    #[error("Enter name and Game ID")]
    MissingJoinFields,
    #[error("Enter both question and answer")]
    MissingQuestion,
    #[error("Name must be at most {} characters", MAX_NAME_LENGTH)]
    NameTooLong,
    #[error("Unknown command {0} (type /help)")]
    UnknownCommand(String),
}

pub const HELP_TEXT: &str = "\
Commands:
  /create <name>                  host a new game
  /join <code> <name>             join a game by its code
  /start <question> | <answer>    start the next round (host only)
  /end                            end the game for everyone (host only)
  /help                           show this message
  /quit                           leave
Anything else you type during a round is sent as a guess.";

/// Parses one line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Command>, InputError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    if !line.starts_with('/') {
        return Ok(Some(Command::Guess(line.to_string())));
    }

    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let parsed = match command.to_ascii_lowercase().as_str() {
        "/create" => {
            if !validate_input(rest) {
                return Err(InputError::MissingName);
            }
            if !validate_name(rest) {
                return Err(InputError::NameTooLong);
            }
            Command::Create {
                name: rest.to_string(),
            }
        }
        "/join" => {
            let (session_id, name) = rest
                .split_once(char::is_whitespace)
                .map(|(code, name)| (code.trim(), name.trim()))
                .filter(|(code, name)| validate_input(code) && validate_input(name))
                .ok_or(InputError::MissingJoinFields)?;
            if !validate_name(name) {
                return Err(InputError::NameTooLong);
            }
            Command::Join {
                session_id: session_id.to_string(),
                name: name.to_string(),
            }
        }
        "/start" => {
            let (question, answer) = rest
                .split_once('|')
                .map(|(q, a)| (q.trim(), a.trim()))
                .filter(|(q, a)| validate_input(q) && validate_input(a))
                .ok_or(InputError::MissingQuestion)?;
            Command::Start {
                question: question.to_string(),
                answer: answer.to_string(),
            }
        }
        "/end" => Command::End,
        "/help" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        _ => return Err(InputError::UnknownCommand(command.to_string())),
    };

    Ok(Some(parsed))
}
