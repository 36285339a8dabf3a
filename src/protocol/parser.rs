//! Command parser.
//!
//! Turns one line of client input into a `Command`. Blank lines parse to
//! `None`; anything unrecognised or malformed is a `ProtocolError`.

use crate::board::Move;
use crate::games::GameKind;

/// A malformed or unknown protocol line. The session it was aimed at is
/// left untouched.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("malformed {command}: expected '{usage}'")]
    Usage {
        command: &'static str,
        usage: &'static str,
    },

    #[error("unknown game '{0}'")]
    UnknownGame(String),

    #[error("'{0}' is not a move number")]
    BadIndex(String),

    #[error("no move numbered {0} is on offer")]
    NoSuchMove(usize),

    #[error("no game in progress")]
    NoGame,

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

/// A parsed client-to-engine command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Handshake; the engine answers with its id, options and `hellook`.
    Hello,

    /// Synchronization ping; engine must reply `readyok`.
    IsReady,

    /// List the available games.
    Games,

    /// Start a fresh game of the given kind.
    NewGame { kind: GameKind },

    /// Select a cell by label.
    Select { label: String },

    /// Play the n-th move of the last offered list (zero based).
    Move { index: usize },

    /// Play a move given as JSON.
    Play { mv: Move },

    Cancel,

    EndTurn,

    Board,

    Outcome,

    /// Set an engine option: `setoption name <id> [value <x>]`.
    SetOption { name: String, value: Option<String> },

    /// Terminate the engine process.
    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `Ok(None)` for blank lines.
pub fn parse_command(line: &str) -> Result<Option<Command>, ProtocolError> {
    let trimmed = line.trim();
    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    let Some(&head) = tokens.first() else {
        return Ok(None);
    };

    let cmd = match head {
        "hello" => Command::Hello,
        "isready" => Command::IsReady,
        "games" => Command::Games,
        "cancel" => Command::Cancel,
        "endturn" => Command::EndTurn,
        "board" => Command::Board,
        "outcome" => Command::Outcome,
        "quit" => Command::Quit,

        "newgame" => parse_newgame(&tokens)?,
        "select" => parse_select(&tokens)?,
        "move" => parse_move(&tokens)?,
        "play" => parse_play(trimmed)?,
        "setoption" => parse_setoption(&tokens)?,

        other => return Err(ProtocolError::UnknownCommand(other.to_string())),
    };
    Ok(Some(cmd))
}

/// Parses `newgame <kind>`.
fn parse_newgame(tokens: &[&str]) -> Result<Command, ProtocolError> {
    let [_, name] = tokens else {
        return Err(ProtocolError::Usage {
            command: "newgame",
            usage: "newgame <game>",
        });
    };
    GameKind::from_name(name)
        .map(|kind| Command::NewGame { kind })
        .ok_or_else(|| ProtocolError::UnknownGame(name.to_string()))
}

/// Parses `select <label>`. Gardens labels contain a colon, never spaces.
fn parse_select(tokens: &[&str]) -> Result<Command, ProtocolError> {
    let [_, label] = tokens else {
        return Err(ProtocolError::Usage {
            command: "select",
            usage: "select <cell>",
        });
    };
    Ok(Command::Select {
        label: label.to_string(),
    })
}

/// Parses `move <n>`.
fn parse_move(tokens: &[&str]) -> Result<Command, ProtocolError> {
    let [_, n] = tokens else {
        return Err(ProtocolError::Usage {
            command: "move",
            usage: "move <n>",
        });
    };
    n.parse::<usize>()
        .map(|index| Command::Move { index })
        .map_err(|_| ProtocolError::BadIndex(n.to_string()))
}

/// Parses `play <json>`; the JSON may contain spaces.
fn parse_play(line: &str) -> Result<Command, ProtocolError> {
    let json = line["play".len()..].trim();
    if json.is_empty() {
        return Err(ProtocolError::Usage {
            command: "play",
            usage: "play <json move>",
        });
    }
    let mv: Move = serde_json::from_str(json)?;
    Ok(Command::Play { mv })
}

/// Parses `setoption name <id> [value <x>]`.
fn parse_setoption(tokens: &[&str]) -> Result<Command, ProtocolError> {
    let malformed = ProtocolError::Usage {
        command: "setoption",
        usage: "setoption name <id> [value <x>]",
    };
    if tokens.len() < 3 || tokens[1] != "name" {
        return Err(malformed);
    }

    let (name, value) = match tokens.iter().position(|&t| t == "value") {
        Some(vi) => {
            let name_parts = &tokens[2..vi];
            if name_parts.is_empty() {
                return Err(malformed);
            }
            let value_parts = &tokens[vi + 1..];
            let value = (!value_parts.is_empty()).then(|| value_parts.join(" "));
            (name_parts.join(" "), value)
        }
        None => (tokens[2..].join(" "), None),
    };
    Ok(Command::SetOption { name, value })
}
