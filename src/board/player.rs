//! The two sides of every game.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A player colour. White always opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    White,
    Black,
}

/// Both players in turn order.
pub const ALL_PLAYERS: [Player; 2] = [Player::White, Player::Black];

impl Player {
    /// Returns the other player.
    pub const fn opponent(self) -> Player {
        match self {
            Player::White => Player::Black,
            Player::Black => Player::White,
        }
    }

    /// Dense index for per-player arrays.
    pub const fn index(self) -> usize {
        match self {
            Player::White => 0,
            Player::Black => 1,
        }
    }

    /// Lowercase protocol name.
    pub const fn name(self) -> &'static str {
        match self {
            Player::White => "white",
            Player::Black => "black",
        }
    }

    /// Parses a player from its lowercase name.
    pub fn from_name(s: &str) -> Option<Player> {
        match s {
            "white" => Some(Player::White),
            "black" => Some(Player::Black),
            _ => None,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::White => f.write_str("White"),
            Player::Black => f.write_str("Black"),
        }
    }
}
