//! Terminal game results.
//!
//! An `Outcome` is computed once and never changes; every game refuses
//! further input after it is set.

use std::fmt;

use serde::Serialize;

use crate::board::{Counts, Player};
use crate::error::Rejection;

/// Who won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Winner(Player),
    Draw,
}

/// Why the game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Reason {
    /// A side fell below `minimum` pieces.
    Attrition { minimum: usize, unit: &'static str },
    VictoryFields,
    ReachedArtemis,
    HighGarden,
    /// The side to move had no legal move.
    NoLegalMoves,
    /// Neither side can move.
    Deadlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub verdict: Verdict,
    pub reason: Reason,
}

impl Outcome {
    pub fn win(player: Player, reason: Reason) -> Self {
        Outcome {
            verdict: Verdict::Winner(player),
            reason,
        }
    }

    pub fn draw(reason: Reason) -> Self {
        Outcome {
            verdict: Verdict::Draw,
            reason,
        }
    }

    pub fn winner(&self) -> Option<Player> {
        match self.verdict {
            Verdict::Winner(p) => Some(p),
            Verdict::Draw => None,
        }
    }

    pub fn is_draw(&self) -> bool {
        self.verdict == Verdict::Draw
    }
}

/// Spells small numbers the way the rules are phrased.
pub fn number_word(n: usize) -> String {
    const WORDS: [&str; 11] = [
        "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    ];
    WORDS
        .get(n)
        .map(|w| w.to_string())
        .unwrap_or_else(|| n.to_string())
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::Attrition { minimum, unit } => {
                write!(f, "fewer than {} {unit}", number_word(*minimum))
            }
            Reason::VictoryFields => f.write_str("holds all four victory fields"),
            Reason::ReachedArtemis => f.write_str("reached Artemis"),
            Reason::HighGarden => f.write_str("seven stones in the high garden"),
            Reason::NoLegalMoves => f.write_str("no legal move"),
            Reason::Deadlock => f.write_str("neither player can move"),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.verdict, self.reason) {
            (Verdict::Draw, Reason::Attrition { .. }) => {
                write!(f, "Draw, both players have {}", self.reason)
            }
            (Verdict::Draw, _) => write!(f, "Draw, {}", self.reason),
            (Verdict::Winner(p), Reason::Attrition { .. } | Reason::NoLegalMoves) => {
                write!(f, "{p} wins, {} has {}", p.opponent(), self.reason)
            }
            (Verdict::Winner(p), Reason::HighGarden) => write!(f, "{p} wins with {}", self.reason),
            (Verdict::Winner(p), _) => write!(f, "{p} wins, {}", self.reason),
        }
    }
}

/// Attrition check: a side below `minimum` loses, both below is a draw.
pub fn attrition(counts: Counts, minimum: usize, unit: &'static str) -> Option<Outcome> {
    let reason = Reason::Attrition { minimum, unit };
    match (counts.white < minimum, counts.black < minimum) {
        (true, true) => Some(Outcome::draw(reason)),
        (true, false) => Some(Outcome::win(Player::Black, reason)),
        (false, true) => Some(Outcome::win(Player::White, reason)),
        (false, false) => None,
    }
}

/// Rejects input once the game has ended.
pub fn ensure_live(outcome: &Option<Outcome>) -> Result<(), Rejection> {
    match outcome {
        Some(_) => Err(Rejection::GameOver),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attrition_single_loser() {
        let o = attrition(Counts { white: 3, black: 9 }, 4, "stones").unwrap();
        assert_eq!(o.winner(), Some(Player::Black));
        assert_eq!(o.reason.to_string(), "fewer than four stones");
        assert_eq!(o.to_string(), "Black wins, White has fewer than four stones");
    }

    #[test]
    fn attrition_both_is_draw() {
        let o = attrition(Counts { white: 2, black: 1 }, 3, "dice").unwrap();
        assert!(o.is_draw());
        assert_eq!(o.to_string(), "Draw, both players have fewer than three dice");
    }

    #[test]
    fn attrition_none_when_above_minimum() {
        assert_eq!(attrition(Counts { white: 4, black: 4 }, 4, "stones"), None);
    }

    #[test]
    fn ensure_live_rejects_finished_game() {
        let over = Some(Outcome::win(Player::White, Reason::ReachedArtemis));
        assert_eq!(ensure_live(&over), Err(Rejection::GameOver));
        assert_eq!(ensure_live(&None), Ok(()));
    }

    #[test]
    fn number_words() {
        assert_eq!(number_word(4), "four");
        assert_eq!(number_word(12), "12");
    }
}
