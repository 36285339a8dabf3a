//! The seven rule sets.
//!
//! Every game owns its board, turn state and outcome and implements
//! `Rules`. The session layer only ever talks to games through that trait,
//! so adding a game means adding a topology, a generator and an executor.

pub mod colossus;
pub mod gardens;
pub mod mausoleum;
pub mod pharos;
pub mod pyramid;
pub mod statue;
pub mod temple;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::{CellId, Counts, Event, Move, Player, StoneBoard, Topology};
use crate::error::Rejection;
use crate::outcome::{Outcome, Reason};
use crate::turn::TurnPhase;

pub use statue::Die;

/// Which game a session plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    Colossus,
    Pyramid,
    Temple,
    Mausoleum,
    Pharos,
    Gardens,
    Statue,
}

impl GameKind {
    pub const ALL: [GameKind; 7] = [
        GameKind::Colossus,
        GameKind::Pyramid,
        GameKind::Temple,
        GameKind::Mausoleum,
        GameKind::Pharos,
        GameKind::Gardens,
        GameKind::Statue,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            GameKind::Colossus => "colossus",
            GameKind::Pyramid => "pyramid",
            GameKind::Temple => "temple",
            GameKind::Mausoleum => "mausoleum",
            GameKind::Pharos => "pharos",
            GameKind::Gardens => "gardens",
            GameKind::Statue => "statue",
        }
    }

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<GameKind> {
        let name = name.to_ascii_lowercase();
        GameKind::ALL.into_iter().find(|k| k.name() == name)
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a cell holds, independent of the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    Empty,
    Stone { owner: Player },
    Die { owner: Player, value: u8 },
    /// Bottom to top.
    Stack { discs: Vec<Player> },
}

impl Content {
    /// The player controlling the cell, if any: stone owner, die owner or
    /// top disc.
    pub fn owner(&self) -> Option<Player> {
        match self {
            Content::Empty => None,
            Content::Stone { owner } | Content::Die { owner, .. } => Some(*owner),
            Content::Stack { discs } => discs.last().copied(),
        }
    }

    pub fn from_stone(stone: Option<Player>) -> Content {
        match stone {
            Some(owner) => Content::Stone { owner },
            None => Content::Empty,
        }
    }
}

/// One game's rule set driving one board.
///
/// Selection and play never mutate anything when they return `Err`.
pub trait Rules {
    fn topology(&self) -> &'static Topology;

    /// Player whose turn it is (the winner's opponent once the game ended).
    fn to_move(&self) -> Player;

    fn outcome(&self) -> Option<&Outcome>;

    fn phase(&self) -> TurnPhase;

    /// The cell currently selected, or the piece a chain continues from.
    fn selected(&self) -> Option<CellId>;

    /// Selects `cell` and returns the moves it offers.
    fn select(&mut self, cell: CellId) -> Result<Vec<Move>, Rejection>;

    /// Moves currently on offer: the selection's moves or the chain's
    /// continuations.
    fn legal_moves(&self) -> Vec<Move>;

    /// Commits one of the offered moves and resolves its cascade.
    fn play(&mut self, mv: &Move) -> Result<Vec<Event>, Rejection>;

    /// Drops an uncommitted selection.
    fn cancel(&mut self) -> Result<(), Rejection>;

    /// Ends a chain early, committing what was played.
    fn end_turn(&mut self) -> Result<Vec<Event>, Rejection>;

    /// Cells the player to move may select right now.
    fn selectable(&self) -> Vec<CellId>;

    fn content(&self, cell: CellId) -> Content;

    /// Pieces on the board per player.
    fn counts(&self) -> Counts;

    /// Beacon ownership, for games with beacons.
    fn lit(&self, _cell: CellId) -> Option<Player> {
        None
    }

    /// Pieces held off the board, for games with a reserve.
    fn reserve(&self) -> Option<Counts> {
        None
    }
}

/// Checks that `cell` holds a stone of `player`.
pub(crate) fn own_stone(board: &StoneBoard, cell: CellId, player: Player) -> Result<(), Rejection> {
    if !board.topology().contains(cell) {
        return Err(Rejection::UnknownCell(cell));
    }
    match board.occupant(cell) {
        None => Err(Rejection::EmptyCell),
        Some(owner) if owner != player => Err(Rejection::NotYourPiece(owner)),
        Some(_) => Ok(()),
    }
}

/// Finds `mv` among the offered moves.
pub(crate) fn offered(moves: &[Move], mv: &Move) -> Result<Move, Rejection> {
    moves
        .iter()
        .find(|m| *m == mv)
        .copied()
        .ok_or(Rejection::IllegalMove)
}

/// Hands the turn to `next`, or ends the game when `next` cannot move.
///
/// Pushes the matching event and returns the stalemate outcome if any.
pub(crate) fn switch_or_stalemate(next: Player, has_move: bool, events: &mut Vec<Event>) -> Option<Outcome> {
    if has_move {
        events.push(Event::TurnEnded { next });
        None
    } else {
        let outcome = Outcome::win(next.opponent(), Reason::NoLegalMoves);
        events.push(Event::GameOver { outcome });
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_names_round_trip() {
        for kind in GameKind::ALL {
            assert_eq!(GameKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(GameKind::from_name("Pharos"), Some(GameKind::Pharos));
        assert_eq!(GameKind::from_name("chess"), None);
    }

    #[test]
    fn content_owner() {
        assert_eq!(Content::Empty.owner(), None);
        let stack = Content::Stack {
            discs: vec![Player::White, Player::Black],
        };
        assert_eq!(stack.owner(), Some(Player::Black));
        assert_eq!(
            Content::Die {
                owner: Player::White,
                value: 3
            }
            .owner(),
            Some(Player::White)
        );
    }

    #[test]
    fn stalemate_hands_the_win_to_the_mover() {
        let mut events = Vec::new();
        let outcome = switch_or_stalemate(Player::Black, false, &mut events).unwrap();
        assert_eq!(outcome.winner(), Some(Player::White));
        assert!(matches!(events[0], Event::GameOver { .. }));

        let mut events = Vec::new();
        assert_eq!(switch_or_stalemate(Player::Black, true, &mut events), None);
        assert_eq!(events, vec![Event::TurnEnded { next: Player::Black }]);
    }
}
