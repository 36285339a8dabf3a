//! Error types shared by every game.
//!
//! `Rejection` is the only error a player can trigger; it never mutates
//! state. `TopologyError` describes a malformed static board table and is
//! treated as fatal when a game's topology is first built.

use crate::board::{CellId, Player};

/// Why a selection or move was refused. The game state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("the game is over")]
    GameOver,

    #[error("cell {0} is not on this board")]
    UnknownCell(CellId),

    #[error("no cell is labelled '{0}'")]
    UnknownLabel(String),

    #[error("there is no piece on that cell")]
    EmptyCell,

    #[error("that piece belongs to {0}")]
    NotYourPiece(Player),

    #[error("this piece has no legal moves")]
    NoLegalMoves,

    #[error("that move is not legal here")]
    IllegalMove,

    #[error("a move has already been committed this turn")]
    AlreadyCommitted,

    #[error("nothing is selected")]
    NothingSelected,

    #[error("nothing has been played this turn")]
    NoChain,

    #[error("discs remain in hand")]
    HandNotEmpty,

    #[error("a forced turn must move a value 1 die")]
    ForcedMove,

    #[error("the reserve is empty")]
    ReserveEmpty,
}

/// A defect in a static board table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    #[error("{board}: arc {from} -> {to} references a missing node")]
    DanglingArc {
        board: &'static str,
        from: usize,
        to: usize,
    },

    #[error("{board}: node '{label}' is connected to itself")]
    SelfLoop { board: &'static str, label: String },

    #[error("{board}: arc '{from}' -> '{to}' is listed twice")]
    DuplicateArc {
        board: &'static str,
        from: String,
        to: String,
    },

    #[error("{board}: arc '{from}' -> '{to}' has no reverse")]
    Asymmetric {
        board: &'static str,
        from: String,
        to: String,
    },

    #[error("{board}: label '{label}' is used by more than one node")]
    DuplicateLabel { board: &'static str, label: String },

    #[error("{board}: no node is labelled '{label}'")]
    MissingLabel { board: &'static str, label: String },
}
