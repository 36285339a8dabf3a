//! Per-turn bookkeeping.
//!
//! A `TurnState` lives from the first selection of a turn until the player
//! switch. It records the selected origin and every sub-move committed so
//! far; once anything is committed the turn can be ended but not undone.

use serde::Serialize;

use crate::board::{CellId, Move, Player};
use crate::error::Rejection;

/// Where the turn controller currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    SelectOrigin,
    SelectDestination,
    /// At least one sub-move committed; more may follow.
    Chain,
    /// Gardens: discs in hand waiting to be dropped.
    Holding,
    /// Statue: the turn must move a value 1 die.
    Forced,
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnState {
    pub player: Player,
    pub selected: Option<CellId>,
    pub committed: Vec<Move>,
}

impl TurnState {
    pub fn new(player: Player) -> Self {
        TurnState {
            player,
            selected: None,
            committed: Vec::new(),
        }
    }

    pub fn is_committed(&self) -> bool {
        !self.committed.is_empty()
    }

    pub fn select(&mut self, cell: CellId) {
        self.selected = Some(cell);
    }

    pub fn commit(&mut self, mv: Move) {
        self.committed.push(mv);
    }

    /// Drops an uncommitted selection.
    pub fn cancel(&mut self) -> Result<(), Rejection> {
        if self.is_committed() {
            return Err(Rejection::AlreadyCommitted);
        }
        match self.selected.take() {
            Some(_) => Ok(()),
            None => Err(Rejection::NothingSelected),
        }
    }

    /// Discards everything and hands the turn to `next`.
    pub fn pass_to(&mut self, next: Player) {
        *self = TurnState::new(next);
    }

    pub fn phase(&self) -> TurnPhase {
        if self.is_committed() {
            TurnPhase::Chain
        } else if self.selected.is_some() {
            TurnPhase::SelectDestination
        } else {
            TurnPhase::SelectOrigin
        }
    }
}
