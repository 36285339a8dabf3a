//! Per-turn light bookkeeping.
//!
//! Every friendly stone supplies one unit of light per turn, and every
//! beacon lit by the mover supplies one more as long as no opponent stands
//! on it. Light travels along orthogonal lines of sight that opponent
//! stones block.

use crate::board::{CellId, Player, StoneBoard, ORTHOGONAL};

/// Light spent so far this turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LightLedger {
    /// Stones whose own light is used up, by current position.
    piece_spent: Vec<CellId>,
    /// Beacons whose light is used up.
    beacon_spent: Vec<CellId>,
}

impl LightLedger {
    pub fn clear(&mut self) {
        self.piece_spent.clear();
        self.beacon_spent.clear();
    }

    pub fn is_fresh(&self) -> bool {
        self.piece_spent.is_empty() && self.beacon_spent.is_empty()
    }

    fn piece_available(&self, board: &StoneBoard, player: Player, cell: CellId) -> bool {
        board.occupant(cell) == Some(player) && !self.piece_spent.contains(&cell)
    }

    fn beacon_available(
        &self,
        board: &StoneBoard,
        lit: &[Option<Player>],
        player: Player,
        cell: CellId,
    ) -> bool {
        lit[cell.index()] == Some(player)
            && board.occupant(cell) != Some(player.opponent())
            && !self.beacon_spent.contains(&cell)
    }

    /// True if `cell` can still give `player` a unit of light.
    pub fn available(
        &self,
        board: &StoneBoard,
        lit: &[Option<Player>],
        player: Player,
        cell: CellId,
    ) -> bool {
        self.piece_available(board, player, cell) || self.beacon_available(board, lit, player, cell)
    }

    /// Light sources able to power a step of the stone on `mover`: the
    /// stone itself, then anything in unobstructed line of sight.
    pub fn sources(&self, board: &StoneBoard, lit: &[Option<Player>], mover: CellId) -> Vec<CellId> {
        let Some(player) = board.occupant(mover) else {
            return Vec::new();
        };
        let topology = board.topology();
        let mut sources = Vec::new();
        if self.available(board, lit, player, mover) {
            sources.push(mover);
        }
        for dir in ORTHOGONAL {
            let mut cursor = topology.offset(mover, dir);
            while let Some(cell) = cursor {
                if board.occupant(cell) == Some(player.opponent()) {
                    break;
                }
                if self.available(board, lit, player, cell) {
                    sources.push(cell);
                }
                cursor = topology.offset(cell, dir);
            }
        }
        sources
    }

    /// Uses one unit from `source`: the stone's own light first, then the
    /// beacon's.
    pub fn consume(&mut self, board: &StoneBoard, lit: &[Option<Player>], player: Player, source: CellId) {
        if self.piece_available(board, player, source) {
            self.piece_spent.push(source);
        } else if self.beacon_available(board, lit, player, source) {
            self.beacon_spent.push(source);
        }
    }

    /// Follows a stone that moved from `from` to `to`.
    pub fn repoint(&mut self, from: CellId, to: CellId) {
        for cell in self.piece_spent.iter_mut().filter(|c| **c == from) {
            *cell = to;
        }
    }
}
