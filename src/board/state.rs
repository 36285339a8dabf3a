//! Cell contents laid over a topology.
//!
//! `Board<T>` pairs a `&'static Topology` with one `T` per node, indexed by
//! `CellId` for O(1) access. Stone games use `Board<Option<Player>>`; the
//! dice and tower games plug in their own cell types.

use serde::{Deserialize, Serialize};

use super::player::Player;
use super::topology::{CellId, Topology};

/// Per-player tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub white: usize,
    pub black: usize,
}

impl Counts {
    pub fn get(&self, player: Player) -> usize {
        match player {
            Player::White => self.white,
            Player::Black => self.black,
        }
    }

    pub fn add(&mut self, player: Player, n: usize) {
        match player {
            Player::White => self.white += n,
            Player::Black => self.black += n,
        }
    }

    /// Removes up to `n`, stopping at zero.
    pub fn remove(&mut self, player: Player, n: usize) {
        match player {
            Player::White => self.white = self.white.saturating_sub(n),
            Player::Black => self.black = self.black.saturating_sub(n),
        }
    }

    pub fn total(&self) -> usize {
        self.white + self.black
    }
}

/// Mutable contents of every cell of a static topology.
#[derive(Debug, Clone)]
pub struct Board<T> {
    topology: &'static Topology,
    cells: Vec<T>,
}

/// One stone or nothing per cell.
pub type StoneBoard = Board<Option<Player>>;

impl<T: Clone + Default> Board<T> {
    /// Creates a board with every cell at its default (empty) value.
    pub fn new(topology: &'static Topology) -> Self {
        Board {
            topology,
            cells: vec![T::default(); topology.len()],
        }
    }
}

impl<T> Board<T> {
    pub fn topology(&self) -> &'static Topology {
        self.topology
    }

    pub fn get(&self, cell: CellId) -> &T {
        &self.cells[cell.index()]
    }

    pub fn get_mut(&mut self, cell: CellId) -> &mut T {
        &mut self.cells[cell.index()]
    }

    pub fn set(&mut self, cell: CellId, value: T) {
        self.cells[cell.index()] = value;
    }

    /// Cells paired with their contents, in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (CellId, &T)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, v)| (CellId(i as u16), v))
    }
}

impl StoneBoard {
    pub fn occupant(&self, cell: CellId) -> Option<Player> {
        *self.get(cell)
    }

    pub fn is_empty(&self, cell: CellId) -> bool {
        self.get(cell).is_none()
    }

    /// Places stones by label. Unknown labels are returned as the error.
    pub fn place_labels(&mut self, player: Player, labels: &[&str]) -> Result<(), String> {
        for label in labels {
            let cell = self
                .topology
                .find(label)
                .ok_or_else(|| label.to_string())?;
            self.set(cell, Some(player));
        }
        Ok(())
    }

    /// Moves whatever is on `from` to `to`, leaving `from` empty.
    pub fn relocate(&mut self, from: CellId, to: CellId) {
        let stone = self.get_mut(from).take();
        self.set(to, stone);
    }

    /// Removes and returns the stone on `cell`.
    pub fn take(&mut self, cell: CellId) -> Option<Player> {
        self.get_mut(cell).take()
    }

    pub fn stones_of(&self, player: Player) -> impl Iterator<Item = CellId> + '_ {
        self.iter()
            .filter(move |(_, v)| **v == Some(player))
            .map(|(c, _)| c)
    }

    pub fn counts(&self) -> Counts {
        let mut counts = Counts::default();
        for (_, v) in self.iter() {
            if let Some(p) = v {
                counts.add(*p, 1);
            }
        }
        counts
    }

    /// Number of neighbours of `cell` holding a stone of `player`.
    pub fn neighbors_of(&self, cell: CellId, player: Player) -> usize {
        self.topology
            .neighbors(cell)
            .iter()
            .filter(|&&n| self.occupant(n) == Some(player))
            .count()
    }

    pub fn empty_neighbors(&self, cell: CellId) -> usize {
        self.topology
            .neighbors(cell)
            .iter()
            .filter(|&&n| self.is_empty(n))
            .count()
    }
}
