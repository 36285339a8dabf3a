//! Discs in hand and where they may go.
//!
//! A hand remembers where it was lifted from and every cell a disc has been
//! dropped on this turn. Lifting is deferred to the first drop so that an
//! unplayed selection leaves the board untouched.

use crate::board::{Board, CellId, Player};

/// Stacks of discs, bottom to top.
pub type Stacks = Board<Vec<Player>>;

/// Tallest stack a playing-field cell may hold.
pub const MAX_HEIGHT: usize = 5;

pub fn top(stacks: &Stacks, cell: CellId) -> Option<Player> {
    stacks.get(cell).last().copied()
}

fn is_garden(stacks: &Stacks, cell: CellId) -> bool {
    stacks.topology().garden(cell).is_some()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hand {
    source: CellId,
    /// Still held, bottom to top.
    discs: Vec<Player>,
    /// Cells dropped on so far.
    path: Vec<CellId>,
}

impl Hand {
    /// Picks the top `count` discs of `source`.
    pub fn pick(stacks: &Stacks, source: CellId, count: usize) -> Hand {
        let stack = stacks.get(source);
        let start = stack.len().saturating_sub(count);
        Hand {
            source,
            discs: stack[start..].to_vec(),
            path: Vec::new(),
        }
    }

    pub fn source(&self) -> CellId {
        self.source
    }

    pub fn discs(&self) -> &[Player] {
        &self.discs
    }

    pub fn len(&self) -> usize {
        self.discs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.discs.is_empty()
    }

    /// True once the first disc has been dropped.
    pub fn is_lifted(&self) -> bool {
        !self.path.is_empty()
    }

    /// Where the next disc is dropped from.
    pub fn current(&self) -> CellId {
        self.path.last().copied().unwrap_or(self.source)
    }

    fn accepts(&self, stacks: &Stacks, player: Player, cell: CellId) -> bool {
        let stack = stacks.get(cell);
        if is_garden(stacks, cell) {
            return stack.last().map_or(true, |&t| t == player);
        }
        if stack.len() >= MAX_HEIGHT {
            return false;
        }
        // Topping up the cell just dropped on is always allowed.
        cell == self.current() || stack.last() != Some(&player)
    }

    /// Cells the next disc may be dropped on, ignoring whether the rest of
    /// the hand can follow. The current cell comes first.
    pub fn targets(&self, stacks: &Stacks, player: Player) -> Vec<CellId> {
        let current = self.current();
        let mut targets = Vec::new();
        if self.is_lifted() && self.accepts(stacks, player, current) {
            targets.push(current);
        }
        for &n in stacks.topology().neighbors(current) {
            if n != self.source && !self.path.contains(&n) && self.accepts(stacks, player, n) {
                targets.push(n);
            }
        }
        targets
    }

    /// Drops the top disc on `to`, lifting the hand off its source first if
    /// this is the first drop. Returns the disc dropped.
    pub fn drop_on(&mut self, stacks: &mut Stacks, to: CellId) -> Option<Player> {
        if !self.is_lifted() {
            let source = stacks.get_mut(self.source);
            let keep = source.len().saturating_sub(self.discs.len());
            source.truncate(keep);
        }
        let disc = self.discs.pop()?;
        stacks.get_mut(to).push(disc);
        self.path.push(to);
        Some(disc)
    }

    /// Depth-first search for a way to place every remaining disc.
    pub fn can_finish(&self, stacks: &Stacks, player: Player) -> bool {
        if self.is_empty() {
            return true;
        }
        self.targets(stacks, player)
            .into_iter()
            .any(|to| self.leaves_finishable(stacks, player, to))
    }

    fn leaves_finishable(&self, stacks: &Stacks, player: Player, to: CellId) -> bool {
        let mut hand = self.clone();
        let mut stacks = stacks.clone();
        hand.drop_on(&mut stacks, to);
        hand.can_finish(&stacks, player)
    }

    /// Targets from which the rest of the hand can still be placed.
    pub fn drops(&self, stacks: &Stacks, player: Player) -> Vec<CellId> {
        self.targets(stacks, player)
            .into_iter()
            .filter(|&to| self.leaves_finishable(stacks, player, to))
            .collect()
    }
}
