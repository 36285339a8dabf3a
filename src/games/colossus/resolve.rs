//! Tilts and the Hades sweep.
//!
//! A tilt slides every stone one cell at a time towards the arrow's
//! direction, leading edge first, until a full pass moves nothing. Every
//! step a stone takes onto an arrow cell queues a follow-up tilt, even if
//! the stone slides on past it. Follow-up tilts run before the board is
//! checked for encircled stones. The total number of tilts per move is
//! bounded by the board size.

use tracing::debug;

use crate::board::{CellId, Direction, Event, StoneBoard};
use crate::resolve::{fixed_point, surrounded};

/// Cells in scan order for a tilt towards `dir`: the leading edge first.
fn scan_order(board: &StoneBoard, dir: Direction) -> Vec<CellId> {
    let topology = board.topology();
    let mut cells: Vec<CellId> = topology.cells().collect();
    cells.sort_by_key(|&c| {
        let coord = topology.coord(c);
        let (row, col) = (coord.row as i32, coord.col as i32);
        match dir {
            Direction::Up => (row, col),
            Direction::Down => (-row, col),
            Direction::Left => (col, row),
            Direction::Right => (-col, row),
        }
    });
    cells
}

/// Result of one tilt.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Tilt {
    /// Distinct stones that moved.
    pub shifted: usize,
    /// Arrows stepped onto during the tilt, in step order. A stone that
    /// slides across an arrow still activates it.
    pub activated: Vec<Direction>,
}

/// Slides everything towards `dir` until stable.
pub fn tilt(board: &mut StoneBoard, dir: Direction) -> Tilt {
    let topology = board.topology();
    let order = scan_order(board, dir);
    // Current positions of stones that have moved at least once.
    let mut moved: Vec<CellId> = Vec::new();
    let mut activated = Vec::new();
    fixed_point(topology.len(), || {
        let mut changed = false;
        for &cell in &order {
            if board.is_empty(cell) {
                continue;
            }
            let Some(next) = topology.offset(cell, dir) else {
                continue;
            };
            if !board.is_empty(next) {
                continue;
            }
            board.relocate(cell, next);
            activated.extend(topology.arrow(next));
            match moved.iter_mut().find(|c| **c == cell) {
                Some(pos) => *pos = next,
                None => moved.push(next),
            }
            changed = true;
        }
        changed
    });
    Tilt {
        shifted: moved.len(),
        activated,
    }
}

/// True if a batch of arrow activations contains two opposite directions.
pub fn cancels(batch: &[Direction]) -> bool {
    batch.iter().any(|d| batch.contains(&d.opposite()))
}

/// Removes every stone whose four neighbours are all occupied. Edge cells
/// have fewer than four neighbours and are never encircled.
pub fn hades(board: &mut StoneBoard, events: &mut Vec<Event>) -> usize {
    let topology = board.topology();
    let view: &StoneBoard = board;
    let doomed: Vec<CellId> = topology
        .cells()
        .filter(|&c| !view.is_empty(c) && topology.neighbors(c).len() == 4 && surrounded(view, c))
        .collect();
    for &cell in &doomed {
        if let Some(player) = board.take(cell) {
            events.push(Event::Removed {
                player,
                at: topology.label(cell).to_string(),
            });
        }
    }
    doomed.len()
}

/// Runs a batch of arrow activations and everything they trigger.
///
/// Returns the number of tilts performed. `budget` caps the tilts left for
/// this move.
pub fn cascade(
    board: &mut StoneBoard,
    batch: &[Direction],
    budget: &mut usize,
    events: &mut Vec<Event>,
) -> usize {
    if batch.is_empty() {
        return 0;
    }
    if cancels(batch) {
        events.push(Event::TiltCancelled);
        return 0;
    }
    let mut unique: Vec<Direction> = Vec::with_capacity(batch.len());
    for &dir in batch {
        if !unique.contains(&dir) {
            unique.push(dir);
        }
    }

    let mut tilts = 0;
    for dir in unique {
        if *budget == 0 {
            debug!("tilt budget exhausted");
            break;
        }
        *budget -= 1;
        let result = tilt(board, dir);
        debug!(%dir, shifted = result.shifted, "board tilted");
        events.push(Event::Tilted {
            direction: dir,
            shifted: result.shifted,
        });
        tilts += 1;
        tilts += cascade(board, &result.activated, budget, events);
        hades(board, events);
    }
    tilts
}
