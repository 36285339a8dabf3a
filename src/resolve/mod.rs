//! Cascade resolution helpers.
//!
//! Tilts and encirclement sweeps are repeated until a full pass changes
//! nothing. `fixed_point` runs such a pass with an explicit iteration bound
//! so a faulty pass can never spin forever.

use crate::board::{CellId, StoneBoard};

/// Runs `pass` until it reports no change or `bound` passes have run.
/// Returns how many passes changed something.
pub fn fixed_point<F: FnMut() -> bool>(bound: usize, mut pass: F) -> usize {
    let mut changed = 0;
    for _ in 0..bound {
        if !pass() {
            break;
        }
        changed += 1;
    }
    changed
}

/// True if `cell` has neighbours and every one of them is occupied.
pub fn surrounded(board: &StoneBoard, cell: CellId) -> bool {
    let neighbors = board.topology().neighbors(cell);
    !neighbors.is_empty() && neighbors.iter().all(|&n| !board.is_empty(n))
}
