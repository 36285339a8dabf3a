//! Move patterns shared across games.
//!
//! Games with stones on a graph reuse the same few shapes: running along a
//! ray, sliding to the end of a ray, and pushing a neighbour one cell on.
//! Each game's own generator combines these with its special rules.

use crate::board::{CellId, Move, StoneBoard};

/// Every empty cell along each ray from `from`, stopping at the first
/// occupied cell.
pub fn run_targets(board: &StoneBoard, from: CellId) -> Vec<CellId> {
    let mut targets = Vec::new();
    for ray in board.topology().rays(from) {
        for &cell in &ray.cells {
            if !board.is_empty(cell) {
                break;
            }
            targets.push(cell);
        }
    }
    targets
}

/// The farthest reachable empty cell along each ray: the last empty cell
/// before the first occupied one, or the edge.
pub fn slide_targets(board: &StoneBoard, from: CellId) -> Vec<CellId> {
    board
        .topology()
        .rays(from)
        .iter()
        .filter_map(|ray| {
            ray.cells
                .iter()
                .take_while(|&&c| board.is_empty(c))
                .last()
                .copied()
        })
        .collect()
}

/// The displacement recorded by the most recent push. `from` is where the
/// victim stood and the pusher now stands; `to` is where the victim landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastPush {
    pub from: CellId,
    pub to: CellId,
}

impl LastPush {
    /// True when a push by the stone on `mover` of `victim` onto `beyond`
    /// would put a stone back on `from` out of `to`. That covers the pushed
    /// stone shoving the pusher back as well as anyone shoving it straight
    /// home.
    pub fn forbids(&self, mover: CellId, victim: CellId, beyond: CellId) -> bool {
        let straight_back = victim == self.to && beyond == self.from;
        let shoves_pusher = mover == self.to && victim == self.from;
        straight_back || shoves_pusher
    }
}

/// An occupied neighbour along a ray and the cell behind it.
///
/// `beyond` is `None` when the ray ends at the victim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushTarget {
    pub victim: CellId,
    pub beyond: Option<CellId>,
}

/// Occupied neighbours that could be shoved: the cell behind each is either
/// empty or off the board. Victims with an occupied cell behind are skipped.
pub fn push_targets(board: &StoneBoard, from: CellId) -> Vec<PushTarget> {
    board
        .topology()
        .rays(from)
        .iter()
        .filter_map(|ray| {
            let victim = ray.first();
            if board.is_empty(victim) {
                return None;
            }
            match ray.cells.get(1) {
                Some(&beyond) if board.is_empty(beyond) => Some(PushTarget {
                    victim,
                    beyond: Some(beyond),
                }),
                Some(_) => None,
                None => Some(PushTarget {
                    victim,
                    beyond: None,
                }),
            }
        })
        .collect()
}

/// Runs plus on-board pushes, honouring the anti-oscillation marker.
pub fn runs_and_pushes(board: &StoneBoard, from: CellId, last_push: Option<LastPush>) -> Vec<Move> {
    let mut moves: Vec<Move> = run_targets(board, from)
        .into_iter()
        .map(|to| Move::Run { from, to })
        .collect();
    for target in push_targets(board, from) {
        let Some(beyond) = target.beyond else { continue };
        if last_push.is_some_and(|lp| lp.forbids(from, target.victim, beyond)) {
            continue;
        }
        moves.push(Move::Push {
            from,
            to: target.victim,
            pushed_to: beyond,
        });
    }
    moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Coord, Player, Topology, TopologyBuilder};
    use std::sync::OnceLock;

    /// A 1x6 strip.
    fn strip() -> &'static Topology {
        static T: OnceLock<Topology> = OnceLock::new();
        T.get_or_init(|| {
            let mut b = TopologyBuilder::new("strip");
            for c in 0..6u8 {
                b.node(Coord::grid(0, c), format!("{c}"), (c as f64, 0.0));
            }
            b.link_orthogonal();
            b.build().unwrap()
        })
    }

    fn board(white: &[&str], black: &[&str]) -> StoneBoard {
        let mut b = StoneBoard::new(strip());
        b.place_labels(Player::White, white).unwrap();
        b.place_labels(Player::Black, black).unwrap();
        b
    }

    fn cell(label: &str) -> CellId {
        strip().find(label).unwrap()
    }

    #[test]
    fn run_stops_before_first_stone() {
        let b = board(&["1"], &["4"]);
        let mut t = run_targets(&b, cell("1"));
        t.sort();
        assert_eq!(t, vec![cell("0"), cell("2"), cell("3")]);
    }

    #[test]
    fn slide_reaches_only_the_far_end() {
        let b = board(&["1"], &["4"]);
        let mut t = slide_targets(&b, cell("1"));
        t.sort();
        assert_eq!(t, vec![cell("0"), cell("3")]);
    }

    #[test]
    fn push_needs_room_behind() {
        let b = board(&["1"], &["2", "3"]);
        assert!(push_targets(&b, cell("1")).is_empty());

        let b = board(&["1"], &["2"]);
        assert_eq!(
            push_targets(&b, cell("1")),
            vec![PushTarget {
                victim: cell("2"),
                beyond: Some(cell("3"))
            }]
        );
    }

    #[test]
    fn push_at_edge_has_no_beyond() {
        let b = board(&["4"], &["5"]);
        assert_eq!(
            push_targets(&b, cell("4")),
            vec![PushTarget {
                victim: cell("5"),
                beyond: None
            }]
        );
        // Nothing to push on board, so no Push move either.
        assert!(runs_and_pushes(&b, cell("4"), None)
            .iter()
            .all(|m| matches!(m, Move::Run { .. })));
    }

    #[test]
    fn last_push_blocks_the_straight_return() {
        // Black was just pushed from 3 to 4; White at 5 may not shove it back.
        let b = board(&["5"], &["4"]);
        let marker = LastPush {
            from: cell("3"),
            to: cell("4"),
        };
        let moves = runs_and_pushes(&b, cell("5"), Some(marker));
        assert!(!moves.iter().any(|m| matches!(m, Move::Push { .. })));
        let moves = runs_and_pushes(&b, cell("5"), None);
        assert!(moves.iter().any(|m| matches!(m, Move::Push { .. })));
    }

    #[test]
    fn pushed_stone_cannot_shove_the_pusher_back() {
        // White pushed from 2 into 3, sending Black on to 4.
        let b = board(&["3"], &["4"]);
        let marker = LastPush {
            from: cell("3"),
            to: cell("4"),
        };
        let undo = Move::Push {
            from: cell("4"),
            to: cell("3"),
            pushed_to: cell("2"),
        };
        assert!(!runs_and_pushes(&b, cell("4"), Some(marker)).contains(&undo));
        assert!(runs_and_pushes(&b, cell("4"), None).contains(&undo));
        // Other stones are unaffected.
        assert!(marker.forbids(cell("4"), cell("3"), cell("2")));
        assert!(!marker.forbids(cell("1"), cell("2"), cell("3")));
    }
}
