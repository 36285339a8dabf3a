//! Mausoleum: sliding stones on a hexagon, captured by encirclement.
//!
//! Nine rows of 4 to 8 cells with hexagonal adjacency. A stone slides as
//! far as it can along one of its six lines. After every move each stone
//! with no empty neighbour is removed if more opponents than friends
//! surround it; removals repeat until the board is stable.

use std::sync::OnceLock;

use super::{offered, own_stone, switch_or_stalemate, Content, Rules};
use crate::board::{
    CellId, Coord, Counts, Event, Move, Player, StoneBoard, Topology, TopologyBuilder,
};
use crate::error::{Rejection, TopologyError};
use crate::movegen::slide_targets;
use crate::outcome::{attrition, ensure_live, Outcome};
use crate::resolve::fixed_point;
use crate::turn::{TurnPhase, TurnState};

pub const ROW_LENGTHS: [u8; 9] = [4, 5, 6, 7, 8, 7, 6, 5, 4];
const MIN_STONES: usize = 4;
const PADDING: f64 = 5.0;

fn position(row: u8, col: u8) -> (f64, f64) {
    let widest = ROW_LENGTHS[4] as f64;
    let step_x = (100.0 - 2.0 * PADDING) / (widest - 1.0);
    let step_y = (100.0 - 2.0 * PADDING) / (ROW_LENGTHS.len() as f64 - 1.0);
    let indent = (widest - ROW_LENGTHS[row as usize] as f64) * step_x / 2.0;
    (
        PADDING + indent + col as f64 * step_x,
        PADDING + row as f64 * step_y,
    )
}

/// Hexagonal neighbours in W, E, NW, NE, SW, SE order.
fn hex_neighbors(row: u8, col: u8) -> Vec<(u8, u8)> {
    let len = |r: u8| ROW_LENGTHS[r as usize];
    let last = len(row) - 1;
    let mut out = Vec::with_capacity(6);
    if col > 0 {
        out.push((row, col - 1));
    }
    if col < last {
        out.push((row, col + 1));
    }
    let mut vertical = |other: u8| {
        if len(row) < len(other) {
            out.push((other, col));
            out.push((other, col + 1));
        } else {
            if col > 0 {
                out.push((other, col - 1));
            }
            if col < last {
                out.push((other, col));
            }
        }
    };
    if row > 0 {
        vertical(row - 1);
    }
    if (row as usize) < ROW_LENGTHS.len() - 1 {
        vertical(row + 1);
    }
    out
}

fn build() -> Result<Topology, TopologyError> {
    let mut b = TopologyBuilder::new("mausoleum");
    for (row, &len) in ROW_LENGTHS.iter().enumerate() {
        let row = row as u8;
        for col in 0..len {
            b.node(Coord::grid(row, col), format!("{row},{col}"), position(row, col));
        }
    }
    // Arcs are added one way per node; the builder checks that every arc
    // is matched by its reverse.
    for (row, &len) in ROW_LENGTHS.iter().enumerate() {
        let row = row as u8;
        for col in 0..len {
            let here = b.lookup(&format!("{row},{col}"))?;
            for (r, c) in hex_neighbors(row, col) {
                let there = b.lookup(&format!("{r},{c}"))?;
                b.arc(here, there);
            }
        }
    }
    b.build()
}

pub fn topology() -> &'static Topology {
    static TOPOLOGY: OnceLock<Topology> = OnceLock::new();
    TOPOLOGY.get_or_init(|| build().unwrap_or_else(|e| panic!("mausoleum topology: {e}")))
}

/// Stones that currently qualify for removal.
fn doomed(board: &StoneBoard) -> Vec<CellId> {
    board
        .topology()
        .cells()
        .filter(|&c| match board.occupant(c) {
            Some(owner) => {
                board.empty_neighbors(c) == 0
                    && board.neighbors_of(c, owner.opponent()) > board.neighbors_of(c, owner)
            }
            None => false,
        })
        .collect()
}

/// Removes encircled stones to a fixed point. Returns how many went.
pub fn sweep(board: &mut StoneBoard, events: &mut Vec<Event>) -> usize {
    let topology = board.topology();
    let mut removed = 0;
    fixed_point(topology.len(), || {
        let batch = doomed(board);
        for &cell in &batch {
            if let Some(player) = board.take(cell) {
                events.push(Event::Removed {
                    player,
                    at: topology.label(cell).to_string(),
                });
            }
        }
        removed += batch.len();
        !batch.is_empty()
    });
    removed
}

#[derive(Debug, Clone)]
pub struct Mausoleum {
    board: StoneBoard,
    turn: TurnState,
    moves: Vec<Move>,
    outcome: Option<Outcome>,
}

impl Default for Mausoleum {
    fn default() -> Self {
        Self::new()
    }
}

impl Mausoleum {
    /// White fills the two top rows, Black the two bottom rows.
    pub fn new() -> Self {
        let mut board = StoneBoard::new(topology());
        for cell in topology().cells() {
            match topology().coord(cell).row {
                0 | 1 => board.set(cell, Some(Player::White)),
                7 | 8 => board.set(cell, Some(Player::Black)),
                _ => {}
            }
        }
        Mausoleum {
            board,
            turn: TurnState::new(Player::White),
            moves: Vec::new(),
            outcome: None,
        }
    }

    pub fn from_stones(white: &[&str], black: &[&str], to_move: Player) -> Result<Self, Rejection> {
        let mut board = StoneBoard::new(topology());
        board
            .place_labels(Player::White, white)
            .map_err(Rejection::UnknownLabel)?;
        board
            .place_labels(Player::Black, black)
            .map_err(Rejection::UnknownLabel)?;
        Ok(Mausoleum {
            board,
            turn: TurnState::new(to_move),
            moves: Vec::new(),
            outcome: None,
        })
    }

    pub fn board(&self) -> &StoneBoard {
        &self.board
    }

    /// A stone with no empty neighbour is trapped and cannot move.
    pub fn is_trapped(&self, cell: CellId) -> bool {
        !self.board.is_empty(cell) && self.board.empty_neighbors(cell) == 0
    }

    fn moves_from(&self, from: CellId) -> Vec<Move> {
        if self.is_trapped(from) {
            return Vec::new();
        }
        slide_targets(&self.board, from)
            .into_iter()
            .map(|to| Move::Run { from, to })
            .collect()
    }

    fn has_move(&self, player: Player) -> bool {
        self.board
            .stones_of(player)
            .any(|c| !self.moves_from(c).is_empty())
    }

    fn finish_turn(&mut self, events: &mut Vec<Event>) {
        self.moves.clear();
        if let Some(outcome) = attrition(self.board.counts(), MIN_STONES, "stones") {
            events.push(Event::GameOver { outcome });
            self.outcome = Some(outcome);
            return;
        }
        let next = self.turn.player.opponent();
        self.turn.pass_to(next);
        self.outcome = switch_or_stalemate(next, self.has_move(next), events);
    }
}

impl Rules for Mausoleum {
    fn topology(&self) -> &'static Topology {
        topology()
    }

    fn to_move(&self) -> Player {
        self.turn.player
    }

    fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    fn phase(&self) -> TurnPhase {
        if self.outcome.is_some() {
            TurnPhase::GameOver
        } else {
            self.turn.phase()
        }
    }

    fn selected(&self) -> Option<CellId> {
        self.turn.selected
    }

    fn select(&mut self, cell: CellId) -> Result<Vec<Move>, Rejection> {
        ensure_live(&self.outcome)?;
        own_stone(&self.board, cell, self.turn.player)?;
        let moves = self.moves_from(cell);
        if moves.is_empty() {
            return Err(Rejection::NoLegalMoves);
        }
        self.turn.select(cell);
        self.moves = moves.clone();
        Ok(moves)
    }

    fn legal_moves(&self) -> Vec<Move> {
        self.moves.clone()
    }

    fn play(&mut self, mv: &Move) -> Result<Vec<Event>, Rejection> {
        ensure_live(&self.outcome)?;
        if self.turn.selected.is_none() {
            return Err(Rejection::NothingSelected);
        }
        let mv = offered(&self.moves, mv)?;
        let Move::Run { from, to } = mv else {
            return Err(Rejection::IllegalMove);
        };
        self.turn.commit(mv);
        let mut events = vec![Event::moved(topology(), self.turn.player, from, to, "slide")];
        self.board.relocate(from, to);
        sweep(&mut self.board, &mut events);
        self.finish_turn(&mut events);
        Ok(events)
    }

    fn cancel(&mut self) -> Result<(), Rejection> {
        ensure_live(&self.outcome)?;
        self.turn.cancel()?;
        self.moves.clear();
        Ok(())
    }

    fn end_turn(&mut self) -> Result<Vec<Event>, Rejection> {
        ensure_live(&self.outcome)?;
        Err(Rejection::NoChain)
    }

    fn selectable(&self) -> Vec<CellId> {
        if self.outcome.is_some() {
            return Vec::new();
        }
        self.board
            .stones_of(self.turn.player)
            .filter(|&c| !self.moves_from(c).is_empty())
            .collect()
    }

    fn content(&self, cell: CellId) -> Content {
        Content::from_stone(self.board.occupant(cell))
    }

    fn counts(&self) -> Counts {
        self.board.counts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Reason;

    fn cell(label: &str) -> CellId {
        topology().find(label).unwrap()
    }

    #[test]
    fn hexagon_shape() {
        let t = topology();
        assert_eq!(t.len(), 52);
        assert_eq!(t.neighbors(cell("4,3")).len(), 6);
        assert_eq!(t.neighbors(cell("0,0")).len(), 3);
        assert_eq!(t.neighbors(cell("4,0")).len(), 3);
        // Each cell has one ray per neighbour.
        for c in t.cells() {
            assert_eq!(t.rays(c).len(), t.neighbors(c).len());
        }
    }

    #[test]
    fn diagonal_rays_cross_the_middle_row() {
        let t = topology();
        let ray = t
            .rays(cell("0,0"))
            .iter()
            .find(|r| r.first() == cell("1,0"))
            .unwrap();
        let labels: Vec<&str> = ray.cells.iter().map(|&c| t.label(c)).collect();
        assert_eq!(labels, vec!["1,0", "2,0", "3,0", "4,0"]);
    }

    #[test]
    fn opening_stones_are_trapped_in_the_back_row() {
        let mut game = Mausoleum::new();
        assert_eq!(game.counts(), Counts { white: 9, black: 9 });
        assert!(game.is_trapped(cell("0,0")));
        assert_eq!(game.select(cell("0,0")), Err(Rejection::NoLegalMoves));
        assert!(game.select(cell("1,0")).is_ok());
    }

    #[test]
    fn slides_stop_before_the_first_stone() {
        let game = Mausoleum::from_stones(&["5,6"], &["5,2"], Player::White).unwrap();
        let moves = game.moves_from(cell("5,6"));
        assert!(moves.contains(&Move::Run {
            from: cell("5,6"),
            to: cell("5,3")
        }));
        assert!(!moves.iter().any(|m| m.destination() == cell("5,4")));
    }

    #[test]
    fn outnumbered_stone_is_removed_and_attrition_decides() {
        let mut game = Mausoleum::from_stones(
            &["4,2", "4,4", "3,2", "3,3", "5,2", "5,6"],
            &["4,3", "8,0", "8,1", "8,3"],
            Player::White,
        )
        .unwrap();
        game.select(cell("5,6")).unwrap();
        let events = game
            .play(&Move::Run {
                from: cell("5,6"),
                to: cell("5,3"),
            })
            .unwrap();
        assert!(events.contains(&Event::Removed {
            player: Player::Black,
            at: "4,3".to_string()
        }));
        let outcome = game.outcome().copied().unwrap();
        assert_eq!(outcome.winner(), Some(Player::White));
        assert_eq!(
            outcome.reason,
            Reason::Attrition {
                minimum: 4,
                unit: "stones"
            }
        );
        assert_eq!(outcome.reason.to_string(), "fewer than four stones");
    }

    #[test]
    fn friends_protect_an_encircled_stone() {
        // 4,3 is surrounded, but three of its six neighbours are black.
        let mut board = StoneBoard::new(topology());
        board
            .place_labels(Player::White, &["4,2", "3,2", "5,2"])
            .unwrap();
        board
            .place_labels(Player::Black, &["4,3", "4,4", "3,3", "5,3"])
            .unwrap();
        let mut events = Vec::new();
        assert_eq!(sweep(&mut board, &mut events), 0);
        assert_eq!(board.occupant(cell("4,3")), Some(Player::Black));
    }

    #[test]
    fn sweep_is_idempotent() {
        let mut board = StoneBoard::new(topology());
        board
            .place_labels(Player::White, &["4,2", "4,4", "3,2", "3,3", "5,2", "5,3"])
            .unwrap();
        board.place_labels(Player::Black, &["4,3"]).unwrap();
        let mut events = Vec::new();
        assert_eq!(sweep(&mut board, &mut events), 1);
        let before = board.counts();
        assert_eq!(sweep(&mut board, &mut events), 0);
        assert_eq!(board.counts(), before);
    }
}
