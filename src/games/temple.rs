//! Temple: walk forward, leap anything, reach the far Artemis.
//!
//! The board is a fixed graph of ten rows. Stones walk to an adjacent empty
//! node that is not behind them, or leap over an adjacent stone in a
//! straight line, capturing it if it belongs to the opponent. A leap may be
//! followed by further leaps with the same stone; the chain never returns
//! to a node it already stood on.

use std::sync::OnceLock;

use super::{offered, own_stone, switch_or_stalemate, Content, Rules};
use crate::board::{
    CellId, Coord, Counts, Event, Move, Player, StoneBoard, Topology, TopologyBuilder, Zone,
};
use crate::error::{Rejection, TopologyError};
use crate::outcome::{ensure_live, Outcome, Reason};
use crate::turn::{TurnPhase, TurnState};

/// Nodes per row, top to bottom, and the row's layout height.
const ROWS: [(u8, f64); 10] = [
    (1, 5.0),
    (2, 18.0),
    (3, 31.0),
    (5, 44.0),
    (5, 57.0),
    (5, 70.0),
    (5, 83.0),
    (5, 96.0),
    (3, 109.0),
    (1, 135.0),
];

/// Links that do not follow the regular lattice of rows 3 to 7.
const IRREGULAR_LINKS: [(&str, &str); 30] = [
    ("0,0", "1,0"),
    ("0,0", "1,1"),
    ("1,0", "2,0"),
    ("1,0", "2,1"),
    ("1,1", "2,1"),
    ("1,1", "2,2"),
    ("1,0", "1,1"),
    ("2,0", "3,0"),
    ("2,0", "3,1"),
    ("2,1", "3,2"),
    ("2,2", "3,3"),
    ("2,2", "3,4"),
    ("2,0", "3,2"),
    ("2,2", "3,2"),
    ("2,0", "2,1"),
    ("2,1", "2,2"),
    ("7,0", "8,0"),
    ("7,1", "8,0"),
    ("7,2", "8,1"),
    ("7,3", "8,2"),
    ("7,4", "8,2"),
    ("8,0", "9,0"),
    ("8,1", "9,0"),
    ("8,2", "9,0"),
    ("8,0", "8,1"),
    ("8,1", "8,2"),
    ("7,0", "7,1"),
    ("7,1", "7,2"),
    ("7,2", "7,3"),
    ("7,3", "7,4"),
];

const WHITE_START: [&str; 7] = ["7,1", "7,2", "7,3", "8,0", "8,1", "8,2", "9,0"];
const BLACK_START: [&str; 6] = ["0,0", "1,0", "1,1", "2,0", "2,1", "2,2"];

fn build() -> Result<Topology, TopologyError> {
    let mut b = TopologyBuilder::new("temple");
    for (row, &(count, y)) in ROWS.iter().enumerate() {
        for col in 0..count {
            let x = 100.0 * (col as f64 + 1.0) / (count as f64 + 1.0);
            b.node(Coord::grid(row as u8, col), format!("{row},{col}"), (x, y));
        }
    }
    for (a, z) in IRREGULAR_LINKS {
        b.link_labels(a, z)?;
    }
    // Rows 3 to 7 form a lattice with both diagonals.
    for row in 3..7 {
        for col in 0..5 {
            let here = format!("{row},{col}");
            b.link_labels(&here, &format!("{},{col}", row + 1))?;
            if col < 4 {
                b.link_labels(&here, &format!("{row},{}", col + 1))?;
                b.link_labels(&here, &format!("{},{}", row + 1, col + 1))?;
            }
            if col > 0 {
                b.link_labels(&here, &format!("{},{}", row + 1, col - 1))?;
            }
        }
    }
    let top = b.lookup("0,0")?;
    b.tag(top, Zone::Artemis { goal_of: Player::White });
    let bottom = b.lookup("9,0")?;
    b.tag(bottom, Zone::Artemis { goal_of: Player::Black });
    b.build()
}

pub fn topology() -> &'static Topology {
    static TOPOLOGY: OnceLock<Topology> = OnceLock::new();
    TOPOLOGY.get_or_init(|| build().unwrap_or_else(|e| panic!("temple topology: {e}")))
}

/// White advances towards row 0, Black towards row 9.
fn forward_or_sideways(player: Player, from_row: u8, to_row: u8) -> bool {
    match player {
        Player::White => to_row <= from_row,
        Player::Black => to_row >= from_row,
    }
}

#[derive(Debug, Clone)]
pub struct Temple {
    board: StoneBoard,
    turn: TurnState,
    moves: Vec<Move>,
    /// Nodes the chaining stone has stood on this turn.
    visited: Vec<CellId>,
    outcome: Option<Outcome>,
}

impl Default for Temple {
    fn default() -> Self {
        Self::new()
    }
}

impl Temple {
    pub fn new() -> Self {
        Self::from_stones(&WHITE_START, &BLACK_START, Player::White)
            .unwrap_or_else(|e| panic!("temple start position: {e}"))
    }

    pub fn from_stones(white: &[&str], black: &[&str], to_move: Player) -> Result<Self, Rejection> {
        let mut board = StoneBoard::new(topology());
        board
            .place_labels(Player::White, white)
            .map_err(Rejection::UnknownLabel)?;
        board
            .place_labels(Player::Black, black)
            .map_err(Rejection::UnknownLabel)?;
        Ok(Temple {
            board,
            turn: TurnState::new(to_move),
            moves: Vec::new(),
            visited: Vec::new(),
            outcome: None,
        })
    }

    pub fn board(&self) -> &StoneBoard {
        &self.board
    }

    fn walks(&self, from: CellId) -> Vec<Move> {
        let t = topology();
        let Some(player) = self.board.occupant(from) else {
            return Vec::new();
        };
        let row = t.coord(from).row;
        t.neighbors(from)
            .iter()
            .filter(|&&to| {
                self.board.is_empty(to) && forward_or_sideways(player, row, t.coord(to).row)
            })
            .map(|&to| Move::Walk {
                from,
                to,
                capture: false,
                light: None,
            })
            .collect()
    }

    fn leaps(&self, from: CellId, visited: &[CellId]) -> Vec<Move> {
        let Some(player) = self.board.occupant(from) else {
            return Vec::new();
        };
        topology()
            .rays(from)
            .iter()
            .filter_map(|ray| {
                let over = ray.first();
                let to = *ray.cells.get(1)?;
                let jumped = self.board.occupant(over)?;
                if !self.board.is_empty(to) || visited.contains(&to) {
                    return None;
                }
                Some(Move::Leap {
                    from,
                    over,
                    to,
                    capture: jumped != player,
                })
            })
            .collect()
    }

    fn moves_from(&self, from: CellId) -> Vec<Move> {
        let mut moves = self.walks(from);
        moves.extend(self.leaps(from, &[]));
        moves
    }

    fn has_move(&self, player: Player) -> bool {
        self.board
            .stones_of(player)
            .any(|c| !self.moves_from(c).is_empty())
    }

    fn in_chain(&self) -> bool {
        self.turn.is_committed() && self.outcome.is_none()
    }

    fn finish_turn(&mut self, events: &mut Vec<Event>) {
        self.moves.clear();
        self.visited.clear();
        let next = self.turn.player.opponent();
        self.turn.pass_to(next);
        self.outcome = switch_or_stalemate(next, self.has_move(next), events);
    }
}

impl Rules for Temple {
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
        if self.in_chain() {
            // Only the chaining stone may be reselected.
            return if self.turn.selected == Some(cell) {
                Ok(self.moves.clone())
            } else {
                Err(Rejection::AlreadyCommitted)
            };
        }
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
        let t = topology();
        let player = self.turn.player;
        let mut events = Vec::new();

        let (from, to) = match mv {
            Move::Walk { from, to, .. } => (from, to),
            Move::Leap { from, over, to, capture } => {
                if capture {
                    if let Some(victim) = self.board.take(over) {
                        events.push(Event::Captured {
                            player: victim,
                            at: t.label(over).to_string(),
                        });
                    }
                }
                if self.visited.is_empty() {
                    self.visited.push(from);
                }
                self.visited.push(to);
                (from, to)
            }
            _ => return Err(Rejection::IllegalMove),
        };
        self.board.relocate(from, to);
        self.turn.commit(mv);
        events.insert(0, Event::moved(t, player, from, to, mv.kind()));

        if t.artemis_goal(to) == Some(player) {
            let outcome = Outcome::win(player, Reason::ReachedArtemis);
            events.push(Event::GameOver { outcome });
            self.outcome = Some(outcome);
            self.moves.clear();
            return Ok(events);
        }

        if matches!(mv, Move::Leap { .. }) {
            let next = self.leaps(to, &self.visited);
            if !next.is_empty() {
                self.turn.select(to);
                self.moves = next;
                return Ok(events);
            }
        }
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
        if !self.turn.is_committed() {
            return Err(Rejection::NoChain);
        }
        let mut events = Vec::new();
        self.finish_turn(&mut events);
        Ok(events)
    }

    fn selectable(&self) -> Vec<CellId> {
        if self.outcome.is_some() {
            return Vec::new();
        }
        if self.in_chain() {
            return self.turn.selected.into_iter().collect();
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
