//! Colossus: runs and pushes on a cross-shaped board that tilts.
//!
//! The 9x9 core is extended by a three-cell arm in the middle of each side.
//! The outermost arm cells carry arrows; a stone stepping onto one, by a
//! move or during a tilt, tilts the whole board that way. Any stone whose
//! four neighbours are all occupied falls into Hades.

pub mod resolve;

use std::sync::OnceLock;

use tracing::debug;

use super::{offered, own_stone, switch_or_stalemate, Content, Rules};
use crate::board::{
    CellId, Coord, Counts, Direction, Event, Move, Player, StoneBoard, Topology, TopologyBuilder,
    Zone,
};
use crate::error::{Rejection, TopologyError};
use crate::movegen::{runs_and_pushes, LastPush};
use crate::outcome::{attrition, ensure_live, Outcome};
use crate::turn::{TurnPhase, TurnState};

const SIZE: u8 = 11;
const MIN_STONES: usize = 4;

const WHITE_START: [&str; 12] = [
    "1,7", "1,8", "1,9", "2,8", "2,9", "3,9", "7,1", "8,1", "8,2", "9,1", "9,2", "9,3",
];
const BLACK_START: [&str; 12] = [
    "1,1", "1,2", "1,3", "2,1", "2,2", "3,1", "7,9", "8,8", "8,9", "9,7", "9,8", "9,9",
];

fn is_active(row: u8, col: u8) -> bool {
    let core = |x: u8| (1..=9).contains(&x);
    let arm = |x: u8| (4..=6).contains(&x);
    (core(row) && core(col))
        || (arm(col) && (row == 0 || row == SIZE - 1))
        || (arm(row) && (col == 0 || col == SIZE - 1))
}

fn build() -> Result<Topology, TopologyError> {
    let mut b = TopologyBuilder::new("colossus");
    for row in 0..SIZE {
        for col in 0..SIZE {
            if is_active(row, col) {
                b.node(Coord::grid(row, col), format!("{row},{col}"), (col as f64, row as f64));
            }
        }
    }
    b.link_orthogonal();
    for (label, dir) in [
        ("0,5", Direction::Up),
        ("10,5", Direction::Down),
        ("5,0", Direction::Left),
        ("5,10", Direction::Right),
    ] {
        let cell = b.lookup(label)?;
        b.tag(cell, Zone::Arrow(dir));
    }
    b.build()
}

/// The shared Colossus board.
pub fn topology() -> &'static Topology {
    static TOPOLOGY: OnceLock<Topology> = OnceLock::new();
    TOPOLOGY.get_or_init(|| build().unwrap_or_else(|e| panic!("colossus topology: {e}")))
}

#[derive(Debug, Clone)]
pub struct Colossus {
    board: StoneBoard,
    turn: TurnState,
    last_push: Option<LastPush>,
    moves: Vec<Move>,
    outcome: Option<Outcome>,
}

impl Default for Colossus {
    fn default() -> Self {
        Self::new()
    }
}

impl Colossus {
    /// The standard opening position, White to move.
    pub fn new() -> Self {
        Self::from_stones(&WHITE_START, &BLACK_START, Player::White)
            .unwrap_or_else(|e| panic!("colossus start position: {e}"))
    }

    /// A custom position.
    pub fn from_stones(white: &[&str], black: &[&str], to_move: Player) -> Result<Self, Rejection> {
        let mut board = StoneBoard::new(topology());
        board
            .place_labels(Player::White, white)
            .map_err(Rejection::UnknownLabel)?;
        board
            .place_labels(Player::Black, black)
            .map_err(Rejection::UnknownLabel)?;
        Ok(Colossus {
            board,
            turn: TurnState::new(to_move),
            last_push: None,
            moves: Vec::new(),
            outcome: None,
        })
    }

    pub fn board(&self) -> &StoneBoard {
        &self.board
    }

    pub fn last_push(&self) -> Option<LastPush> {
        self.last_push
    }

    fn moves_from(&self, cell: CellId) -> Vec<Move> {
        runs_and_pushes(&self.board, cell, self.last_push)
    }

    fn has_move(&self, player: Player) -> bool {
        self.board
            .stones_of(player)
            .any(|c| !self.moves_from(c).is_empty())
    }

    /// Applies the displacement and returns the arrows stones landed on.
    fn displace(&mut self, mv: Move, events: &mut Vec<Event>) -> Vec<Direction> {
        let topology = topology();
        let player = self.turn.player;
        let mut arrows = Vec::new();
        match mv {
            Move::Run { from, to } => {
                self.board.relocate(from, to);
                self.last_push = None;
                events.push(Event::moved(topology, player, from, to, "run"));
                arrows.extend(topology.arrow(to));
            }
            Move::Push { from, to, pushed_to } => {
                let victim = self.board.occupant(to);
                self.board.relocate(to, pushed_to);
                self.board.relocate(from, to);
                self.last_push = Some(LastPush { from: to, to: pushed_to });
                events.push(Event::moved(topology, player, from, to, "push"));
                if let Some(victim) = victim {
                    events.push(Event::Pushed {
                        player: victim,
                        from: topology.label(to).to_string(),
                        to: topology.label(pushed_to).to_string(),
                    });
                }
                arrows.extend(topology.arrow(to));
                arrows.extend(topology.arrow(pushed_to));
            }
            _ => {}
        }
        arrows
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

impl Rules for Colossus {
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
        self.turn.commit(mv);

        let mut events = Vec::new();
        let arrows = self.displace(mv, &mut events);
        if !arrows.is_empty() {
            let mut budget = topology().len();
            let tilts = resolve::cascade(&mut self.board, &arrows, &mut budget, &mut events);
            if tilts > 0 {
                self.last_push = None;
            }
            debug!(tilts, "tilt cascade resolved");
        }
        resolve::hades(&mut self.board, &mut events);
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
