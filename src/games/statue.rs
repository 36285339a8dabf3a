//! Statue: dice that stride as far as their pips.
//!
//! A turn is one of three actions: bring a value 1 die in from the reserve,
//! stride an own die up to its value in orthogonal steps (rotating it
//! afterwards), or diminish an own die to force the opponent into moving a
//! value 1 die next turn. Value 1 dice cannot be captured.

use std::sync::OnceLock;

use serde::Serialize;
use tracing::debug;

use super::{offered, switch_or_stalemate, Content, Rules};
use crate::board::{Board, CellId, Coord, Counts, Event, Move, Player, Topology, TopologyBuilder};
use crate::error::{Rejection, TopologyError};
use crate::outcome::{attrition, ensure_live, Outcome};
use crate::turn::{TurnPhase, TurnState};

const SIZE: u8 = 11;
/// Rows and columns whose crossings are cut out of the board.
const HOLLOW: [u8; 4] = [3, 4, 6, 7];
const RESERVE: usize = 8;
const MIN_DICE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Die {
    pub owner: Player,
    pub value: u8,
}

impl Die {
    /// Value after a completed stride: 1 through 6, then back to 1.
    pub const fn rotated(self) -> Die {
        Die {
            owner: self.owner,
            value: self.value % 6 + 1,
        }
    }
}

pub type DiceBoard = Board<Option<Die>>;

fn build() -> Result<Topology, TopologyError> {
    let mut b = TopologyBuilder::new("statue");
    for row in 0..SIZE {
        for col in 0..SIZE {
            if HOLLOW.contains(&row) && HOLLOW.contains(&col) {
                continue;
            }
            b.node(Coord::grid(row, col), format!("{row},{col}"), (col as f64, row as f64));
        }
    }
    b.link_orthogonal();
    b.build()
}

pub fn topology() -> &'static Topology {
    static TOPOLOGY: OnceLock<Topology> = OnceLock::new();
    TOPOLOGY.get_or_init(|| build().unwrap_or_else(|e| panic!("statue topology: {e}")))
}

/// The die currently striding and how far it may still go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stride {
    at: CellId,
    steps_left: u8,
}

#[derive(Debug, Clone)]
pub struct Statue {
    board: DiceBoard,
    reserve: Counts,
    turn: TurnState,
    /// Only value 1 dice may move this turn.
    forced: bool,
    stride: Option<Stride>,
    moves: Vec<Move>,
    outcome: Option<Outcome>,
}

impl Default for Statue {
    fn default() -> Self {
        Self::new()
    }
}

impl Statue {
    /// An empty board with eight dice in each reserve.
    pub fn new() -> Self {
        Statue {
            board: DiceBoard::new(topology()),
            reserve: Counts {
                white: RESERVE,
                black: RESERVE,
            },
            turn: TurnState::new(Player::White),
            forced: false,
            stride: None,
            moves: Vec::new(),
            outcome: None,
        }
    }

    /// Places `(label, owner, value)` dice; reserves stay full.
    pub fn from_dice(dice: &[(&str, Player, u8)], to_move: Player) -> Result<Self, Rejection> {
        let mut game = Statue::new();
        for &(label, owner, value) in dice {
            let cell = topology()
                .find(label)
                .ok_or_else(|| Rejection::UnknownLabel(label.to_string()))?;
            game.board.set(cell, Some(Die { owner, value }));
        }
        game.turn = TurnState::new(to_move);
        Ok(game)
    }

    pub fn board(&self) -> &DiceBoard {
        &self.board
    }

    pub fn is_forced(&self) -> bool {
        self.forced
    }

    fn die(&self, cell: CellId) -> Option<Die> {
        *self.board.get(cell)
    }

    fn dice_of(&self, player: Player) -> impl Iterator<Item = (CellId, Die)> + '_ {
        self.board
            .iter()
            .filter_map(move |(c, d)| d.filter(|d| d.owner == player).map(|d| (c, d)))
    }

    /// Single stride steps for the die on `from`.
    fn steps(&self, from: CellId) -> Vec<Move> {
        let Some(die) = self.die(from) else {
            return Vec::new();
        };
        topology()
            .neighbors(from)
            .iter()
            .filter_map(|&to| match self.die(to) {
                None => Some(false),
                Some(d) if d.owner != die.owner && d.value > 1 => Some(true),
                Some(_) => None,
            }
            .map(|capture| Move::Walk {
                from,
                to,
                capture,
                light: None,
            }))
            .collect()
    }

    fn has_movable_one(&self, player: Player) -> bool {
        self.dice_of(player)
            .any(|(c, d)| d.value == 1 && !self.steps(c).is_empty())
    }

    fn can_diminish(&self, die: Die) -> bool {
        !self.forced && die.value > 1 && self.has_movable_one(die.owner.opponent())
    }

    /// Everything selecting `cell` offers the player to move.
    fn moves_from(&self, cell: CellId) -> Result<Vec<Move>, Rejection> {
        let player = self.turn.player;
        let Some(die) = self.die(cell) else {
            if self.forced {
                return Err(Rejection::ForcedMove);
            }
            if self.reserve.get(player) == 0 {
                return Err(Rejection::ReserveEmpty);
            }
            return Ok(vec![Move::Place { to: cell }]);
        };
        if die.owner != player {
            return Err(Rejection::NotYourPiece(die.owner));
        }
        if self.forced && die.value != 1 {
            return Err(Rejection::ForcedMove);
        }
        let mut moves = self.steps(cell);
        if self.can_diminish(die) {
            moves.push(Move::Diminish { die: cell });
        }
        Ok(moves)
    }

    fn has_move(&self) -> bool {
        let player = self.turn.player;
        let can_place = self.reserve.get(player) > 0 && self.board.iter().any(|(_, d)| d.is_none());
        if !self.forced && can_place {
            return true;
        }
        self.dice_of(player)
            .any(|(c, _)| self.moves_from(c).is_ok_and(|m| !m.is_empty()))
    }

    fn totals(&self) -> Counts {
        let mut totals = self.reserve;
        for (_, d) in self.board.iter() {
            if let Some(d) = d {
                totals.add(d.owner, 1);
            }
        }
        totals
    }

    /// Rotates the striding die and ends the turn.
    fn complete_stride(&mut self, events: &mut Vec<Event>) {
        if let Some(stride) = self.stride.take() {
            if let Some(die) = self.die(stride.at) {
                let die = die.rotated();
                self.board.set(stride.at, Some(die));
                events.push(Event::Rotated {
                    player: die.owner,
                    at: topology().label(stride.at).to_string(),
                    value: die.value,
                });
            }
        }
        self.finish_turn(false, events);
    }

    fn finish_turn(&mut self, force_next: bool, events: &mut Vec<Event>) {
        self.stride = None;
        self.moves.clear();
        if let Some(outcome) = attrition(self.totals(), MIN_DICE, "dice") {
            events.push(Event::GameOver { outcome });
            self.outcome = Some(outcome);
            return;
        }
        let next = self.turn.player.opponent();
        self.turn.pass_to(next);
        self.forced = force_next;
        if force_next {
            events.push(Event::Forced { player: next });
        }
        self.outcome = switch_or_stalemate(next, self.has_move(), events);
    }

    fn step(&mut self, from: CellId, to: CellId, events: &mut Vec<Event>) {
        let t = topology();
        let player = self.turn.player;
        let steps_left = match self.stride {
            Some(stride) => stride.steps_left,
            None => self.die(from).map_or(0, |d| d.value),
        };
        if let Some(victim) = self.board.get_mut(to).take() {
            events.push(Event::Captured {
                player: victim.owner,
                at: t.label(to).to_string(),
            });
        }
        let die = self.board.get_mut(from).take();
        self.board.set(to, die);
        events.insert(0, Event::moved(t, player, from, to, "stride"));
        self.stride = Some(Stride {
            at: to,
            steps_left: steps_left.saturating_sub(1),
        });
    }
}

impl Rules for Statue {
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
        } else if self.forced && !self.turn.is_committed() {
            TurnPhase::Forced
        } else {
            self.turn.phase()
        }
    }

    fn selected(&self) -> Option<CellId> {
        self.turn.selected
    }

    fn select(&mut self, cell: CellId) -> Result<Vec<Move>, Rejection> {
        ensure_live(&self.outcome)?;
        if !topology().contains(cell) {
            return Err(Rejection::UnknownCell(cell));
        }
        if let Some(stride) = self.stride {
            return if stride.at == cell {
                Ok(self.moves.clone())
            } else {
                Err(Rejection::AlreadyCommitted)
            };
        }
        let moves = self.moves_from(cell)?;
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

        match mv {
            Move::Place { to } => {
                self.reserve.remove(player, 1);
                self.board.set(to, Some(Die { owner: player, value: 1 }));
                events.push(Event::Placed {
                    player,
                    at: t.label(to).to_string(),
                });
                self.finish_turn(false, &mut events);
            }
            Move::Diminish { die } => {
                if let Some(d) = self.board.get_mut(die).as_mut() {
                    d.value -= 1;
                    events.push(Event::Diminished {
                        player,
                        at: t.label(die).to_string(),
                        value: d.value,
                    });
                }
                self.finish_turn(true, &mut events);
            }
            Move::Walk { from, to, .. } => {
                self.turn.commit(mv);
                self.step(from, to, &mut events);
                let next = self.steps(to);
                let exhausted = self.stride.map_or(true, |s| s.steps_left == 0);
                if exhausted || next.is_empty() {
                    debug!(at = t.label(to), "stride complete");
                    self.complete_stride(&mut events);
                } else {
                    self.turn.select(to);
                    self.moves = next;
                }
            }
            _ => return Err(Rejection::IllegalMove),
        }
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
        if self.stride.is_none() {
            return Err(Rejection::NoChain);
        }
        let mut events = Vec::new();
        self.complete_stride(&mut events);
        Ok(events)
    }

    fn selectable(&self) -> Vec<CellId> {
        if self.outcome.is_some() {
            return Vec::new();
        }
        if let Some(stride) = self.stride {
            return vec![stride.at];
        }
        topology()
            .cells()
            .filter(|&c| self.moves_from(c).is_ok_and(|m| !m.is_empty()))
            .collect()
    }

    fn content(&self, cell: CellId) -> Content {
        match self.die(cell) {
            Some(Die { owner, value }) => Content::Die { owner, value },
            None => Content::Empty,
        }
    }

    fn counts(&self) -> Counts {
        let mut counts = Counts::default();
        for (_, d) in self.board.iter() {
            if let Some(d) = d {
                counts.add(d.owner, 1);
            }
        }
        counts
    }

    fn reserve(&self) -> Option<Counts> {
        Some(self.reserve)
    }
}
