//! Moves and the events they produce.
//!
//! A `Move` is one atomic displacement chosen by a player. Each variant
//! carries exactly the data needed to replay it: push targets, the cell a
//! leap passes over, the light source consumed. `Event`s are the ordered,
//! human-readable account of what a committed move caused.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::player::Player;
use super::topology::{CellId, Direction, Garden, Topology};
use crate::outcome::Outcome;

/// A single sub-move of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Move {
    /// Travel along a straight line onto an empty cell (also a pyramid
    /// descent onto an empty lower cell).
    Run { from: CellId, to: CellId },

    /// Step onto an occupied neighbour, shoving it one cell further.
    Push {
        from: CellId,
        to: CellId,
        pushed_to: CellId,
    },

    /// Shove a bottom-level pyramid stone off the edge.
    PushFall { from: CellId, to: CellId },

    /// Climb to the level above.
    Jump { from: CellId, to: CellId },

    /// Descend onto an occupied lower cell, destroying its stone.
    Smash { from: CellId, to: CellId },

    /// Hop over `over` onto the empty cell beyond it.
    Leap {
        from: CellId,
        over: CellId,
        to: CellId,
        capture: bool,
    },

    /// Step to a neighbour. `light` is the source that powers the step on
    /// the lighthouse board.
    Walk {
        from: CellId,
        to: CellId,
        capture: bool,
        light: Option<CellId>,
    },

    /// Drop the top disc of the hand.
    Drop { to: CellId },

    /// Bring a value 1 die in from the reserve.
    Place { to: CellId },

    /// Lower one of the mover's dice by one pip.
    Diminish { die: CellId },
}

impl Move {
    /// The cell the moving piece starts on, if the move has one.
    pub fn origin(&self) -> Option<CellId> {
        match *self {
            Move::Run { from, .. }
            | Move::Push { from, .. }
            | Move::PushFall { from, .. }
            | Move::Jump { from, .. }
            | Move::Smash { from, .. }
            | Move::Leap { from, .. }
            | Move::Walk { from, .. } => Some(from),
            Move::Drop { .. } | Move::Place { .. } => None,
            Move::Diminish { die } => Some(die),
        }
    }

    /// The cell the move acts on.
    pub fn destination(&self) -> CellId {
        match *self {
            Move::Run { to, .. }
            | Move::Push { to, .. }
            | Move::PushFall { to, .. }
            | Move::Jump { to, .. }
            | Move::Smash { to, .. }
            | Move::Leap { to, .. }
            | Move::Walk { to, .. }
            | Move::Drop { to }
            | Move::Place { to } => to,
            Move::Diminish { die } => die,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Move::Run { .. } => "run",
            Move::Push { .. } => "push",
            Move::PushFall { .. } => "push_fall",
            Move::Jump { .. } => "jump",
            Move::Smash { .. } => "smash",
            Move::Leap { .. } => "leap",
            Move::Walk { .. } => "walk",
            Move::Drop { .. } => "drop",
            Move::Place { .. } => "place",
            Move::Diminish { .. } => "diminish",
        }
    }

    /// Short notation using cell labels, e.g. `push 5,4 -> 5,5 (>5,6)`.
    pub fn describe(&self, topology: &Topology) -> String {
        let l = |c: CellId| topology.label(c).to_string();
        match *self {
            Move::Run { from, to } | Move::Jump { from, to } | Move::Smash { from, to } => {
                format!("{} {} -> {}", self.kind(), l(from), l(to))
            }
            Move::Push { from, to, pushed_to } => {
                format!("push {} -> {} (>{})", l(from), l(to), l(pushed_to))
            }
            Move::PushFall { from, to } => format!("push_fall {} -> {} (off)", l(from), l(to)),
            Move::Leap { from, over, to, capture } => {
                let x = if capture { "x" } else { "" };
                format!("leap {} -> {} over {}{}", l(from), l(to), x, l(over))
            }
            Move::Walk { from, to, capture, light } => {
                let x = if capture { "x" } else { "" };
                match light {
                    Some(s) => format!("walk {} -> {}{} [light {}]", l(from), x, l(to), l(s)),
                    None => format!("walk {} -> {}{}", l(from), x, l(to)),
                }
            }
            Move::Drop { to } => format!("drop {}", l(to)),
            Move::Place { to } => format!("place {}", l(to)),
            Move::Diminish { die } => format!("diminish {}", l(die)),
        }
    }
}

/// Something that happened while resolving a move.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    Moved {
        player: Player,
        kind: &'static str,
        from: String,
        to: String,
    },
    Pushed {
        player: Player,
        from: String,
        to: String,
    },
    PushedOff { player: Player, at: String },
    Smashed { player: Player, at: String },
    Captured { player: Player, at: String },
    Tilted { direction: Direction, shifted: usize },
    TiltCancelled,
    /// Removed by encirclement.
    Removed { player: Player, at: String },
    BeaconLit { player: Player, at: String },
    Dropped { player: Player, at: String },
    Staircase {
        player: Player,
        from: Garden,
        to: Garden,
        count: usize,
    },
    Placed { player: Player, at: String },
    Diminished { player: Player, at: String, value: u8 },
    Rotated { player: Player, at: String, value: u8 },
    Forced { player: Player },
    Passed { player: Player },
    TurnEnded { next: Player },
    GameOver { outcome: Outcome },
}

impl Event {
    /// A piece of `player` travelling from `from` to `to`.
    pub fn moved(topology: &Topology, player: Player, from: CellId, to: CellId, kind: &'static str) -> Event {
        Event::Moved {
            player,
            kind,
            from: topology.label(from).to_string(),
            to: topology.label(to).to_string(),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Moved { player, kind, from, to } => {
                write!(f, "{player} {kind}: {from} to {to}")
            }
            Event::Pushed { player, from, to } => {
                write!(f, "{player} stone pushed from {from} to {to}")
            }
            Event::PushedOff { player, at } => {
                write!(f, "{player} stone at {at} pushed off the pyramid")
            }
            Event::Smashed { player, at } => write!(f, "{player} stone at {at} smashed"),
            Event::Captured { player, at } => write!(f, "{player} stone at {at} captured"),
            Event::Tilted { direction, shifted } => {
                write!(f, "board tilted {direction}, {shifted} stone(s) slid")
            }
            Event::TiltCancelled => f.write_str("opposite arrows activated, no tilt"),
            Event::Removed { player, at } => {
                write!(f, "{player} stone at {at} encircled and removed")
            }
            Event::BeaconLit { player, at } => write!(f, "beacon at {at} now lit by {player}"),
            Event::Dropped { player, at } => write!(f, "{player} disc dropped on {at}"),
            Event::Staircase { player, from, to, count } => {
                write!(f, "{count} {player} stone(s) climbed from the {from} to the {to}")
            }
            Event::Placed { player, at } => write!(f, "{player} placed a die on {at}"),
            Event::Diminished { player, at, value } => {
                write!(f, "{player} die at {at} diminished to {value}")
            }
            Event::Rotated { player, at, value } => {
                write!(f, "{player} die at {at} turned to {value}")
            }
            Event::Forced { player } => write!(f, "{player} must move a value 1 die"),
            Event::Passed { player } => write!(f, "{player} has no move and passes"),
            Event::TurnEnded { next } => write!(f, "{next} to move"),
            Event::GameOver { outcome } => write!(f, "game over: {outcome}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_and_destination() {
        let m = Move::Push {
            from: CellId(1),
            to: CellId(2),
            pushed_to: CellId(3),
        };
        assert_eq!(m.origin(), Some(CellId(1)));
        assert_eq!(m.destination(), CellId(2));
        assert_eq!(Move::Drop { to: CellId(7) }.origin(), None);
        assert_eq!(Move::Diminish { die: CellId(4) }.destination(), CellId(4));
    }

    #[test]
    fn moves_serialize_with_kind_tag() {
        let m = Move::Leap {
            from: CellId(0),
            over: CellId(1),
            to: CellId(2),
            capture: true,
        };
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, r#"{"kind":"leap","from":0,"over":1,"to":2,"capture":true}"#);
        let back: Move = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn event_text_is_readable() {
        let e = Event::Staircase {
            player: Player::Black,
            from: Garden::BottomLeft,
            to: Garden::TopLeft,
            count: 6,
        };
        assert_eq!(
            e.to_string(),
            "6 Black stone(s) climbed from the bottom-left garden to the top-left garden"
        );
    }
}
