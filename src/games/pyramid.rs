//! Pyramid: four stacked levels, climbing up and crashing down.
//!
//! Levels 0 to 2 are square rings (7, 5 and 3 cells across) and level 3 is
//! the single apex cell. Stones run and push along their own ring, jump one
//! level up to the inward-adjacent cell, and descend outward through every
//! lower level, smashing the first stone they land on. The four corners of
//! level 2 are victory fields.

use std::sync::OnceLock;

use super::{offered, own_stone, switch_or_stalemate, Content, Rules};
use crate::board::{
    CellId, Coord, Counts, Event, Move, Player, StoneBoard, Topology, TopologyBuilder, Zone,
    ORTHOGONAL,
};
use crate::error::{Rejection, TopologyError};
use crate::movegen::{push_targets, runs_and_pushes, LastPush};
use crate::outcome::{attrition, ensure_live, Outcome, Reason};
use crate::turn::{TurnPhase, TurnState};

/// Edge length of each level, bottom first.
pub const LEVEL_SIZES: [u8; 4] = [7, 5, 3, 1];
const MIN_STONES: usize = 4;

fn on_rim(size: u8, row: u8, col: u8) -> bool {
    row == 0 || col == 0 || row == size - 1 || col == size - 1
}

fn build() -> Result<Topology, TopologyError> {
    let mut b = TopologyBuilder::new("pyramid");
    for (level, &size) in LEVEL_SIZES.iter().enumerate() {
        let level = level as u8;
        for row in 0..size {
            for col in 0..size {
                if !on_rim(size, row, col) {
                    continue;
                }
                // Levels are centred over each other.
                let position = ((col + level) as f64, (row + level) as f64);
                let cell = b.node(
                    Coord::new(level, row, col),
                    format!("{level},{row},{col}"),
                    position,
                );
                let corner = (row == 0 || row == size - 1) && (col == 0 || col == size - 1);
                if level == 2 && corner {
                    b.tag(cell, Zone::VictoryField);
                }
            }
        }
    }
    b.link_orthogonal();
    b.build()
}

pub fn topology() -> &'static Topology {
    static TOPOLOGY: OnceLock<Topology> = OnceLock::new();
    TOPOLOGY.get_or_init(|| build().unwrap_or_else(|e| panic!("pyramid topology: {e}")))
}

/// Climbs: the cell one level up, inward-adjacent in each direction.
fn jump_targets(board: &StoneBoard, from: CellId) -> Vec<CellId> {
    let t = board.topology();
    let c = t.coord(from);
    let (l, r, col) = (c.layer as i32, c.row as i32, c.col as i32);
    ORTHOGONAL
        .iter()
        .filter_map(|dir| {
            let (dr, dc) = dir.delta();
            t.at(l + 1, r + dr - 1, col + dc - 1)
        })
        .filter(|&cell| board.is_empty(cell))
        .collect()
}

/// Descends outward through every lower level. Empty cells are landing
/// spots; the first occupied one is smashed and ends the line.
fn descent_moves(board: &StoneBoard, from: CellId) -> Vec<Move> {
    let t = board.topology();
    let c = t.coord(from);
    let (l, r, col) = (c.layer as i32, c.row as i32, c.col as i32);
    let mut moves = Vec::new();
    for dir in ORTHOGONAL {
        let (dr, dc) = dir.delta();
        for k in 1..=l {
            let Some(to) = t.at(l - k, r + k * dr + k, col + k * dc + k) else {
                break;
            };
            if board.is_empty(to) {
                moves.push(Move::Run { from, to });
            } else {
                moves.push(Move::Smash { from, to });
                break;
            }
        }
    }
    moves
}

#[derive(Debug, Clone)]
pub struct Pyramid {
    board: StoneBoard,
    turn: TurnState,
    last_push: Option<LastPush>,
    moves: Vec<Move>,
    outcome: Option<Outcome>,
}

impl Default for Pyramid {
    fn default() -> Self {
        Self::new()
    }
}

impl Pyramid {
    /// White on the bottom row of level 0, Black on the top row.
    pub fn new() -> Self {
        let white: Vec<String> = (0..7).map(|c| format!("0,6,{c}")).collect();
        let black: Vec<String> = (0..7).map(|c| format!("0,0,{c}")).collect();
        let white: Vec<&str> = white.iter().map(String::as_str).collect();
        let black: Vec<&str> = black.iter().map(String::as_str).collect();
        Self::from_stones(&white, &black, Player::White)
            .unwrap_or_else(|e| panic!("pyramid start position: {e}"))
    }

    pub fn from_stones(white: &[&str], black: &[&str], to_move: Player) -> Result<Self, Rejection> {
        let mut board = StoneBoard::new(topology());
        board
            .place_labels(Player::White, white)
            .map_err(Rejection::UnknownLabel)?;
        board
            .place_labels(Player::Black, black)
            .map_err(Rejection::UnknownLabel)?;
        Ok(Pyramid {
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

    fn moves_from(&self, from: CellId) -> Vec<Move> {
        let mut moves = runs_and_pushes(&self.board, from, self.last_push);
        if self.board.topology().coord(from).layer == 0 {
            moves.extend(
                push_targets(&self.board, from)
                    .into_iter()
                    .filter(|p| p.beyond.is_none())
                    .map(|p| Move::PushFall { from, to: p.victim }),
            );
        }
        moves.extend(
            jump_targets(&self.board, from)
                .into_iter()
                .map(|to| Move::Jump { from, to }),
        );
        moves.extend(descent_moves(&self.board, from));
        moves
    }

    fn has_move(&self, player: Player) -> bool {
        self.board
            .stones_of(player)
            .any(|c| !self.moves_from(c).is_empty())
    }

    fn displace(&mut self, mv: Move, events: &mut Vec<Event>) {
        let t = topology();
        let player = self.turn.player;
        let label = |c: CellId| t.label(c).to_string();
        if let Some(from) = mv.origin() {
            events.push(Event::moved(t, player, from, mv.destination(), mv.kind()));
        }
        match mv {
            Move::Run { from, to } | Move::Jump { from, to } => {
                self.board.relocate(from, to);
                self.last_push = None;
            }
            Move::Smash { from, to } => {
                if let Some(victim) = self.board.take(to) {
                    events.push(Event::Smashed {
                        player: victim,
                        at: label(to),
                    });
                }
                self.board.relocate(from, to);
                self.last_push = None;
            }
            Move::Push { from, to, pushed_to } => {
                if let Some(victim) = self.board.occupant(to) {
                    events.push(Event::Pushed {
                        player: victim,
                        from: label(to),
                        to: label(pushed_to),
                    });
                }
                self.board.relocate(to, pushed_to);
                self.board.relocate(from, to);
                self.last_push = Some(LastPush { from: to, to: pushed_to });
            }
            Move::PushFall { from, to } => {
                if let Some(victim) = self.board.take(to) {
                    events.push(Event::PushedOff {
                        player: victim,
                        at: label(to),
                    });
                }
                self.board.relocate(from, to);
                self.last_push = None;
            }
            _ => {}
        }
    }

    /// The colour holding every victory field, if one does.
    fn victory_holder(&self) -> Option<Player> {
        let fields = topology().cells_with(Zone::VictoryField);
        let first = self.board.occupant(*fields.first()?)?;
        fields
            .iter()
            .all(|&c| self.board.occupant(c) == Some(first))
            .then_some(first)
    }

    fn finish_turn(&mut self, events: &mut Vec<Event>) {
        self.moves.clear();
        let decided = attrition(self.board.counts(), MIN_STONES, "stones").or_else(|| {
            self.victory_holder()
                .map(|p| Outcome::win(p, Reason::VictoryFields))
        });
        if let Some(outcome) = decided {
            events.push(Event::GameOver { outcome });
            self.outcome = Some(outcome);
            return;
        }
        let next = self.turn.player.opponent();
        self.turn.pass_to(next);
        self.outcome = switch_or_stalemate(next, self.has_move(next), events);
    }
}

impl Rules for Pyramid {
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
        self.displace(mv, &mut events);
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

    fn cell(label: &str) -> CellId {
        topology().find(label).unwrap()
    }

    #[test]
    fn only_rims_are_playable() {
        let t = topology();
        assert_eq!(t.len(), 24 + 16 + 8 + 1);
        assert!(t.find("0,3,3").is_none());
        assert!(t.find("2,1,1").is_none());
        assert!(t.find("3,0,0").is_some());
        let fields = t.cells_with(Zone::VictoryField);
        let labels: Vec<&str> = fields.iter().map(|&c| t.label(c)).collect();
        assert_eq!(labels, vec!["2,0,0", "2,0,2", "2,2,0", "2,2,2"]);
    }

    #[test]
    fn levels_are_not_adjacent() {
        let t = topology();
        for c in t.cells() {
            for &n in t.neighbors(c) {
                assert_eq!(t.coord(c).layer, t.coord(n).layer);
            }
        }
        assert!(t.neighbors(cell("3,0,0")).is_empty());
    }

    #[test]
    fn jump_climbs_inward() {
        let game = Pyramid::new();
        let moves = game.moves_from(cell("0,6,3"));
        assert!(moves.contains(&Move::Jump {
            from: cell("0,6,3"),
            to: cell("1,4,2")
        }));
        // Corners have no inward cell one level up.
        assert!(!game
            .moves_from(cell("0,6,0"))
            .iter()
            .any(|m| matches!(m, Move::Jump { .. })));
    }

    #[test]
    fn descent_runs_down_and_smashes_first_stone() {
        let game = Pyramid::from_stones(
            &["2,0,1", "0,6,0", "0,6,1", "0,6,2"],
            &["0,0,3", "0,0,0", "0,0,6", "0,6,6"],
            Player::White,
        )
        .unwrap();
        let moves = game.moves_from(cell("2,0,1"));
        assert!(moves.contains(&Move::Run {
            from: cell("2,0,1"),
            to: cell("1,0,2")
        }));
        assert!(moves.contains(&Move::Smash {
            from: cell("2,0,1"),
            to: cell("0,0,3")
        }));
    }

    #[test]
    fn apex_descends_in_every_direction() {
        let game = Pyramid::from_stones(&["3,0,0"], &[], Player::White).unwrap();
        let moves = game.moves_from(cell("3,0,0"));
        // Three levels below, four sides, all empty.
        assert_eq!(moves.len(), 12);
        assert!(moves.contains(&Move::Run {
            from: cell("3,0,0"),
            to: cell("2,2,1")
        }));
    }

    #[test]
    fn smash_removes_the_victim() {
        let mut game = Pyramid::from_stones(
            &["1,0,2", "0,6,0", "0,6,1", "0,6,2"],
            &["0,0,3", "0,0,0", "0,0,1", "0,0,6", "0,6,6"],
            Player::White,
        )
        .unwrap();
        game.select(cell("1,0,2")).unwrap();
        let events = game
            .play(&Move::Smash {
                from: cell("1,0,2"),
                to: cell("0,0,3"),
            })
            .unwrap();
        assert!(events.contains(&Event::Smashed {
            player: Player::Black,
            at: "0,0,3".to_string()
        }));
        assert_eq!(game.board().occupant(cell("0,0,3")), Some(Player::White));
        assert_eq!(game.counts().black, 4);
    }

    #[test]
    fn push_fall_only_on_the_bottom_level() {
        let mut game = Pyramid::from_stones(
            &["0,0,1", "1,0,1", "0,6,1", "0,6,2"],
            &["0,0,0", "1,0,0", "0,6,5", "0,6,6", "0,3,6"],
            Player::White,
        )
        .unwrap();
        let fall = Move::PushFall {
            from: cell("0,0,1"),
            to: cell("0,0,0"),
        };
        assert!(game.moves_from(cell("0,0,1")).contains(&fall));
        assert!(!game
            .moves_from(cell("1,0,1"))
            .iter()
            .any(|m| matches!(m, Move::PushFall { .. })));

        game.select(cell("0,0,1")).unwrap();
        let events = game.play(&fall).unwrap();
        assert!(events.contains(&Event::PushedOff {
            player: Player::Black,
            at: "0,0,0".to_string()
        }));
        assert_eq!(game.counts().black, 4);
    }

    #[test]
    fn holding_all_victory_fields_wins() {
        let mut game = Pyramid::from_stones(
            &["2,0,0", "2,0,2", "2,2,0", "2,2,1"],
            &["0,0,0", "0,0,1", "0,0,2", "0,0,3"],
            Player::White,
        )
        .unwrap();
        game.select(cell("2,2,1")).unwrap();
        game.play(&Move::Run {
            from: cell("2,2,1"),
            to: cell("2,2,2"),
        })
        .unwrap();
        let outcome = game.outcome().copied().unwrap();
        assert_eq!(outcome, Outcome::win(Player::White, Reason::VictoryFields));
    }
}
