//! Pharos: every step needs light.
//!
//! Stones step orthogonally onto an empty cell or capture an opponent. Each
//! step burns one unit of light from the stone itself, from a friendly
//! stone in line of sight, or from a beacon the mover has lit. A stone may
//! keep stepping while both a target and a light source remain.

pub mod light;

use std::sync::OnceLock;

use tracing::debug;

use self::light::LightLedger;
use super::{offered, own_stone, switch_or_stalemate, Content, Rules};
use crate::board::{
    CellId, Coord, Counts, Event, Move, Player, StoneBoard, Topology, TopologyBuilder, Zone,
};
use crate::error::{Rejection, TopologyError};
use crate::outcome::{ensure_live, Outcome};
use crate::turn::{TurnPhase, TurnState};

const SIZE: u8 = 9;
const BEACONS: [&str; 5] = ["4,4", "0,0", "0,8", "8,0", "8,8"];

fn build() -> Result<Topology, TopologyError> {
    let mut b = TopologyBuilder::new("pharos");
    for row in 0..SIZE {
        for col in 0..SIZE {
            b.node(Coord::grid(row, col), format!("{row},{col}"), (col as f64, row as f64));
        }
    }
    b.link_orthogonal();
    for label in BEACONS {
        let cell = b.lookup(label)?;
        b.tag(cell, Zone::Beacon);
    }
    b.build()
}

pub fn topology() -> &'static Topology {
    static TOPOLOGY: OnceLock<Topology> = OnceLock::new();
    TOPOLOGY.get_or_init(|| build().unwrap_or_else(|e| panic!("pharos topology: {e}")))
}

#[derive(Debug, Clone)]
pub struct Pharos {
    board: StoneBoard,
    /// Beacon owner per cell.
    lit: Vec<Option<Player>>,
    turn: TurnState,
    ledger: LightLedger,
    moves: Vec<Move>,
    outcome: Option<Outcome>,
}

impl Default for Pharos {
    fn default() -> Self {
        Self::new()
    }
}

impl Pharos {
    /// White on the middle five cells of the top and bottom rows, Black on
    /// the middle five of the outer columns.
    pub fn new() -> Self {
        let mut board = StoneBoard::new(topology());
        for i in 2..=6u8 {
            for (row, col, player) in [
                (0, i, Player::White),
                (SIZE - 1, i, Player::White),
                (i, 0, Player::Black),
                (i, SIZE - 1, Player::Black),
            ] {
                if let Some(cell) = topology().cell_at(Coord::grid(row, col)) {
                    board.set(cell, Some(player));
                }
            }
        }
        Pharos {
            board,
            lit: vec![None; topology().len()],
            turn: TurnState::new(Player::White),
            ledger: LightLedger::default(),
            moves: Vec::new(),
            outcome: None,
        }
    }

    pub fn from_stones(white: &[&str], black: &[&str], to_move: Player) -> Result<Self, Rejection> {
        let mut game = Pharos::new();
        game.board = StoneBoard::new(topology());
        game.board
            .place_labels(Player::White, white)
            .map_err(Rejection::UnknownLabel)?;
        game.board
            .place_labels(Player::Black, black)
            .map_err(Rejection::UnknownLabel)?;
        game.turn = TurnState::new(to_move);
        Ok(game)
    }

    /// Marks a beacon as lit, for setting up positions.
    pub fn light_beacon(&mut self, cell: CellId, player: Player) {
        if topology().has_zone(cell, Zone::Beacon) {
            self.lit[cell.index()] = Some(player);
        }
    }

    pub fn board(&self) -> &StoneBoard {
        &self.board
    }

    /// Neighbours not holding one of the mover's own stones.
    fn targets(&self, from: CellId) -> Vec<CellId> {
        let own = self.board.occupant(from);
        topology()
            .neighbors(from)
            .iter()
            .copied()
            .filter(|&n| self.board.occupant(n) != own)
            .collect()
    }

    fn moves_from(&self, from: CellId) -> Vec<Move> {
        let targets = self.targets(from);
        if targets.is_empty() {
            return Vec::new();
        }
        let sources = self.ledger.sources(&self.board, &self.lit, from);
        let mut moves = Vec::with_capacity(targets.len() * sources.len());
        for &to in &targets {
            let capture = !self.board.is_empty(to);
            for &source in &sources {
                moves.push(Move::Walk {
                    from,
                    to,
                    capture,
                    light: Some(source),
                });
            }
        }
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
        self.ledger.clear();
        let next = self.turn.player.opponent();
        self.turn.pass_to(next);
        self.outcome = switch_or_stalemate(next, self.has_move(next), events);
    }
}

impl Rules for Pharos {
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
        let Move::Walk {
            from,
            to,
            light: Some(source),
            ..
        } = mv
        else {
            return Err(Rejection::IllegalMove);
        };
        let t = topology();
        let player = self.turn.player;
        let mut events = vec![Event::moved(t, player, from, to, "step")];

        self.ledger.consume(&self.board, &self.lit, player, source);
        if let Some(victim) = self.board.take(to) {
            events.push(Event::Captured {
                player: victim,
                at: t.label(to).to_string(),
            });
        }
        self.board.relocate(from, to);
        self.ledger.repoint(from, to);
        if t.has_zone(to, Zone::Beacon) && self.lit[to.index()] != Some(player) {
            self.lit[to.index()] = Some(player);
            events.push(Event::BeaconLit {
                player,
                at: t.label(to).to_string(),
            });
        }
        self.turn.commit(mv);

        let next = self.moves_from(to);
        if next.is_empty() {
            debug!(at = t.label(to), "light exhausted, turn ends");
            self.finish_turn(&mut events);
        } else {
            self.turn.select(to);
            self.moves = next;
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

    fn lit(&self, cell: CellId) -> Option<Player> {
        self.lit.get(cell.index()).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Reason;

    fn cell(label: &str) -> CellId {
        topology().find(label).unwrap()
    }

    fn walk(from: &str, to: &str, capture: bool, light: &str) -> Move {
        Move::Walk {
            from: cell(from),
            to: cell(to),
            capture,
            light: Some(cell(light)),
        }
    }

    #[test]
    fn opening_position() {
        let game = Pharos::new();
        assert_eq!(game.counts(), Counts { white: 10, black: 10 });
        assert_eq!(topology().cells_with(Zone::Beacon).len(), 5);
        assert_eq!(game.board().occupant(cell("0,2")), Some(Player::White));
        assert_eq!(game.board().occupant(cell("6,8")), Some(Player::Black));
        assert_eq!(game.board().occupant(cell("0,0")), None);
    }

    #[test]
    fn stone_without_light_cannot_move() {
        let mut game = Pharos::from_stones(&["3,3", "3,7"], &["3,5", "8,8"], Player::White).unwrap();
        // Own light already burnt, the friend on 3,7 hidden behind 3,5.
        game.ledger
            .consume(&game.board, &game.lit, Player::White, cell("3,3"));
        assert_eq!(game.select(cell("3,3")), Err(Rejection::NoLegalMoves));

        let mut open = Pharos::from_stones(&["3,3", "3,7"], &["8,8"], Player::White).unwrap();
        open.ledger
            .consume(&open.board, &open.lit, Player::White, cell("3,3"));
        let moves = open.select(cell("3,3")).unwrap();
        assert!(moves.contains(&walk("3,3", "2,3", false, "3,7")));
    }

    #[test]
    fn one_move_per_target_and_source() {
        let mut game = Pharos::from_stones(&["4,1", "4,6"], &["8,8"], Player::White).unwrap();
        let moves = game.select(cell("4,1")).unwrap();
        // Four targets, two sources each.
        assert_eq!(moves.len(), 8);
        assert!(moves.contains(&walk("4,1", "4,2", false, "4,1")));
        assert!(moves.contains(&walk("4,1", "4,2", false, "4,6")));
    }

    #[test]
    fn chain_continues_until_light_runs_out() {
        let mut game = Pharos::from_stones(&["4,1", "4,6"], &["8,8", "8,7"], Player::White).unwrap();
        game.select(cell("4,1")).unwrap();
        game.play(&walk("4,1", "4,2", false, "4,1")).unwrap();
        assert_eq!(game.phase(), TurnPhase::Chain);
        assert_eq!(game.to_move(), Player::White);
        assert!(game
            .legal_moves()
            .iter()
            .all(|m| matches!(m, Move::Walk { light: Some(s), .. } if *s == cell("4,6"))));

        let events = game.play(&walk("4,2", "4,3", false, "4,6")).unwrap();
        assert_eq!(events.last(), Some(&Event::TurnEnded { next: Player::Black }));
        assert_eq!(game.board().occupant(cell("4,3")), Some(Player::White));
        assert!(game.ledger.is_fresh());
    }

    #[test]
    fn capture_on_a_beacon_lights_it() {
        let mut game = Pharos::from_stones(&["4,3", "0,4"], &["4,4"], Player::White).unwrap();
        game.select(cell("4,3")).unwrap();
        let events = game.play(&walk("4,3", "4,4", true, "4,3")).unwrap();
        assert!(events.contains(&Event::Captured {
            player: Player::Black,
            at: "4,4".to_string()
        }));
        assert!(events.contains(&Event::BeaconLit {
            player: Player::White,
            at: "4,4".to_string()
        }));
        assert_eq!(game.lit(cell("4,4")), Some(Player::White));
        // The freshly lit beacon powers another step.
        assert!(game
            .legal_moves()
            .contains(&walk("4,4", "5,4", false, "4,4")));

        // Black has nothing left to move.
        game.end_turn().unwrap();
        assert_eq!(
            game.outcome().copied(),
            Some(Outcome::win(Player::White, Reason::NoLegalMoves))
        );
    }

    #[test]
    fn other_stones_are_locked_during_a_chain() {
        let mut game = Pharos::from_stones(&["4,1", "4,6"], &["8,8"], Player::White).unwrap();
        game.select(cell("4,1")).unwrap();
        game.play(&walk("4,1", "4,2", false, "4,1")).unwrap();
        assert_eq!(game.select(cell("4,6")), Err(Rejection::AlreadyCommitted));
        assert_eq!(game.selectable(), vec![cell("4,2")]);
        assert_eq!(game.cancel(), Err(Rejection::AlreadyCommitted));
    }
}
