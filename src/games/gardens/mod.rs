//! Gardens: sowing stacks of discs toward the high gardens.
//!
//! Two 3×5 playing fields sit between four gardens. A player lifts a stack
//! they top and drops it one disc per cell along an unbroken path. After
//! every turn the staircases carry majority discs from each home garden up
//! to the neighbouring high garden; seven of a colour in its high garden
//! wins.

pub mod hand;

use std::sync::OnceLock;

use tracing::debug;

use self::hand::{top, Hand, Stacks};
use super::{offered, Content, Rules};
use crate::board::{CellId, Coord, Counts, Event, Garden, Move, Player, Topology, TopologyBuilder, Zone};
use crate::error::{Rejection, TopologyError};
use crate::outcome::{ensure_live, Outcome, Reason};
use crate::turn::{TurnPhase, TurnState};

const ROWS: u8 = 3;
const COLS: u8 = 5;
const START_DISCS: usize = 10;
const MAX_PICK: usize = 5;
const WIN_COUNT: usize = 7;

/// Home garden, the colour its stairs carry, and where they lead.
const STAIRS: [(Garden, Player, Garden); 2] = [
    (Garden::BottomLeft, Player::Black, Garden::TopLeft),
    (Garden::BottomRight, Player::White, Garden::TopRight),
];

/// The garden `player` must fill.
pub const fn high_garden(player: Player) -> Garden {
    match player {
        Player::White => Garden::TopLeft,
        Player::Black => Garden::TopRight,
    }
}

fn build() -> Result<Topology, TopologyError> {
    let mut b = TopologyBuilder::new("gardens");
    for (layer, field) in ["top", "bottom"].into_iter().enumerate() {
        let y0 = (layer as u8 * ROWS) as f64;
        for row in 0..ROWS {
            for col in 0..COLS {
                b.node(
                    Coord::new(layer as u8, row, col),
                    format!("{field}:{row},{col}"),
                    (col as f64 + 1.0, y0 + row as f64),
                );
            }
        }
    }
    // Fields first: the gardens must not pick up grid links.
    b.link_orthogonal();
    for col in 0..COLS {
        b.link_labels(&format!("top:{},{col}", ROWS - 1), &format!("bottom:0,{col}"))?;
    }
    for (i, garden) in Garden::ALL.into_iter().enumerate() {
        let (field, col, x, y) = match garden {
            Garden::TopLeft => ("top", 0, 0.0, 1.0),
            Garden::BottomLeft => ("bottom", 0, 0.0, 4.0),
            Garden::BottomRight => ("bottom", COLS - 1, 6.0, 4.0),
            Garden::TopRight => ("top", COLS - 1, 6.0, 1.0),
        };
        let node = b.node(Coord::new(2, 0, i as u8 * 2), garden.label(), (x, y));
        b.tag(node, Zone::Garden(garden));
        for row in 0..ROWS {
            let cell = b.lookup(&format!("{field}:{row},{col}"))?;
            b.link(node, cell);
        }
    }
    b.build()
}

pub fn topology() -> &'static Topology {
    static TOPOLOGY: OnceLock<Topology> = OnceLock::new();
    TOPOLOGY.get_or_init(|| build().unwrap_or_else(|e| panic!("gardens topology: {e}")))
}

fn garden_cell(garden: Garden) -> CellId {
    topology()
        .find(garden.label())
        .unwrap_or_else(|| panic!("gardens topology: no {garden}"))
}

#[derive(Debug, Clone)]
pub struct Gardens {
    stacks: Stacks,
    turn: TurnState,
    hand: Option<Hand>,
    moves: Vec<Move>,
    outcome: Option<Outcome>,
}

impl Default for Gardens {
    fn default() -> Self {
        Self::new()
    }
}

impl Gardens {
    /// Each side starts with all ten discs in its home garden.
    pub fn new() -> Self {
        let mut stacks = Stacks::new(topology());
        stacks.set(garden_cell(Garden::BottomLeft), vec![Player::White; START_DISCS]);
        stacks.set(garden_cell(Garden::BottomRight), vec![Player::Black; START_DISCS]);
        Gardens {
            stacks,
            turn: TurnState::new(Player::White),
            hand: None,
            moves: Vec::new(),
            outcome: None,
        }
    }

    /// Builds a position from `(label, discs bottom to top)` pairs.
    pub fn from_stacks(setup: &[(&str, &[Player])], to_move: Player) -> Result<Self, Rejection> {
        let mut stacks = Stacks::new(topology());
        for (label, discs) in setup {
            let cell = topology()
                .find(label)
                .ok_or_else(|| Rejection::UnknownLabel(label.to_string()))?;
            stacks.set(cell, discs.to_vec());
        }
        Ok(Gardens {
            stacks,
            turn: TurnState::new(to_move),
            hand: None,
            moves: Vec::new(),
            outcome: None,
        })
    }

    pub fn stacks(&self) -> &Stacks {
        &self.stacks
    }

    pub fn hand(&self) -> Option<&Hand> {
        self.hand.as_ref()
    }

    /// Discs of `player` in their high garden.
    pub fn score(&self, player: Player) -> usize {
        self.stacks
            .get(garden_cell(high_garden(player)))
            .iter()
            .filter(|&&d| d == player)
            .count()
    }

    fn drop_moves(&self, hand: &Hand) -> Vec<Move> {
        hand.drops(&self.stacks, self.turn.player)
            .into_iter()
            .map(|to| Move::Drop { to })
            .collect()
    }

    /// Largest pick-up `cell` allows: a whole field stack, or up to five
    /// discs from a garden.
    fn pick_limit(&self, cell: CellId) -> usize {
        let height = self.stacks.get(cell).len();
        if topology().garden(cell).is_some() {
            height.min(MAX_PICK)
        } else {
            height
        }
    }

    fn can_start_from(&self, cell: CellId, player: Player) -> bool {
        if top(&self.stacks, cell) != Some(player) {
            return false;
        }
        let count = if topology().garden(cell).is_some() { 1 } else { self.pick_limit(cell) };
        Hand::pick(&self.stacks, cell, count).can_finish(&self.stacks, player)
    }

    fn has_move(&self, player: Player) -> bool {
        topology().cells().any(|c| self.can_start_from(c, player))
    }

    /// Next playable pick-up count after `current`, wrapping to one.
    fn cycle(&self, cell: CellId, current: usize) -> Option<Hand> {
        let limit = self.pick_limit(cell);
        (1..=limit)
            .map(|step| (current + step - 1) % limit + 1)
            .map(|count| Hand::pick(&self.stacks, cell, count))
            .find(|hand| hand.can_finish(&self.stacks, self.turn.player))
    }

    fn run_staircases(&mut self, events: &mut Vec<Event>) {
        for (home, colour, high) in STAIRS {
            let home_cell = garden_cell(home);
            let stack = self.stacks.get(home_cell);
            let climbing = stack.iter().filter(|&&d| d == colour).count();
            if climbing <= stack.len() - climbing {
                continue;
            }
            self.stacks.get_mut(home_cell).retain(|&d| d != colour);
            self.stacks
                .get_mut(garden_cell(high))
                .extend(std::iter::repeat(colour).take(climbing));
            debug!(%home, %high, climbing, "staircase");
            events.push(Event::Staircase {
                player: colour,
                from: home,
                to: high,
                count: climbing,
            });
        }
    }

    fn finish_turn(&mut self, events: &mut Vec<Event>) {
        self.hand = None;
        self.moves.clear();
        self.run_staircases(events);

        let mover = self.turn.player;
        let winner = [mover, mover.opponent()]
            .into_iter()
            .find(|&p| self.score(p) >= WIN_COUNT);
        if let Some(winner) = winner {
            let outcome = Outcome::win(winner, Reason::HighGarden);
            events.push(Event::GameOver { outcome });
            self.outcome = Some(outcome);
            self.turn.pass_to(mover.opponent());
            return;
        }

        let next = mover.opponent();
        if self.has_move(next) {
            self.turn.pass_to(next);
            events.push(Event::TurnEnded { next });
        } else if self.has_move(mover) {
            self.turn.pass_to(mover);
            events.push(Event::Passed { player: next });
            events.push(Event::TurnEnded { next: mover });
        } else {
            self.turn.pass_to(next);
            let outcome = Outcome::draw(Reason::Deadlock);
            events.push(Event::GameOver { outcome });
            self.outcome = Some(outcome);
        }
    }
}

impl Rules for Gardens {
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
        } else if self.hand.is_some() {
            TurnPhase::Holding
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
        if let Some(hand) = self.hand.as_ref().filter(|h| h.is_lifted()) {
            return if hand.current() == cell {
                Ok(self.moves.clone())
            } else {
                Err(Rejection::AlreadyCommitted)
            };
        }
        let player = self.turn.player;
        match top(&self.stacks, cell) {
            None => return Err(Rejection::EmptyCell),
            Some(owner) if owner != player => return Err(Rejection::NotYourPiece(owner)),
            Some(_) => {}
        }

        let reselect = self.hand.as_ref().filter(|h| h.source() == cell);
        let hand = match reselect {
            Some(held) if topology().garden(cell).is_some() => self.cycle(cell, held.len()),
            _ if topology().garden(cell).is_some() => self.cycle(cell, 0),
            _ => Some(Hand::pick(&self.stacks, cell, self.pick_limit(cell))),
        };
        let hand = hand.ok_or(Rejection::NoLegalMoves)?;
        let moves = self.drop_moves(&hand);
        if moves.is_empty() {
            return Err(Rejection::NoLegalMoves);
        }
        debug!(at = topology().label(cell), discs = hand.len(), "picked up");
        self.turn.select(cell);
        self.hand = Some(hand);
        self.moves = moves.clone();
        Ok(moves)
    }

    fn legal_moves(&self) -> Vec<Move> {
        self.moves.clone()
    }

    fn play(&mut self, mv: &Move) -> Result<Vec<Event>, Rejection> {
        ensure_live(&self.outcome)?;
        let Some(mut hand) = self.hand.clone() else {
            return Err(Rejection::NothingSelected);
        };
        let mv = offered(&self.moves, mv)?;
        let Move::Drop { to } = mv else {
            return Err(Rejection::IllegalMove);
        };
        let disc = hand.drop_on(&mut self.stacks, to).ok_or(Rejection::IllegalMove)?;
        self.turn.commit(mv);
        let mut events = vec![Event::Dropped {
            player: disc,
            at: topology().label(to).to_string(),
        }];

        if hand.is_empty() {
            self.finish_turn(&mut events);
        } else {
            self.moves = self.drop_moves(&hand);
            self.turn.select(to);
            self.hand = Some(hand);
        }
        Ok(events)
    }

    fn cancel(&mut self) -> Result<(), Rejection> {
        ensure_live(&self.outcome)?;
        self.turn.cancel()?;
        self.hand = None;
        self.moves.clear();
        Ok(())
    }

    fn end_turn(&mut self) -> Result<Vec<Event>, Rejection> {
        ensure_live(&self.outcome)?;
        match &self.hand {
            Some(hand) if hand.is_lifted() => Err(Rejection::HandNotEmpty),
            _ => Err(Rejection::NoChain),
        }
    }

    fn selectable(&self) -> Vec<CellId> {
        if self.outcome.is_some() {
            return Vec::new();
        }
        if let Some(hand) = self.hand.as_ref().filter(|h| h.is_lifted()) {
            return vec![hand.current()];
        }
        topology()
            .cells()
            .filter(|&c| self.can_start_from(c, self.turn.player))
            .collect()
    }

    fn content(&self, cell: CellId) -> Content {
        let discs = self.stacks.get(cell);
        if discs.is_empty() {
            Content::Empty
        } else {
            Content::Stack {
                discs: discs.clone(),
            }
        }
    }

    /// Discs on the board per colour.
    fn counts(&self) -> Counts {
        let mut counts = Counts::default();
        for (_, stack) in self.stacks.iter() {
            for &disc in stack {
                counts.add(disc, 1);
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: Player = Player::White;
    const B: Player = Player::Black;

    fn cell(label: &str) -> CellId {
        topology().find(label).unwrap()
    }

    fn drop_on(label: &str) -> Move {
        Move::Drop { to: cell(label) }
    }

    #[test]
    fn board_shape() {
        let t = topology();
        assert_eq!(t.len(), 34);
        assert!(t.is_adjacent(cell("top:2,3"), cell("bottom:0,3")));
        assert!(!t.is_adjacent(cell("top:1,3"), cell("bottom:0,3")));
        assert!(t.is_adjacent(cell("bl"), cell("bottom:2,0")));
        assert!(t.is_adjacent(cell("tr"), cell("top:1,4")));
        assert!(!t.is_adjacent(cell("tl"), cell("bl")));
        assert_eq!(t.neighbors(cell("br")).len(), 3);
        assert_eq!(t.garden(cell("tl")), Some(Garden::TopLeft));
    }

    #[test]
    fn opening_selection_cycles_the_count() {
        let mut game = Gardens::new();
        let moves = game.select(cell("bl")).unwrap();
        assert_eq!(moves.len(), 3);
        assert_eq!(game.hand().unwrap().len(), 1);
        assert_eq!(game.phase(), TurnPhase::Holding);
        game.select(cell("bl")).unwrap();
        assert_eq!(game.hand().unwrap().len(), 2);
        for _ in 0..3 {
            game.select(cell("bl")).unwrap();
        }
        assert_eq!(game.hand().unwrap().len(), 5);
        game.select(cell("bl")).unwrap();
        assert_eq!(game.hand().unwrap().len(), 1);
    }

    #[test]
    fn sowing_drops_one_disc_per_cell() {
        let mut game = Gardens::new();
        game.select(cell("bl")).unwrap();
        game.select(cell("bl")).unwrap();
        game.select(cell("bl")).unwrap();
        assert_eq!(game.hand().unwrap().len(), 3);

        let events = game.play(&drop_on("bottom:1,0")).unwrap();
        assert_eq!(
            events,
            vec![Event::Dropped {
                player: W,
                at: "bottom:1,0".to_string()
            }]
        );
        assert_eq!(game.stacks().get(cell("bl")).len(), 7);
        assert_eq!(game.cancel(), Err(Rejection::AlreadyCommitted));
        assert_eq!(game.end_turn(), Err(Rejection::HandNotEmpty));
        assert_eq!(game.selectable(), vec![cell("bottom:1,0")]);

        game.play(&drop_on("bottom:1,0")).unwrap();
        let events = game.play(&drop_on("bottom:1,1")).unwrap();
        assert!(events.contains(&Event::TurnEnded { next: B }));
        assert_eq!(game.stacks().get(cell("bottom:1,0")), &vec![W, W]);
        assert_eq!(game.stacks().get(cell("bottom:1,1")), &vec![W]);
        assert_eq!(game.phase(), TurnPhase::SelectOrigin);
    }

    #[test]
    fn cancel_before_the_first_drop_leaves_the_board_alone() {
        let mut game = Gardens::new();
        game.select(cell("bl")).unwrap();
        game.cancel().unwrap();
        assert!(game.hand().is_none());
        assert_eq!(game.stacks().get(cell("bl")).len(), START_DISCS);
    }

    #[test]
    fn field_stacks_move_whole() {
        let mut game = Gardens::from_stacks(
            &[("bottom:1,2", &[B, W]), ("br", &[B]), ("tr", &[B])],
            W,
        )
        .unwrap();
        game.select(cell("bottom:1,2")).unwrap();
        assert_eq!(game.hand().unwrap().discs(), &[B, W]);
    }

    #[test]
    fn black_majority_climbs_the_left_staircase() {
        let mut bl = vec![W; 4];
        bl.extend([B; 6]);
        let mut game = Gardens::from_stacks(
            &[("bl", bl.as_slice()), ("bottom:1,2", &[W]), ("br", &[B])],
            W,
        )
        .unwrap();
        game.select(cell("bottom:1,2")).unwrap();
        let events = game.play(&drop_on("bottom:1,3")).unwrap();
        assert!(events.contains(&Event::Staircase {
            player: B,
            from: Garden::BottomLeft,
            to: Garden::TopLeft,
            count: 6
        }));
        assert_eq!(game.stacks().get(cell("bl")), &vec![W; 4]);
        assert_eq!(game.stacks().get(cell("tl")), &vec![B; 6]);
        assert_eq!(game.score(W), 0);
    }

    #[test]
    fn seventh_disc_in_the_high_garden_wins() {
        let mut game =
            Gardens::from_stacks(&[("tl", &[W; 6]), ("top:1,0", &[W]), ("br", &[B])], W).unwrap();
        game.select(cell("top:1,0")).unwrap();
        let events = game.play(&drop_on("tl")).unwrap();
        let outcome = Outcome::win(W, Reason::HighGarden);
        assert_eq!(events.last(), Some(&Event::GameOver { outcome }));
        assert_eq!(game.outcome(), Some(&outcome));
        assert_eq!(game.select(cell("tl")), Err(Rejection::GameOver));
    }

    #[test]
    fn stuck_player_passes() {
        // Black's only disc sits under a white one.
        let mut game = Gardens::from_stacks(
            &[("bottom:1,1", &[B, W]), ("bottom:2,4", &[W])],
            W,
        )
        .unwrap();
        game.select(cell("bottom:2,4")).unwrap();
        let events = game.play(&drop_on("bottom:2,3")).unwrap();
        assert_eq!(
            &events[1..],
            &[Event::Passed { player: B }, Event::TurnEnded { next: W }]
        );
        assert_eq!(game.to_move(), W);
    }

    #[test]
    fn nobody_able_to_move_is_a_draw() {
        let mut game = Gardens::from_stacks(
            &[("tl", &[B, W]), ("bl", &[W, B]), ("br", &[B]), ("tr", &[B])],
            W,
        )
        .unwrap();
        // Every field full and white-topped except one slot next to tl.
        for c in topology().cells().filter(|&c| topology().garden(c).is_none()) {
            game.stacks.set(c, vec![B, B, B, B, W]);
        }
        game.stacks.set(cell("top:1,0"), vec![W, W, W, B]);

        assert_eq!(game.select(cell("tl")).unwrap(), vec![drop_on("top:1,0")]);
        let events = game.play(&drop_on("top:1,0")).unwrap();
        assert_eq!(
            events.last(),
            Some(&Event::GameOver {
                outcome: Outcome::draw(Reason::Deadlock)
            })
        );
        assert!(game.selectable().is_empty());
    }
}
