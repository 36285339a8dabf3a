//! The turn controller.
//!
//! A `Session` owns exactly one game and is the only entry point callers
//! need: select a cell, play one of the offered moves, cancel or end the
//! turn, and read back a serialisable snapshot. Sessions share nothing, so
//! any number of them can run side by side on different threads.

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::board::{CellId, Counts, Event, Move, Player, Topology, Zone};
use crate::error::Rejection;
use crate::games::colossus::Colossus;
use crate::games::gardens::Gardens;
use crate::games::mausoleum::Mausoleum;
use crate::games::pharos::Pharos;
use crate::games::pyramid::Pyramid;
use crate::games::statue::Statue;
use crate::games::temple::Temple;
use crate::games::{Content, GameKind, Rules};
use crate::outcome::Outcome;
use crate::turn::TurnPhase;

/// One running game.
#[derive(Debug, Clone)]
pub enum Session {
    Colossus(Colossus),
    Pyramid(Pyramid),
    Temple(Temple),
    Mausoleum(Mausoleum),
    Pharos(Pharos),
    Gardens(Gardens),
    Statue(Statue),
}

macro_rules! each_game {
    ($session:expr, $game:ident => $body:expr) => {
        match $session {
            Session::Colossus($game) => $body,
            Session::Pyramid($game) => $body,
            Session::Temple($game) => $body,
            Session::Mausoleum($game) => $body,
            Session::Pharos($game) => $body,
            Session::Gardens($game) => $body,
            Session::Statue($game) => $body,
        }
    };
}

macro_rules! from_game {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Session {
                fn from(game: $variant) -> Self {
                    Session::$variant(game)
                }
            }
        )*
    };
}

from_game!(Colossus, Pyramid, Temple, Mausoleum, Pharos, Gardens, Statue);

/// One cell as shown to a client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellView {
    pub id: CellId,
    pub label: String,
    pub content: Content,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lit: Option<Player>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub zones: Vec<Zone>,
}

/// Everything a presentation layer needs to draw the position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub game: GameKind,
    pub to_move: Player,
    pub phase: TurnPhase,
    pub counts: Counts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reserve: Option<Counts>,
    pub selected: Option<String>,
    pub selectable: Vec<String>,
    pub cells: Vec<CellView>,
    pub outcome: Option<Outcome>,
}

impl Session {
    /// Starts `kind` from its opening position.
    pub fn new(kind: GameKind) -> Self {
        match kind {
            GameKind::Colossus => Session::Colossus(Colossus::new()),
            GameKind::Pyramid => Session::Pyramid(Pyramid::new()),
            GameKind::Temple => Session::Temple(Temple::new()),
            GameKind::Mausoleum => Session::Mausoleum(Mausoleum::new()),
            GameKind::Pharos => Session::Pharos(Pharos::new()),
            GameKind::Gardens => Session::Gardens(Gardens::new()),
            GameKind::Statue => Session::Statue(Statue::new()),
        }
    }

    pub fn kind(&self) -> GameKind {
        match self {
            Session::Colossus(_) => GameKind::Colossus,
            Session::Pyramid(_) => GameKind::Pyramid,
            Session::Temple(_) => GameKind::Temple,
            Session::Mausoleum(_) => GameKind::Mausoleum,
            Session::Pharos(_) => GameKind::Pharos,
            Session::Gardens(_) => GameKind::Gardens,
            Session::Statue(_) => GameKind::Statue,
        }
    }

    /// The rule set behind this session.
    pub fn rules(&self) -> &dyn Rules {
        each_game!(self, game => game as &dyn Rules)
    }

    fn rules_mut(&mut self) -> &mut dyn Rules {
        each_game!(self, game => game as &mut dyn Rules)
    }

    pub fn topology(&self) -> &'static Topology {
        self.rules().topology()
    }

    pub fn to_move(&self) -> Player {
        self.rules().to_move()
    }

    pub fn phase(&self) -> TurnPhase {
        self.rules().phase()
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.rules().outcome()
    }

    pub fn is_over(&self) -> bool {
        self.outcome().is_some()
    }

    /// Selects `cell` and returns the moves it offers.
    #[instrument(skip(self), fields(game = %self.kind()))]
    pub fn select_cell(&mut self, cell: CellId) -> Result<Vec<Move>, Rejection> {
        let moves = self.rules_mut().select(cell)?;
        debug!(moves = moves.len(), "selected");
        Ok(moves)
    }

    /// Selects a cell by its board label.
    pub fn select_label(&mut self, label: &str) -> Result<Vec<Move>, Rejection> {
        let cell = self
            .topology()
            .find(label)
            .ok_or_else(|| Rejection::UnknownLabel(label.to_string()))?;
        self.select_cell(cell)
    }

    /// Commits one of the offered moves and returns what it caused.
    #[instrument(skip(self, mv), fields(game = %self.kind(), mv = %mv.describe(self.topology())))]
    pub fn apply_move(&mut self, mv: &Move) -> Result<Vec<Event>, Rejection> {
        let events = self.rules_mut().play(mv)?;
        self.log_turn(&events);
        Ok(events)
    }

    /// Drops the current selection; only possible before anything is
    /// committed.
    #[instrument(skip(self), fields(game = %self.kind()))]
    pub fn cancel_selection(&mut self) -> Result<(), Rejection> {
        self.rules_mut().cancel()
    }

    /// Stops a chain early and hands over the turn.
    #[instrument(skip(self), fields(game = %self.kind()))]
    pub fn end_turn(&mut self) -> Result<Vec<Event>, Rejection> {
        let events = self.rules_mut().end_turn()?;
        self.log_turn(&events);
        Ok(events)
    }

    fn log_turn(&self, events: &[Event]) {
        for event in events {
            match event {
                Event::TurnEnded { next } => info!(%next, "turn ended"),
                Event::GameOver { outcome } => info!(%outcome, "game over"),
                other => debug!(%other, "event"),
            }
        }
    }

    pub fn selectable_cells(&self) -> Vec<CellId> {
        self.rules().selectable()
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        self.rules().legal_moves()
    }

    pub fn selected(&self) -> Option<CellId> {
        self.rules().selected()
    }

    pub fn snapshot(&self) -> Snapshot {
        let rules = self.rules();
        let topology = rules.topology();
        let cells = topology
            .cells()
            .map(|cell| CellView {
                id: cell,
                label: topology.label(cell).to_string(),
                content: rules.content(cell),
                lit: rules.lit(cell),
                zones: topology.zones(cell).to_vec(),
            })
            .collect();
        Snapshot {
            game: self.kind(),
            to_move: rules.to_move(),
            phase: rules.phase(),
            counts: rules.counts(),
            reserve: rules.reserve(),
            selected: self.selected().map(|c| topology.label(c).to_string()),
            selectable: rules
                .selectable()
                .into_iter()
                .map(|c| topology.label(c).to_string())
                .collect(),
            cells,
            outcome: rules.outcome().copied(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_game_starts_with_white() {
        for kind in GameKind::ALL {
            let session = Session::new(kind);
            assert_eq!(session.kind(), kind);
            assert_eq!(session.to_move(), Player::White);
            assert_eq!(session.phase(), TurnPhase::SelectOrigin);
            assert!(!session.is_over());
            assert!(
                !session.selectable_cells().is_empty(),
                "{kind} has nothing to select"
            );
        }
    }

    #[test]
    fn rejected_selection_changes_nothing() {
        let mut session = Session::new(GameKind::Mausoleum);
        let before = session.snapshot();
        assert_eq!(
            session.select_label("nowhere"),
            Err(Rejection::UnknownLabel("nowhere".to_string()))
        );
        assert_eq!(session.select_label("4,4"), Err(Rejection::EmptyCell));
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn snapshot_lists_every_cell() {
        let session = Session::new(GameKind::Statue);
        let snap = session.snapshot();
        assert_eq!(snap.cells.len(), session.topology().len());
        assert_eq!(snap.reserve, Some(Counts { white: 8, black: 8 }));
        assert_eq!(snap.selected, None);

        let json = serde_json::to_value(&Session::new(GameKind::Pharos).snapshot()).unwrap();
        assert_eq!(json["game"], "pharos");
        assert_eq!(json["to_move"], "white");
        assert_eq!(json["phase"], "select_origin");
        assert!(json.get("reserve").is_none());
    }

    #[test]
    fn apply_then_end_turn_through_the_session() {
        let mut session = Session::new(GameKind::Mausoleum);
        let cell = session.selectable_cells()[0];
        let moves = session.select_cell(cell).unwrap();
        assert_eq!(session.selected(), Some(cell));
        let events = session.apply_move(&moves[0]).unwrap();
        assert!(events.contains(&Event::TurnEnded { next: Player::Black }));
        assert_eq!(session.selected(), None);
        assert_eq!(session.end_turn(), Err(Rejection::NoChain));
    }
}
