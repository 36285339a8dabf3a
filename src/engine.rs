//! Engine state management.
//!
//! Holds the current session and the engine options, and turns each
//! protocol command into response lines.

use std::collections::HashMap;
use std::io::{self, Write};

use tracing::warn;

use crate::board::Move;
use crate::games::GameKind;
use crate::protocol::{
    format_board, format_events, format_moves, format_outcome, format_rejection, ProtocolError,
};
use crate::session::Session;
use crate::turn::TurnPhase;

/// Print a board snapshot after every committed move.
pub const SHOW_BOARD: &str = "ShowBoard";
/// End a chain as soon as its first sub-move is played.
pub const AUTO_END_CHAIN: &str = "AutoEndChain";

/// Holds the mutable state of the engine between commands.
#[derive(Default)]
pub struct Engine {
    pub session: Option<Session>,
    pub options: HashMap<String, String>,
}

/// Writes `line`, or an `error` line if it could not be rendered.
fn emit<W: Write>(out: &mut W, line: Result<String, ProtocolError>) -> io::Result<()> {
    match line {
        Ok(line) => writeln!(out, "{line}"),
        Err(e) => report(out, &e),
    }
}

/// Reports a protocol error without touching any game state.
pub fn report<W: Write>(out: &mut W, err: &ProtocolError) -> io::Result<()> {
    warn!(%err, "protocol error");
    writeln!(out, "error {err}")
}

impl Engine {
    /// Creates an engine with no game in progress.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an engine option. A bare name switches a flag on.
    pub fn set_option(&mut self, name: String, value: Option<String>) {
        self.options.insert(name, value.unwrap_or_default());
    }

    /// Reads a boolean option, defaulting to off.
    fn flag(&self, name: &str) -> bool {
        self.options
            .get(name)
            .map(|v| v.is_empty() || v.parse::<bool>().unwrap_or(false))
            .unwrap_or(false)
    }

    /// Handles the handshake: id, options, then `hellook`.
    pub fn handle_hello<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "id name wonders {}", env!("CARGO_PKG_VERSION"))?;
        writeln!(out, "option name {SHOW_BOARD} type check default false")?;
        writeln!(out, "option name {AUTO_END_CHAIN} type check default false")?;
        writeln!(out, "hellook")?;
        out.flush()
    }

    pub fn handle_isready<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "readyok")?;
        out.flush()
    }

    pub fn handle_games<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let names: Vec<&str> = GameKind::ALL.iter().map(|k| k.name()).collect();
        writeln!(out, "games {}", names.join(" "))?;
        out.flush()
    }

    /// Starts a new game and prints its opening board.
    pub fn new_game<W: Write>(&mut self, kind: GameKind, out: &mut W) -> io::Result<()> {
        let session = Session::new(kind);
        emit(out, format_board(&session.snapshot()))?;
        self.session = Some(session);
        out.flush()
    }

    fn session_or_report<W: Write>(&mut self, out: &mut W) -> io::Result<Option<&mut Session>> {
        match self.session.as_mut() {
            Some(session) => Ok(Some(session)),
            None => {
                report(out, &ProtocolError::NoGame)?;
                Ok(None)
            }
        }
    }

    pub fn handle_select<W: Write>(&mut self, label: &str, out: &mut W) -> io::Result<()> {
        let Some(session) = self.session_or_report(out)? else {
            return out.flush();
        };
        let line = match session.select_label(label) {
            Ok(moves) => format_moves(session.topology(), &moves),
            Err(rejection) => format_rejection(&rejection),
        };
        emit(out, line)?;
        out.flush()
    }

    /// Plays the `index`-th move currently on offer.
    pub fn handle_move_index<W: Write>(&mut self, index: usize, out: &mut W) -> io::Result<()> {
        let Some(session) = self.session_or_report(out)? else {
            return out.flush();
        };
        match session.legal_moves().get(index) {
            Some(mv) => {
                let mv = *mv;
                self.handle_play(&mv, out)
            }
            None => {
                report(out, &ProtocolError::NoSuchMove(index))?;
                out.flush()
            }
        }
    }

    pub fn handle_play<W: Write>(&mut self, mv: &Move, out: &mut W) -> io::Result<()> {
        let auto_end = self.flag(AUTO_END_CHAIN);
        let show_board = self.flag(SHOW_BOARD);
        let Some(session) = self.session_or_report(out)? else {
            return out.flush();
        };
        match session.apply_move(mv) {
            Ok(events) => {
                emit(out, format_events(&events))?;
                if auto_end && session.phase() == TurnPhase::Chain {
                    match session.end_turn() {
                        Ok(events) => emit(out, format_events(&events))?,
                        Err(rejection) => warn!(%rejection, "chain could not be ended automatically"),
                    }
                }
                Self::after_commit(session, show_board, out)?;
            }
            Err(rejection) => emit(out, format_rejection(&rejection))?,
        }
        out.flush()
    }

    pub fn handle_cancel<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let Some(session) = self.session_or_report(out)? else {
            return out.flush();
        };
        match session.cancel_selection() {
            Ok(()) => writeln!(out, "ok")?,
            Err(rejection) => emit(out, format_rejection(&rejection))?,
        }
        out.flush()
    }

    pub fn handle_end_turn<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let show_board = self.flag(SHOW_BOARD);
        let Some(session) = self.session_or_report(out)? else {
            return out.flush();
        };
        match session.end_turn() {
            Ok(events) => {
                emit(out, format_events(&events))?;
                Self::after_commit(session, show_board, out)?;
            }
            Err(rejection) => emit(out, format_rejection(&rejection))?,
        }
        out.flush()
    }

    /// Board and outcome lines that follow a committed move.
    fn after_commit<W: Write>(session: &Session, show_board: bool, out: &mut W) -> io::Result<()> {
        if show_board {
            emit(out, format_board(&session.snapshot()))?;
        }
        if session.is_over() {
            emit(out, format_outcome(session.outcome()))?;
        }
        Ok(())
    }

    pub fn handle_board<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        if let Some(session) = self.session_or_report(out)? {
            emit(out, format_board(&session.snapshot()))?;
        }
        out.flush()
    }

    pub fn handle_outcome<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        if let Some(session) = self.session_or_report(out)? {
            emit(out, format_outcome(session.outcome()))?;
        }
        out.flush()
    }
}
