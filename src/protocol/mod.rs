//! Line protocol spoken by the `wonders` binary.
//!
//! Clients send one command per line on stdin (`newgame`, `select`,
//! `move`, ...) and read keyword-prefixed JSON lines back on stdout.

pub mod format;
pub mod parser;

pub use format::{format_board, format_events, format_moves, format_outcome, format_rejection};
pub use parser::{parse_command, Command, ProtocolError};
