//! Wonders -- rule engine for seven two-player board games.
//!
//! This binary reads commands from stdin and writes one response line per
//! command to stdout. Diagnostics go to stderr and are filtered with
//! `RUST_LOG`.

use std::io::{self, BufRead};

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use wonders::engine::{report, Engine};
use wonders::protocol::{parse_command, Command};

/// Runs the protocol loop until `quit` or end of input.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut engine = Engine::new();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        let cmd = match parse_command(&line) {
            Ok(Some(c)) => c,
            Ok(None) => continue,
            Err(e) => {
                if report(&mut out, &e).and_then(|_| io::Write::flush(&mut out)).is_err() {
                    break;
                }
                continue;
            }
        };

        let written = match cmd {
            Command::Hello => engine.handle_hello(&mut out),
            Command::IsReady => engine.handle_isready(&mut out),
            Command::Games => engine.handle_games(&mut out),
            Command::SetOption { name, value } => {
                engine.set_option(name, value);
                Ok(())
            }
            Command::NewGame { kind } => {
                info!(%kind, "new game");
                engine.new_game(kind, &mut out)
            }
            Command::Select { label } => engine.handle_select(&label, &mut out),
            Command::Move { index } => engine.handle_move_index(index, &mut out),
            Command::Play { mv } => engine.handle_play(&mv, &mut out),
            Command::Cancel => engine.handle_cancel(&mut out),
            Command::EndTurn => engine.handle_end_turn(&mut out),
            Command::Board => engine.handle_board(&mut out),
            Command::Outcome => engine.handle_outcome(&mut out),
            Command::Quit => break,
        };

        if let Err(e) = written {
            error!(%e, "stdout closed");
            break;
        }
    }
}
