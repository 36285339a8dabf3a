//! Random playouts.
//!
//! Plays whole games by picking uniformly among selectable cells and the
//! moves they offer, ending chains at random. Used to smoke-test the rule
//! sets at scale and to drive the benches. Records are written as JSONL.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::board::{Counts, Event, Player};
use crate::games::GameKind;
use crate::outcome::Outcome;
use crate::session::Session;
use crate::turn::TurnPhase;

/// Chance of stopping a chain that could continue.
const END_CHAIN_CHANCE: f64 = 0.25;

/// Configuration for a batch of random playouts.
#[derive(Debug, Clone)]
pub struct PlayoutConfig {
    /// Which game to play.
    pub game: GameKind,
    /// Number of games to play.
    pub games: usize,
    /// Sub-moves after which a game is abandoned undecided.
    pub max_plies: usize,
    /// Number of parallel threads.
    pub threads: usize,
    /// Random seed (0 = use entropy).
    pub seed: u64,
}

impl Default for PlayoutConfig {
    fn default() -> Self {
        PlayoutConfig {
            game: GameKind::Colossus,
            games: 100,
            max_plies: 2000,
            threads: 4,
            seed: 0,
        }
    }
}

/// One finished (or abandoned) playout.
#[derive(Debug, Clone, Serialize)]
pub struct PlayoutRecord {
    pub game_id: usize,
    pub game: GameKind,
    /// Sub-moves played.
    pub plies: usize,
    /// Completed turns.
    pub turns: usize,
    pub winner: Option<Player>,
    pub outcome: Option<Outcome>,
    pub final_counts: Counts,
    /// The side to move had selectable cells but none offered a move.
    pub stalled: bool,
}

/// Plays one game of `kind` to the end or to `max_plies`.
pub fn random_playout(kind: GameKind, game_id: usize, rng: &mut SmallRng, max_plies: usize) -> PlayoutRecord {
    let mut session = Session::new(kind);
    let mut plies = 0;
    let mut turns = 0;
    let mut stalled = false;

    while !session.is_over() && plies < max_plies {
        let events = match session.phase() {
            TurnPhase::Chain | TurnPhase::Holding => {
                let moves = session.legal_moves();
                let stop = session.phase() == TurnPhase::Chain
                    && (moves.is_empty() || rng.gen_bool(END_CHAIN_CHANCE));
                if stop {
                    session.end_turn()
                } else {
                    match moves.choose(rng) {
                        Some(mv) => {
                            plies += 1;
                            session.apply_move(mv)
                        }
                        None => {
                            stalled = true;
                            break;
                        }
                    }
                }
            }
            _ => match pick_selection(&mut session, rng) {
                Some(mv) => {
                    plies += 1;
                    session.apply_move(&mv)
                }
                None => {
                    stalled = true;
                    break;
                }
            },
        };

        match events {
            Ok(events) => {
                turns += events
                    .iter()
                    .filter(|e| matches!(e, Event::TurnEnded { .. }))
                    .count();
            }
            Err(rejection) => {
                warn!(game = %kind, %rejection, "offered move was rejected");
                stalled = true;
                break;
            }
        }
    }

    let outcome = session.outcome().copied();
    debug!(game = %kind, game_id, plies, ?outcome, "playout finished");
    PlayoutRecord {
        game_id,
        game: kind,
        plies,
        turns,
        winner: outcome.and_then(|o| o.winner()),
        outcome,
        final_counts: session.snapshot().counts,
        stalled,
    }
}

/// Selects random cells until one offers a move, then picks one of its
/// moves.
fn pick_selection(session: &mut Session, rng: &mut SmallRng) -> Option<crate::board::Move> {
    let mut cells = session.selectable_cells();
    cells.shuffle(rng);
    for cell in cells {
        match session.select_cell(cell) {
            Ok(moves) => {
                if let Some(mv) = moves.choose(rng) {
                    return Some(*mv);
                }
            }
            Err(rejection) => debug!(%cell, %rejection, "selectable cell refused"),
        }
        if let Err(rejection) = session.cancel_selection() {
            debug!(%rejection, "nothing to cancel");
        }
    }
    None
}

fn seeded(seed: u64, i: usize) -> SmallRng {
    if seed != 0 {
        SmallRng::seed_from_u64(seed.wrapping_add(i as u64))
    } else {
        SmallRng::from_entropy()
    }
}

/// Plays a batch of games, in parallel when `threads > 1`. Records come
/// back ordered by game id.
pub fn run_playouts(config: &PlayoutConfig) -> Result<Vec<PlayoutRecord>, rayon::ThreadPoolBuildError> {
    use rayon::prelude::*;

    let start = Instant::now();
    let completed = AtomicUsize::new(0);
    let play = |i: usize| {
        let mut rng = seeded(config.seed, i);
        let record = random_playout(config.game, i, &mut rng, config.max_plies);
        let n = completed.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(n, total = config.games, "playout complete");
        record
    };

    let records: Vec<PlayoutRecord> = if config.threads > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build()?;
        pool.install(|| (0..config.games).into_par_iter().map(play).collect())
    } else {
        (0..config.games).map(play).collect()
    };

    info!(
        game = %config.game,
        games = records.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "playouts finished"
    );
    Ok(records)
}

/// Writes one JSON object per line.
pub fn write_jsonl<W: Write>(records: &[PlayoutRecord], out: &mut W) -> std::io::Result<()> {
    for record in records {
        serde_json::to_writer(&mut *out, record)?;
        writeln!(out)?;
    }
    out.flush()
}

/// Aggregate results of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub games: usize,
    pub white_wins: usize,
    pub black_wins: usize,
    pub draws: usize,
    pub unfinished: usize,
    pub stalled: usize,
    pub plies: usize,
}

pub fn summarize(records: &[PlayoutRecord]) -> Summary {
    let mut summary = Summary {
        games: records.len(),
        ..Summary::default()
    };
    for record in records {
        summary.plies += record.plies;
        if record.stalled {
            summary.stalled += 1;
        }
        match (record.outcome, record.winner) {
            (None, _) => summary.unfinished += 1,
            (Some(_), Some(Player::White)) => summary.white_wins += 1,
            (Some(_), Some(Player::Black)) => summary.black_wins += 1,
            (Some(_), None) => summary.draws += 1,
        }
    }
    summary
}
