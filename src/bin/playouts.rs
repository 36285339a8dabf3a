//! Random playout CLI.
//!
//! Plays random games of one wonder and writes one JSON record per game.
//!
//! Usage:
//!   cargo run --release --bin playouts -- [OPTIONS]
//!
//! Options:
//!   --game NAME      Game to play (default: colossus)
//!   --games N        Number of games to play (default: 100)
//!   --max-plies N    Sub-moves before a game is abandoned (default: 2000)
//!   --threads N      Number of parallel threads (default: 4)
//!   --seed N         Random seed, 0 for entropy (default: 0)
//!   --output FILE    Output file path (default: stdout)
//!   --quiet          Suppress summary output

use std::env;
use std::fs::File;
use std::io::{self, BufWriter};
use std::process;
use std::str::FromStr;

use tracing_subscriber::EnvFilter;

use wonders::games::GameKind;
use wonders::playout::{self, PlayoutConfig};

fn value<T: FromStr>(args: &[String], i: usize, flag: &str) -> T {
    match args.get(i).map(|a| a.parse()) {
        Some(Ok(v)) => v,
        _ => {
            eprintln!("invalid {flag} value");
            print_usage();
            process::exit(1);
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let mut config = PlayoutConfig::default();
    let mut output_path: Option<String> = None;
    let mut quiet = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--game" => {
                i += 1;
                let name: String = value(&args, i, "--game");
                config.game = match GameKind::from_name(&name) {
                    Some(kind) => kind,
                    None => {
                        eprintln!("unknown game: {name}");
                        process::exit(1);
                    }
                };
            }
            "--games" => {
                i += 1;
                config.games = value(&args, i, "--games");
            }
            "--max-plies" => {
                i += 1;
                config.max_plies = value(&args, i, "--max-plies");
            }
            "--threads" => {
                i += 1;
                config.threads = value(&args, i, "--threads");
            }
            "--seed" => {
                i += 1;
                config.seed = value(&args, i, "--seed");
            }
            "--output" => {
                i += 1;
                output_path = Some(value(&args, i, "--output"));
            }
            "--quiet" => {
                quiet = true;
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let records = match playout::run_playouts(&config) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("failed to start thread pool: {e}");
            process::exit(1);
        }
    };

    if !quiet {
        let s = playout::summarize(&records);
        eprintln!("=== Playouts: {} ===", config.game);
        eprintln!("Games: {}", s.games);
        eprintln!(
            "White: {}  Black: {}  Draw: {}  Unfinished: {}",
            s.white_wins, s.black_wins, s.draws, s.unfinished
        );
        if s.games > 0 {
            eprintln!("Avg plies: {:.1}", s.plies as f64 / s.games as f64);
        }
        if s.stalled > 0 {
            eprintln!("Stalled: {}", s.stalled);
        }
    }

    let written = match output_path {
        Some(path) => File::create(&path)
            .and_then(|file| playout::write_jsonl(&records, &mut BufWriter::new(file))),
        None => {
            let stdout = io::stdout();
            playout::write_jsonl(&records, &mut BufWriter::new(stdout.lock()))
        }
    };
    if let Err(e) = written {
        eprintln!("failed to write output: {e}");
        process::exit(1);
    }
}

fn print_usage() {
    eprintln!("Usage: playouts [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --game NAME      Game to play (default: colossus)");
    eprintln!("  --games N        Number of games to play (default: 100)");
    eprintln!("  --max-plies N    Sub-moves before a game is abandoned (default: 2000)");
    eprintln!("  --threads N      Number of parallel threads (default: 4)");
    eprintln!("  --seed N         Random seed, 0 for entropy (default: 0)");
    eprintln!("  --output FILE    Output file path (default: stdout)");
    eprintln!("  --quiet          Suppress summary output");
    eprintln!("  --help           Show this help");
}
