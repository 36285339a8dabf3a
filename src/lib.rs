//! Wonders engine library.
//!
//! Board graphs, the seven rule sets, the turn controller and the line
//! protocol, exposed for the binaries, integration tests and benches.

pub mod board;
pub mod engine;
pub mod error;
pub mod games;
pub mod movegen;
pub mod outcome;
pub mod playout;
pub mod protocol;
pub mod resolve;
pub mod session;
pub mod turn;
