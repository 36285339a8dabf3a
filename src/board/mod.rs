//! Board representation shared by all seven games.
//!
//! Contains the static topology graph, per-cell contents, players, and the
//! move and event types.

pub mod moves;
pub mod player;
pub mod state;
pub mod topology;

pub use moves::{Event, Move};
pub use player::{Player, ALL_PLAYERS};
pub use state::{Board, Counts, StoneBoard};
pub use topology::{
    CellId, Coord, Direction, Garden, Node, Ray, Topology, TopologyBuilder, Zone, EPSILON,
    ORTHOGONAL,
};
