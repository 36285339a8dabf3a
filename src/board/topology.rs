//! Static board graphs.
//!
//! Every game describes its board once as a `Topology`: a dense arena of
//! nodes addressed by `CellId`, an ordered adjacency table, straight-line
//! rays and zone tags. Tables are assembled with `TopologyBuilder`, which
//! refuses dangling, duplicated, self-referencing or one-way arcs, and are
//! shared read-only afterwards.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::player::Player;
use crate::error::TopologyError;

/// Tolerance when comparing layout deltas of consecutive ray hops.
pub const EPSILON: f64 = 0.01;

/// Index of a node inside its topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(pub u16);

impl CellId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Integer address of a node. Single-layer boards use layer 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub layer: u8,
    pub row: u8,
    pub col: u8,
}

impl Coord {
    pub const fn new(layer: u8, row: u8, col: u8) -> Self {
        Coord { layer, row, col }
    }

    pub const fn grid(row: u8, col: u8) -> Self {
        Coord { layer: 0, row, col }
    }
}

/// One of the four orthogonal grid directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Orthogonal directions in scan order.
pub const ORTHOGONAL: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];

impl Direction {
    /// Row and column step.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The four garden nodes of the Gardens board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Garden {
    TopLeft,
    BottomLeft,
    BottomRight,
    TopRight,
}

impl Garden {
    pub const ALL: [Garden; 4] = [
        Garden::TopLeft,
        Garden::BottomLeft,
        Garden::BottomRight,
        Garden::TopRight,
    ];

    /// Node label used on the board.
    pub const fn label(self) -> &'static str {
        match self {
            Garden::TopLeft => "tl",
            Garden::BottomLeft => "bl",
            Garden::BottomRight => "br",
            Garden::TopRight => "tr",
        }
    }
}

impl fmt::Display for Garden {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Garden::TopLeft => "top-left garden",
            Garden::BottomLeft => "bottom-left garden",
            Garden::BottomRight => "bottom-right garden",
            Garden::TopRight => "top-right garden",
        };
        f.write_str(name)
    }
}

/// Special meaning attached to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    /// Landing here tilts the whole board this way.
    Arrow(Direction),
    /// Can be lit by the colour that lands on it.
    Beacon,
    VictoryField,
    /// Reaching this node wins for `goal_of`.
    Artemis { goal_of: Player },
    Garden(Garden),
}

/// A node of the board graph.
#[derive(Debug, Clone)]
pub struct Node {
    pub coord: Coord,
    pub label: String,
    /// Layout position, used only to continue rays in a straight line.
    pub position: (f64, f64),
    pub zones: Vec<Zone>,
}

/// A straight line leaving a node, nearest cell first.
#[derive(Debug, Clone)]
pub struct Ray {
    pub delta: (f64, f64),
    pub cells: Vec<CellId>,
}

impl Ray {
    /// First cell of the ray (the neighbour it leaves through).
    pub fn first(&self) -> CellId {
        self.cells[0]
    }
}

/// An immutable board graph.
#[derive(Debug, Clone)]
pub struct Topology {
    name: &'static str,
    nodes: Vec<Node>,
    adjacency: Vec<Vec<CellId>>,
    rays: Vec<Vec<Ray>>,
    by_coord: HashMap<Coord, CellId>,
    by_label: HashMap<String, CellId>,
}

impl Topology {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All cells in arena order.
    pub fn cells(&self) -> impl Iterator<Item = CellId> + '_ {
        (0..self.nodes.len()).map(|i| CellId(i as u16))
    }

    pub fn contains(&self, cell: CellId) -> bool {
        cell.index() < self.nodes.len()
    }

    pub fn node(&self, cell: CellId) -> &Node {
        &self.nodes[cell.index()]
    }

    pub fn coord(&self, cell: CellId) -> Coord {
        self.nodes[cell.index()].coord
    }

    pub fn label(&self, cell: CellId) -> &str {
        &self.nodes[cell.index()].label
    }

    pub fn zones(&self, cell: CellId) -> &[Zone] {
        &self.nodes[cell.index()].zones
    }

    pub fn has_zone(&self, cell: CellId, zone: Zone) -> bool {
        self.zones(cell).contains(&zone)
    }

    /// Direction of the arrow printed on `cell`, if any.
    pub fn arrow(&self, cell: CellId) -> Option<Direction> {
        self.zones(cell).iter().find_map(|z| match z {
            Zone::Arrow(d) => Some(*d),
            _ => None,
        })
    }

    /// The player whose goal `cell` is, if it is an Artemis node.
    pub fn artemis_goal(&self, cell: CellId) -> Option<Player> {
        self.zones(cell).iter().find_map(|z| match z {
            Zone::Artemis { goal_of } => Some(*goal_of),
            _ => None,
        })
    }

    pub fn garden(&self, cell: CellId) -> Option<Garden> {
        self.zones(cell).iter().find_map(|z| match z {
            Zone::Garden(g) => Some(*g),
            _ => None,
        })
    }

    /// Every cell carrying `zone`.
    pub fn cells_with(&self, zone: Zone) -> Vec<CellId> {
        self.cells().filter(|&c| self.has_zone(c, zone)).collect()
    }

    /// Ordered neighbours of `cell`.
    pub fn neighbors(&self, cell: CellId) -> &[CellId] {
        &self.adjacency[cell.index()]
    }

    pub fn is_adjacent(&self, a: CellId, b: CellId) -> bool {
        self.adjacency[a.index()].contains(&b)
    }

    /// Straight lines leaving `cell`, one per neighbour.
    pub fn rays(&self, cell: CellId) -> &[Ray] {
        &self.rays[cell.index()]
    }

    pub fn find(&self, label: &str) -> Option<CellId> {
        self.by_label.get(label).copied()
    }

    pub fn cell_at(&self, coord: Coord) -> Option<CellId> {
        self.by_coord.get(&coord).copied()
    }

    /// Signed lookup; anything outside `u8` range is simply absent.
    pub fn at(&self, layer: i32, row: i32, col: i32) -> Option<CellId> {
        let l = u8::try_from(layer).ok()?;
        let r = u8::try_from(row).ok()?;
        let c = u8::try_from(col).ok()?;
        self.cell_at(Coord::new(l, r, c))
    }

    /// The cell one step from `cell` in `dir` on the same layer.
    pub fn offset(&self, cell: CellId, dir: Direction) -> Option<CellId> {
        let coord = self.coord(cell);
        let (dr, dc) = dir.delta();
        self.at(
            coord.layer as i32,
            coord.row as i32 + dr,
            coord.col as i32 + dc,
        )
    }
}

/// Collects nodes and arcs, then validates them into a `Topology`.
#[derive(Debug)]
pub struct TopologyBuilder {
    name: &'static str,
    nodes: Vec<Node>,
    arcs: Vec<(usize, usize)>,
}

impl TopologyBuilder {
    pub fn new(name: &'static str) -> Self {
        TopologyBuilder {
            name,
            nodes: Vec::new(),
            arcs: Vec::new(),
        }
    }

    /// Adds a node and returns its id.
    pub fn node(&mut self, coord: Coord, label: impl Into<String>, position: (f64, f64)) -> CellId {
        let id = CellId(self.nodes.len() as u16);
        self.nodes.push(Node {
            coord,
            label: label.into(),
            position,
            zones: Vec::new(),
        });
        id
    }

    pub fn tag(&mut self, cell: CellId, zone: Zone) {
        if let Some(node) = self.nodes.get_mut(cell.index()) {
            node.zones.push(zone);
        }
    }

    /// Adds a single directed arc.
    pub fn arc(&mut self, from: CellId, to: CellId) {
        self.arcs.push((from.index(), to.index()));
    }

    /// Adds both directions between `a` and `b`.
    pub fn link(&mut self, a: CellId, b: CellId) {
        self.arc(a, b);
        self.arc(b, a);
    }

    pub fn lookup(&self, label: &str) -> Result<CellId, TopologyError> {
        self.nodes
            .iter()
            .position(|n| n.label == label)
            .map(|i| CellId(i as u16))
            .ok_or_else(|| TopologyError::MissingLabel {
                board: self.name,
                label: label.to_string(),
            })
    }

    pub fn link_labels(&mut self, a: &str, b: &str) -> Result<(), TopologyError> {
        let a = self.lookup(a)?;
        let b = self.lookup(b)?;
        self.link(a, b);
        Ok(())
    }

    pub fn cell_at(&self, coord: Coord) -> Option<CellId> {
        self.nodes
            .iter()
            .position(|n| n.coord == coord)
            .map(|i| CellId(i as u16))
    }

    /// Links every node to its right-hand and lower neighbour on the same
    /// layer, when those exist.
    pub fn link_orthogonal(&mut self) {
        let index: HashMap<Coord, CellId> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.coord, CellId(i as u16)))
            .collect();
        for i in 0..self.nodes.len() {
            let c = self.nodes[i].coord;
            let here = CellId(i as u16);
            let right = Coord::new(c.layer, c.row, c.col.wrapping_add(1));
            let below = Coord::new(c.layer, c.row.wrapping_add(1), c.col);
            for coord in [right, below] {
                if let Some(&there) = index.get(&coord) {
                    self.link(here, there);
                }
            }
        }
    }

    /// Validates the arc table and precomputes adjacency and rays.
    pub fn build(self) -> Result<Topology, TopologyError> {
        let n = self.nodes.len();
        let board = self.name;

        let mut by_label = HashMap::with_capacity(n);
        let mut by_coord = HashMap::with_capacity(n);
        for (i, node) in self.nodes.iter().enumerate() {
            if by_label.insert(node.label.clone(), CellId(i as u16)).is_some() {
                return Err(TopologyError::DuplicateLabel {
                    board,
                    label: node.label.clone(),
                });
            }
            by_coord.insert(node.coord, CellId(i as u16));
        }

        let mut seen = HashSet::with_capacity(self.arcs.len());
        let mut adjacency = vec![Vec::new(); n];
        for &(from, to) in &self.arcs {
            if from >= n || to >= n {
                return Err(TopologyError::DanglingArc { board, from, to });
            }
            if from == to {
                return Err(TopologyError::SelfLoop {
                    board,
                    label: self.nodes[from].label.clone(),
                });
            }
            if !seen.insert((from, to)) {
                return Err(TopologyError::DuplicateArc {
                    board,
                    from: self.nodes[from].label.clone(),
                    to: self.nodes[to].label.clone(),
                });
            }
            adjacency[from].push(CellId(to as u16));
        }
        for &(from, to) in &self.arcs {
            if !seen.contains(&(to, from)) {
                return Err(TopologyError::Asymmetric {
                    board,
                    from: self.nodes[from].label.clone(),
                    to: self.nodes[to].label.clone(),
                });
            }
        }

        let rays = trace_rays(&self.nodes, &adjacency);
        Ok(Topology {
            name: self.name,
            nodes: self.nodes,
            adjacency,
            rays,
            by_coord,
            by_label,
        })
    }
}

fn delta(from: (f64, f64), to: (f64, f64)) -> (f64, f64) {
    (to.0 - from.0, to.1 - from.1)
}

fn same_delta(a: (f64, f64), b: (f64, f64)) -> bool {
    (a.0 - b.0).abs() < EPSILON && (a.1 - b.1).abs() < EPSILON
}

/// Extends each arc into a straight line: the next hop is the neighbour
/// whose layout delta repeats the previous one.
fn trace_rays(nodes: &[Node], adjacency: &[Vec<CellId>]) -> Vec<Vec<Ray>> {
    let pos = |c: CellId| nodes[c.index()].position;
    let mut rays = Vec::with_capacity(nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        let origin = CellId(i as u16);
        let from_here = adjacency[i]
            .iter()
            .map(|&first| {
                let step = delta(node.position, pos(first));
                let mut cells = vec![first];
                let (mut prev, mut cur) = (origin, first);
                while cells.len() < nodes.len() {
                    let next = adjacency[cur.index()]
                        .iter()
                        .copied()
                        .find(|&n| n != prev && same_delta(delta(pos(cur), pos(n)), step));
                    match next {
                        Some(n) => {
                            cells.push(n);
                            prev = cur;
                            cur = n;
                        }
                        None => break,
                    }
                }
                Ray { delta: step, cells }
            })
            .collect();
        rays.push(from_here);
    }
    rays
}
