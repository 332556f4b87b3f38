//! An explicit game graph.
//!
//! Nodes are positions, edges are moves; the move is the id of the node it leads to. A node
//! with no outgoing edges is lost for the side to move unless marked otherwise, and any node may
//! be marked as an immediate win or loss for the side to move. The graph must be acyclic.
//!
//! Text format, one statement per line (`#` starts a comment):
//!
//! ```text
//! 1: 2 3 4      # moves from 1 lead to 2, 3 and 4
//! 2 = win       # the side to move at 2 has won
//! 3 = loss
//! ```

use std::fs;
use std::path::Path;
use std::str::FromStr;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::SolverError;
use crate::game::{Evaluator, GameState, Outcome, Side, DEFAULT_DELTA_SCALE};

pub type NodeId = u32;

#[derive(Debug, Clone)]
pub struct GraphGame {
    /// Outgoing edges in insertion order, with their move-ordering score.
    edges: FxHashMap<NodeId, Vec<(NodeId, i64)>>,
    /// `true`: the side to move has won.
    terminals: FxHashMap<NodeId, bool>,
    forced: FxHashMap<(NodeId, NodeId), Vec<NodeId>>,
    unique: FxHashSet<(NodeId, NodeId, NodeId)>,
    delta_scale: u64,
}

impl Default for GraphGame {
    fn default() -> Self {
        Self {
            edges: FxHashMap::default(),
            terminals: FxHashMap::default(),
            forced: FxHashMap::default(),
            unique: FxHashSet::default(),
            delta_scale: DEFAULT_DELTA_SCALE,
        }
    }
}

impl GraphGame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edge(&mut self, from: NodeId, to: NodeId) -> &mut Self {
        self.edge_scored(from, to, 0)
    }

    pub fn edge_scored(&mut self, from: NodeId, to: NodeId, score: i64) -> &mut Self {
        self.edges.entry(from).or_default().push((to, score));
        self
    }

    /// Marks `node` as won for the side to move there.
    pub fn win(&mut self, node: NodeId) -> &mut Self {
        self.terminals.insert(node, true);
        self
    }

    /// Marks `node` as lost for the side to move there.
    pub fn loss(&mut self, node: NodeId) -> &mut Self {
        self.terminals.insert(node, false);
        self
    }

    /// After `mv` from `from`, `line` (reply, move, ...) is played as part of the same unit.
    pub fn forced(&mut self, from: NodeId, mv: NodeId, line: Vec<NodeId>) -> &mut Self {
        self.forced.insert((from, mv), line);
        self
    }

    /// At `node`, `winning` refuting `losing` proves `node` lost.
    pub fn unique_reply(&mut self, node: NodeId, losing: NodeId, winning: NodeId) -> &mut Self {
        self.unique.insert((node, losing, winning));
        self
    }

    pub fn with_delta_scale(mut self, scale: u64) -> Self {
        self.delta_scale = scale;
        self
    }

    /// Black to move at `node`.
    pub fn start(&self, node: NodeId) -> GraphState {
        GraphState {
            node,
            to_move: Side::Black,
            trail: Vec::new(),
        }
    }

    pub fn children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.edges
            .get(&node)
            .into_iter()
            .flat_map(|e| e.iter().map(|&(to, _)| to))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SolverError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| SolverError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        text.parse()
    }

    /// Rejects cycles and forced lines that do not follow edges.
    pub fn validate(&self) -> Result<(), SolverError> {
        for (&(from, mv), line) in &self.forced {
            if line.len() % 2 == 1 {
                return Err(SolverError::parse(
                    "forced line",
                    format!("{from} -> {mv}"),
                    "must have an even number of moves",
                ));
            }
            let mut at = from;
            for &next in std::iter::once(&mv).chain(line) {
                if !self.children(at).any(|c| c == next) {
                    return Err(SolverError::parse(
                        "forced line",
                        format!("{from} -> {mv}"),
                        format!("no edge {at} -> {next}"),
                    ));
                }
                at = next;
            }
        }
        self.check_acyclic()
    }

    fn check_acyclic(&self) -> Result<(), SolverError> {
        // 1 = on the current DFS path, 2 = finished.
        let mut mark: FxHashMap<NodeId, u8> = FxHashMap::default();
        let mut roots: Vec<NodeId> = self.edges.keys().copied().collect();
        roots.sort_unstable();
        for root in roots {
            if mark.contains_key(&root) {
                continue;
            }
            let mut stack: Vec<(NodeId, usize)> = vec![(root, 0)];
            mark.insert(root, 1);
            while let Some(top) = stack.last_mut() {
                let node = top.0;
                let edges = self.edges.get(&node).map(Vec::as_slice).unwrap_or(&[]);
                if let Some(&(child, _)) = edges.get(top.1) {
                    top.1 += 1;
                    match mark.get(&child).copied() {
                        Some(1) => {
                            return Err(SolverError::parse(
                                "graph",
                                format!("{node} -> {child}"),
                                "edge closes a cycle",
                            ))
                        }
                        Some(_) => {}
                        None => {
                            mark.insert(child, 1);
                            stack.push((child, 0));
                        }
                    }
                } else {
                    mark.insert(node, 2);
                    stack.pop();
                }
            }
        }
        Ok(())
    }
}

impl FromStr for GraphGame {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut game = GraphGame::new();
        for raw in s.lines() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            if let Some((node, rest)) = line.split_once(':') {
                let from = parse_node(node, raw)?;
                for to in rest.split_whitespace() {
                    game.edge(from, parse_node(to, raw)?);
                }
            } else if let Some((node, value)) = line.split_once('=') {
                let node = parse_node(node, raw)?;
                match value.trim() {
                    "win" => game.win(node),
                    "loss" => game.loss(node),
                    other => {
                        return Err(SolverError::parse(
                            "graph line",
                            raw,
                            format!("expected `win` or `loss`, found `{other}`"),
                        ))
                    }
                };
            } else {
                return Err(SolverError::parse(
                    "graph line",
                    raw,
                    "expected `node: children` or `node = win|loss`",
                ));
            }
        }
        game.validate()?;
        Ok(game)
    }
}

fn parse_node(text: &str, line: &str) -> Result<NodeId, SolverError> {
    text.trim()
        .parse()
        .map_err(|e| SolverError::parse("graph line", line, format!("`{}`: {e}", text.trim())))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphState {
    node: NodeId,
    to_move: Side,
    trail: Vec<NodeId>,
}

impl GraphState {
    #[inline]
    pub fn node(&self) -> NodeId {
        self.node
    }
}

impl GameState for GraphState {
    type Move = NodeId;

    /// The node id itself.
    #[inline]
    fn hash(&self) -> u64 {
        u64::from(self.node)
    }

    #[inline]
    fn to_move(&self) -> Side {
        self.to_move
    }

    fn play(&mut self, mv: NodeId) {
        self.trail.push(self.node);
        self.node = mv;
        self.to_move = self.to_move.opponent();
    }

    fn undo(&mut self, mv: NodeId) {
        debug_assert_eq!(self.node, mv, "undo of a move that was not played last");
        if let Some(prev) = self.trail.pop() {
            self.node = prev;
            self.to_move = self.to_move.opponent();
        }
    }
}

impl Evaluator<GraphState> for GraphGame {
    fn classify(&self, state: &GraphState) -> Outcome {
        match self.terminals.get(&state.node) {
            Some(true) => Outcome::Decided(state.to_move),
            Some(false) => Outcome::Decided(state.to_move.opponent()),
            None if self.children(state.node).next().is_none() => {
                Outcome::Decided(state.to_move.opponent())
            }
            None => Outcome::Undetermined,
        }
    }

    fn candidate_moves(&self, state: &GraphState) -> Vec<NodeId> {
        self.children(state.node).collect()
    }

    fn score(&self, state: &GraphState, mv: NodeId) -> i64 {
        self.edges
            .get(&state.node)
            .and_then(|e| e.iter().find(|&&(to, _)| to == mv))
            .map_or(0, |&(_, score)| score)
    }

    fn forced_line(&self, state: &GraphState, mv: NodeId) -> Vec<NodeId> {
        self.forced
            .get(&(state.node, mv))
            .cloned()
            .unwrap_or_default()
    }

    fn unique_reply(&self, state: &GraphState, losing: NodeId, winning: NodeId) -> bool {
        self.unique.contains(&(state.node, losing, winning))
    }

    #[inline]
    fn delta_scale(&self, _state: &GraphState) -> u64 {
        self.delta_scale
    }
}
