//! Directed propagation graph and its undirected (simple) view.
//!
//! `DiGraph` is what the loader builds from a `digraph` description: nodes in
//! first-appearance order, every edge kept (parallel edges allowed).
//! `UnGraph` is the structure the k-shell peeling runs on: direction is
//! dropped and parallel/anti-parallel edges coalesce into one neighbour entry.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{Attrs, Edge, Node, NodeIndex, NodeKey};
use crate::{Error, Result};

// ============================================================================
// DiGraph
// ============================================================================

/// Directed multigraph over string-keyed nodes.
#[derive(Debug, Clone, Default)]
pub struct DiGraph {
    nodes: Vec<Node>,
    index: HashMap<NodeKey, NodeIndex>,
    edges: Vec<Edge>,
}

impl DiGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get-or-insert a node by key.
    pub fn add_node(&mut self, key: impl Into<NodeKey>) -> NodeIndex {
        let key = key.into();
        if let Some(&idx) = self.index.get(&key) {
            return idx;
        }
        let idx = NodeIndex(self.nodes.len());
        self.index.insert(key.clone(), idx);
        self.nodes.push(Node::new(key));
        idx
    }

    /// Merge attributes into an existing node.
    pub fn set_node_attrs(&mut self, idx: NodeIndex, attrs: &Attrs) -> Result<()> {
        let node = self.nodes.get_mut(idx.0)
            .ok_or_else(|| Error::NotFound(format!("Node index {}", idx.0)))?;
        node.attrs.extend(attrs);
        Ok(())
    }

    pub fn add_edge(&mut self, src: NodeIndex, dst: NodeIndex, attrs: Attrs) -> Result<usize> {
        if src.0 >= self.nodes.len() {
            return Err(Error::NotFound(format!("Source node index {}", src.0)));
        }
        if dst.0 >= self.nodes.len() {
            return Err(Error::NotFound(format!("Target node index {}", dst.0)));
        }
        self.edges.push(Edge { src, dst, attrs });
        Ok(self.edges.len() - 1)
    }

    pub fn node(&self, idx: NodeIndex) -> Option<&Node> {
        self.nodes.get(idx.0)
    }

    pub fn index_of(&self, key: &str) -> Option<NodeIndex> {
        self.index.get(&NodeKey::from(key)).copied()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Collapse edge direction. Node order is preserved, so a `NodeIndex`
    /// from this graph is valid in the returned one.
    pub fn to_undirected(&self) -> Result<UnGraph> {
        let mut g = UnGraph::with_capacity(self.nodes.len());
        for node in &self.nodes {
            g.add_node(node.key.clone());
        }
        for edge in &self.edges {
            g.add_edge(edge.src, edge.dst)?;
        }
        Ok(g)
    }
}

// ============================================================================
// UnGraph
// ============================================================================

/// Simple undirected graph: no parallel edges, no self-loops.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnGraph {
    keys: Vec<NodeKey>,
    index: HashMap<NodeKey, NodeIndex>,
    adjacency: Vec<SmallVec<[NodeIndex; 8]>>,
    edge_count: usize,
}

impl UnGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(nodes: usize) -> Self {
        Self {
            keys: Vec::with_capacity(nodes),
            index: HashMap::with_capacity(nodes),
            adjacency: Vec::with_capacity(nodes),
            edge_count: 0,
        }
    }

    /// Get-or-insert a node by key.
    pub fn add_node(&mut self, key: impl Into<NodeKey>) -> NodeIndex {
        let key = key.into();
        if let Some(&idx) = self.index.get(&key) {
            return idx;
        }
        let idx = NodeIndex(self.keys.len());
        self.index.insert(key.clone(), idx);
        self.keys.push(key);
        self.adjacency.push(SmallVec::new());
        idx
    }

    /// Add an undirected edge. Returns `false` when the pair was already
    /// connected (the edge coalesces).
    pub fn add_edge(&mut self, a: NodeIndex, b: NodeIndex) -> Result<bool> {
        if a.0 >= self.keys.len() || b.0 >= self.keys.len() {
            return Err(Error::NotFound(format!("Edge endpoint {}-{}", a.0, b.0)));
        }
        if a == b {
            return Err(Error::SelfLoop(self.keys[a.0].to_string()));
        }
        if self.adjacency[a.0].contains(&b) {
            return Ok(false);
        }
        self.adjacency[a.0].push(b);
        self.adjacency[b.0].push(a);
        self.edge_count += 1;
        Ok(true)
    }

    pub fn key(&self, idx: NodeIndex) -> &NodeKey {
        &self.keys[idx.0]
    }

    pub fn index_of(&self, key: &str) -> Option<NodeIndex> {
        self.index.get(&NodeKey::from(key)).copied()
    }

    pub fn keys(&self) -> impl Iterator<Item = &NodeKey> {
        self.keys.iter()
    }

    pub fn indices(&self) -> impl Iterator<Item = NodeIndex> {
        (0..self.keys.len()).map(NodeIndex)
    }

    pub fn neighbors(&self, idx: NodeIndex) -> &[NodeIndex] {
        &self.adjacency[idx.0]
    }

    pub fn degree(&self, idx: NodeIndex) -> usize {
        self.adjacency[idx.0].len()
    }

    pub fn node_count(&self) -> usize {
        self.keys.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Max / median / mean degree over every node.
    pub fn degree_stats(&self) -> DegreeStats {
        let mut degrees: Vec<usize> = self.adjacency.iter().map(|a| a.len()).collect();
        if degrees.is_empty() {
            return DegreeStats::default();
        }
        degrees.sort_unstable();
        let n = degrees.len();
        let median = if n % 2 == 1 {
            degrees[n / 2] as f64
        } else {
            (degrees[n / 2 - 1] + degrees[n / 2]) as f64 / 2.0
        };
        DegreeStats {
            max: degrees[n - 1],
            median,
            mean: degrees.iter().sum::<usize>() as f64 / n as f64,
        }
    }
}

/// Degree summary of an undirected graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DegreeStats {
    pub max: usize,
    pub median: f64,
    pub mean: f64,
}

impl std::fmt::Display for DegreeStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "max: {}, median: {}, mean: {:.1}", self.max, self.median, self.mean)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_node_is_idempotent() {
        let mut g = DiGraph::new();
        let a = g.add_node("a");
        let again = g.add_node("a");
        assert_eq!(a, again);
        assert_eq!(g.node_count(), 1);
    }

    #[test]
    fn test_digraph_keeps_parallel_edges() {
        let mut g = DiGraph::new();
        let a = g.add_node("a");
        let b = g.add_node("b");
        g.add_edge(a, b, Attrs::new()).unwrap();
        g.add_edge(a, b, Attrs::new()).unwrap();
        g.add_edge(b, a, Attrs::new()).unwrap();
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.edges().iter().filter(|e| e.src == a).count(), 2);
        assert_eq!(g.edges().iter().filter(|e| e.dst == a).count(), 1);
    }

    #[test]
    fn test_to_undirected_coalesces() {
        let mut g = DiGraph::new();
        let a = g.add_node("a");
        let b = g.add_node("b");
        let c = g.add_node("c");
        g.add_edge(a, b, Attrs::new()).unwrap();
        g.add_edge(b, a, Attrs::new()).unwrap();
        g.add_edge(b, c, Attrs::new()).unwrap();

        let u = g.to_undirected().unwrap();
        assert_eq!(u.node_count(), 3);
        assert_eq!(u.edge_count(), 2);
        assert_eq!(u.degree(b), 2);
        assert_eq!(u.key(c).as_str(), "c");
    }

    #[test]
    fn test_self_loop_rejected() {
        let mut u = UnGraph::new();
        let a = u.add_node("a");
        let result = u.add_edge(a, a);
        assert!(matches!(result, Err(Error::SelfLoop(ref k)) if k == "a"));
    }

    #[test]
    fn test_degree_stats() {
        // star: centre degree 3, leaves degree 1, plus an isolated node
        let mut u = UnGraph::new();
        let c = u.add_node("c");
        for leaf in ["x", "y", "z"] {
            let l = u.add_node(leaf);
            u.add_edge(c, l).unwrap();
        }
        u.add_node("lonely");

        let stats = u.degree_stats();
        assert_eq!(stats.max, 3);
        assert_eq!(stats.median, 1.0);
        assert!((stats.mean - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_degree_stats_empty() {
        assert_eq!(UnGraph::new().degree_stats(), DegreeStats::default());
    }
}
