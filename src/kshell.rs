//! # K-shell decomposition
//!
//! Assigns every node the largest `k` for which it survives k-core peeling
//! (its core number). Cores nest, so each probe peels what survived the
//! previous one instead of starting from the full graph again.
//!
//! ```text
//! k = 1: peel degree < 1 ─▶ survivors get shell 1
//! k = 2: peel degree < 2 ─▶ survivors get shell 2
//! ...
//! k = m+1: nothing survives ─▶ stop, max shell = m
//! ```

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::model::{NodeIndex, NodeKey, UnGraph};

/// What to do with degree-0 nodes, which never enter the 1-core.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolatedNodePolicy {
    /// Leave them out of the assignment; the joiner's default applies.
    #[default]
    Exclude,
    /// Assign them shell 0 explicitly.
    ShellZero,
}

/// Nodes of the k-core of `graph`: the maximal subgraph in which every node
/// has degree ≥ k.
pub fn k_core(graph: &UnGraph, k: usize) -> Vec<NodeIndex> {
    let mut alive = vec![true; graph.node_count()];
    peel(graph, &mut alive, k);
    graph.indices().filter(|i| alive[i.0]).collect()
}

/// Remove (mark dead) every alive node whose alive-degree drops below `k`,
/// cascading. Returns the number of survivors.
fn peel(graph: &UnGraph, alive: &mut [bool], k: usize) -> usize {
    let mut degree: Vec<usize> = graph.indices()
        .map(|i| {
            if alive[i.0] {
                graph.neighbors(i).iter().filter(|n| alive[n.0]).count()
            } else {
                0
            }
        })
        .collect();

    let mut stack: Vec<NodeIndex> = graph.indices()
        .filter(|i| alive[i.0] && degree[i.0] < k)
        .collect();
    for i in &stack {
        alive[i.0] = false;
    }

    while let Some(v) = stack.pop() {
        for &n in graph.neighbors(v) {
            if alive[n.0] {
                degree[n.0] -= 1;
                if degree[n.0] < k {
                    alive[n.0] = false;
                    stack.push(n);
                }
            }
        }
    }

    alive.iter().filter(|a| **a).count()
}

// ============================================================================
// ShellAssignment
// ============================================================================

/// Graph-local node key → shell index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShellAssignment {
    /// Graph order.
    entries: Vec<(NodeKey, u32)>,
    index: HashMap<NodeKey, usize>,
    max_shell: u32,
}

impl ShellAssignment {
    fn push(&mut self, key: NodeKey, shell: u32) {
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, shell));
        self.max_shell = self.max_shell.max(shell);
    }

    pub fn get(&self, key: &str) -> Option<u32> {
        self.index.get(&NodeKey::from(key)).map(|&i| self.entries[i].1)
    }

    /// Largest shell index present; equals the graph's degeneracy.
    pub fn max_shell(&self) -> u32 {
        self.max_shell
    }

    /// Nodes whose shell index is exactly `k`.
    pub fn members(&self, k: u32) -> impl Iterator<Item = &NodeKey> {
        self.entries.iter().filter(move |(_, s)| *s == k).map(|(key, _)| key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeKey, u32)> {
        self.entries.iter().map(|(k, s)| (k, *s))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// KShellEngine
// ============================================================================

/// Computes a `ShellAssignment` by linear probing over k.
#[derive(Debug, Clone, Copy, Default)]
pub struct KShellEngine {
    policy: IsolatedNodePolicy,
}

impl KShellEngine {
    pub fn new(policy: IsolatedNodePolicy) -> Self {
        Self { policy }
    }

    pub fn decompose(&self, graph: &UnGraph) -> ShellAssignment {
        let mut alive = vec![true; graph.node_count()];
        let mut shell: Vec<Option<u32>> = vec![None; graph.node_count()];

        let mut k: u32 = 1;
        loop {
            let survivors = peel(graph, &mut alive, k as usize);
            if survivors == 0 {
                break;
            }
            tracing::debug!(k, survivors, "k-core");
            for i in graph.indices().filter(|i| alive[i.0]) {
                shell[i.0] = Some(k);
            }
            k += 1;
        }

        let mut assignment = ShellAssignment::default();
        let mut isolated = 0usize;
        for i in graph.indices() {
            match (shell[i.0], self.policy) {
                (Some(s), _) => assignment.push(graph.key(i).clone(), s),
                (None, IsolatedNodePolicy::ShellZero) => {
                    isolated += 1;
                    assignment.push(graph.key(i).clone(), 0);
                }
                (None, IsolatedNodePolicy::Exclude) => isolated += 1,
            }
        }

        if isolated > 0 {
            tracing::warn!(isolated, policy = ?self.policy, "degree-0 nodes outside every shell");
        }
        tracing::info!(
            nodes = graph.node_count(),
            assigned = assignment.len(),
            max_shell = assignment.max_shell(),
            "k-shell decomposition done"
        );
        assignment
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(nodes: &[&str], edges: &[(&str, &str)]) -> UnGraph {
        let mut g = UnGraph::new();
        for n in nodes {
            g.add_node(*n);
        }
        for (a, b) in edges {
            let a = g.add_node(*a);
            let b = g.add_node(*b);
            g.add_edge(a, b).unwrap();
        }
        g
    }

    fn decompose(g: &UnGraph) -> ShellAssignment {
        KShellEngine::default().decompose(g)
    }

    #[test]
    fn test_triangle() {
        let g = graph(&[], &[("a", "b"), ("b", "c"), ("c", "a")]);
        let s = decompose(&g);
        assert_eq!(s.max_shell(), 2);
        assert!(g.keys().all(|k| s.get(k.as_str()) == Some(2)));
    }

    #[test]
    fn test_path_of_four() {
        let g = graph(&[], &[("0", "1"), ("1", "2"), ("2", "3")]);
        let s = decompose(&g);
        assert_eq!(s.max_shell(), 1);
        assert_eq!(s.len(), 4);
    }

    #[test]
    fn test_four_cycle() {
        let g = graph(&[], &[("0", "1"), ("1", "2"), ("2", "3"), ("3", "0")]);
        let s = decompose(&g);
        assert_eq!(s.max_shell(), 2);
        for key in ["0", "1", "2", "3"] {
            assert_eq!(s.get(key), Some(2));
        }
    }

    #[test]
    fn test_clique_with_pendant() {
        let g = graph(&[], &[
            ("a", "b"), ("a", "c"), ("a", "d"), ("b", "c"), ("b", "d"), ("c", "d"),
            ("d", "tail"),
        ]);
        let s = decompose(&g);
        assert_eq!(s.max_shell(), 3);
        assert_eq!(s.get("tail"), Some(1));
        assert_eq!(s.members(3).count(), 4);
        assert_eq!(s.members(2).count(), 0);
    }

    #[test]
    fn test_isolated_excluded_by_default() {
        let g = graph(&["alone"], &[("a", "b")]);
        let s = decompose(&g);
        assert_eq!(s.get("alone"), None);
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_isolated_shell_zero() {
        let g = graph(&["alone"], &[("a", "b")]);
        let s = KShellEngine::new(IsolatedNodePolicy::ShellZero).decompose(&g);
        assert_eq!(s.get("alone"), Some(0));
        assert_eq!(s.len(), 3);
        assert_eq!(s.max_shell(), 1);
    }

    #[test]
    fn test_empty_graph() {
        let s = decompose(&UnGraph::new());
        assert!(s.is_empty());
        assert_eq!(s.max_shell(), 0);
    }

    #[test]
    fn test_k_core_matches_assignment() {
        let g = graph(&[], &[
            ("a", "b"), ("b", "c"), ("c", "a"), ("c", "d"), ("d", "e"),
        ]);
        let core: Vec<_> = k_core(&g, 2).into_iter().map(|i| g.key(i).as_str().to_string()).collect();
        assert_eq!(core, vec!["a", "b", "c"]);
        assert!(k_core(&g, 3).is_empty());
    }

    #[test]
    fn test_assignment_in_graph_order() {
        let g = graph(&["z", "y"], &[("z", "y")]);
        let shells = decompose(&g);
        let keys: Vec<_> = shells.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["z", "y"]);
    }
}
