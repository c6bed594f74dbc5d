//! Node in the propagation graph.

use serde::{Deserialize, Serialize};
use super::Attrs;

/// Graph-local node identifier, exactly as written in the graph description.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeKey(pub String);

impl NodeKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeKey {
    fn from(s: &str) -> Self {
        NodeKey(s.to_string())
    }
}

impl From<String> for NodeKey {
    fn from(s: String) -> Self {
        NodeKey(s)
    }
}

/// Dense position of a node inside one graph. Only meaningful for the graph
/// that handed it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeIndex(pub usize);

/// A node with its (optional) attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub key: NodeKey,
    pub attrs: Attrs,
}

impl Node {
    pub fn new(key: impl Into<NodeKey>) -> Self {
        Self {
            key: key.into(),
            attrs: Attrs::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attrs.get(name)
    }
}
