//! Edge in the directed propagation graph.

use serde::{Deserialize, Serialize};
use super::{Attrs, NodeIndex};

/// A directed edge. Parallel edges between the same pair are kept as
/// separate `Edge`s in a `DiGraph`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub src: NodeIndex,
    pub dst: NodeIndex,
    pub attrs: Attrs,
}
