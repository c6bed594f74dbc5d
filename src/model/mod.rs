//! # Data Model
//!
//! Plain data shared by every stage: graph structures, per-node records and
//! result matrices.
//!
//! Design rule: no file I/O here. Loaders and writers live with the
//! component that owns the format.

pub mod node;
pub mod edge;
pub mod attrs;
pub mod graph;
pub mod record;
pub mod matrix;

pub use node::{Node, NodeKey, NodeIndex};
pub use edge::Edge;
pub use attrs::Attrs;
pub use graph::{DiGraph, UnGraph, DegreeStats};
pub use record::{FuzzyRecord, JoinedRow};
pub use matrix::ResultMatrix;
