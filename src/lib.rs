//! # kshell-influence: structural influence vs. fuzzy reachability
//!
//! Ranks the nodes of a directed propagation graph by k-shell index and
//! joins that ranking against externally computed fuzzy reachability scores
//! and ground-truth labels. A separate pipeline averages per-run result
//! matrices for reporting.
//!
//! ## Pipelines
//!
//! ```text
//! graph.dot ─▶ dot::rewrite_undirected ─▶ dot::parse_undirected ─▶ KShellEngine
//!                                                                     │
//! id map ─▶ IdentifierMap ─────────────────────────▶ InfluenceJoiner ◀┘
//! fuzzy values ─▶ FuzzyValueStore ──────────────────────────┘  │
//!                                                              ▼
//!                                                   joined CSV ─▶ analysis ─▶ run files
//!
//! run files (per category) ─▶ MatrixAggregator ─▶ averaged matrix
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kshell_influence::{dot, KShellEngine, IsolatedNodePolicy};
//!
//! # fn example() -> kshell_influence::Result<()> {
//! let text = std::fs::read_to_string("graphs/graph_real.dot")?;
//! let graph = dot::parse_undirected(&dot::rewrite_undirected(&text))?;
//! let shells = KShellEngine::new(IsolatedNodePolicy::Exclude).decompose(&graph);
//! println!("degeneracy = {}", shells.max_shell());
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod dot;
pub mod kshell;
pub mod idmap;
pub mod fuzzy;
pub mod join;
pub mod matrix;
pub mod analysis;
pub mod config;
pub mod pipeline;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{
    DiGraph, UnGraph, Node, NodeKey, NodeIndex, Edge, Attrs, DegreeStats,
    FuzzyRecord, JoinedRow, ResultMatrix,
};

// ============================================================================
// Re-exports: Components
// ============================================================================

pub use kshell::{KShellEngine, ShellAssignment, IsolatedNodePolicy};
pub use idmap::IdentifierMap;
pub use fuzzy::FuzzyValueStore;
pub use join::{InfluenceJoiner, JoinPolicy, JoinOutcome};
pub use matrix::{MatrixAggregator, FilePattern, RunMatrix, CategoryReport};
pub use analysis::{ThresholdAnalysis, FprCount};
pub use config::PipelineConfig;
pub use pipeline::RunReport;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("DOT syntax error at position {position}: {message}")]
    DotSyntax { position: usize, message: String },

    #[error("Malformed record in {input} line {line}: {message}")]
    MalformedRecord { input: String, line: usize, message: String },

    #[error("Shape mismatch in {input}: expected {expected:?}, got {got:?}")]
    ShapeMismatch { input: String, expected: (usize, usize), got: (usize, usize) },

    #[error("Ragged matrix in {input}: row {row} has {got} values, expected {expected}")]
    RaggedMatrix { input: String, row: usize, expected: usize, got: usize },

    #[error("Invalid file pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Matrix has {rows} rows and no columns; the comma-terminated format cannot hold it")]
    ZeroWidthMatrix { rows: usize },

    #[error("Nothing to aggregate: {0}")]
    EmptyAggregation(String),

    #[error("Self-loop on node {0}: k-shell decomposition needs a graph without self-loops")]
    SelfLoop(String),

    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
