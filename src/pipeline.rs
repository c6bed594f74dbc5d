//! Batch drivers: one function per pipeline, each reading and writing the
//! files its configuration section names.

use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analysis::{self, ThresholdAnalysis};
use crate::config::{AggregateConfig, AnalysisConfig, InfluenceConfig};
use crate::dot;
use crate::fuzzy::FuzzyValueStore;
use crate::idmap::IdentifierMap;
use crate::join::{self, InfluenceJoiner, JoinPolicy};
use crate::kshell::KShellEngine;
use crate::matrix::{CategoryReport, MatrixAggregator};
use crate::model::DegreeStats;
use crate::Result;

/// Summary of one influence run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub graph_path: PathBuf,
    /// Nodes and edges of the directed input
    pub directed_nodes: usize,
    pub directed_edges: usize,
    /// Nodes and edges after the undirected rewrite
    pub undirected_nodes: usize,
    pub undirected_edges: usize,
    pub degree: DegreeStats,
    pub max_shell: u32,
    /// Nodes that received a shell
    pub shell_assigned: usize,
    pub rows: usize,
    pub defaulted_rows: usize,
    pub unmapped_graph_ids: usize,
    pub output_csv: PathBuf,
}

/// Graph → shells → joined CSV.
#[tracing::instrument(skip_all, fields(path = %cfg.graph_path.display()))]
pub fn run_influence(cfg: &InfluenceConfig) -> Result<RunReport> {
    let text = fs::read_to_string(&cfg.graph_path)?;
    let directed = dot::parse_digraph(&text)?;

    let undirected_text = dot::rewrite_undirected(&text);
    if let Some(path) = &cfg.undirected_graph_path {
        create_parent_dir(path)?;
        fs::write(path, &undirected_text)?;
        tracing::info!(path = %path.display(), "undirected graph written");
    }
    let graph = dot::parse_undirected(&undirected_text)?;
    let degree = graph.degree_stats();
    tracing::info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        %degree,
        "undirected graph loaded"
    );

    let shells = KShellEngine::new(cfg.isolated_nodes).decompose(&graph);
    let ids = IdentifierMap::load(&cfg.id_map_path)?;
    let fuzzy = FuzzyValueStore::load(&cfg.fuzzy_path)?;

    let outcome = InfluenceJoiner::new(JoinPolicy { default_shell: cfg.default_shell })
        .join(&fuzzy, &shells, &ids);

    create_parent_dir(&cfg.output_csv)?;
    let mut writer = BufWriter::new(fs::File::create(&cfg.output_csv)?);
    join::write_csv(&outcome.rows, &mut writer)?;
    writer.flush()?;
    tracing::info!(rows = outcome.rows.len(), output = %cfg.output_csv.display(), "joined CSV written");

    Ok(RunReport {
        generated_at: Utc::now(),
        graph_path: cfg.graph_path.clone(),
        directed_nodes: directed.node_count(),
        directed_edges: directed.edge_count(),
        undirected_nodes: graph.node_count(),
        undirected_edges: graph.edge_count(),
        degree,
        max_shell: shells.max_shell(),
        shell_assigned: shells.len(),
        rows: outcome.rows.len(),
        defaulted_rows: outcome.defaulted_rows,
        unmapped_graph_ids: outcome.unmapped_graph_ids.len(),
        output_csv: cfg.output_csv.clone(),
    })
}

/// Every configured category, in order. The first failure aborts the run.
pub fn run_aggregate(cfg: &AggregateConfig) -> Result<Vec<CategoryReport>> {
    cfg.categories.iter().map(MatrixAggregator::run_category).collect()
}

/// Run-file directories written by [`run_analysis`], one per result kind.
pub const ANALYSIS_DIRS: [&str; 5] = ["fuz_fpr", "thd_fpr_fix_step", "inf_dist", "inf_detect", "thd_sweep"];

/// Joined CSV → one run file per result kind, named `<run_name>.txt`.
/// Returns the written paths.
#[tracing::instrument(skip_all, fields(path = %cfg.joined_csv.display()))]
pub fn run_analysis(cfg: &AnalysisConfig) -> Result<Vec<PathBuf>> {
    let file = fs::File::open(&cfg.joined_csv)?;
    let source = cfg.joined_csv.display().to_string();
    let rows = join::read_csv(BufReader::new(file), &source)?;
    let analysis = ThresholdAnalysis::from_rows(&rows, &source)?;
    let thresholds = analysis::default_thresholds();

    let [band_dir, fixed_dir, dist_dir, detect_dir, sweep_dir] = ANALYSIS_DIRS;
    let written = vec![
        write_run_file(cfg, band_dir, &analysis.band_fpr(&cfg.band_thresholds))?,
        write_run_file(cfg, fixed_dir, &analysis.fpr_at_thresholds(&thresholds))?,
        write_run_file(cfg, dist_dir, &analysis.influence_distribution())?,
        write_run_file(cfg, detect_dir, &analysis.influence_fill_rates(&thresholds))?,
        write_run_file(cfg, sweep_dir, &analysis.threshold_sweep())?,
    ];
    tracing::info!(rows = analysis.len(), max_shell = analysis.max_shell(), files = written.len(), "analysis written");
    Ok(written)
}

fn write_run_file<R: analysis::RunRow>(cfg: &AnalysisConfig, dir: &str, rows: &[R]) -> Result<PathBuf> {
    let dir = cfg.output_dir.join(dir);
    fs::create_dir_all(&dir)?;
    let path = dir.join(format!("{}.txt", cfg.run_name));
    let mut writer = BufWriter::new(fs::File::create(&path)?);
    analysis::write_run_rows(rows, &mut writer)?;
    writer.flush()?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "run file written");
    Ok(path)
}

fn create_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(fs::create_dir_all(parent)?),
        _ => Ok(()),
    }
}
