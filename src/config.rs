//! Pipeline configuration
//!
//! Loaded from (later sources win):
//! - built-in defaults (every field has one)
//! - an optional configuration file (TOML, YAML or JSON by extension)
//! - environment variables prefixed with `KSHELL__`,
//!   e.g. `KSHELL__INFLUENCE__DEFAULT_SHELL=1`

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::kshell::IsolatedNodePolicy;
use crate::Result;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub influence: InfluenceConfig,

    #[serde(default)]
    pub aggregate: AggregateConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Influence run: graph in, joined CSV out.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InfluenceConfig {
    /// Directed DOT graph
    #[serde(default = "default_graph_path")]
    pub graph_path: PathBuf,

    /// Where to persist the rewritten undirected DOT text (skipped if unset)
    #[serde(default)]
    pub undirected_graph_path: Option<PathBuf>,

    /// `graph_id ... external_id` lines
    #[serde(default = "default_id_map_path")]
    pub id_map_path: PathBuf,

    /// `external_id,label,score` lines
    #[serde(default = "default_fuzzy_path")]
    pub fuzzy_path: PathBuf,

    #[serde(default = "default_output_csv")]
    pub output_csv: PathBuf,

    /// Shell written for fuzzy keys with no shell
    #[serde(default)]
    pub default_shell: u32,

    #[serde(default)]
    pub isolated_nodes: IsolatedNodePolicy,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AggregateConfig {
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryConfig>,
}

/// One aggregation category: a directory of run files averaged into one
/// output matrix.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CategoryConfig {
    pub name: String,
    pub input_dir: PathBuf,

    /// Glob file name pattern; hidden files never match
    #[serde(default = "default_pattern")]
    pub pattern: String,

    pub output: PathBuf,
}

impl CategoryConfig {
    pub fn new(name: &str, input_dir: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            input_dir: input_dir.into(),
            pattern: default_pattern(),
            output: output.into(),
        }
    }
}

/// Threshold analysis over a joined CSV.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_output_csv")]
    pub joined_csv: PathBuf,

    /// Root of the per-category run directories
    #[serde(default = "default_analysis_output_dir")]
    pub output_dir: PathBuf,

    /// File stem of the run files this analysis writes
    #[serde(default = "default_run_name")]
    pub run_name: String,

    /// Band boundaries for the banded false-positive rates
    #[serde(default = "default_band_thresholds")]
    pub band_thresholds: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logging: bool,
}

// Default value functions
fn default_graph_path() -> PathBuf { PathBuf::from("graphs/graph_real.dot") }
fn default_id_map_path() -> PathBuf { PathBuf::from("inputs/id_map_fwd.txt") }
fn default_fuzzy_path() -> PathBuf { PathBuf::from("inputs/data_fuzzy_value.txt") }
fn default_output_csv() -> PathBuf { PathBuf::from("inputs/fuz_val_and_inf.csv") }
fn default_pattern() -> String { "*.txt".to_string() }
fn default_analysis_output_dir() -> PathBuf { PathBuf::from("output") }
fn default_run_name() -> String { "run".to_string() }
fn default_band_thresholds() -> Vec<f64> { vec![0.0, 80.0, 90.0, 95.0, 99.0, 99.5, 99.9, 99.99] }
fn default_log_level() -> String { "info".to_string() }

fn default_categories() -> Vec<CategoryConfig> {
    vec![
        CategoryConfig::new("fuz_fpr", "output/fuz_fpr", "outputs/priv.csv"),
        CategoryConfig::new("thd_fpr_fix_step", "output/thd_fpr_fix_step", "outputs/correct.csv"),
        CategoryConfig::new("inf_dist", "output/inf_dist", "outputs/influence.csv"),
        CategoryConfig::new("inf_detect", "output/inf_detect", "outputs/detect.csv"),
    ]
}

impl Default for InfluenceConfig {
    fn default() -> Self {
        Self {
            graph_path: default_graph_path(),
            undirected_graph_path: None,
            id_map_path: default_id_map_path(),
            fuzzy_path: default_fuzzy_path(),
            output_csv: default_output_csv(),
            default_shell: 0,
            isolated_nodes: IsolatedNodePolicy::default(),
        }
    }
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self { categories: default_categories() }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            joined_csv: default_output_csv(),
            output_dir: default_analysis_output_dir(),
            run_name: default_run_name(),
            band_thresholds: default_band_thresholds(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { log_level: default_log_level(), json_logging: false }
    }
}

impl PipelineConfig {
    /// Load defaults, then `path` if given, then `KSHELL__*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(
                Environment::with_prefix("KSHELL")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
