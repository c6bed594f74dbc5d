//! kshell-influence CLI
//!
//! # Commands
//!
//! - `influence`: graph → k-shells → joined CSV
//! - `analyze`: joined CSV → per-run result files
//! - `aggregate`: per-run result files → averaged matrices
//! - `run-all`: the three above, in that order
//!
//! Settings come from `--config <file>` and `KSHELL__*` environment
//! variables. Logs go to stderr, reports to stdout.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use kshell_influence::config::ObservabilityConfig;
use kshell_influence::{pipeline, CategoryReport, PipelineConfig, RunReport};

/// K-shell influence ranking joined against fuzzy reachability scores
#[derive(Parser)]
#[command(name = "kshell-influence")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print reports as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decompose the graph into k-shells and write the joined CSV
    Influence {
        /// Overrides `influence.graph_path`
        #[arg(long)]
        graph: Option<PathBuf>,
    },
    /// Compute threshold statistics from the joined CSV
    Analyze {
        /// Overrides `analysis.run_name`
        #[arg(long)]
        run_name: Option<String>,
    },
    /// Average the run files of every configured category
    Aggregate,
    /// influence, analyze, aggregate
    RunAll {
        /// Overrides `analysis.run_name`
        #[arg(long)]
        run_name: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg = PipelineConfig::load(cli.config.as_deref())
        .with_context(|| match &cli.config {
            Some(path) => format!("loading configuration from {}", path.display()),
            None => "loading configuration".to_string(),
        })?;
    init_tracing(cli.verbose, &cfg.observability);

    match cli.command {
        Commands::Influence { graph } => {
            if let Some(graph) = graph {
                cfg.influence.graph_path = graph;
            }
            let report = influence(&cfg)?;
            print_report(&report, cli.json, print_run_report)?;
        }
        Commands::Analyze { run_name } => {
            if let Some(run_name) = run_name {
                cfg.analysis.run_name = run_name;
            }
            let written = analyze(&cfg)?;
            print_report(&written, cli.json, print_paths)?;
        }
        Commands::Aggregate => {
            let reports = aggregate(&cfg)?;
            print_report(&reports, cli.json, print_category_reports)?;
        }
        Commands::RunAll { run_name } => {
            if let Some(run_name) = run_name {
                cfg.analysis.run_name = run_name;
            }
            let report = influence(&cfg)?;
            let written = analyze(&cfg)?;
            let reports = aggregate(&cfg)?;
            if cli.json {
                let all = serde_json::json!({
                    "influence": report,
                    "analysis": written,
                    "aggregate": reports,
                });
                println!("{}", serde_json::to_string_pretty(&all)?);
            } else {
                print_run_report(&report);
                print_paths(&written);
                print_category_reports(&reports);
            }
        }
    }
    Ok(())
}

fn influence(cfg: &PipelineConfig) -> anyhow::Result<RunReport> {
    pipeline::run_influence(&cfg.influence)
        .with_context(|| format!("influence run on {}", cfg.influence.graph_path.display()))
}

fn analyze(cfg: &PipelineConfig) -> anyhow::Result<Vec<PathBuf>> {
    pipeline::run_analysis(&cfg.analysis)
        .with_context(|| format!("analysis of {}", cfg.analysis.joined_csv.display()))
}

fn aggregate(cfg: &PipelineConfig) -> anyhow::Result<Vec<CategoryReport>> {
    pipeline::run_aggregate(&cfg.aggregate).context("aggregation")
}

fn init_tracing(verbose: u8, observability: &ObservabilityConfig) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = EnvFilter::new(filter_directive(rust_log.as_deref(), verbose, &observability.log_level));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr);

    if observability.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// RUST_LOG, then -v, then the configured level.
fn filter_directive<'a>(rust_log: Option<&'a str>, verbose: u8, configured: &'a str) -> &'a str {
    match (rust_log, verbose) {
        (Some(env), _) if !env.trim().is_empty() => env,
        (_, 0) => configured,
        (_, 1) => "debug",
        _ => "trace",
    }
}

fn print_report<T: Serialize + ?Sized>(value: &T, json: bool, human: fn(&T)) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        human(value);
    }
    Ok(())
}

fn print_run_report(report: &RunReport) {
    println!("graph:        {}", report.graph_path.display());
    println!("directed:     {} nodes, {} edges", report.directed_nodes, report.directed_edges);
    println!("undirected:   {} nodes, {} edges", report.undirected_nodes, report.undirected_edges);
    println!("degree:       {}", report.degree);
    println!("max shell:    {}", report.max_shell);
    println!("rows:         {} ({} defaulted)", report.rows, report.defaulted_rows);
    println!("unmapped ids: {}", report.unmapped_graph_ids);
    println!("output:       {}", report.output_csv.display());
}

fn print_paths(paths: &Vec<PathBuf>) {
    for path in paths {
        println!("wrote {}", path.display());
    }
}

fn print_category_reports(reports: &Vec<CategoryReport>) {
    for r in reports {
        println!(
            "{:<18} {:>3} runs  {}x{}  -> {}",
            r.name, r.runs, r.shape.0, r.shape.1, r.output.display()
        );
    }
}
