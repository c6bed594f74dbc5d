//! End-to-end: joined CSV → analysis run files → aggregated category
//! outputs, across two runs.

use std::fs;

use kshell_influence::config::{AggregateConfig, AnalysisConfig, CategoryConfig};
use kshell_influence::matrix::parse_csv_matrix;
use kshell_influence::{analysis, pipeline, Error, ResultMatrix};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const RUN_A: &str = "\
id,is_true_positive,fuzzy_value,k-shell
1,1,100,2
2,1,99.995,2
3,0,99.995,0
4,1,99.5,1
";

const RUN_B: &str = "\
id,is_true_positive,fuzzy_value,k-shell
1,1,100,2
2,1,99.999,1
3,0,85,0
4,0,99.2,2
";

fn analysis_config(tmp: &TempDir, run_name: &str, csv: &str) -> AnalysisConfig {
    let joined = tmp.path().join(format!("{run_name}.csv"));
    fs::write(&joined, csv).unwrap();
    AnalysisConfig {
        joined_csv: joined,
        output_dir: tmp.path().join("output"),
        run_name: run_name.to_string(),
        ..AnalysisConfig::default()
    }
}

#[test]
fn test_two_runs_aggregate() {
    let tmp = TempDir::new().unwrap();
    pipeline::run_analysis(&analysis_config(&tmp, "a", RUN_A)).unwrap();
    pipeline::run_analysis(&analysis_config(&tmp, "b", RUN_B)).unwrap();

    let category = |name: &str| {
        CategoryConfig::new(name, tmp.path().join("output").join(name), tmp.path().join(format!("outputs/{name}.csv")))
    };
    let cfg = AggregateConfig {
        categories: vec![category("inf_dist"), category("fuz_fpr"), category("thd_fpr_fix_step"), category("inf_detect")],
    };
    let reports = pipeline::run_aggregate(&cfg).unwrap();
    assert!(reports.iter().all(|r| r.runs == 2));

    // inf_dist: a = [(0,1),(1,2)], b = [(0,1),(1,2)]
    let dist = parse_csv_matrix(&fs::read_to_string(tmp.path().join("outputs/inf_dist.csv")).unwrap(), "d").unwrap();
    assert_eq!(dist, ResultMatrix::from_rows(vec![vec![0.0, 1.0], vec![1.0, 2.0]], "e").unwrap());

    // One row per default threshold, three columns (fp, total, rate)
    let fixed = &reports[2];
    assert_eq!(fixed.shape, (analysis::default_thresholds().len(), 3));
    // Seven bands between eight default bounds
    assert_eq!(reports[1].shape, (7, 3));
}

#[test]
fn test_sweep_file_contents() {
    let tmp = TempDir::new().unwrap();
    let written = pipeline::run_analysis(&analysis_config(&tmp, "a", RUN_A)).unwrap();
    let sweep = written.iter().find(|p| p.parent().is_some_and(|d| d.ends_with("thd_sweep"))).unwrap();
    assert_eq!(fs::read_to_string(sweep).unwrap(), "(99.995, 0.3333333333333333)\n");
}

#[test]
fn test_header_only_csv_is_empty_dataset() {
    let tmp = TempDir::new().unwrap();
    let cfg = analysis_config(&tmp, "empty", "id,is_true_positive,fuzzy_value,k-shell\n");
    assert!(matches!(pipeline::run_analysis(&cfg), Err(Error::EmptyDataset(_))));
}
