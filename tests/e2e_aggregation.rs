//! End-to-end tests for matrix aggregation.
//!
//! Run files are written into a temporary category directory, aggregated
//! through `MatrixAggregator` / `pipeline::run_aggregate`, and the averaged
//! output is parsed back.

use std::fs;
use std::path::Path;

use kshell_influence::config::{AggregateConfig, CategoryConfig};
use kshell_influence::matrix::{self, parse_csv_matrix};
use kshell_influence::{pipeline, Error, FilePattern, MatrixAggregator, ResultMatrix};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tempfile::TempDir;

fn write_runs(dir: &Path, runs: &[(&str, &str)]) {
    fs::create_dir_all(dir).unwrap();
    for (name, text) in runs {
        fs::write(dir.join(name), text).unwrap();
    }
}

fn expected(rows: Vec<Vec<f64>>) -> ResultMatrix {
    ResultMatrix::from_rows(rows, "expected").unwrap()
}

// ============================================================================
// 1. Three runs average element-wise
// ============================================================================

#[test]
fn test_three_runs_mean() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("output/fuz_fpr");
    write_runs(&dir, &[
        ("run_1.txt", "[1, 2]\n[3, 4]\n"),
        ("run_2.txt", "(3, 4)\n(5, 6)\n"),
        ("run_3.txt", "[5.0, 6.0]\n[7.0, 8.0]\n"),
    ]);

    let averaged = MatrixAggregator::from_pattern("*.txt").unwrap().aggregate_dir(&dir).unwrap();
    assert!(averaged.approx_eq(&expected(vec![vec![3.0, 4.0], vec![5.0, 6.0]]), 1e-12));
}

// ============================================================================
// 2. Category output file: comma-terminated rows, parent dirs created
// ============================================================================

#[test]
fn test_run_aggregate_writes_outputs() {
    let tmp = TempDir::new().unwrap();
    let a = tmp.path().join("output/a");
    let b = tmp.path().join("output/b");
    write_runs(&a, &[("1.txt", "(1, 10, 0.1)\n"), ("2.txt", "(3, 10, 0.3)\n"), ("notes.md", "ignored")]);
    write_runs(&b, &[("x.txt", "[0.5]\n[1.5]\n")]);

    let cfg = AggregateConfig {
        categories: vec![
            CategoryConfig::new("a", &a, tmp.path().join("outputs/a.csv")),
            CategoryConfig::new("b", &b, tmp.path().join("outputs/nested/b.csv")),
        ],
    };
    let reports = pipeline::run_aggregate(&cfg).unwrap();

    let summary: Vec<_> = reports.iter().map(|r| (r.name.as_str(), r.runs, r.shape)).collect();
    assert_eq!(summary, vec![("a", 2, (1, 3)), ("b", 1, (2, 1))]);

    let a_text = fs::read_to_string(tmp.path().join("outputs/a.csv")).unwrap();
    assert_eq!(a_text, "2,10,0.2,\n");
    let b_out = parse_csv_matrix(&fs::read_to_string(tmp.path().join("outputs/nested/b.csv")).unwrap(), "b").unwrap();
    assert_eq!(b_out, expected(vec![vec![0.5], vec![1.5]]));
}

// ============================================================================
// 3. Pattern filtering
// ============================================================================

#[test]
fn test_pattern_selects_files() {
    let tmp = TempDir::new().unwrap();
    write_runs(tmp.path(), &[
        ("seed_1.txt", "[2]\n"),
        ("seed_2.txt", "[4]\n"),
        ("other.txt", "[100]\n"),
    ]);

    let runs = MatrixAggregator::new(FilePattern::new("seed_*.txt").unwrap()).read_dir(tmp.path()).unwrap();
    assert_eq!(runs.len(), 2);
    assert!(runs[0].source.ends_with("seed_1.txt"));
    assert_eq!(matrix::mean(&runs).unwrap(), expected(vec![vec![3.0]]));
}

#[test]
fn test_hidden_run_files_ignored() {
    let tmp = TempDir::new().unwrap();
    write_runs(tmp.path(), &[("run_1.txt", "[2]\n"), (".run_1.txt", "[100]\n")]);
    let category = CategoryConfig::new("c", tmp.path(), tmp.path().join("out/c.csv"));
    let report = MatrixAggregator::run_category(&category).unwrap();
    assert_eq!(report.runs, 1);
    assert_eq!(fs::read_to_string(tmp.path().join("out/c.csv")).unwrap(), "2,\n");
}

// ============================================================================
// 4. Failures
// ============================================================================

#[test]
fn test_shape_mismatch_names_file() {
    let tmp = TempDir::new().unwrap();
    write_runs(tmp.path(), &[("a.txt", "[1, 2]\n"), ("b.txt", "[1, 2, 3]\n")]);

    match MatrixAggregator::from_pattern("*.txt").unwrap().aggregate_dir(tmp.path()).unwrap_err() {
        Error::ShapeMismatch { input, expected, got } => {
            assert!(input.ends_with("b.txt"));
            assert_eq!((expected, got), ((1, 2), (1, 3)));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_ragged_run_file() {
    let tmp = TempDir::new().unwrap();
    write_runs(tmp.path(), &[("a.txt", "[1, 2]\n[3]\n")]);
    assert!(matches!(
        MatrixAggregator::from_pattern("*.txt").unwrap().aggregate_dir(tmp.path()),
        Err(Error::RaggedMatrix { row: 2, .. })
    ));
}

#[test]
fn test_invalid_category_pattern() {
    let tmp = TempDir::new().unwrap();
    let mut category = CategoryConfig::new("bad", tmp.path(), tmp.path().join("out.csv"));
    category.pattern = "run_[.txt".into();
    assert!(matches!(
        MatrixAggregator::run_category(&category),
        Err(Error::InvalidPattern { .. })
    ));
}

#[test]
fn test_empty_category() {
    let tmp = TempDir::new().unwrap();
    write_runs(tmp.path(), &[("readme.md", "nothing here")]);
    let category = CategoryConfig::new("empty", tmp.path(), tmp.path().join("out.csv"));
    assert!(matches!(
        MatrixAggregator::run_category(&category),
        Err(Error::EmptyAggregation(_))
    ));
    assert!(!tmp.path().join("out.csv").exists());
}

// ============================================================================
// 5. Output format reads back
// ============================================================================

proptest! {
    #[test]
    fn test_csv_output_round_trip(
        rows in (1usize..6, 1usize..6).prop_flat_map(|(r, c)| {
            prop::collection::vec(prop::collection::vec(-1.0e6f64..1.0e6, c), r)
        })
    ) {
        let m = ResultMatrix::from_rows(rows, "generated").unwrap();
        let mut buf = Vec::new();
        matrix::write_csv_matrix(&m, &mut buf).unwrap();
        let back = parse_csv_matrix(&String::from_utf8(buf).unwrap(), "generated").unwrap();
        prop_assert!(m.approx_eq(&back, 1e-6));
    }
}
