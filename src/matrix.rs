//! # Matrix aggregation
//!
//! Averages the per-run result matrices of one category into a single
//! matrix.
//!
//! Two text formats:
//! - **run format** (input): one row per line, `[a, b, c]` or `(a, b, c)`;
//!   values comma-separated, whitespace around them ignored.
//! - **csv format** (output): one row per line, every value followed by a
//!   comma (`a,b,c,`), no header.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};

use crate::config::CategoryConfig;
use crate::model::ResultMatrix;
use crate::{Error, Result};

// ============================================================================
// Run format
// ============================================================================

/// Parse one run file. Blank lines are skipped.
pub fn parse_run_matrix(text: &str, source: &str) -> Result<ResultMatrix> {
    let mut rows = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        rows.push(parse_bracketed_row(line, source, i + 1)?);
    }
    ResultMatrix::from_rows(rows, source)
}

fn parse_bracketed_row(line: &str, source: &str, line_no: usize) -> Result<Vec<f64>> {
    let malformed = |message: String| Error::MalformedRecord {
        input: source.to_string(),
        line: line_no,
        message,
    };
    let inner = match (line.chars().next(), line.chars().last()) {
        (Some('['), Some(']')) | (Some('('), Some(')')) if line.len() >= 2 => &line[1..line.len() - 1],
        _ => return Err(malformed(format!("expected a bracketed row, got '{line}'"))),
    };
    parse_values(inner).map_err(malformed)
}

fn parse_values(inner: &str) -> std::result::Result<Vec<f64>, String> {
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    inner
        .split(',')
        .map(|v| {
            let v = v.trim();
            v.parse::<f64>().map_err(|e| format!("bad number '{v}': {e}"))
        })
        .collect()
}

// ============================================================================
// CSV format
// ============================================================================

/// Write comma-terminated rows, no header, no brackets. Rows without
/// columns have no text form and are rejected.
pub fn write_csv_matrix<W: Write>(matrix: &ResultMatrix, writer: &mut W) -> Result<()> {
    if let (rows @ 1.., 0) = matrix.shape() {
        return Err(Error::ZeroWidthMatrix { rows });
    }
    for row in matrix.rows() {
        for v in row {
            write!(writer, "{v},")?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Inverse of `write_csv_matrix`.
pub fn parse_csv_matrix(text: &str, source: &str) -> Result<ResultMatrix> {
    let mut rows = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let body = line.strip_suffix(',').unwrap_or(line);
        let row = parse_values(body).map_err(|message| Error::MalformedRecord {
            input: source.to_string(),
            line: i + 1,
            message,
        })?;
        rows.push(row);
    }
    ResultMatrix::from_rows(rows, source)
}

// ============================================================================
// Mean
// ============================================================================

/// A parsed matrix and the file it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct RunMatrix {
    pub source: String,
    pub matrix: ResultMatrix,
}

/// Element-wise arithmetic mean. Every matrix must have the shape of the
/// first one.
pub fn mean(runs: &[RunMatrix]) -> Result<ResultMatrix> {
    let first = runs.first()
        .ok_or_else(|| Error::EmptyAggregation("no matrices to average".into()))?;
    let shape = first.matrix.shape();

    let mut sum = ResultMatrix::zeros(shape.0, shape.1);
    for run in runs {
        if run.matrix.shape() != shape {
            return Err(Error::ShapeMismatch {
                input: run.source.clone(),
                expected: shape,
                got: run.matrix.shape(),
            });
        }
        for (acc, v) in sum.as_mut_slice().iter_mut().zip(run.matrix.as_slice()) {
            *acc += v;
        }
    }

    let n = runs.len() as f64;
    for acc in sum.as_mut_slice() {
        *acc /= n;
    }
    Ok(sum)
}

// ============================================================================
// File discovery
// ============================================================================

/// Shell-style file name pattern (`*`, `?`, `[...]`). A leading dot must
/// be matched literally, so hidden files are skipped by `*.txt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePattern(Pattern);

impl FilePattern {
    pub fn new(pattern: &str) -> Result<Self> {
        Pattern::new(pattern)
            .map(Self)
            .map_err(|e| Error::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.0.matches_with(name, MATCH_OPTIONS)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

// ============================================================================
// MatrixAggregator
// ============================================================================

/// Outcome of one category run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryReport {
    pub name: String,
    pub runs: usize,
    pub shape: (usize, usize),
    pub output: PathBuf,
}

/// Reads every matching run file in a directory and averages them.
#[derive(Debug, Clone)]
pub struct MatrixAggregator {
    pattern: FilePattern,
}

impl MatrixAggregator {
    pub fn new(pattern: FilePattern) -> Self {
        Self { pattern }
    }

    pub fn from_pattern(pattern: &str) -> Result<Self> {
        FilePattern::new(pattern).map(Self::new)
    }

    /// Parse every matching file, in sorted path order.
    #[tracing::instrument(skip_all, fields(dir = %dir.display()))]
    pub fn read_dir(&self, dir: &Path) -> Result<Vec<RunMatrix>> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if entry.file_name().to_str().is_some_and(|name| self.pattern.matches(name)) {
                paths.push(entry.path());
            }
        }
        paths.sort();

        let mut runs = Vec::with_capacity(paths.len());
        for path in paths {
            let source = path.display().to_string();
            let text = fs::read_to_string(&path)?;
            let matrix = parse_run_matrix(&text, &source)?;
            tracing::debug!(file = %source, shape = ?matrix.shape(), "run matrix parsed");
            runs.push(RunMatrix { source, matrix });
        }
        Ok(runs)
    }

    pub fn aggregate_dir(&self, dir: &Path) -> Result<ResultMatrix> {
        let runs = self.read_dir(dir)?;
        if runs.is_empty() {
            return Err(Error::EmptyAggregation(format!(
                "no files matching the pattern in {}",
                dir.display()
            )));
        }
        mean(&runs)
    }

    /// Aggregate one category and write its output file.
    #[tracing::instrument(skip_all, fields(category = %category.name))]
    pub fn run_category(category: &CategoryConfig) -> Result<CategoryReport> {
        let aggregator = Self::from_pattern(&category.pattern)?;
        let runs = aggregator.read_dir(&category.input_dir)?;
        if runs.is_empty() {
            return Err(Error::EmptyAggregation(format!(
                "category '{}': no files matching '{}' in {}",
                category.name,
                category.pattern,
                category.input_dir.display()
            )));
        }
        let averaged = mean(&runs)?;

        if let Some(parent) = category.output.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut text = Vec::new();
        write_csv_matrix(&averaged, &mut text)?;
        fs::write(&category.output, text)?;

        tracing::info!(
            runs = runs.len(),
            shape = ?averaged.shape(),
            output = %category.output.display(),
            "category aggregated"
        );
        Ok(CategoryReport {
            name: category.name.clone(),
            runs: runs.len(),
            shape: averaged.shape(),
            output: category.output.clone(),
        })
    }
}
