//! # Threshold analysis
//!
//! Per-run result vectors computed from a joined dataset. A row is a
//! false positive when its shell index is 0, i.e. the node never reached
//! any shell even though its fuzzy score passed the threshold.
//!
//! Every result is written with [`write_run_rows`] in the bracketed run
//! format that [`crate::matrix::parse_run_matrix`] reads back, so several
//! runs of the same category can be averaged.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::model::JoinedRow;
use crate::{Error, Result};

/// Ascending fuzzy-score thresholds: 99.99 to 100 in steps of 0.003, a
/// tail of ever finer values below 100, then 100 itself.
pub fn default_thresholds() -> Vec<f64> {
    // Stepped in integer thousandths so no step drifts below its label.
    let mut thresholds: Vec<f64> = (99_990u32..100_000)
        .step_by(3)
        .map(|t| f64::from(t) / 1000.0)
        .collect();
    thresholds.extend([99.9995, 99.99995, 99.999995, 99.9999995, 99.99999995, 99.999999995]);
    thresholds.push(100.0);
    thresholds
}

/// False positives among the rows selected by a threshold or band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FprCount {
    pub false_positives: usize,
    pub total: usize,
    pub rate: f64,
}

impl FprCount {
    fn from_shells<'a>(shells: impl Iterator<Item = &'a u32>) -> Self {
        let (mut false_positives, mut total) = (0, 0);
        for &shell in shells {
            total += 1;
            if shell == 0 {
                false_positives += 1;
            }
        }
        let rate = if total == 0 { 0.0 } else { false_positives as f64 / total as f64 };
        Self { false_positives, total, rate }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Observation {
    shell: u32,
    score: f64,
}

/// Numeric view of a joined dataset.
#[derive(Debug, Clone)]
pub struct ThresholdAnalysis {
    observations: Vec<Observation>,
    max_shell: u32,
}

impl ThresholdAnalysis {
    /// Fails on an empty dataset or a fuzzy score that is not a number.
    /// `source` names the dataset in errors.
    pub fn from_rows(rows: &[JoinedRow], source: &str) -> Result<Self> {
        if rows.is_empty() {
            return Err(Error::EmptyDataset(format!("{source}: no joined rows")));
        }
        let observations = rows.iter()
            .enumerate()
            .map(|(i, row)| -> Result<Observation> {
                let score = row.fuzzy_value().ok_or_else(|| Error::MalformedRecord {
                    input: source.to_string(),
                    line: i + 1,
                    message: format!("id {}: fuzzy value '{}' is not a number", row.id, row.fuzzy_score),
                })?;
                Ok(Observation { shell: row.shell_index, score })
            })
            .collect::<Result<Vec<_>>>()?;
        let max_shell = observations.iter().map(|o| o.shell).max().unwrap_or(0);
        Ok(Self { observations, max_shell })
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn max_shell(&self) -> u32 {
        self.max_shell
    }

    /// Per threshold: false positives among rows scoring at least that much.
    pub fn fpr_at_thresholds(&self, thresholds: &[f64]) -> Vec<FprCount> {
        thresholds.iter()
            .map(|&t| FprCount::from_shells(
                self.observations.iter().filter(|o| o.score >= t).map(|o| &o.shell),
            ))
            .collect()
    }

    /// Per consecutive band `[bounds[i], bounds[i + 1])`.
    pub fn band_fpr(&self, bounds: &[f64]) -> Vec<FprCount> {
        bounds.windows(2)
            .map(|band| FprCount::from_shells(
                self.observations.iter()
                    .filter(|o| o.score >= band[0] && o.score < band[1])
                    .map(|o| &o.shell),
            ))
            .collect()
    }

    /// `(level - 1, row count)` for every level `1..=max_shell`.
    pub fn influence_distribution(&self) -> Vec<(u32, usize)> {
        (1..=self.max_shell)
            .map(|level| (level - 1, self.level_count(level, f64::NEG_INFINITY)))
            .collect()
    }

    /// Per threshold, per level `1..=max_shell`: the share of that level's
    /// rows scoring at least the threshold. An empty level rates 0.
    pub fn influence_fill_rates(&self, thresholds: &[f64]) -> Vec<Vec<f64>> {
        let totals: Vec<usize> = (1..=self.max_shell)
            .map(|level| self.level_count(level, f64::NEG_INFINITY))
            .collect();
        thresholds.iter()
            .map(|&t| {
                (1..=self.max_shell)
                    .zip(&totals)
                    .map(|(level, &total)| match total {
                        0 => 0.0,
                        total => self.level_count(level, t) as f64 / total as f64,
                    })
                    .collect()
            })
            .collect()
    }

    /// For every distinct score below 100 among the top-shell rows,
    /// ascending: `(score, false-positive rate over rows scoring ≥ it)`.
    pub fn threshold_sweep(&self) -> Vec<(f64, f64)> {
        let mut scores: Vec<f64> = self.observations.iter()
            .filter(|o| o.shell == self.max_shell && o.score < 100.0)
            .map(|o| o.score)
            .collect();
        scores.sort_by(f64::total_cmp);
        scores.dedup();

        scores.into_iter()
            .map(|s| (s, self.fpr_at_thresholds(&[s])[0].rate))
            .collect()
    }

    fn level_count(&self, level: u32, threshold: f64) -> usize {
        self.observations.iter()
            .filter(|o| o.shell == level && o.score >= threshold)
            .count()
    }
}

// ============================================================================
// Run-file output
// ============================================================================

/// A value written as one bracketed line of a run file.
pub trait RunRow {
    /// Opening and closing bracket.
    const BRACKETS: (char, char) = ('(', ')');

    fn fields(&self) -> Vec<String>;
}

impl RunRow for FprCount {
    fn fields(&self) -> Vec<String> {
        vec![self.false_positives.to_string(), self.total.to_string(), format!("{:?}", self.rate)]
    }
}

impl RunRow for (u32, usize) {
    fn fields(&self) -> Vec<String> {
        vec![self.0.to_string(), self.1.to_string()]
    }
}

impl RunRow for (f64, f64) {
    fn fields(&self) -> Vec<String> {
        vec![format!("{:?}", self.0), format!("{:?}", self.1)]
    }
}

impl RunRow for Vec<f64> {
    const BRACKETS: (char, char) = ('[', ']');

    fn fields(&self) -> Vec<String> {
        self.iter().map(|v| format!("{v:?}")).collect()
    }
}

/// One line per row: `(a, b, c)` for tuples, `[a, b, c]` for vectors.
pub fn write_run_rows<R: RunRow, W: Write>(rows: &[R], writer: &mut W) -> Result<()> {
    let (open, close) = R::BRACKETS;
    for row in rows {
        writeln!(writer, "{open}{}{close}", row.fields().join(", "))?;
    }
    Ok(())
}
