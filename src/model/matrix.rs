//! Dense row-major numeric matrix.

use serde::{Deserialize, Serialize};
use crate::{Error, Result};

/// A 2-D `f64` array with validated uniform row length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl ResultMatrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self { rows, cols, data: vec![0.0; rows * cols] }
    }

    /// Build from parsed rows. `source` names the input in the error.
    pub fn from_rows(rows: Vec<Vec<f64>>, source: &str) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(Error::RaggedMatrix {
                    input: source.to_string(),
                    row: i + 1,
                    expected: cols,
                    got: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self { rows: rows.len(), cols, data })
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.rows).map(move |r| self.row(r))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Element-wise comparison within an absolute tolerance.
    pub fn approx_eq(&self, other: &ResultMatrix, tolerance: f64) -> bool {
        self.shape() == other.shape()
            && self.data.iter().zip(&other.data).all(|(a, b)| {
                (a - b).abs() <= tolerance || (a.is_nan() && b.is_nan())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows() {
        let m = ResultMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]], "t").unwrap();
        assert_eq!(m.shape(), (2, 2));
        assert_eq!(m.get(1, 0), Some(3.0));
        assert_eq!(m.row(0), &[1.0, 2.0]);
        assert_eq!(m.get(2, 0), None);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = ResultMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]], "run.txt").unwrap_err();
        match err {
            Error::RaggedMatrix { input, row, expected, got } => {
                assert_eq!(input, "run.txt");
                assert_eq!((row, expected, got), (2, 2, 1));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_matrix() {
        let m = ResultMatrix::from_rows(Vec::new(), "t").unwrap();
        assert_eq!(m.shape(), (0, 0));
        assert_eq!(m.rows().count(), 0);
    }
}
