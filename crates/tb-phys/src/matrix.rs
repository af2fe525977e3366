use nalgebra::{Complex, DMatrix};
use serde::{Deserialize, Serialize};
use tb_core::errors::{ErrorInfo, TbError};

/// Complex scalar used throughout the Hamiltonian.
pub type C64 = Complex<f64>;

/// Square complex matrix written as rows of `[re, im]` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairMatrix(Vec<Vec<[f64; 2]>>);

impl PairMatrix {
    /// Wraps raw rows without validation.
    pub fn from_rows(rows: Vec<Vec<[f64; 2]>>) -> Self {
        Self(rows)
    }

    /// Real diagonal matrix, handy for scalar onsite energies.
    pub fn diagonal(values: &[f64]) -> Self {
        let n = values.len();
        let rows = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| if i == j { [values[i], 0.0] } else { [0.0, 0.0] })
                    .collect()
            })
            .collect();
        Self(rows)
    }

    /// `1 x 1` matrix holding `value`.
    pub fn scalar(re: f64, im: f64) -> Self {
        Self(vec![vec![[re, im]]])
    }

    /// Number of rows.
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    /// Entry `(i, j)` as a complex number. Panics outside the matrix.
    pub fn entry(&self, i: usize, j: usize) -> C64 {
        let [re, im] = self.0[i][j];
        Complex::new(re, im)
    }

    /// Checks that the matrix is non-empty, square and finite.
    pub fn validate(&self, label: &str) -> Result<(), TbError> {
        let n = self.dim();
        if n == 0 {
            return Err(matrix_error(label, "matrix must be non-empty"));
        }
        if let Some(row) = self.0.iter().position(|row| row.len() != n) {
            return Err(TbError::Validation(
                matrix_info(label, "matrix must be square")
                    .with_context("row", row.to_string())
                    .with_context("len", self.0[row].len().to_string())
                    .with_context("expected", n.to_string()),
            ));
        }
        let finite = self
            .0
            .iter()
            .flatten()
            .all(|[re, im]| re.is_finite() && im.is_finite());
        if !finite {
            return Err(matrix_error(label, "matrix entries must be finite"));
        }
        Ok(())
    }

    /// Converts to a dense complex matrix.
    pub fn to_dense(&self) -> DMatrix<C64> {
        let n = self.dim();
        DMatrix::from_fn(n, n, |i, j| self.entry(i, j))
    }
}

fn matrix_info(label: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new("tb_phys.matrix", message).with_context("matrix", label)
}

fn matrix_error(label: &str, message: &str) -> TbError {
    TbError::Validation(matrix_info(label, message))
}
