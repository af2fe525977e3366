use std::f64::consts::PI;

use nalgebra::{Complex, DMatrix};
use serde::{Deserialize, Serialize};
use tb_core::errors::{ErrorInfo, TbError};

use crate::builder::Hamiltonian;
use crate::matrix::C64;
use crate::solver::{EquilibriumConfig, SolverConfig};

/// Density of states sampled on the solver grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    /// Frequencies.
    pub omega: Vec<f64>,
    /// `-Im Tr G(omega + i eta) / (pi N)` at each frequency.
    pub dos: Vec<f64>,
}

impl Spectrum {
    /// Trapezoidal integral of the DOS over the grid.
    pub fn integrated_weight(&self) -> f64 {
        self.integrate(|_| 1.0)
    }

    /// Fraction of states below the chemical potential at `equilibrium`.
    pub fn filling(&self, equilibrium: &EquilibriumConfig) -> f64 {
        self.integrate(|omega| equilibrium.occupation(omega))
    }

    fn integrate(&self, weight: impl Fn(f64) -> f64) -> f64 {
        self.omega
            .windows(2)
            .zip(self.dos.windows(2))
            .map(|(w, d)| 0.5 * (w[1] - w[0]) * (d[0] * weight(w[0]) + d[1] * weight(w[1])))
            .sum()
    }
}

/// Computes the DOS of `hamiltonian` on the grid of `solver`.
///
/// Every frequency costs one LU factorisation of `(omega + i eta) - H`.
pub fn density_of_states(hamiltonian: &Hamiltonian, solver: &SolverConfig) -> Result<Spectrum, TbError> {
    solver.validate()?;
    let n = hamiltonian.dim();
    if n == 0 {
        return Err(TbError::Validation(ErrorInfo::new(
            "tb_phys.empty_hamiltonian",
            "no active sites left to solve",
        )));
    }
    let omega = solver.energy_grid();
    let mut dos = Vec::with_capacity(omega.len());
    for &w in &omega {
        let z = Complex::new(w, solver.eta);
        let trace = green_trace(&hamiltonian.matrix, z).ok_or_else(|| {
            TbError::Validation(
                ErrorInfo::new("tb_phys.singular", "resolvent is singular")
                    .with_context("omega", w.to_string())
                    .with_hint("increase solver.eta"),
            )
        })?;
        dos.push(-trace.im / (PI * n as f64));
    }
    tracing::debug!(n_w = omega.len(), dim = n, "density of states computed");
    Ok(Spectrum { omega, dos })
}

fn green_trace(h: &DMatrix<C64>, z: C64) -> Option<C64> {
    let n = h.nrows();
    let resolvent = DMatrix::from_diagonal_element(n, n, z) - h;
    resolvent.lu().try_inverse().map(|green| green.trace())
}
