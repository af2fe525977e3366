use serde::{Deserialize, Serialize};
use tb_core::errors::{ErrorInfo, TbError};

/// Thermal state used to weight the spectrum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EquilibriumConfig {
    /// Temperature in energy units (`k_B = 1`).
    #[serde(default)]
    pub temperature: f64,
    /// Chemical potential.
    #[serde(default)]
    pub mu: f64,
}

impl EquilibriumConfig {
    /// Fermi-Dirac occupation at `omega`; a step function at zero temperature.
    pub fn occupation(&self, omega: f64) -> f64 {
        let x = omega - self.mu;
        if self.temperature == 0.0 {
            return if x < 0.0 {
                1.0
            } else if x == 0.0 {
                0.5
            } else {
                0.0
            };
        }
        1.0 / ((x / self.temperature).exp() + 1.0)
    }
}

/// Frequency grid and broadening of the Green's function solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolverConfig {
    /// Positive broadening added to every frequency.
    pub eta: f64,
    /// Lower end of the grid.
    pub w_min: f64,
    /// Upper end of the grid.
    pub w_max: f64,
    /// Number of grid points, at least two.
    pub n_w: usize,
    /// Optional thermal state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equilibrium: Option<EquilibriumConfig>,
}

impl SolverConfig {
    /// Checks `eta > 0`, `w_min < w_max`, `n_w >= 2` and `temperature >= 0`.
    pub fn validate(&self) -> Result<(), TbError> {
        if !(self.eta.is_finite() && self.eta > 0.0) {
            return Err(solver_error("eta must be > 0", "eta", self.eta));
        }
        if !(self.w_min.is_finite() && self.w_max.is_finite() && self.w_min < self.w_max) {
            return Err(TbError::Validation(
                ErrorInfo::new("tb_phys.solver", "w_min must be < w_max")
                    .with_context("w_min", self.w_min.to_string())
                    .with_context("w_max", self.w_max.to_string()),
            ));
        }
        if self.n_w < 2 {
            return Err(solver_error("n_w must be >= 2", "n_w", self.n_w));
        }
        if let Some(eq) = &self.equilibrium {
            if !(eq.temperature.is_finite() && eq.temperature >= 0.0) {
                return Err(solver_error(
                    "temperature must be >= 0",
                    "temperature",
                    eq.temperature,
                ));
            }
            if !eq.mu.is_finite() {
                return Err(solver_error("mu must be finite", "mu", eq.mu));
            }
        }
        Ok(())
    }

    /// `n_w` evenly spaced frequencies from `w_min` to `w_max` inclusive.
    pub fn energy_grid(&self) -> Vec<f64> {
        if self.n_w < 2 {
            return vec![self.w_min; self.n_w];
        }
        let step = (self.w_max - self.w_min) / (self.n_w - 1) as f64;
        (0..self.n_w)
            .map(|idx| {
                if idx + 1 == self.n_w {
                    self.w_max
                } else {
                    self.w_min + step * idx as f64
                }
            })
            .collect()
    }
}

fn solver_error(message: &str, field: &str, value: impl ToString) -> TbError {
    TbError::Validation(
        ErrorInfo::new("tb_phys.solver", message)
            .with_context("field", field)
            .with_context("value", value.to_string()),
    )
}
