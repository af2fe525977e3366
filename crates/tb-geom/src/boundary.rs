use serde::{Deserialize, Serialize};

/// Boundary condition along one lattice axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryCondition {
    /// Sites past the edge do not exist.
    Open,
    /// Coordinates wrap modulo the extent.
    Periodic,
}

impl BoundaryCondition {
    /// Returns true for periodic axes.
    pub fn is_periodic(self) -> bool {
        matches!(self, BoundaryCondition::Periodic)
    }

    /// Applies the boundary to `value` on an axis of length `extent`.
    pub fn resolve(self, value: i64, extent: usize) -> Option<usize> {
        let extent = extent as i64;
        match self {
            BoundaryCondition::Periodic => Some(value.rem_euclid(extent) as usize),
            BoundaryCondition::Open if (0..extent).contains(&value) => Some(value as usize),
            BoundaryCondition::Open => None,
        }
    }
}
