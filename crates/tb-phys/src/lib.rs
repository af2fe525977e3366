#![deny(missing_docs)]
#![doc = "Tight-binding physics and solver configuration, Hamiltonian assembly and the spectral solver."]

mod builder;
mod hash;
mod matrix;
mod physics;
mod simulation;
mod solve;
mod solver;

pub use builder::{build_hamiltonian, Hamiltonian, DISORDER_SUBSTREAM};
pub use matrix::{PairMatrix, C64};
pub use physics::{
    AbFluxConfig, BasisAxis, DisorderConfig, FieldConfig, LocalBasis, PhysicsModel, TbParams,
    TbPhysics, ZeemanConfig,
};
pub use simulation::{DefectsConfig, SimulationConfig};
pub use solve::{density_of_states, Spectrum};
pub use solver::{EquilibriumConfig, SolverConfig};

/// Crate version recorded in run metadata.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
