#![deny(missing_docs)]
#![doc = "Lattice geometries with removable sites, stable active-index maps and bond enumeration."]

mod bonds;
mod boundary;
mod config;
mod hash;
mod index;
mod lattice;

pub use bonds::{BondKind, Bonds, Shift, ShiftedBonds};
pub use boundary::BoundaryCondition;
pub use config::{
    AbRingConfig, ChainConfig, GeometryConfig, HoneycombConfig, Shape, SquareConfig,
    MIN_LATTICE_SIDE,
};
pub use hash::geometry_hash;
pub use index::IndexMaps;
pub use lattice::{Lattice, LatticeState, Site};

/// Crate version recorded in run metadata.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
