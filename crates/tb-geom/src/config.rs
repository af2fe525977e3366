use serde::{Deserialize, Serialize};
use tb_core::errors::{ErrorInfo, TbError};

use crate::bonds::{
    BondKind, Shift, HONEYCOMB_NN1, HONEYCOMB_NN2, LINEAR_NN1, LINEAR_NN2, SQUARE_NN1X,
    SQUARE_NN1Y, SQUARE_NN2,
};
use crate::boundary::BoundaryCondition;
use crate::lattice::Lattice;

/// Smallest accepted lattice side.
pub const MIN_LATTICE_SIDE: usize = 3;

/// Open or closed one-dimensional chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Number of sites.
    pub nx: usize,
    /// Boundary along the chain.
    pub boundary_x: BoundaryCondition,
}

/// Square lattice with one site per cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquareConfig {
    /// Cells along x.
    pub nx: usize,
    /// Cells along y.
    pub ny: usize,
    /// Boundary along x.
    pub boundary_x: BoundaryCondition,
    /// Boundary along y.
    pub boundary_y: BoundaryCondition,
}

/// Honeycomb lattice in the brick-wall embedding, two sites (A, B) per cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoneycombConfig {
    /// Cells along x.
    pub nx: usize,
    /// Cells along y.
    pub ny: usize,
    /// Boundary along x.
    pub boundary_x: BoundaryCondition,
    /// Boundary along y.
    pub boundary_y: BoundaryCondition,
}

/// Aharonov-Bohm ring threaded by a flux.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbRingConfig {
    /// Sites on the ring.
    pub nx: usize,
    /// Boundary around the ring, periodic unless cut open.
    #[serde(default = "default_ring_boundary")]
    pub boundary_x: BoundaryCondition,
}

fn default_ring_boundary() -> BoundaryCondition {
    BoundaryCondition::Periodic
}

/// Closed set of supported geometries, discriminated by `lattice`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "lattice", rename_all = "snake_case")]
pub enum GeometryConfig {
    /// One-dimensional chain.
    Chain(ChainConfig),
    /// Square lattice.
    Square(SquareConfig),
    /// Honeycomb lattice.
    Honeycomb(HoneycombConfig),
    /// Aharonov-Bohm ring.
    AbRing(AbRingConfig),
}

/// Extent and boundaries shared by every variant once resolved.
///
/// One-dimensional variants use `ny == 1` with an open y boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    /// Cells along x.
    pub nx: usize,
    /// Cells along y.
    pub ny: usize,
    /// Boundary along x.
    pub boundary_x: BoundaryCondition,
    /// Boundary along y.
    pub boundary_y: BoundaryCondition,
    /// Sites per cell.
    pub sublattices: usize,
    /// Number of components in a site coordinate.
    pub rank: usize,
}

impl Shape {
    /// Site count before removal.
    pub fn n_global(&self) -> usize {
        self.nx * self.ny * self.sublattices
    }
}

impl GeometryConfig {
    /// Stable variant name (the `lattice` tag).
    pub fn name(&self) -> &'static str {
        match self {
            GeometryConfig::Chain(_) => "chain",
            GeometryConfig::Square(_) => "square",
            GeometryConfig::Honeycomb(_) => "honeycomb",
            GeometryConfig::AbRing(_) => "ab_ring",
        }
    }

    /// Checks lattice extents.
    pub fn validate(&self) -> Result<(), TbError> {
        let shape = self.shape();
        check_side(self.name(), "nx", shape.nx)?;
        if shape.rank > 1 {
            check_side(self.name(), "ny", shape.ny)?;
        }
        Ok(())
    }

    /// Resolved extents, boundaries and coordinate rank.
    pub fn shape(&self) -> Shape {
        match self {
            GeometryConfig::Chain(cfg) => linear(cfg.nx, cfg.boundary_x),
            GeometryConfig::AbRing(cfg) => linear(cfg.nx, cfg.boundary_x),
            GeometryConfig::Square(cfg) => Shape {
                nx: cfg.nx,
                ny: cfg.ny,
                boundary_x: cfg.boundary_x,
                boundary_y: cfg.boundary_y,
                sublattices: 1,
                rank: 2,
            },
            GeometryConfig::Honeycomb(cfg) => Shape {
                nx: cfg.nx,
                ny: cfg.ny,
                boundary_x: cfg.boundary_x,
                boundary_y: cfg.boundary_y,
                sublattices: 2,
                rank: 3,
            },
        }
    }

    /// Bond kinds this geometry can enumerate.
    pub fn bond_kinds(&self) -> &'static [BondKind] {
        match self {
            GeometryConfig::Chain(_) | GeometryConfig::AbRing(_) | GeometryConfig::Honeycomb(_) => {
                &[BondKind::Nn1, BondKind::Nn2]
            }
            GeometryConfig::Square(_) => &[BondKind::Nn1x, BondKind::Nn1y, BondKind::Nn2],
        }
    }

    /// Returns true when `key` names a bond kind this geometry provides.
    pub fn provides(&self, key: &str) -> bool {
        self.bond_kinds().iter().any(|kind| kind.as_str() == key)
    }

    /// Whether a threading flux is meaningful for this geometry.
    pub fn supports_flux(&self) -> bool {
        matches!(self, GeometryConfig::AbRing(_))
    }

    /// Shift table for `kind`, failing for kinds the geometry lacks.
    pub fn shifts(&self, kind: BondKind) -> Result<&'static [Shift], TbError> {
        let table = match (self, kind) {
            (GeometryConfig::Chain(_) | GeometryConfig::AbRing(_), BondKind::Nn1) => LINEAR_NN1,
            (GeometryConfig::Chain(_) | GeometryConfig::AbRing(_), BondKind::Nn2) => LINEAR_NN2,
            (GeometryConfig::Square(_), BondKind::Nn1x) => SQUARE_NN1X,
            (GeometryConfig::Square(_), BondKind::Nn1y) => SQUARE_NN1Y,
            (GeometryConfig::Square(_), BondKind::Nn2) => SQUARE_NN2,
            (GeometryConfig::Honeycomb(_), BondKind::Nn1) => HONEYCOMB_NN1,
            (GeometryConfig::Honeycomb(_), BondKind::Nn2) => HONEYCOMB_NN2,
            _ => {
                return Err(TbError::Unsupported(
                    ErrorInfo::new(
                        "tb_geom.unsupported_bond",
                        "bond kind not provided by geometry",
                    )
                    .with_context("geometry", self.name())
                    .with_context("kind", kind.as_str())
                    .with_context("provided", provided_list(self.bond_kinds())),
                ))
            }
        };
        Ok(table)
    }

    /// Builds a mutable lattice instance with no removed sites.
    pub fn build(&self) -> Result<Lattice, TbError> {
        Lattice::new(self.clone())
    }
}

fn linear(nx: usize, boundary_x: BoundaryCondition) -> Shape {
    Shape {
        nx,
        ny: 1,
        boundary_x,
        boundary_y: BoundaryCondition::Open,
        sublattices: 1,
        rank: 1,
    }
}

fn check_side(geometry: &str, axis: &str, value: usize) -> Result<(), TbError> {
    if value < MIN_LATTICE_SIDE {
        return Err(TbError::Validation(
            ErrorInfo::new("tb_geom.lattice_side", "lattice side too small")
                .with_context("geometry", geometry)
                .with_context("axis", axis)
                .with_context("value", value.to_string())
                .with_context("expected", format!(">= {MIN_LATTICE_SIDE}")),
        ));
    }
    Ok(())
}

fn provided_list(kinds: &[BondKind]) -> String {
    kinds
        .iter()
        .map(|kind| kind.as_str())
        .collect::<Vec<_>>()
        .join(",")
}
