use serde::{Deserialize, Serialize};
use tb_core::errors::{ErrorInfo, TbError};
use tb_geom::{BondKind, GeometryConfig, Lattice};

use crate::matrix::PairMatrix;
use crate::physics::TbPhysics;
use crate::solver::SolverConfig;

/// Sites removed from the pristine geometry before it is frozen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefectsConfig {
    /// Coordinates in the geometry's rank.
    #[serde(default)]
    pub removed_sites: Vec<Vec<i64>>,
    /// Reduce periodic components modulo the extent.
    #[serde(default)]
    pub wrap: bool,
}

/// Root of a run configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    /// Lattice geometry.
    pub geometry: GeometryConfig,
    /// Tight-binding physics.
    pub physics: TbPhysics,
    /// Spectral solver.
    pub solver: SolverConfig,
    /// Optional site removals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defects: Option<DefectsConfig>,
}

impl SimulationConfig {
    /// Validates every section and the cross-section constraints.
    ///
    /// Runs before any directory is created; a failure here leaves the
    /// results tree untouched.
    pub fn validate(&self) -> Result<(), TbError> {
        self.geometry.validate()?;
        self.physics.validate()?;
        self.solver.validate()?;
        self.hopping_terms()?;
        if self.physics.ab_flux().is_some() && !self.geometry.supports_flux() {
            return Err(TbError::Unsupported(
                ErrorInfo::new(
                    "tb_phys.ab_flux",
                    "ab_flux is set but geometry does not support it",
                )
                .with_context("geometry", self.geometry.name())
                .with_hint("use lattice: ab_ring or drop fields.ab_flux"),
            ));
        }
        Ok(())
    }

    /// Resolves hopping keys to the bond kinds they drive.
    ///
    /// Every key must name a bond kind the geometry provides; the result is
    /// sorted by kind.
    pub fn hopping_terms(&self) -> Result<Vec<(BondKind, &PairMatrix)>, TbError> {
        let mut terms = Vec::with_capacity(self.physics.params.hopping.len());
        for (key, block) in &self.physics.params.hopping {
            if !self.geometry.provides(key) {
                return Err(TbError::Unsupported(
                    ErrorInfo::new("tb_phys.hopping_key", "unsupported hopping key")
                        .with_context("geometry", self.geometry.name())
                        .with_context("key", key.as_str())
                        .with_context("provided", provided(&self.geometry)),
                ));
            }
            terms.push((key.parse()?, block));
        }
        terms.sort_by_key(|(kind, _)| *kind);
        Ok(terms)
    }

    /// Builds the lattice, applies defects and freezes it.
    ///
    /// Fails when the defects leave no active site.
    pub fn build_geometry(&self) -> Result<Lattice, TbError> {
        let mut lattice = self.geometry.build()?;
        if let Some(defects) = &self.defects {
            for coord in &defects.removed_sites {
                lattice.remove_site(coord, defects.wrap)?;
            }
        }
        if lattice.n_active() == 0 {
            return Err(TbError::Validation(
                ErrorInfo::new("tb_phys.empty_geometry", "defects remove every site")
                    .with_context("geometry", self.geometry.name())
                    .with_context("n_global", lattice.n_global().to_string()),
            ));
        }
        lattice.freeze();
        Ok(lattice)
    }
}

fn provided(geometry: &GeometryConfig) -> String {
    geometry
        .bond_kinds()
        .iter()
        .map(|kind| kind.as_str())
        .collect::<Vec<_>>()
        .join(",")
}
