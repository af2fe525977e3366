use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tb_core::errors::{ErrorInfo, TbError};

use crate::matrix::PairMatrix;

/// Physics model discriminant. Only tight binding is implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhysicsModel {
    /// Tight-binding model assembled from bond blocks.
    Tb,
}

/// Axis of the local per-site basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasisAxis {
    /// Orbital index.
    Orb,
    /// Spin index.
    Spin,
}

/// Local degrees of freedom attached to every site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocalBasis {
    /// Orbitals per site.
    pub n_orb: usize,
    /// Spin components per site.
    pub n_spin: usize,
    /// Nesting of the local index, outer axis first.
    #[serde(default = "default_order")]
    pub order: [BasisAxis; 2],
}

fn default_order() -> [BasisAxis; 2] {
    [BasisAxis::Orb, BasisAxis::Spin]
}

impl LocalBasis {
    /// Degrees of freedom per site.
    pub fn ndof(&self) -> usize {
        self.n_orb * self.n_spin
    }

    /// Position of `(orb, spin)` inside a site block.
    pub fn local_index(&self, orb: usize, spin: usize) -> usize {
        match self.order {
            [BasisAxis::Spin, _] => spin * self.n_orb + orb,
            _ => orb * self.n_spin + spin,
        }
    }

    /// Checks extents and that `order` is a permutation of both axes.
    pub fn validate(&self) -> Result<(), TbError> {
        for (axis, value) in [("n_orb", self.n_orb), ("n_spin", self.n_spin)] {
            if value == 0 {
                return Err(TbError::Validation(
                    ErrorInfo::new("tb_phys.basis", "basis extent must be at least 1")
                        .with_context("axis", axis),
                ));
            }
        }
        if self.order[0] == self.order[1] {
            return Err(TbError::Validation(
                ErrorInfo::new(
                    "tb_phys.basis_order",
                    "basis.order must be a permutation of (orb, spin)",
                )
                .with_context("order", format!("{:?}", self.order)),
            ));
        }
        Ok(())
    }
}

/// Onsite block plus one hopping block per bond-kind key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TbParams {
    /// Block added on every site.
    pub onsite: PairMatrix,
    /// Hopping block keyed by bond kind (`nn1`, `nn1x`, ...).
    pub hopping: BTreeMap<String, PairMatrix>,
}

/// Aharonov-Bohm flux threading a ring, in units of the flux quantum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AbFluxConfig {
    /// Flux over flux quantum.
    #[serde(default)]
    pub phi_over_phi0: f64,
}

/// Zeeman field `(bx, by, bz)` in energy units, applied as `B . sigma / 2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZeemanConfig {
    /// Field components.
    #[serde(default)]
    pub b: [f64; 3],
}

/// External fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldConfig {
    /// Flux through a ring geometry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ab_flux: Option<AbFluxConfig>,
    /// Uniform Zeeman field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zeeman: Option<ZeemanConfig>,
}

/// Uniform onsite disorder drawn from `[-strength / 2, strength / 2)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DisorderConfig {
    /// Width of the distribution.
    pub strength: f64,
}

/// Physics configuration of a tight-binding run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TbPhysics {
    /// Model discriminant.
    pub model: PhysicsModel,
    /// Seed for every stochastic term.
    #[serde(default)]
    pub seed: u64,
    /// Local basis.
    pub basis: LocalBasis,
    /// Onsite and hopping blocks.
    pub params: TbParams,
    /// Optional external fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldConfig>,
    /// Optional onsite disorder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disorder: Option<DisorderConfig>,
}

impl TbPhysics {
    /// Degrees of freedom per site.
    pub fn ndof(&self) -> usize {
        self.basis.ndof()
    }

    /// Flux through the ring, if configured.
    pub fn ab_flux(&self) -> Option<f64> {
        self.fields
            .as_ref()
            .and_then(|fields| fields.ab_flux.as_ref())
            .map(|flux| flux.phi_over_phi0)
    }

    /// Zeeman field, if configured.
    pub fn zeeman(&self) -> Option<[f64; 3]> {
        self.fields
            .as_ref()
            .and_then(|fields| fields.zeeman.as_ref())
            .map(|zeeman| zeeman.b)
    }

    /// Checks the basis, block shapes and field compatibility with the basis.
    ///
    /// Geometry-dependent checks (hopping keys, flux support) live on the
    /// simulation config.
    pub fn validate(&self) -> Result<(), TbError> {
        self.basis.validate()?;
        let ndof = self.ndof();
        check_block("onsite", &self.params.onsite, ndof)?;
        if self.params.hopping.is_empty() {
            return Err(TbError::Validation(
                ErrorInfo::new("tb_phys.hopping_empty", "hopping must be non-empty")
                    .with_hint("add at least one bond kind under params.hopping"),
            ));
        }
        for (key, block) in &self.params.hopping {
            check_block(&format!("hopping.{key}"), block, ndof)?;
        }
        if let Some(flux) = self.ab_flux() {
            check_finite("fields.ab_flux.phi_over_phi0", flux)?;
        }
        if let Some(b) = self.zeeman() {
            for value in b {
                check_finite("fields.zeeman.b", value)?;
            }
            if self.basis.n_spin != 2 {
                return Err(TbError::Validation(
                    ErrorInfo::new("tb_phys.zeeman_spin", "zeeman field needs n_spin == 2")
                        .with_context("n_spin", self.basis.n_spin.to_string()),
                ));
            }
        }
        if let Some(disorder) = &self.disorder {
            check_finite("disorder.strength", disorder.strength)?;
            if disorder.strength < 0.0 {
                return Err(TbError::Validation(
                    ErrorInfo::new("tb_phys.disorder", "disorder strength must be >= 0")
                        .with_context("strength", disorder.strength.to_string()),
                ));
            }
        }
        Ok(())
    }
}

fn check_block(label: &str, block: &PairMatrix, ndof: usize) -> Result<(), TbError> {
    block.validate(label)?;
    if block.dim() != ndof {
        return Err(TbError::Validation(
            ErrorInfo::new("tb_phys.block_shape", "matrix size does not match ndof")
                .with_context("matrix", label)
                .with_context("dim", block.dim().to_string())
                .with_context("ndof", ndof.to_string()),
        ));
    }
    Ok(())
}

fn check_finite(field: &str, value: f64) -> Result<(), TbError> {
    if !value.is_finite() {
        return Err(TbError::Validation(
            ErrorInfo::new("tb_phys.non_finite", "value must be finite").with_context("field", field),
        ));
    }
    Ok(())
}
