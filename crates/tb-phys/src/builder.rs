//! Dense Hamiltonian assembly from lattice bonds and local blocks.
//!
//! Rows are ordered site-major: the block of active site `a` occupies
//! `a * ndof .. (a + 1) * ndof`, and inside a block the basis order decides
//! whether orbitals or spins are the outer index.

use std::f64::consts::PI;

use nalgebra::{Complex, DMatrix};
use rand::Rng;
use tb_core::errors::{ErrorInfo, TbError};
use tb_core::RngHandle;
use tb_geom::Lattice;

use crate::matrix::C64;
use crate::physics::TbPhysics;
use crate::simulation::SimulationConfig;

/// Substream of the physics seed reserved for onsite disorder.
pub const DISORDER_SUBSTREAM: u64 = 1;

/// Assembled Hamiltonian with its block layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Hamiltonian {
    /// Dense Hermitian matrix.
    pub matrix: DMatrix<C64>,
    /// Active sites.
    pub n_sites: usize,
    /// Degrees of freedom per site.
    pub ndof: usize,
}

impl Hamiltonian {
    /// Total dimension `n_sites * ndof`.
    pub fn dim(&self) -> usize {
        self.n_sites * self.ndof
    }

    /// Largest `|H - H^dagger|` entry.
    pub fn hermiticity_defect(&self) -> f64 {
        let diff = &self.matrix - self.matrix.adjoint();
        diff.iter().map(|value| value.norm()).fold(0.0, f64::max)
    }
}

/// Builds the Hamiltonian of `config` on a frozen `lattice`.
///
/// The configuration is validated first, so mis-shaped blocks surface as
/// errors instead of out-of-range indexing.
pub fn build_hamiltonian(config: &SimulationConfig, lattice: &Lattice) -> Result<Hamiltonian, TbError> {
    config.validate()?;
    let physics = &config.physics;
    let ndof = physics.ndof();
    let n_sites = lattice.n_active();
    let mut matrix = DMatrix::<C64>::zeros(n_sites * ndof, n_sites * ndof);

    let onsite = physics.params.onsite.to_dense();
    for site in 0..n_sites {
        add_block(&mut matrix, site, site, ndof, |i, j| onsite[(i, j)]);
    }

    let flux = physics
        .ab_flux()
        .filter(|_| config.geometry.supports_flux())
        .unwrap_or(0.0);
    let circumference = lattice.shape().nx as f64;
    for (kind, block) in config.hopping_terms()? {
        let block = block.to_dense();
        let mut count = 0usize;
        for ((from, to), shift) in lattice.bonds(kind)?.with_shifts() {
            let phase = Complex::from_polar(1.0, 2.0 * PI * flux * shift.dx as f64 / circumference);
            let (i, j) = (from.as_raw(), to.as_raw());
            add_block(&mut matrix, i, j, ndof, |a, b| block[(a, b)] * phase);
            add_block(&mut matrix, j, i, ndof, |a, b| (block[(b, a)] * phase).conj());
            count += 1;
        }
        tracing::debug!(kind = kind.as_str(), bonds = count, "hopping assembled");
    }

    if let Some(b) = physics.zeeman() {
        let zeeman = zeeman_block(physics, b)?;
        for site in 0..n_sites {
            add_block(&mut matrix, site, site, ndof, |i, j| zeeman[(i, j)]);
        }
    }

    if let Some(disorder) = &physics.disorder {
        let mut rng = RngHandle::substream(physics.seed, DISORDER_SUBSTREAM);
        for site in 0..n_sites {
            let value = disorder.strength * (rng.gen::<f64>() - 0.5);
            for dof in 0..ndof {
                matrix[(site * ndof + dof, site * ndof + dof)] += Complex::new(value, 0.0);
            }
        }
    }

    Ok(Hamiltonian {
        matrix,
        n_sites,
        ndof,
    })
}

fn add_block(
    matrix: &mut DMatrix<C64>,
    row_site: usize,
    col_site: usize,
    ndof: usize,
    entry: impl Fn(usize, usize) -> C64,
) {
    for a in 0..ndof {
        for b in 0..ndof {
            matrix[(row_site * ndof + a, col_site * ndof + b)] += entry(a, b);
        }
    }
}

/// `(bx sx + by sy + bz sz) / 2` on the spin index, identity on orbitals.
fn zeeman_block(physics: &TbPhysics, b: [f64; 3]) -> Result<DMatrix<C64>, TbError> {
    let basis = &physics.basis;
    if basis.n_spin != 2 {
        return Err(TbError::Validation(
            ErrorInfo::new("tb_phys.zeeman_spin", "zeeman field needs n_spin == 2")
                .with_context("n_spin", basis.n_spin.to_string()),
        ));
    }
    let [bx, by, bz] = b;
    let spin = [
        [Complex::new(bz, 0.0), Complex::new(bx, -by)],
        [Complex::new(bx, by), Complex::new(-bz, 0.0)],
    ];
    let ndof = basis.ndof();
    let mut block = DMatrix::<C64>::zeros(ndof, ndof);
    for orb in 0..basis.n_orb {
        for s in 0..2 {
            for t in 0..2 {
                block[(basis.local_index(orb, s), basis.local_index(orb, t))] += spin[s][t] * 0.5;
            }
        }
    }
    Ok(block)
}
