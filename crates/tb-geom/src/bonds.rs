use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tb_core::errors::{ErrorInfo, TbError};
use tb_core::{ActiveIndex, Bond, GlobalIndex};

use crate::index::IndexMaps;
use crate::lattice::{Lattice, Site};

/// Named category of site-to-site coupling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BondKind {
    /// Nearest neighbour (chains, rings, honeycomb A-B links).
    Nn1,
    /// Nearest neighbour along x on the square lattice.
    Nn1x,
    /// Nearest neighbour along y on the square lattice.
    Nn1y,
    /// Second neighbour (diagonals, next-nearest chain links).
    Nn2,
}

impl BondKind {
    /// Configuration key used for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            BondKind::Nn1 => "nn1",
            BondKind::Nn1x => "nn1x",
            BondKind::Nn1y => "nn1y",
            BondKind::Nn2 => "nn2",
        }
    }
}

impl fmt::Display for BondKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BondKind {
    type Err = TbError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "nn1" => Ok(BondKind::Nn1),
            "nn1x" => Ok(BondKind::Nn1x),
            "nn1y" => Ok(BondKind::Nn1y),
            "nn2" => Ok(BondKind::Nn2),
            other => Err(TbError::Unsupported(
                ErrorInfo::new("tb_geom.bond_kind", "unknown bond kind")
                    .with_context("kind", other)
                    .with_hint("known kinds: nn1, nn1x, nn1y, nn2"),
            )),
        }
    }
}

/// Coordinate shift applied to sites of sublattice `from_sub`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shift {
    /// Cell displacement along x.
    pub dx: i64,
    /// Cell displacement along y.
    pub dy: i64,
    /// Sublattice the shift starts from.
    pub from_sub: usize,
    /// Sublattice the shift lands on.
    pub to_sub: usize,
}

const fn shift(dx: i64, dy: i64) -> Shift {
    Shift {
        dx,
        dy,
        from_sub: 0,
        to_sub: 0,
    }
}

const fn cross(dx: i64, dy: i64, from_sub: usize, to_sub: usize) -> Shift {
    Shift {
        dx,
        dy,
        from_sub,
        to_sub,
    }
}

pub(crate) const LINEAR_NN1: &[Shift] = &[shift(1, 0)];
pub(crate) const LINEAR_NN2: &[Shift] = &[shift(2, 0)];
pub(crate) const SQUARE_NN1X: &[Shift] = &[shift(1, 0)];
pub(crate) const SQUARE_NN1Y: &[Shift] = &[shift(0, 1)];
pub(crate) const SQUARE_NN2: &[Shift] = &[shift(1, 1), shift(-1, 1)];
// A sites couple to the three B sites of the brick-wall embedding.
pub(crate) const HONEYCOMB_NN1: &[Shift] = &[cross(0, 0, 0, 1), cross(-1, 0, 0, 1), cross(0, -1, 0, 1)];
pub(crate) const HONEYCOMB_NN2: &[Shift] = &[
    cross(1, 0, 0, 0),
    cross(0, 1, 0, 0),
    cross(1, -1, 0, 0),
    cross(1, 0, 1, 1),
    cross(0, 1, 1, 1),
    cross(1, -1, 1, 1),
];

/// Lazy, restartable enumeration of directed bonds for one kind.
///
/// Bonds come out in site-then-shift order: every active site in ascending
/// active index, and for each site the kind's shifts in table order.
#[derive(Debug, Clone)]
pub struct Bonds<'a> {
    lattice: &'a Lattice,
    maps: &'a IndexMaps,
    shifts: &'static [Shift],
    active: usize,
    shift: usize,
}

impl<'a> Bonds<'a> {
    pub(crate) fn new(lattice: &'a Lattice, maps: &'a IndexMaps, shifts: &'static [Shift]) -> Self {
        Self {
            lattice,
            maps,
            shifts,
            active: 0,
            shift: 0,
        }
    }

    /// Pairs every bond with its shift, for phases that depend on the
    /// displacement rather than on the wrapped endpoint.
    pub fn with_shifts(self) -> ShiftedBonds<'a> {
        ShiftedBonds { inner: self }
    }

    fn advance(&mut self) -> Option<(Bond, Shift)> {
        while self.active < self.maps.n_active() {
            if self.shift >= self.shifts.len() {
                self.active += 1;
                self.shift = 0;
                continue;
            }
            let step = self.shifts[self.shift];
            self.shift += 1;
            let global: GlobalIndex = self.maps.active_to_global_slice()[self.active];
            let origin = self.lattice.global_to_site(global);
            if let Some(target) = self.target(origin, &step) {
                return Some(((ActiveIndex::from_raw(self.active), target), step));
            }
        }
        None
    }

    fn target(&self, origin: Site, step: &Shift) -> Option<ActiveIndex> {
        if origin.sub != step.from_sub {
            return None;
        }
        let (x, y) = self.lattice.neighbor_xy(origin.x, origin.y, step.dx, step.dy)?;
        let global = self.lattice.site_to_global(Site {
            x,
            y,
            sub: step.to_sub,
        });
        self.maps.lookup_active(global)
    }
}

impl Iterator for Bonds<'_> {
    type Item = Bond;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance().map(|(bond, _)| bond)
    }
}

/// [`Bonds`] paired with the shift that produced each bond.
#[derive(Debug, Clone)]
pub struct ShiftedBonds<'a> {
    inner: Bonds<'a>,
}

impl Iterator for ShiftedBonds<'_> {
    type Item = (Bond, Shift);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.advance()
    }
}
