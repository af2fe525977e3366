use std::collections::BTreeSet;

use tb_core::errors::{ErrorInfo, TbError};
use tb_core::{ActiveIndex, GlobalIndex};

use crate::bonds::{BondKind, Bonds, Shift};
use crate::config::{GeometryConfig, Shape};
use crate::index::IndexMaps;

/// Mutation state of a lattice instance. The transition is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatticeState {
    /// Sites may still be removed.
    Mutable,
    /// Structure is fixed; removals fail.
    Frozen,
}

/// Cell coordinate plus sublattice label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Site {
    /// Cell index along x.
    pub x: usize,
    /// Cell index along y.
    pub y: usize,
    /// Sublattice within the cell.
    pub sub: usize,
}

/// Concrete geometry instance with removable sites.
///
/// Removed sites are kept as coordinate tuples in the configuration's rank
/// (`[x]`, `[x, y]` or `[x, y, s]`). The index maps are a derived cache that
/// is marked dirty on every successful removal and rebuilt by
/// [`Lattice::ensure_maps`].
#[derive(Debug, Clone)]
pub struct Lattice {
    config: GeometryConfig,
    shape: Shape,
    removed: BTreeSet<Vec<usize>>,
    state: LatticeState,
    maps: IndexMaps,
    maps_dirty: bool,
}

impl Lattice {
    /// Creates a mutable lattice for `config` with every site present.
    pub fn new(config: GeometryConfig) -> Result<Self, TbError> {
        config.validate()?;
        let shape = config.shape();
        Ok(Self {
            config,
            shape,
            removed: BTreeSet::new(),
            state: LatticeState::Mutable,
            maps: IndexMaps::default(),
            maps_dirty: true,
        })
    }

    /// Geometry configuration the lattice was built from.
    pub fn config(&self) -> &GeometryConfig {
        &self.config
    }

    /// Resolved extents and boundaries.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Site count before removal.
    pub fn n_global(&self) -> usize {
        self.shape.n_global()
    }

    /// Site count after removal.
    pub fn n_active(&self) -> usize {
        self.n_global() - self.removed.len()
    }

    /// Removed coordinates in sorted order.
    pub fn removed_sites(&self) -> &BTreeSet<Vec<usize>> {
        &self.removed
    }

    /// Current mutation state.
    pub fn state(&self) -> LatticeState {
        self.state
    }

    /// Returns true once [`Lattice::freeze`] has been called.
    pub fn is_frozen(&self) -> bool {
        self.state == LatticeState::Frozen
    }

    /// Returns true when the index maps must be rebuilt before use.
    pub fn maps_dirty(&self) -> bool {
        self.maps_dirty
    }

    /// Bond kinds the underlying geometry provides.
    pub fn provided_bond_kinds(&self) -> &'static [BondKind] {
        self.config.bond_kinds()
    }

    /// Fixes the structure and rebuilds the maps.
    pub fn freeze(&mut self) {
        self.ensure_maps();
        self.state = LatticeState::Frozen;
        tracing::debug!(
            geometry = self.config.name(),
            n_global = self.n_global(),
            n_active = self.n_active(),
            "lattice frozen"
        );
    }

    /// Removes the site at `coord`.
    ///
    /// With `wrap`, components along periodic axes are reduced modulo the
    /// extent first; open axes and the sublattice label are never wrapped.
    /// Returns `false` when the site was already removed.
    pub fn remove_site(&mut self, coord: &[i64], wrap: bool) -> Result<bool, TbError> {
        if self.is_frozen() {
            return Err(TbError::State(
                ErrorInfo::new(
                    "tb_geom.frozen",
                    "geometry is frozen; cannot modify removed sites",
                )
                .with_context("geometry", self.config.name())
                .with_context("coord", format!("{coord:?}")),
            ));
        }
        let resolved = self.resolve_coord(coord, wrap)?;
        let inserted = self.removed.insert(resolved);
        if inserted {
            self.maps_dirty = true;
        }
        Ok(inserted)
    }

    fn resolve_coord(&self, coord: &[i64], wrap: bool) -> Result<Vec<usize>, TbError> {
        if coord.len() != self.shape.rank {
            return Err(TbError::Bounds(
                ErrorInfo::new("tb_geom.coord_rank", "coordinate has the wrong rank")
                    .with_context("geometry", self.config.name())
                    .with_context("coord", format!("{coord:?}"))
                    .with_context("expected", self.shape.rank.to_string()),
            ));
        }
        let mut axes = vec![(self.shape.nx, self.shape.boundary_x.is_periodic())];
        if self.shape.rank >= 2 {
            axes.push((self.shape.ny, self.shape.boundary_y.is_periodic()));
        }
        if self.shape.rank == 3 {
            axes.push((self.shape.sublattices, false));
        }
        coord
            .iter()
            .zip(axes)
            .enumerate()
            .map(|(axis, (&value, (extent, periodic)))| {
                let value = if wrap && periodic {
                    value.rem_euclid(extent as i64)
                } else {
                    value
                };
                if (0..extent as i64).contains(&value) {
                    Ok(value as usize)
                } else {
                    Err(TbError::Bounds(
                        ErrorInfo::new("tb_geom.out_of_bounds", "coordinate out of bounds")
                            .with_context("geometry", self.config.name())
                            .with_context("coord", format!("{coord:?}"))
                            .with_context("axis", axis.to_string())
                            .with_context("expected", format!("0..{extent}"))
                            .with_context("wrap", wrap.to_string()),
                    ))
                }
            })
            .collect()
    }

    /// Rebuilds the index maps if a removal invalidated them.
    pub fn ensure_maps(&mut self) -> &IndexMaps {
        if self.maps_dirty {
            let removed: BTreeSet<usize> = self
                .removed
                .iter()
                .map(|coord| self.site_to_global(self.coord_to_site(coord)).as_raw())
                .collect();
            self.maps = IndexMaps::build(self.n_global(), |global| removed.contains(&global));
            self.maps_dirty = false;
            tracing::debug!(
                geometry = self.config.name(),
                n_active = self.maps.n_active(),
                "index maps rebuilt"
            );
        }
        &self.maps
    }

    /// Index maps, or `None` while they are dirty.
    pub fn maps(&self) -> Option<&IndexMaps> {
        (!self.maps_dirty).then_some(&self.maps)
    }

    /// Active index of `global`, `None` for a removed site.
    pub fn global_to_active(&mut self, global: GlobalIndex) -> Result<Option<ActiveIndex>, TbError> {
        self.ensure_maps().global_to_active(global)
    }

    /// Global index of an active site.
    pub fn active_to_global(&mut self, active: ActiveIndex) -> Result<GlobalIndex, TbError> {
        self.ensure_maps().active_to_global(active)
    }

    /// Global index of a site: `sub + sublattices * (x + nx * y)`.
    pub fn site_to_global(&self, site: Site) -> GlobalIndex {
        let cell = site.x + self.shape.nx * site.y;
        GlobalIndex::from_raw(site.sub + self.shape.sublattices * cell)
    }

    /// Inverse of [`Lattice::site_to_global`].
    pub fn global_to_site(&self, global: GlobalIndex) -> Site {
        let raw = global.as_raw();
        let sub = raw % self.shape.sublattices;
        let cell = raw / self.shape.sublattices;
        Site {
            x: cell % self.shape.nx,
            y: cell / self.shape.nx,
            sub,
        }
    }

    /// Coordinate tuple of `site` in the configuration's rank.
    pub fn site_coord(&self, site: Site) -> Vec<usize> {
        match self.shape.rank {
            1 => vec![site.x],
            2 => vec![site.x, site.y],
            _ => vec![site.x, site.y, site.sub],
        }
    }

    fn coord_to_site(&self, coord: &[usize]) -> Site {
        Site {
            x: coord[0],
            y: coord.get(1).copied().unwrap_or(0),
            sub: coord.get(2).copied().unwrap_or(0),
        }
    }

    /// Neighbouring cell of `(x, y)` displaced by `(dx, dy)`.
    ///
    /// Periodic axes wrap; `None` when an open boundary is exceeded.
    pub fn neighbor_xy(&self, x: usize, y: usize, dx: i64, dy: i64) -> Option<(usize, usize)> {
        let xx = self
            .shape
            .boundary_x
            .resolve(x as i64 + dx, self.shape.nx)?;
        let yy = self
            .shape
            .boundary_y
            .resolve(y as i64 + dy, self.shape.ny)?;
        Some((xx, yy))
    }

    /// Shift table for `kind` on this geometry.
    pub fn shifts(&self, kind: BondKind) -> Result<&'static [Shift], TbError> {
        self.config.shifts(kind)
    }

    /// Directed bonds of `kind` between active sites.
    ///
    /// Rebuilds dirty maps first. Fails for unknown kinds and for kinds the
    /// geometry does not provide.
    pub fn iter_bonds(&mut self, kind: &str) -> Result<Bonds<'_>, TbError> {
        let kind: BondKind = kind.parse()?;
        let shifts = self.config.shifts(kind)?;
        self.ensure_maps();
        let this: &Lattice = self;
        Ok(Bonds::new(this, &this.maps, shifts))
    }

    /// Bond iterator for a frozen (or freshly rebuilt) lattice.
    pub fn bonds(&self, kind: BondKind) -> Result<Bonds<'_>, TbError> {
        let shifts = self.config.shifts(kind)?;
        let maps = self.maps().ok_or_else(|| {
            TbError::State(
                ErrorInfo::new("tb_geom.maps_dirty", "index maps are stale")
                    .with_hint("call ensure_maps() or freeze() before enumerating bonds"),
            )
        })?;
        Ok(Bonds::new(self, maps, shifts))
    }
}
