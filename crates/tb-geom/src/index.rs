use tb_core::errors::{ErrorInfo, TbError};
use tb_core::{ActiveIndex, GlobalIndex};

/// Global/active translation tables for a lattice with removed sites.
///
/// `active_to_global` is strictly increasing, removed globals map to `None`,
/// and `global_to_active[active_to_global[a]] == Some(a)` for every `a`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexMaps {
    global_to_active: Vec<Option<ActiveIndex>>,
    active_to_global: Vec<GlobalIndex>,
}

impl IndexMaps {
    /// Builds both tables in one ascending pass over `0..n_global`.
    pub fn build(n_global: usize, is_removed: impl Fn(usize) -> bool) -> Self {
        let mut global_to_active = Vec::with_capacity(n_global);
        let mut active_to_global = Vec::with_capacity(n_global);
        for global in 0..n_global {
            if is_removed(global) {
                global_to_active.push(None);
            } else {
                global_to_active.push(Some(ActiveIndex::from_raw(active_to_global.len())));
                active_to_global.push(GlobalIndex::from_raw(global));
            }
        }
        Self {
            global_to_active,
            active_to_global,
        }
    }

    /// Number of sites before removal.
    pub fn n_global(&self) -> usize {
        self.global_to_active.len()
    }

    /// Number of surviving sites.
    pub fn n_active(&self) -> usize {
        self.active_to_global.len()
    }

    /// Active index of `global`, `None` for removed sites.
    pub fn global_to_active(&self, global: GlobalIndex) -> Result<Option<ActiveIndex>, TbError> {
        self.global_to_active
            .get(global.as_raw())
            .copied()
            .ok_or_else(|| out_of_range("tb_geom.global_index", global.as_raw(), self.n_global()))
    }

    /// Global index of the `active`-th surviving site.
    pub fn active_to_global(&self, active: ActiveIndex) -> Result<GlobalIndex, TbError> {
        self.active_to_global
            .get(active.as_raw())
            .copied()
            .ok_or_else(|| out_of_range("tb_geom.active_index", active.as_raw(), self.n_active()))
    }

    /// Raw `global -> active` table.
    pub fn global_to_active_slice(&self) -> &[Option<ActiveIndex>] {
        &self.global_to_active
    }

    /// Raw `active -> global` table.
    pub fn active_to_global_slice(&self) -> &[GlobalIndex] {
        &self.active_to_global
    }

    pub(crate) fn lookup_active(&self, global: GlobalIndex) -> Option<ActiveIndex> {
        self.global_to_active.get(global.as_raw()).copied().flatten()
    }
}

fn out_of_range(code: &str, index: usize, len: usize) -> TbError {
    TbError::Bounds(
        ErrorInfo::new(code, "index out of range")
            .with_context("index", index.to_string())
            .with_context("expected", format!("0..{len}")),
    )
}
