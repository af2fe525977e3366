use proptest::prelude::*;
use tb_core::{ActiveIndex, GlobalIndex};
use tb_geom::{BoundaryCondition, GeometryConfig, HoneycombConfig, Lattice, SquareConfig};

fn square(nx: usize, ny: usize) -> Lattice {
    GeometryConfig::Square(SquareConfig {
        nx,
        ny,
        boundary_x: BoundaryCondition::Open,
        boundary_y: BoundaryCondition::Periodic,
    })
    .build()
    .expect("square lattice")
}

fn check_invariants(lattice: &mut Lattice) {
    let removed: Vec<usize> = lattice
        .removed_sites()
        .iter()
        .map(|coord| coord[0] + lattice.shape().nx * coord[1])
        .collect();
    let n_global = lattice.n_global();
    let n_active = lattice.n_active();
    let maps = lattice.ensure_maps().clone();

    assert_eq!(maps.n_global(), n_global);
    assert_eq!(maps.active_to_global_slice().len(), n_global - removed.len());
    assert_eq!(maps.n_active(), n_active);
    assert!(maps
        .active_to_global_slice()
        .windows(2)
        .all(|pair| pair[0] < pair[1]));
    for (global, entry) in maps.global_to_active_slice().iter().enumerate() {
        match entry {
            None => assert!(removed.contains(&global)),
            Some(active) => {
                assert!(!removed.contains(&global));
                assert_eq!(
                    maps.active_to_global(*active).unwrap(),
                    GlobalIndex::from_raw(global)
                );
            }
        }
    }
}

#[test]
fn fresh_lattice_is_identity_mapped() {
    let mut lattice = square(3, 4);
    assert!(lattice.maps_dirty());
    assert!(lattice.maps().is_none());
    let maps = lattice.ensure_maps();
    assert_eq!(maps.n_active(), 12);
    for raw in 0..12 {
        assert_eq!(
            maps.global_to_active(GlobalIndex::from_raw(raw)).unwrap(),
            Some(ActiveIndex::from_raw(raw))
        );
    }
}

#[test]
fn removal_compacts_preserving_order() {
    let mut lattice = square(3, 3);
    lattice.remove_site(&[1, 1], false).unwrap();
    lattice.remove_site(&[0, 0], false).unwrap();
    assert!(lattice.maps_dirty());

    assert_eq!(lattice.global_to_active(GlobalIndex::from_raw(0)).unwrap(), None);
    assert_eq!(lattice.global_to_active(GlobalIndex::from_raw(4)).unwrap(), None);
    assert_eq!(
        lattice.global_to_active(GlobalIndex::from_raw(5)).unwrap(),
        Some(ActiveIndex::from_raw(3))
    );
    assert_eq!(
        lattice.active_to_global(ActiveIndex::from_raw(0)).unwrap(),
        GlobalIndex::from_raw(1)
    );
    assert_eq!(lattice.n_active(), 7);
    assert!(!lattice.maps_dirty());
}

#[test]
fn repeated_removal_is_a_noop() {
    let mut lattice = square(3, 3);
    assert!(lattice.remove_site(&[2, 1], false).unwrap());
    lattice.ensure_maps();
    assert!(!lattice.remove_site(&[2, 1], false).unwrap());
    assert!(!lattice.maps_dirty());
    assert_eq!(lattice.removed_sites().len(), 1);
}

#[test]
fn out_of_range_lookups_are_bounds_errors() {
    let mut lattice = square(3, 3);
    lattice.remove_site(&[0, 0], false).unwrap();
    let err = lattice
        .global_to_active(GlobalIndex::from_raw(9))
        .expect_err("past n_global");
    assert_eq!(err.code(), "tb_geom.global_index");
    let err = lattice
        .active_to_global(ActiveIndex::from_raw(8))
        .expect_err("past n_active");
    assert_eq!(err.code(), "tb_geom.active_index");
}

#[test]
fn honeycomb_maps_cover_both_sublattices() {
    let mut lattice = GeometryConfig::Honeycomb(HoneycombConfig {
        nx: 3,
        ny: 3,
        boundary_x: BoundaryCondition::Periodic,
        boundary_y: BoundaryCondition::Periodic,
    })
    .build()
    .unwrap();
    assert_eq!(lattice.n_global(), 18);
    lattice.remove_site(&[1, 2, 1], false).unwrap();
    // sub + 2 * (x + 3 * y)
    assert_eq!(lattice.global_to_active(GlobalIndex::from_raw(15)).unwrap(), None);
    assert_eq!(lattice.n_active(), 17);
}

proptest! {
    #[test]
    fn maps_hold_after_random_removals(
        nx in 3usize..7,
        ny in 3usize..7,
        picks in proptest::collection::vec((0i64..7, 0i64..7), 0..20),
    ) {
        let mut lattice = square(nx, ny);
        for (x, y) in picks {
            // y is periodic, x is open: out-of-range x must fail even when wrapping
            let result = lattice.remove_site(&[x, y], true);
            if (x as usize) < nx {
                prop_assert!(result.is_ok());
            } else {
                prop_assert!(result.is_err());
            }
            check_invariants(&mut lattice);
        }
    }
}
