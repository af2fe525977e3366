use tb_core::TbError;
use tb_geom::{
    AbRingConfig, BoundaryCondition, ChainConfig, GeometryConfig, HoneycombConfig, LatticeState,
    SquareConfig,
};

fn square(boundary_x: BoundaryCondition, boundary_y: BoundaryCondition) -> GeometryConfig {
    GeometryConfig::Square(SquareConfig {
        nx: 4,
        ny: 3,
        boundary_x,
        boundary_y,
    })
}

#[test]
fn frozen_lattice_rejects_removal() {
    let mut lattice = square(BoundaryCondition::Open, BoundaryCondition::Open)
        .build()
        .unwrap();
    lattice.remove_site(&[0, 0], false).unwrap();
    lattice.freeze();
    assert_eq!(lattice.state(), LatticeState::Frozen);
    assert!(lattice.maps().is_some());

    let before = lattice.removed_sites().clone();
    let err = lattice.remove_site(&[1, 1], false).expect_err("frozen");
    assert!(matches!(err, TbError::State(_)));
    assert_eq!(err.code(), "tb_geom.frozen");
    assert_eq!(lattice.removed_sites(), &before);

    // re-removing an existing site is still a mutation attempt
    assert!(lattice.remove_site(&[0, 0], false).is_err());
}

#[test]
fn out_of_bounds_without_wrap_fails() {
    let mut lattice = square(BoundaryCondition::Periodic, BoundaryCondition::Periodic)
        .build()
        .unwrap();
    for coord in [[4, 0], [0, 3], [-1, 0]] {
        let err = lattice.remove_site(&coord, false).expect_err("out of bounds");
        assert!(matches!(err, TbError::Bounds(_)));
        assert_eq!(err.code(), "tb_geom.out_of_bounds");
    }
    assert!(lattice.removed_sites().is_empty());
}

#[test]
fn wrap_reduces_periodic_axes_only() {
    let mut lattice = square(BoundaryCondition::Periodic, BoundaryCondition::Open)
        .build()
        .unwrap();
    lattice.remove_site(&[5, 1], true).unwrap();
    lattice.remove_site(&[-1, 2], true).unwrap();
    let removed: Vec<Vec<usize>> = lattice.removed_sites().iter().cloned().collect();
    assert_eq!(removed, vec![vec![1, 1], vec![3, 2]]);

    let err = lattice.remove_site(&[0, 3], true).expect_err("open y axis");
    assert_eq!(err.code(), "tb_geom.out_of_bounds");
    assert_eq!(err.info().context.get("axis").map(String::as_str), Some("1"));
}

#[test]
fn wrapped_duplicate_is_a_noop() {
    let mut lattice = GeometryConfig::AbRing(AbRingConfig {
        nx: 5,
        boundary_x: BoundaryCondition::Periodic,
    })
    .build()
    .unwrap();
    assert!(lattice.remove_site(&[2], false).unwrap());
    assert!(!lattice.remove_site(&[7], true).unwrap());
    assert_eq!(lattice.n_active(), 4);
}

#[test]
fn coordinate_rank_must_match_geometry() {
    let mut chain = GeometryConfig::Chain(ChainConfig {
        nx: 5,
        boundary_x: BoundaryCondition::Open,
    })
    .build()
    .unwrap();
    assert_eq!(
        chain.remove_site(&[1, 0], false).unwrap_err().code(),
        "tb_geom.coord_rank"
    );

    let mut honeycomb = GeometryConfig::Honeycomb(HoneycombConfig {
        nx: 3,
        ny: 3,
        boundary_x: BoundaryCondition::Periodic,
        boundary_y: BoundaryCondition::Periodic,
    })
    .build()
    .unwrap();
    // the sublattice label never wraps
    assert_eq!(
        honeycomb.remove_site(&[0, 0, 2], true).unwrap_err().code(),
        "tb_geom.out_of_bounds"
    );
    assert!(honeycomb.remove_site(&[3, 0, 1], true).unwrap());
}

#[test]
fn small_lattices_fail_validation() {
    let err = GeometryConfig::Chain(ChainConfig {
        nx: 2,
        boundary_x: BoundaryCondition::Periodic,
    })
    .build()
    .expect_err("too small");
    assert!(matches!(err, TbError::Validation(_)));
    assert_eq!(err.code(), "tb_geom.lattice_side");
}

#[test]
fn neighbor_xy_respects_boundaries() {
    let lattice = square(BoundaryCondition::Periodic, BoundaryCondition::Open)
        .build()
        .unwrap();
    assert_eq!(lattice.neighbor_xy(3, 0, 1, 0), Some((0, 0)));
    assert_eq!(lattice.neighbor_xy(0, 0, -1, 0), Some((3, 0)));
    assert_eq!(lattice.neighbor_xy(0, 2, 0, 1), None);
    assert_eq!(lattice.neighbor_xy(0, 0, 0, -1), None);
    assert_eq!(lattice.neighbor_xy(1, 1, 1, 1), Some((2, 2)));
}

#[test]
fn geometry_config_parses_from_tagged_yaml() {
    let config: GeometryConfig = serde_yaml::from_str(
        "lattice: ab_ring\nnx: 8\n",
    )
    .unwrap();
    assert_eq!(
        config,
        GeometryConfig::AbRing(AbRingConfig {
            nx: 8,
            boundary_x: BoundaryCondition::Periodic,
        })
    );
    assert!(config.supports_flux());

    let err = serde_yaml::from_str::<GeometryConfig>("lattice: kagome\nnx: 3\n");
    assert!(err.is_err());
}
