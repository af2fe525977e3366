use tb_core::{ContentHash, TbError, DEFAULT_HASH_LENGTH};
use tb_geom::BondKind;
use tb_phys::{PairMatrix, SimulationConfig};

const SQUARE: &str = r#"
geometry:
  lattice: square
  nx: 4
  ny: 3
  boundary_x: periodic
  boundary_y: open
physics:
  model: tb
  seed: 7
  basis: { n_orb: 1, n_spin: 1 }
  params:
    onsite: [[[0.0, 0.0]]]
    hopping:
      nn1x: [[[-1.0, 0.0]]]
      nn1y: [[[-0.5, 0.0]]]
solver:
  eta: 0.05
  w_min: -4.0
  w_max: 4.0
  n_w: 81
"#;

fn parse(text: &str) -> SimulationConfig {
    serde_yaml::from_str(text).expect("valid yaml config")
}

fn patched(from: &str, to: &str) -> SimulationConfig {
    assert!(SQUARE.contains(from), "fixture does not contain {from:?}");
    parse(&SQUARE.replacen(from, to, 1))
}

#[test]
fn square_config_validates() {
    let config = parse(SQUARE);
    config.validate().unwrap();
    assert_eq!(config.physics.ndof(), 1);
    assert_eq!(config.solver.energy_grid().len(), 81);
}

#[test]
fn hopping_terms_follow_bond_kind_order() {
    let config = patched(
        "      nn1x: [[[-1.0, 0.0]]]",
        "      nn2: [[[-0.1, 0.0]]]\n      nn1x: [[[-1.0, 0.0]]]",
    );
    let terms = config.hopping_terms().unwrap();
    let kinds: Vec<BondKind> = terms.iter().map(|(kind, _)| *kind).collect();
    assert_eq!(kinds, vec![BondKind::Nn1x, BondKind::Nn1y, BondKind::Nn2]);
    assert_eq!(terms[1].1, &PairMatrix::scalar(-0.5, 0.0));
}

#[test]
fn nn1_is_not_a_square_bond_kind() {
    let config = patched(
        "      nn1x: [[[-1.0, 0.0]]]\n      nn1y: [[[-0.5, 0.0]]]",
        "      nn1: [[[-1.0, 0.0]]]",
    );
    let err = config.validate().expect_err("square has no nn1");
    assert!(matches!(err, TbError::Unsupported(_)));
    assert_eq!(err.code(), "tb_phys.hopping_key");
    assert_eq!(
        err.info().context.get("provided").map(String::as_str),
        Some("nn1x,nn1y,nn2")
    );

    let mixed = patched("      nn1y: [[[-0.5, 0.0]]]", "      nn1: [[[-0.5, 0.0]]]");
    assert_eq!(mixed.hopping_terms().unwrap_err().code(), "tb_phys.hopping_key");
}

#[test]
fn directional_keys_fail_on_chain() {
    let mut config = patched(
        "  lattice: square\n  nx: 4\n  ny: 3\n  boundary_x: periodic\n  boundary_y: open",
        "  lattice: chain\n  nx: 4\n  boundary_x: open",
    );
    config.physics.params.hopping.clear();
    config
        .physics
        .params
        .hopping
        .insert("nn1".into(), PairMatrix::scalar(-1.0, 0.0));
    config.validate().unwrap();

    config
        .physics
        .params
        .hopping
        .insert("nn1x".into(), PairMatrix::scalar(-1.0, 0.0));
    let err = config.validate().expect_err("chain has no nn1x");
    assert!(matches!(err, TbError::Unsupported(_)));
    assert_eq!(err.code(), "tb_phys.hopping_key");
    assert_eq!(
        err.info().context.get("provided").map(String::as_str),
        Some("nn1,nn2")
    );
}

#[test]
fn flux_requires_a_ring() {
    let config = patched(
        "  params:",
        "  fields:\n    ab_flux: { phi_over_phi0: 0.25 }\n  params:",
    );
    let err = config.validate().expect_err("square cannot carry flux");
    assert!(matches!(err, TbError::Unsupported(_)));
    assert_eq!(err.code(), "tb_phys.ab_flux");
}

#[test]
fn block_shapes_must_match_ndof() {
    let config = patched("n_spin: 1", "n_spin: 2");
    let err = config.validate().expect_err("1x1 blocks for ndof 2");
    assert!(matches!(err, TbError::Validation(_)));
    assert_eq!(err.code(), "tb_phys.block_shape");
    assert_eq!(
        err.info().context.get("matrix").map(String::as_str),
        Some("onsite")
    );
}

#[test]
fn ragged_matrix_is_rejected() {
    let config = patched(
        "      nn1x: [[[-1.0, 0.0]]]",
        "      nn1x: [[[-1.0, 0.0], [0.0, 0.0]]]",
    );
    assert_eq!(config.validate().unwrap_err().code(), "tb_phys.matrix");
}

#[test]
fn basis_order_must_be_a_permutation() {
    let config = patched(
        "basis: { n_orb: 1, n_spin: 1 }",
        "basis: { n_orb: 1, n_spin: 1, order: [spin, spin] }",
    );
    assert_eq!(config.validate().unwrap_err().code(), "tb_phys.basis_order");
}

#[test]
fn empty_hopping_is_rejected() {
    let config = patched(
        "    hopping:\n      nn1x: [[[-1.0, 0.0]]]\n      nn1y: [[[-0.5, 0.0]]]",
        "    hopping: {}",
    );
    assert_eq!(config.validate().unwrap_err().code(), "tb_phys.hopping_empty");
}

#[test]
fn zeeman_needs_spin_half() {
    let config = patched(
        "  params:",
        "  fields:\n    zeeman: { b: [0.0, 0.0, 1.0] }\n  params:",
    );
    assert_eq!(config.validate().unwrap_err().code(), "tb_phys.zeeman_spin");
}

#[test]
fn solver_ranges_are_checked() {
    for (from, to) in [
        ("eta: 0.05", "eta: 0.0"),
        ("w_min: -4.0", "w_min: 4.0"),
        ("n_w: 81", "n_w: 1"),
    ] {
        let err = patched(from, to).validate().expect_err(to);
        assert!(matches!(err, TbError::Validation(_)));
        assert_eq!(err.code(), "tb_phys.solver");
    }
}

#[test]
fn energy_grid_hits_both_ends() {
    let config = patched("n_w: 81", "n_w: 3");
    assert_eq!(config.solver.energy_grid(), vec![-4.0, 0.0, 4.0]);
}

#[test]
fn unknown_sections_fail_to_parse() {
    let text = format!("{SQUARE}perturbations: {{}}\n");
    assert!(serde_yaml::from_str::<SimulationConfig>(&text).is_err());
}

#[test]
fn defects_are_applied_before_freeze() {
    let config = patched(
        "solver:",
        "defects:\n  removed_sites: [[5, 0], [1, 2]]\n  wrap: true\nsolver:",
    );
    let lattice = config.build_geometry().unwrap();
    assert!(lattice.is_frozen());
    assert_eq!(lattice.n_active(), 10);
    let removed: Vec<Vec<usize>> = lattice.removed_sites().iter().cloned().collect();
    assert_eq!(removed, vec![vec![1, 0], vec![1, 2]]);
}

#[test]
fn out_of_range_defect_without_wrap_fails() {
    let config = patched("solver:", "defects:\n  removed_sites: [[5, 0]]\nsolver:");
    assert_eq!(
        config.build_geometry().unwrap_err().code(),
        "tb_geom.out_of_bounds"
    );
}

#[test]
fn physics_hash_ignores_key_order_but_not_values() {
    let config = parse(SQUARE);
    let reordered = parse(&SQUARE.replace(
        "  model: tb\n  seed: 7\n",
        "  seed: 7\n  model: tb\n",
    ));
    assert_eq!(
        config.physics.content_hash(DEFAULT_HASH_LENGTH).unwrap(),
        reordered.physics.content_hash(DEFAULT_HASH_LENGTH).unwrap()
    );

    let reseeded = patched("seed: 7", "seed: 8");
    assert_ne!(
        config.physics.content_digest().unwrap(),
        reseeded.physics.content_digest().unwrap()
    );
    assert_eq!(
        config.solver.content_hash(8).unwrap(),
        reseeded.solver.content_hash(8).unwrap()
    );
}

#[test]
fn removing_every_site_fails_at_build() {
    let mut config = patched(
        "  lattice: square\n  nx: 4\n  ny: 3\n  boundary_x: periodic\n  boundary_y: open",
        "  lattice: chain\n  nx: 3\n  boundary_x: open",
    );
    config.physics.params.hopping.clear();
    config
        .physics
        .params
        .hopping
        .insert("nn1".into(), PairMatrix::scalar(-1.0, 0.0));
    config.defects = Some(tb_phys::DefectsConfig {
        removed_sites: vec![vec![0], vec![1], vec![2]],
        wrap: false,
    });
    config.validate().unwrap();
    let err = config.build_geometry().unwrap_err();
    assert!(matches!(err, TbError::Validation(_)));
    assert_eq!(err.code(), "tb_phys.empty_geometry");
}
