use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tb_geom::{BondKind, BoundaryCondition, GeometryConfig, HoneycombConfig, SquareConfig};

fn bench_square_nn2(c: &mut Criterion) {
    let mut lattice = GeometryConfig::Square(SquareConfig {
        nx: 64,
        ny: 64,
        boundary_x: BoundaryCondition::Periodic,
        boundary_y: BoundaryCondition::Periodic,
    })
    .build()
    .expect("lattice");
    for x in (0..64).step_by(7) {
        lattice.remove_site(&[x, x / 2], false).expect("remove");
    }
    lattice.freeze();
    c.bench_function("square_64x64_nn2", |b| {
        b.iter(|| {
            let count = lattice.bonds(BondKind::Nn2).expect("bonds").count();
            black_box(count);
        })
    });
}

fn bench_honeycomb_rebuild(c: &mut Criterion) {
    let config = GeometryConfig::Honeycomb(HoneycombConfig {
        nx: 48,
        ny: 48,
        boundary_x: BoundaryCondition::Periodic,
        boundary_y: BoundaryCondition::Open,
    });
    c.bench_function("honeycomb_48x48_rebuild_nn1", |b| {
        b.iter(|| {
            let mut lattice = config.build().expect("lattice");
            lattice.remove_site(&[3, 4, 1], false).expect("remove");
            let count = lattice.iter_bonds("nn1").expect("bonds").count();
            black_box(count);
        })
    });
}

criterion_group!(benches, bench_square_nn2, bench_honeycomb_rebuild);
criterion_main!(benches);
