mod util;

use mesh_subcell::prelude::*;
use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use util::*;

/// Sum of cell, side and corner volumes over all cells.
fn totals<B: MeshBackend>(mesh: &B) -> (f64, f64, f64) {
    let cache = full_cache(mesh);
    let geo = cache.view(mesh).geometry().unwrap();
    let sum = |v: Vec<f64>| v.iter().sum::<f64>();
    (
        sum(geo.cell_volumes(Mode::Cached).unwrap()),
        sum(geo.side_volumes(Mode::Cached).unwrap()),
        sum(geo.corner_volumes(Mode::Cached).unwrap()),
    )
}

/// Move every interior node of a structured grid by up to `amp` per axis.
fn jitter(mesh: &mut InMemoryMesh, dims: usize, extent: &[f64], amp: f64, seed: u64) {
    let mut rng = SmallRng::seed_from_u64(seed);
    for n in 0..mesh.counts(EntityKind::Node).total() {
        let p = mesh.node_coordinates(n);
        let interior = (0..dims).all(|i| p[i] > 1e-9 && p[i] < extent[i] - 1e-9);
        if interior {
            let moved: Vec<f64> = (0..dims)
                .map(|i| p[i] + rng.gen_range(-amp..amp))
                .collect();
            mesh.set_node_coordinates(n, &moved).unwrap();
        }
    }
}

proptest! {
    #[test]
    fn quad_grids_conserve_area(nx in 1usize..6, ny in 1usize..6) {
        let mesh = quad_grid(nx, ny, MeshGenOptions::default());
        let (cells, sides, corners) = totals(&mesh);
        let area = (nx * ny) as f64;
        prop_assert!((cells - area).abs() < 1e-10);
        prop_assert!((sides - area).abs() < 1e-10);
        prop_assert!((corners - area).abs() < 1e-10);
    }

    #[test]
    fn hex_grids_conserve_volume(nx in 1usize..4, ny in 1usize..4, nz in 1usize..4) {
        let mesh = structured_box_3d(nx, ny, nz, [0.0; 3], [1.0, 2.0, 0.5], MeshGenOptions::default())
            .unwrap();
        let (cells, sides, corners) = totals(&mesh);
        prop_assert!((cells - 1.0).abs() < 1e-10);
        prop_assert!((sides - 1.0).abs() < 1e-10);
        prop_assert!((corners - 1.0).abs() < 1e-10);
    }

    #[test]
    fn jittered_quads_conserve_area(nx in 2usize..6, ny in 2usize..6, seed in any::<u64>()) {
        let mut mesh = quad_grid(nx, ny, MeshGenOptions::default());
        jitter(&mut mesh, 2, &[nx as f64, ny as f64], 0.2, seed);
        let (cells, sides, corners) = totals(&mesh);
        let area = (nx * ny) as f64;
        prop_assert!((cells - area).abs() < 1e-10);
        prop_assert!((sides - cells).abs() < 1e-10);
        prop_assert!((corners - cells).abs() < 1e-10);
    }

    #[test]
    fn opposite_sides_are_symmetric(nx in 1usize..4, ny in 1usize..4) {
        let mesh = structured_box_3d(nx, ny, 1, [0.0; 3], [1.0; 3], MeshGenOptions::default())
            .unwrap();
        let cache = full_cache(&mesh);
        let sides = cache.sides().unwrap();
        for s in 0..sides.len() {
            if let Some(t) = sides.opposite(s) {
                prop_assert_eq!(sides.opposite(t), Some(s));
                prop_assert_eq!(sides.face(t), sides.face(s));
                prop_assert_ne!(sides.cell(t), sides.cell(s));
            }
        }
    }
}

#[test]
fn jittered_hexes_conserve_volume() {
    for seed in [1u64, 7, 42] {
        let mut mesh =
            structured_box_3d(3, 3, 3, [0.0; 3], [3.0; 3], MeshGenOptions::default()).unwrap();
        jitter(&mut mesh, 3, &[3.0; 3], 0.15, seed);
        let (cells, sides, corners) = totals(&mesh);
        // warped faces make the cell formula approximate, sub-cells still tile it
        assert!((sides - cells).abs() < 1e-9, "seed {seed}: {sides} vs {cells}");
        assert!((corners - sides).abs() < 1e-9, "seed {seed}: {corners} vs {sides}");
        assert!((cells - 27.0).abs() < 1e-9, "seed {seed}: {cells}");
    }
}
