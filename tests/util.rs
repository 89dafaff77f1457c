#![allow(dead_code)]
use mesh_subcell::prelude::*;

pub const TOL: f64 = 1e-12;

pub fn assert_close(got: f64, want: f64) {
    assert!(
        (got - want).abs() <= TOL * want.abs().max(1.0),
        "got {got}, want {want}"
    );
}

pub fn assert_point_close(got: Point, want: Point) {
    for i in 0..3 {
        assert!(
            (got[i] - want[i]).abs() <= TOL * want[i].abs().max(1.0),
            "got {got:?}, want {want:?}"
        );
    }
}

/// Unit square as one counter-clockwise quad.
pub fn unit_square() -> InMemoryMesh {
    let mut b = MeshBuilder::new(2, 2);
    for p in [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]] {
        b.add_node(&p, Ownership::Owned).unwrap();
    }
    b.add_cell(&[0, 1, 2, 3], Ownership::Owned).unwrap();
    b.build().unwrap()
}

/// Cells [0,1] and [1,2] on the x axis.
pub fn two_segments(geometry: GeometryType) -> InMemoryMesh {
    let mut b = MeshBuilder::new(1, 1).geometry_type(geometry);
    for x in [0.0, 1.0, 2.0] {
        b.add_node(&[x], Ownership::Owned).unwrap();
    }
    b.add_cell(&[0, 1], Ownership::Owned).unwrap();
    b.add_cell(&[1, 2], Ownership::Owned).unwrap();
    b.build().unwrap()
}

pub fn unit_cube() -> InMemoryMesh {
    structured_box_3d(1, 1, 1, [0.0; 3], [1.0; 3], MeshGenOptions::default()).unwrap()
}

pub fn quad_grid(nx: usize, ny: usize, options: MeshGenOptions) -> InMemoryMesh {
    structured_box_2d(
        nx,
        ny,
        [0.0, 0.0],
        [nx as f64, ny as f64],
        StructuredCellType::Quadrilateral,
        options,
    )
    .unwrap()
}

/// Fully built cache with every optional kind.
pub fn full_cache<B: MeshBackend>(mesh: &B) -> DerivedCache {
    DerivedCache::build(mesh, MeshConfig::all()).unwrap()
}

/// Signed area enclosed by oriented segments.
pub fn shoelace(segments: &[[Point; 2]]) -> f64 {
    segments
        .iter()
        .map(|[a, b]| 0.5 * (a[0] * b[1] - b[0] * a[1]))
        .sum()
}

/// Volume enclosed by outward-oriented triangles.
pub fn enclosed_volume(triangles: &[[Point; 3]]) -> f64 {
    triangles
        .iter()
        .map(|[a, b, c]| {
            let bxc = [
                b[1] * c[2] - b[2] * c[1],
                b[2] * c[0] - b[0] * c[2],
                b[0] * c[1] - b[1] * c[0],
            ];
            (a[0] * bxc[0] + a[1] * bxc[1] + a[2] * bxc[2]) / 6.0
        })
        .sum()
}
