//! Polygon and polyhedron integrals shared by the geometry strategies.
//!
//! Polygons are triangulated as a fan around their vertex average; a
//! polyhedron is split into tetrahedra `(centre, p, q, face centroid)` for
//! every outward-oriented face edge `p → q`. Side volumes use the same face
//! centroids, so they add up to these cell volumes.

use itertools::Itertools;

use super::vector::{
    EPS, Point, ZERO, add, average, cross, dot, norm, scale, sub, tet_volume, unit_or_zero,
};
use crate::topology::orientation::Dir;

/// Area vector (right-hand normal scaled by area) and centroid of a polygon.
pub fn polygon_area_centroid(ring: &[Point]) -> (Point, Point) {
    let c0 = average(ring);
    let tris: Vec<(Point, Point)> = ring
        .iter()
        .circular_tuple_windows()
        .map(|(&p, &q)| {
            let area = scale(cross(sub(p, c0), sub(q, c0)), 0.5);
            let centre = scale(add(add(c0, p), q), 1.0 / 3.0);
            (area, centre)
        })
        .collect();
    let area_vec = tris.iter().fold(ZERO, |acc, &(a, _)| add(acc, a));

    // weight by area projected on the mean normal so reflex vertices subtract
    let n = unit_or_zero(area_vec);
    let (mut total, mut weighted) = (0.0, ZERO);
    for &(a, centre) in &tris {
        let w = if n == ZERO { norm(a) } else { dot(a, n) };
        total += w;
        weighted = add(weighted, scale(centre, w));
    }
    let centroid = if total.abs() > EPS {
        scale(weighted, 1.0 / total)
    } else {
        c0
    };
    (area_vec, centroid)
}

/// One face of a polyhedron as seen from a cell: natural node loop plus the
/// direction in which the cell sees it.
#[derive(Clone, Debug)]
pub struct OrientedRing {
    pub nodes: Vec<Point>,
    pub dir: Dir,
}

/// Volume and centroid of a polyhedron bounded by `faces`.
///
/// `vertices` are the cell's distinct nodes; their average is the apex of
/// the tetrahedral decomposition.
pub fn polyhedron_volume_centroid(faces: &[OrientedRing], vertices: &[Point]) -> (f64, Point) {
    let apex = average(vertices);
    let (mut volume, mut weighted) = (0.0, ZERO);
    for face in faces {
        let (_, fc) = polygon_area_centroid(&face.nodes);
        for (&p, &q) in face.nodes.iter().circular_tuple_windows() {
            let [p, q] = face.dir.order([p, q]);
            let v = tet_volume(apex, p, q, fc);
            volume += v;
            weighted = add(weighted, scale(add(add(apex, p), add(q, fc)), v / 4.0));
        }
    }
    let centroid = if volume.abs() > EPS {
        scale(weighted, 1.0 / volume)
    } else {
        apex
    };
    (volume, centroid)
}
