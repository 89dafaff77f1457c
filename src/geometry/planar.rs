//! 2D strategy: polygons in the plane, or embedded in 3D space.
//!
//! In the plane, areas are signed (counter-clockwise positive) and in-plane
//! normals are clockwise rotations about `+z`. On a surface mesh, cell areas
//! are unsigned; sides are signed against the cell's own unit normal and
//! rotations are taken about it.

use super::kernel::{
    CellGeometry, CellShape, FaceGeometry, FaceShape, GeometryStrategy, SideFrame, SideGeometry,
    oriented_normals,
};
use super::primitives::polygon_area_centroid;
use super::vector::{Point, ZERO, cross, dot, midpoint, norm, scale, sub, unit_or_zero};

const Z: Point = [0.0, 0.0, 1.0];

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PlanarGeometry {
    /// Cells live in 3D space.
    pub surface: bool,
}

impl GeometryStrategy for PlanarGeometry {
    fn cell_geometry(&self, cell: &CellShape) -> CellGeometry {
        let (area_vec, centroid) = polygon_area_centroid(&cell.nodes);
        let volume = if self.surface {
            norm(area_vec)
        } else {
            area_vec[2]
        };
        CellGeometry { volume, centroid }
    }

    fn face_geometry(&self, face: &FaceShape) -> FaceGeometry {
        let [e0, e1] = match face.nodes.as_slice() {
            &[a, b] => [a, b],
            _ => return FaceGeometry::default(),
        };
        let evec = sub(e1, e0);
        let area = norm(evec);
        let centroid = midpoint(e0, e1);

        let normals = if self.surface {
            // the cell walks the edge along `dir`; its right side is outward
            let mut normals = [ZERO; 2];
            for &(cell_normal, dir) in &face.cells {
                let walk = if dir.is_positive() { evec } else { scale(evec, -1.0) };
                let n = cross(walk, cell_normal);
                normals[usize::from(!dir.is_positive())] = scale(unit_or_zero(n), area);
            }
            normals
        } else {
            oriented_normals(cross(evec, Z), &face.cells)
        };
        FaceGeometry {
            area,
            centroid,
            normals,
        }
    }

    fn side_geometry(&self, frame: &SideFrame) -> SideGeometry {
        let [n0, n1] = frame.nodes;
        let cc = frame.cell_centroid;
        let edge = sub(n1, n0);
        let tri = cross(edge, sub(cc, n0));
        let up = if self.surface { frame.cell_normal } else { Z };
        let volume = 0.5 * dot(tri, up);
        let ec = midpoint(n0, n1);
        SideGeometry {
            volume,
            outward: cross(edge, up),
            mid: cross(sub(cc, ec), up),
        }
    }
}
