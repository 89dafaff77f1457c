//! 1D strategy: segments, optionally read as spherical shells.

use std::f64::consts::PI;

use super::kernel::{
    CellGeometry, CellShape, FaceGeometry, FaceShape, GeometryStrategy, SideFrame, SideGeometry,
    oriented_normals,
};
use super::vector::{Point, ZERO, dot, midpoint, norm, scale, sub, unit_or_zero};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LineGeometry {
    pub spherical: bool,
}

impl LineGeometry {
    /// Area of the face at `p`: unity, or the sphere of radius |p|.
    pub fn face_area(&self, p: Point) -> f64 {
        if self.spherical {
            let r = norm(p);
            4.0 * PI * r * r
        } else {
            1.0
        }
    }

    fn shell(r0: f64, r1: f64) -> f64 {
        4.0 / 3.0 * PI * (r1 * r1 * r1 - r0 * r0 * r0)
    }
}

impl GeometryStrategy for LineGeometry {
    fn cell_geometry(&self, cell: &CellShape) -> CellGeometry {
        let [a, b] = match cell.nodes.as_slice() {
            &[a, b] => [a, b],
            _ => return CellGeometry::default(),
        };
        let volume = if self.spherical {
            LineGeometry::shell(norm(a), norm(b)).abs()
        } else {
            norm(sub(b, a))
        };
        CellGeometry {
            volume,
            centroid: midpoint(a, b),
        }
    }

    fn face_geometry(&self, face: &FaceShape) -> FaceGeometry {
        let p = face.nodes.first().copied().unwrap_or(ZERO);
        let area = self.face_area(p);
        FaceGeometry {
            area,
            centroid: p,
            normals: oriented_normals([area, 0.0, 0.0], &face.cells),
        }
    }

    fn side_geometry(&self, frame: &SideFrame) -> SideGeometry {
        let node = frame.nodes[0];
        let cc = frame.cell_centroid;
        // unit vector from the cell's first node to its second
        let axis = if frame.trailing {
            unit_or_zero(sub(node, cc))
        } else {
            unit_or_zero(sub(cc, node))
        };
        let mut volume = if self.spherical {
            LineGeometry::shell(norm(node), norm(cc)) * axis[0].signum()
        } else {
            dot(sub(cc, node), axis)
        };
        let mut outward = scale(axis, -self.face_area(node));
        if frame.trailing {
            volume = -volume;
            outward = scale(outward, -1.0);
        }
        if axis == ZERO {
            volume = 0.0;
        }
        SideGeometry {
            volume,
            outward,
            mid: ZERO,
        }
    }
}
