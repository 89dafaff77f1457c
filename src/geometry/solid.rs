//! 3D strategy: polyhedra bounded by polygonal faces.

use super::kernel::{
    CellGeometry, CellShape, FaceGeometry, FaceShape, GeometryStrategy, SideFrame, SideGeometry,
    oriented_normals,
};
use super::primitives::{polygon_area_centroid, polyhedron_volume_centroid};
use super::vector::{cross, midpoint, norm, scale, sub, tet_volume};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SolidGeometry;

impl GeometryStrategy for SolidGeometry {
    fn cell_geometry(&self, cell: &CellShape) -> CellGeometry {
        let (volume, centroid) = polyhedron_volume_centroid(&cell.faces, &cell.nodes);
        CellGeometry { volume, centroid }
    }

    fn face_geometry(&self, face: &FaceShape) -> FaceGeometry {
        let (area_vec, centroid) = polygon_area_centroid(&face.nodes);
        FaceGeometry {
            area: norm(area_vec),
            centroid,
            normals: oriented_normals(area_vec, &face.cells),
        }
    }

    /// Tetrahedron `(n0, n1, face centre, cell centre)`; `(n0, n1, fc)`
    /// faces into the cell, so the volume is positive.
    fn side_geometry(&self, frame: &SideFrame) -> SideGeometry {
        let [n0, n1] = frame.nodes;
        let (fc, cc) = (frame.face_centroid, frame.cell_centroid);
        let ec = midpoint(n0, n1);
        SideGeometry {
            volume: tet_volume(n0, n1, fc, cc),
            outward: scale(cross(sub(n1, n0), sub(fc, n0)), -0.5),
            mid: scale(cross(sub(fc, ec), sub(cc, ec)), 0.5),
        }
    }
}
