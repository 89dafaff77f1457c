//! Geometry strategies, one per manifold dimension.
//!
//! A [`GeometryKernel`] is selected once per mesh from its manifold and space
//! dimensions and then answers every cell, face, edge and side query. The
//! kernels are pure: they see only coordinates handed to them.

use super::line::LineGeometry;
use super::planar::PlanarGeometry;
use super::primitives::OrientedRing;
use super::solid::SolidGeometry;
use super::vector::{Point, ZERO, midpoint, neg, norm, scale, sub};
use crate::backend::{GeometryType, validate_dimensions};
use crate::mesh_error::MeshSubcellError;
use crate::topology::orientation::Dir;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct CellGeometry {
    pub volume: f64,
    pub centroid: Point,
}

/// Face area, centroid and the outward normal seen from each adjoining
/// cell: `normals[0]` for the cell seeing the face with `Dir::POS`,
/// `normals[1]` for the cell seeing it with `Dir::NEG`. A slot with no such
/// cell holds zero.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct FaceGeometry {
    pub area: f64,
    pub centroid: Point,
    pub normals: [Point; 2],
}

impl FaceGeometry {
    /// The face's natural normal, recovered from whichever slot is set.
    pub fn natural_normal(&self) -> Point {
        if self.normals[0] != ZERO {
            self.normals[0]
        } else {
            neg(self.normals[1])
        }
    }

    /// Outward normal w.r.t. a cell seeing the face with `dir`.
    pub fn outward_normal(&self, dir: Dir) -> Point {
        if dir.is_positive() {
            self.normals[0]
        } else {
            self.normals[1]
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct EdgeGeometry {
    pub length: f64,
    /// `n1 - n0`.
    pub vector: Point,
    pub centroid: Point,
}

impl EdgeGeometry {
    /// Trivial for every dimension: a segment between two points.
    pub fn from_ends([a, b]: [Point; 2]) -> Self {
        let vector = sub(b, a);
        Self {
            length: norm(vector),
            vector,
            centroid: midpoint(a, b),
        }
    }
}

/// Signed side volume with its outward facet normal (towards the
/// neighbouring cell) and mid facet normal (from wedge 0 towards wedge 1).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SideGeometry {
    pub volume: f64,
    pub outward: Point,
    pub mid: Point,
}

impl SideGeometry {
    /// Geometry of wedge `2s + parity`.
    pub fn wedge(&self, parity: usize) -> WedgeGeometry {
        let mid = if parity % 2 == 0 {
            self.mid
        } else {
            neg(self.mid)
        };
        WedgeGeometry {
            volume: 0.5 * self.volume,
            facets: [scale(self.outward, 0.5), mid],
        }
    }
}

/// Half a side: `facets[0]` lies on the cell face, `facets[1]` on the
/// boundary with the sibling wedge, both pointing out of this wedge.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct WedgeGeometry {
    pub volume: f64,
    pub facets: [Point; 2],
}

/// Everything a strategy needs to measure one side.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SideFrame {
    pub nodes: [Point; 2],
    pub face_centroid: Point,
    pub cell_centroid: Point,
    /// Surface meshes only: unit normal of the cell's area vector. Sides
    /// are measured against it, so a side turning against a non-convex cell
    /// gets a negative volume. Zero elsewhere.
    pub cell_normal: Point,
    /// 1D only: the side sits at the cell's second node.
    pub trailing: bool,
}

/// Raw shape of a cell handed to [`GeometryStrategy::cell_geometry`].
#[derive(Clone, Debug)]
pub struct CellShape {
    /// Cell nodes: `[n0, n1]` in 1D, the counter-clockwise loop in 2D,
    /// distinct nodes in 3D.
    pub nodes: Vec<Point>,
    /// 3D only: bounding faces with the cell's view of them.
    pub faces: Vec<OrientedRing>,
}

/// Raw shape of a face handed to [`GeometryStrategy::face_geometry`].
#[derive(Clone, Debug)]
pub struct FaceShape {
    pub nodes: Vec<Point>,
    /// Each adjoining cell's view of the face, with the cell's unit area
    /// normal on surface meshes (zero elsewhere).
    pub cells: Vec<(Point, Dir)>,
}

/// The capability set every manifold dimension implements.
pub trait GeometryStrategy {
    fn cell_geometry(&self, cell: &CellShape) -> CellGeometry;
    fn face_geometry(&self, face: &FaceShape) -> FaceGeometry;
    fn side_geometry(&self, frame: &SideFrame) -> SideGeometry;

    fn edge_geometry(&self, ends: [Point; 2]) -> EdgeGeometry {
        EdgeGeometry::from_ends(ends)
    }

    /// Corners are unions of wedges.
    fn corner_volume(&self, wedge_volumes: &[f64]) -> f64 {
        wedge_volumes.iter().sum()
    }
}

/// Fill the normal slots of a face whose natural normal is `natural`.
pub(crate) fn oriented_normals(natural: Point, cells: &[(Point, Dir)]) -> [Point; 2] {
    let mut normals = [ZERO; 2];
    for &(_, dir) in cells {
        if dir.is_positive() {
            normals[0] = natural;
        } else {
            normals[1] = neg(natural);
        }
    }
    normals
}

/// The closed set of strategies.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum GeometryKernel {
    Line(LineGeometry),
    Planar(PlanarGeometry),
    Solid(SolidGeometry),
}

impl GeometryKernel {
    pub fn select(
        manifold: usize,
        space: usize,
        geometry: GeometryType,
    ) -> Result<Self, MeshSubcellError> {
        validate_dimensions(manifold, space)?;
        Ok(match manifold {
            1 => GeometryKernel::Line(LineGeometry {
                spherical: geometry == GeometryType::Spherical,
            }),
            2 => GeometryKernel::Planar(PlanarGeometry { surface: space == 3 }),
            _ => GeometryKernel::Solid(SolidGeometry),
        })
    }

    fn strategy(&self) -> &dyn GeometryStrategy {
        match self {
            GeometryKernel::Line(k) => k,
            GeometryKernel::Planar(k) => k,
            GeometryKernel::Solid(k) => k,
        }
    }

    /// True for 2D cells embedded in 3D space.
    pub fn is_surface(&self) -> bool {
        matches!(self, GeometryKernel::Planar(PlanarGeometry { surface: true }))
    }

    pub fn cell_geometry(&self, cell: &CellShape) -> CellGeometry {
        self.strategy().cell_geometry(cell)
    }

    pub fn face_geometry(&self, face: &FaceShape) -> FaceGeometry {
        self.strategy().face_geometry(face)
    }

    pub fn edge_geometry(&self, ends: [Point; 2]) -> EdgeGeometry {
        self.strategy().edge_geometry(ends)
    }

    pub fn side_geometry(&self, frame: &SideFrame) -> SideGeometry {
        self.strategy().side_geometry(frame)
    }

    pub fn corner_volume(&self, wedge_volumes: &[f64]) -> f64 {
        self.strategy().corner_volume(wedge_volumes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wedges_halve_sides() {
        let side = SideGeometry {
            volume: 0.25,
            outward: [0.0, -1.0, 0.0],
            mid: [0.5, 0.0, 0.0],
        };
        let (w0, w1) = (side.wedge(0), side.wedge(1));
        assert_eq!(w0.volume + w1.volume, side.volume);
        assert_eq!(w0.facets[0], [0.0, -0.5, 0.0]);
        assert_eq!(w0.facets[1], [0.5, 0.0, 0.0]);
        assert_eq!(w1.facets[1], [-0.5, 0.0, 0.0]);
    }

    #[test]
    fn kernel_selection() {
        assert!(matches!(
            GeometryKernel::select(1, 1, GeometryType::Spherical),
            Ok(GeometryKernel::Line(LineGeometry { spherical: true }))
        ));
        assert!(GeometryKernel::select(2, 3, GeometryType::Cartesian)
            .unwrap()
            .is_surface());
        assert!(GeometryKernel::select(4, 4, GeometryType::Cartesian).is_err());
    }

    #[test]
    fn natural_normal_falls_back_to_second_slot() {
        let f = FaceGeometry {
            area: 1.0,
            centroid: ZERO,
            normals: [ZERO, [0.0, 0.0, -1.0]],
        };
        assert_eq!(f.natural_normal(), [0.0, 0.0, 1.0]);
        assert_eq!(f.outward_normal(Dir::NEG), [0.0, 0.0, -1.0]);
    }
}
