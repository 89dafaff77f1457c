//! Per-entity geometric quantities: assembly from the backend and caching.
//!
//! [`GeometrySource`] gathers coordinates for one entity and hands them to
//! the mesh's [`GeometryKernel`]; it backs both the cache build and
//! recompute-mode queries. Boundary-ghost entities short-circuit to zero
//! before any formula runs.

use crate::backend::MeshBackend;
use crate::geometry::kernel::{
    CellGeometry, CellShape, EdgeGeometry, FaceGeometry, FaceShape, GeometryKernel, SideFrame,
    SideGeometry,
};
use crate::geometry::primitives::{OrientedRing, polygon_area_centroid};
use crate::geometry::vector::{Point, ZERO, unit_or_zero};
use crate::lifecycle::stage::Stage;
use crate::mesh_error::MeshSubcellError;
use crate::topology::connectivity::Connectivity;
use crate::topology::corners::CornerTable;
use crate::topology::entity::{EntityId, EntityKind, Ownership};
use crate::topology::ownership::OwnershipTable;
use crate::topology::sides::SideTable;

/// Read-only inputs for geometric formulas.
pub struct GeometrySource<'a, B: MeshBackend + ?Sized> {
    pub backend: &'a B,
    pub conn: &'a Connectivity,
    pub own: &'a OwnershipTable,
    pub kernel: GeometryKernel,
}

impl<B: MeshBackend + ?Sized> GeometrySource<'_, B> {
    fn coords(&self, ids: &[EntityId]) -> Vec<Point> {
        ids.iter().map(|&n| self.backend.node_coordinates(n)).collect()
    }

    fn is_boundary_ghost(&self, kind: EntityKind, id: EntityId) -> bool {
        self.own
            .tags(kind)
            .is_some_and(|t| t.get(id) == Ownership::BoundaryGhost)
    }

    fn cell_shape(&self, c: EntityId) -> CellShape {
        let faces = if self.conn.manifold_dimension() == 3 {
            self.conn
                .cell_faces(c)
                .iter()
                .map(|&(f, dir)| OrientedRing {
                    nodes: self.coords(self.conn.face_nodes(f)),
                    dir,
                })
                .collect()
        } else {
            Vec::new()
        };
        CellShape {
            nodes: self.coords(self.conn.cell_nodes(c)),
            faces,
        }
    }

    pub fn cell(&self, c: EntityId) -> CellGeometry {
        if self.is_boundary_ghost(EntityKind::Cell, c) {
            return CellGeometry::default();
        }
        self.kernel.cell_geometry(&self.cell_shape(c))
    }

    /// Surface meshes: unit normal of the cell's area vector.
    fn cell_normal(&self, c: EntityId) -> Point {
        if !self.kernel.is_surface() {
            return ZERO;
        }
        let (area_vec, _) = polygon_area_centroid(&self.coords(self.conn.cell_nodes(c)));
        unit_or_zero(area_vec)
    }

    pub fn face(&self, f: EntityId) -> FaceGeometry {
        if self.is_boundary_ghost(EntityKind::Face, f) {
            return FaceGeometry::default();
        }
        let cells = self
            .conn
            .face_cells(f)
            .iter()
            .filter_map(|&c| {
                let normal = self.cell_normal(c);
                self.conn.cell_face_dir(c, f).map(|dir| (normal, dir))
            })
            .collect();
        self.kernel.face_geometry(&FaceShape {
            nodes: self.coords(self.conn.face_nodes(f)),
            cells,
        })
    }

    /// `None` when edge connectivity was not cached.
    pub fn edge(&self, e: EntityId) -> Option<EdgeGeometry> {
        let edges = self.conn.edges()?;
        if self.is_boundary_ghost(EntityKind::Edge, e) {
            return Some(EdgeGeometry::default());
        }
        let [a, b] = edges.edge_nodes(e);
        Some(self.kernel.edge_geometry([
            self.backend.node_coordinates(a),
            self.backend.node_coordinates(b),
        ]))
    }

    /// Side geometry given the centroids of its face and cell.
    pub fn side(
        &self,
        sides: &SideTable,
        s: EntityId,
        face_centroid: Point,
        cell_centroid: Point,
    ) -> SideGeometry {
        let c = sides.cell(s);
        if self.own.cell(c) == Ownership::BoundaryGhost {
            return SideGeometry::default();
        }
        let ids = sides.nodes(s);
        let trailing =
            self.conn.manifold_dimension() == 1 && self.conn.cell_nodes(c).get(1) == Some(&ids[0]);
        self.kernel.side_geometry(&SideFrame {
            nodes: ids.map(|n| self.backend.node_coordinates(n)),
            face_centroid,
            cell_centroid,
            cell_normal: self.cell_normal(c),
            trailing,
        })
    }
}

fn missing<T>(slot: &Option<T>, required: Stage, requested: Stage) -> Result<&T, MeshSubcellError> {
    slot.as_ref()
        .ok_or(MeshSubcellError::StageNotCached { required, requested })
}

/// Cached geometric quantities, one optional array per stage.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeometryCache {
    cells: Option<Vec<CellGeometry>>,
    faces: Option<Vec<FaceGeometry>>,
    edges: Option<Vec<EdgeGeometry>>,
    sides: Option<Vec<SideGeometry>>,
    corners: Option<Vec<f64>>,
}

impl GeometryCache {
    pub fn build_cells<B: MeshBackend + ?Sized>(&mut self, src: &GeometrySource<'_, B>) {
        let cells: Vec<_> = (0..src.conn.num_cells()).map(|c| src.cell(c)).collect();
        log::debug!("cell geometry: {} cells", cells.len());
        self.cells = Some(cells);
    }

    pub fn build_faces<B: MeshBackend + ?Sized>(&mut self, src: &GeometrySource<'_, B>) {
        let faces: Vec<_> = (0..src.conn.num_faces()).map(|f| src.face(f)).collect();
        log::debug!("face geometry: {} faces", faces.len());
        self.faces = Some(faces);
    }

    pub fn build_edges<B: MeshBackend + ?Sized>(&mut self, src: &GeometrySource<'_, B>) {
        let n = src.conn.edges().map_or(0, |e| e.num_edges());
        let edges: Vec<_> = (0..n).filter_map(|e| src.edge(e)).collect();
        log::debug!("edge geometry: {} edges", edges.len());
        self.edges = Some(edges);
    }

    /// Needs cached cell and face geometry.
    pub fn build_sides<B: MeshBackend + ?Sized>(
        &mut self,
        src: &GeometrySource<'_, B>,
        sides: &SideTable,
    ) -> Result<(), MeshSubcellError> {
        let cells = missing(&self.cells, Stage::CellGeometry, Stage::SideGeometry)?;
        let faces = missing(&self.faces, Stage::FaceGeometry, Stage::SideGeometry)?;
        let geo: Vec<_> = (0..sides.len())
            .map(|s| {
                let fc = faces[sides.face(s)].centroid;
                let cc = cells[sides.cell(s)].centroid;
                src.side(sides, s, fc, cc)
            })
            .collect();
        log::debug!("side geometry: {} sides", geo.len());
        self.sides = Some(geo);
        Ok(())
    }

    /// Needs cached side geometry.
    pub fn build_corners(
        &mut self,
        kernel: &GeometryKernel,
        corners: &CornerTable,
    ) -> Result<(), MeshSubcellError> {
        let sides = missing(&self.sides, Stage::SideGeometry, Stage::CornerGeometry)?;
        let volumes: Vec<f64> = (0..corners.len())
            .map(|k| {
                let wedge_volumes: Vec<f64> = corners
                    .wedges(k)
                    .iter()
                    .map(|&w| sides[w / 2].wedge(w % 2).volume)
                    .collect();
                kernel.corner_volume(&wedge_volumes)
            })
            .collect();
        log::debug!("corner geometry: {} corners", volumes.len());
        self.corners = Some(volumes);
        Ok(())
    }

    pub fn cells(&self) -> Option<&[CellGeometry]> {
        self.cells.as_deref()
    }

    pub fn faces(&self) -> Option<&[FaceGeometry]> {
        self.faces.as_deref()
    }

    pub fn edges(&self) -> Option<&[EdgeGeometry]> {
        self.edges.as_deref()
    }

    pub fn sides(&self) -> Option<&[SideGeometry]> {
        self.sides.as_deref()
    }

    pub fn corners(&self) -> Option<&[f64]> {
        self.corners.as_deref()
    }
}
