//! Geometric accessors in cached or recompute mode.
//!
//! In [`Mode::Cached`] a query reads the value stored by the matching
//! geometry stage and fails with `StageNotCached` if that stage has not run.
//! In [`Mode::Recompute`] the value is computed again from the backend's
//! current coordinates, dependent centroids included, without touching the
//! cache. Recompute calls are pure and may run concurrently.

use crate::backend::MeshBackend;
use crate::geometry::kernel::{
    CellGeometry, EdgeGeometry, FaceGeometry, SideGeometry, WedgeGeometry,
};
use crate::geometry::quantities::GeometrySource;
use crate::geometry::vector::{Point, dot, midpoint, neg, sub};
use crate::lifecycle::stage::Stage;
use crate::lifecycle::view::MeshView;
use crate::mesh_error::MeshSubcellError;
use crate::topology::entity::{EntityId, EntityKind};
use crate::topology::orientation::Dir;
use crate::topology::sides::SideTable;
use crate::topology::wedges::{wedge_node, wedge_side};

#[cfg(feature = "rayon")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};

/// Whether a geometric accessor reads the cache or recomputes.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Mode {
    #[default]
    Cached,
    Recompute,
}

pub struct GeometryView<'a, B: MeshBackend + ?Sized> {
    mesh: MeshView<'a, B>,
}

impl<B: MeshBackend + ?Sized> Clone for GeometryView<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: MeshBackend + ?Sized> Copy for GeometryView<'_, B> {}

fn cached_slot<T: Copy>(
    slot: Option<&[T]>,
    id: EntityId,
    stage: Stage,
) -> Result<T, MeshSubcellError> {
    slot.map(|values| values[id])
        .ok_or(MeshSubcellError::StageNotCached {
            required: stage,
            requested: stage,
        })
}

impl<'a, B: MeshBackend + ?Sized> GeometryView<'a, B> {
    pub(crate) fn new(mesh: MeshView<'a, B>) -> Self {
        Self { mesh }
    }

    fn source(&self) -> Result<GeometrySource<'a, B>, MeshSubcellError> {
        self.mesh.cache().source(self.mesh.backend())
    }

    fn require_kind(&self, kind: EntityKind) -> Result<(), MeshSubcellError> {
        if self.mesh.config().requests(kind) {
            Ok(())
        } else {
            Err(MeshSubcellError::KindNotRequested(kind))
        }
    }

    fn side_table(&self) -> Result<&'a SideTable, MeshSubcellError> {
        self.require_kind(EntityKind::Side)?;
        self.mesh.cache().sides()
    }

    fn coords(&self, n: EntityId) -> Point {
        self.mesh.backend().node_coordinates(n)
    }

    // === Cells ===

    pub fn cell_geometry(&self, c: EntityId, mode: Mode) -> Result<CellGeometry, MeshSubcellError> {
        match mode {
            Mode::Cached => cached_slot(self.mesh.cache().geometry().cells(), c, Stage::CellGeometry),
            Mode::Recompute => Ok(self.source()?.cell(c)),
        }
    }

    pub fn cell_volume(&self, c: EntityId, mode: Mode) -> Result<f64, MeshSubcellError> {
        Ok(self.cell_geometry(c, mode)?.volume)
    }

    pub fn cell_centroid(&self, c: EntityId, mode: Mode) -> Result<Point, MeshSubcellError> {
        Ok(self.cell_geometry(c, mode)?.centroid)
    }

    // === Faces ===

    pub fn face_geometry(&self, f: EntityId, mode: Mode) -> Result<FaceGeometry, MeshSubcellError> {
        self.require_kind(EntityKind::Face)?;
        match mode {
            Mode::Cached => cached_slot(self.mesh.cache().geometry().faces(), f, Stage::FaceGeometry),
            Mode::Recompute => Ok(self.source()?.face(f)),
        }
    }

    pub fn face_area(&self, f: EntityId, mode: Mode) -> Result<f64, MeshSubcellError> {
        Ok(self.face_geometry(f, mode)?.area)
    }

    pub fn face_centroid(&self, f: EntityId, mode: Mode) -> Result<Point, MeshSubcellError> {
        Ok(self.face_geometry(f, mode)?.centroid)
    }

    /// With no cell: the natural normal and `Dir::POS`. With a cell: the
    /// normal pointing out of that cell and the cell's view of the face.
    pub fn face_normal(
        &self,
        f: EntityId,
        mode: Mode,
        cell: Option<EntityId>,
    ) -> Result<(Point, Dir), MeshSubcellError> {
        let geo = self.face_geometry(f, mode)?;
        let Some(c) = cell else {
            return Ok((geo.natural_normal(), Dir::POS));
        };
        let dir = self
            .mesh
            .cache()
            .connectivity()?
            .cell_face_dir(c, f)
            .ok_or_else(|| {
                MeshSubcellError::TopologyInconsistency(format!("face {f} does not bound cell {c}"))
            })?;
        Ok((geo.outward_normal(dir), dir))
    }

    // === Edges ===

    pub fn edge_geometry(&self, e: EntityId, mode: Mode) -> Result<EdgeGeometry, MeshSubcellError> {
        self.require_kind(EntityKind::Edge)?;
        match mode {
            Mode::Cached => cached_slot(self.mesh.cache().geometry().edges(), e, Stage::EdgeGeometry),
            Mode::Recompute => self
                .source()?
                .edge(e)
                .ok_or(MeshSubcellError::KindNotRequested(EntityKind::Edge)),
        }
    }

    pub fn edge_length(&self, e: EntityId, mode: Mode) -> Result<f64, MeshSubcellError> {
        Ok(self.edge_geometry(e, mode)?.length)
    }

    pub fn edge_centroid(&self, e: EntityId, mode: Mode) -> Result<Point, MeshSubcellError> {
        Ok(self.edge_geometry(e, mode)?.centroid)
    }

    /// The natural vector `n1 - n0`, or with `node` the vector pointing away
    /// from that node together with its direction relative to the edge.
    pub fn edge_vector(
        &self,
        e: EntityId,
        mode: Mode,
        node: Option<EntityId>,
    ) -> Result<(Point, Dir), MeshSubcellError> {
        let vector = self.edge_geometry(e, mode)?.vector;
        let Some(n) = node else {
            return Ok((vector, Dir::POS));
        };
        let [n0, n1] = self.mesh.connectivity()?.edge_nodes(e)?;
        if n == n0 {
            Ok((vector, Dir::POS))
        } else if n == n1 {
            Ok((neg(vector), Dir::NEG))
        } else {
            Err(MeshSubcellError::TopologyInconsistency(format!(
                "node {n} is not an end of edge {e}"
            )))
        }
    }

    // === Sides ===

    pub fn side_geometry(&self, s: EntityId, mode: Mode) -> Result<SideGeometry, MeshSubcellError> {
        let sides = self.side_table()?;
        match mode {
            Mode::Cached => cached_slot(self.mesh.cache().geometry().sides(), s, Stage::SideGeometry),
            Mode::Recompute => {
                let src = self.source()?;
                let fc = src.face(sides.face(s)).centroid;
                let cc = src.cell(sides.cell(s)).centroid;
                Ok(src.side(sides, s, fc, cc))
            }
        }
    }

    pub fn side_volume(&self, s: EntityId, mode: Mode) -> Result<f64, MeshSubcellError> {
        Ok(self.side_geometry(s, mode)?.volume)
    }

    pub fn side_outward_facet_normal(&self, s: EntityId, mode: Mode) -> Result<Point, MeshSubcellError> {
        Ok(self.side_geometry(s, mode)?.outward)
    }

    pub fn side_mid_facet_normal(&self, s: EntityId, mode: Mode) -> Result<Point, MeshSubcellError> {
        Ok(self.side_geometry(s, mode)?.mid)
    }

    // === Wedges ===

    pub fn wedge_geometry(&self, w: EntityId, mode: Mode) -> Result<WedgeGeometry, MeshSubcellError> {
        self.require_kind(EntityKind::Wedge)?;
        self.mesh.cache().wedges()?;
        Ok(self.side_geometry(wedge_side(w), mode)?.wedge(w % 2))
    }

    pub fn wedge_volume(&self, w: EntityId, mode: Mode) -> Result<f64, MeshSubcellError> {
        Ok(self.wedge_geometry(w, mode)?.volume)
    }

    /// `[face facet, mid facet]`, both pointing out of the wedge.
    pub fn wedge_facet_normals(&self, w: EntityId, mode: Mode) -> Result<[Point; 2], MeshSubcellError> {
        Ok(self.wedge_geometry(w, mode)?.facets)
    }

    // === Corners ===

    pub fn corner_volume(&self, k: EntityId, mode: Mode) -> Result<f64, MeshSubcellError> {
        self.require_kind(EntityKind::Corner)?;
        let corners = self.mesh.cache().corners()?;
        match mode {
            Mode::Cached => cached_slot(
                self.mesh.cache().geometry().corners(),
                k,
                Stage::CornerGeometry,
            ),
            Mode::Recompute => {
                let volumes = corners
                    .wedges(k)
                    .iter()
                    .map(|&w| self.wedge_volume(w, mode))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(self.mesh.cache().kernel().corner_volume(&volumes))
            }
        }
    }

    // === Sub-cell coordinates ===

    /// Centres a side's shape is built from: `(face, cell)`.
    fn side_centres(
        &self,
        sides: &SideTable,
        s: EntityId,
        mode: Mode,
    ) -> Result<(Point, Point), MeshSubcellError> {
        let fc = self.face_centroid(sides.face(s), mode)?;
        let cc = self.cell_centroid(sides.cell(s), mode)?;
        Ok((fc, cc))
    }

    /// 1D: projection of `to - from` on the axis of side `s`'s cell.
    fn along_axis(
        &self,
        sides: &SideTable,
        s: EntityId,
        from: Point,
        to: Point,
    ) -> Result<f64, MeshSubcellError> {
        let c = sides.cell(s);
        let nodes = self.mesh.cache().connectivity()?.cell_nodes(c);
        let axis = sub(self.coords(nodes[1]), self.coords(nodes[0]));
        Ok(dot(sub(to, from), axis))
    }

    /// Vertices of side `s`: `[n, cc]` in 1D, `[n0, n1, cc]` in 2D and
    /// `[n0, n1, fc, cc]` in 3D. With `posvol_order` the vertices are
    /// ordered so that their simplex has non-negative signed volume.
    pub fn side_coordinates(
        &self,
        s: EntityId,
        posvol_order: bool,
        mode: Mode,
    ) -> Result<Vec<Point>, MeshSubcellError> {
        let sides = self.side_table()?;
        let [n0, n1] = sides.nodes(s).map(|n| self.coords(n));
        let (fc, cc) = self.side_centres(sides, s, mode)?;
        Ok(match self.mesh.manifold_dimension() {
            1 => {
                if posvol_order && self.along_axis(sides, s, n0, cc)? < 0.0 {
                    vec![cc, n0]
                } else {
                    vec![n0, cc]
                }
            }
            2 => vec![n0, n1, cc],
            _ => vec![n0, n1, fc, cc],
        })
    }

    /// Vertices of wedge `w`: `[n, cc]` in 1D, `[n, fc, cc]` in 2D and
    /// `[n, ec, fc, cc]` in 3D.
    pub fn wedge_coordinates(
        &self,
        w: EntityId,
        posvol_order: bool,
        mode: Mode,
    ) -> Result<Vec<Point>, MeshSubcellError> {
        self.require_kind(EntityKind::Wedge)?;
        let sides = self.side_table()?;
        let s = wedge_side(w);
        let node = self.coords(wedge_node(sides, w));
        let (fc, cc) = self.side_centres(sides, s, mode)?;
        let odd = posvol_order && w % 2 == 1;
        Ok(match self.mesh.manifold_dimension() {
            1 => {
                if posvol_order && self.along_axis(sides, s, node, cc)? < 0.0 {
                    vec![cc, node]
                } else {
                    vec![node, cc]
                }
            }
            2 => {
                if odd {
                    vec![node, cc, fc]
                } else {
                    vec![node, fc, cc]
                }
            }
            _ => {
                let [n0, n1] = sides.nodes(s).map(|n| self.coords(n));
                let ec = midpoint(n0, n1);
                if odd {
                    vec![node, fc, ec, cc]
                } else {
                    vec![node, ec, fc, cc]
                }
            }
        })
    }

    /// Wedges of corner `k`, even ones first.
    fn ordered_corner_wedges(&self, k: EntityId) -> Result<Vec<EntityId>, MeshSubcellError> {
        self.require_kind(EntityKind::Corner)?;
        let mut wedges = self.mesh.cache().corners()?.wedges(k).to_vec();
        wedges.sort_by_key(|w| w % 2);
        Ok(wedges)
    }

    /// 1D: `[node, cc]`. 2D: the counter-clockwise quadrilateral
    /// `[node, fc0, cc, fc1]`. Not defined for 3D corners.
    pub fn corner_coordinates(&self, k: EntityId, mode: Mode) -> Result<Vec<Point>, MeshSubcellError> {
        let wedges = self.ordered_corner_wedges(k)?;
        let corners = self.mesh.cache().corners()?;
        let node = self.coords(corners.node(k));
        let cc = self.cell_centroid(corners.cell(k), mode)?;
        match self.mesh.manifold_dimension() {
            1 => Ok(vec![node, cc]),
            2 => {
                let sides = self.side_table()?;
                let [w0, w1] = [wedges[0], wedges[wedges.len() - 1]];
                let fc0 = self.face_centroid(sides.face(wedge_side(w0)), mode)?;
                let fc1 = self.face_centroid(sides.face(wedge_side(w1)), mode)?;
                Ok(vec![node, fc0, cc, fc1])
            }
            manifold => Err(MeshSubcellError::UnsupportedDimensions {
                manifold,
                space: self.mesh.space_dimension(),
            }),
        }
    }

    /// Facets bounding corner `k`, oriented out of the corner. `N` must
    /// equal the manifold dimension: points in 1D, segments in 2D,
    /// triangles in 3D. Facets shared by two wedges of the same corner are
    /// interior and left out.
    pub fn corner_facetization<const N: usize>(
        &self,
        k: EntityId,
        mode: Mode,
    ) -> Result<Vec<[Point; N]>, MeshSubcellError> {
        let manifold = self.mesh.manifold_dimension();
        if N != manifold {
            return Err(MeshSubcellError::FacetArity {
                requested: N,
                manifold,
            });
        }
        let wedges = self.ordered_corner_wedges(k)?;
        let corners = self.mesh.cache().corners()?;
        let node = self.coords(corners.node(k));
        let cc = self.cell_centroid(corners.cell(k), mode)?;
        if manifold == 1 {
            return Self::facets(vec![vec![node], vec![cc]]);
        }

        let sides = self.side_table()?;
        let mut facets = Vec::with_capacity(2 * wedges.len());
        for w in wedges {
            let s = wedge_side(w);
            let [n0, n1] = sides.nodes(s).map(|n| self.coords(n));
            let ec = midpoint(n0, n1);
            let even = w % 2 == 0;
            if manifold == 2 {
                if even {
                    facets.push(vec![node, ec]);
                    facets.push(vec![ec, cc]);
                } else {
                    facets.push(vec![cc, ec]);
                    facets.push(vec![ec, node]);
                }
            } else {
                let fc = self.face_centroid(sides.face(s), mode)?;
                if even {
                    facets.push(vec![node, fc, ec]);
                    facets.push(vec![ec, fc, cc]);
                } else {
                    facets.push(vec![node, ec, fc]);
                    facets.push(vec![ec, cc, fc]);
                }
            }
        }
        Self::facets(facets)
    }

    fn facets<const N: usize>(facets: Vec<Vec<Point>>) -> Result<Vec<[Point; N]>, MeshSubcellError> {
        facets
            .into_iter()
            .map(|f| {
                let len = f.len();
                <[Point; N]>::try_from(f).map_err(|_| MeshSubcellError::FacetArity {
                    requested: N,
                    manifold: len,
                })
            })
            .collect()
    }

    // === Sweeps ===

    pub fn cell_volumes(&self, mode: Mode) -> Result<Vec<f64>, MeshSubcellError> {
        let n = self.mesh.cache().connectivity()?.num_cells();
        (0..n).map(|c| self.cell_volume(c, mode)).collect()
    }

    pub fn side_volumes(&self, mode: Mode) -> Result<Vec<f64>, MeshSubcellError> {
        let n = self.side_table()?.len();
        (0..n).map(|s| self.side_volume(s, mode)).collect()
    }

    pub fn corner_volumes(&self, mode: Mode) -> Result<Vec<f64>, MeshSubcellError> {
        self.require_kind(EntityKind::Corner)?;
        let n = self.mesh.cache().corners()?.len();
        (0..n).map(|k| self.corner_volume(k, mode)).collect()
    }
}

#[cfg(feature = "rayon")]
impl<B: MeshBackend + Sync + ?Sized> GeometryView<'_, B> {
    pub fn par_cell_volumes(&self, mode: Mode) -> Result<Vec<f64>, MeshSubcellError> {
        let n = self.mesh.cache().connectivity()?.num_cells();
        (0..n).into_par_iter().map(|c| self.cell_volume(c, mode)).collect()
    }

    pub fn par_side_volumes(&self, mode: Mode) -> Result<Vec<f64>, MeshSubcellError> {
        let n = self.side_table()?.len();
        (0..n).into_par_iter().map(|s| self.side_volume(s, mode)).collect()
    }

    pub fn par_corner_volumes(&self, mode: Mode) -> Result<Vec<f64>, MeshSubcellError> {
        self.require_kind(EntityKind::Corner)?;
        let n = self.mesh.cache().corners()?.len();
        (0..n).into_par_iter().map(|k| self.corner_volume(k, mode)).collect()
    }
}
