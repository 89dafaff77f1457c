//! Read-only views over a backend and its derived cache.
//!
//! [`MeshView`] pairs the immutable primary mesh with a built
//! [`DerivedCache`]. Handles for connectivity, sides, wedges and corners are
//! acquired fallibly (the kind must be requested and its stage cached);
//! once acquired their queries are infallible and panic only on
//! out-of-range ids.

use std::ops::Range;

use crate::backend::{GeometryType, MeshBackend};
use crate::lifecycle::config::MeshConfig;
use crate::lifecycle::derived::DerivedCache;
use crate::lifecycle::geometry_view::GeometryView;
use crate::mesh_error::MeshSubcellError;
use crate::topology::connectivity::{Connectivity, EdgeConnectivity};
use crate::topology::corners::CornerTable;
use crate::topology::entity::{EntityCounts, EntityId, EntityKind, Filter, Ownership};
use crate::topology::orientation::Dir;
use crate::topology::ownership::OwnershipTable;
use crate::topology::sides::SideTable;
use crate::topology::wedges::{WedgeTable, side_wedges, wedge_node, wedge_side};

pub struct MeshView<'a, B: MeshBackend + ?Sized> {
    backend: &'a B,
    cache: &'a DerivedCache,
}

impl<B: MeshBackend + ?Sized> Clone for MeshView<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: MeshBackend + ?Sized> Copy for MeshView<'_, B> {}

impl<'a, B: MeshBackend + ?Sized> MeshView<'a, B> {
    pub fn new(backend: &'a B, cache: &'a DerivedCache) -> Self {
        Self { backend, cache }
    }

    pub fn backend(&self) -> &'a B {
        self.backend
    }

    pub fn cache(&self) -> &'a DerivedCache {
        self.cache
    }

    pub fn manifold_dimension(&self) -> usize {
        self.cache.manifold_dimension()
    }

    pub fn space_dimension(&self) -> usize {
        self.cache.space_dimension()
    }

    pub fn geometry_type(&self) -> GeometryType {
        self.cache.geometry_type()
    }

    pub fn config(&self) -> MeshConfig {
        self.cache.config()
    }

    fn require_kind(&self, kind: EntityKind) -> Result<(), MeshSubcellError> {
        if self.config().requests(kind) {
            Ok(())
        } else {
            Err(MeshSubcellError::KindNotRequested(kind))
        }
    }

    /// Owned/ghost/boundary-ghost counts of `kind`.
    pub fn counts(&self, kind: EntityKind) -> Result<EntityCounts, MeshSubcellError> {
        self.require_kind(kind)?;
        match kind {
            EntityKind::Side => Ok(self.cache.sides()?.counts()),
            EntityKind::Wedge => Ok(self.cache.wedges()?.counts()),
            EntityKind::Corner => Ok(self.cache.corners()?.counts()),
            primary => Ok(self
                .cache
                .ownership()?
                .tags(primary)
                .map(|t| t.counts())
                .unwrap_or_default()),
        }
    }

    pub fn count(&self, kind: EntityKind, filter: Filter) -> Result<usize, MeshSubcellError> {
        Ok(self.counts(kind)?.count(filter))
    }

    /// Contiguous id range of the `filter` subset of `kind`.
    pub fn entities(
        &self,
        kind: EntityKind,
        filter: Filter,
    ) -> Result<Range<EntityId>, MeshSubcellError> {
        Ok(self.counts(kind)?.range(filter))
    }

    /// Ownership of any entity; derived kinds inherit their cell's tag.
    ///
    /// # Panics
    /// Panics if `id` is out of range for `kind`.
    pub fn ownership(&self, kind: EntityKind, id: EntityId) -> Result<Ownership, MeshSubcellError> {
        self.require_kind(kind)?;
        let own = self.cache.ownership()?;
        let cell = match kind {
            EntityKind::Side => self.cache.sides()?.cell(id),
            EntityKind::Wedge => {
                self.cache.wedges()?;
                self.cache.sides()?.cell(wedge_side(id))
            }
            EntityKind::Corner => self.cache.corners()?.cell(id),
            primary => {
                return own
                    .tags(primary)
                    .map(|t| t.get(id))
                    .ok_or(MeshSubcellError::KindNotRequested(primary));
            }
        };
        Ok(own.cell(cell))
    }

    pub fn connectivity(&self) -> Result<ConnectivityView<'a>, MeshSubcellError> {
        Ok(ConnectivityView {
            conn: self.cache.connectivity()?,
            own: self.cache.ownership()?,
            config: self.config(),
        })
    }

    pub fn sides(&self) -> Result<SideView<'a>, MeshSubcellError> {
        self.require_kind(EntityKind::Side)?;
        Ok(SideView {
            sides: self.cache.sides()?,
        })
    }

    pub fn wedges(&self) -> Result<WedgeView<'a>, MeshSubcellError> {
        self.require_kind(EntityKind::Wedge)?;
        Ok(WedgeView {
            sides: self.cache.sides()?,
            wedges: self.cache.wedges()?,
            cache: self.cache,
            own: self.cache.ownership()?,
        })
    }

    pub fn corners(&self) -> Result<CornerView<'a>, MeshSubcellError> {
        self.require_kind(EntityKind::Corner)?;
        Ok(CornerView {
            corners: self.cache.corners()?,
            own: self.cache.ownership()?,
        })
    }

    /// Geometric quantities, cached or recomputed per call.
    pub fn geometry(&self) -> Result<GeometryView<'a, B>, MeshSubcellError> {
        self.cache.connectivity()?;
        self.cache.ownership()?;
        Ok(GeometryView::new(*self))
    }
}

/// Cached primary adjacency.
#[derive(Copy, Clone)]
pub struct ConnectivityView<'a> {
    conn: &'a Connectivity,
    own: &'a OwnershipTable,
    config: MeshConfig,
}

impl<'a> ConnectivityView<'a> {
    fn faces(&self) -> Result<&'a Connectivity, MeshSubcellError> {
        if self.config.faces {
            Ok(self.conn)
        } else {
            Err(MeshSubcellError::KindNotRequested(EntityKind::Face))
        }
    }

    fn edges(&self) -> Result<&'a EdgeConnectivity, MeshSubcellError> {
        self.conn
            .edges()
            .ok_or(MeshSubcellError::KindNotRequested(EntityKind::Edge))
    }

    fn admitted(&self, kind: EntityKind, ids: &[EntityId], filter: Filter) -> Vec<EntityId> {
        let tags = self.own.tags(kind);
        ids.iter()
            .copied()
            .filter(|&id| tags.is_some_and(|t| filter.admits(t.get(id))))
            .collect()
    }

    pub fn cell_nodes(&self, c: EntityId) -> &'a [EntityId] {
        self.conn.cell_nodes(c)
    }

    pub fn cell_faces_and_dirs(&self, c: EntityId) -> Result<&'a [(EntityId, Dir)], MeshSubcellError> {
        Ok(self.faces()?.cell_faces(c))
    }

    pub fn cell_faces(&self, c: EntityId) -> Result<Vec<EntityId>, MeshSubcellError> {
        Ok(self.cell_faces_and_dirs(c)?.iter().map(|&(f, _)| f).collect())
    }

    pub fn cell_num_faces(&self, c: EntityId) -> Result<usize, MeshSubcellError> {
        Ok(self.faces()?.cell_num_faces(c))
    }

    /// Cells adjoining `f` that pass `filter`.
    pub fn face_cells(&self, f: EntityId, filter: Filter) -> Result<Vec<EntityId>, MeshSubcellError> {
        let cells = self.faces()?.face_cells(f);
        Ok(self.admitted(EntityKind::Cell, cells, filter))
    }

    pub fn face_nodes(&self, f: EntityId) -> Result<&'a [EntityId], MeshSubcellError> {
        Ok(self.faces()?.face_nodes(f))
    }

    /// Neighbours of `c` across its faces that pass `filter`, in face order.
    pub fn cell_face_adj_cells(
        &self,
        c: EntityId,
        filter: Filter,
    ) -> Result<Vec<EntityId>, MeshSubcellError> {
        let conn = self.faces()?;
        let nbrs: Vec<EntityId> = conn
            .cell_faces(c)
            .iter()
            .filter_map(|&(f, _)| conn.face_neighbor(f, c))
            .collect();
        Ok(self.admitted(EntityKind::Cell, &nbrs, filter))
    }

    pub fn face_edges_and_dirs(&self, f: EntityId) -> Result<&'a [(EntityId, Dir)], MeshSubcellError> {
        Ok(self.edges()?.face_edges(f))
    }

    pub fn cell_edges(&self, c: EntityId) -> Result<&'a [EntityId], MeshSubcellError> {
        Ok(self.edges()?.cell_edges(c))
    }

    pub fn edge_nodes(&self, e: EntityId) -> Result<[EntityId; 2], MeshSubcellError> {
        Ok(self.edges()?.edge_nodes(e))
    }

    /// Position of each edge of `f` within `cell_edges(c)`.
    pub fn face_to_cell_edge_map(
        &self,
        f: EntityId,
        c: EntityId,
    ) -> Result<Vec<usize>, MeshSubcellError> {
        self.edges()?.face_to_cell_edge_map(f, c)
    }

    /// 2D only: the direction in which `c` traverses each of its edges.
    pub fn cell_2d_edge_dirs(&self, c: EntityId) -> Result<Vec<Dir>, MeshSubcellError> {
        if self.conn.manifold_dimension() != 2 {
            return Err(MeshSubcellError::UnsupportedDimensions {
                manifold: self.conn.manifold_dimension(),
                space: 2,
            });
        }
        self.edges()?;
        Ok(self.conn.cell_faces(c).iter().map(|&(_, d)| d).collect())
    }
}

/// Side records.
#[derive(Copy, Clone)]
pub struct SideView<'a> {
    sides: &'a SideTable,
}

impl<'a> SideView<'a> {
    pub fn len(&self) -> usize {
        self.sides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sides.is_empty()
    }

    pub fn side_cell(&self, s: EntityId) -> EntityId {
        self.sides.cell(s)
    }

    pub fn side_face(&self, s: EntityId) -> EntityId {
        self.sides.face(s)
    }

    pub fn side_edge(&self, s: EntityId) -> EntityId {
        self.sides.edge(s)
    }

    /// Node `i` (0 or 1) of side `s`.
    pub fn side_node(&self, s: EntityId, i: usize) -> EntityId {
        self.sides.nodes(s)[i]
    }

    pub fn side_nodes(&self, s: EntityId) -> [EntityId; 2] {
        self.sides.nodes(s)
    }

    pub fn side_edge_use(&self, s: EntityId) -> Dir {
        self.sides.edge_use(s)
    }

    pub fn side_opposite(&self, s: EntityId) -> Option<EntityId> {
        self.sides.opposite(s)
    }

    pub fn side_wedges(&self, s: EntityId) -> [EntityId; 2] {
        side_wedges(s)
    }

    pub fn cell_sides(&self, c: EntityId) -> &'a [EntityId] {
        self.sides.cell_sides(c)
    }
}

/// Wedge queries; ids are `2 * side + {0, 1}`.
#[derive(Copy, Clone)]
pub struct WedgeView<'a> {
    sides: &'a SideTable,
    wedges: &'a WedgeTable,
    cache: &'a DerivedCache,
    own: &'a OwnershipTable,
}

impl WedgeView<'_> {
    pub fn len(&self) -> usize {
        self.wedges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wedges.is_empty()
    }

    pub fn wedge_side(&self, w: EntityId) -> EntityId {
        wedge_side(w)
    }

    pub fn wedge_node(&self, w: EntityId) -> EntityId {
        wedge_node(self.sides, w)
    }

    pub fn wedge_cell(&self, w: EntityId) -> EntityId {
        self.sides.cell(wedge_side(w))
    }

    pub fn wedge_face(&self, w: EntityId) -> EntityId {
        self.sides.face(wedge_side(w))
    }

    pub fn wedge_edge(&self, w: EntityId) -> EntityId {
        self.sides.edge(wedge_side(w))
    }

    /// The other wedge of the same side.
    pub fn wedge_adjacent(&self, w: EntityId) -> EntityId {
        w ^ 1
    }

    /// The wedge across the face at the same node, in the neighbouring cell.
    pub fn wedge_opposite(&self, w: EntityId) -> Option<EntityId> {
        let t = self.sides.opposite(wedge_side(w))?;
        let [a, b] = self.sides.nodes(t);
        if a == b {
            return Some(2 * t + w % 2);
        }
        let node = self.wedge_node(w);
        side_wedges(t)
            .into_iter()
            .find(|&v| wedge_node(self.sides, v) == node)
    }

    pub fn cell_wedges(&self, c: EntityId) -> Vec<EntityId> {
        self.sides
            .cell_sides(c)
            .iter()
            .flat_map(|&s| side_wedges(s))
            .collect()
    }

    /// Wedges at node `n` whose cell passes `filter`.
    pub fn node_wedges(&self, n: EntityId, filter: Filter) -> Vec<EntityId> {
        self.wedges
            .node_wedges(n)
            .iter()
            .copied()
            .filter(|&w| filter.admits(self.own.cell(self.wedge_cell(w))))
            .collect()
    }

    /// Corner containing `w`; requires the corner stage.
    pub fn wedge_corner(&self, w: EntityId) -> Result<EntityId, MeshSubcellError> {
        if !self.cache.config().requests(EntityKind::Corner) {
            return Err(MeshSubcellError::KindNotRequested(EntityKind::Corner));
        }
        Ok(self.cache.corners()?.wedge_corner(w))
    }
}

/// Corner queries.
#[derive(Copy, Clone)]
pub struct CornerView<'a> {
    corners: &'a CornerTable,
    own: &'a OwnershipTable,
}

impl<'a> CornerView<'a> {
    pub fn len(&self) -> usize {
        self.corners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corners.is_empty()
    }

    pub fn corner_wedges(&self, k: EntityId) -> &'a [EntityId] {
        self.corners.wedges(k)
    }

    pub fn corner_node(&self, k: EntityId) -> EntityId {
        self.corners.node(k)
    }

    pub fn corner_cell(&self, k: EntityId) -> EntityId {
        self.corners.cell(k)
    }

    pub fn cell_corners(&self, c: EntityId) -> &'a [EntityId] {
        self.corners.cell_corners(c)
    }

    /// Corners at node `n` whose cell passes `filter`.
    pub fn node_corners(&self, n: EntityId, filter: Filter) -> Vec<EntityId> {
        self.corners
            .node_corners(n)
            .iter()
            .copied()
            .filter(|&k| filter.admits(self.own.cell(self.corners.cell(k))))
            .collect()
    }

    /// `None` if `n` is not a node of `c`.
    pub fn cell_corner_at_node(&self, c: EntityId, n: EntityId) -> Option<EntityId> {
        self.corners.cell_corner_at_node(c, n)
    }
}
