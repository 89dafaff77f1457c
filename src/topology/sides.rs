//! Side derivation.
//!
//! A side is keyed by one (cell, face, edge) incidence. In 2D the face is its
//! own edge, and in 1D face and edge are both a node of the cell, giving two
//! sides per cell. Sides are numbered in cell order, so owned cells' sides
//! come first, then ghost, then boundary-ghost.
//!
//! A side's two nodes are ordered so that the triangle `(n0, n1, face centre)`
//! faces into the cell. Opposite sides share face and edge but belong to the
//! neighbouring cell.

use crate::debug_invariants::{DebugInvariants, ensure_invariant};
use crate::mesh_error::MeshSubcellError;
use crate::topology::connectivity::{Connectivity, Csr};
use crate::topology::entity::{EntityCounts, EntityId, EntityKind};
use crate::topology::orientation::{Dir, accumulate_path};
use crate::topology::ownership::OwnershipTable;

/// Dense per-side records, indexed by side id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SideTable {
    counts: EntityCounts,
    cell: Vec<EntityId>,
    face: Vec<EntityId>,
    edge: Vec<EntityId>,
    nodes: Vec<[EntityId; 2]>,
    edge_use: Vec<Dir>,
    opposite: Vec<Option<EntityId>>,
    cell_sides: Csr<EntityId>,
}

impl SideTable {
    /// Enumerate sides and pair opposites.
    pub fn derive(conn: &Connectivity, own: &OwnershipTable) -> Result<Self, MeshSubcellError> {
        let edges = conn
            .edges()
            .ok_or(MeshSubcellError::KindNotRequested(EntityKind::Edge))?;
        let manifold = conn.manifold_dimension();
        let n_cells = conn.num_cells();

        let mut table = SideTable {
            counts: EntityCounts::default(),
            cell: Vec::new(),
            face: Vec::new(),
            edge: Vec::new(),
            nodes: Vec::new(),
            edge_use: Vec::new(),
            opposite: Vec::new(),
            cell_sides: Csr::default(),
        };
        // sides seen so far on each edge
        let mut on_edge: Vec<Vec<EntityId>> = vec![Vec::new(); edges.num_edges()];
        let mut cell_rows = Vec::with_capacity(n_cells);

        for c in 0..n_cells {
            let first = table.cell.len();
            for &(f, fdir) in conn.cell_faces(c) {
                for &(e, edir) in edges.face_edges(f) {
                    let s = table.cell.len();
                    let edge_use = if manifold == 3 {
                        accumulate_path([fdir, edir, Dir::NEG])
                    } else {
                        fdir
                    };
                    let opp = on_edge[e]
                        .iter()
                        .copied()
                        .find(|&t| table.face[t] == f && table.cell[t] != c);
                    if let Some(t) = opp {
                        if let Some(prior) = table.opposite[t] {
                            return Err(MeshSubcellError::TopologyInconsistency(format!(
                                "side {t} already paired with {prior}, cannot pair with {s}"
                            )));
                        }
                        table.opposite[t] = Some(s);
                    }

                    table.cell.push(c);
                    table.face.push(f);
                    table.edge.push(e);
                    table.nodes.push(edge_use.order(edges.edge_nodes(e)));
                    table.edge_use.push(edge_use);
                    table.opposite.push(opp);
                    on_edge[e].push(s);
                }
            }
            table.counts.bump(own.cell(c), table.cell.len() - first);
            cell_rows.push(first..table.cell.len());
        }
        table.cell_sides = Csr::from_rows(cell_rows);

        // interior faces must pair every side
        for s in 0..table.len() {
            if table.opposite[s].is_none() && conn.face_cells(table.face[s]).len() == 2 {
                return Err(MeshSubcellError::TopologyInconsistency(format!(
                    "side {s} on interior face {} has no opposite side",
                    table.face[s]
                )));
            }
        }

        log::debug!(
            "sides: {} owned, {} ghost, {} boundary-ghost",
            table.counts.owned,
            table.counts.ghost,
            table.counts.boundary_ghost
        );
        crate::debug_invariants!(table.validate_invariants(), "side derivation");
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.cell.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cell.is_empty()
    }

    pub fn counts(&self) -> EntityCounts {
        self.counts
    }

    #[inline]
    pub fn cell(&self, s: EntityId) -> EntityId {
        self.cell[s]
    }

    #[inline]
    pub fn face(&self, s: EntityId) -> EntityId {
        self.face[s]
    }

    #[inline]
    pub fn edge(&self, s: EntityId) -> EntityId {
        self.edge[s]
    }

    #[inline]
    pub fn nodes(&self, s: EntityId) -> [EntityId; 2] {
        self.nodes[s]
    }

    /// Direction in which the side traverses its edge.
    #[inline]
    pub fn edge_use(&self, s: EntityId) -> Dir {
        self.edge_use[s]
    }

    #[inline]
    pub fn opposite(&self, s: EntityId) -> Option<EntityId> {
        self.opposite[s]
    }

    #[inline]
    pub fn cell_sides(&self, c: EntityId) -> &[EntityId] {
        self.cell_sides.row(c)
    }
}

impl DebugInvariants for SideTable {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "SideTable");
    }

    fn validate_invariants(&self) -> Result<(), MeshSubcellError> {
        ensure_invariant(self.counts.total() == self.len(), || {
            format!("side counts {:?} do not add up to {}", self.counts, self.len())
        })?;
        for s in 0..self.len() {
            if let Some(t) = self.opposite[s] {
                ensure_invariant(self.opposite[t] == Some(s), || {
                    format!("side {s} names {t} opposite, but {t} does not name {s}")
                })?;
                ensure_invariant(
                    self.face[t] == self.face[s]
                        && self.edge[t] == self.edge[s]
                        && self.cell[t] != self.cell[s],
                    || format!("sides {s} and {t} do not share a face and edge"),
                )?;
            }
        }
        for c in 0..self.cell_sides.num_rows() {
            for &s in self.cell_sides(c) {
                ensure_invariant(self.cell[s] == c, || {
                    format!("side {s} listed under cell {c} belongs to {}", self.cell[s])
                })?;
            }
        }
        Ok(())
    }
}
