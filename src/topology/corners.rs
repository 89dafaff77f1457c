//! Corners: one per (cell, node) incidence, collecting the cell's wedges at
//! that node. Node→corner and cell→corner indices are built in the same
//! traversal.

use crate::debug_invariants::{DebugInvariants, ensure_invariant};
use crate::mesh_error::MeshSubcellError;
use crate::topology::connectivity::{Connectivity, Csr};
use crate::topology::entity::{EntityCounts, EntityId};
use crate::topology::ownership::OwnershipTable;
use crate::topology::sides::SideTable;
use crate::topology::wedges::{side_wedges, wedge_node};

const UNASSIGNED: EntityId = EntityId::MAX;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CornerTable {
    counts: EntityCounts,
    cell: Vec<EntityId>,
    node: Vec<EntityId>,
    wedges: Csr<EntityId>,
    wedge_corner: Vec<EntityId>,
    cell_corners: Csr<EntityId>,
    node_corners: Csr<EntityId>,
}

impl CornerTable {
    pub fn derive(
        conn: &Connectivity,
        own: &OwnershipTable,
        sides: &SideTable,
        num_nodes: usize,
    ) -> Result<Self, MeshSubcellError> {
        let n_cells = conn.num_cells();
        let mut counts = EntityCounts::default();
        let mut cell = Vec::new();
        let mut node = Vec::new();
        let mut wedge_rows: Vec<Vec<EntityId>> = Vec::new();
        let mut wedge_corner = vec![UNASSIGNED; 2 * sides.len()];
        let mut cell_rows = Vec::with_capacity(n_cells);
        let mut node_rows: Vec<Vec<EntityId>> = vec![Vec::new(); num_nodes];

        for c in 0..n_cells {
            let first = cell.len();
            let cell_wedges: Vec<EntityId> = sides
                .cell_sides(c)
                .iter()
                .flat_map(|&s| side_wedges(s))
                .collect();
            for &n in conn.cell_nodes(c) {
                let k = cell.len();
                let members: Vec<EntityId> = cell_wedges
                    .iter()
                    .copied()
                    .filter(|&w| wedge_node(sides, w) == n)
                    .collect();
                if members.is_empty() {
                    return Err(MeshSubcellError::TopologyInconsistency(format!(
                        "node {n} of cell {c} has no wedge"
                    )));
                }
                for &w in &members {
                    wedge_corner[w] = k;
                }
                cell.push(c);
                node.push(n);
                wedge_rows.push(members);
                node_rows[n].push(k);
            }
            counts.bump(own.cell(c), cell.len() - first);
            cell_rows.push(first..cell.len());
        }

        if let Some(w) = wedge_corner.iter().position(|&k| k == UNASSIGNED) {
            return Err(MeshSubcellError::TopologyInconsistency(format!(
                "wedge {w} sits at a node its cell does not list"
            )));
        }

        log::debug!("corners: {} total", counts.total());
        let table = Self {
            counts,
            cell,
            node,
            wedges: Csr::from_rows(wedge_rows),
            wedge_corner,
            cell_corners: Csr::from_rows(cell_rows),
            node_corners: Csr::from_rows(node_rows),
        };
        crate::debug_invariants!(table.validate_invariants(), "corner derivation");
        Ok(table)
    }

    pub fn counts(&self) -> EntityCounts {
        self.counts
    }

    pub fn len(&self) -> usize {
        self.cell.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cell.is_empty()
    }

    #[inline]
    pub fn cell(&self, k: EntityId) -> EntityId {
        self.cell[k]
    }

    #[inline]
    pub fn node(&self, k: EntityId) -> EntityId {
        self.node[k]
    }

    #[inline]
    pub fn wedges(&self, k: EntityId) -> &[EntityId] {
        self.wedges.row(k)
    }

    #[inline]
    pub fn wedge_corner(&self, w: EntityId) -> EntityId {
        self.wedge_corner[w]
    }

    #[inline]
    pub fn cell_corners(&self, c: EntityId) -> &[EntityId] {
        self.cell_corners.row(c)
    }

    #[inline]
    pub fn node_corners(&self, n: EntityId) -> &[EntityId] {
        self.node_corners.row(n)
    }

    /// The corner of `c` at node `n`, if `n` is a node of `c`.
    pub fn cell_corner_at_node(&self, c: EntityId, n: EntityId) -> Option<EntityId> {
        self.cell_corners(c)
            .iter()
            .copied()
            .find(|&k| self.node[k] == n)
    }
}

impl DebugInvariants for CornerTable {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "CornerTable");
    }

    fn validate_invariants(&self) -> Result<(), MeshSubcellError> {
        ensure_invariant(self.counts.total() == self.len(), || {
            format!("corner counts {:?} do not add up to {}", self.counts, self.len())
        })?;
        for k in 0..self.len() {
            for &w in self.wedges(k) {
                ensure_invariant(self.wedge_corner[w] == k, || {
                    format!("wedge {w} in corner {k} points back to {}", self.wedge_corner[w])
                })?;
            }
        }
        for n in 0..self.node_corners.num_rows() {
            for &k in self.node_corners(n) {
                ensure_invariant(self.node[k] == n, || {
                    format!("corner {k} listed under node {n} sits at {}", self.node[k])
                })?;
            }
        }
        Ok(())
    }
}
