//! Wedges: each side splits into wedge `2s` at its first node and `2s + 1`
//! at its second. The pairing is arithmetic and never stored; this stage
//! only adds the node→wedge index.

use crate::topology::connectivity::Csr;
use crate::topology::entity::{EntityCounts, EntityId};
use crate::topology::sides::SideTable;

#[inline]
pub fn wedge_side(w: EntityId) -> EntityId {
    w / 2
}

/// The two wedges of side `s`.
#[inline]
pub fn side_wedges(s: EntityId) -> [EntityId; 2] {
    [2 * s, 2 * s + 1]
}

/// Node-to-wedge index over a derived side set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WedgeTable {
    counts: EntityCounts,
    node_wedges: Csr<EntityId>,
}

impl WedgeTable {
    /// Cannot fail once sides exist.
    pub fn derive(sides: &SideTable, num_nodes: usize) -> Self {
        let sc = sides.counts();
        let counts = EntityCounts::new(2 * sc.owned, 2 * sc.ghost, 2 * sc.boundary_ghost);

        let mut rows: Vec<Vec<EntityId>> = vec![Vec::new(); num_nodes];
        for w in 0..counts.total() {
            rows[wedge_node(sides, w)].push(w);
        }
        log::debug!("wedges: {} total", counts.total());
        Self {
            counts,
            node_wedges: Csr::from_rows(rows),
        }
    }

    pub fn counts(&self) -> EntityCounts {
        self.counts
    }

    pub fn len(&self) -> usize {
        self.counts.total()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wedges at node `n`, in wedge-id order.
    #[inline]
    pub fn node_wedges(&self, n: EntityId) -> &[EntityId] {
        self.node_wedges.row(n)
    }
}

/// The node wedge `w` sits at.
#[inline]
pub fn wedge_node(sides: &SideTable, w: EntityId) -> EntityId {
    sides.nodes(wedge_side(w))[w % 2]
}
