//! Ownership classification of primary entities.
//!
//! The [`OwnershipTable`] expands the backend's per-kind owned/ghost/boundary
//! ranges into dense tag arrays, so every later stage can look up an entity's
//! tag by index.

use crate::backend::MeshBackend;
use crate::topology::entity::{EntityCounts, EntityId, EntityKind, Filter, Ownership};
use std::ops::Range;

const PRIMARY: [EntityKind; 4] = [
    EntityKind::Node,
    EntityKind::Edge,
    EntityKind::Face,
    EntityKind::Cell,
];

/// Dense ownership tags for one entity kind.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OwnershipTags {
    counts: EntityCounts,
    tags: Vec<Ownership>,
}

impl OwnershipTags {
    /// Expand contiguous ranges into one tag per entity.
    pub fn from_counts(counts: EntityCounts) -> Self {
        let mut tags = Vec::with_capacity(counts.total());
        tags.extend(std::iter::repeat_n(Ownership::Owned, counts.owned));
        tags.extend(std::iter::repeat_n(Ownership::Ghost, counts.ghost));
        tags.extend(std::iter::repeat_n(
            Ownership::BoundaryGhost,
            counts.boundary_ghost,
        ));
        Self { counts, tags }
    }

    pub fn counts(&self) -> EntityCounts {
        self.counts
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// # Panics
    /// Panics if `id` is out of range.
    #[inline]
    pub fn get(&self, id: EntityId) -> Ownership {
        self.tags[id]
    }

    pub fn range(&self, filter: Filter) -> Range<EntityId> {
        self.counts.range(filter)
    }

    pub fn as_slice(&self) -> &[Ownership] {
        &self.tags
    }
}

/// Tags for nodes, edges, faces and cells.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OwnershipTable {
    nodes: OwnershipTags,
    edges: OwnershipTags,
    faces: OwnershipTags,
    cells: OwnershipTags,
}

impl OwnershipTable {
    /// Classify every primary entity of `backend`.
    pub fn classify<B: MeshBackend + ?Sized>(backend: &B) -> Self {
        let [nodes, edges, faces, cells] =
            PRIMARY.map(|kind| OwnershipTags::from_counts(backend.counts(kind)));
        log::debug!(
            "ownership: cells {:?}, faces {:?}, edges {:?}, nodes {:?}",
            cells.counts,
            faces.counts,
            edges.counts,
            nodes.counts
        );
        Self {
            nodes,
            edges,
            faces,
            cells,
        }
    }

    /// Tags of a primary kind; `None` for derived kinds.
    pub fn tags(&self, kind: EntityKind) -> Option<&OwnershipTags> {
        match kind {
            EntityKind::Node => Some(&self.nodes),
            EntityKind::Edge => Some(&self.edges),
            EntityKind::Face => Some(&self.faces),
            EntityKind::Cell => Some(&self.cells),
            _ => None,
        }
    }

    #[inline]
    pub fn cell(&self, c: EntityId) -> Ownership {
        self.cells.get(c)
    }

    pub fn cells(&self) -> &OwnershipTags {
        &self.cells
    }
}
