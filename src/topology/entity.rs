//! Entity kinds, ownership tags and per-kind ownership ranges.
//!
//! Every entity is a dense, zero-based index local to its kind. The mesh
//! backend numbers each kind owned first, then shared-ghost, then
//! boundary-ghost, so every ownership subset is a contiguous range.

use std::ops::Range;

/// Dense, zero-based entity identifier. Array index **is** identity.
pub type EntityId = usize;

/// The primary and derived entity kinds.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub enum EntityKind {
    Node,
    Edge,
    Face,
    Cell,
    Side,
    Wedge,
    Corner,
}

impl EntityKind {
    /// Primary kinds are supplied by the backend; the rest are derived here.
    pub fn is_primary(self) -> bool {
        matches!(
            self,
            EntityKind::Node | EntityKind::Edge | EntityKind::Face | EntityKind::Cell
        )
    }
}

/// Ownership of an entity relative to the local partition.
#[derive(
    Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum Ownership {
    /// Exclusively local.
    Owned,
    /// Duplicated from a neighbouring partition.
    Ghost,
    /// Artificial placeholder beyond the domain boundary.
    BoundaryGhost,
}

/// Selects a subset of entities by ownership.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Filter {
    #[default]
    All,
    Owned,
    Ghost,
    BoundaryGhost,
}

impl Filter {
    /// Whether an entity with ownership `o` belongs to this subset.
    #[inline]
    pub fn admits(self, o: Ownership) -> bool {
        match self {
            Filter::All => true,
            Filter::Owned => o == Ownership::Owned,
            Filter::Ghost => o == Ownership::Ghost,
            Filter::BoundaryGhost => o == Ownership::BoundaryGhost,
        }
    }
}

impl From<Ownership> for Filter {
    fn from(o: Ownership) -> Self {
        match o {
            Ownership::Owned => Filter::Owned,
            Ownership::Ghost => Filter::Ghost,
            Ownership::BoundaryGhost => Filter::BoundaryGhost,
        }
    }
}

/// Sizes of the three contiguous ownership ranges of one kind.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub struct EntityCounts {
    pub owned: usize,
    pub ghost: usize,
    pub boundary_ghost: usize,
}

impl EntityCounts {
    pub fn new(owned: usize, ghost: usize, boundary_ghost: usize) -> Self {
        Self {
            owned,
            ghost,
            boundary_ghost,
        }
    }

    /// Every entity is owned.
    pub fn all_owned(n: usize) -> Self {
        Self::new(n, 0, 0)
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.owned + self.ghost + self.boundary_ghost
    }

    /// Number of entities admitted by `filter`.
    pub fn count(&self, filter: Filter) -> usize {
        self.range(filter).len()
    }

    /// Id range admitted by `filter`.
    pub fn range(&self, filter: Filter) -> Range<EntityId> {
        let ghost_start = self.owned;
        let bg_start = ghost_start + self.ghost;
        match filter {
            Filter::All => 0..self.total(),
            Filter::Owned => 0..ghost_start,
            Filter::Ghost => ghost_start..bg_start,
            Filter::BoundaryGhost => bg_start..self.total(),
        }
    }

    /// Ownership of entity `id` implied by the ranges.
    ///
    /// # Panics
    /// Panics if `id` is past the last range; an out-of-range id is a
    /// programming error.
    pub fn ownership_of(&self, id: EntityId) -> Ownership {
        assert!(
            id < self.total(),
            "entity id {id} out of range (count {})",
            self.total()
        );
        if id < self.owned {
            Ownership::Owned
        } else if id < self.owned + self.ghost {
            Ownership::Ghost
        } else {
            Ownership::BoundaryGhost
        }
    }

    /// Add one entity of the given ownership to the tally.
    pub fn bump(&mut self, o: Ownership, by: usize) {
        match o {
            Ownership::Owned => self.owned += by,
            Ownership::Ghost => self.ghost += by,
            Ownership::BoundaryGhost => self.boundary_ghost += by,
        }
    }
}
