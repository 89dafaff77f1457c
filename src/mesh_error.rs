//! MeshSubcellError: Unified error type for mesh-subcell public APIs
//!
//! Precondition violations (asking for a kind that was not requested, or for
//! a cache stage that has not been built) and topological inconsistencies are
//! reported through this type at the call that detects them.

use crate::lifecycle::stage::Stage;
use crate::topology::entity::{EntityId, EntityKind};
use thiserror::Error;

/// Unified error type for mesh-subcell operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshSubcellError {
    /// The entity kind was left out of the mesh configuration.
    #[error("entity kind {0:?} was not requested in this mesh configuration")]
    KindNotRequested(EntityKind),
    /// A cache stage was used before it (or one of its prerequisites) was built.
    #[error("cache stage {required:?} is not cached (needed by {requested:?})")]
    StageNotCached { required: Stage, requested: Stage },
    /// Derived topology does not match what the primary topology implies.
    #[error("Topology error: {0}")]
    TopologyInconsistency(String),
    /// Entities of a kind are not numbered owned, then ghost, then boundary-ghost.
    #[error("{kind:?} {id} breaks owned/ghost/boundary-ghost ordering")]
    OwnershipOrder { kind: EntityKind, id: EntityId },
    /// The backend reports dimensions this engine has no geometry for.
    #[error("unsupported dimensions: manifold {manifold}, space {space}")]
    UnsupportedDimensions { manifold: usize, space: usize },
    /// Invalid or degenerate geometric/builder input.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    /// A facetization was requested with an arity other than the manifold dimension.
    #[error("corner facets have {manifold} points in this mesh, not {requested}")]
    FacetArity { requested: usize, manifold: usize },
}
