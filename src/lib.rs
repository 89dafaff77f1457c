#![cfg_attr(docsrs, feature(doc_cfg))]
//! # mesh-subcell
//!
//! mesh-subcell derives the sub-cell lattice of an unstructured mesh and its
//! geometry, for finite-volume and staggered-grid hydrodynamics codes. Given
//! a mesh's primary entities (nodes, edges, faces, cells) through the
//! [`MeshBackend`](backend::MeshBackend) trait, it builds:
//!
//! - **sides**: one sub-simplex per (cell, face, edge) in 3D, per
//!   (cell, face) in 2D and per half-cell in 1D, each linked to its
//!   *opposite* side across the face;
//! - **wedges**: the two halves of each side (ids `2s` and `2s + 1`);
//! - **corners**: the union of a cell's wedges at one node;
//!
//! together with signed volumes, centroids and area-weighted outward and
//! facet normals for every entity kind, in 1D, 2D (flat or embedded in 3D)
//! and 3D.
//!
//! ## Two-phase design
//!
//! The primary mesh is immutable. Everything this crate computes lives in a
//! separately owned [`DerivedCache`](lifecycle::DerivedCache), built in
//! dependency order from a [`MeshConfig`](lifecycle::MeshConfig) that names
//! the optional kinds. Queries go through a
//! [`MeshView`](lifecycle::MeshView) borrowing both:
//!
//! ```
//! use mesh_subcell::prelude::*;
//!
//! let mesh = structured_box_2d(
//!     2,
//!     2,
//!     [0.0, 0.0],
//!     [1.0, 1.0],
//!     StructuredCellType::Quadrilateral,
//!     MeshGenOptions::default(),
//! )?;
//! let cache = DerivedCache::build(&mesh, MeshConfig::all())?;
//! let view = cache.view(&mesh);
//! let geo = view.geometry()?;
//! let total: f64 = geo.corner_volumes(Mode::Cached)?.iter().sum();
//! assert!((total - 1.0).abs() < 1e-12);
//! # Ok::<(), MeshSubcellError>(())
//! ```
//!
//! ## Ownership
//!
//! Every entity is owned, ghost or boundary-ghost; each subset occupies a
//! contiguous id range. Derived entities inherit their cell's tag, and
//! boundary-ghost entities have exactly zero geometry.
//!
//! ## Features
//! - `rayon`: parallel recompute sweeps over cell, side and corner volumes.
//! - `strict-invariants` / `check-invariants`: verify the derived lattice
//!   after each build outside debug builds too.

pub mod algs;
pub mod backend;
pub mod debug_invariants;
pub mod geometry;
pub mod lifecycle;
pub mod mesh_error;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::dual_graph::CellGraph;
    pub use crate::algs::meshgen::{
        MeshGenOptions, StructuredCellType, cylinder_shell, line_mesh, structured_box_2d,
        structured_box_3d,
    };
    pub use crate::algs::partition::{CellPartitioner, PartitionError, TileSet};
    pub use crate::backend::{GeometryType, InMemoryMesh, MeshBackend, MeshBuilder};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::geometry::Point;
    pub use crate::lifecycle::{DerivedCache, MeshConfig, MeshView, Mode, Stage, StageState};
    pub use crate::mesh_error::MeshSubcellError;
    pub use crate::topology::{Dir, EntityCounts, EntityId, EntityKind, Filter, Ownership};
}
