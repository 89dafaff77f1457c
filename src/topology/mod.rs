//! Mesh topology: entity identity and ownership, cached primary adjacency,
//! and the derived side/wedge/corner lattice.
//!
//! Derivation runs strictly downstream: connectivity → sides → wedges →
//! corners, with ownership tags from [`ownership`] feeding every stage.

pub mod connectivity;
pub mod corners;
pub mod entity;
pub mod orientation;
pub mod ownership;
pub mod sides;
pub mod wedges;

pub use entity::{EntityCounts, EntityId, EntityKind, Filter, Ownership};
pub use orientation::{Dir, Orientation};
