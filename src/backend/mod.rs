//! The primary-mesh collaborator consumed by the derivation engine.
//!
//! A [`MeshBackend`] supplies counts, raw (uncached) adjacency and node
//! coordinates. Everything in this crate reads it; nothing writes it.
//!
//! Orientation conventions every backend must follow:
//! - `face_nodes(f)` lists a face's nodes in its natural order. In 3D the
//!   natural normal is the right-hand normal of that loop; in 2D the face is
//!   an edge and its natural normal is the clockwise rotation of `n1 - n0`;
//!   in 1D the face is a node and its natural normal is `+x`.
//! - `cell_faces_and_dirs(c)` reports `Dir::POS` when the face's natural
//!   normal points out of `c`. In 2D faces are listed counter-clockwise, in
//!   1D as the cell's two nodes in `cell_nodes` order.
//! - `face_edges_and_dirs(f)` lists edges along the face loop with
//!   `Dir::POS` when the edge's node order follows the loop. In 2D and 1D a
//!   face is its own single edge.

pub mod in_memory;

pub use in_memory::{InMemoryMesh, MeshBuilder};

use crate::geometry::vector::Point;
use crate::mesh_error::MeshSubcellError;
use crate::topology::entity::{EntityCounts, EntityId, EntityKind};
use crate::topology::orientation::Dir;

/// Flat versus curved volume formulas (only 1D meshes are affected).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub enum GeometryType {
    #[default]
    Cartesian,
    /// 1D radial mesh: nodes are radii of concentric spherical shells.
    Spherical,
}

/// Read-only access to a mesh's primary entities.
pub trait MeshBackend {
    /// Topological dimension of the cells.
    fn manifold_dimension(&self) -> usize;
    /// Dimension of the coordinate system.
    fn space_dimension(&self) -> usize;
    fn geometry_type(&self) -> GeometryType {
        GeometryType::Cartesian
    }
    /// Owned/ghost/boundary-ghost counts for a primary kind.
    ///
    /// Derived kinds are never stored by a backend and report zero.
    fn counts(&self, kind: EntityKind) -> EntityCounts;
    fn cell_faces_and_dirs(&self, cell: EntityId) -> Vec<(EntityId, Dir)>;
    /// The one or two cells adjoining a face.
    fn face_cells(&self, face: EntityId) -> Vec<EntityId>;
    fn face_edges_and_dirs(&self, face: EntityId) -> Vec<(EntityId, Dir)>;
    fn edge_nodes(&self, edge: EntityId) -> [EntityId; 2];
    fn cell_nodes(&self, cell: EntityId) -> Vec<EntityId>;
    fn face_nodes(&self, face: EntityId) -> Vec<EntityId>;
    /// Node position, zero-padded to three components.
    fn node_coordinates(&self, node: EntityId) -> Point;
}

/// Reject manifold/space combinations without a geometry strategy.
pub fn validate_dimensions(manifold: usize, space: usize) -> Result<(), MeshSubcellError> {
    let supported = match manifold {
        1 => space == 1,
        2 => space == 2 || space == 3,
        3 => space == 3,
        _ => false,
    };
    if supported {
        Ok(())
    } else {
        Err(MeshSubcellError::UnsupportedDimensions { manifold, space })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_table() {
        assert!(validate_dimensions(1, 1).is_ok());
        assert!(validate_dimensions(2, 3).is_ok());
        assert!(validate_dimensions(3, 3).is_ok());
        assert_eq!(
            validate_dimensions(3, 2),
            Err(MeshSubcellError::UnsupportedDimensions {
                manifold: 3,
                space: 2
            })
        );
        assert!(validate_dimensions(1, 3).is_err());
        assert!(validate_dimensions(0, 0).is_err());
    }
}
