//! Which optional entity kinds a mesh carries.
//!
//! Nodes and cells are always present. Faces, edges, sides, wedges and
//! corners are opt-in; every accessor for an opt-in kind fails with
//! [`MeshSubcellError::KindNotRequested`](crate::mesh_error::MeshSubcellError)
//! when the kind was left out.

use serde::{Deserialize, Serialize};

use crate::topology::entity::EntityKind;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    pub faces: bool,
    pub edges: bool,
    pub sides: bool,
    pub wedges: bool,
    pub corners: bool,
}

impl Default for MeshConfig {
    /// Faces only.
    fn default() -> Self {
        Self {
            faces: true,
            edges: false,
            sides: false,
            wedges: false,
            corners: false,
        }
    }
}

impl MeshConfig {
    /// Every optional kind.
    pub fn all() -> Self {
        Self {
            faces: true,
            edges: true,
            sides: true,
            wedges: true,
            corners: true,
        }
    }

    pub fn with_faces(mut self, on: bool) -> Self {
        self.faces = on;
        self
    }

    pub fn with_edges(mut self, on: bool) -> Self {
        self.edges = on;
        self
    }

    pub fn with_sides(mut self, on: bool) -> Self {
        self.sides = on;
        self
    }

    pub fn with_wedges(mut self, on: bool) -> Self {
        self.wedges = on;
        self
    }

    pub fn with_corners(mut self, on: bool) -> Self {
        self.corners = on;
        self
    }

    /// Close the request set under dependencies:
    /// corners ⇒ wedges ⇒ sides ⇒ faces + edges.
    pub fn normalized(self) -> Self {
        let mut out = self;
        if out.corners && !out.wedges {
            log::debug!("corners requested: enabling wedges");
            out.wedges = true;
        }
        if out.wedges && !out.sides {
            log::debug!("wedges requested: enabling sides");
            out.sides = true;
        }
        if out.sides && !(out.faces && out.edges) {
            log::debug!("sides requested: enabling faces and edges");
            out.faces = true;
            out.edges = true;
        }
        out
    }

    /// Whether entities of `kind` are available under this configuration.
    pub fn requests(&self, kind: EntityKind) -> bool {
        match kind {
            EntityKind::Node | EntityKind::Cell => true,
            EntityKind::Face => self.faces,
            EntityKind::Edge => self.edges,
            EntityKind::Side => self.sides,
            EntityKind::Wedge => self.wedges,
            EntityKind::Corner => self.corners,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_faces_only() {
        let c = MeshConfig::default();
        assert!(c.requests(EntityKind::Face));
        assert!(c.requests(EntityKind::Cell));
        assert!(!c.requests(EntityKind::Side));
        assert_eq!(c.normalized(), c);
    }

    #[test]
    fn corners_pull_in_everything() {
        let c = MeshConfig::default()
            .with_faces(false)
            .with_corners(true)
            .normalized();
        assert_eq!(c, MeshConfig::all());
    }

    #[test]
    fn edges_alone_stay_alone() {
        let c = MeshConfig::default().with_edges(true).normalized();
        assert!(c.edges && c.faces && !c.sides);
    }
}
