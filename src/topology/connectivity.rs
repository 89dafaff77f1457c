//! Cached primary adjacency: cell↔face, face↔edge, cell↔edge, edge↔node.
//!
//! Every relation is pulled once from the backend's raw queries and frozen
//! into CSR rows. Orientation bits travel with the ids they qualify.

use itertools::Itertools;

use crate::backend::MeshBackend;
use crate::mesh_error::MeshSubcellError;
use crate::topology::entity::{EntityId, EntityKind};
use crate::topology::orientation::Dir;

/// Compressed rows: `values[offsets[i]..offsets[i + 1]]` is row `i`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Csr<T> {
    offsets: Vec<usize>,
    values: Vec<T>,
}

impl<T> Csr<T> {
    pub fn from_rows<I, R>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = T>,
    {
        let mut offsets = vec![0];
        let mut values = Vec::new();
        for row in rows {
            values.extend(row);
            offsets.push(values.len());
        }
        Self { offsets, values }
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[T] {
        &self.values[self.offsets[i]..self.offsets[i + 1]]
    }

    pub fn num_rows(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn num_values(&self) -> usize {
        self.values.len()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        (0..self.num_rows()).map(move |i| self.row(i))
    }
}

/// Edge relations, present only when edges were requested.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeConnectivity {
    face_edges: Csr<(EntityId, Dir)>,
    cell_edges: Csr<EntityId>,
    edge_nodes: Vec<[EntityId; 2]>,
}

/// Frozen primary connectivity of one mesh.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Connectivity {
    manifold: usize,
    cell_faces: Csr<(EntityId, Dir)>,
    face_cells: Csr<EntityId>,
    face_nodes: Csr<EntityId>,
    cell_nodes: Csr<EntityId>,
    edges: Option<EdgeConnectivity>,
}

impl Connectivity {
    /// Pull and validate adjacency from `backend`.
    ///
    /// Cell↔face and node lists are always cached since cell geometry needs
    /// them; edge relations only when `with_edges` is set.
    pub fn build<B: MeshBackend + ?Sized>(
        backend: &B,
        with_edges: bool,
    ) -> Result<Self, MeshSubcellError> {
        let n_cells = backend.counts(EntityKind::Cell).total();
        let n_faces = backend.counts(EntityKind::Face).total();
        let n_edges = backend.counts(EntityKind::Edge).total();
        let n_nodes = backend.counts(EntityKind::Node).total();

        let cell_faces = Csr::from_rows((0..n_cells).map(|c| backend.cell_faces_and_dirs(c)));
        let face_cells = Csr::from_rows((0..n_faces).map(|f| backend.face_cells(f)));
        let face_nodes = Csr::from_rows((0..n_faces).map(|f| backend.face_nodes(f)));
        let cell_nodes = Csr::from_rows((0..n_cells).map(|c| backend.cell_nodes(c)));

        check_ids("cell node", cell_nodes.values.iter().copied(), n_nodes)?;
        check_ids("face node", face_nodes.values.iter().copied(), n_nodes)?;
        check_ids("cell face", cell_faces.values.iter().map(|&(f, _)| f), n_faces)?;
        check_ids("face cell", face_cells.values.iter().copied(), n_cells)?;

        for f in 0..n_faces {
            let cells = face_cells.row(f);
            if cells.is_empty() || cells.len() > 2 {
                return Err(MeshSubcellError::TopologyInconsistency(format!(
                    "face {f} adjoins {} cells",
                    cells.len()
                )));
            }
        }
        for c in 0..n_cells {
            for &(f, _) in cell_faces.row(c) {
                if !face_cells.row(f).contains(&c) {
                    return Err(MeshSubcellError::TopologyInconsistency(format!(
                        "cell {c} lists face {f}, which does not list it back"
                    )));
                }
            }
        }

        let edges = if with_edges {
            let face_edges =
                Csr::from_rows((0..n_faces).map(|f| backend.face_edges_and_dirs(f)));
            check_ids("face edge", face_edges.values.iter().map(|&(e, _)| e), n_edges)?;
            let edge_nodes: Vec<[EntityId; 2]> =
                (0..n_edges).map(|e| backend.edge_nodes(e)).collect();
            check_ids("edge node", edge_nodes.iter().flatten().copied(), n_nodes)?;
            let cell_edges = Csr::from_rows((0..n_cells).map(|c| {
                cell_faces
                    .row(c)
                    .iter()
                    .flat_map(|&(f, _)| face_edges.row(f).iter().map(|&(e, _)| e))
                    .unique()
                    .collect::<Vec<_>>()
            }));
            Some(EdgeConnectivity {
                face_edges,
                cell_edges,
                edge_nodes,
            })
        } else {
            None
        };

        log::debug!(
            "connectivity: {} cell-face, {} face-cell incidences, edges {}",
            cell_faces.num_values(),
            face_cells.num_values(),
            if with_edges { "cached" } else { "skipped" }
        );
        Ok(Self {
            manifold: backend.manifold_dimension(),
            cell_faces,
            face_cells,
            face_nodes,
            cell_nodes,
            edges,
        })
    }

    pub fn manifold_dimension(&self) -> usize {
        self.manifold
    }

    pub fn num_cells(&self) -> usize {
        self.cell_faces.num_rows()
    }

    pub fn num_faces(&self) -> usize {
        self.face_cells.num_rows()
    }

    #[inline]
    pub fn cell_faces(&self, c: EntityId) -> &[(EntityId, Dir)] {
        self.cell_faces.row(c)
    }

    pub fn cell_num_faces(&self, c: EntityId) -> usize {
        self.cell_faces.row(c).len()
    }

    /// Direction in which `c` sees face `f`, if `f` bounds `c`.
    pub fn cell_face_dir(&self, c: EntityId, f: EntityId) -> Option<Dir> {
        self.cell_faces(c)
            .iter()
            .find(|&&(g, _)| g == f)
            .map(|&(_, d)| d)
    }

    #[inline]
    pub fn face_cells(&self, f: EntityId) -> &[EntityId] {
        self.face_cells.row(f)
    }

    /// The cell on the other side of `f` from `c`.
    pub fn face_neighbor(&self, f: EntityId, c: EntityId) -> Option<EntityId> {
        self.face_cells(f).iter().copied().find(|&other| other != c)
    }

    #[inline]
    pub fn face_nodes(&self, f: EntityId) -> &[EntityId] {
        self.face_nodes.row(f)
    }

    #[inline]
    pub fn cell_nodes(&self, c: EntityId) -> &[EntityId] {
        self.cell_nodes.row(c)
    }

    pub fn edges(&self) -> Option<&EdgeConnectivity> {
        self.edges.as_ref()
    }
}

impl EdgeConnectivity {
    pub fn num_edges(&self) -> usize {
        self.edge_nodes.len()
    }

    #[inline]
    pub fn face_edges(&self, f: EntityId) -> &[(EntityId, Dir)] {
        self.face_edges.row(f)
    }

    #[inline]
    pub fn cell_edges(&self, c: EntityId) -> &[EntityId] {
        self.cell_edges.row(c)
    }

    #[inline]
    pub fn edge_nodes(&self, e: EntityId) -> [EntityId; 2] {
        self.edge_nodes[e]
    }

    /// For each edge of face `f`, its position in `cell_edges(c)`.
    ///
    /// Returns an error if `f` does not bound `c`.
    pub fn face_to_cell_edge_map(
        &self,
        f: EntityId,
        c: EntityId,
    ) -> Result<Vec<usize>, MeshSubcellError> {
        let cell_edges = self.cell_edges(c);
        self.face_edges(f)
            .iter()
            .map(|&(e, _)| {
                cell_edges.iter().position(|&ce| ce == e).ok_or_else(|| {
                    MeshSubcellError::TopologyInconsistency(format!(
                        "edge {e} of face {f} is not an edge of cell {c}"
                    ))
                })
            })
            .collect()
    }
}

fn check_ids(
    what: &str,
    ids: impl Iterator<Item = EntityId>,
    bound: usize,
) -> Result<(), MeshSubcellError> {
    for id in ids {
        if id >= bound {
            return Err(MeshSubcellError::TopologyInconsistency(format!(
                "{what} id {id} out of range (count {bound})"
            )));
        }
    }
    Ok(())
}
