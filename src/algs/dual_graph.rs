//! Build a CSR *cell graph* of the owned cells of a mesh.
//
// Each owned cell is a vertex; an undirected edge joins two owned cells
// that share a face. Ghost neighbours are left out, so the graph describes
// exactly the cells a partitioner may assign.
//
// Returned as CSR triples:
//
// * `xadj[i] .. xadj[i+1]`   = neighbour list of cell *i*
// * `adjncy`                 = concatenated neighbour vertices
// * `vwgt[i]`                = vertex weight, default = 1
//
// Owned cells occupy ids `0..n_owned`, so CSR vertex *i* is cell *i*.

use crate::backend::MeshBackend;
use crate::geometry::vector::Point;
use crate::lifecycle::geometry_view::Mode;
use crate::lifecycle::view::MeshView;
use crate::mesh_error::MeshSubcellError;
use crate::topology::entity::{EntityId, EntityKind, Filter};

/// CSR face-adjacency graph with one centroid per vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct CellGraph {
    pub xadj: Vec<usize>,
    pub adjncy: Vec<usize>,
    pub vwgt: Vec<i32>,
    pub centroids: Vec<Point>,
}

impl CellGraph {
    /// Build from cached connectivity and cell geometry.
    pub fn build<B: MeshBackend + ?Sized>(mesh: &MeshView<'_, B>) -> Result<Self, MeshSubcellError> {
        let cells = mesh.entities(EntityKind::Cell, Filter::Owned)?;
        let conn = mesh.connectivity()?;
        let geo = mesh.geometry()?;
        let n = cells.len();

        let mut xadj = Vec::with_capacity(n + 1);
        let mut adjncy = Vec::new();
        let mut centroids = Vec::with_capacity(n);
        xadj.push(0);
        for c in cells {
            let mut nbrs = conn.cell_face_adj_cells(c, Filter::Owned)?;
            nbrs.sort_unstable();
            nbrs.dedup();
            adjncy.extend(nbrs);
            xadj.push(adjncy.len());
            centroids.push(geo.cell_centroid(c, Mode::Cached)?);
        }
        log::debug!("cell graph: {n} vertices, {} arcs", adjncy.len());

        Ok(CellGraph {
            xadj,
            adjncy,
            vwgt: vec![1; n],
            centroids,
        })
    }

    pub fn num_vertices(&self) -> usize {
        self.xadj.len().saturating_sub(1)
    }

    pub fn neighbors(&self, c: EntityId) -> &[usize] {
        &self.adjncy[self.xadj[c]..self.xadj[c + 1]]
    }
}
