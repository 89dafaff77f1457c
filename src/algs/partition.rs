//! Tiles of owned cells assigned by an external partitioner.
//!
//! No partitioning algorithm lives here. A [`CellPartitioner`] (any closure
//! over a [`CellGraph`] works) proposes one part index per owned cell and
//! [`TileSet`] checks the proposal before handing out tiles.

use thiserror::Error;

use crate::algs::dual_graph::CellGraph;
use crate::topology::entity::EntityId;

/// Errors from validating a cell-to-tile assignment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PartitionError {
    /// Zero tiles were requested.
    #[error("Cannot partition into zero tiles")]
    ZeroParts,
    /// The assignment does not cover the graph's vertices.
    #[error("Assignment has {found} entries for {expected} owned cells")]
    WrongLength { expected: usize, found: usize },
    /// A cell was sent to a tile index outside `0..num_tiles`.
    #[error("Cell {cell} assigned to tile {tile}, but only {num_tiles} tiles exist")]
    UnknownTile {
        cell: EntityId,
        tile: usize,
        num_tiles: usize,
    },
    /// An explicit tile listing names a cell that is not owned.
    #[error("Cell {0} is not an owned cell")]
    UnknownCell(EntityId),
    /// An explicit tile listing names a cell twice.
    #[error("Cell {0} appears in more than one tile")]
    DuplicateCell(EntityId),
    /// An explicit tile listing leaves a cell out.
    #[error("Cell {0} is not assigned to any tile")]
    MissingCell(EntityId),
}

/// Assigns each vertex of a cell graph (owned cell) to one of `num_tiles`
/// parts.
pub trait CellPartitioner {
    fn assign(&self, graph: &CellGraph, num_tiles: usize) -> Vec<usize>;
}

impl<F> CellPartitioner for F
where
    F: Fn(&CellGraph, usize) -> Vec<usize>,
{
    fn assign(&self, graph: &CellGraph, num_tiles: usize) -> Vec<usize> {
        self(graph, num_tiles)
    }
}

/// Owned cells grouped into tiles; every owned cell is in exactly one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSet {
    tiles: Vec<Vec<EntityId>>,
    tile_of: Vec<usize>,
}

impl TileSet {
    /// Run `partitioner` on `graph` and validate its answer.
    pub fn partition<P: CellPartitioner + ?Sized>(
        graph: &CellGraph,
        num_tiles: usize,
        partitioner: &P,
    ) -> Result<Self, PartitionError> {
        if num_tiles == 0 {
            return Err(PartitionError::ZeroParts);
        }
        let parts = partitioner.assign(graph, num_tiles);
        Self::from_assignment(&parts, graph.num_vertices(), num_tiles)
    }

    /// Build from a per-cell tile index.
    pub fn from_assignment(
        parts: &[usize],
        num_cells: usize,
        num_tiles: usize,
    ) -> Result<Self, PartitionError> {
        if num_tiles == 0 {
            return Err(PartitionError::ZeroParts);
        }
        if parts.len() != num_cells {
            return Err(PartitionError::WrongLength {
                expected: num_cells,
                found: parts.len(),
            });
        }
        let mut tiles = vec![Vec::new(); num_tiles];
        for (cell, &tile) in parts.iter().enumerate() {
            let slot = tiles.get_mut(tile).ok_or(PartitionError::UnknownTile {
                cell,
                tile,
                num_tiles,
            })?;
            slot.push(cell);
        }
        Ok(Self::finish(tiles, parts.to_vec()))
    }

    /// Build from explicit cell lists, one per tile.
    pub fn from_tiles(tiles: Vec<Vec<EntityId>>, num_cells: usize) -> Result<Self, PartitionError> {
        if tiles.is_empty() {
            return Err(PartitionError::ZeroParts);
        }
        let mut tile_of = vec![usize::MAX; num_cells];
        for (t, cells) in tiles.iter().enumerate() {
            for &c in cells {
                let slot = tile_of.get_mut(c).ok_or(PartitionError::UnknownCell(c))?;
                if *slot != usize::MAX {
                    return Err(PartitionError::DuplicateCell(c));
                }
                *slot = t;
            }
        }
        if let Some(c) = tile_of.iter().position(|&t| t == usize::MAX) {
            return Err(PartitionError::MissingCell(c));
        }
        Ok(Self::finish(tiles, tile_of))
    }

    fn finish(tiles: Vec<Vec<EntityId>>, tile_of: Vec<usize>) -> Self {
        let empty = tiles.iter().filter(|t| t.is_empty()).count();
        if empty > 0 {
            log::warn!("{empty} of {} tiles received no cells", tiles.len());
        }
        Self { tiles, tile_of }
    }

    pub fn num_tiles(&self) -> usize {
        self.tiles.len()
    }

    pub fn tile(&self, t: usize) -> &[EntityId] {
        &self.tiles[t]
    }

    pub fn tiles(&self) -> impl Iterator<Item = &[EntityId]> + '_ {
        self.tiles.iter().map(Vec::as_slice)
    }

    pub fn tile_of(&self, cell: EntityId) -> usize {
        self.tile_of[cell]
    }

    /// Number of graph arcs whose ends lie in different tiles, each
    /// undirected edge counted once.
    pub fn edge_cut(&self, graph: &CellGraph) -> usize {
        let mut cut = 0;
        for c in 0..graph.num_vertices() {
            cut += graph
                .neighbors(c)
                .iter()
                .filter(|&&d| c < d && self.tile_of[c] != self.tile_of[d])
                .count();
        }
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph(n: usize) -> CellGraph {
        let mut xadj = vec![0];
        let mut adjncy = Vec::new();
        for i in 0..n {
            if i > 0 {
                adjncy.push(i - 1);
            }
            if i + 1 < n {
                adjncy.push(i + 1);
            }
            xadj.push(adjncy.len());
        }
        CellGraph {
            xadj,
            adjncy,
            vwgt: vec![1; n],
            centroids: (0..n).map(|i| [i as f64 + 0.5, 0.0, 0.0]).collect(),
        }
    }

    #[test]
    fn closure_partitioner_by_centroid() {
        let g = path_graph(4);
        let halves = |g: &CellGraph, k: usize| -> Vec<usize> {
            g.centroids
                .iter()
                .map(|p| ((p[0] / 4.0) * k as f64) as usize)
                .collect()
        };
        let ts = TileSet::partition(&g, 2, &halves).unwrap();
        assert_eq!(ts.tile(0), &[0, 1]);
        assert_eq!(ts.tile(1), &[2, 3]);
        assert_eq!(ts.edge_cut(&g), 1);
    }

    #[test]
    fn zero_tiles_rejected() {
        let g = path_graph(2);
        let p = |_: &CellGraph, _: usize| vec![0usize, 0];
        assert_eq!(TileSet::partition(&g, 0, &p), Err(PartitionError::ZeroParts));
    }

    #[test]
    fn out_of_range_tile_rejected() {
        assert_eq!(
            TileSet::from_assignment(&[0, 3], 2, 2),
            Err(PartitionError::UnknownTile {
                cell: 1,
                tile: 3,
                num_tiles: 2
            })
        );
    }

    #[test]
    fn explicit_tiles_are_checked() {
        assert_eq!(
            TileSet::from_tiles(vec![vec![0, 1], vec![1]], 2),
            Err(PartitionError::DuplicateCell(1))
        );
        assert_eq!(
            TileSet::from_tiles(vec![vec![0], vec![]], 2),
            Err(PartitionError::MissingCell(1))
        );
        assert_eq!(
            TileSet::from_tiles(vec![vec![0, 5]], 2),
            Err(PartitionError::UnknownCell(5))
        );
        let ts = TileSet::from_tiles(vec![vec![1], vec![0]], 2).unwrap();
        assert_eq!(ts.tile_of(0), 1);
    }
}
