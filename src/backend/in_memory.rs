//! In-memory mesh backend and its builder.
//!
//! The builder takes nodes and cells in ownership order (owned, then ghost,
//! then boundary-ghost) and discovers faces and edges itself:
//! - 1D: faces and edges coincide with nodes.
//! - 2D: cells are counter-clockwise node loops; faces and edges coincide.
//!   Flat cells wound the other way are rejected. Surface cells have no
//!   preferred side, but neighbours must agree on their winding.
//! - 3D: cells are lists of outward-wound face loops.
//!
//! Each discovered face/edge takes its natural orientation from its first
//! use and its ownership from the best adjoining cell; discovered entities
//! are then renumbered so that every ownership subset is contiguous.

use hashbrown::HashMap;
use itertools::Itertools;

use super::{GeometryType, MeshBackend, validate_dimensions};
use crate::geometry::primitives::polygon_area_centroid;
use crate::geometry::vector::{Point, pad};
use crate::mesh_error::MeshSubcellError;
use crate::topology::entity::{EntityCounts, EntityId, EntityKind, Ownership};
use crate::topology::orientation::Dir;

fn invalid_geometry(message: impl Into<String>) -> MeshSubcellError {
    MeshSubcellError::InvalidGeometry(message.into())
}

fn topology_error(message: impl Into<String>) -> MeshSubcellError {
    MeshSubcellError::TopologyInconsistency(message.into())
}

/// A fully-connected mesh held in plain vectors.
#[derive(Clone, Debug)]
pub struct InMemoryMesh {
    manifold: usize,
    space: usize,
    geometry: GeometryType,
    coords: Vec<Point>,
    node_counts: EntityCounts,
    edge_counts: EntityCounts,
    face_counts: EntityCounts,
    cell_counts: EntityCounts,
    cell_faces: Vec<Vec<(EntityId, Dir)>>,
    face_cells: Vec<Vec<EntityId>>,
    face_edges: Vec<Vec<(EntityId, Dir)>>,
    face_nodes: Vec<Vec<EntityId>>,
    edge_nodes: Vec<[EntityId; 2]>,
    cell_nodes: Vec<Vec<EntityId>>,
}

impl InMemoryMesh {
    /// Move a node. Derived caches built before the move must be rebuilt
    /// (or queried in recompute mode).
    pub fn set_node_coordinates(
        &mut self,
        node: EntityId,
        coords: &[f64],
    ) -> Result<(), MeshSubcellError> {
        if coords.len() != self.space {
            return Err(invalid_geometry(format!(
                "node {node} has dimension {}, expected {}",
                coords.len(),
                self.space
            )));
        }
        let slot = self
            .coords
            .get_mut(node)
            .ok_or_else(|| invalid_geometry(format!("node {node} does not exist")))?;
        *slot = pad(coords);
        Ok(())
    }
}

impl MeshBackend for InMemoryMesh {
    fn manifold_dimension(&self) -> usize {
        self.manifold
    }

    fn space_dimension(&self) -> usize {
        self.space
    }

    fn geometry_type(&self) -> GeometryType {
        self.geometry
    }

    fn counts(&self, kind: EntityKind) -> EntityCounts {
        match kind {
            EntityKind::Node => self.node_counts,
            EntityKind::Edge => self.edge_counts,
            EntityKind::Face => self.face_counts,
            EntityKind::Cell => self.cell_counts,
            _ => EntityCounts::default(),
        }
    }

    fn cell_faces_and_dirs(&self, cell: EntityId) -> Vec<(EntityId, Dir)> {
        self.cell_faces[cell].clone()
    }

    fn face_cells(&self, face: EntityId) -> Vec<EntityId> {
        self.face_cells[face].clone()
    }

    fn face_edges_and_dirs(&self, face: EntityId) -> Vec<(EntityId, Dir)> {
        self.face_edges[face].clone()
    }

    fn edge_nodes(&self, edge: EntityId) -> [EntityId; 2] {
        self.edge_nodes[edge]
    }

    fn cell_nodes(&self, cell: EntityId) -> Vec<EntityId> {
        self.cell_nodes[cell].clone()
    }

    fn face_nodes(&self, face: EntityId) -> Vec<EntityId> {
        self.face_nodes[face].clone()
    }

    fn node_coordinates(&self, node: EntityId) -> Point {
        self.coords[node]
    }
}

#[derive(Clone, Debug)]
enum CellInput {
    Segment([EntityId; 2]),
    Polygon(Vec<EntityId>),
    Polyhedron(Vec<Vec<EntityId>>),
}

/// Incremental construction of an [`InMemoryMesh`].
#[derive(Clone, Debug)]
pub struct MeshBuilder {
    manifold: usize,
    space: usize,
    geometry: GeometryType,
    coords: Vec<Point>,
    node_own: Vec<Ownership>,
    cells: Vec<CellInput>,
    cell_own: Vec<Ownership>,
}

impl MeshBuilder {
    pub fn new(manifold: usize, space: usize) -> Self {
        Self {
            manifold,
            space,
            geometry: GeometryType::Cartesian,
            coords: Vec::new(),
            node_own: Vec::new(),
            cells: Vec::new(),
            cell_own: Vec::new(),
        }
    }

    pub fn geometry_type(mut self, geometry: GeometryType) -> Self {
        self.geometry = geometry;
        self
    }

    /// Append a node. Nodes must arrive owned, then ghost, then boundary-ghost.
    pub fn add_node(
        &mut self,
        coords: &[f64],
        ownership: Ownership,
    ) -> Result<EntityId, MeshSubcellError> {
        let id = self.coords.len();
        if coords.len() != self.space {
            return Err(invalid_geometry(format!(
                "vertex {id} has dimension {}, expected {}",
                coords.len(),
                self.space
            )));
        }
        check_order(EntityKind::Node, self.node_own.last(), ownership, id)?;
        self.coords.push(pad(coords));
        self.node_own.push(ownership);
        Ok(id)
    }

    /// Append a 1D segment `[n0, n1]` or a 2D counter-clockwise polygon.
    ///
    /// # Errors
    /// `InvalidGeometry` for missing or repeated nodes, and for a flat
    /// polygon whose signed area is not positive.
    pub fn add_cell(
        &mut self,
        nodes: &[EntityId],
        ownership: Ownership,
    ) -> Result<EntityId, MeshSubcellError> {
        let id = self.cells.len();
        self.check_nodes(id, nodes)?;
        let input = match (self.manifold, nodes) {
            (1, &[a, b]) if a != b => CellInput::Segment([a, b]),
            (1, _) => {
                return Err(invalid_geometry(format!(
                    "cell {id}: a 1D cell needs two distinct nodes"
                )));
            }
            (2, _) if nodes.len() >= 3 && nodes.iter().all_unique() => {
                if self.space == 2 {
                    self.check_winding(id, nodes)?;
                }
                CellInput::Polygon(nodes.to_vec())
            }
            (2, _) => {
                return Err(invalid_geometry(format!(
                    "cell {id}: a polygon needs at least three distinct nodes"
                )));
            }
            _ => {
                return Err(invalid_geometry(format!(
                    "cell {id}: use add_polyhedron for {}D cells",
                    self.manifold
                )));
            }
        };
        self.push_cell(input, ownership)
    }

    /// Append a 3D cell given by its face loops, each wound so that its
    /// right-hand normal points out of the cell.
    pub fn add_polyhedron(
        &mut self,
        faces: &[Vec<EntityId>],
        ownership: Ownership,
    ) -> Result<EntityId, MeshSubcellError> {
        let id = self.cells.len();
        if self.manifold != 3 {
            return Err(invalid_geometry(format!(
                "cell {id}: polyhedra need a 3D manifold, not {}D",
                self.manifold
            )));
        }
        if faces.len() < 4 {
            return Err(invalid_geometry(format!(
                "cell {id}: a polyhedron needs at least four faces"
            )));
        }
        for face in faces {
            if face.len() < 3 || !face.iter().all_unique() {
                return Err(invalid_geometry(format!(
                    "cell {id}: face loop {face:?} is degenerate"
                )));
            }
            self.check_nodes(id, face)?;
        }
        self.push_cell(CellInput::Polyhedron(faces.to_vec()), ownership)
    }

    /// Append a hexahedron: `n[0..4]` counter-clockwise on the bottom (seen
    /// from above), `n[4..8]` the matching top nodes.
    pub fn add_hexahedron(
        &mut self,
        n: [EntityId; 8],
        ownership: Ownership,
    ) -> Result<EntityId, MeshSubcellError> {
        let faces = [
            vec![n[0], n[3], n[2], n[1]],
            vec![n[4], n[5], n[6], n[7]],
            vec![n[0], n[1], n[5], n[4]],
            vec![n[1], n[2], n[6], n[5]],
            vec![n[2], n[3], n[7], n[6]],
            vec![n[3], n[0], n[4], n[7]],
        ];
        self.add_polyhedron(&faces, ownership)
    }

    fn check_nodes(&self, cell: EntityId, nodes: &[EntityId]) -> Result<(), MeshSubcellError> {
        match nodes.iter().find(|&&n| n >= self.coords.len()) {
            Some(n) => Err(invalid_geometry(format!(
                "cell {cell} references missing vertex {n}"
            ))),
            None => Ok(()),
        }
    }

    fn check_winding(&self, cell: EntityId, nodes: &[EntityId]) -> Result<(), MeshSubcellError> {
        let ring: Vec<Point> = nodes.iter().map(|&n| self.coords[n]).collect();
        let (area_vec, _) = polygon_area_centroid(&ring);
        if area_vec[2] > 0.0 {
            Ok(())
        } else {
            Err(invalid_geometry(format!(
                "cell {cell}: polygon is not counter-clockwise (signed area {})",
                area_vec[2]
            )))
        }
    }

    fn push_cell(
        &mut self,
        input: CellInput,
        ownership: Ownership,
    ) -> Result<EntityId, MeshSubcellError> {
        let id = self.cells.len();
        check_order(EntityKind::Cell, self.cell_own.last(), ownership, id)?;
        self.cells.push(input);
        self.cell_own.push(ownership);
        Ok(id)
    }

    /// Discover faces and edges and freeze the mesh.
    pub fn build(self) -> Result<InMemoryMesh, MeshSubcellError> {
        validate_dimensions(self.manifold, self.space)?;
        if self.geometry == GeometryType::Spherical && self.manifold != 1 {
            return Err(invalid_geometry("spherical geometry is only defined for 1D meshes"));
        }
        let topo = match self.manifold {
            1 => self.line_topology()?,
            2 => self.planar_topology()?,
            _ => self.solid_topology()?,
        };
        log::debug!(
            "built {}D mesh: {} cells, {} faces, {} edges, {} nodes",
            self.manifold,
            self.cells.len(),
            topo.face_counts.total(),
            topo.edge_counts.total(),
            self.coords.len()
        );
        Ok(InMemoryMesh {
            manifold: self.manifold,
            space: self.space,
            geometry: self.geometry,
            node_counts: tally(&self.node_own),
            cell_counts: tally(&self.cell_own),
            coords: self.coords,
            edge_counts: topo.edge_counts,
            face_counts: topo.face_counts,
            cell_faces: topo.cell_faces,
            face_cells: topo.face_cells,
            face_edges: topo.face_edges,
            face_nodes: topo.face_nodes,
            edge_nodes: topo.edge_nodes,
            cell_nodes: topo.cell_nodes,
        })
    }

    fn line_topology(&self) -> Result<Topology, MeshSubcellError> {
        let n_nodes = self.coords.len();
        let mut face_cells: Vec<Vec<EntityId>> = vec![Vec::new(); n_nodes];
        let mut cell_faces = Vec::with_capacity(self.cells.len());
        let mut cell_nodes = Vec::with_capacity(self.cells.len());
        for (c, input) in self.cells.iter().enumerate() {
            let CellInput::Segment([a, b]) = *input else {
                return Err(invalid_geometry(format!("cell {c} is not a segment")));
            };
            // The node further along +x sees the natural normal outward.
            let b_ahead = self.coords[b][0] >= self.coords[a][0];
            let dir_b = Dir::from_positive(b_ahead);
            for n in [a, b] {
                if face_cells[n].len() == 2 {
                    return Err(topology_error(format!(
                        "node {n} is shared by more than two cells"
                    )));
                }
                face_cells[n].push(c);
            }
            cell_faces.push(vec![(a, -dir_b), (b, dir_b)]);
            cell_nodes.push(vec![a, b]);
        }
        Ok(Topology {
            face_counts: tally(&self.node_own),
            edge_counts: tally(&self.node_own),
            cell_faces,
            face_cells,
            face_edges: (0..n_nodes).map(|n| vec![(n, Dir::POS)]).collect(),
            face_nodes: (0..n_nodes).map(|n| vec![n]).collect(),
            edge_nodes: (0..n_nodes).map(|n| [n, n]).collect(),
            cell_nodes,
        })
    }

    fn planar_topology(&self) -> Result<Topology, MeshSubcellError> {
        let mut edges = Registry::default();
        let mut face_cells: Vec<Vec<EntityId>> = Vec::new();
        let mut cell_faces = Vec::with_capacity(self.cells.len());
        let mut cell_nodes = Vec::with_capacity(self.cells.len());
        for (c, (input, &own)) in self.cells.iter().zip(&self.cell_own).enumerate() {
            let CellInput::Polygon(ring) = input else {
                return Err(invalid_geometry(format!("cell {c} is not a polygon")));
            };
            let mut faces = Vec::with_capacity(ring.len());
            for (a, b) in ring.iter().copied().circular_tuple_windows() {
                let (e, fresh) = edges.intern(&[a, b], own);
                if fresh {
                    face_cells.push(Vec::with_capacity(2));
                }
                let dir = Dir::from_positive(edges.natural[e][0] == a);
                attach_cell(&mut face_cells[e], e, c, dir, fresh)?;
                faces.push((e, dir));
            }
            cell_faces.push(faces);
            cell_nodes.push(ring.clone());
        }

        let (new_of_old, counts) = edges.renumbering();
        let n = new_of_old.len();
        let cell_faces = relabel(cell_faces, &new_of_old);
        let face_cells = permute(face_cells, &new_of_old);
        let edge_nodes: Vec<[EntityId; 2]> = permute(
            edges.natural.into_iter().map(|v| [v[0], v[1]]).collect(),
            &new_of_old,
        );
        Ok(Topology {
            face_counts: counts,
            edge_counts: counts,
            cell_faces,
            face_cells,
            face_edges: (0..n).map(|f| vec![(f, Dir::POS)]).collect(),
            face_nodes: edge_nodes.iter().map(|en| en.to_vec()).collect(),
            edge_nodes,
            cell_nodes,
        })
    }

    fn solid_topology(&self) -> Result<Topology, MeshSubcellError> {
        let mut faces = Registry::default();
        let mut edges = Registry::default();
        let mut face_cells: Vec<Vec<EntityId>> = Vec::new();
        let mut face_edges: Vec<Vec<(EntityId, Dir)>> = Vec::new();
        let mut cell_faces = Vec::with_capacity(self.cells.len());
        let mut cell_nodes = Vec::with_capacity(self.cells.len());
        for (c, (input, &own)) in self.cells.iter().zip(&self.cell_own).enumerate() {
            let CellInput::Polyhedron(loops) = input else {
                return Err(invalid_geometry(format!("cell {c} is not a polyhedron")));
            };
            let mut cf = Vec::with_capacity(loops.len());
            for ring in loops {
                let (f, fresh) = faces.intern(ring, own);
                let dir = if fresh {
                    face_cells.push(Vec::with_capacity(2));
                    face_edges.push(Vec::with_capacity(ring.len()));
                    Dir::POS
                } else {
                    Dir::from_positive(same_winding(&faces.natural[f], ring))
                };
                attach_cell(&mut face_cells[f], f, c, dir, fresh)?;
                for (a, b) in ring.iter().copied().circular_tuple_windows() {
                    let (e, _) = edges.intern(&[a, b], own);
                    if fresh {
                        face_edges[f].push((e, Dir::from_positive(edges.natural[e][0] == a)));
                    }
                }
                cf.push((f, dir));
            }
            cell_faces.push(cf);
            cell_nodes.push(loops.iter().flatten().copied().unique().collect());
        }

        let (face_new, face_counts) = faces.renumbering();
        let (edge_new, edge_counts) = edges.renumbering();
        let face_edges = permute(relabel(face_edges, &edge_new), &face_new);
        Ok(Topology {
            face_counts,
            edge_counts,
            cell_faces: relabel(cell_faces, &face_new),
            face_cells: permute(face_cells, &face_new),
            face_edges,
            face_nodes: permute(faces.natural, &face_new),
            edge_nodes: permute(
                edges.natural.into_iter().map(|v| [v[0], v[1]]).collect(),
                &edge_new,
            ),
            cell_nodes,
        })
    }
}

struct Topology {
    face_counts: EntityCounts,
    edge_counts: EntityCounts,
    cell_faces: Vec<Vec<(EntityId, Dir)>>,
    face_cells: Vec<Vec<EntityId>>,
    face_edges: Vec<Vec<(EntityId, Dir)>>,
    face_nodes: Vec<Vec<EntityId>>,
    edge_nodes: Vec<[EntityId; 2]>,
    cell_nodes: Vec<Vec<EntityId>>,
}

/// Deduplicates node tuples (faces, edges) under any permutation.
#[derive(Default)]
struct Registry {
    index: HashMap<Vec<EntityId>, usize>,
    natural: Vec<Vec<EntityId>>,
    best: Vec<Ownership>,
}

impl Registry {
    /// Id of the entity spanned by `nodes`, and whether it was new.
    fn intern(&mut self, nodes: &[EntityId], own: Ownership) -> (usize, bool) {
        let mut key = nodes.to_vec();
        key.sort_unstable();
        if let Some(&id) = self.index.get(&key) {
            self.best[id] = self.best[id].min(own);
            (id, false)
        } else {
            let id = self.natural.len();
            self.index.insert(key, id);
            self.natural.push(nodes.to_vec());
            self.best.push(own);
            (id, true)
        }
    }

    /// Stable renumbering placing owned, then ghost, then boundary-ghost.
    fn renumbering(&self) -> (Vec<usize>, EntityCounts) {
        let mut order: Vec<usize> = (0..self.best.len()).collect();
        order.sort_by_key(|&i| self.best[i]);
        let mut new_of_old = vec![0; order.len()];
        for (new, &old) in order.iter().enumerate() {
            new_of_old[old] = new;
        }
        (new_of_old, tally(&self.best))
    }
}

fn tally(own: &[Ownership]) -> EntityCounts {
    let mut counts = EntityCounts::default();
    for &o in own {
        counts.bump(o, 1);
    }
    counts
}

fn check_order(
    kind: EntityKind,
    prev: Option<&Ownership>,
    next: Ownership,
    id: EntityId,
) -> Result<(), MeshSubcellError> {
    match prev {
        Some(&p) if p > next => Err(MeshSubcellError::OwnershipOrder { kind, id }),
        _ => Ok(()),
    }
}

/// Record that `cell` adjoins `face`, rejecting a third cell or two cells
/// that both see the face's natural normal as outward.
fn attach_cell(
    cells: &mut Vec<EntityId>,
    face: usize,
    cell: EntityId,
    dir: Dir,
    fresh: bool,
) -> Result<(), MeshSubcellError> {
    if !fresh {
        if cells.len() >= 2 {
            return Err(topology_error(format!(
                "face {face} is shared by more than two cells"
            )));
        }
        if dir.is_positive() {
            return Err(topology_error(format!(
                "cells {} and {cell} wind face {face} the same way",
                cells[0]
            )));
        }
    }
    cells.push(cell);
    Ok(())
}

/// Whether `ring` traverses the same cycle as `natural` in the same direction.
fn same_winding(natural: &[EntityId], ring: &[EntityId]) -> bool {
    let n = natural.len();
    match natural.iter().position(|&v| v == ring[0]) {
        Some(pos) => natural[(pos + 1) % n] == ring[1],
        None => false,
    }
}

fn relabel(
    lists: Vec<Vec<(EntityId, Dir)>>,
    new_of_old: &[usize],
) -> Vec<Vec<(EntityId, Dir)>> {
    lists
        .into_iter()
        .map(|l| l.into_iter().map(|(id, d)| (new_of_old[id], d)).collect())
        .collect()
}

fn permute<T>(items: Vec<T>, new_of_old: &[usize]) -> Vec<T> {
    let mut tagged: Vec<(usize, T)> = new_of_old.iter().copied().zip(items).collect();
    tagged.sort_by_key(|(k, _)| *k);
    tagged.into_iter().map(|(_, t)| t).collect()
}
