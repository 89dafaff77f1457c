//! Basic mesh generators for lines, structured boxes and simple shells.
//!
//! Every generator can mark the cells nearest the `+x` end (or the last
//! angular columns of a shell) as ghost and boundary-ghost layers, which is
//! how parallel partitions look to the derived-entity machinery.

use serde::{Deserialize, Serialize};

use crate::backend::{GeometryType, InMemoryMesh, MeshBuilder};
use crate::mesh_error::MeshSubcellError;
use crate::topology::entity::{EntityId, Ownership};

/// Cell-type choices for structured meshes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum StructuredCellType {
    Triangle,
    Quadrilateral,
}

/// Optional metadata for mesh generators.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshGenOptions {
    /// Columns of ghost cells before the boundary-ghost columns.
    pub ghost_layers: usize,
    /// Columns of boundary-ghost cells at the far end.
    pub boundary_ghost_layers: usize,
    /// Only meaningful for 1D meshes.
    pub geometry_type: GeometryType,
}

impl MeshGenOptions {
    /// Ownership of a cell in column `i` of `n`.
    fn tier(&self, i: usize, n: usize) -> Ownership {
        if i + self.boundary_ghost_layers >= n {
            Ownership::BoundaryGhost
        } else if i + self.boundary_ghost_layers + self.ghost_layers >= n {
            Ownership::Ghost
        } else {
            Ownership::Owned
        }
    }

    fn check(&self, columns: usize) -> Result<(), MeshSubcellError> {
        if self.ghost_layers + self.boundary_ghost_layers > columns {
            return Err(invalid_geometry(format!(
                "{} ghost and {} boundary-ghost layers exceed {columns} columns",
                self.ghost_layers, self.boundary_ghost_layers
            )));
        }
        Ok(())
    }
}

fn invalid_geometry(message: impl Into<String>) -> MeshSubcellError {
    MeshSubcellError::InvalidGeometry(message.into())
}

#[derive(Clone, Copy, Debug)]
enum Shape {
    /// Segment or polygon node loop.
    Loop,
    /// Eight nodes, bottom then top, each counter-clockwise from above.
    Hexahedron,
}

/// Feed generated vertices and cells to a [`MeshBuilder`] in ownership
/// order. A vertex takes the best ownership among its cells.
fn build_mesh(
    manifold: usize,
    space: usize,
    geometry: GeometryType,
    vertices: &[Vec<f64>],
    cells: Vec<(Vec<usize>, Ownership)>,
    shape: Shape,
) -> Result<InMemoryMesh, MeshSubcellError> {
    let mut vertex_own = vec![Ownership::BoundaryGhost; vertices.len()];
    let mut used = vec![false; vertices.len()];
    for (nodes, own) in &cells {
        for &v in nodes {
            let slot = vertex_own
                .get_mut(v)
                .ok_or_else(|| invalid_geometry(format!("missing vertex {v}")))?;
            *slot = (*slot).min(*own);
            used[v] = true;
        }
    }
    if let Some(v) = used.iter().position(|&u| !u) {
        log::warn!("vertex {v} is not used by any cell");
    }

    let mut order: Vec<usize> = (0..vertices.len()).collect();
    order.sort_by_key(|&v| vertex_own[v]);
    let mut new_id = vec![0; vertices.len()];
    let mut builder = MeshBuilder::new(manifold, space).geometry_type(geometry);
    for &v in &order {
        new_id[v] = builder.add_node(&vertices[v], vertex_own[v])?;
    }

    let mut cells = cells;
    cells.sort_by_key(|(_, own)| *own);
    for (nodes, own) in cells {
        let nodes: Vec<EntityId> = nodes.iter().map(|&v| new_id[v]).collect();
        match shape {
            Shape::Loop => builder.add_cell(&nodes, own)?,
            Shape::Hexahedron => {
                let hex: [EntityId; 8] = nodes
                    .try_into()
                    .map_err(|_| invalid_geometry("hexahedra need eight nodes"))?;
                builder.add_hexahedron(hex, own)?
            }
        };
    }
    builder.build()
}

/// Generate `n` segments uniformly over `[min, max]`.
///
/// With [`GeometryType::Spherical`] the coordinate is a radius and `min`
/// must be non-negative.
pub fn line_mesh(
    n: usize,
    min: f64,
    max: f64,
    options: MeshGenOptions,
) -> Result<InMemoryMesh, MeshSubcellError> {
    if n == 0 {
        return Err(invalid_geometry("n must be positive"));
    }
    if options.geometry_type == GeometryType::Spherical && min < 0.0 {
        return Err(invalid_geometry("spherical radii must be non-negative"));
    }
    options.check(n)?;

    let dx = (max - min) / n as f64;
    let vertices: Vec<Vec<f64>> = (0..=n).map(|i| vec![min + dx * i as f64]).collect();
    let cells = (0..n)
        .map(|i| (vec![i, i + 1], options.tier(i, n)))
        .collect();
    build_mesh(1, 1, options.geometry_type, &vertices, cells, Shape::Loop)
}

/// Generate a structured 2D box mesh over `[min, max]` with `nx`×`ny` cells.
pub fn structured_box_2d(
    nx: usize,
    ny: usize,
    min: [f64; 2],
    max: [f64; 2],
    cell_type: StructuredCellType,
    options: MeshGenOptions,
) -> Result<InMemoryMesh, MeshSubcellError> {
    if nx == 0 || ny == 0 {
        return Err(invalid_geometry("nx and ny must be positive"));
    }
    options.check(nx)?;

    let dx = (max[0] - min[0]) / nx as f64;
    let dy = (max[1] - min[1]) / ny as f64;
    let mut vertices = Vec::with_capacity((nx + 1) * (ny + 1));
    for j in 0..=ny {
        let y = min[1] + dy * j as f64;
        for i in 0..=nx {
            let x = min[0] + dx * i as f64;
            vertices.push(vec![x, y]);
        }
    }

    let mut cells = Vec::new();
    let row_stride = nx + 1;
    for j in 0..ny {
        for i in 0..nx {
            let v0 = j * row_stride + i;
            let v1 = v0 + 1;
            let v3 = v0 + row_stride;
            let v2 = v3 + 1;
            let own = options.tier(i, nx);
            if cell_type == StructuredCellType::Triangle {
                cells.push((vec![v0, v1, v2], own));
                cells.push((vec![v0, v2, v3], own));
            } else {
                cells.push((vec![v0, v1, v2, v3], own));
            }
        }
    }

    build_mesh(2, 2, GeometryType::Cartesian, &vertices, cells, Shape::Loop)
}

/// Generate a structured 3D hexahedral box mesh over `[min, max]` with
/// `nx`×`ny`×`nz` cells.
pub fn structured_box_3d(
    nx: usize,
    ny: usize,
    nz: usize,
    min: [f64; 3],
    max: [f64; 3],
    options: MeshGenOptions,
) -> Result<InMemoryMesh, MeshSubcellError> {
    if nx == 0 || ny == 0 || nz == 0 {
        return Err(invalid_geometry("nx, ny, and nz must be positive"));
    }
    options.check(nx)?;

    let dx = (max[0] - min[0]) / nx as f64;
    let dy = (max[1] - min[1]) / ny as f64;
    let dz = (max[2] - min[2]) / nz as f64;
    let mut vertices = Vec::with_capacity((nx + 1) * (ny + 1) * (nz + 1));
    for k in 0..=nz {
        let z = min[2] + dz * k as f64;
        for j in 0..=ny {
            let y = min[1] + dy * j as f64;
            for i in 0..=nx {
                let x = min[0] + dx * i as f64;
                vertices.push(vec![x, y, z]);
            }
        }
    }

    let mut cells = Vec::with_capacity(nx * ny * nz);
    let row_stride = nx + 1;
    let slab_stride = row_stride * (ny + 1);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let v0 = k * slab_stride + j * row_stride + i;
                let v1 = v0 + 1;
                let v3 = v0 + row_stride;
                let v2 = v3 + 1;
                let v4 = v0 + slab_stride;
                let v5 = v4 + 1;
                let v7 = v4 + row_stride;
                let v6 = v7 + 1;
                cells.push((vec![v0, v1, v2, v3, v4, v5, v6, v7], options.tier(i, nx)));
            }
        }
    }

    build_mesh(3, 3, GeometryType::Cartesian, &vertices, cells, Shape::Hexahedron)
}

/// Generate a cylindrical surface (quads in 3D space) with `n_theta` columns
/// around and `n_z` bands along the height. Layers count angular columns.
pub fn cylinder_shell(
    radius: f64,
    height: f64,
    n_theta: usize,
    n_z: usize,
    options: MeshGenOptions,
) -> Result<InMemoryMesh, MeshSubcellError> {
    if radius <= 0.0 || height <= 0.0 {
        return Err(invalid_geometry("radius and height must be positive"));
    }
    if n_theta < 3 || n_z < 1 {
        return Err(invalid_geometry(
            "cylinder shell requires n_theta >= 3 and n_z >= 1",
        ));
    }
    options.check(n_theta)?;

    let mut vertices = Vec::new();
    let mut rings: Vec<Vec<usize>> = Vec::with_capacity(n_z + 1);
    let two_pi = std::f64::consts::TAU;
    for k in 0..=n_z {
        let z = height * (k as f64) / (n_z as f64);
        let mut ring = Vec::with_capacity(n_theta);
        for t in 0..n_theta {
            let phi = two_pi * (t as f64) / (n_theta as f64);
            ring.push(vertices.len());
            vertices.push(vec![radius * phi.cos(), radius * phi.sin(), z]);
        }
        rings.push(ring);
    }

    let mut cells = Vec::with_capacity(n_theta * n_z);
    for band in rings.windows(2) {
        let (ring_a, ring_b) = (&band[0], &band[1]);
        for t in 0..n_theta {
            let next = (t + 1) % n_theta;
            cells.push((
                vec![ring_a[t], ring_a[next], ring_b[next], ring_b[t]],
                options.tier(t, n_theta),
            ));
        }
    }

    build_mesh(2, 3, GeometryType::Cartesian, &vertices, cells, Shape::Loop)
}
