//! Algorithms on top of the derived cache: mesh generators and support for
//! external partitioners.

pub mod dual_graph;
pub mod meshgen;
pub mod partition;

pub use dual_graph::CellGraph;
pub use meshgen::{
    MeshGenOptions, StructuredCellType, cylinder_shell, line_mesh, structured_box_2d,
    structured_box_3d,
};
pub use partition::{CellPartitioner, PartitionError, TileSet};
