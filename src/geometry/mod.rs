//! Geometric quantities for cells, faces, edges, sides, wedges and corners.
//!
//! The formulas live in one strategy per manifold dimension ([`line`],
//! [`planar`], [`solid`]) behind [`kernel::GeometryKernel`];
//! [`quantities`] assembles their inputs from a backend and caches results.

pub mod kernel;
pub mod line;
pub mod planar;
pub mod primitives;
pub mod quantities;
pub mod solid;
pub mod vector;

pub use kernel::{
    CellGeometry, EdgeGeometry, FaceGeometry, GeometryKernel, GeometryStrategy, SideGeometry,
    WedgeGeometry,
};
pub use vector::Point;
