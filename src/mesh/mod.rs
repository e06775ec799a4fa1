//! Mesh representation.
//!
//! Provides the unstructured 2D mesh used by the transport solver:
//! - Cell variants (triangle, quad, line, vertex) with derived geometry
//! - Mesh-reader output blocks and the factory turning them into cells
//! - Topology (edge adjacency via a point → cells index)
//! - Outward, edge-length scaled normals per neighbour
//! - Gmsh mesh file I/O

mod cell;
mod error;
mod factory;
pub mod gmsh;
mod mesh2d;
mod normals;
mod raw;
mod topology;

pub use cell::{Cell, CellKind, Point3};
pub use error::MeshError;
pub use factory::CellFactory;
pub use gmsh::{GmshError, parse_gmsh, read_gmsh_mesh, write_gmsh_mesh};
pub use mesh2d::Mesh2D;
pub use normals::{build_normals, compute_scaled_normals, scaled_normal};
pub use raw::{CellBlock, RawMesh};
pub use topology::{CellLookup, PointCellIndex, PointKey, build_topology, find_neighbors};
