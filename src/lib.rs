//! # oilspill
//!
//! Oil transport on unstructured 2D triangular meshes using a first-order
//! cell-centred finite-volume scheme.
//!
//! This crate provides:
//! - Gmsh mesh reading and cell topology (neighbours, outward scaled normals)
//! - Prescribed flow fields
//! - Upwind edge fluxes and a predictor-corrector time step
//! - Point sources and sinks with distance kernels
//! - TOML run configuration
//! - VTU/PVD frames and CSV diagnostics

pub mod config;
pub mod flow;
pub mod flux;
pub mod io;
pub mod mesh;
pub mod simulation;
pub mod source;
pub mod time;
pub mod types;

// Re-export main types for convenience
pub use config::{ConfigError, SimConfig, SpillConfig, load_configs};
pub use flow::{FlowField, RotationalFlow, UniformFlow};
pub use flux::{FluxScheme, lax_friedrichs_flux, max_normal_speed, normal_velocity, upwind_flux};
pub use io::{VtkError, write_csv, write_pvd, write_vtk_oil, write_vtk_series};
pub use mesh::{
    Cell, CellKind, GmshError, Mesh2D, MeshError, RawMesh, build_topology, read_gmsh_mesh,
};
pub use simulation::{OilDiagnostics, Simulation, SimulationError, SimulationResult, StepRecord};
pub use source::{Kernel, PointSource, SourceCoefficients, SourceSinkSet};
pub use time::{StepError, advance, corrector, predictor};
pub use types::{Bounds2D, CellId, Concentration};
