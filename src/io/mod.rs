//! File output for renderers and post-processing.
//!
//! - [`vtk`]: VTU frames and `.pvd` collections
//! - [`csv`]: time series of diagnostics
//! - [`output`]: numbered run folders

pub mod csv;
pub mod output;
pub mod vtk;

pub use csv::write_csv;
pub use output::{create_run_folder, next_run_number};
pub use vtk::{VtkError, write_pvd, write_vtk_oil, write_vtk_series};
