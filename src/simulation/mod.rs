//! Simulation runner.
//!
//! Ties together the pieces of one run:
//! - Mesh loading and the initial spill
//! - Source/sink coefficients
//! - The predictor-corrector step
//! - Diagnostics, progress logging and file output
//!
//! # Example
//! ```no_run
//! use oilspill::config::load_configs;
//! use oilspill::simulation::Simulation;
//! use std::path::Path;
//!
//! for config in load_configs(Path::new("Defaults/input.toml")).unwrap() {
//!     let result = Simulation::from_config(config).unwrap().run().unwrap();
//!     println!("{}: {} steps", result.name, result.n_steps);
//! }
//! ```

mod diagnostics;
mod runner;

pub use diagnostics::{OilDiagnostics, ProgressReporter, format_duration};
pub use runner::{Simulation, SimulationError, SimulationResult, StepRecord};
