//! Simulation runner implementation.
//!
//! Ties a validated [`SimConfig`] to a mesh, the source/sink coefficients and
//! the predictor-corrector step, and records the oil field after every step.

use std::path::PathBuf;

use thiserror::Error;

use super::diagnostics::{OilDiagnostics, ProgressReporter};
use crate::config::{ConfigError, SimConfig};
use crate::io::{VtkError, create_run_folder, write_csv, write_pvd, write_vtk_series};
use crate::mesh::{GmshError, Mesh2D, MeshError, read_gmsh_mesh};
use crate::source::SourceCoefficients;
use crate::time::{StepError, advance};
use crate::types::CellId;

// =============================================================================
// Errors
// =============================================================================

/// Any failure of a simulation run.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to read mesh {path}: {source}")]
    MeshFile {
        path: PathBuf,
        #[source]
        source: GmshError,
    },

    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Step(#[from] StepError),

    #[error(transparent)]
    Vtk(#[from] VtkError),

    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Simulation Result
// =============================================================================

/// Oil field after one step.
#[derive(Clone, Debug)]
pub struct StepRecord {
    /// Step index; 0 is the initial state.
    pub step: usize,
    /// Triangle oil, aligned with [`SimulationResult::triangle_ids`].
    pub oil: Vec<f64>,
    pub diagnostics: OilDiagnostics,
}

/// Result of a simulation run.
#[derive(Clone, Debug)]
pub struct SimulationResult {
    /// Run name (config file stem).
    pub name: String,
    /// Number of the output run folder, if files were written.
    pub run: Option<usize>,
    /// Output run folder, if files were written.
    pub output_folder: Option<PathBuf>,
    /// Total number of time steps taken.
    pub n_steps: usize,
    /// Final simulation time reached.
    pub final_time: f64,
    /// Total wall-clock time in seconds.
    pub wall_time: f64,
    /// Ids of the triangle cells, ascending.
    pub triangle_ids: Vec<CellId>,
    /// Fishing membership per triangle, recorded once.
    pub fishing_mask: Vec<bool>,
    /// One record per step, the initial state first.
    pub records: Vec<StepRecord>,
    /// VTU frames written, with their times.
    pub frames: Vec<(f64, PathBuf)>,
}

impl SimulationResult {
    pub fn times(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.diagnostics.time).collect()
    }

    pub fn total_oil(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.diagnostics.total_oil).collect()
    }

    pub fn fishing_oil(&self) -> Vec<f64> {
        self.records
            .iter()
            .map(|r| r.diagnostics.fishing_oil)
            .collect()
    }

    /// `(cell id, oil)` pairs of one record.
    pub fn oil_pairs(&self, record: usize) -> Option<Vec<(CellId, f64)>> {
        let record = self.records.get(record)?;
        Some(
            self.triangle_ids
                .iter()
                .copied()
                .zip(record.oil.iter().copied())
                .collect(),
        )
    }

    pub fn last(&self) -> Option<&StepRecord> {
        self.records.last()
    }
}

/// Where and when frames are written.
struct OutputPlan {
    run: usize,
    folder: PathBuf,
    write_frequency: usize,
}

impl OutputPlan {
    /// First step, last step and every `write_frequency` steps.
    fn should_write(&self, step: usize, n_steps: usize) -> bool {
        step == 1 || step == n_steps || step % self.write_frequency == 0
    }
}

// =============================================================================
// Simulation Runner
// =============================================================================

/// High-level simulation runner.
///
/// # Example
/// ```no_run
/// use oilspill::config::SimConfig;
/// use oilspill::simulation::Simulation;
/// use std::path::Path;
///
/// let config = SimConfig::load(Path::new("cases/bay.toml")).unwrap();
/// let result = Simulation::from_config(config).unwrap().run().unwrap();
/// println!("final oil: {:?}", result.last().map(|r| r.diagnostics.total_oil));
/// ```
pub struct Simulation {
    config: SimConfig,
    mesh: Mesh2D,
    coefficients: SourceCoefficients,
    step: usize,
    progress_interval_pct: u32,
}

impl Simulation {
    /// Read the configured mesh and set up the run.
    pub fn from_config(config: SimConfig) -> Result<Self, SimulationError> {
        let raw = read_gmsh_mesh(&config.mesh_path).map_err(|source| SimulationError::MeshFile {
            path: config.mesh_path.clone(),
            source,
        })?;
        let mesh = Mesh2D::from_raw(&raw, Some(config.borders))?;
        Ok(Self::new(config, mesh))
    }

    /// Set up a run on an already built mesh.
    ///
    /// The mesh's fishing flags are used as they are; build it with
    /// `config.borders` as fishing zone to match [`Simulation::from_config`].
    /// Initial oil comes from the configured spill and replaces any oil
    /// already in the mesh.
    pub fn new(config: SimConfig, mut mesh: Mesh2D) -> Self {
        let spill = config.spill;
        mesh.set_oil_by(|x, y| spill.concentration(x, y));
        let coefficients = config.sources.coefficients(&mesh);
        Self {
            config,
            mesh,
            coefficients,
            step: 0,
            progress_interval_pct: 10,
        }
    }

    /// Report progress every `pct` percent of simulated time.
    pub fn with_progress_interval(mut self, pct: u32) -> Self {
        self.progress_interval_pct = pct;
        self
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn mesh(&self) -> &Mesh2D {
        &self.mesh
    }

    pub fn coefficients(&self) -> &SourceCoefficients {
        &self.coefficients
    }

    /// Steps taken so far.
    pub fn step_count(&self) -> usize {
        self.step
    }

    #[inline]
    pub fn dt(&self) -> f64 {
        self.config.dt()
    }

    /// Current simulation time `t_start + step · dt`.
    pub fn time(&self) -> f64 {
        self.config.t_start + self.step as f64 * self.dt()
    }

    /// Advance one timestep.
    pub fn step(&mut self) -> Result<(), StepError> {
        advance(
            &mut self.mesh,
            &self.coefficients,
            self.config.dt(),
            self.config.flux_scheme,
        )?;
        self.step += 1;
        Ok(())
    }

    fn record(&self) -> StepRecord {
        StepRecord {
            step: self.step,
            oil: self.mesh.triangle_oil(),
            diagnostics: OilDiagnostics::compute(&self.mesh, self.time()),
        }
    }

    /// Run all configured steps.
    pub fn run(&mut self) -> Result<SimulationResult, SimulationError> {
        self.run_with_callback(|_, _| {})
    }

    /// Run all configured steps, calling `callback` after the initial state
    /// and after every step.
    pub fn run_with_callback<F>(&mut self, mut callback: F) -> Result<SimulationResult, SimulationError>
    where
        F: FnMut(&Mesh2D, &StepRecord),
    {
        let n_steps = self.config.n_steps;
        let output = if self.config.write_frequency > 0 {
            let (run, folder) = create_run_folder(&self.config.output_dir, &self.config.name)?;
            tracing::info!(run, folder = %folder.display(), "writing output");
            Some(OutputPlan {
                run,
                folder,
                write_frequency: self.config.write_frequency,
            })
        } else {
            None
        };

        tracing::info!(
            name = %self.config.name,
            n_steps,
            dt = self.dt(),
            t_start = self.config.t_start,
            t_end = self.config.t_end,
            "starting simulation"
        );

        let mut reporter = ProgressReporter::new(
            self.config.t_start,
            self.config.t_end,
            self.progress_interval_pct,
        );
        let mut records = Vec::with_capacity(n_steps + 1);
        let mut frames = Vec::new();

        let initial = self.record();
        callback(&self.mesh, &initial);
        records.push(initial);

        for step in 1..=n_steps {
            self.step()?;
            reporter.step();

            let record = self.record();
            callback(&self.mesh, &record);
            reporter.maybe_report(record.diagnostics.time, Some(&record.diagnostics));

            if let Some(plan) = &output
                && plan.should_write(step, n_steps)
            {
                let t = record.diagnostics.time;
                tracing::info!(
                    time = t,
                    total_oil = %format!("{:.5}", record.diagnostics.total_oil),
                    fishing_oil = %format!("{:.5}", record.diagnostics.fishing_oil),
                    "writing frame {step}"
                );
                let path = write_vtk_series(plan.folder.join("oil"), step, &self.mesh, t)?;
                frames.push((t, path));
            }
            records.push(record);
        }

        if let Some(plan) = &output {
            write_pvd(plan.folder.join("oil.pvd"), &frames)?;
            let times: Vec<f64> = records.iter().map(|r| r.diagnostics.time).collect();
            let total: Vec<f64> = records.iter().map(|r| r.diagnostics.total_oil).collect();
            let fishing: Vec<f64> = records.iter().map(|r| r.diagnostics.fishing_oil).collect();
            write_csv(
                plan.folder.join("diagnostics.csv"),
                &["time", "total_oil", "fishing_oil"],
                &[times.as_slice(), total.as_slice(), fishing.as_slice()],
            )?;
        }

        let wall_time = reporter.finish(self.time());

        Ok(SimulationResult {
            name: self.config.name.clone(),
            run: output.as_ref().map(|p| p.run),
            output_folder: output.map(|p| p.folder),
            n_steps: self.step,
            final_time: self.time(),
            wall_time,
            triangle_ids: self.mesh.triangles().map(|c| c.id()).collect(),
            fishing_mask: self.mesh.fishing_mask(),
            records,
            frames,
        })
    }
}
