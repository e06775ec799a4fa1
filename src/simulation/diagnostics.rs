//! Oil diagnostics and progress reporting.

use std::time::Instant;

use crate::mesh::Mesh2D;

/// Integral quantities of the oil field at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OilDiagnostics {
    /// Simulation time.
    pub time: f64,
    /// Σ oil over triangles.
    pub total_oil: f64,
    /// Σ oil over fishing triangles.
    pub fishing_oil: f64,
    /// Σ oil·area over triangles.
    pub mass: f64,
    /// Largest triangle concentration.
    pub max_oil: f64,
}

impl OilDiagnostics {
    /// Compute diagnostics of `mesh` at `time`.
    pub fn compute(mesh: &Mesh2D, time: f64) -> Self {
        let mut mass = 0.0;
        let mut max_oil: f64 = 0.0;
        for cell in mesh.triangles() {
            mass += cell.oil() * cell.area().unwrap_or(0.0);
            max_oil = max_oil.max(cell.oil());
        }
        Self {
            time,
            total_oil: mesh.total_oil(),
            fishing_oil: mesh.fishing_oil(),
            mass,
            max_oil,
        }
    }

    /// Fraction of total oil inside the fishing zone.
    pub fn fishing_fraction(&self) -> f64 {
        if self.total_oil > 0.0 {
            self.fishing_oil / self.total_oil
        } else {
            0.0
        }
    }

    /// One-line summary for progress output.
    pub fn summary_line(&self) -> String {
        format!(
            "oil={:.5} fishing={:.5} mass={:.4e} max={:.3}",
            self.total_oil, self.fishing_oil, self.mass, self.max_oil
        )
    }
}

/// Reports simulation progress every N percent of simulated time.
pub struct ProgressReporter {
    /// Start time of simulation (wall clock)
    start_instant: Instant,
    t_start: f64,
    t_end: f64,
    /// Last reported progress percentage
    last_reported_pct: u32,
    /// Report interval in percentage points
    report_interval_pct: u32,
    /// Number of timesteps taken
    n_steps: usize,
}

impl ProgressReporter {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    /// * `t_start`, `t_end` - Simulated time span
    /// * `report_interval_pct` - Report every N percent (e.g., 10 for 10%, 20%, ...)
    pub fn new(t_start: f64, t_end: f64, report_interval_pct: u32) -> Self {
        Self {
            start_instant: Instant::now(),
            t_start,
            t_end,
            last_reported_pct: 0,
            report_interval_pct: report_interval_pct.max(1),
            n_steps: 0,
        }
    }

    /// Record a timestep.
    pub fn step(&mut self) {
        self.n_steps += 1;
    }

    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    fn percent(&self, current_time: f64) -> f64 {
        let span = self.t_end - self.t_start;
        if span > 0.0 {
            ((current_time - self.t_start) / span * 100.0).clamp(0.0, 100.0)
        } else {
            100.0
        }
    }

    /// Check and report progress if threshold reached.
    ///
    /// Returns true if progress was reported.
    pub fn maybe_report(&mut self, current_time: f64, diag: Option<&OilDiagnostics>) -> bool {
        // Rounding guards against t_start + n·dt landing just below a threshold.
        let pct = (self.percent(current_time) + 1e-9) as u32;
        let threshold = self.last_reported_pct + self.report_interval_pct;

        if pct >= threshold || (pct == 100 && self.last_reported_pct < 100) {
            self.report(current_time, diag);
            self.last_reported_pct = (pct / self.report_interval_pct) * self.report_interval_pct;
            true
        } else {
            false
        }
    }

    /// Force a progress report.
    pub fn report(&self, current_time: f64, diag: Option<&OilDiagnostics>) {
        let elapsed = self.start_instant.elapsed().as_secs_f64();
        let pct = self.percent(current_time);

        let eta = if pct > 0.1 {
            format_duration(elapsed * 100.0 / pct - elapsed)
        } else {
            "calculating...".to_string()
        };
        let steps_per_sec = if elapsed > 0.0 {
            self.n_steps as f64 / elapsed
        } else {
            0.0
        };
        let summary = diag.map(OilDiagnostics::summary_line).unwrap_or_default();

        tracing::info!(
            "[{:>5.1}%] t={:.4} | elapsed={} | ETA={} | {:.0} steps/s {}",
            pct,
            current_time,
            format_duration(elapsed),
            eta,
            steps_per_sec,
            summary
        );
    }

    /// Log the final summary.
    pub fn finish(&self, final_time: f64) -> f64 {
        let elapsed = self.start_instant.elapsed().as_secs_f64();
        let steps_per_sec = if elapsed > 0.0 {
            self.n_steps as f64 / elapsed
        } else {
            0.0
        };
        tracing::info!(
            final_time,
            steps = self.n_steps,
            wall = %format_duration(elapsed),
            steps_per_sec = format!("{steps_per_sec:.1}"),
            "simulation complete"
        );
        elapsed
    }
}

/// Format a duration in seconds as human-readable string.
pub fn format_duration(secs: f64) -> String {
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else if secs < 3600.0 {
        let mins = (secs / 60.0).floor();
        let s = secs - mins * 60.0;
        format!("{:.0}m{:.0}s", mins, s)
    } else {
        let hours = (secs / 3600.0).floor();
        let mins = ((secs - hours * 3600.0) / 60.0).floor();
        format!("{:.0}h{:.0}m", hours, mins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Bounds2D;

    #[test]
    fn test_diagnostics_uniform_field() {
        let zone = Bounds2D::new(0.0, 0.5, 0.0, 1.0);
        let mut mesh = Mesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 4, 4, Some(zone)).unwrap();
        mesh.set_oil_by(|_, _| 0.5);

        let diag = OilDiagnostics::compute(&mesh, 1.5);
        assert_eq!(diag.time, 1.5);
        assert!((diag.total_oil - 16.0).abs() < 1e-12);
        assert!((diag.fishing_oil - 8.0).abs() < 1e-12);
        assert!((diag.mass - 0.5).abs() < 1e-12);
        assert!((diag.max_oil - 0.5).abs() < 1e-12);
        assert!((diag.fishing_fraction() - 0.5).abs() < 1e-12);
        assert!(diag.summary_line().contains("fishing="));
    }

    #[test]
    fn test_progress_reporter_thresholds() {
        let mut reporter = ProgressReporter::new(1.0, 2.0, 25);
        assert_eq!(reporter.n_steps(), 0);
        assert!(!reporter.maybe_report(1.1, None));
        assert!(reporter.maybe_report(1.25, None));
        assert!(!reporter.maybe_report(1.3, None));
        assert!(reporter.maybe_report(1.75, None));
        assert!(reporter.maybe_report(2.0, None));
        assert!(!reporter.maybe_report(2.0, None));
        reporter.step();
        assert_eq!(reporter.n_steps(), 1);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(30.0), "30.0s");
        assert_eq!(format_duration(90.0), "1m30s");
        assert_eq!(format_duration(3700.0), "1h1m");
    }
}
