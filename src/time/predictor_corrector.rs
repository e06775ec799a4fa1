//! Predictor-corrector step for oil transport.
//!
//! One timestep is two synchronous sweeps over the triangle cells:
//!
//! 1. Predictor: advective flux from a snapshot of every cell's oil
//!    `u_half = u - dt/A Σ_j F^*(u, u_j, a_n,j)`
//! 2. Corrector: implicit source/sink coupling
//!    `u_new = u_half / (1 + dt S- - dt S+)`
//!
//! Line and vertex cells are not transported; they keep their value and are
//! skipped as flux partners.

use thiserror::Error;

use crate::flux::{FluxScheme, max_normal_speed, normal_velocity};
use crate::mesh::{Cell, Mesh2D};
use crate::source::SourceCoefficients;
use crate::types::CellId;

/// Corrector denominators at or below this magnitude are not divided by.
pub const DENOMINATOR_EPS: f64 = 1e-12;

/// Data-integrity failure detected during a step.
#[derive(Debug, Error)]
pub enum StepError {
    /// Topology and normals are out of step for a cell.
    #[error("cell {cell} has {normals} scaled normals for {neighbors} neighbours")]
    MissingNormal {
        cell: CellId,
        neighbors: usize,
        normals: usize,
    },

    /// A neighbour id is not known to the mesh.
    #[error("cell {cell} lists unknown neighbour {neighbor}")]
    UnknownNeighbor { cell: CellId, neighbor: CellId },

    /// A triangle without positive area cannot carry a concentration.
    #[error("triangle {cell} has non-positive area {area}")]
    DegenerateCell { cell: CellId, area: f64 },

    /// Snapshot or half-step vector does not match the mesh.
    #[error("state vector has {found} values for {expected} cells")]
    StateLength { expected: usize, found: usize },
}

fn check_length(mesh: &Mesh2D, values: &[f64]) -> Result<(), StepError> {
    if values.len() != mesh.n_cells() {
        return Err(StepError::StateLength {
            expected: mesh.n_cells(),
            found: values.len(),
        });
    }
    Ok(())
}

/// Half-step value of one cell (non-triangles return their snapshot value).
///
/// `pos` is the cell's position in `mesh.cells()` and in `snapshot`; callers
/// check `snapshot` against the mesh first.
pub(crate) fn cell_half_step(
    mesh: &Mesh2D,
    pos: usize,
    snapshot: &[f64],
    dt: f64,
    scheme: FluxScheme,
) -> Result<f64, StepError> {
    let cell: &Cell = &mesh.cells()[pos];
    let u = snapshot[pos];
    if !cell.is_triangle() {
        return Ok(u);
    }

    let area = cell.area().unwrap_or(0.0);
    if area.is_nan() || area <= 0.0 {
        return Err(StepError::DegenerateCell {
            cell: cell.id(),
            area,
        });
    }

    let neighbors = cell.neighbors();
    let normals = cell.scaled_normals();
    if normals.len() != neighbors.len() {
        return Err(StepError::MissingNormal {
            cell: cell.id(),
            neighbors: neighbors.len(),
            normals: normals.len(),
        });
    }

    let mut flux_sum = 0.0;
    for (&nb, &normal) in neighbors.iter().zip(normals) {
        let nb_pos = mesh.position(nb).ok_or(StepError::UnknownNeighbor {
            cell: cell.id(),
            neighbor: nb,
        })?;
        let neighbor = &mesh.cells()[nb_pos];
        if !neighbor.is_triangle() {
            continue;
        }
        let a_n = normal_velocity(cell.flow(), neighbor.flow(), normal);
        let alpha = max_normal_speed(cell.flow(), neighbor.flow(), normal);
        flux_sum += scheme.flux(u, snapshot[nb_pos], a_n, alpha);
    }

    Ok(u - dt / area * flux_sum)
}

/// Predictor sweep.
///
/// Reads only `snapshot` (indexed by cell position), never the cells' live
/// oil, and returns the half-step value of every cell.
pub fn predictor(
    mesh: &Mesh2D,
    snapshot: &[f64],
    dt: f64,
    scheme: FluxScheme,
) -> Result<Vec<f64>, StepError> {
    check_length(mesh, snapshot)?;
    (0..mesh.n_cells())
        .map(|pos| cell_half_step(mesh, pos, snapshot, dt, scheme))
        .collect()
}

/// Predictor sweep on the rayon thread pool.
///
/// Identical results to [`predictor`]; cells are independent given the snapshot.
#[cfg(feature = "parallel")]
pub fn predictor_parallel(
    mesh: &Mesh2D,
    snapshot: &[f64],
    dt: f64,
    scheme: FluxScheme,
) -> Result<Vec<f64>, StepError> {
    use rayon::prelude::*;

    check_length(mesh, snapshot)?;
    (0..mesh.n_cells())
        .into_par_iter()
        .map(|pos| cell_half_step(mesh, pos, snapshot, dt, scheme))
        .collect()
}

/// Corrected value from a half-step value and the cell's coefficients.
///
/// Falls back to `u_half` when `|1 + dt S- - dt S+| ≤ DENOMINATOR_EPS`.
#[inline]
pub fn corrector_value(u_half: f64, s_plus: f64, s_minus: f64, dt: f64) -> f64 {
    let denominator = 1.0 + dt * s_minus - dt * s_plus;
    if denominator.abs() > DENOMINATOR_EPS {
        u_half / denominator
    } else {
        u_half
    }
}

/// Corrector sweep: writes the new oil of every triangle (clamped by the cell).
pub fn corrector(
    mesh: &mut Mesh2D,
    half: &[f64],
    coefficients: &SourceCoefficients,
    dt: f64,
) -> Result<(), StepError> {
    check_length(mesh, half)?;
    for (cell, &u_half) in mesh.cells_mut().iter_mut().zip(half) {
        if !cell.is_triangle() {
            continue;
        }
        let id = cell.id();
        let value = corrector_value(
            u_half,
            coefficients.plus.get(id),
            coefficients.minus.get(id),
            dt,
        );
        cell.set_oil(value);
    }
    Ok(())
}

/// Advance the mesh one timestep: snapshot, predictor, corrector.
pub fn advance(
    mesh: &mut Mesh2D,
    coefficients: &SourceCoefficients,
    dt: f64,
    scheme: FluxScheme,
) -> Result<(), StepError> {
    let snapshot = mesh.oil_snapshot();

    #[cfg(feature = "parallel")]
    let half = predictor_parallel(mesh, &snapshot, dt, scheme)?;
    #[cfg(not(feature = "parallel"))]
    let half = predictor(mesh, &snapshot, dt, scheme)?;

    corrector(mesh, &half, coefficients, dt)
}
