//! Numerical flux functions.
//!
//! Scalar edge fluxes for cell-centred advection:
//! - [`upwind_flux`]: first-order upwind (default)
//! - [`lax_friedrichs_flux`]: local Lax-Friedrichs, dissipating at the larger
//!   of the two cells' normal speeds
//!
//! [`FluxScheme`] selects one of them at runtime.

mod upwind;

use std::fmt;

use serde::Deserialize;

pub use upwind::{lax_friedrichs_flux, upwind_flux};

/// Runtime selector for the edge flux.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FluxScheme {
    #[default]
    Upwind,
    LaxFriedrichs,
}

impl FluxScheme {
    /// Evaluate the selected flux.
    ///
    /// `alpha` is the edge dissipation speed; upwind ignores it.
    #[inline]
    pub fn flux(self, u_minus: f64, u_plus: f64, a_n: f64, alpha: f64) -> f64 {
        match self {
            FluxScheme::Upwind => upwind_flux(u_minus, u_plus, a_n),
            FluxScheme::LaxFriedrichs => lax_friedrichs_flux(u_minus, u_plus, a_n, alpha),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FluxScheme::Upwind => "upwind",
            FluxScheme::LaxFriedrichs => "lax_friedrichs",
        }
    }
}

impl fmt::Display for FluxScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Normal advective speed through an edge.
///
/// Averages the two cells' flows and projects onto the scaled normal, so the
/// result carries the edge length.
#[inline]
pub fn normal_velocity(flow_self: (f64, f64), flow_neighbor: (f64, f64), normal: (f64, f64)) -> f64 {
    let u = 0.5 * (flow_self.0 + flow_neighbor.0);
    let v = 0.5 * (flow_self.1 + flow_neighbor.1);
    u * normal.0 + v * normal.1
}

/// Largest normal speed of the two cells on an edge.
///
/// Bounds |[`normal_velocity`]| from above and is the same seen from either side.
#[inline]
pub fn max_normal_speed(flow_self: (f64, f64), flow_neighbor: (f64, f64), normal: (f64, f64)) -> f64 {
    let own = flow_self.0 * normal.0 + flow_self.1 * normal.1;
    let other = flow_neighbor.0 * normal.0 + flow_neighbor.1 * normal.1;
    own.abs().max(other.abs())
}
