//! Upwind-type numerical fluxes for scalar advection across one edge.
//!
//! `a_n` is the advective speed through the edge, `dot(flow_avg, n)` with the
//! edge-length scaled outward normal `n`, so every flux here is already
//! integrated over the edge.
//!
//! F^* = a_n u^- if a_n > 0  (outflow, interior value)
//! F^* = a_n u^+ if a_n ≤ 0  (inflow, neighbour value)

/// Upwind numerical flux.
///
/// # Arguments
/// * `u_minus` - Value in the current cell
/// * `u_plus` - Value in the neighbour cell
/// * `a_n` - Normal advective speed, positive when leaving the current cell
///
/// # Returns
/// The edge flux F^* (positive = outflow)
#[inline]
pub fn upwind_flux(u_minus: f64, u_plus: f64, a_n: f64) -> f64 {
    if a_n > 0.0 {
        a_n * u_minus
    } else {
        a_n * u_plus
    }
}

/// Local Lax-Friedrichs (Rusanov) numerical flux.
///
/// F^* = 0.5 a_n (u^- + u^+) - 0.5 α (u^+ - u^-)
///
/// `alpha` is the dissipation speed, raised to at least |a_n| so the flux is
/// never less diffusive than upwind. With α = |a_n| it equals [`upwind_flux`].
#[inline]
pub fn lax_friedrichs_flux(u_minus: f64, u_plus: f64, a_n: f64, alpha: f64) -> f64 {
    let alpha = alpha.max(a_n.abs());
    0.5 * a_n * (u_minus + u_plus) - 0.5 * alpha * (u_plus - u_minus)
}
