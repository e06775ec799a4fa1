//! Prescribed velocity fields.
//!
//! Oil is carried by a steady, prescribed flow evaluated at cell centroids.
//! The default is the rotational field
//!
//! **u**(x, y) = (y − 0.2·x, −x)
//!
//! which turns the spill clockwise around the origin while drifting it toward
//! the y-axis. Other fields can be plugged in through [`FlowField`].

/// A steady 2D velocity field.
///
/// Implementations must be thread-safe (`Send + Sync`) so a mesh can be
/// re-flowed from parallel code.
pub trait FlowField: Send + Sync {
    /// Velocity (u, v) at position (x, y).
    fn velocity(&self, x: f64, y: f64) -> (f64, f64);

    /// Name of this flow field for logging.
    fn name(&self) -> &'static str;
}

/// Rotational drift field `(y − 0.2·x, −x)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct RotationalFlow;

impl FlowField for RotationalFlow {
    #[inline]
    fn velocity(&self, x: f64, y: f64) -> (f64, f64) {
        (y - 0.2 * x, -x)
    }

    fn name(&self) -> &'static str {
        "rotational"
    }
}

/// Spatially constant flow.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformFlow {
    pub u: f64,
    pub v: f64,
}

impl UniformFlow {
    pub fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }
}

impl FlowField for UniformFlow {
    #[inline]
    fn velocity(&self, _x: f64, _y: f64) -> (f64, f64) {
        (self.u, self.v)
    }

    fn name(&self) -> &'static str {
        "uniform"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotational_flow_formula() {
        let flow = RotationalFlow;
        let (u, v) = flow.velocity(0.5, 1.0);
        assert!((u - 0.9).abs() < 1e-14);
        assert!((v + 0.5).abs() < 1e-14);
    }

    #[test]
    fn test_rotational_flow_origin_is_stagnant() {
        assert_eq!(RotationalFlow.velocity(0.0, 0.0), (0.0, 0.0));
    }

    #[test]
    fn test_uniform_flow() {
        let flow = UniformFlow::new(1.0, -2.0);
        assert_eq!(flow.velocity(3.0, 4.0), (1.0, -2.0));
        assert_eq!(flow.velocity(-3.0, 0.0), (1.0, -2.0));
    }
}
