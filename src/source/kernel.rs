//! Distance-decay kernels for point sources and sinks.

use std::f64::consts::PI;
use std::fmt;

/// Weight of a point source as a function of distance.
///
/// All kernels are cut off at the source radius by the caller; inside it:
/// - `Uniform`: 1
/// - `Linear`: 1 - d/r
/// - `Gaussian`: exp(-d²/(2σ²)) / (2πσ²)
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Kernel {
    Uniform,
    Linear,
    Gaussian {
        /// Standard deviation of the bell.
        sigma: f64,
    },
}

impl Default for Kernel {
    fn default() -> Self {
        Kernel::Gaussian { sigma: 1.0 }
    }
}

impl Kernel {
    /// Parse a kernel from its configuration name.
    ///
    /// `sigma` is only used by the gaussian kernel.
    pub fn from_mode(mode: &str, sigma: f64) -> Option<Self> {
        match mode {
            "uniform" => Some(Kernel::Uniform),
            "linear" => Some(Kernel::Linear),
            "gaussian" => Some(Kernel::Gaussian { sigma }),
            _ => None,
        }
    }

    /// Configuration name of the kernel.
    pub fn mode(&self) -> &'static str {
        match self {
            Kernel::Uniform => "uniform",
            Kernel::Linear => "linear",
            Kernel::Gaussian { .. } => "gaussian",
        }
    }

    /// Evaluate at distance `d` for a source of cutoff `radius`.
    ///
    /// Returns 0 outside the radius.
    pub fn evaluate(&self, d: f64, radius: f64) -> f64 {
        if d > radius {
            return 0.0;
        }
        match self {
            Kernel::Uniform => 1.0,
            Kernel::Linear => {
                if radius > 0.0 {
                    1.0 - d / radius
                } else {
                    1.0
                }
            }
            Kernel::Gaussian { sigma } => {
                let two_s2 = 2.0 * sigma * sigma;
                (-(d * d) / two_s2).exp() / (PI * two_s2)
            }
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kernel::Gaussian { sigma } => write!(f, "gaussian(σ={sigma})"),
            other => f.write_str(other.mode()),
        }
    }
}
