//! Source and sink terms.
//!
//! Points (the ship, oil sources, oil sinks) act on nearby cells through a
//! distance kernel. Their effect is precomputed once per mesh into
//! per-cell coefficient maps which the corrector step consumes:
//!
//! - [`Kernel`]: uniform, linear or gaussian distance decay
//! - [`PointSource`]: position, radius, strength and kernel of one point
//! - [`CoefficientMap`]: cell id → coefficient, additive
//! - [`SourceSinkSet`]: everything configured for a run

mod coefficients;
mod kernel;
mod point_source;
mod set;

pub use coefficients::CoefficientMap;
pub use kernel::Kernel;
pub use point_source::{
    DEFAULT_RADIUS, DEFAULT_SIGMA, DEFAULT_SINK_STRENGTH, DEFAULT_SOURCE_STRENGTH, PointSource,
};
pub use set::{SourceCoefficients, SourceSinkSet};
