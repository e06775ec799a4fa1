//! Time integration.

mod predictor_corrector;

pub use predictor_corrector::{
    DENOMINATOR_EPS, StepError, advance, corrector, corrector_value, predictor,
};

#[cfg(feature = "parallel")]
pub use predictor_corrector::predictor_parallel;
