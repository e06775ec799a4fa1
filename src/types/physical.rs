//! Physical quantity newtypes.

use std::fmt;

/// Oil concentration, always within `[0, 1]`.
///
/// Construction saturates instead of failing: values above one become one,
/// negative values become zero. NaN is treated as "no oil" so that long runs
/// are never stopped by a transient numerical excursion.
///
/// # Example
///
/// ```
/// use oilspill::types::Concentration;
///
/// assert_eq!(Concentration::new(1.5).value(), 1.0);
/// assert_eq!(Concentration::new(-0.2).value(), 0.0);
/// assert_eq!(Concentration::new(0.3).value(), 0.3);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Concentration(f64);

impl Concentration {
    /// No oil.
    pub const ZERO: Self = Self(0.0);

    /// Fully saturated.
    pub const FULL: Self = Self(1.0);

    /// Create a concentration, clamping to `[0, 1]`.
    #[inline]
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            Self::ZERO
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    /// Get the raw value.
    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Concentration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}", self.0)
    }
}

impl From<f64> for Concentration {
    #[inline]
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Concentration> for f64 {
    #[inline]
    fn from(c: Concentration) -> f64 {
        c.0
    }
}
