//! 2D rectangular bounds.

use std::fmt;

/// Axis-aligned rectangle `[x_min, x_max] × [y_min, y_max]`.
///
/// Used for the fishing zone border and for domain extents.
///
/// # Example
///
/// ```
/// use oilspill::types::Bounds2D;
///
/// let b = Bounds2D::new(0.0, 2.0, 0.0, 1.0);
/// assert_eq!(b.width(), 2.0);
/// assert!(b.contains(2.0, 1.0));
/// assert!(!b.contains_strict(2.0, 1.0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds2D {
    /// Minimum x-coordinate
    pub x_min: f64,
    /// Maximum x-coordinate
    pub x_max: f64,
    /// Minimum y-coordinate
    pub y_min: f64,
    /// Maximum y-coordinate
    pub y_max: f64,
}

impl Bounds2D {
    /// Create new bounds.
    ///
    /// # Panics
    ///
    /// Panics if `x_max <= x_min` or `y_max <= y_min`.
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        assert!(
            x_max > x_min,
            "x_max ({}) must be greater than x_min ({})",
            x_max,
            x_min
        );
        assert!(
            y_max > y_min,
            "y_max ({}) must be greater than y_min ({})",
            y_max,
            y_min
        );

        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Create bounds, returning `None` when either interval is empty or NaN.
    pub fn try_new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Option<Self> {
        if x_max > x_min && y_max > y_min {
            Some(Self {
                x_min,
                x_max,
                y_min,
                y_max,
            })
        } else {
            None
        }
    }

    /// Smallest bounds containing all `(x, y)` points.
    ///
    /// Returns `None` for an empty iterator or a degenerate extent.
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;
        for (x, y) in points {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
        Self::try_new(x_min, x_max, y_min, y_max)
    }

    /// Width (x_max - x_min).
    #[inline]
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Height (y_max - y_min).
    #[inline]
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> (f64, f64) {
        (
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }

    /// Check if a point is inside the bounds (inclusive).
    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
    }

    /// Check if a point lies strictly inside the bounds (edges excluded).
    #[inline]
    pub fn contains_strict(&self, x: f64, y: f64) -> bool {
        self.x_min < x && x < self.x_max && self.y_min < y && y < self.y_max
    }
}

impl fmt::Display for Bounds2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.3}, {:.3}] × [{:.3}, {:.3}]",
            self.x_min, self.x_max, self.y_min, self.y_max
        )
    }
}
