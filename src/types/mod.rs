//! Strongly-typed domain types.
//!
//! - [`CellId`]: cell identifier, assigned sequentially by the cell factory
//! - [`Bounds2D`]: axis-aligned rectangle (fishing zone, domain extent)
//! - [`Concentration`]: oil concentration saturated to `[0, 1]`
//!
//! # Example
//!
//! ```
//! use oilspill::types::{Bounds2D, CellId, Concentration};
//!
//! let zone = Bounds2D::new(0.0, 0.45, 0.0, 0.2);
//! assert!(zone.contains_strict(0.2, 0.1));
//!
//! let id = CellId::new(7);
//! assert_eq!(id.get(), 7);
//!
//! assert_eq!(Concentration::new(1.5).value(), 1.0);
//! ```

mod bounds;
mod indices;
mod physical;

pub use bounds::Bounds2D;
pub use indices::CellId;
pub use physical::Concentration;
