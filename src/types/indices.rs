//! Strongly-typed index newtypes.

use std::fmt;

/// Generate an index newtype with conversions.
macro_rules! define_index {
    (
        $(#[$meta:meta])*
        $name:ident, $display_prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name(usize);

        impl $name {
            /// Create a new index.
            #[inline]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            /// Get the raw index value.
            #[inline]
            pub const fn get(self) -> usize {
                self.0
            }

            /// First index (0).
            pub const ZERO: Self = Self(0);

            /// Increment index by one.
            #[inline]
            pub fn next(self) -> Self {
                Self(self.0 + 1)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl From<$name> for usize {
            #[inline]
            fn from(idx: $name) -> usize {
                idx.0
            }
        }
    };
}

define_index!(
    /// Cell identifier.
    ///
    /// Ids are handed out sequentially across all mesh blocks, so for a mesh
    /// built by the factory the id doubles as the cell's position.
    ///
    /// # Example
    ///
    /// ```
    /// use oilspill::types::CellId;
    ///
    /// let id = CellId::ZERO.next().next();
    /// assert_eq!(id, CellId::new(2));
    /// assert_eq!(id.to_string(), "C2");
    /// ```
    CellId,
    "C"
);
