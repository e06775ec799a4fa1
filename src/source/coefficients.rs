//! Per-cell source/sink coefficient maps.

use std::collections::HashMap;

use crate::types::CellId;

/// Mapping from cell id to a non-negative coefficient.
///
/// Cells absent from the map have coefficient 0. Contributions from several
/// points to the same cell add up.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CoefficientMap {
    values: HashMap<CellId, f64>,
}

impl CoefficientMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value` to the coefficient of `id`.
    pub fn add(&mut self, id: CellId, value: f64) {
        *self.values.entry(id).or_insert(0.0) += value;
    }

    /// Add every entry of `other` into this map.
    pub fn merge(&mut self, other: &CoefficientMap) {
        for (&id, &value) in &other.values {
            self.add(id, value);
        }
    }

    /// Coefficient of `id`, 0 if absent.
    #[inline]
    pub fn get(&self, id: CellId) -> f64 {
        self.values.get(&id).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, id: CellId) -> bool {
        self.values.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Largest coefficient, if any.
    pub fn max(&self) -> Option<f64> {
        self.values.values().copied().reduce(f64::max)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CellId, f64)> + '_ {
        self.values.iter().map(|(&id, &v)| (id, v))
    }
}

impl FromIterator<(CellId, f64)> for CoefficientMap {
    fn from_iter<I: IntoIterator<Item = (CellId, f64)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (id, value) in iter {
            map.add(id, value);
        }
        map
    }
}
