//! Cell adjacency discovery.
//!
//! Two cells are neighbours iff they share at least two corner points, that
//! is, a full edge. Touching at a single vertex does not count.
//!
//! Instead of comparing every pair of cells, a point → cells multimap is built
//! in one pass over all corners. Each cell then only tallies the cells listed
//! under its own corners, which makes the whole build O(N·K) for N cells with
//! K corners each.

use std::collections::HashMap;

use super::cell::{Cell, Point3};
use super::error::MeshError;
use crate::types::CellId;

/// Hashable key for a corner coordinate.
///
/// Coordinates are compared bit-exactly (after folding `-0.0` into `0.0`),
/// which is what a mesh reader sharing one point array produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PointKey([u64; 3]);

impl PointKey {
    #[inline]
    pub fn new(point: &Point3) -> Self {
        Self([
            (point[0] + 0.0).to_bits(),
            (point[1] + 0.0).to_bits(),
            (point[2] + 0.0).to_bits(),
        ])
    }
}

/// Distinct corner keys of a cell, in corner order.
pub(crate) fn corner_keys(cell: &Cell) -> Vec<PointKey> {
    let mut keys: Vec<PointKey> = Vec::with_capacity(cell.corners().len());
    for p in cell.corners() {
        let key = PointKey::new(p);
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

/// Multimap from corner point to the ids of all cells using it.
#[derive(Clone, Debug, Default)]
pub struct PointCellIndex {
    map: HashMap<PointKey, Vec<CellId>>,
}

impl PointCellIndex {
    /// Build the index in one pass over every cell's corners.
    pub fn build(cells: &[Cell]) -> Self {
        let mut map: HashMap<PointKey, Vec<CellId>> = HashMap::new();
        for cell in cells {
            for key in corner_keys(cell) {
                map.entry(key).or_default().push(cell.id());
            }
        }
        Self { map }
    }

    /// Cells that have `point` as a corner.
    pub fn cells_at(&self, point: &Point3) -> &[CellId] {
        self.map
            .get(&PointKey::new(point))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of distinct points indexed.
    pub fn n_points(&self) -> usize {
        self.map.len()
    }
}

/// Id → position lookup into a cell slice.
#[derive(Clone, Debug, Default)]
pub struct CellLookup {
    positions: HashMap<CellId, usize>,
}

impl CellLookup {
    /// # Errors
    /// [`MeshError::DuplicateId`] if two cells carry the same id.
    pub fn build(cells: &[Cell]) -> Result<Self, MeshError> {
        let mut positions = HashMap::with_capacity(cells.len());
        for (pos, cell) in cells.iter().enumerate() {
            if positions.insert(cell.id(), pos).is_some() {
                return Err(MeshError::DuplicateId(cell.id()));
            }
        }
        Ok(Self { positions })
    }

    /// Position of a cell in the slice the lookup was built from.
    #[inline]
    pub fn position(&self, id: CellId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// Resolve an id against the slice the lookup was built from.
    #[inline]
    pub fn get<'c>(&self, cells: &'c [Cell], id: CellId) -> Option<&'c Cell> {
        self.position(id).and_then(|pos| cells.get(pos))
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Cells sharing at least two corner points with `cell`, in order of discovery.
pub fn find_neighbors(cell: &Cell, index: &PointCellIndex) -> Vec<CellId> {
    // Small vector tally: K is 1..=4, candidates rarely exceed a dozen.
    let mut counts: Vec<(CellId, usize)> = Vec::new();

    for key in corner_keys(cell) {
        let Some(users) = index.map.get(&key) else {
            continue;
        };
        for &other in users {
            if other == cell.id() {
                continue;
            }
            match counts.iter_mut().find(|(id, _)| *id == other) {
                Some((_, n)) => *n += 1,
                None => counts.push((other, 1)),
            }
        }
    }

    counts
        .into_iter()
        .filter(|&(_, shared)| shared >= 2)
        .map(|(id, _)| id)
        .collect()
}

/// Populate every cell's neighbour list.
///
/// The relation is recorded in both directions as soon as one side discovers
/// it, so `B ∈ A.neighbors ⟺ A ∈ B.neighbors` holds whatever the processing
/// order. Lists are sorted by id at the end, which makes the result identical
/// for any permutation of `cells`.
///
/// # Errors
/// [`MeshError::UnknownNeighbor`] if the index names an id missing from `lookup`.
pub fn build_topology(
    cells: &mut [Cell],
    index: &PointCellIndex,
    lookup: &CellLookup,
) -> Result<(), MeshError> {
    for cell in cells.iter_mut() {
        cell.neighbors.clear();
    }

    for pos in 0..cells.len() {
        let id = cells[pos].id();
        for other in find_neighbors(&cells[pos], index) {
            let other_pos = lookup.position(other).ok_or(MeshError::UnknownNeighbor {
                cell: id,
                neighbor: other,
            })?;

            if !cells[pos].neighbors.contains(&other) {
                cells[pos].neighbors.push(other);
            }
            let back = &mut cells[other_pos].neighbors;
            if !back.contains(&id) {
                back.push(id);
            }
        }
    }

    for cell in cells.iter_mut() {
        cell.neighbors.sort_unstable();
    }

    Ok(())
}
