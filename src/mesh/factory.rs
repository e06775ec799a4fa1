//! Cell factory: raw mesh blocks to [`Cell`]s.

use super::cell::Cell;
use super::error::MeshError;
use super::raw::RawMesh;
use crate::types::{Bounds2D, CellId};

/// Builds cells from a [`RawMesh`], one per index tuple.
///
/// Ids are assigned sequentially over all blocks in reader order, so the
/// resulting vector is indexed by id.
///
/// # Example
/// ```
/// use oilspill::mesh::{CellFactory, RawMesh};
/// use oilspill::types::Bounds2D;
///
/// let raw = RawMesh::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 2, 2);
/// let cells = CellFactory::new(&raw)
///     .with_fishing_zone(Bounds2D::new(0.0, 0.5, 0.0, 0.5))
///     .build()
///     .unwrap();
/// assert_eq!(cells.len(), raw.n_cells());
/// assert!(cells.iter().enumerate().all(|(i, c)| c.id().get() == i));
/// ```
#[derive(Clone, Debug)]
pub struct CellFactory<'a> {
    raw: &'a RawMesh,
    fishing_zone: Option<Bounds2D>,
}

impl<'a> CellFactory<'a> {
    pub fn new(raw: &'a RawMesh) -> Self {
        Self {
            raw,
            fishing_zone: None,
        }
    }

    /// Classify cells against this fishing zone at construction.
    pub fn with_fishing_zone(mut self, zone: Bounds2D) -> Self {
        self.fishing_zone = Some(zone);
        self
    }

    /// Create all cells.
    ///
    /// # Errors
    /// - [`MeshError::PointOutOfRange`] for an index past the point array
    /// - [`MeshError::CornerCount`] for a tuple of the wrong length
    pub fn build(&self) -> Result<Vec<Cell>, MeshError> {
        let n_points = self.raw.points.len();
        let mut cells = Vec::with_capacity(self.raw.n_cells());
        let mut next_id = CellId::ZERO;

        for block in &self.raw.blocks {
            for indices in &block.connectivity {
                let mut corners = Vec::with_capacity(indices.len());
                for &index in indices {
                    let point = self.raw.points.get(index).ok_or(MeshError::PointOutOfRange {
                        id: next_id,
                        index,
                        n_points,
                    })?;
                    corners.push(*point);
                }

                cells.push(Cell::new(
                    next_id,
                    block.kind,
                    corners,
                    self.fishing_zone.as_ref(),
                )?);
                next_id = next_id.next();
            }
        }

        Ok(cells)
    }
}
