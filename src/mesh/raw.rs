//! Raw mesh data as delivered by a mesh reader.
//!
//! A [`RawMesh`] is the hand-off format between a file reader and the cell
//! factory: a point array plus typed blocks of index tuples into it.

use super::cell::{CellKind, Point3};
use super::error::MeshError;

/// A block of cells of one kind.
#[derive(Clone, Debug, PartialEq)]
pub struct CellBlock {
    /// Cell kind shared by all entries.
    pub kind: CellKind,
    /// Point indices per cell.
    pub connectivity: Vec<Vec<usize>>,
}

impl CellBlock {
    pub fn new(kind: CellKind, connectivity: Vec<Vec<usize>>) -> Self {
        Self { kind, connectivity }
    }

    /// Block from a reader type tag such as `"triangle"`.
    ///
    /// # Errors
    /// [`MeshError::UnsupportedCellType`] for a tag with no [`CellKind`].
    pub fn from_tag(tag: &str, connectivity: Vec<Vec<usize>>) -> Result<Self, MeshError> {
        let kind =
            CellKind::from_tag(tag).ok_or_else(|| MeshError::UnsupportedCellType(tag.to_string()))?;
        Ok(Self::new(kind, connectivity))
    }

    /// Number of cells in the block.
    pub fn len(&self) -> usize {
        self.connectivity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connectivity.is_empty()
    }
}

/// Point coordinates and typed cell blocks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawMesh {
    /// Point coordinates (x, y, z).
    pub points: Vec<Point3>,
    /// Cell blocks in reader order. Cell ids follow this order.
    pub blocks: Vec<CellBlock>,
}

impl RawMesh {
    pub fn new(points: Vec<Point3>, blocks: Vec<CellBlock>) -> Self {
        Self { points, blocks }
    }

    /// Total number of cells over all blocks.
    pub fn n_cells(&self) -> usize {
        self.blocks.iter().map(CellBlock::len).sum()
    }

    /// Number of cells of a given kind.
    pub fn n_cells_of(&self, kind: CellKind) -> usize {
        self.blocks
            .iter()
            .filter(|b| b.kind == kind)
            .map(CellBlock::len)
            .sum()
    }

    /// Triangulated rectangle `[x0, x1] × [y0, y1]`.
    ///
    /// Each of the `nx × ny` grid squares is split along its diagonal into two
    /// counter-clockwise triangles. The outer boundary is added as a `line`
    /// block, so the result looks like what a mesh generator would export.
    ///
    /// # Panics
    /// Panics if `nx` or `ny` is zero, or the bounds are empty.
    pub fn uniform_rectangle(x0: f64, x1: f64, y0: f64, y1: f64, nx: usize, ny: usize) -> Self {
        assert!(
            nx > 0 && ny > 0,
            "Need at least one element in each direction"
        );
        assert!(x1 > x0 && y1 > y0, "Invalid domain bounds");

        let dx = (x1 - x0) / nx as f64;
        let dy = (y1 - y0) / ny as f64;

        let mut points = Vec::with_capacity((nx + 1) * (ny + 1));
        for j in 0..=ny {
            for i in 0..=nx {
                points.push([x0 + i as f64 * dx, y0 + j as f64 * dy, 0.0]);
            }
        }

        let vertex = |i: usize, j: usize| j * (nx + 1) + i;

        let mut triangles = Vec::with_capacity(2 * nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                let v0 = vertex(i, j);
                let v1 = vertex(i + 1, j);
                let v2 = vertex(i + 1, j + 1);
                let v3 = vertex(i, j + 1);
                triangles.push(vec![v0, v1, v2]);
                triangles.push(vec![v0, v2, v3]);
            }
        }

        let mut lines = Vec::with_capacity(2 * (nx + ny));
        for i in 0..nx {
            lines.push(vec![vertex(i, 0), vertex(i + 1, 0)]);
        }
        for j in 0..ny {
            lines.push(vec![vertex(nx, j), vertex(nx, j + 1)]);
        }
        for i in (0..nx).rev() {
            lines.push(vec![vertex(i + 1, ny), vertex(i, ny)]);
        }
        for j in (0..ny).rev() {
            lines.push(vec![vertex(0, j + 1), vertex(0, j)]);
        }

        Self {
            points,
            blocks: vec![
                CellBlock::new(CellKind::Line, lines),
                CellBlock::new(CellKind::Triangle, triangles),
            ],
        }
    }
}
