//! Mesh construction and integrity errors.

use thiserror::Error;

use super::cell::CellKind;
use crate::types::CellId;

/// Error raised while building cells, topology or scaled normals.
#[derive(Debug, Error)]
pub enum MeshError {
    /// A cell was given the wrong number of corner points for its kind.
    #[error("{kind} cell {id} needs {expected} corners, got {found}")]
    CornerCount {
        id: CellId,
        kind: CellKind,
        expected: usize,
        found: usize,
    },

    /// A block references a point index outside the point array.
    #[error("cell {id} references point {index}, but the mesh has {n_points} points")]
    PointOutOfRange {
        id: CellId,
        index: usize,
        n_points: usize,
    },

    /// A mesh block carries a type tag with no cell kind.
    #[error("unsupported cell type: {0}")]
    UnsupportedCellType(String),

    /// A neighbour id is not known to the cell lookup.
    #[error("cell {cell} lists neighbour {neighbor}, which is not in the mesh")]
    UnknownNeighbor { cell: CellId, neighbor: CellId },

    /// Two cells are recorded as neighbours but do not share an edge.
    #[error("cells {cell} and {neighbor} share {shared} point(s), need 2 for an edge")]
    MissingSharedEdge {
        cell: CellId,
        neighbor: CellId,
        shared: usize,
    },

    /// Two cells were given the same id.
    #[error("duplicate cell id {0}")]
    DuplicateId(CellId),
}
