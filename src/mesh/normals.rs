//! Scaled outward normals on shared edges.
//!
//! For a cell and one neighbour, the shared edge A→B is rotated by 90° to
//! n = (d_y, −d_x) with d = B − A. The vector is **not** normalised: its
//! length equals the edge length, so `dot(flow, n)` is directly the volume
//! flux through the edge. The sign is then fixed so that n points away from
//! the cell's own centroid. Lines and vertices have their centroid on the
//! edge, so their normal is oriented toward the neighbour's centroid instead.

use std::cmp::Ordering;

use super::cell::{Cell, Point3};
use super::error::MeshError;
use super::topology::{CellLookup, PointKey, corner_keys};

/// Lexicographic order on (x, y, z).
fn cmp_points(a: &Point3, b: &Point3) -> Ordering {
    a[0].total_cmp(&b[0])
        .then(a[1].total_cmp(&b[1]))
        .then(a[2].total_cmp(&b[2]))
}

/// Distinct points that are corners of both cells.
fn shared_points(cell: &Cell, neighbor: &Cell) -> Vec<Point3> {
    let other: Vec<PointKey> = corner_keys(neighbor);
    let mut seen: Vec<PointKey> = Vec::new();
    let mut shared = Vec::new();
    for p in cell.corners() {
        let key = PointKey::new(p);
        if other.contains(&key) && !seen.contains(&key) {
            seen.push(key);
            shared.push(*p);
        }
    }
    shared
}

/// Outward normal of `cell` on the edge it shares with `neighbor`, scaled to
/// the edge length.
///
/// The two shared points are sorted lexicographically first, so the result
/// does not depend on corner order.
///
/// # Errors
/// [`MeshError::MissingSharedEdge`] if the cells share fewer than two points.
pub fn scaled_normal(cell: &Cell, neighbor: &Cell) -> Result<(f64, f64), MeshError> {
    let mut shared = shared_points(cell, neighbor);
    if shared.len() < 2 {
        return Err(MeshError::MissingSharedEdge {
            cell: cell.id(),
            neighbor: neighbor.id(),
            shared: shared.len(),
        });
    }
    shared.sort_by(cmp_points);

    let a = shared[0];
    let b = shared[1];
    let d = (b[0] - a[0], b[1] - a[1]);
    let mut n = (d.1, -d.0);

    let dot_from_a = |(x, y): (f64, f64)| n.0 * (x - a[0]) + n.1 * (y - a[1]);
    let flip = if cell.kind().has_area() {
        dot_from_a(cell.centroid_xy()) > 0.0
    } else {
        dot_from_a(neighbor.centroid_xy()) < 0.0
    };
    if flip {
        n = (-n.0, -n.1);
    }

    Ok(n)
}

/// Scaled normals for every neighbour of `cell`, aligned with `cell.neighbors()`.
///
/// # Errors
/// - [`MeshError::UnknownNeighbor`] if a neighbour id is not in `lookup`
/// - [`MeshError::MissingSharedEdge`] if a neighbour has no shared edge
pub fn compute_scaled_normals(
    cell: &Cell,
    cells: &[Cell],
    lookup: &CellLookup,
) -> Result<Vec<(f64, f64)>, MeshError> {
    cell.neighbors()
        .iter()
        .map(|&id| {
            let neighbor = lookup.get(cells, id).ok_or(MeshError::UnknownNeighbor {
                cell: cell.id(),
                neighbor: id,
            })?;
            scaled_normal(cell, neighbor)
        })
        .collect()
}

/// Populate `scaled_normals` for all cells. Requires neighbour lists.
///
/// Either every cell gets a complete, aligned list or the mesh is rejected;
/// there is no partial result.
pub fn build_normals(cells: &mut [Cell], lookup: &CellLookup) -> Result<(), MeshError> {
    let normals = cells
        .iter()
        .map(|cell| compute_scaled_normals(cell, cells, lookup))
        .collect::<Result<Vec<_>, _>>()?;

    for (cell, n) in cells.iter_mut().zip(normals) {
        cell.scaled_normals = n;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{CellKind, topology};
    use crate::types::CellId;

    const TOL: f64 = 1e-12;

    fn tri(id: usize, corners: [Point3; 3]) -> Cell {
        Cell::new(CellId::new(id), CellKind::Triangle, corners.to_vec(), None).unwrap()
    }

    fn pair() -> (Cell, Cell) {
        (
            tri(0, [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 1.0, 0.0]]),
            tri(1, [[1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.5, 1.0, 0.0]]),
        )
    }

    #[test]
    fn test_two_triangle_normal_value() {
        let (a, b) = pair();
        let n = scaled_normal(&a, &b).unwrap();
        assert!((n.0 - 1.0).abs() < TOL);
        assert!((n.1 - 0.5).abs() < TOL);

        let m = scaled_normal(&b, &a).unwrap();
        assert!((m.0 + 1.0).abs() < TOL);
        assert!((m.1 + 0.5).abs() < TOL);
    }

    #[test]
    fn test_magnitude_is_edge_length() {
        let (a, b) = pair();
        let n = scaled_normal(&a, &b).unwrap();
        let edge_len = (0.5_f64.powi(2) + 1.0).sqrt();
        assert!(((n.0 * n.0 + n.1 * n.1).sqrt() - edge_len).abs() < TOL);
    }

    #[test]
    fn test_independent_of_corner_order() {
        let (a, b) = pair();
        let a_rot = tri(0, [[0.5, 1.0, 0.0], [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
        assert_eq!(
            scaled_normal(&a, &b).unwrap(),
            scaled_normal(&a_rot, &b).unwrap()
        );
    }

    #[test]
    fn test_line_normal_points_to_neighbor() {
        let (a, _) = pair();
        // Both corner orders of the bottom edge of `a`.
        for corners in [
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
            vec![[1.0, 0.0, 0.0], [0.0, 0.0, 0.0]],
        ] {
            let line = Cell::new(CellId::new(5), CellKind::Line, corners, None).unwrap();
            let n = scaled_normal(&line, &a).unwrap();
            let (ax, ay) = a.centroid_xy();
            assert!(n.0 * (ax - 0.5) + n.1 * ay > 0.0);
            assert!((n.0).abs() < TOL && (n.1 - 1.0).abs() < TOL);

            // The triangle still points away from itself, out of the domain.
            let m = scaled_normal(&a, &line).unwrap();
            assert!(m.0.abs() < TOL && (m.1 + 1.0).abs() < TOL);
        }
    }

    #[test]
    fn test_vertex_touch_is_error() {
        let a = tri(0, [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 1.0, 0.0]]);
        let c = tri(2, [[1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [1.5, -1.0, 0.0]]);
        let err = scaled_normal(&a, &c).unwrap_err();
        assert!(matches!(err, MeshError::MissingSharedEdge { shared: 1, .. }));
    }

    #[test]
    fn test_build_normals_aligned() {
        let (a, b) = pair();
        let mut cells = vec![a, b];
        let index = topology::PointCellIndex::build(&cells);
        let lookup = CellLookup::build(&cells).unwrap();
        topology::build_topology(&mut cells, &index, &lookup).unwrap();
        build_normals(&mut cells, &lookup).unwrap();
        for cell in &cells {
            assert_eq!(cell.scaled_normals().len(), cell.neighbors().len());
        }
    }

    #[test]
    fn test_inconsistent_neighbor_rejected() {
        let a = tri(0, [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 1.0, 0.0]]);
        let far = tri(1, [[5.0, 5.0, 0.0], [6.0, 5.0, 0.0], [5.5, 6.0, 0.0]]);
        let mut cells = vec![a, far];
        cells[0].neighbors.push(CellId::new(1));
        let lookup = CellLookup::build(&cells).unwrap();
        assert!(matches!(
            build_normals(&mut cells, &lookup),
            Err(MeshError::MissingSharedEdge { shared: 0, .. })
        ));
        // Nothing was written.
        assert!(cells[0].scaled_normals().is_empty());
    }
}
