//! Mesh owner: cells plus the lookup tables built for them.

use super::cell::{Cell, CellKind, Point3};
use super::error::MeshError;
use super::factory::CellFactory;
use super::normals::build_normals;
use super::raw::RawMesh;
use super::topology::{CellLookup, PointCellIndex, build_topology};
use crate::flow::FlowField;
use crate::types::{Bounds2D, CellId};

/// Unstructured 2D mesh.
///
/// Owns every [`Cell`] together with the point → cells index and the
/// id → cell lookup. Both tables are built once, in the topology phase, and
/// are only read afterwards. Construction runs the full pipeline:
///
/// 1. cells from raw blocks (factory)
/// 2. neighbour lists (topology)
/// 3. scaled normals (geometry)
///
/// so a `Mesh2D` value always satisfies the alignment invariant
/// `cell.scaled_normals().len() == cell.neighbors().len()`.
#[derive(Clone, Debug)]
pub struct Mesh2D {
    points: Vec<Point3>,
    cells: Vec<Cell>,
    lookup: CellLookup,
    point_index: PointCellIndex,
    n_triangles: usize,
}

impl Mesh2D {
    /// Build a mesh from reader output.
    pub fn from_raw(raw: &RawMesh, fishing_zone: Option<Bounds2D>) -> Result<Self, MeshError> {
        let mut factory = CellFactory::new(raw);
        if let Some(zone) = fishing_zone {
            factory = factory.with_fishing_zone(zone);
        }
        let cells = factory.build()?;
        Self::from_cells(raw.points.clone(), cells)
    }

    /// Build a mesh from already constructed cells.
    ///
    /// Cells may come in any order; ids only need to be unique.
    pub fn from_cells(points: Vec<Point3>, mut cells: Vec<Cell>) -> Result<Self, MeshError> {
        let lookup = CellLookup::build(&cells)?;
        let point_index = PointCellIndex::build(&cells);
        build_topology(&mut cells, &point_index, &lookup)?;
        build_normals(&mut cells, &lookup)?;

        let n_triangles = cells.iter().filter(|c| c.is_triangle()).count();
        let mesh = Self {
            points,
            cells,
            lookup,
            point_index,
            n_triangles,
        };
        mesh.log_summary();
        Ok(mesh)
    }

    /// Triangulated rectangle with boundary lines, see [`RawMesh::uniform_rectangle`].
    pub fn uniform_rectangle(
        x0: f64,
        x1: f64,
        y0: f64,
        y1: f64,
        nx: usize,
        ny: usize,
        fishing_zone: Option<Bounds2D>,
    ) -> Result<Self, MeshError> {
        Self::from_raw(
            &RawMesh::uniform_rectangle(x0, x1, y0, y1, nx, ny),
            fishing_zone,
        )
    }

    fn log_summary(&self) {
        let count = |kind: CellKind| self.cells.iter().filter(|c| c.kind() == kind).count();
        let isolated = self
            .triangles()
            .filter(|c| c.neighbors().is_empty())
            .count();
        tracing::info!(
            points = self.points.len(),
            triangles = self.n_triangles,
            quads = count(CellKind::Quad),
            lines = count(CellKind::Line),
            vertices = count(CellKind::Vertex),
            isolated_triangles = isolated,
            "mesh built"
        );
    }

    /// Recompute neighbours and normals from the cells' corners.
    pub fn rebuild_topology(&mut self) -> Result<(), MeshError> {
        build_topology(&mut self.cells, &self.point_index, &self.lookup)?;
        build_normals(&mut self.cells, &self.lookup)
    }

    #[inline]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn n_triangles(&self) -> usize {
        self.n_triangles
    }

    /// Triangle cells in storage order.
    pub fn triangles(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|c| c.is_triangle())
    }

    #[inline]
    pub fn lookup(&self) -> &CellLookup {
        &self.lookup
    }

    #[inline]
    pub fn point_index(&self) -> &PointCellIndex {
        &self.point_index
    }

    /// Position of a cell in [`Mesh2D::cells`].
    #[inline]
    pub fn position(&self, id: CellId) -> Option<usize> {
        self.lookup.position(id)
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.lookup.get(&self.cells, id)
    }

    pub fn cell_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        let pos = self.lookup.position(id)?;
        self.cells.get_mut(pos)
    }

    /// Mutable access to all cells' state. Geometry and topology stay read-only
    /// through the [`Cell`] API.
    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Re-evaluate every cell's flow from `field`.
    pub fn apply_flow(&mut self, field: &dyn FlowField) {
        tracing::debug!(field = field.name(), "applying flow field");
        for cell in &mut self.cells {
            cell.recompute_flow(field);
        }
    }

    /// Set every cell's oil from a function of its centroid (x, y).
    pub fn set_oil_by<F>(&mut self, f: F)
    where
        F: Fn(f64, f64) -> f64,
    {
        for cell in &mut self.cells {
            let (x, y) = cell.centroid_xy();
            cell.set_oil(f(x, y));
        }
    }

    /// Oil of every cell, indexed by position.
    pub fn oil_snapshot(&self) -> Vec<f64> {
        self.cells.iter().map(Cell::oil).collect()
    }

    /// Oil of triangle cells, in ascending storage order.
    pub fn triangle_oil(&self) -> Vec<f64> {
        self.triangles().map(Cell::oil).collect()
    }

    /// `(cell id, oil)` for triangle cells.
    pub fn triangle_oil_pairs(&self) -> Vec<(CellId, f64)> {
        self.triangles().map(|c| (c.id(), c.oil())).collect()
    }

    /// Fishing membership of triangle cells, aligned with [`Mesh2D::triangle_oil`].
    pub fn fishing_mask(&self) -> Vec<bool> {
        self.triangles().map(Cell::is_fishing).collect()
    }

    /// Sum of oil over triangle cells.
    pub fn total_oil(&self) -> f64 {
        self.triangles().map(Cell::oil).sum()
    }

    /// Sum of oil over triangle cells inside the fishing zone.
    pub fn fishing_oil(&self) -> f64 {
        self.triangles()
            .filter(|c| c.is_fishing())
            .map(Cell::oil)
            .sum()
    }

    /// Extent of the point cloud.
    pub fn bounds(&self) -> Option<Bounds2D> {
        Bounds2D::enclosing(self.points.iter().map(|p| (p[0], p[1])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::UniformFlow;
    use crate::mesh::CellBlock;

    fn scenario_two_triangles() -> Mesh2D {
        let raw = RawMesh::new(
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.5, 1.0, 0.0],
                [1.0, 1.0, 0.0],
            ],
            vec![CellBlock::new(
                CellKind::Triangle,
                vec![vec![0, 1, 2], vec![1, 3, 2]],
            )],
        );
        Mesh2D::from_raw(&raw, None).unwrap()
    }

    #[test]
    fn test_from_raw_two_triangles() {
        let mesh = scenario_two_triangles();
        assert_eq!(mesh.n_cells(), 2);
        assert_eq!(mesh.n_triangles(), 2);
        let c0 = mesh.cell(CellId::new(0)).unwrap();
        assert_eq!(c0.neighbors(), &[CellId::new(1)]);
        assert_eq!(c0.scaled_normals().len(), 1);
    }

    #[test]
    fn test_boundary_lines_are_neighbors() {
        let mesh = Mesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 1, 1, None).unwrap();
        // 4 boundary lines first, then 2 triangles.
        let lines: Vec<&Cell> = mesh.cells().iter().filter(|c| !c.is_triangle()).collect();
        assert_eq!(lines.len(), 4);
        for line in lines {
            assert_eq!(line.neighbors().len(), 1);
            assert_eq!(line.area(), None);
        }
        for tri in mesh.triangles() {
            // one diagonal neighbour + two boundary lines
            assert_eq!(tri.neighbors().len(), 3);
        }
    }

    #[test]
    fn test_alignment_invariant() {
        let mesh = Mesh2D::uniform_rectangle(0.0, 2.0, 0.0, 1.0, 6, 3, None).unwrap();
        for cell in mesh.cells() {
            assert_eq!(cell.scaled_normals().len(), cell.neighbors().len());
        }
    }

    #[test]
    fn test_oil_outputs_restricted_to_triangles() {
        let zone = Bounds2D::new(0.0, 0.5, 0.0, 1.0);
        let mut mesh = Mesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 2, 2, Some(zone)).unwrap();
        mesh.set_oil_by(|_, _| 1.0);
        assert_eq!(mesh.triangle_oil().len(), 8);
        assert_eq!(mesh.fishing_mask().len(), 8);
        assert!((mesh.total_oil() - 8.0).abs() < 1e-12);
        assert!((mesh.fishing_oil() - 4.0).abs() < 1e-12);
        let pairs = mesh.triangle_oil_pairs();
        assert!(pairs.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_apply_flow() {
        let mut mesh = scenario_two_triangles();
        mesh.apply_flow(&UniformFlow::new(1.0, 0.0));
        assert!(mesh.cells().iter().all(|c| c.flow() == (1.0, 0.0)));
    }

    #[test]
    fn test_rebuild_topology_keeps_lists() {
        let mut mesh = Mesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 3, 3, None).unwrap();
        let before: Vec<_> = mesh.cells().iter().map(|c| c.neighbors().to_vec()).collect();
        mesh.rebuild_topology().unwrap();
        let after: Vec<_> = mesh.cells().iter().map(|c| c.neighbors().to_vec()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_bounds() {
        let mesh = Mesh2D::uniform_rectangle(-1.0, 1.0, 0.0, 3.0, 2, 2, None).unwrap();
        assert_eq!(mesh.bounds(), Some(Bounds2D::new(-1.0, 1.0, 0.0, 3.0)));
    }
}
