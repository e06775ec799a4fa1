//! Mesh cells.
//!
//! A [`Cell`] is one geometric entity read from the mesh: a triangle or quad
//! that carries oil, or a line/vertex that only marks boundaries and corners.
//! All variants share one record; the kind decides the corner count and
//! whether an area exists.
//!
//! Geometry (`corners`, `centroid`, `area`) is fixed at construction.
//! Topology (`neighbors`, `scaled_normals`) is filled in once by the mesh
//! build. `oil` is the only field that changes every timestep.

use std::fmt;

use super::error::MeshError;
use crate::flow::{FlowField, RotationalFlow};
use crate::types::{Bounds2D, CellId, Concentration};

/// A point coordinate (x, y, z). z is carried but ignored by the 2D geometry.
pub type Point3 = [f64; 3];

/// Cell variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// 3-node triangle, the only kind that transports oil.
    Triangle,
    /// 4-node quadrilateral.
    Quad,
    /// 2-node boundary segment.
    Line,
    /// Single point.
    Vertex,
}

impl CellKind {
    /// Parse a mesh-reader block tag (`"triangle"`, `"quad"`, `"line"`, `"vertex"`).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "triangle" => Some(CellKind::Triangle),
            "quad" => Some(CellKind::Quad),
            "line" => Some(CellKind::Line),
            "vertex" => Some(CellKind::Vertex),
            _ => None,
        }
    }

    /// Block tag for this kind.
    pub fn tag(self) -> &'static str {
        match self {
            CellKind::Triangle => "triangle",
            CellKind::Quad => "quad",
            CellKind::Line => "line",
            CellKind::Vertex => "vertex",
        }
    }

    /// Number of corner points.
    pub fn n_corners(self) -> usize {
        match self {
            CellKind::Triangle => 3,
            CellKind::Quad => 4,
            CellKind::Line => 2,
            CellKind::Vertex => 1,
        }
    }

    /// Whether cells of this kind enclose an area.
    pub fn has_area(self) -> bool {
        matches!(self, CellKind::Triangle | CellKind::Quad)
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One mesh cell with its geometry, topology and oil state.
#[derive(Clone, Debug)]
pub struct Cell {
    id: CellId,
    kind: CellKind,
    corners: Vec<Point3>,
    centroid: Point3,
    area: Option<f64>,
    flow: (f64, f64),
    oil: Concentration,
    is_fishing: bool,
    pub(crate) neighbors: Vec<CellId>,
    pub(crate) scaled_normals: Vec<(f64, f64)>,
}

impl Cell {
    /// Create a cell from its corner coordinates.
    ///
    /// The centroid, area and default flow are derived immediately; the
    /// fishing flag is decided once against `fishing_zone` (a cell is fishing
    /// iff its centroid is strictly inside the zone). Oil starts at zero and
    /// the neighbour/normal lists start empty.
    ///
    /// # Errors
    /// [`MeshError::CornerCount`] if `corners` does not match `kind`.
    pub fn new(
        id: CellId,
        kind: CellKind,
        corners: Vec<Point3>,
        fishing_zone: Option<&Bounds2D>,
    ) -> Result<Self, MeshError> {
        if corners.len() != kind.n_corners() {
            return Err(MeshError::CornerCount {
                id,
                kind,
                expected: kind.n_corners(),
                found: corners.len(),
            });
        }

        let centroid = mean_point(&corners);
        let area = kind.has_area().then(|| shoelace_area(&corners));
        let flow = RotationalFlow.velocity(centroid[0], centroid[1]);
        let is_fishing =
            fishing_zone.is_some_and(|zone| zone.contains_strict(centroid[0], centroid[1]));

        Ok(Self {
            id,
            kind,
            corners,
            centroid,
            area,
            flow,
            oil: Concentration::ZERO,
            is_fishing,
            neighbors: Vec::new(),
            scaled_normals: Vec::new(),
        })
    }

    #[inline]
    pub fn id(&self) -> CellId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> CellKind {
        self.kind
    }

    #[inline]
    pub fn is_triangle(&self) -> bool {
        self.kind == CellKind::Triangle
    }

    /// Corner coordinates in mesh order.
    #[inline]
    pub fn corners(&self) -> &[Point3] {
        &self.corners
    }

    /// Arithmetic mean of the corners.
    #[inline]
    pub fn centroid(&self) -> Point3 {
        self.centroid
    }

    /// Centroid projected to the plane.
    #[inline]
    pub fn centroid_xy(&self) -> (f64, f64) {
        (self.centroid[0], self.centroid[1])
    }

    /// Enclosed area, `None` for lines and vertices.
    ///
    /// `Some(0.0)` means a degenerate polygon, which is distinct from a kind
    /// that has no area at all.
    #[inline]
    pub fn area(&self) -> Option<f64> {
        self.area
    }

    /// Flow velocity at the centroid.
    #[inline]
    pub fn flow(&self) -> (f64, f64) {
        self.flow
    }

    /// Override the flow velocity.
    pub fn set_flow(&mut self, flow: (f64, f64)) {
        self.flow = flow;
    }

    /// Re-evaluate the flow from a field at the centroid.
    pub fn recompute_flow(&mut self, field: &dyn FlowField) {
        self.flow = field.velocity(self.centroid[0], self.centroid[1]);
    }

    /// Oil concentration in `[0, 1]`.
    #[inline]
    pub fn oil(&self) -> f64 {
        self.oil.value()
    }

    /// Set the oil concentration, saturating to `[0, 1]`.
    #[inline]
    pub fn set_oil(&mut self, value: f64) {
        self.oil = Concentration::new(value);
    }

    /// Whether the centroid lies in the fishing zone.
    #[inline]
    pub fn is_fishing(&self) -> bool {
        self.is_fishing
    }

    /// Ids of cells sharing an edge (≥2 corner points) with this one.
    #[inline]
    pub fn neighbors(&self) -> &[CellId] {
        &self.neighbors
    }

    /// Outward, edge-length-scaled normals; `scaled_normals()[i]` belongs to
    /// `neighbors()[i]`.
    #[inline]
    pub fn scaled_normals(&self) -> &[(f64, f64)] {
        &self.scaled_normals
    }
}

/// Arithmetic mean of a non-empty point list.
fn mean_point(points: &[Point3]) -> Point3 {
    let n = points.len() as f64;
    let mut sum = [0.0; 3];
    for p in points {
        sum[0] += p[0];
        sum[1] += p[1];
        sum[2] += p[2];
    }
    [sum[0] / n, sum[1] / n, sum[2] / n]
}

/// Polygon area on the xy components (shoelace formula).
fn shoelace_area(points: &[Point3]) -> f64 {
    let n = points.len();
    let mut twice_area = 0.0;
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        twice_area += p[0] * q[1] - q[0] * p[1];
    }
    0.5 * twice_area.abs()
}
