//! Point sources and sinks.

use super::coefficients::CoefficientMap;
use super::kernel::Kernel;
use crate::mesh::Mesh2D;

/// Default cutoff radius of a point.
pub const DEFAULT_RADIUS: f64 = 0.1;
/// Default gaussian standard deviation.
pub const DEFAULT_SIGMA: f64 = 1.0;
/// Default strength of a sink (the ship included).
pub const DEFAULT_SINK_STRENGTH: f64 = 100.0;
/// Default strength of a source.
pub const DEFAULT_SOURCE_STRENGTH: f64 = 50.0;

/// A point which injects or removes oil around itself.
///
/// Whether it injects or removes is decided by the set it is placed in, see
/// [`SourceSinkSet`](super::SourceSinkSet).
#[derive(Clone, Debug, PartialEq)]
pub struct PointSource {
    pub position: (f64, f64),
    pub radius: f64,
    pub strength: f64,
    pub kernel: Kernel,
}

impl PointSource {
    /// Point with sink defaults (radius 0.1, strength 100, gaussian σ = 1).
    pub fn sink(x: f64, y: f64) -> Self {
        Self {
            position: (x, y),
            radius: DEFAULT_RADIUS,
            strength: DEFAULT_SINK_STRENGTH,
            kernel: Kernel::Gaussian {
                sigma: DEFAULT_SIGMA,
            },
        }
    }

    /// Point with source defaults (as [`PointSource::sink`] but strength 50).
    pub fn source(x: f64, y: f64) -> Self {
        Self {
            strength: DEFAULT_SOURCE_STRENGTH,
            ..Self::sink(x, y)
        }
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = strength;
        self
    }

    pub fn with_kernel(mut self, kernel: Kernel) -> Self {
        self.kernel = kernel;
        self
    }

    /// Distance from the point to `(x, y)`.
    #[inline]
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        (x - self.position.0).hypot(y - self.position.1)
    }

    /// Coefficient `strength × kernel(d)` at distance `d`, 0 outside the radius.
    #[inline]
    pub fn coefficient_at(&self, d: f64) -> f64 {
        self.strength * self.kernel.evaluate(d, self.radius)
    }

    /// Coefficients for every triangle whose centroid lies within the radius.
    pub fn coefficients(&self, mesh: &Mesh2D) -> CoefficientMap {
        let mut map = CoefficientMap::new();
        for cell in mesh.triangles() {
            let (cx, cy) = cell.centroid_xy();
            let d = self.distance_to(cx, cy);
            if d <= self.radius {
                map.add(cell.id(), self.coefficient_at(d));
            }
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellId;

    #[test]
    fn test_defaults() {
        let sink = PointSource::sink(0.3, 0.4);
        assert_eq!(sink.radius, 0.1);
        assert_eq!(sink.strength, 100.0);
        assert_eq!(sink.kernel, Kernel::Gaussian { sigma: 1.0 });

        let source = PointSource::source(0.3, 0.4);
        assert_eq!(source.strength, 50.0);
        assert_eq!(source.position, (0.3, 0.4));
    }

    #[test]
    fn test_coefficients_cover_cells_in_radius() {
        let mesh = Mesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 10, 10, None).unwrap();
        let point = PointSource::sink(0.5, 0.5)
            .with_radius(0.15)
            .with_strength(2.0)
            .with_kernel(Kernel::Uniform);
        let map = point.coefficients(&mesh);

        assert!(!map.is_empty());
        for cell in mesh.triangles() {
            let (cx, cy) = cell.centroid_xy();
            let inside = point.distance_to(cx, cy) <= 0.15;
            assert_eq!(map.contains(cell.id()), inside);
            if inside {
                assert!((map.get(cell.id()) - 2.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_boundary_lines_never_get_coefficients() {
        let mesh = Mesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 2, 2, None).unwrap();
        let map = PointSource::sink(0.0, 0.0).with_radius(10.0).coefficients(&mesh);
        assert_eq!(map.len(), mesh.n_triangles());
        // first ids belong to the boundary line block
        assert!(!map.contains(CellId::new(0)));
    }

    #[test]
    fn test_zero_radius_hits_only_exact_centroid() {
        let mesh = Mesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 4, 4, None).unwrap();
        let map = PointSource::source(0.5, 0.5).with_radius(0.0).coefficients(&mesh);
        assert!(map.is_empty());
    }
}
