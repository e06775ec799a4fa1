//! The configured collection of ship, sources and sinks.

use super::coefficients::CoefficientMap;
use super::point_source::PointSource;
use crate::mesh::Mesh2D;

/// Source (`S+`) and sink (`S-`) coefficients for one mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceCoefficients {
    /// Injection coefficients.
    pub plus: CoefficientMap,
    /// Removal coefficients, ship included.
    pub minus: CoefficientMap,
}

impl SourceCoefficients {
    /// No sources and no sinks.
    pub fn none() -> Self {
        Self::default()
    }
}

/// Ship, sources and sinks of a scenario.
///
/// The ship is a sink with its own log line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceSinkSet {
    pub ship: Option<PointSource>,
    pub sources: Vec<PointSource>,
    pub sinks: Vec<PointSource>,
}

impl SourceSinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ship(mut self, ship: PointSource) -> Self {
        self.ship = Some(ship);
        self
    }

    pub fn with_source(mut self, source: PointSource) -> Self {
        self.sources.push(source);
        self
    }

    pub fn with_sink(mut self, sink: PointSource) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ship.is_none() && self.sources.is_empty() && self.sinks.is_empty()
    }

    /// Build the merged coefficient maps for `mesh`.
    pub fn coefficients(&self, mesh: &Mesh2D) -> SourceCoefficients {
        tracing::info!(
            ships = usize::from(self.ship.is_some()),
            sources = self.sources.len(),
            sinks = self.sinks.len(),
            "building source/sink coefficients"
        );

        let mut result = SourceCoefficients::none();
        let labelled = self
            .ship
            .iter()
            .map(|p| ("ship", p, false))
            .chain(self.sources.iter().map(|p| ("source", p, true)))
            .chain(self.sinks.iter().map(|p| ("sink", p, false)));

        for (label, point, injects) in labelled {
            let map = point.coefficients(mesh);
            if map.is_empty() {
                tracing::warn!(
                    kind = label,
                    x = point.position.0,
                    y = point.position.1,
                    radius = point.radius,
                    "no cell centroid within radius"
                );
            } else {
                tracing::info!(
                    kind = label,
                    x = point.position.0,
                    y = point.position.1,
                    cells = map.len(),
                    max_coeff = map.max().unwrap_or(0.0),
                    kernel = %point.kernel,
                    "point coefficients"
                );
            }
            if injects {
                result.plus.merge(&map);
            } else {
                result.minus.merge(&map);
            }
        }
        result
    }
}
