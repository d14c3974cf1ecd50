use super::operator::SymmetryOperator;
use crate::core::collections::ElementIndex;
use crate::core::model::conformation::Coordinates;
use nalgebra::Point3;
use std::sync::Arc;

/// Where element radii come from for a given unit kind.
#[derive(Debug, Clone)]
pub enum RadiusSource {
    Constant(f64),
    PerElement(Arc<[f64]>),
}

impl RadiusSource {
    #[inline]
    pub fn get(&self, element: ElementIndex) -> f64 {
        match self {
            RadiusSource::Constant(r) => *r,
            RadiusSource::PerElement(radii) => radii[element as usize],
        }
    }
}

/// Lazy accessor from element index to world-space position and radius.
///
/// Positions are transformed on every access; the coordinate tables are shared with the
/// owning model and never copied.
#[derive(Debug, Clone)]
pub struct ConformationMapping {
    operator: Arc<SymmetryOperator>,
    coordinates: Arc<Coordinates>,
    radius: RadiusSource,
}

impl ConformationMapping {
    pub fn new(
        operator: Arc<SymmetryOperator>,
        coordinates: Arc<Coordinates>,
        radius: RadiusSource,
    ) -> Self {
        Self {
            operator,
            coordinates,
            radius,
        }
    }

    pub fn operator(&self) -> &Arc<SymmetryOperator> {
        &self.operator
    }

    pub fn coordinates(&self) -> &Arc<Coordinates> {
        &self.coordinates
    }

    #[inline]
    pub fn invariant_position(&self, element: ElementIndex) -> Point3<f64> {
        self.coordinates.point(element)
    }

    #[inline]
    pub fn position(&self, element: ElementIndex) -> Point3<f64> {
        let i = element as usize;
        self.operator.apply(
            self.coordinates.x[i],
            self.coordinates.y[i],
            self.coordinates.z[i],
        )
    }

    #[inline]
    pub fn radius(&self, element: ElementIndex) -> f64 {
        self.radius.get(element)
    }

    pub fn radius_source(&self) -> &RadiusSource {
        &self.radius
    }

    /// Same coordinates and radii under a different operator.
    pub fn with_operator(&self, operator: Arc<SymmetryOperator>) -> Self {
        Self {
            operator,
            coordinates: Arc::clone(&self.coordinates),
            radius: self.radius.clone(),
        }
    }

    /// Same operator and radii over other coordinates (e.g. a new trajectory frame).
    pub fn with_coordinates(&self, coordinates: Arc<Coordinates>, radius: RadiusSource) -> Self {
        Self {
            operator: Arc::clone(&self.operator),
            coordinates,
            radius,
        }
    }
}
