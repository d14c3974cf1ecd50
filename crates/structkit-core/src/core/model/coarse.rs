use super::conformation::Coordinates;
use crate::core::collections::{ElementIndex, Segmentation};
use nalgebra::Matrix3;
use std::sync::Arc;

/// Hierarchy columns shared by sphere and gaussian elements.
#[derive(Debug, Clone, Default)]
pub struct CoarseElements {
    pub entity_id: Vec<String>,
    pub asym_id: Vec<String>,
    pub seq_id_begin: Vec<i32>,
    pub seq_id_end: Vec<i32>,
    /// Elements partitioned by (entity, asym) chain.
    pub chain_segments: Segmentation,
}

impl CoarseElements {
    pub fn count(&self) -> usize {
        self.entity_id.len()
    }

    /// Whether two elements cover the same sequence range of the same chain.
    pub fn same_residue(&self, a: ElementIndex, b: ElementIndex) -> bool {
        let (a, b) = (a as usize, b as usize);
        self.seq_id_begin[a] == self.seq_id_begin[b]
            && self.seq_id_end[a] == self.seq_id_end[b]
            && self.asym_id[a] == self.asym_id[b]
    }

    pub fn residue_span(&self, element: ElementIndex) -> i32 {
        let i = element as usize;
        self.seq_id_end[i] - self.seq_id_begin[i] + 1
    }
}

#[derive(Debug, Clone, Default)]
pub struct CoarseHierarchy {
    pub spheres: CoarseElements,
    pub gaussians: CoarseElements,
}

impl CoarseHierarchy {
    pub fn is_empty(&self) -> bool {
        self.spheres.count() == 0 && self.gaussians.count() == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct CoarseSpheres {
    pub coordinates: Arc<Coordinates>,
    pub radius: Arc<[f64]>,
}

#[derive(Debug, Clone, Default)]
pub struct CoarseGaussians {
    pub coordinates: Arc<Coordinates>,
    pub weight: Vec<f64>,
    pub covariance: Vec<Matrix3<f64>>,
    /// Effective radius `sqrt(trace(covariance) / 3)`, precomputed.
    pub radius: Arc<[f64]>,
}

impl CoarseGaussians {
    pub fn new(coordinates: Coordinates, weight: Vec<f64>, covariance: Vec<Matrix3<f64>>) -> Self {
        let radius: Vec<f64> = covariance.iter().map(gaussian_radius).collect();
        Self {
            coordinates: Arc::new(coordinates),
            weight,
            covariance,
            radius: Arc::from(radius),
        }
    }
}

pub fn gaussian_radius(covariance: &Matrix3<f64>) -> f64 {
    (covariance.trace() / 3.0).max(0.0).sqrt()
}

#[derive(Debug, Clone, Default)]
pub struct CoarseConformation {
    pub spheres: CoarseSpheres,
    pub gaussians: CoarseGaussians,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaussian_radius_uses_mean_variance() {
        let cov = Matrix3::from_diagonal(&nalgebra::Vector3::new(4.0, 4.0, 4.0));
        assert!((gaussian_radius(&cov) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn same_residue_compares_sequence_span_and_chain() {
        let elements = CoarseElements {
            entity_id: vec!["1".into(); 3],
            asym_id: vec!["A".into(), "A".into(), "B".into()],
            seq_id_begin: vec![1, 1, 1],
            seq_id_end: vec![3, 3, 3],
            chain_segments: Segmentation::from_sizes([2, 1]),
        };
        assert!(elements.same_residue(0, 1));
        assert!(!elements.same_residue(1, 2));
        assert_eq!(elements.residue_span(0), 3);
    }
}
