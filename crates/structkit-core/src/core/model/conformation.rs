use crate::core::collections::ElementIndex;
use nalgebra::Point3;
use std::sync::Arc;

/// Content hash of a coordinate frame, compared by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConformationVersion(pub u64);

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Coordinates {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl Coordinates {
    pub fn new(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>) -> Self {
        debug_assert!(x.len() == y.len() && y.len() == z.len());
        Self { x, y, z }
    }

    pub fn from_points(points: &[Point3<f64>]) -> Self {
        Self {
            x: points.iter().map(|p| p.x).collect(),
            y: points.iter().map(|p| p.y).collect(),
            z: points.iter().map(|p| p.z).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    #[inline]
    pub fn point(&self, element: ElementIndex) -> Point3<f64> {
        let i = element as usize;
        Point3::new(self.x[i], self.y[i], self.z[i])
    }

    /// FNV-1a over the bit patterns of all coordinates.
    pub fn content_hash(&self) -> ConformationVersion {
        let mut h = FNV_OFFSET;
        for column in [&self.x, &self.y, &self.z] {
            for v in column.iter() {
                for byte in v.to_bits().to_le_bytes() {
                    h ^= byte as u64;
                    h = h.wrapping_mul(FNV_PRIME);
                }
            }
        }
        ConformationVersion(h)
    }

    /// Bit-exact equality of the given elements in both frames.
    pub fn same_positions(&self, other: &Coordinates, elements: &[ElementIndex]) -> bool {
        elements.iter().all(|&e| {
            let i = e as usize;
            i < other.len()
                && self.x[i].to_bits() == other.x[i].to_bits()
                && self.y[i].to_bits() == other.y[i].to_bits()
                && self.z[i].to_bits() == other.z[i].to_bits()
        })
    }
}

#[derive(Debug, Clone)]
pub struct AtomicConformation {
    pub version: ConformationVersion,
    pub coordinates: Arc<Coordinates>,
    pub occupancy: Arc<[f64]>,
    pub b_iso: Arc<[f64]>,
}

impl AtomicConformation {
    pub fn new(coordinates: Coordinates, occupancy: Vec<f64>, b_iso: Vec<f64>) -> Self {
        Self {
            version: coordinates.content_hash(),
            coordinates: Arc::new(coordinates),
            occupancy: Arc::from(occupancy),
            b_iso: Arc::from(b_iso),
        }
    }

    /// Whether `elements` sit at bit-identical positions in both conformations.
    pub fn is_same_conformation(&self, other: &AtomicConformation, elements: &[ElementIndex]) -> bool {
        if Arc::ptr_eq(&self.coordinates, &other.coordinates) {
            return true;
        }
        self.coordinates.same_positions(&other.coordinates, elements)
    }
}
