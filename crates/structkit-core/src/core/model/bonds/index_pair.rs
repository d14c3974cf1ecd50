use crate::core::chemistry::BondType;
use crate::core::collections::ElementIndex;
use crate::core::model::error::ModelError;

/// One declared bond between two atoms of a model.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexPairBond {
    pub a: ElementIndex,
    pub b: ElementIndex,
    pub order: u8,
    pub flags: BondType,
    pub distance: Option<f64>,
    /// Operator keys the two endpoints live under, when the table is symmetry-aware.
    pub operator_a: Option<i32>,
    pub operator_b: Option<i32>,
    pub key: i32,
}

impl IndexPairBond {
    pub fn new(a: ElementIndex, b: ElementIndex) -> Self {
        Self {
            a,
            b,
            order: 1,
            flags: BondType::COVALENT,
            distance: None,
            operator_a: None,
            operator_b: None,
            key: -1,
        }
    }

    pub fn with_order(mut self, order: u8) -> Self {
        self.order = order;
        self
    }

    pub fn with_flags(mut self, flags: BondType) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = Some(distance);
        self
    }

    pub fn with_operators(mut self, operator_a: i32, operator_b: i32) -> Self {
        self.operator_a = Some(operator_a);
        self.operator_b = Some(operator_b);
        self
    }

    pub fn with_key(mut self, key: i32) -> Self {
        self.key = key;
        self
    }
}

/// Directed half of an [`IndexPairBond`] as seen from one endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexPairEdge {
    pub other: ElementIndex,
    pub order: u8,
    pub flags: BondType,
    pub distance: Option<f64>,
    pub operator_self: Option<i32>,
    pub operator_other: Option<i32>,
    pub key: i32,
}

/// Declared bonds addressed by atom index, stored as a compressed adjacency list.
#[derive(Debug, Clone, Default)]
pub struct IndexPairBonds {
    offsets: Vec<u32>,
    edges: Vec<IndexPairEdge>,
    bond_count: usize,
    max_distance: Option<f64>,
    has_operators: bool,
}

impl IndexPairBonds {
    pub fn new(
        atom_count: usize,
        bonds: &[IndexPairBond],
        max_distance: Option<f64>,
    ) -> Result<Self, ModelError> {
        let mut degree = vec![0u32; atom_count + 1];
        for bond in bonds {
            for index in [bond.a, bond.b] {
                if index as usize >= atom_count {
                    return Err(ModelError::BondOutOfRange {
                        index,
                        count: atom_count,
                    });
                }
            }
            if bond.a == bond.b && bond.operator_a == bond.operator_b {
                return Err(ModelError::SelfBond(bond.a));
            }
            degree[bond.a as usize + 1] += 1;
            degree[bond.b as usize + 1] += 1;
        }
        for i in 1..degree.len() {
            degree[i] += degree[i - 1];
        }
        let offsets = degree;

        let mut fill = offsets.clone();
        let placeholder = IndexPairEdge {
            other: 0,
            order: 0,
            flags: BondType::empty(),
            distance: None,
            operator_self: None,
            operator_other: None,
            key: -1,
        };
        let mut edges = vec![placeholder; bonds.len() * 2];
        for bond in bonds {
            let half = |other, operator_self, operator_other| IndexPairEdge {
                other,
                order: bond.order,
                flags: bond.flags,
                distance: bond.distance,
                operator_self,
                operator_other,
                key: bond.key,
            };
            let slot = &mut fill[bond.a as usize];
            edges[*slot as usize] = half(bond.b, bond.operator_a, bond.operator_b);
            *slot += 1;
            let slot = &mut fill[bond.b as usize];
            edges[*slot as usize] = half(bond.a, bond.operator_b, bond.operator_a);
            *slot += 1;
        }

        let has_operators = bonds
            .iter()
            .any(|b| b.operator_a.is_some() || b.operator_b.is_some());

        Ok(Self {
            offsets,
            edges,
            bond_count: bonds.len(),
            max_distance,
            has_operators,
        })
    }

    pub fn edges_of(&self, atom: ElementIndex) -> &[IndexPairEdge] {
        let i = atom as usize;
        if i + 1 >= self.offsets.len() {
            return &[];
        }
        &self.edges[self.offsets[i] as usize..self.offsets[i + 1] as usize]
    }

    pub fn bond_count(&self) -> usize {
        self.bond_count
    }

    pub fn max_distance(&self) -> Option<f64> {
        self.max_distance
    }

    /// Whether any edge records the operators of its endpoints.
    pub fn has_operators(&self) -> bool {
        self.has_operators
    }
}
