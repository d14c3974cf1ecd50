use super::common::{
    COARSE_INTER_RESIDUE_MAX_DISTANCE, COARSE_INTRA_RESIDUE_MAX_DISTANCE, alt_ids_compatible,
    geometric_bond_flags, is_hydrogen_pair, pairing_threshold,
};
use super::graph::BondProps;
use super::index_pair::accept_by_distance;
use crate::config::InterBondProps;
use crate::core::math::{EPSILON, is_identity, transform_point};
use crate::core::model::{Model, ModelId};
use crate::core::model::bonds::{IndexPairBonds, StructConn};
use crate::core::symmetry::SymmetryOperator;
use crate::core::symmetry::operator::DEFAULT_OPERATOR_NAME;
use crate::structure::Structure;
use crate::structure::pairs::{UnitPairProps, each_unit_pair};
use crate::structure::unit::{Unit, UnitId};
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument};

/// A bond between element `index_a` of one unit and element `index_b` of another, both as
/// local indices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterUnitEdge {
    pub index_a: u32,
    pub index_b: u32,
    pub props: BondProps,
}

/// All bonds between one ordered pair of units.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitPairBonds {
    unit_a: UnitId,
    unit_b: UnitId,
    edges: Vec<InterUnitEdge>,
}

impl UnitPairBonds {
    pub fn unit_a(&self) -> UnitId {
        self.unit_a
    }

    pub fn unit_b(&self) -> UnitId {
        self.unit_b
    }

    pub fn edges(&self) -> &[InterUnitEdge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

fn pair_key(a: UnitId, b: UnitId) -> (UnitId, UnitId) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Bonds between elements of different units of a structure.
#[derive(Debug, Clone, Default)]
pub struct InterUnitBonds {
    pairs: Vec<UnitPairBonds>,
    index: HashMap<(UnitId, UnitId), usize>,
    by_unit: HashMap<UnitId, Vec<usize>>,
    edge_count: usize,
}

impl InterUnitBonds {
    fn from_pairs(pairs: Vec<UnitPairBonds>) -> Self {
        let pairs: Vec<_> = pairs.into_iter().filter(|p| !p.is_empty()).collect();
        let mut index = HashMap::with_capacity(pairs.len());
        let mut by_unit: HashMap<UnitId, Vec<usize>> = HashMap::new();
        for (i, pair) in pairs.iter().enumerate() {
            index.insert(pair_key(pair.unit_a, pair.unit_b), i);
            by_unit.entry(pair.unit_a).or_default().push(i);
            by_unit.entry(pair.unit_b).or_default().push(i);
        }
        let edge_count = pairs.iter().map(UnitPairBonds::len).sum();
        Self {
            pairs,
            index,
            by_unit,
            edge_count,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn pairs(&self) -> &[UnitPairBonds] {
        &self.pairs
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.edge_count == 0
    }

    /// Bonds between the two units, in whichever order they were recorded.
    pub fn pair(&self, a: UnitId, b: UnitId) -> Option<&UnitPairBonds> {
        self.index.get(&pair_key(a, b)).map(|&i| &self.pairs[i])
    }

    pub fn pairs_of(&self, unit: UnitId) -> impl Iterator<Item = &UnitPairBonds> {
        self.by_unit
            .get(&unit)
            .into_iter()
            .flat_map(move |ids| ids.iter().map(move |&i| &self.pairs[i]))
    }

    /// Properties of the bond between element `index_a` of `unit_a` and `index_b` of `unit_b`.
    pub fn get_edge(
        &self,
        unit_a: UnitId,
        index_a: u32,
        unit_b: UnitId,
        index_b: u32,
    ) -> Option<&BondProps> {
        let pair = self.pair(unit_a, unit_b)?;
        let (ia, ib) = if pair.unit_a == unit_a {
            (index_a, index_b)
        } else {
            (index_b, index_a)
        };
        pair.edges
            .iter()
            .find(|e| e.index_a == ia && e.index_b == ib)
            .map(|e| &e.props)
    }
}

#[derive(Debug, Default)]
struct InterUnitBondsBuilder {
    pairs: Vec<UnitPairBonds>,
    current: Option<UnitPairBonds>,
    seen: HashSet<(u32, u32)>,
}

impl InterUnitBondsBuilder {
    fn start_pair(&mut self, unit_a: UnitId, unit_b: UnitId) {
        self.finish_pair();
        self.current = Some(UnitPairBonds {
            unit_a,
            unit_b,
            edges: Vec::new(),
        });
    }

    fn add(&mut self, index_a: u32, index_b: u32, props: BondProps) {
        if let Some(pair) = self.current.as_mut() {
            if self.seen.insert((index_a, index_b)) {
                pair.edges.push(InterUnitEdge {
                    index_a,
                    index_b,
                    props,
                });
            }
        }
    }

    fn finish_pair(&mut self) {
        if let Some(pair) = self.current.take() {
            if !pair.is_empty() {
                self.pairs.push(pair);
            }
        }
        self.seen.clear();
    }

    fn build(mut self) -> InterUnitBonds {
        self.finish_pair();
        InterUnitBonds::from_pairs(self.pairs)
    }
}

fn operator_name(operator: &SymmetryOperator) -> &str {
    if operator.name.is_empty() {
        DEFAULT_OPERATOR_NAME
    } else {
        &operator.name
    }
}

fn same_model(a: &Unit, b: &Unit) -> bool {
    a.model().id() == b.model().id()
}

fn shares_struct_conn(a: &Unit, b: &Unit) -> bool {
    same_model(a, b)
        && a.model()
            .bonds
            .struct_conn
            .as_deref()
            .is_some_and(|sc| sc.links_any(a.elements(), b.elements()))
}

/// Whether the pair of units takes part in inter-unit bond inference.
///
/// Water units, and pairs of ion units, are skipped when configured to be, unless an
/// explicit connection record links the two units.
pub fn valid_unit_pair(props: &InterBondProps, a: &Unit, b: &Unit) -> bool {
    let excluded = (props.ignore_water && (a.is_water() || b.is_water()))
        || (props.ignore_ion && a.is_ion() && b.is_ion());
    !excluded || shares_struct_conn(a, b)
}

fn index_pair_table(model: &Model) -> Option<&IndexPairBonds> {
    model.bonds.index_pairs.as_deref()
}

fn nothing_to_compute(structure: &Structure) -> bool {
    structure.models().iter().all(|m| {
        m.is_coarse_grained()
            && index_pair_table(m).is_none()
            && !m.bonds.struct_conn.as_deref().is_some_and(StructConn::is_exhaustive)
    })
}

fn can_use_index_pair_operators(structure: &Structure) -> bool {
    !structure.is_empty()
        && structure
            .units()
            .iter()
            .all(|u| u.is_atomic() && u.operator().key != -1)
        && structure
            .models()
            .iter()
            .all(|m| index_pair_table(m).is_some_and(IndexPairBonds::has_operators))
}

/// Computes the bonds between the units of `structure`.
///
/// When every unit carries an operator key and every model an index-pair table with
/// operators, bonds are read directly from the tables. Otherwise nearby unit pairs are
/// searched geometrically, with explicit connectivity and same-model index pairs taking
/// precedence over distance inference.
#[instrument(skip_all, name = "inter_unit_bonds", fields(units = structure.unit_count()))]
pub fn compute_inter_unit_bonds(structure: &Structure, props: &InterBondProps) -> InterUnitBonds {
    if props.no_compute || structure.unit_count() < 2 || nothing_to_compute(structure) {
        return InterUnitBonds::empty();
    }

    if can_use_index_pair_operators(structure) && !props.force_compute {
        let bonds = index_pair_operator_bonds(structure);
        debug!(edges = bonds.edge_count(), "Inter-unit bonds taken from index-pair table.");
        bonds
    } else {
        let mut builder = InterUnitBondsBuilder::default();
        let atomic = |u: &Unit| u.is_atomic();
        let valid_pair = |a: &Unit, b: &Unit| valid_unit_pair(props, a, b);
        let pair_props = UnitPairProps {
            max_radius: props.max_radius,
            valid_unit: Some(&atomic),
            valid_unit_pair: Some(&valid_pair),
        };
        each_unit_pair(structure, &pair_props, |a, b| {
            find_pair_bonds(a, b, props, &mut builder);
        });
        let bonds = builder.build();
        debug!(
            edges = bonds.edge_count(),
            pairs = bonds.pairs().len(),
            "Inter-unit bonds inferred."
        );
        bonds
    }
}

/// Reads inter-unit edges from index-pair tables by matching edge operator ids to unit keys.
fn index_pair_operator_bonds(structure: &Structure) -> InterUnitBonds {
    let mut by_key: HashMap<(ModelId, i32), Vec<&Unit>> = HashMap::new();
    for unit in structure.units() {
        by_key
            .entry((unit.model().id(), unit.operator().key))
            .or_default()
            .push(unit);
    }

    let mut pairs: HashMap<(UnitId, UnitId), Vec<InterUnitEdge>> = HashMap::new();
    for unit_a in structure.units() {
        let Some(table) = index_pair_table(unit_a.model()) else {
            continue;
        };
        let model = unit_a.model().id();
        let key_a = unit_a.operator().key;
        for (ia, &ea) in unit_a.elements().iter().enumerate() {
            for edge in table.edges_of(ea) {
                if edge.operator_self.is_some_and(|k| k != key_a) {
                    continue;
                }
                let key_b = edge.operator_other.unwrap_or(key_a);
                let Some(candidates) = by_key.get(&(model, key_b)) else {
                    continue;
                };
                for unit_b in candidates {
                    if unit_b.id() <= unit_a.id() {
                        continue;
                    }
                    if let Some(ib) = unit_b.elements().index_of(edge.other) {
                        pairs.entry((unit_a.id(), unit_b.id())).or_default().push(InterUnitEdge {
                            index_a: ia as u32,
                            index_b: ib as u32,
                            props: BondProps::new(edge.order, edge.flags, edge.key),
                        });
                    }
                }
            }
        }
    }

    let mut pairs: Vec<UnitPairBonds> = pairs
        .into_iter()
        .map(|((unit_a, unit_b), mut edges)| {
            edges.sort_by_key(|e| (e.index_a, e.index_b));
            edges.dedup_by_key(|e| (e.index_a, e.index_b));
            UnitPairBonds {
                unit_a,
                unit_b,
                edges,
            }
        })
        .collect();
    pairs.sort_by_key(|p| (p.unit_a, p.unit_b));
    InterUnitBonds::from_pairs(pairs)
}

fn find_pair_bonds(
    unit_a: &Unit,
    unit_b: &Unit,
    props: &InterBondProps,
    builder: &mut InterUnitBondsBuilder,
) {
    builder.start_pair(unit_a.id(), unit_b.id());

    let model_a = unit_a.model();
    let model_b = unit_b.model();
    let ha = &model_a.atomic_hierarchy;
    let hb = &model_b.atomic_hierarchy;
    let occupancy_a = &model_a.atomic_conformation.occupancy;
    let occupancy_b = &model_b.atomic_conformation.occupancy;
    let atoms_a = unit_a.elements();
    let atoms_b = unit_b.elements();

    let same = same_model(unit_a, unit_b);
    let struct_conn = model_a
        .bonds
        .struct_conn
        .as_deref()
        .filter(|_| same && !props.force_compute);
    let index_pairs = index_pair_table(model_a).filter(|_| same && !props.force_compute);
    let coarse_grained = model_a.is_coarse_grained() || model_b.is_coarse_grained();

    let op_a = unit_a.operator();
    let op_b = unit_b.operator();
    let name_a = operator_name(op_a);
    let name_b = operator_name(op_b);
    // maps A's untransformed frame into B's untransformed frame
    let image_transform = op_b.inverse * op_a.matrix;
    let is_identity_image = is_identity(&image_transform, EPSILON);

    let b_sphere = unit_b.boundary().sphere;
    let test_distance = b_sphere.radius + props.max_radius;
    let lookup_b = unit_b.lookup3d();

    for (ia, &ea) in atoms_a.iter().enumerate() {
        let p = unit_a.invariant_position(ia);
        let image = if is_identity_image {
            p
        } else {
            transform_point(&image_transform, &p)
        };
        if nalgebra::distance_squared(&image, &b_sphere.center) > test_distance * test_distance {
            continue;
        }

        let type_a = ha.element(ea);

        if let Some(table) = index_pairs {
            for edge in table.edges_of(ea) {
                let Some(ib) = atoms_b.index_of(edge.other) else {
                    continue;
                };
                // the half-edge is oriented from `ea`, so its own operator belongs to A
                if !edge.operator_self.is_none_or(|k| k == op_a.key)
                    || !edge.operator_other.is_none_or(|k| k == op_b.key)
                {
                    continue;
                }
                let type_b = hb.element(edge.other);
                if is_hydrogen_pair(type_a, type_b) {
                    continue;
                }
                let distance = nalgebra::distance(&image, &unit_b.invariant_position(ib));
                if accept_by_distance(table, edge, distance, pairing_threshold(type_a, type_b)) {
                    builder.add(
                        ia as u32,
                        ib as u32,
                        BondProps::new(edge.order, edge.flags, edge.key),
                    );
                }
            }
            continue;
        }

        if let Some(sc) = struct_conn {
            let mut added = false;
            for entry in sc.entries_of_atom(ea) {
                let Some((this, other)) = entry.partner_of(ea) else {
                    continue;
                };
                if this.symmetry() != name_a || other.symmetry() != name_b {
                    continue;
                }
                if let Some(ib) = atoms_b.index_of(other.element) {
                    builder.add(
                        ia as u32,
                        ib as u32,
                        BondProps::new(entry.order, entry.flags, entry.row_index as i32),
                    );
                    added = true;
                }
            }
            if added {
                continue;
            }
        }

        let residue_a = ha.residue_of(ea);
        let occupancy_ea = occupancy_a[ea as usize];
        let alt_a = ha.alt_id(ea);

        let found = lookup_b.find(image.x, image.y, image.z, props.max_radius);
        for (ib, d2) in found.iter() {
            if d2 == 0.0 {
                continue;
            }
            let eb = atoms_b[ib as usize];
            if !alt_ids_compatible(alt_a, hb.alt_id(eb)) {
                continue;
            }
            let residue_b = hb.residue_of(eb);
            if same
                && residue_a == residue_b
                && occupancy_ea < 1.0
                && occupancy_b[eb as usize] < 1.0
            {
                continue;
            }
            let type_b = hb.element(eb);
            if is_hydrogen_pair(type_a, type_b) {
                continue;
            }
            if struct_conn.is_some_and(|sc| sc.has_atom(eb) && sc.has_residue_pair(residue_a, residue_b)) {
                continue;
            }

            let threshold = if coarse_grained {
                if same && residue_a == residue_b {
                    COARSE_INTRA_RESIDUE_MAX_DISTANCE
                } else {
                    COARSE_INTER_RESIDUE_MAX_DISTANCE
                }
            } else {
                pairing_threshold(type_a, type_b)
            };
            if d2 <= threshold * threshold {
                builder.add(
                    ia as u32,
                    ib,
                    BondProps::computed(geometric_bond_flags(type_a, type_b)),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chemistry::{BondType, Element};
    use crate::core::collections::SortedArray;
    use crate::core::model::bonds::{IndexPairBond, StructConnKind, StructConnPartner};
    use crate::core::model::builder::{AtomRecord, ModelBuilder};
    use crate::core::model::entities::EntityType;
    use crate::structure::StructureProps;
    use crate::structure::unit::{UnitKind, UnitTraits};
    use nalgebra::{Matrix4, Point3, Vector3};
    use std::sync::Arc;

    type ChainSpec<'a> = (&'a str, &'a str, &'a str, &'a [(&'a str, Element, [f64; 3])]);

    /// One residue per chain; entity "1" is a polymer, "2" water, "3" an ion.
    fn model(chains: &[ChainSpec<'_>], setup: impl FnOnce(&mut ModelBuilder)) -> Arc<Model> {
        let mut b = ModelBuilder::new("INTER");
        b.add_entity("1", EntityType::Polymer, "protein");
        b.add_entity("2", EntityType::Water, "water");
        b.add_entity("3", EntityType::NonPolymer, "ion");
        for (i, (asym, entity, comp, atoms)) in chains.iter().enumerate() {
            let c = b.add_chain(asym, asym, entity).unwrap();
            let r = b.add_residue(c, comp, 1, i as i32 + 1).unwrap();
            for (name, element, p) in atoms.iter() {
                b.add_atom(r, AtomRecord::new(name, *element, Point3::new(p[0], p[1], p[2])))
                    .unwrap();
            }
        }
        setup(&mut b);
        Arc::new(b.build().unwrap())
    }

    fn bonds_of(model: Arc<Model>, props: &InterBondProps) -> InterUnitBonds {
        let s = Structure::of_model(model, StructureProps::default());
        compute_inter_unit_bonds(&s, props)
    }

    fn cysteine_and_water() -> Arc<Model> {
        model(
            &[
                ("A", "1", "CYS", &[("CB", Element::C, [-1.8, 0.0, 0.0]), ("SG", Element::S, [0.0, 0.0, 0.0])]),
                ("W", "2", "HOH", &[("O", Element::O, [2.0, 0.0, 0.0])]),
            ],
            |_| {},
        )
    }

    #[test]
    fn bonds_across_chains_are_inferred() {
        let m = model(
            &[
                ("A", "1", "ALA", &[("C1", Element::C, [0.0, 0.0, 0.0]), ("C2", Element::C, [-1.5, 0.0, 0.0])]),
                ("B", "1", "ALA", &[("C3", Element::C, [1.5, 0.0, 0.0]), ("C4", Element::C, [3.0, 0.0, 0.0])]),
            ],
            |_| {},
        );
        let bonds = bonds_of(m, &InterBondProps::default());
        assert_eq!(bonds.edge_count(), 1);
        let pair = bonds.pair(1, 0).unwrap();
        let edge = pair.edges()[0];
        assert_eq!((edge.index_a, edge.index_b), (0, 0));
        assert!(edge.props.flags.contains(BondType::COVALENT | BondType::COMPUTED));
        assert!(bonds.get_edge(1, 0, 0, 0).is_some());
        assert!(bonds.get_edge(0, 1, 1, 0).is_none());
        assert_eq!(bonds.pairs_of(0).count(), 1);
    }

    #[test]
    fn water_is_ignored_unless_requested() {
        assert!(bonds_of(cysteine_and_water(), &InterBondProps::default()).is_empty());

        let props = InterBondProps {
            ignore_water: false,
            ..Default::default()
        };
        let bonds = bonds_of(cysteine_and_water(), &props);
        assert_eq!(bonds.edge_count(), 1);
    }

    #[test]
    fn explicit_connection_overrides_water_exclusion() {
        let m = model(
            &[
                ("A", "1", "CYS", &[("CB", Element::C, [-1.8, 0.0, 0.0]), ("SG", Element::S, [0.0, 0.0, 0.0])]),
                ("W", "2", "HOH", &[("O", Element::O, [2.0, 0.0, 0.0])]),
            ],
            |b| {
                b.add_struct_conn(
                    StructConnKind::Covalent,
                    1,
                    StructConnPartner::new(1),
                    StructConnPartner::new(2),
                    None,
                );
            },
        );
        let bonds = bonds_of(m, &InterBondProps::default());
        assert_eq!(bonds.edge_count(), 1);
        let edge = bonds.pairs()[0].edges()[0];
        assert_eq!(edge.props.key, 0);
        assert!(!edge.props.flags.contains(BondType::COMPUTED));
    }

    #[test]
    fn ion_pairs_are_ignored_unless_requested() {
        let na = Element::from_symbol("NA");
        let m = || {
            model(
                &[
                    ("I1", "3", "NA", &[("NA", na, [0.0, 0.0, 0.0])]),
                    ("I2", "3", "NA", &[("NA", na, [3.0, 0.0, 0.0])]),
                ],
                |_| {},
            )
        };
        assert!(bonds_of(m(), &InterBondProps::default()).is_empty());
        let props = InterBondProps {
            ignore_ion: false,
            ..Default::default()
        };
        assert_eq!(bonds_of(m(), &props).edge_count(), 1);
    }

    #[test]
    fn hydrogens_do_not_bond_to_each_other() {
        let m = model(
            &[
                ("A", "1", "ALA", &[("C1", Element::C, [-1.0, 0.0, 0.0]), ("H1", Element::H, [0.0, 0.0, 0.0])]),
                ("B", "1", "ALA", &[("H2", Element::H, [0.7, 0.0, 0.0]), ("C2", Element::C, [5.0, 0.0, 0.0])]),
            ],
            |_| {},
        );
        assert!(bonds_of(m, &InterBondProps::default()).is_empty());
    }

    #[test]
    fn results_are_deterministic() {
        let m = model(
            &[
                ("A", "1", "ALA", &[("C1", Element::C, [0.0, 0.0, 0.0]), ("C2", Element::C, [0.0, 1.5, 0.0])]),
                ("B", "1", "ALA", &[("C3", Element::C, [1.5, 0.0, 0.0]), ("C4", Element::C, [1.5, 1.5, 0.0])]),
                ("C", "1", "ALA", &[("C5", Element::C, [3.0, 0.0, 0.0]), ("C6", Element::C, [3.0, 1.5, 0.0])]),
            ],
            |_| {},
        );
        let s = Structure::of_model(m, StructureProps::default());
        let first = compute_inter_unit_bonds(&s, &InterBondProps::default());
        let second = compute_inter_unit_bonds(&s, &InterBondProps::default());
        assert_eq!(first.pairs(), second.pairs());
        assert_eq!(first.edge_count(), 4);
        assert_eq!(s.inter_unit_bond_count(), 4);
    }

    #[test]
    fn no_compute_yields_nothing() {
        let props = InterBondProps {
            no_compute: true,
            ignore_water: false,
            ..Default::default()
        };
        assert!(bonds_of(cysteine_and_water(), &props).is_empty());
    }

    fn structure_of(model: &Arc<Model>, units: &[(&[u32], Arc<SymmetryOperator>)]) -> Structure {
        let mut builder = Structure::builder(StructureProps::default());
        for (elements, operator) in units {
            builder.add_unit(
                UnitKind::Atomic,
                model,
                Arc::clone(operator),
                SortedArray::from_unsorted(elements.to_vec()),
                UnitTraits::empty(),
                None,
            );
        }
        builder.get_structure()
    }

    fn translation(dx: f64, key: Option<i32>) -> Arc<SymmetryOperator> {
        let op = SymmetryOperator::from_matrix(Matrix4::new_translation(&Vector3::new(dx, 0.0, 0.0)));
        Arc::new(match key {
            Some(key) => op.with_key(key),
            None => op,
        })
    }

    /// Two carbons of one residue, 1.5 Å apart, with the given occupancy.
    fn split_residue(occupancy: f64) -> Structure {
        let mut b = ModelBuilder::new("OCC");
        b.add_entity("1", EntityType::Polymer, "protein");
        let c = b.add_chain("A", "A", "1").unwrap();
        let r = b.add_residue(c, "ALA", 1, 1).unwrap();
        for (name, x) in [("C1", 0.0), ("C2", 1.5)] {
            let atom = AtomRecord::new(name, Element::C, Point3::new(x, 0.0, 0.0))
                .with_occupancy(occupancy);
            b.add_atom(r, atom).unwrap();
        }
        let m = Arc::new(b.build().unwrap());
        structure_of(&m, &[(&[0], translation(0.0, None)), (&[1], translation(0.0, None))])
    }

    #[test]
    fn partially_occupied_atoms_of_one_residue_do_not_bond() {
        let props = InterBondProps::default();
        assert!(compute_inter_unit_bonds(&split_residue(0.5), &props).is_empty());
        assert_eq!(compute_inter_unit_bonds(&split_residue(1.0), &props).edge_count(), 1);
    }

    #[test]
    fn differing_alternate_locations_do_not_bond() {
        let bonds_with = |alt_b: &str| {
            let mut b = ModelBuilder::new("ALT");
            b.add_entity("1", EntityType::Polymer, "protein");
            for (asym, alt, x) in [("A", "A", 0.0), ("B", alt_b, 1.5)] {
                let c = b.add_chain(asym, asym, "1").unwrap();
                let r = b.add_residue(c, "ALA", 1, 1).unwrap();
                let atom = AtomRecord::new("C1", Element::C, Point3::new(x, 0.0, 0.0)).with_alt_id(alt);
                b.add_atom(r, atom).unwrap();
            }
            bonds_of(Arc::new(b.build().unwrap()), &InterBondProps::default())
        };
        assert!(bonds_with("B").is_empty());
        assert_eq!(bonds_with("A").edge_count(), 1);
        assert_eq!(bonds_with("").edge_count(), 1);
    }

    #[test]
    fn declared_hydrogen_pairs_never_bond_across_units() {
        let declared = |element: Element| {
            model(
                &[
                    ("A", "1", "LIG", &[("X1", element, [0.0, 0.0, 0.0])]),
                    ("B", "1", "LIG", &[("H2", Element::H, [0.74, 0.0, 0.0])]),
                ],
                |b| {
                    b.add_index_pair_bond(IndexPairBond::new(0, 1).with_distance(0.74));
                },
            )
        };
        assert!(bonds_of(declared(Element::H), &InterBondProps::default()).is_empty());
        assert_eq!(bonds_of(declared(Element::O), &InterBondProps::default()).edge_count(), 1);
    }

    #[test]
    fn declared_distance_falls_back_to_table_max_distance() {
        let declared = |max_distance: Option<f64>| {
            model(
                &[
                    ("A", "1", "LIG", &[("C1", Element::C, [0.0, 0.0, 0.0])]),
                    ("B", "1", "LIG", &[("C2", Element::C, [1.5, 0.0, 0.0])]),
                ],
                |b| {
                    b.enable_index_pairs(max_distance);
                    b.add_index_pair_bond(IndexPairBond::new(0, 1).with_distance(1.0));
                },
            )
        };
        assert_eq!(bonds_of(declared(Some(2.0)), &InterBondProps::default()).edge_count(), 1);
        assert!(bonds_of(declared(None), &InterBondProps::default()).is_empty());
    }

    #[test]
    fn index_pairs_are_checked_between_images() {
        let m = model(
            &[(
                "A",
                "1",
                "LIG",
                &[("C1", Element::C, [0.0, 0.0, 0.0]), ("C2", Element::C, [1.5, 0.0, 0.0])],
            )],
            |b| {
                b.add_index_pair_bond(IndexPairBond::new(0, 1).with_key(3));
            },
        );
        let s = structure_of(&m, &[(&[0, 1], translation(0.0, None)), (&[0, 1], translation(3.0, None))]);
        let bonds = compute_inter_unit_bonds(&s, &InterBondProps::default());
        // only C2 of the first image reaches C1 of the second
        assert_eq!(bonds.edge_count(), 1);
        let edge = bonds.pair(0, 1).unwrap().edges()[0];
        assert_eq!((edge.index_a, edge.index_b), (1, 0));
        assert_eq!(edge.props.key, 3);
    }

    #[test]
    fn operator_keyed_edges_join_only_their_own_images() {
        let m = model(
            &[
                ("A", "1", "LIG", &[("C1", Element::C, [0.0, 0.0, 0.0])]),
                ("B", "1", "LIG", &[("C2", Element::C, [1.5, 0.0, 0.0])]),
            ],
            |b| {
                b.add_index_pair_bond(IndexPairBond::new(0, 1).with_operators(0, 0).with_key(5));
                b.add_index_pair_bond(IndexPairBond::new(0, 1).with_operators(0, 2).with_key(6));
            },
        );
        let s = structure_of(
            &m,
            &[
                (&[0], translation(0.0, Some(0))),
                (&[1], translation(-3.0, Some(1))),
                (&[1], translation(0.0, Some(2))),
                // an unkeyed unit sends the structure down the geometric path
                (&[0], translation(500.0, None)),
            ],
        );
        let bonds = compute_inter_unit_bonds(&s, &InterBondProps::default());
        assert_eq!(bonds.edge_count(), 1);
        assert!(bonds.pair(0, 1).is_none());
        assert_eq!(bonds.pair(0, 2).unwrap().edges()[0].props.key, 6);
    }

    /// Two cysteines in separate chains joined by a disulfide record; the first residue's CB
    /// sits within covalent reach of the second SG.
    fn bridged_cysteines(with_record: bool) -> Arc<Model> {
        model(
            &[
                ("A", "1", "CYS", &[("SG", Element::S, [0.0, 0.0, 0.0]), ("CB", Element::C, [1.0, 1.2, 0.0])]),
                ("B", "1", "CYS", &[("SG", Element::S, [2.05, 0.0, 0.0]), ("CB", Element::C, [3.85, 0.0, 0.0])]),
            ],
            |b| {
                if with_record {
                    b.add_struct_conn(
                        StructConnKind::Disulfide,
                        1,
                        StructConnPartner::new(0),
                        StructConnPartner::new(2),
                        Some(2.05),
                    );
                }
            },
        )
    }

    #[test]
    fn connected_residue_pairs_are_not_bonded_again_by_distance() {
        let inferred = bonds_of(bridged_cysteines(false), &InterBondProps::default());
        assert_eq!(inferred.edge_count(), 2);

        let bonds = bonds_of(bridged_cysteines(true), &InterBondProps::default());
        assert_eq!(bonds.edge_count(), 1);
        let pair = bonds.pair(0, 1).unwrap();
        let edge = pair.edges()[0];
        assert_eq!((edge.index_a, edge.index_b), (0, 0));
        assert!(edge.props.flags.contains(BondType::DISULFIDE));
    }

    #[test]
    fn operator_keyed_tables_bond_images_without_geometry() {
        let m = model(
            &[("A", "1", "LIG", &[("C1", Element::C, [0.0, 0.0, 0.0])])],
            |b| {
                b.add_index_pair_bond(IndexPairBond::new(0, 0).with_operators(0, 1).with_key(7));
            },
        );
        let keyed = |key: i32, dx: f64| {
            Arc::new(
                SymmetryOperator::from_matrix(Matrix4::new_translation(&Vector3::new(dx, 0.0, 0.0)))
                    .with_key(key),
            )
        };
        let mut builder = Structure::builder(StructureProps::default());
        for (key, dx) in [(0, 0.0), (1, 100.0)] {
            builder.add_unit(
                UnitKind::Atomic,
                &m,
                keyed(key, dx),
                SortedArray::of_single(0),
                UnitTraits::empty(),
                Some(0),
            );
        }
        let s = builder.get_structure();
        let bonds = compute_inter_unit_bonds(&s, &InterBondProps::default());
        assert_eq!(bonds.edge_count(), 1);
        assert_eq!(bonds.pair(0, 1).unwrap().edges()[0].props.key, 7);

        let forced = InterBondProps {
            force_compute: true,
            ..Default::default()
        };
        assert!(compute_inter_unit_bonds(&s, &forced).is_empty());
    }
}
