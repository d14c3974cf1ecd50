use super::structure::Structure;
use super::unit::Unit;

/// Filters and reach of a unit-pair traversal.
pub struct UnitPairProps<'a> {
    /// Largest gap between two unit boundary spheres for the pair to be visited.
    pub max_radius: f64,
    pub valid_unit: Option<&'a dyn Fn(&Unit) -> bool>,
    pub valid_unit_pair: Option<&'a dyn Fn(&Unit, &Unit) -> bool>,
}

impl UnitPairProps<'_> {
    pub fn new(max_radius: f64) -> Self {
        Self {
            max_radius,
            valid_unit: None,
            valid_unit_pair: None,
        }
    }
}

/// Visits every unordered pair of distinct units whose world boundary spheres come within
/// `max_radius` of each other, once.
///
/// Pairs are visited in ascending order of the first unit's position, then the second's.
/// The callback receives the unit with fewer elements first (the lower position on ties).
pub fn each_unit_pair(
    structure: &Structure,
    props: &UnitPairProps<'_>,
    mut callback: impl FnMut(&Unit, &Unit),
) {
    let units = structure.units();
    let lookup = structure.lookup3d();
    let valid: Vec<bool> = units
        .iter()
        .map(|u| props.valid_unit.is_none_or(|f| f(u)))
        .collect();

    for (i, unit) in units.iter().enumerate() {
        if !valid[i] {
            continue;
        }
        let sphere = lookup.spheres()[i];
        let candidates = lookup.find_unit_indices(
            sphere.center.x,
            sphere.center.y,
            sphere.center.z,
            sphere.radius + props.max_radius,
        );
        for j in candidates {
            if j <= i || !valid[j] {
                continue;
            }
            let other = &units[j];
            if props.valid_unit_pair.is_some_and(|f| !f(unit, other)) {
                continue;
            }
            if other.element_count() < unit.element_count() {
                callback(other, unit);
            } else {
                callback(unit, other);
            }
        }
    }
}
