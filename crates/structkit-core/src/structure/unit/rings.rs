use crate::bonds::graph::BondGraph;
use std::collections::{HashMap, HashSet, VecDeque};

/// Largest ring, in atoms, that is reported.
pub const MAX_RING_SIZE: usize = 8;

/// Smallest rings through every bond of a unit, over unit-local indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitRings {
    rings: Vec<Vec<u32>>,
    by_element: HashMap<u32, Vec<usize>>,
}

impl UnitRings {
    pub fn compute(graph: &BondGraph) -> Self {
        let mut rings = Vec::new();
        let mut seen: HashSet<Vec<u32>> = HashSet::new();
        for edge in graph.edges() {
            if graph.degree(edge.a) < 2 || graph.degree(edge.b) < 2 {
                continue;
            }
            if let Some(mut ring) = shortest_cycle_through(graph, edge.a, edge.b) {
                ring.sort_unstable();
                if seen.insert(ring.clone()) {
                    rings.push(ring);
                }
            }
        }

        let mut by_element: HashMap<u32, Vec<usize>> = HashMap::new();
        for (i, ring) in rings.iter().enumerate() {
            for &v in ring {
                by_element.entry(v).or_default().push(i);
            }
        }
        Self { rings, by_element }
    }

    pub fn rings(&self) -> &[Vec<u32>] {
        &self.rings
    }

    /// Ring members in ascending local-index order.
    pub fn ring(&self, index: usize) -> &[u32] {
        &self.rings[index]
    }

    pub fn rings_of(&self, element: u32) -> &[usize] {
        self.by_element.get(&element).map_or(&[], Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }
}

/// Breadth-first search for the shortest `a`→`b` path that avoids the edge `a`–`b`.
fn shortest_cycle_through(graph: &BondGraph, a: u32, b: u32) -> Option<Vec<u32>> {
    let mut parent: HashMap<u32, u32> = HashMap::new();
    let mut queue = VecDeque::new();
    parent.insert(a, a);
    queue.push_back((a, 0usize));

    while let Some((v, depth)) = queue.pop_front() {
        if depth + 1 >= MAX_RING_SIZE {
            continue;
        }
        for (n, _) in graph.neighbors(v) {
            if (v == a && n == b) || parent.contains_key(&n) {
                continue;
            }
            parent.insert(n, v);
            if n == b {
                let mut path = vec![b];
                let mut cur = v;
                while cur != a {
                    path.push(cur);
                    cur = parent[&cur];
                }
                path.push(a);
                return Some(path);
            }
            queue.push_back((n, depth + 1));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bonds::graph::{BondGraphBuilder, BondProps};
    use crate::core::chemistry::BondType;

    fn graph(n: usize, edges: &[(u32, u32)]) -> BondGraph {
        let mut b = BondGraphBuilder::new(n);
        for &(x, y) in edges {
            b.add(x, y, BondProps::new(1, BondType::COVALENT, -1));
        }
        b.build()
    }

    #[test]
    fn six_membered_ring_is_found_once() {
        let g = graph(7, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 0), (5, 6)]);
        let rings = UnitRings::compute(&g);
        assert_eq!(rings.len(), 1);
        assert_eq!(rings.ring(0), &[0, 1, 2, 3, 4, 5]);
        assert_eq!(rings.rings_of(3), &[0]);
        assert!(rings.rings_of(6).is_empty());
    }

    #[test]
    fn fused_rings_yield_smallest_rings_only() {
        // two fused six-membered rings sharing the 0-5 bond
        let g = graph(
            10,
            &[
                (0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 0),
                (5, 6), (6, 7), (7, 8), (8, 9), (9, 0),
            ],
        );
        let rings = UnitRings::compute(&g);
        assert_eq!(rings.len(), 2);
        assert!(rings.rings().iter().all(|r| r.len() == 6));
        assert_eq!(rings.rings_of(0).len(), 2);
    }

    #[test]
    fn chains_have_no_rings() {
        let g = graph(4, &[(0, 1), (1, 2), (2, 3)]);
        assert!(UnitRings::compute(&g).is_empty());
    }
}
