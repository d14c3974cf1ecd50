use crate::core::chemistry::BondType;
use std::collections::HashSet;

/// Per-edge bond properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BondProps {
    /// Integer bond order; `0` when unknown.
    pub order: u8,
    pub flags: BondType,
    /// Row of the record the bond was taken from, or `-1` when inferred from distance.
    pub key: i32,
}

impl BondProps {
    pub fn new(order: u8, flags: BondType, key: i32) -> Self {
        Self { order, flags, key }
    }

    pub fn computed(flags: BondType) -> Self {
        Self {
            order: 1,
            flags: flags | BondType::COMPUTED,
            key: -1,
        }
    }
}

/// An undirected edge stored once with `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub a: u32,
    pub b: u32,
    pub props: BondProps,
}

/// Adjacency graph over a local index space `0..vertex_count`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BondGraph {
    vertex_count: usize,
    edges: Vec<Edge>,
    offsets: Vec<u32>,
    /// `(neighbor, edge index)` per adjacency slot.
    adjacency: Vec<(u32, u32)>,
}

impl BondGraph {
    pub fn empty(vertex_count: usize) -> Self {
        Self {
            vertex_count,
            edges: Vec::new(),
            offsets: vec![0; vertex_count + 1],
            adjacency: Vec::new(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Canonical edges sorted by `(a, b)`.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn degree(&self, v: u32) -> usize {
        let v = v as usize;
        if v >= self.vertex_count {
            return 0;
        }
        (self.offsets[v + 1] - self.offsets[v]) as usize
    }

    pub fn neighbors(&self, v: u32) -> impl Iterator<Item = (u32, &BondProps)> + '_ {
        let v = v as usize;
        let range = if v < self.vertex_count {
            self.offsets[v] as usize..self.offsets[v + 1] as usize
        } else {
            0..0
        };
        self.adjacency[range]
            .iter()
            .map(move |&(other, e)| (other, &self.edges[e as usize].props))
    }

    pub fn props(&self, a: u32, b: u32) -> Option<&BondProps> {
        let (a, b) = if a < b { (a, b) } else { (b, a) };
        self.edges
            .binary_search_by(|e| (e.a, e.b).cmp(&(a, b)))
            .ok()
            .map(|i| &self.edges[i].props)
    }

    pub fn has_edge(&self, a: u32, b: u32) -> bool {
        self.props(a, b).is_some()
    }
}

/// Accumulates edges, rejecting self edges and keeping the first properties seen per pair.
#[derive(Debug, Clone)]
pub struct BondGraphBuilder {
    vertex_count: usize,
    edges: Vec<Edge>,
    seen: HashSet<(u32, u32)>,
}

impl BondGraphBuilder {
    pub fn new(vertex_count: usize) -> Self {
        Self {
            vertex_count,
            edges: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Adds the edge `a`–`b`; returns `false` if it was a self edge or already present.
    pub fn add(&mut self, a: u32, b: u32, props: BondProps) -> bool {
        if a == b || a as usize >= self.vertex_count || b as usize >= self.vertex_count {
            return false;
        }
        let (a, b) = if a < b { (a, b) } else { (b, a) };
        if !self.seen.insert((a, b)) {
            return false;
        }
        self.edges.push(Edge { a, b, props });
        true
    }

    pub fn contains(&self, a: u32, b: u32) -> bool {
        let key = if a < b { (a, b) } else { (b, a) };
        self.seen.contains(&key)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn build(mut self) -> BondGraph {
        self.edges.sort_unstable_by_key(|e| (e.a, e.b));

        let mut offsets = vec![0u32; self.vertex_count + 1];
        for e in &self.edges {
            offsets[e.a as usize + 1] += 1;
            offsets[e.b as usize + 1] += 1;
        }
        for i in 1..offsets.len() {
            offsets[i] += offsets[i - 1];
        }
        let mut fill = offsets.clone();
        let mut adjacency = vec![(0u32, 0u32); self.edges.len() * 2];
        for (i, e) in self.edges.iter().enumerate() {
            adjacency[fill[e.a as usize] as usize] = (e.b, i as u32);
            fill[e.a as usize] += 1;
            adjacency[fill[e.b as usize] as usize] = (e.a, i as u32);
            fill[e.b as usize] += 1;
        }

        BondGraph {
            vertex_count: self.vertex_count,
            edges: self.edges,
            offsets,
            adjacency,
        }
    }
}
