use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Index of an element (atom, sphere or gaussian) inside a model's tables.
pub type ElementIndex = u32;

/// A strictly ascending, duplicate-free set of element indices.
///
/// The backing storage is shared, so clones are cheap and two sets built from the
/// same allocation can be compared by identity with [`SortedArray::ptr_eq`].
#[derive(Clone)]
pub struct SortedArray(Arc<[ElementIndex]>);

impl SortedArray {
    pub fn empty() -> Self {
        Self(Arc::from(Vec::new()))
    }

    /// Wraps values that the caller guarantees are strictly ascending.
    pub fn from_sorted_unchecked(values: Vec<ElementIndex>) -> Self {
        debug_assert!(values.windows(2).all(|w| w[0] < w[1]));
        Self(Arc::from(values))
    }

    pub fn from_unsorted(mut values: Vec<ElementIndex>) -> Self {
        values.sort_unstable();
        values.dedup();
        Self(Arc::from(values))
    }

    /// The half-open range `[start, end)`.
    pub fn of_range(start: ElementIndex, end: ElementIndex) -> Self {
        Self(Arc::from((start..end.max(start)).collect::<Vec<_>>()))
    }

    pub fn of_single(value: ElementIndex) -> Self {
        Self(Arc::from(vec![value]))
    }

    #[inline]
    pub fn has(&self, value: ElementIndex) -> bool {
        self.0.binary_search(&value).is_ok()
    }

    /// Position of `value` in the set, if present.
    #[inline]
    pub fn index_of(&self, value: ElementIndex) -> Option<usize> {
        self.0.binary_search(&value).ok()
    }

    /// Index of the first value `>= value` within `[start, end)`.
    pub fn find_predecessor_index_in_range(&self, value: ElementIndex, start: usize, end: usize) -> usize {
        let end = end.min(self.0.len());
        if start >= end {
            return start;
        }
        start + self.0[start..end].partition_point(|&v| v < value)
    }

    pub fn is_subset_of(&self, other: &SortedArray) -> bool {
        if self.len() > other.len() {
            return false;
        }
        let (mut i, mut j) = (0, 0);
        while i < self.len() && j < other.len() {
            match self.0[i].cmp(&other.0[j]) {
                Ordering::Less => return false,
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
                Ordering::Greater => j += 1,
            }
        }
        i == self.len()
    }

    pub fn are_intersecting(&self, other: &SortedArray) -> bool {
        let (mut i, mut j) = (0, 0);
        while i < self.len() && j < other.len() {
            match self.0[i].cmp(&other.0[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => return true,
            }
        }
        false
    }

    pub fn intersect(&self, other: &SortedArray) -> SortedArray {
        if self.ptr_eq(other) {
            return self.clone();
        }
        let mut out = Vec::with_capacity(self.len().min(other.len()));
        let (mut i, mut j) = (0, 0);
        while i < self.len() && j < other.len() {
            match self.0[i].cmp(&other.0[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    out.push(self.0[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        if out.len() == self.len() {
            return self.clone();
        }
        SortedArray::from_sorted_unchecked(out)
    }

    pub fn union(&self, other: &SortedArray) -> SortedArray {
        if other.is_empty() || self.ptr_eq(other) {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let mut out = Vec::with_capacity(self.len() + other.len());
        let (mut i, mut j) = (0, 0);
        while i < self.len() && j < other.len() {
            match self.0[i].cmp(&other.0[j]) {
                Ordering::Less => {
                    out.push(self.0[i]);
                    i += 1;
                }
                Ordering::Greater => {
                    out.push(other.0[j]);
                    j += 1;
                }
                Ordering::Equal => {
                    out.push(self.0[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        out.extend_from_slice(&self.0[i..]);
        out.extend_from_slice(&other.0[j..]);
        SortedArray::from_sorted_unchecked(out)
    }

    pub fn subtract(&self, other: &SortedArray) -> SortedArray {
        if other.is_empty() {
            return self.clone();
        }
        let out: Vec<_> = self.0.iter().copied().filter(|&v| !other.has(v)).collect();
        if out.len() == self.len() {
            return self.clone();
        }
        SortedArray::from_sorted_unchecked(out)
    }

    #[inline]
    pub fn ptr_eq(&self, other: &SortedArray) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn are_equal(&self, other: &SortedArray) -> bool {
        self.ptr_eq(other) || self.0[..] == other.0[..]
    }

    /// Order-sensitive 31-bit hash of the values.
    pub fn hash_code(&self) -> u32 {
        let mut h: u32 = 23;
        for &v in self.0.iter() {
            h = h.wrapping_mul(31).wrapping_add(v);
        }
        h.wrapping_mul(31).wrapping_add(self.len() as u32) & 0x7fff_ffff
    }

    pub fn as_slice(&self) -> &[ElementIndex] {
        &self.0
    }
}

impl Default for SortedArray {
    fn default() -> Self {
        Self::empty()
    }
}

impl Deref for SortedArray {
    type Target = [ElementIndex];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl PartialEq for SortedArray {
    fn eq(&self, other: &Self) -> bool {
        self.are_equal(other)
    }
}

impl Eq for SortedArray {}

impl fmt::Debug for SortedArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl From<Vec<ElementIndex>> for SortedArray {
    fn from(values: Vec<ElementIndex>) -> Self {
        Self::from_unsorted(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(values: &[u32]) -> SortedArray {
        SortedArray::from_unsorted(values.to_vec())
    }

    #[test]
    fn from_unsorted_sorts_and_deduplicates() {
        let s = set(&[5, 1, 3, 3, 1]);
        assert_eq!(s.as_slice(), &[1, 3, 5]);
    }

    #[test]
    fn of_range_is_half_open() {
        assert_eq!(SortedArray::of_range(2, 5).as_slice(), &[2, 3, 4]);
        assert!(SortedArray::of_range(5, 2).is_empty());
    }

    #[test]
    fn membership_and_index_lookup() {
        let s = set(&[2, 4, 8]);
        assert!(s.has(4));
        assert!(!s.has(5));
        assert_eq!(s.index_of(8), Some(2));
        assert_eq!(s.index_of(3), None);
    }

    #[test]
    fn set_algebra_matches_expectations() {
        let a = set(&[1, 2, 3, 4]);
        let b = set(&[3, 4, 5]);
        assert_eq!(a.intersect(&b).as_slice(), &[3, 4]);
        assert_eq!(a.union(&b).as_slice(), &[1, 2, 3, 4, 5]);
        assert_eq!(a.subtract(&b).as_slice(), &[1, 2]);
        assert!(set(&[2, 3]).is_subset_of(&a));
        assert!(!b.is_subset_of(&a));
        assert!(a.are_intersecting(&b));
        assert!(!set(&[9]).are_intersecting(&a));
    }

    #[test]
    fn operations_that_change_nothing_reuse_storage() {
        let a = set(&[1, 2, 3]);
        assert!(a.subtract(&set(&[7])).ptr_eq(&a));
        assert!(a.intersect(&set(&[0, 1, 2, 3, 4])).ptr_eq(&a));
        assert!(a.union(&SortedArray::empty()).ptr_eq(&a));
    }

    #[test]
    fn hash_code_depends_on_content_only() {
        let a = set(&[1, 2, 3]);
        let b = set(&[3, 2, 1]);
        assert_eq!(a.hash_code(), b.hash_code());
        assert_ne!(a.hash_code(), set(&[1, 2, 4]).hash_code());
        assert!(a.are_equal(&b));
        assert!(!a.ptr_eq(&b));
    }

    #[test]
    fn predecessor_search_respects_range() {
        let s = set(&[1, 3, 5, 7, 9]);
        assert_eq!(s.find_predecessor_index_in_range(5, 0, 5), 2);
        assert_eq!(s.find_predecessor_index_in_range(6, 1, 4), 3);
        assert_eq!(s.find_predecessor_index_in_range(100, 0, 5), 5);
    }
}
