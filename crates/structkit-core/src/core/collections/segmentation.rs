use super::sorted_array::ElementIndex;
use std::ops::Range;

/// Partition of a contiguous element range into consecutive segments.
///
/// `offsets` has one entry per segment plus a closing entry; segment `s` covers
/// elements `offsets[s]..offsets[s + 1]`. `index` maps every element back to its segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segmentation {
    offsets: Vec<ElementIndex>,
    index: Vec<u32>,
}

/// A run of consecutive elements of a sorted set that fall in the same segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentChunk {
    pub segment: u32,
    /// Start position in the element slice (not an element index).
    pub start: usize,
    /// End position in the element slice, exclusive.
    pub end: usize,
}

impl Segmentation {
    /// Builds a segmentation from closing offsets; `offsets` must start at 0 and be non-decreasing.
    pub fn from_offsets(offsets: Vec<ElementIndex>) -> Self {
        let count = offsets.len().saturating_sub(1);
        let total = offsets.last().copied().unwrap_or(0) as usize;
        let mut index = vec![0u32; total];
        for s in 0..count {
            for e in offsets[s]..offsets[s + 1] {
                index[e as usize] = s as u32;
            }
        }
        Self { offsets, index }
    }

    pub fn from_sizes(sizes: impl IntoIterator<Item = u32>) -> Self {
        let mut offsets = vec![0];
        let mut acc = 0;
        for size in sizes {
            acc += size;
            offsets.push(acc);
        }
        Self::from_offsets(offsets)
    }

    pub fn count(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub fn element_count(&self) -> usize {
        self.index.len()
    }

    pub fn range(&self, segment: u32) -> Range<ElementIndex> {
        let s = segment as usize;
        self.offsets[s]..self.offsets[s + 1]
    }

    #[inline]
    pub fn segment_of(&self, element: ElementIndex) -> u32 {
        self.index[element as usize]
    }

    pub fn offsets(&self) -> &[ElementIndex] {
        &self.offsets
    }

    /// Groups an ascending element slice into per-segment runs.
    pub fn chunks<'a>(&'a self, elements: &'a [ElementIndex]) -> SegmentChunks<'a> {
        SegmentChunks {
            segmentation: self,
            elements,
            position: 0,
        }
    }
}

pub struct SegmentChunks<'a> {
    segmentation: &'a Segmentation,
    elements: &'a [ElementIndex],
    position: usize,
}

impl Iterator for SegmentChunks<'_> {
    type Item = SegmentChunk;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.elements.len() {
            return None;
        }
        let start = self.position;
        let segment = self.segmentation.segment_of(self.elements[start]);
        let seg_end = self.segmentation.offsets[segment as usize + 1];
        let end = start + self.elements[start..].partition_point(|&e| e < seg_end);
        self.position = end;
        Some(SegmentChunk { segment, start, end })
    }
}
