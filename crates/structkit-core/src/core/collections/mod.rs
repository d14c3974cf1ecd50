pub mod element_set_cache;
pub mod segmentation;
pub mod sorted_array;

pub use element_set_cache::ElementSetCache;
pub use segmentation::{SegmentChunk, Segmentation};
pub use sorted_array::{ElementIndex, SortedArray};
