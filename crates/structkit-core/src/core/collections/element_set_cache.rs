use super::sorted_array::SortedArray;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Default number of element sets kept per cache.
pub const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    tag: i32,
    hash: u32,
    len: usize,
}

#[derive(Debug)]
struct CacheState<T> {
    entries: HashMap<CacheKey, Vec<(SortedArray, Arc<T>)>>,
    order: VecDeque<(CacheKey, SortedArray)>,
}

/// Bounded map from `(tag, element set)` to a shared value, evicting the oldest insert first.
///
/// Keys are bucketed by the element set's hash and confirmed by full set equality.
#[derive(Debug)]
pub struct ElementSetCache<T> {
    capacity: usize,
    state: Mutex<CacheState<T>>,
}

impl<T> Default for ElementSetCache<T> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl<T> ElementSetCache<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn key(tag: i32, elements: &SortedArray) -> CacheKey {
        CacheKey {
            tag,
            hash: elements.hash_code(),
            len: elements.len(),
        }
    }

    pub fn get(&self, tag: i32, elements: &SortedArray) -> Option<Arc<T>> {
        let state = self.state.lock().ok()?;
        state
            .entries
            .get(&Self::key(tag, elements))?
            .iter()
            .find(|(set, _)| set.are_equal(elements))
            .map(|(_, value)| Arc::clone(value))
    }

    /// Stores `value` unless an equal key is already present; returns the cached value.
    pub fn insert(&self, tag: i32, elements: &SortedArray, value: Arc<T>) -> Arc<T> {
        if self.capacity == 0 {
            return value;
        }
        let Ok(mut state) = self.state.lock() else {
            return value;
        };
        let key = Self::key(tag, elements);
        if let Some(existing) = state
            .entries
            .get(&key)
            .and_then(|bucket| bucket.iter().find(|(set, _)| set.are_equal(elements)))
        {
            return Arc::clone(&existing.1);
        }

        while state.order.len() >= self.capacity {
            let Some((old_key, old_set)) = state.order.pop_front() else {
                break;
            };
            if let Some(bucket) = state.entries.get_mut(&old_key) {
                bucket.retain(|(set, _)| !set.are_equal(&old_set));
                if bucket.is_empty() {
                    state.entries.remove(&old_key);
                }
            }
        }

        state
            .entries
            .entry(key.clone())
            .or_default()
            .push((elements.clone(), Arc::clone(&value)));
        state.order.push_back((key, elements.clone()));
        value
    }

    pub fn len(&self) -> usize {
        self.state.lock().map(|s| s.order.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
