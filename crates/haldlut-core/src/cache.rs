//! Bounded LRU cache of decoded color cubes.
//!
//! Keys combine the LUT identity, the cube dimension and the Hald layout.
//! Recency is tracked in an explicit queue (front = least recently used) so
//! eviction order is deterministic. The map lock is never held while a cube
//! is being extracted; concurrent misses on one key share a single in-flight
//! slot, so each key is decoded once.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use crate::hald::{self, HaldLayout, HaldLutImage, LutIdentity};
use crate::transform::cube::ColorCube;

/// Number of cubes kept alive at once.
pub const CUBE_CACHE_CAPACITY: usize = 5;

/// Cache key for one decoded cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CubeKey {
    pub lut: LutIdentity,
    pub dimension: u32,
    pub layout: HaldLayout,
}

impl CubeKey {
    /// Key for `lut` decoded at `dimension`.
    pub fn new(lut: &HaldLutImage, dimension: u32) -> Self {
        Self {
            lut: lut.identity(),
            dimension,
            layout: lut.layout(),
        }
    }
}

/// Counters describing cache behavior since construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub extractions: u64,
    pub evictions: u64,
    pub len: usize,
}

type Slot = Arc<OnceLock<Arc<ColorCube>>>;

struct CacheState {
    entries: HashMap<CubeKey, Arc<ColorCube>>,
    /// Access order for LRU eviction (front = oldest).
    recency: VecDeque<CubeKey>,
    /// Extractions in progress, shared by concurrent callers.
    in_flight: HashMap<CubeKey, Slot>,
    hits: u64,
    misses: u64,
    extractions: u64,
    evictions: u64,
}

impl CacheState {
    fn touch(&mut self, key: &CubeKey) {
        if let Some(pos) = self.recency.iter().position(|k| k == key) {
            self.recency.remove(pos);
        }
        self.recency.push_back(*key);
    }

    fn insert(&mut self, key: CubeKey, cube: Arc<ColorCube>, capacity: usize) {
        self.entries.insert(key, cube);
        self.touch(&key);
        while self.entries.len() > capacity {
            let Some(oldest) = self.recency.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            self.evictions += 1;
            tracing::debug!(
                lut = %oldest.lut,
                dimension = oldest.dimension,
                "evicted cube from cache"
            );
        }
    }
}

/// Thread-safe LRU cache from [`CubeKey`] to decoded [`ColorCube`]s.
pub struct CubeCache {
    state: Mutex<CacheState>,
    capacity: usize,
}

impl Default for CubeCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CubeCache {
    /// Empty cache holding up to [`CUBE_CACHE_CAPACITY`] cubes.
    pub fn new() -> Self {
        Self::with_capacity(CUBE_CACHE_CAPACITY)
    }

    /// Empty cache with a custom capacity (at least one entry).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: Mutex::new(CacheState {
                entries: HashMap::with_capacity(capacity + 1),
                recency: VecDeque::with_capacity(capacity + 1),
                in_flight: HashMap::new(),
                hits: 0,
                misses: 0,
                extractions: 0,
                evictions: 0,
            }),
            capacity: capacity.max(1),
        }
    }

    /// Return the cube for `lut` at `dimension`, decoding it on a miss.
    ///
    /// `dimension` must already be validated.
    pub fn get_or_extract(&self, lut: &HaldLutImage, dimension: u32) -> Arc<ColorCube> {
        self.get_or_insert_with(CubeKey::new(lut, dimension), || {
            let (cube, fallbacks) = hald::extract_counted(lut.image(), dimension, lut.layout());
            if fallbacks > 0 {
                let (w, h) = lut.image().dimensions();
                tracing::warn!(
                    lut = %lut.identity(),
                    dimension,
                    fallbacks,
                    "Hald image {w}x{h} is too small for the cube, using identity for missing samples"
                );
            }
            cube
        })
    }

    /// Return the cube for `key`, calling `extract` at most once per key
    /// across all concurrent callers.
    pub fn get_or_insert_with(
        &self,
        key: CubeKey,
        extract: impl FnOnce() -> ColorCube,
    ) -> Arc<ColorCube> {
        let slot = {
            let mut state = self.state.lock();
            if let Some(cube) = state.entries.get(&key).cloned() {
                state.hits += 1;
                state.touch(&key);
                tracing::debug!(lut = %key.lut, dimension = key.dimension, "cube cache hit");
                return cube;
            }
            state.misses += 1;
            state.in_flight.entry(key).or_default().clone()
        };

        let mut extracted = false;
        let cube = slot
            .get_or_init(|| {
                extracted = true;
                tracing::debug!(lut = %key.lut, dimension = key.dimension, "extracting cube");
                Arc::new(extract())
            })
            .clone();

        let mut state = self.state.lock();
        if extracted {
            state.extractions += 1;
        }
        let owns_slot = state
            .in_flight
            .get(&key)
            .is_some_and(|s| Arc::ptr_eq(s, &slot));
        if owns_slot {
            state.in_flight.remove(&key);
            let capacity = self.capacity;
            state.insert(key, cube.clone(), capacity);
        }
        cube
    }

    /// Whether `key` is currently cached.
    pub fn contains(&self, key: &CubeKey) -> bool {
        self.state.lock().entries.contains_key(key)
    }

    /// Cached keys from least to most recently used.
    pub fn keys_by_recency(&self) -> Vec<CubeKey> {
        self.state.lock().recency.iter().copied().collect()
    }

    /// Number of cached cubes.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of cached cubes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            hits: state.hits,
            misses: state.misses,
            extractions: state.extractions,
            evictions: state.evictions,
            len: state.entries.len(),
        }
    }

    /// Drop every cached cube. Cubes already handed out stay valid.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.recency.clear();
    }
}
