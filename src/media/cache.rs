use std::collections::{HashMap, VecDeque};

use crate::foundation::{core::Raster, math::Fnv1a64};

/// Stable key for a preview frame: source, timestamp (millisecond precision), width, quality.
pub fn frame_key(source: &str, timestamp: f64, width: u32, quality: u8) -> u64 {
    let mut h = Fnv1a64::new_default();
    h.write_str(source);
    h.write_str(&format!("{timestamp:.3}"));
    h.write_u32(width);
    h.write_u8(quality);
    h.finish()
}

/// Byte-budgeted LRU of decoded frames.
#[derive(Debug)]
pub struct FrameCache {
    budget_bytes: usize,
    used_bytes: usize,
    frames: HashMap<u64, Raster>,
    lru: VecDeque<u64>,
}

impl FrameCache {
    /// Cache holding at most `budget_bytes` of pixel data.
    pub fn new(budget_bytes: usize) -> Self {
        Self {
            budget_bytes,
            used_bytes: 0,
            frames: HashMap::new(),
            lru: VecDeque::new(),
        }
    }

    /// Cached frame for `key`, refreshing its recency.
    pub fn get(&mut self, key: u64) -> Option<Raster> {
        let hit = self.frames.get(&key).cloned()?;
        self.touch(key);
        Some(hit)
    }

    /// Insert a frame, evicting least recently used entries until the budget holds.
    ///
    /// Frames larger than the whole budget are not cached.
    pub fn insert(&mut self, key: u64, frame: Raster) {
        let size = frame.rgba8.len();
        if size > self.budget_bytes {
            tracing::debug!(size, budget = self.budget_bytes, "frame exceeds cache budget");
            return;
        }
        if let Some(old) = self.frames.insert(key, frame) {
            self.used_bytes -= old.rgba8.len();
        }
        self.used_bytes += size;
        self.touch(key);
        while self.used_bytes > self.budget_bytes {
            let Some(oldest) = self.lru.pop_front() else {
                break;
            };
            if let Some(evicted) = self.frames.remove(&oldest) {
                self.used_bytes -= evicted.rgba8.len();
            }
        }
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.frames.clear();
        self.lru.clear();
        self.used_bytes = 0;
    }

    /// Bytes currently held.
    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    /// Number of cached frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    fn touch(&mut self, key: u64) {
        if let Some(pos) = self.lru.iter().position(|x| *x == key) {
            self.lru.remove(pos);
        }
        self.lru.push_back(key);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/cache.rs"]
mod tests;
