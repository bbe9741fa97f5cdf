//! Bounded, insertion-ordered caches of generated sectors and live flocks.

use std::collections::{HashMap, VecDeque};

use starflock_logic::{SectorCoord, Window};

use crate::components::{Flock, Sector};

/// Coordinate-keyed map that remembers insertion order.
#[derive(Debug, Clone)]
pub struct RegionCache<T> {
    entries: HashMap<SectorCoord, T>,
    order: VecDeque<SectorCoord>,
    capacity: usize,
}

impl<T> RegionCache<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_over_capacity(&self) -> bool {
        self.len() > self.capacity
    }

    pub fn contains(&self, coord: &SectorCoord) -> bool {
        self.entries.contains_key(coord)
    }

    pub fn get(&self, coord: &SectorCoord) -> Option<&T> {
        self.entries.get(coord)
    }

    pub fn get_mut(&mut self, coord: &SectorCoord) -> Option<&mut T> {
        self.entries.get_mut(coord)
    }

    /// Insert a new entry at the young end. Replacing keeps the original slot.
    pub fn insert(&mut self, coord: SectorCoord, value: T) {
        if self.entries.insert(coord, value).is_none() {
            self.order.push_back(coord);
        }
    }

    pub fn remove(&mut self, coord: &SectorCoord) -> Option<T> {
        let value = self.entries.remove(coord)?;
        self.order.retain(|c| c != coord);
        Some(value)
    }

    /// Coordinates oldest first.
    pub fn keys(&self) -> impl Iterator<Item = &SectorCoord> + '_ {
        self.order.iter()
    }

    /// Entries oldest first.
    pub fn iter(&self) -> impl Iterator<Item = (&SectorCoord, &T)> + '_ {
        self.order
            .iter()
            .filter_map(move |c| self.entries.get(c).map(|v| (c, v)))
    }
}

pub type SectorCache = RegionCache<Sector>;
pub type FlockCache = RegionCache<Flock>;

impl SectorCache {
    /// While over capacity, drop the oldest sector outside `window`.
    /// Stops early when every remaining sector is inside the window.
    pub fn evict_outside(&mut self, window: &Window) -> Vec<SectorCoord> {
        let mut evicted = Vec::new();
        while self.is_over_capacity() {
            let Some(pos) = self.order.iter().position(|c| !window.contains(c)) else {
                break;
            };
            if let Some(coord) = self.order.remove(pos) {
                self.entries.remove(&coord);
                evicted.push(coord);
            }
        }
        evicted
    }
}

impl FlockCache {
    /// When over capacity, remove every flock for which `eligible` holds.
    /// Removed flocks are returned oldest first so the caller can despawn
    /// their agents and persist what they remember.
    pub fn evict_eligible(&mut self, mut eligible: impl FnMut(&Flock) -> bool) -> Vec<Flock> {
        if !self.is_over_capacity() {
            return Vec::new();
        }
        let doomed: Vec<SectorCoord> = self
            .iter()
            .filter(|(_, flock)| eligible(*flock))
            .map(|(c, _)| *c)
            .collect();
        doomed.iter().filter_map(|c| self.remove(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(cache: &mut SectorCache, coords: impl IntoIterator<Item = (i32, i32)>) {
        for (x, y) in coords {
            let c = SectorCoord::new(x, y);
            cache.insert(c, Sector::empty(c));
        }
    }

    #[test]
    fn test_insert_keeps_order() {
        let mut cache = SectorCache::new(10);
        fill(&mut cache, [(3, 3), (1, 1), (2, 2)]);
        let keys: Vec<_> = cache.keys().copied().collect();
        assert_eq!(
            keys,
            vec![SectorCoord::new(3, 3), SectorCoord::new(1, 1), SectorCoord::new(2, 2)]
        );
        cache.insert(SectorCoord::new(3, 3), Sector::empty(SectorCoord::new(3, 3)));
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.keys().next(), Some(&SectorCoord::new(3, 3)));
    }

    #[test]
    fn test_evicts_oldest_outside_window() {
        let mut cache = SectorCache::new(2);
        fill(&mut cache, [(10, 10), (0, 0), (11, 11), (1, 0)]);
        let window = Window::new(SectorCoord::ORIGIN, 1);
        let evicted = cache.evict_outside(&window);
        assert_eq!(evicted, vec![SectorCoord::new(10, 10), SectorCoord::new(11, 11)]);
        assert!(cache.contains(&SectorCoord::ORIGIN));
        assert!(cache.contains(&SectorCoord::new(1, 0)));
    }

    #[test]
    fn test_no_candidate_is_noop() {
        let mut cache = SectorCache::new(1);
        fill(&mut cache, [(0, 0), (1, 1), (-1, 0)]);
        let window = Window::new(SectorCoord::ORIGIN, 1);
        assert!(cache.evict_outside(&window).is_empty());
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_under_capacity_keeps_everything() {
        let mut cache = SectorCache::new(5);
        fill(&mut cache, [(50, 50), (60, 60)]);
        let window = Window::new(SectorCoord::ORIGIN, 2);
        assert!(cache.evict_outside(&window).is_empty());
    }

    #[test]
    fn test_remove_updates_order() {
        let mut cache = SectorCache::new(5);
        fill(&mut cache, [(0, 0), (1, 0), (2, 0)]);
        assert!(cache.remove(&SectorCoord::new(1, 0)).is_some());
        assert!(cache.remove(&SectorCoord::new(1, 0)).is_none());
        let keys: Vec<_> = cache.iter().map(|(c, _)| *c).collect();
        assert_eq!(keys, vec![SectorCoord::new(0, 0), SectorCoord::new(2, 0)]);
    }
}
