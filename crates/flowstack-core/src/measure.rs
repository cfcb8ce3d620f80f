#![forbid(unsafe_code)]

//! Generation-tagged measurement cache.
//!
//! Measurements are read from the layout in a dedicated pass and reused by
//! every transform pass until a layout-affecting event invalidates them.
//!
//! # Invalidation
//!
//! [`MeasurementCache::invalidate_all`] bumps the generation. Entries recorded
//! under an older generation read as missing until the next measurement pass
//! refills them. Consumers skip missing slots for the current frame instead of
//! computing against a zeroed rectangle.

use crate::geometry::Measurement;

/// Why a cache was invalidated. Carried into logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationCause {
    Mount,
    Resize,
    FontLoad,
    OrientationChange,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    measurement: Measurement,
    generation: u64,
}

/// One optional measurement per tracked slot.
#[derive(Debug, Clone, Default)]
pub struct MeasurementCache {
    entries: Vec<Option<Entry>>,
    generation: u64,
}

impl MeasurementCache {
    /// Create a cache with `slots` empty entries.
    #[must_use]
    pub fn new(slots: usize) -> Self {
        Self {
            entries: vec![None; slots],
            generation: 0,
        }
    }

    /// Number of tracked slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache tracks no slots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current generation.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Resize the slot count (new slots start empty).
    pub fn resize(&mut self, slots: usize) {
        self.entries.resize(slots, None);
    }

    /// Record the result of measuring `slot`.
    ///
    /// `None` or a non-finite rectangle clears the slot.
    pub fn record(&mut self, slot: usize, measurement: Option<Measurement>) {
        let Some(entry) = self.entries.get_mut(slot) else {
            return;
        };
        *entry = measurement
            .filter(Measurement::is_finite)
            .map(|measurement| Entry {
                measurement,
                generation: self.generation,
            });
    }

    /// Fresh measurement for `slot`, if one exists.
    #[inline]
    pub fn get(&self, slot: usize) -> Option<Measurement> {
        self.entries
            .get(slot)
            .copied()
            .flatten()
            .filter(|e| e.generation == self.generation)
            .map(|e| e.measurement)
    }

    /// Number of slots holding a fresh measurement.
    pub fn fresh_count(&self) -> usize {
        (0..self.entries.len()).filter(|&i| self.get(i).is_some()).count()
    }

    /// Make every entry stale.
    pub fn invalidate_all(&mut self, _cause: InvalidationCause) {
        self.generation = self.generation.wrapping_add(1);
        crate::debug!(cause = ?_cause, generation = self.generation, "measurements invalidated");
    }
}
