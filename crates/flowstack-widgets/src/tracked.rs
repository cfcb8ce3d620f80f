#![forbid(unsafe_code)]

//! Handles plus their cached geometry and last applied style.

use flowstack_core::geometry::Measurement;
use flowstack_core::handle::ElementHandle;
use flowstack_core::measure::{InvalidationCause, MeasurementCache};
use flowstack_core::visual::StyleWrite;

/// A fixed set of element handles read in the measurement pass and written
/// in the transform pass.
///
/// Writes identical to the previous one for the same slot are skipped.
pub(crate) struct Tracked {
    handles: Vec<Box<dyn ElementHandle>>,
    cache: MeasurementCache,
    last: Vec<Option<StyleWrite>>,
}

impl Tracked {
    pub(crate) fn new(handles: Vec<Box<dyn ElementHandle>>) -> Self {
        let n = handles.len();
        Self {
            handles,
            cache: MeasurementCache::new(n),
            last: vec![None; n],
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.handles.len()
    }

    /// Read every handle. Returns how many produced a usable measurement.
    pub(crate) fn measure_all(&mut self) -> usize {
        for (slot, handle) in self.handles.iter().enumerate() {
            self.cache.record(slot, handle.measure());
        }
        self.cache.fresh_count()
    }

    /// Read one handle now, bypassing the cache.
    pub(crate) fn measure_now(&self, slot: usize) -> Option<Measurement> {
        self.handles
            .get(slot)
            .and_then(|h| h.measure())
            .filter(Measurement::is_finite)
    }

    pub(crate) fn invalidate(&mut self, cause: InvalidationCause) {
        self.cache.invalidate_all(cause);
    }

    /// Cached measurement for `slot`, if fresh.
    #[inline]
    pub(crate) fn measurement(&self, slot: usize) -> Option<Measurement> {
        self.cache.get(slot)
    }

    /// Apply `write` unless it repeats the previous one. Returns whether the
    /// handle was touched.
    pub(crate) fn write(&mut self, slot: usize, write: StyleWrite) -> bool {
        let (Some(handle), Some(last)) = (self.handles.get_mut(slot), self.last.get_mut(slot))
        else {
            return false;
        };
        if last.as_ref() == Some(&write) {
            return false;
        }
        handle.apply(&write);
        *last = Some(write);
        true
    }

    /// Forget the last write so the next one is applied unconditionally.
    pub(crate) fn forget(&mut self, slot: usize) {
        if let Some(last) = self.last.get_mut(slot) {
            *last = None;
        }
    }
}
