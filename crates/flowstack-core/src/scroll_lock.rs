#![forbid(unsafe_code)]

//! Document scroll lock as a reference-counted resource.
//!
//! Overlays that need the page to stay still call [`ScrollLock::acquire`] and
//! hold the returned [`ScrollLockGuard`] for as long as they are shown. The
//! underlying [`ScrollSurface`] is locked when the first guard is taken and
//! unlocked when the last one is dropped. Release is tied to the guard's
//! lifetime, so an overlay torn down while open cannot leak a locked page.
//!
//! The lock is single-threaded (`Rc`), like the event loop that drives it.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// The thing whose scrolling gets suspended (e.g. `document.body`).
pub trait ScrollSurface {
    /// Suspend (`true`) or restore (`false`) user scrolling.
    fn set_locked(&mut self, locked: bool);
}

struct Inner {
    holders: u32,
    surface: Box<dyn ScrollSurface>,
}

/// Shared handle to the document scroll lock.
#[derive(Clone)]
pub struct ScrollLock {
    inner: Rc<RefCell<Inner>>,
}

impl ScrollLock {
    /// Wrap a surface. The surface starts unlocked.
    pub fn new(surface: impl ScrollSurface + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                holders: 0,
                surface: Box::new(surface),
            })),
        }
    }

    /// Take a hold on the lock.
    #[must_use = "the lock is released as soon as the guard is dropped"]
    pub fn acquire(&self) -> ScrollLockGuard {
        let mut inner = self.inner.borrow_mut();
        inner.holders = inner.holders.saturating_add(1);
        if inner.holders == 1 {
            inner.surface.set_locked(true);
            crate::trace!("scroll locked");
        }
        ScrollLockGuard {
            lock: self.clone(),
            released: false,
        }
    }

    /// Whether any guard is outstanding.
    pub fn is_locked(&self) -> bool {
        self.inner.borrow().holders > 0
    }

    /// Number of outstanding guards.
    pub fn holders(&self) -> u32 {
        self.inner.borrow().holders
    }

    fn release(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.holders == 0 {
            return;
        }
        inner.holders -= 1;
        if inner.holders == 0 {
            inner.surface.set_locked(false);
            crate::trace!("scroll unlocked");
        }
    }
}

impl fmt::Debug for ScrollLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollLock")
            .field("holders", &self.holders())
            .finish()
    }
}

/// One hold on the scroll lock. Releases on drop.
#[derive(Debug)]
pub struct ScrollLockGuard {
    lock: ScrollLock,
    released: bool,
}

impl ScrollLockGuard {
    /// Release now instead of at drop.
    pub fn release(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if !self.released {
            self.released = true;
            self.lock.release();
        }
    }
}

impl Drop for ScrollLockGuard {
    fn drop(&mut self) {
        self.release_once();
    }
}
