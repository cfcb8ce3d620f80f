#![forbid(unsafe_code)]

//! Bookkeeping for host-side listener registrations.
//!
//! A browser callback cannot free its own closure while it runs, so a
//! registration removed from inside a callback is retired instead of dropped.
//! Callbacks hold a [`Sweeper`] and empty the retired list when they next
//! fire. The sweeper is weak: retired registrations whose closures own a
//! sweeper never keep the list alive, and dropping the table frees them all.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// Live and retired registrations of type `R`, keyed by id.
pub(crate) struct ListenerTable<R> {
    next: Cell<u64>,
    live: RefCell<HashMap<u64, R>>,
    retired: Rc<RefCell<Vec<R>>>,
}

impl<R> ListenerTable<R> {
    pub(crate) fn new() -> Self {
        Self {
            next: Cell::new(0),
            live: RefCell::new(HashMap::new()),
            retired: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Reserve the next id. Ids start at 1.
    pub(crate) fn next_id(&self) -> u64 {
        let id = self.next.get() + 1;
        self.next.set(id);
        id
    }

    /// Handle for callbacks to free retired registrations.
    pub(crate) fn sweeper(&self) -> Sweeper<R> {
        Sweeper(Rc::downgrade(&self.retired))
    }

    pub(crate) fn insert(&self, id: u64, registration: R) {
        self.live.borrow_mut().insert(id, registration);
    }

    /// Move `id` from live to retired, running `detach` on it first.
    /// Returns whether `id` was live.
    pub(crate) fn retire(&self, id: u64, detach: impl FnOnce(&R)) -> bool {
        let Some(registration) = self.live.borrow_mut().remove(&id) else {
            return false;
        };
        detach(&registration);
        self.retired.borrow_mut().push(registration);
        true
    }

    /// Retire every live registration.
    pub(crate) fn retire_all(&self, mut detach: impl FnMut(&R)) {
        let drained: Vec<R> = self.live.borrow_mut().drain().map(|(_, r)| r).collect();
        for registration in &drained {
            detach(registration);
        }
        self.retired.borrow_mut().extend(drained);
    }

    pub(crate) fn live_len(&self) -> usize {
        self.live.borrow().len()
    }

    pub(crate) fn retired_len(&self) -> usize {
        self.retired.borrow().len()
    }
}

impl<R> Drop for ListenerTable<R> {
    fn drop(&mut self) {
        self.live.get_mut().clear();
        self.retired.borrow_mut().clear();
    }
}

/// Weak handle to a table's retired list.
pub(crate) struct Sweeper<R>(Weak<RefCell<Vec<R>>>);

impl<R> Sweeper<R> {
    /// Free every retired registration. Does nothing once the table is gone
    /// or while the list is already borrowed.
    pub(crate) fn sweep(&self) {
        let Some(retired) = self.0.upgrade() else {
            return;
        };
        // Take the entries out first so their drops run without the borrow.
        let drained = match retired.try_borrow_mut() {
            Ok(mut list) => std::mem::take(&mut *list),
            Err(_) => return,
        };
        drop(drained);
    }
}
