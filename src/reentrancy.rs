//! Debug-only reentrancy tracking for `RecencyMap`.
//!
//! The map calls into user code (`K: Hash + Eq`, `S: BuildHasher`) while
//! its index is being probed. Each mutating operation is a probe followed
//! by list surgery on the slot it found: `insert` checks for a duplicate
//! then pushes and binds a node, `remove_entry` drops the binding then
//! unlinks the slot from `RecencyList`. A `splice` or `remove` run from
//! `K::eq` in between would relink neighbours and drop bindings the outer
//! call is about to act on, leaving index and list out of step.
//!
//! In debug builds every public entry point marks the map busy and a
//! nested entry panics; release builds carry no state at all.

use core::cell::Cell;
use core::marker::PhantomData;

/// Busy flag embedded in the map. Public entry points call
/// `let _g = self.reentrancy.enter();` before touching the index.
#[derive(Debug)]
pub(crate) struct DebugReentrancy {
    #[cfg(debug_assertions)]
    busy: Cell<bool>,
    // !Sync in every profile so auto traits do not depend on the build.
    _nosync: PhantomData<Cell<()>>,
}

impl DebugReentrancy {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            busy: Cell::new(false),
            _nosync: PhantomData,
        }
    }

    /// Mark the owner busy until the returned guard drops.
    #[inline]
    pub(crate) fn enter(&self) -> BusyGuard<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.busy.replace(true),
                "reentrancy detected: recency map entered from user code"
            );
            BusyGuard { owner: self }
        }

        #[cfg(not(debug_assertions))]
        {
            BusyGuard { _z: PhantomData }
        }
    }

    #[cfg(all(test, debug_assertions))]
    pub(crate) fn is_busy(&self) -> bool {
        self.busy.get()
    }
}

impl Default for DebugReentrancy {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard returned by [`DebugReentrancy::enter`].
pub(crate) struct BusyGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            let was_busy = self.owner.busy.replace(false);
            debug_assert!(was_busy);
        }
    }
}
