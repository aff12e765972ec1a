//! Same-thread reentrancy tracking for notification dispatch.
//!
//! Dispatch runs synchronously on the writing thread. When a callback writes
//! the cell whose dispatch is currently running on the same thread, the new
//! value is stored immediately but its notification is queued here and
//! delivered by the outer dispatch after the current pass. Writes from
//! other threads are never queued here: they wait on the cell's ordering
//! lock and dispatch on their own thread.

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::value::Value;

/// A deferred notification payload.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Pending {
    Value(Value),
    Bytes(Vec<u8>),
}

struct ActiveDispatch {
    cell: usize,
    queued: VecDeque<Pending>,
}

thread_local! {
    static ACTIVE: RefCell<Vec<ActiveDispatch>> = const { RefCell::new(Vec::new()) };
}

/// True while `cell` is dispatching on the current thread.
pub(crate) fn is_dispatching(cell: usize) -> bool {
    ACTIVE.with(|active| active.borrow().iter().any(|d| d.cell == cell))
}

/// Queue `pending` behind the pass `cell` is running on this thread.
///
/// No-op when the cell is not dispatching here; callers check
/// [`is_dispatching`] first.
pub(crate) fn queue(cell: usize, pending: Pending) {
    ACTIVE.with(|active| {
        if let Some(dispatch) = active.borrow_mut().iter_mut().find(|d| d.cell == cell) {
            dispatch.queued.push_back(pending);
        }
    });
}

/// Drop every notification queued for `cell` on this thread.
pub(crate) fn discard_queued(cell: usize) {
    ACTIVE.with(|active| {
        if let Some(dispatch) = active.borrow_mut().iter_mut().find(|d| d.cell == cell) {
            dispatch.queued.clear();
        }
    });
}

/// Marks `cell` as dispatching on the current thread until dropped.
///
/// Dropping also runs during unwinding, so a panicking callback does not
/// leave the cell stuck in the queued state.
pub(crate) struct DispatchGuard {
    cell: usize,
}

impl DispatchGuard {
    pub(crate) fn enter(cell: usize) -> Self {
        ACTIVE.with(|active| {
            active.borrow_mut().push(ActiveDispatch {
                cell,
                queued: VecDeque::new(),
            });
        });
        Self { cell }
    }

    /// Next notification queued by a reentrant write, oldest first.
    pub(crate) fn next_queued(&self) -> Option<Pending> {
        ACTIVE.with(|active| {
            active
                .borrow_mut()
                .iter_mut()
                .find(|d| d.cell == self.cell)
                .and_then(|d| d.queued.pop_front())
        })
    }
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        ACTIVE.with(|active| {
            let mut active = active.borrow_mut();
            if let Some(pos) = active.iter().rposition(|d| d.cell == self.cell) {
                active.remove(pos);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_without_dispatch_is_dropped() {
        assert!(!is_dispatching(0x10));
        queue(0x10, Pending::Value(Value::Int(1)));
        let guard = DispatchGuard::enter(0x10);
        assert_eq!(guard.next_queued(), None);
    }

    #[test]
    fn queue_during_dispatch_keeps_order() {
        let guard = DispatchGuard::enter(0x20);
        assert!(is_dispatching(0x20));
        queue(0x20, Pending::Value(Value::Int(1)));
        queue(0x20, Pending::Value(Value::Int(2)));
        // Other cells are unaffected.
        assert!(!is_dispatching(0x21));

        assert_eq!(guard.next_queued(), Some(Pending::Value(Value::Int(1))));
        assert_eq!(guard.next_queued(), Some(Pending::Value(Value::Int(2))));
        assert_eq!(guard.next_queued(), None);
    }

    #[test]
    fn guard_drop_ends_dispatch() {
        {
            let _guard = DispatchGuard::enter(0x30);
            assert!(is_dispatching(0x30));
        }
        assert!(!is_dispatching(0x30));
    }

    #[test]
    fn discard_clears_queue() {
        let guard = DispatchGuard::enter(0x40);
        queue(0x40, Pending::Value(Value::Boolean(true)));
        discard_queued(0x40);
        assert_eq!(guard.next_queued(), None);
    }

    #[test]
    fn other_threads_do_not_see_dispatch() {
        let _guard = DispatchGuard::enter(0x50);
        let seen = std::thread::spawn(|| is_dispatching(0x50)).join().unwrap();
        assert!(!seen);
    }
}
