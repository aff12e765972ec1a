//! Property cells: one observable value plus its subscribers.
//!
//! # Locking
//!
//! Each cell owns a `Mutex` over its value and subscriber list. The lock is
//! held only for bookkeeping; callbacks always run with the lock released,
//! so a callback may freely read, write, register or cancel on any cell.
//!
//! A second per-cell `order` lock is taken before a write is stored and
//! held until its dispatch pass ends, so subscribers see writes from
//! different threads in store order. A callback writing its own cell on the
//! same thread does not take it again; its write is queued behind the
//! running pass. Callbacks on two threads that write each other's cells
//! while both are dispatching wait on each other; harnesses must not build
//! such cycles across threads.

use halsim_common::config::NotifyPolicy;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::callback::{run_pass, CallbackId, NotifyCallback, NotifyFn, SubscriberList};
use crate::dispatch::{self, DispatchGuard, Pending};
use crate::error::SimError;
use crate::value::{SimValue, Value, ValueKind};

struct CellState {
    value: Value,
    subscribers: SubscriberList<NotifyFn>,
}

/// A single observable property.
pub struct PropertyCell {
    name: String,
    default: Value,
    policy: NotifyPolicy,
    state: Mutex<CellState>,
    order: Mutex<()>,
}

impl PropertyCell {
    /// Create a cell holding `default`. The kind of `default` is the kind
    /// of the cell for its whole lifetime.
    pub fn new(name: impl Into<String>, default: Value, policy: NotifyPolicy) -> Self {
        Self {
            name: name.into(),
            default,
            policy,
            state: Mutex::new(CellState {
                value: default,
                subscribers: SubscriberList::new(),
            }),
            order: Mutex::new(()),
        }
    }

    /// Property name passed to callbacks.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind of value stored by this cell.
    pub fn kind(&self) -> ValueKind {
        self.default.kind()
    }

    /// Value restored by [`reset`](Self::reset).
    pub fn default_value(&self) -> Value {
        self.default
    }

    /// Current value.
    pub fn get(&self) -> Value {
        self.lock().value
    }

    /// Current value as `T`, `None` if `T` does not match the cell kind.
    pub fn get_as<T: SimValue>(&self) -> Option<T> {
        T::from_value(self.get())
    }

    /// Store a typed value and notify subscribers.
    pub fn set<T: SimValue>(&self, value: T) -> Result<(), SimError> {
        self.set_value(value.into_value())
    }

    /// Store `value` and notify every active subscriber, oldest first.
    ///
    /// A write issued from inside one of this cell's callbacks on the same
    /// thread is stored at once and notified after the running pass. A
    /// write from another thread waits for the running pass to finish.
    ///
    /// # Errors
    ///
    /// - `SimError::TypeMismatch` if `value` has a different kind than the cell
    /// - `SimError::Callback` with the first callback failure; every
    ///   subscriber still runs
    pub fn set_value(&self, value: Value) -> Result<(), SimError> {
        if value.kind() != self.kind() {
            return Err(SimError::TypeMismatch {
                property: self.name.clone(),
                expected: self.kind(),
                actual: value.kind(),
            });
        }

        let reentrant = dispatch::is_dispatching(self.key());
        let _order = (!reentrant).then(|| self.lock_order());

        if !self.store(value) {
            return Ok(());
        }
        if reentrant {
            dispatch::queue(self.key(), Pending::Value(value));
            return Ok(());
        }
        self.dispatch(value)
    }

    /// Store `value`; true when subscribers must hear about it.
    fn store(&self, value: Value) -> bool {
        let mut state = self.lock();
        let changed = state.value != value;
        state.value = value;
        if !changed && self.policy == NotifyPolicy::OnChange {
            return false;
        }
        !state.subscribers.is_empty()
    }

    fn dispatch(&self, first: Value) -> Result<(), SimError> {
        let guard = DispatchGuard::enter(self.key());
        self.run_passes(&guard, Some(first))
    }

    /// Run a pass for `first`, then one per queued reentrant write.
    fn run_passes(&self, guard: &DispatchGuard, first: Option<Value>) -> Result<(), SimError> {
        let queued = || match guard.next_queued() {
            Some(Pending::Value(v)) => Some(v),
            _ => None,
        };
        let mut first_error = None;
        let mut next = first.or_else(queued);

        while let Some(value) = next {
            let snapshot = self.lock().subscribers.snapshot();
            if let Err(e) = run_pass(&self.name, &snapshot, |cb| cb(self.name.as_str(), &value)) {
                first_error.get_or_insert(e);
            }
            next = queued();
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Subscribe `callback` to future writes.
    ///
    /// With `initial_notify` the callback is invoked once with the current
    /// value before this returns. If that call fails the subscription is
    /// removed again and the error is returned. The initial call is ordered
    /// with concurrent writes: it never arrives after a newer value.
    pub fn register(
        &self,
        callback: NotifyCallback,
        initial_notify: bool,
    ) -> Result<CallbackId, SimError> {
        let reentrant = dispatch::is_dispatching(self.key());
        let _order = (initial_notify && !reentrant).then(|| self.lock_order());
        let (id, current) = {
            let mut state = self.lock();
            let id = state.subscribers.insert(callback.clone());
            (id, state.value)
        };
        debug!(property = %self.name, %id, initial_notify, "Registered callback");

        if !initial_notify {
            return Ok(id);
        }

        // Writes made by the initial call are queued like any reentrant write.
        let guard = (!reentrant).then(|| DispatchGuard::enter(self.key()));
        let initial = callback(self.name.as_str(), &current);
        let queued = match &guard {
            Some(guard) => self.run_passes(guard, None),
            None => Ok(()),
        };

        if let Err(source) = initial {
            self.cancel(id);
            return Err(SimError::Callback {
                property: self.name.clone(),
                source,
            });
        }
        queued.map(|()| id)
    }

    /// Cancel a subscription. Unknown ids are ignored.
    pub fn cancel(&self, id: CallbackId) {
        if self.lock().subscribers.cancel(id) {
            debug!(property = %self.name, %id, "Cancelled callback");
        }
    }

    /// Restore the default value and drop every subscription.
    ///
    /// Nobody is notified of the value change.
    pub fn reset(&self) {
        {
            let mut state = self.lock();
            state.value = self.default;
            state.subscribers.clear();
        }
        dispatch::discard_queued(self.key());
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn key(&self) -> usize {
        self as *const Self as usize
    }

    // No user code runs under the lock, so a poisoned lock still holds
    // consistent state.
    fn lock(&self) -> MutexGuard<'_, CellState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Poisoned by a panicking callback; guards no data.
    fn lock_order(&self) -> MutexGuard<'_, ()> {
        self.order.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for PropertyCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("PropertyCell")
            .field("name", &self.name)
            .field("value", &state.value)
            .field("subscribers", &state.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::notify_fn;
    use std::sync::Arc;

    type Log = Arc<Mutex<Vec<(String, Value)>>>;

    fn recording(log: &Log) -> NotifyCallback {
        let log = Arc::clone(log);
        notify_fn(move |name, value| {
            log.lock().unwrap().push((name.to_string(), *value));
            Ok(())
        })
    }

    fn cell(default: Value) -> PropertyCell {
        PropertyCell::new("x", default, NotifyPolicy::Always)
    }

    #[test]
    fn set_then_get_round_trips() {
        let c = cell(Value::Double(0.0));
        c.set(9.8).unwrap();
        assert_eq!(c.get(), Value::Double(9.8));
        assert_eq!(c.get_as::<f64>(), Some(9.8));
    }

    #[test]
    fn set_rejects_wrong_kind() {
        let c = cell(Value::Double(0.0));
        let err = c.set(3_i32).unwrap_err();
        assert!(matches!(
            err,
            SimError::TypeMismatch {
                expected: ValueKind::Double,
                actual: ValueKind::Int,
                ..
            }
        ));
        assert_eq!(c.get(), Value::Double(0.0));
    }

    #[test]
    fn initial_notify_replays_current_value() {
        let c = cell(Value::Int(4));
        let log = Log::default();
        c.register(recording(&log), true).unwrap();
        assert_eq!(*log.lock().unwrap(), vec![("x".to_string(), Value::Int(4))]);
    }

    #[test]
    fn no_initial_notify_waits_for_set() {
        let c = cell(Value::Int(4));
        let log = Log::default();
        c.register(recording(&log), false).unwrap();
        assert!(log.lock().unwrap().is_empty());

        c.set(5).unwrap();
        assert_eq!(*log.lock().unwrap(), vec![("x".to_string(), Value::Int(5))]);
    }

    #[test]
    fn failing_initial_notify_leaves_no_subscription() {
        let c = cell(Value::Boolean(false));
        let result = c.register(notify_fn(|_, _| Err("refused".into())), true);
        assert!(matches!(result, Err(SimError::Callback { .. })));
        assert_eq!(c.subscriber_count(), 0);
    }

    #[test]
    fn cancel_stops_delivery() {
        let c = cell(Value::Int(0));
        let log1 = Log::default();
        let log2 = Log::default();
        let id1 = c.register(recording(&log1), false).unwrap();
        c.register(recording(&log2), false).unwrap();

        c.cancel(id1);
        c.set(1).unwrap();
        assert!(log1.lock().unwrap().is_empty());
        assert_eq!(log2.lock().unwrap().len(), 1);

        // Idempotent.
        c.cancel(id1);
        c.cancel(CallbackId::from_raw(1234));
        assert_eq!(c.subscriber_count(), 1);
    }

    #[test]
    fn on_change_policy_suppresses_equal_writes() {
        let c = PropertyCell::new("x", Value::Int(0), NotifyPolicy::OnChange);
        let log = Log::default();
        c.register(recording(&log), false).unwrap();

        c.set(0).unwrap();
        c.set(1).unwrap();
        c.set(1).unwrap();
        assert_eq!(*log.lock().unwrap(), vec![("x".to_string(), Value::Int(1))]);
    }

    #[test]
    fn always_policy_notifies_equal_writes() {
        let c = cell(Value::Int(0));
        let log = Log::default();
        c.register(recording(&log), false).unwrap();

        c.set(0).unwrap();
        c.set(0).unwrap();
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[test]
    fn reset_restores_default_and_drops_subscribers_silently() {
        let c = cell(Value::Double(0.0));
        let log = Log::default();
        c.register(recording(&log), false).unwrap();
        c.set(2.5).unwrap();

        c.reset();
        assert_eq!(c.get(), Value::Double(0.0));
        assert_eq!(c.subscriber_count(), 0);

        c.set(1.0).unwrap();
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn reentrant_write_is_delivered_after_current_pass() {
        let c = Arc::new(cell(Value::Int(0)));
        let log = Log::default();

        // First subscriber bumps the value once, from inside dispatch.
        let weak = Arc::downgrade(&c);
        c.register(
            notify_fn(move |_, value| {
                if *value == Value::Int(1) {
                    if let Some(cell) = weak.upgrade() {
                        cell.set(2)?;
                    }
                }
                Ok(())
            }),
            false,
        )
        .unwrap();
        c.register(recording(&log), false).unwrap();

        c.set(1).unwrap();

        // The second subscriber saw 1 before 2: no nested dispatch.
        let seen: Vec<Value> = log.lock().unwrap().iter().map(|(_, v)| *v).collect();
        assert_eq!(seen, vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(c.get(), Value::Int(2));
    }

    #[test]
    fn registration_during_dispatch_waits_for_next_pass() {
        let c = Arc::new(cell(Value::Int(0)));
        let log = Log::default();

        let weak = Arc::downgrade(&c);
        let late = recording(&log);
        c.register(
            notify_fn(move |_, _| {
                if let Some(cell) = weak.upgrade() {
                    if cell.subscriber_count() == 1 {
                        cell.register(late.clone(), false)?;
                    }
                }
                Ok(())
            }),
            false,
        )
        .unwrap();

        c.set(1).unwrap();
        assert!(log.lock().unwrap().is_empty());

        c.set(2).unwrap();
        assert_eq!(*log.lock().unwrap(), vec![("x".to_string(), Value::Int(2))]);
    }

    #[test]
    fn cancel_during_dispatch_skips_rest_of_pass() {
        let c = Arc::new(cell(Value::Int(0)));
        let log = Log::default();

        let victim = Arc::new(Mutex::new(None::<CallbackId>));
        let weak = Arc::downgrade(&c);
        let victim2 = Arc::clone(&victim);
        c.register(
            notify_fn(move |_, _| {
                if let (Some(cell), Some(id)) = (weak.upgrade(), *victim2.lock().unwrap()) {
                    cell.cancel(id);
                }
                Ok(())
            }),
            false,
        )
        .unwrap();
        let id = c.register(recording(&log), false).unwrap();
        *victim.lock().unwrap() = Some(id);

        c.set(1).unwrap();
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn panicking_callback_does_not_wedge_cell() {
        let c = Arc::new(cell(Value::Int(0)));
        let log = Log::default();
        let id = c
            .register(notify_fn(|_, _| panic!("subscriber bug")), false)
            .unwrap();

        let c2 = Arc::clone(&c);
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || c2.set(1)));
        assert!(outcome.is_err());

        c.cancel(id);
        c.register(recording(&log), false).unwrap();
        c.set(2).unwrap();
        assert_eq!(*log.lock().unwrap(), vec![("x".to_string(), Value::Int(2))]);
    }

    #[test]
    fn concurrent_writers_end_on_stored_value() {
        for _ in 0..100 {
            let c = Arc::new(cell(Value::Int(0)));
            let last = Arc::new(Mutex::new(Value::Int(0)));
            let l = Arc::clone(&last);
            c.register(
                notify_fn(move |_, value| {
                    *l.lock().unwrap() = *value;
                    Ok(())
                }),
                false,
            )
            .unwrap();

            let barrier = Arc::new(std::sync::Barrier::new(2));
            let handles: Vec<_> = (0..2)
                .map(|t| {
                    let c = Arc::clone(&c);
                    let barrier = Arc::clone(&barrier);
                    std::thread::spawn(move || {
                        barrier.wait();
                        for n in 0..20 {
                            c.set(t * 100 + n).unwrap();
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }

            assert_eq!(*last.lock().unwrap(), c.get());
        }
    }

    #[test]
    fn writer_waits_for_running_pass() {
        let c = Arc::new(cell(Value::Int(0)));
        let log = Log::default();
        let (entered_tx, entered_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let release_rx = Mutex::new(release_rx);

        // Holds the pass for value 1 open until released.
        c.register(
            notify_fn(move |_, value| {
                if *value == Value::Int(1) {
                    entered_tx.send(()).unwrap();
                    release_rx.lock().unwrap().recv().unwrap();
                }
                Ok(())
            }),
            false,
        )
        .unwrap();
        c.register(recording(&log), false).unwrap();

        let first = {
            let c = Arc::clone(&c);
            std::thread::spawn(move || c.set(1).unwrap())
        };
        entered_rx.recv().unwrap();

        let second = {
            let c = Arc::clone(&c);
            std::thread::spawn(move || c.set(2).unwrap())
        };
        std::thread::sleep(std::time::Duration::from_millis(50));
        // The second write has not been stored over the running pass.
        assert_eq!(c.get(), Value::Int(1));

        release_tx.send(()).unwrap();
        first.join().unwrap();
        second.join().unwrap();

        let seen: Vec<Value> = log.lock().unwrap().iter().map(|(_, v)| *v).collect();
        assert_eq!(seen, vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(c.get(), Value::Int(2));
    }

    #[test]
    fn initial_notify_may_write_its_own_cell() {
        let c = Arc::new(cell(Value::Int(0)));
        let log = Log::default();
        let sink = Arc::clone(&log);
        let weak = Arc::downgrade(&c);

        c.register(
            notify_fn(move |name, value| {
                sink.lock().unwrap().push((name.to_string(), *value));
                if *value == Value::Int(0) {
                    if let Some(cell) = weak.upgrade() {
                        cell.set(5)?;
                    }
                }
                Ok(())
            }),
            true,
        )
        .unwrap();

        assert_eq!(c.get(), Value::Int(5));
        let seen: Vec<Value> = log.lock().unwrap().iter().map(|(_, v)| *v).collect();
        assert_eq!(seen, vec![Value::Int(0), Value::Int(5)]);
    }
}
