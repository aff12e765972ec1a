//! Byte-buffer properties for block-oriented devices.
//!
//! A [`BufferCell`] keeps two independent subscriber lists:
//!
//! - **write** subscribers get an immutable view of the bytes just stored
//!   ("device being written", e.g. LED frame data, bus writes)
//! - **read** subscribers get a mutable view of the caller's read buffer
//!   ("device being read") and may rewrite what the device code receives
//!
//! Writes follow the same ordering rules as [`PropertyCell`](crate::cell::PropertyCell):
//! concurrent writers are notified in store order, and a write from inside
//! a write callback on the same thread is notified after the running pass.

use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::callback::{
    run_pass, BufferCallback, BufferFn, CallbackId, ConstBufferCallback, ConstBufferFn,
    SubscriberList,
};
use crate::dispatch::{self, DispatchGuard, Pending};
use crate::error::SimError;

struct BufferState {
    data: Vec<u8>,
    readers: SubscriberList<BufferFn>,
    writers: SubscriberList<ConstBufferFn>,
}

/// An observable variable-length byte buffer.
pub struct BufferCell {
    name: String,
    max_len: usize,
    state: Mutex<BufferState>,
    order: Mutex<()>,
}

impl BufferCell {
    /// Create an empty buffer holding at most `max_len` bytes.
    pub fn new(name: impl Into<String>, max_len: usize) -> Self {
        Self {
            name: name.into(),
            max_len,
            state: Mutex::new(BufferState {
                data: Vec::new(),
                readers: SubscriberList::new(),
                writers: SubscriberList::new(),
            }),
            order: Mutex::new(()),
        }
    }

    /// Property name passed to callbacks.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared maximum length in bytes.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Number of bytes currently stored.
    pub fn len(&self) -> usize {
        self.lock().data.len()
    }

    /// True when no bytes are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the stored bytes.
    pub fn get(&self) -> Vec<u8> {
        self.lock().data.clone()
    }

    /// Replace the stored bytes and notify write subscribers.
    ///
    /// # Errors
    ///
    /// - `SimError::BufferOverflow` if `bytes` exceeds [`max_len`](Self::max_len)
    /// - `SimError::Callback` with the first write-subscriber failure
    pub fn set(&self, bytes: &[u8]) -> Result<(), SimError> {
        if bytes.len() > self.max_len {
            return Err(SimError::BufferOverflow {
                property: self.name.clone(),
                len: bytes.len(),
                max: self.max_len,
            });
        }

        let reentrant = dispatch::is_dispatching(self.key());
        let _order = (!reentrant).then(|| self.lock_order());

        {
            let mut state = self.lock();
            state.data.clear();
            state.data.extend_from_slice(bytes);
            if state.writers.is_empty() {
                return Ok(());
            }
        }

        let pending = Pending::Bytes(bytes.to_vec());
        if reentrant {
            dispatch::queue(self.key(), pending);
            return Ok(());
        }

        let guard = DispatchGuard::enter(self.key());
        self.run_passes(&guard, Some(pending))
    }

    /// Run a write pass for `first`, then one per queued reentrant write.
    fn run_passes(&self, guard: &DispatchGuard, first: Option<Pending>) -> Result<(), SimError> {
        let mut first_error = None;
        let mut next = first.or_else(|| guard.next_queued());

        while let Some(Pending::Bytes(data)) = next {
            let snapshot = self.lock().writers.snapshot();
            if let Err(e) = run_pass(&self.name, &snapshot, |cb| cb(self.name.as_str(), &data)) {
                first_error.get_or_insert(e);
            }
            next = guard.next_queued();
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Serve a device read into `out`.
    ///
    /// Copies the stored bytes into the front of `out`, then hands `out` to
    /// every read subscriber in order. Returns the number of stored bytes
    /// copied.
    pub fn read(&self, out: &mut [u8]) -> Result<usize, SimError> {
        let (copied, snapshot) = {
            let state = self.lock();
            let n = state.data.len().min(out.len());
            out[..n].copy_from_slice(&state.data[..n]);
            (n, state.readers.snapshot())
        };

        run_pass(&self.name, &snapshot, |cb| cb(self.name.as_str(), &mut *out))?;
        Ok(copied)
    }

    /// Subscribe to writes.
    ///
    /// With `initial_notify` the callback is invoked once with the stored
    /// bytes before this returns; a failure removes the subscription again.
    pub fn register_write(
        &self,
        callback: ConstBufferCallback,
        initial_notify: bool,
    ) -> Result<CallbackId, SimError> {
        let reentrant = dispatch::is_dispatching(self.key());
        let _order = (initial_notify && !reentrant).then(|| self.lock_order());
        let (id, current) = {
            let mut state = self.lock();
            let id = state.writers.insert(callback.clone());
            (id, initial_notify.then(|| state.data.clone()))
        };
        debug!(property = %self.name, %id, initial_notify, "Registered write callback");

        let Some(current) = current else {
            return Ok(id);
        };

        let guard = (!reentrant).then(|| DispatchGuard::enter(self.key()));
        let initial = callback(self.name.as_str(), &current);
        let queued = match &guard {
            Some(guard) => self.run_passes(guard, None),
            None => Ok(()),
        };

        if let Err(source) = initial {
            self.cancel_write(id);
            return Err(SimError::Callback {
                property: self.name.clone(),
                source,
            });
        }
        queued.map(|()| id)
    }

    /// Subscribe to reads.
    pub fn register_read(&self, callback: BufferCallback) -> CallbackId {
        let id = self.lock().readers.insert(callback);
        debug!(property = %self.name, %id, "Registered read callback");
        id
    }

    /// Cancel a write subscription. Unknown ids are ignored.
    pub fn cancel_write(&self, id: CallbackId) {
        if self.lock().writers.cancel(id) {
            debug!(property = %self.name, %id, "Cancelled write callback");
        }
    }

    /// Cancel a read subscription. Unknown ids are ignored.
    pub fn cancel_read(&self, id: CallbackId) {
        if self.lock().readers.cancel(id) {
            debug!(property = %self.name, %id, "Cancelled read callback");
        }
    }

    /// Number of live write subscriptions.
    pub fn writer_count(&self) -> usize {
        self.lock().writers.len()
    }

    /// Number of live read subscriptions.
    pub fn reader_count(&self) -> usize {
        self.lock().readers.len()
    }

    /// Empty the buffer and drop both subscriber lists, silently.
    pub fn reset(&self) {
        {
            let mut state = self.lock();
            state.data.clear();
            state.readers.clear();
            state.writers.clear();
        }
        dispatch::discard_queued(self.key());
    }

    fn key(&self) -> usize {
        self as *const Self as usize
    }

    fn lock(&self) -> MutexGuard<'_, BufferState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_order(&self) -> MutexGuard<'_, ()> {
        self.order.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for BufferCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("BufferCell")
            .field("name", &self.name)
            .field("len", &state.data.len())
            .field("max_len", &self.max_len)
            .finish()
    }
}
