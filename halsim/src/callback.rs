//! Subscriber lists and callback types.
//!
//! A [`SubscriberList`] is an ordered collection of subscriptions owned by a
//! single cell. Each subscription carries a shared `active` flag so that a
//! dispatch pass working from a snapshot can still observe cancellations
//! made while the pass is running.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{trace, warn};

use crate::error::SimError;
use crate::value::Value;

/// Error type returned by subscriber callbacks.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Result type returned by subscriber callbacks.
pub type CallbackResult = Result<(), CallbackError>;

/// Scalar property callback: `(property_name, new_value)`.
pub type NotifyFn = dyn Fn(&str, &Value) -> CallbackResult + Send + Sync;

/// Buffer callback with a mutable view, used when the device is being read.
pub type BufferFn = dyn Fn(&str, &mut [u8]) -> CallbackResult + Send + Sync;

/// Buffer callback with an immutable view, used when the device is written.
pub type ConstBufferFn = dyn Fn(&str, &[u8]) -> CallbackResult + Send + Sync;

/// Shared handle to a scalar property callback.
pub type NotifyCallback = Arc<NotifyFn>;

/// Shared handle to a mutable-buffer callback.
pub type BufferCallback = Arc<BufferFn>;

/// Shared handle to an immutable-buffer callback.
pub type ConstBufferCallback = Arc<ConstBufferFn>;

/// Wrap a closure into a [`NotifyCallback`].
pub fn notify_fn<F>(f: F) -> NotifyCallback
where
    F: Fn(&str, &Value) -> CallbackResult + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wrap a closure into a [`BufferCallback`].
pub fn buffer_fn<F>(f: F) -> BufferCallback
where
    F: Fn(&str, &mut [u8]) -> CallbackResult + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wrap a closure into a [`ConstBufferCallback`].
pub fn const_buffer_fn<F>(f: F) -> ConstBufferCallback
where
    F: Fn(&str, &[u8]) -> CallbackResult + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Cell-local subscription identifier.
///
/// Ids start at 1 and are never reused by the cell that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CallbackId(u64);

impl CallbackId {
    /// Rebuild an id from its raw value (e.g. one handed across a binding layer).
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw value of the id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One registered callback as seen by a dispatch pass.
pub(crate) struct Subscriber<F: ?Sized> {
    pub(crate) id: CallbackId,
    pub(crate) callback: Arc<F>,
    active: Arc<AtomicBool>,
}

impl<F: ?Sized> Subscriber<F> {
    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }
}

impl<F: ?Sized> Clone for Subscriber<F> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            callback: Arc::clone(&self.callback),
            active: Arc::clone(&self.active),
        }
    }
}

/// Ordered subscriptions of one cell, oldest first.
pub(crate) struct SubscriberList<F: ?Sized> {
    next_id: u64,
    entries: Vec<Subscriber<F>>,
}

impl<F: ?Sized> SubscriberList<F> {
    pub(crate) fn new() -> Self {
        Self {
            next_id: 1,
            entries: Vec::new(),
        }
    }

    /// Append an active subscription and return its id.
    pub(crate) fn insert(&mut self, callback: Arc<F>) -> CallbackId {
        let id = CallbackId(self.next_id);
        self.next_id += 1;
        self.entries.push(Subscriber {
            id,
            callback,
            active: Arc::new(AtomicBool::new(true)),
        });
        id
    }

    /// Deactivate and remove `id`. Returns false if it was not registered.
    pub(crate) fn cancel(&mut self, id: CallbackId) -> bool {
        match self.entries.iter().position(|s| s.id == id) {
            Some(pos) => {
                let sub = self.entries.remove(pos);
                sub.deactivate();
                true
            }
            None => false,
        }
    }

    /// Deactivate and remove every subscription. Ids keep counting up.
    pub(crate) fn clear(&mut self) {
        for sub in self.entries.drain(..) {
            sub.deactivate();
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stable copy of the current subscriptions for one dispatch pass.
    pub(crate) fn snapshot(&self) -> Vec<Subscriber<F>> {
        self.entries.clone()
    }
}

/// Invoke every still-active subscriber of `snapshot` in order.
///
/// A failing callback does not stop the pass; the first failure is
/// returned once every subscriber has run.
pub(crate) fn run_pass<F: ?Sized>(
    property: &str,
    snapshot: &[Subscriber<F>],
    mut invoke: impl FnMut(&F) -> CallbackResult,
) -> Result<(), SimError> {
    let mut first_error = None;

    for sub in snapshot {
        if !sub.is_active() {
            continue;
        }
        trace!(property, id = %sub.id, "notify");
        if let Err(source) = invoke(&*sub.callback) {
            warn!(property, id = %sub.id, error = %source, "Subscriber callback failed");
            if first_error.is_none() {
                first_error = Some(SimError::Callback {
                    property: property.to_string(),
                    source,
                });
            }
        }
    }

    first_error.map_or(Ok(()), Err)
}
