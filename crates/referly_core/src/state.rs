//! Observable state cells
//!
//! A [`StateCell`] owns a value and hands out immutable snapshots of it.
//! Every mutation goes through [`StateCell::update`] (or one of its wrappers),
//! after which all subscribers are called with the new snapshot.
//!
//! Subscriptions are scoped: [`StateCell::subscribe`] returns a [`Subscription`]
//! and the listener stays registered exactly as long as that value is alive.
//!
//! Delivery is ordered across threads. Every write bumps a version; one
//! thread at a time flushes, always handing listeners the newest snapshot, so
//! a listener never sees an older value after a newer one. A writer that finds
//! a flush in progress leaves its value to that flush, and intermediate values
//! may be skipped.
//!
//! ```ignore
//! let cell = StateCell::new(ThemePreference::Light);
//! let _sub = cell.subscribe(|theme| tracing::info!(?theme, "theme changed"));
//! cell.set(ThemePreference::Dark); // listener runs
//! ```

use slotmap::{new_key_type, SlotMap};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};

new_key_type! {
    /// Identifier of a registered listener
    pub struct ListenerId;
}

/// Listener callback invoked with the latest snapshot
pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct CellInner<T> {
    value: RwLock<T>,
    listeners: Mutex<SlotMap<ListenerId, Listener<T>>>,
    /// Bumped under the value's write lock
    version: AtomicU64,
    /// Last version handed to listeners
    delivered: AtomicU64,
    /// Held by the thread currently running listeners
    flushing: AtomicBool,
}

impl<T> CellInner<T> {
    fn listeners(&self) -> MutexGuard<'_, SlotMap<ListenerId, Listener<T>>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current(&self) -> bool {
        self.version.load(Ordering::SeqCst) == self.delivered.load(Ordering::SeqCst)
    }
}

/// Releases the flushing flag, also when a listener panics
struct FlushGuard<'a>(&'a AtomicBool);

impl Drop for FlushGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Shared, observable value
///
/// Cloning a `StateCell` yields another handle to the same value.
pub struct StateCell<T> {
    inner: Arc<CellInner<T>>,
}

impl<T> Clone for StateCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Default + Clone + Send + Sync + 'static> Default for StateCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for StateCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.inner.value.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("StateCell")
            .field("value", &*value)
            .field("listeners", &self.inner.listeners().len())
            .finish()
    }
}

impl<T: Clone + Send + Sync + 'static> StateCell<T> {
    /// Create a cell holding `value`
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(CellInner {
                value: RwLock::new(value),
                listeners: Mutex::new(SlotMap::with_key()),
                version: AtomicU64::new(0),
                delivered: AtomicU64::new(0),
                flushing: AtomicBool::new(false),
            }),
        }
    }

    /// Snapshot of the current value
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    /// Borrow the current value without cloning it
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let value = self.inner.value.read().unwrap_or_else(PoisonError::into_inner);
        f(&value)
    }

    /// Mutate the value in place, then notify subscribers
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let result = {
            let mut value = self.inner.value.write().unwrap_or_else(PoisonError::into_inner);
            let result = f(&mut value);
            self.inner.version.fetch_add(1, Ordering::SeqCst);
            result
        };
        self.notify();
        result
    }

    /// Replace the value, then notify subscribers
    pub fn set(&self, value: T) {
        self.update(|current| *current = value);
    }

    /// Replace the value only if it differs; subscribers hear about real changes only.
    ///
    /// Returns `true` when the value changed.
    pub fn set_if_changed(&self, value: T) -> bool
    where
        T: PartialEq,
    {
        {
            let mut current = self.inner.value.write().unwrap_or_else(PoisonError::into_inner);
            if *current == value {
                return false;
            }
            *current = value;
            self.inner.version.fetch_add(1, Ordering::SeqCst);
        }
        self.notify();
        true
    }

    /// Register a listener; it is removed when the returned [`Subscription`] drops
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.inner.listeners().insert(Arc::new(listener));
        let weak: Weak<CellInner<T>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.listeners().remove(id);
            }
        })
    }

    /// Number of live listeners
    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners().len()
    }

    fn notify(&self) {
        let inner = &self.inner;
        loop {
            if inner.flushing.swap(true, Ordering::SeqCst) {
                // The flushing thread picks up our version
                return;
            }
            {
                let _flushing = FlushGuard(&inner.flushing);
                self.flush();
            }
            // A write may have landed between the last check and the release
            if inner.is_current() {
                return;
            }
        }
    }

    /// Deliver snapshots until listeners have seen the newest version.
    ///
    /// Listeners run outside every lock so they may read or write the cell or
    /// drop their own subscription.
    fn flush(&self) {
        let inner = &self.inner;
        loop {
            let (version, snapshot) = {
                let value = inner.value.read().unwrap_or_else(PoisonError::into_inner);
                (inner.version.load(Ordering::SeqCst), value.clone())
            };
            if version == inner.delivered.load(Ordering::SeqCst) {
                return;
            }
            inner.delivered.store(version, Ordering::SeqCst);

            let listeners: Vec<Listener<T>> = inner.listeners().values().cloned().collect();
            tracing::trace!(version, listeners = listeners.len(), "notifying state listeners");
            for listener in listeners {
                listener(&snapshot);
            }
        }
    }
}

/// Handle that keeps a listener registered
///
/// Dropping it unregisters the listener.
#[must_use = "dropping a Subscription unregisters its listener immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Wrap a release callback that runs exactly once
    pub fn new<F>(release: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Keep the listener registered for the lifetime of its source
    pub fn detach(mut self) {
        self.release = None;
    }

    /// Unregister now
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}
