//! Change notifications raised by controls.
//!
//! A control owns one [`Signal`] per kind of change it reports: a sort
//! click, a page change, a row selection, a checkbox toggle. Applications
//! subscribe closures; the control fires them while it handles the action,
//! on the thread that handles the request.
//!
//! ```
//! use horizon_tabula_core::Signal;
//!
//! let page_changed = Signal::<usize>::new();
//! let subscription = page_changed.connect(|page| assert_eq!(*page, 3));
//! page_changed.emit(3);
//! assert!(page_changed.disconnect(subscription));
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Handle of one subscription, for [`Signal::disconnect`].
    pub struct ConnectionId;
}

type Listener<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// Subscribers to one kind of change, called in subscription order.
pub struct Signal<Args> {
    listeners: Mutex<SlotMap<ConnectionId, Listener<Args>>>,
    blocked: AtomicBool,
}

impl<Args> Default for Signal<Args> {
    fn default() -> Self {
        Self {
            listeners: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }
}

impl<Args> fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signal({} listeners)", self.len())
    }
}

impl<Args> Signal<Args> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `listener`.
    pub fn connect<F>(&self, listener: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.listeners.lock().insert(Arc::new(listener))
    }

    /// Drop one subscription. Returns `false` if it was already gone.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.listeners.lock().remove(id).is_some()
    }

    /// Drop every subscription.
    pub fn clear(&self) {
        self.listeners.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// While blocked, [`emit`](Self::emit) drops its arguments.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::Release);
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::Acquire)
    }

    /// Call every listener with `args`.
    ///
    /// The listener list is copied first, so a listener may subscribe or
    /// unsubscribe without deadlocking.
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            return;
        }
        let listeners: Vec<Listener<Args>> = self.listeners.lock().values().cloned().collect();
        if listeners.is_empty() {
            return;
        }
        tracing::trace!(target: "horizon_tabula_core", listeners = listeners.len(), "emit");
        for listener in &listeners {
            listener(&args);
        }
    }
}

static_assertions::assert_impl_all!(Signal<(String, bool)>: Send, Sync);
