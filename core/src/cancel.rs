//! Abort handles threaded through resource operations.
//!
//! A `CancelToken` is a shared flag backed by a `tokio::sync::watch` channel
//! so that any number of in-flight requests can await it. Cancellation flows
//! downward: cancelling a resource's token cancels every request token derived
//! from it, while cancelling one request leaves its siblings alone.

use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::sync::watch;

#[derive(Debug)]
struct Inner {
    flag: watch::Sender<bool>,
    children: Mutex<Vec<Weak<Inner>>>,
    // Keeps intermediate tokens alive for their descendants.
    _parent: Option<Arc<Inner>>,
}

impl Inner {
    fn new(cancelled: bool, parent: Option<Arc<Inner>>) -> Self {
        let (flag, _) = watch::channel(cancelled);
        Self {
            flag,
            children: Mutex::new(Vec::new()),
            _parent: parent,
        }
    }

    fn cancel(&self) {
        // Flag first: `child()` checks it while holding the children lock.
        self.flag.send_replace(true);
        let children = std::mem::take(
            &mut *self.children.lock().unwrap_or_else(PoisonError::into_inner),
        );
        for child in children.iter().filter_map(Weak::upgrade) {
            child.cancel();
        }
    }
}

/// Cloneable cancellation flag. Clones share state.
#[derive(Debug, Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner::new(false, None)),
        }
    }

    /// A token that is cancelled when either it or `self` is cancelled.
    pub fn child(&self) -> Self {
        let mut children = self
            .inner
            .children
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let child = Arc::new(Inner::new(
            self.is_cancelled(),
            Some(Arc::clone(&self.inner)),
        ));
        children.retain(|w| w.strong_count() > 0);
        children.push(Arc::downgrade(&child));
        Self { inner: child }
    }

    pub fn cancel(&self) {
        self.inner.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.flag.borrow()
    }

    /// Resolve once the token is cancelled; immediately if it already is.
    pub async fn cancelled(&self) {
        let mut rx = self.inner.flag.subscribe();
        // The sender lives as long as `self`, so this only returns on cancel.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
