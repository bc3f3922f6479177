//! A cloneable handle for watching and aborting turns from external code.

use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio_util::sync::CancellationToken;

/// A cloneable handle for poking the session from external code.
///
/// All fields are `Arc`-wrapped, so cloning is cheap.
#[derive(Clone)]
pub struct ChatHandle {
    pub(crate) cancel: Arc<Mutex<CancellationToken>>,
    pub(crate) loading: Arc<AtomicBool>,
    pub(crate) idle_notify: Arc<tokio::sync::Notify>,
}

impl ChatHandle {
    pub(crate) fn new() -> Self {
        Self {
            cancel: Arc::new(Mutex::new(CancellationToken::new())),
            loading: Arc::new(AtomicBool::new(false)),
            idle_notify: Arc::new(tokio::sync::Notify::new()),
        }
    }

    /// Abort the turn in flight, if any.
    pub fn abort(&self) {
        self.cancel.lock().cancel();
    }

    /// Abort the turn in flight. Returns `false` when idle, leaving the
    /// caller to decide what an interrupt means outside a turn.
    pub fn interrupt(&self) -> bool {
        if !self.is_loading() {
            return false;
        }
        self.abort();
        true
    }

    /// Whether a turn is in flight
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Wait until no turn is in flight.
    pub async fn wait_for_idle(&self) {
        let notified = self.idle_notify.notified();
        if !self.is_loading() {
            return;
        }
        notified.await;
    }

    /// Wait until idle, with a timeout.
    /// Returns `true` if idle was reached, `false` on timeout.
    pub async fn wait_for_idle_timeout(&self, timeout: std::time::Duration) -> bool {
        if !self.is_loading() {
            return true;
        }
        tokio::time::timeout(timeout, self.wait_for_idle())
            .await
            .is_ok()
    }

    /// Raise the loading flag with a fresh cancellation token.
    pub(crate) fn start_turn(&self) -> LoadingGuard {
        let token = CancellationToken::new();
        *self.cancel.lock() = token.clone();
        self.loading.store(true, Ordering::Release);
        LoadingGuard {
            handle: self.clone(),
            token,
        }
    }
}

/// Clears the loading flag when dropped, including when the turn's future is
/// dropped mid-await.
pub(crate) struct LoadingGuard {
    handle: ChatHandle,
    token: CancellationToken,
}

impl LoadingGuard {
    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.handle.loading.store(false, Ordering::Release);
        self.handle.idle_notify.notify_waiters();
    }
}
