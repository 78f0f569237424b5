use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::Notify;

/// Outstanding-work counter for structural pass completion.
///
/// Every signal or ready job is counted in before it is enqueued and
/// counted out once fully consumed - including any jobs it spawned, which
/// are counted in first - so the counter can only reach zero when no work
/// remains anywhere in the pass. `cancel` short-circuits the wait when a
/// worker hits a fault and the pass cannot drain.
#[derive(Debug, Default)]
pub(crate) struct WorkTracker {
    outstanding: AtomicUsize,
    cancelled: AtomicBool,
    idle: Notify,
}

impl WorkTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, n: usize) {
        self.outstanding.fetch_add(n, Ordering::AcqRel);
    }

    pub fn done(&self) {
        if self.outstanding.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.idle.notify_waiters();
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.idle.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    fn is_idle(&self) -> bool {
        self.outstanding.load(Ordering::Acquire) == 0 || self.is_cancelled()
    }

    /// Waits until no work remains in flight, or the pass is cancelled.
    pub async fn wait_idle(&self) {
        let notified = self.idle.notified();
        tokio::pin!(notified);
        loop {
            if self.is_idle() {
                return;
            }
            // Register interest before the final check so a notify between
            // check and await is not lost.
            notified.as_mut().enable();
            if self.is_idle() {
                return;
            }
            notified.as_mut().await;
            notified.set(self.idle.notified());
        }
    }
}
