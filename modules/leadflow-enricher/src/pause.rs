use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Cooperative pause flag shared between the caller and the batch loop.
///
/// The loop polls it at batch boundaries only; an in-flight call always runs to
/// completion. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct PauseSignal {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    raised: AtomicBool,
    notify: Notify,
}

impl PauseSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a pause. Wakes anything sleeping in [`PauseSignal::wait`].
    pub fn raise(&self) {
        self.inner.raised.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    /// Clear the flag so the signal can drive a resumed run.
    pub fn reset(&self) {
        self.inner.raised.store(false, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.inner.raised.load(Ordering::SeqCst)
    }

    /// Resolve once the signal is raised.
    pub async fn wait(&self) {
        loop {
            // Register before checking so a raise between the two isn't lost.
            let notified = self.inner.notify.notified();
            if self.is_raised() {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let signal = PauseSignal::new();
        let handle = signal.clone();
        assert!(!signal.is_raised());

        handle.raise();
        assert!(signal.is_raised());

        signal.reset();
        assert!(!handle.is_raised());
    }

    #[tokio::test]
    async fn wait_returns_immediately_when_already_raised() {
        let signal = PauseSignal::new();
        signal.raise();
        tokio::time::timeout(Duration::from_millis(100), signal.wait())
            .await
            .expect("wait should resolve");
    }

    #[tokio::test]
    async fn wait_wakes_on_raise_from_another_task() {
        let signal = PauseSignal::new();
        let handle = signal.clone();
        let waiter = tokio::spawn(async move { signal.wait().await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.raise();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake")
            .unwrap();
    }
}
