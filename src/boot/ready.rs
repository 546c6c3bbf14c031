//! Recovery readiness handoff
//!
//! When arbitration enters the command session, external recovery
//! services (e.g. an insecure transfer listener) may start serving. The
//! handoff is an explicit one-shot signal owned by the hosting
//! coordinator and passed by reference to both sides.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// One-shot signal raised when the command session is entered
pub struct ReadySignal {
    inner: Signal<CriticalSectionRawMutex, ()>,
}

impl ReadySignal {
    /// Create an unraised signal
    pub const fn new() -> Self {
        Self {
            inner: Signal::new(),
        }
    }

    /// Mark recovery as ready; idempotent
    pub fn raise(&self) {
        self.inner.signal(());
    }

    /// Whether the signal has been raised
    pub fn is_raised(&self) -> bool {
        self.inner.signaled()
    }

    /// Wait for the signal to be raised
    pub async fn wait(&self) {
        self.inner.wait().await;
    }
}

impl Default for ReadySignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_unraised() {
        let ready = ReadySignal::new();
        assert!(!ready.is_raised());
    }

    #[test]
    fn test_raise_is_sticky_and_idempotent() {
        let ready = ReadySignal::new();
        ready.raise();
        assert!(ready.is_raised());
        ready.raise();
        assert!(ready.is_raised());
    }
}
