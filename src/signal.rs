use std::{
    sync::{Arc, Condvar, Mutex, PoisonError},
    time::Duration,
};

/// One-shot cancellation flag shared between a spinner and its animation thread.
///
/// Clones observe the same state. Once fired it stays fired; waiters blocked in
/// [`CancelSignal::wait_timeout`] wake up immediately.
#[derive(Clone, Default)]
pub struct CancelSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` only for the call that actually fired the signal.
    pub fn fire(&self) -> bool {
        let (lock, cvar) = &*self.inner;
        let mut fired = lock.lock().unwrap_or_else(PoisonError::into_inner);
        if *fired {
            return false;
        }
        *fired = true;
        cvar.notify_all();
        true
    }

    pub fn is_fired(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks for at most `timeout`, returning early if the signal fires.
    /// Returns whether the signal has fired.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let fired = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (fired, _) = cvar
            .wait_timeout_while(fired, timeout, |fired| !*fired)
            .unwrap_or_else(PoisonError::into_inner);
        *fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_fires_once() {
        let signal = CancelSignal::new();
        assert!(!signal.is_fired());
        assert!(signal.fire());
        assert!(!signal.fire());
        assert!(signal.is_fired());
    }

    #[test]
    fn test_clone_shares_state() {
        let signal = CancelSignal::new();
        let other = signal.clone();
        other.fire();
        assert!(signal.is_fired());
    }

    #[test]
    fn test_wait_times_out_when_not_fired() {
        let signal = CancelSignal::new();
        let start = Instant::now();
        assert!(!signal.wait_timeout(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_wait_wakes_on_fire() {
        let signal = CancelSignal::new();
        let waiter = signal.clone();
        let handle = thread::spawn(move || {
            let start = Instant::now();
            let fired = waiter.wait_timeout(Duration::from_secs(10));
            (fired, start.elapsed())
        });
        thread::sleep(Duration::from_millis(20));
        signal.fire();
        let (fired, elapsed) = handle.join().unwrap();
        assert!(fired);
        assert!(elapsed < Duration::from_secs(5));
    }

    #[test]
    fn test_wait_returns_immediately_when_already_fired() {
        let signal = CancelSignal::new();
        signal.fire();
        let start = Instant::now();
        assert!(signal.wait_timeout(Duration::from_secs(10)));
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
