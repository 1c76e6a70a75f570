use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::{SubprocessError, SubprocessResult};

/// Granularity at which an interruptible wait re-checks its token.
const INTERRUPT_POLL: Duration = Duration::from_millis(10);

/// Single-shot completion latch.
///
/// Starts unfired; `fire` transitions it exactly once and wakes every waiter.
/// Observing it fired happens-after the firing thread's preceding work, so a
/// waiter thread can publish "the child has exited" through it.
pub struct CompletionLatch {
    fired: Mutex<bool>,
    cond: Condvar,
}

impl CompletionLatch {
    pub fn new() -> Self {
        Self {
            fired: Mutex::new(false),
            cond: Condvar::new(),
        }
    }

    /// Fire the latch. Idempotent; only the first call transitions it.
    pub fn fire(&self) {
        let mut fired = self.fired.lock().unwrap_or_else(PoisonError::into_inner);
        if !*fired {
            *fired = true;
            self.cond.notify_all();
        }
    }

    /// Non-blocking observation of the latch state.
    pub fn is_fired(&self) -> bool {
        *self.fired.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until the latch fires. Returns immediately if it already has.
    /// Safe to call from any number of threads.
    pub fn wait(&self) {
        let mut fired = self.fired.lock().unwrap_or_else(PoisonError::into_inner);
        while !*fired {
            fired = self.cond.wait(fired).unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Block until the latch fires or `cancel` is cancelled, whichever comes
    /// first. Cancellation fails with `Interrupted` and leaves the latch
    /// untouched.
    pub fn wait_interruptible(&self, cancel: &CancellationToken) -> SubprocessResult<()> {
        let mut fired = self.fired.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if *fired {
                return Ok(());
            }
            if cancel.is_cancelled() {
                return Err(SubprocessError::Interrupted);
            }
            let (guard, _timed_out) = self
                .cond
                .wait_timeout(fired, INTERRUPT_POLL)
                .unwrap_or_else(PoisonError::into_inner);
            fired = guard;
        }
    }
}

impl Default for CompletionLatch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_latch_starts_unfired() {
        let latch = CompletionLatch::new();
        assert!(!latch.is_fired());
    }

    #[test]
    fn test_fire_is_idempotent() {
        let latch = CompletionLatch::new();
        latch.fire();
        latch.fire();
        assert!(latch.is_fired());
        // Waiting after the fact returns immediately.
        latch.wait();
    }

    #[test]
    fn test_wait_wakes_on_fire() {
        let latch = Arc::new(CompletionLatch::new());
        let mut waiters = Vec::new();
        for _ in 0..4 {
            let latch = Arc::clone(&latch);
            waiters.push(thread::spawn(move || latch.wait()));
        }
        thread::sleep(Duration::from_millis(20));
        latch.fire();
        for waiter in waiters {
            waiter.join().unwrap();
        }
    }

    #[test]
    fn test_interruptible_wait_honors_cancellation() {
        let latch = CompletionLatch::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = latch.wait_interruptible(&cancel).unwrap_err();
        assert!(err.is_interrupted());
        // Cancellation must not consume the latch.
        assert!(!latch.is_fired());
    }

    #[test]
    fn test_interruptible_wait_cancelled_mid_wait() {
        let latch = CompletionLatch::new();
        let cancel = CancellationToken::new();

        let canceller = {
            let cancel = cancel.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(30));
                cancel.cancel();
            })
        };

        let err = latch.wait_interruptible(&cancel).unwrap_err();
        assert!(err.is_interrupted());
        canceller.join().unwrap();
    }

    #[test]
    fn test_interruptible_wait_returns_ok_once_fired() {
        let latch = CompletionLatch::new();
        let cancel = CancellationToken::new();
        latch.fire();
        latch.wait_interruptible(&cancel).unwrap();

        // Completion wins even when the token is also cancelled.
        cancel.cancel();
        latch.wait_interruptible(&cancel).unwrap();
    }
}
