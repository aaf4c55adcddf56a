//! Fixed-interval polling with an explicit bound and caller-driven cancellation.

use crate::error::{DwhError, Result};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(15);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

// ---------------------------------------------------------------------------
// CancelToken
// ---------------------------------------------------------------------------

/// Shared flag that wakes any waiting poll loop as soon as it is set.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (flag, cv) = &*self.inner;
        *flag.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cv.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block for `dur` or until cancelled. Returns `true` if cancelled.
    pub fn sleep(&self, dur: Duration) -> bool {
        let (flag, cv) = &*self.inner;
        let guard = flag.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = cv
            .wait_timeout_while(guard, dur, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

// ---------------------------------------------------------------------------
// Poller
// ---------------------------------------------------------------------------

pub struct Poller<'a> {
    settings: PollSettings,
    cancel: &'a CancelToken,
}

impl<'a> Poller<'a> {
    pub fn new(settings: PollSettings, cancel: &'a CancelToken) -> Self {
        Self { settings, cancel }
    }

    /// Call `probe` until it yields a value.
    ///
    /// The first probe runs immediately; each further probe follows one
    /// interval of waiting. Errors from `probe` end the loop at once.
    pub fn until<T>(&self, what: &str, mut probe: impl FnMut() -> Result<Option<T>>) -> Result<T> {
        let start = Instant::now();
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            if let Some(value) = probe()? {
                info!(
                    waiting_for = what,
                    attempts = attempt,
                    elapsed_secs = start.elapsed().as_secs(),
                    "wait finished"
                );
                return Ok(value);
            }

            let elapsed = start.elapsed();
            if elapsed >= self.settings.timeout {
                return Err(DwhError::PollTimeout {
                    what: what.to_string(),
                    elapsed,
                });
            }

            debug!(waiting_for = what, attempt, "not ready, waiting");
            if self.cancel.sleep(self.settings.interval) {
                return Err(DwhError::Cancelled(what.to_string()));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
