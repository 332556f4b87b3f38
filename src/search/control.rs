//! Cooperative cancellation.
//!
//! Two sources can stop a search:
//! - a user abort flag ([`AbortHandle`]), shareable across threads,
//! - a wall-clock time limit.
//!
//! Both are polled at the top of every MID call. Reading the clock on every call would dominate
//! small searches, so the time limit is only re-checked every `K` calls, with `K` re-estimated
//! from the observed MID rate (roughly twice per second).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

#[derive(Debug, Clone, Default)]
/// Handle used to request an abort from outside the search (another thread, a listener, ...).
pub struct AbortHandle {
    flag: Arc<AtomicBool>,
}

impl AbortHandle {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn abort(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_aborted(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Relaxed);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    User,
    TimeLimit,
}

/// Calls made before the MID rate is trusted for spacing out clock reads.
const WARMUP_CALLS: u64 = 100;
const WARMUP_INTERVAL: u64 = 10;

#[derive(Debug)]
pub(crate) struct AbortControl {
    handle: AbortHandle,
    time_limit: Option<Duration>,
    started: Instant,
    countdown: u64,
    reason: Option<AbortReason>,
}

impl AbortControl {
    /// A non-positive `time_limit_secs` disables the time limit.
    pub fn new(handle: AbortHandle, time_limit_secs: f64) -> Self {
        let time_limit = if time_limit_secs > 0.0 {
            Some(Duration::from_secs_f64(time_limit_secs))
        } else {
            None
        };
        Self {
            handle,
            time_limit,
            started: Instant::now(),
            countdown: 0,
            reason: None,
        }
    }

    #[inline]
    pub fn aborted(&self) -> bool {
        self.reason.is_some()
    }

    #[inline]
    pub fn reason(&self) -> Option<AbortReason> {
        self.reason
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Polls both abort sources; once aborted, stays aborted.
    pub fn check(&mut self, mid_calls: u64) -> bool {
        if self.reason.is_some() {
            return true;
        }
        if self.handle.is_aborted() {
            log::info!("search aborted: abort flag set");
            self.reason = Some(AbortReason::User);
            return true;
        }
        let Some(limit) = self.time_limit else {
            return false;
        };
        if self.countdown > 0 {
            self.countdown -= 1;
            return false;
        }
        let elapsed = self.started.elapsed();
        if elapsed > limit {
            log::info!("search aborted: time limit of {:.3}s reached", limit.as_secs_f64());
            self.reason = Some(AbortReason::TimeLimit);
            return true;
        }
        self.countdown = if mid_calls < WARMUP_CALLS {
            WARMUP_INTERVAL
        } else {
            let per_sec = mid_calls as f64 / elapsed.as_secs_f64().max(1e-9);
            (per_sec / 2.0) as u64
        };
        false
    }
}
