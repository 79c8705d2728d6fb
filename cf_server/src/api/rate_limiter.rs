//! Per-connection inbound message rate limiting.
//!
//! Each connection carries a burst window and a sustained window; a message
//! is accepted only when both windows have room.

use std::{collections::VecDeque, time::Duration};
use tokio::time::Instant;

/// Sliding-window counter
#[derive(Debug)]
pub struct SlidingWindow {
    /// Timestamps of recently accepted messages
    timestamps: VecDeque<Instant>,
    /// Maximum number of messages in the window
    max_messages: usize,
    window: Duration,
}

impl SlidingWindow {
    pub fn new(max_messages: usize, window: Duration) -> Self {
        Self {
            timestamps: VecDeque::with_capacity(max_messages),
            max_messages,
            window,
        }
    }

    fn evict(&mut self, now: Instant) {
        while let Some(ts) = self.timestamps.front() {
            if now.duration_since(*ts) > self.window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    fn has_room(&mut self, now: Instant) -> bool {
        self.evict(now);
        self.timestamps.len() < self.max_messages
    }

    fn record(&mut self, now: Instant) {
        self.timestamps.push_back(now);
    }

    /// Messages remaining in the current window
    pub fn remaining(&self) -> usize {
        self.max_messages.saturating_sub(self.timestamps.len())
    }
}

/// Rate limiter for one WebSocket connection
///
/// # Example
///
/// ```
/// use cf_server::api::rate_limiter::RateLimiter;
///
/// let mut limiter = RateLimiter::default();
/// for _ in 0..10 {
///     assert!(limiter.check());
/// }
/// // 11th message inside the same second is dropped
/// assert!(!limiter.check());
/// ```
#[derive(Debug)]
pub struct RateLimiter {
    burst: SlidingWindow,
    sustained: SlidingWindow,
}

impl Default for RateLimiter {
    /// 10 messages per second, 120 per minute.
    fn default() -> Self {
        Self::new(
            SlidingWindow::new(10, Duration::from_secs(1)),
            SlidingWindow::new(120, Duration::from_secs(60)),
        )
    }
}

impl RateLimiter {
    pub fn new(burst: SlidingWindow, sustained: SlidingWindow) -> Self {
        Self { burst, sustained }
    }

    /// Returns `true` if the message is allowed. Rejected messages are not counted.
    pub fn check(&mut self) -> bool {
        let now = Instant::now();

        if !self.burst.has_room(now) || !self.sustained.has_room(now) {
            return false;
        }

        self.burst.record(now);
        self.sustained.record(now);
        true
    }

    /// Messages remaining before either window blocks
    pub fn remaining(&self) -> usize {
        self.burst.remaining().min(self.sustained.remaining())
    }
}
