//! Tweet identifier generation.
//!
//! Identifiers are creation timestamps in epoch microseconds, so they double
//! as a total order over tweets and as human-readable timestamps. Uniqueness
//! is a contract of the generator, not of clock resolution: when two calls
//! land in the same microsecond (or the clock steps backwards), the later id
//! is the previous one plus one.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

use crate::types::TweetId;

/// Issues process-wide unique, strictly increasing tweet identifiers.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicU64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    /// Next identifier: the current wall clock in microseconds, or the last
    /// issued id plus one, whichever is greater. Strictly increasing even
    /// under concurrent callers.
    pub fn next(&self) -> TweetId {
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now_micros().max(last + 1);
            match self.last.compare_exchange_weak(
                last,
                candidate,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return TweetId::from_micros(candidate),
                Err(observed) => last = observed,
            }
        }
    }
}

fn now_micros() -> u64 {
    // Negative only for pre-1970 clocks; clamp rather than wrap.
    Utc::now().timestamp_micros().max(0) as u64
}
