//! Cached verdicts.

use std::time::{Duration, Instant};

/// A stored verdict and the instant it stops being live.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Entry {
    pub(crate) value: bool,
    /// `None` when `created_at + ttl` overflows `Instant`; such an entry never expires.
    expires_at: Option<Instant>,
}

impl Entry {
    pub(crate) fn new(value: bool, created_at: Instant, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: created_at.checked_add(ttl),
        }
    }

    /// Live iff `now < expires_at`.
    #[inline]
    pub(crate) fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }

    #[inline]
    pub(crate) fn is_expired(&self, now: Instant) -> bool {
        !self.is_live(now)
    }
}
