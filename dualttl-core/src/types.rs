//! Domain types: verdict polarity, TTL policy, statistics.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════════
// POLARITY
// ═══════════════════════════════════════════════════════════════════════════════

/// Which side of the predicate a verdict landed on.
///
/// Polarity alone selects the TTL applied to a cached verdict.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// The predicate returned `true`.
    True,
    /// The predicate returned `false`.
    False,
}

impl From<bool> for Polarity {
    fn from(value: bool) -> Self {
        if value {
            Polarity::True
        } else {
            Polarity::False
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::True => f.write_str("true"),
            Polarity::False => f.write_str("false"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TTL POLICY
// ═══════════════════════════════════════════════════════════════════════════════

/// Pair of expiration windows, one per polarity. Fixed once built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TtlPolicy {
    true_ttl: Duration,
    false_ttl: Duration,
}

impl TtlPolicy {
    /// Creates a policy from two durations.
    pub const fn new(true_ttl: Duration, false_ttl: Duration) -> Self {
        Self {
            true_ttl,
            false_ttl,
        }
    }

    /// Creates a policy from signed millisecond counts.
    ///
    /// Negative values are clamped to zero, i.e. the polarity is never cached.
    pub fn from_millis(true_ttl_ms: i64, false_ttl_ms: i64) -> Self {
        Self::new(clamp_millis(true_ttl_ms), clamp_millis(false_ttl_ms))
    }

    /// TTL applied to `true` verdicts.
    pub fn true_ttl(&self) -> Duration {
        self.true_ttl
    }

    /// TTL applied to `false` verdicts.
    pub fn false_ttl(&self) -> Duration {
        self.false_ttl
    }

    /// TTL applied to a verdict of the given value.
    #[inline]
    pub fn ttl_for(&self, value: bool) -> Duration {
        match Polarity::from(value) {
            Polarity::True => self.true_ttl,
            Polarity::False => self.false_ttl,
        }
    }

    /// Janitor period: `max(floor, min(true_ttl, false_ttl) / 2)`.
    ///
    /// Sampling at half the shorter TTL bounds how long an expired entry can
    /// linger to about 1.5x that TTL.
    pub fn sweep_interval(&self, floor: Duration) -> Duration {
        (self.true_ttl.min(self.false_ttl) / 2).max(floor)
    }
}

fn clamp_millis(ms: i64) -> Duration {
    Duration::from_millis(ms.max(0) as u64)
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATISTICS
// ═══════════════════════════════════════════════════════════════════════════════

/// Point-in-time counters for a memoizer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoStats {
    /// Lookups answered from a live entry
    pub hits: u64,
    /// Lookups that invoked the predicate
    pub misses: u64,
    /// Janitor firings that completed a sweep
    pub sweeps: u64,
    /// Entries removed because they expired
    pub evicted: u64,
    /// Entries currently stored, live or not
    pub entries: usize,
    /// Entries currently stored and live
    pub live_entries: usize,
    /// Whether background sweeping has been stopped
    pub stopped: bool,
}

impl MemoStats {
    /// Fraction of lookups served from cache, or 0.0 before any lookup.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
