//! Common traits for dualttl.
//!
//! These traits are the seams between the memoizer and the outside world:
//! where time comes from, and what is being memoized.

use std::time::Instant;

// ═══════════════════════════════════════════════════════════════════════════════
// CLOCK TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Monotonic time source.
///
/// Every liveness decision (hit check, compute store, janitor sweep) reads
/// `now()` exactly once.
///
/// Implementations might use:
/// - `Instant::now()` (production, see [`SystemClock`](crate::SystemClock))
/// - A manually advanced instant (tests, see [`ManualClock`](crate::ManualClock))
pub trait Clock: Send + Sync {
    /// Returns the current instant. Must never go backwards.
    fn now(&self) -> Instant;
}

// ═══════════════════════════════════════════════════════════════════════════════
// PREDICATE TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// A boolean function of a key, the thing being memoized.
///
/// Any `Fn(&K) -> bool + Send + Sync` closure is a predicate.
///
/// # Re-entrancy
///
/// The memoizer invokes the predicate while holding its exclusive lock. A
/// predicate that calls back into the same memoizer will deadlock.
pub trait Predicate<K: ?Sized>: Send + Sync {
    /// Evaluates the predicate for `key`.
    fn test(&self, key: &K) -> bool;
}

impl<K, F> Predicate<K> for F
where
    K: ?Sized,
    F: Fn(&K) -> bool + Send + Sync,
{
    fn test(&self, key: &K) -> bool {
        self(key)
    }
}
