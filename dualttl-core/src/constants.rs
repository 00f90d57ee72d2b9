//! Defaults and names shared across dualttl crates.

use std::time::Duration;

// ═══════════════════════════════════════════════════════════════════════════════
// JANITOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Lower bound on the janitor's sweep interval.
/// Tiny TTLs would otherwise make the janitor sweep continuously.
pub const DEFAULT_SWEEP_FLOOR: Duration = Duration::from_secs(1);

/// Smallest sweep floor a memoizer accepts.
/// Anything lower is raised to this.
pub const MIN_SWEEP_FLOOR: Duration = Duration::from_millis(1);

/// Thread name given to every janitor worker.
pub const JANITOR_THREAD_NAME: &str = "dualttl-janitor";

// ═══════════════════════════════════════════════════════════════════════════════
// DEFAULT TTLS
// ═══════════════════════════════════════════════════════════════════════════════

/// Default lifetime of a cached `true` verdict, in milliseconds.
pub const DEFAULT_TRUE_TTL_MS: i64 = 60_000;

/// Default lifetime of a cached `false` verdict, in milliseconds.
/// Shorter than the true TTL: negative answers are retried sooner.
pub const DEFAULT_FALSE_TTL_MS: i64 = 5_000;

/// Default sweep floor, in milliseconds.
pub const DEFAULT_SWEEP_FLOOR_MS: u64 = 1_000;

// ═══════════════════════════════════════════════════════════════════════════════
// ENVIRONMENT VARIABLES
// ═══════════════════════════════════════════════════════════════════════════════

/// Environment variable overriding the true-verdict TTL (milliseconds, may be negative).
pub const ENV_TRUE_TTL_MS: &str = "DUALTTL_TRUE_TTL_MS";

/// Environment variable overriding the false-verdict TTL (milliseconds, may be negative).
pub const ENV_FALSE_TTL_MS: &str = "DUALTTL_FALSE_TTL_MS";

/// Environment variable overriding the janitor sweep floor (milliseconds).
pub const ENV_SWEEP_FLOOR_MS: &str = "DUALTTL_SWEEP_FLOOR_MS";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ms_constants_agree() {
        assert_eq!(
            Duration::from_millis(DEFAULT_SWEEP_FLOOR_MS),
            DEFAULT_SWEEP_FLOOR
        );
        assert!(DEFAULT_FALSE_TTL_MS < DEFAULT_TRUE_TTL_MS);
    }
}
