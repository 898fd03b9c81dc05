/*!
 * Workload Runner
 * Deterministic CPU-bound payload for the priority experiment
 *
 * No I/O, no allocation and no clock reads inside the loop, so a duration
 * measured around it reflects CPU scheduling only.
 */

use std::hint::black_box;
use std::time::{Duration, Instant};

/// CPU-bound reduction over `1..iterations`
pub struct WorkloadRunner;

impl WorkloadRunner {
    /// Sum of `(i * i) mod (i + 1)` over `1..iterations`
    ///
    /// Wrapping arithmetic keeps every input panic-free; the divisor is never zero.
    #[must_use]
    pub fn run(iterations: u64) -> u64 {
        (1..iterations).fold(0u64, |acc, i| {
            let i = black_box(i);
            acc.wrapping_add(i.wrapping_mul(i) % (i + 1))
        })
    }

    /// Run the workload and measure wall-clock time around the call only
    pub fn timed(iterations: u64) -> (u64, Duration) {
        let start = Instant::now();
        let value = black_box(Self::run(black_box(iterations)));
        (value, start.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_small_inputs() {
        assert_eq!(WorkloadRunner::run(0), 0);
        assert_eq!(WorkloadRunner::run(1), 0);
        // i^2 = (i + 1)(i - 1) + 1, so every term is 1 until i^2 wraps
        assert_eq!(WorkloadRunner::run(2), 1);
        assert_eq!(WorkloadRunner::run(10), 9);
        assert_eq!(WorkloadRunner::run(500_000), 499_999);
    }

    #[test]
    fn test_timed_matches_run() {
        let (value, elapsed) = WorkloadRunner::timed(1_000);
        assert_eq!(value, WorkloadRunner::run(1_000));
        assert!(elapsed >= Duration::ZERO);
    }

    proptest! {
        #[test]
        fn prop_deterministic(iterations in 0u64..50_000) {
            prop_assert_eq!(WorkloadRunner::run(iterations), WorkloadRunner::run(iterations));
        }

        #[test]
        fn prop_terms_are_one_below_wrap(iterations in 1u64..50_000) {
            prop_assert_eq!(WorkloadRunner::run(iterations), iterations - 1);
        }
    }
}
