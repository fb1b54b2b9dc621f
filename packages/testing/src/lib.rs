#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))] // This is all test code, no need to test it.

//! Private helpers for tests and benchmarks in the lockstep workspace.

use std::hint::black_box;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Runs a test with a timeout so that a deadlock fails the test instead of hanging the build.
///
/// The timeout is 30 seconds under normal conditions and 120 seconds under Miri, where thread
/// synchronization primitives are significantly slower.
///
/// When the `MUTATION_TESTING` environment variable is set to "1", the watchdog is disabled and
/// the test function is executed directly. This allows mutation testing to detect hanging
/// mutations through its own timeout.
///
/// # Panics
///
/// Panics if the test exceeds the timeout (when not in mutation testing mode) and re-raises any
/// panic raised by the test function itself.
///
/// # Example
///
/// ```rust
/// use testing::with_watchdog;
///
/// with_watchdog(|| {
///     assert_eq!(2 + 2, 4);
/// });
/// ```
pub fn with_watchdog<F, R>(test_fn: F) -> R
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    if std::env::var("MUTATION_TESTING").as_deref() == Ok("1") {
        return test_fn();
    }

    let timeout = if cfg!(miri) {
        Duration::from_secs(120)
    } else {
        Duration::from_secs(30)
    };

    let (tx, rx) = mpsc::channel();

    let test_handle = thread::spawn(move || {
        let result = test_fn();
        // If this fails, the receiver has already given up on us.
        drop(tx.send(result));
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => {
            test_handle.join().expect("test thread should not panic");
            result
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            panic!("test exceeded the {timeout:?} watchdog timeout");
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => match test_handle.join() {
            Ok(()) => panic!("test thread disconnected unexpectedly"),
            Err(e) => std::panic::resume_unwind(e),
        },
    }
}

/// Burns processor time for a fixed, reproducible amount of work.
///
/// Returns a value derived from the work so callers can feed it to `black_box` or assert on it.
#[must_use]
pub fn busy_spin(iterations: u64) -> u64 {
    let mut acc = 0x9E37_79B9_7F4A_7C15_u64;

    for i in 0..iterations {
        acc = black_box(acc.rotate_left(7) ^ i.wrapping_mul(0x2545_F491_4F6C_DD1D));
    }

    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watchdog_returns_value() {
        let result = with_watchdog(|| 42);
        assert_eq!(result, 42);
    }

    #[test]
    #[should_panic]
    fn watchdog_propagates_panic() {
        with_watchdog(|| panic!("intentional panic"));
    }

    #[test]
    fn busy_spin_is_deterministic() {
        assert_eq!(busy_spin(1000), busy_spin(1000));
        assert_ne!(busy_spin(1000), busy_spin(1001));
    }
}
