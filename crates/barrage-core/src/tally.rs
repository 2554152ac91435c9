//! Failure accounting for a single load run.

use std::sync::{Mutex, PoisonError};

/// Concurrency-safe counter of failed operations.
///
/// Many workers report into one tally; the count is read once after the
/// run. Built fresh for every `execute` call so repeated runs start from
/// zero. The lock is held only for the increment, never across I/O.
#[derive(Debug, Default)]
pub struct RunTally {
    errors: Mutex<u64>,
}

impl RunTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one failed operation and emit a warning tagged with its index.
    pub fn record_failure(&self, index: u64, error: &anyhow::Error) {
        {
            let mut errors = self
                .errors
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            *errors += 1;
        }
        tracing::warn!(index, error = %error, "operation failed");
    }

    /// Final failure count. Meaningful once all workers have completed;
    /// the read takes the same lock as the increments.
    pub fn error_count(&self) -> u64 {
        *self.errors.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn starts_at_zero() {
        assert_eq!(RunTally::new().error_count(), 0);
    }

    #[test]
    fn single_failure_counted() {
        let tally = RunTally::new();
        tally.record_failure(3, &anyhow::anyhow!("boom"));
        assert_eq!(tally.error_count(), 1);
    }

    fn hammer(workers: u64) -> u64 {
        let tally = Arc::new(RunTally::new());
        let handles: Vec<_> = (0..workers)
            .map(|index| {
                let tally = Arc::clone(&tally);
                std::thread::spawn(move || {
                    tally.record_failure(index, &anyhow::anyhow!("synthetic failure"));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        tally.error_count()
    }

    #[test]
    fn no_lost_updates_under_contention() {
        assert_eq!(hammer(0), 0);
        assert_eq!(hammer(1), 1);
        assert_eq!(hammer(100), 100);
    }

    #[test]
    #[ignore = "slow; run with --ignored for the full contention sweep"]
    fn no_lost_updates_ten_thousand_writers() {
        assert_eq!(hammer(10_000), 10_000);
    }
}
