//! Wave-based bounded-concurrency dispatch.
//!
//! The dispatcher issues a fixed total number of operations in successive
//! waves. Each wave spawns up to `concurrency_limit` tasks and then drains
//! them completely (the wave barrier) before the next wave starts. A
//! fire-and-join design, not a persistent worker pool: waves never overlap
//! in time, so in-flight work is bounded by construction.
//!
//! ```text
//! run(tally, op)
//!     |
//!     v
//! wave k: spawn op(i), op(i+1), ... op(i+C-1)   <= C in flight
//!     |
//!     +-- join all, record failures into tally   (barrier)
//!     |
//!     v
//! wave k+1 ...
//! ```

use std::future::Future;
use std::panic::AssertUnwindSafe;

use anyhow::anyhow;
use futures::FutureExt;
use tokio::task::JoinSet;

use crate::config::RunParams;
use crate::tally::RunTally;

/// The scheduling core: owns the operation count and the wave width.
#[derive(Debug, Clone)]
pub struct WaveDispatcher {
    total_ops: u64,
    concurrency_limit: usize,
}

impl WaveDispatcher {
    pub fn new(params: &RunParams) -> Self {
        Self {
            total_ops: params.total_ops,
            concurrency_limit: params.concurrency_limit,
        }
    }

    /// Execute `op` exactly once for every index in `[0, total_ops)`.
    ///
    /// Indices within a wave are contiguous and strictly increasing;
    /// completion order within a wave is unspecified. The call returns
    /// only after every operation has completed and had its outcome
    /// observed: failures are recorded into `tally` before the wave
    /// barrier releases, and a panicking operation is contained and
    /// recorded as a failure under its own index.
    ///
    /// A failing operation never aborts the run.
    pub async fn run<F, Fut>(&self, tally: &RunTally, op: F)
    where
        F: Fn(u64) -> Fut,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let mut next: u64 = 0;
        while next < self.total_ops {
            let mut wave = JoinSet::new();
            let mut slots = self.concurrency_limit;
            while slots > 0 && next < self.total_ops {
                let index = next;
                let fut = AssertUnwindSafe(op(index)).catch_unwind();
                wave.spawn(async move {
                    let outcome = match fut.await {
                        Ok(outcome) => outcome,
                        Err(_panic) => Err(anyhow!("operation panicked")),
                    };
                    (index, outcome)
                });
                next += 1;
                slots -= 1;
            }

            // Wave barrier: every spawned task reports before the next
            // wave may start.
            while let Some(joined) = wave.join_next().await {
                match joined {
                    Ok((_index, Ok(()))) => {}
                    Ok((index, Err(error))) => tally.record_failure(index, &error),
                    Err(join_error) => {
                        // catch_unwind above makes this unreachable short
                        // of runtime shutdown; surface it rather than drop it.
                        tracing::error!(error = %join_error, "wave task vanished without reporting");
                    }
                }
            }
        }
    }
}
