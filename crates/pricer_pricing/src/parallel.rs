//! Rayon-based parallelisation utilities.
//!
//! Small batches run sequentially; rayon's scheduling overhead dominates
//! below a few dozen Heston prices.

use rayon::prelude::*;

/// Default minimum batch size before work is spread across threads.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 32;

/// Configuration for parallel execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ParallelConfig {
    /// Master switch.
    pub enabled: bool,
    /// Minimum items before using parallelism.
    pub parallel_threshold: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl ParallelConfig {
    /// Creates a new parallel configuration.
    pub fn new(parallel_threshold: usize) -> Self {
        Self {
            enabled: true,
            parallel_threshold,
        }
    }

    /// Always sequential.
    pub fn sequential() -> Self {
        Self {
            enabled: false,
            parallel_threshold: usize::MAX,
        }
    }

    /// Returns whether to use parallel processing for the given item count.
    #[inline]
    pub fn should_parallelize(&self, n_items: usize) -> bool {
        self.enabled && n_items >= self.parallel_threshold
    }

    /// Map `items` through `mapper`, in parallel above the threshold.
    ///
    /// Output order always matches input order.
    pub fn map<T, R, F>(&self, items: &[T], mapper: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        if self.should_parallelize(items.len()) {
            items.par_iter().map(mapper).collect()
        } else {
            items.iter().map(mapper).collect()
        }
    }
}
