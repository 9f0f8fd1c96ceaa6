// Advisory counter for outbound provider calls against the monthly allowance.
// It never refuses a call; it only reports usage and flags when the plan is
// about to run out.

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{info, warn};

use crate::config::QuotaConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaUsage {
    pub used: usize,
    pub remaining: usize,
    pub near_limit: bool,
}

#[derive(Debug)]
pub struct QuotaTracker {
    config: QuotaConfig,
    used: AtomicUsize,
}

impl QuotaTracker {
    pub fn new(config: QuotaConfig) -> Self {
        Self {
            config,
            used: AtomicUsize::new(0),
        }
    }

    pub fn limit(&self) -> usize {
        self.config.limit
    }

    // Counts one call to `endpoint` and returns the usage after it.
    pub fn record(&self, endpoint: &str) -> QuotaUsage {
        let used = self.used.fetch_add(1, Ordering::SeqCst) + 1;
        let usage = self.usage_at(used);

        info!("API call #{}: {}", used, endpoint);
        if usage.near_limit {
            warn!(
                "Approaching API limit: {} of {} requests used, {} remaining",
                used, self.config.limit, usage.remaining
            );
        }

        usage
    }

    pub fn used(&self) -> usize {
        self.used.load(Ordering::SeqCst)
    }

    pub fn remaining(&self) -> usize {
        self.config.limit.saturating_sub(self.used())
    }

    pub fn is_near_limit(&self) -> bool {
        self.used() >= self.config.warn_threshold()
    }

    pub fn usage(&self) -> QuotaUsage {
        self.usage_at(self.used())
    }

    fn usage_at(&self, used: usize) -> QuotaUsage {
        QuotaUsage {
            used,
            remaining: self.config.limit.saturating_sub(used),
            near_limit: used >= self.config.warn_threshold(),
        }
    }
}

impl Default for QuotaTracker {
    fn default() -> Self {
        Self::new(QuotaConfig::default())
    }
}
