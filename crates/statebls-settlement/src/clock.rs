//! Cycle clock.
//!
//! Receipts are valid for the cycle they were posted in and expire at its
//! end. After expiry a record stays correctable for one buffer period; the
//! same buffer is the withdrawal lock applied to counterparties on `post`.
//!
//! All functions are pure in `now` (unix seconds). [`wall_clock_now`] is
//! the only place the system clock is read.

use chrono::Utc;
use statebls_types::CycleConfig;

/// Derives cycle expiries and unlock times from a [`CycleConfig`].
#[derive(Debug, Clone, Copy)]
pub struct CycleClock {
    config: CycleConfig,
}

impl CycleClock {
    #[must_use]
    pub fn new(config: CycleConfig) -> Self {
        Self { config }
    }

    /// End of the cycle containing `now`: the next multiple of the cycle
    /// length strictly after `now`.
    ///
    /// Saturates at `u32::MAX`, the widest value a receipt can carry.
    #[must_use]
    pub fn current_cycle_expiry(&self, now: u64) -> u32 {
        let len = self.config.cycle_duration_secs.max(1);
        let end = (now / len).saturating_add(1).saturating_mul(len);
        u32::try_from(end).unwrap_or(u32::MAX)
    }

    /// Earliest time a counterparty touched at `now` may withdraw again.
    #[must_use]
    pub fn withdraw_unlock(&self, now: u64) -> u64 {
        now.saturating_add(self.config.buffer_period_secs)
    }

    /// Correction window length after expiry, in seconds.
    #[must_use]
    pub fn buffer_period(&self) -> u64 {
        self.config.buffer_period_secs
    }

    /// Whether a receipt expiring at `expires_by` may still be corrected.
    #[must_use]
    pub fn is_correctable(&self, expires_by: u32, now: u64) -> bool {
        now <= u64::from(expires_by).saturating_add(self.config.buffer_period_secs)
    }

    #[must_use]
    pub fn config(&self) -> &CycleConfig {
        &self.config
    }
}

/// Current unix time in seconds. Clamps pre-epoch clocks to zero.
#[must_use]
pub fn wall_clock_now() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or_default()
}
