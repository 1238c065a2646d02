//! Settlement cycle timing.
//!
//! Time is cut into fixed-length cycles. Receipts expire at the end of the
//! cycle they were issued in; every settlement touch locks the touched
//! counterparty's withdrawals for a buffer period so corrections can land
//! before funds leave.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Configuration for cycle timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleConfig {
    /// Length of one settlement cycle, in seconds.
    pub cycle_duration_secs: u64,
    /// Delay between a settlement touch and withdrawal unlock, in seconds.
    pub buffer_period_secs: u64,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            cycle_duration_secs: constants::DEFAULT_CYCLE_DURATION_SECS,
            buffer_period_secs: constants::DEFAULT_BUFFER_PERIOD_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_config_default() {
        let cfg = CycleConfig::default();
        assert_eq!(cfg.cycle_duration_secs, 604_800);
        assert_eq!(cfg.buffer_period_secs, 86_400);
    }

    #[test]
    fn cycle_config_serde_roundtrip() {
        let cfg = CycleConfig {
            cycle_duration_secs: 60,
            buffer_period_secs: 5,
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: CycleConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
