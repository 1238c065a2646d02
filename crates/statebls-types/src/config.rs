//! Configuration for a StateBLS settlement ledger.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use crate::{CycleConfig, Result, StateBlsError, constants};

/// Configuration for one settlement ledger instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementConfig {
    /// Cycle timing.
    pub cycle: CycleConfig,
    /// Human-readable tag hashed into the BLS domain-separation tag.
    /// Signatures made under one tag never verify under another.
    pub domain_tag: String,
    /// Maximum number of `(bIndex, amount)` entries accepted in one `post`.
    pub max_updates_per_post: u16,
    /// Extra penalty on a corrected hub, in basis points of the correction
    /// delta, moved from the hub to the wronged counterparty.
    pub slash_penalty_bps: u32,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            cycle: CycleConfig::default(),
            domain_tag: constants::DEFAULT_DOMAIN_TAG.to_string(),
            max_updates_per_post: constants::DEFAULT_MAX_UPDATES_PER_POST,
            slash_penalty_bps: 0,
        }
    }
}

impl SettlementConfig {
    /// Parse and validate a JSON configuration document. Missing fields
    /// take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject configurations the ledger cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.cycle.cycle_duration_secs == 0 {
            return Err(StateBlsError::Configuration(
                "cycle_duration_secs must be > 0".into(),
            ));
        }
        if self.domain_tag.is_empty() {
            return Err(StateBlsError::Configuration(
                "domain_tag must not be empty".into(),
            ));
        }
        if self.max_updates_per_post == 0 {
            return Err(StateBlsError::Configuration(
                "max_updates_per_post must be > 0".into(),
            ));
        }
        if self.slash_penalty_bps > constants::BPS_DENOMINATOR {
            return Err(StateBlsError::Configuration(format!(
                "slash_penalty_bps {} exceeds {}",
                self.slash_penalty_bps,
                constants::BPS_DENOMINATOR
            )));
        }
        Ok(())
    }

    /// The 32-byte BLS domain: `keccak256(domain_tag)`.
    #[must_use]
    pub fn domain(&self) -> [u8; 32] {
        Keccak256::digest(self.domain_tag.as_bytes()).into()
    }
}
