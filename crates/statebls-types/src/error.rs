//! Error types for StateBLS settlement.
//!
//! All errors use the `SB_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Payload errors
//! - 2xx: Account / balance errors
//! - 3xx: Signature errors
//! - 4xx: Cycle errors
//! - 5xx: Record / correction errors
//! - 8xx: Invariant errors
//! - 9xx: General errors
//!
//! Every variant aborts the whole call: no state is mutated on error.

use thiserror::Error;

use crate::{AccountIndex, RecordKey};

/// Central error enum for all StateBLS operations.
#[derive(Debug, Error)]
pub enum StateBlsError {
    // =================================================================
    // Payload Errors (1xx)
    // =================================================================
    /// Length or encoding of the payload does not match its declared shape.
    #[error("SB_ERR_100: Malformed payload: {reason}")]
    MalformedPayload { reason: String },

    /// The 4-byte selector does not name a settlement entry point.
    #[error("SB_ERR_101: Unknown function selector: {selector}")]
    UnknownSelector { selector: String },

    // =================================================================
    // Account / Balance Errors (2xx)
    // =================================================================
    /// No account is registered at this index.
    #[error("SB_ERR_200: Unknown account: {0}")]
    UnknownAccount(AccountIndex),

    /// The account balance cannot cover the debit.
    #[error("SB_ERR_201: Insufficient balance on {index}: need {needed}, have {available}")]
    InsufficientBalance {
        index: AccountIndex,
        needed: u128,
        available: u128,
    },

    /// A credit would overflow the 128-bit balance.
    #[error("SB_ERR_202: Balance overflow on {0}")]
    BalanceOverflow(AccountIndex),

    /// A receipt names the hub as its own counterparty.
    #[error("SB_ERR_203: Hub {0} cannot settle with itself")]
    SelfSettlement(AccountIndex),

    /// Withdrawal attempted before the account's unlock time.
    #[error("SB_ERR_204: Withdrawals locked on {index} until {unlocks_at}")]
    WithdrawLocked { index: AccountIndex, unlocks_at: u64 },

    // =================================================================
    // Signature Errors (3xx)
    // =================================================================
    /// The aggregate (or single) signature check failed.
    #[error("SB_ERR_300: Signature verification failed")]
    InvalidSignature,

    /// A curve point is not canonical, not on the curve, or outside the subgroup.
    #[error("SB_ERR_301: Invalid curve point: {reason}")]
    InvalidPoint { reason: String },

    // =================================================================
    // Cycle Errors (4xx)
    // =================================================================
    /// The receipt's cycle is over and its correction window has passed.
    #[error("SB_ERR_400: Receipt expired at {expires_by} (now {now})")]
    ExpiredReceipt { expires_by: u32, now: u64 },

    // =================================================================
    // Record / Correction Errors (5xx)
    // =================================================================
    /// The correction does not strictly improve on the stored record.
    #[error("SB_ERR_500: Stale correction: {reason}")]
    StaleCorrection { reason: String },

    /// The pair was already slashed at this sequence number.
    #[error("SB_ERR_501: Record {0} already slashed")]
    AlreadySlashed(RecordKey),

    /// There is no posted record to correct.
    #[error("SB_ERR_502: Record not found: {0}")]
    RecordNotFound(RecordKey),

    // =================================================================
    // Invariant Errors (8xx)
    // =================================================================
    /// Supply conservation invariant violated. Critical safety alert.
    #[error("SB_ERR_800: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },

    // =================================================================
    // General (9xx)
    // =================================================================
    /// Serialization / deserialization error.
    #[error("SB_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, bad values, etc.).
    #[error("SB_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, StateBlsError>;

impl From<serde_json::Error> for StateBlsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl StateBlsError {
    /// Shorthand for [`StateBlsError::MalformedPayload`].
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedPayload {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`StateBlsError::StaleCorrection`].
    pub fn stale(reason: impl Into<String>) -> Self {
        Self::StaleCorrection {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = StateBlsError::UnknownAccount(AccountIndex(3));
        let msg = format!("{err}");
        assert!(msg.starts_with("SB_ERR_200"), "Got: {msg}");
        assert!(msg.contains("acct:3"));
    }

    #[test]
    fn insufficient_balance_display() {
        let err = StateBlsError::InsufficientBalance {
            index: AccountIndex(2),
            needed: 100,
            available: 50,
        };
        let msg = format!("{err}");
        assert!(msg.contains("SB_ERR_201"));
        assert!(msg.contains("100"));
        assert!(msg.contains("50"));
    }

    #[test]
    fn serde_json_error_converts() {
        let json_err = serde_json::from_str::<u64>("not json").unwrap_err();
        let err: StateBlsError = json_err.into();
        assert!(matches!(err, StateBlsError::Serialization(_)));
    }

    #[test]
    fn all_errors_have_sb_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(StateBlsError::malformed("short")),
            Box::new(StateBlsError::InvalidSignature),
            Box::new(StateBlsError::ExpiredReceipt {
                expires_by: 10,
                now: 20,
            }),
            Box::new(StateBlsError::stale("amount")),
            Box::new(StateBlsError::AlreadySlashed(RecordKey([0u8; 32]))),
            Box::new(StateBlsError::Configuration("test".into())),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("SB_ERR_"),
                "Error missing SB_ERR_ prefix: {msg}"
            );
        }
    }
}
