//! Queryable balance state of a registered account.
//!
//! Every account has a `balance` moved only by settlement and a
//! `withdraw_after` timestamp before which it may not withdraw.

use serde::{Deserialize, Serialize};

/// Public balance/withdraw-lock state of one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccountState {
    /// Settled balance.
    pub balance: u128,
    /// Unix timestamp before which withdrawals are refused. Zero means unlocked.
    pub withdraw_after: u64,
}

impl AccountState {
    /// Whether the account may withdraw at `now`.
    #[must_use]
    pub fn is_unlocked(&self, now: u64) -> bool {
        now >= self.withdraw_after
    }
}
