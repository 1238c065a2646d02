//! Supply conservation invariant checker.
//!
//! Invariant enforced after every deposit, withdrawal and settlement call:
//! ```text
//! Σ(balance) == Σ(deposits) - Σ(withdrawals)
//! ```
//!
//! `post` and `correctUpdate` only move value between accounts, so neither
//! may change the left-hand side.

use statebls_types::{Result, StateBlsError};

/// Tracks cumulative external flows into and out of the settlement plane.
#[derive(Debug, Default, Clone)]
pub struct SupplyConservation {
    /// Total deposits since genesis.
    deposits: u128,
    /// Total withdrawals since genesis.
    withdrawals: u128,
}

impl SupplyConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a deposit. Leaves the tracker unchanged on error.
    ///
    /// # Errors
    /// `SupplyInvariantViolation` if cumulative deposits overflow.
    pub fn record_deposit(&mut self, amount: u128) -> Result<()> {
        self.deposits = self.deposits.checked_add(amount).ok_or_else(|| {
            StateBlsError::SupplyInvariantViolation {
                reason: format!("cumulative deposits overflow adding {amount}"),
            }
        })?;
        Ok(())
    }

    /// Record a withdrawal.
    ///
    /// # Errors
    /// `SupplyInvariantViolation` if withdrawals would exceed deposits.
    pub fn record_withdrawal(&mut self, amount: u128) -> Result<()> {
        let withdrawals = self
            .withdrawals
            .checked_add(amount)
            .filter(|w| *w <= self.deposits)
            .ok_or_else(|| StateBlsError::SupplyInvariantViolation {
                reason: format!(
                    "withdrawal of {amount} exceeds expected supply {}",
                    self.expected_supply()
                ),
            })?;
        self.withdrawals = withdrawals;
        Ok(())
    }

    /// Expected total supply: deposits - withdrawals.
    #[must_use]
    pub fn expected_supply(&self) -> u128 {
        self.deposits - self.withdrawals
    }

    /// Verify that the actual supply (sum of all balances) matches the
    /// expected supply.
    ///
    /// # Errors
    /// Returns [`StateBlsError::SupplyInvariantViolation`] if actual ≠ expected.
    pub fn verify(&self, actual_supply: u128) -> Result<()> {
        let expected = self.expected_supply();
        if actual_supply != expected {
            return Err(StateBlsError::SupplyInvariantViolation {
                reason: format!(
                    "actual supply {actual_supply} != expected {expected} \
                     (deposits={}, withdrawals={})",
                    self.deposits, self.withdrawals,
                ),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn total_deposits(&self) -> u128 {
        self.deposits
    }

    #[must_use]
    pub fn total_withdrawals(&self) -> u128 {
        self.withdrawals
    }
}
