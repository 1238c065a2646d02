//! Staged state changes for a single settlement call.
//!
//! Every read goes through the overlay first, so later entries in one call
//! see the effects of earlier ones. Nothing reaches the registry or ledger
//! until [`TransactionBuffer::finish`] has checked that the call moved value
//! without creating or destroying any.

use std::collections::BTreeMap;

use statebls_types::{AccountIndex, AccountState, Record, RecordKey, Result, StateBlsError};

use crate::ledger::ReceiptLedger;
use crate::registry::AccountRegistry;

/// Validated writes ready to apply.
#[derive(Debug, Default)]
pub(crate) struct StagedChanges {
    pub accounts: BTreeMap<AccountIndex, AccountState>,
    pub records: BTreeMap<RecordKey, Record>,
}

pub(crate) struct TransactionBuffer<'a> {
    registry: &'a AccountRegistry,
    ledger: &'a ReceiptLedger,
    staged: StagedChanges,
    debited: u128,
    credited: u128,
}

impl<'a> TransactionBuffer<'a> {
    pub fn new(registry: &'a AccountRegistry, ledger: &'a ReceiptLedger) -> Self {
        Self {
            registry,
            ledger,
            staged: StagedChanges::default(),
            debited: 0,
            credited: 0,
        }
    }

    /// Current (staged or committed) state of an account.
    pub fn account(&self, index: AccountIndex) -> Result<AccountState> {
        if let Some(state) = self.staged.accounts.get(&index) {
            return Ok(*state);
        }
        self.registry.get(index).map(|a| a.state)
    }

    /// Current (staged or committed) record for a pair.
    pub fn record(&self, key: &RecordKey) -> Option<Record> {
        self.staged
            .records
            .get(key)
            .or_else(|| self.ledger.get(key))
            .copied()
    }

    pub fn debit(&mut self, index: AccountIndex, amount: u128) -> Result<()> {
        let mut state = self.account(index)?;
        if state.balance < amount {
            return Err(StateBlsError::InsufficientBalance {
                index,
                needed: amount,
                available: state.balance,
            });
        }
        state.balance -= amount;
        self.debited = self.debited.checked_add(amount).ok_or_else(|| {
            StateBlsError::SupplyInvariantViolation {
                reason: "staged debits overflow".into(),
            }
        })?;
        self.staged.accounts.insert(index, state);
        Ok(())
    }

    pub fn credit(&mut self, index: AccountIndex, amount: u128) -> Result<()> {
        let mut state = self.account(index)?;
        state.balance = state
            .balance
            .checked_add(amount)
            .ok_or(StateBlsError::BalanceOverflow(index))?;
        self.credited = self.credited.checked_add(amount).ok_or_else(|| {
            StateBlsError::SupplyInvariantViolation {
                reason: "staged credits overflow".into(),
            }
        })?;
        self.staged.accounts.insert(index, state);
        Ok(())
    }

    /// Move `amount` from `from` to `to`.
    pub fn transfer(&mut self, from: AccountIndex, to: AccountIndex, amount: u128) -> Result<()> {
        self.debit(from, amount)?;
        self.credit(to, amount)
    }

    /// Raise `withdraw_after` to `unlock`; never lowers it.
    pub fn lock_withdrawals(&mut self, index: AccountIndex, unlock: u64) -> Result<()> {
        let mut state = self.account(index)?;
        state.withdraw_after = state.withdraw_after.max(unlock);
        self.staged.accounts.insert(index, state);
        Ok(())
    }

    pub fn put_record(&mut self, key: RecordKey, record: Record) {
        self.staged.records.insert(key, record);
    }

    /// Check conservation and release the staged writes.
    ///
    /// # Errors
    /// `SupplyInvariantViolation` if staged debits and credits differ.
    pub fn finish(self) -> Result<StagedChanges> {
        if self.debited != self.credited {
            return Err(StateBlsError::SupplyInvariantViolation {
                reason: format!(
                    "staged debits {} != staged credits {}",
                    self.debited, self.credited
                ),
            });
        }
        Ok(self.staged)
    }
}
