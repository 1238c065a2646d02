//! Account registry.
//!
//! Maps each compact [`AccountIndex`] to its BLS public key and its
//! balance/withdraw-lock state. Accounts are never removed. Balances are
//! only mutated by the settlement processor, which owns the registry.

use std::collections::BTreeMap;

use statebls_bls::PublicKey;
use statebls_types::{AccountIndex, AccountState, Result, StateBlsError};

/// A registered account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Account {
    /// Assigned at registration; immutable.
    pub index: AccountIndex,
    /// Key both `post` and `correctUpdate` verify this account's signatures under.
    pub public_key: PublicKey,
    pub state: AccountState,
}

/// Index → account map with sequential index assignment.
pub struct AccountRegistry {
    accounts: BTreeMap<AccountIndex, Account>,
    /// Index handed to the next registration.
    next_index: AccountIndex,
}

impl AccountRegistry {
    /// Create an empty registry. The first account gets index 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            accounts: BTreeMap::new(),
            next_index: AccountIndex(1),
        }
    }

    /// Register a public key; returns the new account's index.
    pub(crate) fn register(&mut self, public_key: PublicKey) -> AccountIndex {
        let index = self.next_index;
        self.accounts.insert(
            index,
            Account {
                index,
                public_key,
                state: AccountState::default(),
            },
        );
        self.next_index = index.next();
        index
    }

    /// Look up an account.
    ///
    /// # Errors
    /// `UnknownAccount` if nothing is registered at `index`.
    pub fn get(&self, index: AccountIndex) -> Result<&Account> {
        self.accounts
            .get(&index)
            .ok_or(StateBlsError::UnknownAccount(index))
    }

    pub fn public_key(&self, index: AccountIndex) -> Result<PublicKey> {
        self.get(index).map(|a| a.public_key)
    }

    /// Queryable `accounts[index] -> {balance, withdrawAfter}`.
    #[must_use]
    pub fn state(&self, index: AccountIndex) -> Option<AccountState> {
        self.accounts.get(&index).map(|a| a.state)
    }

    /// Add externally deposited funds.
    ///
    /// # Errors
    /// - `UnknownAccount` if `index` is not registered
    /// - `BalanceOverflow` if the balance would exceed `u128::MAX`
    pub(crate) fn credit(&mut self, index: AccountIndex, amount: u128) -> Result<()> {
        let account = self
            .accounts
            .get_mut(&index)
            .ok_or(StateBlsError::UnknownAccount(index))?;
        account.state.balance = account
            .state
            .balance
            .checked_add(amount)
            .ok_or(StateBlsError::BalanceOverflow(index))?;
        Ok(())
    }

    /// Remove funds leaving the system.
    ///
    /// # Errors
    /// - `UnknownAccount` if `index` is not registered
    /// - `WithdrawLocked` if `now` is before the account's `withdraw_after`
    /// - `InsufficientBalance` if the balance is below `amount`
    pub(crate) fn withdraw(&mut self, index: AccountIndex, amount: u128, now: u64) -> Result<()> {
        let account = self
            .accounts
            .get_mut(&index)
            .ok_or(StateBlsError::UnknownAccount(index))?;
        if !account.state.is_unlocked(now) {
            return Err(StateBlsError::WithdrawLocked {
                index,
                unlocks_at: account.state.withdraw_after,
            });
        }
        if account.state.balance < amount {
            return Err(StateBlsError::InsufficientBalance {
                index,
                needed: amount,
                available: account.state.balance,
            });
        }
        account.state.balance -= amount;
        Ok(())
    }

    /// Overwrite the states of already-validated accounts.
    pub(crate) fn apply(&mut self, states: BTreeMap<AccountIndex, AccountState>) {
        for (index, state) in states {
            if let Some(account) = self.accounts.get_mut(&index) {
                account.state = state;
            }
        }
    }

    /// Sum of all balances.
    #[must_use]
    pub fn total_supply(&self) -> u128 {
        self.accounts
            .values()
            .fold(0u128, |acc, a| acc.saturating_add(a.state.balance))
    }

    /// Number of registered accounts.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl Default for AccountRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use statebls_bls::SecretKey;

    use super::*;

    fn key(seed: u64) -> PublicKey {
        SecretKey::from_seed(seed).public_key()
    }

    #[test]
    fn register_assigns_sequential_indices() {
        let mut reg = AccountRegistry::new();
        assert_eq!(reg.register(key(1)), AccountIndex(1));
        assert_eq!(reg.register(key(2)), AccountIndex(2));
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.public_key(AccountIndex(2)).unwrap(), key(2));
    }

    #[test]
    fn new_account_is_zero_and_unlocked() {
        let mut reg = AccountRegistry::new();
        let idx = reg.register(key(1));
        assert_eq!(reg.state(idx), Some(AccountState::default()));
    }

    #[test]
    fn unknown_index_fails_lookup() {
        let reg = AccountRegistry::new();
        let err = reg.get(AccountIndex(9)).unwrap_err();
        assert!(matches!(err, StateBlsError::UnknownAccount(AccountIndex(9))));
        assert!(reg.state(AccountIndex(9)).is_none());
    }

    #[test]
    fn credit_overflow_leaves_balance() {
        let mut reg = AccountRegistry::new();
        let idx = reg.register(key(1));
        reg.credit(idx, u128::MAX).unwrap();
        let err = reg.credit(idx, 1).unwrap_err();
        assert!(matches!(err, StateBlsError::BalanceOverflow(_)));
        assert_eq!(reg.state(idx).unwrap().balance, u128::MAX);
    }

    #[test]
    fn withdraw_respects_lock() {
        let mut reg = AccountRegistry::new();
        let idx = reg.register(key(1));
        reg.credit(idx, 100).unwrap();
        let mut states = BTreeMap::new();
        states.insert(
            idx,
            AccountState {
                balance: 100,
                withdraw_after: 50,
            },
        );
        reg.apply(states);

        let err = reg.withdraw(idx, 10, 49).unwrap_err();
        assert!(matches!(
            err,
            StateBlsError::WithdrawLocked { unlocks_at: 50, .. }
        ));
        reg.withdraw(idx, 10, 50).unwrap();
        assert_eq!(reg.state(idx).unwrap().balance, 90);
    }

    #[test]
    fn withdraw_insufficient_fails() {
        let mut reg = AccountRegistry::new();
        let idx = reg.register(key(1));
        reg.credit(idx, 5).unwrap();
        let err = reg.withdraw(idx, 6, 0).unwrap_err();
        assert!(matches!(err, StateBlsError::InsufficientBalance { .. }));
        assert_eq!(reg.state(idx).unwrap().balance, 5);
    }

    #[test]
    fn total_supply_sums_accounts() {
        let mut reg = AccountRegistry::new();
        let a = reg.register(key(1));
        let b = reg.register(key(2));
        reg.credit(a, 1000).unwrap();
        reg.credit(b, 500).unwrap();
        assert_eq!(reg.total_supply(), 1500);
    }
}
