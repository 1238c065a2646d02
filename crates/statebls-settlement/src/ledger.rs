//! Receipt ledger: the latest agreed [`Record`] per ordered (hub, counterparty) pair.
//!
//! Records are created by the first `post` naming a pair and are never
//! deleted.

use std::collections::{BTreeMap, HashMap};

use statebls_types::{AccountIndex, Record, RecordKey};

#[derive(Debug, Default)]
pub struct ReceiptLedger {
    records: HashMap<RecordKey, Record>,
}

impl ReceiptLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &RecordKey) -> Option<&Record> {
        self.records.get(key)
    }

    /// Record for the ordered pair (`a_index`, `b_index`).
    #[must_use]
    pub fn record(&self, a_index: AccountIndex, b_index: AccountIndex) -> Option<Record> {
        self.records
            .get(&RecordKey::derive(a_index, b_index))
            .copied()
    }

    /// Insert or overwrite staged records.
    pub(crate) fn apply(&mut self, records: BTreeMap<RecordKey, Record>) {
        self.records.extend(records);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_inserts_and_overwrites() {
        let mut ledger = ReceiptLedger::new();
        let key = RecordKey::derive(AccountIndex(1), AccountIndex(2));
        let first = Record {
            amount: 10,
            seq_no: 1,
            fixed_after: 5,
            slashed: false,
        };
        ledger.apply(BTreeMap::from([(key, first)]));
        assert_eq!(ledger.record(AccountIndex(1), AccountIndex(2)), Some(first));

        let second = Record {
            amount: 20,
            seq_no: 2,
            ..first
        };
        ledger.apply(BTreeMap::from([(key, second)]));
        assert_eq!(ledger.get(&key), Some(&second));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn pairs_are_ordered() {
        let mut ledger = ReceiptLedger::new();
        let key = RecordKey::derive(AccountIndex(1), AccountIndex(2));
        ledger.apply(BTreeMap::from([(key, Record::default())]));
        assert!(ledger.record(AccountIndex(2), AccountIndex(1)).is_none());
    }
}
