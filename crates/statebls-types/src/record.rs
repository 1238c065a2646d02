//! Ledger memory of the latest applied receipt between a pair.

use serde::{Deserialize, Serialize};

/// The ledger's view of the latest applied receipt for one `(a, b)` pair.
///
/// Created on the first posting for a pair and overwritten by later
/// postings and corrections. Never deleted. `slashed` latches per `seq_no`:
/// a correction sets it, and it blocks any further correction at that or an
/// earlier `seq_no`. The next `post` for the pair clears it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Record {
    /// Amount of the latest applied receipt.
    pub amount: u128,
    /// Sequence number of the latest applied receipt.
    pub seq_no: u16,
    /// Withdrawal-unlock timestamp of the settlement that wrote this record.
    pub fixed_after: u64,
    /// Whether a correction has proven hub misbehavior at `seq_no`.
    pub slashed: bool,
}

impl Record {
    /// The sequence number the next `post` for this pair must carry.
    ///
    /// Returns `None` once the 16-bit sequence space is exhausted.
    #[must_use]
    pub fn next_seq_no(&self) -> Option<u16> {
        self.seq_no.checked_add(1)
    }
}
