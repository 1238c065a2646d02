//! Identifiers used throughout StateBLS.
//!
//! Accounts are addressed by a compact numeric [`AccountIndex`] assigned at
//! registration. Records are addressed by a [`RecordKey`], the keccak-256
//! hash of the ordered `(aIndex, bIndex)` pair.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use crate::constants;

// ---------------------------------------------------------------------------
// AccountIndex
// ---------------------------------------------------------------------------

/// Compact numeric account identifier. Immutable once assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AccountIndex(pub u64);

impl AccountIndex {
    /// The next index in registration order.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    #[must_use]
    pub fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for AccountIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "acct:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// RecordKey
// ---------------------------------------------------------------------------

/// Composite key of a hub/counterparty pair.
///
/// `keccak256(aIndex ‖ "++" ‖ bIndex)` with both indices as big-endian
/// `u64`. Order-sensitive: `(a, b)` and `(b, a)` are different records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct RecordKey(pub [u8; 32]);

impl RecordKey {
    #[must_use]
    pub fn derive(a_index: AccountIndex, b_index: AccountIndex) -> Self {
        let mut hasher = Keccak256::new();
        hasher.update(a_index.to_be_bytes());
        hasher.update(constants::RECORD_KEY_SEPARATOR);
        hasher.update(b_index.to_be_bytes());
        Self(hasher.finalize().into())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rec:{}", hex::encode(&self.0[..8]))
    }
}
