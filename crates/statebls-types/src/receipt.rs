//! Bilateral receipts between the hub and a counterparty.
//!
//! A [`Receipt`] states that `b` owes `a` `amount` as of `seq_no`, valid
//! until the cycle boundary `expires_by`. Both parties BLS-sign the same
//! packed bytes; the receipt itself is never stored on the ledger.

use serde::{Deserialize, Serialize};

use crate::{AccountIndex, RecordKey, Result, StateBlsError, constants};

/// An off-chain agreed claim that `b` owes `a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Receipt {
    /// The hub (creditor).
    pub a_index: AccountIndex,
    /// The counterparty (debtor).
    pub b_index: AccountIndex,
    /// Amount owed as of `seq_no`.
    pub amount: u128,
    /// Cycle boundary this receipt is valid until.
    pub expires_by: u32,
    /// Per-pair sequence number.
    pub seq_no: u16,
}

impl Receipt {
    /// Canonical signing bytes: tightly packed big-endian
    /// `aIndex u64 ‖ bIndex u64 ‖ amount u128 ‖ expiresBy u32 ‖ seqNo u16`.
    #[must_use]
    pub fn signing_bytes(&self) -> [u8; constants::RECEIPT_LEN] {
        let mut out = [0u8; constants::RECEIPT_LEN];
        out[0..8].copy_from_slice(&self.a_index.0.to_be_bytes());
        out[8..16].copy_from_slice(&self.b_index.0.to_be_bytes());
        out[16..32].copy_from_slice(&self.amount.to_be_bytes());
        out[32..36].copy_from_slice(&self.expires_by.to_be_bytes());
        out[36..38].copy_from_slice(&self.seq_no.to_be_bytes());
        out
    }

    /// Parse the packed form produced by [`Receipt::signing_bytes`].
    ///
    /// # Errors
    /// Returns `MalformedPayload` if `bytes` is not exactly
    /// [`constants::RECEIPT_LEN`] long.
    pub fn from_packed(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != constants::RECEIPT_LEN {
            return Err(StateBlsError::malformed(format!(
                "receipt must be {} bytes, got {}",
                constants::RECEIPT_LEN,
                bytes.len()
            )));
        }
        let u64_at = |at: usize| {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(&bytes[at..at + 8]);
            u64::from_be_bytes(buf)
        };
        let mut amount = [0u8; 16];
        amount.copy_from_slice(&bytes[16..32]);
        let mut expires_by = [0u8; 4];
        expires_by.copy_from_slice(&bytes[32..36]);
        let mut seq_no = [0u8; 2];
        seq_no.copy_from_slice(&bytes[36..38]);

        Ok(Self {
            a_index: AccountIndex(u64_at(0)),
            b_index: AccountIndex(u64_at(8)),
            amount: u128::from_be_bytes(amount),
            expires_by: u32::from_be_bytes(expires_by),
            seq_no: u16::from_be_bytes(seq_no),
        })
    }

    /// The ledger record this receipt settles into.
    #[must_use]
    pub fn record_key(&self) -> RecordKey {
        RecordKey::derive(self.a_index, self.b_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Receipt {
        Receipt {
            a_index: AccountIndex(1),
            b_index: AccountIndex(0x0102_0304_0506_0708),
            amount: 1000,
            expires_by: 0xAABB_CCDD,
            seq_no: 0x0102,
        }
    }

    #[test]
    fn signing_bytes_layout() {
        let bytes = sample().signing_bytes();
        assert_eq!(bytes.len(), 38);
        assert_eq!(&bytes[0..8], &[0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(&bytes[8..16], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(bytes[30], 0x03);
        assert_eq!(bytes[31], 0xE8);
        assert_eq!(&bytes[32..36], &[0xAA, 0xBB, 0xCC, 0xDD]);
        assert_eq!(&bytes[36..38], &[0x01, 0x02]);
    }

    #[test]
    fn packed_parse_restores_fields() {
        let r = sample();
        assert_eq!(Receipt::from_packed(&r.signing_bytes()).unwrap(), r);
    }

    #[test]
    fn packed_parse_rejects_wrong_length() {
        let err = Receipt::from_packed(&[0u8; 37]).unwrap_err();
        assert!(matches!(err, StateBlsError::MalformedPayload { .. }));
    }

    #[test]
    fn different_seq_changes_signing_bytes() {
        let r1 = sample();
        let mut r2 = sample();
        r2.seq_no += 1;
        assert_ne!(r1.signing_bytes(), r2.signing_bytes());
    }

    #[test]
    fn record_key_uses_pair() {
        let r = sample();
        assert_eq!(r.record_key(), RecordKey::derive(r.a_index, r.b_index));
    }
}
