//! The batched `post` payload.

use statebls_bls::{Signature, aggregate};
use statebls_types::{AccountIndex, Result, StateBlsError, constants};

use crate::reader::Reader;
use crate::{Selector, Update};

/// One `(bIndex, amount)` entry of a `post` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostEntry {
    pub b_index: AccountIndex,
    pub amount: u128,
}

/// A decoded `post` payload: one hub, one aggregate signature, `n` entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostPayload {
    pub a_index: AccountIndex,
    /// Sum of both parties' signatures over every entry's receipt.
    pub aggregate_signature: Signature,
    pub entries: Vec<PostEntry>,
}

impl PostPayload {
    /// Pack co-signed updates the way the off-ledger collector does:
    /// aggregate all `2n` signatures and keep only `(bIndex, amount)`.
    ///
    /// # Errors
    /// `MalformedPayload` if `updates` is empty, exceeds `u16::MAX`, or
    /// names a hub other than `a_index`.
    pub fn from_updates(a_index: AccountIndex, updates: &[Update]) -> Result<Self> {
        if updates.is_empty() {
            return Err(StateBlsError::malformed("post needs at least one update"));
        }
        if u16::try_from(updates.len()).is_err() {
            return Err(StateBlsError::malformed(format!(
                "{} updates exceed the u16 count field",
                updates.len()
            )));
        }
        if let Some(stray) = updates.iter().find(|u| u.receipt.a_index != a_index) {
            return Err(StateBlsError::malformed(format!(
                "update names hub {} but payload hub is {a_index}",
                stray.receipt.a_index
            )));
        }

        let signatures: Vec<Signature> = updates
            .iter()
            .flat_map(|u| [u.a_signature, u.b_signature])
            .collect();

        Ok(Self {
            a_index,
            aggregate_signature: aggregate(&signatures),
            entries: updates
                .iter()
                .map(|u| PostEntry {
                    b_index: u.receipt.b_index,
                    amount: u.receipt.amount,
                })
                .collect(),
        })
    }

    /// Exact encoded length for `count` entries.
    #[must_use]
    pub fn encoded_len(count: usize) -> usize {
        constants::POST_HEADER_LEN + count * constants::POST_ENTRY_LEN
    }

    /// Encode with the `post()` selector.
    ///
    /// # Errors
    /// `MalformedPayload` if there are more than `u16::MAX` entries.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let count = u16::try_from(self.entries.len()).map_err(|_| {
            StateBlsError::malformed(format!(
                "{} entries exceed the u16 count field",
                self.entries.len()
            ))
        })?;

        let mut out = Vec::with_capacity(Self::encoded_len(self.entries.len()));
        out.extend_from_slice(&Selector::post().0);
        out.extend_from_slice(&self.a_index.to_be_bytes());
        out.extend_from_slice(&count.to_be_bytes());
        out.extend_from_slice(&self.aggregate_signature.to_bytes());
        for entry in &self.entries {
            out.extend_from_slice(&entry.b_index.to_be_bytes());
            out.extend_from_slice(&entry.amount.to_be_bytes());
        }
        Ok(out)
    }

    /// Decode a full `post` calldata, selector included.
    ///
    /// Length is checked against `updateCount` before anything else is
    /// interpreted.
    ///
    /// # Errors
    /// - `MalformedPayload` on wrong selector, zero count, or a length that
    ///   does not match `updateCount`
    /// - `InvalidSignature` if the aggregate is not a valid G1 point
    pub fn decode(calldata: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(calldata);
        let selector = reader.take(constants::SELECTOR_LEN, "selector")?;
        if selector != Selector::post().0 {
            return Err(StateBlsError::malformed("not a post() payload"));
        }
        let a_index = AccountIndex(reader.u64("aIndex")?);
        let count = usize::from(reader.u16("updateCount")?);
        if count == 0 {
            return Err(StateBlsError::malformed("updateCount is zero"));
        }

        let expected = Self::encoded_len(count);
        if calldata.len() != expected {
            return Err(StateBlsError::malformed(format!(
                "updateCount {count} needs {expected} bytes, got {}",
                calldata.len()
            )));
        }

        let aggregate_signature =
            Signature::from_bytes(reader.take(constants::G1_LEN, "aggregate signature")?)
                .map_err(|err| {
                    tracing::debug!(error = %err, "Aggregate signature is not a G1 point");
                    StateBlsError::InvalidSignature
                })?;

        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            entries.push(PostEntry {
                b_index: AccountIndex(reader.u64("bIndex")?),
                amount: reader.u128("amount")?,
            });
        }
        reader.finish()?;

        Ok(Self {
            a_index,
            aggregate_signature,
            entries,
        })
    }
}
