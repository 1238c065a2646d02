//! The single-record `correctUpdate` payload.

use statebls_bls::Signature;
use statebls_types::{Receipt, Result, StateBlsError, constants};

use crate::reader::Reader;
use crate::{Selector, Update};

/// A decoded `correctUpdate` payload: one fully spelled-out co-signed receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrectionPayload {
    pub update: Update,
}

impl CorrectionPayload {
    #[must_use]
    pub fn new(update: Update) -> Self {
        Self { update }
    }

    /// Encode with the `correctUpdate()` selector.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(constants::CORRECTION_LEN);
        out.extend_from_slice(&Selector::correct_update().0);
        out.extend_from_slice(&self.update.receipt.signing_bytes());
        out.extend_from_slice(&self.update.a_signature.to_bytes());
        out.extend_from_slice(&self.update.b_signature.to_bytes());
        out
    }

    /// Decode a full `correctUpdate` calldata, selector included.
    ///
    /// # Errors
    /// - `MalformedPayload` on wrong selector or length
    /// - `InvalidSignature` if either signature is not a valid G1 point
    pub fn decode(calldata: &[u8]) -> Result<Self> {
        if calldata.len() != constants::CORRECTION_LEN {
            return Err(StateBlsError::malformed(format!(
                "correctUpdate needs {} bytes, got {}",
                constants::CORRECTION_LEN,
                calldata.len()
            )));
        }
        let mut reader = Reader::new(calldata);
        let selector = reader.take(constants::SELECTOR_LEN, "selector")?;
        if selector != Selector::correct_update().0 {
            return Err(StateBlsError::malformed("not a correctUpdate() payload"));
        }
        let receipt = Receipt::from_packed(reader.take(constants::RECEIPT_LEN, "receipt")?)?;
        let a_signature = decode_signature(reader.take(constants::G1_LEN, "aSignature")?)?;
        let b_signature = decode_signature(reader.take(constants::G1_LEN, "bSignature")?)?;
        reader.finish()?;

        Ok(Self {
            update: Update {
                receipt,
                a_signature,
                b_signature,
            },
        })
    }
}

fn decode_signature(bytes: &[u8]) -> Result<Signature> {
    Signature::from_bytes(bytes).map_err(|err| {
        tracing::debug!(error = %err, "Correction signature is not a G1 point");
        StateBlsError::InvalidSignature
    })
}
