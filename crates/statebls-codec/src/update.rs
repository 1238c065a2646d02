//! A receipt together with both parties' signatures over it.

use statebls_bls::Signature;
use statebls_types::Receipt;

/// A co-signed receipt. Built off-ledger by the collector, consumed by the
/// codec; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Update {
    pub receipt: Receipt,
    /// The hub's signature over `receipt.signing_bytes()`.
    pub a_signature: Signature,
    /// The counterparty's signature over the same bytes.
    pub b_signature: Signature,
}

/// Test-only constructor that signs with both parties' keys.
#[cfg(any(test, feature = "test-helpers"))]
impl Update {
    #[must_use]
    pub fn sign(
        receipt: Receipt,
        domain: &statebls_bls::BlsDomain,
        a_key: &statebls_bls::SecretKey,
        b_key: &statebls_bls::SecretKey,
    ) -> Self {
        let bytes = receipt.signing_bytes();
        Self {
            receipt,
            a_signature: a_key.sign(domain, &bytes),
            b_signature: b_key.sign(domain, &bytes),
        }
    }
}
