//! Aggregation and batched verification.
//!
//! For obligations `(mᵢ, pkᵢ)` and aggregate `σ = Σ σᵢ` the check is
//!
//! ```text
//! e(−σ, g₂) · Π e(H(mᵢ), pkᵢ) == 1
//! ```
//!
//! evaluated as a single multi-pairing. One bad obligation fails the lot.

use ark_bn254::{Bn254, G1Affine, G1Projective, G2Affine};
use ark_ec::{AffineRepr, CurveGroup, pairing::Pairing};
use ark_ff::{One, Zero};

use crate::{BlsDomain, PublicKey, Signature, hash_to_g1};

/// Sum signatures into one aggregate. The empty sum is the identity.
#[must_use]
pub fn aggregate(signatures: &[Signature]) -> Signature {
    let sum = signatures
        .iter()
        .fold(G1Projective::zero(), |acc, sig| acc + sig.0.into_group());
    Signature(sum.into_affine())
}

/// Verifies signatures under a fixed domain.
#[derive(Debug, Clone, Copy)]
pub struct BlsVerifier {
    domain: BlsDomain,
}

impl BlsVerifier {
    #[must_use]
    pub fn new(domain: BlsDomain) -> Self {
        Self { domain }
    }

    #[must_use]
    pub fn domain(&self) -> &BlsDomain {
        &self.domain
    }

    /// Verify a single signature.
    #[must_use]
    pub fn verify(&self, signature: &Signature, msg: &[u8], public_key: &PublicKey) -> bool {
        self.verify_aggregate(signature, [(msg, public_key)])
    }

    /// Verify that `aggregate` is the sum of one signature per obligation.
    ///
    /// Returns `false` for an empty obligation set.
    pub fn verify_aggregate<'a, M, I>(&self, aggregate: &Signature, obligations: I) -> bool
    where
        M: AsRef<[u8]>,
        I: IntoIterator<Item = (M, &'a PublicKey)>,
    {
        let mut g1: Vec<G1Affine> = vec![-aggregate.0];
        let mut g2: Vec<G2Affine> = vec![G2Affine::generator()];

        for (msg, public_key) in obligations {
            g1.push(hash_to_g1(&self.domain, msg.as_ref()));
            g2.push(public_key.0);
        }

        if g1.len() == 1 {
            tracing::debug!("Aggregate verification called with no obligations");
            return false;
        }

        let ok = Bn254::multi_pairing(g1, g2).0.is_one();
        if !ok {
            tracing::debug!(
                domain = ?self.domain,
                "Aggregate signature rejected"
            );
        }
        ok
    }
}
