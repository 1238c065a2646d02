//! BLS signing for tests and tooling. **Never use in production.**
//!
//! Keys here are derived from small seeds or a non-hardened RNG; real
//! participants sign off-ledger with their own key management.

use ark_bn254::{Fr, G2Affine};
use ark_ec::{AffineRepr, CurveGroup};
use ark_std::UniformRand;

use crate::{BlsDomain, PublicKey, Signature, hash_to_g1};

/// A BLS secret scalar.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SecretKey(pub Fr);

impl SecretKey {
    /// Deterministic key from a seed. Seed zero maps to one so the public
    /// key is never the identity.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self(Fr::from(seed.max(1)))
    }

    /// Fresh random key.
    #[must_use]
    pub fn generate<R: rand::RngCore>(rng: &mut R) -> Self {
        Self(Fr::rand(rng))
    }

    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        PublicKey((G2Affine::generator() * self.0).into_affine())
    }

    /// `σ = sk · H(domain, msg)`.
    #[must_use]
    pub fn sign(&self, domain: &BlsDomain, msg: &[u8]) -> Signature {
        Signature((hash_to_g1(domain, msg) * self.0).into_affine())
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretKey(..)")
    }
}
