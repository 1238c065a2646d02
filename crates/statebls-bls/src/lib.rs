//! # statebls-bls
//!
//! BLS signatures over the BN254 pairing curve, as used to co-sign
//! settlement receipts.
//!
//! - Public keys live in G2 ([`PublicKey`]), signatures in G1 ([`Signature`]).
//! - Messages are hashed to G1 under a 32-byte [`BlsDomain`], so a signature
//!   made for one settlement system never verifies in another.
//! - [`aggregate`] sums signatures; [`BlsVerifier::verify_aggregate`] checks
//!   an aggregate against every `(message, public key)` obligation with one
//!   multi-pairing. The check is all-or-nothing.
//!
//! Signature *generation* is only available behind the `test-helpers`
//! feature ([`SecretKey`]); production signers live off-ledger.

pub mod hash;
pub mod point;
pub mod verifier;

#[cfg(any(test, feature = "test-helpers"))]
pub mod signer;

pub use hash::{BlsDomain, hash_to_g1};
pub use point::{PublicKey, Signature};
pub use verifier::{BlsVerifier, aggregate};

#[cfg(any(test, feature = "test-helpers"))]
pub use signer::SecretKey;
