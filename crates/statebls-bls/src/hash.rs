//! Domain-separated hash-to-G1.
//!
//! Try-and-increment over keccak-256:
//!
//! ```text
//! d  = keccak256(domain ‖ msg)
//! xᵢ = keccak256(d ‖ i as u32 BE) mod p        for i = 0, 1, ...
//! ```
//!
//! The first `xᵢ` for which `xᵢ³ + 3` is a square yields the point
//! `(xᵢ, y)` with `y` the smaller of the two roots. BN254 G1 has cofactor 1,
//! so every curve point is in the prime-order subgroup.

use std::fmt;

use ark_bn254::{Fq, G1Affine};
use ark_ff::{Field, PrimeField};
use sha3::{Digest, Keccak256};

/// BN254 G1 curve constant: `y² = x³ + 3`.
const COEFF_B: u64 = 3;

/// 32-byte domain-separation tag folded into every message hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlsDomain(pub [u8; 32]);

impl BlsDomain {
    /// Domain derived from a human-readable tag: `keccak256(tag)`.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        Self(Keccak256::digest(tag.as_bytes()).into())
    }
}

impl fmt::Debug for BlsDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlsDomain({})", hex::encode(self.0))
    }
}

/// Hash `msg` to a G1 point under `domain`.
#[must_use]
pub fn hash_to_g1(domain: &BlsDomain, msg: &[u8]) -> G1Affine {
    let digest = Keccak256::new()
        .chain_update(domain.0)
        .chain_update(msg)
        .finalize();
    let b = Fq::from(COEFF_B);

    let mut counter: u32 = 0;
    loop {
        let candidate = Keccak256::new()
            .chain_update(digest)
            .chain_update(counter.to_be_bytes())
            .finalize();
        let x = Fq::from_be_bytes_mod_order(&candidate);
        let rhs = x.square() * x + b;
        if let Some(root) = rhs.sqrt() {
            let neg = -root;
            let y = if root.into_bigint() <= neg.into_bigint() {
                root
            } else {
                neg
            };
            return G1Affine::new_unchecked(x, y);
        }
        counter = counter.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain() -> BlsDomain {
        BlsDomain::from_tag("test")
    }

    #[test]
    fn hashed_point_is_on_curve_and_in_subgroup() {
        for msg in [&b""[..], b"a", b"receipt bytes", &[0xFFu8; 38]] {
            let p = hash_to_g1(&domain(), msg);
            assert!(p.is_on_curve());
            assert!(p.is_in_correct_subgroup_assuming_on_curve());
            assert!(!p.infinity);
        }
    }

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(hash_to_g1(&domain(), b"m"), hash_to_g1(&domain(), b"m"));
    }

    #[test]
    fn different_messages_different_points() {
        assert_ne!(hash_to_g1(&domain(), b"m1"), hash_to_g1(&domain(), b"m2"));
    }

    #[test]
    fn domain_separates_hashes() {
        let other = BlsDomain::from_tag("other");
        assert_ne!(hash_to_g1(&domain(), b"m"), hash_to_g1(&other, b"m"));
    }

    #[test]
    fn domain_from_tag_is_keccak() {
        let expected: [u8; 32] = Keccak256::digest(b"test").into();
        assert_eq!(domain().0, expected);
    }
}
