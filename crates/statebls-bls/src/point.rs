//! Byte encoding of BN254 points.
//!
//! All field elements are 32-byte big-endian integers that must be
//! strictly below the base-field modulus.
//!
//! - G1 ([`Signature`]): `x ‖ y`, 64 bytes.
//! - G2 ([`PublicKey`]): `x.c1 ‖ x.c0 ‖ y.c1 ‖ y.c0`, 128 bytes.
//!
//! The all-zero encoding is the point at infinity.

use std::fmt;

use ark_bn254::{Fq, Fq2, G1Affine, G2Affine};
use ark_ec::AffineRepr;
use ark_ff::{BigInteger, BigInteger256, PrimeField};
use statebls_types::{Result, StateBlsError, constants};

const FQ_LEN: usize = 32;

fn invalid(reason: impl Into<String>) -> StateBlsError {
    StateBlsError::InvalidPoint {
        reason: reason.into(),
    }
}

/// Parse one canonical big-endian base-field element.
fn fq_from_be(bytes: &[u8]) -> Result<Fq> {
    if bytes.len() != FQ_LEN {
        return Err(invalid(format!("field element must be {FQ_LEN} bytes")));
    }
    let mut limbs = [0u64; 4];
    for (limb, chunk) in limbs.iter_mut().zip(bytes.chunks_exact(8).rev()) {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(chunk);
        *limb = u64::from_be_bytes(buf);
    }
    Fq::from_bigint(BigInteger256::new(limbs))
        .ok_or_else(|| invalid("field element not below modulus"))
}

fn fq_to_be(value: &Fq, out: &mut [u8]) {
    let bytes = value.into_bigint().to_bytes_be();
    out.copy_from_slice(&bytes);
}

// ---------------------------------------------------------------------------
// Signature (G1)
// ---------------------------------------------------------------------------

/// A BLS signature, individual or aggregated: a point in G1.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub G1Affine);

impl Signature {
    /// The identity element; the aggregate of no signatures.
    #[must_use]
    pub fn identity() -> Self {
        Self(G1Affine::zero())
    }

    /// Decode a 64-byte G1 point.
    ///
    /// # Errors
    /// `InvalidPoint` on wrong length, non-canonical coordinates, or a
    /// point off the curve.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != constants::G1_LEN {
            return Err(invalid(format!(
                "G1 point must be {} bytes, got {}",
                constants::G1_LEN,
                bytes.len()
            )));
        }
        if bytes.iter().all(|b| *b == 0) {
            return Ok(Self::identity());
        }
        let x = fq_from_be(&bytes[..FQ_LEN])?;
        let y = fq_from_be(&bytes[FQ_LEN..])?;
        let point = G1Affine::new_unchecked(x, y);
        if !point.is_on_curve() {
            return Err(invalid("G1 point not on curve"));
        }
        if !point.is_in_correct_subgroup_assuming_on_curve() {
            return Err(invalid("G1 point not in prime-order subgroup"));
        }
        Ok(Self(point))
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; constants::G1_LEN] {
        let mut out = [0u8; constants::G1_LEN];
        if self.0.infinity {
            return out;
        }
        fq_to_be(&self.0.x, &mut out[..FQ_LEN]);
        fq_to_be(&self.0.y, &mut out[FQ_LEN..]);
        out
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", hex::encode(&self.to_bytes()[..8]))
    }
}

// ---------------------------------------------------------------------------
// PublicKey (G2)
// ---------------------------------------------------------------------------

/// A BLS public key: a point in G2.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(pub G2Affine);

impl PublicKey {
    /// Decode a 128-byte G2 point.
    ///
    /// The identity is rejected: every message would verify under it.
    ///
    /// # Errors
    /// `InvalidPoint` on wrong length, non-canonical coordinates, identity,
    /// a point off the curve, or outside the prime-order subgroup.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != constants::G2_LEN {
            return Err(invalid(format!(
                "G2 point must be {} bytes, got {}",
                constants::G2_LEN,
                bytes.len()
            )));
        }
        if bytes.iter().all(|b| *b == 0) {
            return Err(invalid("public key is the identity"));
        }
        let x = Fq2::new(fq_from_be(&bytes[32..64])?, fq_from_be(&bytes[0..32])?);
        let y = Fq2::new(fq_from_be(&bytes[96..128])?, fq_from_be(&bytes[64..96])?);
        let point = G2Affine::new_unchecked(x, y);
        if !point.is_on_curve() {
            return Err(invalid("G2 point not on curve"));
        }
        if !point.is_in_correct_subgroup_assuming_on_curve() {
            return Err(invalid("G2 point not in prime-order subgroup"));
        }
        Ok(Self(point))
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; constants::G2_LEN] {
        let mut out = [0u8; constants::G2_LEN];
        if self.0.infinity {
            return out;
        }
        fq_to_be(&self.0.x.c1, &mut out[0..32]);
        fq_to_be(&self.0.x.c0, &mut out[32..64]);
        fq_to_be(&self.0.y.c1, &mut out[64..96]);
        fq_to_be(&self.0.y.c0, &mut out[96..128]);
        out
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(&self.to_bytes()[..8]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BlsDomain, SecretKey, hash_to_g1};

    #[test]
    fn g1_bytes_roundtrip() {
        let sig = Signature(hash_to_g1(&BlsDomain::from_tag("t"), b"m"));
        assert_eq!(Signature::from_bytes(&sig.to_bytes()).unwrap(), sig);
    }

    #[test]
    fn g1_identity_encodes_as_zeros() {
        let bytes = Signature::identity().to_bytes();
        assert!(bytes.iter().all(|b| *b == 0));
        assert_eq!(Signature::from_bytes(&bytes).unwrap(), Signature::identity());
    }

    #[test]
    fn g1_off_curve_rejected() {
        let mut bytes = [0u8; 64];
        bytes[31] = 1; // x = 1
        bytes[63] = 1; // y = 1, and 1 != 1 + 3
        let err = Signature::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, StateBlsError::InvalidPoint { .. }));
    }

    #[test]
    fn g1_non_canonical_rejected() {
        let err = Signature::from_bytes(&[0xFFu8; 64]).unwrap_err();
        assert!(matches!(err, StateBlsError::InvalidPoint { .. }));
    }

    #[test]
    fn g1_wrong_length_rejected() {
        assert!(Signature::from_bytes(&[0u8; 63]).is_err());
    }

    #[test]
    fn g2_bytes_roundtrip() {
        let pk = SecretKey::from_seed(42).public_key();
        assert_eq!(PublicKey::from_bytes(&pk.to_bytes()).unwrap(), pk);
    }

    #[test]
    fn g2_generator_matches_eip197_layout() {
        let g = PublicKey(G2Affine::generator()).to_bytes();
        // x.c1 of the BN254 G2 generator starts 0x198e9393...
        assert_eq!(&g[0..4], &[0x19, 0x8e, 0x93, 0x93]);
        // x.c0 starts 0x1800deef...
        assert_eq!(&g[32..36], &[0x18, 0x00, 0xde, 0xef]);
    }

    #[test]
    fn g2_identity_rejected() {
        let err = PublicKey::from_bytes(&[0u8; 128]).unwrap_err();
        assert!(matches!(err, StateBlsError::InvalidPoint { .. }));
    }

    #[test]
    fn g2_tampered_rejected() {
        let mut bytes = SecretKey::from_seed(7).public_key().to_bytes();
        bytes[127] ^= 0x01;
        assert!(PublicKey::from_bytes(&bytes).is_err());
    }
}
