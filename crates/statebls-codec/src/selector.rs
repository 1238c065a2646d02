//! 4-byte function selectors: the first four bytes of
//! `keccak256(signature)`.

use std::fmt;

use sha3::{Digest, Keccak256};
use statebls_types::constants;

/// Canonical signature of the batched settlement entry point.
pub const POST_SIGNATURE: &str = "post()";

/// Canonical signature of the single-record correction entry point.
pub const CORRECT_UPDATE_SIGNATURE: &str = "correctUpdate()";

/// A 4-byte function selector.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selector(pub [u8; constants::SELECTOR_LEN]);

impl Selector {
    #[must_use]
    pub fn from_signature(signature: &str) -> Self {
        let digest = Keccak256::digest(signature.as_bytes());
        let mut out = [0u8; constants::SELECTOR_LEN];
        out.copy_from_slice(&digest[..constants::SELECTOR_LEN]);
        Self(out)
    }

    #[must_use]
    pub fn post() -> Self {
        Self::from_signature(POST_SIGNATURE)
    }

    #[must_use]
    pub fn correct_update() -> Self {
        Self::from_signature(CORRECT_UPDATE_SIGNATURE)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Selector({self})")
    }
}
