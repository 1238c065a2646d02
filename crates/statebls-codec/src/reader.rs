//! Bounds-checked big-endian cursor over calldata.

use statebls_types::{Result, StateBlsError};

pub(crate) struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub(crate) fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(StateBlsError::malformed(format!(
                "truncated {what} at offset {}: need {len} bytes, have {}",
                self.pos,
                self.remaining()
            )));
        }
        let out = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    fn take_array<const N: usize>(&mut self, what: &str) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, what)?);
        Ok(out)
    }

    pub(crate) fn u16(&mut self, what: &str) -> Result<u16> {
        self.take_array(what).map(u16::from_be_bytes)
    }

    pub(crate) fn u64(&mut self, what: &str) -> Result<u64> {
        self.take_array(what).map(u64::from_be_bytes)
    }

    pub(crate) fn u128(&mut self, what: &str) -> Result<u128> {
        self.take_array(what).map(u128::from_be_bytes)
    }

    /// Fail unless every byte has been consumed.
    pub(crate) fn finish(&self) -> Result<()> {
        if self.remaining() != 0 {
            return Err(StateBlsError::malformed(format!(
                "{} trailing bytes",
                self.remaining()
            )));
        }
        Ok(())
    }
}
