//! Raw instruction words.

use crate::DecodeError;

/// Width of one A64 instruction in bytes.
pub const WORD_SIZE: usize = 4;

/// A fixed-width raw instruction plus the address it was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncodedWord {
    bytes: [u8; WORD_SIZE],
    address: u64,
}

impl EncodedWord {
    /// Creates a word from its four bytes in memory order.
    pub fn new(bytes: [u8; WORD_SIZE], address: u64) -> Self {
        Self { bytes, address }
    }

    /// Creates a word from its 32-bit value.
    pub fn from_u32(word: u32, address: u64) -> Self {
        // A64 instruction fetches are always little-endian
        Self::new(word.to_le_bytes(), address)
    }

    /// Takes the first four bytes of `bytes`.
    pub fn from_slice(bytes: &[u8], address: u64) -> Result<Self, DecodeError> {
        match bytes.get(..WORD_SIZE) {
            Some(&[b0, b1, b2, b3]) => Ok(Self::new([b0, b1, b2, b3], address)),
            _ => Err(DecodeError::malformed(address, WORD_SIZE, bytes.len())),
        }
    }

    /// Returns the raw 32-bit instruction value.
    pub fn value(&self) -> u32 {
        u32::from_le_bytes(self.bytes)
    }

    /// Returns the bytes in memory order.
    pub fn bytes(&self) -> [u8; WORD_SIZE] {
        self.bytes
    }

    /// Returns the load address.
    pub fn address(&self) -> u64 {
        self.address
    }
}
