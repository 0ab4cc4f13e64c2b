//! Decode error types.

use thiserror::Error;

/// Error type for instruction decoding.
///
/// Every variant is data-dependent and recoverable: the decoder reports it on
/// the returned [`DecodedInstruction`](crate::DecodedInstruction) so that a
/// scan over mixed code and data can skip the word and continue.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// No decode table entry matches the word.
    #[error("unknown encoding {word:#010x} at {address:#x}")]
    UnknownEncoding { address: u64, word: u32 },

    /// A format matched but one of its sub-fields holds an undefined value.
    #[error("reserved field combination in {word:#010x} at {address:#x}: {reason}")]
    ReservedFieldCombination {
        address: u64,
        word: u32,
        reason: &'static str,
    },

    /// Register width/class/element-width combination is not defined.
    #[error("unsupported register encoding in {word:#010x} at {address:#x}: {reason}")]
    UnsupportedRegisterEncoding {
        address: u64,
        word: u32,
        reason: &'static str,
    },

    /// Input buffer is shorter than one instruction word.
    #[error("malformed input at {address:#x}: need {needed} bytes, have {available}")]
    MalformedInput {
        address: u64,
        needed: usize,
        available: usize,
    },
}

/// Reason code carried by an invalid decode result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnknownEncoding,
    ReservedFieldCombination,
    UnsupportedRegisterEncoding,
    MalformedInput,
}

impl DecodeError {
    /// Creates a new UnknownEncoding error.
    pub fn unknown_encoding(address: u64, word: u32) -> Self {
        Self::UnknownEncoding { address, word }
    }

    /// Creates a new ReservedFieldCombination error.
    pub fn reserved(address: u64, word: u32, reason: &'static str) -> Self {
        Self::ReservedFieldCombination {
            address,
            word,
            reason,
        }
    }

    /// Creates a new UnsupportedRegisterEncoding error.
    pub fn unsupported_register(address: u64, word: u32, reason: &'static str) -> Self {
        Self::UnsupportedRegisterEncoding {
            address,
            word,
            reason,
        }
    }

    /// Creates a new MalformedInput error.
    pub fn malformed(address: u64, needed: usize, available: usize) -> Self {
        Self::MalformedInput {
            address,
            needed,
            available,
        }
    }

    /// Returns the reason code.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownEncoding { .. } => ErrorKind::UnknownEncoding,
            Self::ReservedFieldCombination { .. } => ErrorKind::ReservedFieldCombination,
            Self::UnsupportedRegisterEncoding { .. } => ErrorKind::UnsupportedRegisterEncoding,
            Self::MalformedInput { .. } => ErrorKind::MalformedInput,
        }
    }

    /// Returns the address of the offending word.
    pub fn address(&self) -> u64 {
        match self {
            Self::UnknownEncoding { address, .. }
            | Self::ReservedFieldCombination { address, .. }
            | Self::UnsupportedRegisterEncoding { address, .. }
            | Self::MalformedInput { address, .. } => *address,
        }
    }
}
