//! # armlens-disasm
//!
//! Table-driven AArch64 instruction decoder.
//!
//! ```
//! use armlens_disasm::{Arm64Disassembler, Disassembler, EncodedWord};
//!
//! let disasm = Arm64Disassembler::new();
//! let insn = disasm.decode_word(EncodedWord::from_u32(0xA9BF7BFD, 0x1000));
//! assert_eq!(insn.to_string(), "stp x29, x30, [sp, #-0x10]!");
//! ```

pub mod arm64;
pub mod error;
pub mod instruction;
pub mod traits;
pub mod word;

pub use arm64::{Arm64Disassembler, InstructionFormat, OperandMode};
pub use error::{DecodeError, ErrorKind};
pub use instruction::{DecodedInstruction, InstructionFlags};
pub use traits::{disassembler_for, Disassembler};
pub use word::EncodedWord;
