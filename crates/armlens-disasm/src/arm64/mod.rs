//! ARM64 (AArch64) instruction decoder.
//!
//! A64 uses fixed 32-bit little-endian instruction words. Decoding is split
//! into small layers:
//! - [`bits`]: field extraction and sign/zero extension
//! - [`table`]: the declarative decode table mapping words to formats
//! - [`registers`]: raw register fields to canonical registers
//! - [`shape`]: the pending-operand shape derived once per format
//! - [`operands`]: operand construction, eager or deferred
//! - `decoder`: the per-word state machine

pub mod bits;
pub mod format;
mod formats;
pub mod operands;
pub mod registers;
pub mod shape;
pub mod table;

mod decoder;

pub use decoder::{Arm64Disassembler, DecodeContext, DecodeState, OperandMode};
pub use format::{FormatGroup, InstructionFormat};
pub use registers::RegisterMapper;
pub use table::DecodeTable;
