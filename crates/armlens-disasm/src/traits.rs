//! Disassembler traits.

use armlens_core::Architecture;
use tracing::debug;

use crate::arm64::format::InstructionFormat;
use crate::arm64::Arm64Disassembler;
use crate::word::{EncodedWord, WORD_SIZE};
use crate::{DecodeError, DecodedInstruction};

/// Capability interface of an instruction decoder.
///
/// Callers select a backend with [`disassembler_for`] and depend only on this
/// trait. Implementations are stateless between calls.
pub trait Disassembler: Send + Sync {
    /// Returns the target architecture.
    fn architecture(&self) -> Architecture;

    /// Identifies the format of a word without building its operands.
    fn classify(&self, word: u32) -> Option<InstructionFormat>;

    /// Decode a single instruction word.
    ///
    /// Never fails: an undecodable word yields an invalid result that keeps
    /// the raw word and address.
    fn decode_word(&self, word: EncodedWord) -> DecodedInstruction;

    /// Builds any deferred operands of `instruction` now.
    fn force_operands(&self, instruction: &DecodedInstruction) {
        let _ = instruction.operands();
    }

    /// Decode the instruction at the start of `bytes`.
    ///
    /// # Arguments
    /// * `bytes` - The raw bytes to decode
    /// * `address` - The virtual address of the first byte
    ///
    /// Fails only with `MalformedInput` when fewer than four bytes remain.
    fn decode_instruction(&self, bytes: &[u8], address: u64) -> Result<DecodedInstruction, DecodeError> {
        EncodedWord::from_slice(bytes, address).map(|word| self.decode_word(word))
    }

    /// Returns the fixed instruction size.
    fn instruction_size(&self) -> usize {
        WORD_SIZE
    }

    /// Disassemble a block of code into instructions.
    ///
    /// Every word yields one result, invalid ones included; a trailing
    /// partial word yields a single `MalformedInput` error.
    fn disassemble_block(&self, bytes: &[u8], start_address: u64) -> Vec<Result<DecodedInstruction, DecodeError>> {
        let mut instructions = Vec::with_capacity(bytes.len() / WORD_SIZE + 1);
        let mut chunks = bytes.chunks_exact(WORD_SIZE);
        let mut address = start_address;

        for chunk in chunks.by_ref() {
            let result = self.decode_instruction(chunk, address);
            if let Ok(insn) = &result {
                if let Some(err) = &insn.invalid {
                    debug!(address, word = insn.word, %err, "skipping invalid word");
                }
            }
            instructions.push(result);
            address = address.wrapping_add(WORD_SIZE as u64);
        }

        let rest = chunks.remainder();
        if !rest.is_empty() {
            debug!(address, available = rest.len(), "trailing partial word");
            instructions.push(Err(DecodeError::malformed(address, WORD_SIZE, rest.len())));
        }

        instructions
    }
}

/// Returns the decoder for `arch`, if one is built in.
pub fn disassembler_for(arch: Architecture) -> Option<Box<dyn Disassembler>> {
    match arch {
        Architecture::Arm64 => Some(Box::new(Arm64Disassembler::new())),
        _ => None,
    }
}
