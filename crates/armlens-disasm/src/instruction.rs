//! Decoded instruction values.

use std::fmt;

use armlens_core::{Access, AddressingMode, Condition, ControlFlow, ImplicitOperand, Operand, Register};

use crate::arm64::format::InstructionFormat;
use crate::arm64::operands::DeferredOperands;
use crate::error::{DecodeError, ErrorKind};
use crate::word::WORD_SIZE;

/// Per-instruction attribute flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct InstructionFlags {
    /// Operates on scalar floating point values.
    pub fp: bool,
    /// Touches a full 128-bit vector register.
    pub simd: bool,
    /// General-purpose operands are 64-bit (`sf` = 1).
    pub is_64bit: bool,
    /// Reads NZCV.
    pub reads_flags: bool,
    /// Writes NZCV.
    pub writes_flags: bool,
}

/// Operands of a decoded instruction, built or pending.
#[derive(Debug, Clone)]
pub enum OperandList {
    Resolved(Vec<Operand>),
    Deferred(DeferredOperands),
}

impl OperandList {
    fn get(&self) -> &[Operand] {
        match self {
            Self::Resolved(operands) => operands,
            Self::Deferred(deferred) => deferred.get(),
        }
    }
}

/// The result of decoding one instruction word.
///
/// Valid and invalid words share this type: an invalid result has no format,
/// no operands and carries its [`DecodeError`] in `invalid`.
#[derive(Debug, Clone)]
pub struct DecodedInstruction {
    /// Format tag, `None` when no table entry matched.
    pub format: Option<InstructionFormat>,
    /// Base mnemonic (no aliases), `"(bad)"` for invalid words.
    pub mnemonic: &'static str,
    pub(crate) operands: OperandList,
    /// Access of each operand, parallel to the operand list.
    pub(crate) access: Vec<Access>,
    pub(crate) implicit: Vec<ImplicitOperand>,
    /// The raw instruction word.
    pub word: u32,
    /// Load address of the word.
    pub address: u64,
    pub flags: InstructionFlags,
    /// Condition of conditional formats (B.cond, CSEL, CCMP, FCSEL, ...).
    pub condition: Option<Condition>,
    pub control_flow: ControlFlow,
    pub invalid: Option<DecodeError>,
}

impl DecodedInstruction {
    pub(crate) fn invalid(word: u32, address: u64, err: DecodeError) -> Self {
        Self {
            format: None,
            mnemonic: "(bad)",
            operands: OperandList::Resolved(Vec::new()),
            access: Vec::new(),
            implicit: Vec::new(),
            word,
            address,
            flags: InstructionFlags::default(),
            condition: None,
            control_flow: ControlFlow::Sequential,
            invalid: Some(err),
        }
    }

    /// Returns the operands in assembler order, building them if deferred.
    pub fn operands(&self) -> &[Operand] {
        self.operands.get()
    }

    /// Returns how each operand is accessed, in operand order.
    ///
    /// For a memory operand the entry describes the memory access; its base
    /// register is always read and also written when the mode writes back.
    /// Available without building deferred operands.
    pub fn access(&self) -> &[Access] {
        &self.access
    }

    /// Returns the registers touched without appearing as operands
    /// (PC, the link register, NZCV).
    pub fn implicit_operands(&self) -> &[ImplicitOperand] {
        &self.implicit
    }

    /// Returns every register the instruction reads, explicit and implicit.
    /// The zero register is never listed.
    pub fn registers_read(&self) -> Vec<Register> {
        let mut regs = Vec::new();
        for (operand, access) in self.operands().iter().zip(&self.access) {
            match operand {
                Operand::Memory(mem) => {
                    push_unique(&mut regs, mem.base);
                    if let AddressingMode::RegisterOffset { index, .. } = mem.mode {
                        push_unique(&mut regs, index);
                    }
                }
                _ if access.read => {
                    if let Some(reg) = operand.register() {
                        push_unique(&mut regs, *reg);
                    }
                }
                _ => {}
            }
        }
        for implicit in self.implicit.iter().filter(|op| op.access.read) {
            push_unique(&mut regs, implicit.register);
        }
        regs
    }

    /// Returns every register the instruction writes, explicit and implicit.
    /// The zero register is never listed.
    pub fn registers_written(&self) -> Vec<Register> {
        let mut regs = Vec::new();
        for (operand, access) in self.operands().iter().zip(&self.access) {
            match operand {
                Operand::Memory(mem) => {
                    if mem.writeback() {
                        push_unique(&mut regs, mem.base);
                    }
                }
                _ if access.write => {
                    if let Some(reg) = operand.register() {
                        push_unique(&mut regs, *reg);
                    }
                }
                _ => {}
            }
        }
        for implicit in self.implicit.iter().filter(|op| op.access.write) {
            push_unique(&mut regs, implicit.register);
        }
        regs
    }

    pub fn is_valid(&self) -> bool {
        self.invalid.is_none()
    }

    /// Returns the reason code of an invalid result.
    pub fn reason(&self) -> Option<ErrorKind> {
        self.invalid.as_ref().map(DecodeError::kind)
    }

    /// Instruction size in bytes; always one word.
    pub fn size(&self) -> usize {
        WORD_SIZE
    }

    /// Address of the following instruction.
    pub fn end_address(&self) -> u64 {
        self.address.wrapping_add(WORD_SIZE as u64)
    }

    /// Returns true if operand construction was deferred.
    pub fn is_deferred(&self) -> bool {
        matches!(self.operands, OperandList::Deferred(_))
    }

    /// Returns true once the operands exist.
    pub fn is_resolved(&self) -> bool {
        match &self.operands {
            OperandList::Resolved(_) => true,
            OperandList::Deferred(deferred) => deferred.is_resolved(),
        }
    }

    /// Converts an invalid result into its error.
    pub fn into_result(self) -> Result<Self, DecodeError> {
        match self.invalid {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }
}

impl PartialEq for DecodedInstruction {
    fn eq(&self, other: &Self) -> bool {
        self.format == other.format
            && self.mnemonic == other.mnemonic
            && self.word == other.word
            && self.address == other.address
            && self.flags == other.flags
            && self.condition == other.condition
            && self.control_flow == other.control_flow
            && self.invalid == other.invalid
            && self.access == other.access
            && self.implicit == other.implicit
            && self.operands() == other.operands()
    }
}

fn push_unique(regs: &mut Vec<Register>, reg: Register) {
    if !reg.is_zero_register() && !regs.contains(&reg) {
        regs.push(reg);
    }
}

impl fmt::Display for DecodedInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return write!(f, ".inst {:#010x}", self.word);
        }
        write!(f, "{}", self.mnemonic)?;
        for (i, operand) in self.operands().iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{sep}{operand}")?;
        }
        // branch conditions are already part of the mnemonic
        if let (Some(cond), false) = (self.condition, self.mnemonic.starts_with("b.")) {
            write!(f, ", {}", cond.suffix())?;
        }
        Ok(())
    }
}
