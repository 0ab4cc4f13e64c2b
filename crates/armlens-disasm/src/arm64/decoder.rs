//! ARM64 decode orchestration.
//!
//! A word moves through `Idle -> OpcodeIdentified -> OperandsPending` and
//! ends in either `OperandsResolved` or `Invalid`. A word no table entry
//! matches is rejected from `Idle`; every other rejection comes from the
//! sub-decode run in `OperandsPending`. Every call builds a fresh
//! [`DecodeContext`]; the disassembler itself holds only configuration.

use armlens_core::{Architecture, ControlFlow};
use tracing::trace;

use super::bits::FieldSpec;
use super::format::InstructionFormat;
use super::operands::{build_operands, pc_relative, DeferredOperands};
use super::registers::UnsupportedRegister;
use super::shape::{BranchKind, OperandShape};
use super::table::{DecodeTable, FormatEntry};
use crate::instruction::{DecodedInstruction, OperandList};
use crate::word::{EncodedWord, WORD_SIZE};
use crate::{DecodeError, Disassembler};

/// Per-call scratch state: the raw word and where it was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeContext {
    word: u32,
    address: u64,
}

impl DecodeContext {
    pub fn new(word: u32, address: u64) -> Self {
        Self { word, address }
    }

    pub fn word(&self) -> u32 {
        self.word
    }

    pub fn address(&self) -> u64 {
        self.address
    }

    /// Extracts `field` from the word.
    #[inline]
    pub fn field(&self, field: FieldSpec) -> u32 {
        field.extract(self.word)
    }

    /// Tests a single-bit field.
    #[inline]
    pub fn bit(&self, field: FieldSpec) -> bool {
        field.extract(self.word) != 0
    }

    /// Rejects the word: a selector field holds an unallocated value.
    pub fn reserved(&self, reason: &'static str) -> DecodeError {
        DecodeError::reserved(self.address, self.word, reason)
    }

    /// Rejects the word: no table entry matches it.
    pub fn unknown(&self) -> DecodeError {
        DecodeError::unknown_encoding(self.address, self.word)
    }

    /// Rejects the word: a register field combination is undefined.
    pub fn register_error(&self, err: UnsupportedRegister) -> DecodeError {
        DecodeError::unsupported_register(self.address, self.word, err.0)
    }
}

/// When operands are built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OperandMode {
    /// Operands are built during decode.
    #[default]
    Eager,
    /// Operands are built on first access to [`DecodedInstruction::operands`].
    Deferred,
}

/// Decoder state for one word.
#[derive(Debug)]
pub enum DecodeState {
    Idle,
    OpcodeIdentified(&'static FormatEntry),
    /// The format is known; `sub_fields` holds the bits its pattern leaves
    /// open, which select the operand shape.
    OperandsPending {
        entry: &'static FormatEntry,
        sub_fields: u32,
    },
    OperandsResolved {
        format: InstructionFormat,
        shape: OperandShape,
        operands: OperandList,
    },
    Invalid(DecodeError),
}

impl DecodeState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::OperandsResolved { .. } | Self::Invalid(_))
    }

    /// Performs one transition. Terminal states are returned unchanged.
    pub fn step(self, ctx: &DecodeContext, table: &DecodeTable, mode: OperandMode) -> Self {
        match self {
            Self::Idle => match table.lookup(ctx.word()) {
                Some(entry) => Self::OpcodeIdentified(entry),
                None => {
                    trace!(address = ctx.address(), word = ctx.word(), "no table entry matches");
                    Self::Invalid(ctx.unknown())
                }
            },
            Self::OpcodeIdentified(entry) => Self::OperandsPending {
                entry,
                sub_fields: ctx.word() & !entry.mask(),
            },
            Self::OperandsPending { entry, sub_fields } => {
                let shape = match (entry.shape)(ctx) {
                    Ok(shape) => shape,
                    Err(err) => {
                        trace!(
                            address = ctx.address(),
                            word = ctx.word(),
                            format = ?entry.format,
                            sub_fields,
                            %err,
                            "rejected"
                        );
                        return Self::Invalid(err);
                    }
                };
                debug_assert!(
                    entry.format.operand_range().contains(&shape.slots.len()),
                    "{:?} shape has {} operands",
                    entry.format,
                    shape.slots.len()
                );
                let operands = match mode {
                    OperandMode::Eager => {
                        OperandList::Resolved(build_operands(ctx.word(), ctx.address(), &shape.slots))
                    }
                    OperandMode::Deferred => OperandList::Deferred(DeferredOperands::new(
                        ctx.word(),
                        ctx.address(),
                        shape.slots.clone(),
                    )),
                };
                Self::OperandsResolved {
                    format: entry.format,
                    shape,
                    operands,
                }
            }
            terminal => terminal,
        }
    }
}

/// ARM64 disassembler.
///
/// Holds only configuration, so one instance may decode from many threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Arm64Disassembler {
    mode: OperandMode,
}

impl Arm64Disassembler {
    /// Creates a new ARM64 disassembler building operands eagerly.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets when operands are built.
    pub fn with_operand_mode(mut self, mode: OperandMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn operand_mode(&self) -> OperandMode {
        self.mode
    }

    /// Runs the state machine over one word.
    pub fn run(&self, ctx: &DecodeContext) -> DecodeState {
        let table = DecodeTable::get();
        let mut state = DecodeState::Idle;
        while !state.is_terminal() {
            state = state.step(ctx, table, self.mode);
        }
        state
    }

    /// Decodes a raw 32-bit instruction value.
    pub fn decode_u32(&self, word: u32, address: u64) -> DecodedInstruction {
        self.decode_word(EncodedWord::from_u32(word, address))
    }
}

/// Resolves the branch behaviour of a valid instruction.
fn control_flow(ctx: &DecodeContext, shape: &OperandShape) -> ControlFlow {
    let next = ctx.address().wrapping_add(WORD_SIZE as u64);
    let target = |kind| pc_relative(ctx.word(), ctx.address(), kind).1;
    match shape.branch {
        BranchKind::None => ControlFlow::Sequential,
        BranchKind::Jump(kind) => ControlFlow::UnconditionalBranch {
            target: target(kind),
        },
        BranchKind::Call(kind) => ControlFlow::Call {
            target: target(kind),
            return_addr: next,
        },
        BranchKind::Conditional(kind) => ControlFlow::ConditionalBranch {
            target: target(kind),
            condition: shape.condition,
            fallthrough: next,
        },
        BranchKind::IndirectJump => ControlFlow::IndirectBranch,
        BranchKind::IndirectCall => ControlFlow::IndirectCall { return_addr: next },
        BranchKind::Return => ControlFlow::Return,
        BranchKind::Exception => ControlFlow::Syscall,
        BranchKind::Halt => ControlFlow::Halt,
    }
}

impl Disassembler for Arm64Disassembler {
    fn architecture(&self) -> Architecture {
        Architecture::Arm64
    }

    fn classify(&self, word: u32) -> Option<InstructionFormat> {
        DecodeTable::get().classify(word)
    }

    fn decode_word(&self, word: EncodedWord) -> DecodedInstruction {
        let ctx = DecodeContext::new(word.value(), word.address());
        match self.run(&ctx) {
            DecodeState::OperandsResolved {
                format,
                shape,
                operands,
            } => DecodedInstruction {
                format: Some(format),
                mnemonic: shape.mnemonic,
                operands,
                access: shape.access.clone(),
                implicit: shape.implicit_operands(),
                word: ctx.word(),
                address: ctx.address(),
                flags: shape.flags,
                condition: shape.condition,
                control_flow: control_flow(&ctx, &shape),
                invalid: None,
            },
            DecodeState::Invalid(err) => DecodedInstruction::invalid(ctx.word(), ctx.address(), err),
            // run() only returns terminal states
            _ => DecodedInstruction::invalid(ctx.word(), ctx.address(), ctx.unknown()),
        }
    }
}
