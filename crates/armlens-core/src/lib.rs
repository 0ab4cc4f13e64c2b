//! # armlens-core
//!
//! Core value types for the armlens decoder. This crate defines
//! architecture-agnostic types for registers, operands, memory references,
//! condition codes and per-instruction control flow.

pub mod arch;
pub mod instruction;
pub mod operand;
pub mod register;

pub use arch::Architecture;
pub use instruction::{Condition, ControlFlow};
pub use operand::{
    Access, AddressingMode, Extend, Immediate, ImplicitOperand, MemoryRef, Operand, PairIndexing, Shift,
};
pub use register::{Register, RegisterClass, VectorArrangement};
