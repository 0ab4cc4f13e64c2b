//! Shape functions, one per table entry, grouped by encoding group.
//!
//! Each function reads the selector sub-fields of an already classified word,
//! rejects reserved combinations and returns the pending-operand shape. Every
//! rejection from here is `ReservedFieldCombination` (or
//! `UnsupportedRegisterEncoding`): the word already matched a table entry.
//! Instruction groups outside the repertoire that a single mask/value pair
//! can carve out are excluded by the table patterns instead.

pub mod branch;
pub mod data_imm;
pub mod data_reg;
pub mod fp_simd;
pub mod load_store;
