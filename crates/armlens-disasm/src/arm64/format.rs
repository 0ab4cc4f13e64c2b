//! A64 instruction format tags.

use std::ops::RangeInclusive;

/// Encoding group a format belongs to (the A64 top-level `op0` split).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatGroup {
    Reserved,
    DataProcessingImmediate,
    BranchExceptionSystem,
    LoadStore,
    DataProcessingRegister,
    FloatingPoint,
    Simd,
}

/// Mutually distinguishable A64 opcode categories.
///
/// Each tag owns one entry of the decode table. The tag together with the
/// sub-fields its pattern leaves open determines the operands: most tags fix
/// the count, the rest vary it within [`InstructionFormat::operand_range`]
/// (`stxr` carries a status register that `ldaxr` lacks, `ret` names a
/// register that `eret` does not).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionFormat {
    PermanentlyUndefined,

    // Data processing - immediate
    PcRelativeAddressing,
    AddSubImmediate,
    LogicalImmediate,
    MoveWide,
    Bitfield,
    Extract,

    // Branches, exception generating and system instructions
    UnconditionalBranchImmediate,
    CompareAndBranch,
    TestAndBranch,
    ConditionalBranch,
    UnconditionalBranchRegister,
    ExceptionGeneration,
    Hint,
    Barrier,
    PstateImmediate,
    SystemInstruction,
    SystemRegisterMove,

    // Loads and stores
    LoadStoreExclusive,
    LoadStoreExclusivePair,
    LoadLiteral,
    LoadStorePairNonTemporal,
    LoadStorePairPostIndex,
    LoadStorePairOffset,
    LoadStorePairPreIndex,
    LoadStoreUnscaled,
    LoadStorePostIndex,
    LoadStoreUnprivileged,
    LoadStorePreIndex,
    LoadStoreRegisterOffset,
    LoadStoreUnsignedImmediate,

    // Data processing - register
    LogicalShiftedRegister,
    AddSubShiftedRegister,
    AddSubExtendedRegister,
    AddSubWithCarry,
    ConditionalCompare,
    ConditionalSelect,
    DataProcessing1Source,
    DataProcessing2Source,
    DataProcessing3Source,

    // Scalar floating point
    FpCompare,
    FpDataProcessing1Source,
    FpDataProcessing2Source,
    FpDataProcessing3Source,
    FpImmediate,
    FpConditionalCompare,
    FpConditionalSelect,
    FpIntegerConversion,
    FpFixedPointConversion,

    // Advanced SIMD
    SimdThreeSame,
    SimdTwoRegisterMisc,
}

impl InstructionFormat {
    /// Returns the encoding group this format belongs to.
    pub fn group(&self) -> FormatGroup {
        use InstructionFormat::*;
        match self {
            PermanentlyUndefined => FormatGroup::Reserved,
            PcRelativeAddressing | AddSubImmediate | LogicalImmediate | MoveWide | Bitfield
            | Extract => FormatGroup::DataProcessingImmediate,
            UnconditionalBranchImmediate
            | CompareAndBranch
            | TestAndBranch
            | ConditionalBranch
            | UnconditionalBranchRegister
            | ExceptionGeneration
            | Hint
            | Barrier
            | PstateImmediate
            | SystemInstruction
            | SystemRegisterMove => FormatGroup::BranchExceptionSystem,
            LoadStoreExclusive
            | LoadStoreExclusivePair
            | LoadLiteral
            | LoadStorePairNonTemporal
            | LoadStorePairPostIndex
            | LoadStorePairOffset
            | LoadStorePairPreIndex
            | LoadStoreUnscaled
            | LoadStorePostIndex
            | LoadStoreUnprivileged
            | LoadStorePreIndex
            | LoadStoreRegisterOffset
            | LoadStoreUnsignedImmediate => FormatGroup::LoadStore,
            LogicalShiftedRegister
            | AddSubShiftedRegister
            | AddSubExtendedRegister
            | AddSubWithCarry
            | ConditionalCompare
            | ConditionalSelect
            | DataProcessing1Source
            | DataProcessing2Source
            | DataProcessing3Source => FormatGroup::DataProcessingRegister,
            FpCompare
            | FpDataProcessing1Source
            | FpDataProcessing2Source
            | FpDataProcessing3Source
            | FpImmediate
            | FpConditionalCompare
            | FpConditionalSelect
            | FpIntegerConversion
            | FpFixedPointConversion => FormatGroup::FloatingPoint,
            SimdThreeSame | SimdTwoRegisterMisc => FormatGroup::Simd,
        }
    }

    /// Returns how many operands a valid instruction of this format carries.
    pub fn operand_range(&self) -> RangeInclusive<usize> {
        use InstructionFormat::*;
        match self {
            UnconditionalBranchRegister | Hint | Barrier => 0..=1,
            PstateImmediate => 0..=2,
            PermanentlyUndefined
            | UnconditionalBranchImmediate
            | ConditionalBranch
            | ExceptionGeneration => 1..=1,
            PcRelativeAddressing
            | CompareAndBranch
            | SystemRegisterMove
            | LoadLiteral
            | LoadStoreUnscaled
            | LoadStorePostIndex
            | LoadStoreUnprivileged
            | LoadStorePreIndex
            | LoadStoreRegisterOffset
            | LoadStoreUnsignedImmediate
            | DataProcessing1Source
            | FpCompare
            | FpDataProcessing1Source
            | FpImmediate
            | FpIntegerConversion => 2..=2,
            LoadStoreExclusive | SimdTwoRegisterMisc => 2..=3,
            AddSubImmediate
            | LogicalImmediate
            | MoveWide
            | TestAndBranch
            | LoadStorePairNonTemporal
            | LoadStorePairPostIndex
            | LoadStorePairOffset
            | LoadStorePairPreIndex
            | LogicalShiftedRegister
            | AddSubShiftedRegister
            | AddSubExtendedRegister
            | AddSubWithCarry
            | ConditionalCompare
            | ConditionalSelect
            | DataProcessing2Source
            | FpDataProcessing2Source
            | FpConditionalCompare
            | FpConditionalSelect
            | FpFixedPointConversion
            | SimdThreeSame => 3..=3,
            LoadStoreExclusivePair | DataProcessing3Source => 3..=4,
            Bitfield | Extract | FpDataProcessing3Source => 4..=4,
            SystemInstruction => 5..=5,
        }
    }

    /// Returns true for the branch formats (immediate and register).
    pub fn is_branch(&self) -> bool {
        matches!(
            self,
            Self::UnconditionalBranchImmediate
                | Self::CompareAndBranch
                | Self::TestAndBranch
                | Self::ConditionalBranch
                | Self::UnconditionalBranchRegister
        )
    }

    /// Returns true for the load/store formats.
    pub fn is_load_store(&self) -> bool {
        self.group() == FormatGroup::LoadStore
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arm64::Arm64Disassembler;

    #[test]
    fn test_operand_range_covers_examples() {
        let disasm = Arm64Disassembler::new();
        let cases: &[(u32, InstructionFormat, usize)] = &[
            (0xD503201F, InstructionFormat::Hint, 0),            // nop
            (0xD503231F, InstructionFormat::Hint, 1),            // hint #0x18
            (0xD69F03E0, InstructionFormat::UnconditionalBranchRegister, 0), // eret
            (0xD65F03C0, InstructionFormat::UnconditionalBranchRegister, 1), // ret
            (0xD50330FF, InstructionFormat::Barrier, 0),         // sb
            (0xD5033BBF, InstructionFormat::Barrier, 1),         // dmb ish
            (0xD500401F, InstructionFormat::PstateImmediate, 0), // cfinv
            (0xD50343DF, InstructionFormat::PstateImmediate, 2), // msr daifset, #3
            (0xC8027C20, InstructionFormat::LoadStoreExclusive, 3), // stxr w2, x0, [x1]
            (0xC85FFC20, InstructionFormat::LoadStoreExclusive, 2), // ldaxr x0, [x1]
            (0xC87F0440, InstructionFormat::LoadStoreExclusivePair, 3), // ldxp x0, x1, [x2]
            (0xC8230440, InstructionFormat::LoadStoreExclusivePair, 4), // stxp w3, x0, x1, [x2]
            (0x9B037C41, InstructionFormat::DataProcessing3Source, 4), // madd x1, x2, x3, xzr
            (0x9B437C41, InstructionFormat::DataProcessing3Source, 3), // smulh x1, x2, x3
            (0xD5380000, InstructionFormat::SystemRegisterMove, 2), // mrs x0, midr_el1
        ];
        for &(word, format, count) in cases {
            let decoded = disasm.decode_u32(word, 0);
            assert_eq!(decoded.format, Some(format), "{word:#010x}");
            assert_eq!(decoded.operands().len(), count, "{word:#010x}");
            assert!(format.operand_range().contains(&count), "{word:#010x}");
        }
    }

    #[test]
    fn test_fixed_operand_counts() {
        assert_eq!(InstructionFormat::AddSubImmediate.operand_range(), 3..=3);
        assert_eq!(InstructionFormat::SystemInstruction.operand_range(), 5..=5);
        assert_eq!(InstructionFormat::UnconditionalBranchImmediate.operand_range(), 1..=1);
        assert!(!InstructionFormat::LoadStoreExclusive.operand_range().contains(&4));
    }
}
