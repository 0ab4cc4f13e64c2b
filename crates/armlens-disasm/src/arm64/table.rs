//! The A64 decode table.
//!
//! A declarative registry of `(predicate, format, shape function)` entries.
//! Each predicate is a conjunction of fixed-value bit fields compiled to a
//! single mask/value pair. Entries are pairwise disjoint, so a word matches at
//! most one of them; the table is still scanned most-constrained-first.

use std::sync::LazyLock;

use super::bits::FieldSpec;
use super::decoder::DecodeContext;
use super::format::InstructionFormat;
use super::formats::{branch, data_imm, data_reg, fp_simd, load_store};
use super::shape::OperandShape;
use crate::DecodeError;

/// Derives the pending-operand shape of a word whose format is known.
pub type ShapeFn = fn(&DecodeContext) -> Result<OperandShape, DecodeError>;

/// A bit field required to hold a fixed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMatch {
    pub field: FieldSpec,
    pub value: u32,
}

impl FieldMatch {
    pub const fn new(start: u8, end: u8, value: u32) -> Self {
        let field = FieldSpec::new(start, end);
        assert!(value <= field.mask() >> start, "value wider than its field");
        Self { field, value }
    }

    pub const fn mask(&self) -> u32 {
        self.field.mask()
    }

    pub const fn expected(&self) -> u32 {
        self.value << self.field.start()
    }
}

/// One registered format.
#[derive(Debug, Clone, Copy)]
pub struct FormatEntry {
    pub format: InstructionFormat,
    pub fields: &'static [FieldMatch],
    /// A canonical word of this format, used to check the table.
    pub example: u32,
    pub shape: ShapeFn,
    mask: u32,
    value: u32,
}

impl FormatEntry {
    pub const fn new(
        format: InstructionFormat,
        fields: &'static [FieldMatch],
        example: u32,
        shape: ShapeFn,
    ) -> Self {
        let mut mask = 0;
        let mut value = 0;
        let mut i = 0;
        while i < fields.len() {
            assert!(mask & fields[i].mask() == 0, "overlapping constrained fields");
            mask |= fields[i].mask();
            value |= fields[i].expected();
            i += 1;
        }
        Self {
            format,
            fields,
            example,
            shape,
            mask,
            value,
        }
    }

    /// Returns true if the predicate holds for `word`.
    #[inline]
    pub fn matches(&self, word: u32) -> bool {
        word & self.mask == self.value
    }

    /// Number of constrained bit positions.
    pub fn specificity(&self) -> u32 {
        self.mask.count_ones()
    }

    pub fn mask(&self) -> u32 {
        self.mask
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    /// Returns true if some word satisfies both predicates.
    pub fn overlaps(&self, other: &FormatEntry) -> bool {
        (self.mask & other.mask) & (self.value ^ other.value) == 0
    }
}

/// Builds a `&'static [FieldMatch]` from `(start, end, value)` triples.
macro_rules! pattern {
    ($(($start:expr, $end:expr, $value:expr)),+ $(,)?) => {{
        const FIELDS: &[FieldMatch] = &[$(FieldMatch::new($start, $end, $value)),+];
        FIELDS
    }};
}

use InstructionFormat as F;

static ENTRIES: [FormatEntry; 51] = [
    FormatEntry::new(F::PermanentlyUndefined, pattern![(16, 31, 0)], 0x0000_0000, branch::udf),
    // Data processing - immediate
    FormatEntry::new(F::PcRelativeAddressing, pattern![(24, 28, 0b10000)], 0x1000_0020, data_imm::pc_relative),
    FormatEntry::new(F::AddSubImmediate, pattern![(23, 28, 0b100010)], 0x9100_03FD, data_imm::add_sub_immediate),
    FormatEntry::new(F::LogicalImmediate, pattern![(23, 28, 0b100100)], 0x9240_1C20, data_imm::logical_immediate),
    FormatEntry::new(F::MoveWide, pattern![(23, 28, 0b100101)], 0xD2A2_4680, data_imm::move_wide),
    FormatEntry::new(F::Bitfield, pattern![(23, 28, 0b100110)], 0xD344_FC20, data_imm::bitfield),
    FormatEntry::new(F::Extract, pattern![(23, 28, 0b100111)], 0x93C2_2020, data_imm::extract),
    // Branches, exception generating and system instructions
    FormatEntry::new(F::UnconditionalBranchImmediate, pattern![(26, 30, 0b00101)], 0x9400_0040, branch::unconditional_immediate),
    FormatEntry::new(F::CompareAndBranch, pattern![(25, 30, 0b011010)], 0xB400_0040, branch::compare_and_branch),
    FormatEntry::new(F::TestAndBranch, pattern![(25, 30, 0b011011)], 0xB608_0003, branch::test_and_branch),
    FormatEntry::new(F::ConditionalBranch, pattern![(24, 31, 0b0101_0100), (4, 4, 0)], 0x5400_0040, branch::conditional),
    FormatEntry::new(
        F::UnconditionalBranchRegister,
        pattern![(25, 31, 0b1101011), (10, 15, 0)],
        0xD65F_03C0,
        branch::unconditional_register,
    ),
    FormatEntry::new(F::ExceptionGeneration, pattern![(24, 31, 0b1101_0100)], 0xD400_0001, branch::exception),
    FormatEntry::new(F::Hint, pattern![(12, 31, 0xD5032), (0, 4, 0b11111)], 0xD503_201F, branch::hint),
    FormatEntry::new(F::Barrier, pattern![(12, 31, 0xD5033), (0, 4, 0b11111)], 0xD503_3BBF, branch::barrier),
    FormatEntry::new(
        F::PstateImmediate,
        pattern![(19, 31, 0b1_1010_1010_0000), (12, 15, 0b0100), (0, 4, 0b11111)],
        0xD503_42DF,
        branch::pstate_immediate,
    ),
    FormatEntry::new(F::SystemInstruction, pattern![(22, 31, 0b11_0101_0100), (19, 20, 0b01)], 0xD50B_7420, branch::system_instruction),
    FormatEntry::new(F::SystemRegisterMove, pattern![(22, 31, 0b11_0101_0100), (20, 20, 1)], 0xD53B_D040, branch::system_register_move),
    // Loads and stores
    FormatEntry::new(F::LoadStoreExclusive, pattern![(24, 29, 0b001000), (21, 21, 0)], 0xC85F_7C20, load_store::exclusive),
    FormatEntry::new(
        F::LoadStoreExclusivePair,
        pattern![(31, 31, 1), (24, 29, 0b001000), (23, 23, 0), (21, 21, 1)],
        0xC87F_0440,
        load_store::exclusive_pair,
    ),
    FormatEntry::new(F::LoadLiteral, pattern![(27, 29, 0b011), (24, 25, 0b00)], 0x5800_0080, load_store::literal),
    FormatEntry::new(F::LoadStorePairNonTemporal, pattern![(27, 29, 0b101), (23, 25, 0b000)], 0xA800_0440, load_store::pair),
    FormatEntry::new(F::LoadStorePairPostIndex, pattern![(27, 29, 0b101), (23, 25, 0b001)], 0xA8C1_7BFD, load_store::pair),
    FormatEntry::new(F::LoadStorePairOffset, pattern![(27, 29, 0b101), (23, 25, 0b010)], 0xA941_07E0, load_store::pair),
    FormatEntry::new(F::LoadStorePairPreIndex, pattern![(27, 29, 0b101), (23, 25, 0b011)], 0xA9BF_7BFD, load_store::pair),
    FormatEntry::new(
        F::LoadStoreUnscaled,
        pattern![(27, 29, 0b111), (24, 25, 0b00), (21, 21, 0), (10, 11, 0b00)],
        0xF85F_8020,
        load_store::single,
    ),
    FormatEntry::new(
        F::LoadStorePostIndex,
        pattern![(27, 29, 0b111), (24, 25, 0b00), (21, 21, 0), (10, 11, 0b01)],
        0xF840_8420,
        load_store::single,
    ),
    FormatEntry::new(
        F::LoadStoreUnprivileged,
        pattern![(27, 29, 0b111), (24, 25, 0b00), (21, 21, 0), (10, 11, 0b10)],
        0xF840_0820,
        load_store::single,
    ),
    FormatEntry::new(
        F::LoadStorePreIndex,
        pattern![(27, 29, 0b111), (24, 25, 0b00), (21, 21, 0), (10, 11, 0b11)],
        0xF840_8C20,
        load_store::single,
    ),
    FormatEntry::new(
        F::LoadStoreRegisterOffset,
        pattern![(27, 29, 0b111), (24, 25, 0b00), (21, 21, 1), (10, 11, 0b10)],
        0xF862_D820,
        load_store::single,
    ),
    FormatEntry::new(F::LoadStoreUnsignedImmediate, pattern![(27, 29, 0b111), (24, 25, 0b01)], 0xF940_1020, load_store::single),
    // Data processing - register
    FormatEntry::new(F::LogicalShiftedRegister, pattern![(24, 28, 0b01010)], 0xAA01_03E0, data_reg::logical_shifted),
    FormatEntry::new(F::AddSubShiftedRegister, pattern![(24, 28, 0b01011), (21, 21, 0)], 0x8B02_0C20, data_reg::add_sub_shifted),
    FormatEntry::new(F::AddSubExtendedRegister, pattern![(24, 28, 0b01011), (21, 21, 1)], 0x8B22_4820, data_reg::add_sub_extended),
    FormatEntry::new(F::AddSubWithCarry, pattern![(21, 28, 0b1101_0000), (10, 15, 0)], 0x9A02_0020, data_reg::add_sub_carry),
    FormatEntry::new(
        F::ConditionalCompare,
        pattern![(21, 28, 0b1101_0010), (10, 10, 0), (4, 4, 0)],
        0xFA41_1800,
        data_reg::conditional_compare,
    ),
    FormatEntry::new(F::ConditionalSelect, pattern![(21, 28, 0b1101_0100)], 0x9A82_0020, data_reg::conditional_select),
    FormatEntry::new(F::DataProcessing2Source, pattern![(30, 30, 0), (21, 28, 0b1101_0110)], 0x9AC2_0820, data_reg::two_source),
    FormatEntry::new(
        F::DataProcessing1Source,
        pattern![(30, 30, 1), (21, 28, 0b1101_0110), (16, 20, 0)],
        0xDAC0_0020,
        data_reg::one_source,
    ),
    FormatEntry::new(F::DataProcessing3Source, pattern![(24, 28, 0b11011)], 0x9B02_0C20, data_reg::three_source),
    // Scalar floating point
    FormatEntry::new(
        F::FpCompare,
        pattern![(24, 31, 0b0001_1110), (21, 21, 1), (10, 15, 0b001000)],
        0x1E61_2000,
        fp_simd::compare,
    ),
    FormatEntry::new(
        F::FpDataProcessing1Source,
        pattern![(24, 31, 0b0001_1110), (21, 21, 1), (10, 14, 0b10000)],
        0x1E60_4020,
        fp_simd::one_source,
    ),
    FormatEntry::new(
        F::FpDataProcessing2Source,
        pattern![(24, 31, 0b0001_1110), (21, 21, 1), (10, 11, 0b10)],
        0x1E62_2820,
        fp_simd::two_source,
    ),
    FormatEntry::new(
        F::FpConditionalCompare,
        pattern![(24, 31, 0b0001_1110), (21, 21, 1), (10, 11, 0b01)],
        0x1E61_0400,
        fp_simd::conditional_compare,
    ),
    FormatEntry::new(
        F::FpConditionalSelect,
        pattern![(24, 31, 0b0001_1110), (21, 21, 1), (10, 11, 0b11)],
        0x1E62_0C20,
        fp_simd::conditional_select,
    ),
    FormatEntry::new(
        F::FpImmediate,
        pattern![(24, 31, 0b0001_1110), (21, 21, 1), (10, 12, 0b100)],
        0x1E6E_1000,
        fp_simd::immediate,
    ),
    FormatEntry::new(F::FpDataProcessing3Source, pattern![(24, 31, 0b0001_1111)], 0x1F42_0C20, fp_simd::three_source),
    FormatEntry::new(
        F::FpIntegerConversion,
        pattern![(24, 30, 0b001_1110), (21, 21, 1), (10, 15, 0)],
        0x9E66_0000,
        fp_simd::integer_conversion,
    ),
    FormatEntry::new(F::FpFixedPointConversion, pattern![(24, 30, 0b001_1110), (21, 21, 0)], 0x9E42_C020, fp_simd::fixed_point_conversion),
    // Advanced SIMD
    FormatEntry::new(
        F::SimdThreeSame,
        pattern![(31, 31, 0), (24, 28, 0b01110), (21, 21, 1), (10, 10, 1)],
        0x4EA2_8420,
        fp_simd::simd_three_same,
    ),
    FormatEntry::new(
        F::SimdTwoRegisterMisc,
        pattern![(31, 31, 0), (24, 28, 0b01110), (17, 21, 0b10000), (10, 11, 0b10)],
        0x6E20_5820,
        fp_simd::simd_two_register_misc,
    ),
];

/// The decode table, sorted most-constrained-first.
pub struct DecodeTable {
    entries: Vec<&'static FormatEntry>,
}

static TABLE: LazyLock<DecodeTable> = LazyLock::new(|| {
    let mut entries: Vec<&'static FormatEntry> = ENTRIES.iter().collect();
    // stable sort keeps registration order among equally constrained entries
    entries.sort_by_key(|entry| std::cmp::Reverse(entry.specificity()));
    DecodeTable { entries }
});

impl DecodeTable {
    /// Returns the process-wide table.
    pub fn get() -> &'static DecodeTable {
        &TABLE
    }

    /// Returns the entry whose predicate `word` satisfies.
    pub fn lookup(&self, word: u32) -> Option<&'static FormatEntry> {
        self.entries.iter().copied().find(|entry| entry.matches(word))
    }

    /// Returns the format of `word`, if any entry matches.
    pub fn classify(&self, word: u32) -> Option<InstructionFormat> {
        self.lookup(word).map(|entry| entry.format)
    }

    /// All entries in evaluation order.
    pub fn entries(&self) -> &[&'static FormatEntry] {
        &self.entries
    }

    /// Returns the entry registered for `format`.
    pub fn entry(&self, format: InstructionFormat) -> Option<&'static FormatEntry> {
        self.entries.iter().copied().find(|entry| entry.format == format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_entries_are_pairwise_disjoint() {
        let entries = DecodeTable::get().entries();
        for (i, a) in entries.iter().enumerate() {
            for b in &entries[i + 1..] {
                assert!(
                    !a.overlaps(b),
                    "{:?} and {:?} share an encoding",
                    a.format,
                    b.format
                );
            }
        }
    }

    #[test]
    fn test_examples_match_only_their_entry() {
        let entries = DecodeTable::get().entries();
        for entry in entries {
            let matching: Vec<_> = entries
                .iter()
                .filter(|other| other.matches(entry.example))
                .map(|other| other.format)
                .collect();
            assert_eq!(matching, vec![entry.format], "example {:#010x}", entry.example);
        }
    }

    #[test]
    fn test_examples_decode_validly() {
        for entry in DecodeTable::get().entries() {
            let ctx = DecodeContext::new(entry.example, 0x1000);
            let shape = (entry.shape)(&ctx);
            assert!(
                shape.is_ok(),
                "{:?} example {:#010x}: {:?}",
                entry.format,
                entry.example,
                shape
            );
        }
    }

    #[test]
    fn test_one_entry_per_format() {
        let formats: HashSet<_> = ENTRIES.iter().map(|entry| entry.format).collect();
        assert_eq!(formats.len(), ENTRIES.len());
    }

    #[test]
    fn test_sorted_by_specificity() {
        let entries = DecodeTable::get().entries();
        assert!(entries
            .windows(2)
            .all(|pair| pair[0].specificity() >= pair[1].specificity()));
    }

    #[test]
    fn test_classify() {
        let table = DecodeTable::get();
        assert_eq!(table.classify(0xD503201F), Some(InstructionFormat::Hint));
        assert_eq!(table.classify(0xD65F03C0), Some(InstructionFormat::UnconditionalBranchRegister));
        assert_eq!(table.classify(0x1E622820), Some(InstructionFormat::FpDataProcessing2Source));
        // SVE space is not registered
        assert_eq!(table.classify(0x0420_3000), None);
    }

    #[test]
    fn test_field_match_compiles_to_mask() {
        let entry = table_entry(InstructionFormat::ConditionalBranch);
        assert_eq!(entry.mask(), 0xFF00_0010);
        assert_eq!(entry.value(), 0x5400_0000);
        assert_eq!(entry.specificity(), 9);
    }

    fn table_entry(format: InstructionFormat) -> &'static FormatEntry {
        DecodeTable::get().entry(format).unwrap()
    }
}
