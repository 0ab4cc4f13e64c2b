//! Property-based tests for the ARM64 decoder.
//!
//! These tests verify invariants that should hold for every word:
//! - Decoding never panics on arbitrary input
//! - Decoded instruction size is always one word
//! - Deterministic decoding (same input → same output)
//! - Eager and deferred operand construction agree
//! - At most one decode table entry matches any word
//! - UnknownEncoding means no table entry matches
//! - Operand counts stay within the format's range, with one access per operand

use proptest::prelude::*;

use armlens_core::{AddressingMode, Operand};
use armlens_disasm::arm64::{DecodeTable, OperandMode};
use armlens_disasm::{Arm64Disassembler, Disassembler, EncodedWord, ErrorKind};

fn decode(word: u32, address: u64) -> armlens_disasm::DecodedInstruction {
    Arm64Disassembler::new().decode_word(EncodedWord::from_u32(word, address))
}

// =============================================================================
// Whole-decoder properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(10000))]

    /// Decoding arbitrary bytes should never panic.
    #[test]
    fn arm64_decode_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..36)) {
        let disasm = Arm64Disassembler::new();
        if let Ok(decoded) = disasm.decode_instruction(&bytes, 0x1000) {
            // rendering forces every operand
            let _ = decoded.to_string();
        }
    }

    /// ARM64 instructions are always 4 bytes.
    #[test]
    fn arm64_decoded_size_is_4(bytes in prop::collection::vec(any::<u8>(), 4..36)) {
        let disasm = Arm64Disassembler::new();
        let decoded = disasm.decode_instruction(&bytes, 0x1000).unwrap();
        prop_assert_eq!(decoded.size(), 4, "ARM64 instructions are always 4 bytes");
    }

    /// Short buffers are malformed, never decoded.
    #[test]
    fn arm64_short_input_is_malformed(bytes in prop::collection::vec(any::<u8>(), 0..4)) {
        let disasm = Arm64Disassembler::new();
        let err = disasm.decode_instruction(&bytes, 0x1000).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    /// The address and raw word survive decoding, valid or not.
    #[test]
    fn arm64_word_and_address_preserved(word in any::<u32>(), address in any::<u64>()) {
        let decoded = decode(word, address);
        prop_assert_eq!(decoded.word, word);
        prop_assert_eq!(decoded.address, address);
        if let Some(err) = &decoded.invalid {
            prop_assert_eq!(err.address(), address);
        }
    }

    /// ARM64 decoding is deterministic.
    #[test]
    fn arm64_decode_is_deterministic(word in any::<u32>(), address in any::<u64>()) {
        prop_assert_eq!(decode(word, address), decode(word, address));
    }

    /// Deferred operands, once forced, equal the eagerly built ones.
    #[test]
    fn arm64_deferred_matches_eager(word in any::<u32>(), address in any::<u64>()) {
        let eager = Arm64Disassembler::new().decode_u32(word, address);
        let lazy = Arm64Disassembler::new()
            .with_operand_mode(OperandMode::Deferred)
            .decode_u32(word, address);
        prop_assert_eq!(eager.operands(), lazy.operands());
        prop_assert_eq!(eager, lazy);
    }

    /// Unknown words keep their diagnostics and carry nothing else.
    #[test]
    fn arm64_invalid_results_are_empty(word in any::<u32>()) {
        let decoded = decode(word, 0x1000);
        if !decoded.is_valid() {
            prop_assert!(decoded.operands().is_empty());
            prop_assert!(decoded.access().is_empty());
            prop_assert!(decoded.implicit_operands().is_empty());
            prop_assert_eq!(decoded.format, None);
        }
    }

    /// UnknownEncoding is reserved for words no table entry matches; a word
    /// that matches an entry and still fails is a reserved combination.
    #[test]
    fn arm64_unknown_means_unmatched(word in any::<u32>()) {
        let matched = DecodeTable::get().lookup(word).is_some();
        let decoded = decode(word, 0);
        prop_assert_eq!(decoded.reason() == Some(ErrorKind::UnknownEncoding), !matched);
        if matched {
            prop_assert_ne!(decoded.reason(), Some(ErrorKind::UnknownEncoding));
        }
    }

    /// Valid words carry an operand count their format allows and one access
    /// entry per operand.
    #[test]
    fn arm64_operand_count_in_format_range(word in any::<u32>()) {
        let decoded = decode(word, 0);
        if let Some(format) = decoded.format {
            let range = format.operand_range();
            prop_assert!(
                range.contains(&decoded.operands().len()),
                "{:#010x} {:?} has {} operands",
                word,
                format,
                decoded.operands().len()
            );
            prop_assert_eq!(decoded.access().len(), decoded.operands().len());
        }
    }

    /// Reported registers never include the zero register, and writeback
    /// modes always list their base as written.
    #[test]
    fn arm64_register_sets(word in any::<u32>()) {
        let decoded = decode(word, 0);
        prop_assert!(decoded.registers_read().iter().all(|reg| !reg.is_zero_register()));
        let written = decoded.registers_written();
        prop_assert!(written.iter().all(|reg| !reg.is_zero_register()));
        for operand in decoded.operands() {
            if let Operand::Memory(mem) = operand {
                prop_assert!(decoded.registers_read().contains(&mem.base));
                if mem.writeback() {
                    prop_assert!(written.contains(&mem.base));
                }
            }
        }
    }

    /// At most one table entry matches, and a valid decode reports it.
    #[test]
    fn arm64_table_is_disjoint(word in any::<u32>()) {
        let table = DecodeTable::get();
        let matching: Vec<_> = table.entries().iter().filter(|e| e.matches(word)).collect();
        prop_assert!(matching.len() <= 1, "{:#010x} matches {} entries", word, matching.len());

        let decoded = decode(word, 0);
        if decoded.is_valid() {
            prop_assert_eq!(decoded.format, table.classify(word));
            prop_assert_eq!(matching.len(), 1);
        }
    }

    /// Block decoding yields one result per word plus one for a tail.
    #[test]
    fn arm64_block_covers_all_bytes(bytes in prop::collection::vec(any::<u8>(), 0..128)) {
        let disasm = Arm64Disassembler::new();
        let results = disasm.disassemble_block(&bytes, 0x1000);
        let expected = bytes.len() / 4 + usize::from(bytes.len() % 4 != 0);
        prop_assert_eq!(results.len(), expected);
        for (i, result) in results.iter().enumerate().take(bytes.len() / 4) {
            let decoded = result.as_ref().unwrap();
            prop_assert_eq!(decoded.address, 0x1000 + 4 * i as u64);
        }
    }
}

// =============================================================================
// Operand construction properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// LDR Xt, [Xn, #imm]: the 12-bit field is scaled by the 8-byte access.
    #[test]
    fn arm64_scaled_offset(imm12 in 0u32..4096, rn in 0u32..32, rt in 0u32..32) {
        let word = 0xF940_0000 | (imm12 << 10) | (rn << 5) | rt;
        let decoded = decode(word, 0);
        prop_assert!(decoded.is_valid());
        match &decoded.operands()[1] {
            Operand::Memory(mem) => {
                prop_assert_eq!(&mem.mode, &AddressingMode::ScaledOffset { offset: u64::from(imm12) * 8 });
                prop_assert_eq!(mem.size, 8);
                // base register 31 is sp
                prop_assert_eq!(mem.base.is_stack_pointer(), rn == 31);
            }
            other => prop_assert!(false, "expected memory operand, got {:?}", other),
        }
    }

    /// LDUR: the 9-bit offset is signed and unscaled.
    #[test]
    fn arm64_unscaled_offset_is_signed(imm9 in -256i64..256) {
        let word = 0xF840_0000 | (((imm9 as u32) & 0x1FF) << 12) | (1 << 5);
        let decoded = decode(word, 0);
        match &decoded.operands()[1] {
            Operand::Memory(mem) => prop_assert_eq!(&mem.mode, &AddressingMode::Unscaled { offset: imm9 }),
            other => prop_assert!(false, "expected memory operand, got {:?}", other),
        }
    }

    /// Index 31 is sp for ADD (immediate) but xzr for ADDS (immediate).
    #[test]
    fn arm64_register_31_context(imm12 in 0u32..4096, rn in 0u32..31) {
        let add = decode(0x9100_001F | (imm12 << 10) | (rn << 5), 0);
        let adds = decode(0xB100_001F | (imm12 << 10) | (rn << 5), 0);
        prop_assert!(add.operands()[0].register().unwrap().is_stack_pointer());
        prop_assert!(adds.operands()[0].register().unwrap().is_zero_register());
    }

    /// B targets stay within ±128MB of the branch.
    #[test]
    fn arm64_branch_target(imm26 in 0u32..(1 << 26), address in (0u64..(1 << 40)).prop_map(|a| a & !3)) {
        let decoded = decode(0x1400_0000 | imm26, address);
        let target = decoded.control_flow.target().unwrap();
        let offset = target.wrapping_sub(address) as i64;
        prop_assert!((-(1 << 27)..(1 << 27)).contains(&offset));
        prop_assert_eq!(offset % 4, 0);
    }
}

// =============================================================================
// Diagnostics
// =============================================================================

/// Rejections are traced; with a subscriber installed the decode result is unchanged.
#[test]
fn arm64_rejections_with_subscriber() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("armlens_disasm=trace"))
        .with_test_writer()
        .try_init();

    // move wide with opc=01
    let decoded = decode(0xB2A2_4680, 0x1000);
    assert_eq!(decoded.reason(), Some(ErrorKind::ReservedFieldCombination));
    // SVE space, no table entry
    let decoded = decode(0x0420_3000, 0x1004);
    assert_eq!(decoded.reason(), Some(ErrorKind::UnknownEncoding));

    let lazy = Arm64Disassembler::new()
        .with_operand_mode(OperandMode::Deferred)
        .decode_u32(0xA9BF_7BFD, 0x1008);
    assert_eq!(lazy.to_string(), "stp x29, x30, [sp, #-0x10]!");
}
