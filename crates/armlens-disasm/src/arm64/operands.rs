//! Operand construction from a word and its pending-operand shape.
//!
//! Every reserved or undefined field combination is rejected while the shape
//! is derived, so the functions here never fail. Deferred construction calls
//! the same [`build_operands`] on first access, which is what makes eager and
//! deferred decoding produce identical operands.

use std::sync::OnceLock;

use armlens_core::{AddressingMode, Extend, MemoryRef, Operand, Shift};
use tracing::trace;

use super::bits::{fields, sign_extend, zero_extend};
use super::registers::{FpWidth, Reg31, RegisterMapper};
use super::shape::{
    AddressingKind, Extension, ImmField, ImmediateSlot, MemorySlot, OperandSlot, PcRelativeKind, Scaling,
};

/// Builds the operands described by `slots`, in slot order.
pub fn build_operands(word: u32, address: u64, slots: &[OperandSlot]) -> Vec<Operand> {
    slots.iter().map(|slot| build_operand(word, address, slot)).collect()
}

fn build_operand(word: u32, address: u64, slot: &OperandSlot) -> Operand {
    match *slot {
        OperandSlot::Gpr {
            field,
            is_64bit,
            reg31,
        } => Operand::reg(RegisterMapper::gpr(field.extract(word), is_64bit, reg31)),
        OperandSlot::Fp { field, width } => Operand::reg(RegisterMapper::fp(field.extract(word), width)),
        OperandSlot::Vector { field, arrangement } => {
            Operand::reg(RegisterMapper::vector(field.extract(word), arrangement))
        }
        OperandSlot::SystemRegister => Operand::reg(RegisterMapper::system(fields::SYSREG.extract(word))),
        OperandSlot::Pstate(id) => Operand::reg(RegisterMapper::pstate(id)),
        OperandSlot::ShiftedRegister { is_64bit } => Operand::ShiftedRegister {
            register: RegisterMapper::gpr(fields::RM.extract(word), is_64bit, Reg31::ZeroRegister),
            shift: Shift::from_bits(fields::SHIFT.extract(word)),
            amount: fields::IMM6.extract(word) as u8,
        },
        OperandSlot::ExtendedRegister { is_64bit } => {
            let extend = Extend::from_option(fields::OPTION.extract(word));
            Operand::ExtendedRegister {
                register: RegisterMapper::gpr(
                    fields::RM.extract(word),
                    is_64bit && extend.is_64bit_source(),
                    Reg31::ZeroRegister,
                ),
                extend,
                amount: fields::IMM3.extract(word) as u8,
            }
        }
        OperandSlot::Immediate(imm) => build_immediate(word, imm),
        OperandSlot::PcRelative(kind) => {
            let (offset, target) = pc_relative(word, address, kind);
            Operand::pc_rel(offset, target)
        }
        OperandSlot::Memory(mem) => Operand::Memory(build_memory(word, address, &mem)),
    }
}

/// Applies an immediate policy: extract, extend, then scale.
pub fn apply_imm_field(word: u32, policy: &ImmField) -> i64 {
    let raw = policy.field.extract(word) as u64;
    let extended = match policy.extension {
        Extension::Sign => sign_extend(raw, policy.field.width()),
        Extension::Zero => zero_extend(raw, policy.field.width()) as i64,
    };
    extended.wrapping_shl(policy.scale as u32)
}

fn build_immediate(word: u32, imm: ImmediateSlot) -> Operand {
    match imm {
        ImmediateSlot::Field(policy) => {
            let value = apply_imm_field(word, &policy);
            match policy.extension {
                Extension::Sign => Operand::imm(value as i128, policy.size),
                Extension::Zero => Operand::imm_unsigned(value as u64, policy.size),
            }
        }
        ImmediateSlot::AddSubImm12 => {
            let imm12 = fields::IMM12.extract(word) as u64;
            let shift = if fields::SH.extract(word) == 1 { 12 } else { 0 };
            Operand::imm_unsigned(imm12 << shift, 24)
        }
        ImmediateSlot::BitMask { value, is_64bit } => Operand::imm_unsigned(value, if is_64bit { 64 } else { 32 }),
        ImmediateSlot::MoveWideShift => Operand::imm_unsigned(fields::HW.extract(word) as u64 * 16, 6),
        ImmediateSlot::TestBitNumber => {
            let bit = (fields::B5.extract(word) << 5) | fields::B40.extract(word);
            Operand::imm_unsigned(bit as u64, 6)
        }
        ImmediateSlot::FractionBits => {
            Operand::imm_unsigned(64 - fields::SCALE.extract(word) as u64, 7)
        }
        ImmediateSlot::FloatingPoint(width) => Operand::imm_unsigned(
            vfp_expand_imm(fields::IMM8_FP.extract(word), width),
            width.bits() as u8,
        ),
        ImmediateSlot::Constant { value, size } => Operand::imm(value as i128, size),
    }
}

/// Returns `(offset, target)` for a PC-relative operand.
pub fn pc_relative(word: u32, address: u64, kind: PcRelativeKind) -> (i64, u64) {
    if let Some(policy) = kind.policy() {
        let offset = apply_imm_field(word, &policy);
        return (offset, address.wrapping_add_signed(offset));
    }
    let imm = (fields::IMMHI.extract(word) << 2) | fields::IMMLO.extract(word);
    let imm = sign_extend(imm as u64, 21);
    match kind {
        PcRelativeKind::Adrp => {
            let offset = imm << 12;
            (offset, (address & !0xFFF).wrapping_add_signed(offset))
        }
        _ => (imm, address.wrapping_add_signed(imm)),
    }
}

fn build_memory(word: u32, address: u64, slot: &MemorySlot) -> MemoryRef {
    let base = match slot.kind {
        AddressingKind::Literal => RegisterMapper::pc(),
        _ => RegisterMapper::gpr(fields::RN.extract(word), true, Reg31::StackPointer),
    };
    let offset = slot.kind.offset_policy().map(|policy| {
        let scale = match policy.scaling {
            Scaling::Unscaled => 0,
            Scaling::ByElement => slot.element_log2,
            Scaling::Fixed(n) => n,
        };
        apply_imm_field(
            word,
            &ImmField {
                field: policy.field,
                extension: policy.extension,
                scale,
                size: 64,
            },
        )
    });
    let offset = offset.unwrap_or(0);

    let mode = match slot.kind {
        AddressingKind::Unscaled | AddressingKind::Unprivileged => AddressingMode::Unscaled { offset },
        AddressingKind::PreIndex => AddressingMode::PreIndex { offset },
        AddressingKind::PostIndex => AddressingMode::PostIndex { offset },
        AddressingKind::UnsignedOffset => AddressingMode::ScaledOffset {
            offset: offset as u64,
        },
        AddressingKind::Literal => AddressingMode::Literal {
            offset,
            target: address.wrapping_add_signed(offset),
        },
        AddressingKind::Pair(indexing) => AddressingMode::Pair { indexing, offset },
        AddressingKind::RegisterOffset => {
            let option = fields::OPTION.extract(word);
            AddressingMode::RegisterOffset {
                index: RegisterMapper::gpr(fields::RM.extract(word), option & 1 == 1, Reg31::ZeroRegister),
                extend: Extend::from_option(option),
                shift: if fields::LDST_S.extract(word) == 1 {
                    slot.element_log2
                } else {
                    0
                },
            }
        }
        AddressingKind::Exclusive => AddressingMode::Exclusive,
        AddressingKind::ExclusivePair => AddressingMode::ExclusivePair,
    };

    MemoryRef::new(base, mode, slot.access_size())
}

/// Expands a logical-immediate `N:immr:imms` triple to its bitmask.
///
/// Returns `None` for reserved encodings: an element size below 2 bits, an
/// all-ones element, or `N = 1` in a 32-bit instruction.
pub fn decode_bit_masks(n: u32, imms: u32, immr: u32, is_64bit: bool) -> Option<u64> {
    if n == 1 && !is_64bit {
        return None;
    }
    let combined = (n << 6) | (!imms & 0x3F);
    if combined == 0 {
        return None;
    }
    let len = 31 - combined.leading_zeros();
    if len < 1 {
        return None;
    }
    let esize = 1u32 << len;
    let levels = esize - 1;
    let s = imms & levels;
    let r = immr & levels;
    if s == levels {
        return None;
    }

    let welem = (1u64 << (s + 1)) - 1;
    let element = if esize == 64 {
        welem.rotate_right(r)
    } else {
        let mask = (1u64 << esize) - 1;
        ((welem >> r) | (welem << ((esize - r) % esize))) & mask
    };

    let datasize = if is_64bit { 64 } else { 32 };
    let mut result = 0u64;
    let mut pos = 0;
    while pos < datasize {
        result |= element << pos;
        pos += esize;
    }
    Some(result)
}

/// Expands an 8-bit FMOV immediate to the IEEE bit pattern of `width`.
pub fn vfp_expand_imm(imm8: u32, width: FpWidth) -> u64 {
    let (e, f) = match width {
        FpWidth::H => (5u32, 10u32),
        FpWidth::D => (11, 52),
        _ => (8, 23),
    };
    let imm8 = imm8 as u64;
    let sign = (imm8 >> 7) & 1;
    let b6 = (imm8 >> 6) & 1;
    let replicated = if b6 == 1 { ((1u64 << (e - 3)) - 1) << 2 } else { 0 };
    let exp = ((b6 ^ 1) << (e - 1)) | replicated | ((imm8 >> 4) & 0b11);
    let frac = (imm8 & 0xF) << (f - 4);
    (sign << (e + f)) | (exp << f) | frac
}

/// Operands whose construction is postponed until first access.
///
/// Stores the raw word, its address and the already validated slots; the
/// first call to [`DeferredOperands::get`] builds and caches the list.
#[derive(Debug, Clone)]
pub struct DeferredOperands {
    word: u32,
    address: u64,
    slots: Vec<OperandSlot>,
    resolved: OnceLock<Vec<Operand>>,
}

impl DeferredOperands {
    pub fn new(word: u32, address: u64, slots: Vec<OperandSlot>) -> Self {
        Self {
            word,
            address,
            slots,
            resolved: OnceLock::new(),
        }
    }

    /// Returns the operands, building them on first access.
    pub fn get(&self) -> &[Operand] {
        self.resolved.get_or_init(|| {
            trace!(address = self.address, word = self.word, "forcing deferred operands");
            build_operands(self.word, self.address, &self.slots)
        })
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }

    pub fn slots(&self) -> &[OperandSlot] {
        &self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arm64::shape::{imm, OperandShape};
    use armlens_core::{PairIndexing, VectorArrangement};

    #[test]
    fn test_scaled_unsigned_offset() {
        // LDR X0, [X1, #32]: 0xF9401020, imm12 = 4, 8-byte access
        let ops = build_operands(
            0xF9401020,
            0,
            &[OperandSlot::Memory(MemorySlot::new(AddressingKind::UnsignedOffset, 3))],
        );
        match &ops[0] {
            Operand::Memory(mem) => {
                assert_eq!(mem.mode, AddressingMode::ScaledOffset { offset: 32 });
                assert_eq!(mem.size, 8);
                assert_eq!(mem.base.name(), "x1");
            }
            other => panic!("expected memory operand, got {other:?}"),
        }
    }

    #[test]
    fn test_pair_pre_index() {
        // STP X29, X30, [SP, #-16]!: 0xA9BF7BFD
        let shape = OperandShape::new("stp")
            .gpr_zr(fields::RT, true)
            .gpr_zr(fields::RT2, true)
            .memory(AddressingKind::Pair(PairIndexing::PreIndex), 3);
        let ops = build_operands(0xA9BF7BFD, 0x1000, &shape.slots);
        assert_eq!(ops[0].to_string(), "x29");
        assert_eq!(ops[1].to_string(), "x30");
        assert_eq!(ops[2].to_string(), "[sp, #-0x10]!");
    }

    #[test]
    fn test_unscaled_negative_offset() {
        // LDUR X0, [X1, #-8]: 0xF85F8020
        let ops = build_operands(
            0xF85F8020,
            0,
            &[OperandSlot::Memory(MemorySlot::new(AddressingKind::Unscaled, 3))],
        );
        assert_eq!(ops[0].to_string(), "[x1, #-0x8]");
    }

    #[test]
    fn test_register_offset() {
        // LDR X0, [X1, W2, SXTW #3]: 0xF862D820
        let ops = build_operands(
            0xF862D820,
            0,
            &[OperandSlot::Memory(MemorySlot::new(AddressingKind::RegisterOffset, 3))],
        );
        assert_eq!(ops[0].to_string(), "[x1, w2, sxtw #3]");
    }

    #[test]
    fn test_literal_target() {
        // LDR X0, #0x10 from 0x1000: 0x58000080
        let ops = build_operands(
            0x58000080,
            0x1000,
            &[OperandSlot::Memory(MemorySlot::new(AddressingKind::Literal, 3))],
        );
        match &ops[0] {
            Operand::Memory(mem) => {
                assert_eq!(mem.mode, AddressingMode::Literal { offset: 0x10, target: 0x1010 });
                assert_eq!(mem.base.name(), "pc");
            }
            other => panic!("expected memory operand, got {other:?}"),
        }
    }

    #[test]
    fn test_branch_offsets() {
        // BL +0x100: 0x94000040
        assert_eq!(pc_relative(0x94000040, 0x1000, PcRelativeKind::Branch26), (0x100, 0x1100));
        // B -4: 0x17FFFFFF
        assert_eq!(pc_relative(0x17FFFFFF, 0x1000, PcRelativeKind::Branch26), (-4, 0xFFC));
        // B.EQ +8: 0x54000040
        assert_eq!(pc_relative(0x54000040, 0x2000, PcRelativeKind::Branch19), (8, 0x2008));
    }

    #[test]
    fn test_adr_adrp() {
        // ADR X0, #+4: 0x10000020
        assert_eq!(pc_relative(0x10000020, 0x1000, PcRelativeKind::Adr), (4, 0x1004));
        // ADRP X0, #+1 page: 0xB0000000
        assert_eq!(pc_relative(0xB0000000, 0x1234, PcRelativeKind::Adrp), (0x1000, 0x2000));
    }

    #[test]
    fn test_decode_bit_masks() {
        // N=1 immr=0 imms=0: a single set bit
        assert_eq!(decode_bit_masks(1, 0, 0, true), Some(1));
        // 0x5555_5555 pattern
        assert_eq!(decode_bit_masks(0, 0b111100, 0, false), Some(0x5555_5555));
        // 0xFF rotated right by 8 in a 64-bit element
        assert_eq!(decode_bit_masks(1, 7, 8, true), Some(0xFF00_0000_0000_0000));
        // 0x0000_FFFF replicated over 32-bit elements
        assert_eq!(decode_bit_masks(0, 15, 0, true), Some(0x0000_FFFF_0000_FFFF));
    }

    #[test]
    fn test_decode_bit_masks_reserved() {
        // all-ones element
        assert_eq!(decode_bit_masks(1, 0b111111, 0, true), None);
        // element size below 2 bits
        assert_eq!(decode_bit_masks(0, 0b111111, 0, true), None);
        assert_eq!(decode_bit_masks(0, 0b111110, 0, true), None);
        // N=1 is reserved for 32-bit
        assert_eq!(decode_bit_masks(1, 0, 0, false), None);
    }

    #[test]
    fn test_vfp_expand_imm() {
        // #1.0
        assert_eq!(vfp_expand_imm(0x70, FpWidth::D), 1.0f64.to_bits());
        assert_eq!(vfp_expand_imm(0x70, FpWidth::S), 1.0f32.to_bits() as u64);
        // #-2.0
        assert_eq!(vfp_expand_imm(0x80, FpWidth::D), (-2.0f64).to_bits());
        // #0.5
        assert_eq!(vfp_expand_imm(0x60, FpWidth::S), 0.5f32.to_bits() as u64);
        // half precision #1.0 is 0x3C00
        assert_eq!(vfp_expand_imm(0x70, FpWidth::H), 0x3C00);
    }

    #[test]
    fn test_shifted_and_extended_registers() {
        // ADD X0, X1, X2, LSL #3: 0x8B020C20
        let ops = build_operands(0x8B020C20, 0, &[OperandSlot::ShiftedRegister { is_64bit: true }]);
        assert_eq!(ops[0].to_string(), "x2, lsl #3");
        // ADD X0, X1, W2, UXTW #2: 0x8B224820
        let ops = build_operands(0x8B224820, 0, &[OperandSlot::ExtendedRegister { is_64bit: true }]);
        assert_eq!(ops[0].to_string(), "w2, uxtw #2");
    }

    #[test]
    fn test_immediate_policies() {
        // MOVZ X0, #0x1234, LSL #16: 0xD2A24680
        let word = 0xD2A24680;
        let ops = build_operands(
            word,
            0,
            &[
                OperandSlot::Immediate(ImmediateSlot::Field(imm::IMM16)),
                OperandSlot::Immediate(ImmediateSlot::MoveWideShift),
            ],
        );
        assert_eq!(ops[0], Operand::imm_unsigned(0x1234, 16));
        assert_eq!(ops[1], Operand::imm_unsigned(16, 6));

        // ADD X0, X1, #1, LSL #12: 0x91400420
        let ops = build_operands(0x91400420, 0, &[OperandSlot::Immediate(ImmediateSlot::AddSubImm12)]);
        assert_eq!(ops[0], Operand::imm_unsigned(0x1000, 24));

        // TBZ X3, #33, ...: b5=1, b40=1
        let ops = build_operands(0xB6080003, 0, &[OperandSlot::Immediate(ImmediateSlot::TestBitNumber)]);
        assert_eq!(ops[0], Operand::imm_unsigned(33, 6));
    }

    #[test]
    fn test_deferred_matches_eager() {
        let slots = OperandShape::new("add")
            .vector(fields::RD, VectorArrangement::S4)
            .vector(fields::RN, VectorArrangement::S4)
            .vector(fields::RM, VectorArrangement::S4)
            .slots;
        let word = 0x4EA28420;
        let deferred = DeferredOperands::new(word, 0x40, slots.clone());
        assert!(!deferred.is_resolved());
        let eager = build_operands(word, 0x40, &slots);
        assert_eq!(deferred.get(), eager.as_slice());
        assert!(deferred.is_resolved());
        // forcing again returns the cached list
        assert_eq!(deferred.get(), eager.as_slice());
        assert_eq!(eager[0].to_string(), "v0.4s");
    }
}
