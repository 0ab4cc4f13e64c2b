//! Data processing - immediate.

use crate::arm64::bits::{fields, FieldSpec};
use crate::arm64::decoder::DecodeContext;
use crate::arm64::operands::decode_bit_masks;
use crate::arm64::shape::{imm, ImmediateSlot, OperandShape, OperandSlot, PcRelativeKind};
use crate::DecodeError;

const EXTR_O0: FieldSpec = FieldSpec::bit(21);

/// ADR, ADRP
pub fn pc_relative(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    let (mnemonic, kind) = if ctx.bit(fields::SF) {
        ("adrp", PcRelativeKind::Adrp)
    } else {
        ("adr", PcRelativeKind::Adr)
    };
    Ok(OperandShape::new(mnemonic)
        .gpr_zr(fields::RD, true)
        .written()
        .slot(OperandSlot::PcRelative(kind))
        .sixty_four(true))
}

/// ADD, ADDS, SUB, SUBS (immediate)
pub fn add_sub_immediate(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    let sf = ctx.bit(fields::SF);
    let set_flags = ctx.bit(fields::S);
    let mnemonic = match (ctx.bit(fields::OP), set_flags) {
        (false, false) => "add",
        (false, true) => "adds",
        (true, false) => "sub",
        (true, true) => "subs",
    };
    let shape = OperandShape::new(mnemonic);
    // the flag-setting forms write xzr, the others may write sp
    let shape = if set_flags {
        shape.gpr_zr(fields::RD, sf)
    } else {
        shape.gpr_sp(fields::RD, sf)
    };
    Ok(shape
        .written()
        .gpr_sp(fields::RN, sf)
        .imm(ImmediateSlot::AddSubImm12)
        .sixty_four(sf)
        .sets_flags(set_flags))
}

/// AND, ORR, EOR, ANDS (immediate)
pub fn logical_immediate(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    let sf = ctx.bit(fields::SF);
    let n = ctx.field(fields::N);
    if !sf && n == 1 {
        return Err(ctx.reserved("N must be 0 for 32-bit logical immediate"));
    }
    let Some(value) = decode_bit_masks(n, ctx.field(fields::IMMS), ctx.field(fields::IMMR), sf) else {
        return Err(ctx.reserved("reserved bitmask immediate"));
    };
    let opc = ctx.field(fields::OPC);
    let mnemonic = ["and", "orr", "eor", "ands"][opc as usize];
    let shape = OperandShape::new(mnemonic);
    let shape = if opc == 0b11 {
        shape.gpr_zr(fields::RD, sf).writes_flags()
    } else {
        shape.gpr_sp(fields::RD, sf)
    };
    Ok(shape
        .written()
        .gpr_zr(fields::RN, sf)
        .imm(ImmediateSlot::BitMask { value, is_64bit: sf })
        .sixty_four(sf))
}

/// MOVN, MOVZ, MOVK
pub fn move_wide(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    let sf = ctx.bit(fields::SF);
    let mnemonic = match ctx.field(fields::OPC) {
        0b00 => "movn",
        0b10 => "movz",
        0b11 => "movk",
        _ => return Err(ctx.reserved("unallocated move wide opcode")),
    };
    if !sf && ctx.field(fields::HW) >= 2 {
        return Err(ctx.reserved("32-bit move wide shift above 16"));
    }
    let shape = OperandShape::new(mnemonic).gpr_zr(fields::RD, sf);
    // movk keeps the other halfwords
    let shape = if mnemonic == "movk" {
        shape.read_written()
    } else {
        shape.written()
    };
    Ok(shape
        .imm_field(imm::IMM16)
        .imm(ImmediateSlot::MoveWideShift)
        .sixty_four(sf))
}

/// SBFM, BFM, UBFM
pub fn bitfield(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    let sf = ctx.bit(fields::SF);
    let mnemonic = match ctx.field(fields::OPC) {
        0b00 => "sbfm",
        0b01 => "bfm",
        0b10 => "ubfm",
        _ => return Err(ctx.reserved("unallocated bitfield opcode")),
    };
    if sf != ctx.bit(fields::N) {
        return Err(ctx.reserved("bitfield N must equal sf"));
    }
    if !sf && (ctx.field(fields::IMMR) >= 32 || ctx.field(fields::IMMS) >= 32) {
        return Err(ctx.reserved("32-bit bitfield position above 31"));
    }
    let shape = OperandShape::new(mnemonic).gpr_zr(fields::RD, sf);
    // bfm inserts into the destination
    let shape = if mnemonic == "bfm" {
        shape.read_written()
    } else {
        shape.written()
    };
    Ok(shape
        .gpr_zr(fields::RN, sf)
        .imm_field(imm::IMMR)
        .imm_field(imm::IMMS)
        .sixty_four(sf))
}

/// EXTR
pub fn extract(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    let sf = ctx.bit(fields::SF);
    if ctx.field(fields::OPC) != 0 || ctx.bit(EXTR_O0) {
        return Err(ctx.reserved("unallocated extract opcode"));
    }
    if sf != ctx.bit(fields::N) {
        return Err(ctx.reserved("extract N must equal sf"));
    }
    if !sf && ctx.field(fields::IMMS) >= 32 {
        return Err(ctx.reserved("32-bit extract lsb above 31"));
    }
    Ok(OperandShape::new("extr")
        .gpr_zr(fields::RD, sf)
        .written()
        .gpr_zr(fields::RN, sf)
        .gpr_zr(fields::RM, sf)
        .imm_field(imm::IMMS)
        .sixty_four(sf))
}
