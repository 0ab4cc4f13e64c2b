//! Data processing - register.

use armlens_core::Condition;

use crate::arm64::bits::{fields, FieldSpec};
use crate::arm64::decoder::DecodeContext;
use crate::arm64::shape::{imm, OperandShape, OperandSlot};
use crate::DecodeError;

const LOGICAL_N: FieldSpec = FieldSpec::bit(21);
const EXTEND_OPT: FieldSpec = FieldSpec::new(22, 23);
const CCMP_IMMEDIATE: FieldSpec = FieldSpec::bit(11);
const CSEL_OP2: FieldSpec = FieldSpec::new(10, 11);
const DP_OPCODE: FieldSpec = FieldSpec::new(10, 15);
const DP3_OP54: FieldSpec = FieldSpec::new(29, 30);
const DP3_OP31: FieldSpec = FieldSpec::new(21, 23);
const DP3_O0: FieldSpec = FieldSpec::bit(15);
const CRC_C: FieldSpec = FieldSpec::bit(12);
const CRC_SZ: FieldSpec = FieldSpec::new(10, 11);

/// AND, BIC, ORR, ORN, EOR, EON, ANDS, BICS (shifted register)
pub fn logical_shifted(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    let sf = ctx.bit(fields::SF);
    if !sf && ctx.field(fields::IMM6) >= 32 {
        return Err(ctx.reserved("32-bit shift amount above 31"));
    }
    let opc = ctx.field(fields::OPC);
    let invert = ctx.bit(LOGICAL_N);
    let mnemonic = match (opc, invert) {
        (0b00, false) => "and",
        (0b00, true) => "bic",
        (0b01, false) => "orr",
        (0b01, true) => "orn",
        (0b10, false) => "eor",
        (0b10, true) => "eon",
        (_, false) => "ands",
        (_, true) => "bics",
    };
    Ok(OperandShape::new(mnemonic)
        .gpr_zr(fields::RD, sf)
        .written()
        .gpr_zr(fields::RN, sf)
        .slot(OperandSlot::ShiftedRegister { is_64bit: sf })
        .sixty_four(sf)
        .sets_flags(opc == 0b11))
}

fn add_sub_mnemonic(ctx: &DecodeContext) -> &'static str {
    match (ctx.bit(fields::OP), ctx.bit(fields::S)) {
        (false, false) => "add",
        (false, true) => "adds",
        (true, false) => "sub",
        (true, true) => "subs",
    }
}

/// ADD, ADDS, SUB, SUBS (shifted register)
pub fn add_sub_shifted(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    let sf = ctx.bit(fields::SF);
    if ctx.field(fields::SHIFT) == 0b11 {
        return Err(ctx.reserved("ROR is not an add/sub shift"));
    }
    if !sf && ctx.field(fields::IMM6) >= 32 {
        return Err(ctx.reserved("32-bit shift amount above 31"));
    }
    Ok(OperandShape::new(add_sub_mnemonic(ctx))
        .gpr_zr(fields::RD, sf)
        .written()
        .gpr_zr(fields::RN, sf)
        .slot(OperandSlot::ShiftedRegister { is_64bit: sf })
        .sixty_four(sf)
        .sets_flags(ctx.bit(fields::S)))
}

/// ADD, ADDS, SUB, SUBS (extended register)
pub fn add_sub_extended(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    let sf = ctx.bit(fields::SF);
    if ctx.field(EXTEND_OPT) != 0 {
        return Err(ctx.reserved("extended register opt must be zero"));
    }
    if ctx.field(fields::IMM3) > 4 {
        return Err(ctx.reserved("extend shift above 4"));
    }
    let set_flags = ctx.bit(fields::S);
    let shape = OperandShape::new(add_sub_mnemonic(ctx));
    let shape = if set_flags {
        shape.gpr_zr(fields::RD, sf)
    } else {
        shape.gpr_sp(fields::RD, sf)
    };
    Ok(shape
        .written()
        .gpr_sp(fields::RN, sf)
        .slot(OperandSlot::ExtendedRegister { is_64bit: sf })
        .sixty_four(sf)
        .sets_flags(set_flags))
}

/// ADC, ADCS, SBC, SBCS
pub fn add_sub_carry(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    let sf = ctx.bit(fields::SF);
    let mnemonic = match (ctx.bit(fields::OP), ctx.bit(fields::S)) {
        (false, false) => "adc",
        (false, true) => "adcs",
        (true, false) => "sbc",
        (true, true) => "sbcs",
    };
    Ok(OperandShape::new(mnemonic)
        .gpr_zr(fields::RD, sf)
        .written()
        .gpr_zr(fields::RN, sf)
        .gpr_zr(fields::RM, sf)
        .sixty_four(sf)
        .reads_flags()
        .sets_flags(ctx.bit(fields::S)))
}

/// CCMN, CCMP (register and immediate)
pub fn conditional_compare(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    if !ctx.bit(fields::S) {
        return Err(ctx.reserved("conditional compare requires S = 1"));
    }
    let sf = ctx.bit(fields::SF);
    let mnemonic = if ctx.bit(fields::OP) { "ccmp" } else { "ccmn" };
    let shape = OperandShape::new(mnemonic).gpr_zr(fields::RN, sf);
    let shape = if ctx.bit(CCMP_IMMEDIATE) {
        shape.imm_field(imm::CCMP_IMM5)
    } else {
        shape.gpr_zr(fields::RM, sf)
    };
    Ok(shape
        .imm_field(imm::NZCV)
        .condition(Condition::from_bits(ctx.field(fields::COND)))
        .sixty_four(sf)
        .writes_flags())
}

/// CSEL, CSINC, CSINV, CSNEG
pub fn conditional_select(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    if ctx.bit(fields::S) || ctx.field(CSEL_OP2) >= 0b10 {
        return Err(ctx.reserved("unallocated conditional select opcode"));
    }
    let sf = ctx.bit(fields::SF);
    let mnemonic = match (ctx.bit(fields::OP), ctx.field(CSEL_OP2)) {
        (false, 0) => "csel",
        (false, _) => "csinc",
        (true, 0) => "csinv",
        (true, _) => "csneg",
    };
    Ok(OperandShape::new(mnemonic)
        .gpr_zr(fields::RD, sf)
        .written()
        .gpr_zr(fields::RN, sf)
        .gpr_zr(fields::RM, sf)
        .condition(Condition::from_bits(ctx.field(fields::COND)))
        .sixty_four(sf))
}

/// UDIV, SDIV, LSLV, LSRV, ASRV, RORV, CRC32*
pub fn two_source(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    if ctx.bit(fields::S) {
        return Err(ctx.reserved("two-source requires S = 0"));
    }
    let sf = ctx.bit(fields::SF);
    let opcode = ctx.field(DP_OPCODE);
    let mnemonic = match opcode {
        0b000010 => "udiv",
        0b000011 => "sdiv",
        0b001000 => "lslv",
        0b001001 => "lsrv",
        0b001010 => "asrv",
        0b001011 => "rorv",
        0b010000..=0b010111 => return crc32(ctx, sf),
        0b000000 | 0b000001 | 0b000110 | 0b000111 => {
            return Err(ctx.reserved("unallocated two-source opcode"))
        }
        _ => return Err(ctx.reserved("two-source opcode not decoded")),
    };
    Ok(OperandShape::new(mnemonic)
        .gpr_zr(fields::RD, sf)
        .written()
        .gpr_zr(fields::RN, sf)
        .gpr_zr(fields::RM, sf)
        .sixty_four(sf))
}

fn crc32(ctx: &DecodeContext, sf: bool) -> Result<OperandShape, DecodeError> {
    const CRC32: [&str; 4] = ["crc32b", "crc32h", "crc32w", "crc32x"];
    const CRC32C: [&str; 4] = ["crc32cb", "crc32ch", "crc32cw", "crc32cx"];
    let sz = ctx.field(CRC_SZ);
    // only the doubleword form takes a 64-bit operand
    if sf != (sz == 0b11) {
        return Err(ctx.reserved("crc32 size does not match sf"));
    }
    let table = if ctx.bit(CRC_C) { &CRC32C } else { &CRC32 };
    let mnemonic = table[sz as usize];
    Ok(OperandShape::new(mnemonic)
        .gpr_zr(fields::RD, false)
        .written()
        .gpr_zr(fields::RN, false)
        .gpr_zr(fields::RM, sf))
}

/// RBIT, REV16, REV32, REV, CLZ, CLS
pub fn one_source(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    if ctx.bit(fields::S) {
        return Err(ctx.reserved("one-source requires S = 0"));
    }
    let sf = ctx.bit(fields::SF);
    let mnemonic = match (ctx.field(DP_OPCODE), sf) {
        (0b000000, _) => "rbit",
        (0b000001, _) => "rev16",
        (0b000010, false) => "rev",
        (0b000010, true) => "rev32",
        (0b000011, true) => "rev",
        (0b000100, _) => "clz",
        (0b000101, _) => "cls",
        (0b000011, false) => return Err(ctx.reserved("32-bit rev with opcode 3")),
        _ => return Err(ctx.reserved("one-source opcode not decoded")),
    };
    Ok(OperandShape::new(mnemonic)
        .gpr_zr(fields::RD, sf)
        .written()
        .gpr_zr(fields::RN, sf)
        .sixty_four(sf))
}

/// MADD, MSUB, SMADDL, SMSUBL, SMULH, UMADDL, UMSUBL, UMULH
pub fn three_source(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    if ctx.field(DP3_OP54) != 0 {
        return Err(ctx.reserved("three-source op54 must be zero"));
    }
    let sf = ctx.bit(fields::SF);
    let op31 = ctx.field(DP3_OP31);
    let o0 = ctx.bit(DP3_O0);
    if op31 == 0 {
        let mnemonic = if o0 { "msub" } else { "madd" };
        return Ok(OperandShape::new(mnemonic)
            .gpr_zr(fields::RD, sf)
            .written()
            .gpr_zr(fields::RN, sf)
            .gpr_zr(fields::RM, sf)
            .gpr_zr(fields::RA, sf)
            .sixty_four(sf));
    }
    if !sf {
        return Err(ctx.reserved("widening multiply requires sf = 1"));
    }
    let mnemonic = match (op31, o0) {
        (0b001, false) => "smaddl",
        (0b001, true) => "smsubl",
        (0b010, false) => "smulh",
        (0b101, false) => "umaddl",
        (0b101, true) => "umsubl",
        (0b110, false) => "umulh",
        _ => return Err(ctx.reserved("unallocated three-source opcode")),
    };
    if op31 & 0b011 == 0b010 {
        return Ok(OperandShape::new(mnemonic)
            .gpr_zr(fields::RD, true)
            .written()
            .gpr_zr(fields::RN, true)
            .gpr_zr(fields::RM, true)
            .sixty_four(true));
    }
    Ok(OperandShape::new(mnemonic)
        .gpr_zr(fields::RD, true)
        .written()
        .gpr_zr(fields::RN, false)
        .gpr_zr(fields::RM, false)
        .gpr_zr(fields::RA, true)
        .sixty_four(true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arm64::operands::build_operands;
    use crate::arm64::table::DecodeTable;
    use crate::ErrorKind;
    use armlens_core::Access;

    fn render(word: u32, shape: &OperandShape) -> Vec<String> {
        build_operands(word, 0, &shape.slots)
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_mov_register() {
        // mov x0, x1 == orr x0, xzr, x1: 0xAA0103E0
        let shape = logical_shifted(&DecodeContext::new(0xAA0103E0, 0)).unwrap();
        assert_eq!(shape.mnemonic, "orr");
        assert_eq!(render(0xAA0103E0, &shape), ["x0", "xzr", "x1"]);
    }

    #[test]
    fn test_tst_sets_flags() {
        // tst w0, w1 == ands wzr, w0, w1: 0x6A01001F
        let shape = logical_shifted(&DecodeContext::new(0x6A01001F, 0)).unwrap();
        assert_eq!(shape.mnemonic, "ands");
        assert!(shape.flags.writes_flags);
        assert!(!shape.flags.is_64bit);
        assert_eq!(render(0x6A01001F, &shape), ["wzr", "w0", "w1"]);
    }

    #[test]
    fn test_add_shifted() {
        // add x0, x1, x2, lsl #3: 0x8B020C20
        let shape = add_sub_shifted(&DecodeContext::new(0x8B020C20, 0)).unwrap();
        assert_eq!(render(0x8B020C20, &shape), ["x0", "x1", "x2, lsl #3"]);
        // shift=11: 0x8BC20C20
        let err = add_sub_shifted(&DecodeContext::new(0x8BC20C20, 0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReservedFieldCombination);
        // 32-bit with imm6=32: 0x0B028020
        assert!(add_sub_shifted(&DecodeContext::new(0x0B028020, 0)).is_err());
    }

    #[test]
    fn test_add_extended_uses_stack_pointer() {
        // add sp, sp, w2, uxtw #2: 0x8B224BFF
        let shape = add_sub_extended(&DecodeContext::new(0x8B224BFF, 0)).unwrap();
        assert_eq!(render(0x8B224BFF, &shape), ["sp", "sp", "w2, uxtw #2"]);
        // imm3=5: 0x8B2257FF
        assert!(add_sub_extended(&DecodeContext::new(0x8B2257FF, 0)).is_err());
    }

    #[test]
    fn test_conditional_select() {
        // csel x0, x1, x2, eq: 0x9A820020
        let shape = conditional_select(&DecodeContext::new(0x9A820020, 0)).unwrap();
        assert_eq!(shape.mnemonic, "csel");
        assert_eq!(shape.condition, Some(Condition::Equal));
        assert!(shape.flags.reads_flags);
        assert_eq!(render(0x9A820020, &shape), ["x0", "x1", "x2"]);
    }

    #[test]
    fn test_conditional_compare() {
        // ccmp x0, #1, #0, ne: 0xFA411800
        let shape = conditional_compare(&DecodeContext::new(0xFA411800, 0)).unwrap();
        assert_eq!(shape.mnemonic, "ccmp");
        assert_eq!(shape.condition, Some(Condition::NotEqual));
        assert!(shape.flags.reads_flags && shape.flags.writes_flags);
        assert_eq!(render(0xFA411800, &shape), ["x0", "#0x1", "#0x0"]);
    }

    #[test]
    fn test_adc_reads_carry() {
        // adc x0, x1, x2: 0x9A020020
        let shape = add_sub_carry(&DecodeContext::new(0x9A020020, 0)).unwrap();
        assert!(shape.flags.reads_flags);
        assert!(!shape.flags.writes_flags);
        // rmif sits beside adc with opcode2 != 0 and has no table entry: 0xBA000420
        assert!(DecodeTable::get().lookup(0xBA000420).is_none());
    }

    #[test]
    fn test_two_source() {
        // udiv x0, x1, x2: 0x9AC20820
        let shape = two_source(&DecodeContext::new(0x9AC20820, 0)).unwrap();
        assert_eq!(shape.mnemonic, "udiv");
        // crc32x w0, w1, x2: 0x9AC24C20
        let shape = two_source(&DecodeContext::new(0x9AC24C20, 0)).unwrap();
        assert_eq!(shape.mnemonic, "crc32x");
        assert_eq!(render(0x9AC24C20, &shape), ["w0", "w1", "x2"]);
        // crc32x with sf=0: 0x1AC24C20
        assert!(two_source(&DecodeContext::new(0x1AC24C20, 0)).is_err());
    }

    #[test]
    fn test_one_source() {
        // rev x0, x1: 0xDAC00C20
        let shape = one_source(&DecodeContext::new(0xDAC00C20, 0)).unwrap();
        assert_eq!(shape.mnemonic, "rev");
        // rev w0, w1: 0x5AC00820
        let shape = one_source(&DecodeContext::new(0x5AC00820, 0)).unwrap();
        assert_eq!(shape.mnemonic, "rev");
        assert_eq!(render(0x5AC00820, &shape), ["w0", "w1"]);
        // pacia has opcode2 = 1 and no table entry: 0xDAC10020
        assert!(DecodeTable::get().lookup(0xDAC10020).is_none());
        // opcode 0b000110 is matched but not decoded: 0xDAC01820
        let err = one_source(&DecodeContext::new(0xDAC01820, 0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReservedFieldCombination);
    }

    #[test]
    fn test_three_source() {
        // madd x0, x1, x2, x3: 0x9B020C20
        let shape = three_source(&DecodeContext::new(0x9B020C20, 0)).unwrap();
        assert_eq!(render(0x9B020C20, &shape), ["x0", "x1", "x2", "x3"]);
        assert_eq!(shape.access, [Access::WRITE, Access::READ, Access::READ, Access::READ]);
        // smaddl x0, w1, w2, x3: 0x9B220C20
        let shape = three_source(&DecodeContext::new(0x9B220C20, 0)).unwrap();
        assert_eq!(shape.mnemonic, "smaddl");
        assert_eq!(render(0x9B220C20, &shape), ["x0", "w1", "w2", "x3"]);
        // umulh x0, x1, x2: 0x9BC27C20
        let shape = three_source(&DecodeContext::new(0x9BC27C20, 0)).unwrap();
        assert_eq!(render(0x9BC27C20, &shape), ["x0", "x1", "x2"]);
    }
}
