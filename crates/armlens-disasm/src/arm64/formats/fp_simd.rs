//! Scalar floating point and Advanced SIMD.

use armlens_core::{Access, Condition, VectorArrangement};

use crate::arm64::bits::{fields, FieldSpec};
use crate::arm64::decoder::DecodeContext;
use crate::arm64::registers::{FpWidth, RegisterMapper, UnsupportedRegister};
use crate::arm64::shape::{imm, ImmediateSlot, OperandShape};
use crate::DecodeError;

const FP_COMPARE_OP: FieldSpec = FieldSpec::new(14, 15);
const FP_COMPARE_OPCODE2: FieldSpec = FieldSpec::new(0, 4);
const FP_DP1_OPCODE: FieldSpec = FieldSpec::new(15, 20);
const FP_DP2_OPCODE: FieldSpec = FieldSpec::new(12, 15);
const FP_CCMP_OP: FieldSpec = FieldSpec::bit(4);
const FP_IMM5: FieldSpec = FieldSpec::new(5, 9);
const FP_DP3_O1: FieldSpec = FieldSpec::bit(21);
const FP_DP3_O0: FieldSpec = FieldSpec::bit(15);
const SIMD_OPCODE: FieldSpec = FieldSpec::new(11, 15);
const SIMD_MISC_OPCODE: FieldSpec = FieldSpec::new(12, 16);
/// High bit of `size`; selects between paired FP operations.
const SIMD_FP_A: FieldSpec = FieldSpec::bit(23);
/// Low bit of `size`; the FP element size.
const SIMD_FP_SZ: FieldSpec = FieldSpec::bit(22);

fn fp_width(ctx: &DecodeContext) -> Result<FpWidth, DecodeError> {
    RegisterMapper::fp_type(ctx.field(fields::FTYPE)).map_err(|err| ctx.register_error(err))
}

/// FCMP, FCMPE
pub fn compare(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    if ctx.field(FP_COMPARE_OP) != 0 || ctx.field(FP_COMPARE_OPCODE2) & 0b00111 != 0 {
        return Err(ctx.reserved("unallocated FP compare opcode"));
    }
    let width = fp_width(ctx)?;
    let opcode2 = ctx.field(FP_COMPARE_OPCODE2);
    let mnemonic = if opcode2 & 0b10000 != 0 { "fcmpe" } else { "fcmp" };
    let shape = OperandShape::new(mnemonic).fp(fields::RN, width);
    let shape = if opcode2 & 0b01000 != 0 {
        shape.imm(ImmediateSlot::Constant { value: 0, size: width.bits() as u8 })
    } else {
        shape.fp(fields::RM, width)
    };
    Ok(shape.writes_flags())
}

/// FMOV, FABS, FNEG, FSQRT, FCVT, FRINT* (register)
pub fn one_source(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    let width = fp_width(ctx)?;
    let opcode = ctx.field(FP_DP1_OPCODE);
    let (mnemonic, dest) = match opcode {
        0b000000 => ("fmov", width),
        0b000001 => ("fabs", width),
        0b000010 => ("fneg", width),
        0b000011 => ("fsqrt", width),
        0b000100 | 0b000101 | 0b000111 => {
            let dest = RegisterMapper::fp_type(opcode & 0b11).map_err(|err| ctx.register_error(err))?;
            if dest == width {
                return Err(ctx.reserved("fcvt to the same precision"));
            }
            ("fcvt", dest)
        }
        0b001000 => ("frintn", width),
        0b001001 => ("frintp", width),
        0b001010 => ("frintm", width),
        0b001011 => ("frintz", width),
        0b001100 => ("frinta", width),
        0b001110 => ("frintx", width),
        0b001111 => ("frinti", width),
        0b000110 | 0b001101 => return Err(ctx.reserved("unallocated FP one-source opcode")),
        _ => return Err(ctx.reserved("FP one-source opcode not decoded")),
    };
    Ok(OperandShape::new(mnemonic)
        .fp(fields::RD, dest)
        .written()
        .fp(fields::RN, width))
}

/// FMUL, FDIV, FADD, FSUB, FMAX, FMIN, FMAXNM, FMINNM, FNMUL
pub fn two_source(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    const MNEMONICS: [&str; 9] = [
        "fmul", "fdiv", "fadd", "fsub", "fmax", "fmin", "fmaxnm", "fminnm", "fnmul",
    ];
    let width = fp_width(ctx)?;
    let Some(&mnemonic) = MNEMONICS.get(ctx.field(FP_DP2_OPCODE) as usize) else {
        return Err(ctx.reserved("unallocated FP two-source opcode"));
    };
    Ok(OperandShape::new(mnemonic)
        .fp(fields::RD, width)
        .written()
        .fp(fields::RN, width)
        .fp(fields::RM, width))
}

/// FCCMP, FCCMPE
pub fn conditional_compare(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    let width = fp_width(ctx)?;
    let mnemonic = if ctx.bit(FP_CCMP_OP) { "fccmpe" } else { "fccmp" };
    Ok(OperandShape::new(mnemonic)
        .fp(fields::RN, width)
        .fp(fields::RM, width)
        .imm_field(imm::NZCV)
        .condition(Condition::from_bits(ctx.field(fields::COND)))
        .writes_flags())
}

/// FCSEL
pub fn conditional_select(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    let width = fp_width(ctx)?;
    Ok(OperandShape::new("fcsel")
        .fp(fields::RD, width)
        .written()
        .fp(fields::RN, width)
        .fp(fields::RM, width)
        .condition(Condition::from_bits(ctx.field(fields::COND))))
}

/// FMOV (scalar, immediate)
pub fn immediate(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    if ctx.field(FP_IMM5) != 0 {
        return Err(ctx.reserved("FP immediate imm5 must be zero"));
    }
    let width = fp_width(ctx)?;
    Ok(OperandShape::new("fmov")
        .fp(fields::RD, width)
        .written()
        .imm(ImmediateSlot::FloatingPoint(width)))
}

/// FMADD, FMSUB, FNMADD, FNMSUB
pub fn three_source(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    let width = fp_width(ctx)?;
    let mnemonic = match (ctx.bit(FP_DP3_O1), ctx.bit(FP_DP3_O0)) {
        (false, false) => "fmadd",
        (false, true) => "fmsub",
        (true, false) => "fnmadd",
        (true, true) => "fnmsub",
    };
    Ok(OperandShape::new(mnemonic)
        .fp(fields::RD, width)
        .written()
        .fp(fields::RN, width)
        .fp(fields::RM, width)
        .fp(fields::RA, width))
}

/// FCVT[NPMZA][SU], SCVTF, UCVTF, FMOV (general)
pub fn integer_conversion(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    let sf = ctx.bit(fields::SF);
    let rmode = ctx.field(fields::RMODE);
    let opcode = ctx.field(fields::FP_OPCODE);
    let ftype = ctx.field(fields::FTYPE);

    if rmode == 0b01 && opcode >= 0b110 && ftype == 0b10 {
        return Err(ctx.reserved("fmov to or from the top half of a vector not decoded"));
    }
    let width = fp_width(ctx)?;

    enum Direction {
        ToGeneral,
        FromGeneral,
    }
    let (mnemonic, direction) = match (rmode, opcode) {
        (0b00, 0b000) => ("fcvtns", Direction::ToGeneral),
        (0b00, 0b001) => ("fcvtnu", Direction::ToGeneral),
        (0b00, 0b010) => ("scvtf", Direction::FromGeneral),
        (0b00, 0b011) => ("ucvtf", Direction::FromGeneral),
        (0b00, 0b100) => ("fcvtas", Direction::ToGeneral),
        (0b00, 0b101) => ("fcvtau", Direction::ToGeneral),
        (0b00, 0b110) => ("fmov", Direction::ToGeneral),
        (0b00, 0b111) => ("fmov", Direction::FromGeneral),
        (0b01, 0b000) => ("fcvtps", Direction::ToGeneral),
        (0b01, 0b001) => ("fcvtpu", Direction::ToGeneral),
        (0b10, 0b000) => ("fcvtms", Direction::ToGeneral),
        (0b10, 0b001) => ("fcvtmu", Direction::ToGeneral),
        (0b11, 0b000) => ("fcvtzs", Direction::ToGeneral),
        (0b11, 0b001) => ("fcvtzu", Direction::ToGeneral),
        _ => return Err(ctx.reserved("unallocated FP/integer conversion")),
    };
    if mnemonic == "fmov" {
        let matches_width = match width {
            FpWidth::S => !sf,
            FpWidth::D => sf,
            _ => true,
        };
        if !matches_width {
            return Err(ctx.reserved("fmov between registers of different widths"));
        }
    }

    let shape = OperandShape::new(mnemonic);
    let shape = match direction {
        Direction::ToGeneral => shape.gpr_zr(fields::RD, sf).written().fp(fields::RN, width),
        Direction::FromGeneral => shape.fp(fields::RD, width).written().gpr_zr(fields::RN, sf),
    };
    Ok(shape.sixty_four(sf))
}

/// SCVTF, UCVTF, FCVTZS, FCVTZU (fixed-point)
pub fn fixed_point_conversion(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    let sf = ctx.bit(fields::SF);
    if !sf && ctx.field(fields::SCALE) < 32 {
        return Err(ctx.reserved("32-bit fixed-point scale below 32"));
    }
    let width = fp_width(ctx)?;
    let (mnemonic, to_general) = match (ctx.field(fields::RMODE), ctx.field(fields::FP_OPCODE)) {
        (0b00, 0b010) => ("scvtf", false),
        (0b00, 0b011) => ("ucvtf", false),
        (0b11, 0b000) => ("fcvtzs", true),
        (0b11, 0b001) => ("fcvtzu", true),
        _ => return Err(ctx.reserved("unallocated fixed-point conversion")),
    };
    let shape = OperandShape::new(mnemonic);
    let shape = if to_general {
        shape.gpr_zr(fields::RD, sf).written().fp(fields::RN, width)
    } else {
        shape.fp(fields::RD, width).written().gpr_zr(fields::RN, sf)
    };
    Ok(shape.imm(ImmediateSlot::FractionBits).sixty_four(sf))
}

/// Integer arrangement from `size:Q`; `1D` is never a valid integer vector.
fn integer_arrangement(ctx: &DecodeContext, allow_doubleword: bool) -> Result<VectorArrangement, DecodeError> {
    let size = ctx.field(fields::VSIZE);
    let q = ctx.bit(fields::Q);
    if size == 0b11 && (!q || !allow_doubleword) {
        return Err(ctx.register_error(UnsupportedRegister("undefined vector arrangement")));
    }
    RegisterMapper::arrangement(size, q).map_err(|err| ctx.register_error(err))
}

/// FP arrangement from `sz:Q` (2S, 4S, 2D).
fn fp_arrangement(ctx: &DecodeContext) -> Result<VectorArrangement, DecodeError> {
    let sz = ctx.field(SIMD_FP_SZ);
    let q = ctx.bit(fields::Q);
    if sz == 1 && !q {
        return Err(ctx.register_error(UnsupportedRegister("undefined vector arrangement")));
    }
    RegisterMapper::arrangement(2 + sz, q).map_err(|err| ctx.register_error(err))
}

fn three_vectors(mnemonic: &'static str, arrangement: VectorArrangement) -> OperandShape {
    OperandShape::new(mnemonic)
        .vector(fields::RD, arrangement)
        .written()
        .vector(fields::RN, arrangement)
        .vector(fields::RM, arrangement)
}

/// Advanced SIMD three same (integer, logical and single/double FP subsets)
pub fn simd_three_same(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    let u = ctx.bit(fields::U);
    let opcode = ctx.field(SIMD_OPCODE);

    if opcode & 0b11000 == 0b11000 {
        let a = ctx.bit(SIMD_FP_A);
        let mnemonic = match (opcode, u, a) {
            (0b11010, false, false) => "fadd",
            (0b11010, false, true) => "fsub",
            (0b11010, true, false) => "faddp",
            (0b11010, true, true) => "fabd",
            (0b11011, true, false) => "fmul",
            (0b11111, true, false) => "fdiv",
            (0b11100, false, false) => "fcmeq",
            (0b11100, true, false) => "fcmge",
            (0b11100, true, true) => "fcmgt",
            (0b11110, false, false) => "fmax",
            (0b11110, false, true) => "fmin",
            _ => return Err(ctx.reserved("SIMD FP three-same opcode not decoded")),
        };
        return Ok(three_vectors(mnemonic, fp_arrangement(ctx)?).floating_point());
    }

    if opcode == 0b00011 {
        const LOGICAL: [&str; 4] = ["and", "bic", "orr", "orn"];
        const LOGICAL_U: [&str; 4] = ["eor", "bsl", "bit", "bif"];
        let table = if u { &LOGICAL_U } else { &LOGICAL };
        let arrangement = if ctx.bit(fields::Q) {
            VectorArrangement::B16
        } else {
            VectorArrangement::B8
        };
        let size = ctx.field(fields::VSIZE);
        let mut shape = three_vectors(table[size as usize], arrangement);
        if u && size != 0 {
            // bsl, bit and bif merge into the destination
            shape.access[0] = Access::READ_WRITE;
        }
        return Ok(shape);
    }

    let (mnemonic, allow_doubleword) = match (opcode, u) {
        (0b00000, false) => ("shadd", false),
        (0b00000, true) => ("uhadd", false),
        (0b00110, false) => ("cmgt", true),
        (0b00110, true) => ("cmhi", true),
        (0b00111, false) => ("cmge", true),
        (0b00111, true) => ("cmhs", true),
        (0b01100, false) => ("smax", false),
        (0b01100, true) => ("umax", false),
        (0b01101, false) => ("smin", false),
        (0b01101, true) => ("umin", false),
        (0b10000, false) => ("add", true),
        (0b10000, true) => ("sub", true),
        (0b10001, false) => ("cmtst", true),
        (0b10001, true) => ("cmeq", true),
        (0b10011, false) => ("mul", false),
        (0b10011, true) => {
            if ctx.field(fields::VSIZE) != 0 {
                return Err(ctx.register_error(UnsupportedRegister("pmul is defined for bytes only")));
            }
            ("pmul", false)
        }
        _ => return Err(ctx.reserved("SIMD three-same opcode not decoded")),
    };
    Ok(three_vectors(mnemonic, integer_arrangement(ctx, allow_doubleword)?))
}

/// Advanced SIMD two-register miscellaneous (subset)
pub fn simd_two_register_misc(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    let u = ctx.bit(fields::U);
    let size = ctx.field(fields::VSIZE);
    let opcode = ctx.field(SIMD_MISC_OPCODE);

    if opcode == 0b01111 || opcode == 0b11111 {
        let mnemonic = match (opcode, u, ctx.bit(SIMD_FP_A)) {
            (0b01111, false, true) => "fabs",
            (0b01111, true, true) => "fneg",
            (0b11111, true, true) => "fsqrt",
            _ => return Err(ctx.reserved("SIMD FP two-register opcode not decoded")),
        };
        let arrangement = fp_arrangement(ctx)?;
        return Ok(OperandShape::new(mnemonic)
            .vector(fields::RD, arrangement)
            .written()
            .vector(fields::RN, arrangement)
            .floating_point());
    }

    // (mnemonic, largest allowed size, compares against zero)
    let (mnemonic, max_size, zero) = match (opcode, u) {
        (0b00000, false) => ("rev64", 0b10, false),
        (0b00000, true) => ("rev32", 0b01, false),
        (0b00001, false) => ("rev16", 0b00, false),
        (0b00101, false) => ("cnt", 0b00, false),
        (0b00101, true) => match size {
            0b00 => ("not", 0b00, false),
            0b01 => {
                // rbit reuses size as an opcode bit and always works on bytes
                let arrangement = if ctx.bit(fields::Q) {
                    VectorArrangement::B16
                } else {
                    VectorArrangement::B8
                };
                return Ok(OperandShape::new("rbit")
                    .vector(fields::RD, arrangement)
                    .written()
                    .vector(fields::RN, arrangement));
            }
            _ => return Err(ctx.reserved("unallocated NOT/RBIT size")),
        },
        (0b01000, false) => ("cmgt", 0b11, true),
        (0b01000, true) => ("cmge", 0b11, true),
        (0b01001, false) => ("cmeq", 0b11, true),
        (0b01001, true) => ("cmle", 0b11, true),
        (0b01010, false) => ("cmlt", 0b11, true),
        (0b01011, false) => ("abs", 0b11, false),
        (0b01011, true) => ("neg", 0b11, false),
        _ => return Err(ctx.reserved("SIMD two-register opcode not decoded")),
    };
    if size > max_size {
        return Err(ctx.register_error(UnsupportedRegister("undefined element size")));
    }
    let arrangement = integer_arrangement(ctx, true)?;
    let shape = OperandShape::new(mnemonic)
        .vector(fields::RD, arrangement)
        .written()
        .vector(fields::RN, arrangement);
    if zero {
        return Ok(shape.imm(ImmediateSlot::Constant {
            value: 0,
            size: arrangement.element_bits() as u8,
        }));
    }
    Ok(shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arm64::operands::build_operands;
    use crate::ErrorKind;

    fn render(word: u32, shape: &OperandShape) -> Vec<String> {
        build_operands(word, 0, &shape.slots)
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_fadd_double() {
        // fadd d0, d1, d2: 0x1E622820
        let shape = two_source(&DecodeContext::new(0x1E622820, 0)).unwrap();
        assert_eq!(shape.mnemonic, "fadd");
        assert!(shape.flags.fp);
        assert!(!shape.flags.simd);
        assert_eq!(render(0x1E622820, &shape), ["d0", "d1", "d2"]);
    }

    #[test]
    fn test_undefined_fp_type() {
        // fadd with ftype=10: 0x1EA22820
        let err = two_source(&DecodeContext::new(0x1EA22820, 0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedRegisterEncoding);
    }

    #[test]
    fn test_fcmp_zero() {
        // fcmp s0, #0.0: 0x1E202008
        let shape = compare(&DecodeContext::new(0x1E202008, 0)).unwrap();
        assert_eq!(shape.mnemonic, "fcmp");
        assert!(shape.flags.writes_flags);
        assert_eq!(render(0x1E202008, &shape), ["s0", "#0x0"]);
    }

    #[test]
    fn test_fcvt_precision() {
        // fcvt s0, d1: 0x1E624020
        let shape = one_source(&DecodeContext::new(0x1E624020, 0)).unwrap();
        assert_eq!(shape.mnemonic, "fcvt");
        assert_eq!(render(0x1E624020, &shape), ["s0", "d1"]);
        // fcvt d0, d1 is reserved: 0x1E62C020
        let err = one_source(&DecodeContext::new(0x1E62C020, 0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReservedFieldCombination);
    }

    #[test]
    fn test_fmov_immediate() {
        // fmov d0, #1.0: 0x1E6E1000
        let shape = immediate(&DecodeContext::new(0x1E6E1000, 0)).unwrap();
        let ops = build_operands(0x1E6E1000, 0, &shape.slots);
        assert_eq!(ops[1], armlens_core::Operand::imm_unsigned(1.0f64.to_bits(), 64));
    }

    #[test]
    fn test_integer_conversion_direction() {
        // fmov x0, d0: 0x9E660000
        let shape = integer_conversion(&DecodeContext::new(0x9E660000, 0)).unwrap();
        assert_eq!(render(0x9E660000, &shape), ["x0", "d0"]);
        // scvtf d0, x1: 0x9E620020
        let shape = integer_conversion(&DecodeContext::new(0x9E620020, 0)).unwrap();
        assert_eq!(render(0x9E620020, &shape), ["d0", "x1"]);
        // fmov w0, d0 mixes widths: 0x1E660000
        assert!(integer_conversion(&DecodeContext::new(0x1E660000, 0)).is_err());
    }

    #[test]
    fn test_fixed_point() {
        // scvtf d0, x1, #16: 0x9E42C020
        let shape = fixed_point_conversion(&DecodeContext::new(0x9E42C020, 0)).unwrap();
        assert_eq!(render(0x9E42C020, &shape), ["d0", "x1", "#0x10"]);
        assert_eq!(shape.access, [Access::WRITE, Access::READ, Access::NONE]);
    }

    #[test]
    fn test_fp_conditional() {
        // fcsel d0, d1, d2, eq: 0x1E620C20
        let shape = conditional_select(&DecodeContext::new(0x1E620C20, 0)).unwrap();
        assert_eq!(shape.condition, Some(Condition::Equal));
        // fccmp d0, d1, #0, eq: 0x1E610400
        let shape = conditional_compare(&DecodeContext::new(0x1E610400, 0)).unwrap();
        assert!(shape.flags.reads_flags && shape.flags.writes_flags);
    }

    #[test]
    fn test_vector_add() {
        // add v0.4s, v1.4s, v2.4s: 0x4EA28420
        let shape = simd_three_same(&DecodeContext::new(0x4EA28420, 0)).unwrap();
        assert_eq!(shape.mnemonic, "add");
        assert!(shape.flags.simd);
        assert_eq!(render(0x4EA28420, &shape), ["v0.4s", "v1.4s", "v2.4s"]);
        // add with size=11 Q=0 (1D): 0x0EE28420
        let err = simd_three_same(&DecodeContext::new(0x0EE28420, 0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedRegisterEncoding);
    }

    #[test]
    fn test_vector_fp() {
        // fadd v0.2d, v1.2d, v2.2d: 0x4E62D420
        let shape = simd_three_same(&DecodeContext::new(0x4E62D420, 0)).unwrap();
        assert_eq!(shape.mnemonic, "fadd");
        assert!(shape.flags.fp && shape.flags.simd);
        assert_eq!(render(0x4E62D420, &shape), ["v0.2d", "v1.2d", "v2.2d"]);
    }

    #[test]
    fn test_vector_logical() {
        // orr v0.16b, v1.16b, v2.16b: 0x4EA21C20
        let shape = simd_three_same(&DecodeContext::new(0x4EA21C20, 0)).unwrap();
        assert_eq!(shape.mnemonic, "orr");
        assert_eq!(render(0x4EA21C20, &shape), ["v0.16b", "v1.16b", "v2.16b"]);
        assert_eq!(shape.access[0], Access::WRITE);
        // bsl v0.16b, v1.16b, v2.16b: 0x6E621C20
        let shape = simd_three_same(&DecodeContext::new(0x6E621C20, 0)).unwrap();
        assert_eq!(shape.mnemonic, "bsl");
        assert_eq!(shape.access[0], Access::READ_WRITE);
    }

    #[test]
    fn test_matched_but_not_decoded_is_reserved() {
        // sqadd v0.4s, v1.4s, v2.4s: 0x4EA20C20
        let err = simd_three_same(&DecodeContext::new(0x4EA20C20, 0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReservedFieldCombination);
        // fmov x0, v0.d[1]: 0x9EAE0000
        let err = integer_conversion(&DecodeContext::new(0x9EAE0000, 0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReservedFieldCombination);
    }

    #[test]
    fn test_two_register_misc() {
        // not v0.16b, v1.16b: 0x6E205820
        let shape = simd_two_register_misc(&DecodeContext::new(0x6E205820, 0)).unwrap();
        assert_eq!(shape.mnemonic, "not");
        assert_eq!(render(0x6E205820, &shape), ["v0.16b", "v1.16b"]);
        // cmeq v0.4s, v1.4s, #0: 0x4EA09820
        let shape = simd_two_register_misc(&DecodeContext::new(0x4EA09820, 0)).unwrap();
        assert_eq!(render(0x4EA09820, &shape), ["v0.4s", "v1.4s", "#0x0"]);
        // cnt with size=01: 0x4E605820
        let err = simd_two_register_misc(&DecodeContext::new(0x4E605820, 0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedRegisterEncoding);
    }
}
