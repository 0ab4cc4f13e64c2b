//! Branches, exception generating and system instructions.

use armlens_core::{register::arm64, Condition};

use crate::arm64::bits::{fields, FieldSpec};
use crate::arm64::decoder::DecodeContext;
use crate::arm64::shape::{imm, BranchKind, ImmediateSlot, OperandShape, OperandSlot, PcRelativeKind};
use crate::DecodeError;

const BRANCH_OPC: FieldSpec = FieldSpec::new(21, 24);
const BRANCH_OP2: FieldSpec = FieldSpec::new(16, 20);
const BRANCH_OP4: FieldSpec = FieldSpec::new(0, 4);
const COMPARE_OP: FieldSpec = FieldSpec::bit(24);
const EXCEPTION_OPC: FieldSpec = FieldSpec::new(21, 23);
const EXCEPTION_OP2: FieldSpec = FieldSpec::new(2, 4);
const EXCEPTION_LL: FieldSpec = FieldSpec::new(0, 1);

const CONDITIONAL_BRANCHES: [&str; 16] = [
    "b.eq", "b.ne", "b.hs", "b.lo", "b.mi", "b.pl", "b.vs", "b.vc", "b.hi", "b.ls", "b.ge", "b.lt",
    "b.gt", "b.le", "b.al", "b.nv",
];

/// UDF
pub fn udf(_ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    Ok(OperandShape::new("udf")
        .imm_field(imm::UDF_IMM16)
        .branch(BranchKind::Halt))
}

/// B, BL
pub fn unconditional_immediate(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    let kind = PcRelativeKind::Branch26;
    let (mnemonic, branch) = if ctx.bit(fields::SF) {
        ("bl", BranchKind::Call(kind))
    } else {
        ("b", BranchKind::Jump(kind))
    };
    Ok(OperandShape::new(mnemonic)
        .slot(OperandSlot::PcRelative(kind))
        .branch(branch))
}

/// CBZ, CBNZ
pub fn compare_and_branch(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    let sf = ctx.bit(fields::SF);
    let kind = PcRelativeKind::Branch19;
    let mnemonic = if ctx.bit(COMPARE_OP) { "cbnz" } else { "cbz" };
    Ok(OperandShape::new(mnemonic)
        .gpr_zr(fields::RT, sf)
        .slot(OperandSlot::PcRelative(kind))
        .sixty_four(sf)
        .branch(BranchKind::Conditional(kind)))
}

/// TBZ, TBNZ
pub fn test_and_branch(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    // b5 selects both the tested bit's high half and the register width
    let wide = ctx.bit(fields::B5);
    let kind = PcRelativeKind::Branch14;
    let mnemonic = if ctx.bit(COMPARE_OP) { "tbnz" } else { "tbz" };
    Ok(OperandShape::new(mnemonic)
        .gpr_zr(fields::RT, wide)
        .imm(ImmediateSlot::TestBitNumber)
        .slot(OperandSlot::PcRelative(kind))
        .sixty_four(wide)
        .branch(BranchKind::Conditional(kind)))
}

/// B.cond
pub fn conditional(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    let cond = ctx.field(fields::COND_BRANCH);
    let kind = PcRelativeKind::Branch19;
    Ok(OperandShape::new(CONDITIONAL_BRANCHES[cond as usize])
        .slot(OperandSlot::PcRelative(kind))
        .condition(Condition::from_bits(cond))
        .branch(BranchKind::Conditional(kind)))
}

/// BR, BLR, RET, ERET, DRPS
pub fn unconditional_register(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    if ctx.field(BRANCH_OP2) != 0b11111 {
        return Err(ctx.reserved("branch register op2 must be all ones"));
    }
    if ctx.field(BRANCH_OP4) != 0 {
        return Err(ctx.reserved("branch register op4 must be zero"));
    }
    let shape = match ctx.field(BRANCH_OPC) {
        0b0000 => OperandShape::new("br").branch(BranchKind::IndirectJump),
        0b0001 => OperandShape::new("blr").branch(BranchKind::IndirectCall),
        0b0010 => OperandShape::new("ret").branch(BranchKind::Return),
        opc @ (0b0100 | 0b0101) => {
            if ctx.field(fields::RN) != 0b11111 {
                return Err(ctx.reserved("exception return requires Rn = 31"));
            }
            let mnemonic = if opc == 0b0100 { "eret" } else { "drps" };
            return Ok(OperandShape::new(mnemonic).branch(BranchKind::Halt));
        }
        _ => return Err(ctx.reserved("unallocated branch register opcode")),
    };
    Ok(shape.gpr_zr(fields::RN, true).sixty_four(true))
}

/// SVC, HVC, SMC, BRK, HLT, DCPS1-3
pub fn exception(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    if ctx.field(EXCEPTION_OP2) != 0 {
        return Err(ctx.reserved("exception op2 must be zero"));
    }
    let (mnemonic, branch) = match (ctx.field(EXCEPTION_OPC), ctx.field(EXCEPTION_LL)) {
        (0b000, 0b01) => ("svc", BranchKind::Exception),
        (0b000, 0b10) => ("hvc", BranchKind::Exception),
        (0b000, 0b11) => ("smc", BranchKind::Exception),
        (0b001, 0b00) => ("brk", BranchKind::Halt),
        (0b010, 0b00) => ("hlt", BranchKind::Halt),
        (0b101, 0b01) => ("dcps1", BranchKind::Halt),
        (0b101, 0b10) => ("dcps2", BranchKind::Halt),
        (0b101, 0b11) => ("dcps3", BranchKind::Halt),
        _ => return Err(ctx.reserved("unallocated exception opcode")),
    };
    Ok(OperandShape::new(mnemonic)
        .imm_field(imm::EXCEPTION_IMM16)
        .branch(branch))
}

/// NOP, YIELD, WFE, WFI, SEV, SEVL, HINT #imm
pub fn hint(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    let named = match ctx.field(fields::HINT) {
        0 => "nop",
        1 => "yield",
        2 => "wfe",
        3 => "wfi",
        4 => "sev",
        5 => "sevl",
        // unallocated hints execute as NOP
        _ => return Ok(OperandShape::new("hint").imm_field(imm::HINT)),
    };
    Ok(OperandShape::new(named))
}

/// CLREX, DSB, DMB, ISB, SB
pub fn barrier(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    let mnemonic = match ctx.field(fields::OP2) {
        0b010 => "clrex",
        0b100 => "dsb",
        0b101 => "dmb",
        0b110 => "isb",
        0b111 => {
            if ctx.field(fields::CRM) != 0 {
                return Err(ctx.reserved("sb requires CRm = 0"));
            }
            return Ok(OperandShape::new("sb"));
        }
        _ => return Err(ctx.reserved("unallocated barrier opcode")),
    };
    Ok(OperandShape::new(mnemonic).imm_field(imm::CRM))
}

/// CFINV, XAFLAG, AXFLAG, MSR (immediate) to a PSTATE field
pub fn pstate_immediate(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    let (op1, op2) = (ctx.field(fields::OP1), ctx.field(fields::OP2));
    if op1 == 0b000 && op2 <= 0b010 {
        if ctx.field(fields::CRM) != 0 {
            return Err(ctx.reserved("flag manipulation requires CRm = 0"));
        }
        let mnemonic = ["cfinv", "xaflag", "axflag"][op2 as usize];
        return Ok(OperandShape::new(mnemonic).reads_flags().writes_flags());
    }
    let field = match (op1, op2) {
        (0b000, 0b011) => arm64::UAO,
        (0b000, 0b100) => arm64::PAN,
        (0b000, 0b101) => arm64::SPSEL,
        (0b011, 0b110) => arm64::DAIFSET,
        (0b011, 0b111) => arm64::DAIFCLR,
        _ => return Err(ctx.reserved("PSTATE field not decoded")),
    };
    Ok(OperandShape::new("msr")
        .slot(OperandSlot::Pstate(field))
        .written()
        .imm_field(imm::CRM))
}

/// SYS, SYSL
pub fn system_instruction(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    if ctx.bit(fields::SYS_L) {
        Ok(OperandShape::new("sysl")
            .gpr_zr(fields::RT, true)
            .written()
            .imm_field(imm::OP1)
            .imm_field(imm::CRN)
            .imm_field(imm::CRM)
            .imm_field(imm::OP2)
            .sixty_four(true))
    } else {
        Ok(OperandShape::new("sys")
            .imm_field(imm::OP1)
            .imm_field(imm::CRN)
            .imm_field(imm::CRM)
            .imm_field(imm::OP2)
            .gpr_zr(fields::RT, true)
            .sixty_four(true))
    }
}

/// MRS, MSR (register)
pub fn system_register_move(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    let is_nzcv = ctx.field(fields::SYSREG) == arm64::NZCV_SYSREG as u32;
    let shape = if ctx.bit(fields::SYS_L) {
        let shape = OperandShape::new("mrs")
            .gpr_zr(fields::RT, true)
            .written()
            .slot(OperandSlot::SystemRegister);
        if is_nzcv {
            shape.reads_flags()
        } else {
            shape
        }
    } else {
        let shape = OperandShape::new("msr")
            .slot(OperandSlot::SystemRegister)
            .written()
            .gpr_zr(fields::RT, true);
        if is_nzcv {
            shape.writes_flags()
        } else {
            shape
        }
    };
    Ok(shape.sixty_four(true))
}
