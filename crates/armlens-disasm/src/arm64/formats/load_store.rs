//! Loads and stores.

use armlens_core::{Access, PairIndexing};

use crate::arm64::bits::{fields, FieldSpec};
use crate::arm64::decoder::DecodeContext;
use crate::arm64::registers::FpWidth;
use crate::arm64::shape::{imm, AddressingKind, OperandShape};
use crate::DecodeError;

const EXCLUSIVE_O2: FieldSpec = FieldSpec::bit(23);
const EXCLUSIVE_O0: FieldSpec = FieldSpec::bit(15);
const PAIR_SZ: FieldSpec = FieldSpec::bit(30);
const LITERAL_OPC: FieldSpec = FieldSpec::new(30, 31);
const PAIR_OPC: FieldSpec = FieldSpec::new(30, 31);
const PAIR_INDEXING: FieldSpec = FieldSpec::new(23, 25);
const UNSIGNED_OFFSET: FieldSpec = FieldSpec::bit(24);
const REGISTER_OFFSET: FieldSpec = FieldSpec::bit(21);
const INDEX_MODE: FieldSpec = FieldSpec::new(10, 11);

/// Mnemonics indexed by `L:o0` for each `o2` and size suffix.
const EXCLUSIVE: [[&str; 4]; 2] = [
    ["stxr", "stlxr", "ldxr", "ldaxr"],
    ["stllr", "stlr", "ldlar", "ldar"],
];
const EXCLUSIVE_B: [[&str; 4]; 2] = [
    ["stxrb", "stlxrb", "ldxrb", "ldaxrb"],
    ["stllrb", "stlrb", "ldlarb", "ldarb"],
];
const EXCLUSIVE_H: [[&str; 4]; 2] = [
    ["stxrh", "stlxrh", "ldxrh", "ldaxrh"],
    ["stllrh", "stlrh", "ldlarh", "ldarh"],
];

/// Load-exclusive, store-exclusive, load-acquire and store-release (single register)
pub fn exclusive(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    let size = ctx.field(fields::SIZE);
    let o2 = ctx.field(EXCLUSIVE_O2) as usize;
    let load = ctx.bit(fields::L);
    let index = ((load as usize) << 1) | ctx.field(EXCLUSIVE_O0) as usize;
    let table = match size {
        0b00 => &EXCLUSIVE_B,
        0b01 => &EXCLUSIVE_H,
        _ => &EXCLUSIVE,
    };
    let mnemonic = table[o2][index];
    let wide = size == 0b11;

    let shape = OperandShape::new(mnemonic);
    // only the exclusive stores report a status register
    let shape = if o2 == 0 && !load {
        shape.gpr_zr(fields::RS, false).written()
    } else {
        shape
    };
    let shape = shape.gpr_zr(fields::RT, wide);
    let shape = if load {
        shape.written().memory(AddressingKind::Exclusive, size as u8)
    } else {
        shape.memory(AddressingKind::Exclusive, size as u8).written()
    };
    Ok(shape.sixty_four(wide))
}

/// LDXP, LDAXP, STXP, STLXP
pub fn exclusive_pair(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    let wide = ctx.bit(PAIR_SZ);
    let load = ctx.bit(fields::L);
    let acquire_release = ctx.bit(EXCLUSIVE_O0);
    let mnemonic = match (load, acquire_release) {
        (false, false) => "stxp",
        (false, true) => "stlxp",
        (true, false) => "ldxp",
        (true, true) => "ldaxp",
    };
    let shape = OperandShape::new(mnemonic);
    let shape = if load {
        shape
            .gpr_zr(fields::RT, wide)
            .written()
            .gpr_zr(fields::RT2, wide)
            .written()
            .memory(AddressingKind::ExclusivePair, 2 + wide as u8)
    } else {
        shape
            .gpr_zr(fields::RS, false)
            .written()
            .gpr_zr(fields::RT, wide)
            .gpr_zr(fields::RT2, wide)
            .memory(AddressingKind::ExclusivePair, 2 + wide as u8)
            .written()
    };
    Ok(shape.sixty_four(wide))
}

/// LDR, LDRSW, PRFM (literal)
pub fn literal(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    let opc = ctx.field(LITERAL_OPC);
    if ctx.bit(fields::V) {
        let width = match opc {
            0b00 => FpWidth::S,
            0b01 => FpWidth::D,
            0b10 => FpWidth::Q,
            _ => return Err(ctx.reserved("unallocated SIMD&FP literal size")),
        };
        return Ok(OperandShape::new("ldr")
            .fp(fields::RT, width)
            .written()
            .memory(AddressingKind::Literal, width.log2_bytes()));
    }
    let shape = match opc {
        0b00 => OperandShape::new("ldr")
            .gpr_zr(fields::RT, false)
            .written()
            .memory(AddressingKind::Literal, 2),
        0b01 => OperandShape::new("ldr")
            .gpr_zr(fields::RT, true)
            .written()
            .memory(AddressingKind::Literal, 3)
            .sixty_four(true),
        0b10 => OperandShape::new("ldrsw")
            .gpr_zr(fields::RT, true)
            .written()
            .memory(AddressingKind::Literal, 2)
            .sixty_four(true),
        _ => OperandShape::new("prfm")
            .imm_field(imm::PRFOP)
            .memory(AddressingKind::Literal, 3),
    };
    Ok(shape)
}

/// LDP, STP, LDPSW, LDNP, STNP
pub fn pair(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    let indexing = match ctx.field(PAIR_INDEXING) {
        0b000 => PairIndexing::NonTemporal,
        0b001 => PairIndexing::PostIndex,
        0b010 => PairIndexing::Offset,
        _ => PairIndexing::PreIndex,
    };
    let non_temporal = indexing == PairIndexing::NonTemporal;
    let load = ctx.bit(fields::L);
    let opc = ctx.field(PAIR_OPC);
    let kind = AddressingKind::Pair(indexing);

    let base = match (non_temporal, load) {
        (true, true) => "ldnp",
        (true, false) => "stnp",
        (false, true) => "ldp",
        (false, false) => "stp",
    };

    if ctx.bit(fields::V) {
        let width = match opc {
            0b00 => FpWidth::S,
            0b01 => FpWidth::D,
            0b10 => FpWidth::Q,
            _ => return Err(ctx.reserved("unallocated SIMD&FP pair size")),
        };
        let shape = OperandShape::new(base).fp(fields::RT, width).fp(fields::RT2, width);
        return Ok(transfer(shape, load, 2).memory(kind, width.log2_bytes()).stored(!load));
    }

    let (mnemonic, wide, element_log2) = match opc {
        0b00 => (base, false, 2),
        0b01 if load && !non_temporal => ("ldpsw", true, 2),
        0b01 if !non_temporal => return Err(ctx.reserved("stgp not decoded")),
        0b10 => (base, true, 3),
        _ => return Err(ctx.reserved("unallocated pair opcode")),
    };
    let shape = OperandShape::new(mnemonic)
        .gpr_zr(fields::RT, wide)
        .gpr_zr(fields::RT2, wide);
    Ok(transfer(shape, load, 2)
        .memory(kind, element_log2)
        .stored(!load)
        .sixty_four(wide))
}

/// Marks the last `count` transfer registers as written by a load.
fn transfer(mut shape: OperandShape, load: bool, count: usize) -> OperandShape {
    if load {
        let start = shape.access.len().saturating_sub(count);
        for access in &mut shape.access[start..] {
            *access = Access::WRITE;
        }
    }
    shape
}

#[derive(Clone, Copy)]
enum SingleOp {
    Store,
    Load,
    /// Sign-extending load into an X register.
    LoadSigned64,
    /// Sign-extending load into a W register.
    LoadSigned32,
    Prefetch,
}

/// Mnemonic families indexed by size for plain, unscaled and unprivileged forms.
fn single_mnemonic(kind: AddressingKind, op: SingleOp, size: u32) -> Option<&'static str> {
    const STORE: [[&str; 4]; 3] = [
        ["strb", "strh", "str", "str"],
        ["sturb", "sturh", "stur", "stur"],
        ["sttrb", "sttrh", "sttr", "sttr"],
    ];
    const LOAD: [[&str; 4]; 3] = [
        ["ldrb", "ldrh", "ldr", "ldr"],
        ["ldurb", "ldurh", "ldur", "ldur"],
        ["ldtrb", "ldtrh", "ldtr", "ldtr"],
    ];
    const LOAD_SIGNED: [[&str; 3]; 3] = [
        ["ldrsb", "ldrsh", "ldrsw"],
        ["ldursb", "ldursh", "ldursw"],
        ["ldtrsb", "ldtrsh", "ldtrsw"],
    ];
    let family = match kind {
        AddressingKind::Unscaled => 1,
        AddressingKind::Unprivileged => 2,
        _ => 0,
    };
    let size = size as usize;
    match op {
        SingleOp::Store => Some(STORE[family][size]),
        SingleOp::Load => Some(LOAD[family][size]),
        SingleOp::LoadSigned64 | SingleOp::LoadSigned32 => LOAD_SIGNED[family].get(size).copied(),
        SingleOp::Prefetch => match family {
            0 => Some("prfm"),
            1 => Some("prfum"),
            _ => None,
        },
    }
}

/// Single-register loads and stores: unscaled, post-index, unprivileged,
/// pre-index, register offset and unsigned offset.
pub fn single(ctx: &DecodeContext) -> Result<OperandShape, DecodeError> {
    let kind = if ctx.bit(UNSIGNED_OFFSET) {
        AddressingKind::UnsignedOffset
    } else if ctx.bit(REGISTER_OFFSET) {
        AddressingKind::RegisterOffset
    } else {
        match ctx.field(INDEX_MODE) {
            0b00 => AddressingKind::Unscaled,
            0b01 => AddressingKind::PostIndex,
            0b10 => AddressingKind::Unprivileged,
            _ => AddressingKind::PreIndex,
        }
    };
    if kind == AddressingKind::RegisterOffset && ctx.field(fields::OPTION) & 0b010 == 0 {
        return Err(ctx.reserved("register offset extend must be UXTW, LSL, SXTW or SXTX"));
    }

    let size = ctx.field(fields::SIZE);
    let opc = ctx.field(fields::LDST_OPC);

    if ctx.bit(fields::V) {
        return single_simd(ctx, kind, size, opc);
    }

    let op = match (opc, size) {
        (0b00, _) => SingleOp::Store,
        (0b01, _) => SingleOp::Load,
        (0b10, 0b11) => SingleOp::Prefetch,
        (0b10, _) => SingleOp::LoadSigned64,
        (0b11, 0b00 | 0b01) => SingleOp::LoadSigned32,
        _ => return Err(ctx.reserved("unallocated load/store opcode")),
    };
    if matches!(op, SingleOp::Prefetch)
        && matches!(kind, AddressingKind::PreIndex | AddressingKind::PostIndex)
    {
        return Err(ctx.reserved("prefetch has no writeback form"));
    }
    let Some(mnemonic) = single_mnemonic(kind, op, size) else {
        return Err(ctx.reserved("unallocated unprivileged prefetch"));
    };

    let shape = OperandShape::new(mnemonic);
    let (shape, wide) = match op {
        SingleOp::Prefetch => (shape.imm_field(imm::PRFOP), false),
        SingleOp::LoadSigned64 => (shape.gpr_zr(fields::RT, true).written(), true),
        SingleOp::LoadSigned32 => (shape.gpr_zr(fields::RT, false).written(), false),
        SingleOp::Load => {
            let wide = size == 0b11;
            (shape.gpr_zr(fields::RT, wide).written(), wide)
        }
        SingleOp::Store => {
            let wide = size == 0b11;
            (shape.gpr_zr(fields::RT, wide), wide)
        }
    };
    let store = matches!(op, SingleOp::Store);
    Ok(shape.memory(kind, size as u8).stored(store).sixty_four(wide))
}

fn single_simd(
    ctx: &DecodeContext,
    kind: AddressingKind,
    size: u32,
    opc: u32,
) -> Result<OperandShape, DecodeError> {
    if kind == AddressingKind::Unprivileged {
        return Err(ctx.reserved("no unprivileged SIMD&FP access"));
    }
    let log2 = if opc & 0b10 != 0 {
        if size != 0 {
            return Err(ctx.reserved("128-bit access requires size 00"));
        }
        4
    } else {
        size
    };
    let width = FpWidth::from_log2_bytes(log2).ok_or_else(|| ctx.reserved("undefined access size"))?;
    let load = opc & 1 == 1;
    let mnemonic = match (kind, load) {
        (AddressingKind::Unscaled, false) => "stur",
        (AddressingKind::Unscaled, true) => "ldur",
        (_, false) => "str",
        (_, true) => "ldr",
    };
    let shape = OperandShape::new(mnemonic).fp(fields::RT, width);
    Ok(transfer(shape, load, 1).memory(kind, width.log2_bytes()).stored(!load))
}
