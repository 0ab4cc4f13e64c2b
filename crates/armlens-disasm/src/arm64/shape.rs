//! Pending-operand shapes.
//!
//! Once a word's format is identified, the format's shape function reads the
//! selector sub-fields (`sf`, `opc`, `size`, `V`, ...), rejects reserved
//! combinations, and returns an [`OperandShape`]: an ordered list of operand
//! slots describing how each operand is built from the raw word. Building the
//! operands from a shape cannot fail, so deferring it never changes the result.

use armlens_core::{register::arm64, Access, Condition, ImplicitOperand, PairIndexing, VectorArrangement};

use super::bits::{fields, FieldSpec};
use super::registers::{FpWidth, Reg31, RegisterMapper};
use crate::instruction::InstructionFlags;

/// How a narrow immediate field is widened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extension {
    Zero,
    Sign,
}

/// A fixed (field, extension, scale) policy for one immediate field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImmField {
    pub field: FieldSpec,
    pub extension: Extension,
    /// Left shift applied after extension.
    pub scale: u8,
    /// Semantic width of the resulting operand in bits.
    pub size: u8,
}

impl ImmField {
    pub const fn unsigned(field: FieldSpec) -> Self {
        Self {
            field,
            extension: Extension::Zero,
            scale: 0,
            size: field.width() as u8,
        }
    }
}

/// Immediate policies, one per (format, field) pair that uses a plain field.
pub mod imm {
    use super::{fields, Extension, FieldSpec, ImmField};

    pub const IMM16: ImmField = ImmField::unsigned(fields::IMM16);
    pub const IMMR: ImmField = ImmField::unsigned(fields::IMMR);
    pub const IMMS: ImmField = ImmField::unsigned(fields::IMMS);
    pub const NZCV: ImmField = ImmField::unsigned(fields::NZCV);
    pub const CCMP_IMM5: ImmField = ImmField::unsigned(fields::IMM5);
    pub const CRM: ImmField = ImmField::unsigned(fields::CRM);
    pub const CRN: ImmField = ImmField::unsigned(fields::CRN);
    pub const OP1: ImmField = ImmField::unsigned(fields::OP1);
    pub const OP2: ImmField = ImmField::unsigned(fields::OP2);
    pub const HINT: ImmField = ImmField::unsigned(fields::HINT);
    pub const PRFOP: ImmField = ImmField::unsigned(fields::RT);
    pub const EXCEPTION_IMM16: ImmField = ImmField::unsigned(fields::IMM16);
    pub const UDF_IMM16: ImmField = ImmField::unsigned(FieldSpec::new(0, 15));
}

/// How a PC-relative operand's offset is formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PcRelativeKind {
    /// B/BL: imm26, word scaled.
    Branch26,
    /// B.cond, CBZ/CBNZ: imm19, word scaled.
    Branch19,
    /// TBZ/TBNZ: imm14, word scaled.
    Branch14,
    /// ADR: immhi:immlo, byte offset from PC.
    Adr,
    /// ADRP: immhi:immlo, 4KB pages from the page of PC.
    Adrp,
}

impl PcRelativeKind {
    /// Offset policy for the single-field forms; ADR/ADRP concatenate fields.
    pub const fn policy(self) -> Option<ImmField> {
        let field = match self {
            Self::Branch26 => fields::IMM26,
            Self::Branch19 => fields::IMM19,
            Self::Branch14 => fields::IMM14,
            Self::Adr | Self::Adrp => return None,
        };
        Some(ImmField {
            field,
            extension: Extension::Sign,
            scale: 2,
            size: 64,
        })
    }
}

/// Immediates that are computed rather than read from a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImmediateSlot {
    /// A plain field under a fixed policy.
    Field(ImmField),
    /// ADD/SUB imm12, optionally shifted left by 12.
    AddSubImm12,
    /// Logical-immediate bitmask, expanded from N:immr:imms when the shape
    /// is derived.
    BitMask { value: u64, is_64bit: bool },
    /// MOVZ/MOVN/MOVK hw * 16.
    MoveWideShift,
    /// TBZ/TBNZ bit number b5:b40.
    TestBitNumber,
    /// Fixed-point fraction bits, 64 - scale.
    FractionBits,
    /// FMOV imm8 expanded to an IEEE bit pattern of the given width.
    FloatingPoint(FpWidth),
    /// Constant operand (compare against zero).
    Constant { value: i64, size: u8 },
}

/// Addressing modes of the load/store formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingKind {
    Unscaled,
    Unprivileged,
    PreIndex,
    PostIndex,
    UnsignedOffset,
    RegisterOffset,
    Literal,
    Pair(PairIndexing),
    Exclusive,
    ExclusivePair,
}

/// How an addressing mode's immediate is scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scaling {
    /// Byte offset as encoded.
    Unscaled,
    /// Shifted by log2 of one element's size.
    ByElement,
    /// Shifted by a fixed amount regardless of access size.
    Fixed(u8),
}

/// Immediate width, sign policy and scale of an addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OffsetPolicy {
    pub field: FieldSpec,
    pub extension: Extension,
    pub scaling: Scaling,
}

impl AddressingKind {
    /// Returns the offset policy, or `None` for modes without an immediate.
    pub const fn offset_policy(self) -> Option<OffsetPolicy> {
        let (field, extension, scaling) = match self {
            Self::Unscaled | Self::Unprivileged | Self::PreIndex | Self::PostIndex => {
                (fields::IMM9, Extension::Sign, Scaling::Unscaled)
            }
            Self::UnsignedOffset => (fields::IMM12, Extension::Zero, Scaling::ByElement),
            Self::Literal => (fields::IMM19, Extension::Sign, Scaling::Fixed(2)),
            Self::Pair(_) => (fields::IMM7, Extension::Sign, Scaling::ByElement),
            Self::RegisterOffset | Self::Exclusive | Self::ExclusivePair => return None,
        };
        Some(OffsetPolicy {
            field,
            extension,
            scaling,
        })
    }
}

/// A memory operand: base register Rn plus one addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemorySlot {
    pub kind: AddressingKind,
    /// log2 of one element's size in bytes.
    pub element_log2: u8,
    /// Number of registers transferred (2 for pairs).
    pub registers: u8,
}

impl MemorySlot {
    pub fn new(kind: AddressingKind, element_log2: u8) -> Self {
        let registers = match kind {
            AddressingKind::Pair(_) | AddressingKind::ExclusivePair => 2,
            _ => 1,
        };
        Self {
            kind,
            element_log2,
            registers,
        }
    }

    /// Total bytes accessed.
    pub fn access_size(&self) -> u8 {
        (1u8 << self.element_log2) * self.registers
    }
}

/// One operand role, in the order the operand appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandSlot {
    Gpr {
        field: FieldSpec,
        is_64bit: bool,
        reg31: Reg31,
    },
    Fp {
        field: FieldSpec,
        width: FpWidth,
    },
    Vector {
        field: FieldSpec,
        arrangement: VectorArrangement,
    },
    /// MRS/MSR system register from bits [20:5].
    SystemRegister,
    /// PSTATE field or NZCV, by canonical ID.
    Pstate(u16),
    /// Rm with the shift type at [23:22] and amount at [15:10].
    ShiftedRegister { is_64bit: bool },
    /// Rm with the extend option at [15:13] and amount at [12:10].
    ExtendedRegister { is_64bit: bool },
    Immediate(ImmediateSlot),
    PcRelative(PcRelativeKind),
    Memory(MemorySlot),
}

/// Branch behaviour, resolved to a [`ControlFlow`](armlens_core::ControlFlow) by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchKind {
    None,
    Jump(PcRelativeKind),
    Call(PcRelativeKind),
    Conditional(PcRelativeKind),
    IndirectJump,
    IndirectCall,
    Return,
    Exception,
    Halt,
}

/// Everything known about an instruction once its format is identified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperandShape {
    pub mnemonic: &'static str,
    pub slots: Vec<OperandSlot>,
    /// Access of each slot, parallel to `slots`.
    pub access: Vec<Access>,
    pub condition: Option<Condition>,
    pub flags: InstructionFlags,
    pub branch: BranchKind,
}

impl OperandShape {
    pub fn new(mnemonic: &'static str) -> Self {
        Self {
            mnemonic,
            slots: Vec::with_capacity(4),
            access: Vec::with_capacity(4),
            condition: None,
            flags: InstructionFlags::default(),
            branch: BranchKind::None,
        }
    }

    /// Appends an operand slot. Registers and memory start out read,
    /// immediates and PC-relative targets carry no access.
    pub fn slot(mut self, slot: OperandSlot) -> Self {
        match slot {
            OperandSlot::Fp { width: FpWidth::Q, .. } | OperandSlot::Vector { .. } => self.flags.simd = true,
            OperandSlot::Fp { .. } => self.flags.fp = true,
            _ => {}
        }
        let access = match slot {
            OperandSlot::Immediate(_) | OperandSlot::PcRelative(_) => Access::NONE,
            _ => Access::READ,
        };
        self.slots.push(slot);
        self.access.push(access);
        self
    }

    fn last_access(mut self, access: Access) -> Self {
        if let Some(last) = self.access.last_mut() {
            *last = access;
        }
        self
    }

    /// Marks the last slot as written only (a destination, or stored memory).
    pub fn written(self) -> Self {
        self.last_access(Access::WRITE)
    }

    /// Marks the last (memory) slot as written when `store` holds.
    pub fn stored(self, store: bool) -> Self {
        if store {
            self.written()
        } else {
            self
        }
    }

    /// Marks the last slot as both read and written (MOVK, BFM, BSL).
    pub fn read_written(self) -> Self {
        self.last_access(Access::READ_WRITE)
    }

    /// Appends a general-purpose register.
    pub fn gpr(self, field: FieldSpec, is_64bit: bool, reg31: Reg31) -> Self {
        self.slot(OperandSlot::Gpr {
            field,
            is_64bit,
            reg31,
        })
    }

    /// Appends a general-purpose register where index 31 is the zero register.
    pub fn gpr_zr(self, field: FieldSpec, is_64bit: bool) -> Self {
        self.gpr(field, is_64bit, Reg31::ZeroRegister)
    }

    /// Appends a general-purpose register where index 31 is the stack pointer.
    pub fn gpr_sp(self, field: FieldSpec, is_64bit: bool) -> Self {
        self.gpr(field, is_64bit, Reg31::StackPointer)
    }

    pub fn fp(self, field: FieldSpec, width: FpWidth) -> Self {
        self.slot(OperandSlot::Fp { field, width })
    }

    pub fn vector(self, field: FieldSpec, arrangement: VectorArrangement) -> Self {
        self.slot(OperandSlot::Vector { field, arrangement })
    }

    pub fn imm(self, imm: ImmediateSlot) -> Self {
        self.slot(OperandSlot::Immediate(imm))
    }

    pub fn imm_field(self, field: ImmField) -> Self {
        self.imm(ImmediateSlot::Field(field))
    }

    pub fn memory(self, kind: AddressingKind, element_log2: u8) -> Self {
        self.slot(OperandSlot::Memory(MemorySlot::new(kind, element_log2)))
    }

    pub fn sixty_four(mut self, is_64bit: bool) -> Self {
        self.flags.is_64bit = is_64bit;
        self
    }

    pub fn reads_flags(mut self) -> Self {
        self.flags.reads_flags = true;
        self
    }

    pub fn writes_flags(mut self) -> Self {
        self.flags.writes_flags = true;
        self
    }

    /// Marks flag writes when `set` holds (the `S` bit).
    pub fn sets_flags(self, set: bool) -> Self {
        if set {
            self.writes_flags()
        } else {
            self
        }
    }

    pub fn condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self.reads_flags()
    }

    pub fn branch(mut self, branch: BranchKind) -> Self {
        self.branch = branch;
        self
    }

    /// Marks the instruction as floating point even without FP register slots.
    pub fn floating_point(mut self) -> Self {
        self.flags.fp = true;
        self
    }

    /// Registers used without an operand field: the link register of calls,
    /// the PC of branches and PC-relative forms, and NZCV.
    pub fn implicit_operands(&self) -> Vec<ImplicitOperand> {
        let mut implicit = Vec::new();
        let pc = match self.branch {
            BranchKind::Jump(_) | BranchKind::Call(_) | BranchKind::Conditional(_) => Some(Access::READ_WRITE),
            BranchKind::IndirectJump | BranchKind::IndirectCall | BranchKind::Return => Some(Access::WRITE),
            BranchKind::None if self.pc_relative().is_some() => Some(Access::READ),
            _ => None,
        };
        if let Some(access) = pc {
            implicit.push(ImplicitOperand::new(RegisterMapper::pc(), access));
        }
        if matches!(self.branch, BranchKind::Call(_) | BranchKind::IndirectCall) {
            let link = RegisterMapper::gpr(u32::from(arm64::X30), true, Reg31::ZeroRegister);
            implicit.push(ImplicitOperand::new(link, Access::WRITE));
        }
        let flags = Access {
            read: self.flags.reads_flags,
            write: self.flags.writes_flags,
        };
        if flags != Access::NONE {
            implicit.push(ImplicitOperand::new(RegisterMapper::pstate(arm64::NZCV), flags));
        }
        implicit
    }

    /// The PC-relative slot, if any.
    pub fn pc_relative(&self) -> Option<PcRelativeKind> {
        self.slots.iter().find_map(|slot| match slot {
            OperandSlot::PcRelative(kind) => Some(*kind),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_policies() {
        let uimm = AddressingKind::UnsignedOffset.offset_policy().unwrap();
        assert_eq!(uimm.extension, Extension::Zero);
        assert_eq!(uimm.scaling, Scaling::ByElement);
        assert_eq!(uimm.field.width(), 12);

        let pair = AddressingKind::Pair(PairIndexing::PreIndex).offset_policy().unwrap();
        assert_eq!(pair.extension, Extension::Sign);
        assert_eq!(pair.field.width(), 7);

        let literal = AddressingKind::Literal.offset_policy().unwrap();
        assert_eq!(literal.scaling, Scaling::Fixed(2));

        assert!(AddressingKind::Exclusive.offset_policy().is_none());
        assert!(AddressingKind::RegisterOffset.offset_policy().is_none());
    }

    #[test]
    fn test_pair_access_size() {
        let pair = MemorySlot::new(AddressingKind::Pair(PairIndexing::Offset), 3);
        assert_eq!(pair.access_size(), 16);
        let single = MemorySlot::new(AddressingKind::UnsignedOffset, 2);
        assert_eq!(single.access_size(), 4);
    }

    #[test]
    fn test_slot_flags() {
        let shape = OperandShape::new("fadd")
            .fp(fields::RD, FpWidth::D)
            .fp(fields::RN, FpWidth::D);
        assert!(shape.flags.fp);
        assert!(!shape.flags.simd);

        let shape = OperandShape::new("add").vector(fields::RD, VectorArrangement::S4);
        assert!(shape.flags.simd);
    }

    #[test]
    fn test_slot_access() {
        let shape = OperandShape::new("movk")
            .gpr_zr(fields::RD, true)
            .read_written()
            .imm_field(imm::IMM16);
        assert_eq!(shape.access, [Access::READ_WRITE, Access::NONE]);

        let shape = OperandShape::new("str")
            .gpr_zr(fields::RT, true)
            .memory(AddressingKind::UnsignedOffset, 3)
            .written();
        assert_eq!(shape.access, [Access::READ, Access::WRITE]);
    }

    #[test]
    fn test_implicit_operands() {
        let bl = OperandShape::new("bl")
            .slot(OperandSlot::PcRelative(PcRelativeKind::Branch26))
            .branch(BranchKind::Call(PcRelativeKind::Branch26));
        let implicit = bl.implicit_operands();
        assert_eq!(implicit.len(), 2);
        assert_eq!(implicit[0].register.name(), "pc");
        assert_eq!(implicit[0].access, Access::READ_WRITE);
        assert_eq!(implicit[1].register.name(), "x30");
        assert_eq!(implicit[1].access, Access::WRITE);

        let adr = OperandShape::new("adr")
            .gpr_zr(fields::RD, true)
            .written()
            .slot(OperandSlot::PcRelative(PcRelativeKind::Adr));
        assert_eq!(adr.implicit_operands(), [ImplicitOperand::new(RegisterMapper::pc(), Access::READ)]);

        let adcs = OperandShape::new("adcs").reads_flags().writes_flags();
        let implicit = adcs.implicit_operands();
        assert_eq!(implicit.len(), 1);
        assert_eq!(implicit[0].access, Access::READ_WRITE);

        assert!(OperandShape::new("nop").implicit_operands().is_empty());
    }
}
