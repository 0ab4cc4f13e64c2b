//! Instruction operand types.

use crate::Register;

/// An instruction operand.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operand {
    /// Register operand.
    Register(Register),
    /// Register operand with a shift applied (`x2, lsl #3`).
    ShiftedRegister {
        register: Register,
        shift: Shift,
        amount: u8,
    },
    /// Register operand with an extend applied (`w2, sxtw #2`).
    ExtendedRegister {
        register: Register,
        extend: Extend,
        amount: u8,
    },
    /// Immediate value.
    Immediate(Immediate),
    /// Memory reference.
    Memory(MemoryRef),
    /// PC-relative address (used in branches and ADR/ADRP).
    PcRelative {
        /// Offset from PC (or from the 4KB page of PC for ADRP).
        offset: i64,
        /// Resolved target address.
        target: u64,
    },
}

impl Operand {
    /// Creates a register operand.
    pub fn reg(reg: Register) -> Self {
        Self::Register(reg)
    }

    /// Creates an immediate operand.
    pub fn imm(value: i128, size: u8) -> Self {
        Self::Immediate(Immediate {
            value,
            size,
            signed: true,
        })
    }

    /// Creates an unsigned immediate operand.
    pub fn imm_unsigned(value: u64, size: u8) -> Self {
        Self::Immediate(Immediate {
            value: value as i128,
            size,
            signed: false,
        })
    }

    /// Creates a PC-relative operand.
    pub fn pc_rel(offset: i64, target: u64) -> Self {
        Self::PcRelative { offset, target }
    }

    /// Returns the register this operand names, if it is register-valued.
    pub fn register(&self) -> Option<&Register> {
        match self {
            Self::Register(reg)
            | Self::ShiftedRegister { register: reg, .. }
            | Self::ExtendedRegister { register: reg, .. } => Some(reg),
            _ => None,
        }
    }

    /// Returns true if this is a register operand.
    pub fn is_register(&self) -> bool {
        self.register().is_some()
    }

    /// Returns true if this is an immediate operand.
    pub fn is_immediate(&self) -> bool {
        matches!(self, Self::Immediate(_))
    }

    /// Returns true if this is a memory operand.
    pub fn is_memory(&self) -> bool {
        matches!(self, Self::Memory(_))
    }
}

/// How an instruction uses one of its operands.
///
/// For a memory operand this describes the memory access; the base register
/// is always read and is written as well when the mode writes back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Access {
    pub read: bool,
    pub write: bool,
}

impl Access {
    pub const NONE: Self = Self {
        read: false,
        write: false,
    };
    pub const READ: Self = Self {
        read: true,
        write: false,
    };
    pub const WRITE: Self = Self {
        read: false,
        write: true,
    };
    pub const READ_WRITE: Self = Self {
        read: true,
        write: true,
    };
}

/// A register the instruction uses without naming it in an operand field
/// (the link register of BL, the PC of a branch, the NZCV flags).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImplicitOperand {
    pub register: Register,
    pub access: Access,
}

impl ImplicitOperand {
    pub fn new(register: Register, access: Access) -> Self {
        Self { register, access }
    }
}

/// Immediate value operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Immediate {
    /// The value (sign-extended to i128 for uniformity).
    pub value: i128,
    /// Semantic size in bits.
    pub size: u8,
    /// Whether this is a signed immediate.
    pub signed: bool,
}

impl Immediate {
    /// Returns the value as an unsigned u64.
    pub fn as_u64(&self) -> u64 {
        self.value as u64
    }

    /// Returns the value as a signed i64.
    pub fn as_i64(&self) -> i64 {
        self.value as i64
    }
}

/// Shift applied to a register operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shift {
    Lsl,
    Lsr,
    Asr,
    Ror,
}

impl Shift {
    /// Decodes a 2-bit `shift` field.
    pub fn from_bits(bits: u32) -> Self {
        match bits & 0b11 {
            0b00 => Self::Lsl,
            0b01 => Self::Lsr,
            0b10 => Self::Asr,
            _ => Self::Ror,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Lsl => "lsl",
            Self::Lsr => "lsr",
            Self::Asr => "asr",
            Self::Ror => "ror",
        }
    }
}

/// Extend applied to a register operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Extend {
    Uxtb,
    Uxth,
    Uxtw,
    Uxtx,
    Sxtb,
    Sxth,
    Sxtw,
    Sxtx,
}

impl Extend {
    /// Decodes a 3-bit `option` field.
    pub fn from_option(option: u32) -> Self {
        match option & 0b111 {
            0b000 => Self::Uxtb,
            0b001 => Self::Uxth,
            0b010 => Self::Uxtw,
            0b011 => Self::Uxtx,
            0b100 => Self::Sxtb,
            0b101 => Self::Sxth,
            0b110 => Self::Sxtw,
            _ => Self::Sxtx,
        }
    }

    /// Returns true if the extended source register is 64 bits wide.
    pub fn is_64bit_source(&self) -> bool {
        matches!(self, Self::Uxtx | Self::Sxtx)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Uxtb => "uxtb",
            Self::Uxth => "uxth",
            Self::Uxtw => "uxtw",
            Self::Uxtx => "uxtx",
            Self::Sxtb => "sxtb",
            Self::Sxth => "sxth",
            Self::Sxtw => "sxtw",
            Self::Sxtx => "sxtx",
        }
    }
}

/// Indexing of a load/store pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PairIndexing {
    /// Signed offset, no writeback (LDP/STP).
    Offset,
    /// Signed offset with a non-temporal hint (LDNP/STNP).
    NonTemporal,
    /// Base updated before the access.
    PreIndex,
    /// Base updated after the access.
    PostIndex,
}

/// How a memory operand computes its address from the base register.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AddressingMode {
    /// Signed, unscaled byte offset (LDUR/STUR, LDTR/STTR).
    Unscaled { offset: i64 },
    /// Unsigned immediate already scaled by the access size.
    ScaledOffset { offset: u64 },
    /// Signed offset, base written back before the access.
    PreIndex { offset: i64 },
    /// Signed offset, base written back after the access.
    PostIndex { offset: i64 },
    /// Index register with optional extend and shift.
    RegisterOffset {
        index: Register,
        extend: Extend,
        shift: u8,
    },
    /// PC-relative literal pool access.
    Literal { offset: i64, target: u64 },
    /// Two registers sharing one doubly-scaled offset.
    Pair { indexing: PairIndexing, offset: i64 },
    /// Exclusive / acquire-release access, base register only.
    Exclusive,
    /// Exclusive pair access, base register only.
    ExclusivePair,
}

/// Memory reference operand.
///
/// Represents AArch64 addressing like `[base, #imm]`, `[base, #imm]!`,
/// `[base], #imm` and `[base, index, extend #amount]`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryRef {
    /// Base register (PC for literal loads).
    pub base: Register,
    /// Addressing mode and offset.
    pub mode: AddressingMode,
    /// Total access size in bytes (both registers for pairs).
    pub size: u8,
}

impl MemoryRef {
    /// Creates a memory reference.
    pub fn new(base: Register, mode: AddressingMode, size: u8) -> Self {
        Self { base, mode, size }
    }

    /// Returns true if the base register is updated by the access.
    pub fn writeback(&self) -> bool {
        matches!(
            self.mode,
            AddressingMode::PreIndex { .. }
                | AddressingMode::PostIndex { .. }
                | AddressingMode::Pair {
                    indexing: PairIndexing::PreIndex | PairIndexing::PostIndex,
                    ..
                }
        )
    }

    /// Returns the immediate byte offset, when the mode has one.
    pub fn displacement(&self) -> Option<i64> {
        match self.mode {
            AddressingMode::Unscaled { offset }
            | AddressingMode::PreIndex { offset }
            | AddressingMode::PostIndex { offset }
            | AddressingMode::Literal { offset, .. }
            | AddressingMode::Pair { offset, .. } => Some(offset),
            AddressingMode::ScaledOffset { offset } => Some(offset as i64),
            AddressingMode::RegisterOffset { .. }
            | AddressingMode::Exclusive
            | AddressingMode::ExclusivePair => None,
        }
    }
}

fn write_offset(f: &mut std::fmt::Formatter<'_>, offset: i64) -> std::fmt::Result {
    if offset < 0 {
        write!(f, "#-{:#x}", offset.unsigned_abs())
    } else {
        write!(f, "#{:#x}", offset)
    }
}

impl std::fmt::Display for MemoryRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let base = self.base.name();
        match &self.mode {
            AddressingMode::Literal { target, .. } => write!(f, "{:#x}", target),
            AddressingMode::Exclusive | AddressingMode::ExclusivePair => write!(f, "[{}]", base),
            AddressingMode::ScaledOffset { offset: 0 }
            | AddressingMode::Unscaled { offset: 0 }
            | AddressingMode::Pair {
                indexing: PairIndexing::Offset | PairIndexing::NonTemporal,
                offset: 0,
            } => write!(f, "[{}]", base),
            AddressingMode::ScaledOffset { offset } => write!(f, "[{}, #{:#x}]", base, offset),
            AddressingMode::Unscaled { offset }
            | AddressingMode::Pair {
                indexing: PairIndexing::Offset | PairIndexing::NonTemporal,
                offset,
            } => {
                write!(f, "[{}, ", base)?;
                write_offset(f, *offset)?;
                write!(f, "]")
            }
            AddressingMode::PreIndex { offset }
            | AddressingMode::Pair {
                indexing: PairIndexing::PreIndex,
                offset,
            } => {
                write!(f, "[{}, ", base)?;
                write_offset(f, *offset)?;
                write!(f, "]!")
            }
            AddressingMode::PostIndex { offset }
            | AddressingMode::Pair {
                indexing: PairIndexing::PostIndex,
                offset,
            } => {
                write!(f, "[{}], ", base)?;
                write_offset(f, *offset)
            }
            AddressingMode::RegisterOffset {
                index,
                extend,
                shift,
            } => {
                write!(f, "[{}, {}", base, index.name())?;
                match (extend, shift) {
                    (Extend::Uxtx, 0) => {}
                    (Extend::Uxtx, amount) => write!(f, ", lsl #{}", amount)?,
                    (extend, 0) => write!(f, ", {}", extend.name())?,
                    (extend, amount) => write!(f, ", {} #{}", extend.name(), amount)?,
                }
                write!(f, "]")
            }
        }
    }
}

impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Register(reg) => write!(f, "{}", reg.name()),
            Self::ShiftedRegister {
                register,
                shift,
                amount,
            } => {
                if *amount == 0 && *shift == Shift::Lsl {
                    write!(f, "{}", register.name())
                } else {
                    write!(f, "{}, {} #{}", register.name(), shift.name(), amount)
                }
            }
            Self::ExtendedRegister {
                register,
                extend,
                amount,
            } => {
                if *amount == 0 {
                    write!(f, "{}, {}", register.name(), extend.name())
                } else {
                    write!(f, "{}, {} #{}", register.name(), extend.name(), amount)
                }
            }
            Self::Immediate(imm) => {
                if imm.signed && imm.value < 0 {
                    write!(f, "#-{:#x}", -imm.value)
                } else {
                    write!(f, "#{:#x}", imm.value)
                }
            }
            Self::Memory(mem) => write!(f, "{}", mem),
            Self::PcRelative { target, .. } => write!(f, "{:#x}", target),
        }
    }
}
