//! Resolution of raw register fields to canonical registers.

use armlens_core::{register::arm64, Architecture, Register, RegisterClass, VectorArrangement};
use thiserror::Error;

/// How register index 31 is read in a general-purpose context.
///
/// The raw bits alone never decide this; the format decides it per operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reg31 {
    /// Index 31 is xzr/wzr (arithmetic operands, data registers).
    ZeroRegister,
    /// Index 31 is sp/wsp (base addresses, add/sub immediate).
    StackPointer,
}

/// Width of a scalar SIMD&FP register view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FpWidth {
    B,
    H,
    S,
    D,
    Q,
}

impl FpWidth {
    /// Builds the width from log2 of its size in bytes (0 = B ... 4 = Q).
    pub fn from_log2_bytes(size: u32) -> Option<Self> {
        match size {
            0 => Some(Self::B),
            1 => Some(Self::H),
            2 => Some(Self::S),
            3 => Some(Self::D),
            4 => Some(Self::Q),
            _ => None,
        }
    }

    pub fn bits(&self) -> u16 {
        match self {
            Self::B => 8,
            Self::H => 16,
            Self::S => 32,
            Self::D => 64,
            Self::Q => 128,
        }
    }

    pub fn bytes(&self) -> u8 {
        (self.bits() / 8) as u8
    }

    /// log2 of the size in bytes.
    pub fn log2_bytes(&self) -> u8 {
        match self {
            Self::B => 0,
            Self::H => 1,
            Self::S => 2,
            Self::D => 3,
            Self::Q => 4,
        }
    }
}

/// Register class requested for a raw index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterClassFlag {
    /// General-purpose register; the caller says how index 31 reads.
    General(Reg31),
    /// Scalar SIMD&FP view; element width selects B/H/S/D/Q.
    FloatingPoint,
    /// Arranged vector; element width plus Q select the arrangement.
    Vector { q: bool },
}

/// The requested register combination does not exist.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("unsupported register encoding: {0}")]
pub struct UnsupportedRegister(pub &'static str);

/// Maps raw register-index fields to canonical [`Register`]s.
///
/// Stateless; every method is a pure function of its arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegisterMapper;

impl RegisterMapper {
    /// Resolves a raw 5-bit register index.
    ///
    /// `is_64bit` is only consulted for general-purpose registers.
    /// `element_size` is log2 of the element width in bytes: required for
    /// the SIMD&FP classes (0..=4 for scalar views, 0..=3 for vectors).
    pub fn resolve(
        index: u32,
        is_64bit: bool,
        class: RegisterClassFlag,
        element_size: Option<u32>,
    ) -> Result<Register, UnsupportedRegister> {
        if index > 31 {
            return Err(UnsupportedRegister("register index out of range"));
        }
        match class {
            RegisterClassFlag::General(reg31) => Ok(Self::gpr(index, is_64bit, reg31)),
            RegisterClassFlag::FloatingPoint => {
                let size = element_size.ok_or(UnsupportedRegister("scalar view needs an element width"))?;
                let width = FpWidth::from_log2_bytes(size)
                    .ok_or(UnsupportedRegister("undefined scalar element width"))?;
                Ok(Self::fp(index, width))
            }
            RegisterClassFlag::Vector { q } => {
                let size = element_size.ok_or(UnsupportedRegister("vector needs an element width"))?;
                let arrangement = Self::arrangement(size, q)?;
                Ok(Self::vector(index, arrangement))
            }
        }
    }

    /// Validates a vector `size:Q` pair.
    pub fn arrangement(size: u32, q: bool) -> Result<VectorArrangement, UnsupportedRegister> {
        VectorArrangement::from_size_q(size, q).ok_or(UnsupportedRegister("undefined vector element width"))
    }

    /// Maps the scalar FP `ftype` field (00 = S, 01 = D, 11 = H).
    pub fn fp_type(ftype: u32) -> Result<FpWidth, UnsupportedRegister> {
        match ftype {
            0b00 => Ok(FpWidth::S),
            0b01 => Ok(FpWidth::D),
            0b11 => Ok(FpWidth::H),
            _ => Err(UnsupportedRegister("undefined floating-point type")),
        }
    }

    /// General-purpose register with an explicit index-31 interpretation.
    pub fn gpr(index: u32, is_64bit: bool, reg31: Reg31) -> Register {
        let size = if is_64bit { 64 } else { 32 };
        match (index & 0x1F, reg31) {
            (31, Reg31::StackPointer) => {
                Register::new(Architecture::Arm64, RegisterClass::StackPointer, arm64::SP, size)
            }
            (31, Reg31::ZeroRegister) => {
                Register::new(Architecture::Arm64, RegisterClass::General, arm64::XZR, size)
            }
            (n, _) => Register::new(Architecture::Arm64, RegisterClass::General, n as u16, size),
        }
    }

    /// Scalar SIMD&FP register (Bn/Hn/Sn/Dn/Qn).
    pub fn fp(index: u32, width: FpWidth) -> Register {
        let class = if width == FpWidth::Q {
            RegisterClass::Vector
        } else {
            RegisterClass::FloatingPoint
        };
        Register::new(Architecture::Arm64, class, arm64::V0 + (index & 0x1F) as u16, width.bits())
    }

    /// Arranged vector register (Vn.<T>).
    pub fn vector(index: u32, arrangement: VectorArrangement) -> Register {
        Register::vector(Architecture::Arm64, arm64::V0 + (index & 0x1F) as u16, arrangement)
    }

    /// System register named by the packed `op0:op1:CRn:CRm:op2` encoding.
    pub fn system(encoding: u32) -> Register {
        Register::new(Architecture::Arm64, RegisterClass::System, encoding as u16, 64)
    }

    /// PSTATE field or the NZCV flags.
    pub fn pstate(id: u16) -> Register {
        Register::new(Architecture::Arm64, RegisterClass::Flags, id, 64)
    }

    pub fn pc() -> Register {
        Register::new(Architecture::Arm64, RegisterClass::ProgramCounter, arm64::PC, 64)
    }
}
