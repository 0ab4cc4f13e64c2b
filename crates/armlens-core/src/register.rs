//! Architecture-agnostic register representation.
//!
//! A [`Register`] is a canonical identifier: it names a physical or logical
//! register slot independently of how the slot was encoded in the instruction.
//! The same raw index may resolve to different canonical registers (for
//! AArch64, index 31 is either the zero register or the stack pointer).

use std::borrow::Cow;

use crate::Architecture;

/// Register class (general purpose, floating point, etc.).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RegisterClass {
    /// General purpose register (x0, w0, and the zero register xzr/wzr)
    General,
    /// Scalar floating point / SIMD register view (b0, h0, s0, d0)
    FloatingPoint,
    /// Full vector register (q0, or v0 with an arrangement)
    Vector,
    /// Stack pointer (sp, wsp)
    StackPointer,
    /// Program counter
    ProgramCounter,
    /// Condition flags and PSTATE fields (nzcv, daifset, spsel, ...)
    Flags,
    /// System register addressed by MRS/MSR
    System,
}

/// Lane layout of a vector register operand (`v0.4s`, `v1.16b`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VectorArrangement {
    B8,
    B16,
    H4,
    H8,
    S2,
    S4,
    D1,
    D2,
}

impl VectorArrangement {
    /// Builds the arrangement from an element `size` field (0..=3) and the Q bit.
    pub fn from_size_q(size: u32, q: bool) -> Option<Self> {
        match (size, q) {
            (0, false) => Some(Self::B8),
            (0, true) => Some(Self::B16),
            (1, false) => Some(Self::H4),
            (1, true) => Some(Self::H8),
            (2, false) => Some(Self::S2),
            (2, true) => Some(Self::S4),
            (3, false) => Some(Self::D1),
            (3, true) => Some(Self::D2),
            _ => None,
        }
    }

    /// Width of a single lane in bits.
    pub fn element_bits(&self) -> u16 {
        match self {
            Self::B8 | Self::B16 => 8,
            Self::H4 | Self::H8 => 16,
            Self::S2 | Self::S4 => 32,
            Self::D1 | Self::D2 => 64,
        }
    }

    /// Number of lanes.
    pub fn lanes(&self) -> u16 {
        match self {
            Self::D1 => 1,
            Self::S2 | Self::D2 => 2,
            Self::H4 | Self::S4 => 4,
            Self::B8 | Self::H8 => 8,
            Self::B16 => 16,
        }
    }

    /// Total width of the arranged register in bits (64 or 128).
    pub fn total_bits(&self) -> u16 {
        self.element_bits() * self.lanes()
    }

    /// Assembler suffix, e.g. `4s`.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::B8 => "8b",
            Self::B16 => "16b",
            Self::H4 => "4h",
            Self::H8 => "8h",
            Self::S2 => "2s",
            Self::S4 => "4s",
            Self::D1 => "1d",
            Self::D2 => "2d",
        }
    }
}

/// Architecture-agnostic register representation.
///
/// Each register is identified by its architecture, class, and a numeric ID.
/// The ID is architecture-specific and should be interpreted accordingly.
/// For [`RegisterClass::System`] the ID is the packed system register
/// encoding (`op0:op1:CRn:CRm:op2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Register {
    /// The architecture this register belongs to.
    pub arch: Architecture,
    /// The class of register.
    pub class: RegisterClass,
    /// Architecture-specific register ID.
    pub id: u16,
    /// Size of the register view in bits.
    pub size: u16,
    /// Lane layout, for arranged vector operands.
    pub arrangement: Option<VectorArrangement>,
}

impl Register {
    /// Creates a new register.
    pub fn new(arch: Architecture, class: RegisterClass, id: u16, size: u16) -> Self {
        Self {
            arch,
            class,
            id,
            size,
            arrangement: None,
        }
    }

    /// Creates an arranged vector register view.
    pub fn vector(arch: Architecture, id: u16, arrangement: VectorArrangement) -> Self {
        Self {
            arch,
            class: RegisterClass::Vector,
            id,
            size: arrangement.total_bits(),
            arrangement: Some(arrangement),
        }
    }

    /// Returns true for the AArch64 zero register (xzr/wzr).
    pub fn is_zero_register(&self) -> bool {
        self.arch == Architecture::Arm64
            && self.class == RegisterClass::General
            && self.id == arm64::XZR
    }

    /// Returns true for the stack pointer.
    pub fn is_stack_pointer(&self) -> bool {
        self.class == RegisterClass::StackPointer
    }

    /// Returns the canonical name for this register.
    pub fn name(&self) -> Cow<'static, str> {
        match self.arch {
            Architecture::Arm64 => arm64_reg_name(self),
            _ => Cow::Borrowed("unknown"),
        }
    }
}

impl std::fmt::Display for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

/// ARM64 register IDs.
pub mod arm64 {
    // General purpose registers X0-X30
    pub const X0: u16 = 0;
    pub const X29: u16 = 29; // Frame pointer (FP)
    pub const X30: u16 = 30; // Link register (LR)
    pub const SP: u16 = 31; // Stack pointer
    pub const XZR: u16 = 32; // Zero register (reads as 0, writes discarded)
    pub const PC: u16 = 33; // Program counter
    pub const NZCV: u16 = 34; // Condition flags

    // PSTATE fields writable with MSR (immediate)
    pub const SPSEL: u16 = 40;
    pub const DAIFSET: u16 = 41;
    pub const DAIFCLR: u16 = 42;
    pub const UAO: u16 = 43;
    pub const PAN: u16 = 44;

    // SIMD/FP vector registers V0-V31
    // These can be accessed as B/H/S/D/Q (8/16/32/64/128 bit) or V (arranged vector)
    pub const V0: u16 = 64;
    pub const V31: u16 = 95;

    /// Packs a system register encoding into a register ID.
    pub const fn sysreg(op0: u16, op1: u16, crn: u16, crm: u16, op2: u16) -> u16 {
        (op0 << 14) | (op1 << 11) | (crn << 7) | (crm << 3) | op2
    }

    pub const NZCV_SYSREG: u16 = sysreg(3, 3, 4, 2, 0);
    pub const FPCR: u16 = sysreg(3, 3, 4, 4, 0);
    pub const FPSR: u16 = sysreg(3, 3, 4, 4, 1);
    pub const TPIDR_EL0: u16 = sysreg(3, 3, 13, 0, 2);
    pub const TPIDRRO_EL0: u16 = sysreg(3, 3, 13, 0, 3);
    pub const CTR_EL0: u16 = sysreg(3, 3, 0, 0, 1);
    pub const DCZID_EL0: u16 = sysreg(3, 3, 0, 0, 7);
    pub const CNTFRQ_EL0: u16 = sysreg(3, 3, 14, 0, 0);
    pub const CNTVCT_EL0: u16 = sysreg(3, 3, 14, 0, 2);
    pub const MIDR_EL1: u16 = sysreg(3, 0, 0, 0, 0);
    pub const MPIDR_EL1: u16 = sysreg(3, 0, 0, 0, 5);
    pub const DAIF: u16 = sysreg(3, 3, 4, 2, 1);
    pub const CURRENTEL: u16 = sysreg(3, 0, 4, 2, 2);
}

fn arm64_reg_name(reg: &Register) -> Cow<'static, str> {
    match reg.class {
        RegisterClass::General => match (reg.id, reg.size) {
            (arm64::XZR, 64) => Cow::Borrowed("xzr"),
            (arm64::XZR, _) => Cow::Borrowed("wzr"),
            (id, 64) => Cow::Owned(format!("x{id}")),
            (id, _) => Cow::Owned(format!("w{id}")),
        },
        RegisterClass::StackPointer => Cow::Borrowed(if reg.size == 64 { "sp" } else { "wsp" }),
        RegisterClass::ProgramCounter => Cow::Borrowed("pc"),
        RegisterClass::FloatingPoint | RegisterClass::Vector => {
            let n = reg.id.saturating_sub(arm64::V0);
            match reg.arrangement {
                Some(arrangement) => Cow::Owned(format!("v{n}.{}", arrangement.suffix())),
                None => {
                    let prefix = match reg.size {
                        8 => 'b',
                        16 => 'h',
                        32 => 's',
                        64 => 'd',
                        _ => 'q',
                    };
                    Cow::Owned(format!("{prefix}{n}"))
                }
            }
        }
        RegisterClass::Flags => Cow::Borrowed(match reg.id {
            arm64::NZCV => "nzcv",
            arm64::SPSEL => "spsel",
            arm64::DAIFSET => "daifset",
            arm64::DAIFCLR => "daifclr",
            arm64::UAO => "uao",
            arm64::PAN => "pan",
            _ => "pstate",
        }),
        RegisterClass::System => match sysreg_name(reg.id) {
            Some(name) => Cow::Borrowed(name),
            None => {
                let id = reg.id;
                Cow::Owned(format!(
                    "s{}_{}_c{}_c{}_{}",
                    id >> 14,
                    (id >> 11) & 0x7,
                    (id >> 7) & 0xF,
                    (id >> 3) & 0xF,
                    id & 0x7
                ))
            }
        },
    }
}

fn sysreg_name(id: u16) -> Option<&'static str> {
    Some(match id {
        arm64::NZCV_SYSREG => "nzcv",
        arm64::FPCR => "fpcr",
        arm64::FPSR => "fpsr",
        arm64::TPIDR_EL0 => "tpidr_el0",
        arm64::TPIDRRO_EL0 => "tpidrro_el0",
        arm64::CTR_EL0 => "ctr_el0",
        arm64::DCZID_EL0 => "dczid_el0",
        arm64::CNTFRQ_EL0 => "cntfrq_el0",
        arm64::CNTVCT_EL0 => "cntvct_el0",
        arm64::MIDR_EL1 => "midr_el1",
        arm64::MPIDR_EL1 => "mpidr_el1",
        arm64::DAIF => "daif",
        arm64::CURRENTEL => "currentel",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gpr(id: u16, size: u16) -> Register {
        Register::new(Architecture::Arm64, RegisterClass::General, id, size)
    }

    #[test]
    fn test_gpr_names() {
        assert_eq!(gpr(0, 64).name(), "x0");
        assert_eq!(gpr(30, 32).name(), "w30");
        assert_eq!(gpr(arm64::XZR, 64).name(), "xzr");
        assert_eq!(gpr(arm64::XZR, 32).name(), "wzr");
        let sp = Register::new(Architecture::Arm64, RegisterClass::StackPointer, arm64::SP, 64);
        assert_eq!(sp.name(), "sp");
        assert!(sp.is_stack_pointer());
        assert!(gpr(arm64::XZR, 64).is_zero_register());
    }

    #[test]
    fn test_simd_names() {
        let d = Register::new(Architecture::Arm64, RegisterClass::FloatingPoint, arm64::V0 + 3, 64);
        assert_eq!(d.name(), "d3");
        let q = Register::new(Architecture::Arm64, RegisterClass::Vector, arm64::V31, 128);
        assert_eq!(q.name(), "q31");
        let v = Register::vector(Architecture::Arm64, arm64::V0 + 2, VectorArrangement::S4);
        assert_eq!(v.name(), "v2.4s");
        assert_eq!(v.size, 128);
    }

    #[test]
    fn test_sysreg_names() {
        let known = Register::new(Architecture::Arm64, RegisterClass::System, arm64::TPIDR_EL0, 64);
        assert_eq!(known.to_string(), "tpidr_el0");
        let raw = arm64::sysreg(3, 1, 15, 2, 4);
        let unknown = Register::new(Architecture::Arm64, RegisterClass::System, raw, 64);
        assert_eq!(unknown.to_string(), "s3_1_c15_c2_4");
    }

    #[test]
    fn test_arrangement_shape() {
        assert_eq!(VectorArrangement::from_size_q(3, false), Some(VectorArrangement::D1));
        assert_eq!(VectorArrangement::from_size_q(4, true), None);
        assert_eq!(VectorArrangement::H8.total_bits(), 128);
        assert_eq!(VectorArrangement::B8.total_bits(), 64);
    }
}
