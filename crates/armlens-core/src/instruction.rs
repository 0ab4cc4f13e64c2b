//! Per-instruction condition codes and control-flow classification.

/// AArch64 condition code (the 4-bit `cond` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Condition {
    Equal,          // Z=1
    NotEqual,       // Z=0
    CarrySet,       // C=1 (HS, unsigned >=)
    CarryClear,     // C=0 (LO, unsigned <)
    Minus,          // N=1
    Plus,           // N=0
    Overflow,       // V=1
    NoOverflow,     // V=0
    Higher,         // C=1 and Z=0 (unsigned >)
    LowerOrSame,    // C=0 or Z=1 (unsigned <=)
    GreaterOrEqual, // N=V
    Less,           // N!=V
    Greater,        // Z=0 and N=V
    LessOrEqual,    // Z=1 or N!=V
    Always,
    Never,
}

impl Condition {
    /// Decodes the 4-bit condition field.
    pub fn from_bits(cond: u32) -> Self {
        match cond & 0xF {
            0b0000 => Self::Equal,
            0b0001 => Self::NotEqual,
            0b0010 => Self::CarrySet,
            0b0011 => Self::CarryClear,
            0b0100 => Self::Minus,
            0b0101 => Self::Plus,
            0b0110 => Self::Overflow,
            0b0111 => Self::NoOverflow,
            0b1000 => Self::Higher,
            0b1001 => Self::LowerOrSame,
            0b1010 => Self::GreaterOrEqual,
            0b1011 => Self::Less,
            0b1100 => Self::Greater,
            0b1101 => Self::LessOrEqual,
            0b1110 => Self::Always,
            _ => Self::Never,
        }
    }

    /// Returns the inverse condition.
    ///
    /// `al` and `nv` both execute unconditionally, so they invert to each other
    /// only nominally.
    pub fn inverse(&self) -> Self {
        match self {
            Self::Equal => Self::NotEqual,
            Self::NotEqual => Self::Equal,
            Self::CarrySet => Self::CarryClear,
            Self::CarryClear => Self::CarrySet,
            Self::Minus => Self::Plus,
            Self::Plus => Self::Minus,
            Self::Overflow => Self::NoOverflow,
            Self::NoOverflow => Self::Overflow,
            Self::Higher => Self::LowerOrSame,
            Self::LowerOrSame => Self::Higher,
            Self::GreaterOrEqual => Self::Less,
            Self::Less => Self::GreaterOrEqual,
            Self::Greater => Self::LessOrEqual,
            Self::LessOrEqual => Self::Greater,
            Self::Always => Self::Never,
            Self::Never => Self::Always,
        }
    }

    /// Returns the assembler suffix for this condition (`eq`, `hs`, ...).
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Equal => "eq",
            Self::NotEqual => "ne",
            Self::CarrySet => "hs",
            Self::CarryClear => "lo",
            Self::Minus => "mi",
            Self::Plus => "pl",
            Self::Overflow => "vs",
            Self::NoOverflow => "vc",
            Self::Higher => "hi",
            Self::LowerOrSame => "ls",
            Self::GreaterOrEqual => "ge",
            Self::Less => "lt",
            Self::Greater => "gt",
            Self::LessOrEqual => "le",
            Self::Always => "al",
            Self::Never => "nv",
        }
    }
}

/// Control flow classification of a single instruction.
///
/// This describes only the instruction itself; assembling blocks and edges
/// is left to the consumer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ControlFlow {
    /// Sequential - falls through to next instruction.
    Sequential,

    /// Unconditional branch to a known address.
    UnconditionalBranch { target: u64 },

    /// Conditional branch - may fall through or jump.
    ///
    /// `condition` is `None` for compare-and-branch and test-and-branch,
    /// which test a register rather than the flags.
    ConditionalBranch {
        target: u64,
        condition: Option<Condition>,
        fallthrough: u64,
    },

    /// Indirect jump (target in register).
    IndirectBranch,

    /// Function call to known address (writes the link register).
    Call { target: u64, return_addr: u64 },

    /// Indirect call (writes the link register).
    IndirectCall { return_addr: u64 },

    /// Return from function.
    Return,

    /// Exception-generating call (SVC, HVC, SMC).
    Syscall,

    /// Halts execution (BRK, HLT, UDF, ERET).
    Halt,
}

impl ControlFlow {
    /// Returns true if the instruction can transfer control non-sequentially.
    pub fn is_branch(&self) -> bool {
        !matches!(self, Self::Sequential)
    }

    /// Returns true for calls (direct or indirect).
    pub fn is_call(&self) -> bool {
        matches!(self, Self::Call { .. } | Self::IndirectCall { .. })
    }

    /// Returns the statically known branch target, if any.
    pub fn target(&self) -> Option<u64> {
        match self {
            Self::UnconditionalBranch { target }
            | Self::ConditionalBranch { target, .. }
            | Self::Call { target, .. } => Some(*target),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_roundtrip_inverse() {
        for bits in 0..16 {
            let cond = Condition::from_bits(bits);
            assert_eq!(cond.inverse().inverse(), cond);
        }
        assert_eq!(Condition::from_bits(0b0001).suffix(), "ne");
        assert_eq!(Condition::Higher.inverse(), Condition::LowerOrSame);
    }

    #[test]
    fn test_control_flow_target() {
        let cf = ControlFlow::Call {
            target: 0x2000,
            return_addr: 0x1004,
        };
        assert!(cf.is_call());
        assert_eq!(cf.target(), Some(0x2000));
        assert_eq!(ControlFlow::Return.target(), None);
        assert!(!ControlFlow::Sequential.is_branch());
    }
}
