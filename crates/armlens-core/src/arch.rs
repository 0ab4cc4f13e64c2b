//! Architecture identification and properties.

/// CPU architectures a decoder backend can be selected for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Architecture {
    /// ARM 64-bit (AArch64, A64 instruction set)
    Arm64,
    /// ARM 32-bit (AArch32, A32/T32 instruction sets)
    Arm,
    /// Unknown architecture, carrying the loader's machine number.
    Unknown(u16),
}

impl Architecture {
    /// Returns the pointer size in bytes for this architecture.
    pub fn pointer_size(&self) -> usize {
        match self {
            Self::Arm64 => 8,
            Self::Arm => 4,
            Self::Unknown(_) => 8, // Default assumption
        }
    }

    /// Returns whether this is a 64-bit architecture.
    pub fn is_64bit(&self) -> bool {
        matches!(self, Self::Arm64)
    }

    /// Returns the width of one instruction word in bytes, if fixed.
    pub fn instruction_width(&self) -> Option<usize> {
        match self {
            Self::Arm64 => Some(4),
            Self::Arm | Self::Unknown(_) => None,
        }
    }

    /// Returns the name of this architecture.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Arm64 => "arm64",
            Self::Arm => "arm",
            Self::Unknown(_) => "unknown",
        }
    }
}

impl std::fmt::Display for Architecture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
