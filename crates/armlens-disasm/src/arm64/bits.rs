//! Bit-field extraction over 32-bit instruction words.

/// An inclusive bit range `[start, end]` within a 32-bit word, bit 0 = LSB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldSpec {
    start: u8,
    end: u8,
}

impl FieldSpec {
    /// Creates a field spec.
    ///
    /// # Panics
    /// If `start > end` or `end >= 32`. Field specs are compile-time
    /// constants, so this fails the build rather than a decode.
    pub const fn new(start: u8, end: u8) -> Self {
        assert!(start <= end && end < 32, "field must satisfy start <= end < 32");
        Self { start, end }
    }

    /// A single-bit field.
    pub const fn bit(pos: u8) -> Self {
        Self::new(pos, pos)
    }

    pub const fn start(&self) -> u8 {
        self.start
    }

    pub const fn end(&self) -> u8 {
        self.end
    }

    /// Number of bits in the field.
    pub const fn width(&self) -> u32 {
        (self.end - self.start) as u32 + 1
    }

    /// Mask selecting the field's bits in place.
    pub const fn mask(&self) -> u32 {
        (u32::MAX >> (31 - (self.end - self.start) as u32)) << self.start
    }

    /// Extracts the field from `word`, right-aligned.
    #[inline]
    pub const fn extract(&self, word: u32) -> u32 {
        (word & self.mask()) >> self.start
    }
}

/// Extracts bits `[start, end]` of `word`.
///
/// `start <= end < 32` is a caller precondition; violating it is a programming
/// error and panics in debug builds.
#[inline]
pub fn extract(word: u32, start: u32, end: u32) -> u32 {
    debug_assert!(start <= end && end < 32, "bad field [{start}, {end}]");
    let width = end.wrapping_sub(start) & 31;
    word.checked_shr(start).unwrap_or(0) & (u32::MAX >> (31 - width))
}

/// Sign-extends the low `bits` bits of `value`.
#[inline]
pub fn sign_extend(value: u64, bits: u32) -> i64 {
    debug_assert!((1..=64).contains(&bits));
    let shift = 64 - bits;
    ((value << shift) as i64) >> shift
}

/// Zero-extends the low `bits` bits of `value`.
#[inline]
pub fn zero_extend(value: u64, bits: u32) -> u64 {
    debug_assert!((1..=64).contains(&bits));
    value & (u64::MAX >> (64 - bits))
}

/// Standard A64 field positions.
pub mod fields {
    use super::FieldSpec;

    pub const RD: FieldSpec = FieldSpec::new(0, 4);
    pub const RT: FieldSpec = FieldSpec::new(0, 4);
    pub const RN: FieldSpec = FieldSpec::new(5, 9);
    pub const RT2: FieldSpec = FieldSpec::new(10, 14);
    pub const RA: FieldSpec = FieldSpec::new(10, 14);
    pub const RM: FieldSpec = FieldSpec::new(16, 20);
    pub const RS: FieldSpec = FieldSpec::new(16, 20);

    pub const SF: FieldSpec = FieldSpec::bit(31);
    pub const OP: FieldSpec = FieldSpec::bit(30);
    pub const S: FieldSpec = FieldSpec::bit(29);
    pub const OPC: FieldSpec = FieldSpec::new(29, 30);
    pub const N: FieldSpec = FieldSpec::bit(22);
    pub const SHIFT: FieldSpec = FieldSpec::new(22, 23);
    pub const SH: FieldSpec = FieldSpec::bit(22);
    pub const HW: FieldSpec = FieldSpec::new(21, 22);
    pub const IMMR: FieldSpec = FieldSpec::new(16, 21);
    pub const IMMS: FieldSpec = FieldSpec::new(10, 15);
    pub const IMM6: FieldSpec = FieldSpec::new(10, 15);
    pub const IMM3: FieldSpec = FieldSpec::new(10, 12);
    pub const OPTION: FieldSpec = FieldSpec::new(13, 15);
    pub const COND: FieldSpec = FieldSpec::new(12, 15);
    pub const COND_BRANCH: FieldSpec = FieldSpec::new(0, 3);
    pub const NZCV: FieldSpec = FieldSpec::new(0, 3);

    pub const IMM26: FieldSpec = FieldSpec::new(0, 25);
    pub const IMM19: FieldSpec = FieldSpec::new(5, 23);
    pub const IMM14: FieldSpec = FieldSpec::new(5, 18);
    pub const IMMLO: FieldSpec = FieldSpec::new(29, 30);
    pub const IMMHI: FieldSpec = FieldSpec::new(5, 23);
    pub const IMM16: FieldSpec = FieldSpec::new(5, 20);
    pub const IMM12: FieldSpec = FieldSpec::new(10, 21);
    pub const IMM9: FieldSpec = FieldSpec::new(12, 20);
    pub const IMM7: FieldSpec = FieldSpec::new(15, 21);
    pub const IMM5: FieldSpec = FieldSpec::new(16, 20);
    pub const IMM8_FP: FieldSpec = FieldSpec::new(13, 20);
    pub const B5: FieldSpec = FieldSpec::bit(31);
    pub const B40: FieldSpec = FieldSpec::new(19, 23);

    // load/store
    pub const SIZE: FieldSpec = FieldSpec::new(30, 31);
    pub const V: FieldSpec = FieldSpec::bit(26);
    pub const LDST_OPC: FieldSpec = FieldSpec::new(22, 23);
    pub const L: FieldSpec = FieldSpec::bit(22);
    pub const LDST_S: FieldSpec = FieldSpec::bit(12);

    // system
    pub const SYS_L: FieldSpec = FieldSpec::bit(21);
    pub const SYSREG: FieldSpec = FieldSpec::new(5, 20);
    pub const OP1: FieldSpec = FieldSpec::new(16, 18);
    pub const CRN: FieldSpec = FieldSpec::new(12, 15);
    pub const CRM: FieldSpec = FieldSpec::new(8, 11);
    pub const OP2: FieldSpec = FieldSpec::new(5, 7);
    pub const HINT: FieldSpec = FieldSpec::new(5, 11);

    // floating point / SIMD
    pub const FTYPE: FieldSpec = FieldSpec::new(22, 23);
    pub const Q: FieldSpec = FieldSpec::bit(30);
    pub const U: FieldSpec = FieldSpec::bit(29);
    pub const VSIZE: FieldSpec = FieldSpec::new(22, 23);
    pub const SCALE: FieldSpec = FieldSpec::new(10, 15);
    pub const RMODE: FieldSpec = FieldSpec::new(19, 20);
    pub const FP_OPCODE: FieldSpec = FieldSpec::new(16, 18);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_extend() {
        assert_eq!(sign_extend(0xFF, 8), -1);
        assert_eq!(sign_extend(0x8000, 16), -32768);
        assert_eq!(sign_extend(0x7F, 8), 127);
        assert_eq!(sign_extend(0x100, 9), -256);
        assert_eq!(sign_extend(u64::MAX, 64), -1);
    }

    #[test]
    fn test_zero_extend() {
        assert_eq!(zero_extend(0xFF, 8), 0xFF);
        assert_eq!(zero_extend(0x1FF, 8), 0xFF);
        assert_eq!(zero_extend(u64::MAX, 64), u64::MAX);
    }

    #[test]
    fn test_extract() {
        let word = 0xD503201F;
        assert_eq!(extract(word, 0, 4), 0x1F);
        assert_eq!(extract(word, 24, 31), 0xD5);
        assert_eq!(extract(word, 0, 31), word);
        assert_eq!(extract(word, 31, 31), 1);
    }

    #[test]
    fn test_field_spec_matches_extract() {
        let word = 0x8B020020; // add x0, x1, x2
        for (start, end) in [(0u8, 4u8), (5, 9), (16, 20), (24, 28), (0, 31)] {
            let spec = FieldSpec::new(start, end);
            assert_eq!(spec.extract(word), extract(word, start as u32, end as u32));
        }
        assert_eq!(FieldSpec::new(24, 28).mask(), 0x1F00_0000);
        assert_eq!(FieldSpec::new(0, 31).mask(), u32::MAX);
        assert_eq!(fields::IMM19.width(), 19);
    }

    #[test]
    #[should_panic]
    #[cfg(debug_assertions)]
    fn test_extract_out_of_range_panics() {
        let _ = extract(0, 4, 32);
    }

    #[test]
    #[should_panic]
    fn test_field_spec_rejects_inverted_range() {
        let _ = FieldSpec::new(9, 5);
    }
}
