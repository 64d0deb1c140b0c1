//! Behavioral flags carried by a [`crate::catalog::TimecodeDefinition`].

use core::ops::BitOr;

/// Bitset of behavioral flags a timecode definition may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimecodeFlags(u8);

impl TimecodeFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// Tone phase difference of 270 degrees instead of the usual 90.
    pub const PHASE_SWAP: Self = Self(0x1);
    /// Use the left channel (not right) as the primary channel.
    pub const PRIMARY_SWAP: Self = Self(0x2);
    /// Read bit values in the negative (not positive) polarity.
    pub const POLARITY_INVERT: Self = Self(0x4);
    /// Offset-modulated signal, as used by Traktor Scratch MK2 timecodes.
    pub const OFFSET_MODULATION: Self = Self(0x8);

    /// Whether `self` contains every bit set in `other`.
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Combine two flag sets. `const fn` equivalent of [`BitOr::bitor`], usable in the catalog's
    /// `static` initializers where trait methods aren't callable.
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl BitOr for TimecodeFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}
