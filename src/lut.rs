//! Position lookup table (LUT): maps an LFSR state to its ordinal position in the orbit.

use rustc_hash::FxHashMap;

/// Maps an LFSR register state to its ordinal position `[0, length)` in the orbit it was built
/// from. Lookups for a state outside the orbit return `None`.
///
/// Keyed on the full `u128` state space rather than truncating to machine word width, since
/// register widths up to 128 bits are supported.
#[derive(Debug, Default)]
pub struct PositionLut {
    table: FxHashMap<u128, u32>,
}

impl PositionLut {
    /// Create an empty table sized to hold `length` distinct entries.
    pub fn with_capacity(length: u32) -> Self {
        Self {
            table: FxHashMap::with_capacity_and_hasher(length as usize, Default::default()),
        }
    }

    /// Append `state` as the next ordinal (the number of prior [`PositionLut::push`] calls).
    ///
    /// Returns the assigned ordinal. Panics (via `debug_assert!`) if `state` was already
    /// present, since a recurring state before `length` pushes indicates an orbit that is
    /// shorter than claimed — a catalog programming error, not a runtime condition.
    pub fn push(&mut self, state: u128) -> u32 {
        let ordinal = self.table.len() as u32;
        debug_assert!(
            self.table.insert(state, ordinal).is_none(),
            "LFSR state {:#x} recurred before the claimed orbit length",
            state
        );
        ordinal
    }

    /// Look up the ordinal position of `state`, or `None` if it is not in the orbit.
    pub fn lookup(&self, state: u128) -> Option<u32> {
        self.table.get(&state).copied()
    }

    /// Number of entries currently in the table.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Remove all entries, leaving the table as if newly constructed.
    pub fn clear(&mut self) {
        self.table.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lfsr::Lfsr;

    #[test]
    fn test_lut_round_trip() {
        let lfsr = Lfsr {
            bits: 8,
            taps: 0b00011100,
        };
        let length = 255u32;
        let mut lut = PositionLut::with_capacity(length);
        let mut state = 1u128;
        let mut states = Vec::with_capacity(length as usize);
        for _ in 0..length {
            lut.push(state);
            states.push(state);
            state = lfsr.fwd(state);
        }

        for (i, s) in states.iter().enumerate() {
            assert_eq!(lut.lookup(*s), Some(i as u32));
        }

        // A state that never appears in the orbit (all bits set is unreachable for this
        // particular maximal-length register, since zero is excluded and 0xff would require
        // wrapping back to the seed at position 0 which is 1, not 0xff).
        assert_eq!(lut.lookup(0), None);
    }

    #[test]
    fn test_clear_empties_table() {
        let mut lut = PositionLut::with_capacity(4);
        lut.push(1);
        lut.push(2);
        assert_eq!(lut.len(), 2);

        lut.clear();
        assert_eq!(lut.len(), 0);
        assert!(lut.is_empty());
        assert_eq!(lut.lookup(1), None);

        // The table is reusable after clearing, mirroring a freshly constructed one.
        assert_eq!(lut.push(1), 0);
    }
}
