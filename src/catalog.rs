//! The compiled-in catalog of supported timecode formats.
//!
//! Each [`TimecodeDefinition`] pins down the exact LFSR seed, taps, and orbit length for one
//! timecode format; these parameters are not configurable at runtime because they determine the
//! entire LFSR orbit and therefore the public position mapping a consumer depends on.

use crate::flags::TimecodeFlags;
use crate::lfsr::Lfsr;
use crate::lut::PositionLut;
use crate::error::{DecoderError, Result};
use std::sync::OnceLock;

/// An immutable, process-wide timecode format description.
///
/// The position lookup table is built lazily, at most once, on first successful
/// [`find_definition`] call for this entry (see [`TimecodeDefinition::lut`]).
#[derive(Debug)]
pub struct TimecodeDefinition {
    /// Stable short identifier, e.g. `"serato_2a"`.
    pub name: &'static str,
    /// Human-readable description.
    pub desc: &'static str,
    /// Carrier cycles per second at nominal play speed.
    pub resolution: u32,
    /// Behavioral flags.
    pub flags: TimecodeFlags,
    /// LFSR register width in bits, `1..=128`.
    pub bits: u32,
    /// Initial register value. Must be nonzero.
    pub seed: u128,
    /// LFSR tap mask.
    pub taps: u128,
    /// Orbit length to populate in the lookup table.
    pub length: u32,
    /// Largest position treated as reliable by clients; beyond this lies the run-out region.
    pub safe: u32,
    lut: OnceLock<PositionLut>,
}

impl TimecodeDefinition {
    const fn new(
        name: &'static str,
        desc: &'static str,
        resolution: u32,
        flags: TimecodeFlags,
        bits: u32,
        seed: u128,
        taps: u128,
        length: u32,
        safe: u32,
    ) -> Self {
        Self {
            name,
            desc,
            resolution,
            flags,
            bits,
            seed,
            taps,
            length,
            safe,
            lut: OnceLock::new(),
        }
    }

    /// The LFSR stepping function for this definition.
    pub const fn lfsr(&self) -> Lfsr {
        Lfsr {
            bits: self.bits,
            taps: self.taps,
        }
    }

    /// The position lookup table, if it has been built yet.
    pub fn lut(&self) -> Option<&PositionLut> {
        self.lut.get()
    }

    /// Whether the lookup table has been built.
    pub fn is_built(&self) -> bool {
        self.lut.get().is_some()
    }

    /// Build (or return the already-built) lookup table for this definition.
    fn ensure_lut(&self) -> &PositionLut {
        self.lut.get_or_init(|| {
            log::info!(
                "building timecode lookup table for {}-bit, {}Hz format ({})",
                self.bits,
                self.resolution,
                self.desc
            );

            let lfsr = self.lfsr();
            let mut lut = PositionLut::with_capacity(self.length);
            let mut state = self.seed;
            for _ in 0..self.length {
                debug_assert!(
                    lut.lookup(state).is_none(),
                    "orbit for {} recurred before length {}",
                    self.name,
                    self.length
                );
                lut.push(state);

                let next = lfsr.fwd(state);
                debug_assert_eq!(
                    lfsr.rev(next),
                    state,
                    "fwd/rev asymmetry building LUT for {}",
                    self.name
                );
                state = next;
            }
            lut
        })
    }
}

macro_rules! u128_hi_lo {
    ($hi:expr, $lo:expr) => {
        (($hi as u128) << 64) | ($lo as u128)
    };
}

static CATALOG: [TimecodeDefinition; 12] = [
    TimecodeDefinition::new(
        "serato_2a",
        "Serato 2nd Ed., side A",
        1000,
        TimecodeFlags::NONE,
        20,
        0x59017,
        0x361e4,
        712000,
        707000,
    ),
    TimecodeDefinition::new(
        "serato_2b",
        "Serato 2nd Ed., side B",
        1000,
        TimecodeFlags::NONE,
        20,
        0x8f3c6,
        0x4f0d8, // reverse of side A
        922000,
        917000,
    ),
    TimecodeDefinition::new(
        "serato_cd",
        "Serato CD",
        1000,
        TimecodeFlags::NONE,
        20,
        0xd8b40,
        0x34d54,
        950000,
        940000,
    ),
    TimecodeDefinition::new(
        "traktor_a",
        "Traktor Scratch, side A",
        2000,
        TimecodeFlags::PHASE_SWAP
            .union(TimecodeFlags::PRIMARY_SWAP)
            .union(TimecodeFlags::POLARITY_INVERT),
        23,
        0x134503,
        0x041040,
        1500000,
        1480000,
    ),
    TimecodeDefinition::new(
        "traktor_b",
        "Traktor Scratch, side B",
        2000,
        TimecodeFlags::PHASE_SWAP
            .union(TimecodeFlags::PRIMARY_SWAP)
            .union(TimecodeFlags::POLARITY_INVERT),
        23,
        0x32066c,
        0x041040, // same as side A
        2110000,
        2090000,
    ),
    TimecodeDefinition::new(
        "traktor_mk2_a",
        "Traktor Scratch MK2, side A",
        2500,
        TimecodeFlags::OFFSET_MODULATION,
        110,
        u128_hi_lo!(0x339c1f39f18cu128, 0x7fe0063f8f83e0f9u128),
        u128_hi_lo!(0x400000000040u128, 0x0000010800000001u128),
        1620000,
        1600000,
    ),
    TimecodeDefinition::new(
        "traktor_mk2_b",
        "Traktor Scratch MK2, side B",
        2500,
        TimecodeFlags::OFFSET_MODULATION,
        110,
        u128_hi_lo!(0x20e73fc0707cu128, 0xf8c00e7ffcf807c0u128),
        u128_hi_lo!(0x400000000040u128, 0x0000010800000001u128),
        2295000,
        2285000,
    ),
    TimecodeDefinition::new(
        "traktor_mk2_cd",
        "Traktor Scratch MK2, CD",
        3000,
        TimecodeFlags::OFFSET_MODULATION,
        113,
        u128_hi_lo!(0x1f9fff01f1ff9u128, 0xfe7f9c1ff9cff3e3u128),
        u128_hi_lo!(0x400000000000u128, 0x1000010800000001u128),
        4950000,
        4940000,
    ),
    TimecodeDefinition::new(
        "mixvibes_v2",
        "MixVibes V2",
        1300,
        TimecodeFlags::PHASE_SWAP,
        20,
        0x22c90,
        0x00008,
        950000,
        923000,
    ),
    TimecodeDefinition::new(
        "mixvibes_7inch",
        "MixVibes 7\"",
        1300,
        TimecodeFlags::PHASE_SWAP,
        20,
        0x22c90,
        0x00008,
        312000,
        310000,
    ),
    TimecodeDefinition::new(
        "pioneer_a",
        "Pioneer RekordBox DVS Control Vinyl, side A",
        1000,
        TimecodeFlags::POLARITY_INVERT,
        20,
        0x78370,
        0x7933a,
        635000,
        614000,
    ),
    TimecodeDefinition::new(
        "pioneer_b",
        "Pioneer RekordBox DVS Control Vinyl, side B",
        1000,
        TimecodeFlags::POLARITY_INVERT,
        20,
        0xf7012,
        0x2ef1c,
        918500,
        913000,
    ),
];

/// Find a timecode definition by its stable short name, building its lookup table on first
/// successful lookup.
///
/// Returns [`DecoderError::UnknownDefinition`] if no entry has that name.
pub fn find_definition(name: &str) -> Result<&'static TimecodeDefinition> {
    let def = CATALOG
        .iter()
        .find(|def| def.name == name)
        .ok_or_else(|| DecoderError::UnknownDefinition(name.to_owned()))?;
    def.ensure_lut();
    Ok(def)
}

/// Advance to the next definition in the catalog whose lookup table has already been built,
/// wrapping around. Panics if `current` is not a member of the static catalog.
pub fn cycle_definition(current: &'static TimecodeDefinition) -> &'static TimecodeDefinition {
    let start = CATALOG
        .iter()
        .position(|def| std::ptr::eq(def, current))
        .expect("definition must be a member of the compiled-in catalog");

    let mut idx = (start + 1) % CATALOG.len();
    loop {
        if CATALOG[idx].is_built() {
            return &CATALOG[idx];
        }
        idx = (idx + 1) % CATALOG.len();
        if idx == start {
            // Nothing else is built; fall back to the current entry.
            return current;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_definition_builds_lut() {
        let def = find_definition("serato_2a").expect("serato_2a must be in the catalog");
        assert!(def.is_built());
        assert_eq!(def.seed, 0x59017);
    }

    #[test]
    fn test_find_definition_unknown() {
        let err = find_definition("does_not_exist").unwrap_err();
        assert!(matches!(err, DecoderError::UnknownDefinition(_)));
    }

    #[test]
    fn test_lfsr_seed_is_first_orbit_entry() {
        let def = find_definition("serato_2a").unwrap();
        assert_eq!(def.lut().unwrap().lookup(def.seed), Some(0));
    }

    #[test]
    fn test_fwd_second_state_matches_lut() {
        let def = find_definition("serato_2a").unwrap();
        let next = def.lfsr().fwd(def.seed);
        assert_eq!(def.lfsr().rev(next), def.seed);
        assert_eq!(def.lut().unwrap().lookup(next), Some(1));
    }

    #[test]
    fn test_cycle_definition_visits_built_entries_once() {
        let serato_2a = find_definition("serato_2a").unwrap();
        find_definition("serato_2b").unwrap();
        find_definition("serato_cd").unwrap();

        let mut seen = vec![serato_2a.name];
        let mut def = serato_2a;
        loop {
            def = cycle_definition(def);
            if std::ptr::eq(def, serato_2a) {
                break;
            }
            assert!(!seen.contains(&def.name), "definition visited twice");
            seen.push(def.name);
        }
    }

    #[test]
    fn test_catalog_orbit_injectivity_small_format() {
        // Exercise the injective-insertion/round-trip assertions on every built catalog entry
        // used elsewhere in this test module; serato_2a is representative since it shares the
        // same construction path as every other entry (only parameters differ).
        let def = find_definition("serato_2a").unwrap();
        let lut = def.lut().unwrap();
        assert_eq!(lut.len(), def.length as usize);
    }
}
