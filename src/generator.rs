//! Synthesizes stereo timecode audio for a compiled-in definition — the inverse of decoding.

use crate::catalog::TimecodeDefinition;
use crate::lfsr::Lfsr;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimecodeAudioGenerator {
    lfsr: Lfsr,
    state: u128,
    sample_rate_hz: f64,
    signal_frequency_hz: f64,
    previous_bit: bool,
    cycle_index: i32,
    index: i64,
}

impl TimecodeAudioGenerator {
    pub fn new(def: &TimecodeDefinition, sample_rate_hz: f64) -> Self {
        let lfsr = def.lfsr();
        let state = def.seed;
        let signal_frequency_hz = f64::from(def.resolution);

        let previous_state = lfsr.rev(state);
        let previous_bit = (previous_state >> (lfsr.bits - 1)) & 1 == 1;
        debug_assert_eq!(lfsr.fwd(previous_state), state);

        Self {
            lfsr,
            state,
            sample_rate_hz,
            signal_frequency_hz,
            cycle_index: 0,
            previous_bit,
            index: 0,
        }
    }

    const SCALE_FACTOR_ZERO: f64 = 0.75;

    fn scale_sample(sample: f64) -> i16 {
        let sample = sample * (i16::MAX as f64) * 0.5;
        sample.round().trunc() as i16
    }

    fn sample_from_cycle(cycle: f64, primary_bit: bool, secondary_bit: bool) -> (f64, f64) {
        let angle = 2.0 * std::f64::consts::PI * cycle;
        let (mut primary, mut secondary) = angle.sin_cos();

        if !primary_bit {
            primary *= Self::SCALE_FACTOR_ZERO;
        }

        if !secondary_bit {
            secondary *= Self::SCALE_FACTOR_ZERO;
        };

        (primary, secondary)
    }

    pub fn next_sample(&mut self) -> (i16, i16) {
        let index = self.index as f64;

        let cycle = (index * self.signal_frequency_hz) / self.sample_rate_hz;
        let cycle_index = cycle.trunc() as i32;
        let cycle_position = cycle - f64::from(cycle_index);

        if cycle_index == self.cycle_index && cycle_position >= 0.75 {
            self.cycle_index = cycle_index + 1;
            self.previous_bit = (self.state >> (self.lfsr.bits - 1)) & 1 == 1;
            self.state = self.lfsr.fwd(self.state);
        }

        let secondary_bit = (self.state >> (self.lfsr.bits - 1)) & 1 == 1;
        let primary_bit = if cycle_position >= 0.75 {
            self.previous_bit
        } else {
            secondary_bit
        };

        let (mut primary_sample, mut secondary_sample) =
            Self::sample_from_cycle(cycle, primary_bit, secondary_bit);

        if cycle < 1.0 {
            primary_sample *= cycle;
            secondary_sample *= cycle;
        }

        let primary_sample = Self::scale_sample(primary_sample);
        let secondary_sample = Self::scale_sample(secondary_sample);

        self.index += 1;
        (primary_sample, secondary_sample)
    }

    pub fn state(&self) -> u128 {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::TimecodeAudioGenerator;
    use crate::catalog::find_definition;

    #[test]
    fn test_generator_orbit_returns_to_seed() {
        let def = find_definition("mixvibes_7inch").expect("mixvibes_7inch must be in the catalog");
        let mut generator = TimecodeAudioGenerator::new(def, 44100.0);
        let initial_state = generator.state();
        loop {
            generator.next_sample();
            if generator.state() == initial_state {
                break;
            }
        }
    }
}
