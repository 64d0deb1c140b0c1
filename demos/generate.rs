//! Synthesizes a WAV file carrying a chosen timecode's control signal.
//!
//! You can run this using:
//!
//! ```bash
//! $ cargo run --example generate -- serato_2a /tmp/serato_2a.wav
//! ```

use hound::{SampleFormat, WavSpec, WavWriter};
use std::env;
use timecoder::{find_definition, TimecodeAudioGenerator};

const SAMPLE_RATE_HZ: f64 = 44100.0;

fn main() {
    let mut args = env::args().skip(1);
    let name = args.next().expect("no timecode definition name given");
    let path = args.next().expect("no output file given");
    println!("{} -> {}", name, path);

    let def = find_definition(&name).expect("unknown timecode definition");

    let spec = WavSpec {
        channels: 2,
        sample_rate: SAMPLE_RATE_HZ as u32,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(&path, spec).unwrap();
    let mut generator = TimecodeAudioGenerator::new(def, SAMPLE_RATE_HZ);
    let initial_state = generator.state();
    let mut state_changed = false;

    loop {
        let (left, right) = generator.next_sample();
        writer.write_sample(left).unwrap();
        writer.write_sample(right).unwrap();
        if !state_changed {
            state_changed = generator.state() != initial_state;
        } else if generator.state() == initial_state {
            break;
        }
    }
    writer.finalize().unwrap();
}
