// FIXME: Enable missing_docs
//#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![deny(broken_intra_doc_links)]
#![cfg_attr(test, deny(warnings))]

mod bits;
pub mod catalog;
pub mod channel;
mod decoder;
mod error;
mod flags;
mod generator;
mod lfsr;
mod lut;
pub mod monitor;
mod pitch;
mod util;

pub use catalog::{find_definition, TimecodeDefinition};
pub use decoder::{Decoder, DecoderOptions, Position};
pub use error::{DecoderError, Result};
pub use flags::TimecodeFlags;
pub use generator::TimecodeAudioGenerator;
pub use monitor::Monitor;
pub use pitch::PitchEstimator;
