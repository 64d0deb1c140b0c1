//! Error types returned across the crate's public API boundary.
//!
//! Most per-sample outcomes (no position known yet, a LUT miss during a scratch) are not errors
//! at all — they are modeled as `Option::None`, matching [`crate::lut::PositionLut::lookup`] and
//! [`crate::decoder::Decoder::get_position`]. [`DecoderError`] is reserved for the two failure
//! kinds that are exceptional: an unknown catalog name, and (for interface fidelity with the
//! underlying hardware's allocation-based LUT/monitor construction) an allocation failure.

use core::fmt;

/// Errors that can occur while looking up a timecode definition or allocating a monitor.
#[derive(Debug)]
pub enum DecoderError {
    /// No catalog entry has the given name.
    UnknownDefinition(String),
    /// A lookup table or monitor buffer could not be allocated.
    ///
    /// Unreachable in practice under safe Rust (allocation failure aborts the process by
    /// default), but kept for interface fidelity with the original allocation-checked design.
    AllocationFailed,
}

impl fmt::Display for DecoderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecoderError::UnknownDefinition(name) => {
                write!(f, "unknown timecode definition: {name}")
            }
            DecoderError::AllocationFailed => write!(f, "allocation failed"),
        }
    }
}

impl std::error::Error for DecoderError {}

/// Convenience alias for results returned by catalog/monitor construction.
pub type Result<T> = core::result::Result<T, DecoderError>;
