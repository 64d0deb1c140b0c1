//! Diagnostic X-Y raster ("scope") of the post-calibrated incoming audio.

use crate::error::{DecoderError, Result};

const MONITOR_DECAY_EVERY: u64 = 512;
const DECAY_NUMERATOR: u32 = 7;
const DECAY_DENOMINATOR: u32 = 8;

/// A square, decaying grayscale raster that plots calibrated stereo samples.
#[derive(Debug, Clone)]
pub struct Monitor {
    size: usize,
    pixels: Vec<u8>,
    counter: u64,
}

impl Monitor {
    /// Allocate a `size x size` monitor buffer, cleared to zero.
    ///
    /// Returns [`DecoderError::AllocationFailed`] if `size` is zero (a degenerate raster has no
    /// usable pixel, which is the actually-reachable analogue of the original's
    /// allocation-failure case under safe Rust).
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(DecoderError::AllocationFailed);
        }
        Ok(Self {
            size,
            pixels: vec![0u8; size * size],
            counter: 0,
        })
    }

    /// Side length of the raster.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Row-major pixel buffer, `size * size` bytes, values in `[0, 255]`.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Plot one calibrated `(x, y)` sample, scaled by the current reference level.
    ///
    /// Every [`MONITOR_DECAY_EVERY`] samples, every non-zero pixel already in the raster is
    /// attenuated by a factor of `7/8` before the new sample is plotted.
    pub fn plot(&mut self, x: i64, y: i64, ref_level: i64) {
        self.counter += 1;
        if self.counter % MONITOR_DECAY_EVERY == 0 {
            for p in self.pixels.iter_mut() {
                if *p != 0 {
                    *p = (u32::from(*p) * DECAY_NUMERATOR / DECAY_DENOMINATOR) as u8;
                }
            }
        }

        debug_assert!(ref_level > 0);
        let half = self.size as i64 / 2;
        let px = half + x * self.size as i64 / ref_level / 8;
        let py = half + y * self.size as i64 / ref_level / 8;

        if px < 0 || px >= self.size as i64 || py < 0 || py >= self.size as i64 {
            return;
        }

        let index = py as usize * self.size + px as usize;
        self.pixels[index] = 0xFF;
    }
}
