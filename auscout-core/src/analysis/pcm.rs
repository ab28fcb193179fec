//! Raw PCM sample decoding and two's-complement folding.
//!
//! Samples are handled as raw unsigned words of `width` bytes. A raw value at
//! or above the midpoint (`half`) is a negative sample. Folding maps a raw
//! value to its magnitude: `raw` below the midpoint, `full - raw` above it.
//!
//! The two channels fold with different comparisons (`<=` for left, `<` for
//! right). At `raw == half` both branches yield `half`, so the results are
//! identical.

use crate::error::{CoreError, CoreResult};

/// Sample geometry for one width in bytes (1 to 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmLayout {
    width: u16,
    full: u64,
    half: u64,
}

impl PcmLayout {
    pub fn new(width: u16) -> CoreResult<Self> {
        if !(1..=4).contains(&width) {
            return Err(CoreError::UnsupportedSampleWidth(width));
        }
        let bits = u32::from(width) * 8;
        Ok(Self {
            width,
            full: 1u64 << bits,
            half: 1u64 << (bits - 1),
        })
    }

    /// Bytes per sample.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Number of representable raw values (`2^bits`).
    pub fn full_range(&self) -> u64 {
        self.full
    }

    /// Midpoint, also the largest magnitude (`2^(bits-1)`).
    pub fn half_range(&self) -> u64 {
        self.half
    }

    /// Decodes one little-endian sample. `bytes` must hold `width` bytes.
    pub fn decode(&self, bytes: &[u8]) -> u64 {
        bytes
            .iter()
            .take(usize::from(self.width))
            .rev()
            .fold(0u64, |acc, b| (acc << 8) | u64::from(*b))
    }

    pub fn fold_left(&self, raw: u64) -> u64 {
        if raw <= self.half { raw } else { self.full - raw }
    }

    pub fn fold_right(&self, raw: u64) -> u64 {
        if raw < self.half { raw } else { self.full - raw }
    }

    /// True when `raw` encodes a negative sample.
    pub fn is_negative(&self, raw: u64) -> bool {
        raw >= self.half
    }

    /// Signed value of a raw sample.
    pub fn signed(&self, raw: u64) -> i64 {
        if self.is_negative(raw) {
            raw as i64 - self.full as i64
        } else {
            raw as i64
        }
    }

    /// Raw word of a signed sample (two's complement, truncated to width).
    pub fn raw_from_signed(&self, value: i64) -> u64 {
        (value as u64) & (self.full - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_widths() {
        assert!(matches!(PcmLayout::new(0), Err(CoreError::UnsupportedSampleWidth(0))));
        assert!(matches!(PcmLayout::new(5), Err(CoreError::UnsupportedSampleWidth(5))));
    }

    #[test]
    fn test_decode_little_endian() {
        let l2 = PcmLayout::new(2).unwrap();
        assert_eq!(l2.decode(&[0x34, 0x12]), 0x1234);
        let l3 = PcmLayout::new(3).unwrap();
        assert_eq!(l3.decode(&[0x01, 0x00, 0x80]), 0x80_0001);
        assert_eq!(l3.signed(0x80_0001), -0x7F_FFFF);
    }

    #[test]
    fn test_fold_boundaries() {
        let l = PcmLayout::new(2).unwrap();
        assert_eq!(l.fold_left(32768), 32768);
        assert_eq!(l.fold_right(32768), 32768);
        assert_eq!(l.fold_left(32767), 32767);
        assert_eq!(l.fold_right(65535), 1);
        assert_eq!(l.fold_left(0), 0);
    }

    fn check_magnitude_round_trip(layout: &PcmLayout, value: i64) {
        let raw = layout.raw_from_signed(value);
        let bytes = raw.to_le_bytes();
        let decoded = layout.decode(&bytes[..usize::from(layout.width())]);
        assert_eq!(decoded, raw);
        assert_eq!(layout.signed(decoded), value);
        assert_eq!(layout.fold_left(decoded), value.unsigned_abs());
        assert_eq!(layout.fold_right(decoded), value.unsigned_abs());
    }

    #[test]
    fn test_fold_round_trip_exhaustive_narrow() {
        for width in [1u16, 2] {
            let layout = PcmLayout::new(width).unwrap();
            let half = layout.half_range() as i64;
            for value in -half..half {
                check_magnitude_round_trip(&layout, value);
            }
        }
    }

    #[test]
    fn test_fold_round_trip_wide_samples() {
        for width in [3u16, 4] {
            let layout = PcmLayout::new(width).unwrap();
            let half = layout.half_range() as i64;
            let step = (half / 4096).max(1);
            let mut value = -half;
            while value < half {
                check_magnitude_round_trip(&layout, value);
                value += step;
            }
            for edge in [-half, -half + 1, -1, 0, 1, half - 1] {
                check_magnitude_round_trip(&layout, edge);
            }
        }
    }
}
