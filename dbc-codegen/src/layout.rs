//! Bit-layout arithmetic shared by the runtime codec and the code emitters
//!
//! Bit positions follow the DBC convention: bit 0 is the least significant
//! bit of payload byte 0, bit 8 the least significant bit of byte 1, and so
//! on. The little-endian path shifts within a single 64-bit word. The
//! big-endian path walks the payload byte by byte in chunks that never cross
//! a byte boundary; the emitted C statements and the runtime functions here
//! are both driven by the same chunk list.

use crate::model::Signal;

/// Mask covering the low `bit_size` bits of a payload word
pub fn width_mask(bit_size: u16) -> u64 {
    if bit_size >= 64 {
        u64::MAX
    } else {
        (1u64 << bit_size) - 1
    }
}

/// Mask covering the low `bits` bits of a single byte
pub fn chunk_mask(bits: u8) -> u8 {
    ((1u16 << bits) - 1) as u8
}

/// One contiguous run of signal bits within a single payload byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitChunk {
    /// Payload byte holding this run
    pub byte_index: usize,
    /// Bit position of the run inside its byte, counting from the byte's LSB
    pub shift: u8,
    /// Number of bits in this run, 1..=8
    pub bits: u8,
    /// Signal bits consumed before this run; the run's position in the raw value
    pub consumed: u8,
}

/// Split a signal's bit span into byte-sized chunks.
///
/// Each chunk takes at most the bits left in the current byte, so a span
/// ending mid-byte produces a short final chunk instead of reading past the
/// byte boundary.
pub fn chunks(bit_start: u16, bit_size: u16) -> Vec<BitChunk> {
    let mut out = Vec::new();
    let mut bit_pos = bit_start;
    let mut remaining = bit_size;
    let mut consumed: u16 = 0;

    while remaining > 0 {
        let available = 8 - (bit_pos % 8);
        let bits = remaining.min(available);
        out.push(BitChunk {
            byte_index: usize::from(bit_pos / 8),
            shift: (bit_pos % 8) as u8,
            bits: bits as u8,
            consumed: consumed as u8,
        });
        bit_pos += bits;
        remaining -= bits;
        consumed += bits;
    }

    out
}

/// OR a raw value into a payload word, masked to the signal width
pub fn insert_le(word: &mut u64, bit_start: u16, bit_size: u16, raw: u64) {
    *word |= (raw & width_mask(bit_size)) << bit_start;
}

/// Extract a raw value from a payload word
pub fn extract_le(word: u64, bit_start: u16, bit_size: u16) -> u64 {
    (word >> bit_start) & width_mask(bit_size)
}

/// OR a raw value into a payload image, one byte-sized chunk at a time
pub fn insert_be(bytes: &mut [u8; 8], bit_start: u16, bit_size: u16, raw: u64) {
    for chunk in chunks(bit_start, bit_size) {
        let piece = ((raw >> chunk.consumed) as u8) & chunk_mask(chunk.bits);
        bytes[chunk.byte_index] |= piece << chunk.shift;
    }
}

/// Extract a raw value from a payload image, one byte-sized chunk at a time
pub fn extract_be(bytes: &[u8; 8], bit_start: u16, bit_size: u16) -> u64 {
    let mut value = 0u64;
    for chunk in chunks(bit_start, bit_size) {
        let piece = (bytes[chunk.byte_index] >> chunk.shift) & chunk_mask(chunk.bits);
        value |= u64::from(piece) << chunk.consumed;
    }
    value
}

/// Convert a physical value to its raw wire form.
///
/// Adding 0.5 before the truncating cast rounds to nearest for the
/// non-negative raws a correctly configured signal produces; this is the
/// same arithmetic the generated C performs.
pub fn raw_from_physical(signal: &Signal, physical: f64) -> u64 {
    ((physical - signal.offset) / signal.scale + 0.5) as u64
}

/// Convert a raw wire value back to its physical form
pub fn physical_from_raw(signal: &Signal, raw: u64) -> f64 {
    (raw as f64 * signal.scale) + signal.offset
}

/// Clamp a physical value to the signal's declared range.
///
/// Signals declared `[0|0]` carry no range and pass through unchanged.
pub fn clamp(signal: &Signal, physical: f64) -> f64 {
    if !signal.has_bounds() {
        return physical;
    }
    if physical < signal.min_val {
        signal.min_val
    } else if physical > signal.max_val {
        signal.max_val
    } else {
        physical
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(scale: &str, offset: &str, min_val: &str, max_val: &str) -> Signal {
        Signal {
            name: "S".to_string(),
            bit_start: 0,
            bit_size: 16,
            is_unsigned: true,
            scale: scale.parse().unwrap(),
            scale_str: scale.to_string(),
            offset: offset.parse().unwrap(),
            offset_str: offset.to_string(),
            min_val: min_val.parse().unwrap(),
            min_val_str: min_val.to_string(),
            max_val: max_val.parse().unwrap(),
            max_val_str: max_val.to_string(),
            recipients: vec!["B".to_string()],
        }
    }

    #[test]
    fn test_width_mask() {
        assert_eq!(width_mask(1), 0x1);
        assert_eq!(width_mask(8), 0xff);
        assert_eq!(width_mask(12), 0xfff);
        assert_eq!(width_mask(16), 0xffff);
        assert_eq!(width_mask(64), u64::MAX);
    }

    #[test]
    fn test_chunks_byte_aligned() {
        assert_eq!(
            chunks(0, 8),
            vec![BitChunk { byte_index: 0, shift: 0, bits: 8, consumed: 0 }]
        );
        assert_eq!(
            chunks(8, 16),
            vec![
                BitChunk { byte_index: 1, shift: 0, bits: 8, consumed: 0 },
                BitChunk { byte_index: 2, shift: 0, bits: 8, consumed: 8 },
            ]
        );
    }

    #[test]
    fn test_chunks_unaligned() {
        assert_eq!(
            chunks(4, 12),
            vec![
                BitChunk { byte_index: 0, shift: 4, bits: 4, consumed: 0 },
                BitChunk { byte_index: 1, shift: 0, bits: 8, consumed: 4 },
            ]
        );
        // Fits within one byte
        assert_eq!(
            chunks(2, 3),
            vec![BitChunk { byte_index: 0, shift: 2, bits: 3, consumed: 0 }]
        );
    }

    #[test]
    fn test_chunks_short_tail_stays_in_byte() {
        // 4 bits starting at bit 6 span a byte boundary even though the
        // total width is under 8; the first chunk must stop at bit 8
        assert_eq!(
            chunks(6, 4),
            vec![
                BitChunk { byte_index: 0, shift: 6, bits: 2, consumed: 0 },
                BitChunk { byte_index: 1, shift: 0, bits: 2, consumed: 2 },
            ]
        );
    }

    #[test]
    fn test_le_insert_extract() {
        let mut word = 0u64;
        insert_le(&mut word, 4, 12, 0xabc);
        assert_eq!(word, 0xabc0);
        assert_eq!(extract_le(word, 4, 12), 0xabc);
    }

    #[test]
    fn test_le_insert_masks_oversized_raw() {
        let mut word = 0u64;
        insert_le(&mut word, 0, 4, 0xff);
        assert_eq!(word, 0x0f);

        insert_le(&mut word, 4, 4, 0xab);
        assert_eq!(word, 0xbf);
    }

    #[test]
    fn test_be_round_trip() {
        let cases = [(0u16, 8u16), (4, 12), (6, 4), (13, 3), (16, 32), (0, 64)];
        for (start, size) in cases {
            let raw = 0xdead_beef_cafe_f00d & width_mask(size);
            let mut bytes = [0u8; 8];
            insert_be(&mut bytes, start, size, raw);
            assert_eq!(extract_be(&bytes, start, size), raw, "at {}|{}", start, size);
        }
    }

    #[test]
    fn test_be_matches_le_on_le_byte_image() {
        // On a little-endian payload image the chunked walk reads the same
        // bits as the single-word shift, so both paths must agree
        let cases = [(0u16, 16u16), (4, 12), (6, 4), (24, 10), (63, 1)];
        for (start, size) in cases {
            let raw = 0x5a5a_a5a5_3c3c_c3c3 & width_mask(size);

            let mut word = 0u64;
            insert_le(&mut word, start, size, raw);
            let mut bytes = [0u8; 8];
            insert_be(&mut bytes, start, size, raw);
            assert_eq!(u64::from_le_bytes(bytes), word, "at {}|{}", start, size);

            assert_eq!(
                extract_be(&word.to_le_bytes(), start, size),
                extract_le(word, start, size),
                "at {}|{}",
                start,
                size
            );
        }
    }

    #[test]
    fn test_raw_from_physical_rounds_to_nearest() {
        let sig = signal("1", "0", "0", "0");
        assert_eq!(raw_from_physical(&sig, 4.4), 4);
        assert_eq!(raw_from_physical(&sig, 4.6), 5);

        let sig = signal("0.5", "-10", "0", "0");
        assert_eq!(raw_from_physical(&sig, 5.0), 30);
        assert_eq!(physical_from_raw(&sig, 30), 5.0);
    }

    #[test]
    fn test_scaled_round_trip() {
        let sig = signal("0.1", "-40", "0", "0");
        let physical = 21.5;
        let raw = raw_from_physical(&sig, physical);
        let back = physical_from_raw(&sig, raw);
        assert!((back - physical).abs() < 0.1 / 2.0 + 1e-9);
    }

    #[test]
    fn test_clamp() {
        let sig = signal("1", "0", "0", "100");
        assert_eq!(clamp(&sig, -5.0), 0.0);
        assert_eq!(clamp(&sig, 105.0), 100.0);
        assert_eq!(clamp(&sig, 50.0), 50.0);

        // [0|0] means unbounded, so nothing is clamped
        let sig = signal("1", "0", "0", "0");
        assert_eq!(clamp(&sig, -5.0), -5.0);
        assert_eq!(clamp(&sig, 1e9), 1e9);
    }
}
