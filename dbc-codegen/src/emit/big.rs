//! Big-endian statement emitter
//!
//! Indexes the payload as a byte array and moves every signal in chunks
//! that never cross a byte boundary, so the emitted code works the same
//! regardless of how the target loads the payload word. Encode and decode
//! walk the identical chunk list and are inverses of each other.

use super::SignalCodeGen;
use crate::layout;
use crate::model::Signal;
use std::fmt::Write;

/// Byte-relative chunk emitter
pub struct BigEndianCodeGen;

impl SignalCodeGen for BigEndianCodeGen {
    fn encode_prelude(&self, out: &mut String) {
        writeln!(out, "    uint8_t *bytes = (uint8_t*) to;").unwrap();
        writeln!(out, "    uint64_t raw = 0;").unwrap();
    }

    fn encode_signal(&self, signal: &Signal, out: &mut String) {
        writeln!(out).unwrap();
        writeln!(
            out,
            "    raw = ((uint64_t) ((from->{} - ({})) / {} + 0.5)) & 0x{:08x};",
            signal.name,
            signal.offset_str,
            signal.scale_str,
            layout::width_mask(signal.bit_size)
        )
        .unwrap();

        for chunk in layout::chunks(signal.bit_start, signal.bit_size) {
            writeln!(
                out,
                "    bytes[{}] |= (uint8_t) (((raw >> {}) & 0x{:02x}) << {}); ///< {} bit(s) to B{}",
                chunk.byte_index,
                chunk.consumed,
                layout::chunk_mask(chunk.bits),
                chunk.shift,
                chunk.bits,
                chunk.byte_index * 8 + usize::from(chunk.shift)
            )
            .unwrap();
        }
    }

    fn decode_prelude(&self, out: &mut String) {
        writeln!(out, "    uint64_t tmp = 0;").unwrap();
        writeln!(out, "    uint64_t bits = 0;").unwrap();
        writeln!(out, "    const uint8_t *bytes = (const uint8_t*) from;").unwrap();
    }

    fn decode_signal(&self, signal: &Signal, out: &mut String) {
        writeln!(out).unwrap();
        writeln!(out, "    tmp = 0;").unwrap();

        for chunk in layout::chunks(signal.bit_start, signal.bit_size) {
            writeln!(
                out,
                "    bits = ((bytes[{}] >> {}) & 0x{:02x}); ///< {} bit(s) from B{}",
                chunk.byte_index,
                chunk.shift,
                layout::chunk_mask(chunk.bits),
                chunk.bits,
                chunk.byte_index * 8 + usize::from(chunk.shift)
            )
            .unwrap();
            writeln!(out, "    tmp |= bits << {};", chunk.consumed).unwrap();
        }

        writeln!(
            out,
            "    to->{} = (tmp * {}) + ({});",
            signal.name, signal.scale_str, signal.offset_str
        )
        .unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(name: &str, bit_start: u16, bit_size: u16, scale: &str, offset: &str) -> Signal {
        Signal {
            name: name.to_string(),
            bit_start,
            bit_size,
            is_unsigned: true,
            scale: scale.parse().unwrap(),
            scale_str: scale.to_string(),
            offset: offset.parse().unwrap(),
            offset_str: offset.to_string(),
            min_val: 0.0,
            min_val_str: "0".to_string(),
            max_val: 0.0,
            max_val_str: "0".to_string(),
            recipients: vec!["IO".to_string()],
        }
    }

    #[test]
    fn test_decode_chunk_walk() {
        let mut out = String::new();
        BigEndianCodeGen.decode_signal(&signal("SPEED", 4, 12, "0.1", "0"), &mut out);

        let expected = "\n    tmp = 0;\n\
                        \x20   bits = ((bytes[0] >> 4) & 0x0f); ///< 4 bit(s) from B4\n\
                        \x20   tmp |= bits << 0;\n\
                        \x20   bits = ((bytes[1] >> 0) & 0xff); ///< 8 bit(s) from B8\n\
                        \x20   tmp |= bits << 4;\n\
                        \x20   to->SPEED = (tmp * 0.1) + (0);\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_decode_tail_stays_in_byte() {
        // 4 bits starting at bit 6: the walk must split 2/2 at the byte
        // boundary instead of reading 4 bits from byte 0
        let mut out = String::new();
        BigEndianCodeGen.decode_signal(&signal("S", 6, 4, "1", "0"), &mut out);

        assert!(out.contains("bits = ((bytes[0] >> 6) & 0x03); ///< 2 bit(s) from B6"));
        assert!(out.contains("bits = ((bytes[1] >> 0) & 0x03); ///< 2 bit(s) from B8"));
        assert!(!out.contains("0x0f"));
    }

    #[test]
    fn test_encode_is_chunk_inverse_of_decode() {
        let sig = signal("SPEED", 4, 12, "0.1", "0");

        let mut enc = String::new();
        BigEndianCodeGen.encode_signal(&sig, &mut enc);
        assert!(enc.contains("raw = ((uint64_t) ((from->SPEED - (0)) / 0.1 + 0.5)) & 0x00000fff;"));
        assert!(enc.contains("bytes[0] |= (uint8_t) (((raw >> 0) & 0x0f) << 4); ///< 4 bit(s) to B4"));
        assert!(enc.contains("bytes[1] |= (uint8_t) (((raw >> 4) & 0xff) << 0); ///< 8 bit(s) to B8"));
    }

    #[test]
    fn test_preludes_declare_payload_views() {
        let mut out = String::new();
        BigEndianCodeGen.encode_prelude(&mut out);
        assert!(out.contains("uint8_t *bytes = (uint8_t*) to;"));
        assert!(out.contains("uint64_t raw = 0;"));

        let mut out = String::new();
        BigEndianCodeGen.decode_prelude(&mut out);
        assert!(out.contains("const uint8_t *bytes = (const uint8_t*) from;"));
        assert!(out.contains("uint64_t tmp = 0;"));
    }
}
