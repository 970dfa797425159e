//! Little-endian statement emitter
//!
//! Packs and unpacks with single shifts against the 64-bit payload word.
//! This matches targets that load the payload into a little-endian word,
//! which is where the generated code has traditionally run.

use super::SignalCodeGen;
use crate::layout;
use crate::model::Signal;
use std::fmt::Write;

/// Single-word shift emitter
pub struct LittleEndianCodeGen;

impl SignalCodeGen for LittleEndianCodeGen {
    fn encode_prelude(&self, _out: &mut String) {}

    fn encode_signal(&self, signal: &Signal, out: &mut String) {
        // Masking to the signal width keeps an oversized value from
        // spilling into neighbouring signals
        writeln!(
            out,
            "    *to |= (((uint64_t) ((from->{} - ({})) / {} + 0.5)) & 0x{:08x}) << {};",
            signal.name,
            signal.offset_str,
            signal.scale_str,
            layout::width_mask(signal.bit_size),
            signal.bit_start
        )
        .unwrap();
    }

    fn decode_prelude(&self, _out: &mut String) {}

    fn decode_signal(&self, signal: &Signal, out: &mut String) {
        writeln!(
            out,
            "    to->{:<32} = (((*from >> {:>2}) & 0x{:08x}) * {}) + ({});",
            signal.name,
            signal.bit_start,
            layout::width_mask(signal.bit_size),
            signal.scale_str,
            signal.offset_str
        )
        .unwrap();
    }
}
